// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use crate::command::CommandDescriptor;
use crate::command::CommandLine;
use crate::error::ExecutionError;
use crate::report::Job;
use serde::Serialize;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::Mutex;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::BufReader;
use tokio::process::Command;
use tokio::sync::OwnedMutexGuard;
use tracing::Instrument;

/// Exclusive claims on GPU devices, shared by all concurrently running jobs.
#[derive(Debug, Clone, Default)]
pub struct GpuPool {
  devices: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

/// Held devices. Dropping it releases them.
#[derive(Debug)]
pub struct GpuReservation {
  devices: Vec<String>,
  _guards: Vec<OwnedMutexGuard<()>>,
}

impl GpuReservation {
  pub fn devices(&self) -> &[String] {
    &self.devices
  }
}

impl GpuPool {
  pub fn new() -> Self {
    GpuPool::default()
  }

  fn device_lock(&self, device: &str) -> Arc<tokio::sync::Mutex<()>> {
    let mut devices = self
      .devices
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    devices.entry(device.to_string()).or_default().clone()
  }

  /// Waits until all `devices` are free and claims them.
  ///
  /// Devices are always locked in sorted order, so two jobs asking for
  /// overlapping sets cannot deadlock.
  pub async fn reserve(&self, devices: &[String]) -> GpuReservation {
    let ordered: BTreeSet<&String> = devices.iter().collect();
    let mut guards = Vec::with_capacity(ordered.len());
    for device in &ordered {
      tracing::debug!(gpu = %device, "Waiting for GPU");
      guards.push(self.device_lock(device).lock_owned().await);
    }
    GpuReservation {
      devices: ordered.into_iter().cloned().collect(),
      _guards: guards,
    }
  }
}

/// What a finished job printed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionOutcome {
  pub stdout: Vec<String>,
  pub stderr: Vec<String>,
}

/// Runs one descriptor to completion and checks its validation targets.
///
/// Failures are also sent to the job's error channel.
pub async fn run_descriptor(
  descriptor: &CommandDescriptor,
  gpus: &GpuPool,
  job: &Job,
) -> Result<ExecutionOutcome, ExecutionError> {
  let span = tracing::info_span!("run_descriptor", job = %job.name());
  let result = async {
    let _reservation = if descriptor.exclusive_gpu {
      Some(gpus.reserve(&descriptor.gpu_indices).await)
    } else {
      None
    };
    run_command(descriptor).await
  }
  .instrument(span)
  .await;

  if let Err(e) = &result {
    job.report(e);
  }
  result
}

async fn run_command(descriptor: &CommandDescriptor) -> Result<ExecutionOutcome, ExecutionError> {
  let mut cmd = match &descriptor.command {
    CommandLine::Argv(argv) => {
      let (program, args) = argv.split_first().ok_or(ExecutionError::EmptyCommand)?;
      let mut cmd = Command::new(program);
      cmd.args(args);
      cmd
    }
    CommandLine::Shell(line) => {
      let mut cmd = Command::new("sh");
      cmd.arg("-c").arg(line);
      cmd
    }
  };
  let program = descriptor.command.program().to_string();

  cmd
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);

  tracing::info!(command = %descriptor.command_line, "Spawning");
  let mut child = cmd.spawn().map_err(|source| ExecutionError::Spawn {
    program: program.clone(),
    source,
  })?;

  let stdout = child.stdout.take().ok_or(ExecutionError::Pipe("stdout"))?;
  let stderr = child.stderr.take().ok_or(ExecutionError::Pipe("stderr"))?;

  let stdout_task = tokio::spawn(
    collect_lines(stdout, program.clone(), "stdout")
      .instrument(tracing::info_span!("stdout_handler")),
  );
  let stderr_task = tokio::spawn(
    collect_lines(stderr, program.clone(), "stderr")
      .instrument(tracing::info_span!("stderr_handler")),
  );

  let status = child.wait().await.map_err(|source| ExecutionError::Wait {
    program: program.clone(),
    source,
  })?;

  let outcome = ExecutionOutcome {
    stdout: stdout_task.await??,
    stderr: stderr_task.await??,
  };

  if !status.success() {
    return Err(ExecutionError::ExitStatus {
      program,
      code: status.code(),
    });
  }

  for target in &descriptor.validation_targets {
    if !target.exists() {
      return Err(ExecutionError::MissingOutput(target.clone()));
    }
  }

  tracing::info!("Finished {}", program);
  Ok(outcome)
}

/// Reads lines from a child's output stream. Stderr lines are logged as
/// they arrive.
async fn collect_lines<R: AsyncRead + Unpin>(
  stream: R,
  program: String,
  target: &'static str,
) -> Result<Vec<String>, ExecutionError> {
  let mut reader = BufReader::new(stream).lines();
  let mut lines = Vec::new();

  while let Some(line) = reader
    .next_line()
    .await
    .map_err(|source| ExecutionError::ReadOutput {
      program: program.clone(),
      target,
      source,
    })?
  {
    if target == "stderr" {
      tracing::warn!(stream = target, "{}", line);
    }
    lines.push(line);
  }
  Ok(lines)
}
