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
use Commands::Frames;
use Commands::Motion;
use Commands::Outputs;
use Commands::Pick;
use Commands::Sum;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tokio::sync::mpsc::UnboundedReceiver;
use transphire::builder::CommandBuilder;
use transphire::cli::Cli;
use transphire::cli::Commands;
use transphire::command::CommandDescriptor;
use transphire::config::AppConfig;
use transphire::execute::GpuPool;
use transphire::execute::run_descriptor;
use transphire::logging::setup_tracing;
use transphire::motion::FrameRange;
use transphire::report::ErrorChannel;
use transphire::report::ErrorReport;
use transphire::report::Job;
use transphire::settings::Settings;
use transphire::tool::Category;

#[derive(Serialize)]
struct FramesReport {
  #[serde(flatten)]
  range: FrameRange,
  dose_weighting: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  let _log_guard = setup_tracing()?;

  let cli = Cli::parse();
  let main_span = tracing::info_span!("transphire");
  let _enter = main_span.enter();

  let config = AppConfig::resolve(&cli.config, &cli)?;
  let settings_path = config.settings_path()?;
  let settings = Settings::read_file(settings_path)
    .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;

  let (errors, reports) = ErrorChannel::new();
  let job = Job::new(config.job.clone(), errors);

  let result = run(cli.command, &config, &settings, &job).await;

  drop(job);
  write_reports(reports, config.error_log.as_deref())?;
  result
}

async fn run(command: Commands, config: &AppConfig, settings: &Settings, job: &Job) -> Result<()> {
  let builder = CommandBuilder::new(settings, job);

  match command {
    Motion(args) => {
      let descriptor = builder.build_motion_command(
        &args.input,
        &args.output,
        &args.log,
        args.frame_shift.as_deref(),
      )?;
      emit(&descriptor, args.execute, job).await
    }
    Sum(args) => {
      let range = match (args.first, args.last) {
        (Some(first), Some(last)) => FrameRange { first, last },
        (first, last) => {
          let derived = builder.frame_range()?;
          FrameRange {
            first: first.unwrap_or(derived.first),
            last: last.unwrap_or(derived.last),
          }
        }
      };
      let descriptor =
        builder.build_sum_command(range, &args.input, &args.output, &args.shift, &args.frc)?;
      emit(&descriptor, args.execute, job).await
    }
    Pick(args) => {
      let descriptor = builder.build_picking_command(&args.input, &args.output)?;
      emit(&descriptor, args.execute, job).await
    }
    Frames => {
      let report = FramesReport {
        range: builder.frame_range()?,
        dose_weighting: builder.applies_dose_weighting()?,
      };
      println!("{}", serde_json::to_string_pretty(&report)?);
      Ok(())
    }
    Outputs(args) => {
      let dir = match (args.dir, args.category) {
        (Some(dir), _) => dir,
        (None, Category::Picking) => config.picking_folder.clone(),
        (None, Category::Motion) => Path::new(".").to_path_buf(),
      };
      let paths = builder.expected_outputs(args.category, &dir, &args.stem)?;
      println!("{}", serde_json::to_string_pretty(&paths)?);
      Ok(())
    }
  }
}

/// Prints the descriptor as JSON, or runs it when asked to.
async fn emit(descriptor: &CommandDescriptor, execute: bool, job: &Job) -> Result<()> {
  if !execute {
    println!("{}", serde_json::to_string_pretty(descriptor)?);
    return Ok(());
  }

  let outcome = run_descriptor(descriptor, &GpuPool::new(), job).await?;
  println!("{}", serde_json::to_string_pretty(&outcome)?);
  Ok(())
}

/// Drains the operator error log once every job handle is gone.
fn write_reports(mut reports: UnboundedReceiver<ErrorReport>, error_log: Option<&Path>) -> Result<()> {
  let mut sink: Box<dyn Write> = match error_log {
    Some(path) => Box::new(
      OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open error log {}", path.display()))?,
    ),
    None => Box::new(std::io::stderr()),
  };

  while let Ok(ErrorReport { job, message }) = reports.try_recv() {
    writeln!(sink, "[{job}] {message}")?;
  }
  Ok(())
}
