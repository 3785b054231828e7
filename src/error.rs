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
use std::path::PathBuf;
use thiserror::Error;

/// A mismatch between the settings and what the selected tool needs.
///
/// Always fatal to the job that hit it. None of these are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
  #[error("{0}: Motion version not known.\nPlease contact the TranSPHIRE authors!")]
  UnknownMotionTool(String),

  #[error("{0}: Not known!\nPlease contact the TranSPHIRE authors!")]
  UnknownPickingTool(String),

  #[error("{0}: Not known!\nPlease contact the TranSPHIRE authors!")]
  UnsupportedExtension(String),

  #[error("Settings section '{0}' is missing")]
  MissingSection(String),

  #[error("Option '{option}' is missing from settings section '{section}'")]
  MissingOption { section: String, option: String },

  #[error("Option '{option}' in section '{section}' is not a whole number: '{value}'")]
  InvalidNumber {
    section: String,
    option: String,
    value: String,
  },

  #[error("Frame range is empty: {frames} frames, throw {throw}, truncate {trunc}")]
  EmptyFrameRange { frames: u32, throw: u32, trunc: u32 },
}

/// Errors related to reading a settings document (src/settings.rs).
#[derive(Error, Debug)]
pub enum SettingsError {
  #[error("Failed to read settings file: {path}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse settings JSON")]
  Json(#[from] serde_json::Error),

  #[error("Failed to parse settings TOML")]
  Toml(#[from] toml::de::Error),

  #[error("Unsupported settings format '{0}', expected .json or .toml")]
  UnsupportedFormat(PathBuf),
}

/// Errors related to running a command descriptor (src/execute.rs).
#[derive(Error, Debug)]
pub enum ExecutionError {
  #[error("Command line is empty")]
  EmptyCommand,

  #[error("Failed to spawn '{program}'")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to take {0} pipe")]
  Pipe(&'static str),

  #[error("Failed to wait for '{program}'")]
  Wait {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to read {target} of '{program}'")]
  ReadOutput {
    program: String,
    target: &'static str,
    #[source]
    source: std::io::Error,
  },

  #[error("Output reader task failed")]
  OutputTask(#[from] tokio::task::JoinError),

  #[error("'{program}' {}", exit_description(.code))]
  ExitStatus { program: String, code: Option<i32> },

  #[error("Expected output was not written: {0}")]
  MissingOutput(PathBuf),
}

fn exit_description(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exited with code {code}"),
    None => "was terminated by a signal".to_string(),
  }
}
