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

//! Predicts the files an external tool will write, so callers can poll for
//! them. Nothing here touches the filesystem.

use crate::error::ConfigurationError;
use crate::settings::Settings;
use crate::tool::Category;
use crate::tool::MotionTool;
use crate::tool::PickingTool;
use crate::tool::Tool;
use crate::tool::ToolCapabilities;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Log files of a picking run: where the tool writes them, and the copies
/// kept with the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickingLogs {
  pub log_files: Vec<PathBuf>,
  pub copied_log_files: Vec<PathBuf>,
}

/// Expected outputs of the tool currently selected for `category`.
pub fn expected_outputs(
  category: Category,
  settings: &Settings,
  dir: &Path,
  stem: &str,
) -> Result<Vec<PathBuf>, ConfigurationError> {
  Ok(Tool::selected(category, settings)?.output_paths(dir, stem))
}

/// The dose weighted sum the active motion tool writes into `dir`.
pub fn dose_weighted_path(
  settings: &Settings,
  dir: &Path,
  stem: &str,
) -> Result<PathBuf, ConfigurationError> {
  Ok(MotionTool::from_settings(settings)?.dose_weighted_path(dir, stem))
}

pub fn picking_log_files(
  settings: &Settings,
  picking_folder: &Path,
  stem: &str,
) -> Result<PickingLogs, ConfigurationError> {
  let tool = PickingTool::from_settings(settings)?;
  let log_files = tool.output_paths(picking_folder, stem);
  Ok(PickingLogs {
    copied_log_files: log_files.clone(),
    log_files,
  })
}
