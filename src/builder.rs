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
use crate::error::ConfigurationError;
use crate::motion;
use crate::motion::FrameRange;
use crate::outputs;
use crate::outputs::PickingLogs;
use crate::picking;
use crate::report::Job;
use crate::settings::Settings;
use crate::tool::Category;
use crate::tool::MotionTool;
use crate::tool::PickingTool;
use std::path::Path;
use std::path::PathBuf;

/// Builds the commands of one job from a settings snapshot.
///
/// Every configuration error is sent to the job's error channel before it
/// is returned, so the caller only has to skip the file.
#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder<'a> {
  settings: &'a Settings,
  job: &'a Job,
}

impl<'a> CommandBuilder<'a> {
  pub fn new(settings: &'a Settings, job: &'a Job) -> Self {
    CommandBuilder { settings, job }
  }

  fn reported<T>(&self, result: Result<T, ConfigurationError>) -> Result<T, ConfigurationError> {
    if let Err(e) = &result {
      self.job.report(e);
    }
    result
  }

  pub fn motion_tool(&self) -> Result<MotionTool, ConfigurationError> {
    self.reported(MotionTool::from_settings(self.settings))
  }

  pub fn picking_tool(&self) -> Result<PickingTool, ConfigurationError> {
    self.reported(PickingTool::from_settings(self.settings))
  }

  /// Frames of each movie that go into the sum.
  pub fn frame_range(&self) -> Result<FrameRange, ConfigurationError> {
    let tool = self.motion_tool()?;
    self.reported(FrameRange::for_tool(tool, self.settings))
  }

  pub fn applies_dose_weighting(&self) -> Result<bool, ConfigurationError> {
    let tool = self.motion_tool()?;
    self.reported(tool.applies_dose_weighting(self.settings))
  }

  #[tracing::instrument(skip(self), fields(job = %self.job.name()))]
  pub fn build_motion_command(
    &self,
    input: &Path,
    output: &Path,
    log: &Path,
    frame_shift: Option<&Path>,
  ) -> Result<CommandDescriptor, ConfigurationError> {
    let tool = self.motion_tool()?;
    let descriptor = self.reported(motion::motion_command(
      tool,
      self.settings,
      input,
      output,
      log,
      frame_shift,
    ))?;
    tracing::debug!(%tool, command = %descriptor.command_line, "Built motion command");
    Ok(descriptor)
  }

  #[tracing::instrument(skip(self), fields(job = %self.job.name()))]
  pub fn build_sum_command(
    &self,
    range: FrameRange,
    input: &Path,
    output: &Path,
    shift: &Path,
    frc: &Path,
  ) -> Result<CommandDescriptor, ConfigurationError> {
    let tool = self.motion_tool()?;
    let descriptor = self.reported(motion::sum_command(
      tool,
      self.settings,
      range,
      input,
      output,
      shift,
      frc,
    ))?;
    tracing::debug!(%tool, command = %descriptor.command_line, "Built sum command");
    Ok(descriptor)
  }

  #[tracing::instrument(skip(self), fields(job = %self.job.name()))]
  pub fn build_picking_command(
    &self,
    input: &Path,
    output: &Path,
  ) -> Result<CommandDescriptor, ConfigurationError> {
    let tool = self.picking_tool()?;
    let descriptor = self.reported(picking::picking_command(
      tool,
      self.settings,
      input,
      output,
    ))?;
    tracing::debug!(%tool, command = %descriptor.command_line, "Built picking command");
    Ok(descriptor)
  }

  pub fn expected_outputs(
    &self,
    category: Category,
    dir: &Path,
    stem: &str,
  ) -> Result<Vec<PathBuf>, ConfigurationError> {
    self.reported(outputs::expected_outputs(category, self.settings, dir, stem))
  }

  pub fn dose_weighted_path(&self, dir: &Path, stem: &str) -> Result<PathBuf, ConfigurationError> {
    self.reported(outputs::dose_weighted_path(self.settings, dir, stem))
  }

  pub fn picking_log_files(
    &self,
    picking_folder: &Path,
    stem: &str,
  ) -> Result<PickingLogs, ConfigurationError> {
    self.reported(outputs::picking_log_files(self.settings, picking_folder, stem))
  }
}
