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

//! The registry of supported external tool versions.
//!
//! Each supported version is one enum variant, parsed from its exact display
//! name (`"MotionCor2 v1.1.0"`). There is no fuzzy matching: an unknown name
//! is a [`ConfigurationError`].

use crate::error::ConfigurationError;
use crate::settings::Section;
use crate::settings::Settings;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

/// GPU needs of a single job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GpuPolicy {
  pub exclusive: bool,
  pub devices: Vec<String>,
}

/// Behaviour shared by every supported tool version.
pub trait ToolCapabilities {
  /// The display name, which doubles as the settings section name.
  fn display_name(&self) -> &'static str;

  /// GPU reservation and device list, read from the tool's settings section.
  fn gpu_policy(&self, section: &Section) -> Result<GpuPolicy, ConfigurationError>;

  /// Files the tool is expected to write for an input named `stem`.
  fn output_paths(&self, dir: &Path, stem: &str) -> Vec<PathBuf>;

  /// The tool's own settings section.
  fn section<'s>(&self, settings: &'s Settings) -> Result<&'s Section, ConfigurationError> {
    settings.section(self.display_name())
  }

  /// The configured executable.
  fn binary<'s>(&self, settings: &'s Settings) -> Result<&'s str, ConfigurationError> {
    settings.binary_path(self.display_name())
  }
}

fn devices(section: &Section, option: &str) -> Result<Vec<String>, ConfigurationError> {
  Ok(
    section
      .require(option)?
      .split_whitespace()
      .map(str::to_string)
      .collect(),
  )
}

/// Motion correction programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionTool {
  MotionCor2V1_0_0,
  MotionCor2V1_0_5,
  MotionCor2V1_1_0,
  UnblurV1_0_2,
}

impl MotionTool {
  pub const ALL: [MotionTool; 4] = [
    MotionTool::MotionCor2V1_0_0,
    MotionTool::MotionCor2V1_0_5,
    MotionTool::MotionCor2V1_1_0,
    MotionTool::UnblurV1_0_2,
  ];

  /// Reads the motion tool selected under `Copy/Motion`.
  pub fn from_settings(settings: &Settings) -> Result<Self, ConfigurationError> {
    settings.selected_tool("Motion")?.parse()
  }

  pub fn is_motion_cor2(self) -> bool {
    !matches!(self, MotionTool::UnblurV1_0_2)
  }

  /// Every supported version writes the dose weighted sum as `<stem>_DW.mrc`.
  pub fn dose_weighted_path(self, dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}_DW.mrc"))
  }
}

impl FromStr for MotionTool {
  type Err = ConfigurationError;

  fn from_str(name: &str) -> Result<Self, Self::Err> {
    MotionTool::ALL
      .into_iter()
      .find(|tool| tool.display_name() == name)
      .ok_or_else(|| ConfigurationError::UnknownMotionTool(name.to_string()))
  }
}

impl fmt::Display for MotionTool {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.display_name())
  }
}

impl ToolCapabilities for MotionTool {
  fn display_name(&self) -> &'static str {
    match self {
      MotionTool::MotionCor2V1_0_0 => "MotionCor2 v1.0.0",
      MotionTool::MotionCor2V1_0_5 => "MotionCor2 v1.0.5",
      MotionTool::MotionCor2V1_1_0 => "MotionCor2 v1.1.0",
      MotionTool::UnblurV1_0_2 => "Unblur v1.0.2",
    }
  }

  fn gpu_policy(&self, section: &Section) -> Result<GpuPolicy, ConfigurationError> {
    let exclusive = match self {
      MotionTool::MotionCor2V1_0_0 => false,
      MotionTool::MotionCor2V1_0_5 => true,
      MotionTool::MotionCor2V1_1_0 => section.require("-GpuMemUsage")? != "0",
      MotionTool::UnblurV1_0_2 => return Ok(GpuPolicy::default()),
    };
    Ok(GpuPolicy {
      exclusive,
      devices: devices(section, "-Gpu")?,
    })
  }

  fn output_paths(&self, dir: &Path, stem: &str) -> Vec<PathBuf> {
    vec![self.dose_weighted_path(dir, stem)]
  }
}

/// Particle picking programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickingTool {
  CryoloV1_0_0,
}

impl PickingTool {
  pub const ALL: [PickingTool; 1] = [PickingTool::CryoloV1_0_0];

  /// Reads the picking tool selected under `Copy/Picking`.
  pub fn from_settings(settings: &Settings) -> Result<Self, ConfigurationError> {
    settings.selected_tool("Picking")?.parse()
  }
}

impl FromStr for PickingTool {
  type Err = ConfigurationError;

  fn from_str(name: &str) -> Result<Self, Self::Err> {
    PickingTool::ALL
      .into_iter()
      .find(|tool| tool.display_name() == name)
      .ok_or_else(|| ConfigurationError::UnknownPickingTool(name.to_string()))
  }
}

impl fmt::Display for PickingTool {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.display_name())
  }
}

impl ToolCapabilities for PickingTool {
  fn display_name(&self) -> &'static str {
    match self {
      PickingTool::CryoloV1_0_0 => "crYOLO v1.0.0",
    }
  }

  fn gpu_policy(&self, section: &Section) -> Result<GpuPolicy, ConfigurationError> {
    match self {
      PickingTool::CryoloV1_0_0 => Ok(GpuPolicy {
        exclusive: true,
        devices: devices(section, "--gpu")?,
      }),
    }
  }

  fn output_paths(&self, dir: &Path, stem: &str) -> Vec<PathBuf> {
    match self {
      PickingTool::CryoloV1_0_0 => vec![dir.join(format!("{stem}.box"))],
    }
  }
}

/// Processing step a tool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Category {
  Motion,
  Picking,
}

/// Any supported tool version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
  Motion(MotionTool),
  Picking(PickingTool),
}

impl Tool {
  /// Resolves the active tool of a category from `Copy`.
  pub fn selected(category: Category, settings: &Settings) -> Result<Self, ConfigurationError> {
    match category {
      Category::Motion => MotionTool::from_settings(settings).map(Tool::Motion),
      Category::Picking => PickingTool::from_settings(settings).map(Tool::Picking),
    }
  }
}

impl ToolCapabilities for Tool {
  fn display_name(&self) -> &'static str {
    match self {
      Tool::Motion(tool) => tool.display_name(),
      Tool::Picking(tool) => tool.display_name(),
    }
  }

  fn gpu_policy(&self, section: &Section) -> Result<GpuPolicy, ConfigurationError> {
    match self {
      Tool::Motion(tool) => tool.gpu_policy(section),
      Tool::Picking(tool) => tool.gpu_policy(section),
    }
  }

  fn output_paths(&self, dir: &Path, stem: &str) -> Vec<PathBuf> {
    match self {
      Tool::Motion(tool) => tool.output_paths(dir, stem),
      Tool::Picking(tool) => tool.output_paths(dir, stem),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_display_names_round_trip() {
    for tool in MotionTool::ALL {
      assert_eq!(tool.display_name().parse::<MotionTool>(), Ok(tool));
    }
    assert_eq!(
      "crYOLO v1.0.0".parse::<PickingTool>(),
      Ok(PickingTool::CryoloV1_0_0)
    );
  }

  #[test]
  fn test_no_fuzzy_matching() {
    assert_eq!(
      "motioncor2 v1.0.0".parse::<MotionTool>(),
      Err(ConfigurationError::UnknownMotionTool(
        "motioncor2 v1.0.0".to_string()
      ))
    );
    assert!("crYOLO v1.0.0 ".parse::<PickingTool>().is_err());
  }
}
