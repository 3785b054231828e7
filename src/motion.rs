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

//! Command lines for motion correction (MotionCor2, Unblur) and for the
//! SumMovie frame summation that follows it.

use crate::command::CommandDescriptor;
use crate::command::CommandLine;
use crate::command::path_arg;
use crate::command::piped_answers;
use crate::error::ConfigurationError;
use crate::settings::Section;
use crate::settings::Settings;
use crate::tool::MotionTool;
use crate::tool::ToolCapabilities;
use serde::Serialize;
use std::path::Path;

/// Settings key of the SumMovie executable under `Path`.
pub const SUM_MOVIE: &str = "SumMovie v1.0.2";

/// 1-based inclusive frame indices that go into a sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameRange {
  pub first: u32,
  pub last: u32,
}

/// Frames thrown away at the start and the end of a movie.
struct Discarded {
  throw: u32,
  trunc: u32,
}

impl Discarded {
  fn read(tool: MotionTool, section: &Section) -> Result<Self, ConfigurationError> {
    let (throw, trunc) = if tool.is_motion_cor2() {
      ("-Throw", "-Trunc")
    } else {
      ("Throw", "Trunc")
    };
    Ok(Discarded {
      throw: section.require_u32(throw)?,
      trunc: section.require_u32(trunc)?,
    })
  }

  fn empty(&self, frames: u32) -> ConfigurationError {
    ConfigurationError::EmptyFrameRange {
      frames,
      throw: self.throw,
      trunc: self.trunc,
    }
  }

  /// First frame kept after the thrown ones.
  fn first(&self, frames: u32) -> Result<u32, ConfigurationError> {
    self.throw.checked_add(1).ok_or_else(|| self.empty(frames))
  }

  /// Frames left once both ends are dropped.
  fn remaining(&self, frames: u32) -> Result<u32, ConfigurationError> {
    frames
      .checked_sub(self.throw)
      .and_then(|left| left.checked_sub(self.trunc))
      .ok_or_else(|| self.empty(frames))
  }

  /// `first ..= last`, rejected when it holds no frame.
  fn range(&self, first: u32, last: u32, frames: u32) -> Result<FrameRange, ConfigurationError> {
    if last < first {
      return Err(self.empty(frames));
    }
    Ok(FrameRange { first, last })
  }
}

impl FrameRange {
  /// Range to sum after motion correction with `tool`.
  ///
  /// MotionCor2 already drops the thrown and truncated frames from its
  /// aligned stack, Unblur keeps the whole movie.
  pub fn for_tool(tool: MotionTool, settings: &Settings) -> Result<Self, ConfigurationError> {
    let frames = settings.number_of_frames()?;
    if !tool.is_motion_cor2() {
      return Discarded { throw: 0, trunc: 0 }.range(1, frames, frames);
    }

    let discarded = Discarded::read(tool, tool.section(settings)?)?;
    discarded.range(
      discarded.first(frames)?,
      discarded.remaining(frames)?,
      frames,
    )
  }
}

impl MotionTool {
  /// True if the run will also write a dose weighted sum.
  pub fn applies_dose_weighting(self, settings: &Settings) -> Result<bool, ConfigurationError> {
    let section = self.section(settings)?;
    if self.is_motion_cor2() {
      for option in ["-FmDose", "-PixSize", "-kV"] {
        if section.require(option)? == "0" {
          return Ok(false);
        }
      }
      Ok(true)
    } else {
      section.require_flag("Apply Dose filter?")
    }
  }

  fn pixel_size(self, section: &Section) -> Result<&str, ConfigurationError> {
    if self.is_motion_cor2() {
      section.require("-PixSize")
    } else {
      section.require("Pixel size of images (A)")
    }
  }
}

/// Builds the motion correction command for one movie.
///
/// `frame_shift` overrides where Unblur writes its shift file; MotionCor2
/// writes shifts into its own log and ignores it.
pub fn motion_command(
  tool: MotionTool,
  settings: &Settings,
  input: &Path,
  output: &Path,
  log: &Path,
  frame_shift: Option<&Path>,
) -> Result<CommandDescriptor, ConfigurationError> {
  let section = tool.section(settings)?;
  match tool {
    MotionTool::MotionCor2V1_0_0 | MotionTool::MotionCor2V1_0_5 | MotionTool::MotionCor2V1_1_0 => {
      let argv = motion_cor2_argv(tool, settings, section, input, output, log)?;
      let gpu = tool.gpu_policy(section)?;
      Ok(CommandDescriptor::new(CommandLine::Argv(argv)).with_gpu(gpu.exclusive, gpu.devices))
    }
    MotionTool::UnblurV1_0_2 => {
      let line = unblur_line(tool, settings, section, input, output, log, frame_shift)?;
      Ok(CommandDescriptor::new(CommandLine::Shell(line)))
    }
  }
}

fn input_flag(input: &Path) -> Result<&'static str, ConfigurationError> {
  match input.extension().and_then(|ext| ext.to_str()) {
    Some("tif") | Some("tiff") => Ok("-InTiff"),
    Some("mrc") => Ok("-InMrc"),
    Some(other) => Err(ConfigurationError::UnsupportedExtension(format!(".{other}"))),
    None => Err(ConfigurationError::UnsupportedExtension(String::new())),
  }
}

fn motion_cor2_argv(
  tool: MotionTool,
  settings: &Settings,
  section: &Section,
  input: &Path,
  output: &Path,
  log: &Path,
) -> Result<Vec<String>, ConfigurationError> {
  let mut argv = vec![
    tool.binary(settings)?.to_string(),
    input_flag(input)?.to_string(),
    path_arg(input),
    "-OutMrc".to_string(),
    path_arg(output),
    "-OutStack".to_string(),
    "1".to_string(),
    "-LogFile".to_string(),
    path_arg(log),
  ];

  // Empty values mean "leave at the program default". Multi-valued options
  // such as `-Patch "5 5"` become one argument per value.
  for (option, value) in section.iter().filter(|(_, value)| !value.trim().is_empty()) {
    argv.push(option.to_string());
    argv.extend(value.split_whitespace().map(str::to_string));
  }

  Ok(argv)
}

fn yes_no(flag: bool) -> String {
  let answer = if flag { "Yes" } else { "No" };
  answer.to_string()
}

/// Dose filter answers shared by Unblur and SumMovie.
fn dose_filter_answers(section: &Section) -> Result<Vec<String>, ConfigurationError> {
  if !section.require_flag("Apply Dose filter?")? {
    return Ok(vec![yes_no(false)]);
  }
  Ok(vec![
    yes_no(true),
    section.require("Exposure per frame (e/A^2)")?.to_string(),
    section.require("Acceleration voltage (kV)")?.to_string(),
    section.require("Pre-exposure amount(e/A^2)")?.to_string(),
  ])
}

const UNBLUR_EXPERT_VALUES: [&str; 7] = [
  "Minimum shift for initial search (Angstroms)",
  "Outer radius shift limit (Angstroms)",
  "B-factor to apply to images (A^2)",
  "Half-width of central vertical line of Fourier mask",
  "Half-width of central horizontal line of Fourier mask",
  "Termination shift threshold",
  "Maximum number of iterations",
];

fn unblur_line(
  tool: MotionTool,
  settings: &Settings,
  section: &Section,
  input: &Path,
  output: &Path,
  log: &Path,
  frame_shift: Option<&Path>,
) -> Result<String, ConfigurationError> {
  let log = path_arg(log);
  let file_shift = frame_shift
    .map(path_arg)
    .unwrap_or_else(|| format!("{log}_shift.txt"));
  let file_frc = format!("{log}_frc.txt");
  let file_stack = format!("{}_Stk.mrc", path_arg(&output.with_extension("")));
  let frames = settings.number_of_frames()?;

  let mut answers = vec![
    path_arg(input),
    frames.to_string(),
    path_arg(output),
    file_shift.clone(),
    section.require("Pixel size of images (A)")?.to_string(),
  ];
  answers.extend(dose_filter_answers(section)?);

  // Always keep the aligned frames.
  answers.push(yes_no(true));
  answers.push(file_stack);

  if section.require_flag("Set Expert Options?")? {
    answers.push(file_frc.clone());
    for option in UNBLUR_EXPERT_VALUES {
      answers.push(section.require(option)?.to_string());
    }
    answers.push(yes_no(section.require_flag("Restore Noise Power")?));
    answers.push(yes_no(section.require_flag("Verbose Output?")?));
  } else {
    answers.push(yes_no(false));
  }

  let discarded = Discarded::read(tool, section)?;
  let last = frames
    .checked_sub(discarded.trunc)
    .ok_or_else(|| discarded.empty(frames))?;
  let range = discarded.range(discarded.first(frames)?, last, frames)?;
  let sum = sum_movie_line(
    tool,
    settings,
    range,
    input,
    output,
    Path::new(&file_shift),
    Path::new(&file_frc),
  )?;

  Ok(format!(
    "{} ; {}",
    piped_answers(&answers, tool.binary(settings)?),
    sum
  ))
}

/// Builds the SumMovie command summing `range` of an aligned movie.
pub fn sum_command(
  tool: MotionTool,
  settings: &Settings,
  range: FrameRange,
  input: &Path,
  output: &Path,
  shift: &Path,
  frc: &Path,
) -> Result<CommandDescriptor, ConfigurationError> {
  let line = sum_movie_line(tool, settings, range, input, output, shift, frc)?;
  Ok(CommandDescriptor::new(CommandLine::Shell(line)))
}

fn sum_movie_line(
  tool: MotionTool,
  settings: &Settings,
  range: FrameRange,
  input: &Path,
  output: &Path,
  shift: &Path,
  frc: &Path,
) -> Result<String, ConfigurationError> {
  let section = tool.section(settings)?;
  let frames = settings.number_of_frames()?;
  let frame_count = if tool.is_motion_cor2() {
    Discarded::read(tool, section)?.remaining(frames)?
  } else {
    frames
  };

  let mut answers = vec![
    path_arg(input),
    frame_count.to_string(),
    path_arg(output),
    path_arg(shift),
    path_arg(frc),
    range.first.to_string(),
    range.last.to_string(),
    tool.pixel_size(section)?.to_string(),
  ];

  match tool {
    MotionTool::UnblurV1_0_2 => answers.extend(dose_filter_answers(section)?),
    MotionTool::MotionCor2V1_0_0 | MotionTool::MotionCor2V1_0_5 | MotionTool::MotionCor2V1_1_0 => {
      answers.push(yes_no(false))
    }
  }

  Ok(piped_answers(&answers, settings.binary_path(SUM_MOVIE)?))
}
