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
use crate::tool::Category;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
  name = "transphire",
  version,
  about = "Builds and runs the external processing commands of a cryo-EM session"
)]
pub struct Cli {
  /// Configuration file, merged below environment and command line.
  #[arg(long, global = true, env = "TRANSPHIRE_CONFIG", default_value = "transphire.toml")]
  pub config: PathBuf,

  /// Settings document (.json or .toml).
  #[arg(long, global = true)]
  pub settings: Option<PathBuf>,

  /// Job name that error reports are filed under.
  #[arg(long, global = true)]
  pub job: Option<String>,

  /// Folder the picking tool writes box files to.
  #[arg(long, global = true)]
  pub picking_folder: Option<PathBuf>,

  /// Append operator error reports to this file instead of stderr.
  #[arg(long, global = true)]
  pub error_log: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  /// Build the motion correction command for one movie.
  Motion(MotionArgs),

  /// Build the SumMovie command for an aligned movie.
  Sum(SumArgs),

  /// Build the particle picking command for one micrograph.
  Pick(PickArgs),

  /// Print the frame range and whether dose weighting applies.
  Frames,

  /// Print the files the selected tool is expected to write.
  Outputs(OutputsArgs),
}

#[derive(Debug, Args)]
pub struct MotionArgs {
  #[arg(long)]
  pub input: PathBuf,

  #[arg(long)]
  pub output: PathBuf,

  #[arg(long)]
  pub log: PathBuf,

  /// Shift file for Unblur. Defaults to `<log>_shift.txt`.
  #[arg(long)]
  pub frame_shift: Option<PathBuf>,

  /// Run the command instead of only printing it.
  #[arg(long)]
  pub execute: bool,
}

#[derive(Debug, Args)]
pub struct SumArgs {
  #[arg(long)]
  pub input: PathBuf,

  #[arg(long)]
  pub output: PathBuf,

  #[arg(long)]
  pub shift: PathBuf,

  #[arg(long)]
  pub frc: PathBuf,

  /// First frame to sum. Derived from the settings if omitted.
  #[arg(long)]
  pub first: Option<u32>,

  /// Last frame to sum. Derived from the settings if omitted.
  #[arg(long)]
  pub last: Option<u32>,

  #[arg(long)]
  pub execute: bool,
}

#[derive(Debug, Args)]
pub struct PickArgs {
  #[arg(long)]
  pub input: PathBuf,

  #[arg(long)]
  pub output: PathBuf,

  #[arg(long)]
  pub execute: bool,
}

#[derive(Debug, Args)]
pub struct OutputsArgs {
  #[arg(long, value_enum)]
  pub category: Category,

  /// Input file name without extension.
  #[arg(long)]
  pub stem: String,

  /// Directory the tool writes into. The picking folder for picking,
  /// the current directory otherwise.
  #[arg(long)]
  pub dir: Option<PathBuf>,
}
