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
mod common;

use std::path::Path;
use std::path::PathBuf;
use transphire::builder::CommandBuilder;
use transphire::command::CommandLine;
use transphire::error::ConfigurationError;
use transphire::tool::Category;

#[test]
fn test_cryolo_keeps_empty_options() {
  let settings = common::cryolo("crYOLO v1.0.0");
  let (job, _rx) = common::job("Picking_1");

  let descriptor = CommandBuilder::new(&settings, &job)
    .build_picking_command(Path::new("/project/Sum/mic_001.mrc"), Path::new("/project/Picking"))
    .unwrap();

  let expected: Vec<String> = [
    "/opt/cryolo/cryolo_predict.py",
    "-i",
    "/project/Sum/mic_001.mrc",
    "-o",
    "/project/Picking",
    "--conf",
    "config.json",
    "--weights",
    "model.h5",
    "--gpu",
    "0",
    "2",
    "--filament",
  ]
  .iter()
  .map(|arg| arg.to_string())
  .collect();

  assert_eq!(descriptor.command, CommandLine::Argv(expected));
  assert!(descriptor.exclusive_gpu);
  assert!(!descriptor.run_in_shell);
  assert_eq!(descriptor.gpu_indices, vec!["0", "2"]);
  assert_eq!(
    descriptor.validation_targets,
    vec![PathBuf::from("/project/Picking/mic_001.box")]
  );
}

#[test]
fn test_unknown_picking_tool_is_reported() {
  let settings = common::cryolo("Unknown v9");
  let (job, mut rx) = common::job("Picking_1");

  let err = CommandBuilder::new(&settings, &job)
    .build_picking_command(Path::new("mic.mrc"), Path::new("out"))
    .unwrap_err();
  assert_eq!(err, ConfigurationError::UnknownPickingTool("Unknown v9".to_string()));

  let reports = common::drain(&mut rx);
  assert_eq!(reports.len(), 1);
  assert_eq!(reports[0].job, "Picking_1");
  assert!(reports[0].message.contains("Not known!"));
  assert!(reports[0].message.ends_with("Please contact the TranSPHIRE authors!"));
}

#[test]
fn test_expected_outputs() {
  let (job, _rx) = common::job("Outputs");

  let picking = common::cryolo("crYOLO v1.0.0");
  let builder = CommandBuilder::new(&picking, &job);
  assert_eq!(
    builder
      .expected_outputs(Category::Picking, Path::new("/picking"), "mic_001")
      .unwrap(),
    vec![PathBuf::from("/picking/mic_001.box")]
  );

  let logs = builder
    .picking_log_files(Path::new("/picking"), "mic_001")
    .unwrap();
  assert_eq!(logs.log_files, vec![PathBuf::from("/picking/mic_001.box")]);
  assert_eq!(logs.copied_log_files, logs.log_files);

  for motion in [common::motion_cor2("MotionCor2 v1.0.5"), common::unblur(true, true)] {
    let builder = CommandBuilder::new(&motion, &job);
    assert_eq!(
      builder
        .dose_weighted_path(Path::new("/scratch"), "movie_001")
        .unwrap(),
      PathBuf::from("/scratch/movie_001_DW.mrc")
    );
    assert_eq!(
      builder
        .expected_outputs(Category::Motion, Path::new("/scratch"), "movie_001")
        .unwrap(),
      vec![PathBuf::from("/scratch/movie_001_DW.mrc")]
    );
  }
}

#[test]
fn test_outputs_of_unselected_category_fail() {
  let settings = common::cryolo("crYOLO v1.0.0");
  let (job, mut rx) = common::job("Outputs");

  let err = CommandBuilder::new(&settings, &job)
    .expected_outputs(Category::Motion, Path::new("."), "movie")
    .unwrap_err();
  assert_eq!(
    err,
    ConfigurationError::MissingOption {
      section: "Copy".to_string(),
      option: "Motion".to_string(),
    }
  );
  assert_eq!(common::drain(&mut rx).len(), 1);
}
