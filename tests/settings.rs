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
use transphire::builder::CommandBuilder;
use transphire::command::CommandLine;
use transphire::settings::Settings;

const TOML_SETTINGS: &str = "tests/fixtures/settings.toml";

fn keys(settings: &Settings, section: &str) -> Vec<String> {
  settings
    .section(section)
    .unwrap()
    .iter()
    .map(|(key, _)| key.to_string())
    .collect()
}

#[test]
fn test_toml_settings_keep_document_order() {
  let settings = Settings::read_file(Path::new(TOML_SETTINGS)).unwrap();

  assert_eq!(
    keys(&settings, "MotionCor2 v1.1.0"),
    vec![
      "-Patch",
      "-FmDose",
      "-PixSize",
      "-kV",
      "-Throw",
      "-Trunc",
      "-Bft",
      "-Gpu",
      "-GpuMemUsage",
    ]
  );
  assert_eq!(
    keys(&settings, "crYOLO v1.0.0"),
    vec!["--weights", "--conf", "--gpu", "--filament"]
  );
}

#[test]
fn test_toml_and_json_settings_build_the_same_command() {
  let from_toml = Settings::read_file(Path::new(TOML_SETTINGS)).unwrap();
  let from_json = Settings::read_file(Path::new("tests/fixtures/settings.json")).unwrap();
  let (job, _rx) = common::job("Motion_1");

  let build = |settings: &Settings| {
    CommandBuilder::new(settings, &job)
      .build_motion_command(
        Path::new("/data/movie.tiff"),
        Path::new("/scratch/movie.mrc"),
        Path::new("/scratch/movie.log"),
        None,
      )
      .unwrap()
  };

  let descriptor = build(&from_toml);
  let CommandLine::Argv(argv) = &descriptor.command else {
    panic!("MotionCor2 runs without a shell");
  };
  let options: Vec<&str> = argv[9..].iter().map(String::as_str).collect();
  assert_eq!(
    options,
    vec![
      "-Patch",
      "5",
      "5",
      "-FmDose",
      "1.2",
      "-PixSize",
      "1.14",
      "-kV",
      "300",
      "-Throw",
      "2",
      "-Trunc",
      "3",
      "-Gpu",
      "0",
      "1",
      "-GpuMemUsage",
      "0.5",
    ]
  );
  assert_eq!(descriptor, build(&from_json));
}
