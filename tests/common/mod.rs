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
#![allow(dead_code)]

use tokio::sync::mpsc::UnboundedReceiver;
use transphire::report::ErrorChannel;
use transphire::report::ErrorReport;
use transphire::report::Job;
use transphire::settings::Settings;

pub fn job(name: &str) -> (Job, UnboundedReceiver<ErrorReport>) {
  let (errors, rx) = ErrorChannel::new();
  (Job::new(name, errors), rx)
}

pub fn drain(rx: &mut UnboundedReceiver<ErrorReport>) -> Vec<ErrorReport> {
  let mut reports = Vec::new();
  while let Ok(report) = rx.try_recv() {
    reports.push(report);
  }
  reports
}

/// Settings for one of the MotionCor2 releases.
pub fn motion_cor2(version: &str) -> Settings {
  let mut settings = Settings::default();
  settings
    .set("Copy", "Motion", version)
    .set("General", "Number of frames", "50")
    .set("Path", version, "/opt/motioncor2/MotionCor2")
    .set("Path", "SumMovie v1.0.2", "/opt/summovie/summovie")
    .set(version, "-Patch", "5 5")
    .set(version, "-FmDose", "1.2")
    .set(version, "-PixSize", "1.14")
    .set(version, "-kV", "300")
    .set(version, "-Throw", "2")
    .set(version, "-Trunc", "3")
    .set(version, "-Bft", "")
    .set(version, "-Gpu", "0 1");
  if version == "MotionCor2 v1.1.0" {
    settings.set(version, "-GpuMemUsage", "0.5");
  }
  settings
}

pub fn unblur(dose_filter: bool, expert: bool) -> Settings {
  let version = "Unblur v1.0.2";
  let flag = |on: bool| if on { "True" } else { "False" };
  let mut settings = Settings::default();
  settings
    .set("Copy", "Motion", version)
    .set("General", "Number of frames", "40")
    .set("Path", version, "/opt/unblur/unblur")
    .set("Path", "SumMovie v1.0.2", "/opt/summovie/summovie")
    .set(version, "Pixel size of images (A)", "1.34")
    .set(version, "Throw", "1")
    .set(version, "Trunc", "2")
    .set(version, "Apply Dose filter?", flag(dose_filter))
    .set(version, "Exposure per frame (e/A^2)", "1.5")
    .set(version, "Acceleration voltage (kV)", "300")
    .set(version, "Pre-exposure amount(e/A^2)", "0.2")
    .set(version, "Set Expert Options?", flag(expert))
    .set(version, "Minimum shift for initial search (Angstroms)", "2.0")
    .set(version, "Outer radius shift limit (Angstroms)", "200.0")
    .set(version, "B-factor to apply to images (A^2)", "1500")
    .set(version, "Half-width of central vertical line of Fourier mask", "1")
    .set(version, "Half-width of central horizontal line of Fourier mask", "1")
    .set(version, "Termination shift threshold", "0.1")
    .set(version, "Maximum number of iterations", "20")
    .set(version, "Restore Noise Power", "True")
    .set(version, "Verbose Output?", "False");
  settings
}

pub fn cryolo(picking: &str) -> Settings {
  let version = "crYOLO v1.0.0";
  let mut settings = Settings::default();
  settings
    .set("Copy", "Picking", picking)
    .set("Path", version, "/opt/cryolo/cryolo_predict.py")
    .set(version, "--conf", "config.json")
    .set(version, "--weights", "model.h5")
    .set(version, "--gpu", "0 2")
    .set(version, "--filament", "");
  settings
}
