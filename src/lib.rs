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

//! # TranSPHIRE
//!
//! `transphire` turns a settings snapshot into the command lines of the
//! external programs used for on-the-fly cryo-EM processing: MotionCor2 and
//! Unblur for motion correction, SumMovie for frame summation, and crYOLO
//! for particle picking.
//!
//! ## Core Modules
//!
//! * [`settings`]: The two-level, order-preserving settings snapshot.
//! * [`tool`]: The closed set of supported tool versions and their
//!   [`tool::ToolCapabilities`].
//! * [`motion`]: MotionCor2, Unblur and SumMovie command lines and the
//!   frame range to sum.
//! * [`picking`]: crYOLO command lines.
//! * [`outputs`]: Predicts the files a tool will write.
//! * [`builder`]: `CommandBuilder`, the entry point that reports
//!   configuration errors on a job's error channel.
//! * [`command`]: The `CommandDescriptor` handed to the execution layer.
//! * [`execute`]: Runs descriptors as subprocesses, with exclusive GPU
//!   reservation.
//! * [`report`]: The fire-and-forget operator error channel.
//! * [`cli`], [`config`], [`logging`]: Plumbing for the `transphire` binary.
//! * [`error`]: Defines the custom error types for the library.

pub mod builder;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod execute;
pub mod logging;
pub mod motion;
pub mod outputs;
pub mod picking;
pub mod report;
pub mod settings;
pub mod tool;
