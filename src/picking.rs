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
use crate::command::CommandLine;
use crate::command::path_arg;
use crate::error::ConfigurationError;
use crate::settings::Settings;
use crate::tool::PickingTool;
use crate::tool::ToolCapabilities;
use std::path::Path;

/// Builds the particle picking command for one micrograph.
///
/// Unlike motion correction, every configured option is passed on. An empty
/// value leaves the option as a bare flag, a multi-valued one such as
/// `--gpu "0 2"` becomes one argument per value.
pub fn picking_command(
  tool: PickingTool,
  settings: &Settings,
  input: &Path,
  output: &Path,
) -> Result<CommandDescriptor, ConfigurationError> {
  let section = tool.section(settings)?;

  let mut argv = vec![
    tool.binary(settings)?.to_string(),
    "-i".to_string(),
    path_arg(input),
    "-o".to_string(),
    path_arg(output),
  ];
  for (option, value) in section.iter() {
    argv.push(option.to_string());
    argv.extend(value.split_whitespace().map(str::to_string));
  }

  let stem = input
    .file_stem()
    .map(|stem| stem.to_string_lossy().into_owned())
    .unwrap_or_default();
  let gpu = tool.gpu_policy(section)?;

  Ok(
    CommandDescriptor::new(CommandLine::Argv(argv))
      .with_gpu(gpu.exclusive, gpu.devices)
      .with_validation_targets(tool.output_paths(output, &stem)),
  )
}
