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
use crate::cli::Cli;
use anyhow::Context;
use anyhow::Result;
use figment::Figment;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Serialized;
use figment::providers::Toml;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

// --- Default Values ---
fn default_job() -> String {
  "transphire".to_string()
}

fn default_picking_folder() -> PathBuf {
  PathBuf::from(".")
}

/// Runtime configuration of the `transphire` binary.
///
/// Resolved from, in increasing priority: built-in defaults, the config
/// file, `TRANSPHIRE_*` environment variables and command line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
  /// Settings document with the tool selection and tool options.
  pub settings: Option<PathBuf>,

  /// Job name used to key error reports.
  #[serde(default = "default_job")]
  pub job: String,

  /// Folder crYOLO writes its box files to.
  #[serde(default = "default_picking_folder")]
  pub picking_folder: PathBuf,

  /// File that collects operator-facing error reports. Stderr if unset.
  pub error_log: Option<PathBuf>,
}

impl Default for AppConfig {
  fn default() -> Self {
    AppConfig {
      settings: None,
      job: default_job(),
      picking_folder: default_picking_folder(),
      error_log: None,
    }
  }
}

/// Command line values that win over every other source when given.
#[derive(Debug, Default, Serialize)]
struct Overrides {
  #[serde(skip_serializing_if = "Option::is_none")]
  settings: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  job: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  picking_folder: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  error_log: Option<PathBuf>,
}

impl AppConfig {
  pub fn resolve(config_file: &Path, cli: &Cli) -> Result<Self> {
    let overrides = Overrides {
      settings: cli.settings.clone(),
      job: cli.job.clone(),
      picking_folder: cli.picking_folder.clone(),
      error_log: cli.error_log.clone(),
    };

    let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
      .merge(Toml::file(config_file))
      .merge(Env::prefixed("TRANSPHIRE_"))
      .merge(Serialized::defaults(overrides))
      .extract()
      .with_context(|| format!("Failed to resolve configuration from {}", config_file.display()))?;

    tracing::debug!(?config, "Resolved configuration");
    Ok(config)
  }

  pub fn settings_path(&self) -> Result<&Path> {
    self.settings.as_deref().context(
      "No settings file given. Use --settings, TRANSPHIRE_SETTINGS or `settings` in the config file.",
    )
  }
}
