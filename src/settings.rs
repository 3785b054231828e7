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
use crate::error::ConfigurationError;
use crate::error::SettingsError;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Section selecting the active tool per category.
pub const COPY: &str = "Copy";
/// Section with acquisition-wide values such as the frame count.
pub const GENERAL: &str = "General";
/// Section mapping tool display names to executable paths.
pub const PATH: &str = "Path";

/// Options of one settings section, in document order.
///
/// Order matters: tool options are appended to command lines exactly in the
/// order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
  name: String,
  entries: Vec<(String, String)>,
}

impl Section {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn get(&self, option: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .find(|(key, _)| key == option)
      .map(|(_, value)| value.as_str())
  }

  /// Like [`Section::get`], but a missing option is a configuration error.
  pub fn require(&self, option: &str) -> Result<&str, ConfigurationError> {
    self
      .get(option)
      .ok_or_else(|| ConfigurationError::MissingOption {
        section: self.name.clone(),
        option: option.to_string(),
      })
  }

  /// Reads an option holding a non-negative whole number.
  pub fn require_u32(&self, option: &str) -> Result<u32, ConfigurationError> {
    let value = self.require(option)?;
    value
      .trim()
      .parse::<u32>()
      .map_err(|_| ConfigurationError::InvalidNumber {
        section: self.name.clone(),
        option: option.to_string(),
        value: value.to_string(),
      })
  }

  /// True when the option holds the literal string `True`.
  pub fn require_flag(&self, option: &str) -> Result<bool, ConfigurationError> {
    Ok(self.require(option)? == "True")
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .entries
      .iter()
      .map(|(key, value)| (key.as_str(), value.as_str()))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  fn set(&mut self, option: &str, value: &str) {
    match self.entries.iter_mut().find(|(key, _)| key == option) {
      Some((_, existing)) => *existing = value.to_string(),
      None => self.entries.push((option.to_string(), value.to_string())),
    }
  }
}

impl Serialize for Section {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (key, value) in &self.entries {
      map.serialize_entry(key, value)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for Section {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct SectionVisitor;

    impl<'de> Visitor<'de> for SectionVisitor {
      type Value = Section;

      fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a table of option names to string values")
      }

      fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Section, A::Error> {
        let mut section = Section::default();
        while let Some((key, value)) = access.next_entry::<String, String>()? {
          section.set(&key, &value);
        }
        Ok(section)
      }
    }

    deserializer.deserialize_map(SectionVisitor)
  }
}

/// Immutable snapshot of the TranSPHIRE settings.
///
/// Two levels: section name, then option name to string value. Builders
/// only ever borrow it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Settings {
  sections: BTreeMap<String, Section>,
}

impl<'de> Deserialize<'de> for Settings {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let mut sections = BTreeMap::<String, Section>::deserialize(deserializer)?;
    for (name, section) in sections.iter_mut() {
      section.name = name.clone();
    }
    Ok(Settings { sections })
  }
}

impl Settings {
  /// Reads a settings document. The format follows the file extension.
  pub fn read_file(path: &Path) -> Result<Self, SettingsError> {
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
      Some("json") => Ok(serde_json::from_str(&content)?),
      Some("toml") => Ok(toml::from_str(&content)?),
      _ => Err(SettingsError::UnsupportedFormat(path.to_path_buf())),
    }
  }

  pub fn from_json_str(content: &str) -> Result<Self, SettingsError> {
    Ok(serde_json::from_str(content)?)
  }

  /// Sets an option, creating the section on first use.
  pub fn set(&mut self, section: &str, option: &str, value: &str) -> &mut Self {
    self
      .sections
      .entry(section.to_string())
      .or_insert_with(|| Section {
        name: section.to_string(),
        entries: Vec::new(),
      })
      .set(option, value);
    self
  }

  pub fn section(&self, name: &str) -> Result<&Section, ConfigurationError> {
    self
      .sections
      .get(name)
      .ok_or_else(|| ConfigurationError::MissingSection(name.to_string()))
  }

  pub fn option(&self, section: &str, option: &str) -> Result<&str, ConfigurationError> {
    self.section(section)?.require(option)
  }

  /// Display name of the tool configured for a category (`Motion`, `Picking`).
  pub fn selected_tool(&self, category: &str) -> Result<&str, ConfigurationError> {
    self.option(COPY, category)
  }

  /// Executable path configured for a tool display name.
  pub fn binary_path(&self, tool: &str) -> Result<&str, ConfigurationError> {
    self.option(PATH, tool)
  }

  pub fn number_of_frames(&self) -> Result<u32, ConfigurationError> {
    self.section(GENERAL)?.require_u32("Number of frames")
  }
}
