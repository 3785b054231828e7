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
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

/// How a built command has to be started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum CommandLine {
  /// Program followed by its arguments, executed directly.
  Argv(Vec<String>),

  /// A full shell line (pipes, `;` chaining), executed with `sh -c`.
  Shell(String),
}

impl CommandLine {
  pub fn is_shell(&self) -> bool {
    matches!(self, CommandLine::Shell(_))
  }

  /// The executable, for logs and error messages.
  pub fn program(&self) -> &str {
    match self {
      CommandLine::Argv(argv) => argv.first().map(String::as_str).unwrap_or(""),
      CommandLine::Shell(_) => "sh",
    }
  }
}

impl fmt::Display for CommandLine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CommandLine::Argv(argv) => f.write_str(&argv.join(" ")),
      CommandLine::Shell(line) => f.write_str(line),
    }
  }
}

/// Everything the execution layer needs to run one job.
///
/// Produced fresh per file. The builder only declares the GPU requirement;
/// the dispatcher is the one enforcing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
  pub command: CommandLine,

  /// Rendered command line, identical to `command.to_string()`.
  pub command_line: String,

  /// The listed GPUs must not be shared with another job while this runs.
  pub exclusive_gpu: bool,

  /// GPU device identifiers, in configuration order.
  #[serde(default)]
  pub gpu_indices: Vec<String>,

  pub run_in_shell: bool,

  /// Files whose existence after the run proves the job succeeded.
  #[serde(default)]
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub validation_targets: Vec<PathBuf>,
}

impl CommandDescriptor {
  pub fn new(command: CommandLine) -> Self {
    CommandDescriptor {
      command_line: command.to_string(),
      run_in_shell: command.is_shell(),
      command,
      exclusive_gpu: false,
      gpu_indices: Vec::new(),
      validation_targets: Vec::new(),
    }
  }

  pub fn with_gpu(mut self, exclusive: bool, indices: Vec<String>) -> Self {
    self.exclusive_gpu = exclusive;
    self.gpu_indices = indices;
    self
  }

  pub fn with_validation_targets(mut self, targets: Vec<PathBuf>) -> Self {
    self.validation_targets = targets;
    self
  }
}

/// Renders a path the way it is spliced into a command line.
pub(crate) fn path_arg(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}

/// `echo "<answers>" | <program>`: feeds the answers of an interactive
/// tool through its standard input, one per line.
///
/// `"`, `$`, `` ` `` and `\` in an answer are escaped so the shell passes
/// them on literally. An `echo` that expands escape sequences (dash) still
/// rewrites a backslash followed by a letter, so answers must not rely on
/// those.
pub(crate) fn piped_answers(answers: &[String], program: &str) -> String {
  let lines: Vec<String> = answers.iter().map(|answer| double_quoted(answer)).collect();
  format!("echo \"{}\" | {}", lines.join("\n"), program)
}

fn double_quoted(answer: &str) -> String {
  let mut escaped = String::with_capacity(answer.len());
  for c in answer.chars() {
    if matches!(c, '"' | '$' | '`' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_descriptor_mirrors_command_kind() {
    let argv = CommandDescriptor::new(CommandLine::Argv(vec![
      "/opt/motioncor2".to_string(),
      "-InMrc".to_string(),
      "movie.mrc".to_string(),
    ]));
    assert!(!argv.run_in_shell);
    assert_eq!(argv.command_line, "/opt/motioncor2 -InMrc movie.mrc");
    assert_eq!(argv.command.program(), "/opt/motioncor2");

    let shell = CommandDescriptor::new(CommandLine::Shell("echo a | b".to_string()));
    assert!(shell.run_in_shell);
    assert_eq!(shell.command_line, "echo a | b");
  }

  #[test]
  fn test_piped_answers_one_per_line() {
    let answers = vec!["movie.mrc".to_string(), "40".to_string()];
    assert_eq!(
      piped_answers(&answers, "/opt/summovie"),
      "echo \"movie.mrc\n40\" | /opt/summovie"
    );
  }

  #[test]
  fn test_piped_answers_escape_shell_characters() {
    let answers = vec![
      "/data/$RUN/movie \"a\".mrc".to_string(),
      "`date`".to_string(),
    ];
    let line = piped_answers(&answers, "cat");
    assert_eq!(
      line,
      "echo \"/data/\\$RUN/movie \\\"a\\\".mrc\n\\`date\\`\" | cat"
    );

    let output = std::process::Command::new("sh")
      .arg("-c")
      .arg(&line)
      .env_remove("RUN")
      .output()
      .unwrap();
    assert!(output.status.success());
    assert_eq!(
      String::from_utf8(output.stdout).unwrap(),
      "/data/$RUN/movie \"a\".mrc\n`date`\n"
    );
  }
}
