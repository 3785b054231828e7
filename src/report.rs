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
use tokio::sync::mpsc;

/// One operator-facing error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
  pub job: String,
  pub message: String,
}

/// Sending half of the operator error log.
///
/// Fire-and-forget: nobody acknowledges a report, and a closed receiver
/// only costs the message.
#[derive(Debug, Clone)]
pub struct ErrorChannel {
  tx: mpsc::UnboundedSender<ErrorReport>,
}

impl ErrorChannel {
  pub fn new() -> (Self, mpsc::UnboundedReceiver<ErrorReport>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ErrorChannel { tx }, rx)
  }

  pub fn report(&self, job: &str, message: impl Into<String>) {
    let report = ErrorReport {
      job: job.to_string(),
      message: message.into(),
    };
    if let Err(mpsc::error::SendError(report)) = self.tx.send(report) {
      tracing::debug!(job = %report.job, "Error log closed, dropping report");
    }
  }
}

/// A named unit of work and the channel its failures go to.
#[derive(Debug, Clone)]
pub struct Job {
  name: String,
  errors: ErrorChannel,
}

impl Job {
  pub fn new(name: impl Into<String>, errors: ErrorChannel) -> Self {
    Job {
      name: name.into(),
      errors,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Logs the error and forwards its message to the operator error log.
  pub fn report<E: std::fmt::Display>(&self, error: &E) {
    let message = error.to_string();
    tracing::error!(job = %self.name, "{}", message);
    self.errors.report(&self.name, message);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_report_is_keyed_by_job() {
    let (errors, mut rx) = ErrorChannel::new();
    let job = Job::new("Motion_1", errors);

    job.report(&"disk full");

    assert_eq!(
      rx.try_recv().unwrap(),
      ErrorReport {
        job: "Motion_1".to_string(),
        message: "disk full".to_string(),
      }
    );
  }

  #[test]
  fn test_report_survives_closed_receiver() {
    let (errors, rx) = ErrorChannel::new();
    drop(rx);
    errors.report("Picking_1", "nobody listens");
  }
}
