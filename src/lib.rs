//! saydone - run a shell command and get notified when it is done.
//!
//! This library wraps a command and:
//! - Runs it to completion, capturing combined stdout and stderr
//! - Sends the output to every configured channel (HipChat, Slack, email)
//! - Echoes the output unchanged on stdout
//!
//! # Example
//!
//! ```no_run
//! use saydone::config::NotificationConfig;
//! use saydone::dispatcher::{compose_message, Dispatcher};
//! use saydone::notify::ConsoleOutput;
//! use saydone::runner::{CommandRunner, Invocation};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let config = NotificationConfig {
//!         email: Some("ops@example.com".to_string()),
//!         sendmail: "sendmail".into(),
//!         ..Default::default()
//!     };
//!     let dispatcher = Dispatcher::from_config(&config).unwrap();
//!     let words = vec!["make".to_string(), "release".to_string()];
//!     let invocation = Invocation::from_args(&words).unwrap();
//!     let result = CommandRunner::default().run(&invocation).await.unwrap();
//!     let report = dispatcher
//!         .dispatch(&compose_message("build-box", &result), &ConsoleOutput::default())
//!         .await;
//!     println!("Notified {} channel(s)", report.delivered.len());
//! }
//! ```

pub mod app;
pub mod config;
pub mod dispatcher;
pub mod logging;
pub mod notify;
pub mod runner;
pub mod types;

pub use config::{Config, NotificationConfig};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use runner::{CommandRunner, Invocation};
pub use types::{Channel, CommandOutput, Completion, Result, SaydoneError};
