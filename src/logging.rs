//! Logging setup.
//!
//! The subscriber is built explicitly and installed as the default for the
//! current thread only; dropping the returned guard uninstalls it.

use crate::types::Result;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer};

/// Open `path` for appending, creating it if needed.
pub fn open_log_file(path: &Path) -> Result<File> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(file)
}

/// Build a subscriber that records diagnostics to `log_file`.
///
/// Without `verbose` nothing is logged to stderr: user-facing notices come
/// from `ConsoleOutput`, and echoing log events there would repeat them.
pub fn build_subscriber(verbose: bool, log_file: Option<File>) -> impl Subscriber + Send + Sync {
    let console = verbose.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .with_filter(EnvFilter::new("saydone=debug,warn"))
    });

    let file_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let file = log_file.map(|f| {
        fmt::layer()
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
            .with_writer(Mutex::new(f))
            .with_filter(file_level)
    });

    tracing_subscriber::registry().with(console).with(file)
}

/// Install the subscriber for the current thread.
pub fn init(verbose: bool, log_file: Option<File>) -> DefaultGuard {
    tracing::subscriber::set_default(build_subscriber(verbose, log_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_open_log_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saydone.log");
        fs::write(&path, "earlier run\n").unwrap();

        let file = open_log_file(&path).unwrap();
        let subscriber = build_subscriber(false, Some(file));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("command finished");
            tracing::debug!("not recorded at info");
        });

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("earlier run\n"));
        assert!(content.contains("command finished"));
        assert!(!content.contains("not recorded"));
    }

    #[test]
    fn test_open_log_file_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("saydone.log");
        assert!(open_log_file(&path).is_err());
    }

    #[test]
    fn test_guard_scopes_subscriber() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scoped.log");
        {
            let _guard = init(true, Some(open_log_file(&path).unwrap()));
            tracing::debug!("inside");
        }
        tracing::info!("outside");

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("inside"));
        assert!(!content.contains("outside"));
    }
}
