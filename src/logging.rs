//! Tracing setup for the CLI
//!
//! Diagnostics go to a JSON log file and, human readable, to stderr so that stdout stays
//! reserved for query output. Filtering follows `RUST_LOG` and defaults to `info`.

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Flushes the log file when dropped; hold it for the life of the process
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

pub fn init_logging(log_path: &Path) -> Result<LoggingGuard, io::Error> {
    let (log_dir, log_file) = split_log_path(log_path)?;
    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn split_log_path(log_path: &Path) -> Result<(&Path, &Path), io::Error> {
    let file = log_path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log path has no file name: {}", log_path.display()),
        )
    })?;
    let dir = log_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((dir, Path::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/var/data/release-index.log", "/var/data", "release-index.log")]
    #[case("release-index.log", ".", "release-index.log")]
    fn split_log_path_returns_directory_and_file(
        #[case] input: &str,
        #[case] dir: &str,
        #[case] file: &str,
    ) {
        let (actual_dir, actual_file) = split_log_path(Path::new(input)).unwrap();

        assert_eq!(actual_dir, Path::new(dir));
        assert_eq!(actual_file, Path::new(file));
    }

    #[test]
    fn split_log_path_rejects_paths_without_a_file_name() {
        let result = split_log_path(Path::new("/"));

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }
}
