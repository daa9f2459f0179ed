//! Command-line front end
//!
//! Each subcommand of the `superbed-upload` binary lives in its own module;
//! settings loading and logging setup are shared here.

pub mod config;
pub mod debug_server;
pub mod upload;

use crate::{Settings, config::ConfigLoader};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// File holding both settings and the stored uploader configuration
///
/// Priority: `--config`, then `SUPERBED_CONFIG`, then the platform default.
/// The file does not need to exist yet.
pub fn config_file_path(explicit: Option<&str>) -> Option<PathBuf> {
    explicit
        .map(PathBuf::from)
        .or_else(|| std::env::var("SUPERBED_CONFIG").ok().map(PathBuf::from))
        .or_else(ConfigLoader::default_config_path)
}

/// Load settings, falling back to defaults when the file is unusable
///
/// Runs before logging is initialised, so problems go to stderr directly.
pub fn load_settings(explicit: Option<&str>) -> Settings {
    let config_path = match explicit {
        Some(path) => Some(PathBuf::from(path)),
        None => ConfigLoader::get_config_path(),
    };

    ConfigLoader::new()
        .load(config_path.as_deref())
        .unwrap_or_else(|e| {
            eprintln!(
                "Warning: Failed to load configuration: {}. Using defaults.",
                e
            );
            Settings::default()
        })
}

/// Log filter precedence: `--verbose`, then `RUST_LOG`, then `logging.level`
pub fn build_env_filter(verbose: bool, level: &str) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    }
}

/// Install the global subscriber, logging to stderr
pub fn init_logging(settings: &Settings, verbose: bool) {
    let env_filter = build_env_filter(verbose || settings.logging.verbose, &settings.logging.level);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    static RUST_LOG_MUTEX: Mutex<()> = Mutex::new(());

    fn with_rust_log<F: FnOnce()>(value: Option<&str>, f: F) {
        let _lock = RUST_LOG_MUTEX.lock().unwrap();
        let original = std::env::var("RUST_LOG").ok();
        unsafe {
            match value {
                Some(v) => std::env::set_var("RUST_LOG", v),
                None => std::env::remove_var("RUST_LOG"),
            }
        }

        f();

        unsafe {
            match original {
                Some(v) => std::env::set_var("RUST_LOG", v),
                None => std::env::remove_var("RUST_LOG"),
            }
        }
    }

    #[test]
    fn test_logging_level_from_config_is_respected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[logging]\nlevel = \"error\"").unwrap();
        temp_file.flush().unwrap();

        let settings = load_settings(temp_file.path().to_str());
        assert_eq!(settings.logging.level, "error");

        with_rust_log(None, || {
            let filter = format!("{:?}", build_env_filter(false, &settings.logging.level));
            assert!(filter.to_lowercase().contains("error"), "got: {}", filter);
        });
    }

    #[test]
    fn test_rust_log_env_overrides_config() {
        with_rust_log(Some("warn"), || {
            let filter = format!("{:?}", build_env_filter(false, "error"));
            assert!(filter.to_lowercase().contains("warn"), "got: {}", filter);
        });
    }

    #[test]
    fn test_verbose_flag_takes_highest_precedence() {
        with_rust_log(Some("warn"), || {
            let filter = format!("{:?}", build_env_filter(true, "error"));
            assert!(filter.to_lowercase().contains("debug"), "got: {}", filter);
        });
    }

    #[test]
    fn test_unreadable_config_falls_back_to_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not toml [").unwrap();
        temp_file.flush().unwrap();

        let settings = load_settings(temp_file.path().to_str());
        assert_eq!(settings.network.api_url, "https://api.superbed.cn");
    }

    #[test]
    fn test_explicit_config_path_wins() {
        assert_eq!(
            config_file_path(Some("/tmp/superbed.toml")),
            Some(PathBuf::from("/tmp/superbed.toml"))
        );
    }
}
