//! Command-line front end for the superbed uploader
//!
//! # Usage
//!
//! ## Upload
//! ```bash
//! superbed-upload upload cat.png dog.jpg --verbose
//! ```
//!
//! ## Credentials
//! ```bash
//! superbed-upload config set --token <TOKEN>
//! superbed-upload config set --username bob --password hunter2
//! superbed-upload config show
//! ```
//!
//! ## Debug receiver
//! ```bash
//! superbed-upload debug-server --port 3000
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use superbed_uploader::cli::{
    config::{ConfigSetArgs, run_config_set, run_config_show},
    debug_server::{DebugServerArgs, run_debug_server},
    upload::{UploadArgs, run_upload_mode},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "superbed-upload")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload images and print their URLs
    Upload {
        /// Image files to upload, in order
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Configuration file path
        #[arg(long)]
        config: Option<String>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Inspect or change stored credentials
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Print diagnostic traces POSTed by the uploader
    DebugServer {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the settings form with the stored values
    Show {
        /// Configuration file path
        #[arg(long)]
        config: Option<String>,
    },

    /// Store credentials; omitted fields keep their value
    Set {
        /// Paid account API token
        #[arg(long)]
        token: Option<String>,

        /// Free account username
        #[arg(long)]
        username: Option<String>,

        /// Free account password
        #[arg(long)]
        password: Option<String>,

        /// Configuration file path
        #[arg(long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            files,
            config,
            verbose,
        } => {
            run_upload_mode(UploadArgs {
                files,
                config,
                verbose,
            })
            .await
        }
        Commands::Config { action } => match action {
            ConfigCommands::Show { config } => run_config_show(config),
            ConfigCommands::Set {
                token,
                username,
                password,
                config,
            } => run_config_set(ConfigSetArgs {
                token,
                username,
                password,
                config,
            }),
        },
        Commands::DebugServer {
            host,
            port,
            verbose,
        } => {
            run_debug_server(DebugServerArgs {
                host,
                port,
                verbose,
            })
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_subcommand() {
        let cli = Cli::parse_from([
            "superbed-upload",
            "upload",
            "a.png",
            "b.jpg",
            "--config",
            "/tmp/c.toml",
            "--verbose",
        ]);

        match cli.command {
            Commands::Upload {
                files,
                config,
                verbose,
            } => {
                assert_eq!(files, vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]);
                assert_eq!(config, Some("/tmp/c.toml".to_string()));
                assert!(verbose);
            }
            _ => panic!("Expected upload subcommand"),
        }
    }

    #[test]
    fn test_upload_requires_files() {
        assert!(Cli::try_parse_from(["superbed-upload", "upload"]).is_err());
    }

    #[test]
    fn test_debug_server_default_values() {
        let cli = Cli::parse_from(["superbed-upload", "debug-server"]);

        match cli.command {
            Commands::DebugServer {
                host,
                port,
                verbose,
            } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 3000);
                assert!(!verbose);
            }
            _ => panic!("Expected debug-server subcommand"),
        }
    }

    #[test]
    fn test_config_set_options() {
        let cli = Cli::parse_from(["superbed-upload", "config", "set", "--token", "tok"]);

        match cli.command {
            Commands::Config {
                action:
                    ConfigCommands::Set {
                        token,
                        username,
                        password,
                        config,
                    },
            } => {
                assert_eq!(token, Some("tok".to_string()));
                assert!(username.is_none());
                assert!(password.is_none());
                assert!(config.is_none());
            }
            _ => panic!("Expected config set subcommand"),
        }
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["superbed-upload"]).is_err());
    }

    #[test]
    fn test_upload_rejects_server_options() {
        let result = Cli::try_parse_from(["superbed-upload", "upload", "a.png", "--port", "1"]);
        assert!(result.is_err());
    }
}
