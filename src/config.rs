use std::path::PathBuf;

const DEFAULT_ADMIN_EMAIL: &str = "admin@caeduc.gt";
const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// Runtime configuration, read from the environment (and an optional `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the JSON collections, the session and uploads.
    pub data_dir: PathBuf,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    /// Builds the configuration from environment variables.
    ///
    /// The data directory is determined in the following order:
    /// 1. `AVALES_DATA_DIR` environment variable.
    /// 2. `~/.local/share/avales` (on Linux).
    /// 3. `./avales-data` (fallback).
    pub fn from_env() -> Config {
        let data_dir = std::env::var("AVALES_DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| {
            match dirs::data_local_dir() {
                Some(mut p) => {
                    p.push("avales");
                    p
                }
                None => PathBuf::from("avales-data"),
            }
        });

        Config {
            data_dir,
            admin_email: std::env::var("AVALES_ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string()),
            admin_password: std::env::var("AVALES_ADMIN_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string()),
        }
    }

    /// Configuration rooted at an explicit directory with the default credentials.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Config {
        Config {
            data_dir: data_dir.into(),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}
