//! CLI command implementations.

pub mod admin;
pub mod seed;

use rosella_app::store::MemoryStore;
use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Data file error.
    #[error("Data file error: {0}")]
    Store(#[from] rosella_app::store::StoreError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
}

/// Open the data file named by the flag or `ROSELLA_DATA_FILE`.
pub fn open_data_file(file: Option<&str>) -> Result<MemoryStore, CliError> {
    dotenvy::dotenv().ok();

    let path = match file {
        Some(path) => path.to_owned(),
        None => std::env::var("ROSELLA_DATA_FILE")
            .map_err(|_| CliError::MissingEnvVar("ROSELLA_DATA_FILE"))?,
    };
    Ok(MemoryStore::open(path)?)
}
