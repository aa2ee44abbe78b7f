mod config;
pub mod database;

pub use config::{BookingConfig, Config, SeedConfig, StoreConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::StoreError;

/// Returns the data directory.
///
/// `AYURCONNECT_DATA_DIR` wins when set; otherwise `~/.config/ayurconnect[-dev]/`
/// based on AYURCONNECT_ENV (set it to `dev` for the development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let dir = match std::env::var_os("AYURCONNECT_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("AYURCONNECT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("ayurconnect-dev")
            } else {
                base_dir.join("ayurconnect")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
