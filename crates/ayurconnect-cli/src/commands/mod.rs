pub mod appointments;
pub mod booking;
pub mod calendar;
pub mod config;
pub mod doctors;
pub mod state;
pub mod user;

use ayurconnect_core::storage::data_dir;
use ayurconnect_core::{CoreError, Database, Store};
use chrono::Utc;
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the on-disk store as of the current time.
pub fn open_store() -> Result<Store<Database>, CoreError> {
    let store = Store::open_in(&data_dir()?, Utc::now())?;
    tracing::debug!(mode = ?store.mode(), "store opened");
    Ok(store)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
