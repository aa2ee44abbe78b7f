use chrono::Utc;
use clap::Subcommand;

use super::{open_store, print_json, CmdResult};

#[derive(Subcommand)]
pub enum StateAction {
    /// Print the whole stored state as JSON
    Show,
    /// Discard everything and reseed
    Reset,
}

pub fn run(action: StateAction) -> CmdResult {
    let mut store = open_store()?;
    match action {
        StateAction::Show => print_json(store.state())?,
        StateAction::Reset => {
            store.reset(Utc::now());
            let state = store.state();
            println!(
                "state reset: {} doctors, {} slots",
                state.doctors.len(),
                state.slots.len()
            );
        }
    }
    Ok(())
}
