use ayurconnect_core::booking::format_countdown;
use ayurconnect_core::{BookingError, BookingSession, Countdown};
use chrono::{Duration, Utc};
use clap::Subcommand;
use serde_json::json;

use super::{open_store, print_json, CmdResult};

#[derive(Subcommand)]
pub enum BookingAction {
    /// Hold a slot while you confirm
    Start {
        /// Slot ID
        slot: String,
    },
    /// Show time left on a hold
    Status {
        /// Slot ID
        slot: String,
    },
    /// Follow a hold until it runs out or is confirmed elsewhere
    Watch {
        /// Slot ID
        slot: String,
    },
    /// Confirm a held slot with the code sent to you
    Confirm {
        /// Slot ID
        slot: String,
        /// Confirmation code
        #[arg(long)]
        code: String,
    },
    /// Give up a hold
    Abandon {
        /// Slot ID
        slot: String,
    },
}

pub fn run(action: BookingAction) -> CmdResult {
    let mut store = open_store()?;
    let now = Utc::now();

    match action {
        BookingAction::Start { slot } => {
            let session = BookingSession::start(&mut store, &slot, now)?;
            print_json(&json!({
                "session": session,
                "remaining": format_countdown(session.remaining(now)),
            }))?;
        }
        BookingAction::Status { slot } => {
            let countdown = BookingSession::poll(&mut store, &slot, now)?;
            print_json(&json!({
                "slot": slot,
                "remaining": display(&countdown),
                "countdown": countdown,
            }))?;
        }
        BookingAction::Watch { slot } => {
            drop(store);
            watch(&slot)?;
        }
        BookingAction::Confirm { slot, code } => {
            let session = BookingSession::resume(&store, &slot, now)?;
            let appointment = session.confirm(&mut store, &code, now)?;
            print_json(&appointment)?;
        }
        BookingAction::Abandon { slot } => {
            let session = BookingSession::resume(&store, &slot, now)?;
            session.abandon(&mut store);
            println!("hold released: {slot}");
        }
    }
    Ok(())
}

fn display(countdown: &Countdown) -> String {
    match countdown {
        Countdown::Remaining { remaining } => format_countdown(*remaining),
        Countdown::Expired { .. } => format_countdown(Duration::zero()),
    }
}

/// Print the countdown every `booking.tick_secs` until the hold ends.
///
/// The store is reopened on each tick so a confirm or abandon from another
/// process is seen and never overwritten.
fn watch(slot: &str) -> CmdResult {
    loop {
        let mut store = open_store()?;
        let interval = store.config().booking.tick_interval();
        match BookingSession::poll(&mut store, slot, Utc::now()) {
            Ok(countdown @ Countdown::Remaining { .. }) => println!("{}", display(&countdown)),
            Ok(countdown @ Countdown::Expired { .. }) => {
                print_json(&countdown)?;
                return Ok(());
            }
            Err(BookingError::SlotUnavailable { .. }) => {
                println!("hold ended: {slot}");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
        drop(store);
        std::thread::sleep(interval);
    }
}
