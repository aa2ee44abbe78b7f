use ayurconnect_core::{Action, BookingError, User};
use clap::Subcommand;

use super::{open_store, print_json, CmdResult};

#[derive(Subcommand)]
pub enum UserAction {
    /// Act as the default patient
    Patient,
    /// Act as a doctor
    Doctor {
        /// Doctor ID; defaults to the first doctor
        id: Option<String>,
    },
    /// Print the current user
    Show,
}

pub fn run(action: UserAction) -> CmdResult {
    let mut store = open_store()?;

    match action {
        UserAction::Patient => {
            store.dispatch(Action::SetUser(User::patient()))?;
        }
        UserAction::Doctor { id } => {
            let state = store.state();
            let doctor = match &id {
                Some(id) => state.doctor(id),
                None => state.doctors.first(),
            }
            .ok_or_else(|| BookingError::DoctorNotFound(id.unwrap_or_default()))?;
            let user = User::doctor(doctor.id.clone(), doctor.name.clone());
            store.dispatch(Action::SetUser(user))?;
        }
        UserAction::Show => {}
    }
    print_json(&store.state().current_user)
}
