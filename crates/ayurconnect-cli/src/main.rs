use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ayurconnect-cli", version, about = "AyurConnect CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse practitioners
    Doctors {
        #[command(subcommand)]
        action: commands::doctors::DoctorsAction,
    },
    /// Hold, confirm or abandon a slot
    Booking {
        #[command(subcommand)]
        action: commands::booking::BookingAction,
    },
    /// List, cancel and reschedule appointments
    Appointments {
        #[command(subcommand)]
        action: commands::appointments::AppointmentsAction,
    },
    /// Doctor availability calendar
    Calendar {
        #[command(subcommand)]
        action: commands::calendar::CalendarAction,
    },
    /// Switch between patient and doctor
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Inspect or reset the stored state
    State {
        #[command(subcommand)]
        action: commands::state::StateAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("AYURCONNECT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Doctors { action } => commands::doctors::run(action),
        Commands::Booking { action } => commands::booking::run(action),
        Commands::Appointments { action } => commands::appointments::run(action),
        Commands::Calendar { action } => commands::calendar::run(action),
        Commands::User { action } => commands::user::run(action),
        Commands::State { action } => commands::state::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "ayurconnect-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
