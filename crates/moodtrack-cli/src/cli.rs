//! Command-line interface definition

use clap::{Parser, Subcommand};
use moodtrack_core::StoreBackend;

#[derive(Parser)]
#[command(name = "moodtrack")]
#[command(version)]
#[command(about = "Track your daily mood, or review your patients' moods", long_about = None)]
pub struct Cli {
    /// Base URL of the moodtrack API (overrides the config file)
    #[arg(long, global = true, env = "MOODTRACK_API_URL")]
    pub api_url: Option<String>,

    /// Where the session is kept: file, keyring or memory (overrides the config file)
    #[arg(long, global = true)]
    pub store: Option<StoreBackend>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and remember the session
    Login {
        /// Account email (defaults to the last one used)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show who is signed in and whether the server still accepts the session
    Whoami,

    /// Check that the API is reachable
    Health,

    /// Show your mood history and today's entry
    Moods,

    /// Record, change or delete today's mood
    Mood {
        #[command(subcommand)]
        action: MoodAction,
    },

    /// List assigned and unassigned patients (doctors only)
    Patients,

    /// Take a patient under your care (doctors only)
    Assign {
        /// Patient ID
        patient_id: String,
    },

    /// Release a patient (doctors only)
    Unassign {
        /// Patient ID
        patient_id: String,
    },

    /// Show a patient's mood history and statistics (doctors only)
    PatientMoods {
        /// Patient ID
        patient_id: String,
    },
}

#[derive(Subcommand)]
pub enum MoodAction {
    /// Record today's mood
    Add {
        /// Rating, usually 1 (worst) to 10 (best)
        rate: u8,
    },

    /// Change today's mood
    Update {
        /// Rating, usually 1 (worst) to 10 (best)
        rate: u8,
    },

    /// Delete today's mood
    Remove,
}
