//! CLI command definitions
//!
//! Defines the clap commands for the petfriends CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run test scenarios (the built-in suite when no files are given)
    Run {
        /// YAML scenario files to run instead of the built-in suite
        files: Vec<PathBuf>,

        /// Only run scenarios with this name (repeatable)
        #[arg(long)]
        only: Vec<String>,

        /// Print every response body
        #[arg(long, short)]
        verbose: bool,
    },

    /// List the built-in scenarios
    Scenarios,

    /// Request a session key with the configured credentials
    Key,

    /// Pet management
    #[command(subcommand)]
    Pets(PetCommands),

    /// Show the configuration file location
    Config {
        /// Write a template configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[derive(Subcommand)]
pub enum PetCommands {
    /// List pets
    List {
        /// Only list your own pets
        #[arg(long)]
        mine: bool,
    },

    /// Create a pet
    Add {
        #[arg(long)]
        name: String,

        #[arg(long = "type")]
        animal_type: String,

        #[arg(long, allow_hyphen_values = true)]
        age: String,

        /// Photo to upload with the pet
        #[arg(long)]
        photo: Option<PathBuf>,
    },

    /// Update name, type and age of a pet
    Update {
        /// Pet ID
        id: String,

        #[arg(long)]
        name: String,

        #[arg(long = "type")]
        animal_type: String,

        #[arg(long, allow_hyphen_values = true)]
        age: String,
    },

    /// Replace the photo of a pet
    Photo {
        /// Pet ID
        id: String,

        /// Image file to upload
        path: PathBuf,
    },

    /// Delete a pet
    Delete {
        /// Pet ID
        id: String,
    },
}
