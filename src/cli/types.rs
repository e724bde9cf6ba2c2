//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kibitzer")]
#[command(about = "Kibitzer - chess analysis orchestrator", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .kibitzer/config.yaml and .kibitzer/local.yaml)
    #[arg(short, long, global = true, env = "KIBITZER_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the effective configuration
    Config,

    /// Validate a task submission payload
    Validate {
        /// JSON file holding one submission
        file: PathBuf,
    },

    /// Run recorded deliveries through the intake against an in-memory broker
    Replay {
        /// JSON-lines file of {queue, redelivered, body}
        file: PathBuf,

        /// Number of principal variations the scripted engine reports
        #[arg(long, default_value = "3")]
        multi_pv: u32,

        /// Deepest depth the scripted engine reaches
        #[arg(long, default_value = "12")]
        depth: u32,

        /// Make the broker negatively confirm every publication
        #[arg(long)]
        nack: bool,

        /// Skip the submission delay
        #[arg(long)]
        no_delay: bool,
    },
}
