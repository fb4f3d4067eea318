//! Command handlers for the Meridian CLI.

pub mod ask;
pub mod classify;
pub mod ingest;
pub mod serve;
pub mod stats;

pub use ask::AskCommand;
pub use classify::ClassifyCommand;
pub use ingest::IngestCommand;
pub use serve::ServeCommand;
pub use stats::StatsCommand;

use clap::ValueEnum;
use meridian_agents::Domain;
use meridian_core::AppConfig;
use std::path::PathBuf;

/// A knowledge base addressed from the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseArg {
    Food,
    Clinical,
}

impl BaseArg {
    pub fn domain(self) -> Domain {
        match self {
            Self::Food => Domain::Food,
            Self::Clinical => Domain::Clinical,
        }
    }

    pub fn dir(self, config: &AppConfig) -> PathBuf {
        match self {
            Self::Food => config.food_index_dir(),
            Self::Clinical => config.clinical_index_dir(),
        }
    }
}
