//! Agents and question routing for Meridian.
//!
//! - [`RetrievalAgent`] answers from a knowledge base (food security or
//!   clinical studies, see [`Domain`])
//! - [`WebAgent`] answers open-domain questions through a tool-using loop
//! - [`Classifier`] picks a [`Category`] for a question
//! - [`Orchestrator`] classifies each question and routes it to one of them

pub mod agent;
pub mod category;
pub mod classifier;
pub mod orchestrator;
pub mod retrieval;
pub mod web;

pub use agent::Agent;
pub use category::Category;
pub use classifier::Classifier;
pub use orchestrator::{Orchestrator, RoutedAnswer};
pub use retrieval::{Domain, RetrievalAgent};
pub use web::{MockSearch, SearchProvider, Tool, ToolRegistry, WebAgent};
