//! Glossary Updater Library
//!
//! This module exports the core components for testing and integration.

pub mod api;
pub mod backup;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod formats;
pub mod guard;
pub mod logging;
pub mod merge;
pub mod remote;
pub mod report;
pub mod terms;

pub use engine::{Engine, UpdateRequest};
pub use error::{EngineError, ErrorCode};
pub use merge::{MergeStats, MergeStrategy};
pub use terms::{GlossaryTerm, TermSet};
