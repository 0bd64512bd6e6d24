//! `dexsync-recon`: spreadsheet-to-species-file reconciliation engine.
//!
//! Pure engine crate: takes sheet text and a data directory, merges the rows
//! into the species files and returns what it found. No CLI or network
//! dependencies.

pub mod behaviour;
pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod grouper;
pub mod index;
pub mod keys;
pub mod merge;
pub mod record;
pub mod riding;
pub mod table;

pub use builder::{builder_for, AttributeBuilder};
pub use config::{DexRange, Domain, FetchConfig, SyncConfig};
pub use diagnostics::{Diagnostics, DiagnosticsSummary, FormRef};
pub use engine::{run, SyncMeta, SyncResult};
pub use error::ReconError;
pub use keys::{EntityKey, FormName};
pub use record::{AttributeBlock, EntityRecord, FormRecord};
