//! `biodex-dedup` — Operator deduplication and consolidation engine.
//!
//! Pure engine crate: receives pre-loaded records, returns the canonical
//! operator table and the raw-id → canonical-id mapping. No CLI or file
//! I/O dependencies.

pub mod classify;
pub mod config;
pub mod consolidate;
pub mod crossref;
pub mod engine;
pub mod error;
pub mod group;
pub mod model;
pub mod normalize;
pub mod summary;

pub use classify::GenericClassifier;
pub use config::{DedupConfig, TieBreak};
pub use engine::{run, DedupInput};
pub use error::DedupError;
pub use model::{CanonicalOperator, DedupResult, MappingRow, OperatorRecord, PlantRecord};
pub use normalize::Normalizer;
