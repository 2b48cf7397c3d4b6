//! fabspec library
//!
//! Normalizes free-text textile specifications into strictly typed
//! `SpecRecord`s and keeps them consistent while a user edits them.
//!
//! # Components (leaves first)
//! 1. `vocabulary` - fiber, weave and finishing code tables
//! 2. `disambiguator` - yarn count substring → warp/weft sides
//! 3. `extractors` - draft producers (rules, language model) and their contract
//! 4. `classifier` - weave code → category with fallback repair
//! 5. `session` / `validators` - form session, merge, validation
//!
//! `pipeline` wires them from the TOML bootstrap config.

pub mod classifier;
pub mod disambiguator;
pub mod extractors;
pub mod pipeline;
pub mod search;
pub mod session;
pub mod store;
pub mod types;
pub mod validators;
pub mod vocabulary;

pub use classifier::{ClassifyOutcome, Classifier};
pub use extractors::{ExtractionError, Extractor};
pub use pipeline::{Normalized, Pipeline, PipelineError};
pub use session::{FormSession, SessionError, SessionHandle, SessionState};
pub use types::SpecRecord;
pub use validators::{Deviation, RecordValidator, ValidationReport};
pub use vocabulary::{FiberScheme, Vocabulary};
