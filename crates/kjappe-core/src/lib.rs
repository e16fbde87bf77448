//! kjappe-core — answer evaluation, date keys, local play state and statistics.
//!
//! This crate holds everything the daily quiz needs that is not rendering or
//! transport: the fuzzy answer evaluator, the canonical/legacy date-key
//! resolver, the key-value store abstraction with one-time legacy migration,
//! the play session that ties them together, and the aggregate statistics.

pub mod datekey;
pub mod error;
pub mod evaluator;
pub mod history;
pub mod model;
pub mod questions;
pub mod session;
pub mod share;
pub mod statistics;
pub mod store;
pub mod traits;

pub use datekey::{canonical_key, legacy_key_candidates, parse_canonical_key, DateKeys};
pub use error::{DateKeyError, SessionError, StoreError};
pub use evaluator::{is_correct, Evaluator, EvaluatorConfig, Verdict};
pub use history::{History, PlayRecord};
pub use session::Game;
pub use store::{FileStore, KeyValueStore, MemoryStore, Slot};
