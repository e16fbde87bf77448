//! kjappe-client — configuration and quiz backends.
//!
//! Implements the `QuestionSource`, `SubmissionSink` and `SummarySource`
//! traits over the quiz HTTP API, and provides an in-memory backend for
//! tests and offline play.

pub mod api;
pub mod config;
pub mod error;
pub mod mock;

pub use api::ApiClient;
pub use config::{load_config, load_config_from, KjappeConfig, ServerConfig};
pub use error::ClientError;
pub use mock::MockBackend;
