//! Core module - ambient infrastructure around the rules engine
//!
//! - [`EngineSettings`] - user preferences persisted as JSON
//! - [`init_tracing`] - log subscriber installation for the binary
//! - [`CoreError`] - settings and logging failures

pub mod error;
pub mod logging;
pub mod settings_persistence;

pub use error::{CoreError, CoreResult};
pub use logging::init_tracing;
pub use settings_persistence::{load_settings, save_settings, settings_path, EngineSettings};
