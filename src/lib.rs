// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod auth;
pub mod config;
pub mod dedup;
pub mod extract;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod prefilter;
pub mod scheduler;
pub mod sources;
pub mod store;
pub mod submit;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::Settings;
pub use crate::model::{Content, ContentStatus, CredibilityLevel, Source, SourceKind};
pub use crate::store::Store;
