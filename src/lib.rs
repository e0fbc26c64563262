//! Site Warden - moderation, dedup, and scheduled improvement pipeline
//!
//! Maintains generated site records in a shared persistent store:
//! - Denylist moderation gate on every content-mutating path
//! - Fingerprint-based dedup at creation (fail-open on store errors)
//! - Age-triggered improvement passes on a fixed milestone schedule
//!
//! # Example
//!
//! ```ignore
//! use site_warden::creation::SiteCreator;
//! use site_warden::moderation::DenylistClassifier;
//! use site_warden::store::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let creator = SiteCreator::new(store, DenylistClassifier::default());
//!     let outcome = creator.create("A page about gardening").await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod moderation;
pub mod fingerprint;
pub mod generator;
pub mod store;
pub mod dedup;
pub mod improve;
pub mod creation;
pub mod scheduler;
pub mod config;
pub mod cli;

// Re-export commonly used types for convenience
pub use types::{FileMap, SiteRecord};
pub use moderation::{ContentClassifier, DenylistClassifier, Verdict};
pub use store::{MemoryStore, RecordStore, RestStore, StoreError};
pub use dedup::DedupChecker;
pub use improve::{ImproveOutcome, Improver};
pub use creation::{CreateOutcome, SiteCreator};
pub use scheduler::{ImprovementScheduler, SchedulerConfig, TickReport};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - Site moderation and improvement pipeline", NAME, VERSION)
}
