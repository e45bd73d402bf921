// Grade Calculator - Core Library
// Exposes the grading core and persistence for the TUI binary and tests

pub mod grade;      // Grade Classifier - marks -> letter + points
pub mod subject;    // Subject rows + edit policy
pub mod aggregate;  // SGPA / percentage / total credits
pub mod session;    // Subject list lifecycle + load/persist cycle
pub mod store;      // Session Store - SQLite and in-memory backends
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use grade::{classify, Grade, Letter, ScaleBand, GRADING_SCALE};
pub use subject::{
    format_number, parse_credits, parse_marks, EditOutcome, Subject, DEFAULT_CREDITS,
};
pub use aggregate::{aggregate, Summary};
pub use session::{EnterAction, Session};
pub use store::{
    decode_subjects, encode_subjects, setup_database,
    MemoryStore, SessionStore, SqliteStore, StoreError, STORAGE_KEY,
};
pub use config::{AppConfig, ConfigError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
