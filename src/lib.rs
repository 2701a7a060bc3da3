//! # srdservice
//!
//! Balanced combat encounter generation for a tabletop-RPG assistant, backed by
//! SRD reference data loaded from JSON files.
//!
//! ## Architecture Overview
//!
//! The crate is split into two areas:
//!
//! - **Generation**: the encounter pipeline. A party's levels and a difficulty
//!   tier resolve to an XP budget, monsters are drawn from a catalog until the
//!   budget is met (or the attempt cap is hit), and the raw XP is scaled by a
//!   count-based multiplier.
//! - **SRD**: an explicitly constructed repository over the reference data
//!   files, offering section access, name lookup, search and health reporting.
//!
//! Randomness is always passed in by the caller. Nothing in this crate keeps
//! global state, so every call is independent and reproducible given the same
//! random source.

pub mod generation;
pub mod srd;

pub use generation::*;
pub use srd::*;

/// Core error type for srdservice.
#[derive(thiserror::Error, Debug)]
pub enum SrdError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The party description cannot produce an encounter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The monster catalog cannot be sampled
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Strict difficulty parsing rejected a tier name
    #[error("Unknown difficulty tier: {0}")]
    InvalidDifficulty(String),

    /// Unknown SRD section name
    #[error("Unknown SRD section: {0}")]
    UnknownSection(String),

    /// A reference data file could not be read or parsed
    #[error("Failed to load {path}: {message}")]
    DataFile { path: String, message: String },

    /// Reference data has not been loaded
    #[error("SRD not loaded")]
    NotLoaded,

    /// Lookup by name found nothing
    #[error("{section} entry not found: {name}")]
    NotFound { section: String, name: String },
}

/// Result type used throughout the srdservice codebase.
pub type SrdResult<T> = Result<T, SrdError>;

/// Version information for the service.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service configuration constants.
pub mod config {
    /// Maximum number of monster draws per encounter. Guarantees termination
    /// for zero-XP catalogs and unreachable budgets.
    pub const MAX_SELECTION_ATTEMPTS: u32 = 100;

    /// Lowest level covered by the XP threshold table
    pub const MIN_TABLE_LEVEL: u32 = 1;

    /// Highest level covered by the XP threshold table
    pub const MAX_TABLE_LEVEL: u32 = 10;

    /// Default directory holding the SRD JSON files
    pub const DEFAULT_SRD_PATH: &str = "./srd";

    /// Environment variable overriding the SRD directory
    pub const SRD_BASE_PATH_ENV: &str = "SRD_BASE_PATH";
}
