//! Error types for the Palaver session adapter
//!
//! A unified [`PalaverError`] wraps the specific failure families (identifier
//! marshalling, engine calls, storage I/O) so the runtime can consume every
//! fallible operation through one `Result` alias.

use crate::types::FriendHandle;

// ----------------------------------------------------------------------------
// Format Errors
// ----------------------------------------------------------------------------

/// Failures while marshalling identifiers between hex text and wire bytes.
///
/// These are rejected before any value reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("input is not valid hexadecimal")]
    InvalidHex,

    #[error("address checksum mismatch")]
    Checksum,
}

// ----------------------------------------------------------------------------
// Engine Errors
// ----------------------------------------------------------------------------

/// Failures reported by the messaging engine.
///
/// The engine is a black box; a rejected call carries only the operation
/// name, mirroring the success/failure indication its primitives return.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("engine could not be created: {reason}")]
    Construction { reason: String },

    #[error("engine rejected {operation}")]
    Rejected { operation: &'static str },

    #[error("unknown friend handle {friend}")]
    UnknownFriend { friend: FriendHandle },

    #[error("saved state rejected: {reason}")]
    CorruptState { reason: String },
}

// ----------------------------------------------------------------------------
// Unified Error Type
// ----------------------------------------------------------------------------

/// Error type spanning the whole session adapter.
#[derive(Debug, thiserror::Error)]
pub enum PalaverError {
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("session is not running")]
    NotRunning,
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type Result<T> = std::result::Result<T, PalaverError>;
