//! Palaver Core
//!
//! This crate provides the domain layer of the Palaver session adapter: the
//! fixed-width peer identifiers and their hex codec, the UTF-8-safe message
//! chunker, the domain event vocabulary, and the capability traits an engine
//! implementation must satisfy. It performs no I/O and holds no runtime
//! state; the orchestration lives in `palaver-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod chunking;
pub mod codec;
pub mod engine;
pub mod errors;
pub mod event;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use chunking::{MessageChunker, MessagePlan};
pub use engine::{Engine, EngineOptions, NotificationSink, UserStatus};
pub use errors::{EngineError, FormatError, PalaverError, Result};
pub use event::Event;
pub use types::{FriendHandle, MessageId, PeerAddress, PeerId, Presence, Timestamp};
