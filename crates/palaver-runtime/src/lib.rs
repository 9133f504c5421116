//! Palaver Runtime
//!
//! Orchestration for the Palaver session adapter:
//! - [`Session`]: the lifecycle manager that owns the engine handle and
//!   drives the tick loop on a single sequential timeline
//! - [`SessionHandle`]: the clonable surface applications use to marshal
//!   calls onto that timeline
//! - Connectivity edge detection, notification-to-event translation, and
//!   atomic persistence of the engine's opaque state blob
//!
//! `palaver-core` provides the domain types and engine contracts; this
//! crate is where tokio lives.

pub mod session;
pub mod settings;
pub mod storage;
pub mod ticker;
pub mod translate;

pub use session::{Command, Session, SessionHandle, SessionState};
pub use settings::{BootstrapNode, SessionSettings};
pub use ticker::{ConnectivityWatch, Transition};
pub use translate::EventTranslator;

// Re-export core types for convenience
pub use palaver_core::{
    Engine, EngineError, EngineOptions, Event, FriendHandle, MessageChunker, MessageId,
    NotificationSink, PalaverError, PeerAddress, PeerId, Presence, Result, Timestamp, UserStatus,
};
