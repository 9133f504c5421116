//! The messaging-engine capability boundary
//!
//! The engine is a black box: it owns cryptography, routing, and the wire
//! protocol. This module defines the two traits the session adapter drives
//! it through. [`Engine`] is one synchronous method per engine operation;
//! [`NotificationSink`] is the capability interface the engine calls back
//! into while processing pending work, one method per notification kind.
//!
//! All engine interaction happens on a single sequential timeline: the
//! engine handle is not safe for concurrent access, and the runtime
//! marshals every call onto the tick loop's task.

use std::time::Duration;

use crate::errors::EngineError;
use crate::types::{FriendHandle, MessageId, PeerAddress, PeerId, Presence, Timestamp};

// ----------------------------------------------------------------------------
// Engine Options
// ----------------------------------------------------------------------------

/// Transport configuration attempted at engine creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EngineOptions {
    /// Prefer dual-stack networking; disabled when falling back after a
    /// failed creation attempt.
    pub ipv6_enabled: bool,
    pub udp_enabled: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            ipv6_enabled: true,
            udp_enabled: true,
        }
    }
}

// ----------------------------------------------------------------------------
// User Status
// ----------------------------------------------------------------------------

/// The engine's tri-state self-reported availability.
///
/// Distinct from [`Presence`]: the engine signals connectivity separately,
/// so `Offline` has no representation here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Available,
    Away,
    Busy,
}

impl From<UserStatus> for Presence {
    fn from(status: UserStatus) -> Self {
        match status {
            UserStatus::Available => Presence::Online,
            UserStatus::Away => Presence::Away,
            UserStatus::Busy => Presence::Busy,
        }
    }
}

impl From<Presence> for UserStatus {
    fn from(presence: Presence) -> Self {
        match presence {
            Presence::Away => UserStatus::Away,
            Presence::Busy => UserStatus::Busy,
            // The engine has no offline self-status; connectivity is
            // signalled separately.
            Presence::Online | Presence::Offline => UserStatus::Available,
        }
    }
}

// ----------------------------------------------------------------------------
// Notification Sink
// ----------------------------------------------------------------------------

/// Receiver for the engine's asynchronous notifications.
///
/// The engine invokes these inline while [`Engine::process`] runs. Text
/// payloads arrive as raw bytes; decoding is the caller's concern.
/// Implementations must not block.
pub trait NotificationSink {
    fn on_friend_request(&mut self, peer_id: PeerId, greeting: &[u8]);
    fn on_message(&mut self, friend: FriendHandle, message: &[u8]);
    fn on_action(&mut self, friend: FriendHandle, action: &[u8]);
    fn on_name_change(&mut self, friend: FriendHandle, name: &[u8]);
    fn on_typing_change(&mut self, friend: FriendHandle, typing: bool);
    fn on_status_message(&mut self, friend: FriendHandle, message: &[u8]);
    fn on_user_status(&mut self, friend: FriendHandle, status: UserStatus);
    fn on_connection_status(&mut self, friend: FriendHandle, online: bool);
}

// ----------------------------------------------------------------------------
// Engine
// ----------------------------------------------------------------------------

/// One live connection to the peer-to-peer messaging engine.
///
/// Creation is the factory's job (see the session's constructor);
/// destruction is `Drop`. Fallible operations return a success/failure
/// indication inline — nothing panics or throws across the tick boundary.
pub trait Engine {
    /// The interval the engine recommends before its next `process` call.
    /// Varies per tick.
    fn recommended_interval(&self) -> Duration;

    /// Process pending network work. This is the single point where bounded
    /// blocking I/O may occur; notifications fire into `sink` as a side
    /// effect.
    fn process(&mut self, sink: &mut dyn NotificationSink);

    /// Whether the engine currently reaches the network.
    fn is_connected(&self) -> bool;

    /// The session's own sharable address.
    fn own_address(&self) -> PeerAddress;

    /// Largest frame the send primitives accept, in bytes.
    fn max_frame_len(&self) -> usize;

    /// Ask the engine to join the network through a known node.
    fn bootstrap(&mut self, host: &str, port: u16, peer_id: &PeerId)
        -> Result<(), EngineError>;

    /// Request a friendship, delivering `greeting` with the request.
    fn add_friend(
        &mut self,
        address: &PeerAddress,
        greeting: &[u8],
    ) -> Result<FriendHandle, EngineError>;

    /// Accept a pending friend request (no greeting round-trip).
    fn accept_friend(&mut self, peer_id: &PeerId) -> Result<FriendHandle, EngineError>;

    /// Remove a friend, invalidating its handle.
    fn remove_friend(&mut self, friend: FriendHandle) -> Result<(), EngineError>;

    /// Send one frame of text. The frame must fit `max_frame_len`.
    fn send_message(
        &mut self,
        friend: FriendHandle,
        message: &[u8],
    ) -> Result<MessageId, EngineError>;

    /// Send one action (emote) frame.
    fn send_action(
        &mut self,
        friend: FriendHandle,
        action: &[u8],
    ) -> Result<MessageId, EngineError>;

    fn set_typing(&mut self, friend: FriendHandle, typing: bool) -> Result<(), EngineError>;
    fn set_name(&mut self, name: &[u8]) -> Result<(), EngineError>;
    fn set_status_message(&mut self, message: &[u8]) -> Result<(), EngineError>;
    fn set_presence(&mut self, presence: Presence) -> Result<(), EngineError>;

    /// Handles of every friend the engine currently knows.
    fn friend_list(&self) -> Vec<FriendHandle>;

    fn friend_peer_id(&self, friend: FriendHandle) -> Result<PeerId, EngineError>;
    fn friend_name(&self, friend: FriendHandle) -> Option<String>;
    fn friend_status_message(&self, friend: FriendHandle) -> Option<String>;
    /// Last time the friend was seen online, when known.
    fn friend_last_seen(&self, friend: FriendHandle) -> Option<Timestamp>;
    fn friend_is_connected(&self, friend: FriendHandle) -> bool;

    /// Serialize the engine's full internal state to an opaque blob.
    fn serialize_state(&self) -> Vec<u8>;

    /// Restore internal state from a previously serialized blob.
    fn restore_state(&mut self, blob: &[u8]) -> Result<(), EngineError>;
}
