//! Domain events produced by the session adapter
//!
//! Every engine notification, lifecycle transition, and operation outcome
//! surfaces as exactly one of these variants. The presentation layer
//! consumes them; nothing in this crate reacts to them.

use serde::{Deserialize, Serialize};

use crate::types::{FriendHandle, MessageId, PeerAddress, PeerId, Presence, Timestamp};

// ----------------------------------------------------------------------------
// Event
// ----------------------------------------------------------------------------

/// Events emitted toward the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// The session reached the network for the first time, or regained it.
    Connected,
    /// The session lost the network.
    Disconnected,
    /// The session's own sharable address, emitted once during startup.
    OwnAddress { address: PeerAddress },

    /// A friend became known, through acceptance, a request, or startup sync.
    FriendAdded {
        friend: FriendHandle,
        peer_id: PeerId,
    },
    /// A friend was removed; the handle is no longer valid.
    FriendRemoved { friend: FriendHandle },
    /// Someone asked to become a friend.
    FriendRequest { peer_id: PeerId, greeting: String },

    /// A text message arrived.
    MessageReceived { friend: FriendHandle, text: String },
    /// Outcome of one outbound frame; `receipt` is absent when the engine
    /// rejected the frame.
    MessageSendResult {
        friend: FriendHandle,
        echoed: String,
        receipt: Option<MessageId>,
    },
    /// An action (emote) message arrived.
    ActionReceived { friend: FriendHandle, text: String },
    /// Outcome of an outbound action.
    ActionSendResult {
        friend: FriendHandle,
        echoed: String,
        receipt: Option<MessageId>,
    },

    /// A friend's display name changed or became known.
    NameChanged { friend: FriendHandle, name: String },
    /// A friend's status message changed or became known.
    StatusMessageChanged {
        friend: FriendHandle,
        message: String,
    },
    /// A friend's presence changed.
    PresenceChanged {
        friend: FriendHandle,
        presence: Presence,
    },
    /// A friend started or stopped typing.
    TypingChanged { friend: FriendHandle, typing: bool },
    /// A friend's last-seen time became known or was refreshed.
    LastSeenChanged {
        friend: FriendHandle,
        last_seen: Timestamp,
    },

    /// The engine could not be created under any permitted configuration.
    StartupFailed { reason: String },
    /// The engine rejected a friendship operation for this peer.
    AddFriendFailed { peer_id: PeerId },
    RemoveFriendFailed { friend: FriendHandle },
    SetNameFailed { name: String },
    SetStatusMessageFailed { message: String },
    SetPresenceFailed { presence: Presence },
    SetTypingFailed { friend: FriendHandle, typing: bool },
}
