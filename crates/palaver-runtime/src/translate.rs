//! Engine notification translation
//!
//! [`EventTranslator`] is the sink handed to the engine during each tick.
//! Every notification maps 1:1 to one domain event; byte payloads are
//! decoded at this boundary. Delivery goes over an unbounded channel so the
//! translator can never block inside the engine's dispatch.
//!
//! One wrinkle: a friend going offline should refresh its last-seen time,
//! but the engine is mutably borrowed while notifications run. The
//! translator records the handle instead, and the tick loop drains the
//! queue right after `process` returns.

use tokio::sync::mpsc;
use tracing::trace;

use palaver_core::codec;
use palaver_core::{Event, FriendHandle, NotificationSink, PeerId, Presence, UserStatus};

// ----------------------------------------------------------------------------
// Event Translator
// ----------------------------------------------------------------------------

/// Translates engine notifications into domain events.
pub struct EventTranslator {
    events: mpsc::UnboundedSender<Event>,
    pending_last_seen: Vec<FriendHandle>,
}

impl EventTranslator {
    pub fn new(events: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            events,
            pending_last_seen: Vec::new(),
        }
    }

    /// Emit one domain event. A dropped receiver discards events silently;
    /// the session keeps running regardless of whether anyone listens.
    pub fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            trace!("event receiver dropped, discarding event");
        }
    }

    /// Friends whose offline transition still needs a last-seen lookup.
    pub fn drain_pending_last_seen(&mut self) -> Vec<FriendHandle> {
        std::mem::take(&mut self.pending_last_seen)
    }
}

impl NotificationSink for EventTranslator {
    fn on_friend_request(&mut self, peer_id: PeerId, greeting: &[u8]) {
        self.emit(Event::FriendRequest {
            peer_id,
            greeting: codec::decode_text(greeting).into_owned(),
        });
    }

    fn on_message(&mut self, friend: FriendHandle, message: &[u8]) {
        self.emit(Event::MessageReceived {
            friend,
            text: codec::decode_text(message).into_owned(),
        });
    }

    fn on_action(&mut self, friend: FriendHandle, action: &[u8]) {
        self.emit(Event::ActionReceived {
            friend,
            text: codec::decode_text(action).into_owned(),
        });
    }

    fn on_name_change(&mut self, friend: FriendHandle, name: &[u8]) {
        self.emit(Event::NameChanged {
            friend,
            name: codec::decode_text(name).into_owned(),
        });
    }

    fn on_typing_change(&mut self, friend: FriendHandle, typing: bool) {
        self.emit(Event::TypingChanged { friend, typing });
    }

    fn on_status_message(&mut self, friend: FriendHandle, message: &[u8]) {
        self.emit(Event::StatusMessageChanged {
            friend,
            message: codec::decode_text(message).into_owned(),
        });
    }

    fn on_user_status(&mut self, friend: FriendHandle, status: UserStatus) {
        self.emit(Event::PresenceChanged {
            friend,
            presence: status.into(),
        });
    }

    fn on_connection_status(&mut self, friend: FriendHandle, online: bool) {
        let presence = if online {
            Presence::Online
        } else {
            Presence::Offline
        };
        self.emit(Event::PresenceChanged { friend, presence });
        if !online {
            self.pending_last_seen.push(friend);
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
