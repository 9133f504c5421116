//! Shared test double: a scripted in-memory engine.
//!
//! `FakeEngine` records every call into a shared state cell the test body
//! also holds, and replays queued notifications on each `process` call.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use palaver_core::{
    Engine, EngineError, EngineOptions, FriendHandle, MessageId, NotificationSink, PeerAddress,
    PeerId, Presence, Timestamp, UserStatus,
};

// ----------------------------------------------------------------------------
// Builders
// ----------------------------------------------------------------------------

pub fn peer_id(seed: u8) -> PeerId {
    PeerId::new([seed; 32])
}

pub fn peer_address(seed: u8) -> PeerAddress {
    PeerAddress::from_parts(peer_id(seed), [seed, 0, 0, 1])
}

#[derive(Debug, Clone)]
pub struct FakeFriend {
    pub peer_id: PeerId,
    pub name: Option<String>,
    pub status_message: Option<String>,
    pub last_seen: Option<Timestamp>,
    pub connected: bool,
}

impl FakeFriend {
    pub fn new(seed: u8) -> Self {
        Self {
            peer_id: peer_id(seed),
            name: None,
            status_message: None,
            last_seen: None,
            connected: false,
        }
    }
}

// ----------------------------------------------------------------------------
// Scripted Notifications
// ----------------------------------------------------------------------------

/// Notifications the fake delivers on its next `process` call.
#[derive(Debug, Clone)]
pub enum Notification {
    FriendRequest { peer_id: PeerId, greeting: Vec<u8> },
    Message { friend: FriendHandle, payload: Vec<u8> },
    Action { friend: FriendHandle, payload: Vec<u8> },
    NameChange { friend: FriendHandle, name: Vec<u8> },
    Typing { friend: FriendHandle, typing: bool },
    StatusMessage { friend: FriendHandle, message: Vec<u8> },
    UserStatus { friend: FriendHandle, status: UserStatus },
    ConnectionStatus { friend: FriendHandle, online: bool },
}

// ----------------------------------------------------------------------------
// Shared State
// ----------------------------------------------------------------------------

pub struct Shared {
    // Scripted behavior
    pub fail_ipv6_create: bool,
    pub fail_all_creates: bool,
    pub reject_sets: bool,
    pub reject_sends: bool,
    pub reject_adds: bool,
    pub connected: bool,
    pub pending: VecDeque<Notification>,
    pub friends: BTreeMap<u32, FakeFriend>,
    pub state_blob: Vec<u8>,
    pub max_frame_len: usize,
    pub interval: Duration,

    // Recorded calls
    pub create_attempts: Vec<EngineOptions>,
    pub restored_blob: Option<Vec<u8>>,
    pub sent_frames: Vec<(FriendHandle, Vec<u8>)>,
    pub sent_actions: Vec<(FriendHandle, Vec<u8>)>,
    pub typing_calls: Vec<(FriendHandle, bool)>,
    pub bootstraps: Vec<(String, u16, PeerId)>,
    pub own_name: Vec<u8>,
    pub own_status_message: Vec<u8>,
    pub own_presence: Option<Presence>,
    pub ticks: u64,
    next_handle: u32,
}

impl Shared {
    pub fn new() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self {
            fail_ipv6_create: false,
            fail_all_creates: false,
            reject_sets: false,
            reject_sends: false,
            reject_adds: false,
            connected: false,
            pending: VecDeque::new(),
            friends: BTreeMap::new(),
            state_blob: b"fake engine state".to_vec(),
            max_frame_len: 1024,
            interval: Duration::from_millis(25),
            create_attempts: Vec::new(),
            restored_blob: None,
            sent_frames: Vec::new(),
            sent_actions: Vec::new(),
            typing_calls: Vec::new(),
            bootstraps: Vec::new(),
            own_name: Vec::new(),
            own_status_message: Vec::new(),
            own_presence: None,
            ticks: 0,
            next_handle: 0,
        }))
    }
}

/// Insert a friend directly into the directory, as if the engine already
/// knew it, returning its handle.
pub fn seed_friend(shared: &Arc<Mutex<Shared>>, friend: FakeFriend) -> FriendHandle {
    let mut shared = shared.lock().unwrap();
    let handle = shared.next_handle;
    shared.next_handle += 1;
    shared.friends.insert(handle, friend);
    FriendHandle::new(handle)
}

/// Queue a notification for delivery on the next tick.
pub fn push_notification(shared: &Arc<Mutex<Shared>>, notification: Notification) {
    shared.lock().unwrap().pending.push_back(notification);
}

// ----------------------------------------------------------------------------
// Fake Engine
// ----------------------------------------------------------------------------

pub struct FakeEngine {
    shared: Arc<Mutex<Shared>>,
}

/// Engine factory wired to the shared state cell.
pub fn factory(
    shared: Arc<Mutex<Shared>>,
) -> impl FnMut(&EngineOptions) -> Result<FakeEngine, EngineError> + Send + 'static {
    move |options| {
        let mut state = shared.lock().unwrap();
        state.create_attempts.push(*options);
        if state.fail_all_creates || (state.fail_ipv6_create && options.ipv6_enabled) {
            return Err(EngineError::Construction {
                reason: "could not open socket".into(),
            });
        }
        drop(state);
        Ok(FakeEngine {
            shared: Arc::clone(&shared),
        })
    }
}

impl Engine for FakeEngine {
    fn recommended_interval(&self) -> Duration {
        self.shared.lock().unwrap().interval
    }

    fn process(&mut self, sink: &mut dyn NotificationSink) {
        let mut state = self.shared.lock().unwrap();
        state.ticks += 1;
        let pending: Vec<_> = state.pending.drain(..).collect();
        drop(state);

        for notification in pending {
            match notification {
                Notification::FriendRequest { peer_id, greeting } => {
                    sink.on_friend_request(peer_id, &greeting)
                }
                Notification::Message { friend, payload } => sink.on_message(friend, &payload),
                Notification::Action { friend, payload } => sink.on_action(friend, &payload),
                Notification::NameChange { friend, name } => sink.on_name_change(friend, &name),
                Notification::Typing { friend, typing } => sink.on_typing_change(friend, typing),
                Notification::StatusMessage { friend, message } => {
                    sink.on_status_message(friend, &message)
                }
                Notification::UserStatus { friend, status } => {
                    sink.on_user_status(friend, status)
                }
                Notification::ConnectionStatus { friend, online } => {
                    sink.on_connection_status(friend, online)
                }
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.shared.lock().unwrap().connected
    }

    fn own_address(&self) -> PeerAddress {
        peer_address(0xAA)
    }

    fn max_frame_len(&self) -> usize {
        self.shared.lock().unwrap().max_frame_len
    }

    fn bootstrap(&mut self, host: &str, port: u16, peer_id: &PeerId) -> Result<(), EngineError> {
        self.shared
            .lock()
            .unwrap()
            .bootstraps
            .push((host.to_owned(), port, *peer_id));
        Ok(())
    }

    fn add_friend(
        &mut self,
        address: &PeerAddress,
        _greeting: &[u8],
    ) -> Result<FriendHandle, EngineError> {
        let mut state = self.shared.lock().unwrap();
        if state.reject_adds {
            return Err(EngineError::Rejected {
                operation: "add_friend",
            });
        }
        let handle = state.next_handle;
        state.next_handle += 1;
        let mut friend = FakeFriend::new(0);
        friend.peer_id = address.peer_id();
        state.friends.insert(handle, friend);
        Ok(FriendHandle::new(handle))
    }

    fn accept_friend(&mut self, peer_id: &PeerId) -> Result<FriendHandle, EngineError> {
        let mut state = self.shared.lock().unwrap();
        if state.reject_adds {
            return Err(EngineError::Rejected {
                operation: "accept_friend",
            });
        }
        let handle = state.next_handle;
        state.next_handle += 1;
        let mut friend = FakeFriend::new(0);
        friend.peer_id = *peer_id;
        state.friends.insert(handle, friend);
        Ok(FriendHandle::new(handle))
    }

    fn remove_friend(&mut self, friend: FriendHandle) -> Result<(), EngineError> {
        let mut state = self.shared.lock().unwrap();
        match state.friends.remove(&friend.value()) {
            Some(_) => Ok(()),
            None => Err(EngineError::UnknownFriend { friend }),
        }
    }

    fn send_message(
        &mut self,
        friend: FriendHandle,
        message: &[u8],
    ) -> Result<MessageId, EngineError> {
        let mut state = self.shared.lock().unwrap();
        assert!(
            message.len() <= state.max_frame_len,
            "frame of {} bytes exceeds the engine limit of {}",
            message.len(),
            state.max_frame_len
        );
        if state.reject_sends {
            return Err(EngineError::Rejected {
                operation: "send_message",
            });
        }
        state.sent_frames.push((friend, message.to_vec()));
        Ok(MessageId::new(state.sent_frames.len() as u32))
    }

    fn send_action(
        &mut self,
        friend: FriendHandle,
        action: &[u8],
    ) -> Result<MessageId, EngineError> {
        let mut state = self.shared.lock().unwrap();
        if state.reject_sends {
            return Err(EngineError::Rejected {
                operation: "send_action",
            });
        }
        state.sent_actions.push((friend, action.to_vec()));
        Ok(MessageId::new(state.sent_actions.len() as u32))
    }

    fn set_typing(&mut self, friend: FriendHandle, typing: bool) -> Result<(), EngineError> {
        let mut state = self.shared.lock().unwrap();
        if state.reject_sets {
            return Err(EngineError::Rejected {
                operation: "set_typing",
            });
        }
        state.typing_calls.push((friend, typing));
        Ok(())
    }

    fn set_name(&mut self, name: &[u8]) -> Result<(), EngineError> {
        let mut state = self.shared.lock().unwrap();
        if state.reject_sets {
            return Err(EngineError::Rejected {
                operation: "set_name",
            });
        }
        state.own_name = name.to_vec();
        Ok(())
    }

    fn set_status_message(&mut self, message: &[u8]) -> Result<(), EngineError> {
        let mut state = self.shared.lock().unwrap();
        if state.reject_sets {
            return Err(EngineError::Rejected {
                operation: "set_status_message",
            });
        }
        state.own_status_message = message.to_vec();
        Ok(())
    }

    fn set_presence(&mut self, presence: Presence) -> Result<(), EngineError> {
        let mut state = self.shared.lock().unwrap();
        if state.reject_sets {
            return Err(EngineError::Rejected {
                operation: "set_presence",
            });
        }
        state.own_presence = Some(presence);
        Ok(())
    }

    fn friend_list(&self) -> Vec<FriendHandle> {
        self.shared
            .lock()
            .unwrap()
            .friends
            .keys()
            .map(|&handle| FriendHandle::new(handle))
            .collect()
    }

    fn friend_peer_id(&self, friend: FriendHandle) -> Result<PeerId, EngineError> {
        self.shared
            .lock()
            .unwrap()
            .friends
            .get(&friend.value())
            .map(|f| f.peer_id)
            .ok_or(EngineError::UnknownFriend { friend })
    }

    fn friend_name(&self, friend: FriendHandle) -> Option<String> {
        self.shared
            .lock()
            .unwrap()
            .friends
            .get(&friend.value())
            .and_then(|f| f.name.clone())
    }

    fn friend_status_message(&self, friend: FriendHandle) -> Option<String> {
        self.shared
            .lock()
            .unwrap()
            .friends
            .get(&friend.value())
            .and_then(|f| f.status_message.clone())
    }

    fn friend_last_seen(&self, friend: FriendHandle) -> Option<Timestamp> {
        self.shared
            .lock()
            .unwrap()
            .friends
            .get(&friend.value())
            .and_then(|f| f.last_seen)
    }

    fn friend_is_connected(&self, friend: FriendHandle) -> bool {
        self.shared
            .lock()
            .unwrap()
            .friends
            .get(&friend.value())
            .map(|f| f.connected)
            .unwrap_or(false)
    }

    fn serialize_state(&self) -> Vec<u8> {
        self.shared.lock().unwrap().state_blob.clone()
    }

    fn restore_state(&mut self, blob: &[u8]) -> Result<(), EngineError> {
        self.shared.lock().unwrap().restored_blob = Some(blob.to_vec());
        Ok(())
    }
}
