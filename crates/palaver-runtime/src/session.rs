//! Session lifecycle management
//!
//! [`Session`] owns the engine handle and runs every engine interaction on
//! one sequential timeline: startup, the self-rescheduling tick loop,
//! application commands, and shutdown all execute on the session task.
//! Applications hold a [`SessionHandle`] and marshal their calls onto that
//! timeline as [`Command`]s; results come back as domain events.
//!
//! Lifecycle: `Uninitialized → Starting → Running → Stopped`, with
//! `Stopped` terminal. Engine creation tries the preferred transport
//! configuration first and may retry once without IPv6; failing both is
//! fatal. Shutdown persists the engine's state blob before releasing the
//! handle.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use palaver_core::codec;
use palaver_core::{
    Engine, EngineError, EngineOptions, Event, FriendHandle, MessageChunker, PalaverError,
    PeerAddress, PeerId, Presence, Result,
};

use crate::settings::{BootstrapNode, SessionSettings};
use crate::storage;
use crate::ticker::{ConnectivityWatch, Transition};
use crate::translate::EventTranslator;

// ----------------------------------------------------------------------------
// Commands
// ----------------------------------------------------------------------------

/// Application calls marshalled onto the session timeline.
#[derive(Debug, Clone)]
pub enum Command {
    SendMessage { friend: FriendHandle, text: String },
    SendAction { friend: FriendHandle, text: String },
    SetTyping { friend: FriendHandle, typing: bool },
    AcceptFriendRequest { peer_id: PeerId },
    RequestFriendship {
        address: PeerAddress,
        greeting: String,
    },
    RemoveFriend { friend: FriendHandle },
    SetName { name: String },
    SetStatusMessage { message: String },
    SetPresence { presence: Presence },
    Shutdown,
}

// ----------------------------------------------------------------------------
// Session State
// ----------------------------------------------------------------------------

/// Lifecycle states. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Starting,
    Running,
    Stopped,
}

// ----------------------------------------------------------------------------
// Session Handle
// ----------------------------------------------------------------------------

/// Clonable application-facing surface of a running session.
///
/// Every method enqueues work for the session task; none touches the
/// engine directly. Calls fail with [`PalaverError::NotRunning`] once the
/// session has stopped.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    bootstrap: Arc<watch::Sender<Vec<BootstrapNode>>>,
}

impl SessionHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| PalaverError::NotRunning)
    }

    pub fn send_message(&self, friend: FriendHandle, text: impl Into<String>) -> Result<()> {
        self.send(Command::SendMessage {
            friend,
            text: text.into(),
        })
    }

    pub fn send_action(&self, friend: FriendHandle, text: impl Into<String>) -> Result<()> {
        self.send(Command::SendAction {
            friend,
            text: text.into(),
        })
    }

    pub fn set_typing(&self, friend: FriendHandle, typing: bool) -> Result<()> {
        self.send(Command::SetTyping { friend, typing })
    }

    pub fn accept_friend_request(&self, peer_id: PeerId) -> Result<()> {
        self.send(Command::AcceptFriendRequest { peer_id })
    }

    pub fn request_friendship(
        &self,
        address: PeerAddress,
        greeting: impl Into<String>,
    ) -> Result<()> {
        self.send(Command::RequestFriendship {
            address,
            greeting: greeting.into(),
        })
    }

    pub fn remove_friend(&self, friend: FriendHandle) -> Result<()> {
        self.send(Command::RemoveFriend { friend })
    }

    pub fn set_name(&self, name: impl Into<String>) -> Result<()> {
        self.send(Command::SetName { name: name.into() })
    }

    pub fn set_status_message(&self, message: impl Into<String>) -> Result<()> {
        self.send(Command::SetStatusMessage {
            message: message.into(),
        })
    }

    pub fn set_presence(&self, presence: Presence) -> Result<()> {
        self.send(Command::SetPresence { presence })
    }

    /// Replace the bootstrap node list; the session re-bootstraps on the
    /// next loop pass.
    pub fn set_bootstrap_nodes(&self, nodes: Vec<BootstrapNode>) -> Result<()> {
        self.bootstrap
            .send(nodes)
            .map_err(|_| PalaverError::NotRunning)
    }

    /// Stop the session. Pending commands ahead of the shutdown are still
    /// processed; the state blob is saved before the engine is released.
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }
}

// ----------------------------------------------------------------------------
// Session
// ----------------------------------------------------------------------------

type EngineFactory<E> =
    Box<dyn FnMut(&EngineOptions) -> std::result::Result<E, EngineError> + Send>;

/// The session lifecycle manager. Create with [`Session::new`], then drive
/// with [`Session::run`], which owns the engine for the whole session.
pub struct Session<E: Engine> {
    settings: SessionSettings,
    state: SessionState,
    factory: EngineFactory<E>,
    translator: EventTranslator,
    commands: mpsc::UnboundedReceiver<Command>,
    bootstrap_rx: watch::Receiver<Vec<BootstrapNode>>,
    connectivity: ConnectivityWatch,
}

impl<E: Engine> Session<E> {
    /// Build a session around an engine factory. The factory is invoked
    /// during [`Session::run`], once per creation attempt.
    ///
    /// Returns the session, the application handle, and the event stream.
    pub fn new(
        settings: SessionSettings,
        factory: impl FnMut(&EngineOptions) -> std::result::Result<E, EngineError> + Send + 'static,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<Event>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (bootstrap_tx, bootstrap_rx) = watch::channel(settings.bootstrap_nodes.clone());

        let handle = SessionHandle {
            commands: command_tx,
            bootstrap: Arc::new(bootstrap_tx),
        };
        let session = Self {
            settings,
            state: SessionState::Uninitialized,
            factory: Box::new(factory),
            translator: EventTranslator::new(event_tx),
            commands: command_rx,
            bootstrap_rx,
            connectivity: ConnectivityWatch::new(),
        };
        (session, handle, event_rx)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion: start the engine, loop over commands
    /// and ticks, and persist state on shutdown.
    ///
    /// Returns an error only for fatal startup failure; operational
    /// failures surface as events and keep the session running.
    pub async fn run(mut self) -> Result<()> {
        let mut engine = match self.start() {
            Ok(engine) => engine,
            Err(err) => {
                self.translator.emit(Event::StartupFailed {
                    reason: err.to_string(),
                });
                self.state = SessionState::Stopped;
                return Err(err);
            }
        };

        let mut next_tick = Instant::now() + engine.recommended_interval();
        let mut last_save = Instant::now();

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => self.handle_command(&mut engine, command),
                },
                changed = self.bootstrap_rx.changed() => {
                    if changed.is_err() {
                        // All handles dropped; the command channel is gone too.
                        break;
                    }
                    info!("bootstrap node list changed, re-bootstrapping");
                    self.bootstrap(&mut engine);
                },
                _ = time::sleep_until(next_tick) => {
                    self.tick(&mut engine);
                    next_tick = Instant::now() + engine.recommended_interval();

                    if let Some(cadence) = self.settings.checkpoint_save {
                        if last_save.elapsed() >= cadence {
                            self.save_state(&engine);
                            last_save = Instant::now();
                        }
                    }
                }
            }
        }

        self.shutdown(engine);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Startup
    // ------------------------------------------------------------------

    fn start(&mut self) -> Result<E> {
        self.state = SessionState::Starting;

        let mut options = EngineOptions {
            ipv6_enabled: self.settings.ipv6_enabled,
            ..EngineOptions::default()
        };
        let mut engine = match (self.factory)(&options) {
            Ok(engine) => engine,
            Err(first) => {
                if !options.ipv6_enabled || !self.settings.ipv4_fallback {
                    return Err(first.into());
                }
                warn!(error = %first, "engine creation failed, retrying without IPv6");
                options.ipv6_enabled = false;
                (self.factory)(&options).map_err(PalaverError::from)?
            }
        };

        match storage::load(&self.settings.state_path) {
            Ok(Some(blob)) => {
                if let Err(err) = engine.restore_state(&blob) {
                    warn!(error = %err, "saved engine state rejected, starting fresh");
                }
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "could not read saved engine state"),
        }

        self.sync_friend_directory(&engine);
        self.translator.emit(Event::OwnAddress {
            address: engine.own_address(),
        });

        // Startup presentation is best-effort; the defaults may be empty.
        if let Err(err) = engine.set_name(codec::encode_text(&self.settings.display_name)) {
            warn!(error = %err, "could not apply display name at startup");
        }
        if let Err(err) =
            engine.set_status_message(codec::encode_text(&self.settings.status_message))
        {
            warn!(error = %err, "could not apply status message at startup");
        }

        self.bootstrap(&mut engine);

        self.state = SessionState::Running;
        info!("session running");
        Ok(engine)
    }

    /// Import the engine's friend directory as events, once per startup.
    /// Per friend: added, then name, then status message, then last-seen,
    /// each only when actually known.
    fn sync_friend_directory(&mut self, engine: &E) {
        for friend in engine.friend_list() {
            let peer_id = match engine.friend_peer_id(friend) {
                Ok(peer_id) => peer_id,
                Err(err) => {
                    warn!(%friend, error = %err, "skipping friend with unreadable identifier");
                    continue;
                }
            };
            self.translator.emit(Event::FriendAdded { friend, peer_id });

            if let Some(name) = engine.friend_name(friend).filter(|n| !n.is_empty()) {
                self.translator.emit(Event::NameChanged { friend, name });
            }
            if let Some(message) = engine
                .friend_status_message(friend)
                .filter(|m| !m.is_empty())
            {
                self.translator
                    .emit(Event::StatusMessageChanged { friend, message });
            }
            self.check_last_seen(engine, friend);
        }
    }

    // ------------------------------------------------------------------
    // Tick Loop
    // ------------------------------------------------------------------

    /// One tick: process pending engine work, resolve deferred last-seen
    /// lookups, then check connectivity for an edge.
    fn tick(&mut self, engine: &mut E) {
        engine.process(&mut self.translator);

        for friend in self.translator.drain_pending_last_seen() {
            self.check_last_seen(engine, friend);
        }

        match self.connectivity.observe(engine.is_connected()) {
            Some(Transition::CameOnline) => {
                info!("connected to the network");
                self.translator.emit(Event::Connected);
            }
            Some(Transition::WentOffline) => {
                info!("lost network connection");
                self.translator.emit(Event::Disconnected);
                // Friends dropped along with the connection get their
                // last-seen refreshed now.
                for friend in engine.friend_list() {
                    if !engine.friend_is_connected(friend) {
                        self.check_last_seen(engine, friend);
                    }
                }
            }
            None => {}
        }
    }

    fn check_last_seen(&mut self, engine: &E, friend: FriendHandle) {
        if let Some(last_seen) = engine.friend_last_seen(friend) {
            self.translator
                .emit(Event::LastSeenChanged { friend, last_seen });
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    fn handle_command(&mut self, engine: &mut E, command: Command) {
        if self.state != SessionState::Running {
            warn!(?command, "dropping command outside the running state");
            return;
        }
        match command {
            Command::SendMessage { friend, text } => self.send_message(engine, friend, &text),
            Command::SendAction { friend, text } => self.send_action(engine, friend, text),
            Command::SetTyping { friend, typing } => {
                if engine.set_typing(friend, typing).is_err() {
                    self.translator
                        .emit(Event::SetTypingFailed { friend, typing });
                }
            }
            Command::AcceptFriendRequest { peer_id } => match engine.accept_friend(&peer_id) {
                Ok(friend) => self.translator.emit(Event::FriendAdded { friend, peer_id }),
                Err(err) => {
                    debug!(%peer_id, error = %err, "friend request acceptance rejected");
                    self.translator.emit(Event::AddFriendFailed { peer_id });
                }
            },
            Command::RequestFriendship { address, greeting } => {
                let peer_id = address.peer_id();
                match engine.add_friend(&address, codec::encode_text(&greeting)) {
                    Ok(friend) => self.translator.emit(Event::FriendAdded { friend, peer_id }),
                    Err(err) => {
                        debug!(%peer_id, error = %err, "friendship request rejected");
                        self.translator.emit(Event::AddFriendFailed { peer_id });
                    }
                }
            }
            Command::RemoveFriend { friend } => match engine.remove_friend(friend) {
                Ok(()) => self.translator.emit(Event::FriendRemoved { friend }),
                Err(_) => self.translator.emit(Event::RemoveFriendFailed { friend }),
            },
            Command::SetName { name } => {
                if engine.set_name(codec::encode_text(&name)).is_err() {
                    self.translator.emit(Event::SetNameFailed { name });
                }
            }
            Command::SetStatusMessage { message } => {
                if engine
                    .set_status_message(codec::encode_text(&message))
                    .is_err()
                {
                    self.translator
                        .emit(Event::SetStatusMessageFailed { message });
                }
            }
            Command::SetPresence { presence } => {
                if engine.set_presence(presence).is_err() {
                    self.translator.emit(Event::SetPresenceFailed { presence });
                }
            }
            // Handled by the run loop before dispatch.
            Command::Shutdown => {}
        }
    }

    /// Chunk and transmit one text message, emitting one result per frame.
    /// Empty text produces no frames and no events.
    fn send_message(&mut self, engine: &mut E, friend: FriendHandle, text: &str) {
        let chunker = MessageChunker::new(engine.max_frame_len());
        let plan = chunker.plan(text);
        for chunk in plan.chunks() {
            let receipt = engine.send_message(friend, codec::encode_text(chunk)).ok();
            self.translator.emit(Event::MessageSendResult {
                friend,
                echoed: chunk.to_owned(),
                receipt,
            });
        }
    }

    /// Actions are single-frame; oversized ones are the caller's mistake
    /// and surface as a rejected frame.
    fn send_action(&mut self, engine: &mut E, friend: FriendHandle, text: String) {
        let receipt = engine.send_action(friend, codec::encode_text(&text)).ok();
        self.translator.emit(Event::ActionSendResult {
            friend,
            echoed: text,
            receipt,
        });
    }

    // ------------------------------------------------------------------
    // Bootstrap & Persistence
    // ------------------------------------------------------------------

    fn bootstrap(&mut self, engine: &mut E) {
        let nodes = self.bootstrap_rx.borrow_and_update().clone();
        for node in &nodes {
            if let Err(err) = engine.bootstrap(&node.host, node.port, &node.peer_id) {
                warn!(host = %node.host, port = node.port, error = %err, "bootstrap request failed");
            }
        }
        debug!(count = nodes.len(), "bootstrap requests issued");
    }

    fn save_state(&self, engine: &E) {
        if let Err(err) = storage::save(&self.settings.state_path, &engine.serialize_state()) {
            warn!(
                error = %err,
                path = %self.settings.state_path.display(),
                "could not save engine state, keeping previous blob"
            );
        }
    }

    fn shutdown(&mut self, engine: E) {
        self.save_state(&engine);
        drop(engine);
        self.state = SessionState::Stopped;
        info!("session stopped");
    }
}
