//! Connectivity edge detection for the tick loop
//!
//! Each tick ends with a connectivity check. The network flaps rarely but
//! the check runs constantly, so it must be edge-triggered: one event per
//! transition, nothing on repeats. The single bit of prior-state memory
//! lives here, owned by the component rather than floating globally.

// ----------------------------------------------------------------------------
// Transition
// ----------------------------------------------------------------------------

/// A connectivity state change observed between two ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CameOnline,
    WentOffline,
}

// ----------------------------------------------------------------------------
// Connectivity Watch
// ----------------------------------------------------------------------------

/// Edge detector over the engine's connectivity flag.
///
/// Starts from the disconnected state, so the first online observation
/// reports [`Transition::CameOnline`].
#[derive(Debug, Clone, Default)]
pub struct ConnectivityWatch {
    connected: bool,
}

impl ConnectivityWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one observation; returns the transition if the state flipped.
    pub fn observe(&mut self, connected: bool) -> Option<Transition> {
        if connected == self.connected {
            return None;
        }
        self.connected = connected;
        Some(if connected {
            Transition::CameOnline
        } else {
            Transition::WentOffline
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
