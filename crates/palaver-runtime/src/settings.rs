//! Session configuration
//!
//! Everything the session needs from the surrounding application: bootstrap
//! nodes, transport preferences, the initial self-presentation, where the
//! engine's state blob lives, and the checkpoint-save policy.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use palaver_core::PeerId;

// ----------------------------------------------------------------------------
// Bootstrap Node
// ----------------------------------------------------------------------------

/// One well-known node used to join the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapNode {
    pub host: String,
    pub port: u16,
    pub peer_id: PeerId,
}

// ----------------------------------------------------------------------------
// Session Settings
// ----------------------------------------------------------------------------

/// Configuration for one session.
///
/// The bootstrap list given here seeds the session; later changes are
/// pushed through [`SessionHandle::set_bootstrap_nodes`] and trigger a
/// re-bootstrap.
///
/// [`SessionHandle::set_bootstrap_nodes`]: crate::SessionHandle::set_bootstrap_nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub bootstrap_nodes: Vec<BootstrapNode>,
    /// Attempt dual-stack networking first.
    pub ipv6_enabled: bool,
    /// Permit one retry without IPv6 when dual-stack creation fails.
    pub ipv4_fallback: bool,
    /// Display name applied at startup.
    pub display_name: String,
    /// Status message applied at startup.
    pub status_message: String,
    /// Where the engine's state blob is persisted.
    pub state_path: PathBuf,
    /// Save the state blob on this cadence while running. `None` saves on
    /// shutdown only.
    pub checkpoint_save: Option<Duration>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            bootstrap_nodes: Vec::new(),
            ipv6_enabled: true,
            ipv4_fallback: true,
            display_name: String::new(),
            status_message: String::new(),
            state_path: PathBuf::from("data.palaver"),
            checkpoint_save: None,
        }
    }
}
