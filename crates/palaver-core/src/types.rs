//! Core types for the Palaver session adapter
//!
//! Newtype wrappers for the engine's fixed-width identifiers and the handful
//! of plain values (friend handles, receipts, presence, last-seen times)
//! that flow through domain events.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec;
use crate::errors::FormatError;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Byte width of a steady-state peer identifier.
pub const PEER_ID_LEN: usize = 32;

/// Byte width of the routing tag embedded in a peer address.
pub const ROUTING_TAG_LEN: usize = 4;

/// Byte width of the address checksum suffix.
pub const CHECKSUM_LEN: usize = 2;

/// Byte width of a full peer address: identifier + routing tag + checksum.
pub const PEER_ADDRESS_LEN: usize = PEER_ID_LEN + ROUTING_TAG_LEN + CHECKSUM_LEN;

// ----------------------------------------------------------------------------
// Peer Identifier
// ----------------------------------------------------------------------------

/// Fixed-width identifier for an established friend.
///
/// Renders as 64 uppercase hex characters; parsing is strict and rejects
/// any input that does not decode to exactly [`PEER_ID_LEN`] bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId([u8; PEER_ID_LEN]);

impl PeerId {
    pub fn new(bytes: [u8; PEER_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PEER_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", codec::encode_hex(&self.0))
    }
}

impl FromStr for PeerId {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = codec::decode_hex(s, PEER_ID_LEN)?;
        let mut id = [0u8; PEER_ID_LEN];
        id.copy_from_slice(&bytes);
        Ok(Self(id))
    }
}

impl Serialize for PeerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&codec::encode_hex(&self.0))
    }
}

impl<'de> Deserialize<'de> for PeerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

// ----------------------------------------------------------------------------
// Peer Address
// ----------------------------------------------------------------------------

/// Fixed-width value used only to initiate a friendship.
///
/// Layout: the peer identifier, a routing tag, and a two-byte checksum
/// computed by XOR-folding everything before it. Immutable once parsed;
/// parsing verifies length, hex validity, and the checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerAddress([u8; PEER_ADDRESS_LEN]);

impl PeerAddress {
    /// Assemble an address from its identifier and routing tag, computing
    /// the checksum suffix.
    pub fn from_parts(peer_id: PeerId, routing_tag: [u8; ROUTING_TAG_LEN]) -> Self {
        let mut bytes = [0u8; PEER_ADDRESS_LEN];
        bytes[..PEER_ID_LEN].copy_from_slice(peer_id.as_bytes());
        bytes[PEER_ID_LEN..PEER_ID_LEN + ROUTING_TAG_LEN].copy_from_slice(&routing_tag);
        let checksum = fold_checksum(&bytes[..PEER_ID_LEN + ROUTING_TAG_LEN]);
        bytes[PEER_ID_LEN + ROUTING_TAG_LEN..].copy_from_slice(&checksum);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PEER_ADDRESS_LEN] {
        &self.0
    }

    /// The steady-state identifier embedded in this address.
    pub fn peer_id(&self) -> PeerId {
        let mut id = [0u8; PEER_ID_LEN];
        id.copy_from_slice(&self.0[..PEER_ID_LEN]);
        PeerId::new(id)
    }

    pub fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        let mut checksum = [0u8; CHECKSUM_LEN];
        checksum.copy_from_slice(&self.0[PEER_ID_LEN + ROUTING_TAG_LEN..]);
        checksum
    }
}

fn fold_checksum(bytes: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut checksum = [0u8; CHECKSUM_LEN];
    for (i, byte) in bytes.iter().enumerate() {
        checksum[i % CHECKSUM_LEN] ^= byte;
    }
    checksum
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", codec::encode_hex(&self.0))
    }
}

impl FromStr for PeerAddress {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = codec::decode_hex(s, PEER_ADDRESS_LEN)?;
        let mut bytes = [0u8; PEER_ADDRESS_LEN];
        bytes.copy_from_slice(&decoded);
        let expected = fold_checksum(&bytes[..PEER_ID_LEN + ROUTING_TAG_LEN]);
        if bytes[PEER_ID_LEN + ROUTING_TAG_LEN..] != expected {
            return Err(FormatError::Checksum);
        }
        Ok(Self(bytes))
    }
}

impl Serialize for PeerAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&codec::encode_hex(&self.0))
    }
}

impl<'de> Deserialize<'de> for PeerAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

// ----------------------------------------------------------------------------
// Friend Handle
// ----------------------------------------------------------------------------

/// Engine-assigned integer handle for a friend, stable for the session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FriendHandle(u32);

impl FriendHandle {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FriendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Message Receipt
// ----------------------------------------------------------------------------

/// Engine receipt for one accepted outbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(u32);

impl MessageId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

// ----------------------------------------------------------------------------
// Presence
// ----------------------------------------------------------------------------

/// A friend's visible presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Presence {
    Offline,
    Online,
    Away,
    Busy,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Presence::Offline => write!(f, "offline"),
            Presence::Online => write!(f, "online"),
            Presence::Away => write!(f, "away"),
            Presence::Busy => write!(f, "busy"),
        }
    }
}

// ----------------------------------------------------------------------------
// Timestamp
// ----------------------------------------------------------------------------

/// Seconds since the Unix epoch, used for last-seen values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
