//! Gateway op codes
//!
//! The subset of frame types this bot speaks. The bot sends Identify and
//! Heartbeat; the server sends the rest. Any other `op` on the wire fails
//! frame decoding and the connection loop skips it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Frame type carried in the `op` field of every gateway frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// An event; `t` names it and `s` sequences it
    Dispatch,
    /// Keepalive carrying the last seen sequence number
    Heartbeat,
    /// Session authentication, sent once after Hello
    Identify,
    /// First frame after connect; carries the heartbeat interval
    Hello,
    /// The server saw a heartbeat
    HeartbeatAck,
}

/// An `op` value this bot does not handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unhandled gateway op {0}")]
pub struct UnknownOpCode(pub u8);

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        match op {
            OpCode::Dispatch => 0,
            OpCode::Heartbeat => 1,
            OpCode::Identify => 2,
            OpCode::Hello => 10,
            OpCode::HeartbeatAck => 11,
        }
    }
}

impl TryFrom<u8> for OpCode {
    type Error = UnknownOpCode;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Dispatch),
            1 => Ok(Self::Heartbeat),
            2 => Ok(Self::Identify),
            10 => Ok(Self::Hello),
            11 => Ok(Self::HeartbeatAck),
            other => Err(UnknownOpCode(other)),
        }
    }
}

impl Serialize for OpCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*self))
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u8::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}
