//! Wire protocol for the platform websocket
//!
//! Frame format, op codes, and the payload DTOs the dispatch decoder reads.

mod messages;
mod opcodes;
mod payloads;

pub use messages::GatewayFrame;
pub use opcodes::OpCode;
pub use payloads::{
    HelloPayload, IdentifyPayload, IdentifyProperties, WireAttachment, WireEmoji, WireGuild,
    WireMember, WireMemberUpdate, WireMessage, WireMessageDelete, WireMessageMember, WireReaction,
    WireReactionClearAll, WireReactionClearEmoji, WireReady, WireUser,
};
