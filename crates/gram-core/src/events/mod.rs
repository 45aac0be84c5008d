//! Inbound gateway events - validated, fixed-shape views of platform payloads

mod gateway_event;

pub use gateway_event::{
    GatewayEvent, IncomingAttachment, MemberIdentity, MemberProfileUpdatedEvent,
    MembershipSnapshotEvent, PostCreatedEvent, PostDeletedEvent, PostEditedEvent,
    ReactionAddedEvent, ReactionClearedAllEvent, ReactionClearedOneEvent, ReactionRemovedEvent,
};
