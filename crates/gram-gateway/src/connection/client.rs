//! Gateway websocket client
//!
//! Connects to the platform gateway, completes the hello/identify
//! handshake, heartbeats on the advertised interval, and decodes dispatch
//! frames into domain events for the router. Sessions that drop are
//! reopened with exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use gram_common::BotConfig;
use gram_core::events::{
    GatewayEvent, MemberProfileUpdatedEvent, MembershipSnapshotEvent, PostCreatedEvent,
    PostDeletedEvent, PostEditedEvent, ReactionAddedEvent, ReactionClearedAllEvent,
    ReactionClearedOneEvent, ReactionRemovedEvent,
};
use gram_core::Snowflake;

use crate::error::GatewayError;
use crate::protocol::{
    GatewayFrame, IdentifyPayload, OpCode, WireGuild, WireMemberUpdate, WireMessage,
    WireMessageDelete, WireReaction, WireReactionClearAll, WireReactionClearEmoji, WireReady,
    WireUser,
};
use crate::rest::HttpPlatform;
use crate::router::EventRouter;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Delay before the first reconnect attempt
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Ceiling for the reconnect backoff
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Long-lived gateway connection
pub struct GatewayClient {
    bot: BotConfig,
    rest: Arc<HttpPlatform>,
    router: EventRouter,
}

impl GatewayClient {
    pub fn new(bot: BotConfig, rest: Arc<HttpPlatform>, router: EventRouter) -> Self {
        Self { bot, rest, router }
    }

    /// Connect and stay connected
    ///
    /// A session that made it through the handshake resets the backoff;
    /// handshake failures double it up to the ceiling.
    pub async fn run(&self) -> Result<(), GatewayError> {
        let mut backoff = INITIAL_BACKOFF;

        loop {
            match self.session().await {
                Ok(()) => {
                    info!("Gateway session ended; reconnecting");
                    backoff = INITIAL_BACKOFF;
                }
                Err(error) => {
                    warn!(%error, "Gateway session failed");
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }

            tokio::time::sleep(backoff).await;
        }
    }

    /// One connection lifetime: handshake, then the read/heartbeat loop
    ///
    /// Errors are returned only for failures before the session is
    /// established; a session that drops later ends with `Ok`.
    async fn session(&self) -> Result<(), GatewayError> {
        info!(url = %self.bot.gateway_url, "Connecting to gateway");
        let (stream, _) = connect_async(&self.bot.gateway_url).await?;
        let (mut sink, mut source) = stream.split();

        let heartbeat_interval = await_hello(&mut source).await?;

        let identify = GatewayFrame::identify(IdentifyPayload::new(&self.bot.token));
        let json = identify
            .to_json()
            .map_err(|error| GatewayError::protocol(format!("identify frame: {error}")))?;
        sink.send(Message::Text(json)).await?;

        info!(interval_ms = heartbeat_interval, "Gateway session identified");
        self.session_loop(&mut sink, &mut source, heartbeat_interval)
            .await;
        Ok(())
    }

    async fn session_loop(&self, sink: &mut WsSink, source: &mut WsSource, interval_ms: u64) {
        let mut heartbeat = tokio::time::interval(Duration::from_millis(interval_ms));
        heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let mut last_seq: Option<u64> = None;
        let mut acked = true;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if !acked {
                        warn!("Heartbeat not acknowledged; reconnecting");
                        return;
                    }
                    if !send_heartbeat(sink, last_seq).await {
                        return;
                    }
                    acked = false;
                }
                incoming = source.next() => {
                    let Some(frame) = incoming else {
                        info!("Gateway closed the connection");
                        return;
                    };
                    match frame {
                        Ok(Message::Text(text)) => {
                            let frame = match GatewayFrame::from_json(&text) {
                                Ok(frame) => frame,
                                Err(error) => {
                                    debug!(%error, "Undecodable frame skipped");
                                    continue;
                                }
                            };
                            match frame.op {
                                OpCode::Dispatch => {
                                    if let Some(seq) = frame.s {
                                        last_seq = Some(seq);
                                    }
                                    self.dispatch(frame.t, frame.d);
                                }
                                // Server requested an immediate beat
                                OpCode::Heartbeat => {
                                    if !send_heartbeat(sink, last_seq).await {
                                        return;
                                    }
                                }
                                OpCode::HeartbeatAck => acked = true,
                                OpCode::Hello | OpCode::Identify => {
                                    debug!(op = ?frame.op, "Unexpected op mid-session");
                                }
                            }
                        }
                        Ok(Message::Close(frame)) => {
                            info!(?frame, "Gateway sent close");
                            return;
                        }
                        Ok(Message::Ping(_) | Message::Pong(_)) => {}
                        Ok(_) => debug!("Binary frame ignored"),
                        Err(error) => {
                            warn!(%error, "Gateway transport error");
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Decode one dispatch frame and hand it to the router
    ///
    /// Runs the handler as its own task so a slow archival (video fetch,
    /// thumbnail work) never stalls the heartbeat.
    fn dispatch(&self, event_type: Option<String>, data: Option<Value>) {
        let Some(event_type) = event_type else {
            debug!("Dispatch frame without event type");
            return;
        };
        let Some(data) = data else {
            debug!(event_type, "Dispatch frame without payload");
            return;
        };

        let decoded = match decode_dispatch(&self.bot, &event_type, data) {
            Ok(decoded) => decoded,
            Err(error) => {
                debug!(event_type, %error, "Dispatch payload skipped");
                return;
            }
        };
        if matches!(decoded, Decoded::Skip) {
            return;
        }

        let rest = Arc::clone(&self.rest);
        let router = self.router.clone();
        tokio::spawn(async move {
            let event = match decoded {
                Decoded::Event(event) => event,
                Decoded::ReactionRemoval {
                    channel_id,
                    post_id,
                    user_id,
                    emoji,
                } => {
                    // The removal payload carries no counts; ask the API
                    // whether this was the last one.
                    match rest.remaining_reactions(channel_id, post_id, &emoji).await {
                        Ok(remaining) => GatewayEvent::ReactionRemoved(ReactionRemovedEvent {
                            post_id,
                            channel_id,
                            user_id,
                            emoji,
                            remaining,
                        }),
                        Err(error) => {
                            warn!(%error, "Could not count remaining reactions; keeping the tag");
                            return;
                        }
                    }
                }
                Decoded::Skip => return,
            };
            router.handle(event).await;
        });
    }
}

/// Read frames until the server's Hello; returns the heartbeat interval
async fn await_hello(source: &mut WsSource) -> Result<u64, GatewayError> {
    while let Some(frame) = source.next().await {
        match frame? {
            Message::Text(text) => {
                let frame = GatewayFrame::from_json(&text)
                    .map_err(|error| GatewayError::protocol(format!("undecodable hello: {error}")))?;
                let hello = frame.as_hello().ok_or_else(|| {
                    GatewayError::protocol(format!("expected hello, got op {}", u8::from(frame.op)))
                })?;
                return Ok(hello.heartbeat_interval);
            }
            Message::Ping(_) | Message::Pong(_) => {}
            other => {
                return Err(GatewayError::protocol(format!(
                    "unexpected frame before hello: {other:?}"
                )))
            }
        }
    }
    Err(GatewayError::protocol("connection closed before hello"))
}

/// Send a heartbeat frame; false means the sink is gone
async fn send_heartbeat(sink: &mut WsSink, last_seq: Option<u64>) -> bool {
    let frame = GatewayFrame::heartbeat(last_seq);
    let Ok(json) = frame.to_json() else {
        debug!("Heartbeat frame failed to serialize");
        return true;
    };
    if let Err(error) = sink.send(Message::Text(json)).await {
        warn!(%error, "Heartbeat send failed");
        return false;
    }
    true
}

/// A dispatch payload after decoding
#[derive(Debug)]
enum Decoded {
    /// Ready to route
    Event(GatewayEvent),
    /// Needs a remaining-count lookup before it becomes an event
    ReactionRemoval {
        channel_id: Snowflake,
        post_id: Snowflake,
        user_id: Snowflake,
        emoji: String,
    },
    /// Not for this bot: foreign channel, foreign guild, partial payload,
    /// or an event kind the bot does not consume
    Skip,
}

/// Decode a dispatch payload into a domain event
///
/// Filtering happens here: only the configured channel's messages and the
/// configured guild's membership pass through.
fn decode_dispatch(
    bot: &BotConfig,
    event_type: &str,
    data: Value,
) -> Result<Decoded, serde_json::Error> {
    let decoded = match event_type {
        "READY" => {
            let ready: WireReady = serde_json::from_value(data)?;
            info!(
                user = %ready.user.username,
                session = ready.session_id.as_deref().unwrap_or("-"),
                "Gateway ready"
            );
            Decoded::Skip
        }

        "GUILD_CREATE" => {
            let guild: WireGuild = serde_json::from_value(data)?;
            if guild.id != bot.guild_id {
                debug!(guild = %guild.id, "Foreign guild ignored");
                return Ok(Decoded::Skip);
            }
            info!(members = guild.members.len(), "Membership snapshot received");
            Decoded::Event(GatewayEvent::MembershipSnapshot(MembershipSnapshotEvent {
                members: guild
                    .members
                    .iter()
                    .map(|member| member.identity(&bot.cdn_base))
                    .collect(),
            }))
        }

        "MESSAGE_CREATE" => {
            let message: WireMessage = serde_json::from_value(data)?;
            if message.channel_id != bot.channel_id {
                return Ok(Decoded::Skip);
            }
            let (Some(author), Some(content), Some(timestamp)) = (
                message.author_identity(&bot.cdn_base),
                message.content,
                message.timestamp,
            ) else {
                debug!(post_id = %message.id, "Partial message payload skipped");
                return Ok(Decoded::Skip);
            };
            Decoded::Event(GatewayEvent::PostCreated(PostCreatedEvent {
                post_id: message.id,
                channel_id: message.channel_id,
                author,
                content,
                attachments: message.attachments.into_iter().map(Into::into).collect(),
                timestamp,
            }))
        }

        "MESSAGE_UPDATE" => {
            let message: WireMessage = serde_json::from_value(data)?;
            if message.channel_id != bot.channel_id {
                return Ok(Decoded::Skip);
            }
            let (Some(author), Some(content)) =
                (message.author_identity(&bot.cdn_base), message.content)
            else {
                // Embed crawls and pin changes arrive as partial updates
                debug!(post_id = %message.id, "Partial update payload skipped");
                return Ok(Decoded::Skip);
            };
            Decoded::Event(GatewayEvent::PostEdited(PostEditedEvent {
                post_id: message.id,
                channel_id: message.channel_id,
                author,
                content,
                attachments: message.attachments.into_iter().map(Into::into).collect(),
            }))
        }

        "MESSAGE_DELETE" => {
            let message: WireMessageDelete = serde_json::from_value(data)?;
            if message.channel_id != bot.channel_id {
                return Ok(Decoded::Skip);
            }
            Decoded::Event(GatewayEvent::PostDeleted(PostDeletedEvent {
                post_id: message.id,
                channel_id: message.channel_id,
            }))
        }

        "MESSAGE_REACTION_ADD" => {
            let reaction: WireReaction = serde_json::from_value(data)?;
            if reaction.channel_id != bot.channel_id {
                return Ok(Decoded::Skip);
            }
            let Some(emoji) = reaction.emoji.key() else {
                return Ok(Decoded::Skip);
            };
            Decoded::Event(GatewayEvent::ReactionAdded(ReactionAddedEvent {
                post_id: reaction.message_id,
                channel_id: reaction.channel_id,
                user_id: reaction.user_id,
                emoji,
            }))
        }

        "MESSAGE_REACTION_REMOVE" => {
            let reaction: WireReaction = serde_json::from_value(data)?;
            if reaction.channel_id != bot.channel_id {
                return Ok(Decoded::Skip);
            }
            let Some(emoji) = reaction.emoji.key() else {
                return Ok(Decoded::Skip);
            };
            Decoded::ReactionRemoval {
                channel_id: reaction.channel_id,
                post_id: reaction.message_id,
                user_id: reaction.user_id,
                emoji,
            }
        }

        "MESSAGE_REACTION_REMOVE_EMOJI" => {
            let cleared: WireReactionClearEmoji = serde_json::from_value(data)?;
            if cleared.channel_id != bot.channel_id {
                return Ok(Decoded::Skip);
            }
            let Some(emoji) = cleared.emoji.key() else {
                return Ok(Decoded::Skip);
            };
            Decoded::Event(GatewayEvent::ReactionClearedOne(ReactionClearedOneEvent {
                post_id: cleared.message_id,
                channel_id: cleared.channel_id,
                emoji,
            }))
        }

        "MESSAGE_REACTION_REMOVE_ALL" => {
            let cleared: WireReactionClearAll = serde_json::from_value(data)?;
            if cleared.channel_id != bot.channel_id {
                return Ok(Decoded::Skip);
            }
            Decoded::Event(GatewayEvent::ReactionClearedAll(ReactionClearedAllEvent {
                post_id: cleared.message_id,
                channel_id: cleared.channel_id,
            }))
        }

        "GUILD_MEMBER_UPDATE" => {
            let update: WireMemberUpdate = serde_json::from_value(data)?;
            if update.guild_id != bot.guild_id {
                return Ok(Decoded::Skip);
            }
            Decoded::Event(GatewayEvent::MemberProfileUpdated(
                MemberProfileUpdatedEvent {
                    member: update.identity(&bot.cdn_base),
                },
            ))
        }

        "USER_UPDATE" => {
            let user: WireUser = serde_json::from_value(data)?;
            Decoded::Event(GatewayEvent::MemberProfileUpdated(
                MemberProfileUpdatedEvent {
                    member: user.identity(&bot.cdn_base, None, Vec::new()),
                },
            ))
        }

        other => {
            debug!(event_type = other, "Unhandled event type");
            Decoded::Skip
        }
    };

    Ok(decoded)
}
