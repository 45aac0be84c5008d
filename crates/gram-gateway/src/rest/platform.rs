//! HTTP implementation of the `Platform` port
//!
//! Every outbound action the services request becomes a REST call against
//! the platform API. Authorization rides on a default header; 429 responses
//! honor `retry_after` once and give up on a second limit.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use gram_common::BotConfig;
use gram_core::{
    parse_custom_emoji, DomainError, MemberIdentity, Platform, PlatformResult, PlatformRole,
    Snowflake,
};

use super::types::{
    CreateDmBody, CreateMessageBody, CreateRoleBody, CreateThreadBody, RateLimitBody, RestChannel,
    RestMessage, RestRole,
};
use crate::error::GatewayError;
use crate::protocol::WireMember;

/// Request timeout for all REST calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for the member list endpoint
const MEMBER_PAGE_SIZE: usize = 1000;

/// REST adapter behind the `Platform` port
pub struct HttpPlatform {
    http: reqwest::Client,
    api_base: String,
    cdn_base: String,
    guild_id: Snowflake,
}

impl HttpPlatform {
    /// Build a client with the bot token installed as a default header
    pub fn new(bot: &BotConfig) -> Result<Self, GatewayError> {
        let mut auth = HeaderValue::from_str(&format!("Bot {}", bot.token))
            .map_err(|_| GatewayError::protocol("bot token is not a valid header value"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .user_agent(concat!("gram/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_base: bot.api_base.trim_end_matches('/').to_string(),
            cdn_base: bot.cdn_base.trim_end_matches('/').to_string(),
            guild_id: bot.guild_id,
        })
    }

    /// Total reactions still on a post for one emoji
    ///
    /// Removal payloads carry no counts, so the decoder re-reads the
    /// message to learn whether the last reaction just disappeared.
    pub async fn remaining_reactions(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
        emoji: &str,
    ) -> PlatformResult<i64> {
        let message = self.fetch_message(channel_id, post_id).await?;
        Ok(message
            .reactions
            .iter()
            .filter(|reaction| reaction.emoji.key().as_deref() == Some(emoji))
            .map(|reaction| reaction.count)
            .sum())
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    async fn fetch_message(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
    ) -> PlatformResult<RestMessage> {
        let url = self.url(&format!("/channels/{channel_id}/messages/{post_id}"));
        self.get_json(self.http.get(url)).await
    }

    /// Fetch the full member list, following the `after` cursor
    async fn all_members(&self) -> PlatformResult<Vec<WireMember>> {
        let mut members: Vec<WireMember> = Vec::new();
        let mut after: Option<Snowflake> = None;

        loop {
            let mut url = self.url(&format!(
                "/guilds/{}/members?limit={MEMBER_PAGE_SIZE}",
                self.guild_id
            ));
            if let Some(cursor) = after {
                url.push_str(&format!("&after={cursor}"));
            }

            let page: Vec<WireMember> = self.get_json(self.http.get(url)).await?;
            let full_page = page.len() == MEMBER_PAGE_SIZE;
            after = page.last().map(|member| member.user.id);
            members.extend(page);

            if !full_page {
                break;
            }
        }

        debug!(members = members.len(), "Member list fetched");
        Ok(members)
    }

    /// Send a request, retrying once when rate limited
    async fn execute(&self, request: reqwest::RequestBuilder) -> PlatformResult<Response> {
        let retry = request.try_clone();
        let response = request.send().await.map_err(to_platform_error)?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            if let Some(retry_request) = retry {
                let wait = response
                    .json::<RateLimitBody>()
                    .await
                    .map_or(1.0, |body| body.retry_after);
                warn!(seconds = wait, "Rate limited; retrying once");
                tokio::time::sleep(Duration::from_secs_f64(wait)).await;

                let response = retry_request.send().await.map_err(to_platform_error)?;
                return check_status(response).await;
            }
        }

        check_status(response).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> PlatformResult<T> {
        self.execute(request)
            .await?
            .json()
            .await
            .map_err(to_platform_error)
    }
}

#[async_trait]
impl Platform for HttpPlatform {
    async fn delete_post(&self, channel_id: Snowflake, post_id: Snowflake) -> PlatformResult<()> {
        let url = self.url(&format!("/channels/{channel_id}/messages/{post_id}"));
        self.execute(self.http.delete(url)).await?;
        Ok(())
    }

    async fn send_direct_message(&self, user_id: Snowflake, content: &str) -> PlatformResult<()> {
        let dm: RestChannel = self
            .get_json(
                self.http
                    .post(self.url("/users/@me/channels"))
                    .json(&CreateDmBody { recipient_id: user_id }),
            )
            .await?;

        let url = self.url(&format!("/channels/{}/messages", dm.id));
        self.execute(self.http.post(url).json(&CreateMessageBody { content }))
            .await?;
        Ok(())
    }

    async fn create_thread(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
        title: &str,
    ) -> PlatformResult<Snowflake> {
        let url = self.url(&format!("/channels/{channel_id}/messages/{post_id}/threads"));
        let thread: RestChannel = self
            .get_json(self.http.post(url).json(&CreateThreadBody { name: title }))
            .await?;
        Ok(thread.id)
    }

    async fn send_threaded_message(
        &self,
        thread_id: Snowflake,
        content: &str,
    ) -> PlatformResult<()> {
        let url = self.url(&format!("/channels/{thread_id}/messages"));
        self.execute(self.http.post(url).json(&CreateMessageBody { content }))
            .await?;
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
        emoji: &str,
    ) -> PlatformResult<()> {
        let url = self.reaction_url(channel_id, post_id, emoji)?;
        self.execute(self.http.put(url)).await?;
        Ok(())
    }

    async fn remove_reaction(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
        emoji: &str,
    ) -> PlatformResult<()> {
        let url = self.reaction_url(channel_id, post_id, emoji)?;
        self.execute(self.http.delete(url)).await?;
        Ok(())
    }

    async fn own_reactions(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
    ) -> PlatformResult<Vec<String>> {
        let message = self.fetch_message(channel_id, post_id).await?;
        Ok(message
            .reactions
            .into_iter()
            .filter(|reaction| reaction.me)
            .filter_map(|reaction| reaction.emoji.key())
            .collect())
    }

    async fn guild_roles(&self) -> PlatformResult<Vec<PlatformRole>> {
        let url = self.url(&format!("/guilds/{}/roles", self.guild_id));
        let roles: Vec<RestRole> = self.get_json(self.http.get(url)).await?;
        Ok(roles.into_iter().map(Into::into).collect())
    }

    async fn create_role(
        &self,
        name: &str,
        icon_png: Option<&[u8]>,
    ) -> PlatformResult<PlatformRole> {
        let url = self.url(&format!("/guilds/{}/roles", self.guild_id));
        let body = CreateRoleBody {
            name,
            icon: icon_png.map(icon_data_uri),
        };
        let role: RestRole = self.get_json(self.http.post(url).json(&body)).await?;
        Ok(role.into())
    }

    async fn delete_role(&self, role_id: Snowflake) -> PlatformResult<()> {
        let url = self.url(&format!("/guilds/{}/roles/{role_id}", self.guild_id));
        self.execute(self.http.delete(url)).await?;
        Ok(())
    }

    async fn assign_role(&self, user_id: Snowflake, role_id: Snowflake) -> PlatformResult<()> {
        let url = self.url(&format!(
            "/guilds/{}/members/{user_id}/roles/{role_id}",
            self.guild_id
        ));
        self.execute(self.http.put(url)).await?;
        Ok(())
    }

    async fn unassign_role(&self, user_id: Snowflake, role_id: Snowflake) -> PlatformResult<()> {
        let url = self.url(&format!(
            "/guilds/{}/members/{user_id}/roles/{role_id}",
            self.guild_id
        ));
        self.execute(self.http.delete(url)).await?;
        Ok(())
    }

    async fn role_member_count(&self, role_id: Snowflake) -> PlatformResult<usize> {
        let members = self.all_members().await?;
        Ok(members
            .iter()
            .filter(|member| member.roles.contains(&role_id))
            .count())
    }

    async fn fetch_members(&self) -> PlatformResult<Vec<MemberIdentity>> {
        let members = self.all_members().await?;
        Ok(members
            .iter()
            .map(|member| member.identity(&self.cdn_base))
            .collect())
    }
}

impl HttpPlatform {
    /// URL for the bot's own reaction on a post
    fn reaction_url(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
        emoji: &str,
    ) -> PlatformResult<reqwest::Url> {
        let base = self.url(&format!("/channels/{channel_id}/messages/{post_id}/reactions"));
        let mut url = reqwest::Url::parse(&base)
            .map_err(|error| DomainError::PlatformError(format!("bad api base: {error}")))?;
        url.path_segments_mut()
            .map_err(|()| DomainError::PlatformError("api base cannot hold paths".to_string()))?
            .push(&emoji_path_form(emoji))
            .push("@me");
        Ok(url)
    }
}

/// Emoji as it appears in a reaction endpoint path
///
/// Custom emojis use the `name:id` form; unicode emojis go in as the glyph
/// and get percent-encoded with the rest of the path segment.
fn emoji_path_form(emoji: &str) -> String {
    match parse_custom_emoji(emoji) {
        Some(custom) => format!("{}:{}", custom.name, custom.id),
        None => emoji.to_string(),
    }
}

/// PNG bytes as the base64 data URI the role endpoints expect
fn icon_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(png))
}

async fn check_status(response: Response) -> PlatformResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    Err(DomainError::PlatformError(format!(
        "platform returned {status}: {snippet}"
    )))
}

fn to_platform_error(error: reqwest::Error) -> DomainError {
    DomainError::PlatformError(error.to_string())
}
