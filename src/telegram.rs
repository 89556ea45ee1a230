use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{Chat, MessageId, ParseMode};
use teloxide::update_listeners::webhooks;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::classifier::parse_command;
use crate::model::{ChatKind, ChatRef, InboundEvent, OutboundMessage, TextFormat, User};

/// Outbound delivery of bot messages.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, msg: &OutboundMessage) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessageSink for TelegramSink {
    async fn deliver(&self, msg: &OutboundMessage) -> Result<()> {
        let mut request = self.bot.send_message(ChatId(msg.chat_id), msg.text.clone());
        if let Some(reply_to) = msg.reply_to {
            request = request.reply_to_message_id(MessageId(reply_to));
        }
        if msg.format == TextFormat::Markdown {
            request = request.parse_mode(legacy_markdown());
        }
        request
            .await
            .with_context(|| format!("sendMessage to chat {} failed", msg.chat_id))?;
        Ok(())
    }
}

/// Replies use `*bold*` and `[text](url)` without MarkdownV2 escaping.
#[allow(deprecated)]
fn legacy_markdown() -> ParseMode {
    ParseMode::Markdown
}

fn chat_ref(chat: &Chat) -> ChatRef {
    let kind = if chat.is_group() {
        ChatKind::Group
    } else if chat.is_supergroup() {
        ChatKind::Supergroup
    } else if chat.is_channel() {
        ChatKind::Channel
    } else {
        ChatKind::Private
    };
    ChatRef {
        id: chat.id.0,
        kind,
    }
}

/// Reduce a Telegram message to the event the dispatcher understands.
pub fn inbound_event(msg: &Message) -> InboundEvent {
    let chat = chat_ref(&msg.chat);

    if let Some(members) = msg.new_chat_members() {
        return InboundEvent::MembershipChange {
            chat,
            new_members: members
                .iter()
                .map(|user| User {
                    handle: user.username.clone(),
                    display_name: user.first_name.clone(),
                })
                .collect(),
        };
    }

    if let Some(name) = msg.text().and_then(parse_command) {
        return InboundEvent::Command {
            chat,
            message_id: msg.id.0,
            name: name.to_string(),
        };
    }

    InboundEvent::Other
}

/// Log the authorized bot account; fails when the token is rejected.
pub async fn log_bot_identity(bot: &Bot, debug_mode: bool) -> Result<()> {
    let me = bot.get_me().await.context("failed to init Telegram Bot API")?;
    info!(
        account = me.username.as_deref().unwrap_or_default(),
        debug = debug_mode,
        "authorized on account"
    );
    Ok(())
}

/// Forward Telegram messages into `events` until the listener stops
/// (Ctrl-C). Uses a webhook when `webhook` is set, long polling otherwise.
#[instrument(skip_all)]
pub async fn listen(
    bot: Bot,
    events: mpsc::Sender<InboundEvent>,
    webhook: Option<webhooks::Options>,
) -> Result<()> {
    let handler = move |msg: Message| {
        let events = events.clone();
        async move {
            debug!(chat_id = msg.chat.id.0, message_id = msg.id.0, "inbound message");
            let event = inbound_event(&msg);
            if events.send(event).await.is_err() {
                warn!("dispatcher is gone; dropping inbound message");
            }
            respond(())
        }
    };

    match webhook {
        Some(options) => {
            let listener = webhooks::axum(bot.clone(), options)
                .await
                .context("failed to set webhook")?;
            let info = bot
                .get_webhook_info()
                .await
                .context("failed to get webhook info")?;
            info!(
                url = %redact_token(info.url.as_ref().map(|u| u.as_str()).unwrap_or_default(), bot.token()),
                pending_updates = info.pending_update_count,
                "webhook registered"
            );
            teloxide::repl_with_listener(bot, handler, listener).await;
        }
        None => {
            info!("starting long polling");
            teloxide::repl(bot, handler).await;
        }
    }
    Ok(())
}

fn redact_token(url: &str, token: &str) -> String {
    if token.is_empty() {
        url.to_string()
    } else {
        url.replace(token, "[REDACTED]")
    }
}
