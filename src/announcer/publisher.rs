use std::sync::Arc;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Url;
use teloxide::{ApiError, Bot, RequestError};
use teloxide::payloads::SendMessageSetters;
use teloxide::requests::Requester;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, LinkPreviewOptions, MessageId, Recipient};
use teloxide::types::ParseMode::Html;

/// Outcome of deleting the previous announcement. None of them is an error for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retraction {
    Deleted,
    /// The message is gone already or is too old to be deleted by a bot.
    NotFound,
    Skipped(String),
}

#[async_trait]
pub trait ChannelPublisher: Send + Sync {
    async fn publish(&self, channel: &Recipient, text: &str) -> anyhow::Result<MessageId>;
    async fn retract(&self, channel: &Recipient, message_id: MessageId) -> Retraction;
}

#[async_trait]
impl<T: ChannelPublisher + ?Sized> ChannelPublisher for Arc<T> {
    async fn publish(&self, channel: &Recipient, text: &str) -> anyhow::Result<MessageId> {
        (**self).publish(channel, text).await
    }

    async fn retract(&self, channel: &Recipient, message_id: MessageId) -> Retraction {
        (**self).retract(channel, message_id).await
    }
}

#[derive(Clone, Debug)]
pub struct TelegramPublisher {
    bot: Bot,
    watch_button: InlineKeyboardButton,
}

impl TelegramPublisher {
    pub fn new(bot: Bot, button_label: String, deep_link: Url) -> Self {
        Self {
            bot,
            watch_button: InlineKeyboardButton::url(button_label, deep_link),
        }
    }

    fn keyboard(&self) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup::new([[self.watch_button.clone()]])
    }
}

#[async_trait]
impl ChannelPublisher for TelegramPublisher {
    async fn publish(&self, channel: &Recipient, text: &str) -> anyhow::Result<MessageId> {
        let message = self.bot.send_message(channel.clone(), text)
            .parse_mode(Html)
            .link_preview_options(link_preview_disabled())
            .reply_markup(self.keyboard())
            .await
            .with_context(|| format!("couldn't send a message to {channel:?}"))?;
        Ok(message.id)
    }

    async fn retract(&self, channel: &Recipient, message_id: MessageId) -> Retraction {
        retraction(self.bot.delete_message(channel.clone(), message_id).await)
    }
}

fn retraction<T>(result: Result<T, RequestError>) -> Retraction {
    match result {
        Ok(_) => Retraction::Deleted,
        Err(RequestError::Api(ApiError::MessageToDeleteNotFound | ApiError::MessageCantBeDeleted)) =>
            Retraction::NotFound,
        Err(err) => Retraction::Skipped(err.to_string()),
    }
}

/// `https://t.me/<bot>/<app>` opens the bot's Mini App straight from the channel.
pub fn deep_link(bot_username: &str, app_short_name: &str) -> anyhow::Result<Url> {
    let bot_username = bot_username.trim_start_matches('@');
    let app_short_name = app_short_name.trim_matches('/');
    Url::parse(&format!("https://t.me/{bot_username}/{app_short_name}"))
        .context("couldn't build the deep link to the web app")
}

fn link_preview_disabled() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}
