//! Outbound replies.
//!
//! The driver talks to the chat through [`ChatReplies`]; [`TelegramReplies`]
//! sends through the Bot API and retries transient failures.

use crate::utils::retry_telegram_operation;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardMarkup, InputFile, MessageId};

/// Messages the conversation can send
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatReplies: Send + Sync {
    /// Send a text message, optionally with an inline keyboard
    async fn send_text(
        &self,
        chat_id: i64,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()>;

    /// Send a photo by URL with a caption and an inline keyboard
    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: String,
        caption: String,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<()>;

    /// Delete a message the bot sent earlier
    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()>;
}

/// [`ChatReplies`] over the Telegram Bot API
#[derive(Clone)]
pub struct TelegramReplies {
    bot: Bot,
}

impl TelegramReplies {
    /// Wrap a bot handle
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatReplies for TelegramReplies {
    async fn send_text(
        &self,
        chat_id: i64,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let (bot, text, keyboard) = (&self.bot, &text, &keyboard);
        retry_telegram_operation(move || async move {
            let mut req = bot.send_message(ChatId(chat_id), text.clone());
            if let Some(markup) = keyboard.clone() {
                req = req.reply_markup(markup);
            }
            req.await
                .map(|_| ())
                .map_err(|e| anyhow!("Telegram send error: {e}"))
        })
        .await
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: String,
        caption: String,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<()> {
        let url = reqwest::Url::parse(&photo_url)?;
        let (bot, url, caption, keyboard) = (&self.bot, &url, &caption, &keyboard);
        retry_telegram_operation(move || async move {
            bot.send_photo(ChatId(chat_id), InputFile::url(url.clone()))
                .caption(caption.clone())
                .reply_markup(keyboard.clone())
                .await
                .map(|_| ())
                .map_err(|e| anyhow!("Telegram photo error: {e}"))
        })
        .await
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()> {
        self.bot
            .delete_message(ChatId(chat_id), MessageId(message_id))
            .await
            .map(|_| ())
            .map_err(|e| anyhow!("Telegram delete error: {e}"))
    }
}
