use crate::bot::driver::{ConversationDriver, InboundEvent, Input};
use crate::bot::redelivery::RedeliveryGuard;
use crate::bot::replies::TelegramReplies;
use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::User;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

/// Supported commands
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Open the product menu
    #[command(description = "открыть меню товаров")]
    Start,
}

/// Name of the sender: username, else first name, else "Unknown"
#[must_use]
pub fn get_user_name(user: Option<&User>) -> String {
    user.map_or_else(
        || "Unknown".to_string(),
        |u| u.username.clone().unwrap_or_else(|| u.first_name.clone()),
    )
}

/// Build the conversation event for a button press
#[must_use]
pub fn callback_event(q: &CallbackQuery) -> Option<InboundEvent> {
    let data = q.data.clone()?;
    let (chat_id, message_id) = match &q.message {
        Some(message) => (message.chat().id.0, Some(message.id().0)),
        // Private chat ids are user ids
        None => (q.from.id.0.cast_signed(), None),
    };
    Some(InboundEvent {
        chat_id,
        message_id,
        sender_name: get_user_name(Some(&q.from)),
        input: Input::Callback(data),
    })
}

/// Build the conversation event for a text message
#[must_use]
pub fn message_event(msg: &Message) -> Option<InboundEvent> {
    let text = msg.text()?;
    Some(InboundEvent {
        chat_id: msg.chat.id.0,
        message_id: Some(msg.id.0),
        sender_name: get_user_name(msg.from.as_ref()),
        input: Input::Text(text.to_string()),
    })
}

/// Handle a button press
///
/// # Errors
///
/// Returns an error if the conversation step fails.
pub async fn handle_callback(
    bot: Bot,
    update_id: u32,
    q: CallbackQuery,
    driver: &ConversationDriver,
    guard: &RedeliveryGuard,
) -> Result<()> {
    if !guard.first_delivery(update_id).await {
        return Ok(());
    }

    // Stops the client-side spinner; the step itself does not depend on it
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        debug!("Failed to answer callback query: {e}");
    }

    let Some(event) = callback_event(&q) else {
        debug!(update_id, "Callback without data ignored");
        return Ok(());
    };
    info!(chat_id = event.chat_id, user = %event.sender_name, "Button pressed");
    driver.process(&TelegramReplies::new(bot), &event).await?;
    Ok(())
}

/// Handle a text message
///
/// # Errors
///
/// Returns an error if the conversation step fails.
pub async fn handle_message(
    bot: Bot,
    update_id: u32,
    msg: Message,
    driver: &ConversationDriver,
    guard: &RedeliveryGuard,
) -> Result<()> {
    if !guard.first_delivery(update_id).await {
        return Ok(());
    }

    let Some(event) = message_event(&msg) else {
        debug!(update_id, chat_id = msg.chat.id.0, "Non-text message ignored");
        return Ok(());
    };
    info!(chat_id = event.chat_id, user = %event.sender_name, "Text received");
    driver.process(&TelegramReplies::new(bot), &event).await?;
    Ok(())
}
