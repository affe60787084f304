//! Conversation driver
//!
//! Resolves a chat's state, runs the handler for that state and stores the
//! state the handler returns. A handler that fails (backend or Telegram error)
//! aborts the event before the write-back, so the stored state is unchanged.

use crate::bot::callback::CallbackAction;
use crate::bot::replies::ChatReplies;
use crate::bot::state::State;
use crate::bot::views::{self, DefaultShopView, ShopView};
use crate::commerce::CommerceApi;
use crate::storage::SessionStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Payload of an inbound update
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// Typed text or a command
    Text(String),
    /// Inline button press
    Callback(String),
}

impl Input {
    /// Whether this is the `/start` command, with or without a bot mention
    #[must_use]
    pub fn is_start_command(&self) -> bool {
        let Self::Text(text) = self else {
            return false;
        };
        let command = text.split_whitespace().next().unwrap_or_default();
        command == "/start" || command.starts_with("/start@")
    }
}

/// One inbound update, reduced to what the conversation needs
#[derive(Clone, Debug)]
pub struct InboundEvent {
    /// Chat identity; also the cart id
    pub chat_id: i64,
    /// Message the update refers to (the pressed keyboard's message for callbacks)
    pub message_id: Option<i32>,
    /// Telegram username or first name, used as the customer name
    pub sender_name: String,
    /// Text or button payload
    pub input: Input,
}

/// Runs the storefront state machine
pub struct ConversationDriver {
    commerce: Arc<dyn CommerceApi>,
    sessions: Arc<dyn SessionStore>,
}

impl ConversationDriver {
    /// Create a driver over a commerce backend and a session store
    #[must_use]
    pub fn new(commerce: Arc<dyn CommerceApi>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { commerce, sessions }
    }

    /// Process one event and return the state that was stored, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store, the commerce backend or a reply
    /// fails. Nothing is written back in that case.
    pub async fn process(
        &self,
        replies: &dyn ChatReplies,
        event: &InboundEvent,
    ) -> Result<Option<State>> {
        let state = if event.input.is_start_command() {
            State::Start
        } else {
            self.sessions
                .get_state(event.chat_id)
                .await?
                .unwrap_or_default()
        };

        let turn = Turn {
            commerce: self.commerce.as_ref(),
            replies,
            event,
        };
        let next = match state {
            State::Start => turn.start().await?,
            State::HandleMenu => turn.handle_menu().await?,
            State::HandleDescription => turn.handle_description().await?,
            State::HandleCart => turn.handle_cart().await?,
            State::WaitingEmail => turn.waiting_email().await?,
        };

        match next {
            Some(next) => {
                self.sessions.set_state(event.chat_id, next).await?;
                debug!(chat_id = event.chat_id, %state, next_state = %next, "State updated");
            }
            None => debug!(chat_id = event.chat_id, %state, "Input ignored, state kept"),
        }
        Ok(next)
    }
}

/// Handlers for a single event
struct Turn<'a> {
    commerce: &'a dyn CommerceApi,
    replies: &'a dyn ChatReplies,
    event: &'a InboundEvent,
}

impl Turn<'_> {
    fn chat_id(&self) -> i64 {
        self.event.chat_id
    }

    fn action(&self) -> Option<CallbackAction> {
        match &self.event.input {
            Input::Callback(data) => CallbackAction::parse(data),
            Input::Text(_) => None,
        }
    }

    async fn start(&self) -> Result<Option<State>> {
        self.show_menu(DefaultShopView::greeting()).await?;
        Ok(Some(State::HandleMenu))
    }

    async fn handle_menu(&self) -> Result<Option<State>> {
        match self.action() {
            Some(CallbackAction::Cart) => {
                self.show_cart().await?;
                Ok(Some(State::HandleCart))
            }
            Some(CallbackAction::Product { id }) => {
                self.show_product(id).await?;
                Ok(Some(State::HandleDescription))
            }
            _ => Ok(None),
        }
    }

    async fn handle_description(&self) -> Result<Option<State>> {
        match self.action() {
            Some(CallbackAction::Back) => {
                self.show_menu(DefaultShopView::back_to_menu()).await?;
                Ok(Some(State::HandleMenu))
            }
            Some(CallbackAction::Cart) => {
                self.show_cart().await?;
                Ok(Some(State::HandleCart))
            }
            Some(CallbackAction::AddToCart {
                quantity,
                product_id,
            }) => {
                info!(chat_id = self.chat_id(), %product_id, quantity, "Adding to cart");
                self.commerce
                    .add_cart_item(self.chat_id(), product_id, quantity)
                    .await?;
                self.show_menu(&DefaultShopView::added_to_cart(quantity))
                    .await?;
                Ok(Some(State::HandleMenu))
            }
            _ => Ok(None),
        }
    }

    async fn handle_cart(&self) -> Result<Option<State>> {
        match self.action() {
            Some(CallbackAction::ToMenu) => {
                self.show_menu(DefaultShopView::returning_to_menu()).await?;
                Ok(Some(State::HandleMenu))
            }
            Some(CallbackAction::Pay) => {
                self.replies
                    .send_text(
                        self.chat_id(),
                        DefaultShopView::email_prompt().to_string(),
                        None,
                    )
                    .await?;
                Ok(Some(State::WaitingEmail))
            }
            Some(CallbackAction::RemoveItem { item_id }) => {
                info!(chat_id = self.chat_id(), %item_id, "Removing cart item");
                self.commerce
                    .remove_cart_item(self.chat_id(), item_id)
                    .await?;
                self.show_menu(DefaultShopView::item_removed()).await?;
                Ok(Some(State::HandleMenu))
            }
            _ => Ok(None),
        }
    }

    async fn waiting_email(&self) -> Result<Option<State>> {
        let Input::Text(text) = &self.event.input else {
            return Ok(None);
        };
        let email = text.trim();
        if email.is_empty() {
            return Ok(None);
        }

        let customer = self
            .commerce
            .create_customer(self.event.sender_name.clone(), email.to_string())
            .await?;
        info!(chat_id = self.chat_id(), customer_id = %customer.id, "Customer created");
        self.show_menu(DefaultShopView::email_saved()).await?;
        Ok(Some(State::HandleMenu))
    }

    async fn show_menu(&self, text: &str) -> Result<()> {
        let products = self.commerce.list_products().await?;
        self.replies
            .send_text(
                self.chat_id(),
                text.to_string(),
                Some(views::product_menu_keyboard(&products)),
            )
            .await
    }

    async fn show_cart(&self) -> Result<()> {
        let items = self.commerce.get_cart_items(self.chat_id()).await?;
        let cart = self.commerce.get_cart(self.chat_id()).await?;
        self.replies
            .send_text(
                self.chat_id(),
                views::cart_summary(&items, &cart),
                Some(views::cart_keyboard(&items)),
            )
            .await
    }

    async fn show_product(&self, product_id: String) -> Result<()> {
        let product = self.commerce.get_product(product_id).await?;
        let caption = views::product_caption(&product);
        let keyboard = views::product_card_keyboard(&product.id);

        match product.main_image_id() {
            Some(file_id) => {
                let url = self.commerce.get_image_url(file_id.to_string()).await?;
                self.replies
                    .send_photo(self.chat_id(), url, caption, keyboard)
                    .await?;
            }
            None => {
                self.replies
                    .send_text(self.chat_id(), caption, Some(keyboard))
                    .await?;
            }
        }

        // The menu message is replaced by the card; a stale menu is harmless
        if let Some(message_id) = self.event.message_id {
            if let Err(e) = self
                .replies
                .delete_message(self.chat_id(), message_id)
                .await
            {
                warn!(chat_id = self.chat_id(), message_id, "Failed to delete menu message: {e}");
            }
        }
        Ok(())
    }
}
