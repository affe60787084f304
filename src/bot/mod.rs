/// Inline button payloads
pub mod callback;
/// Conversation state machine
pub mod driver;
/// Telegram update handlers and commands
pub mod handlers;
/// Duplicate update suppression
pub mod redelivery;
/// Outgoing Telegram messages
pub mod replies;
/// Conversation states
pub mod state;
/// Keyboards and texts
pub mod views;

pub use redelivery::RedeliveryGuard;
