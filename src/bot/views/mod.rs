//! View layer for Telegram bot
//!
//! Keyboards, texts and formatters, kept apart from conversation logic.

/// Storefront views
pub mod shop;

pub use shop::{
    cart_keyboard, cart_summary, product_caption, product_card_keyboard, product_menu_keyboard,
    DefaultShopView, ShopView,
};
