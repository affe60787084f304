//! Storefront UI components
//!
//! Contains keyboards, text messages, and formatters for the shop dialogue.

use crate::bot::callback::{CallbackAction, QUANTITY_CHOICES};
use crate::commerce::{Cart, CartItem, Product};
use crate::utils::truncate_str;
use std::fmt::Write as _;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Telegram caption limit for photos
pub const CAPTION_LIMIT: usize = 1024;
/// Message limit with a safety margin below Telegram's 4096
pub const MESSAGE_LIMIT: usize = 4000;

// ─────────────────────────────────────────────────────────────────────────────
// Trait definition
// ─────────────────────────────────────────────────────────────────────────────

/// Texts shown by the storefront dialogue
pub trait ShopView {
    /// Greeting above the product menu
    fn greeting() -> &'static str;
    /// Shown when leaving a product card
    fn back_to_menu() -> &'static str;
    /// Shown when leaving the cart
    fn returning_to_menu() -> &'static str;
    /// Shown after a line item was removed
    fn item_removed() -> &'static str;
    /// Shown after products were added
    fn added_to_cart(quantity: u32) -> String;
    /// Cart has no items
    fn cart_empty() -> &'static str;
    /// Asks for the checkout email
    fn email_prompt() -> &'static str;
    /// Checkout email was stored
    fn email_saved() -> &'static str;
    /// Unit of the quantity buttons
    fn quantity_label(quantity: u32) -> String;
    /// Caption of the cart button
    fn cart_button() -> &'static str;
    /// Caption of the back button
    fn back_button() -> &'static str;
    /// Caption of the to-menu button
    fn to_menu_button() -> &'static str;
    /// Caption of the pay button
    fn pay_button() -> &'static str;
    /// Caption of a remove button
    fn remove_button(item_name: &str) -> String;
}

// ─────────────────────────────────────────────────────────────────────────────
// Default implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Default Russian-language implementation of `ShopView`
pub struct DefaultShopView;

impl ShopView for DefaultShopView {
    fn greeting() -> &'static str {
        "Привет! Выберите товар:"
    }

    fn back_to_menu() -> &'static str {
        "Назад к товарам:"
    }

    fn returning_to_menu() -> &'static str {
        "Возврат в меню."
    }

    fn item_removed() -> &'static str {
        "Товар убран из корзины. Возврат в меню."
    }

    fn added_to_cart(quantity: u32) -> String {
        format!("✅ Добавлено в корзину: {quantity} кг. Выберите ещё товар или откройте корзину.")
    }

    fn cart_empty() -> &'static str {
        "Корзина пуста"
    }

    fn email_prompt() -> &'static str {
        "Введите, пожалуйста, ваш email"
    }

    fn email_saved() -> &'static str {
        "Email сохранён. Возврат в меню."
    }

    fn quantity_label(quantity: u32) -> String {
        format!("{quantity} кг")
    }

    fn cart_button() -> &'static str {
        "🛒 Корзина"
    }

    fn back_button() -> &'static str {
        "⬅️ Назад"
    }

    fn to_menu_button() -> &'static str {
        "📋 В меню"
    }

    fn pay_button() -> &'static str {
        "💳 Оплатить"
    }

    fn remove_button(item_name: &str) -> String {
        format!("❌ Убрать из корзины {item_name}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Keyboards
// ─────────────────────────────────────────────────────────────────────────────

fn button(text: impl Into<String>, action: &CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, action.encode())
}

/// One button per product plus the cart button
#[must_use]
pub fn product_menu_keyboard(products: &[Product]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = products
        .iter()
        .map(|product| {
            vec![button(
                product.name.clone(),
                &CallbackAction::Product {
                    id: product.id.clone(),
                },
            )]
        })
        .collect();
    rows.push(vec![button(
        DefaultShopView::cart_button(),
        &CallbackAction::Cart,
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Quantity row, cart and back buttons under a product card
#[must_use]
pub fn product_card_keyboard(product_id: &str) -> InlineKeyboardMarkup {
    let quantities: Vec<InlineKeyboardButton> = QUANTITY_CHOICES
        .iter()
        .map(|&quantity| {
            button(
                DefaultShopView::quantity_label(quantity),
                &CallbackAction::AddToCart {
                    quantity,
                    product_id: product_id.to_string(),
                },
            )
        })
        .collect();
    InlineKeyboardMarkup::new(vec![
        quantities,
        vec![button(DefaultShopView::cart_button(), &CallbackAction::Cart)],
        vec![button(DefaultShopView::back_button(), &CallbackAction::Back)],
    ])
}

/// Menu and pay buttons, then one remove button per line item
#[must_use]
pub fn cart_keyboard(items: &[CartItem]) -> InlineKeyboardMarkup {
    let mut rows = vec![
        vec![button(
            DefaultShopView::to_menu_button(),
            &CallbackAction::ToMenu,
        )],
        vec![button(DefaultShopView::pay_button(), &CallbackAction::Pay)],
    ];
    rows.extend(items.iter().map(|item| {
        vec![button(
            DefaultShopView::remove_button(&item.name),
            &CallbackAction::RemoveItem {
                item_id: item.id.clone(),
            },
        )]
    }));
    InlineKeyboardMarkup::new(rows)
}

// ─────────────────────────────────────────────────────────────────────────────
// Formatters
// ─────────────────────────────────────────────────────────────────────────────

/// Caption of a product card
#[must_use]
pub fn product_caption(product: &Product) -> String {
    let text = format!(
        "{}\n\n{}\n{}\n",
        product.name,
        product.price(),
        product.description
    );
    truncate_str(text, CAPTION_LIMIT)
}

/// Whole cart as one message: every line item, then the total
#[must_use]
pub fn cart_summary(items: &[CartItem], cart: &Cart) -> String {
    if items.is_empty() {
        return DefaultShopView::cart_empty().to_string();
    }

    let mut text = String::new();
    for item in items {
        let _ = write!(
            text,
            "{}\n{}\n{} за кг\n{} кг в корзине на сумму {}\n\n",
            item.name,
            item.description,
            item.unit_price(),
            item.quantity,
            item.line_price()
        );
    }
    let _ = write!(text, "Итого: {}", cart.total());
    truncate_str(text, MESSAGE_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commerce::models::{
        CartItemMeta, CartMeta, FormattedPrice, LineDisplayPrice, LinePrice, ProductPrice,
    };
    use teloxide::types::InlineKeyboardButtonKind;

    fn item(id: &str, name: &str, quantity: u32) -> CartItem {
        CartItem {
            id: id.to_string(),
            product_id: format!("p-{id}"),
            name: name.to_string(),
            description: "Свежая".to_string(),
            quantity,
            meta: CartItemMeta {
                display_price: LineDisplayPrice {
                    with_tax: LinePrice {
                        unit: FormattedPrice {
                            formatted: "100 ₽".to_string(),
                        },
                        value: FormattedPrice {
                            formatted: format!("{} ₽", 100 * quantity),
                        },
                    },
                },
            },
        }
    }

    fn cart(total: &str) -> Cart {
        Cart {
            id: "42".to_string(),
            meta: CartMeta {
                display_price: ProductPrice {
                    with_tax: FormattedPrice {
                        formatted: total.to_string(),
                    },
                },
            },
        }
    }

    fn callback_data(keyboard: &InlineKeyboardMarkup) -> Vec<Vec<String>> {
        keyboard
            .inline_keyboard
            .iter()
            .map(|row| {
                row.iter()
                    .filter_map(|b| match &b.kind {
                        InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_product_card_offers_fixed_quantities() {
        let data = callback_data(&product_card_keyboard("p-1"));
        assert_eq!(
            data,
            vec![
                vec!["add:1:p-1", "add:3:p-1", "add:5:p-1"],
                vec!["cart"],
                vec!["back"],
            ]
        );
    }

    #[test]
    fn test_cart_keyboard_has_remove_button_per_item() {
        let items = vec![item("ci-1", "Лосось", 3), item("ci-2", "Форель", 1)];
        let data = callback_data(&cart_keyboard(&items));
        assert_eq!(
            data,
            vec![
                vec!["menu"],
                vec!["pay"],
                vec!["remove:ci-1"],
                vec!["remove:ci-2"],
            ]
        );
    }

    #[test]
    fn test_cart_summary_is_one_consolidated_text() {
        let items = vec![item("ci-1", "Лосось", 3), item("ci-2", "Форель", 1)];
        let text = cart_summary(&items, &cart("400 ₽"));
        assert!(text.starts_with("Лосось\nСвежая\n100 ₽ за кг\n3 кг в корзине на сумму 300 ₽"));
        assert!(text.contains("Форель"));
        assert!(text.ends_with("Итого: 400 ₽"));
    }

    #[test]
    fn test_empty_cart_summary() {
        assert_eq!(cart_summary(&[], &cart("0 ₽")), DefaultShopView::cart_empty());
    }

    #[test]
    fn test_product_caption_is_bounded() {
        let product = Product {
            id: "p-1".to_string(),
            name: "Лосось".to_string(),
            description: "ы".repeat(CAPTION_LIMIT * 2),
            meta: crate::commerce::models::ProductMeta::default(),
            relationships: crate::commerce::models::ProductRelationships::default(),
        };
        let caption = product_caption(&product);
        assert_eq!(caption.chars().count(), CAPTION_LIMIT);
        assert!(caption.starts_with("Лосось\n\n"));
    }
}
