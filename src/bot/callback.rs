//! Inline button payloads.
//!
//! Every button carries a namespaced payload, so navigation buttons can never
//! be confused with product or line-item ids, and typed text is never read as
//! a button press.

use std::fmt;

/// Quantities offered on a product card
pub const QUANTITY_CHOICES: [u32; 3] = [1, 3, 5];

/// Telegram's limit on `callback_data`, in bytes
pub const CALLBACK_DATA_LIMIT: usize = 64;

const CART: &str = "cart";
const BACK: &str = "back";
const TO_MENU: &str = "menu";
const PAY: &str = "pay";
const PRODUCT_PREFIX: &str = "product:";
const ADD_PREFIX: &str = "add:";
const REMOVE_PREFIX: &str = "remove:";

/// Action behind an inline button
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Open the cart
    Cart,
    /// Leave the product card for the menu
    Back,
    /// Leave the cart for the menu
    ToMenu,
    /// Start checkout
    Pay,
    /// Open a product card
    Product {
        /// Backend product id
        id: String,
    },
    /// Put a product into the cart
    AddToCart {
        /// Number of units
        quantity: u32,
        /// Backend product id
        product_id: String,
    },
    /// Drop a line item from the cart
    RemoveItem {
        /// Backend cart item id
        item_id: String,
    },
}

impl CallbackAction {
    /// Encode as `callback_data`
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode `callback_data`; `None` for anything this bot never produced
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            CART => return Some(Self::Cart),
            BACK => return Some(Self::Back),
            TO_MENU => return Some(Self::ToMenu),
            PAY => return Some(Self::Pay),
            _ => {}
        }

        if let Some(id) = data.strip_prefix(PRODUCT_PREFIX) {
            return non_empty(id).map(|id| Self::Product { id });
        }
        if let Some(item_id) = data.strip_prefix(REMOVE_PREFIX) {
            return non_empty(item_id).map(|item_id| Self::RemoveItem { item_id });
        }
        let (quantity, product_id) = data.strip_prefix(ADD_PREFIX)?.split_once(':')?;
        let quantity = quantity.parse::<u32>().ok().filter(|q| *q > 0)?;
        non_empty(product_id).map(|product_id| Self::AddToCart {
            quantity,
            product_id,
        })
    }
}

fn non_empty(id: &str) -> Option<String> {
    (!id.is_empty()).then(|| id.to_string())
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cart => f.write_str(CART),
            Self::Back => f.write_str(BACK),
            Self::ToMenu => f.write_str(TO_MENU),
            Self::Pay => f.write_str(PAY),
            Self::Product { id } => write!(f, "{PRODUCT_PREFIX}{id}"),
            Self::AddToCart {
                quantity,
                product_id,
            } => write!(f, "{ADD_PREFIX}{quantity}:{product_id}"),
            Self::RemoveItem { item_id } => write!(f, "{REMOVE_PREFIX}{item_id}"),
        }
    }
}
