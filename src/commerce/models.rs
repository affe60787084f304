//! Backend entities, reduced to the fields the bot shows or routes on.

use serde::{Deserialize, Serialize};

/// Every backend response wraps its payload in `data`
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// A formatted amount, e.g. `"$12.00"`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedPrice {
    /// Display string produced by the backend
    #[serde(default)]
    pub formatted: String,
}

/// Price with tax as shown on a product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPrice {
    /// Price including tax
    #[serde(default)]
    pub with_tax: FormattedPrice,
}

/// Product metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMeta {
    /// Display prices
    #[serde(default)]
    pub display_price: ProductPrice,
}

/// Reference to another backend entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipData {
    /// Entity id
    pub id: String,
    /// Entity type, e.g. `main_image`
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Single-entity relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Related entity; absent when the link was removed
    pub data: Option<RelationshipData>,
}

/// Relationships of a product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRelationships {
    /// Main product photo
    pub main_image: Option<Relationship>,
}

/// Catalog product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product id
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Prices
    #[serde(default)]
    pub meta: ProductMeta,
    /// Linked entities
    #[serde(default)]
    pub relationships: ProductRelationships,
}

impl Product {
    /// Formatted price with tax
    #[must_use]
    pub fn price(&self) -> &str {
        &self.meta.display_price.with_tax.formatted
    }

    /// File id of the main image, if the product has one
    #[must_use]
    pub fn main_image_id(&self) -> Option<&str> {
        self.relationships
            .main_image
            .as_ref()
            .and_then(|rel| rel.data.as_ref())
            .map(|data| data.id.as_str())
    }
}

/// Unit and line totals of a cart item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePrice {
    /// Price of one unit
    #[serde(default)]
    pub unit: FormattedPrice,
    /// Price of the whole line
    #[serde(default)]
    pub value: FormattedPrice,
}

/// Display prices of a cart item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDisplayPrice {
    /// Prices including tax
    #[serde(default)]
    pub with_tax: LinePrice,
}

/// Cart item metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemMeta {
    /// Computed prices
    #[serde(default)]
    pub display_price: LineDisplayPrice,
}

/// Line item in a cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Line item id, used for removal
    pub id: String,
    /// Referenced product
    #[serde(default)]
    pub product_id: String,
    /// Product name at the time it was added
    pub name: String,
    /// Product description
    #[serde(default)]
    pub description: String,
    /// Units in the cart
    pub quantity: u32,
    /// Prices
    #[serde(default)]
    pub meta: CartItemMeta,
}

impl CartItem {
    /// Formatted price of one unit
    #[must_use]
    pub fn unit_price(&self) -> &str {
        &self.meta.display_price.with_tax.unit.formatted
    }

    /// Formatted price of the whole line
    #[must_use]
    pub fn line_price(&self) -> &str {
        &self.meta.display_price.with_tax.value.formatted
    }
}

/// Cart metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMeta {
    /// Cart total
    #[serde(default)]
    pub display_price: ProductPrice,
}

/// Cart summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart id, which is the chat id
    pub id: String,
    /// Totals
    #[serde(default)]
    pub meta: CartMeta,
}

impl Cart {
    /// Formatted total with tax
    #[must_use]
    pub fn total(&self) -> &str {
        &self.meta.display_price.with_tax.formatted
    }
}

/// Customer record created at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer id
    pub id: String,
    /// Name taken from the Telegram profile
    pub name: String,
    /// Email typed by the user
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileLink {
    pub href: String,
}

/// Uploaded file; only the public link matters here
#[derive(Debug, Deserialize)]
pub(crate) struct File {
    pub link: FileLink,
}
