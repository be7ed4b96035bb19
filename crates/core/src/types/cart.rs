//! The cart value and its items.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s with at most one item per
//! [`ProductId`]. Order is first-add order. Carts are never mutated in place
//! from outside this module: every change produces a new value, which is what
//! lets the store persist the next cart before committing it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::ProductInfo;

/// A product in the cart together with the quantity the user wants.
///
/// Serializes flat, so the stored JSON looks like
/// `{"id":1,"title":"...","price":179.9,"image":"...","amount":2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: ProductInfo,
    pub amount: u32,
}

impl CartItem {
    /// Create a cart item from catalog info.
    ///
    /// An `amount` attribute coming from the catalog is dropped so it cannot
    /// shadow the cart quantity when serialized.
    #[must_use]
    pub fn new(mut product: ProductInfo, amount: u32) -> Self {
        product.extra.remove("amount");
        Self { product, amount }
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times amount.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.price * self.amount
    }
}

/// Request to set a cart item's quantity.
///
/// `amount` is signed on purpose: callers may ask for zero or negative
/// quantities (a "minus" button pressed at 1) and the store rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i32,
}

/// Ordered, id-unique collection of cart items.
///
/// Serializes as a plain JSON array. Deserializing drops later duplicates of
/// an id and items with a zero amount, so a hand-edited blob cannot break
/// uniqueness or the one-unit minimum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from items, keeping the first item for each product id.
    /// Items with a zero amount are skipped.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.amount >= 1 && !cart.contains(item.id()) {
                cart.items.push(item);
            }
        }
        cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == product_id)
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all item amounts.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all item subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Amount already in the cart for each product, for product listings.
    #[must_use]
    pub fn amounts(&self) -> BTreeMap<ProductId, u32> {
        self.items
            .iter()
            .map(|item| (item.id(), item.amount))
            .collect()
    }

    /// A new cart with `item` appended.
    ///
    /// If the product is already present the cart is returned unchanged;
    /// quantity changes go through [`Cart::with_amount`].
    #[must_use]
    pub fn with_item(&self, item: CartItem) -> Self {
        if self.contains(item.id()) {
            return self.clone();
        }
        let mut items = self.items.clone();
        items.push(item);
        Self { items }
    }

    /// A new cart without the given product.
    #[must_use]
    pub fn without(&self, product_id: ProductId) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|item| item.id() != product_id)
                .cloned()
                .collect(),
        }
    }

    /// A new cart where the given product has `amount`. Other items are
    /// untouched; a product not in the cart leaves it unchanged.
    #[must_use]
    pub fn with_amount(&self, product_id: ProductId, amount: u32) -> Self {
        Self {
            items: self
                .items
                .iter()
                .map(|item| {
                    if item.id() == product_id {
                        CartItem {
                            amount,
                            ..item.clone()
                        }
                    } else {
                        item.clone()
                    }
                })
                .collect(),
        }
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
