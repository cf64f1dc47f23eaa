//! 购物车 (内存存储)
//!
//! Carts live in a `DashMap` keyed by user id. They are per-process and
//! expire after a period of inactivity; a periodic task calls
//! [`CartStore::sweep_expired`].

use crate::order_money;
use dashmap::DashMap;
use shared::error::{AppError, ErrorCode};
use shared::models::{CartItem, CartView, MAX_LINE_QUANTITY};

#[derive(Debug, Clone, Default)]
struct Cart {
    items: Vec<CartItem>,
    updated_at: i64,
}

impl Cart {
    fn view(&self) -> CartView {
        let subtotal =
            order_money::order_total(self.items.iter().map(|i| (i.unit_price, i.quantity)));
        CartView {
            items: self.items.clone(),
            item_count: self.items.iter().map(|i| i.quantity).sum(),
            subtotal,
            updated_at: self.updated_at,
        }
    }

    fn touch(&mut self) {
        self.updated_at = shared::util::now_millis();
    }
}

fn quantity_error(quantity: i32) -> AppError {
    AppError::with_message(
        ErrorCode::CartQuantityExceeded,
        format!("quantity must be between 1 and {MAX_LINE_QUANTITY}, got {quantity}"),
    )
    .with_detail("max", MAX_LINE_QUANTITY)
}

/// In-memory carts for all users
#[derive(Debug)]
pub struct CartStore {
    carts: DashMap<i64, Cart>,
    ttl_millis: i64,
}

impl CartStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            carts: DashMap::new(),
            ttl_millis: ttl_minutes.max(1) * 60_000,
        }
    }

    /// Current cart; empty when the user has none
    pub fn get(&self, user_id: i64) -> CartView {
        self.carts
            .get(&user_id)
            .map(|c| c.view())
            .unwrap_or_else(|| Cart::default().view())
    }

    /// Add a line, merging with an existing line of the same menu item
    ///
    /// The merged quantity is capped at the per-line maximum. The name and
    /// price are refreshed from `item`.
    pub fn add_item(&self, user_id: i64, item: CartItem) -> Result<CartView, AppError> {
        if !(1..=MAX_LINE_QUANTITY).contains(&item.quantity) {
            return Err(quantity_error(item.quantity));
        }

        let mut cart = self.carts.entry(user_id).or_default();
        match cart
            .items
            .iter()
            .position(|line| line.menu_item_id == item.menu_item_id)
        {
            Some(idx) => {
                let line = &mut cart.items[idx];
                line.quantity = (line.quantity + item.quantity).min(MAX_LINE_QUANTITY);
                line.name = item.name;
                line.unit_price = item.unit_price;
                if item.note.is_some() {
                    line.note = item.note;
                }
            }
            None => cart.items.push(item),
        }
        cart.touch();
        Ok(cart.view())
    }

    /// Set a line's quantity; `0` removes the line
    pub fn set_quantity(
        &self,
        user_id: i64,
        menu_item_id: i64,
        quantity: i32,
    ) -> Result<CartView, AppError> {
        if !(0..=MAX_LINE_QUANTITY).contains(&quantity) {
            return Err(quantity_error(quantity));
        }
        if quantity == 0 {
            return self.remove_item(user_id, menu_item_id);
        }

        let mut cart = self
            .carts
            .get_mut(&user_id)
            .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;
        let line = cart
            .items
            .iter_mut()
            .find(|line| line.menu_item_id == menu_item_id)
            .ok_or_else(|| {
                AppError::new(ErrorCode::CartItemNotFound).with_detail("menu_item_id", menu_item_id)
            })?;
        line.quantity = quantity;
        cart.touch();
        Ok(cart.view())
    }

    pub fn remove_item(&self, user_id: i64, menu_item_id: i64) -> Result<CartView, AppError> {
        let mut cart = self
            .carts
            .get_mut(&user_id)
            .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;
        let before = cart.items.len();
        cart.items.retain(|line| line.menu_item_id != menu_item_id);
        if cart.items.len() == before {
            return Err(
                AppError::new(ErrorCode::CartItemNotFound).with_detail("menu_item_id", menu_item_id)
            );
        }
        cart.touch();
        Ok(cart.view())
    }

    pub fn clear(&self, user_id: i64) {
        self.carts.remove(&user_id);
    }

    /// Take checked-out lines out of the cart
    ///
    /// Subtracts each line's quantity from the current cart, so lines added
    /// while the order was being stored survive.
    pub fn remove_checked_out(&self, user_id: i64, checked_out: &[CartItem]) {
        let Some(mut cart) = self.carts.get_mut(&user_id) else {
            return;
        };
        for done in checked_out {
            if let Some(line) = cart
                .items
                .iter_mut()
                .find(|line| line.menu_item_id == done.menu_item_id)
            {
                line.quantity -= done.quantity;
            }
        }
        cart.items.retain(|line| line.quantity > 0);
        let now_empty = cart.items.is_empty();
        if !now_empty {
            cart.touch();
        }
        drop(cart);
        if now_empty {
            self.carts.remove_if(&user_id, |_, cart| cart.items.is_empty());
        }
    }

    /// Lines to turn into an order
    pub fn items(&self, user_id: i64) -> Vec<CartItem> {
        self.carts
            .get(&user_id)
            .map(|c| c.items.clone())
            .unwrap_or_default()
    }

    /// Drop carts idle for longer than the TTL; returns how many were removed
    pub fn sweep_expired(&self, now_millis: i64) -> usize {
        let before = self.carts.len();
        let ttl = self.ttl_millis;
        self.carts
            .retain(|_, cart| now_millis - cart.updated_at <= ttl);
        before.saturating_sub(self.carts.len())
    }

    pub fn len(&self) -> usize {
        self.carts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }
}
