use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::actor::{Actor, Role};
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderView};
use crate::domain::ports::{OrderRepository, SellerDirectory};
use crate::domain::status::ItemStatus;

/// Post-checkout operations on placed orders.
///
/// Every mutation is load, change, save against the order's version, so two
/// requests racing on the same order cannot silently overwrite each other: the
/// later save fails with [`DomainError::Conflict`].
pub struct FulfillmentService<O, S> {
    orders: O,
    sellers: S,
}

impl<O, S> FulfillmentService<O, S>
where
    O: OrderRepository,
    S: SellerDirectory,
{
    pub fn new(orders: O, sellers: S) -> Self {
        Self { orders, sellers }
    }

    pub fn get_order(&self, order_id: Uuid) -> Result<OrderView, DomainError> {
        let mut order = self.load(order_id)?;
        order.refresh_status();
        self.view(order)
    }

    /// Lists a buyer's orders, writing back any cached overall status that no
    /// longer matches the items.
    ///
    /// A write-back that loses to a concurrent save is skipped: that save
    /// already stored a fresh status.
    pub fn list_orders_for_buyer(&self, buyer_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let mut views = Vec::new();
        for mut order in self.orders.find_by_buyer(buyer_id)? {
            if order.refresh_status() {
                match self.orders.update(&order) {
                    Ok(version) => order.version = version,
                    Err(DomainError::Conflict(id)) => {
                        log::warn!("Skipped status write-back for order {}: saved concurrently", id);
                    }
                    Err(e) => return Err(e),
                }
            }
            views.push(self.view(order)?);
        }
        Ok(views)
    }

    /// Orders containing the seller's items, each narrowed to those items.
    pub fn list_orders_for_seller(&self, seller_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        self.orders
            .find_by_seller(seller_id)?
            .into_iter()
            .filter_map(|mut order| {
                order.refresh_status();
                order.for_seller(seller_id)
            })
            .map(|order| self.view(order))
            .collect()
    }

    pub fn list_all_orders(&self) -> Result<Vec<OrderView>, DomainError> {
        self.orders
            .find_all()?
            .into_iter()
            .map(|mut order| {
                order.refresh_status();
                self.view(order)
            })
            .collect()
    }

    pub fn update_item_status_as_seller(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        seller_id: Uuid,
        new_status: ItemStatus,
        delivery_date: Option<DateTime<Utc>>,
    ) -> Result<(), DomainError> {
        self.mutate(order_id, |order| {
            let item = order.seller_item_mut(product_id, seller_id)?;
            match new_status {
                ItemStatus::Shipped => item.ship(delivery_date),
                other => Err(DomainError::InvalidTransition(format!(
                    "Sellers can only mark items as shipped, not {other}."
                ))),
            }
        })?;
        log::info!(
            "Seller {} marked product {} in order {} as {}",
            seller_id,
            product_id,
            order_id,
            new_status
        );
        Ok(())
    }

    pub fn update_item_status_as_buyer(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        buyer_id: Uuid,
        new_status: ItemStatus,
    ) -> Result<(), DomainError> {
        self.mutate(order_id, |order| {
            order.ensure_buyer(buyer_id)?;
            let item = order.item_mut(product_id)?;
            match new_status {
                ItemStatus::Delivered => item.deliver(Utc::now()),
                other => Err(DomainError::InvalidTransition(format!(
                    "Buyers can only mark items as delivered, not {other}."
                ))),
            }
        })?;
        log::info!(
            "Buyer {} marked product {} in order {} as {}",
            buyer_id,
            product_id,
            order_id,
            new_status
        );
        Ok(())
    }

    pub fn raise_dispute(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        buyer_id: Uuid,
        reason: &str,
        description: &str,
    ) -> Result<(), DomainError> {
        self.mutate(order_id, |order| {
            order.ensure_buyer(buyer_id)?;
            order
                .item_mut(product_id)?
                .raise_dispute(reason, description, Utc::now())
        })?;
        log::info!(
            "Dispute raised on product {} in order {}: {}",
            product_id,
            order_id,
            reason.trim()
        );
        Ok(())
    }

    /// Settles a dispute. The item's seller or any admin may do this.
    pub fn resolve_dispute(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        actor: &Actor,
    ) -> Result<(), DomainError> {
        self.mutate(order_id, |order| {
            let item = match actor.role {
                Role::Admin => order.item_mut(product_id)?,
                Role::Seller => order.seller_item_mut(product_id, actor.id)?,
                Role::Buyer => {
                    return Err(DomainError::Unauthorized(
                        "buyers cannot resolve disputes".to_string(),
                    ))
                }
            };
            item.resolve_dispute()
        })?;
        log::info!(
            "Dispute on product {} in order {} resolved by {:?} {}",
            product_id,
            order_id,
            actor.role,
            actor.id
        );
        Ok(())
    }

    pub fn add_review(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        buyer_id: Uuid,
        rating: i32,
        review: Option<String>,
    ) -> Result<(), DomainError> {
        self.mutate(order_id, |order| {
            order.ensure_buyer(buyer_id)?;
            order.item_mut(product_id)?.add_review(rating, review)
        })?;
        log::info!(
            "Buyer {} rated product {} in order {} with {}",
            buyer_id,
            product_id,
            order_id,
            rating
        );
        Ok(())
    }

    fn load(&self, order_id: Uuid) -> Result<Order, DomainError> {
        self.orders
            .find_by_id(order_id)?
            .ok_or(DomainError::OrderNotFound)
    }

    /// Loads the order, applies `change`, refreshes the overall status and
    /// saves. Nothing is written when `change` fails.
    fn mutate<F>(&self, order_id: Uuid, change: F) -> Result<Order, DomainError>
    where
        F: FnOnce(&mut Order) -> Result<(), DomainError>,
    {
        let mut order = self.load(order_id)?;
        change(&mut order)?;
        order.refresh_status();
        order.version = self.orders.update(&order)?;
        Ok(order)
    }

    /// Wraps `order` with the display names of its sellers.
    pub fn view(&self, order: Order) -> Result<OrderView, DomainError> {
        let mut seller_names = HashMap::new();
        for seller_id in order.seller_ids() {
            if let Some(name) = self.sellers.seller_name(seller_id)? {
                seller_names.insert(seller_id, name);
            }
        }
        Ok(OrderView {
            order,
            seller_names,
        })
    }
}
