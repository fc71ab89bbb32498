use std::collections::{HashMap, HashSet};

use bigdecimal::BigDecimal;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::payment::{PaymentDetails, PaymentMethod};
use super::status::{ItemStatus, OverallStatus};

pub const NOT_SHIPPED: &str = "Item must be shipped before it can be delivered.";
pub const NOT_DISPUTABLE: &str = "Dispute can only be raised for shipped or delivered items.";
pub const NOT_DISPUTED: &str = "Only items under dispute can be resolved.";

/// Amounts are stored as NUMERIC(12, 2): two decimals, ten integer digits.
const AMOUNT_SCALE: i64 = 2;
const AMOUNT_LIMIT: i64 = 10_000_000_000;

fn check_amount(what: &str, amount: &BigDecimal) -> Result<(), DomainError> {
    if amount.with_scale(AMOUNT_SCALE) != *amount {
        return Err(DomainError::Validation(format!(
            "{what} must have at most {AMOUNT_SCALE} decimal places, got {amount}"
        )));
    }
    if amount.abs() >= BigDecimal::from(AMOUNT_LIMIT) {
        return Err(DomainError::Validation(format!(
            "{what} {amount} is out of range"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub full_name: String,
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub state_zip_country: String,
}

impl Address {
    fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("full_name", &self.full_name),
            ("street", &self.street),
            ("city", &self.city),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::Validation(format!(
                    "shipping address {field} is required"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispute {
    pub reason: String,
    pub description: String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub rating: i32,
    pub text: Option<String>,
}

/// A product line as submitted at checkout, already resolved against the
/// catalog by the caller.
#[derive(Debug, Clone)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub product_name: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub shipping_fee: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub product_name: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub shipping_fee: BigDecimal,
    pub status: ItemStatus,
    pub delivery_date: Option<DateTime<Utc>>,
    pub review: Option<Review>,
    /// Only present once the item has entered `Disputing`.
    pub dispute: Option<Dispute>,
}

impl OrderItem {
    fn pending(line: OrderLineInput) -> Self {
        Self {
            product_id: line.product_id,
            seller_id: line.seller_id,
            product_name: line.product_name,
            image_url: line.image_url,
            quantity: line.quantity,
            unit_price: line.unit_price,
            shipping_fee: line.shipping_fee,
            status: ItemStatus::Pending,
            delivery_date: None,
            review: None,
            dispute: None,
        }
    }

    pub fn subtotal(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity) + &self.shipping_fee
    }

    pub fn ship(&mut self, delivery_estimate: Option<DateTime<Utc>>) -> Result<(), DomainError> {
        if self.status != ItemStatus::Pending {
            return Err(DomainError::InvalidTransition(format!(
                "Item cannot be shipped while {}.",
                self.status
            )));
        }
        self.status = ItemStatus::Shipped;
        self.delivery_date = delivery_estimate;
        Ok(())
    }

    pub fn deliver(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != ItemStatus::Shipped {
            return Err(DomainError::InvalidTransition(NOT_SHIPPED.to_string()));
        }
        self.status = ItemStatus::Delivered;
        self.delivery_date = Some(now);
        Ok(())
    }

    pub fn raise_dispute(
        &mut self,
        reason: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !matches!(self.status, ItemStatus::Shipped | ItemStatus::Delivered) {
            return Err(DomainError::InvalidItemState(NOT_DISPUTABLE.to_string()));
        }
        let (reason, description) = (reason.trim(), description.trim());
        if reason.is_empty() || description.is_empty() {
            return Err(DomainError::Validation(
                "dispute reason and description are required".to_string(),
            ));
        }
        self.status = ItemStatus::Disputing;
        self.dispute = Some(Dispute {
            reason: reason.to_string(),
            description: description.to_string(),
            raised_at: now,
        });
        Ok(())
    }

    pub fn resolve_dispute(&mut self) -> Result<(), DomainError> {
        if self.status != ItemStatus::Disputing {
            return Err(DomainError::InvalidItemState(NOT_DISPUTED.to_string()));
        }
        self.status = ItemStatus::Resolved;
        Ok(())
    }

    pub fn add_review(&mut self, rating: i32, text: Option<String>) -> Result<(), DomainError> {
        if !(1..=5).contains(&rating) {
            return Err(DomainError::Validation(format!(
                "rating must be between 1 and 5, got {rating}"
            )));
        }
        if self.review.is_some() {
            return Err(DomainError::Validation(
                "item has already been reviewed".to_string(),
            ));
        }
        self.review = Some(Review {
            rating,
            text: text.filter(|t| !t.trim().is_empty()),
        });
        Ok(())
    }
}

/// An order that has been built at checkout but not persisted yet.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub buyer_id: Uuid,
    pub items: Vec<OrderItem>,
    pub order_price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    pub payment_details: PaymentDetails,
}

impl NewOrder {
    /// Builds a pending order from checkout lines. Prices are taken from the
    /// lines as given and summed once into `order_price`.
    pub fn place(
        buyer_id: Uuid,
        shipping_address: Address,
        payment_method: PaymentMethod,
        payment_details: PaymentDetails,
        lines: Vec<OrderLineInput>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if lines.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        shipping_address.validate()?;

        let zero = BigDecimal::from(0);
        let mut seen = HashSet::new();
        for line in &lines {
            if line.quantity <= 0 {
                return Err(DomainError::Validation(format!(
                    "quantity for product {} must be positive",
                    line.product_id
                )));
            }
            if line.unit_price < zero || line.shipping_fee < zero {
                return Err(DomainError::Validation(format!(
                    "prices for product {} must not be negative",
                    line.product_id
                )));
            }
            check_amount("unit_price", &line.unit_price)?;
            check_amount("shipping_fee", &line.shipping_fee)?;
            if !seen.insert(line.product_id) {
                return Err(DomainError::Validation(format!(
                    "product {} appears more than once",
                    line.product_id
                )));
            }
        }

        let items: Vec<OrderItem> = lines.into_iter().map(OrderItem::pending).collect();
        let order_price: BigDecimal = items.iter().map(OrderItem::subtotal).sum();
        check_amount("order_price", &order_price)?;

        Ok(Self {
            buyer_id,
            items,
            order_price,
            // Postgres keeps microseconds.
            created_at: now.trunc_subsecs(6),
            shipping_address,
            payment_method,
            payment_details,
        })
    }

    pub fn overall_status(&self) -> OverallStatus {
        OverallStatus::aggregate(self.items.iter().map(|i| i.status))
    }

    pub fn into_order(self, id: Uuid) -> Order {
        let overall_status = self.overall_status();
        Order {
            id,
            buyer_id: self.buyer_id,
            items: self.items,
            order_price: self.order_price,
            created_at: self.created_at,
            shipping_address: self.shipping_address,
            payment_method: self.payment_method,
            payment_details: self.payment_details,
            overall_status,
            version: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub items: Vec<OrderItem>,
    pub order_price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    pub payment_details: PaymentDetails,
    /// Cached aggregate of the item statuses, see [`Order::refresh_status`].
    pub overall_status: OverallStatus,
    /// Incremented by every successful save.
    pub version: i32,
}

impl Order {
    pub fn item_mut(&mut self, product_id: Uuid) -> Result<&mut OrderItem, DomainError> {
        self.items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or(DomainError::ItemNotFound(product_id))
    }

    /// Looks up the item and checks that `seller_id` sold it.
    pub fn seller_item_mut(
        &mut self,
        product_id: Uuid,
        seller_id: Uuid,
    ) -> Result<&mut OrderItem, DomainError> {
        let item = self.item_mut(product_id)?;
        if item.seller_id != seller_id {
            return Err(DomainError::Unauthorized(format!(
                "seller {seller_id} does not own product {product_id} in this order"
            )));
        }
        Ok(item)
    }

    pub fn ensure_buyer(&self, buyer_id: Uuid) -> Result<(), DomainError> {
        if self.buyer_id != buyer_id {
            return Err(DomainError::Unauthorized(format!(
                "order {} does not belong to buyer {buyer_id}",
                self.id
            )));
        }
        Ok(())
    }

    pub fn derived_status(&self) -> OverallStatus {
        OverallStatus::aggregate(self.items.iter().map(|i| i.status))
    }

    /// Recomputes `overall_status` from the items. Returns whether it changed.
    pub fn refresh_status(&mut self) -> bool {
        let derived = self.derived_status();
        let changed = derived != self.overall_status;
        self.overall_status = derived;
        changed
    }

    /// Narrows the order to the items sold by `seller_id`, or `None` when the
    /// seller has nothing in it.
    pub fn for_seller(mut self, seller_id: Uuid) -> Option<Order> {
        self.items.retain(|i| i.seller_id == seller_id);
        if self.items.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    pub fn seller_ids(&self) -> HashSet<Uuid> {
        self.items.iter().map(|i| i.seller_id).collect()
    }
}

/// An order together with display data looked up for it.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: Order,
    pub seller_names: HashMap<Uuid, String>,
}
