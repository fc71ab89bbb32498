use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{Address, Dispute, NewOrder, Order, OrderItem, Review};
use crate::domain::payment::PaymentDetails;
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, orders};

use super::models::{NewOrderItemRow, NewOrderRow, OrderItemChanges, OrderItemRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Row mapping ──────────────────────────────────────────────────────────────

fn item_from_row(row: OrderItemRow) -> Result<OrderItem, DomainError> {
    let dispute = match (row.dispute_raised, row.dispute_raised_at) {
        (true, Some(raised_at)) => Some(Dispute {
            reason: row.dispute_reason.unwrap_or_default(),
            description: row.dispute_description.unwrap_or_default(),
            raised_at,
        }),
        _ => None,
    };
    Ok(OrderItem {
        product_id: row.product_id,
        seller_id: row.seller_id,
        product_name: row.product_name,
        image_url: row.image_url,
        quantity: row.quantity,
        unit_price: row.unit_price,
        shipping_fee: row.shipping_fee,
        status: row.status.parse()?,
        delivery_date: row.delivery_date,
        review: row.rating.map(|rating| Review {
            rating,
            text: row.review,
        }),
        dispute,
    })
}

fn order_from_rows(row: OrderRow, mut items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
    items.sort_by_key(|i| i.position);
    let payment_details: PaymentDetails = serde_json::from_value(row.payment_details)?;
    Ok(Order {
        id: row.id,
        buyer_id: row.buyer_id,
        items: items
            .into_iter()
            .map(item_from_row)
            .collect::<Result<_, _>>()?,
        order_price: row.order_price,
        created_at: row.created_at,
        shipping_address: Address {
            full_name: row.shipping_full_name,
            street: row.shipping_street,
            city: row.shipping_city,
            state_zip_country: row.shipping_state_zip_country,
        },
        payment_method: row.payment_method.parse()?,
        payment_details,
        overall_status: row.overall_status.parse()?,
        version: row.version,
    })
}

fn item_changes(item: &OrderItem) -> OrderItemChanges {
    OrderItemChanges {
        status: item.status.as_str().to_string(),
        delivery_date: item.delivery_date,
        rating: item.review.as_ref().map(|r| r.rating),
        review: item.review.as_ref().and_then(|r| r.text.clone()),
        dispute_raised: item.dispute.is_some(),
        dispute_reason: item.dispute.as_ref().map(|d| d.reason.clone()),
        dispute_description: item.dispute.as_ref().map(|d| d.description.clone()),
        dispute_raised_at: item.dispute.as_ref().map(|d| d.raised_at),
    }
}

/// Loads the items of `rows` in one query and assembles the aggregates.
fn load_orders(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
    let items = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .load(conn)?;
    items
        .grouped_by(&rows)
        .into_iter()
        .zip(rows)
        .map(|(items, row)| order_from_rows(row, items))
        .collect()
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;
        let order_id = Uuid::new_v4();

        let new_row = NewOrderRow {
            id: order_id,
            buyer_id: order.buyer_id,
            order_price: order.order_price.clone(),
            shipping_full_name: order.shipping_address.full_name.clone(),
            shipping_street: order.shipping_address.street.clone(),
            shipping_city: order.shipping_address.city.clone(),
            shipping_state_zip_country: order.shipping_address.state_zip_country.clone(),
            payment_method: order.payment_method.as_str().to_string(),
            payment_details: serde_json::to_value(&order.payment_details)?,
            overall_status: order.overall_status().as_str().to_string(),
            version: 0,
            created_at: order.created_at,
        };
        let new_items: Vec<NewOrderItemRow> = order
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| NewOrderItemRow {
                id: Uuid::new_v4(),
                order_id,
                position: position as i32,
                product_id: item.product_id,
                seller_id: item.seller_id,
                product_name: item.product_name.clone(),
                image_url: item.image_url.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price.clone(),
                shipping_fee: item.shipping_fee.clone(),
                status: item.status.as_str().to_string(),
            })
            .collect();

        conn.transaction::<_, DomainError, _>(|conn| {
            diesel::insert_into(orders::table)
                .values(&new_row)
                .execute(conn)?;
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;
            Ok(())
        })?;

        Ok(order.into_order(order_id))
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        Ok(load_orders(&mut conn, vec![order])?.pop())
    }

    fn find_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::buyer_id.eq(buyer_id))
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?;

        load_orders(&mut conn, rows)
    }

    fn find_by_seller(&self, seller_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let seller_orders = order_items::table
            .filter(order_items::seller_id.eq(seller_id))
            .select(order_items::order_id);
        let rows = orders::table
            .filter(orders::id.eq_any(seller_orders))
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?;

        load_orders(&mut conn, rows)
    }

    fn find_all(&self) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?;

        load_orders(&mut conn, rows)
    }

    fn update(&self, order: &Order) -> Result<i32, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let next_version = order.version + 1;
            let touched = diesel::update(
                orders::table
                    .filter(orders::id.eq(order.id))
                    .filter(orders::version.eq(order.version)),
            )
            .set((
                orders::overall_status.eq(order.overall_status.as_str()),
                orders::version.eq(next_version),
                orders::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

            if touched == 0 {
                let exists: i64 = orders::table
                    .filter(orders::id.eq(order.id))
                    .count()
                    .get_result(conn)?;
                return Err(if exists == 0 {
                    DomainError::OrderNotFound
                } else {
                    DomainError::Conflict(order.id)
                });
            }

            for item in &order.items {
                diesel::update(
                    order_items::table
                        .filter(order_items::order_id.eq(order.id))
                        .filter(order_items::product_id.eq(item.product_id)),
                )
                .set(&item_changes(item))
                .execute(conn)?;
            }

            Ok(next_version)
        })
    }
}
