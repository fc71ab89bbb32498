use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::schema::{cart_items, order_items, orders, products, sellers};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub order_price: BigDecimal,
    pub shipping_full_name: String,
    pub shipping_street: String,
    pub shipping_city: String,
    pub shipping_state_zip_country: String,
    pub payment_method: String,
    pub payment_details: Value,
    pub overall_status: String,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub order_price: BigDecimal,
    pub shipping_full_name: String,
    pub shipping_street: String,
    pub shipping_city: String,
    pub shipping_state_zip_country: String,
    pub payment_method: String,
    pub payment_details: Value,
    pub overall_status: String,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub product_name: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub shipping_fee: BigDecimal,
    pub status: String,
    pub delivery_date: Option<DateTime<Utc>>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub dispute_raised: bool,
    pub dispute_reason: Option<String>,
    pub dispute_description: Option<String>,
    pub dispute_raised_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub product_name: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub shipping_fee: BigDecimal,
    pub status: String,
}

/// The mutable part of an item. `None` clears the column.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = order_items)]
#[diesel(treat_none_as_null = true)]
pub struct OrderItemChanges {
    pub status: String,
    pub delivery_date: Option<DateTime<Utc>>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub dispute_raised: bool,
    pub dispute_reason: Option<String>,
    pub dispute_description: Option<String>,
    pub dispute_raised_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct ProductRow {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub image_url: Option<String>,
    pub stock: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemRow {
    pub buyer_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = sellers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SellerRow {
    pub id: Uuid,
    pub username: String,
}
