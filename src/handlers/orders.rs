use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::CheckoutRequest;
use crate::domain::actor::{Actor, Role};
use crate::domain::order::{Address, OrderLineInput, OrderView};
use crate::domain::payment::PaymentDetails;
use crate::domain::status::{ItemStatus, OverallStatus};
use crate::errors::AppError;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutItemRequest {
    pub product_id: Uuid,
    pub seller_id: Uuid,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
    #[serde(default = "zero")]
    pub shipping_fee: String,
}

fn zero() -> String {
    "0".to_string()
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequestBody {
    pub buyer_id: Uuid,
    pub address: Address,
    pub payment_method: String,
    #[serde(default)]
    pub payment_details: PaymentDetails,
    pub items: Vec<CheckoutItemRequest>,
    /// Sum of the item subtotals the buyer was shown, e.g. "25.00"
    pub subtotal: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartCheckoutRequest {
    pub buyer_id: Uuid,
    pub address: Address,
    pub payment_method: String,
    #[serde(default)]
    pub payment_details: PaymentDetails,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub seller_name: Option<String>,
    pub product_name: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub unit_price: String,
    pub shipping_fee: String,
    pub subtotal: String,
    pub status: ItemStatus,
    pub delivery_date: Option<String>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub dispute_raised: bool,
    pub dispute_reason: Option<String>,
    pub dispute_description: Option<String>,
    pub dispute_raised_at: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub order_price: String,
    pub created_at: String,
    pub shipping_address: Address,
    pub payment_method: String,
    pub overall_status: OverallStatus,
    pub version: i32,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(view: OrderView) -> Self {
        let OrderView {
            order,
            seller_names,
        } = view;
        OrderResponse {
            id: order.id,
            buyer_id: order.buyer_id,
            order_price: order.order_price.to_string(),
            created_at: order.created_at.to_rfc3339(),
            shipping_address: order.shipping_address,
            payment_method: order.payment_method.to_string(),
            overall_status: order.overall_status,
            version: order.version,
            items: order
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    product_id: i.product_id,
                    seller_id: i.seller_id,
                    seller_name: seller_names.get(&i.seller_id).cloned(),
                    subtotal: i.subtotal().to_string(),
                    product_name: i.product_name,
                    image_url: i.image_url,
                    quantity: i.quantity,
                    unit_price: i.unit_price.to_string(),
                    shipping_fee: i.shipping_fee.to_string(),
                    status: i.status,
                    delivery_date: i.delivery_date.map(|d| d.to_rfc3339()),
                    rating: i.review.as_ref().map(|r| r.rating),
                    review: i.review.and_then(|r| r.text),
                    dispute_raised: i.dispute.is_some(),
                    dispute_reason: i.dispute.as_ref().map(|d| d.reason.clone()),
                    dispute_description: i.dispute.as_ref().map(|d| d.description.clone()),
                    dispute_raised_at: i.dispute.as_ref().map(|d| d.raised_at.to_rfc3339()),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SellerStatusRequest {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub status: ItemStatus,
    /// Optional delivery estimate, RFC 3339
    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BuyerStatusRequest {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub buyer_id: Uuid,
    pub status: ItemStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DisputeRequest {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub buyer_id: Uuid,
    pub reason: String,
    pub description: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveDisputeRequest {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub actor_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub buyer_id: Uuid,
    pub rating: i32,
    #[serde(default)]
    pub review: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn ok(message: &str) -> HttpResponse {
        HttpResponse::Ok().json(MessageResponse {
            message: message.to_string(),
        })
    }
}

fn parse_money(field: &str, value: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(value.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid {field} '{value}': {e}")))
}

impl TryFrom<CheckoutRequestBody> for CheckoutRequest {
    type Error = AppError;

    fn try_from(body: CheckoutRequestBody) -> Result<Self, Self::Error> {
        let items = body
            .items
            .into_iter()
            .map(|i| {
                Ok(OrderLineInput {
                    product_id: i.product_id,
                    seller_id: i.seller_id,
                    product_name: i.product_name,
                    image_url: i.image_url,
                    quantity: i.quantity,
                    unit_price: parse_money("unit_price", &i.unit_price)?,
                    shipping_fee: parse_money("shipping_fee", &i.shipping_fee)?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(CheckoutRequest {
            buyer_id: body.buyer_id,
            shipping_address: body.address,
            payment_method: body.payment_method,
            payment_details: body.payment_details,
            items,
            subtotal: parse_money("subtotal", &body.subtotal)?,
        })
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders/checkout
///
/// Validates payment, places the order with the submitted prices, then
/// decrements stock and clears the buyer's cart.
#[utoipa::path(
    post,
    path = "/orders/checkout",
    request_body = CheckoutRequestBody,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Invalid payment details, items or subtotal"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn checkout(
    state: web::Data<AppState>,
    body: web::Json<CheckoutRequestBody>,
) -> Result<HttpResponse, AppError> {
    let request = CheckoutRequest::try_from(body.into_inner())?;

    let view = web::block(move || {
        let order = state.checkout.checkout(request)?;
        state.fulfillment.view(order)
    })
    .await??;

    Ok(HttpResponse::Created().json(OrderResponse::from(view)))
}

/// POST /orders/checkout/cart
///
/// Places an order for everything in the buyer's cart at current catalog
/// prices.
#[utoipa::path(
    post,
    path = "/orders/checkout/cart",
    request_body = CartCheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Cart is empty or payment details are invalid"),
        (status = 404, description = "A product in the cart no longer exists"),
    ),
    tag = "orders"
)]
pub async fn checkout_cart(
    state: web::Data<AppState>,
    body: web::Json<CartCheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let view = web::block(move || {
        let order = state.checkout.checkout_cart(
            body.buyer_id,
            body.address,
            body.payment_method,
            body.payment_details,
        )?;
        state.fulfillment.view(order)
    })
    .await??;

    Ok(HttpResponse::Created().json(OrderResponse::from(view)))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let view = web::block(move || state.fulfillment.get_order(order_id)).await??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(view)))
}

/// GET /orders
///
/// Every order, newest first. Intended for administrators.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "All orders", body = Vec<OrderResponse>),
    ),
    tag = "orders"
)]
pub async fn list_all_orders(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let views = web::block(move || state.fulfillment.list_all_orders()).await??;

    Ok(HttpResponse::Ok().json(to_responses(views)))
}

/// GET /orders/buyer/{buyer_id}
#[utoipa::path(
    get,
    path = "/orders/buyer/{buyer_id}",
    params(
        ("buyer_id" = Uuid, Path, description = "Buyer UUID"),
    ),
    responses(
        (status = 200, description = "The buyer's orders, newest first", body = Vec<OrderResponse>),
    ),
    tag = "orders"
)]
pub async fn list_buyer_orders(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let buyer_id = path.into_inner();

    let views = web::block(move || state.fulfillment.list_orders_for_buyer(buyer_id)).await??;

    Ok(HttpResponse::Ok().json(to_responses(views)))
}

/// GET /orders/seller/{seller_id}
///
/// Orders containing the seller's products, each showing only those items.
#[utoipa::path(
    get,
    path = "/orders/seller/{seller_id}",
    params(
        ("seller_id" = Uuid, Path, description = "Seller UUID"),
    ),
    responses(
        (status = 200, description = "The seller's orders, newest first", body = Vec<OrderResponse>),
    ),
    tag = "orders"
)]
pub async fn list_seller_orders(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let seller_id = path.into_inner();

    let views = web::block(move || state.fulfillment.list_orders_for_seller(seller_id)).await??;

    Ok(HttpResponse::Ok().json(to_responses(views)))
}

/// PUT /orders/seller/status
#[utoipa::path(
    put,
    path = "/orders/seller/status",
    request_body = SellerStatusRequest,
    responses(
        (status = 200, description = "Item updated", body = MessageResponse),
        (status = 403, description = "The item belongs to another seller"),
        (status = 404, description = "Order or item not found"),
        (status = 409, description = "The order changed concurrently"),
        (status = 422, description = "Transition not allowed"),
    ),
    tag = "orders"
)]
pub async fn update_status_as_seller(
    state: web::Data<AppState>,
    body: web::Json<SellerStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();

    web::block(move || {
        state.fulfillment.update_item_status_as_seller(
            req.order_id,
            req.product_id,
            req.seller_id,
            req.status,
            req.delivery_date,
        )
    })
    .await??;

    Ok(MessageResponse::ok("Item status updated."))
}

/// PUT /orders/buyer/status
#[utoipa::path(
    put,
    path = "/orders/buyer/status",
    request_body = BuyerStatusRequest,
    responses(
        (status = 200, description = "Item updated", body = MessageResponse),
        (status = 403, description = "The order belongs to another buyer"),
        (status = 404, description = "Order or item not found"),
        (status = 422, description = "Item must be shipped before it can be delivered"),
    ),
    tag = "orders"
)]
pub async fn update_status_as_buyer(
    state: web::Data<AppState>,
    body: web::Json<BuyerStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();

    web::block(move || {
        state.fulfillment.update_item_status_as_buyer(
            req.order_id,
            req.product_id,
            req.buyer_id,
            req.status,
        )
    })
    .await??;

    Ok(MessageResponse::ok("Item status updated."))
}

/// POST /orders/dispute
#[utoipa::path(
    post,
    path = "/orders/dispute",
    request_body = DisputeRequest,
    responses(
        (status = 200, description = "Dispute raised", body = MessageResponse),
        (status = 400, description = "Reason or description missing"),
        (status = 404, description = "Order or item not found"),
        (status = 422, description = "Item is not shipped or delivered"),
    ),
    tag = "disputes"
)]
pub async fn raise_dispute(
    state: web::Data<AppState>,
    body: web::Json<DisputeRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();

    web::block(move || {
        state.fulfillment.raise_dispute(
            req.order_id,
            req.product_id,
            req.buyer_id,
            &req.reason,
            &req.description,
        )
    })
    .await??;

    Ok(MessageResponse::ok("Dispute raised successfully."))
}

/// PUT /orders/dispute/resolve
#[utoipa::path(
    put,
    path = "/orders/dispute/resolve",
    request_body = ResolveDisputeRequest,
    responses(
        (status = 200, description = "Dispute resolved", body = MessageResponse),
        (status = 403, description = "Caller is neither the item's seller nor an admin"),
        (status = 404, description = "Order or item not found"),
        (status = 422, description = "Item is not under dispute"),
    ),
    tag = "disputes"
)]
pub async fn resolve_dispute(
    state: web::Data<AppState>,
    body: web::Json<ResolveDisputeRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let actor = Actor {
        id: req.actor_id,
        role: req.role,
    };

    web::block(move || {
        state
            .fulfillment
            .resolve_dispute(req.order_id, req.product_id, &actor)
    })
    .await??;

    Ok(MessageResponse::ok("Dispute resolved successfully."))
}

/// PATCH /orders/item/review
#[utoipa::path(
    patch,
    path = "/orders/item/review",
    request_body = ReviewRequest,
    responses(
        (status = 204, description = "Review stored"),
        (status = 400, description = "Rating out of range or item already reviewed"),
        (status = 403, description = "The order belongs to another buyer"),
        (status = 404, description = "Order or item not found"),
    ),
    tag = "orders"
)]
pub async fn add_review(
    state: web::Data<AppState>,
    body: web::Json<ReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();

    web::block(move || {
        state.fulfillment.add_review(
            req.order_id,
            req.product_id,
            req.buyer_id,
            req.rating,
            req.review,
        )
    })
    .await??;

    Ok(HttpResponse::NoContent().finish())
}

fn to_responses(views: Vec<OrderView>) -> Vec<OrderResponse> {
    views.into_iter().map(OrderResponse::from).collect()
}
