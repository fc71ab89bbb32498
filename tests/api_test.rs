//! HTTP-level tests: the full route table wired to in-memory stores.
//!
//! Run with:
//!
//!   cargo test --test api_test

use std::str::FromStr;
use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use bigdecimal::BigDecimal;
use fulfillment_service::domain::ports::{CartItem, Product, ProductRepository};
use fulfillment_service::infrastructure::{
    InMemoryCartRepository, InMemoryOrderRepository, InMemoryProductRepository,
    InMemorySellerDirectory,
};
use fulfillment_service::{configure_routes, AppState};
use serde_json::{json, Value};
use uuid::Uuid;

struct Fixture {
    buyer: Uuid,
    seller: Uuid,
    other_seller: Uuid,
    product_a: Uuid,
    product_b: Uuid,
    products: InMemoryProductRepository,
    carts: InMemoryCartRepository,
    state: web::Data<AppState>,
}

fn fixture() -> Fixture {
    let buyer = Uuid::new_v4();
    let seller = Uuid::new_v4();
    let other_seller = Uuid::new_v4();
    let product_a = Uuid::new_v4();
    let product_b = Uuid::new_v4();

    let products = InMemoryProductRepository::with_products([
        Product {
            id: product_a,
            seller_id: seller,
            name: "Teapot".to_string(),
            price: BigDecimal::from(10),
            image_url: None,
            stock: 10,
        },
        Product {
            id: product_b,
            seller_id: other_seller,
            name: "Mug".to_string(),
            price: BigDecimal::from(5),
            image_url: None,
            stock: 3,
        },
    ]);
    let carts = InMemoryCartRepository::new();
    let sellers = InMemorySellerDirectory::new();
    sellers.insert(seller, "kettle_co").unwrap();
    sellers.insert(other_seller, "mugs_r_us").unwrap();

    let state = web::Data::new(AppState::new(
        Arc::new(InMemoryOrderRepository::new()),
        Arc::new(products.clone()),
        Arc::new(carts.clone()),
        Arc::new(sellers),
    ));

    Fixture {
        buyer,
        seller,
        other_seller,
        product_a,
        product_b,
        products,
        carts,
        state,
    }
}

fn address() -> Value {
    json!({
        "full_name": "Ada Lovelace",
        "street": "12 Analytical Way",
        "city": "London",
        "state_zip_country": "N1 UK"
    })
}

fn card() -> Value {
    json!({
        "card_number": "4111111111111111",
        "card_name": "Ada Lovelace",
        "expiry": "12/30",
        "cvv": "123"
    })
}

fn checkout_body(f: &Fixture) -> Value {
    json!({
        "buyer_id": f.buyer,
        "address": address(),
        "payment_method": "Credit Card",
        "payment_details": card(),
        "items": [
            {
                "product_id": f.product_a,
                "seller_id": f.seller,
                "product_name": "Teapot",
                "quantity": 2,
                "unit_price": "10.00"
            },
            {
                "product_id": f.product_b,
                "seller_id": f.other_seller,
                "product_name": "Mug",
                "quantity": 1,
                "unit_price": "5.00"
            }
        ],
        "subtotal": "25.00"
    })
}

macro_rules! app {
    ($f:expr) => {
        test::init_service(
            App::new()
                .app_data($f.state.clone())
                .configure(configure_routes),
        )
        .await
    };
}

fn money(value: &Value) -> BigDecimal {
    BigDecimal::from_str(value.as_str().unwrap()).unwrap()
}

#[actix_web::test]
async fn checkout_places_order_and_decrements_stock() {
    let f = fixture();
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri("/orders/checkout")
        .set_json(checkout_body(&f))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(money(&body["order_price"]), BigDecimal::from(25));
    assert_eq!(body["overall_status"], "INCOMPLETE");
    assert_eq!(body["payment_method"], "Credit Card");
    assert!(body.get("payment_details").is_none());
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i["status"] == "PENDING"));

    let teapot = f.products.find_by_id(f.product_a).unwrap().unwrap();
    let mug = f.products.find_by_id(f.product_b).unwrap().unwrap();
    assert_eq!(teapot.stock, 8);
    assert_eq!(mug.stock, 2);
}

#[actix_web::test]
async fn checkout_rejects_subtotal_mismatch() {
    let f = fixture();
    let app = app!(f);

    let mut body = checkout_body(&f);
    body["subtotal"] = json!("24.00");
    let req = test::TestRequest::post()
        .uri("/orders/checkout")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let teapot = f.products.find_by_id(f.product_a).unwrap().unwrap();
    assert_eq!(teapot.stock, 10);
}

#[actix_web::test]
async fn checkout_rejects_incomplete_card() {
    let f = fixture();
    let app = app!(f);

    let mut body = checkout_body(&f);
    body["payment_details"]["cvv"] = json!("");
    let req = test::TestRequest::post()
        .uri("/orders/checkout")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation");
    assert_eq!(body["message"], "Invalid credit card details");
}

#[actix_web::test]
async fn cart_checkout_uses_catalog_prices_and_clears_cart() {
    let f = fixture();
    f.carts
        .add(
            f.buyer,
            CartItem {
                product_id: f.product_a,
                quantity: 3,
            },
        )
        .unwrap();
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri("/orders/checkout/cart")
        .set_json(json!({
            "buyer_id": f.buyer,
            "address": address(),
            "payment_method": "PayPal",
            "payment_details": { "paypal_email": "ada@example.com" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(money(&body["order_price"]), BigDecimal::from(30));

    // The cart is empty now, so a second attempt fails.
    let req = test::TestRequest::post()
        .uri("/orders/checkout/cart")
        .set_json(json!({
            "buyer_id": f.buyer,
            "address": address(),
            "payment_method": "PayPal",
            "payment_details": { "paypal_email": "ada@example.com" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Cart is empty");
}

#[actix_web::test]
async fn validate_payment_endpoint() {
    let f = fixture();
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri("/payments/validate")
        .set_json(json!({
            "payment_method": "PayNow",
            "payment_details": { "reference_number": "PN-001" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["payment_method"], "Bank Transfer");

    let req = test::TestRequest::post()
        .uri("/payments/validate")
        .set_json(json!({ "payment_method": "Cheque" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unknown_order_returns_404() {
    let f = fixture();
    let app = app!(f);

    let req = test::TestRequest::get()
        .uri(&format!("/orders/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "Order not found");
}

#[actix_web::test]
async fn fulfillment_dispute_and_review_flow() {
    let f = fixture();
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri("/orders/checkout")
        .set_json(checkout_body(&f))
        .to_request();
    let order: Value = test::call_and_read_body_json(&app, req).await;
    let order_id = order["id"].as_str().unwrap().to_string();

    // Delivering before shipping is refused with the guard message.
    let req = test::TestRequest::put()
        .uri("/orders/buyer/status")
        .set_json(json!({
            "order_id": order_id,
            "product_id": f.product_a,
            "buyer_id": f.buyer,
            "status": "DELIVERED"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "Item must be shipped before it can be delivered."
    );

    // The other seller cannot ship the teapot.
    let req = test::TestRequest::put()
        .uri("/orders/seller/status")
        .set_json(json!({
            "order_id": order_id,
            "product_id": f.product_a,
            "seller_id": f.other_seller,
            "status": "SHIPPED"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    for (product, seller) in [(f.product_a, f.seller), (f.product_b, f.other_seller)] {
        let req = test::TestRequest::put()
            .uri("/orders/seller/status")
            .set_json(json!({
                "order_id": order_id,
                "product_id": product,
                "seller_id": seller,
                "status": "SHIPPED"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/orders/{order_id}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["overall_status"], "SHIPPED");

    let req = test::TestRequest::put()
        .uri("/orders/buyer/status")
        .set_json(json!({
            "order_id": order_id,
            "product_id": f.product_a,
            "buyer_id": f.buyer,
            "status": "DELIVERED"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/orders/dispute")
        .set_json(json!({
            "order_id": order_id,
            "product_id": f.product_b,
            "buyer_id": f.buyer,
            "reason": "Damaged",
            "description": "Handle snapped off in transit"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // A buyer may not resolve their own dispute.
    let req = test::TestRequest::put()
        .uri("/orders/dispute/resolve")
        .set_json(json!({
            "order_id": order_id,
            "product_id": f.product_b,
            "actor_id": f.buyer,
            "role": "buyer"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri("/orders/dispute/resolve")
        .set_json(json!({
            "order_id": order_id,
            "product_id": f.product_b,
            "actor_id": Uuid::new_v4(),
            "role": "admin"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/orders/{order_id}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["overall_status"], "COMPLETED");
    let mug = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["product_id"] == json!(f.product_b))
        .unwrap()
        .clone();
    assert_eq!(mug["status"], "RESOLVED");
    assert_eq!(mug["dispute_raised"], true);
    assert_eq!(mug["dispute_reason"], "Damaged");
    assert_eq!(mug["seller_name"], "mugs_r_us");

    let req = test::TestRequest::patch()
        .uri("/orders/item/review")
        .set_json(json!({
            "order_id": order_id,
            "product_id": f.product_a,
            "buyer_id": f.buyer,
            "rating": 5,
            "review": "Pours beautifully"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn seller_listing_only_shows_their_items() {
    let f = fixture();
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri("/orders/checkout")
        .set_json(checkout_body(&f))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri(&format!("/orders/seller/{}", f.seller))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    let items = orders[0]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_id"], json!(f.product_a));

    let req = test::TestRequest::get()
        .uri(&format!("/orders/seller/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!([]));

    let req = test::TestRequest::get()
        .uri(&format!("/orders/buyer/{}", f.buyer))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["items"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn malformed_requests_get_json_errors() {
    let f = fixture();
    let app = app!(f);

    let req = test::TestRequest::put()
        .uri("/orders/buyer/status")
        .set_json(json!({
            "order_id": Uuid::new_v4(),
            "product_id": f.product_a,
            "buyer_id": f.buyer,
            "status": "LOST"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation");
    assert!(body["message"].as_str().unwrap().contains("LOST"));

    let req = test::TestRequest::get()
        .uri("/orders/buyer/not-a-uuid")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation");
}

#[actix_web::test]
async fn checkout_rejects_sub_cent_prices() {
    let f = fixture();
    let app = app!(f);

    let mut body = checkout_body(&f);
    body["items"][0]["unit_price"] = json!("10.005");
    body["subtotal"] = json!("25.010");
    let req = test::TestRequest::post()
        .uri("/orders/checkout")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation");

    let teapot = f.products.find_by_id(f.product_a).unwrap().unwrap();
    assert_eq!(teapot.stock, 10);
}

#[actix_web::test]
async fn checkout_response_matches_stored_view() {
    let f = fixture();
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri("/orders/checkout")
        .set_json(checkout_body(&f))
        .to_request();
    let placed: Value = test::call_and_read_body_json(&app, req).await;
    let teapot = placed["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["product_id"] == json!(f.product_a))
        .unwrap()
        .clone();
    assert_eq!(teapot["seller_name"], "kettle_co");

    let req = test::TestRequest::get()
        .uri(&format!("/orders/{}", placed["id"].as_str().unwrap()))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, placed);
}
