pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::{CheckoutService, FulfillmentService};
use domain::ports::{CartRepository, OrderRepository, ProductRepository, SellerDirectory};
use infrastructure::{
    DieselCartRepository, DieselOrderRepository, DieselProductRepository, DieselSellerDirectory,
};

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

pub type Orders = Arc<dyn OrderRepository>;
pub type Products = Arc<dyn ProductRepository>;
pub type Carts = Arc<dyn CartRepository>;
pub type Sellers = Arc<dyn SellerDirectory>;

/// Services shared by every worker.
pub struct AppState {
    pub checkout: CheckoutService<Orders, Products, Carts>,
    pub fulfillment: FulfillmentService<Orders, Sellers>,
}

impl AppState {
    pub fn new(orders: Orders, products: Products, carts: Carts, sellers: Sellers) -> Self {
        Self {
            checkout: CheckoutService::new(orders.clone(), products, carts),
            fulfillment: FulfillmentService::new(orders, sellers),
        }
    }

    /// State backed by the PostgreSQL tables behind `pool`.
    pub fn with_pool(pool: DbPool) -> Self {
        Self::new(
            Arc::new(DieselOrderRepository::new(pool.clone())),
            Arc::new(DieselProductRepository::new(pool.clone())),
            Arc::new(DieselCartRepository::new(pool.clone())),
            Arc::new(DieselSellerDirectory::new(pool)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::payments::validate_payment,
        handlers::orders::checkout,
        handlers::orders::checkout_cart,
        handlers::orders::list_all_orders,
        handlers::orders::get_order,
        handlers::orders::list_buyer_orders,
        handlers::orders::list_seller_orders,
        handlers::orders::update_status_as_seller,
        handlers::orders::update_status_as_buyer,
        handlers::orders::raise_dispute,
        handlers::orders::resolve_dispute,
        handlers::orders::add_review,
    ),
    tags(
        (name = "orders", description = "Checkout and order fulfillment"),
        (name = "disputes", description = "Buyer disputes and their resolution"),
        (name = "payments", description = "Payment detail validation"),
    )
)]
pub struct ApiDoc;

/// Registers the payment and order routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    use handlers::{orders, payments};

    // Extractor failures get the same JSON error body as handler errors.
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| errors::AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| errors::AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/payments").route("/validate", web::post().to(payments::validate_payment)),
    )
    .service(
        web::scope("/orders")
            .route("", web::get().to(orders::list_all_orders))
            .route("/checkout", web::post().to(orders::checkout))
            .route("/checkout/cart", web::post().to(orders::checkout_cart))
            .route("/buyer/status", web::put().to(orders::update_status_as_buyer))
            .route("/buyer/{buyer_id}", web::get().to(orders::list_buyer_orders))
            .route("/seller/status", web::put().to(orders::update_status_as_seller))
            .route("/seller/{seller_id}", web::get().to(orders::list_seller_orders))
            .route("/dispute", web::post().to(orders::raise_dispute))
            .route("/dispute/resolve", web::put().to(orders::resolve_dispute))
            .route("/item/review", web::patch().to(orders::add_review))
            .route("/{id}", web::get().to(orders::get_order)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(state);
    let openapi = ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure_routes)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
    })
    .bind((host.to_string(), port))?
    .run())
}
