pub mod checkout_service;
pub mod fulfillment_service;
pub mod stock;

pub use checkout_service::{CheckoutRequest, CheckoutService};
pub use fulfillment_service::FulfillmentService;
pub use stock::{StockAdjuster, StockReport};
