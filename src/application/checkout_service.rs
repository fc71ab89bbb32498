use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Address, NewOrder, Order, OrderLineInput};
use crate::domain::payment::{validate_payment, PaymentDetails};
use crate::domain::ports::{CartRepository, OrderRepository, ProductRepository};

use super::stock::StockAdjuster;

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub buyer_id: Uuid,
    pub shipping_address: Address,
    pub payment_method: String,
    pub payment_details: PaymentDetails,
    pub items: Vec<OrderLineInput>,
    /// What the buyer was shown; must equal the sum of the item subtotals.
    pub subtotal: BigDecimal,
}

/// Places orders: payment validation, the order write, then the stock and
/// cart side effects.
///
/// The order write is the commit point. Stock adjustment afterwards is
/// best-effort and is not rolled back with the order, so a crash or store
/// failure between the two leaves stock higher than it should be.
pub struct CheckoutService<O, P, C> {
    orders: O,
    stock: StockAdjuster<P>,
    carts: C,
}

impl<O, P, C> CheckoutService<O, P, C>
where
    O: OrderRepository,
    P: ProductRepository,
    C: CartRepository,
{
    pub fn new(orders: O, products: P, carts: C) -> Self {
        Self {
            orders,
            stock: StockAdjuster::new(products),
            carts,
        }
    }

    pub fn checkout(&self, request: CheckoutRequest) -> Result<Order, DomainError> {
        if request.items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        let payment = validate_payment(&request.payment_method, &request.payment_details)?;

        let new_order = NewOrder::place(
            request.buyer_id,
            request.shipping_address,
            payment.method(),
            request.payment_details,
            request.items,
            Utc::now(),
        )?;
        if new_order.order_price != request.subtotal {
            return Err(DomainError::Validation(format!(
                "subtotal {} does not match the order total {}",
                request.subtotal, new_order.order_price
            )));
        }

        payment.process();
        let order = self.orders.create(new_order)?;
        log::info!(
            "Order {} placed by buyer {} with {} item(s), total {}",
            order.id,
            order.buyer_id,
            order.items.len(),
            order.order_price
        );

        let report = self.stock.apply(&order.items);
        if !report.is_clean() {
            log::warn!(
                "Order {} placed but stock was not adjusted for {} product(s)",
                order.id,
                report.failed.len()
            );
        }

        self.carts.clear_cart(order.buyer_id)?;
        Ok(order)
    }

    /// Checks out whatever is in the buyer's cart at current catalog prices.
    /// Cart lines carry no shipping fee.
    pub fn checkout_cart(
        &self,
        buyer_id: Uuid,
        shipping_address: Address,
        payment_method: String,
        payment_details: PaymentDetails,
    ) -> Result<Order, DomainError> {
        let cart = self.carts.get_cart(buyer_id)?;
        if cart.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        let mut items = Vec::with_capacity(cart.len());
        for line in cart {
            let product = self
                .stock
                .products()
                .find_by_id(line.product_id)?
                .ok_or(DomainError::ProductNotFound(line.product_id))?;
            items.push(OrderLineInput {
                product_id: product.id,
                seller_id: product.seller_id,
                product_name: product.name,
                image_url: product.image_url,
                quantity: line.quantity,
                unit_price: product.price,
                shipping_fee: BigDecimal::from(0),
            });
        }
        let subtotal = items
            .iter()
            .map(|i| &i.unit_price * BigDecimal::from(i.quantity) + &i.shipping_fee)
            .sum();

        self.checkout(CheckoutRequest {
            buyer_id,
            shipping_address,
            payment_method,
            payment_details,
            items,
            subtotal,
        })
    }
}
