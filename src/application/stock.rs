use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::OrderItem;
use crate::domain::ports::ProductRepository;

#[derive(Debug, Default)]
pub struct StockReport {
    /// `(product_id, stock after adjustment)`
    pub adjusted: Vec<(Uuid, i32)>,
    pub failed: Vec<(Uuid, DomainError)>,
}

impl StockReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Soft-inventory adjustment: stock is decremented and clamped at zero,
/// oversell is never rejected.
pub struct StockAdjuster<P> {
    products: P,
}

impl<P: ProductRepository> StockAdjuster<P> {
    pub fn new(products: P) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &P {
        &self.products
    }

    /// Applies every item independently. A failed item is recorded in the
    /// report and logged; it neither stops the remaining items nor undoes the
    /// ones already applied.
    pub fn apply(&self, items: &[OrderItem]) -> StockReport {
        let mut report = StockReport::default();
        for item in items {
            match self.adjust(item.product_id, item.quantity) {
                Ok(stock) => report.adjusted.push((item.product_id, stock)),
                Err(e) => {
                    log::warn!(
                        "Stock adjustment for product {} (quantity {}) failed: {}",
                        item.product_id,
                        item.quantity,
                        e
                    );
                    report.failed.push((item.product_id, e));
                }
            }
        }
        report
    }

    fn adjust(&self, product_id: Uuid, quantity: i32) -> Result<i32, DomainError> {
        let mut product = self
            .products
            .find_by_id(product_id)?
            .ok_or(DomainError::ProductNotFound(product_id))?;

        let previous = product.stock;
        product.stock = previous.saturating_sub(quantity).max(0);
        if quantity > previous {
            log::info!(
                "Product {} oversold: requested {}, {} in stock",
                product_id,
                quantity,
                previous
            );
        }
        self.products.save(&product)?;
        Ok(product.stock)
    }
}
