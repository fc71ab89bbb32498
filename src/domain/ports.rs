use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{NewOrder, Order};

pub trait OrderRepository: Send + Sync + 'static {
    /// Persists the whole aggregate in one write and assigns its id.
    fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// Orders placed by `buyer_id`, newest first.
    fn find_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, DomainError>;
    /// Orders containing at least one item sold by `seller_id`, newest first,
    /// with all of their items.
    fn find_by_seller(&self, seller_id: Uuid) -> Result<Vec<Order>, DomainError>;
    fn find_all(&self) -> Result<Vec<Order>, DomainError>;
    /// Writes the order back if nobody saved it since it was loaded
    /// (`order.version` matches the stored version), otherwise fails with
    /// [`DomainError::Conflict`]. Returns the new version.
    fn update(&self, order: &Order) -> Result<i32, DomainError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub image_url: Option<String>,
    pub stock: i32,
}

pub trait ProductRepository: Send + Sync + 'static {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn save(&self, product: &Product) -> Result<(), DomainError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

pub trait CartRepository: Send + Sync + 'static {
    fn get_cart(&self, buyer_id: Uuid) -> Result<Vec<CartItem>, DomainError>;
    fn clear_cart(&self, buyer_id: Uuid) -> Result<(), DomainError>;
}

/// Display names of sellers. Never consulted for authorization.
pub trait SellerDirectory: Send + Sync + 'static {
    fn seller_name(&self, seller_id: Uuid) -> Result<Option<String>, DomainError>;
}

impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        (**self).create(order)
    }
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        (**self).find_by_id(id)
    }
    fn find_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, DomainError> {
        (**self).find_by_buyer(buyer_id)
    }
    fn find_by_seller(&self, seller_id: Uuid) -> Result<Vec<Order>, DomainError> {
        (**self).find_by_seller(seller_id)
    }
    fn find_all(&self) -> Result<Vec<Order>, DomainError> {
        (**self).find_all()
    }
    fn update(&self, order: &Order) -> Result<i32, DomainError> {
        (**self).update(order)
    }
}

impl<T: ProductRepository + ?Sized> ProductRepository for Arc<T> {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        (**self).find_by_id(id)
    }
    fn save(&self, product: &Product) -> Result<(), DomainError> {
        (**self).save(product)
    }
}

impl<T: CartRepository + ?Sized> CartRepository for Arc<T> {
    fn get_cart(&self, buyer_id: Uuid) -> Result<Vec<CartItem>, DomainError> {
        (**self).get_cart(buyer_id)
    }
    fn clear_cart(&self, buyer_id: Uuid) -> Result<(), DomainError> {
        (**self).clear_cart(buyer_id)
    }
}

impl<T: SellerDirectory + ?Sized> SellerDirectory for Arc<T> {
    fn seller_name(&self, seller_id: Uuid) -> Result<Option<String>, DomainError> {
        (**self).seller_name(seller_id)
    }
}
