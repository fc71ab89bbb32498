use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order};
use crate::domain::ports::{
    CartItem, CartRepository, OrderRepository, Product, ProductRepository, SellerDirectory,
};

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, DomainError> {
    lock.read()
        .map_err(|e| DomainError::Internal(format!("store lock poisoned: {e}")))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, DomainError> {
    lock.write()
        .map_err(|e| DomainError::Internal(format!("store lock poisoned: {e}")))
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}

/// Thread-safe in-memory order store with the same version check as the
/// database adapter. Clones share the same underlying map.
#[derive(Default, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let order = order.into_order(Uuid::new_v4());
        write(&self.orders)?.insert(order.id, order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(read(&self.orders)?.get(&id).cloned())
    }

    fn find_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let orders = read(&self.orders)?;
        Ok(newest_first(
            orders
                .values()
                .filter(|o| o.buyer_id == buyer_id)
                .cloned()
                .collect(),
        ))
    }

    fn find_by_seller(&self, seller_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let orders = read(&self.orders)?;
        Ok(newest_first(
            orders
                .values()
                .filter(|o| o.items.iter().any(|i| i.seller_id == seller_id))
                .cloned()
                .collect(),
        ))
    }

    fn find_all(&self) -> Result<Vec<Order>, DomainError> {
        Ok(newest_first(read(&self.orders)?.values().cloned().collect()))
    }

    fn update(&self, order: &Order) -> Result<i32, DomainError> {
        let mut orders = write(&self.orders)?;
        let stored = orders.get_mut(&order.id).ok_or(DomainError::OrderNotFound)?;
        if stored.version != order.version {
            return Err(DomainError::Conflict(order.id));
        }
        let version = order.version + 1;
        *stored = Order {
            version,
            ..order.clone()
        };
        Ok(version)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products.into_iter().map(|p| (p.id, p)).collect();
        Self {
            products: Arc::new(RwLock::new(products)),
        }
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(read(&self.products)?.get(&id).cloned())
    }

    fn save(&self, product: &Product) -> Result<(), DomainError> {
        write(&self.products)?.insert(product.id, product.clone());
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryCartRepository {
    carts: Arc<RwLock<HashMap<Uuid, Vec<CartItem>>>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, buyer_id: Uuid, item: CartItem) -> Result<(), DomainError> {
        write(&self.carts)?.entry(buyer_id).or_default().push(item);
        Ok(())
    }
}

impl CartRepository for InMemoryCartRepository {
    fn get_cart(&self, buyer_id: Uuid) -> Result<Vec<CartItem>, DomainError> {
        Ok(read(&self.carts)?
            .get(&buyer_id)
            .cloned()
            .unwrap_or_default())
    }

    fn clear_cart(&self, buyer_id: Uuid) -> Result<(), DomainError> {
        write(&self.carts)?.remove(&buyer_id);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemorySellerDirectory {
    names: Arc<RwLock<HashMap<Uuid, String>>>,
}

impl InMemorySellerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, seller_id: Uuid, name: &str) -> Result<(), DomainError> {
        write(&self.names)?.insert(seller_id, name.to_string());
        Ok(())
    }
}

impl SellerDirectory for InMemorySellerDirectory {
    fn seller_name(&self, seller_id: Uuid) -> Result<Option<String>, DomainError> {
        Ok(read(&self.names)?.get(&seller_id).cloned())
    }
}
