pub mod catalog_repo;
pub mod in_memory;
pub mod models;
pub mod order_repo;

pub use catalog_repo::{DieselCartRepository, DieselProductRepository, DieselSellerDirectory};
pub use in_memory::{
    InMemoryCartRepository, InMemoryOrderRepository, InMemoryProductRepository,
    InMemorySellerDirectory,
};
pub use order_repo::DieselOrderRepository;
