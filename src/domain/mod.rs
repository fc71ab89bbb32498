pub mod actor;
pub mod errors;
pub mod order;
pub mod payment;
pub mod ports;
pub mod status;
