use thiserror::Error;
use uuid::Uuid;

/// Stable classification of a [`DomainError`], used by the HTTP layer to pick
/// a status code and by clients to branch on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    InvalidTransition,
    Unauthorized,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Order not found")]
    OrderNotFound,
    #[error("Item for product {0} not found in order")]
    ItemNotFound(Uuid),
    #[error("Product {0} not found")]
    ProductNotFound(Uuid),
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Order must contain at least one item")]
    EmptyOrder,
    #[error("{0}")]
    InvalidPaymentDetails(String),
    #[error("Unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("{0}")]
    InvalidTransition(String),
    #[error("{0}")]
    InvalidItemState(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Order {0} was modified concurrently, reload and retry")]
    Conflict(Uuid),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::OrderNotFound
            | DomainError::ItemNotFound(_)
            | DomainError::ProductNotFound(_) => ErrorKind::NotFound,
            DomainError::EmptyCart
            | DomainError::EmptyOrder
            | DomainError::InvalidPaymentDetails(_)
            | DomainError::UnsupportedPaymentMethod(_)
            | DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::InvalidTransition(_) | DomainError::InvalidItemState(_) => {
                ErrorKind::InvalidTransition
            }
            DomainError::Unauthorized(_) => ErrorKind::Unauthorized,
            DomainError::Conflict(_) => ErrorKind::Conflict,
            DomainError::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_failures_are_not_found() {
        assert_eq!(DomainError::OrderNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            DomainError::ItemNotFound(Uuid::nil()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DomainError::ProductNotFound(Uuid::nil()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn payment_and_cart_failures_are_validation() {
        assert_eq!(DomainError::EmptyCart.kind(), ErrorKind::Validation);
        assert_eq!(
            DomainError::UnsupportedPaymentMethod("Cash".into()).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn guard_messages_are_displayed_verbatim() {
        let err = DomainError::InvalidTransition(
            "Item must be shipped before it can be delivered.".into(),
        );
        assert_eq!(
            err.to_string(),
            "Item must be shipped before it can be delivered."
        );
        assert_eq!(err.kind().as_str(), "invalid_transition");
    }
}
