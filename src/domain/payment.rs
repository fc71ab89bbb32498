use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::errors::DomainError;

/// Payment method an order was paid with, as stored on the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    CreditCard,
    PayPal,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::BankTransfer => "Bank Transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Credit Card" => Ok(PaymentMethod::CreditCard),
            "PayPal" => Ok(PaymentMethod::PayPal),
            // PayNow is settled as a bank transfer.
            "Bank Transfer" | "PayNow" => Ok(PaymentMethod::BankTransfer),
            other => Err(DomainError::UnsupportedPaymentMethod(other.to_string())),
        }
    }
}

/// Payment fields exactly as the buyer submitted them. Which fields matter
/// depends on the method; the bag is stored on the order unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaymentDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paypal_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub card_number: String,
    pub card_name: String,
    pub expiry: String,
    pub cvv: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayPalDetails {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankTransferDetails {
    pub reference_number: String,
}

/// A validated payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payment {
    CreditCard(CardDetails),
    PayPal(PayPalDetails),
    BankTransfer(BankTransferDetails),
}

fn required(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Payment {
    /// Validates `details` against the fields required by `method`.
    pub fn validate(method: PaymentMethod, details: &PaymentDetails) -> Result<Self, DomainError> {
        match method {
            PaymentMethod::CreditCard => {
                let (Some(card_number), Some(card_name), Some(expiry), Some(cvv)) = (
                    required(&details.card_number),
                    required(&details.card_name),
                    required(&details.expiry),
                    required(&details.cvv),
                ) else {
                    return Err(DomainError::InvalidPaymentDetails(
                        "Invalid credit card details".to_string(),
                    ));
                };
                Ok(Payment::CreditCard(CardDetails {
                    card_number,
                    card_name,
                    expiry,
                    cvv,
                }))
            }
            PaymentMethod::PayPal => required(&details.paypal_email)
                .map(|email| Payment::PayPal(PayPalDetails { email }))
                .ok_or_else(|| {
                    DomainError::InvalidPaymentDetails("Invalid PayPal email".to_string())
                }),
            PaymentMethod::BankTransfer => required(&details.reference_number)
                .map(|reference_number| {
                    Payment::BankTransfer(BankTransferDetails { reference_number })
                })
                .ok_or_else(|| {
                    DomainError::InvalidPaymentDetails("Invalid bank transfer details".to_string())
                }),
        }
    }

    pub fn method(&self) -> PaymentMethod {
        match self {
            Payment::CreditCard(_) => PaymentMethod::CreditCard,
            Payment::PayPal(_) => PaymentMethod::PayPal,
            Payment::BankTransfer(_) => PaymentMethod::BankTransfer,
        }
    }

    /// Settlement hook. No gateway is called; the payment is only logged.
    pub fn process(&self) {
        match self {
            Payment::CreditCard(card) => {
                let digits: Vec<char> = card.card_number.chars().collect();
                let last_four: String = digits[digits.len().saturating_sub(4)..].iter().collect();
                log::info!("Processing credit card payment for card ending in {}", last_four);
            }
            Payment::PayPal(paypal) => {
                log::info!("Processing PayPal payment for {}", paypal.email);
            }
            Payment::BankTransfer(transfer) => {
                log::info!(
                    "Processing bank transfer with reference {}",
                    transfer.reference_number
                );
            }
        }
    }
}

/// Resolves `method` and validates `details` for it.
pub fn validate_payment(method: &str, details: &PaymentDetails) -> Result<Payment, DomainError> {
    let method: PaymentMethod = method.parse()?;
    Payment::validate(method, details)
}
