use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::payment::{validate_payment as validate, PaymentDetails};
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidatePaymentRequest {
    /// One of "Credit Card", "PayPal", "Bank Transfer" or "PayNow"
    pub payment_method: String,
    #[serde(default)]
    pub payment_details: PaymentDetails,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidatePaymentResponse {
    pub valid: bool,
    pub payment_method: String,
}

/// POST /payments/validate
///
/// Checks the payment details against the method's required fields without
/// placing an order.
#[utoipa::path(
    post,
    path = "/payments/validate",
    request_body = ValidatePaymentRequest,
    responses(
        (status = 200, description = "Details are complete", body = ValidatePaymentResponse),
        (status = 400, description = "Missing fields or unsupported method"),
    ),
    tag = "payments"
)]
pub async fn validate_payment(
    body: web::Json<ValidatePaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let payment = validate(&body.payment_method, &body.payment_details)?;

    Ok(HttpResponse::Ok().json(ValidatePaymentResponse {
        valid: true,
        payment_method: payment.method().to_string(),
    }))
}
