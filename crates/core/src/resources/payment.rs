//! Payment methods and gateway results.

use serde::{Deserialize, Serialize};

use crate::types::{PaymentMethodId, Vnd};

/// Row of `GET /payment-methods/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl PaymentMethod {
    /// Whether paying with this method sends the customer to the VNPAY gateway.
    #[must_use]
    pub fn is_vnpay(&self) -> bool {
        self.code.eq_ignore_ascii_case("VNPAY")
    }
}

const fn default_active() -> bool {
    true
}

/// Response of `POST /process-payment/`, the gateway return callback.
///
/// The backend echoes the gateway's query parameters and adds the payment
/// outcome to them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaymentResult {
    /// Order code as sent to the gateway.
    #[serde(default, rename = "vnp_OrderInfo")]
    pub order_info: Option<String>,
    #[serde(default, rename = "vnp_ResponseCode")]
    pub response_code: Option<String>,
    /// Gateway response text stored with the payment.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub total_amount: Option<Vnd>,
    #[serde(default)]
    pub paid_at: Option<String>,
}

impl PaymentResult {
    /// VNPAY reports success with response code `00`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response_code.as_deref().is_none_or(|c| c == "00") && self.paid_at.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_vnpay_detection() {
        let method: PaymentMethod =
            serde_json::from_str(r#"{"id": 2, "code": "vnpay", "name": "VNPAY"}"#).unwrap();
        assert!(method.is_vnpay());
        assert!(method.is_active);

        let cod: PaymentMethod = serde_json::from_str(
            r#"{"id": 1, "code": "COD", "name": "Cash on delivery", "is_active": false}"#,
        )
        .unwrap();
        assert!(!cod.is_vnpay());
        assert!(!cod.is_active);
    }

    #[test]
    fn test_payment_result_from_echoed_params() {
        let json = r#"{"vnp_OrderInfo": "ORD-0031", "vnp_ResponseCode": "00",
            "paid_at": "2025-03-05T14:07:00+07:00", "total_amount": 630000,
            "description": "Giao dich thanh cong"}"#;
        let result: PaymentResult = serde_json::from_str(json).unwrap();
        assert!(result.is_success());
        assert_eq!(result.order_info.as_deref(), Some("ORD-0031"));
        assert_eq!(result.total_amount, Some(Vnd::new(630_000)));

        let failed: PaymentResult =
            serde_json::from_str(r#"{"vnp_ResponseCode": "24", "paid_at": null}"#).unwrap();
        assert!(!failed.is_success());
    }
}
