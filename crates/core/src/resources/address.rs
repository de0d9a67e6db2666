//! Delivery addresses and the administrative divisions they reference.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::types::{AddressId, ShippingInfoId, UserId};

/// Province, district or ward as stored by the commerce API.
///
/// Returned by `GET /provinces/`, `GET /provinces/{id}/districts/` and
/// `GET /districts/{id}/wards/`, and nested in addresses as `*_details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub code_name: Option<String>,
}

/// A customer's saved delivery address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub id: AddressId,
    #[serde(default)]
    pub user: Option<UserId>,
    #[serde(default)]
    pub recipient_name: String,
    #[serde(default)]
    pub phone_number: String,
    /// Label chosen by the customer ("Home", "Office").
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub specific_address: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub province_city: Option<i32>,
    #[serde(default)]
    pub province_city_details: Option<Location>,
    #[serde(default)]
    pub district: Option<i32>,
    #[serde(default)]
    pub district_details: Option<Location>,
    #[serde(default)]
    pub ward_commune: Option<i32>,
    #[serde(default)]
    pub ward_commune_details: Option<Location>,
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
}

impl DeliveryAddress {
    /// Street, ward, district and province joined for display.
    #[must_use]
    pub fn one_line(&self) -> String {
        let parts = [
            Some(self.specific_address.as_str()),
            self.ward_commune_details.as_ref().map(|l| l.name.as_str()),
            self.district_details.as_ref().map(|l| l.name.as_str()),
            self.province_city_details.as_ref().map(|l| l.name.as_str()),
        ];
        parts
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Body of `POST /delivery-addresses/` and `PUT /delivery-addresses/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AddressInput {
    pub recipient_name: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub specific_address: String,
    pub province_city: i32,
    pub district: i32,
    pub ward_commune: i32,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressInput {
    /// First missing required field, as a message for the form.
    #[must_use]
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.recipient_name.trim().is_empty() {
            Some("Please enter the recipient name")
        } else if self.phone_number.trim().is_empty() {
            Some("Please enter a phone number")
        } else if self.province_city <= 0 || self.district <= 0 || self.ward_commune <= 0 {
            Some("Please choose a province, district and ward")
        } else if self.specific_address.trim().is_empty() {
            Some("Please enter the street address")
        } else {
            None
        }
    }
}

/// A user's shipping record as seen from the console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub id: ShippingInfoId,
    #[serde(default)]
    pub user: Option<UserId>,
    #[serde(default)]
    pub recipient_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub ward: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Body of `POST /shipping-info/` and `PUT /shipping_info/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShippingInfoInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
    pub recipient_name: String,
    pub phone_number: String,
    pub address: String,
    pub ward: String,
    pub district: String,
    pub city: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_address_one_line() {
        let json = r#"{
            "id": 4, "recipient_name": "Lan", "phone_number": "0901234567",
            "specific_address": "12 Ly Thuong Kiet", "is_default": true,
            "province_city": 1, "province_city_details": {"id": 1, "name": "Ha Noi", "code": "01"},
            "district": 5, "district_details": {"id": 5, "name": "Hoan Kiem"},
            "ward_commune": 9, "ward_commune_details": {"id": 9, "name": "Hang Bai"}
        }"#;
        let address: DeliveryAddress = serde_json::from_str(json).unwrap();
        assert_eq!(
            address.one_line(),
            "12 Ly Thuong Kiet, Hang Bai, Hoan Kiem, Ha Noi"
        );
    }

    #[test]
    fn test_address_input_requires_location() {
        let mut input = AddressInput {
            recipient_name: "Lan".into(),
            phone_number: "0901234567".into(),
            specific_address: "12 Ly Thuong Kiet".into(),
            ..AddressInput::default()
        };
        assert_eq!(
            input.missing_field(),
            Some("Please choose a province, district and ward")
        );
        input.province_city = 1;
        input.district = 5;
        input.ward_commune = 9;
        assert_eq!(input.missing_field(), None);
    }
}
