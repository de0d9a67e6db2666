//! Coupons and sale promotions.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::{
    CategoryId, CouponId, CouponUsageId, OrderId, ProductId, PromotionId, PromotionType, UserId,
    Vnd,
};

/// A discount code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: PromotionType,
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub min_order_amount: Option<Vnd>,
    #[serde(default)]
    pub max_discount_amount: Option<Vnd>,
    pub start_date: DateTime<FixedOffset>,
    pub end_date: DateTime<FixedOffset>,
    #[serde(default)]
    pub usage_limit_per_user: Option<i32>,
    #[serde(default)]
    pub usage_limit_per_coupon: Option<i32>,
    #[serde(default)]
    pub current_usage: i32,
    #[serde(default)]
    pub is_active: bool,
}

impl Coupon {
    /// `15%` or `50.000 đ` depending on the coupon type.
    #[must_use]
    pub fn value_label(&self) -> String {
        self.kind.describe_value(self.value)
    }

    /// Whether the coupon is active and `now` falls inside its window.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<FixedOffset>) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }
}

/// Validation failures on coupon and promotion forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MarketingInputError {
    #[error("Please enter a coupon code")]
    MissingCode,
    #[error("Please enter a name")]
    MissingName,
    #[error("End date cannot be before start date")]
    EndBeforeStart,
}

/// Body of `POST /coupons/` and `PUT /coupons/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CouponInput {
    pub code: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: PromotionType,
    pub value: Option<i64>,
    pub min_order_amount: Option<i64>,
    pub max_discount_amount: Option<i64>,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub usage_limit_per_user: Option<i32>,
    pub usage_limit_per_coupon: Option<i32>,
    pub is_active: bool,
}

impl CouponInput {
    /// Uppercase and trim the code, then check the date window.
    ///
    /// # Errors
    ///
    /// Returns an error when the code is blank or the window ends before it starts.
    pub fn normalized(mut self) -> Result<Self, MarketingInputError> {
        self.code = self.code.trim().to_uppercase();
        if self.code.is_empty() {
            return Err(MarketingInputError::MissingCode);
        }
        if self.end_date < self.start_date {
            return Err(MarketingInputError::EndBeforeStart);
        }
        Ok(self)
    }
}

/// Row of `GET /coupons/usage/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponUsage {
    pub id: CouponUsageId,
    #[serde(default)]
    pub user: Option<UserId>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub coupon: Option<CouponId>,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub order: Option<OrderId>,
    #[serde(default)]
    pub order_code: Option<String>,
    #[serde(default)]
    pub used_at: Option<DateTime<FixedOffset>>,
}

/// Filters accepted by `GET /coupons/usage/`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CouponUsageFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_id: Option<CouponId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
}

impl CouponUsageFilter {
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("user_id", self.user_id.map(|v| v.to_string())),
            ("coupon_id", self.coupon_id.map(|v| v.to_string())),
            ("order_id", self.order_id.map(|v| v.to_string())),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
    }
}

/// Response of `POST /coupons/validate/`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CouponValidation {
    pub is_valid: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub discount_amount: Option<Vnd>,
    #[serde(default)]
    pub coupon_id: Option<CouponId>,
    #[serde(default)]
    pub final_amount: Option<Vnd>,
}

/// A sale promotion applied to products or categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub id: PromotionId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: PromotionType,
    #[serde(default)]
    pub value: i64,
    pub start_date: DateTime<FixedOffset>,
    pub end_date: DateTime<FixedOffset>,
    #[serde(default)]
    pub max_discount_amount: Option<Vnd>,
    #[serde(default)]
    pub min_order_amount: Option<Vnd>,
    #[serde(default)]
    pub usage_limit: Option<i32>,
    #[serde(default)]
    pub current_usage: i32,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub applied_product_ids: Vec<ProductId>,
    #[serde(default)]
    pub applied_category_ids: Vec<CategoryId>,
}

impl Promotion {
    #[must_use]
    pub fn value_label(&self) -> String {
        self.kind.describe_value(Some(self.value))
    }
}

/// Body of `POST /promotions/` and `PUT /promotions/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromotionInput {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: PromotionType,
    pub value: i64,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub max_discount_amount: Option<i64>,
    pub min_order_amount: Option<i64>,
    pub usage_limit: Option<i32>,
    pub priority: i32,
    pub is_active: bool,
}

impl PromotionInput {
    /// Trim the name and check the date window.
    ///
    /// # Errors
    ///
    /// Returns an error when the name is blank or the window ends before it starts.
    pub fn normalized(mut self) -> Result<Self, MarketingInputError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(MarketingInputError::MissingName);
        }
        if self.end_date < self.start_date {
            return Err(MarketingInputError::EndBeforeStart);
        }
        Ok(self)
    }
}

/// Body of `POST /promotions/assign/` and `DELETE /promotions/remove/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromotionAssignment {
    pub promotion_id: PromotionId,
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

impl PromotionAssignment {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.product_ids.is_empty() && self.category_ids.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn coupon_input(code: &str, start: u32, end: u32) -> CouponInput {
        CouponInput {
            code: code.into(),
            description: "Spring".into(),
            kind: PromotionType::Percentage,
            value: Some(10),
            min_order_amount: None,
            max_discount_amount: Some(50_000),
            start_date: at(start),
            end_date: at(end),
            usage_limit_per_user: Some(1),
            usage_limit_per_coupon: None,
            is_active: true,
        }
    }

    #[test]
    fn test_coupon_code_is_uppercased_and_trimmed() {
        let input = coupon_input("  spring10 ", 1, 31).normalized().unwrap();
        assert_eq!(input.code, "SPRING10");
    }

    #[test]
    fn test_coupon_window_must_not_be_inverted() {
        assert_eq!(
            coupon_input("X", 10, 9).normalized(),
            Err(MarketingInputError::EndBeforeStart)
        );
        assert_eq!(
            coupon_input("   ", 1, 2).normalized(),
            Err(MarketingInputError::MissingCode)
        );
        assert!(coupon_input("SAME", 5, 5).normalized().is_ok());
    }

    #[test]
    fn test_coupon_wire_shape() {
        let json = r#"{"id": 3, "code": "FREESHIP", "type": "free shipping",
            "start_date": "2025-03-01T00:00:00+07:00", "end_date": "2025-03-31T23:59:00+07:00",
            "current_usage": 4, "is_active": true, "max_discount_amount": 30000}"#;
        let coupon: Coupon = serde_json::from_str(json).unwrap();
        assert_eq!(coupon.kind, PromotionType::FreeShipping);
        assert_eq!(coupon.value_label(), "Free shipping");
        assert_eq!(coupon.max_discount_amount, Some(Vnd::new(30_000)));

        let inside = DateTime::parse_from_rfc3339("2025-03-15T12:00:00+07:00").unwrap();
        let after = DateTime::parse_from_rfc3339("2025-04-01T00:00:00+07:00").unwrap();
        assert!(coupon.is_live_at(inside));
        assert!(!coupon.is_live_at(after));
    }

    #[test]
    fn test_coupon_input_serializes_type_field() {
        let input = coupon_input("A", 1, 2);
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["type"], "percentage");
        assert_eq!(json["start_date"], "2025-03-01T09:00:00");
    }

    #[test]
    fn test_promotion_assignment_body() {
        let body = PromotionAssignment {
            promotion_id: PromotionId::new(2),
            product_ids: vec![ProductId::new(7)],
            category_ids: vec![],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"promotion_id": 2, "product_ids": [7], "category_ids": []}));
        assert!(!body.is_empty());
    }
}
