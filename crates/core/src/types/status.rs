//! Status and kind enums shared by the admin console and the storefront.
//!
//! The commerce API owns every transition; these enums only name the values
//! it sends and attach the labels shown on screen.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// The happy path is `Pending → Packed → Delivering → Delivered`, driven by
/// `POST /orders/{id}/process/`. `Cancelled` is reached through
/// `POST /orders/{id}/cancel/`; `Returned` and `Refunded` are set by staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Packed,
    Delivering,
    Delivered,
    Cancelled,
    Returned,
    Refunded,
}

impl OrderStatus {
    /// All statuses in workflow order.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Packed,
        Self::Delivering,
        Self::Delivered,
        Self::Cancelled,
        Self::Returned,
        Self::Refunded,
    ];

    /// Uppercase status code as stored in `order-statuses`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Packed => "PACKED",
            Self::Delivering => "DELIVERING",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::Returned => "RETURNED",
            Self::Refunded => "REFUNDED",
        }
    }

    /// Short label for filters and badges.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Packed => "Packed",
            Self::Delivering => "Delivering",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Returned => "Returned",
            Self::Refunded => "Refunded",
        }
    }

    /// Sentence describing the status to a customer.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Pending => "Order is being processed",
            Self::Packed => "Order has been packed, waiting for shipment",
            Self::Delivering => "Order is in transit",
            Self::Delivered => "Order has been successfully delivered",
            Self::Cancelled => "Order has been canceled",
            Self::Returned => "Order has been returned",
            Self::Refunded => "Order has been refunded",
        }
    }

    /// Parse a status code, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.code().eq_ignore_ascii_case(code))
    }

    /// Message for a raw status code; unknown codes get a generic message.
    #[must_use]
    pub fn message_for_code(code: &str) -> &'static str {
        Self::from_code(code).map_or("Unknown status", Self::message)
    }

    /// The status `process` moves the order to, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Packed),
            Self::Packed => Some(Self::Delivering),
            Self::Delivering => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled | Self::Returned | Self::Refunded => None,
        }
    }

    /// Whether the order can still be processed to a later stage.
    #[must_use]
    pub const fn is_processable(self) -> bool {
        self.next().is_some()
    }

    /// Whether the order can still be cancelled (not yet handed to a carrier).
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Packed)
    }

    /// Whether the order reached a final state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !self.is_processable()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Discount kind shared by coupons and promotions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PromotionType {
    #[default]
    #[serde(rename = "percentage")]
    Percentage,
    #[serde(rename = "fixed")]
    Fixed,
    #[serde(rename = "free shipping")]
    FreeShipping,
    #[serde(rename = "buy one get one")]
    BuyOneGetOne,
}

impl PromotionType {
    /// All discount kinds, in the order the forms list them.
    pub const ALL: [Self; 4] = [
        Self::Percentage,
        Self::Fixed,
        Self::FreeShipping,
        Self::BuyOneGetOne,
    ];

    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
            Self::FreeShipping => "free shipping",
            Self::BuyOneGetOne => "buy one get one",
        }
    }

    /// Human label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Percentage => "Percentage",
            Self::Fixed => "Fixed amount",
            Self::FreeShipping => "Free shipping",
            Self::BuyOneGetOne => "Buy one get one",
        }
    }

    /// Render a discount value of this kind (`15%`, `50.000 đ`).
    #[must_use]
    pub fn describe_value(self, value: Option<i64>) -> String {
        match (self, value) {
            (Self::Percentage, Some(v)) => format!("{v}%"),
            (Self::Fixed, Some(v)) => crate::Vnd::new(v).format(),
            (Self::FreeShipping | Self::BuyOneGetOne, _) | (_, None) => self.label().to_string(),
        }
    }
}

impl std::fmt::Display for PromotionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PromotionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid promotion type: {s}"))
    }
}

/// Supplier account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SupplierStatus {
    #[default]
    Active,
    Inactive,
    Pending,
}

impl std::fmt::Display for SupplierStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

impl std::str::FromStr for SupplierStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "pending" => Ok(Self::Pending),
            _ => Err(format!("invalid supplier status: {s}")),
        }
    }
}

/// Account role assigned by the commerce API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Moderator,
    Customer,
    Employee,
}

impl Role {
    /// Whether the role may sign in to the back-office console.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        !matches!(self, Self::Customer)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "Admin"),
            Self::Moderator => write!(f, "Moderator"),
            Self::Customer => write!(f, "Customer"),
            Self::Employee => write!(f, "Employee"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "Moderator" => Ok(Self::Moderator),
            "Customer" => Ok(Self::Customer),
            "Employee" => Ok(Self::Employee),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_messages() {
        assert_eq!(
            OrderStatus::message_for_code("PENDING"),
            "Order is being processed"
        );
        assert_eq!(
            OrderStatus::message_for_code("packed"),
            "Order has been packed, waiting for shipment"
        );
        assert_eq!(OrderStatus::message_for_code("LOST"), "Unknown status");
    }

    #[test]
    fn test_order_status_workflow() {
        assert_eq!(OrderStatus::Pending.next(), Some(OrderStatus::Packed));
        assert_eq!(OrderStatus::Packed.next(), Some(OrderStatus::Delivering));
        assert_eq!(OrderStatus::Delivering.next(), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::Delivered.next(), None);

        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Packed.is_cancellable());
        assert!(!OrderStatus::Delivering.is_cancellable());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_order_status_serde_uses_codes() {
        let json = serde_json::to_string(&OrderStatus::Delivering).ok();
        assert_eq!(json.as_deref(), Some("\"DELIVERING\""));
    }

    #[test]
    fn test_promotion_type_wire_names() {
        let json = serde_json::to_string(&PromotionType::FreeShipping).ok();
        assert_eq!(json.as_deref(), Some("\"free shipping\""));
        assert_eq!(
            "Buy One Get One".parse::<PromotionType>(),
            Ok(PromotionType::BuyOneGetOne)
        );
        assert_eq!(PromotionType::Percentage.describe_value(Some(15)), "15%");
        assert_eq!(PromotionType::Fixed.describe_value(Some(50_000)), "50.000 đ");
    }

    #[test]
    fn test_role_staff() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Employee.is_staff());
        assert!(!Role::Customer.is_staff());
        assert_eq!("Moderator".parse::<Role>(), Ok(Role::Moderator));
    }
}
