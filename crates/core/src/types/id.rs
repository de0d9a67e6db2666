//! Newtype IDs for commerce API resources.
//!
//! Every resource owned by the backend is keyed by an integer. The
//! `define_id!` macro wraps that integer so a product id can never be passed
//! where an order id is expected.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>`, `Into<i32>` and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use boutique_core::define_id;
/// define_id!(ReviewId);
///
/// let id: ReviewId = "42".parse().unwrap();
/// assert_eq!(id.as_i32(), 42);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Catalog
define_id!(ProductId);
define_id!(VariantId);
define_id!(CategoryId);
define_id!(SupplierId);
define_id!(SizeId);
define_id!(ColorId);

// Orders
define_id!(OrderId);
define_id!(OrderItemId);
define_id!(OrderStatusId);
define_id!(OrderHistoryId);
define_id!(ShippingMethodId);
define_id!(PaymentMethodId);

// Customers
define_id!(UserId);
define_id!(AddressId);
define_id!(ShippingInfoId);
define_id!(CartItemId);

// Marketing
define_id!(CouponId);
define_id!(CouponUsageId);
define_id!(PromotionId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_transparently() {
        let id = ProductId::new(17);
        assert_eq!(serde_json::to_string(&id).unwrap(), "17");

        let parsed: OrderId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed.as_i32(), 42);
    }

    #[test]
    fn test_id_from_str_trims() {
        let id: CategoryId = " 9 ".parse().unwrap();
        assert_eq!(id, CategoryId::new(9));
        assert!("abc".parse::<CategoryId>().is_err());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(UserId::new(5).to_string(), "5");
    }
}
