//! Data every storefront page shares: who is signed in, the pending toast
//! and the current path for the header links.

use tower_sessions::Session;

use crate::middleware::CustomerSession;
use crate::models::{CurrentCustomer, Flash};

/// Header identity for templates.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub name: String,
    pub email: String,
}

impl From<&CurrentCustomer> for CustomerView {
    fn from(customer: &CurrentCustomer) -> Self {
        Self {
            name: customer.name.clone(),
            email: customer.email.clone(),
        }
    }
}

/// Header links: (path, label).
pub const NAV: &[(&str, &str)] = &[
    ("/", "Home"),
    ("/collections", "Collections"),
    ("/catalogsearch", "Shop"),
];

/// Layout context passed to every page template as `ctx`.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub customer: Option<CustomerView>,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub nav: &'static [(&'static str, &'static str)],
}

impl PageContext {
    /// Build the context for any visitor, consuming the pending toast.
    pub async fn new(
        session: &Session,
        customer: Option<&CurrentCustomer>,
        current_path: impl Into<String>,
    ) -> Self {
        Self {
            customer: customer.map(CustomerView::from),
            current_path: current_path.into(),
            flash: Flash::take(session).await,
            nav: NAV,
        }
    }

    /// Build the context for a signed-in customer.
    pub async fn for_customer(auth: &CustomerSession, current_path: impl Into<String>) -> Self {
        Self::new(auth.session(), Some(&auth.customer), current_path).await
    }

    #[must_use]
    pub const fn signed_in(&self) -> bool {
        self.customer.is_some()
    }

    /// Whether a header link is the active section.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        if path == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(path: &str) -> PageContext {
        PageContext {
            customer: None,
            current_path: path.to_string(),
            flash: None,
            nav: NAV,
        }
    }

    #[test]
    fn test_home_only_matches_root() {
        assert!(context("/").is_active("/"));
        assert!(!context("/collections").is_active("/"));
        assert!(context("/catalogsearch?q=ao").is_active("/catalogsearch"));
        assert!(!context("/").signed_in());
    }
}
