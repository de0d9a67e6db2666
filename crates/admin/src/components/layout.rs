//! Data every admin page shares: the signed-in user, the active nav item
//! and the pending toast.

use crate::middleware::AdminSession;
use crate::models::{CurrentAdmin, Flash};

/// Header identity for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.clone(),
            role: admin.role.map(|r| r.to_string()).unwrap_or_default(),
        }
    }
}

/// Sidebar entries: (path, label).
pub const NAV: &[(&str, &str)] = &[
    ("/", "Dashboard"),
    ("/products", "Products"),
    ("/categories", "Categories"),
    ("/orders", "Orders"),
    ("/users", "Users"),
    ("/coupons", "Coupons"),
    ("/sales", "Sales"),
];

/// Layout context passed to every page template as `ctx`.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Flash>,
    pub nav: &'static [(&'static str, &'static str)],
}

impl PageContext {
    /// Build the context, consuming the pending toast.
    pub async fn new(auth: &AdminSession, current_path: &'static str) -> Self {
        Self {
            admin_user: AdminUserView::from(&auth.admin),
            current_path,
            flash: auth.take_flash().await,
            nav: NAV,
        }
    }

    /// Whether a sidebar entry is the active section.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        if path == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(path)
        }
    }
}
