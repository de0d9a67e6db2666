//! Users and their shipping records.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query},
    response::Redirect,
    routing::{get, post},
};
use boutique_core::{ShippingInfoId, ShippingInfoInput, User, UserId, format_datetime};
use serde::Deserialize;
use tracing::instrument;

use super::orders::types::ShippingInfoView;
use super::{parse_opt, report};
use crate::backend;
use crate::components::data_table::users_table_config;
use crate::components::{DataTableConfig, PageContext, Pagination};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// User row and detail header.
#[derive(Debug, Clone)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub roles: String,
    pub joined: String,
    pub active: bool,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.display_name().to_string(),
            email: user.email.clone(),
            phone: user.phone_number.clone().unwrap_or_default(),
            roles: user
                .all_roles()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            joined: user
                .date_joined
                .as_ref()
                .map(format_datetime)
                .unwrap_or_default(),
            active: user.is_active,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersTemplate {
    pub ctx: PageContext,
    pub table: DataTableConfig,
    pub rows: Vec<UserView>,
    pub pagination: Pagination,
}

#[derive(Template, WebTemplate)]
#[template(path = "users/show.html")]
pub struct UserTemplate {
    pub ctx: PageContext,
    pub user: UserView,
    pub shipping_infos: Vec<ShippingInfoView>,
}

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
}

/// Shipping info form; a blank `id` creates a new record for the user.
#[derive(Debug, Deserialize)]
pub struct UserShippingForm {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub recipient_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub ward: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub city: String,
}

impl UserShippingForm {
    fn input(self, user: UserId) -> (Option<ShippingInfoId>, ShippingInfoInput) {
        let id = parse_opt(self.id.as_deref());
        (
            id,
            ShippingInfoInput {
                user: id.is_none().then_some(user),
                recipient_name: self.recipient_name.trim().to_string(),
                phone_number: self.phone_number.trim().to_string(),
                address: self.address.trim().to_string(),
                ward: self.ward,
                district: self.district,
                city: self.city,
            },
        )
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(index))
        .route("/users/{id}", get(show))
        .route("/users/{id}/delete", post(delete))
        .route("/users/{id}/shipping-info", post(save_shipping_info))
}

#[instrument(skip(auth))]
async fn index(
    RequireAdminAuth(auth): RequireAdminAuth,
    Query(query): Query<UsersQuery>,
) -> Result<UsersTemplate> {
    let page = query.page.unwrap_or(1).max(1);
    let search = query.search.unwrap_or_default();
    let term = Some(search.trim()).filter(|s| !s.is_empty());

    let users = auth
        .call(|t| backend::users::list(auth.api(), t, term, Some(page)))
        .await?;

    let params = [("search", search.clone())];
    Ok(UsersTemplate {
        ctx: PageContext::new(&auth, "/users").await,
        table: users_table_config().with_values(&params),
        rows: users.items().iter().map(UserView::from).collect(),
        pagination: Pagination::new("/users", &params, page, users.total(), users.has_next()),
    })
}

/// User detail with shipping records.
#[instrument(skip(auth))]
async fn show(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<UserId>,
) -> Result<UserTemplate> {
    let (user, infos) = tokio::try_join!(
        auth.call(|t| backend::users::get(auth.api(), t, id)),
        auth.call(|t| backend::shipping_info::for_user(auth.api(), t, id)),
    )?;

    Ok(UserTemplate {
        ctx: PageContext::new(&auth, "/users").await,
        user: UserView::from(&user),
        shipping_infos: infos.items().iter().map(ShippingInfoView::from).collect(),
    })
}

#[instrument(skip(auth))]
async fn delete(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<UserId>,
) -> Result<Redirect> {
    let result = auth
        .call(|t| backend::users::delete(auth.api(), t, id))
        .await;
    let deleted = report(&auth, result, "Delete user successfully", "Error deleting user").await?;
    Ok(match deleted {
        Some(()) => Redirect::to("/users"),
        None => Redirect::to(&format!("/users/{id}")),
    })
}

#[instrument(skip(auth, form))]
async fn save_shipping_info(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<UserId>,
    Form(form): Form<UserShippingForm>,
) -> Result<Redirect> {
    match form.input(id) {
        (Some(info_id), input) => {
            let result = auth
                .call(|t| backend::shipping_info::update(auth.api(), t, info_id, &input))
                .await;
            report(
                &auth,
                result,
                "Update shipping info successfully",
                "Error updating shipping info",
            )
            .await?;
        }
        (None, input) => {
            let result = auth
                .call(|t| backend::shipping_info::create(auth.api(), t, &input))
                .await;
            report(
                &auth,
                result,
                "Create shipping info successfully",
                "Error creating shipping info",
            )
            .await?;
        }
    }
    Ok(Redirect::to(&format!("/users/{id}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(id: Option<&str>) -> UserShippingForm {
        UserShippingForm {
            id: id.map(str::to_string),
            recipient_name: " Lan ".into(),
            phone_number: "0901234567".into(),
            address: "12 Ly Thuong Kiet".into(),
            ward: "Hang Bai".into(),
            district: "Hoan Kiem".into(),
            city: "Ha Noi".into(),
        }
    }

    #[test]
    fn test_blank_id_creates_for_user() {
        let (id, input) = form(Some("")).input(UserId::new(4));
        assert!(id.is_none());
        assert_eq!(input.user, Some(UserId::new(4)));
        assert_eq!(input.recipient_name, "Lan");
    }

    #[test]
    fn test_existing_id_updates() {
        let (id, input) = form(Some("11")).input(UserId::new(4));
        assert_eq!(id, Some(ShippingInfoId::new(11)));
        assert!(input.user.is_none());
    }

    #[test]
    fn test_user_view_roles() {
        let user: User = serde_json::from_str(
            r#"{"id": 2, "email": "an@boutique.vn", "roles": ["Admin"], "role": "Employee"}"#,
        )
        .unwrap();
        let view = UserView::from(&user);
        assert_eq!(view.roles, "Admin, Employee");
        assert_eq!(view.name, "an@boutique.vn");
    }
}
