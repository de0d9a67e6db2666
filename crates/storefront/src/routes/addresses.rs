//! Address book.
//!
//! Province, district and ward pickers are filled from `/api/...` by
//! `storefront.js`; the form posts the backend ids.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query},
    response::Redirect,
    routing::{get, post},
};
use boutique_core::{AddressId, AddressInput, DeliveryAddress};
use serde::Deserialize;
use tracing::instrument;

use super::{parse_opt, report};
use crate::backend;
use crate::components::PageContext;
use crate::error::Result;
use crate::filters;
use crate::middleware::{CustomerSession, RequireAuth};
use crate::models::Flash;
use crate::state::AppState;

const PAGE: &str = "/account/delivery-address";

/// Saved address row.
#[derive(Debug, Clone)]
pub struct AddressView {
    pub id: String,
    pub label: String,
    pub recipient: String,
    pub phone: String,
    pub line: String,
    pub is_default: bool,
}

impl From<&DeliveryAddress> for AddressView {
    fn from(address: &DeliveryAddress) -> Self {
        Self {
            id: address.id.to_string(),
            label: address.name.clone().unwrap_or_default(),
            recipient: address.recipient_name.clone(),
            phone: address.phone_number.clone(),
            line: address.one_line(),
            is_default: address.is_default,
        }
    }
}

/// Values shown in the create/edit form. Location ids are passed to the
/// pickers as `data-selected` so they can restore the selection.
#[derive(Debug, Clone, Default)]
pub struct AddressFormView {
    pub action: String,
    pub editing: bool,
    pub recipient_name: String,
    pub phone_number: String,
    pub name: String,
    pub specific_address: String,
    pub province_city: String,
    pub district: String,
    pub ward_commune: String,
    pub is_default: bool,
}

impl AddressFormView {
    fn blank() -> Self {
        Self {
            action: PAGE.to_string(),
            ..Self::default()
        }
    }
}

impl From<&DeliveryAddress> for AddressFormView {
    fn from(address: &DeliveryAddress) -> Self {
        let id = |value: Option<i32>| value.map(|v| v.to_string()).unwrap_or_default();
        Self {
            action: format!("{PAGE}/{}", address.id),
            editing: true,
            recipient_name: address.recipient_name.clone(),
            phone_number: address.phone_number.clone(),
            name: address.name.clone().unwrap_or_default(),
            specific_address: address.specific_address.clone(),
            province_city: id(address.province_city),
            district: id(address.district),
            ward_commune: id(address.ward_commune),
            is_default: address.is_default,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "account/addresses.html")]
pub struct AddressesTemplate {
    pub ctx: PageContext,
    pub addresses: Vec<AddressView>,
    pub form: AddressFormView,
}

#[derive(Debug, Deserialize)]
pub struct AddressesQuery {
    pub edit: Option<String>,
}

/// Posted address form.
#[derive(Debug, Default, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub recipient_name: String,
    #[serde(default)]
    pub phone_number: String,
    pub name: Option<String>,
    #[serde(default)]
    pub specific_address: String,
    pub province_city: Option<String>,
    pub district: Option<String>,
    pub ward_commune: Option<String>,
    /// Checkbox: present when ticked.
    pub is_default: Option<String>,
}

impl AddressForm {
    /// Validated API body.
    ///
    /// # Errors
    ///
    /// Returns the message for the first missing field.
    pub fn input(&self) -> std::result::Result<AddressInput, &'static str> {
        let input = AddressInput {
            recipient_name: self.recipient_name.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            name: self
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            specific_address: self.specific_address.trim().to_string(),
            province_city: parse_opt(self.province_city.as_deref()).unwrap_or_default(),
            district: parse_opt(self.district.as_deref()).unwrap_or_default(),
            ward_commune: parse_opt(self.ward_commune.as_deref()).unwrap_or_default(),
            is_default: self.is_default.is_some(),
        };
        match input.missing_field() {
            Some(message) => Err(message),
            None => Ok(input),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(PAGE, get(index).post(create))
        .route("/account/delivery-address/{id}", post(update))
        .route("/account/delivery-address/{id}/delete", post(delete))
        .route("/account/delivery-address/{id}/default", post(set_default))
}

#[instrument(skip(auth))]
async fn index(
    RequireAuth(auth): RequireAuth,
    Query(query): Query<AddressesQuery>,
) -> Result<AddressesTemplate> {
    let addresses = auth
        .call(|t| backend::addresses::list(auth.api(), t))
        .await?
        .into_items();

    let editing: Option<AddressId> = parse_opt(query.edit.as_deref());
    let form = editing
        .and_then(|id| addresses.iter().find(|a| a.id == id))
        .map_or_else(AddressFormView::blank, AddressFormView::from);

    Ok(AddressesTemplate {
        ctx: PageContext::for_customer(&auth, PAGE).await,
        addresses: addresses.iter().map(AddressView::from).collect(),
        form,
    })
}

async fn invalid(auth: &CustomerSession, message: &str) -> Redirect {
    auth.flash(Flash::error(message)).await;
    Redirect::to(PAGE)
}

#[instrument(skip(auth, form))]
async fn create(RequireAuth(auth): RequireAuth, Form(form): Form<AddressForm>) -> Result<Redirect> {
    let input = match form.input() {
        Ok(input) => input,
        Err(message) => return Ok(invalid(&auth, message).await),
    };
    let result = auth
        .call(|t| backend::addresses::create(auth.api(), t, &input))
        .await;
    report(
        &auth,
        result,
        "Create new shipping info successfully!",
        "Failed to create new shipping info!",
    )
    .await?;
    Ok(Redirect::to(PAGE))
}

#[instrument(skip(auth, form))]
async fn update(
    RequireAuth(auth): RequireAuth,
    Path(id): Path<AddressId>,
    Form(form): Form<AddressForm>,
) -> Result<Redirect> {
    let input = match form.input() {
        Ok(input) => input,
        Err(message) => {
            auth.flash(Flash::error(message)).await;
            return Ok(Redirect::to(&format!("{PAGE}?edit={id}")));
        }
    };
    let result = auth
        .call(|t| backend::addresses::update(auth.api(), t, id, &input))
        .await;
    report(
        &auth,
        result,
        "Update shipping info successfully!",
        "Failed to update shipping info!",
    )
    .await?;
    Ok(Redirect::to(PAGE))
}

#[instrument(skip(auth))]
async fn delete(RequireAuth(auth): RequireAuth, Path(id): Path<AddressId>) -> Result<Redirect> {
    let result = auth
        .call(|t| backend::addresses::delete(auth.api(), t, id))
        .await;
    report(
        &auth,
        result,
        "Delete shipping info successfully!",
        "Failed to delete shipping info!",
    )
    .await?;
    Ok(Redirect::to(PAGE))
}

#[instrument(skip(auth))]
async fn set_default(
    RequireAuth(auth): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Redirect> {
    let result = auth
        .call(|t| backend::addresses::set_default(auth.api(), t, id))
        .await;
    report(
        &auth,
        result,
        "Set default shipping info successfully!",
        "Failed to set default shipping info!",
    )
    .await?;
    Ok(Redirect::to(PAGE))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled() -> AddressForm {
        AddressForm {
            recipient_name: " Mai Anh ".into(),
            phone_number: "0901234567".into(),
            name: Some("  ".into()),
            specific_address: "12 Ly Thuong Kiet".into(),
            province_city: Some("79".into()),
            district: Some("760".into()),
            ward_commune: Some("26734".into()),
            is_default: Some("on".into()),
        }
    }

    #[test]
    fn test_address_form_builds_input() {
        let input = filled().input().unwrap();
        assert_eq!(input.recipient_name, "Mai Anh");
        assert_eq!(input.name, None);
        assert_eq!(input.province_city, 79);
        assert!(input.is_default);
    }

    #[test]
    fn test_address_form_requires_location() {
        let form = AddressForm {
            ward_commune: Some(String::new()),
            ..filled()
        };
        assert_eq!(
            form.input().unwrap_err(),
            "Please choose a province, district and ward"
        );
        assert_eq!(
            AddressForm::default().input().unwrap_err(),
            "Please enter the recipient name"
        );
    }

    #[test]
    fn test_edit_form_targets_address() {
        let address: DeliveryAddress = serde_json::from_str(
            r#"{"id": 4, "recipient_name": "Mai", "phone_number": "0901",
                "specific_address": "12 Le Loi", "province_city": 79, "district": 760,
                "ward_commune": 26734, "is_default": true}"#,
        )
        .unwrap();
        let form = AddressFormView::from(&address);
        assert_eq!(form.action, "/account/delivery-address/4");
        assert_eq!(form.district, "760");
        assert!(form.editing);
    }
}
