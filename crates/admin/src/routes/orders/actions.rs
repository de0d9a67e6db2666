//! Order mutations. Each one redirects back with a toast.

use axum::{Form, extract::Path, response::Redirect};
use boutique_core::{CancelOrder, OrderId, OrderUpdate, ShippingInfoId, ShippingInfoInput};
use serde::Deserialize;
use tracing::instrument;

use crate::backend;
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::routes::report;

/// Cancel form input.
#[derive(Debug, Deserialize)]
pub struct CancelFormInput {
    pub reason: Option<String>,
}

/// Staff note form input.
#[derive(Debug, Deserialize)]
pub struct NoteFormInput {
    #[serde(default)]
    pub admin_note: String,
}

/// Shipping info edit form.
#[derive(Debug, Deserialize)]
pub struct ShippingInfoForm {
    pub id: ShippingInfoId,
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

impl ShippingInfoForm {
    pub(crate) fn input(self) -> (ShippingInfoId, ShippingInfoInput) {
        (
            self.id,
            ShippingInfoInput {
                user: None,
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

fn detail(id: OrderId) -> Redirect {
    Redirect::to(&format!("/orders/{id}"))
}

/// Move the order to its next status.
#[instrument(skip(auth))]
pub async fn process(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<OrderId>,
) -> Result<Redirect> {
    let result = auth
        .call(|t| backend::orders::process(auth.api(), t, id))
        .await;
    report(
        &auth,
        result,
        "Process order successfully",
        "Error processing order",
    )
    .await?;
    Ok(detail(id))
}

#[instrument(skip(auth, form))]
pub async fn cancel(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<OrderId>,
    Form(form): Form<CancelFormInput>,
) -> Result<Redirect> {
    let body = CancelOrder {
        reason: form.reason.filter(|r| !r.trim().is_empty()),
    };
    let result = auth
        .call(|t| backend::orders::cancel(auth.api(), t, id, &body))
        .await;
    report(
        &auth,
        result,
        "Cancel order successfully",
        "Error cancelling order",
    )
    .await?;
    Ok(detail(id))
}

#[instrument(skip(auth))]
pub async fn delete(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<OrderId>,
) -> Result<Redirect> {
    let result = auth
        .call(|t| backend::orders::delete(auth.api(), t, id))
        .await;
    let deleted = report(
        &auth,
        result,
        "Delete order successfully",
        "Error deleting order",
    )
    .await?;
    Ok(match deleted {
        Some(()) => Redirect::to("/orders"),
        None => detail(id),
    })
}

#[instrument(skip(auth, form))]
pub async fn update_note(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<OrderId>,
    Form(form): Form<NoteFormInput>,
) -> Result<Redirect> {
    let update = OrderUpdate {
        admin_note: Some(form.admin_note.trim().to_string()),
        ..OrderUpdate::default()
    };
    let result = auth
        .call(|t| backend::orders::update(auth.api(), t, id, &update))
        .await;
    report(&auth, result, "Order updated successfully", "Error updating order").await?;
    Ok(detail(id))
}

/// Edit the shipping record shown on the order.
#[instrument(skip(auth, form))]
pub async fn update_shipping_info(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<OrderId>,
    Form(form): Form<ShippingInfoForm>,
) -> Result<Redirect> {
    let (info_id, input) = form.input();
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
    Ok(detail(id))
}
