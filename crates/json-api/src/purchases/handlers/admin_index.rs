//! List All Purchases Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::purchases::records::CustomerPurchaseRecord;

use crate::{
    extensions::*,
    purchases::{into_status_error, responses::PurchaseResponse},
    state::State,
};

/// Customer Purchase Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CustomerPurchaseResponse {
    pub customer_uuid: Uuid,

    pub username: String,

    pub email: String,

    pub purchase: PurchaseResponse,
}

impl From<CustomerPurchaseRecord> for CustomerPurchaseResponse {
    fn from(record: CustomerPurchaseRecord) -> Self {
        Self {
            customer_uuid: record.customer.uuid.into_uuid(),
            username: record.customer.username,
            email: record.customer.email,
            purchase: record.purchase.into(),
        }
    }
}

/// List All Purchases Handler
#[endpoint(
    tags("admin"),
    summary = "List All Purchases",
    responses(
        (status_code = StatusCode::OK, description = "Every purchase with its customer"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<Vec<CustomerPurchaseResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.admin_or_403()?;

    let purchases = state
        .app
        .purchases
        .list_all_purchases()
        .await
        .map_err(into_status_error)?;

    Ok(Json(
        purchases
            .into_iter()
            .map(CustomerPurchaseResponse::from)
            .collect(),
    ))
}
