//! Reorder Purchase Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use storefront_app::domain::purchases::records::PurchaseUuid;

use crate::{
    carts::responses::CartItemResponse, extensions::*, purchases::into_status_error,
    state::State,
};

/// Reorder Purchase Handler
///
/// Adds the purchase's products back to the cart at current catalog prices. Products that are
/// no longer sold are skipped; the response lists the items that were added.
#[endpoint(
    tags("purchases"),
    summary = "Reorder Purchase",
    responses(
        (status_code = StatusCode::OK, description = "Items added to the cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Purchase not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    purchase: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<Vec<CartItemResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let items = state
        .app
        .purchases
        .reorder(user, PurchaseUuid::from_uuid(purchase.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(items.into_iter().map(CartItemResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::domain::{
        carts::records::{CartItemRecord, CartItemUuid},
        products::records::ProductUuid,
        purchases::PurchasesServiceError,
    };

    use crate::test_helpers::{Mocks, TEST_USER, customer_service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        customer_service(
            mocks,
            Router::with_path("purchases/{purchase}/reorder").post(handler),
        )
    }

    #[tokio::test]
    async fn test_reorder_returns_added_items() -> TestResult {
        let uuid = PurchaseUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .purchases
            .expect_reorder()
            .once()
            .withf(move |user, purchase| *user == TEST_USER && *purchase == uuid)
            .return_once(|user, _| {
                Ok(vec![CartItemRecord {
                    uuid: CartItemUuid::new(),
                    user,
                    product: ProductUuid::new(),
                    product_name: "Kopi Beans".to_string(),
                    unit_price: 2_800,
                    quantity: 2,
                    created_at: Timestamp::UNIX_EPOCH,
                    updated_at: Timestamp::UNIX_EPOCH,
                }])
            });

        let mut res = TestClient::post(format!("http://example.com/purchases/{uuid}/reorder"))
            .send(&make_service(mocks))
            .await;

        let body: Vec<CartItemResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].unit_price, "28.00");
        assert_eq!(body[0].line_total, "56.00");

        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_unknown_purchase_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .purchases
            .expect_reorder()
            .once()
            .return_once(|_, _| Err(PurchasesServiceError::NotFound));

        let res = TestClient::post(format!(
            "http://example.com/purchases/{}/reorder",
            Uuid::now_v7()
        ))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
