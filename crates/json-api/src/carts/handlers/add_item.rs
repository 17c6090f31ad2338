//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::{carts::data::NewCartItem, products::records::ProductUuid};

use crate::{
    carts::{into_status_error, responses::CartItemResponse},
    extensions::*,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddCartItemRequest {
    pub product_uuid: Uuid,

    pub quantity: u32,
}

impl From<AddCartItemRequest> for NewCartItem {
    fn from(request: AddCartItemRequest) -> Self {
        NewCartItem {
            product: ProductUuid::from_uuid(request.product_uuid),
            quantity: request.quantity,
        }
    }
}

/// Add Cart Item Handler
///
/// Adding a product already in the cart increases its quantity.
#[endpoint(
    tags("cart"),
    summary = "Add Cart Item",
    responses(
        (status_code = StatusCode::OK, description = "Cart item"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartItemResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let item = state
        .app
        .carts
        .add_item(user, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(item.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use storefront_app::domain::carts::{
        CartsServiceError,
        records::{CartItemRecord, CartItemUuid},
    };

    use crate::test_helpers::{Mocks, TEST_USER, customer_service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        customer_service(mocks, Router::with_path("cart/items").post(handler))
    }

    #[tokio::test]
    async fn test_add_item_returns_priced_line() -> TestResult {
        let product = ProductUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_add_item()
            .once()
            .withf(move |user, item| {
                *user == TEST_USER
                    && *item
                        == NewCartItem {
                            product,
                            quantity: 3,
                        }
            })
            .return_once(move |user, item| {
                Ok(CartItemRecord {
                    uuid: CartItemUuid::new(),
                    user,
                    product: item.product,
                    product_name: "Enamel Mug".to_string(),
                    unit_price: 1_250,
                    quantity: item.quantity,
                    created_at: Timestamp::UNIX_EPOCH,
                    updated_at: Timestamp::UNIX_EPOCH,
                })
            });

        let mut res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "product_uuid": product.into_uuid(), "quantity": 3 }))
            .send(&make_service(mocks))
            .await;

        let body: CartItemResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.product_uuid, product.into_uuid());
        assert_eq!(body.line_total, "37.50");

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_quantity_returns_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_add_item()
            .once()
            .return_once(|_, _| Err(CartsServiceError::ZeroQuantity));

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "product_uuid": Uuid::now_v7(), "quantity": 0 }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_product_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_add_item()
            .once()
            .return_once(|_, _| Err(CartsServiceError::NotFound));

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "product_uuid": Uuid::now_v7(), "quantity": 1 }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
