//! Set Auto-Convert Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    state::State,
    wallet::{into_status_error, responses::WalletResponse},
};

/// Auto-Convert Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AutoConvertRequest {
    pub enabled: bool,
}

/// Set Auto-Convert Handler
#[endpoint(
    tags("wallet"),
    summary = "Set Auto-Convert",
    responses(
        (status_code = StatusCode::OK, description = "Updated wallet"),
        (status_code = StatusCode::NOT_FOUND, description = "Wallet not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<AutoConvertRequest>,
    depot: &mut Depot,
) -> Result<Json<WalletResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let wallet = state
        .app
        .wallets
        .set_auto_convert(user, json.into_inner().enabled)
        .await
        .map_err(into_status_error)?;

    Ok(Json(wallet.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, TEST_USER, customer_service, make_wallet};

    use super::*;

    #[tokio::test]
    async fn test_enable_auto_convert() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .wallets
            .expect_set_auto_convert()
            .once()
            .withf(|user, enabled| *user == TEST_USER && *enabled)
            .return_once(|_, enabled| {
                let mut wallet = make_wallet(0, 0, 0);
                wallet.auto_convert_points = enabled;

                Ok(wallet)
            });

        let mut res = TestClient::put("http://example.com/wallet/auto-convert")
            .json(&json!({ "enabled": true }))
            .send(&customer_service(
                mocks,
                Router::with_path("wallet/auto-convert").put(handler),
            ))
            .await;

        let body: WalletResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.auto_convert_points);

        Ok(())
    }
}
