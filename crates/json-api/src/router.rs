//! App Router

use salvo::Router;

use crate::{carts, checkout, identity, purchases, refunds, vouchers, wallet};

pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(identity::middleware::handler)
        .push(cart_router())
        .push(checkout_router())
        .push(wallet_router())
        .push(vouchers_router())
        .push(purchases_router())
        .push(Router::with_path("refund-requests").get(refunds::index::handler))
        .push(admin_router())
}

fn cart_router() -> Router {
    Router::with_path("cart")
        .get(carts::get::handler)
        .delete(carts::clear::handler)
        .push(Router::with_path("items").post(carts::add_item::handler))
}

fn checkout_router() -> Router {
    Router::with_path("checkout")
        .post(checkout::begin::handler)
        .delete(checkout::abandon::handler)
        .push(
            Router::with_path("voucher")
                .post(checkout::apply_voucher::handler)
                .delete(checkout::clear_voucher::handler),
        )
        .push(Router::with_path("card").post(checkout::card::handler))
        .push(Router::with_path("internal").post(checkout::internal::handler))
        .push(
            Router::with_path("paypal/orders")
                .post(checkout::paypal_order::handler)
                .push(
                    Router::with_path("{order_id}/capture")
                        .post(checkout::paypal_capture::handler),
                ),
        )
        .push(
            Router::with_path("nets/qr")
                .post(checkout::nets_qr::handler)
                .push(Router::with_path("{txn_ref}/events").get(checkout::nets_events::handler)),
        )
}

fn wallet_router() -> Router {
    Router::with_path("wallet")
        .get(wallet::get::handler)
        .push(Router::with_path("transactions").get(wallet::transactions::handler))
        .push(
            Router::with_path("top-ups")
                .post(wallet::top_up::handler)
                .push(
                    Router::with_path("{top_up}")
                        .push(Router::with_path("confirm").post(wallet::confirm_top_up::handler))
                        .push(Router::with_path("fail").post(wallet::fail_top_up::handler)),
                ),
        )
        .push(Router::with_path("points/conversions").post(wallet::convert_points::handler))
        .push(Router::with_path("auto-convert").put(wallet::auto_convert::handler))
}

fn vouchers_router() -> Router {
    Router::with_path("vouchers")
        .get(vouchers::index::handler)
        .push(Router::with_path("claims").get(vouchers::claims::handler))
        .push(Router::with_path("{voucher}/claim").post(vouchers::claim::handler))
}

fn purchases_router() -> Router {
    Router::with_path("purchases")
        .get(purchases::index::handler)
        .push(
            Router::with_path("{purchase}")
                .get(purchases::get::handler)
                .push(Router::with_path("reorder").post(purchases::reorder::handler))
                .push(Router::with_path("refund-requests").post(refunds::create::handler)),
        )
}

fn admin_router() -> Router {
    Router::with_path("admin")
        .push(Router::with_path("purchases").get(purchases::admin_index::handler))
        .push(
            Router::with_path("vouchers")
                .get(vouchers::admin_index::handler)
                .post(vouchers::admin_create::handler)
                .push(
                    Router::with_path("{voucher}")
                        .put(vouchers::admin_update::handler)
                        .delete(vouchers::admin_delete::handler),
                ),
        )
        .push(
            Router::with_path("refund-requests")
                .get(refunds::admin_index::handler)
                .push(
                    Router::with_path("{request}")
                        .push(Router::with_path("approve").post(refunds::approve::handler))
                        .push(Router::with_path("reject").post(refunds::reject::handler)),
                ),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use serde_json::Value;
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, TEST_USER, make_wallet, strict_state};

    use super::*;

    #[tokio::test]
    async fn test_missing_identity_is_rejected() -> TestResult {
        let service = Service::new(Router::new().hoop(inject(strict_state())).push(app_router()));

        let res = TestClient::get("http://example.com/wallet")
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_identity_headers_reach_the_handler() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .wallets
            .expect_get_wallet()
            .once()
            .withf(|user| *user == TEST_USER)
            .return_once(|_| Ok(make_wallet(2_000, 150, 0)));

        let service = Service::new(
            Router::new()
                .hoop(inject(mocks.into_state()))
                .push(app_router()),
        );

        let mut res = TestClient::get("http://example.com/wallet")
            .add_header("x-user-uuid", TEST_USER.to_string(), true)
            .send(&service)
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body["e_wallet_balance"], "20.00");

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_routes_reject_customers() -> TestResult {
        let service = Service::new(Router::new().hoop(inject(strict_state())).push(app_router()));

        let res = TestClient::get("http://example.com/admin/refund-requests")
            .add_header("x-user-uuid", TEST_USER.to_string(), true)
            .add_header("x-user-role", "customer", true)
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
