//! NETS QR Events Handler

use std::sync::Arc;

use futures::StreamExt;
use salvo::{
    oapi::extract::PathParam,
    prelude::*,
    sse::{self, SseEvent},
};
use tokio_stream::wrappers::ReceiverStream;

use storefront::allocation::PaymentMethod;
use storefront_app::checkout::qr::QrEvent;

use crate::{
    checkout::into_status_error,
    extensions::*,
    observability::{SettlementOutcome, observe_settlement},
    state::State,
};

fn event_name(event: &QrEvent) -> &'static str {
    match event {
        QrEvent::Heartbeat => "heartbeat",
        QrEvent::Success { .. } => "success",
        QrEvent::Fail { .. } => "fail",
    }
}

fn observe(event: &QrEvent) {
    match event {
        QrEvent::Success { .. } => {
            observe_settlement(PaymentMethod::NetsQr, SettlementOutcome::Settled);
        }
        QrEvent::Fail { .. } => {
            observe_settlement(PaymentMethod::NetsQr, SettlementOutcome::Failed);
        }
        QrEvent::Heartbeat => {}
    }
}

/// NETS QR Events Handler
///
/// Streams `heartbeat` events while the QR payment is pending, then a single `success` or
/// `fail` event before the stream closes. Settlement happens server side; the stream only
/// reports it. Closing the stream stops the watch.
#[endpoint(
    tags("checkout"),
    summary = "NETS QR Events",
    responses(
        (status_code = StatusCode::OK, description = "Server-sent events stream"),
        (status_code = StatusCode::NOT_FOUND, description = "No checkout in progress"),
        (status_code = StatusCode::CONFLICT, description = "QR code does not match the checkout"),
    ),
)]
pub(crate) async fn handler(
    txn_ref: PathParam<String>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let events = state
        .app
        .checkout
        .watch_qr(user, txn_ref.into_inner(), state.shutdown.child_token())
        .map_err(into_status_error)?;

    let stream = ReceiverStream::new(events).map(|event| {
        observe(&event);

        SseEvent::default().name(event_name(&event)).json(&event)
    });

    sse::stream(res, stream);

    Ok(())
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;
    use tokio::sync::mpsc;

    use storefront_app::{checkout::CheckoutError, domain::purchases::records::PurchaseUuid};

    use crate::test_helpers::{Mocks, TEST_USER, customer_service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        customer_service(
            mocks,
            Router::with_path("checkout/nets/qr/{txn_ref}/events").get(handler),
        )
    }

    #[tokio::test]
    async fn test_events_stream_until_settled() -> TestResult {
        let purchase = PurchaseUuid::new();
        let (tx, rx) = mpsc::channel(4);

        tx.send(QrEvent::Heartbeat).await?;
        tx.send(QrEvent::Success { purchase }).await?;
        drop(tx);

        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_watch_qr()
            .once()
            .withf(|user, txn_ref, _| *user == TEST_USER && txn_ref == "9cbc7b5a-ref")
            .return_once(move |_, _, _| Ok(rx));

        let mut res = TestClient::get("http://example.com/checkout/nets/qr/9cbc7b5a-ref/events")
            .send(&make_service(mocks))
            .await;

        let body = res.take_string().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.contains("event: heartbeat"), "body: {body}");
        assert!(body.contains("event: success"), "body: {body}");
        assert!(
            body.contains(&format!(r#""purchase":"{purchase}""#)),
            "body: {body}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_watch_without_checkout_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_watch_qr()
            .once()
            .return_once(|_, _, _| Err(CheckoutError::NoSession));

        let res = TestClient::get("http://example.com/checkout/nets/qr/unknown/events")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
