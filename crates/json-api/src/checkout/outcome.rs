//! Settlement outcomes.

use salvo::{http::StatusError, prelude::Json};
use tracing::info;

use storefront::allocation::PaymentMethod;
use storefront_app::checkout::{CheckoutError, settlement::Settlement};

use crate::{
    checkout::{into_status_error, responses::SettlementResponse},
    observability::{SettlementOutcome, observe_settlement},
};

/// Count the attempt and render it. A replayed settlement returns the existing purchase.
pub(crate) fn settlement_response(
    method: PaymentMethod,
    result: Result<Settlement, CheckoutError>,
) -> Result<Json<SettlementResponse>, StatusError> {
    match result {
        Ok(settlement) => {
            let outcome = if settlement.replayed {
                SettlementOutcome::Replayed
            } else {
                SettlementOutcome::Settled
            };

            observe_settlement(method, outcome);

            info!(
                purchase_uuid = %settlement.purchase.uuid,
                replayed = settlement.replayed,
                "checkout settled"
            );

            Ok(Json(settlement.into()))
        }
        Err(error) => {
            observe_settlement(method, SettlementOutcome::Failed);

            Err(into_status_error(error))
        }
    }
}
