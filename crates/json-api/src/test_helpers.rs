//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use storefront::{
    allocation::{Allocation, PaymentMethod, UsageRequest},
    cart::CartLine,
    money::sgd,
    pricing::OrderPricing,
    refunds::RefundStatus,
    vouchers::DiscountKind,
};
use storefront_app::{
    checkout::{MockCheckoutService, session::CheckoutSession, tasks::TaskFailures},
    context::AppContext,
    domain::{
        carts::MockCartsService,
        products::records::ProductUuid,
        purchases::{
            MockPurchasesService,
            records::{PurchaseLineRecord, PurchaseLineUuid, PurchaseRecord, PurchaseUuid},
        },
        refunds::{
            MockRefundsService,
            records::{RefundRequestRecord, RefundRequestUuid},
        },
        users::records::UserUuid,
        vouchers::{
            MockVouchersService,
            records::{ClaimStatus, VoucherClaimRecord, VoucherClaimUuid, VoucherRecord, VoucherUuid},
        },
        wallets::{MockWalletsService, records::WalletRecord},
    },
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    extensions::*,
    identity::{Identity, Role},
    state::State,
};

pub(crate) const TEST_USER: UserUuid = UserUuid::from_uuid(Uuid::nil());

/// Service mocks with no expectations; any unexpected call fails the test.
#[derive(Default)]
pub(crate) struct Mocks {
    pub(crate) carts: MockCartsService,
    pub(crate) wallets: MockWalletsService,
    pub(crate) vouchers: MockVouchersService,
    pub(crate) purchases: MockPurchasesService,
    pub(crate) refunds: MockRefundsService,
    pub(crate) checkout: MockCheckoutService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        let app = AppContext {
            carts: Arc::new(self.carts),
            wallets: Arc::new(self.wallets),
            vouchers: Arc::new(self.vouchers),
            purchases: Arc::new(self.purchases),
            refunds: Arc::new(self.refunds),
            checkout: Arc::new(self.checkout),
            task_failures: TaskFailures::default(),
        };

        State::from_app_context(app, CancellationToken::new())
    }
}

pub(crate) fn strict_state() -> Arc<State> {
    Mocks::default().into_state()
}

#[salvo::handler]
pub(crate) async fn inject_customer(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_identity(Identity {
        user: TEST_USER,
        role: Role::Customer,
    });

    ctrl.call_next(req, depot, res).await;
}

#[salvo::handler]
pub(crate) async fn inject_admin(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_identity(Identity {
        user: TEST_USER,
        role: Role::Admin,
    });

    ctrl.call_next(req, depot, res).await;
}

/// A service calling `route` as the test customer.
pub(crate) fn customer_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject_customer)
            .push(route),
    )
}

/// A service calling `route` as an admin.
pub(crate) fn admin_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject_admin)
            .push(route),
    )
}

pub(crate) fn make_wallet(e_wallet: i64, points: i64, store_credit: i64) -> WalletRecord {
    WalletRecord {
        user: TEST_USER,
        e_wallet_balance: e_wallet,
        points_balance: points,
        store_credit,
        auto_convert_points: false,
    }
}

/// A settled card purchase of two $25.00 items.
pub(crate) fn make_purchase(uuid: PurchaseUuid) -> PurchaseRecord {
    PurchaseRecord {
        uuid,
        user: TEST_USER,
        subtotal: 5_000,
        tax: 350,
        shipping: 500,
        voucher_discount: 0,
        store_credit_used: 0,
        e_wallet_used: 0,
        total: 5_850,
        payment_method: PaymentMethod::Card,
        payment_details: "Card **** 1111".to_string(),
        gateway_reference: format!("card:{uuid}"),
        voucher_claim: None,
        points_earned: 585,
        created_at: Timestamp::UNIX_EPOCH,
        lines: vec![PurchaseLineRecord {
            uuid: PurchaseLineUuid::new(),
            product: ProductUuid::new(),
            product_name: "Kopi Beans".to_string(),
            unit_price: 2_500,
            quantity: 2,
            line_total: 5_000,
        }],
    }
}

pub(crate) fn make_voucher(code: &str) -> VoucherRecord {
    VoucherRecord {
        uuid: VoucherUuid::new(),
        code: code.to_string(),
        description: "Ten percent off".to_string(),
        discount_kind: DiscountKind::Percent,
        discount_value: 1_000,
        min_spend: 3_000,
        starts_at: Timestamp::UNIX_EPOCH,
        ends_at: Timestamp::MAX,
        is_active: true,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_claim(code: &str) -> VoucherClaimRecord {
    VoucherClaimRecord {
        uuid: VoucherClaimUuid::new(),
        user: TEST_USER,
        voucher: make_voucher(code),
        status: ClaimStatus::Claimed,
        purchase: None,
        claimed_at: Timestamp::UNIX_EPOCH,
        used_at: None,
    }
}

pub(crate) fn make_refund(purchase: PurchaseUuid, status: RefundStatus) -> RefundRequestRecord {
    let decided = status != RefundStatus::Pending;

    RefundRequestRecord {
        uuid: RefundRequestUuid::new(),
        purchase,
        user: TEST_USER,
        reason: "arrived broken".to_string(),
        status,
        admin_notes: None,
        refund_amount: (status == RefundStatus::Approved).then_some(5_850),
        requested_at: Timestamp::UNIX_EPOCH,
        processed_at: decided.then_some(Timestamp::UNIX_EPOCH),
    }
}

/// A checkout of two $50.00 items with $30.00 of e-wallet applied.
pub(crate) fn make_session() -> CheckoutSession {
    let pricing = OrderPricing::from_parts(sgd(10_000), sgd(700), sgd(0), sgd(0));

    CheckoutSession::new(
        TEST_USER,
        vec![CartLine::new(Uuid::now_v7(), "French Press", sgd(5_000), 2)],
        pricing,
        UsageRequest {
            store_credit: None,
            e_wallet: Some(sgd(3_000)),
        },
        Allocation {
            store_credit_used: sgd(0),
            e_wallet_used: sgd(3_000),
            remaining_for_gateway: sgd(7_700),
        },
    )
}
