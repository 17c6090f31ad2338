//! End-to-end pricing scenarios through the public API.

use jiff::{Timestamp, ToSpan};
use rust_decimal::Decimal;
use rusty_money::iso::SGD;
use testresult::TestResult;
use uuid::Uuid;

use storefront::{
    prelude::*,
    wallet::{accrue_points, credit_for_points, points_earned},
};

fn voucher(discount: VoucherDiscount<'static>) -> VoucherTerms<'static> {
    let now = Timestamp::now();

    VoucherTerms {
        code: "WELCOME".to_string(),
        discount,
        min_spend: sgd(0),
        starts_at: now - 1.hour(),
        ends_at: now + 1.hour(),
        is_active: true,
    }
}

#[test]
fn percent_voucher_with_partial_e_wallet() -> TestResult {
    let cart = Cart::with_lines(
        [
            CartLine::new(Uuid::now_v7(), "Kopi Beans", sgd(2_500), 2),
            CartLine::new(Uuid::now_v7(), "French Press", sgd(5_000), 1),
        ],
        SGD,
    )?;

    let pricing = OrderPricing::for_cart(&cart)?;

    assert_eq!(pricing.pre_discount_total()?, sgd(10_700));

    let ten_percent = VoucherDiscount::Percent(Decimal::new(10, 2).into());
    let discount = checkout_discount(
        &voucher(ten_percent),
        pricing.pre_discount_total()?,
        Timestamp::now(),
    )?;

    assert_eq!(discount, sgd(1_070));

    let pricing = pricing.with_voucher_discount(discount);

    let allocation = allocate(
        pricing.base_total()?,
        &UsageRequest {
            store_credit: None,
            e_wallet: Some(sgd(5_000)),
        },
        &AvailableBalances {
            store_credit: sgd(0),
            e_wallet: sgd(8_000),
        },
    )?;

    assert_eq!(allocation.e_wallet_used, sgd(5_000));
    assert_eq!(allocation.remaining_for_gateway, sgd(4_630));

    let receipt = Receipt::new(cart.into_lines(), pricing, allocation, PaymentMethod::PayPal)?;

    assert_eq!(receipt.total()?, sgd(4_630));
    assert_eq!(points_earned(&receipt.total()?), 463);

    Ok(())
}

#[test]
fn flat_voucher_covering_whole_order_is_rejected() -> TestResult {
    let pricing = OrderPricing::for_subtotal(sgd(2_000))?;

    assert_eq!(pricing.tax(), sgd(140));
    assert_eq!(pricing.shipping(), sgd(500));

    let amount = pricing.pre_discount_total()?;

    assert_eq!(amount, sgd(2_640));

    let flat = voucher(VoucherDiscount::Amount(sgd(3_000)));

    let outcome = compute_discount(Some(&flat), amount, Timestamp::now())?;

    assert_eq!(outcome.discount, sgd(2_640));

    assert_eq!(
        checkout_discount(&flat, amount, Timestamp::now()),
        Err(VoucherError::Rejected(VoucherRejection::CoversWholeOrder))
    );

    Ok(())
}

#[test]
fn auto_conversion_after_earning_points() -> TestResult {
    let accrual = accrue_points(250, 120, true, SGD)?;

    assert_eq!(accrual.converted, 300);
    assert_eq!(accrual.credit, sgd(300));
    assert_eq!(accrual.balance, 70);

    let existing_credit = sgd(1_250);

    assert_eq!(existing_credit.add(accrual.credit)?, sgd(1_550));

    Ok(())
}

#[test]
fn converting_non_multiple_fails_regardless_of_balance() {
    let result = credit_for_points(150, 10_000, SGD);

    assert_eq!(
        result,
        Err(WalletError::InsufficientPoints(
            PointsRejection::NotMultipleOfConversionUnit
        ))
    );
}

#[test]
fn applying_then_clearing_voucher_restores_total() -> TestResult {
    let pricing = OrderPricing::for_subtotal(sgd(4_200))?;
    let before = pricing.base_total()?;

    let discount = checkout_discount(
        &voucher(VoucherDiscount::Amount(sgd(500))),
        pricing.pre_discount_total()?,
        Timestamp::now(),
    )?;

    let applied = pricing.with_voucher_discount(discount);

    assert_eq!(applied.base_total()?, before.sub(sgd(500))?);
    assert_eq!(applied.without_voucher().base_total()?, before);

    Ok(())
}
