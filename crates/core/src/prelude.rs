//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allocation::{
        Allocation, AllocationError, AvailableBalances, Instrument, PaymentMethod, UsageRequest,
        allocate,
    },
    cards::{CardDetails, CardError, ValidatedCard},
    cart::{Cart, CartError, CartLine},
    money::{AmountError, currency, parse_amount, sgd, to_decimal_string},
    pricing::{OrderPricing, PricingError},
    receipt::{Receipt, ReceiptError},
    refunds::{RefundError, RefundStatus},
    vouchers::{
        DiscountKind, DiscountOutcome, VoucherDiscount, VoucherError, VoucherRejection,
        VoucherTerms, checkout_discount, compute_discount,
    },
    wallet::{PointsAccrual, PointsRejection, TopUpRejection, WalletError},
};
