//! Purchase Data

use storefront::{
    allocation::PaymentMethod,
    money::AmountError,
    receipt::{Receipt, ReceiptError},
    wallet::points_earned,
};

use crate::domain::{
    products::records::ProductUuid, purchases::records::PurchaseUuid,
    users::records::UserUuid, vouchers::records::VoucherClaimUuid,
};

/// A purchase about to be settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPurchase {
    pub uuid: PurchaseUuid,
    pub user: UserUuid,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping: i64,
    pub voucher_discount: i64,
    pub store_credit_used: i64,
    pub e_wallet_used: i64,
    pub total: i64,
    pub payment_method: PaymentMethod,
    pub payment_details: String,
    pub gateway_reference: String,
    pub voucher_claim: Option<VoucherClaimUuid>,
    pub points_earned: i64,
    pub lines: Vec<NewPurchaseLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPurchaseLine {
    pub product: ProductUuid,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: u32,
    pub line_total: i64,
}

impl NewPurchase {
    /// Build a purchase from a balanced receipt.
    ///
    /// Points are earned on the amount charged to the gateway.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a total cannot be computed.
    pub fn from_receipt(
        user: UserUuid,
        receipt: &Receipt<'_>,
        payment_details: String,
        gateway_reference: String,
        voucher_claim: Option<VoucherClaimUuid>,
    ) -> Result<Self, ReceiptError> {
        let pricing = receipt.pricing();
        let allocation = receipt.allocation();
        let total = receipt.total()?;

        let lines = receipt
            .lines()
            .iter()
            .map(|line| {
                Ok(NewPurchaseLine {
                    product: ProductUuid::from_uuid(line.product_id),
                    product_name: line.name.clone(),
                    unit_price: line.unit_price.to_minor_units(),
                    quantity: line.quantity,
                    line_total: line.line_total()?.to_minor_units(),
                })
            })
            .collect::<Result<Vec<_>, ReceiptError>>()?;

        Ok(Self {
            uuid: PurchaseUuid::new(),
            user,
            subtotal: pricing.subtotal().to_minor_units(),
            tax: pricing.tax().to_minor_units(),
            shipping: pricing.shipping().to_minor_units(),
            voucher_discount: pricing.voucher_discount().to_minor_units(),
            store_credit_used: allocation.store_credit_used.to_minor_units(),
            e_wallet_used: allocation.e_wallet_used.to_minor_units(),
            total: total.to_minor_units(),
            payment_method: receipt.payment_method(),
            payment_details,
            gateway_reference,
            voucher_claim,
            points_earned: points_earned(&total),
            lines,
        })
    }

    /// Sum of line totals.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the sum overflows.
    pub fn lines_total(&self) -> Result<i64, AmountError> {
        self.lines.iter().try_fold(0_i64, |acc, line| {
            acc.checked_add(line.line_total)
                .ok_or(AmountError::Overflow)
        })
    }
}

#[cfg(test)]
mod tests {
    use storefront::{
        allocation::{AvailableBalances, UsageRequest, allocate},
        cart::CartLine,
        money::sgd,
        pricing::OrderPricing,
    };
    use testresult::TestResult;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn purchase_from_receipt_carries_totals_and_points() -> TestResult {
        let pricing = OrderPricing::for_subtotal(sgd(10_000))?.with_voucher_discount(sgd(1_070));

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

        let receipt = Receipt::new(
            [
                CartLine::new(Uuid::now_v7(), "Kopi Beans", sgd(2_500), 2),
                CartLine::new(Uuid::now_v7(), "French Press", sgd(5_000), 1),
            ],
            pricing,
            allocation,
            PaymentMethod::PayPal,
        )?;

        let purchase = NewPurchase::from_receipt(
            UserUuid::new(),
            &receipt,
            "E-wallet -$50.00".to_string(),
            "paypal:ORDER-1".to_string(),
            None,
        )?;

        assert_eq!(purchase.total, 4_630);
        assert_eq!(purchase.points_earned, 463);
        assert_eq!(purchase.e_wallet_used, 5_000);
        assert_eq!(purchase.lines_total()?, purchase.subtotal);
        assert_eq!(purchase.payment_method, PaymentMethod::PayPal);

        Ok(())
    }
}
