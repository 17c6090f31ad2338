//! Voucher Responses

use std::string::ToString;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::vouchers::records::{
    ClaimableVoucherRecord, VoucherClaimRecord, VoucherRecord,
};

use crate::amounts;

/// Voucher Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VoucherResponse {
    pub uuid: Uuid,

    pub code: String,

    pub description: String,

    /// `amount` or `percent`
    pub discount_kind: String,

    /// Decimal amount off, or percentage off
    pub discount_value: String,

    pub min_spend: String,

    pub starts_at: String,

    pub ends_at: String,

    pub is_active: bool,
}

impl From<VoucherRecord> for VoucherResponse {
    fn from(voucher: VoucherRecord) -> Self {
        Self {
            uuid: voucher.uuid.into_uuid(),
            code: voucher.code,
            description: voucher.description,
            discount_kind: voucher.discount_kind.as_str().to_string(),
            // Basis points render like minor units: 1250 is "12.50" percent.
            discount_value: amounts::format(voucher.discount_value),
            min_spend: amounts::format(voucher.min_spend),
            starts_at: voucher.starts_at.to_string(),
            ends_at: voucher.ends_at.to_string(),
            is_active: voucher.is_active,
        }
    }
}

/// Claimable Voucher Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ClaimableVoucherResponse {
    #[serde(flatten)]
    pub voucher: VoucherResponse,

    /// Whether the caller already holds this voucher
    pub claimed: bool,
}

impl From<ClaimableVoucherRecord> for ClaimableVoucherResponse {
    fn from(record: ClaimableVoucherRecord) -> Self {
        Self {
            voucher: record.voucher.into(),
            claimed: record.claimed,
        }
    }
}

/// Voucher Claim Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VoucherClaimResponse {
    pub uuid: Uuid,

    pub voucher: VoucherResponse,

    /// `claimed` or `used`
    pub status: String,

    /// The purchase the voucher was used on
    pub purchase_uuid: Option<Uuid>,

    pub claimed_at: String,

    pub used_at: Option<String>,
}

impl From<VoucherClaimRecord> for VoucherClaimResponse {
    fn from(claim: VoucherClaimRecord) -> Self {
        Self {
            uuid: claim.uuid.into_uuid(),
            voucher: claim.voucher.into(),
            status: claim.status.as_str().to_string(),
            purchase_uuid: claim.purchase,
            claimed_at: claim.claimed_at.to_string(),
            used_at: claim.used_at.as_ref().map(ToString::to_string),
        }
    }
}
