//! Vouchers service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;
use uuid::Uuid;

use crate::{
    database::Db,
    domain::{
        users::records::UserUuid,
        vouchers::{
            data::VoucherDraft,
            errors::VouchersServiceError,
            records::{
                ClaimStatus, ClaimableVoucherRecord, VoucherClaimRecord, VoucherClaimUuid,
                VoucherRecord, VoucherUuid,
            },
            repository::PgVouchersRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgVouchersService {
    db: Db,
    repository: PgVouchersRepository,
}

impl PgVouchersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgVouchersRepository::new(),
        }
    }
}

#[async_trait]
impl VouchersService for PgVouchersService {
    async fn list_vouchers(&self) -> Result<Vec<VoucherRecord>, VouchersServiceError> {
        let mut tx = self.db.begin().await?;

        let vouchers = self.repository.list_vouchers(&mut tx).await?;

        tx.commit().await?;

        Ok(vouchers)
    }

    #[tracing::instrument(
        name = "vouchers.service.create_voucher",
        skip(self, draft),
        fields(voucher_uuid = %voucher, code = %draft.code),
        err
    )]
    async fn create_voucher(
        &self,
        voucher: VoucherUuid,
        draft: VoucherDraft,
    ) -> Result<VoucherRecord, VouchersServiceError> {
        draft.validate()?;

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_voucher(&mut tx, voucher, &draft)
            .await?;

        tx.commit().await?;

        info!(code = %created.code, "created voucher");

        Ok(created)
    }

    #[tracing::instrument(
        name = "vouchers.service.update_voucher",
        skip(self, draft),
        fields(voucher_uuid = %voucher),
        err
    )]
    async fn update_voucher(
        &self,
        voucher: VoucherUuid,
        draft: VoucherDraft,
    ) -> Result<VoucherRecord, VouchersServiceError> {
        draft.validate()?;

        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_voucher(&mut tx, voucher, &draft)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    #[tracing::instrument(name = "vouchers.service.delete_voucher", skip(self), fields(voucher_uuid = %voucher), err)]
    async fn delete_voucher(&self, voucher: VoucherUuid) -> Result<(), VouchersServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_voucher(&mut tx, voucher).await?;

        if rows_affected == 0 {
            return Err(VouchersServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn list_claimable(
        &self,
        user: UserUuid,
        now: Timestamp,
    ) -> Result<Vec<ClaimableVoucherRecord>, VouchersServiceError> {
        let mut tx = self.db.begin().await?;

        let vouchers = self.repository.list_claimable(&mut tx, user, now).await?;

        tx.commit().await?;

        Ok(vouchers)
    }

    #[tracing::instrument(
        name = "vouchers.service.claim",
        skip(self),
        fields(user_uuid = %user, voucher_uuid = %voucher),
        err
    )]
    async fn claim(
        &self,
        user: UserUuid,
        voucher: VoucherUuid,
        now: Timestamp,
    ) -> Result<VoucherClaimRecord, VouchersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.get_voucher(&mut tx, voucher).await?;

        if !record.is_claimable_at(now) {
            return Err(VouchersServiceError::NotClaimable);
        }

        let claim = match self.repository.create_claim(&mut tx, user, voucher).await {
            Ok(claim) => claim,
            Err(error) => match VouchersServiceError::from(error) {
                VouchersServiceError::AlreadyExists => {
                    return Err(VouchersServiceError::AlreadyClaimed);
                }
                other => return Err(other),
            },
        };

        tx.commit().await?;

        info!(claim_uuid = %claim.uuid, "claimed voucher");

        Ok(claim)
    }

    async fn list_claims(
        &self,
        user: UserUuid,
    ) -> Result<Vec<VoucherClaimRecord>, VouchersServiceError> {
        let mut tx = self.db.begin().await?;

        let claims = self.repository.list_claims(&mut tx, user).await?;

        tx.commit().await?;

        Ok(claims)
    }

    async fn find_claim_by_code(
        &self,
        user: UserUuid,
        code: String,
    ) -> Result<VoucherClaimRecord, VouchersServiceError> {
        let mut tx = self.db.begin().await?;

        let claim = self
            .repository
            .find_claim_by_code(&mut tx, user, &code)
            .await?;

        tx.commit().await?;

        if claim.status == ClaimStatus::Used {
            return Err(VouchersServiceError::AlreadyUsed);
        }

        Ok(claim)
    }

    #[tracing::instrument(
        name = "vouchers.service.mark_used",
        skip(self),
        fields(claim_uuid = %claim, purchase_uuid = %purchase),
        err
    )]
    async fn mark_used(
        &self,
        claim: VoucherClaimUuid,
        purchase: Uuid,
    ) -> Result<bool, VouchersServiceError> {
        let mut tx = self.db.begin().await?;

        let consumed = self
            .repository
            .mark_claim_used(&mut tx, claim, purchase)
            .await?;

        tx.commit().await?;

        Ok(consumed)
    }
}

#[automock]
#[async_trait]
pub trait VouchersService: Send + Sync {
    /// All vouchers, newest first.
    async fn list_vouchers(&self) -> Result<Vec<VoucherRecord>, VouchersServiceError>;

    /// Create a voucher.
    async fn create_voucher(
        &self,
        voucher: VoucherUuid,
        draft: VoucherDraft,
    ) -> Result<VoucherRecord, VouchersServiceError>;

    /// Replace a voucher's terms.
    async fn update_voucher(
        &self,
        voucher: VoucherUuid,
        draft: VoucherDraft,
    ) -> Result<VoucherRecord, VouchersServiceError>;

    /// Delete a voucher and its claims.
    async fn delete_voucher(&self, voucher: VoucherUuid) -> Result<(), VouchersServiceError>;

    /// Vouchers active at `now`, flagged with whether the user holds each.
    async fn list_claimable(
        &self,
        user: UserUuid,
        now: Timestamp,
    ) -> Result<Vec<ClaimableVoucherRecord>, VouchersServiceError>;

    /// Claim a voucher. Each user may claim a voucher once.
    async fn claim(
        &self,
        user: UserUuid,
        voucher: VoucherUuid,
        now: Timestamp,
    ) -> Result<VoucherClaimRecord, VouchersServiceError>;

    /// The user's claims, newest first.
    async fn list_claims(
        &self,
        user: UserUuid,
    ) -> Result<Vec<VoucherClaimRecord>, VouchersServiceError>;

    /// Find an unused claim by voucher code.
    async fn find_claim_by_code(
        &self,
        user: UserUuid,
        code: String,
    ) -> Result<VoucherClaimRecord, VouchersServiceError>;

    /// Consume a claim for a purchase. Returns false if it was already consumed.
    async fn mark_used(
        &self,
        claim: VoucherClaimUuid,
        purchase: Uuid,
    ) -> Result<bool, VouchersServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use storefront::vouchers::DiscountKind;
    use testresult::TestResult;

    use crate::test::{TestContext, helpers::create_user};

    use super::*;

    fn draft(code: &str) -> VoucherDraft {
        let now = Timestamp::now();

        VoucherDraft {
            code: code.to_string(),
            description: "Ten dollars off".to_string(),
            discount_kind: DiscountKind::Amount,
            discount_value: 1_000,
            min_spend: 3_000,
            starts_at: now - 1.hour(),
            ends_at: now + 1.day(),
            is_active: true,
        }
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn claiming_twice_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "alice").await?;

        let voucher = ctx
            .vouchers
            .create_voucher(VoucherUuid::new(), draft("save10"))
            .await?;

        assert_eq!(voucher.code, "SAVE10");

        ctx.vouchers
            .claim(user, voucher.uuid, Timestamp::now())
            .await?;

        let again = ctx
            .vouchers
            .claim(user, voucher.uuid, Timestamp::now())
            .await;

        assert!(
            matches!(again, Err(VouchersServiceError::AlreadyClaimed)),
            "expected AlreadyClaimed, got {again:?}"
        );

        let claimable = ctx.vouchers.list_claimable(user, Timestamp::now()).await?;

        assert_eq!(claimable.len(), 1);
        assert!(claimable.iter().all(|offer| offer.claimed));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn used_claim_cannot_be_applied_again() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "bob").await?;

        let voucher = ctx
            .vouchers
            .create_voucher(VoucherUuid::new(), draft("ONCE"))
            .await?;

        let claim = ctx
            .vouchers
            .claim(user, voucher.uuid, Timestamp::now())
            .await?;

        let found = ctx
            .vouchers
            .find_claim_by_code(user, "once".to_string())
            .await?;

        assert_eq!(found.uuid, claim.uuid);

        let purchase = crate::test::helpers::settled_purchase(&ctx, user).await?;

        assert!(ctx.vouchers.mark_used(claim.uuid, purchase).await?);
        assert!(!ctx.vouchers.mark_used(claim.uuid, purchase).await?);

        let result = ctx
            .vouchers
            .find_claim_by_code(user, "ONCE".to_string())
            .await;

        assert!(
            matches!(result, Err(VouchersServiceError::AlreadyUsed)),
            "expected AlreadyUsed, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn expired_voucher_cannot_be_claimed() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "carol").await?;

        let voucher = ctx
            .vouchers
            .create_voucher(VoucherUuid::new(), draft("LATE"))
            .await?;

        let result = ctx
            .vouchers
            .claim(user, voucher.uuid, Timestamp::now() + 2.days())
            .await;

        assert!(
            matches!(result, Err(VouchersServiceError::NotClaimable)),
            "expected NotClaimable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn duplicate_codes_are_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.vouchers
            .create_voucher(VoucherUuid::new(), draft("DUP"))
            .await?;

        let result = ctx
            .vouchers
            .create_voucher(VoucherUuid::new(), draft("dup"))
            .await;

        assert!(
            matches!(result, Err(VouchersServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }
}
