use std::{fs, path::PathBuf};

use clap::Args;
use storefront_app::{
    database::Db,
    domain::vouchers::{
        PgVouchersService, VouchersService, VouchersServiceError, data::VoucherDraft,
        records::VoucherUuid,
    },
};

#[derive(Debug, Args)]
pub(crate) struct ImportVouchersArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// YAML file holding a list of vouchers
    #[arg(long)]
    file: PathBuf,
}

pub(crate) async fn run(args: ImportVouchersArgs) -> Result<(), String> {
    let contents = fs::read_to_string(&args.file)
        .map_err(|error| format!("failed to read {}: {error}", args.file.display()))?;

    let drafts = parse_drafts(&contents)?;

    let service = PgVouchersService::new(Db::new(super::super::connect(&args.database_url).await?));

    let mut created = 0_usize;

    for draft in drafts {
        let code = draft.code.clone();

        match service.create_voucher(VoucherUuid::new(), draft).await {
            Ok(voucher) => {
                created += 1;
                println!("created {} ({})", voucher.code, voucher.uuid);
            }
            Err(VouchersServiceError::AlreadyExists) => {
                println!("skipped {code}: code already exists");
            }
            Err(error) => return Err(format!("failed to create voucher {code}: {error}")),
        }
    }

    println!("{created} voucher(s) imported");

    Ok(())
}

/// Every draft is validated before anything is written.
fn parse_drafts(contents: &str) -> Result<Vec<VoucherDraft>, String> {
    let drafts: Vec<VoucherDraft> = serde_norway::from_str(contents)
        .map_err(|error| format!("failed to parse vouchers: {error}"))?;

    for draft in &drafts {
        draft
            .validate()
            .map_err(|error| format!("voucher {}: {error}", draft.code))?;
    }

    Ok(drafts)
}

#[cfg(test)]
mod tests {
    use storefront::vouchers::DiscountKind;

    use super::*;

    #[test]
    fn parses_a_list_of_vouchers() -> Result<(), String> {
        let drafts = parse_drafts(
            r#"
- code: WELCOME10
  description: Ten percent off your first order
  discount_kind: percent
  discount_value: 1000
  starts_at: "2026-01-01T00:00:00Z"
  ends_at: "2026-12-31T23:59:59Z"
- code: FIVEOFF
  discount_kind: amount
  discount_value: 500
  min_spend: 3000
  starts_at: "2026-01-01T00:00:00Z"
  ends_at: "2026-06-30T00:00:00Z"
"#,
        )?;

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].discount_kind, DiscountKind::Percent);
        assert_eq!(drafts[1].min_spend, 3_000);
        assert!(drafts[0].description.starts_with("Ten percent"));

        Ok(())
    }

    #[test]
    fn invalid_voucher_fails_the_whole_file() {
        let result = parse_drafts(
            r#"
- code: ""
  discount_kind: amount
  discount_value: 500
  starts_at: "2026-01-01T00:00:00Z"
  ends_at: "2026-06-30T00:00:00Z"
"#,
        );

        assert!(result.is_err(), "expected validation error, got {result:?}");
    }
}
