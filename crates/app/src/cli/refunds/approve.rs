use clap::Args;
use storefront::money::parse_amount;
use storefront_app::{
    database::Db,
    domain::refunds::{
        PgRefundsService, RefundsService,
        data::RefundDecision,
        records::RefundRequestUuid,
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct ApproveRefundArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Refund request UUID
    #[arg(long)]
    refund_uuid: Uuid,

    /// Amount credited to the customer's store credit, e.g. 12.50
    #[arg(long)]
    amount: String,

    /// Notes shown to the customer
    #[arg(long)]
    notes: Option<String>,
}

pub(crate) async fn run(args: ApproveRefundArgs) -> Result<(), String> {
    let amount =
        parse_amount(&args.amount).map_err(|error| format!("invalid --amount: {error}"))?;

    let service = PgRefundsService::new(Db::new(super::super::connect(&args.database_url).await?));

    let request = service
        .approve(
            RefundRequestUuid::from_uuid(args.refund_uuid),
            RefundDecision {
                admin_notes: args.notes,
                amount,
            },
        )
        .await
        .map_err(|error| format!("failed to approve refund: {error}"))?;

    super::print_request(&request);

    Ok(())
}
