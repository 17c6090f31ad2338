use clap::Args;
use storefront_app::{
    database::Db,
    domain::refunds::{PgRefundsService, RefundsService, records::RefundRequestUuid},
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct RejectRefundArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Refund request UUID
    #[arg(long)]
    refund_uuid: Uuid,

    /// Notes shown to the customer
    #[arg(long)]
    notes: Option<String>,
}

pub(crate) async fn run(args: RejectRefundArgs) -> Result<(), String> {
    let service = PgRefundsService::new(Db::new(super::super::connect(&args.database_url).await?));

    let request = service
        .reject(RefundRequestUuid::from_uuid(args.refund_uuid), args.notes)
        .await
        .map_err(|error| format!("failed to reject refund: {error}"))?;

    super::print_request(&request);

    Ok(())
}
