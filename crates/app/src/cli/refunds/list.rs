use clap::Args;
use storefront::refunds::RefundStatus;
use storefront_app::{
    database::Db,
    domain::refunds::{PgRefundsService, RefundsService},
};

#[derive(Debug, Args)]
pub(crate) struct ListRefundsArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Only show requests in this status (pending, approved, rejected)
    #[arg(long)]
    status: Option<RefundStatus>,
}

pub(crate) async fn run(args: ListRefundsArgs) -> Result<(), String> {
    let service = PgRefundsService::new(Db::new(super::super::connect(&args.database_url).await?));

    let requests = service
        .list(args.status)
        .await
        .map_err(|error| format!("failed to list refund requests: {error}"))?;

    if requests.is_empty() {
        println!("no refund requests found");
        return Ok(());
    }

    for request in &requests {
        super::print_request(request);
        println!();
    }

    Ok(())
}
