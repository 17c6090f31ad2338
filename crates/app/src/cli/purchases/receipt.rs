use std::io;

use clap::Args;
use storefront_app::{
    database::Db,
    domain::purchases::{PgPurchasesService, PurchasesService, records::PurchaseUuid},
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct ReceiptArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Purchase UUID
    #[arg(long)]
    purchase_uuid: Uuid,
}

pub(crate) async fn run(args: ReceiptArgs) -> Result<(), String> {
    let service =
        PgPurchasesService::new(Db::new(super::super::connect(&args.database_url).await?));

    let purchase = service
        .get_purchase(None, PurchaseUuid::from_uuid(args.purchase_uuid))
        .await
        .map_err(|error| format!("failed to load purchase: {error}"))?;

    println!("purchase_uuid: {}", purchase.uuid);
    println!("user_uuid: {}", purchase.user);
    println!("created_at: {}", purchase.created_at);
    println!("payment: {}", purchase.payment_details);
    println!();

    purchase
        .receipt()
        .and_then(|receipt| receipt.write_to(io::stdout().lock()))
        .map_err(|error| format!("failed to render receipt: {error}"))
}
