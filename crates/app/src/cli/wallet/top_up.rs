use clap::Args;
use storefront::money::{parse_amount, sgd, to_decimal_string};
use storefront_app::{
    database::Db,
    domain::{
        users::records::UserUuid,
        wallets::{
            PgWalletsService, WalletsService, data::FundsMovement, records::WalletInstrument,
        },
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct TopUpArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// User whose e-wallet is credited
    #[arg(long)]
    user_uuid: Uuid,

    /// Amount to add, e.g. 50.00
    #[arg(long)]
    amount: String,

    /// Ledger description
    #[arg(long, default_value = "Admin top-up")]
    description: String,
}

pub(crate) async fn run(args: TopUpArgs) -> Result<(), String> {
    let amount =
        parse_amount(&args.amount).map_err(|error| format!("invalid --amount: {error}"))?;

    if !amount.is_positive() {
        return Err("--amount must be greater than zero".to_string());
    }

    let service = PgWalletsService::new(Db::new(super::super::connect(&args.database_url).await?));
    let user = UserUuid::from_uuid(args.user_uuid);

    let transaction = service
        .add_funds(
            user,
            FundsMovement {
                amount,
                instrument: WalletInstrument::EWallet,
                payment_method: Some("admin".to_string()),
                description: args.description,
                reference: format!("cli:{}", Uuid::now_v7()),
            },
        )
        .await
        .map_err(|error| format!("failed to top up wallet: {error}"))?;

    let wallet = service
        .get_wallet(user)
        .await
        .map_err(|error| format!("failed to read wallet: {error}"))?;

    println!("transaction_uuid: {}", transaction.uuid);
    println!("credited: {}", to_decimal_string(&amount));
    println!(
        "e_wallet_balance: {}",
        to_decimal_string(&sgd(wallet.e_wallet_balance))
    );

    Ok(())
}
