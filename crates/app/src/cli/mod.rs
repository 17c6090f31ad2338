use clap::{Parser, Subcommand};
use sqlx::PgPool;
use storefront_app::database;

mod db;
mod purchases;
mod refunds;
mod vouchers;
mod wallet;

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront admin CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Vouchers(vouchers::VouchersCommand),
    Refunds(refunds::RefundsCommand),
    Wallet(wallet::WalletCommand),
    Purchases(purchases::PurchasesCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Vouchers(command) => vouchers::run(command).await,
            Commands::Refunds(command) => refunds::run(command).await,
            Commands::Wallet(command) => wallet::run(command).await,
            Commands::Purchases(command) => purchases::run(command).await,
        }
    }
}

async fn connect(database_url: &str) -> Result<PgPool, String> {
    database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))
}
