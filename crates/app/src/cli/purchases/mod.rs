use clap::{Args, Subcommand};

mod receipt;

#[derive(Debug, Args)]
pub(crate) struct PurchasesCommand {
    #[command(subcommand)]
    command: PurchasesSubcommand,
}

#[derive(Debug, Subcommand)]
enum PurchasesSubcommand {
    /// Print a purchase receipt
    Receipt(receipt::ReceiptArgs),
}

pub(crate) async fn run(command: PurchasesCommand) -> Result<(), String> {
    match command.command {
        PurchasesSubcommand::Receipt(args) => receipt::run(args).await,
    }
}
