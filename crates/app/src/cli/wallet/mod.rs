use clap::{Args, Subcommand};

mod top_up;

#[derive(Debug, Args)]
pub(crate) struct WalletCommand {
    #[command(subcommand)]
    command: WalletSubcommand,
}

#[derive(Debug, Subcommand)]
enum WalletSubcommand {
    /// Credit a user's e-wallet directly
    TopUp(top_up::TopUpArgs),
}

pub(crate) async fn run(command: WalletCommand) -> Result<(), String> {
    match command.command {
        WalletSubcommand::TopUp(args) => top_up::run(args).await,
    }
}
