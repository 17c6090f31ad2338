use clap::{Args, Subcommand};

mod import;

#[derive(Debug, Args)]
pub(crate) struct VouchersCommand {
    #[command(subcommand)]
    command: VouchersSubcommand,
}

#[derive(Debug, Subcommand)]
enum VouchersSubcommand {
    Import(import::ImportVouchersArgs),
}

pub(crate) async fn run(command: VouchersCommand) -> Result<(), String> {
    match command.command {
        VouchersSubcommand::Import(args) => import::run(args).await,
    }
}
