use clap::{Args, Subcommand};
use storefront::money::{sgd, to_decimal_string};
use storefront_app::domain::refunds::records::RefundRequestRecord;

mod approve;
mod list;
mod reject;

#[derive(Debug, Args)]
pub(crate) struct RefundsCommand {
    #[command(subcommand)]
    command: RefundsSubcommand,
}

#[derive(Debug, Subcommand)]
enum RefundsSubcommand {
    List(list::ListRefundsArgs),
    Approve(approve::ApproveRefundArgs),
    Reject(reject::RejectRefundArgs),
}

pub(crate) async fn run(command: RefundsCommand) -> Result<(), String> {
    match command.command {
        RefundsSubcommand::List(args) => list::run(args).await,
        RefundsSubcommand::Approve(args) => approve::run(args).await,
        RefundsSubcommand::Reject(args) => reject::run(args).await,
    }
}

fn print_request(request: &RefundRequestRecord) {
    println!("refund_uuid: {}", request.uuid);
    println!("purchase_uuid: {}", request.purchase);
    println!("user_uuid: {}", request.user);
    println!("status: {}", request.status);
    println!("reason: {}", request.reason);
    println!(
        "refund_amount: {}",
        request
            .refund_amount
            .map_or_else(|| "-".to_string(), |amount| to_decimal_string(&sgd(amount)))
    );
    println!("admin_notes: {}", request.admin_notes.as_deref().unwrap_or("-"));
    println!("requested_at: {}", request.requested_at);
    println!(
        "processed_at: {}",
        request
            .processed_at
            .map_or_else(|| "pending".to_string(), |value| value.to_string())
    );
}
