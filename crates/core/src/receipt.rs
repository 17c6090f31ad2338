//! Receipt

use std::{fmt::Write, io};

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    allocation::{Allocation, PaymentMethod},
    cart::{CartError, CartLine},
    money::{AmountError, non_negative},
    pricing::{OrderPricing, PricingError},
};

/// Errors that can occur when building or printing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Pricing components could not be combined.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// A line total could not be calculated.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Line totals do not add up to the subtotal.
    #[error("line totals sum to {lines} but subtotal is {subtotal}")]
    Unbalanced {
        /// Sum of line totals (minor units)
        lines: i64,

        /// Recorded subtotal (minor units)
        subtotal: i64,
    },

    /// IO error
    #[error("IO error")]
    IO,
}

impl From<AmountError> for ReceiptError {
    fn from(error: AmountError) -> Self {
        Self::Pricing(PricingError::Amount(error))
    }
}

/// A settled order: lines, pricing and how it was funded.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: SmallVec<[CartLine<'a>; 8]>,
    pricing: OrderPricing<'a>,
    allocation: Allocation<'a>,
    payment_method: PaymentMethod,
}

impl<'a> Receipt<'a> {
    /// Create a receipt, checking that line totals add up to the subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Unbalanced`] if the lines do not sum to the priced subtotal.
    pub fn new(
        lines: impl IntoIterator<Item = CartLine<'a>>,
        pricing: OrderPricing<'a>,
        allocation: Allocation<'a>,
        payment_method: PaymentMethod,
    ) -> Result<Self, ReceiptError> {
        let lines: SmallVec<[CartLine<'a>; 8]> = lines.into_iter().collect();

        let mut lines_minor = 0_i64;

        for line in &lines {
            lines_minor = lines_minor
                .checked_add(line.line_total()?.to_minor_units())
                .ok_or(AmountError::Overflow)?;
        }

        let subtotal_minor = pricing.subtotal().to_minor_units();

        if lines.is_empty() || lines_minor != subtotal_minor {
            return Err(ReceiptError::Unbalanced {
                lines: lines_minor,
                subtotal: subtotal_minor,
            });
        }

        Ok(Self {
            lines,
            pricing,
            allocation,
            payment_method: allocation.effective_method(payment_method),
        })
    }

    /// Purchased lines.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Pricing breakdown.
    pub fn pricing(&self) -> &OrderPricing<'a> {
        &self.pricing
    }

    /// Instrument split.
    pub fn allocation(&self) -> &Allocation<'a> {
        &self.allocation
    }

    /// Payment method recorded for the purchase.
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Amount charged to the external gateway: subtotal, tax and shipping less the voucher
    /// discount, store credit and e-wallet, never negative.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the arithmetic fails.
    pub fn total(&self) -> Result<Money<'a, Currency>, ReceiptError> {
        let total = self
            .pricing
            .base_total()?
            .sub(self.allocation.store_credit_used)?
            .sub(self.allocation.e_wallet_used)?;

        Ok(non_negative(total))
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Unit Price", "Qty", "Line Total"]);

        for (idx, line) in self.lines.iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.name.clone(),
                format!("{}", line.unit_price),
                line.quantity.to_string(),
                format!("{}", line.line_total()?),
            ]);
        }

        write_receipt_table(&mut out, builder)?;
        write_receipt_summary(&mut out, self)
    }
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &Receipt<'_>,
) -> Result<(), ReceiptError> {
    let pricing = receipt.pricing();
    let allocation = receipt.allocation();

    let mut rows: SmallVec<[(&str, String); 8]> = SmallVec::new();

    rows.push((" Subtotal:", format!("{}  ", pricing.subtotal())));
    rows.push((" Tax:", format!("{}  ", pricing.tax())));
    rows.push((" Shipping:", format!("{}  ", pricing.shipping())));

    if pricing.has_voucher_discount() {
        rows.push((" Voucher:", format!("-{}  ", pricing.voucher_discount())));
    }

    if allocation.store_credit_used.to_minor_units() > 0 {
        rows.push((
            " Store credit:",
            format!("-{}  ", allocation.store_credit_used),
        ));
    }

    if allocation.e_wallet_used.to_minor_units() > 0 {
        rows.push((" E-wallet:", format!("-{}  ", allocation.e_wallet_used)));
    }

    let total_val = format!("{}  ", receipt.total()?);
    let method_val = format!("{}  ", receipt.payment_method());

    let total_label = " \x1b[1mTotal:\x1b[0m";

    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .chain([visible_width(total_label), visible_width(" Paid by:")])
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .map(|(_, value)| value.len())
        .chain([total_val.len(), method_val.len()])
        .max()
        .unwrap_or_default();

    for (label, value) in &rows {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    write_summary_line(
        out,
        total_label,
        &format!("\x1b[1m{total_val}\x1b[0m"),
        label_width,
        value_width,
    )?;

    write_summary_line(out, " Paid by:", &method_val, label_width, value_width)?;

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Wraps runs of box-drawing characters in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}
