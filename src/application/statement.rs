use std::fmt::Write;

use crate::domain::{Account, format_cents};

pub const EMPTY_HISTORY: &str = "Transaction history is empty";

const RULE: &str = "========================================";

/// Render the account's history as a fixed-layout text report.
///
/// Lines are `timestamp | KIND | amount | message` in append order, framed by
/// an owner header and the current balance.
pub fn render_statement(account: &Account) -> String {
    if account.transactions().is_empty() {
        return EMPTY_HISTORY.to_string();
    }

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "Account statement");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Owner: {}", account.owner_name());
    let _ = writeln!(out, "Account ID: {}", account.id());
    let _ = writeln!(out, "{RULE}");
    for tx in account.transactions() {
        let _ = writeln!(
            out,
            "{} | {} | {} | {}",
            tx.timestamp.format("%Y-%m-%d %H:%M:%S"),
            tx.kind,
            format_cents(tx.amount),
            tx.message
        );
    }
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Current balance: {}", format_cents(account.balance()));
    out
}
