use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::domain::{Account, format_cents};

/// Point-in-time copy of every account, for JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub accounts: Vec<Account>,
}

/// Write one account's history as CSV. Returns the number of rows written.
pub fn export_statement_csv<W: Write>(account: &Account, writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "id",
        "timestamp",
        "kind",
        "amount",
        "counterparty",
        "message",
    ])?;

    for tx in account.transactions() {
        let timestamp = tx.timestamp.to_rfc3339();
        let amount = format_cents(tx.amount);
        csv_writer.write_record([
            tx.id.as_str(),
            timestamp.as_str(),
            tx.kind.as_str(),
            amount.as_str(),
            tx.kind.counterparty().map(|id| id.as_str()).unwrap_or_default(),
            tx.message.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(account.transactions().len())
}

/// Write every account as a pretty-printed JSON snapshot.
///
/// Accounts are sorted by id so repeated exports of the same state are
/// byte-identical apart from `exported_at`.
pub fn export_snapshot_json<W: Write>(
    mut accounts: Vec<Account>,
    exported_at: DateTime<Utc>,
    mut writer: W,
) -> Result<Snapshot> {
    accounts.sort_by(|a, b| a.id().cmp(b.id()));

    let snapshot = Snapshot {
        version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at,
        accounts,
    };

    let json = serde_json::to_string_pretty(&snapshot)?;
    writer.write_all(json.as_bytes())?;
    writer.flush()?;

    Ok(snapshot)
}
