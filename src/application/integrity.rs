use tracing::warn;

use crate::domain::{IntegrityReport, build_integrity_report};
use crate::storage::Storage;

use super::AppError;

/// Replay every stored account's history and report anything inconsistent.
pub async fn check_integrity<S: Storage>(storage: &S) -> Result<IntegrityReport, AppError> {
    let accounts = storage.list_all().await?;
    let report = build_integrity_report(&accounts);
    for issue in &report.issues {
        warn!(%issue, "integrity issue");
    }
    Ok(report)
}
