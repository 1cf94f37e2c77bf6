//! `sync`: push pending local changes to the ledger server.

use schemars::JsonSchema;
use serde::Serialize;

use crate::{error::AppError, ledger::LedgerDataAccess};

/// Output of the `sync` tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct SyncReceipt {
    pub message: String,
}

/// Explicit sync requested by the caller. A failure is a plain ledger error;
/// nothing was written by this tool.
pub async fn sync(ledger: &dyn LedgerDataAccess) -> Result<SyncReceipt, AppError> {
    ledger.synchronize().await?;
    tracing::info!("Ledger synchronized on request");

    Ok(SyncReceipt {
        message: "Ledger synchronized".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::memory::InMemoryLedger;

    #[tokio::test]
    async fn sync_reports_success() {
        let ledger = InMemoryLedger::household();
        let receipt = sync(&ledger).await.unwrap();
        assert_eq!(receipt.message, "Ledger synchronized");
        assert_eq!(ledger.snapshot().syncs, 1);
    }

    #[tokio::test]
    async fn sync_failure_is_a_ledger_error() {
        let ledger = InMemoryLedger::household();
        ledger.update(|s| s.fail_sync = true);

        let err = sync(&ledger).await.unwrap_err();
        assert!(matches!(err, AppError::Ledger(_)));
    }
}
