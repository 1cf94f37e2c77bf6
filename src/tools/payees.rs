//! Payee tools: `list_payees`, `create_payee`.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    error::AppError,
    ledger::LedgerDataAccess,
    models::payee::{PayeeList, PayeeReceipt, PayeeView},
    services::{
        aggregation::contains_ignore_case,
        resolver::{EntityKind, try_resolution},
    },
    tools::{require_text, sync_after_mutation},
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListPayeesParams {
    /// Case-insensitive fragment of the payee name
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreatePayeeParams {
    /// Name of the new payee
    pub name: String,
}

pub async fn list_payees(
    ledger: &dyn LedgerDataAccess,
    params: ListPayeesParams,
) -> Result<PayeeList, AppError> {
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let payees: Vec<PayeeView> = ledger
        .list_payees()
        .await?
        .into_iter()
        .filter(|payee| !payee.is_transfer())
        .filter(|payee| search.is_none_or(|wanted| contains_ignore_case(&payee.name, wanted)))
        .map(|payee| PayeeView {
            id: payee.id,
            name: payee.name,
            category: payee.category,
        })
        .collect();

    Ok(PayeeList {
        count: payees.len(),
        payees,
    })
}

/// Create a payee unless one with the same name (ignoring case) exists.
pub async fn create_payee(
    ledger: &dyn LedgerDataAccess,
    params: CreatePayeeParams,
) -> Result<PayeeReceipt, AppError> {
    let name = require_text("name", &params.name)?;

    let payees = ledger.list_payees().await?;
    let wanted = name.to_lowercase();
    if let Some(existing) = payees.iter().find(|p| p.name.to_lowercase() == wanted) {
        return Err(AppError::Validation(format!(
            "payee '{}' already exists with id {}",
            existing.name, existing.id
        )));
    }

    let id = ledger.create_payee(name).await?;
    tracing::info!("Created payee {} ({})", name, id);
    sync_after_mutation(ledger, format!("Create payee {name}")).await?;

    Ok(PayeeReceipt {
        message: format!("Created payee {name}"),
        id,
        name: name.to_string(),
    })
}

/// Payee id for an id or name, creating and syncing the payee when nothing matches.
pub async fn find_or_create_payee(
    ledger: &dyn LedgerDataAccess,
    name: &str,
) -> Result<String, AppError> {
    let payees = ledger.list_payees().await?;
    if let Some(payee) = try_resolution(EntityKind::Payee, &payees, name) {
        return Ok(payee.id.clone());
    }

    let id = ledger.create_payee(name).await?;
    tracing::info!("Created payee {} ({})", name, id);
    sync_after_mutation(ledger, format!("Create payee {name}")).await?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::memory::InMemoryLedger;

    #[tokio::test]
    async fn transfer_payees_are_hidden() {
        let ledger = InMemoryLedger::household();

        let list = list_payees(&ledger, ListPayeesParams { search: None })
            .await
            .unwrap();

        assert_eq!(list.count, 4);
        assert!(list.payees.iter().all(|p| p.id != "p_transfer"));
    }

    #[tokio::test]
    async fn search_matches_name_fragment() {
        let ledger = InMemoryLedger::household();

        let list = list_payees(
            &ledger,
            ListPayeesParams {
                search: Some("CO".to_string()),
            },
        )
        .await
        .unwrap();

        let names: Vec<&str> = list.payees.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Costco", "Corner Cafe", "Acme Corp"]);
    }

    #[tokio::test]
    async fn create_payee_syncs() {
        let ledger = InMemoryLedger::household();

        let receipt = create_payee(
            &ledger,
            CreatePayeeParams {
                name: "  Hardware Store ".to_string(),
            },
        )
        .await
        .unwrap();

        let state = ledger.snapshot();
        assert_eq!(state.created_payees, ["Hardware Store"]);
        assert_eq!(state.syncs, 1);
        assert_eq!(receipt.name, "Hardware Store");
    }

    #[tokio::test]
    async fn duplicate_payee_is_rejected() {
        let ledger = InMemoryLedger::household();

        let err = create_payee(
            &ledger,
            CreatePayeeParams {
                name: "costco".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(ledger.snapshot().write_count(), 0);
    }

    #[tokio::test]
    async fn find_or_create_reuses_a_matching_payee() {
        let ledger = InMemoryLedger::household();

        let id = find_or_create_payee(&ledger, "CORNER CAFE").await.unwrap();

        assert_eq!(id, "p_cafe");
        let state = ledger.snapshot();
        assert!(state.created_payees.is_empty());
        assert_eq!(state.syncs, 0);
    }

    #[tokio::test]
    async fn find_or_create_creates_an_unknown_payee() {
        let ledger = InMemoryLedger::household();

        let id = find_or_create_payee(&ledger, "Fiber Net").await.unwrap();

        let state = ledger.snapshot();
        assert_eq!(state.created_payees, ["Fiber Net"]);
        assert!(state.payees.iter().any(|p| p.id == id && p.name == "Fiber Net"));
        assert_eq!(state.syncs, 1);
    }
}
