//! Category tool: `list_categories`.

use crate::{
    error::AppError,
    ledger::LedgerDataAccess,
    models::category::{CategoryGroupView, CategoryTree, CategoryView},
};

/// List category groups, each with its categories nested in ledger order.
pub async fn list_categories(ledger: &dyn LedgerDataAccess) -> Result<CategoryTree, AppError> {
    let (groups, categories) =
        tokio::try_join!(ledger.list_category_groups(), ledger.list_categories())?;

    let mut groups: Vec<CategoryGroupView> = groups
        .into_iter()
        .map(|group| CategoryGroupView {
            id: group.id,
            name: group.name,
            is_income: group.is_income,
            categories: Vec::new(),
        })
        .collect();

    for category in categories {
        match groups.iter_mut().find(|g| g.id == category.group_id) {
            Some(group) => group.categories.push(CategoryView {
                id: category.id,
                name: category.name,
            }),
            None => tracing::debug!(
                "Category {} references unknown group {}",
                category.id,
                category.group_id
            ),
        }
    }

    Ok(CategoryTree { groups })
}
