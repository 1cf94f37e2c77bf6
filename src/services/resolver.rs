//! Id-or-name resolution for accounts, categories and payees.
//!
//! A token resolves to the first record whose id equals it verbatim, else to
//! the first record whose name matches it case-insensitively. Tools choose a
//! policy per field:
//!
//! - [`require_resolution`]: a miss aborts the call with `AppError::NotFound`
//! - [`try_resolution`]: a miss is logged and the field is left out

use std::fmt;

use crate::{
    error::AppError,
    models::{account::Account, category::Category, payee::Payee},
};

/// Kind of entity a token refers to, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Account,
    Category,
    Payee,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Account => "Account",
            EntityKind::Category => "Category",
            EntityKind::Payee => "Payee",
        };
        f.write_str(name)
    }
}

/// A record that can be looked up by id or display name.
pub trait Named {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

impl Named for Account {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Category {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Payee {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Find the record a token refers to.
///
/// An exact id match always wins over a name match. When several records share
/// the matched name the first one is returned and a warning is logged.
pub fn resolve<'a, T: Named>(items: &'a [T], token: &str) -> Option<&'a T> {
    if let Some(item) = items.iter().find(|item| item.id() == token) {
        return Some(item);
    }

    let wanted = token.to_lowercase();
    let mut matches = items
        .iter()
        .filter(|item| item.name().to_lowercase() == wanted);
    let first = matches.next()?;

    let others = matches.count();
    if others > 0 {
        tracing::warn!(
            "Name '{}' matches {} records; using id {}",
            token,
            others + 1,
            first.id()
        );
    }

    Some(first)
}

/// Resolve or fail with a `NotFound` error naming the token.
pub fn require_resolution<'a, T: Named>(
    kind: EntityKind,
    items: &'a [T],
    token: &str,
) -> Result<&'a T, AppError> {
    resolve(items, token).ok_or_else(|| AppError::not_found(kind, token))
}

/// Resolve if possible. A miss is not an error.
pub fn try_resolution<'a, T: Named>(kind: EntityKind, items: &'a [T], token: &str) -> Option<&'a T> {
    let found = resolve(items, token);
    if found.is_none() {
        tracing::debug!("{} '{}' did not resolve", kind, token);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> Vec<Account> {
        [("acc_1", "Checking"), ("acc_2", "Savings"), ("Savings", "Joint"), ("acc_4", "savings")]
            .into_iter()
            .map(|(id, name)| Account {
                id: id.to_string(),
                name: name.to_string(),
                offbudget: false,
                closed: false,
            })
            .collect()
    }

    #[test]
    fn id_match_wins_over_name_collision() {
        let accounts = accounts();
        let found = resolve(&accounts, "Savings").unwrap();
        assert_eq!(found.id, "Savings");
        assert_eq!(found.name, "Joint");
    }

    #[test]
    fn name_match_is_case_insensitive() {
        let accounts = accounts();
        assert_eq!(resolve(&accounts, "checking").unwrap().id, "acc_1");
        assert_eq!(resolve(&accounts, "CHECKING").unwrap().id, "acc_1");
    }

    #[test]
    fn duplicate_names_pick_the_first_record() {
        let accounts = accounts();
        assert_eq!(resolve(&accounts, "savINGS").unwrap().id, "acc_2");
    }

    #[test]
    fn name_match_does_not_trim_whitespace() {
        let accounts = accounts();
        assert!(resolve(&accounts, "SAVINGS ").is_none());
    }

    #[test]
    fn require_resolution_names_the_missing_token() {
        let accounts = accounts();
        let err = require_resolution(EntityKind::Account, &accounts, "Brokerage").unwrap_err();
        assert_eq!(err.to_string(), "Account not found: Brokerage");
    }

    #[test]
    fn try_resolution_returns_none_on_miss() {
        let accounts = accounts();
        assert!(try_resolution(EntityKind::Account, &accounts, "Brokerage").is_none());
        assert!(try_resolution(EntityKind::Account, &accounts, "acc_1").is_some());
    }

    #[test]
    fn resolution_does_not_reorder_input() {
        let accounts = accounts();
        let before = accounts.clone();
        let _ = resolve(&accounts, "savings");
        assert_eq!(accounts, before);
    }
}
