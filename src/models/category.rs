//! Category and category-group models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A budget category. The income flag is inherited from its group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub group_id: String,

    #[serde(default)]
    pub is_income: bool,
}

/// A named collection of categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub is_income: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CategoryGroupView {
    pub id: String,
    pub name: String,
    pub is_income: bool,
    pub categories: Vec<CategoryView>,
}

/// Output of the `list_categories` tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct CategoryTree {
    pub groups: Vec<CategoryGroupView>,
}
