//! Category lookup and the join that names each inventory's category.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// A catalog category as returned by the categories resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: i64,
    pub category_name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// `category_id` → `category_name`, built once per run.
#[derive(Debug, Default, Clone)]
pub struct CategoryIndex {
    names: HashMap<i64, String>,
}

impl CategoryIndex {
    pub fn new(categories: &[Category]) -> Self {
        let names = categories
            .iter()
            .map(|c| (c.category_id, c.category_name.clone()))
            .collect();
        Self { names }
    }

    pub fn name_for(&self, category_id: i64) -> Option<&str> {
        self.names.get(&category_id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Sets `item.category_name` on one inventory record.
    ///
    /// The name is empty when the record has no integer `item.category_id` or
    /// the id is unknown. Records whose `item` is not an object are left alone.
    pub fn enrich(&self, inventory: &mut Value) {
        let Some(item) = inventory.get_mut("item").and_then(Value::as_object_mut) else {
            warn!("Inventory record has no item object, skipping category join");
            return;
        };
        let name = item
            .get("category_id")
            .and_then(Value::as_i64)
            .and_then(|id| self.name_for(id))
            .unwrap_or_default()
            .to_owned();
        if name.is_empty() {
            debug!(category_id = ?item.get("category_id"), "No category name for inventory item");
        }
        item.insert("category_name".to_owned(), Value::String(name));
    }
}

/// Attaches a human-readable category name to every inventory record.
///
/// A missing match is not an error: the record gets an empty name.
pub fn join_categories(mut inventories: Vec<Value>, categories: &[Category]) -> Vec<Value> {
    let index = CategoryIndex::new(categories);
    info!(
        inventories = inventories.len(),
        categories = index.len(),
        "Joining category names onto inventories"
    );
    for inventory in &mut inventories {
        index.enrich(inventory);
    }
    inventories
}
