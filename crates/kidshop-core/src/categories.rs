//! Category hierarchy assembly.
//!
//! Categories are stored flat with an optional `parent_id`. A parent id that
//! does not resolve turns the category into a root. Parent chains are
//! walked with a visited set, so a cyclic hierarchy is reported as
//! [`CoreError::CycleDetected`] instead of looping.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: String,
    pub parent_id: Option<i64>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatCategory {
    #[serde(flatten)]
    pub category: Category,
    pub full_name: String,
}

/// Walk from `start` towards the root, returning the chain `start, parent, …`.
///
/// Stops at a category without a parent or whose parent is not in `by_id`.
fn ancestor_chain<'a>(
    start: &'a Category,
    by_id: &HashMap<i64, &'a Category>,
) -> Result<Vec<&'a Category>, CoreError> {
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut current = Some(start);

    while let Some(category) = current {
        if !visited.insert(category.id) {
            return Err(CoreError::CycleDetected(category.id));
        }
        chain.push(category);
        current = category
            .parent_id
            .and_then(|parent_id| by_id.get(&parent_id).copied());
    }

    Ok(chain)
}

fn index_by_id(categories: &[Category]) -> HashMap<i64, &Category> {
    categories.iter().map(|c| (c.id, c)).collect()
}

/// Assemble a flat category list into a forest, preserving input order
/// among siblings.
///
/// # Errors
///
/// Returns [`CoreError::CycleDetected`] if any parent chain loops.
pub fn build_category_tree(categories: Vec<Category>) -> Result<Vec<CategoryNode>, CoreError> {
    let by_id = index_by_id(&categories);
    for category in &categories {
        ancestor_chain(category, &by_id)?;
    }

    let known: HashSet<i64> = by_id.keys().copied().collect();
    drop(by_id);

    let mut children_of: HashMap<i64, Vec<Category>> = HashMap::new();
    let mut roots = Vec::new();
    for category in categories {
        match category.parent_id.filter(|p| known.contains(p)) {
            Some(parent_id) => children_of.entry(parent_id).or_default().push(category),
            None => roots.push(category),
        }
    }

    Ok(roots
        .into_iter()
        .map(|root| attach_children(root, &mut children_of))
        .collect())
}

fn attach_children(
    category: Category,
    children_of: &mut HashMap<i64, Vec<Category>>,
) -> CategoryNode {
    let children = children_of
        .remove(&category.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach_children(child, children_of))
        .collect();
    CategoryNode { category, children }
}

/// Pair each category with its breadcrumb, e.g. `"Boys > Shirts > Polo"`.
///
/// # Errors
///
/// Returns [`CoreError::CycleDetected`] if any parent chain loops.
pub fn flatten_with_paths(categories: Vec<Category>) -> Result<Vec<FlatCategory>, CoreError> {
    let full_names = {
        let by_id = index_by_id(&categories);
        categories
            .iter()
            .map(|category| {
                let chain = ancestor_chain(category, &by_id)?;
                Ok(chain
                    .iter()
                    .rev()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(" > "))
            })
            .collect::<Result<Vec<_>, CoreError>>()?
    };

    Ok(categories
        .into_iter()
        .zip(full_names)
        .map(|(category, full_name)| FlatCategory {
            category,
            full_name,
        })
        .collect())
}

/// Check that making `parent_id` the parent of `id` keeps the hierarchy acyclic.
///
/// # Errors
///
/// Returns [`CoreError::CycleDetected`] if `id` is `parent_id` itself or one
/// of its ancestors.
pub fn ensure_parent_allowed(
    categories: &[Category],
    id: i64,
    parent_id: i64,
) -> Result<(), CoreError> {
    if id == parent_id {
        return Err(CoreError::CycleDetected(id));
    }
    let by_id = index_by_id(categories);
    let Some(parent) = by_id.get(&parent_id).copied() else {
        return Ok(());
    };
    let chain = ancestor_chain(parent, &by_id)?;
    if chain.iter().any(|c| c.id == id) {
        return Err(CoreError::CycleDetected(id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, name: &str, parent_id: Option<i64>) -> Category {
        let now = Utc::now();
        Category {
            id,
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: String::new(),
            image: String::new(),
            parent_id,
            is_active: true,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn dangling_parent_becomes_root_and_child_attaches() {
        let tree = build_category_tree(vec![
            category(1, "Boys", None),
            category(2, "Shirts", Some(1)),
            category(3, "Orphan", Some(99)),
        ])
        .expect("tree");

        let root_ids: Vec<i64> = tree.iter().map(|n| n.category.id).collect();
        assert_eq!(root_ids, vec![1, 3]);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].category.id, 2);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn child_listed_before_parent_still_attaches() {
        let tree = build_category_tree(vec![
            category(2, "Polo", Some(1)),
            category(1, "Shirts", None),
        ])
        .expect("tree");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children[0].category.id, 2);
    }

    #[test]
    fn tree_reports_cycle() {
        let err = build_category_tree(vec![
            category(1, "A", Some(2)),
            category(2, "B", Some(1)),
        ])
        .unwrap_err();
        assert!(matches!(err, CoreError::CycleDetected(_)));
    }

    #[test]
    fn flat_paths_join_ancestor_names() {
        let flat = flatten_with_paths(vec![
            category(1, "Boys", None),
            category(2, "Shirts", Some(1)),
            category(3, "Polo", Some(2)),
            category(4, "Lost", Some(42)),
        ])
        .expect("flat");

        let names: Vec<&str> = flat.iter().map(|f| f.full_name.as_str()).collect();
        assert_eq!(names, vec!["Boys", "Boys > Shirts", "Boys > Shirts > Polo", "Lost"]);
    }

    #[test]
    fn flat_paths_report_self_parent_cycle() {
        let err = flatten_with_paths(vec![category(7, "Loop", Some(7))]).unwrap_err();
        assert_eq!(err, CoreError::CycleDetected(7));
    }

    #[test]
    fn ensure_parent_allowed_rejects_descendant_as_parent() {
        let categories = vec![
            category(1, "Boys", None),
            category(2, "Shirts", Some(1)),
            category(3, "Polo", Some(2)),
        ];
        assert!(ensure_parent_allowed(&categories, 1, 3).is_err());
        assert!(ensure_parent_allowed(&categories, 3, 3).is_err());
        assert!(ensure_parent_allowed(&categories, 3, 1).is_ok());
        assert!(ensure_parent_allowed(&categories, 2, 404).is_ok());
    }
}
