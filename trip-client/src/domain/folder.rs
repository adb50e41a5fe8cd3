//! Plan folders.
//!
//! Folders exist only to group plans on the client. They reference their
//! parent by id; [`build_folder_tree`] turns the flat list the backend
//! returns into a forest.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;

use super::{DomainError, FolderId, Plan};

/// A user-defined folder of plans.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanFolder {
    pub id: FolderId,
    pub name: String,
    pub parent_id: Option<FolderId>,
    pub created_at: Option<NaiveDateTime>,
}

impl PlanFolder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: FolderId::new(id),
            name: name.into(),
            parent_id: None,
            created_at: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_id = Some(FolderId::new(parent));
        self
    }
}

/// Trim a folder name, rejecting blank names.
pub fn validate_folder_name(name: &str) -> Result<&str, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(DomainError::EmptyField("folder name"))
    } else {
        Ok(trimmed)
    }
}

/// A folder with its sub-folders.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderNode {
    pub folder: PlanFolder,
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Number of folders in this subtree, including this one.
    pub fn folder_count(&self) -> usize {
        1 + self.children.iter().map(FolderNode::folder_count).sum::<usize>()
    }

    /// Ids of this folder and all of its descendants.
    pub fn subtree_ids(&self) -> Vec<&FolderId> {
        let mut ids = vec![&self.folder.id];
        for child in &self.children {
            ids.extend(child.subtree_ids());
        }
        ids
    }
}

/// Build the folder forest, keeping the input order among siblings.
///
/// Folders whose parent is unknown become roots. A parent chain that loops
/// back on itself is cut at the first folder of the loop in input order, so
/// every folder appears exactly once.
pub fn build_folder_tree(folders: &[PlanFolder]) -> Vec<FolderNode> {
    let known: HashSet<&FolderId> = folders.iter().map(|f| &f.id).collect();

    let mut children: HashMap<&FolderId, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for (idx, folder) in folders.iter().enumerate() {
        match &folder.parent_id {
            Some(parent) if known.contains(parent) && parent != &folder.id => {
                children.entry(parent).or_default().push(idx);
            }
            _ => roots.push(idx),
        }
    }

    let mut placed = HashSet::new();
    let mut forest: Vec<FolderNode> = roots
        .into_iter()
        .map(|idx| build_node(folders, idx, &children, &mut placed))
        .collect();

    // Anything left over sits on a parent cycle.
    for idx in 0..folders.len() {
        if !placed.contains(&idx) {
            forest.push(build_node(folders, idx, &children, &mut placed));
        }
    }

    forest
}

fn build_node(
    folders: &[PlanFolder],
    idx: usize,
    children: &HashMap<&FolderId, Vec<usize>>,
    placed: &mut HashSet<usize>,
) -> FolderNode {
    placed.insert(idx);
    let folder = &folders[idx];

    let mut child_nodes = Vec::new();
    if let Some(kids) = children.get(&folder.id) {
        for &k in kids {
            // Already placed only when the parent chain loops.
            if !placed.contains(&k) {
                child_nodes.push(build_node(folders, k, children, placed));
            }
        }
    }

    FolderNode {
        folder: folder.clone(),
        children: child_nodes,
    }
}

/// Plans in one folder, or the unfiled plans when `folder` is `None`.
///
/// Plans pointing at a folder that no longer exists count as unfiled.
pub fn plans_in_folder<'a>(
    plans: &'a [Plan],
    folders: &[PlanFolder],
    folder: Option<&FolderId>,
) -> Vec<&'a Plan> {
    let known: HashSet<&FolderId> = folders.iter().map(|f| &f.id).collect();

    plans
        .iter()
        .filter(|plan| {
            let effective = plan.folder_id.as_ref().filter(|id| known.contains(id));
            effective == folder
        })
        .collect()
}
