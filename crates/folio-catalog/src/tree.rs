//! In-memory arena over a snapshot of the category table.
//!
//! Built fresh for every read or structural check and never cached.
//! Every traversal tracks visited ids, so a corrupted parent graph that
//! contains a loop still terminates.

use std::collections::{HashMap, HashSet, VecDeque};

use folio_core::models::category::{Category, CategoryNode, ParentLink};
use uuid::Uuid;

/// How many levels [`CategoryTree::build`] materializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeDepth {
    /// At most `n` levels, counting the top level as one. `Limited(0)`
    /// yields nothing.
    Limited(usize),
    Unbounded,
}

impl TreeDepth {
    /// Navigation depth used by the CMS: top level, children, grandchildren.
    pub const CMS: TreeDepth = TreeDepth::Limited(3);

    fn allows(self, level: usize) -> bool {
        match self {
            TreeDepth::Limited(max) => level < max,
            TreeDepth::Unbounded => true,
        }
    }
}

#[derive(Debug, Default)]
pub struct CategoryTree {
    nodes: HashMap<Uuid, Category>,
    /// Child ids per parent (`None` = top level), ordered by
    /// `(sort_order, id)`.
    children: HashMap<Option<Uuid>, Vec<Uuid>>,
}

impl CategoryTree {
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut tree = Self::default();
        for category in categories {
            tree.children
                .entry(category.parent_id)
                .or_default()
                .push(category.id);
            tree.nodes.insert(category.id, category);
        }

        let nodes = &tree.nodes;
        for ids in tree.children.values_mut() {
            ids.sort_by_key(|id| (nodes[id].sort_order, *id));
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Category> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Ordered direct children of `parent` (`None` for the top level).
    pub fn children_of(&self, parent: Option<Uuid>) -> &[Uuid] {
        self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every id transitively reachable from `id` through child links,
    /// breadth first. `id` itself is never included.
    pub fn descendants(&self, id: Uuid) -> Vec<Uuid> {
        let mut visited = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);
        let mut out = Vec::new();

        while let Some(current) = queue.pop_front() {
            for &child in self.children_of(Some(current)) {
                if visited.insert(child) {
                    out.push(child);
                    queue.push_back(child);
                }
            }
        }
        out
    }

    /// Whether linking `id` under `new_parent` would close a loop.
    pub fn would_create_cycle(&self, id: Uuid, new_parent: Option<Uuid>) -> bool {
        match new_parent {
            None => false,
            Some(parent) if parent == id => true,
            Some(parent) => self.descendants(id).contains(&parent),
        }
    }

    /// Parent links from `start` up to its top-level ancestor, `start`
    /// first. These are the links a cycle check on `start` relied on.
    /// Stops at an unknown id or when a corrupted graph loops back.
    pub fn ancestry(&self, start: Option<Uuid>) -> Vec<ParentLink> {
        let mut links = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = start;

        while let Some(id) = cursor {
            if !visited.insert(id) {
                break;
            }
            let Some(category) = self.nodes.get(&id) else {
                break;
            };
            links.push(ParentLink {
                id,
                parent_id: category.parent_id,
            });
            cursor = category.parent_id;
        }
        links
    }

    /// Materialize nested nodes.
    ///
    /// With `root = None` the forest of top-level categories is built;
    /// with `Some(id)` the single subtree rooted at `id` (empty if `id`
    /// is unknown).
    pub fn build(&self, root: Option<Uuid>, depth: TreeDepth) -> Vec<CategoryNode> {
        let tops: Vec<Uuid> = match root {
            None => self.children_of(None).to_vec(),
            Some(id) if self.contains(id) => vec![id],
            Some(_) => Vec::new(),
        };

        let mut on_path = HashSet::new();
        tops.into_iter()
            .filter_map(|id| self.build_node(id, 0, depth, &mut on_path))
            .collect()
    }

    fn build_node(
        &self,
        id: Uuid,
        level: usize,
        depth: TreeDepth,
        on_path: &mut HashSet<Uuid>,
    ) -> Option<CategoryNode> {
        if !depth.allows(level) || !on_path.insert(id) {
            return None;
        }
        let category = self.nodes.get(&id)?.clone();

        let children = self
            .children_of(Some(id))
            .iter()
            .filter_map(|&child| self.build_node(child, level + 1, depth, on_path))
            .collect();

        on_path.remove(&id);
        Some(CategoryNode { category, children })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use folio_core::models::category::CategoryStatus;

    fn category(name: &str, parent_id: Option<Uuid>, sort_order: i64) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: name.to_lowercase(),
            description: None,
            parent_id,
            sort_order,
            is_featured: false,
            status: CategoryStatus::Active,
            image: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn names(nodes: &[CategoryNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.category.name.as_str()).collect()
    }

    #[test]
    fn descendants_cover_the_whole_subtree() {
        let a = category("A", None, 0);
        let b = category("B", Some(a.id), 0);
        let c = category("C", Some(b.id), 0);
        let d = category("D", Some(a.id), 1);
        let (a_id, b_id, c_id, d_id) = (a.id, b.id, c.id, d.id);
        let tree = CategoryTree::new([a, b, c, d]);

        let mut found = tree.descendants(a_id);
        found.sort();
        let mut expected = vec![b_id, c_id, d_id];
        expected.sort();
        assert_eq!(found, expected);
        assert_eq!(tree.descendants(c_id), Vec::<Uuid>::new());
    }

    #[test]
    fn cycle_detection_looks_past_direct_children() {
        let a = category("A", None, 0);
        let b = category("B", Some(a.id), 0);
        let c = category("C", Some(b.id), 0);
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        let tree = CategoryTree::new([a, b, c]);

        assert!(tree.would_create_cycle(a_id, Some(c_id)));
        assert!(tree.would_create_cycle(a_id, Some(a_id)));
        assert!(!tree.would_create_cycle(c_id, Some(a_id)));
        assert!(!tree.would_create_cycle(b_id, None));
    }

    #[test]
    fn ancestry_walks_up_to_the_top_level() {
        let a = category("A", None, 0);
        let b = category("B", Some(a.id), 0);
        let c = category("C", Some(b.id), 0);
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        let tree = CategoryTree::new([a, b, c]);

        let chain = tree.ancestry(Some(c_id));
        assert_eq!(
            chain,
            [
                ParentLink { id: c_id, parent_id: Some(b_id) },
                ParentLink { id: b_id, parent_id: Some(a_id) },
                ParentLink { id: a_id, parent_id: None },
            ]
        );
        assert!(tree.ancestry(None).is_empty());
        assert!(tree.ancestry(Some(Uuid::new_v4())).is_empty());
    }

    #[test]
    fn ancestry_stops_on_a_stored_loop() {
        let mut a = category("A", None, 0);
        let b = category("B", Some(a.id), 0);
        a.parent_id = Some(b.id);
        let a_id = a.id;
        let tree = CategoryTree::new([a, b]);

        assert_eq!(tree.ancestry(Some(a_id)).len(), 2);
    }

    #[test]
    fn looped_stored_data_terminates() {
        let mut a = category("A", None, 0);
        let b = category("B", Some(a.id), 0);
        a.parent_id = Some(b.id);
        let (a_id, b_id) = (a.id, b.id);
        let tree = CategoryTree::new([a, b]);

        assert_eq!(tree.descendants(a_id), vec![b_id]);
        assert_eq!(tree.descendants(b_id), vec![a_id]);

        // Neither node is top level, so the forest is empty; an explicit
        // root still renders each node once.
        assert!(tree.build(None, TreeDepth::Unbounded).is_empty());
        let rooted = tree.build(Some(a_id), TreeDepth::Unbounded);
        assert_eq!(rooted.len(), 1);
        assert_eq!(rooted[0].children.len(), 1);
        assert!(rooted[0].children[0].children.is_empty());
    }

    #[test]
    fn siblings_order_by_sort_order_then_id() {
        let parent = category("P", None, 0);
        let late = category("Late", Some(parent.id), 10);
        let early = category("Early", Some(parent.id), -1);
        let mut tie_a = category("TieA", Some(parent.id), 5);
        let mut tie_b = category("TieB", Some(parent.id), 5);
        if tie_a.id > tie_b.id {
            std::mem::swap(&mut tie_a.id, &mut tie_b.id);
        }
        let tree = CategoryTree::new([late, tie_b, parent, early, tie_a]);

        let forest = tree.build(None, TreeDepth::Unbounded);
        assert_eq!(names(&forest), ["P"]);
        assert_eq!(
            names(&forest[0].children),
            ["Early", "TieA", "TieB", "Late"]
        );
    }

    #[test]
    fn limited_depth_cuts_deeper_levels() {
        let l1 = category("L1", None, 0);
        let l2 = category("L2", Some(l1.id), 0);
        let l3 = category("L3", Some(l2.id), 0);
        let l4 = category("L4", Some(l3.id), 0);
        let tree = CategoryTree::new([l1, l2, l3, l4]);

        let cms = tree.build(None, TreeDepth::CMS);
        let l3_node = &cms[0].children[0].children[0];
        assert_eq!(l3_node.category.name, "L3");
        assert!(l3_node.children.is_empty());

        let full = tree.build(None, TreeDepth::Unbounded);
        assert_eq!(full[0].children[0].children[0].children.len(), 1);

        assert!(tree.build(None, TreeDepth::Limited(0)).is_empty());
    }

    #[test]
    fn unknown_root_builds_nothing() {
        let tree = CategoryTree::new([category("A", None, 0)]);
        assert!(tree.build(Some(Uuid::new_v4()), TreeDepth::Unbounded).is_empty());
    }
}
