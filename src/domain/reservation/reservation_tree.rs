use slotmap::{SlotMap, new_key_type};

use crate::domain::reservation::reservation::{ReservationKind, ReservationNode};

new_key_type! {
    pub struct ReservationKey;
}

#[derive(Debug, Clone)]
struct TreeNode {
    node: ReservationNode,
    /// Position in the creation journal.
    created: usize,
    parent: Option<ReservationKey>,
    children: Vec<ReservationKey>,
}

/// Arena holding the reservations produced by one allocation. Children are owned by their
/// parent: deleting a node deletes its whole subtree.
///
/// Creation order is journaled so that an allocation attempt can be undone with
/// [`ReservationTree::truncate`]. Removed nodes stay in the journal as tombstones, so marks
/// taken earlier keep pointing at the same position.
#[derive(Debug, Clone, Default)]
pub struct ReservationTree {
    nodes: SlotMap<ReservationKey, TreeNode>,
    creation_order: Vec<ReservationKey>,
    root: Option<ReservationKey>,
}

impl ReservationTree {
    pub fn new() -> Self {
        Self { nodes: SlotMap::with_key(), creation_order: Vec::new(), root: None }
    }

    /// Adds a detached node.
    ///
    /// # Returns
    /// The ReservationKey of the new node.
    pub fn insert(&mut self, node: ReservationNode) -> ReservationKey {
        let created = self.creation_order.len();
        let key = self.nodes.insert(TreeNode { node, created, parent: None, children: Vec::new() });
        self.creation_order.push(key);
        return key;
    }

    /// Makes `child` a child of `parent`.
    ///
    /// A node has at most one parent. Attaching an already attached node is an integrity error.
    pub fn attach_child(&mut self, parent: ReservationKey, child: ReservationKey) {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            panic!("ErrorUnknownReservation: Attach of {:?} to {:?} references a reservation not in the tree.", child, parent);
        }
        if parent == child {
            panic!("ErrorReservationCycle: Reservation {:?} cannot be its own child.", child);
        }
        if let Some(existing) = self.nodes[child].parent {
            panic!("ErrorReservationAlreadyAttached: Reservation {:?} already has parent {:?}.", child, existing);
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    pub fn set_root(&mut self, key: ReservationKey) {
        self.root = Some(key);
    }

    pub fn root(&self) -> Option<ReservationKey> {
        self.root
    }

    pub fn get(&self, key: ReservationKey) -> Option<&ReservationNode> {
        self.nodes.get(key).map(|tree_node| &tree_node.node)
    }

    pub fn parent(&self, key: ReservationKey) -> Option<ReservationKey> {
        self.nodes.get(key).and_then(|tree_node| tree_node.parent)
    }

    pub fn children(&self, key: ReservationKey) -> &[ReservationKey] {
        self.nodes.get(key).map(|tree_node| tree_node.children.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Marker for [`ReservationTree::truncate`].
    pub fn creation_mark(&self) -> usize {
        self.creation_order.len()
    }

    /// Deletes every node created after `mark`, youngest first. Older nodes that were attached
    /// to a deleted node are detached and kept.
    ///
    /// # Returns
    /// The number of deleted nodes.
    pub fn truncate(&mut self, mark: usize) -> usize {
        let mut removed = 0;
        while self.creation_order.len() > mark {
            let Some(key) = self.creation_order.pop() else {
                break;
            };
            if !self.nodes.contains_key(key) {
                continue;
            }
            let older: Vec<ReservationKey> =
                self.children(key).iter().copied().filter(|child| self.nodes.get(*child).is_some_and(|tree_node| tree_node.created < mark)).collect();
            for child in older {
                self.detach(child);
            }
            removed += self.remove(key);
        }
        return removed;
    }

    fn detach(&mut self, key: ReservationKey) {
        let Some(parent) = self.nodes.get_mut(key).and_then(|tree_node| tree_node.parent.take()) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|child| *child != key);
        }
    }

    /// Deletes `key` together with its subtree and detaches it from its parent.
    ///
    /// # Returns
    /// The number of deleted nodes.
    pub fn remove(&mut self, key: ReservationKey) -> usize {
        if !self.nodes.contains_key(key) {
            return 0;
        }
        self.detach(key);

        let subtree = self.subtree(key);
        for node_key in &subtree {
            self.nodes.remove(*node_key);
        }
        if self.root.is_some_and(|root| !self.nodes.contains_key(root)) {
            self.root = None;
        }
        return subtree.len();
    }

    /// Keys of the subtree rooted at `key` in pre-order.
    pub fn subtree(&self, key: ReservationKey) -> Vec<ReservationKey> {
        let mut result = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let Some(tree_node) = self.nodes.get(current) else {
                continue;
            };
            result.push(current);
            stack.extend(tree_node.children.iter().rev().copied());
        }
        result
    }

    /// All nodes reachable from the root in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (ReservationKey, &ReservationNode)> {
        let keys = self.root.map(|root| self.subtree(root)).unwrap_or_default();
        keys.into_iter().filter_map(move |key| self.get(key).map(|node| (key, node)))
    }

    /// Nodes of the tree whose kind matches `predicate`.
    pub fn find_all(&self, predicate: impl Fn(&ReservationKind) -> bool) -> Vec<&ReservationNode> {
        self.iter().map(|(_, node)| node).filter(|node| predicate(&node.kind)).collect()
    }

    /// Checks that every child slot lies within its parent's slot.
    ///
    /// # Returns
    /// The first offending (parent, child) pair.
    pub fn validate_containment(&self) -> Result<(), (ReservationKey, ReservationKey)> {
        for (key, tree_node) in self.nodes.iter() {
            for child in &tree_node.children {
                if let Some(child_node) = self.nodes.get(*child) {
                    if !tree_node.node.slot.contains_slot(&child_node.node.slot) {
                        return Err((key, *child));
                    }
                }
            }
        }
        Ok(())
    }

    /// Multi-line, indented summary used by the CLI and in log output.
    pub fn describe(&self) -> String {
        let mut lines = Vec::new();
        if let Some(root) = self.root {
            self.describe_node(root, 0, &mut lines);
        }
        lines.join("\n")
    }

    fn describe_node(&self, key: ReservationKey, depth: usize, lines: &mut Vec<String>) {
        if let Some(tree_node) = self.nodes.get(key) {
            lines.push(format!("{}{} {}", "  ".repeat(depth), tree_node.node.kind.describe(), tree_node.node.slot));
            for child in &tree_node.children {
                self.describe_node(*child, depth + 1, lines);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time_slot::TimeSlot;
    use crate::domain::utils::id::ResourceId;

    fn node(resource: &str, start: i64, end: i64) -> ReservationNode {
        ReservationNode::new(TimeSlot::new(start, end), ReservationKind::Resource { resource_id: ResourceId::new(resource) })
    }

    #[test]
    fn test_remove_cascades_to_children() {
        let mut tree = ReservationTree::new();
        let root = tree.insert(node("a", 0, 10));
        let child = tree.insert(node("b", 0, 10));
        let grandchild = tree.insert(node("c", 0, 10));
        tree.attach_child(root, child);
        tree.attach_child(child, grandchild);
        tree.set_root(root);

        assert_eq!(tree.remove(child), 2);
        assert_eq!(tree.len(), 1);
        assert!(tree.children(root).is_empty(), "Removed child must be detached from its parent.");
        assert!(tree.get(grandchild).is_none());
    }

    #[test]
    fn test_truncate_undoes_younger_nodes() {
        let mut tree = ReservationTree::new();
        let root = tree.insert(node("a", 0, 10));
        let mark = tree.creation_mark();
        let child = tree.insert(node("b", 0, 10));
        tree.attach_child(root, child);
        tree.insert(node("c", 0, 10));

        assert_eq!(tree.truncate(mark), 2);
        assert_eq!(tree.len(), 1);
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn test_marks_survive_explicit_removal() {
        let mut tree = ReservationTree::new();
        tree.insert(node("a", 0, 10));
        let removed = tree.insert(node("b", 0, 10));
        let mark = tree.creation_mark();
        let younger = tree.insert(node("c", 0, 10));

        assert_eq!(tree.remove(removed), 1);
        assert_eq!(tree.creation_mark(), 3);
        assert_eq!(tree.truncate(mark), 1);
        assert!(tree.get(younger).is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_truncate_keeps_older_node_under_younger_parent() {
        let mut tree = ReservationTree::new();
        let endpoint = tree.insert(node("endpoint", 0, 10));
        let mark = tree.creation_mark();
        let compartment = tree.insert(node("compartment", 0, 10));
        let room = tree.insert(node("room", 0, 10));
        tree.attach_child(compartment, endpoint);
        tree.attach_child(compartment, room);

        assert_eq!(tree.truncate(mark), 2);
        assert!(tree.get(endpoint).is_some());
        assert_eq!(tree.parent(endpoint), None);
        assert_eq!(tree.creation_mark(), mark);
    }

    #[test]
    #[should_panic(expected = "ErrorReservationAlreadyAttached")]
    fn test_node_has_single_parent() {
        let mut tree = ReservationTree::new();
        let a = tree.insert(node("a", 0, 10));
        let b = tree.insert(node("b", 0, 10));
        let c = tree.insert(node("c", 0, 10));
        tree.attach_child(a, c);
        tree.attach_child(b, c);
    }

    #[test]
    fn test_containment_violation_is_detected() {
        let mut tree = ReservationTree::new();
        let parent = tree.insert(node("a", 0, 10));
        let child = tree.insert(node("b", 5, 15));
        tree.attach_child(parent, child);
        assert_eq!(tree.validate_containment(), Err((parent, child)));
    }
}
