use slotmap::{SlotMap, new_key_type};

use crate::domain::report::report_kind::{FailureKind, ReportKind};

new_key_type! {
    pub struct ReportId;
}

#[derive(Debug, Clone)]
pub struct ReportNode {
    pub kind: ReportKind,
    pub is_error: bool,
    parent: Option<ReportId>,
    children: Vec<ReportId>,
}

/// Forest of structured diagnostics explaining what the scheduler tried and why it failed.
#[derive(Debug, Clone, Default)]
pub struct ReportTree {
    nodes: SlotMap<ReportId, ReportNode>,
    roots: Vec<ReportId>,
}

impl ReportTree {
    pub fn new() -> Self {
        Self { nodes: SlotMap::with_key(), roots: Vec::new() }
    }

    pub fn add_root(&mut self, kind: ReportKind) -> ReportId {
        let id = self.nodes.insert(ReportNode { kind, is_error: false, parent: None, children: Vec::new() });
        self.roots.push(id);
        return id;
    }

    pub fn add_child(&mut self, parent: ReportId, kind: ReportKind) -> ReportId {
        let id = self.nodes.insert(ReportNode { kind, is_error: false, parent: Some(parent), children: Vec::new() });
        match self.nodes.get_mut(parent) {
            Some(parent_node) => parent_node.children.push(id),
            None => {
                log::error!("ErrorUnknownReport: Parent report {:?} does not exist. Report is added as root.", parent);
                self.nodes[id].parent = None;
                self.roots.push(id);
            }
        }
        return id;
    }

    pub fn mark_error(&mut self, id: ReportId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.is_error = true;
        }
    }

    pub fn get(&self, id: ReportId) -> Option<&ReportNode> {
        self.nodes.get(id)
    }

    pub fn roots(&self) -> &[ReportId] {
        &self.roots
    }

    pub fn parent(&self, id: ReportId) -> Option<ReportId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: ReportId) -> &[ReportId] {
        self.nodes.get(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn text(&self, id: ReportId) -> String {
        self.nodes.get(id).map(|node| node.kind.message()).unwrap_or_default()
    }

    pub fn help(&self, id: ReportId) -> Option<String> {
        self.nodes.get(id).and_then(|node| node.kind.help())
    }

    /// First failure classification found walking from `id` up to its root.
    pub fn failure_kind(&self, id: ReportId) -> Option<FailureKind> {
        let mut current = Some(id);
        while let Some(report) = current {
            let node = self.nodes.get(report)?;
            if let Some(kind) = node.kind.failure_kind() {
                return Some(kind);
            }
            current = node.parent;
        }
        None
    }

    /// Reports in the subtree of `id` (pre-order) matching `predicate`.
    pub fn find(&self, id: ReportId, predicate: impl Fn(&ReportNode) -> bool) -> Vec<ReportId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            if predicate(node) {
                result.push(current);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        result
    }

    /// Renders the subtree rooted at `id`.
    ///
    /// The report text is prefixed with `-`, each child is introduced by `  +` and further lines
    /// of a non-last child are prefixed with `  |`. Continuation lines of multi-line text stay
    /// aligned with the first line.
    pub fn render(&self, id: ReportId) -> String {
        self.render_lines(id).join("\n")
    }

    /// Renders every root.
    pub fn render_all(&self) -> String {
        self.roots.iter().map(|root| self.render(*root)).collect::<Vec<_>>().join("\n")
    }

    fn render_lines(&self, id: ReportId) -> Vec<String> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };

        let mut lines: Vec<String> = Vec::new();
        for (index, line) in node.kind.message().lines().enumerate() {
            if index == 0 {
                lines.push(format!("-{}", line));
            } else {
                lines.push(format!(" {}", line));
            }
        }

        for (child_index, child) in node.children.iter().enumerate() {
            let is_last = child_index + 1 == node.children.len();
            for (line_index, line) in self.render_lines(*child).into_iter().enumerate() {
                let prefix = match (line_index, is_last) {
                    (0, _) => "  +",
                    (_, false) => "  |",
                    (_, true) => "   ",
                };
                lines.push(format!("{}{}", prefix, line));
            }
        }
        lines
    }
}
