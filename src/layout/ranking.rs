use std::collections::HashMap;

use tracing::trace;

use super::error::{LayoutError, UnresolvedBox};
use super::types::{Axis, BoxId, RuleTable};

#[derive(Debug, Default)]
struct Node {
    child: usize,
    id: Option<BoxId>,
    rules: RuleTable,
    // nodes that cannot be placed before this one
    dependents: Vec<usize>,
    // anchor ids this node still waits on
    dependencies: Vec<BoxId>,
}

impl Node {
    fn reset(&mut self, child: usize, id: Option<BoxId>, rules: &RuleTable) {
        self.child = child;
        self.id = id;
        self.rules = *rules;
        self.dependents.clear();
        self.dependencies.clear();
    }
}

/// Sibling dependency graph. Nodes wrap children by index; released nodes go
/// to a free list and are reused by the next `add`.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    pool: Vec<Node>,
    keyed: HashMap<BoxId, usize>,
    roots: Vec<usize>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.pool.append(&mut self.nodes);
        self.keyed.clear();
        self.roots.clear();
    }

    /// Registers a child. A later child with the same id shadows an earlier
    /// one as an anchor.
    pub fn add(&mut self, child: usize, id: Option<BoxId>, rules: &RuleTable) {
        let mut node = self.pool.pop().unwrap_or_default();
        node.reset(child, id, rules);
        let slot = self.nodes.len();
        if let Some(id) = id {
            self.keyed.insert(id, slot);
        }
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child index registered under `id`.
    pub fn lookup(&self, id: BoxId) -> Option<usize> {
        self.keyed.get(&id).map(|slot| self.nodes[*slot].child)
    }

    /// Orders children so every anchor along `axis` comes before the boxes
    /// that reference it.
    pub fn sort(&mut self, axis: Axis) -> Result<Vec<usize>, LayoutError> {
        self.find_roots(axis);

        let mut sorted = Vec::with_capacity(self.nodes.len());
        while let Some(slot) = self.roots.pop() {
            sorted.push(self.nodes[slot].child);
            let Some(key) = self.nodes[slot].id else {
                continue;
            };
            let dependents = std::mem::take(&mut self.nodes[slot].dependents);
            for &dependent in &dependents {
                let dependencies = &mut self.nodes[dependent].dependencies;
                dependencies.retain(|id| *id != key);
                if dependencies.is_empty() {
                    self.roots.push(dependent);
                }
            }
            self.nodes[slot].dependents = dependents;
        }

        if sorted.len() < self.nodes.len() {
            let boxes = self
                .nodes
                .iter()
                .filter(|node| !node.dependencies.is_empty())
                .map(|node| UnresolvedBox {
                    index: node.child,
                    id: node.id,
                })
                .collect();
            return Err(LayoutError::CircularDependency { axis, boxes });
        }

        trace!(%axis, order = ?sorted, "sorted children");
        Ok(sorted)
    }

    // Edges are rebuilt from scratch on every call: the same nodes are sorted
    // once per axis.
    fn find_roots(&mut self, axis: Axis) {
        for node in &mut self.nodes {
            node.dependents.clear();
            node.dependencies.clear();
        }

        for slot in 0..self.nodes.len() {
            for rule in axis.rules() {
                let Some(anchor) = self.nodes[slot].rules.get(*rule).anchor() else {
                    continue;
                };
                let Some(&dependency) = self.keyed.get(&anchor) else {
                    continue;
                };
                if dependency == slot {
                    continue;
                }
                if !self.nodes[dependency].dependents.contains(&slot) {
                    self.nodes[dependency].dependents.push(slot);
                }
                if !self.nodes[slot].dependencies.contains(&anchor) {
                    self.nodes[slot].dependencies.push(anchor);
                }
            }
        }

        self.roots.clear();
        for (slot, node) in self.nodes.iter().enumerate() {
            if node.dependencies.is_empty() {
                self.roots.push(slot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::{Rule, Subject};

    fn table(rules: &[(Rule, u32)]) -> RuleTable {
        let mut table = RuleTable::new();
        for (rule, id) in rules {
            table.set(*rule, Subject::Anchor(BoxId(*id)));
        }
        table
    }

    fn position(order: &[usize], child: usize) -> usize {
        order.iter().position(|c| *c == child).unwrap()
    }

    #[test]
    fn anchors_come_before_dependents() {
        let mut graph = DependencyGraph::new();
        // child 0 (#1) right of #2, child 1 (#2) right of #3, child 2 (#3) free
        graph.add(0, Some(BoxId(1)), &table(&[(Rule::RightOf, 2)]));
        graph.add(1, Some(BoxId(2)), &table(&[(Rule::RightOf, 3)]));
        graph.add(2, Some(BoxId(3)), &RuleTable::new());
        graph.add(3, None, &table(&[(Rule::AlignLeft, 1), (Rule::LeftOf, 3)]));

        let order = graph.sort(Axis::Horizontal).unwrap();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
        assert!(position(&order, 2) < position(&order, 1));
        assert!(position(&order, 1) < position(&order, 0));
        assert!(position(&order, 0) < position(&order, 3));
        assert!(position(&order, 2) < position(&order, 3));
    }

    #[test]
    fn axes_are_sorted_independently() {
        let mut graph = DependencyGraph::new();
        graph.add(0, Some(BoxId(1)), &table(&[(Rule::Below, 2)]));
        graph.add(1, Some(BoxId(2)), &table(&[(Rule::RightOf, 1)]));

        let horizontal = graph.sort(Axis::Horizontal).unwrap();
        assert_eq!(horizontal, vec![0, 1]);
        let vertical = graph.sort(Axis::Vertical).unwrap();
        assert_eq!(vertical, vec![1, 0]);
    }

    #[test]
    fn cycle_is_fatal() {
        let mut graph = DependencyGraph::new();
        graph.add(0, Some(BoxId(1)), &table(&[(Rule::LeftOf, 2)]));
        graph.add(1, Some(BoxId(2)), &table(&[(Rule::LeftOf, 1)]));
        graph.add(2, Some(BoxId(3)), &RuleTable::new());

        let err = graph.sort(Axis::Horizontal).unwrap_err();
        match err {
            LayoutError::CircularDependency { axis, boxes } => {
                assert_eq!(axis, Axis::Horizontal);
                let indices: Vec<usize> = boxes.iter().map(|b| b.index).collect();
                assert_eq!(indices, vec![0, 1]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // the vertical axis has no edges at all
        assert_eq!(graph.sort(Axis::Vertical).unwrap().len(), 3);
    }

    #[test]
    fn self_and_unknown_references_are_ignored() {
        let mut graph = DependencyGraph::new();
        graph.add(0, Some(BoxId(1)), &table(&[(Rule::LeftOf, 1), (Rule::AlignTop, 99)]));
        graph.add(1, Some(BoxId(2)), &table(&[(Rule::Above, 42)]));

        assert_eq!(graph.sort(Axis::Horizontal).unwrap().len(), 2);
        assert_eq!(graph.sort(Axis::Vertical).unwrap().len(), 2);
    }

    #[test]
    fn duplicate_rules_to_one_anchor_count_once() {
        let mut graph = DependencyGraph::new();
        graph.add(0, Some(BoxId(1)), &RuleTable::new());
        graph.add(1, None, &table(&[(Rule::RightOf, 1), (Rule::AlignRight, 1)]));

        assert_eq!(graph.sort(Axis::Horizontal).unwrap(), vec![0, 1]);
    }

    #[test]
    fn last_child_with_an_id_owns_it() {
        let mut graph = DependencyGraph::new();
        graph.add(0, Some(BoxId(7)), &RuleTable::new());
        graph.add(1, Some(BoxId(7)), &RuleTable::new());
        graph.add(2, Some(BoxId(8)), &table(&[(Rule::RightOf, 7)]));

        assert_eq!(graph.lookup(BoxId(7)), Some(1));
        // only the shadowing child gates its dependent
        assert_eq!(graph.sort(Axis::Horizontal).unwrap(), vec![1, 2, 0]);
    }

    #[test]
    fn clear_recycles_nodes() {
        let mut graph = DependencyGraph::new();
        graph.add(0, Some(BoxId(1)), &RuleTable::new());
        graph.add(1, Some(BoxId(2)), &table(&[(Rule::Below, 1)]));
        graph.clear();
        graph.clear();
        assert!(graph.is_empty());
        assert_eq!(graph.lookup(BoxId(1)), None);

        graph.add(5, Some(BoxId(9)), &RuleTable::new());
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.lookup(BoxId(9)), Some(5));
        assert_eq!(graph.sort(Axis::Vertical).unwrap(), vec![5]);
    }
}
