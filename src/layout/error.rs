use thiserror::Error;

use super::types::{Axis, BoxId};

/// A box that could not be ordered because it sits on a dependency cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnresolvedBox {
    pub index: usize,
    pub id: Option<BoxId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error(
        "circular dependencies cannot exist in a relative layout: {axis} rules leave {} unresolved ({})",
        .boxes.len(),
        describe_boxes(.boxes)
    )]
    CircularDependency {
        axis: Axis,
        boxes: Vec<UnresolvedBox>,
    },
    #[error("child index {index} is out of range for a container with {count} children")]
    ChildOutOfRange { index: usize, count: usize },
}

fn describe_boxes(boxes: &[UnresolvedBox]) -> String {
    boxes
        .iter()
        .map(|unresolved| match unresolved.id {
            Some(id) => format!("child {} ({id})", unresolved.index),
            None => format!("child {}", unresolved.index),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
