//! Renderer boundary.
//!
//! The simulation only ever attaches scene graphs, detaches them and moves them. Anything that
//! draws implements [`VisualSink`]; [`HeadlessVisuals`] records the calls instead.

use std::collections::BTreeMap;

use shared::Transform;

use crate::asset::SceneNode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VisualId(pub u64);

pub trait VisualSink {
    /// Show `node` (and its subtree) under `parent`, or at the top level when `None`.
    fn attach(&mut self, node: &SceneNode, parent: Option<VisualId>) -> VisualId;

    /// Stop showing a visual and everything attached under it.
    fn detach(&mut self, id: VisualId);

    /// Move a visual. The transform is relative to its parent.
    fn set_transform(&mut self, id: VisualId, transform: Transform);
}

#[derive(Clone, Debug, PartialEq)]
pub struct VisualRecord {
    pub name: String,
    pub parent: Option<VisualId>,
    pub transform: Transform,
}

/// A visual sink that keeps a flat table of what would be on screen.
#[derive(Debug, Default)]
pub struct HeadlessVisuals {
    next: u64,
    nodes: BTreeMap<VisualId, VisualRecord>,
}

impl HeadlessVisuals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: VisualId) -> Option<&VisualRecord> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: VisualId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children_of(&self, parent: VisualId) -> Vec<VisualId> {
        self.nodes
            .iter()
            .filter(|(_, record)| record.parent == Some(parent))
            .map(|(id, _)| *id)
            .collect()
    }
}

impl VisualSink for HeadlessVisuals {
    fn attach(&mut self, node: &SceneNode, parent: Option<VisualId>) -> VisualId {
        let id = VisualId(self.next);
        self.next += 1;
        self.nodes.insert(
            id,
            VisualRecord {
                name: node.name.clone(),
                parent,
                transform: node.transform,
            },
        );
        id
    }

    fn detach(&mut self, id: VisualId) {
        let mut doomed = vec![id];
        while let Some(next) = doomed.pop() {
            if self.nodes.remove(&next).is_some() {
                doomed.extend(self.children_of(next));
            }
        }
    }

    fn set_transform(&mut self, id: VisualId, transform: Transform) {
        if let Some(record) = self.nodes.get_mut(&id) {
            record.transform = transform;
        }
    }
}
