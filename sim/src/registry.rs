use std::collections::HashMap;

use shared::BodyTag;

use crate::physics::BodyId;

/// Semantic tag of every body the physics context created.
///
/// Insert-only: removing a body leaves its entry behind, and ids are never reused, so a stale
/// id still answers with the tag it had.
#[derive(Debug, Default)]
pub struct CollisionFilterRegistry {
    tags: HashMap<BodyId, BodyTag>,
}

impl CollisionFilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a body. Registering the same id twice keeps the last tag.
    pub fn register(&mut self, body: BodyId, tag: BodyTag) {
        if let Some(previous) = self.tags.insert(body, tag) {
            if previous != tag {
                log::debug!("body {body} re-tagged {previous} -> {tag}");
            }
        }
    }

    pub fn lookup(&self, body: BodyId) -> Option<BodyTag> {
        self.tags.get(&body).copied()
    }

    pub fn is(&self, body: BodyId, tag: BodyTag) -> bool {
        self.lookup(body) == Some(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
