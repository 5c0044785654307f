//! Scene-graph assets and asynchronous asset handles.
//!
//! Decoding files is someone else's job: an [`AssetSource`] hands out [`AssetHandle`]s that an
//! external loader resolves later on the same thread. Entities poll their handle every update
//! and stay in a loading state until it is ready.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use shared::{GeometryError, MeshData, MeshSoup, Transform};

/// One node of a loaded scene graph: a local transform, the meshes attached directly to it and
/// its child nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub meshes: Vec<MeshData>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshData) -> Self {
        self.meshes.push(mesh);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Number of meshes in this subtree.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len() + self.children.iter().map(SceneNode::mesh_count).sum::<usize>()
    }

    /// Every mesh in this subtree as a soup, in depth-first order, expressed in this node's
    /// local frame. Meshes on descendants carry their accumulated node transforms; meshes on
    /// this node are taken as-is.
    pub fn collect_soups(&self) -> Result<Vec<MeshSoup>, GeometryError> {
        let mut soups = Vec::new();
        self.collect_into(&Transform::identity(), &mut soups)?;
        Ok(soups)
    }

    fn collect_into(&self, frame: &Transform, out: &mut Vec<MeshSoup>) -> Result<(), GeometryError> {
        for mesh in &self.meshes {
            out.push(MeshSoup::from_mesh_transformed(mesh, frame)?);
        }
        for child in &self.children {
            child.collect_into(&frame.then(&child.transform), out)?;
        }
        Ok(())
    }
}

/// Load state behind an [`AssetHandle`].
#[derive(Debug)]
pub enum AssetState<T> {
    Pending,
    Ready(Rc<T>),
    Failed(String),
}

impl<T> Clone for AssetState<T> {
    fn clone(&self) -> Self {
        match self {
            AssetState::Pending => AssetState::Pending,
            AssetState::Ready(value) => AssetState::Ready(Rc::clone(value)),
            AssetState::Failed(reason) => AssetState::Failed(reason.clone()),
        }
    }
}

/// Shared, single-threaded slot for an asset that may not be loaded yet.
///
/// Clones observe the same slot. A resolved handle never changes again.
#[derive(Debug)]
pub struct AssetHandle<T> {
    key: Rc<str>,
    state: Rc<RefCell<AssetState<T>>>,
}

impl<T> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self {
            key: Rc::clone(&self.key),
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> AssetHandle<T> {
    pub fn pending(key: &str) -> Self {
        Self {
            key: Rc::from(key),
            state: Rc::new(RefCell::new(AssetState::Pending)),
        }
    }

    pub fn ready(key: &str, value: T) -> Self {
        let handle = Self::pending(key);
        handle.resolve(value);
        handle
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn poll(&self) -> AssetState<T> {
        self.state.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.state.borrow(), AssetState::Pending)
    }

    /// Store the loaded value. Ignored if the handle already resolved or failed.
    pub fn resolve(&self, value: T) {
        let mut state = self.state.borrow_mut();
        if matches!(*state, AssetState::Pending) {
            *state = AssetState::Ready(Rc::new(value));
        }
    }

    /// Mark the load as failed. Ignored if the handle already resolved or failed.
    pub fn fail(&self, reason: impl Into<String>) {
        let mut state = self.state.borrow_mut();
        if matches!(*state, AssetState::Pending) {
            *state = AssetState::Failed(reason.into());
        }
    }
}

/// Where entities get their scene graphs from.
pub trait AssetSource {
    fn request(&mut self, key: &str) -> AssetHandle<SceneNode>;
}

/// In-memory asset store.
///
/// Requests for known keys resolve immediately. Requests for unknown keys stay pending until
/// the key is inserted or failed.
#[derive(Debug, Default)]
pub struct MemoryAssets {
    nodes: HashMap<String, SceneNode>,
    waiting: HashMap<String, Vec<AssetHandle<SceneNode>>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, node: SceneNode) -> Self {
        self.insert(key, node);
        self
    }

    /// Add (or replace) an asset and resolve every handle waiting on it.
    pub fn insert(&mut self, key: &str, node: SceneNode) {
        if let Some(handles) = self.waiting.remove(key) {
            for handle in handles {
                handle.resolve(node.clone());
            }
        }
        self.nodes.insert(key.to_string(), node);
    }

    /// Fail every handle waiting on `key`.
    pub fn fail(&mut self, key: &str, reason: &str) {
        if let Some(handles) = self.waiting.remove(key) {
            for handle in handles {
                handle.fail(reason);
            }
        }
    }

    pub fn pending_requests(&self) -> usize {
        self.waiting.values().map(Vec::len).sum()
    }
}

impl AssetSource for MemoryAssets {
    fn request(&mut self, key: &str) -> AssetHandle<SceneNode> {
        match self.nodes.get(key) {
            Some(node) => AssetHandle::ready(key, node.clone()),
            None => {
                let handle = AssetHandle::pending(key);
                self.waiting
                    .entry(key.to_string())
                    .or_default()
                    .push(handle.clone());
                handle
            }
        }
    }
}
