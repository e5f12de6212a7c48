//! Hash-consed vertex storage.
//!
//! Vertices are stored in a contiguous vector and referenced by index; a map
//! from canonical key to index guarantees that a state reachable through
//! several action sequences is represented by exactly one vertex.

use crate::vertex::{Vertex, VertexId};
use rlsearch_core::SearchState;
use rustc_hash::FxHashMap;

/// Arena of vertices, deduplicated by canonical state key.
///
/// No eviction: the cache grows until it is cleared wholesale.
#[derive(Debug)]
pub struct VertexCache<S: SearchState> {
    vertices: Vec<Vertex<S>>,
    index: FxHashMap<S::Key, VertexId>,
}

impl<S: SearchState> VertexCache<S> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Return the vertex for `state`'s key, registering a new one if needed.
    pub fn get_or_create(&mut self, state: S) -> VertexId {
        let key = state.key();
        if let Some(&id) = self.index.get(&key) {
            return id;
        }

        let id = VertexId(self.vertices.len());
        self.vertices.push(Vertex::new(state));
        self.index.insert(key, id);
        id
    }

    /// Look a vertex up by key without creating it.
    pub fn lookup(&self, key: &S::Key) -> Option<VertexId> {
        self.index.get(key).copied()
    }

    /// Get a reference to a vertex by ID.
    ///
    /// # Panics
    /// Panics if the VertexId comes from another cache or predates a `clear`.
    pub fn get(&self, id: VertexId) -> &Vertex<S> {
        &self.vertices[id.0]
    }

    /// Get a mutable reference to a vertex by ID.
    ///
    /// # Panics
    /// Panics if the VertexId comes from another cache or predates a `clear`.
    pub fn get_mut(&mut self, id: VertexId) -> &mut Vertex<S> {
        &mut self.vertices[id.0]
    }

    /// Drop every vertex.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.index.clear();
    }

    /// Number of distinct states in the cache.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterate over all vertices in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &Vertex<S>)> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId(i), v))
    }
}

impl<S: SearchState> Default for VertexCache<S> {
    fn default() -> Self {
        Self::new()
    }
}
