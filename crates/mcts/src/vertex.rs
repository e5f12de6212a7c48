//! Search vertices.
//!
//! A vertex wraps one canonical state. Vertices live in the
//! [`VertexCache`](crate::VertexCache) arena and refer to their children by
//! index; they never point back at a parent, since in a DAG a vertex can
//! have several.

use rlsearch_core::{Info, Priors, SearchState};

/// Index into the vertex arena.
///
/// Two handles are equal exactly when they name the same vertex, which is
/// the identity of a canonical state within one cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexId(pub(crate) usize);

impl VertexId {
    /// Position of the vertex in its cache.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Statistics for a single vertex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexStats {
    /// Number of completed backpropagation passes through this vertex.
    pub visit_count: u32,

    /// Sum of values from all visits (for computing Q-value).
    pub value_sum: f64,
}

impl VertexStats {
    /// Mean value (Q-value) for this vertex.
    ///
    /// Returns 0.0 if the vertex has never been visited.
    pub fn mean_value(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f64
        }
    }
}

/// A vertex of the search DAG.
#[derive(Clone, Debug)]
pub struct Vertex<S: SearchState> {
    state: S,

    /// Visit statistics.
    pub stats: VertexStats,

    /// Children in successor order; `None` until expanded.
    children: Option<Vec<VertexId>>,

    /// Priors over `children`, aligned by position.
    priors: Option<Priors>,

    /// Value estimate obtained when the vertex was expanded, if the
    /// evaluator produced one.
    value_estimate: Option<f64>,

    /// Raw reward and metadata, fetched once for terminal vertices.
    terminal_reward: Option<(f64, Info)>,
}

impl<S: SearchState> Vertex<S> {
    /// Create a new unexpanded vertex.
    pub fn new(state: S) -> Self {
        Self {
            state,
            stats: VertexStats::default(),
            children: None,
            priors: None,
            value_estimate: None,
            terminal_reward: None,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// True once the children have been materialized.
    pub fn is_expanded(&self) -> bool {
        self.children.is_some()
    }

    /// True for expanded vertices without children.
    pub fn is_terminal(&self) -> bool {
        matches!(&self.children, Some(c) if c.is_empty())
    }

    /// Children in successor order (empty until expanded).
    pub fn children(&self) -> &[VertexId] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn priors(&self) -> Option<&Priors> {
        self.priors.as_ref()
    }

    pub fn value_estimate(&self) -> Option<f64> {
        self.value_estimate
    }

    pub(crate) fn terminal_reward(&self) -> Option<&(f64, Info)> {
        self.terminal_reward.as_ref()
    }

    pub(crate) fn set_terminal_reward(&mut self, raw: f64, info: Info) {
        self.terminal_reward = Some((raw, info));
    }

    pub(crate) fn mark_terminal(&mut self) {
        self.children = Some(Vec::new());
        self.priors = None;
    }

    pub(crate) fn set_expansion(
        &mut self,
        children: Vec<VertexId>,
        priors: Priors,
        value_estimate: Option<f64>,
    ) {
        debug_assert_eq!(children.len(), priors.len());
        self.children = Some(children);
        self.priors = Some(priors);
        self.value_estimate = value_estimate;
    }
}
