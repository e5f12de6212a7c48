use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A graph-structured search state.
///
/// States are immutable and identified by a canonical key: two states that
/// are logically equal must produce equal keys, even when they were reached
/// through different action sequences. The search space they span is a DAG;
/// producing an ancestor of a state as one of its successors violates the
/// contract.
pub trait SearchState: Clone {
    /// Canonical key (e.g. a canonical SMILES string or a packed grid position).
    type Key: Clone + Eq + Hash + Debug + Display;

    /// Successor states, lazily produced in a deterministic order.
    type Successors: IntoIterator<Item = Self>;

    /// Returns the canonical key for this state.
    fn key(&self) -> Self::Key;

    /// Returns the successor states. An empty sequence makes the state terminal.
    fn successors(&self) -> Self::Successors;
}
