//! Traversal context
//!
//! A context wraps the scope a collection run starts from, exposes a cursor
//! over the resource-bearing positions derived from it, and owns the facts
//! handlers record along the way.

use crate::types::CollectedData;

/// Cursor and fact accumulator for one collection run
///
/// How positions are enumerated is up to the implementation. The cursor must
/// advance deterministically over a finite sequence, and once it reports
/// exhaustion it must stay exhausted.
pub trait TraversalContext {
    /// Whether the cursor currently points at a position
    fn has_instance(&self) -> bool;

    /// Advance the cursor
    ///
    /// Returns `true` if a new position is available, `false` once the
    /// sequence is exhausted. Calls after exhaustion keep returning `false`.
    fn next_instance(&mut self) -> bool;

    /// Facts recorded so far
    fn collected_data(&self) -> &CollectedData;

    /// Mutable access to the recorded facts
    fn collected_data_mut(&mut self) -> &mut CollectedData;
}

/// Cursor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    At(usize),
    Exhausted,
}

/// In-memory context over an ordered list of positions
///
/// `S` is the caller's scope (read-only here), `T` the position type. The
/// list is fixed at construction, so the walk order is the list order.
#[derive(Debug)]
pub struct InstanceCursor<S, T> {
    scope: S,
    instances: Vec<T>,
    cursor: Cursor,
    collected: CollectedData,
}

impl<S, T> InstanceCursor<S, T> {
    /// Create a context positioned at the first instance
    ///
    /// An empty list yields a context that is exhausted from the start.
    pub fn new(scope: S, instances: Vec<T>) -> Self {
        let cursor = if instances.is_empty() {
            Cursor::Exhausted
        } else {
            Cursor::At(0)
        };
        Self {
            scope,
            instances,
            cursor,
            collected: CollectedData::new(),
        }
    }

    /// The scope this run was started from
    pub fn scope(&self) -> &S {
        &self.scope
    }

    /// The position under the cursor, if any
    pub fn current(&self) -> Option<&T> {
        match self.cursor {
            Cursor::At(index) => self.instances.get(index),
            Cursor::Exhausted => None,
        }
    }

    /// Zero-based index of the current position
    pub fn position(&self) -> Option<usize> {
        match self.cursor {
            Cursor::At(index) => Some(index),
            Cursor::Exhausted => None,
        }
    }

    /// Total number of positions in this walk
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Check if the walk has no positions at all
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Consume the context, keeping only the recorded facts
    pub fn into_collected_data(self) -> CollectedData {
        self.collected
    }
}

impl<S, T> TraversalContext for InstanceCursor<S, T> {
    fn has_instance(&self) -> bool {
        matches!(self.cursor, Cursor::At(_))
    }

    fn next_instance(&mut self) -> bool {
        self.cursor = match self.cursor {
            Cursor::At(index) if index + 1 < self.instances.len() => Cursor::At(index + 1),
            _ => Cursor::Exhausted,
        };
        self.has_instance()
    }

    fn collected_data(&self) -> &CollectedData {
        &self.collected
    }

    fn collected_data_mut(&mut self) -> &mut CollectedData {
        &mut self.collected
    }
}
