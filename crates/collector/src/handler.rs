//! Handler trait and the ordered handler chain
//!
//! A handler claims traversal positions it understands and records facts
//! about them. Handlers are consulted in chain order and the first one that
//! claims a position is the only one that handles it.

use anyhow::Result;
use std::fmt;

/// A rule in the handler chain
///
/// # Example
///
/// ```ignore
/// use collector::{Handler, InstanceCursor, TraversalContext};
///
/// struct EvenHandler;
///
/// impl Handler<InstanceCursor<(), u32>> for EvenHandler {
///     fn name(&self) -> &str { "even" }
///
///     fn can_handle(&self, ctx: &InstanceCursor<(), u32>) -> bool {
///         ctx.current().is_some_and(|n| n % 2 == 0)
///     }
///
///     fn handle(&self, ctx: &mut InstanceCursor<(), u32>) -> anyhow::Result<()> {
///         let n = *ctx.current().unwrap();
///         ctx.collected_data_mut().insert(format!("even.{n}"), n);
///         Ok(())
///     }
/// }
/// ```
pub trait Handler<C: ?Sized> {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Whether this handler claims the current position
    ///
    /// Must not have side effects.
    fn can_handle(&self, ctx: &C) -> bool;

    /// Record facts about the current position
    ///
    /// Must not advance the cursor.
    fn handle(&self, ctx: &mut C) -> Result<()>;
}

/// A boxed handler for type-erased storage
pub type BoxedHandler<C> = Box<dyn Handler<C>>;

/// Ordered list of handlers; construction order is priority order
pub struct HandlerChain<C: ?Sized> {
    handlers: Vec<BoxedHandler<C>>,
}

impl<C: ?Sized> HandlerChain<C> {
    /// Create an empty chain
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Append a handler at the lowest priority
    pub fn push(&mut self, handler: BoxedHandler<C>) {
        self.handlers.push(handler);
    }

    /// Builder-style [`push`](Self::push)
    pub fn with(mut self, handler: impl Handler<C> + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// The first handler that claims the current position
    pub fn first_match(&self, ctx: &C) -> Option<&dyn Handler<C>> {
        self.handlers
            .iter()
            .find(|h| h.can_handle(ctx))
            .map(|h| h.as_ref())
    }

    /// Number of handlers in the chain
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the chain has no handlers
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handler names in priority order
    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }
}

impl<C: ?Sized> Default for HandlerChain<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized> FromIterator<BoxedHandler<C>> for HandlerChain<C> {
    fn from_iter<I: IntoIterator<Item = BoxedHandler<C>>>(iter: I) -> Self {
        Self {
            handlers: iter.into_iter().collect(),
        }
    }
}

impl<C: ?Sized> fmt::Debug for HandlerChain<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("handlers", &self.names())
            .finish()
    }
}

/// Handler built from a predicate and an action
pub struct FnHandler<P, H> {
    name: String,
    predicate: P,
    action: H,
}

impl<P, H> FnHandler<P, H> {
    /// Create a handler from closures
    pub fn new(name: impl Into<String>, predicate: P, action: H) -> Self {
        Self {
            name: name.into(),
            predicate,
            action,
        }
    }
}

impl<C, P, H> Handler<C> for FnHandler<P, H>
where
    C: ?Sized,
    P: Fn(&C) -> bool,
    H: Fn(&mut C) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle(&self, ctx: &C) -> bool {
        (self.predicate)(ctx)
    }

    fn handle(&self, ctx: &mut C) -> Result<()> {
        (self.action)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &'static str, claims: bool) -> BoxedHandler<u32> {
        Box::new(FnHandler::new(
            name,
            move |_: &u32| claims,
            |_: &mut u32| -> Result<()> { Ok(()) },
        ))
    }

    #[test]
    fn test_first_match_respects_order() {
        let chain: HandlerChain<u32> = [named("a", false), named("b", true), named("c", true)]
            .into_iter()
            .collect();

        let found = chain.first_match(&0).map(|h| h.name().to_string());
        assert_eq!(found.as_deref(), Some("b"));
    }

    #[test]
    fn test_no_match() {
        let chain: HandlerChain<u32> = [named("a", false)].into_iter().collect();
        assert!(chain.first_match(&0).is_none());
    }

    #[test]
    fn test_names_in_priority_order() {
        let mut chain = HandlerChain::new();
        chain.push(named("first", true));
        chain.push(named("second", true));
        assert_eq!(chain.names(), vec!["first", "second"]);
        assert_eq!(chain.len(), 2);
    }
}
