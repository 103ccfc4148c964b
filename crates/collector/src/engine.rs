//! Dispatch engine - routes each traversal position to the first matching handler

use crate::context::TraversalContext;
use crate::handler::{BoxedHandler, HandlerChain};
use crate::types::CollectSummary;
use anyhow::Result;

/// Walks a context and dispatches every position through a handler chain
///
/// Positions no handler claims are skipped without error. A handler error
/// aborts the run and is returned as-is.
#[derive(Debug)]
pub struct Engine<C: ?Sized> {
    chain: HandlerChain<C>,
}

impl<C: TraversalContext + ?Sized> Engine<C> {
    /// Create an engine around an ordered handler chain
    pub fn new(chain: HandlerChain<C>) -> Self {
        Self { chain }
    }

    /// Create an engine from boxed handlers, first entry has highest priority
    pub fn from_handlers(handlers: Vec<BoxedHandler<C>>) -> Self {
        Self::new(handlers.into_iter().collect())
    }

    /// The handler chain in priority order
    pub fn chain(&self) -> &HandlerChain<C> {
        &self.chain
    }

    /// Run one collection pass over `ctx`
    ///
    /// Facts end up in `ctx.collected_data()`; the returned summary only
    /// counts positions.
    pub fn run(&self, ctx: &mut C) -> Result<CollectSummary> {
        let summary = self.collect_data(ctx)?;

        for (key, value) in ctx.collected_data() {
            log::info!("RESOURCE: {} -- {}", key, value);
        }

        Ok(summary)
    }

    fn collect_data(&self, ctx: &mut C) -> Result<CollectSummary> {
        let mut summary = CollectSummary::default();

        while ctx.has_instance() {
            let matched = self.dispatch(ctx)?;
            summary.add_position(matched);

            if !ctx.next_instance() {
                break;
            }
        }

        log::debug!(
            "Visited {} positions ({} handled, {} unmatched)",
            summary.visited,
            summary.handled,
            summary.unmatched
        );

        Ok(summary)
    }

    /// Hand the current position to the first handler that claims it
    fn dispatch(&self, ctx: &mut C) -> Result<bool> {
        let Some(handler) = self.chain.first_match(ctx) else {
            log::trace!("No handler claimed position, skipping");
            return Ok(false);
        };

        log::trace!("Dispatching position to handler '{}'", handler.name());
        handler.handle(ctx)?;
        Ok(true)
    }
}

impl<C: TraversalContext + ?Sized> From<HandlerChain<C>> for Engine<C> {
    fn from(chain: HandlerChain<C>) -> Self {
        Self::new(chain)
    }
}

/// Run a single pass with a one-off chain
pub fn collect<C>(ctx: &mut C, handlers: Vec<BoxedHandler<C>>) -> Result<CollectSummary>
where
    C: TraversalContext + ?Sized,
{
    Engine::from_handlers(handlers).run(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InstanceCursor;
    use crate::handler::{FnHandler, Handler};
    use crate::types::CollectedData;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Ctx = InstanceCursor<&'static str, u32>;

    /// Records every can_handle/handle call it receives
    struct Probe {
        name: &'static str,
        claims: fn(u32) -> bool,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Handler<Ctx> for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn can_handle(&self, ctx: &Ctx) -> bool {
            let n = *ctx.current().unwrap();
            self.log.borrow_mut().push(format!("{}?{}", self.name, n));
            (self.claims)(n)
        }

        fn handle(&self, ctx: &mut Ctx) -> Result<()> {
            let n = *ctx.current().unwrap();
            self.log.borrow_mut().push(format!("{}!{}", self.name, n));
            ctx.collected_data_mut()
                .insert(format!("instance.{n}"), self.name);
            Ok(())
        }
    }

    fn probe(
        name: &'static str,
        claims: fn(u32) -> bool,
        log: &Rc<RefCell<Vec<String>>>,
    ) -> BoxedHandler<Ctx> {
        Box::new(Probe {
            name,
            claims,
            log: Rc::clone(log),
        })
    }

    /// Context that counts how often the cursor is advanced
    struct CountingContext {
        remaining: usize,
        advances: usize,
        collected: CollectedData,
    }

    impl TraversalContext for CountingContext {
        fn has_instance(&self) -> bool {
            self.remaining > 0
        }

        fn next_instance(&mut self) -> bool {
            self.advances += 1;
            self.remaining = self.remaining.saturating_sub(1);
            self.remaining > 0
        }

        fn collected_data(&self) -> &CollectedData {
            &self.collected
        }

        fn collected_data_mut(&mut self) -> &mut CollectedData {
            &mut self.collected
        }
    }

    #[test]
    fn test_even_and_catch_all_chain() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let engine = Engine::from_handlers(vec![
            probe("h1", |n| n % 2 == 0, &log),
            probe("h2", |_| true, &log),
        ]);
        let mut ctx = InstanceCursor::new("deployment", vec![0, 1, 2]);

        let summary = engine.run(&mut ctx).unwrap();

        let data = ctx.collected_data();
        assert_eq!(data.len(), 3);
        assert_eq!(data.get("instance.0").unwrap(), "h1");
        assert_eq!(data.get("instance.1").unwrap(), "h2");
        assert_eq!(data.get("instance.2").unwrap(), "h1");
        assert_eq!(summary.handled, 3);
    }

    #[test]
    fn test_first_match_wins() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let engine = Engine::from_handlers(vec![
            probe("first", |_| true, &log),
            probe("second", |_| true, &log),
        ]);
        let mut ctx = InstanceCursor::new("deployment", vec![7]);

        engine.run(&mut ctx).unwrap();

        // The second handler is never even asked
        assert_eq!(*log.borrow(), vec!["first?7", "first!7"]);
    }

    #[test]
    fn test_can_handle_called_at_most_chain_length_per_position() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let engine = Engine::from_handlers(vec![
            probe("a", |_| false, &log),
            probe("b", |n| n == 1, &log),
            probe("c", |_| false, &log),
        ]);
        let mut ctx = InstanceCursor::new("deployment", vec![0, 1]);

        let summary = engine.run(&mut ctx).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["a?0", "b?0", "c?0", "a?1", "b?1", "b!1"]
        );
        assert_eq!(summary.visited, 2);
        assert_eq!(summary.handled, 1);
        assert_eq!(summary.unmatched, 1);
    }

    #[test]
    fn test_unmatched_positions_are_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let engine = Engine::from_handlers(vec![probe("never", |_| false, &log)]);
        let mut ctx = InstanceCursor::new("deployment", vec![1, 2, 3]);

        let summary = engine.run(&mut ctx).unwrap();

        assert!(ctx.collected_data().is_empty());
        assert_eq!(summary.unmatched, 3);
        assert!(!log.borrow().iter().any(|entry| entry.contains('!')));
    }

    #[test]
    fn test_terminates_after_n_advances() {
        let engine: Engine<CountingContext> = Engine::from_handlers(vec![Box::new(
            FnHandler::new(
                "count",
                |_: &CountingContext| true,
                |ctx: &mut CountingContext| -> Result<()> {
                    let seen = ctx.collected_data().len();
                    ctx.collected_data_mut().insert(format!("p{seen}"), seen);
                    Ok(())
                },
            ),
        )]);
        let mut ctx = CountingContext {
            remaining: 4,
            advances: 0,
            collected: CollectedData::new(),
        };

        let summary = engine.run(&mut ctx).unwrap();

        assert_eq!(ctx.advances, 4);
        assert_eq!(summary.visited, 4);
        assert_eq!(ctx.collected_data().len(), 4);
    }

    #[test]
    fn test_empty_context_visits_nothing() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let engine = Engine::from_handlers(vec![probe("any", |_| true, &log)]);
        let mut ctx: Ctx = InstanceCursor::new("deployment", Vec::new());

        let summary = engine.run(&mut ctx).unwrap();

        assert_eq!(summary, CollectSummary::default());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_handler_error_aborts_run() {
        let engine: Engine<Ctx> = Engine::from_handlers(vec![Box::new(FnHandler::new(
            "fails-on-one",
            |_: &Ctx| true,
            |ctx: &mut Ctx| -> Result<()> {
                let n = *ctx.current().unwrap();
                if n == 1 {
                    anyhow::bail!("cannot read usage for instance {n}");
                }
                ctx.collected_data_mut().insert(format!("instance.{n}"), n);
                Ok(())
            },
        ))]);
        let mut ctx = InstanceCursor::new("deployment", vec![0, 1, 2]);

        let err = engine.run(&mut ctx).unwrap_err();

        assert!(err.to_string().contains("instance 1"));
        assert_eq!(ctx.collected_data().len(), 1);
        assert_eq!(ctx.position(), Some(1));
    }

    #[test]
    fn test_collect_helper() {
        let mut ctx = InstanceCursor::new("deployment", vec![5]);
        let handlers: Vec<BoxedHandler<Ctx>> = vec![Box::new(FnHandler::new(
            "all",
            |_: &Ctx| true,
            |ctx: &mut Ctx| -> Result<()> {
                ctx.collected_data_mut().insert("seen", true);
                Ok(())
            },
        ))];

        let summary = collect(&mut ctx, handlers).unwrap();

        assert_eq!(summary.handled, 1);
        assert_eq!(ctx.collected_data().get("seen").unwrap(), true);
    }
}
