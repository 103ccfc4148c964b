//! # Collector
//!
//! Resource usage collection over the instances of a deployment.
//!
//! A collection run walks a [`TraversalContext`] position by position. Each
//! position is offered to an ordered [`HandlerChain`]; the first handler that
//! claims it records facts into the context's [`CollectedData`]. Positions no
//! handler understands are skipped.
//!
//! ## Core Concepts
//!
//! - **TraversalContext**: cursor over the positions of one run plus the fact map
//! - **Handler**: `can_handle` predicate and `handle` action for one kind of position
//! - **HandlerChain**: handlers in priority order
//! - **Engine**: drives the cursor and dispatches first-match-wins
//!
//! ## Example
//!
//! ```ignore
//! use collector::{Engine, FnHandler, HandlerChain, InstanceCursor, TraversalContext};
//!
//! type Ctx = InstanceCursor<&'static str, u32>;
//!
//! let chain = HandlerChain::new()
//!     .with(FnHandler::new(
//!         "even",
//!         |ctx: &Ctx| ctx.current().is_some_and(|n| n % 2 == 0),
//!         |ctx: &mut Ctx| -> anyhow::Result<()> {
//!             let n = *ctx.current().unwrap();
//!             ctx.collected_data_mut().insert(format!("even.{n}"), n);
//!             Ok(())
//!         },
//!     ));
//!
//! let mut ctx = InstanceCursor::new("deployment-1", vec![0, 1, 2]);
//! Engine::new(chain).run(&mut ctx)?;
//! assert_eq!(ctx.collected_data().len(), 2);
//! ```

pub mod context;
pub mod engine;
pub mod handler;
pub mod types;

// Re-export main types at crate root
pub use context::{InstanceCursor, TraversalContext};
pub use engine::{Engine, collect};
pub use handler::{BoxedHandler, FnHandler, Handler, HandlerChain};
pub use types::{CollectSummary, CollectedData};
