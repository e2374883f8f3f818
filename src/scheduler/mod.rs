//! Scheduler Component
//!
//! [`ThreadManager`](api::ThreadManager) owns the scheduling loop. It runs
//! on its own thread, independent of the workers, so a pipeline blocked in
//! its handler never stalls the others or the management calls.
//!
//! ```text
//!            every sleep_time
//! scheduler ───────────────▶ pool.execute(PipelineRunner) ──▶ worker
//!     │                             │
//!     └── skip if still running ◀───┴── Exhausted: retry next cycle
//! ```

pub mod api;

mod config;
mod manager;
