//! Application layer - the agent context and the convergence loop.

pub mod context;
pub mod convergence_loop;

pub use context::AgentContext;
pub use convergence_loop::{Collaborators, ConvergenceLoop, LoopSettings};
