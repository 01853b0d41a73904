//! Lifecycle port - exclusive resources held while the agent runs.

/// Exclusive lifecycle resource acquired at process start.
pub trait LifecycleGrant: Send + Sync {
    /// Give the resource back. Called once, on the terminal transition.
    fn release(&self);
}

/// Grant that holds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGrant;

impl LifecycleGrant for NoopGrant {
    fn release(&self) {}
}
