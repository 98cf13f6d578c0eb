//! Counting admission gate for upstream work.
//!
//! A unit takes one of `limit` slots before issuing any upstream request and
//! gives it back when it returns, whatever the outcome. Units of a batch are
//! polled together on the calling task, so no unit needs to be `Send`.

use std::future::Future;

use futures::future::join_all;
use tokio::sync::Semaphore;

#[derive(Debug)]
pub struct BoundedExecutor {
    gate: Semaphore,
    limit: usize,
}

impl BoundedExecutor {
    /// A gate with `limit` slots. A zero limit is raised to one.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            gate: Semaphore::new(limit),
            limit,
        }
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Slots currently held.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.limit - self.gate.available_permits()
    }

    /// Run one unit while holding a slot.
    pub async fn run<Fut: Future>(&self, unit: Fut) -> Fut::Output {
        // The gate is never closed, so the permit is always `Ok`.
        let _slot = self.gate.acquire().await;
        unit.await
    }

    /// Run every unit exactly once, at most `limit` at a time, and return
    /// their outputs in input order.
    pub async fn run_all<I, F, Fut>(&self, units: I, work: F) -> Vec<Fut::Output>
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut,
        Fut: Future,
    {
        join_all(units.into_iter().map(|unit| self.run(work(unit)))).await
    }
}
