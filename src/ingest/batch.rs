//! Bounded fan-out over batch items
//!
//! Seeds a window of in-flight futures and refills it as items complete, so
//! at most `max_concurrent` items are being processed at any moment. Outcomes
//! are collected in arrival order; one item's outcome never short-circuits
//! the rest. Failures are values, handled by the caller.

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;

/// Run `task` over every item with at most `max_concurrent` in flight.
pub async fn for_each_bounded<I, T, F, Fut>(items: Vec<I>, max_concurrent: usize, task: F) -> Vec<T>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = T>,
{
    if items.is_empty() {
        return Vec::new();
    }

    debug!(
        "Processing {} items with max {} concurrent",
        items.len(),
        max_concurrent
    );

    let mut results = Vec::with_capacity(items.len());
    let mut pending = items.into_iter();
    let mut in_flight: FuturesUnordered<Fut> = FuturesUnordered::new();

    // Seed initial window
    for item in pending.by_ref().take(max_concurrent.max(1)) {
        in_flight.push(task(item));
    }

    // Collect results and refill to keep the window full
    while let Some(outcome) = in_flight.next().await {
        results.push(outcome);
        if let Some(next) = pending.next() {
            in_flight.push(task(next));
        }
    }

    results
}
