//! Scoped fan-out helpers.
//!
//! Uses `std::thread::scope`; every task is joined before the call returns.

/// Run `f` on every element of `items`, one scoped thread per element, and
/// collect the results in element order.
///
/// Each task gets exclusive access to its own element plus a per-task
/// `context` value, so tasks share nothing mutable. A single element runs
/// inline.
///
/// A panicking task is re-raised on the calling thread after the join.
pub fn fan_out_mut<T, C, R, F>(items: &mut [T], contexts: Vec<C>, f: F) -> Vec<R>
where
    T: Send,
    C: Send,
    R: Send,
    F: Fn(&mut T, C) -> R + Sync,
{
    assert_eq!(
        items.len(),
        contexts.len(),
        "fan_out_mut needs one context per item"
    );

    if items.len() <= 1 {
        return items
            .iter_mut()
            .zip(contexts)
            .map(|(item, ctx)| f(item, ctx))
            .collect();
    }

    let f = &f;
    std::thread::scope(|s| {
        let handles: Vec<_> = items
            .iter_mut()
            .zip(contexts)
            .map(|(item, ctx)| s.spawn(move || f(item, ctx)))
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(r) => r,
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    })
}

/// Number of worker threads the host offers (at least 1).
pub fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
