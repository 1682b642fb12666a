//! Stack growth for recursive expression walks.
//!
//! Checking and evaluating recurse once per expression level, and nothing
//! bounds how deep a consumer nests `not`, `and` or member paths.

/// Run `f` on a fresh stack segment when less than 128 KiB remains.
#[cfg(not(target_arch = "wasm32"))]
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    const HEADROOM: usize = 128 * 1024;
    const SEGMENT: usize = 2 * 1024 * 1024;
    stacker::maybe_grow(HEADROOM, SEGMENT, f)
}

#[cfg(target_arch = "wasm32")]
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
