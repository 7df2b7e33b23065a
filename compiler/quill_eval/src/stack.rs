//! Stack safety for deep recursion.
//!
//! Recursive descent in the compiler and nested polling of boxed node
//! futures in the executor both grow the native stack with script depth.
//! [`ensure_sufficient_stack`] grows it on demand; [`StackSafe`] applies the
//! same check on every poll of a function body.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;

/// Ensure sufficient stack space is available before executing `f`.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Minimum stack space to keep available (128KB red zone).
    const RED_ZONE: usize = 128 * 1024;

    /// Stack space to allocate when growing (2MB).
    const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// A boxed future whose every poll runs under [`ensure_sufficient_stack`].
pub struct StackSafe<'a, T> {
    inner: BoxFuture<'a, T>,
}

impl<'a, T> StackSafe<'a, T> {
    pub fn new(inner: BoxFuture<'a, T>) -> Self {
        StackSafe { inner }
    }
}

impl<T> Future for StackSafe<'_, T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let inner = &mut self.get_mut().inner;
        ensure_sufficient_stack(|| inner.as_mut().poll(cx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[test]
    fn deep_sync_recursion() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }
        assert_eq!(depth(100_000), 100_000);
    }

    #[test]
    fn deep_async_recursion() {
        fn count(n: u64) -> BoxFuture<'static, u64> {
            StackSafe::new(
                async move {
                    if n == 0 {
                        0
                    } else {
                        count(n - 1).await + 1
                    }
                }
                .boxed(),
            )
            .boxed()
        }
        assert_eq!(futures::executor::block_on(count(20_000)), 20_000);
    }
}
