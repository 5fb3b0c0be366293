//! Errors reported by the fallible entry points.

use core::alloc::Layout;

/// Result type for fallible [`SmallFn`](crate::SmallFn) operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur when building, cloning or invoking a
/// [`SmallFn`](crate::SmallFn).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An empty box was invoked.
    #[error("called an empty SmallFn")]
    Empty,

    /// The global allocator could not provide room for a heap-stored callable.
    #[error(
        "failed to allocate {} bytes (align {}) for a heap-stored callable",
        .layout.size(),
        .layout.align()
    )]
    Alloc {
        /// Layout of the model that could not be allocated.
        layout: Layout,
    },
}

/// Diverges on an error produced by an infallible entry point.
///
/// Allocation failures go through `handle_alloc_error`, like `Box::new`.
pub(crate) fn fatal(err: Error) -> ! {
    match err {
        Error::Alloc { layout } => alloc::alloc::handle_alloc_error(layout),
        Error::Empty => panic!("{}", err),
    }
}
