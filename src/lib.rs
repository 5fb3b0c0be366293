//! # SmallFn: Type-Erased Callables Without the Allocation
//!
//! [`SmallFn`] wraps any callable (a function item, a function pointer, a
//! closure, or a functor type) behind one fixed call signature. Small
//! callables are stored inline in a configurable space inside the box; larger
//! ones fall back to a heap allocation. Either way the box can be cloned,
//! moved, swapped, invoked and checked for emptiness without knowing what it
//! wraps.
//!
//! ## Quick Start
//!
//! The signature is spelled as a function pointer type:
//!
//! ```rust
//! use smallfn::SmallFn;
//!
//! fn answer() -> i32 {
//!     42
//! }
//!
//! let f: SmallFn<fn() -> i32> = SmallFn::new(answer);
//! assert_eq!(f.call(), 42);
//!
//! let add: SmallFn<fn(i32, i64) -> i64> = SmallFn::new(|a: i32, b: i64| i64::from(a) + b);
//! assert_eq!(add.call(100, 200), 300);
//! ```
//!
//! Closure parameters need type annotations: the box only knows the
//! signature through its type parameter.
//!
//! ## Functor Types
//!
//! A plain struct becomes callable by implementing [`Callable`] for its
//! signature:
//!
//! ```rust
//! use smallfn::{Callable, SmallFn};
//!
//! #[derive(Clone)]
//! struct Offset(i32);
//!
//! impl Callable<fn(i32) -> i32> for Offset {
//!     fn invoke(&self, (x,): (i32,)) -> i32 {
//!         x + self.0
//!     }
//! }
//!
//! let f: SmallFn<fn(i32) -> i32> = SmallFn::new(Offset(10));
//! assert_eq!(f.call(5), 15);
//! ```
//!
//! ## Storage
//!
//! A callable is stored inline when its size and alignment do not exceed
//! those of the space type; otherwise it is heap-allocated. The decision is
//! made once, when the callable is wrapped.
//!
//! ```rust
//! use smallfn::SmallFn;
//! use smallfn::space::S2;
//!
//! let small = [1u64];
//! let large = [1u64; 32];
//!
//! let inline: SmallFn<fn() -> u64, S2> = SmallFn::new(move || small.iter().sum::<u64>());
//! let heap: SmallFn<fn() -> u64, S2> = SmallFn::new(move || large.iter().sum::<u64>());
//!
//! assert!(inline.is_inline());
//! assert!(heap.is_heap());
//! assert_eq!(inline.call() + heap.call(), 33);
//! ```
//!
//! The default space is [`space::S8`], eight machine words.
//!
//! **Important**: Space alignment matters! If the space alignment is smaller
//! than the callable's required alignment, the callable will be
//! heap-allocated regardless of size.
//!
//! ## Moves, Clones and Swaps
//!
//! ```rust
//! use smallfn::SmallFn;
//!
//! let mut square: SmallFn<fn(i32) -> i32> = SmallFn::new(|x: i32| x * x);
//! let mut cube: SmallFn<fn(i32) -> i32> = SmallFn::new(|x: i32| x * x * x);
//!
//! square.swap(&mut cube);
//! assert_eq!(square.call(10), 1000);
//!
//! let copy = square.clone();
//! square.move_from(&mut cube);
//! assert!(cube.is_empty());
//! assert_eq!(square.call(10), 100);
//! assert_eq!(copy.call(10), 1000);
//! ```
//!
//! ## Empty Boxes
//!
//! [`SmallFn::empty`] and [`Default`] give a box that holds nothing, and
//! `SmallFn::empty()` is the way to spell an explicit empty value. Calling
//! it panics; [`SmallFn::try_invoke`] reports [`Error::Empty`] instead.
//!
//! ## Feature Flags
//!
//! - **`std`** (enabled by default)
//!   - Links to the standard library
//!   - Disable for `#![no_std]` environments: `default-features = false`
//!
//! - **`nightly`** (optional, requires nightly)
//!   - Uses the strict-provenance pointer APIs to address inline callables
//!
//! ## Threads
//!
//! `SmallFn` is neither `Send` nor `Sync`: the wrapped type is erased, so
//! nothing is known about its thread safety.

#![cfg_attr(feature = "nightly", feature(set_ptr_value))]
#![cfg_attr(not(feature = "std"), no_std)]
#![allow(stable_features)]
#![deny(missing_docs)]
#![deny(clippy::as_conversions)]

extern crate alloc;

mod error;
mod model;
pub mod signature;
mod smallfn;
pub mod space;
mod sptr;

pub use crate::error::{Error, Result};
pub use crate::signature::{Callable, Signature};
pub use crate::smallfn::SmallFn;
