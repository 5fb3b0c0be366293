//! Ready-made inline spaces.
//!
//! A space is any type whose size and alignment bound what a
//! [`SmallFn`](crate::SmallFn) may store inline. The space value itself is
//! never constructed or dropped; only its layout matters.
//!
//! ```
//! use smallfn::SmallFn;
//! use smallfn::space::S2;
//!
//! let tiny: SmallFn<fn() -> usize, S2> = SmallFn::new(|| 7);
//! assert!(tiny.is_inline());
//! ```

/// Space for one machine word.
pub type S1 = [usize; 1];
/// Space for two machine words.
pub type S2 = [usize; 2];
/// Space for four machine words.
pub type S4 = [usize; 4];
/// Space for eight machine words, 64 bytes on 64-bit targets. The default.
pub type S8 = [usize; 8];
/// Space for sixteen machine words.
pub type S16 = [usize; 16];
/// Space for thirty-two machine words.
pub type S32 = [usize; 32];
/// Space for sixty-four machine words.
pub type S64 = [usize; 64];
