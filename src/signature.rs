//! Call signatures and the callables that satisfy them.
//!
//! A signature is spelled as a function pointer type: `fn(i32, i64) -> i64`
//! takes an `i32` and an `i64` and returns an `i64`. Signatures of up to
//! eight arguments are supported.
//!
//! Arguments are passed around as a tuple, so `fn(i32, i64) -> i64` has
//! `Args = (i32, i64)`. Signatures with borrowed arguments must name the
//! lifetime explicitly (`fn(&'a str) -> usize`); higher-ranked function
//! pointer types such as `for<'a> fn(&'a str)` are not signatures.
//!
//! Closures, function items and function pointers get [`Callable`] through
//! the `Fn` traits. A functor type (a struct carrying its own state)
//! implements [`Callable`] directly for the signature it answers to.

/// A fixed call signature.
pub trait Signature {
    /// The arguments, as a tuple.
    type Args;
    /// The return type.
    type Output;
}

/// Anything that can be called with the signature `Sig`.
///
/// Implemented for every `F: Fn(A1, ..., An) -> R` when `Sig` is
/// `fn(A1, ..., An) -> R`.
pub trait Callable<Sig: Signature> {
    /// Calls `self` with an argument tuple.
    fn invoke(&self, args: Sig::Args) -> Sig::Output;
}

macro_rules! signature {
    ($($arg:ident),*) => {
        impl<R, $($arg),*> Signature for fn($($arg),*) -> R {
            type Args = ($($arg,)*);
            type Output = R;
        }

        impl<F, R, $($arg),*> Callable<fn($($arg),*) -> R> for F
        where
            F: Fn($($arg),*) -> R,
        {
            #[inline]
            #[allow(non_snake_case)]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> R {
                self($($arg),*)
            }
        }
    };
}

signature!();
signature!(A1);
signature!(A1, A2);
signature!(A1, A2, A3);
signature!(A1, A2, A3, A4);
signature!(A1, A2, A3, A4, A5);
signature!(A1, A2, A3, A4, A5, A6);
signature!(A1, A2, A3, A4, A5, A6, A7);
signature!(A1, A2, A3, A4, A5, A6, A7, A8);

#[cfg(test)]
mod tests {
    use super::Callable;

    fn run<Sig: super::Signature, F: Callable<Sig>>(f: &F, args: Sig::Args) -> Sig::Output {
        f.invoke(args)
    }

    #[test]
    fn test_arities() {
        assert_eq!(run::<fn() -> u8, _>(&|| 1u8, ()), 1);
        assert_eq!(run::<fn(u8) -> u8, _>(&|a: u8| a + 1, (1,)), 2);
        assert_eq!(
            run::<fn(u8, u16, u32) -> u64, _>(&|a: u8, b: u16, c: u32| {
                u64::from(a) + u64::from(b) + u64::from(c)
            }, (1, 2, 3)),
            6
        );
    }

    #[test]
    fn test_fn_item() {
        fn square(x: i32) -> i32 {
            x * x
        }
        assert_eq!(run::<fn(i32) -> i32, _>(&square, (12,)), 144);
    }
}
