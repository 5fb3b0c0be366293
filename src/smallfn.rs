use core::cell::UnsafeCell;
use core::fmt;
use core::mem::{self, MaybeUninit};
use core::ptr::{self, NonNull};

use alloc::boxed::Box;

use crate::error::{self, Error, Result};
use crate::model::{self, Erased, Model};
use crate::signature::{Callable, Signature};
use crate::space::S8;
use crate::sptr;

/// A type-erased callable with the fixed signature `Sig`, stored inline in
/// `Space` when it fits and on the heap otherwise.
///
/// The storage mode is decided once, when the callable is wrapped, and a box
/// never changes mode afterwards. Clones get their own deep copy of the
/// callable; moves hand it over and leave the source empty.
pub struct SmallFn<Sig: Signature, Space = S8> {
    space: MaybeUninit<UnsafeCell<Space>>,
    // heap: owning pointer; inline: only the metadata is meaningful
    ptr: Option<NonNull<dyn Model<Sig>>>,
    inline: bool,
}

impl<Sig: Signature, Space> SmallFn<Sig, Space> {
    /// Creates a box that holds nothing.
    ///
    /// This is the explicit empty value: it needs no callable type.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::SmallFn;
    ///
    /// let f: SmallFn<fn() -> i32> = SmallFn::empty();
    /// assert!(f.is_empty());
    /// ```
    pub const fn empty() -> Self {
        SmallFn {
            space: MaybeUninit::uninit(),
            ptr: None,
            inline: false,
        }
    }

    /// Wraps `f` if present, otherwise creates an empty box.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::SmallFn;
    ///
    /// fn answer() -> i32 {
    ///     42
    /// }
    ///
    /// let some: SmallFn<fn() -> i32> = SmallFn::from_option(Some(answer));
    /// assert_eq!(some.call(), 42);
    ///
    /// let none: SmallFn<fn() -> i32> = SmallFn::from_option(None::<fn() -> i32>);
    /// assert!(none.is_empty());
    /// ```
    ///
    /// A bare `None` has no callable type to infer, so use
    /// [`empty`](Self::empty) when there is nothing to wrap.
    pub fn from_option<F>(f: Option<F>) -> Self
    where
        F: Callable<Sig> + Clone + 'static,
    {
        match f {
            Some(f) => Self::new(f),
            None => Self::empty(),
        }
    }

    /// Adopts a callable that already lives on the heap.
    ///
    /// The allocation is reused as is, so the box is always in heap mode and
    /// the callable keeps its address for as long as the box (or whatever
    /// it is moved or swapped into) owns it.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::SmallFn;
    ///
    /// let double = |x: u32| x * 2;
    /// let f: SmallFn<fn(u32) -> u32> = SmallFn::from_box(Box::new(double));
    /// assert!(f.is_heap());
    /// assert_eq!(f.call(21), 42);
    /// ```
    pub fn from_box<F>(boxed: Box<F>) -> Self
    where
        F: Callable<Sig> + Clone + 'static,
    {
        // `Erased` is transparent, so the layout the box was allocated with
        // is the layout `model::release` frees with.
        let raw = Box::into_raw(boxed).cast::<Erased<F>>();
        let slot = unsafe { NonNull::new_unchecked(raw) };
        let model: NonNull<dyn Model<Sig>> = slot;
        SmallFn {
            space: MaybeUninit::uninit(),
            ptr: Some(model),
            inline: false,
        }
    }

    /// Returns true if a callable of type `F` would be stored inline.
    ///
    /// The answer depends only on the types involved: `F` fits when its size
    /// and alignment do not exceed those of `Space`.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::SmallFn;
    /// use smallfn::space::S1;
    ///
    /// assert!(SmallFn::<fn() -> u64, S1>::stores_inline::<fn() -> u64>());
    /// assert!(!SmallFn::<fn() -> u64, S1>::stores_inline::<[u64; 4]>());
    /// ```
    pub const fn stores_inline<F>() -> bool {
        // Moves in Rust are bitwise copies and cannot fail, so layout is the
        // only criterion.
        fits::<Space>(mem::size_of::<Erased<F>>(), mem::align_of::<Erased<F>>())
    }

    /// Wraps `f`, inline if it fits `Space` and on the heap otherwise.
    ///
    /// Aborts through `handle_alloc_error` if a heap allocation fails, like
    /// `Box::new`. Closure parameters need type annotations, since the
    /// signature is only known through `Sig`.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::SmallFn;
    ///
    /// let square: SmallFn<fn(i32) -> i32> = SmallFn::new(|x: i32| x * x);
    /// assert!(square.is_inline());
    /// assert_eq!(square.call(12), 144);
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        F: Callable<Sig> + Clone + 'static,
    {
        Self::try_new(f).unwrap_or_else(|err| error::fatal(err))
    }

    /// Wraps `f`, returning [`Error::Alloc`] if a heap allocation fails.
    pub fn try_new<F>(f: F) -> Result<Self>
    where
        F: Callable<Sig> + Clone + 'static,
    {
        let mut result = Self::empty();

        if Self::stores_inline::<F>() {
            unsafe { result.space_ptr().cast::<Erased<F>>().write(Erased(f)) };
            // only the vtable of this pointer is ever used
            let meta: NonNull<dyn Model<Sig>> = NonNull::<Erased<F>>::dangling();
            result.ptr = Some(meta);
            result.inline = true;
        } else {
            tracing::trace!(
                size = mem::size_of::<Erased<F>>(),
                align = mem::align_of::<Erased<F>>(),
                space_size = mem::size_of::<Space>(),
                space_align = mem::align_of::<Space>(),
                "callable does not fit inline, storing on heap"
            );
            let slot = model::allocate::<Erased<F>>()?;
            unsafe { slot.as_ptr().write(Erased(f)) };
            let model: NonNull<dyn Model<Sig>> = slot;
            result.ptr = Some(model);
        }

        Ok(result)
    }

    /// Returns true if the box holds no callable.
    pub fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    /// Returns true if the callable is stored in the inline space.
    pub fn is_inline(&self) -> bool {
        self.inline
    }

    /// Returns true if the callable is heap-allocated.
    pub fn is_heap(&self) -> bool {
        !self.inline && self.ptr.is_some()
    }

    /// Calls the wrapped callable with an argument tuple.
    ///
    /// # Panics
    ///
    /// Panics if the box is empty. Use [`try_invoke`](Self::try_invoke) to
    /// get an error instead.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::SmallFn;
    ///
    /// let add: SmallFn<fn(i32, i32) -> i32> = SmallFn::new(|a: i32, b: i32| a + b);
    /// assert_eq!(add.invoke((100, 200)), 300);
    /// ```
    pub fn invoke(&self, args: Sig::Args) -> Sig::Output {
        match self.model() {
            Some(model) => model.invoke(args),
            None => error::fatal(Error::Empty),
        }
    }

    /// Calls the wrapped callable, or returns [`Error::Empty`] if there is
    /// none.
    pub fn try_invoke(&self, args: Sig::Args) -> Result<Sig::Output> {
        self.model()
            .map(|model| model.invoke(args))
            .ok_or(Error::Empty)
    }

    /// Moves the callable out into a new box, leaving `self` empty.
    ///
    /// The new box uses the same storage mode as `self` did. Nothing is
    /// cloned and nothing is allocated.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::SmallFn;
    ///
    /// let mut a: SmallFn<fn() -> i32> = SmallFn::new(|| 7);
    /// let b = a.take();
    /// assert!(a.is_empty());
    /// assert_eq!(b.call(), 7);
    /// ```
    pub fn take(&mut self) -> Self {
        let mut result = Self::empty();

        let Some(meta) = self.ptr.take() else {
            return result;
        };
        if mem::replace(&mut self.inline, false) {
            unsafe {
                let src = sptr::rebase(self.space_ptr(), meta.as_ptr());
                (*src).move_into(result.space_ptr());
            }
            result.inline = true;
        }
        result.ptr = Some(meta);

        result
    }

    /// Drops whatever `self` holds, then moves the callable of `source` into
    /// `self`, leaving `source` empty.
    pub fn move_from(&mut self, source: &mut Self) {
        self.reset();
        let moved = source.take();
        // `self` is empty here, so the assignment drops nothing
        *self = moved;
    }

    /// Exchanges the callables of two boxes.
    ///
    /// Both callables are relocated through [`take`](Self::take) and
    /// [`move_from`](Self::move_from); neither is cloned.
    pub fn swap(&mut self, other: &mut Self) {
        let mut tmp = self.take();
        self.move_from(other);
        other.move_from(&mut tmp);
    }

    /// Drops the callable, if any, leaving the box empty.
    pub fn reset(&mut self) {
        let Some(meta) = self.ptr.take() else {
            return;
        };
        if mem::replace(&mut self.inline, false) {
            unsafe { ptr::drop_in_place(sptr::rebase(self.space_ptr(), meta.as_ptr())) }
        } else {
            unsafe { model::release(meta) }
        }
    }

    /// Clones the box, reporting allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self> {
        let mut result = Self::empty();

        let Some(meta) = self.ptr else {
            return Ok(result);
        };
        if self.inline {
            unsafe {
                let src = sptr::rebase(self.space_ptr(), meta.as_ptr());
                (*src).copy_into(result.space_ptr());
            }
            result.ptr = Some(meta);
            result.inline = true;
        } else {
            let model = unsafe { meta.as_ref() };
            result.ptr = Some(model.clone_to_heap()?);
        }

        Ok(result)
    }

    /// Replaces `self` with a clone of `source`.
    ///
    /// On error `self` is left exactly as it was.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<()> {
        let mut copy = source.try_clone()?;
        self.swap(&mut copy);
        Ok(())
    }

    /// Moves the callable into a box with a different inline space.
    ///
    /// An inline callable stays inline if it fits `ToSpace` and moves to the
    /// heap otherwise. A heap-stored callable is never moved again.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::SmallFn;
    /// use smallfn::space::{S1, S4};
    ///
    /// let data = [1usize, 2, 3];
    /// let f: SmallFn<fn() -> usize, S4> = SmallFn::new(move || data.iter().sum::<usize>());
    /// assert!(f.is_inline());
    ///
    /// let g: SmallFn<fn() -> usize, S1> = f.resize();
    /// assert!(g.is_heap());
    /// assert_eq!(g.call(), 6);
    /// ```
    pub fn resize<ToSpace>(mut self) -> SmallFn<Sig, ToSpace> {
        let mut result = SmallFn::<Sig, ToSpace>::empty();

        let Some(meta) = self.ptr.take() else {
            return result;
        };
        if !mem::replace(&mut self.inline, false) {
            // don't touch anything if the callable is already on heap
            result.ptr = Some(meta);
            return result;
        }

        let src = sptr::rebase(self.space_ptr(), meta.as_ptr());
        let (size, align) = unsafe { (mem::size_of_val(&*src), mem::align_of_val(&*src)) };
        if fits::<ToSpace>(size, align) {
            unsafe { (*src).move_into(result.space_ptr()) };
            result.ptr = Some(meta);
            result.inline = true;
        } else {
            tracing::trace!(
                size,
                align,
                space_size = mem::size_of::<ToSpace>(),
                space_align = mem::align_of::<ToSpace>(),
                "resized space too small, moving callable to heap"
            );
            match unsafe { (*src).move_to_heap() } {
                Ok(model) => result.ptr = Some(model),
                Err(err) => {
                    self.ptr = Some(meta);
                    self.inline = true;
                    error::fatal(err)
                }
            }
        }

        result
    }

    fn space_ptr(&self) -> *mut u8 {
        UnsafeCell::raw_get(self.space.as_ptr()).cast::<u8>()
    }

    fn model(&self) -> Option<&dyn Model<Sig>> {
        let meta = self.ptr?;
        let model = if self.inline {
            sptr::rebase(self.space_ptr(), meta.as_ptr())
        } else {
            meta.as_ptr()
        };
        Some(unsafe { &*model })
    }
}

macro_rules! call {
    ($($arg:ident),*) => {
        impl<R, $($arg,)* Space> SmallFn<fn($($arg),*) -> R, Space> {
            /// Calls the wrapped callable.
            ///
            /// # Panics
            ///
            /// Panics if the box is empty.
            #[inline]
            #[allow(non_snake_case)]
            pub fn call(&self, $($arg: $arg),*) -> R {
                self.invoke(($($arg,)*))
            }
        }
    };
}

call!();
call!(A1);
call!(A1, A2);
call!(A1, A2, A3);
call!(A1, A2, A3, A4);
call!(A1, A2, A3, A4, A5);
call!(A1, A2, A3, A4, A5, A6);
call!(A1, A2, A3, A4, A5, A6, A7);
call!(A1, A2, A3, A4, A5, A6, A7, A8);

const fn fits<Space>(size: usize, align: usize) -> bool {
    size <= mem::size_of::<Space>() && align <= mem::align_of::<Space>()
}

impl<Sig: Signature, Space> Drop for SmallFn<Sig, Space> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<Sig: Signature, Space> Clone for SmallFn<Sig, Space> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|err| error::fatal(err))
    }

    fn clone_from(&mut self, source: &Self) {
        let mut copy = source.clone();
        self.swap(&mut copy);
    }
}

impl<Sig: Signature, Space> Default for SmallFn<Sig, Space> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<Sig: Signature, Space> fmt::Debug for SmallFn<Sig, Space> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mode = if self.inline {
            "inline"
        } else if self.ptr.is_some() {
            "heap"
        } else {
            "empty"
        };
        f.debug_struct("SmallFn").field("mode", &mode).finish()
    }
}

impl<Sig: Signature, Space> fmt::Pointer for SmallFn<Sig, Space> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ptr: *const u8 = match self.model() {
            Some(model) => ptr::from_ref(model).cast::<u8>(),
            None => ptr::null(),
        };
        fmt::Pointer::fmt(&ptr, f)
    }
}
