//! The erasure interface every wrapped callable is reached through.

use core::alloc::Layout;
use core::ptr::{self, NonNull};

use crate::error::{Error, Result};
use crate::signature::{Callable, Signature};

/// Per-type operations of a wrapped callable.
///
/// `Drop` of the trait object tears down the wrapped value.
pub(crate) trait Model<Sig: Signature> {
    fn invoke(&self, args: Sig::Args) -> Sig::Output;

    /// Clones `self` into `dst`.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writes of `size_of_val(self)` bytes and
    /// aligned to `align_of_val(self)`.
    unsafe fn copy_into(&self, dst: *mut u8);

    /// Relocates `self` into `dst`. Never panics.
    ///
    /// # Safety
    ///
    /// Same requirements on `dst` as [`copy_into`](Model::copy_into).
    /// Afterwards `self` is logically uninitialized and must be neither used
    /// nor dropped.
    unsafe fn move_into(&mut self, dst: *mut u8);

    /// Allocates an independent clone of `self`.
    fn clone_to_heap(&self) -> Result<NonNull<dyn Model<Sig>>>;

    /// Relocates `self` into a fresh allocation.
    ///
    /// # Safety
    ///
    /// On `Ok`, `self` is logically uninitialized as after
    /// [`move_into`](Model::move_into). On `Err`, `self` is untouched.
    unsafe fn move_to_heap(&mut self) -> Result<NonNull<dyn Model<Sig>>>;
}

/// The model of a concrete callable `F`.
#[repr(transparent)]
pub(crate) struct Erased<F>(pub(crate) F);

impl<Sig, F> Model<Sig> for Erased<F>
where
    Sig: Signature,
    F: Callable<Sig> + Clone + 'static,
{
    #[inline]
    fn invoke(&self, args: Sig::Args) -> Sig::Output {
        self.0.invoke(args)
    }

    unsafe fn copy_into(&self, dst: *mut u8) {
        // clone first: a panicking clone leaves `dst` untouched
        let copy = Erased(self.0.clone());
        dst.cast::<Self>().write(copy);
    }

    unsafe fn move_into(&mut self, dst: *mut u8) {
        ptr::copy_nonoverlapping(ptr::from_ref(self), dst.cast::<Self>(), 1);
    }

    fn clone_to_heap(&self) -> Result<NonNull<dyn Model<Sig>>> {
        let copy = Erased(self.0.clone());
        let slot = allocate::<Self>()?;
        unsafe { slot.as_ptr().write(copy) };
        let slot: NonNull<dyn Model<Sig>> = slot;
        Ok(slot)
    }

    unsafe fn move_to_heap(&mut self) -> Result<NonNull<dyn Model<Sig>>> {
        let slot = allocate::<Self>()?;
        ptr::copy_nonoverlapping(ptr::from_ref(self), slot.as_ptr(), 1);
        let slot: NonNull<dyn Model<Sig>> = slot;
        Ok(slot)
    }
}

/// Allocates uninitialized room for one `M` with the global allocator.
///
/// Zero-sized types get a dangling pointer and must never be deallocated.
pub(crate) fn allocate<M>() -> Result<NonNull<M>> {
    let layout = Layout::new::<M>();
    if layout.size() == 0 {
        return Ok(NonNull::dangling());
    }

    let raw = unsafe { alloc::alloc::alloc(layout) };
    match NonNull::new(raw.cast::<M>()) {
        Some(slot) => Ok(slot),
        None => {
            tracing::debug!(
                size = layout.size(),
                align = layout.align(),
                "allocation for heap-stored callable failed"
            );
            Err(Error::Alloc { layout })
        }
    }
}

/// Drops and frees a model produced by [`allocate`] or `Box`.
///
/// # Safety
///
/// `model` must own a live heap-stored model that nothing else refers to.
pub(crate) unsafe fn release<Sig: Signature>(model: NonNull<dyn Model<Sig>>) {
    let layout = Layout::for_value::<dyn Model<Sig>>(model.as_ref());
    ptr::drop_in_place(model.as_ptr());
    if layout.size() != 0 {
        alloc::alloc::dealloc(model.as_ptr().cast::<u8>(), layout);
    }
}
