//! Rebuilding a trait object pointer around a new data address.

#[cfg(feature = "nightly")]
mod implementation {
    pub fn rebase<U: ?Sized>(addr: *mut u8, meta: *const U) -> *mut U {
        addr.with_metadata_of(meta)
    }
}

#[cfg(not(feature = "nightly"))]
#[allow(clippy::as_conversions)]
mod implementation {
    use core::ptr::addr_of_mut;

    // Relies on the data address being the first word of a fat pointer,
    // which build.rs checks.
    pub fn rebase<U: ?Sized>(addr: *mut u8, mut meta: *const U) -> *mut U {
        let word = addr_of_mut!(meta).cast::<usize>();
        unsafe { word.write(addr as usize) }
        meta.cast_mut()
    }
}

/// Returns a pointer with the address of `addr` and the metadata of `meta`.
pub(crate) use implementation::rebase;
