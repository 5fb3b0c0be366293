use std::ptr;

#[allow(dead_code)]
struct Sample(usize);

trait Probe {
    fn answer(&self) -> usize;
}

impl Probe for Sample {
    fn answer(&self) -> usize {
        self.0
    }
}

fn layout_broken(what: &str) {
    panic!(
        concat!(
            "Assumptions on layout are broken, this crate relies on ",
            "`unsafe code guidelines` layout specification, ",
            "now layout of {:?} is broken, report about it on github"
        ),
        what
    );
}

/// Checks that a trait object pointer starts with its data pointer.
///
/// Inline callables are reached by overwriting that first word with the
/// address of the inline space while keeping the vtable word.
fn test_dyn_layout() {
    #[repr(C)]
    struct DynObj {
        data_ptr: *const u8,
        vtable: *const u8,
    }

    let sample = Box::new(Sample(42));
    let data_ptr = Box::into_raw(sample);

    let trait_obj: *const dyn Probe = data_ptr;
    let repr: DynObj = unsafe { ptr::read(ptr::addr_of!(trait_obj) as *const DynObj) };

    if repr.data_ptr != data_ptr as *const u8 {
        layout_broken("trait objects");
    }

    let mut rebased = trait_obj;
    let other = Sample(7);
    unsafe {
        ptr::addr_of_mut!(rebased)
            .cast::<usize>()
            .write(ptr::addr_of!(other) as usize);
    }
    if unsafe { (*rebased).answer() } != 7 {
        layout_broken("rebased trait objects");
    }

    let out = unsafe { Box::from_raw(data_ptr) };
    assert_eq!(out.answer(), 42);
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    // NOTE: host layout may differ from target layout, so this only
    // catches the obvious breakage.
    test_dyn_layout();
}
