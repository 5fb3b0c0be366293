//! Allocation failure on the fallible entry points.
//!
//! The global allocator below refuses large requests while the current
//! thread has switched it off, so each test only fails its own heap-stored
//! callables. Small bookkeeping allocations still succeed.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::ptr;
use std::rc::Rc;

use smallfn::space::S64;
use smallfn::{Error, SmallFn};

struct Refusing;

thread_local! {
    static REFUSE: Cell<bool> = const { Cell::new(false) };
}

/// Requests at least this large are refused.
const LARGE: usize = 128;

fn refused(layout: Layout) -> bool {
    layout.size() >= LARGE && REFUSE.try_with(Cell::get).unwrap_or(false)
}

unsafe impl GlobalAlloc for Refusing {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if refused(layout) {
            return ptr::null_mut();
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: Refusing = Refusing;

/// Runs `f` with every large allocation on this thread failing.
fn without_memory<T>(f: impl FnOnce() -> T) -> T {
    REFUSE.with(|r| r.set(true));
    let result = f();
    REFUSE.with(|r| r.set(false));
    result
}

/// Counts how many times a value was dropped.
#[derive(Clone)]
struct Counted(Rc<Cell<usize>>);

impl Drop for Counted {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

fn heap_sized(counted: Counted) -> impl Fn(i32) -> i32 + Clone + 'static {
    let padding = [1u8; 200];
    move |x: i32| {
        let _ = &counted;
        x + i32::from(padding[199])
    }
}

#[test]
fn try_new_reports_alloc() {
    let drops = Rc::new(Cell::new(0));
    let f = heap_sized(Counted(drops.clone()));

    let result = without_memory(|| SmallFn::<fn(i32) -> i32>::try_new(f).map(|_| ()));

    match result {
        Err(Error::Alloc { layout }) => assert!(layout.size() >= 200),
        other => panic!("expected an allocation error, got {:?}", other),
    }
    assert_eq!(drops.get(), 1);
}

#[test]
fn inline_paths_need_no_memory() {
    let drops = Rc::new(Cell::new(0));
    let f: SmallFn<fn(i32) -> i32, S64> =
        without_memory(|| SmallFn::try_new(heap_sized(Counted(drops.clone())))).unwrap();
    assert!(f.is_inline());

    let copy = without_memory(|| f.try_clone()).unwrap();
    assert!(copy.is_inline());
    assert_eq!(copy.call(21), 22);

    drop(copy);
    drop(f);
    assert_eq!(drops.get(), 2);
}

#[test]
fn try_clone_reports_alloc() {
    let drops = Rc::new(Cell::new(0));
    let source: SmallFn<fn(i32) -> i32> = SmallFn::new(heap_sized(Counted(drops.clone())));
    assert!(source.is_heap());

    let result = without_memory(|| source.try_clone().map(|_| ()));

    assert!(matches!(result, Err(Error::Alloc { .. })));
    // the partial clone is dropped exactly once, the source not at all
    assert_eq!(drops.get(), 1);
    assert_eq!(source.call(1), 2);

    drop(source);
    assert_eq!(drops.get(), 2);
}

#[test]
fn try_clone_from_keeps_target() {
    let drops = Rc::new(Cell::new(0));
    let source: SmallFn<fn(i32) -> i32> = SmallFn::new(heap_sized(Counted(drops.clone())));
    let mut target: SmallFn<fn(i32) -> i32> = SmallFn::new(|x: i32| x * x);

    let result = without_memory(|| target.try_clone_from(&source));

    assert!(matches!(result, Err(Error::Alloc { .. })));
    assert!(target.is_inline());
    assert_eq!(target.call(3), 9);
    assert_eq!(source.call(3), 4);

    target.try_clone_from(&source).unwrap();
    assert!(target.is_heap());
    assert_eq!(target.call(3), 4);

    drop(source);
    drop(target);
    assert_eq!(drops.get(), 3);
}
