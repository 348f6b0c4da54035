use crate::arch::STACK_ALIGN;

use std::io;
use std::ptr::{self, NonNull};

/// A fixed-size, privately mapped coroutine stack.
///
/// The mapping is laid out as one inaccessible guard page followed by the
/// usable region:
///
/// ```text
/// base                base + page                          base + len
///  | guard (PROT_NONE) | usable (grows downward from top) ->|
/// ```
///
/// Overflowing the usable region faults on the guard page instead of
/// silently overwriting neighbouring memory. The stack is never resized.
pub(crate) struct Stack {
    /// Start of the whole mapping, guard page included.
    base: NonNull<u8>,
    /// Length of the whole mapping in bytes.
    len: usize,
}

impl Stack {
    /// Maps a new stack with at least `size` usable bytes.
    ///
    /// `size` is rounded up to the system page size.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the mapping or the guard page protection
    /// cannot be established.
    pub(crate) fn new(size: usize) -> io::Result<Self> {
        let page = page_size();
        let usable = size.div_ceil(page).max(1) * page;
        let len = usable + page;

        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | MAP_STACK,
                -1,
                0,
            )
        };

        if addr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        if unsafe { libc::mprotect(addr, page, libc::PROT_NONE) } != 0 {
            let err = io::Error::last_os_error();
            unsafe { libc::munmap(addr, len) };
            return Err(err);
        }

        let base = NonNull::new(addr.cast::<u8>())
            .ok_or_else(|| io::Error::other("mmap returned null"))?;

        Ok(Self { base, len })
    }

    /// One-past-the-end address of the usable region.
    ///
    /// Always page aligned, hence aligned to [`STACK_ALIGN`].
    pub(crate) fn top(&self) -> *mut u8 {
        let top = unsafe { self.base.as_ptr().add(self.len) };
        debug_assert_eq!(top as usize % STACK_ALIGN, 0);

        top
    }

    /// Number of usable bytes, guard page excluded.
    pub(crate) fn size(&self) -> usize {
        self.len - page_size()
    }
}

impl Drop for Stack {
    /// Unmaps the stack, guard page included.
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.base.as_ptr().cast(), self.len);
        }
    }
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
const MAP_STACK: libc::c_int = libc::MAP_STACK;
#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
const MAP_STACK: libc::c_int = 0;

/// Returns the system page size.
fn page_size() -> usize {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

    if size <= 0 { 4096 } else { size as usize }
}
