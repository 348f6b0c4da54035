//! AAPCS64 context switch.
//!
//! A suspended context's stack holds `x19..=x30` followed by `d8..=d15`,
//! 0xa0 bytes in total, starting at its saved stack pointer.

use super::{Context, Entry};

use std::arch::naked_asm;

const FRAME_WORDS: usize = 20;

pub(super) unsafe fn prepare(top: *mut u8, entry: Entry, arg: *const ()) -> *mut u8 {
    let frame = unsafe { top.cast::<usize>().sub(FRAME_WORDS) };
    let mut words = [0usize; FRAME_WORDS];
    words[0] = entry as *const () as usize; // x19
    words[1] = arg as usize; // x20
    words[11] = bootstrap as *const () as usize; // x30

    unsafe {
        frame.copy_from_nonoverlapping(words.as_ptr(), FRAME_WORDS);
    }

    frame.cast()
}

#[unsafe(naked)]
pub(super) unsafe extern "C" fn switch(_from: *mut Context, _to: *const Context) {
    naked_asm!(
        "sub sp, sp, #0xa0",
        "stp x19, x20, [sp, #0x00]",
        "stp x21, x22, [sp, #0x10]",
        "stp x23, x24, [sp, #0x20]",
        "stp x25, x26, [sp, #0x30]",
        "stp x27, x28, [sp, #0x40]",
        "stp x29, x30, [sp, #0x50]",
        "stp d8, d9, [sp, #0x60]",
        "stp d10, d11, [sp, #0x70]",
        "stp d12, d13, [sp, #0x80]",
        "stp d14, d15, [sp, #0x90]",
        "mov x9, sp",
        "str x9, [x0]",
        "ldr x9, [x1]",
        "mov sp, x9",
        "ldp x19, x20, [sp, #0x00]",
        "ldp x21, x22, [sp, #0x10]",
        "ldp x23, x24, [sp, #0x20]",
        "ldp x25, x26, [sp, #0x30]",
        "ldp x27, x28, [sp, #0x40]",
        "ldp x29, x30, [sp, #0x50]",
        "ldp d8, d9, [sp, #0x60]",
        "ldp d10, d11, [sp, #0x70]",
        "ldp d12, d13, [sp, #0x80]",
        "ldp d14, d15, [sp, #0x90]",
        "add sp, sp, #0xa0",
        "ret",
    )
}

/// First code run on a fresh stack: `entry(arg)` from `x19(x20)`.
#[unsafe(naked)]
unsafe extern "C" fn bootstrap() -> ! {
    naked_asm!("mov x0, x20", "blr x19", "brk #1")
}
