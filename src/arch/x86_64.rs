//! System V x86_64 context switch.
//!
//! A suspended context's stack holds, from its saved stack pointer upward:
//!
//! ```text
//! [sp + 0x00]  mxcsr | x87 control word
//! [sp + 0x08]  r15
//! [sp + 0x10]  r14
//! [sp + 0x18]  r13
//! [sp + 0x20]  r12
//! [sp + 0x28]  rbx
//! [sp + 0x30]  rbp
//! [sp + 0x38]  return address
//! ```

use super::{Context, Entry};

use std::arch::naked_asm;

/// Words written by [`prepare`]: the saved frame plus two words of padding
/// that keep `rsp` 16-byte aligned when `bootstrap` calls the entry.
const FRAME_WORDS: usize = 10;

/// Default MXCSR (all exceptions masked) and x87 control word.
const FPU_DEFAULTS: usize = 0x1f80 | (0x037f << 32);

pub(super) unsafe fn prepare(top: *mut u8, entry: Entry, arg: *const ()) -> *mut u8 {
    let frame = unsafe { top.cast::<usize>().sub(FRAME_WORDS) };
    let words = [
        FPU_DEFAULTS,
        0, // r15
        0, // r14
        0, // r13
        arg as usize, // r12
        entry as *const () as usize, // rbx
        0, // rbp
        bootstrap as *const () as usize, // return address
        0,
        0,
    ];

    unsafe {
        frame.copy_from_nonoverlapping(words.as_ptr(), FRAME_WORDS);
    }

    frame.cast()
}

#[unsafe(naked)]
pub(super) unsafe extern "C" fn switch(_from: *mut Context, _to: *const Context) {
    naked_asm!(
        "push rbp",
        "push rbx",
        "push r12",
        "push r13",
        "push r14",
        "push r15",
        "sub rsp, 8",
        "stmxcsr [rsp]",
        "fnstcw [rsp + 4]",
        "mov [rdi], rsp",
        "mov rsp, [rsi]",
        "ldmxcsr [rsp]",
        "fldcw [rsp + 4]",
        "add rsp, 8",
        "pop r15",
        "pop r14",
        "pop r13",
        "pop r12",
        "pop rbx",
        "pop rbp",
        "ret",
    )
}

/// First code run on a fresh stack: `entry(arg)` from `rbx(r12)`.
#[unsafe(naked)]
unsafe extern "C" fn bootstrap() -> ! {
    naked_asm!("mov rdi, r12", "call rbx", "ud2")
}
