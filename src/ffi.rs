//! Exported boundary functions for the sandboxed host.
//!
//! Each sandbox instance (one wasm module instance, or one native thread)
//! owns a single [`Arena`]. On wasm32 the functions are exported unmangled
//! under these names:
//!
//! | Export | Arguments | Returns |
//! |---|---|---|
//! | `alloc` | length | address |
//! | `convert` | address, length | output address |
//! | `last_output_len` | | output length |
//! | `dealloc` | address, length | |
//!
//! The host must not start a conversion while a previous output is still
//! unread; see the protocol notes on [`Arena`].

use crate::arena::Arena;
use std::cell::RefCell;

thread_local! {
    static ARENA: RefCell<Arena> = RefCell::new(Arena::new());
}

fn with_arena<R>(f: impl FnOnce(&mut Arena) -> R) -> R {
    ARENA.with(|arena| f(&mut arena.borrow_mut()))
}

/// Reserves `len` bytes for the host to write input into.
#[cfg_attr(target_arch = "wasm32", no_mangle)]
pub extern "C" fn alloc(len: usize) -> *mut u8 {
    with_arena(|arena| arena.allocate(len))
}

/// Converts the input region and returns the output region's address.
#[cfg_attr(target_arch = "wasm32", no_mangle)]
pub extern "C" fn convert(ptr: *const u8, len: usize) -> *mut u8 {
    with_arena(|arena| arena.convert(ptr, len))
}

/// Length of the region returned by the latest `convert`.
#[cfg_attr(target_arch = "wasm32", no_mangle)]
pub extern "C" fn last_output_len() -> usize {
    with_arena(|arena| arena.last_output_len())
}

/// Releases a region returned by `alloc` or `convert`.
#[cfg_attr(target_arch = "wasm32", no_mangle)]
pub extern "C" fn dealloc(ptr: *mut u8, len: usize) {
    with_arena(|arena| {
        arena.free(ptr, len);
    })
}

/// Outstanding regions in this instance's arena.
pub fn live_regions() -> usize {
    with_arena(|arena| arena.live_regions())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_call_sequence() {
        let input = b"recipient_name,provider_name,category,amount_paid,amount_refunded,period\n\
                      A,ClinicX,medical,1000,200,2023-04\n\
                      A,ClinicX,medical,500,0,2023-05\n";

        let in_ptr = alloc(input.len());
        // SAFETY: `in_ptr` is a fresh region of `input.len()` bytes.
        unsafe { std::ptr::copy_nonoverlapping(input.as_ptr(), in_ptr, input.len()) };

        let out_ptr = convert(in_ptr, input.len());
        let out_len = last_output_len();
        assert_eq!(last_output_len(), out_len);

        // SAFETY: `out_ptr` is a live region of `out_len` bytes until dealloc.
        let output = unsafe { std::slice::from_raw_parts(out_ptr, out_len) }.to_vec();
        assert_eq!(output, b"A,ClinicX,medical,1500,200,05/01/2023\n");

        dealloc(in_ptr, input.len());
        dealloc(out_ptr, out_len);
        assert_eq!(live_regions(), 0);
    }

    #[test]
    fn test_invalid_utf8_input() {
        let in_ptr = alloc(10);
        // SAFETY: `in_ptr` is a fresh region of 10 bytes.
        unsafe { std::ptr::write_bytes(in_ptr, 0xff, 10) };

        let out_ptr = convert(in_ptr, 10);
        let out_len = last_output_len();
        // SAFETY: `out_ptr` is a live region of `out_len` bytes until dealloc.
        let output = unsafe { std::slice::from_raw_parts(out_ptr, out_len) };
        assert!(output.starts_with(b"ERROR:"));

        dealloc(in_ptr, 10);
        dealloc(out_ptr, out_len);
        assert_eq!(live_regions(), 0);
    }
}
