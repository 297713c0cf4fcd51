//! Boundary arena: hands out byte regions to a caller that can only see
//! the engine's linear memory through `(address, length)` pairs.
//!
//! # Protocol
//!
//! 1. `allocate(n)` an input region and write the payload into it
//! 2. `convert(address, n)` returns the address of a fresh output region
//! 3. `last_output_len()` gives that region's length
//! 4. read the output, then `free` both regions
//!
//! Only one output is tracked at a time. Starting a second conversion
//! before releasing the first output overwrites `last_output_len`, so a
//! caller must finish step 4 before the next step 2.

use crate::engine::{error_document, Converter};
use log::{debug, warn};
use std::collections::HashMap;
use std::ptr::{self, NonNull};

/// Request-scoped allocator plus the single output-length slot.
///
/// # Invariants
///
/// - Every non-empty region in `live` came from `allocate` and is freed at
///   most once, with its original length
/// - `pending_output` is the address of the last output not yet freed
#[derive(Debug, Default)]
pub struct Arena {
    /// Live regions: address -> length.
    live: HashMap<usize, usize>,

    /// Length recorded by the most recent `convert`.
    last_output_len: Option<usize>,

    /// Output region handed out and not yet released.
    pending_output: Option<usize>,

    converter: Converter,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an arena whose conversions use `converter`.
    pub fn with_converter(converter: Converter) -> Self {
        Arena {
            live: HashMap::new(),
            last_output_len: None,
            pending_output: None,
            converter,
        }
    }

    /// Reserves a zero-initialized region of exactly `len` bytes.
    ///
    /// Zero-length requests get a dangling, never-dereferenced address and
    /// are not tracked. Memory exhaustion aborts the process.
    pub fn allocate(&mut self, len: usize) -> *mut u8 {
        if len == 0 {
            return NonNull::<u8>::dangling().as_ptr();
        }

        let region: Box<[u8]> = vec![0u8; len].into_boxed_slice();
        let ptr = Box::into_raw(region) as *mut u8;
        self.live.insert(ptr as usize, len);
        debug!("Allocated {} bytes at {:#x}", len, ptr as usize);
        ptr
    }

    /// Copies `bytes` into a live region starting at `ptr`.
    ///
    /// Returns `false` without writing if `ptr` is not the start of a live
    /// region or `bytes` does not fit.
    pub fn write(&mut self, ptr: *mut u8, bytes: &[u8]) -> bool {
        if bytes.is_empty() {
            return true;
        }
        match self.live.get(&(ptr as usize)) {
            Some(&len) if bytes.len() <= len => {
                // SAFETY: `ptr` starts a live region of `len >= bytes.len()`
                // bytes owned by this arena.
                unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, bytes.len()) };
                true
            }
            _ => {
                warn!("Write of {} bytes to {:#x} rejected", bytes.len(), ptr as usize);
                false
            }
        }
    }

    /// Borrows `len` bytes of the live region starting at `ptr`.
    pub fn read(&self, ptr: *const u8, len: usize) -> Option<&[u8]> {
        if len == 0 {
            return Some(&[]);
        }
        match self.live.get(&(ptr as usize)) {
            // SAFETY: `ptr` starts a live region of at least `len` bytes
            // owned by this arena; the borrow keeps it from being freed.
            Some(&region_len) if len <= region_len => {
                Some(unsafe { std::slice::from_raw_parts(ptr, len) })
            }
            _ => None,
        }
    }

    /// Converts the `len` bytes at `ptr` and returns a fresh output region.
    ///
    /// The input region is left untouched and stays owned by the caller.
    /// An input span outside any live region produces an `ERROR:` output.
    pub fn convert(&mut self, ptr: *const u8, len: usize) -> *mut u8 {
        let output = match self.read(ptr, len) {
            Some(input) => self.converter.convert(input),
            None => {
                warn!("Convert called with unknown region {:#x}+{}", ptr as usize, len);
                error_document(&format!(
                    "input region {:#x} (+{} bytes) is not a live allocation",
                    ptr as usize, len
                ))
            }
        };

        if let Some(previous) = self.pending_output {
            warn!(
                "Output at {:#x} was not released before the next conversion",
                previous
            );
        }

        let out = self.allocate(output.len());
        // An empty output owns no region, so any earlier unreleased output
        // stays pending.
        if !output.is_empty() {
            // SAFETY: `out` was just allocated with exactly `output.len()` bytes.
            unsafe { ptr::copy_nonoverlapping(output.as_ptr(), out, output.len()) };
            self.pending_output = Some(out as usize);
        }
        self.last_output_len = Some(output.len());
        out
    }

    /// Length of the most recent output, or 0 before any conversion.
    pub fn last_output_len(&self) -> usize {
        self.last_output_len.unwrap_or(0)
    }

    /// `true` once any conversion has recorded an output length.
    pub fn has_output(&self) -> bool {
        self.last_output_len.is_some()
    }

    /// `true` when no output region is waiting to be released.
    pub fn is_idle(&self) -> bool {
        self.pending_output.is_none()
    }

    /// Releases a region previously returned by `allocate` or `convert`.
    ///
    /// Unknown addresses, repeated frees and mismatched lengths are logged
    /// and ignored. Returns `true` if memory was released.
    pub fn free(&mut self, ptr: *mut u8, len: usize) -> bool {
        if len == 0 {
            return false;
        }

        let addr = ptr as usize;
        match self.live.get(&addr) {
            Some(&region_len) if region_len == len => {
                self.live.remove(&addr);
                if self.pending_output == Some(addr) {
                    self.pending_output = None;
                }
                // SAFETY: the region was produced by `Box::into_raw` on a
                // boxed slice of `len` bytes and has just left `live`.
                drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)) });
                debug!("Freed {} bytes at {:#x}", len, addr);
                true
            }
            Some(&region_len) => {
                warn!(
                    "Free of {:#x} with length {} ignored: region has length {}",
                    addr, len, region_len
                );
                false
            }
            None => {
                warn!("Free of unknown region {:#x} ignored", addr);
                false
            }
        }
    }

    /// Number of regions not yet freed.
    pub fn live_regions(&self) -> usize {
        self.live.len()
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        for (addr, len) in self.live.drain() {
            // SAFETY: every entry in `live` is an unfreed boxed slice.
            drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(addr as *mut u8, len)) });
        }
    }
}
