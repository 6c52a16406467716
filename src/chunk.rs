// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 tlsf-pool contributors
//
// Chunk layout and physical-chain navigation.
//
// A chunk is addressed by a pointer to its `size` word (the only header
// byte that is never overlaid by a neighbor's payload). `phys_prev` lives
// one pointer-width before that address — inside the predecessor's payload
// tail when the predecessor is in use — and `free_prev`/`free_next` are
// overlaid on the first two pointer-width words of the chunk's own payload
// when the chunk is free. None of this is expressed as a `#[repr(Rust)]`
// struct placed in the buffer: the buffer bytes are never valid for a
// typed reference, only for raw pointer arithmetic, so every accessor here
// is `unsafe` and callers (`pool.rs`) are responsible for upholding the
// flag/size invariants documented on each method.

use core::ptr;

/// Width of one pointer-sized slot (`phys_prev`, `free_prev`, `free_next`).
pub const PTR_SIZE: usize = core::mem::size_of::<usize>();

/// Header bytes that are never overlaid by a neighbor's payload: just the
/// `size` word, padded up to pointer size so the payload that follows is
/// pointer-aligned whenever the chunk itself is.
pub const CHUNK_OVERHEAD: u32 = PTR_SIZE as u32;

/// Minimum chunk size: two overlaid link pointers (`free_prev`, `free_next`).
pub const MIN_CHUNK_SIZE: u32 = 2 * PTR_SIZE as u32;

pub const FLAG_FREE: u32 = 0x1;
pub const FLAG_PREV_FREE: u32 = 0x2;
pub const FLAG_MASK: u32 = 0x3;

/// A non-owning handle to a chunk, pointing at its `size` word.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ChunkPtr(*mut u8);

impl ChunkPtr {
    /// Wrap a raw pointer to a chunk's `size` word.
    ///
    /// # Safety
    /// `p` must point at a valid chunk's `size` word inside a pool buffer.
    #[inline]
    pub unsafe fn from_raw(p: *mut u8) -> Self {
        debug_assert!(!p.is_null());
        ChunkPtr(p)
    }

    #[inline]
    pub fn as_ptr(self) -> *mut u8 {
        self.0
    }

    #[inline]
    unsafe fn size_ptr(self) -> *mut u32 {
        self.0 as *mut u32
    }

    /// The raw `size` word, flags included.
    ///
    /// # Safety
    /// `self` must point at a live chunk header.
    #[inline]
    pub unsafe fn raw(self) -> u32 {
        ptr::read_unaligned(self.size_ptr())
    }

    /// # Safety
    /// `self` must point at a live chunk header.
    #[inline]
    pub unsafe fn set_raw(self, word: u32) {
        ptr::write_unaligned(self.size_ptr(), word);
    }

    /// Payload size in bytes (flags stripped).
    ///
    /// # Safety
    /// `self` must point at a live chunk header.
    #[inline]
    pub unsafe fn size(self) -> u32 {
        self.raw() & !FLAG_MASK
    }

    /// # Safety
    /// `self` must point at a live chunk header.
    #[inline]
    pub unsafe fn flags(self) -> u32 {
        self.raw() & FLAG_MASK
    }

    /// # Safety
    /// `self` must point at a live chunk header.
    #[inline]
    pub unsafe fn is_free(self) -> bool {
        self.flags() & FLAG_FREE != 0
    }

    /// # Safety
    /// `self` must point at a live chunk header.
    #[inline]
    pub unsafe fn is_prev_free(self) -> bool {
        self.flags() & FLAG_PREV_FREE != 0
    }

    /// Overwrite the size field, preserving the existing flag bits.
    ///
    /// # Safety
    /// `self` must point at a live chunk header; `size` must be 4-byte
    /// aligned and fit in the 30 size bits (checked by the debug assert).
    #[inline]
    pub unsafe fn set_size(self, size: u32) {
        debug_assert_eq!(size & FLAG_MASK, 0, "chunk size must be 4-byte aligned");
        let flags = self.flags();
        self.set_raw(size | flags);
    }

    /// Mark this chunk free and propagate `P` to the next physical chunk.
    ///
    /// # Safety
    /// `self.size()` must already reflect the chunk's final extent (so that
    /// `next_phys` resolves to the correct neighbor).
    #[inline]
    pub unsafe fn set_free(self) {
        self.set_raw(self.raw() | FLAG_FREE);
        let next = self.next_phys();
        next.set_raw(next.raw() | FLAG_PREV_FREE);
    }

    /// Mark this chunk used and propagate `P` to the next physical chunk.
    ///
    /// # Safety
    /// Same as [`Self::set_free`].
    #[inline]
    pub unsafe fn set_used(self) {
        self.set_raw(self.raw() & !FLAG_FREE);
        let next = self.next_phys();
        next.set_raw(next.raw() & !FLAG_PREV_FREE);
    }

    /// The physical predecessor. Only valid when `is_prev_free()`.
    ///
    /// # Safety
    /// `self.is_prev_free()` must be true.
    #[inline]
    pub unsafe fn phys_prev(self) -> ChunkPtr {
        debug_assert!(self.is_prev_free(), "phys_prev read while predecessor in use");
        let slot = self.0.sub(PTR_SIZE) as *mut *mut u8;
        ChunkPtr::from_raw(ptr::read_unaligned(slot))
    }

    /// # Safety
    /// `self.is_prev_free()` must be true for this slot to be writable
    /// (it otherwise belongs to the predecessor's payload).
    #[inline]
    pub unsafe fn set_phys_prev(self, prev: ChunkPtr) {
        let slot = self.0.sub(PTR_SIZE) as *mut *mut u8;
        ptr::write_unaligned(slot, prev.0);
    }

    /// The next chunk in the physical chain (always valid to compute).
    ///
    /// # Safety
    /// `self.size()` must be accurate.
    #[inline]
    pub unsafe fn next_phys(self) -> ChunkPtr {
        ChunkPtr::from_raw(self.0.add(CHUNK_OVERHEAD as usize + self.size() as usize))
    }

    /// Pointer to the start of this chunk's payload.
    #[inline]
    pub fn payload_ptr(self) -> *mut u8 {
        unsafe { self.0.add(CHUNK_OVERHEAD as usize) }
    }

    /// Recover the chunk owning a payload pointer.
    ///
    /// # Safety
    /// `payload` must be a pointer previously returned for this chunk's
    /// payload (i.e. `payload_ptr()` of some live chunk).
    #[inline]
    pub unsafe fn from_payload_ptr(payload: *mut u8) -> ChunkPtr {
        ChunkPtr::from_raw(payload.sub(CHUNK_OVERHEAD as usize))
    }

    /// # Safety
    /// `self.is_free()` must be true (the slot is otherwise payload data).
    #[inline]
    pub unsafe fn free_prev(self) -> Option<ChunkPtr> {
        debug_assert!(self.is_free());
        let slot = self.payload_ptr() as *mut *mut u8;
        let raw = ptr::read_unaligned(slot);
        if raw.is_null() {
            None
        } else {
            Some(ChunkPtr::from_raw(raw))
        }
    }

    /// # Safety
    /// `self.is_free()` must be true.
    #[inline]
    pub unsafe fn set_free_prev(self, prev: Option<ChunkPtr>) {
        let slot = self.payload_ptr() as *mut *mut u8;
        ptr::write_unaligned(slot, prev.map_or(ptr::null_mut(), |c| c.0));
    }

    /// # Safety
    /// `self.is_free()` must be true.
    #[inline]
    pub unsafe fn free_next(self) -> Option<ChunkPtr> {
        debug_assert!(self.is_free());
        let slot = (self.payload_ptr() as *mut *mut u8).add(1);
        let raw = ptr::read_unaligned(slot);
        if raw.is_null() {
            None
        } else {
            Some(ChunkPtr::from_raw(raw))
        }
    }

    /// # Safety
    /// `self.is_free()` must be true.
    #[inline]
    pub unsafe fn set_free_next(self, next: Option<ChunkPtr>) {
        let slot = (self.payload_ptr() as *mut *mut u8).add(1);
        ptr::write_unaligned(slot, next.map_or(ptr::null_mut(), |c| c.0));
    }
}
