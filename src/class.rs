// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 tlsf-pool contributors
//
// Two-level size-class mapping: size -> (fli, sli) -> packed class index,
// and its inverse. Classes are segmented by scale — byte-grained below
// 1 KiB, kilobyte-grained below 1 MiB, megabyte-grained above — with 8
// second-level subdivisions per first-level decade in every scale.

use crate::bits::fls;

/// Second-level subdivisions per first-level decade.
pub const SL_BITS: u32 = 3;
pub const SL_COUNT: u32 = 1 << SL_BITS; // 8
const SL_MASK: u32 = SL_COUNT - 1;

/// Upper bound on first-level classes (byte/KiB/MiB scales × 8 each).
pub const MAX_FL_INDEX: u32 = 24;
/// Upper bound on packed class indices (`MAX_FL_INDEX * SL_COUNT`).
pub const MAX_CLASSES: u32 = MAX_FL_INDEX * SL_COUNT;

const SCALE_BYTE_SHIFT: u32 = 2; // divide by 4
const SCALE_KB_SHIFT: u32 = 12; // divide by 4 Ki
const SCALE_MB_SHIFT: u32 = 22; // divide by 4 Mi
const SCALE_KB_SIZE: u32 = 1 << SCALE_KB_SHIFT;
const SCALE_MB_SIZE: u32 = 1 << SCALE_MB_SHIFT;

/// Split a packed class index into its first-level component.
#[inline]
pub const fn fl_index(fi: u32) -> u32 {
    fi >> SL_BITS
}

/// Split a packed class index into its second-level component.
#[inline]
pub const fn sl_index(fi: u32) -> u32 {
    fi & SL_MASK
}

/// Pack a (first-level, second-level) pair into one class index.
#[inline]
pub const fn pack(fli: u32, sli: u32) -> u32 {
    (fli << SL_BITS) | sli
}

/// Map an adjusted chunk size to its two-level class index.
///
/// `size` must already be the final payload size (post `adjust`), not a
/// raw user request; callers round up separately via [`round_up`].
pub fn mapping(size: u32) -> u32 {
    let (mut fli, s) = if size < SCALE_KB_SIZE {
        (0u32, size >> SCALE_BYTE_SHIFT)
    } else if size < SCALE_MB_SIZE {
        (8u32, size >> SCALE_KB_SHIFT)
    } else {
        (16u32, size >> SCALE_MB_SHIFT)
    };

    let ls = fls(s);
    let sli = if ls > 3 {
        fli += ls - 3;
        (s >> (ls - 4)) & SL_MASK
    } else {
        s & SL_MASK
    };
    pack(fli, sli)
}

/// The exact lower-bound size of class `fi` — the inverse of [`mapping`].
pub fn mapping_size(fi: u32) -> u32 {
    let fli = fl_index(fi);

    let (fli_local, size_shift) = if fli < 8 {
        (fli, 0u32)
    } else if fli < 16 {
        (fli - 8, 10u32)
    } else {
        (fli - 16, 20u32)
    };

    let base = if fli_local == 0 { 0 } else { 32 << (fli_local - 1) };
    let step = if base == 0 { 4 } else { base >> 3 };
    let size = base + sl_index(fi) * step;
    size << size_shift
}

/// Promote `size` to the next class boundary if it exceeds the lower bound
/// of its own class, guaranteeing every chunk in the selected class is
/// large enough to satisfy the request (true first-fit within the class).
pub fn round_up(size: u32) -> u32 {
    let fi = mapping(size);
    if size > mapping_size(fi) {
        mapping_size(fi + 1)
    } else {
        size
    }
}
