// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 tlsf-pool contributors

use tlsf_pool::init;

fn fill(ptr: std::ptr::NonNull<u8>, len: usize, byte: u8) {
    unsafe { std::ptr::write_bytes(ptr.as_ptr(), byte, len) };
}

fn verify(ptr: std::ptr::NonNull<u8>, len: usize, byte: u8) {
    let slice = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), len) };
    assert!(slice.iter().all(|&b| b == byte));
}

#[test]
fn realloc_with_none_payload_behaves_as_malloc() {
    let mut buf = vec![0u8; 4096];
    let mut pool = init(&mut buf).unwrap();
    let p = pool.realloc(None, 64).unwrap();
    fill(p, 64, 0x11);
    verify(p, 64, 0x11);
}

#[test]
fn realloc_zero_size_returns_none_and_leaves_block_untouched() {
    let mut buf = vec![0u8; 4096];
    let mut pool = init(&mut buf).unwrap();
    let p = pool.malloc(64).unwrap();
    fill(p, 64, 0x22);
    assert!(pool.realloc(Some(p), 0).is_none());
    verify(p, 64, 0x22);
    pool.free(Some(p));
}

#[test]
fn realloc_shrink_keeps_same_pointer() {
    let mut buf = vec![0u8; 4096];
    let mut pool = init(&mut buf).unwrap();
    let p = pool.malloc(512).unwrap();
    fill(p, 32, 0x33);
    let p2 = pool.realloc(Some(p), 32).unwrap();
    assert_eq!(p, p2);
    verify(p2, 32, 0x33);
    pool.free(Some(p2));
}

// Four equal-sized neighboring blocks: freeing the one immediately to the
// right of a live block and growing into it should keep the same pointer.
#[test]
fn realloc_grows_right_into_a_freed_neighbor() {
    let mut buf = vec![0u8; 1 << 16];
    let mut pool = init(&mut buf).unwrap();

    let a = pool.malloc(256).unwrap();
    let b = pool.malloc(256).unwrap();
    let c = pool.malloc(256).unwrap();
    let d = pool.malloc(256).unwrap();
    fill(a, 256, 0xAA);
    pool.free(Some(b));

    let grown = pool.realloc(Some(a), 400).unwrap();
    assert_eq!(grown, a, "growing right should not need to relocate");
    verify(grown, 256, 0xAA);

    pool.free(Some(grown));
    pool.free(Some(c));
    pool.free(Some(d));
    pool.debug_check_invariants();
}

// Freeing the block immediately to the left and growing into it moves the
// payload into the freed neighbor's address rather than relocating
// elsewhere in the pool.
#[test]
fn realloc_grows_left_into_a_freed_neighbor() {
    let mut buf = vec![0u8; 1 << 16];
    let mut pool = init(&mut buf).unwrap();

    let a = pool.malloc(256).unwrap();
    let b = pool.malloc(256).unwrap();
    let c = pool.malloc(256).unwrap();
    fill(b, 256, 0xBB);
    pool.free(Some(a));

    let grown = pool.realloc(Some(b), 400).unwrap();
    assert_eq!(grown, a, "growing left should reuse the freed neighbor's address");
    verify(grown, 256, 0xBB);

    pool.free(Some(grown));
    pool.free(Some(c));
    pool.debug_check_invariants();
}

// With no adjacent free space on either side, realloc must relocate.
#[test]
fn realloc_relocates_when_neighbors_are_in_use() {
    let mut buf = vec![0u8; 1 << 16];
    let mut pool = init(&mut buf).unwrap();

    let a = pool.malloc(256).unwrap();
    let b = pool.malloc(256).unwrap();
    let c = pool.malloc(256).unwrap();
    fill(b, 256, 0xCC);

    let grown = pool.realloc(Some(b), 4096).unwrap();
    assert_ne!(grown, b, "growth with no free neighbors must relocate");
    verify(grown, 256, 0xCC);

    pool.free(Some(a));
    pool.free(Some(grown));
    pool.free(Some(c));
    pool.debug_check_invariants();
}
