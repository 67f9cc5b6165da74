//! The user-reserved storage regime (spec.md §1/§4.4): the table reads
//! and writes a caller-owned buffer but never frees it. Here the buffer
//! comes from a raw `libc::malloc`, standing in for the memory-mapped or
//! FFI-owned buffers this regime exists for.

#![cfg(unix)]

use flatmap::FlatMap;
use std::collections::hash_map::RandomState;

#[test]
fn table_over_a_raw_malloced_buffer_never_frees_it() {
    const LEN: usize = 4096;
    let ptr = unsafe { libc::malloc(LEN) } as *mut u8;
    assert!(!ptr.is_null());

    {
        let mut map: FlatMap<u64, u64, RandomState> =
            unsafe { FlatMap::from_raw_parts_and_hasher(ptr, LEN, RandomState::new()) }.unwrap();
        for k in 0..20u64 {
            map.insert(k, k * 3).unwrap();
        }
        for k in 0..20u64 {
            assert_eq!(map.get(&k), Some(&(k * 3)));
        }
        // `map` drops here: it must run destructors over live records
        // without ever calling `free` on `ptr`.
    }

    // the buffer is still ours to free, which would double-free (and
    // likely abort) had the table freed it on drop.
    unsafe { libc::free(ptr as *mut libc::c_void) };
}
