//! Layout checks for the callback table.

use std::mem::size_of;

use peg_runtime_core::Operation;

use super::*;

#[test]
fn slot_count_matches_operation_list() {
    assert_eq!(
        usize::try_from(CALLBACK_COUNT).expect("count fits"),
        Operation::ALL.len()
    );
}

#[test]
fn table_is_header_plus_one_pointer_per_slot() {
    let header = 2 * size_of::<u32>();
    let slots = Operation::ALL.len() * size_of::<usize>();
    assert_eq!(size_of::<CallbackTable>(), header.next_multiple_of(size_of::<usize>()) + slots);
}

#[test]
fn runtime_table_describes_current_abi() {
    assert_eq!(RUNTIME_TABLE.descriptor(), AbiDescriptor::CURRENT);
    assert!(AbiDescriptor::CURRENT.is_compatible());
}

#[test]
fn mismatching_descriptors_are_incompatible() {
    let newer = AbiDescriptor {
        version: ABI_VERSION + 1,
        callback_count: CALLBACK_COUNT,
    };
    let shorter = AbiDescriptor {
        version: ABI_VERSION,
        callback_count: CALLBACK_COUNT - 3,
    };
    assert!(!newer.is_compatible());
    assert!(!shorter.is_compatible());
}
