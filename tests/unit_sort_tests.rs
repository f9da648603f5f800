mod common;

use std::collections::BTreeSet;

use category_report::models::JoinResult;
use common::tied_groups;

fn result(sums: &[u32]) -> JoinResult {
    let mut r = JoinResult::with_capacity(sums.len());
    for (i, sum) in sums.iter().enumerate() {
        // num_users derived from the category so lockstep moves can be checked
        r.push(i as u8, *sum, i as u32 * 10);
    }
    r
}

fn assert_lockstep(r: &JoinResult, original: &[u32]) {
    for (category, sum, users) in r.rows() {
        assert_eq!(sum, original[category as usize]);
        assert_eq!(users, category as u32 * 10);
    }
}

#[test]
fn test_sort_descending() {
    let sums = [5, 40, 12, 7, 99, 0];
    let mut r = result(&sums);

    r.sort(true);

    assert_eq!(r.sum_amount, vec![99, 40, 12, 7, 5, 0]);
    assert_eq!(r.category_id, vec![4, 1, 2, 3, 0, 5]);
    assert_lockstep(&r, &sums);
}

#[test]
fn test_sort_ascending() {
    let sums = [5, 40, 12, 7, 99, 0];
    let mut r = result(&sums);

    r.sort(false);

    assert_eq!(r.sum_amount, vec![0, 5, 7, 12, 40, 99]);
    assert_eq!(r.category_id, vec![5, 0, 3, 2, 1, 4]);
    assert_lockstep(&r, &sums);
}

#[test]
fn test_sort_empty_and_single() {
    let mut empty = JoinResult::<u32>::default();
    empty.sort(true);
    assert!(empty.is_empty());

    let mut single = result(&[42]);
    single.sort(false);
    assert_eq!(single.category_id, vec![0]);
    assert_eq!(single.sum_amount, vec![42]);
}

#[test]
fn test_descending_is_reverse_of_ascending_with_ties_as_sets() {
    let sums: Vec<u32> = (0..200u32).map(|i| (i * 7919) % 37).collect();
    let mut desc = result(&sums);
    let mut asc = result(&sums);

    desc.sort(true);
    asc.sort(false);

    assert_lockstep(&desc, &sums);
    assert_lockstep(&asc, &sums);

    let mut desc_groups = tied_groups(&desc);
    let asc_groups = tied_groups(&asc);
    desc_groups.reverse();

    assert_eq!(desc_groups, asc_groups);
    // every sum value forms exactly one group
    let distinct: BTreeSet<u32> = sums.iter().copied().collect();
    assert_eq!(asc_groups.len(), distinct.len());
}

#[test]
fn test_sort_keeps_capacity() {
    let mut r = result(&[3, 1, 2]);
    let ptr = r.sum_amount.as_ptr();

    r.sort(true);

    assert_eq!(r.sum_amount.as_ptr(), ptr);
    assert_eq!(r.sum_amount, vec![3, 2, 1]);
}

#[test]
fn test_nan_sums_sort_last_in_both_directions() {
    let build = || JoinResult {
        category_id: vec![0, 1, 2, 3, 4],
        num_users: vec![1, 1, 1, 1, 1],
        sum_amount: vec![2.5, f64::NAN, 10.0, f64::NAN, -1.0],
    };

    let mut desc = build();
    desc.sort(true);
    assert_eq!(&desc.sum_amount[..3], &[10.0, 2.5, -1.0]);
    assert!(desc.sum_amount[3..].iter().all(|v| v.is_nan()));
    let nan_categories: BTreeSet<u8> = desc.category_id[3..].iter().copied().collect();
    assert_eq!(nan_categories, BTreeSet::from([1, 3]));

    let mut asc = build();
    asc.sort(false);
    assert_eq!(&asc.sum_amount[..3], &[-1.0, 2.5, 10.0]);
    assert_eq!(asc.category_id[..3], [4, 0, 2]);
    assert!(asc.sum_amount[3..].iter().all(|v| v.is_nan()));
}
