//! Wraparound properties of the document/page cursor over arbitrary
//! sequences of navigation operations.

use pagemark_core::navigator::{Document, Navigator};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Nav {
    Next,
    Prev,
    Forward,
    Backward,
}

fn nav_op() -> impl Strategy<Value = Nav> {
    prop_oneof![
        Just(Nav::Next),
        Just(Nav::Prev),
        Just(Nav::Forward),
        Just(Nav::Backward),
    ]
}

fn navigator(page_counts: &[usize]) -> Navigator {
    let docs = page_counts
        .iter()
        .enumerate()
        .map(|(i, count)| Document {
            path: format!("doc{i}.pdf").into(),
            page_count: Some(*count),
        })
        .collect();
    Navigator::new(docs, 0).unwrap()
}

proptest! {
    #[test]
    fn cursor_stays_in_bounds(
        page_counts in prop::collection::vec(1usize..6, 1..6),
        ops in prop::collection::vec(nav_op(), 0..64),
    ) {
        let mut nav = navigator(&page_counts);
        for op in ops {
            match op {
                Nav::Next => nav.next_document(),
                Nav::Prev => nav.prev_document(),
                Nav::Forward => nav.flip_page_forward(),
                Nav::Backward => nav.flip_page_backward(),
            }
            prop_assert!(nav.doc_index() < page_counts.len());
            prop_assert!(nav.page_index() < page_counts[nav.doc_index()]);
        }
    }

    #[test]
    fn document_moves_are_circular(
        len in 1usize..8,
        moves in prop::collection::vec(any::<bool>(), 0..64),
    ) {
        let mut nav = navigator(&vec![1; len]);
        let mut expected: i64 = 0;
        for forward in moves {
            if forward {
                nav.next_document();
                expected += 1;
            } else {
                nav.prev_document();
                expected -= 1;
            }
            prop_assert_eq!(nav.doc_index() as i64, expected.rem_euclid(len as i64));
        }
    }

    #[test]
    fn page_flips_are_circular(
        count in 1usize..10,
        flips in prop::collection::vec(any::<bool>(), 0..64),
    ) {
        let mut nav = navigator(&[count]);
        let mut expected: i64 = 0;
        for forward in flips {
            if forward {
                nav.flip_page_forward();
                expected += 1;
            } else {
                nav.flip_page_backward();
                expected -= 1;
            }
            prop_assert_eq!(nav.page_index() as i64, expected.rem_euclid(count as i64));
        }
    }

    #[test]
    fn a_full_lap_returns_to_start(len in 1usize..8, start in 0usize..8) {
        let mut nav = navigator(&vec![1; len]);
        for _ in 0..(start % len) {
            nav.next_document();
        }
        let before = nav.doc_index();
        for _ in 0..len {
            nav.prev_document();
        }
        prop_assert_eq!(nav.doc_index(), before);
    }
}
