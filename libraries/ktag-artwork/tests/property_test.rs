//! Property-based tests for picture selection

use ktag_artwork::SelectionPolicy;
use ktag_core::PictureCandidate;
use lofty::PictureType;
use proptest::prelude::*;

fn payloads(sizes: &[usize]) -> Vec<Vec<u8>> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| vec![i as u8; size])
        .collect()
}

fn candidates(payloads: &[Vec<u8>]) -> Vec<PictureCandidate<'_>> {
    payloads
        .iter()
        .map(|data| PictureCandidate {
            picture_type: PictureType::Other,
            mime_type: None,
            data,
        })
        .collect()
}

proptest! {
    /// Largest never loses to any other candidate and takes the first of equals
    #[test]
    fn largest_selects_first_maximum(sizes in prop::collection::vec(0usize..4096, 1..12)) {
        let data = payloads(&sizes);
        let candidates = candidates(&data);

        let selected = SelectionPolicy::Largest.select(&candidates).unwrap();
        let max = *sizes.iter().max().unwrap();
        let first_max = sizes.iter().position(|&size| size == max).unwrap();

        prop_assert_eq!(selected.len(), max);
        prop_assert!(std::ptr::eq(selected.data.as_ptr(), data[first_max].as_ptr()));
    }

    /// Selection is independent of where the maximum sits
    #[test]
    fn largest_ignores_order(mut sizes in prop::collection::vec(1usize..4096, 1..12)) {
        let forward = payloads(&sizes);
        let forward_len = SelectionPolicy::Largest.select(&candidates(&forward)).unwrap().len();

        sizes.reverse();
        let backward = payloads(&sizes);
        let backward_len = SelectionPolicy::Largest.select(&candidates(&backward)).unwrap().len();

        prop_assert_eq!(forward_len, backward_len);
    }

    /// On strictly ascending sizes both policies pick the last picture
    #[test]
    fn policies_agree_when_ascending(sizes in prop::collection::btree_set(1usize..4096, 1..12)) {
        let sizes: Vec<usize> = sizes.into_iter().collect();
        let data = payloads(&sizes);
        let candidates = candidates(&data);

        let largest = SelectionPolicy::Largest.select(&candidates).unwrap();
        let legacy = SelectionPolicy::Legacy.select(&candidates).unwrap();

        prop_assert_eq!(largest.len(), legacy.len());
        prop_assert_eq!(largest.len(), *sizes.last().unwrap());
    }
}
