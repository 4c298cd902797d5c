//! Deterministic image ordering and master ID assignment.
//!
//! Images are ordered by their file name without extension, compared
//! case-insensitively by code point (not locale aware). Equal keys keep their
//! input order. Each image then receives the next ID from an [`IdSequence`],
//! so an image's ID is its 1-based position in the sorted list. IDs are fixed
//! before any image is processed: an image that later fails to process leaves
//! a gap instead of shifting the IDs of the images after it.

use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::{
    master::{MasterId, display_name_of},
    request::StencilRequest,
};

/// Errors raised while ordering a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    #[error("no images to process")]
    EmptyInput,

    #[error("too many images: master IDs exhausted")]
    IdsExhausted,
}

/// Explicit source of sequential master IDs, starting at 1.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: Option<MasterId>,
}

impl IdSequence {
    pub fn new() -> Self {
        Self {
            next: Some(MasterId::FIRST),
        }
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for IdSequence {
    type Item = MasterId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next();
        Some(current)
    }
}

/// A source image with its assigned master ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    id: MasterId,
    path: PathBuf,
}

impl Candidate {
    pub fn id(&self) -> MasterId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Orders the request's images and assigns their master IDs.
///
/// # Errors
///
/// Returns [`OrderingError::EmptyInput`] when the request has no images.
pub fn order_images(request: &StencilRequest) -> Result<Vec<Candidate>, OrderingError> {
    if request.is_empty() {
        return Err(OrderingError::EmptyInput);
    }

    let mut sorted: Vec<&PathBuf> = request.image_paths().iter().collect();
    // Stable: equal keys keep their input order.
    sorted.sort_by_cached_key(|path| sort_key(path));

    let mut ids = IdSequence::new();
    let candidates = sorted
        .into_iter()
        .map(|path| {
            let id = ids.next().ok_or(OrderingError::IdsExhausted)?;
            debug!(id = id.get(), path = path.display().to_string(); "Assigned master ID");
            Ok(Candidate {
                id,
                path: path.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(candidates)
}

/// Case-folded file name without extension.
fn sort_key(path: &Path) -> String {
    display_name_of(path).chars().map(simple_uppercase).collect()
}

/// One-to-one upper-case mapping; characters whose upper case expands to
/// several characters (`ß` → `SS`) are left as they are.
fn simple_uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(mapped), None) => mapped,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ordered_names(paths: &[&str]) -> Vec<(u32, String)> {
        let request: StencilRequest = paths.iter().collect();
        order_images(&request)
            .expect("non-empty request")
            .into_iter()
            .map(|c| (c.id().get(), c.path().to_string_lossy().into_owned()))
            .collect()
    }

    #[test]
    fn test_empty_request_fails() {
        let request = StencilRequest::default();
        assert_eq!(order_images(&request), Err(OrderingError::EmptyInput));
    }

    #[test]
    fn test_orders_by_stem_ignoring_case() {
        let ordered = ordered_names(&["dir/charlie.png", "dir/Alpha.jpg", "dir/bravo.bmp"]);

        assert_eq!(
            ordered,
            vec![
                (1, "dir/Alpha.jpg".to_string()),
                (2, "dir/bravo.bmp".to_string()),
                (3, "dir/charlie.png".to_string()),
            ]
        );
    }

    #[test]
    fn test_extension_is_not_part_of_key() {
        // "a.zzz" sorts before "a_b.aaa" because only "a" vs "a_b" is compared.
        let ordered = ordered_names(&["x/a_b.aaa", "x/a.zzz"]);

        assert_eq!(ordered[0].1, "x/a.zzz");
        assert_eq!(ordered[1].1, "x/a_b.aaa");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ordered = ordered_names(&["one/Icon.png", "two/icon.jpg", "three/ICON.bmp"]);

        assert_eq!(
            ordered.iter().map(|(_, p)| p.as_str()).collect::<Vec<_>>(),
            vec!["one/Icon.png", "two/icon.jpg", "three/ICON.bmp"]
        );
        assert_eq!(
            ordered.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_id_sequence_counts_from_one() {
        let ids: Vec<u32> = IdSequence::new().take(4).map(MasterId::get).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_expanding_uppercase_is_not_applied() {
        // 'ß' keeps its own code point (0xDF) instead of becoming "SS".
        let ordered = ordered_names(&["straße.png", "strasse2.png"]);
        assert_eq!(ordered[0].1, "strasse2.png");
        assert_eq!(ordered[1].1, "straße.png");

        assert_eq!(simple_uppercase('ß'), 'ß');
        assert_eq!(simple_uppercase('é'), 'É');
    }

    #[test]
    fn test_ordinal_comparison_after_case_fold() {
        // '_' (0x5F) sorts after upper-cased letters (0x41..0x5A).
        let ordered = ordered_names(&["_under.png", "zeta.png"]);
        assert_eq!(ordered[0].1, "zeta.png");
        assert_eq!(ordered[1].1, "_under.png");
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    const NAMES: [&str; 6] = [
        "imgs/Router.png",
        "imgs/firewall.png",
        "imgs/Switch.jpg",
        "imgs/cloud.bmp",
        "imgs/database.png",
        "imgs/Load Balancer.png",
    ];

    const EXPECTED: [&str; 6] = [
        "imgs/cloud.bmp",
        "imgs/database.png",
        "imgs/firewall.png",
        "imgs/Load Balancer.png",
        "imgs/Router.png",
        "imgs/Switch.jpg",
    ];

    fn permutation_strategy() -> impl Strategy<Value = Vec<&'static str>> {
        Just(NAMES.to_vec()).prop_shuffle()
    }

    /// Any permutation of distinct names yields the same IDs per name.
    fn check_order_is_permutation_invariant(names: Vec<&str>) -> Result<(), TestCaseError> {
        let request: StencilRequest = names.iter().collect();
        let ordered = order_images(&request).expect("non-empty");

        for (index, candidate) in ordered.iter().enumerate() {
            prop_assert_eq!(candidate.id().get() as usize, index + 1);
            prop_assert_eq!(candidate.path(), Path::new(EXPECTED[index]));
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn order_is_permutation_invariant(names in permutation_strategy()) {
            check_order_is_permutation_invariant(names)?;
        }
    }
}
