//! Path ordering.
//!
//! A path is the list of sibling indices from the root of the nesting tree
//! down to an entity, e.g. `[lane_index, item_index]`. Paths only carry
//! ordering; they never address storage.

/// Position of a candidate path relative to an anchor path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SiblingDirection {
    /// Candidate precedes the anchor within the same parent
    Before,
    /// Candidate follows the anchor within the same parent
    After,
    /// Same path
    Same,
    /// Different parents or different depths
    NotSiblings,
}

/// Classify `candidate` relative to `anchor`.
pub fn get_sibling_direction(anchor: &[usize], candidate: &[usize]) -> SiblingDirection {
    if anchor.len() != candidate.len() {
        return SiblingDirection::NotSiblings;
    }

    let Some((anchor_last, anchor_parent)) = anchor.split_last() else {
        // Two empty paths: both are the root
        return SiblingDirection::Same;
    };
    let Some((candidate_last, candidate_parent)) = candidate.split_last() else {
        return SiblingDirection::NotSiblings;
    };

    if anchor_parent != candidate_parent {
        return SiblingDirection::NotSiblings;
    }

    match candidate_last.cmp(anchor_last) {
        std::cmp::Ordering::Less => SiblingDirection::Before,
        std::cmp::Ordering::Greater => SiblingDirection::After,
        std::cmp::Ordering::Equal => SiblingDirection::Same,
    }
}
