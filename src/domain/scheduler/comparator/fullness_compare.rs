use std::cmp::Ordering;

use crate::domain::scheduler::available_candidate::AvailableCandidate;

/// Orders candidates by descending fullness so that already busy resources are filled up first
/// and empty ones stay free for large requests.
pub struct FullnessCompare;

impl FullnessCompare {
    /// Returns `Ordering::Less`, if candidate1 is fuller than candidate2
    ///         `Ordering::Greater`, if candidate1 is emptier than candidate2
    ///
    /// Note: if both are equally full, the registration_index (declaration order) decides.
    pub fn compare(candidate1: &AvailableCandidate, candidate2: &AvailableCandidate) -> Ordering {
        if candidate1.registration_index == candidate2.registration_index {
            return Ordering::Equal;
        }

        match candidate2.fullness_ratio().partial_cmp(&candidate1.fullness_ratio()) {
            Some(Ordering::Equal) | None => candidate1.registration_index.cmp(&candidate2.registration_index),
            Some(ord) => ord,
        }
    }

    pub fn sort(candidates: &mut [AvailableCandidate]) {
        candidates.sort_unstable_by(Self::compare);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::utils::id::ResourceId;

    fn candidate(name: &str, index: usize, maximum: u64, used: u64) -> AvailableCandidate {
        AvailableCandidate::new(ResourceId::new(name), index, maximum, used)
    }

    #[test]
    fn test_fuller_resources_come_first() {
        let mut candidates = vec![candidate("r1", 0, 10, 0), candidate("r2", 1, 10, 5), candidate("r3", 2, 4, 3)];
        FullnessCompare::sort(&mut candidates);
        let order: Vec<&str> = candidates.iter().map(|c| c.resource_id.as_str()).collect();
        assert_eq!(order, vec!["r3", "r2", "r1"]);
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let mut candidates = vec![candidate("b", 1, 10, 5), candidate("a", 0, 2, 1), candidate("c", 2, 4, 2)];
        FullnessCompare::sort(&mut candidates);
        let order: Vec<&str> = candidates.iter().map(|c| c.resource_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);

        let snapshot = candidates.clone();
        FullnessCompare::sort(&mut candidates);
        assert_eq!(candidates, snapshot, "Sorting an already sorted list must not change it.");
    }

    #[test]
    #[should_panic(expected = "ErrorNegativeAvailableCapacity")]
    fn test_overused_resource_is_fatal() {
        candidate("r1", 0, 2, 3);
    }
}
