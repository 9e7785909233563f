use crate::domain::utils::id::ResourceId;

/// A resource that can take more load of one capacity kind within the requested slot.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailableCandidate {
    pub resource_id: ResourceId,
    pub registration_index: usize,
    pub maximum_capacity: u64,
    pub available_capacity: u64,
}

impl AvailableCandidate {
    /// Wraps a resource with `used` of `maximum` capacity taken.
    ///
    /// Using more than the maximum means the bookkeeping is broken, which is fatal.
    pub fn new(resource_id: ResourceId, registration_index: usize, maximum_capacity: u64, used_capacity: u64) -> Self {
        if used_capacity > maximum_capacity {
            panic!(
                "ErrorNegativeAvailableCapacity: Resource {} uses {} of only {} capacity. This signals an error in the implementation.",
                resource_id, used_capacity, maximum_capacity
            );
        }
        Self { resource_id, registration_index, maximum_capacity, available_capacity: maximum_capacity - used_capacity }
    }

    /// `1 - available / maximum`. A resource without capacity counts as full.
    pub fn fullness_ratio(&self) -> f64 {
        if self.maximum_capacity == 0 {
            return 1.0;
        }
        1.0 - (self.available_capacity as f64 / self.maximum_capacity as f64)
    }
}
