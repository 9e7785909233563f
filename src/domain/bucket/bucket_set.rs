use std::collections::BTreeSet;

use crate::domain::time_slot::{TimeSlot, Timestamp};

#[derive(Debug, Clone)]
struct Entry<T> {
    item: T,
    slot: TimeSlot,
}

/// Collection of items, each tagged with a half-open time slot, that can be queried for the
/// **buckets** of a query interval. A bucket is a maximal sub-interval in which the set of
/// covering items does not change. Intervals that merely touch never share a bucket.
///
/// Items with a zero-length slot do not split buckets. They are attached to the bucket that
/// contains their instant.
#[derive(Debug, Clone)]
pub struct BucketSet<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for BucketSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BucketSet<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Adds `item` covering `[start, end)`.
    pub fn add(&mut self, item: T, start: Timestamp, end: Timestamp) {
        if start > end {
            log::error!("ErrorInvalidInterval: Item added to BucketSet with start {} after end {}. Item is ignored.", start, end);
            return;
        }
        self.entries.push(Entry { item, slot: TimeSlot::new(start, end) });
    }

    /// Removes all items matching `predicate`.
    ///
    /// # Returns
    /// The number of removed items.
    pub fn remove_where(&mut self, predicate: impl Fn(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !predicate(&entry.item));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates all items with their slots in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, &TimeSlot)> {
        self.entries.iter().map(|entry| (&entry.item, &entry.slot))
    }

    /// Returns a lazy iterator over the buckets of `[start, end)`.
    ///
    /// The yielded buckets are ordered by start, contiguous and together cover exactly the query
    /// interval. Every item overlapping the query appears in every bucket it overlaps. Each call
    /// builds a fresh sweep so the iteration can be restarted at will.
    pub fn buckets_overlapping(&self, start: Timestamp, end: Timestamp) -> Buckets<'_, T> {
        Buckets::new(self, TimeSlot::new(start, end.max(start)))
    }

    /// Maximal summed `weight` of concurrently covering items within `[start, end)`.
    pub fn peak(&self, start: Timestamp, end: Timestamp, weight: impl Fn(&T) -> u64) -> u64 {
        self.buckets_overlapping(start, end).map(|bucket| bucket.sum_by(&weight)).max().unwrap_or(0)
    }
}

/// One maximal sub-interval of a query together with the items covering it.
#[derive(Debug)]
pub struct Bucket<'a, T> {
    pub slot: TimeSlot,
    members: Vec<&'a T>,
}

impl<'a, T> Bucket<'a, T> {
    pub fn members(&self) -> &[&'a T] {
        &self.members
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn sum_by(&self, weight: impl Fn(&T) -> u64) -> u64 {
        self.members.iter().map(|member| weight(*member)).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    // Closing sorts first so touching intervals are never active together.
    Close,
    Open,
}

/// Lazy sweep over the buckets of one query interval.
pub struct Buckets<'a, T> {
    set: &'a BucketSet<T>,
    query: TimeSlot,
    events: Vec<(Timestamp, EventKind, usize)>,
    next_event: usize,
    active: BTreeSet<usize>,
    points: Vec<(Timestamp, usize)>,
    cursor: Timestamp,
    point_query_done: bool,
}

impl<'a, T> Buckets<'a, T> {
    fn new(set: &'a BucketSet<T>, query: TimeSlot) -> Self {
        let mut events = Vec::new();
        let mut active = BTreeSet::new();
        let mut points = Vec::new();

        for (index, entry) in set.entries.iter().enumerate() {
            if !entry.slot.overlaps(&query) {
                continue;
            }
            if entry.slot.is_point() {
                points.push((entry.slot.start, index));
                continue;
            }
            if query.is_point() {
                active.insert(index);
                continue;
            }
            if entry.slot.start <= query.start {
                active.insert(index);
            } else {
                events.push((entry.slot.start, EventKind::Open, index));
            }
            if entry.slot.end < query.end {
                events.push((entry.slot.end, EventKind::Close, index));
            }
        }

        events.sort_unstable();

        Self { set, query, events, next_event: 0, active, points, cursor: query.start, point_query_done: false }
    }

    fn collect_members(&self, slot: &TimeSlot) -> Vec<&'a T> {
        let mut indices: Vec<usize> = self.active.iter().copied().collect();
        indices.extend(self.points.iter().filter(|(t, _)| slot.start <= *t && (*t < slot.end || slot.is_point())).map(|(_, index)| *index));
        indices.sort_unstable();
        indices.into_iter().map(|index| &self.set.entries[index].item).collect()
    }
}

impl<'a, T> Iterator for Buckets<'a, T> {
    type Item = Bucket<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.query.is_point() {
            if self.point_query_done {
                return None;
            }
            self.point_query_done = true;
            let members = self.collect_members(&self.query);
            return Some(Bucket { slot: self.query, members });
        }

        if self.cursor >= self.query.end {
            return None;
        }

        while let Some(&(time, kind, index)) = self.events.get(self.next_event) {
            if time != self.cursor {
                break;
            }
            match kind {
                EventKind::Close => {
                    self.active.remove(&index);
                }
                EventKind::Open => {
                    self.active.insert(index);
                }
            }
            self.next_event += 1;
        }

        let bucket_end = self.events.get(self.next_event).map(|(time, _, _)| *time).unwrap_or(self.query.end);
        let slot = TimeSlot::new(self.cursor, bucket_end);
        let members = self.collect_members(&slot);
        self.cursor = bucket_end;

        Some(Bucket { slot, members })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(bucket: &Bucket<'a, &'static str>) -> Vec<&'static str> {
        bucket.members().iter().map(|member| **member).collect()
    }

    #[test]
    fn test_touching_intervals_never_share_a_bucket() {
        let mut set = BucketSet::new();
        set.add("a", 0, 10);
        set.add("b", 10, 20);

        let buckets: Vec<_> = set.buckets_overlapping(0, 20).collect();
        assert_eq!(buckets.len(), 2, "Expected exactly two buckets for touching intervals.");
        assert_eq!(buckets[0].slot, TimeSlot::new(0, 10));
        assert_eq!(names(&buckets[0]), vec!["a"]);
        assert_eq!(buckets[1].slot, TimeSlot::new(10, 20));
        assert_eq!(names(&buckets[1]), vec!["b"]);
    }

    #[test]
    fn test_buckets_partition_the_query() {
        let mut set = BucketSet::new();
        set.add("a", 5, 30);
        set.add("b", 10, 15);
        set.add("c", 25, 60);

        let buckets: Vec<_> = set.buckets_overlapping(0, 50).collect();
        let slots: Vec<TimeSlot> = buckets.iter().map(|b| b.slot).collect();
        assert_eq!(
            slots,
            vec![
                TimeSlot::new(0, 5),
                TimeSlot::new(5, 10),
                TimeSlot::new(10, 15),
                TimeSlot::new(15, 25),
                TimeSlot::new(25, 30),
                TimeSlot::new(30, 50)
            ]
        );
        for pair in slots.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "Buckets must be contiguous.");
        }
        assert!(buckets[0].is_empty());
        assert_eq!(names(&buckets[2]), vec!["a", "b"]);
        assert_eq!(names(&buckets[4]), vec!["a", "c"]);
        assert_eq!(names(&buckets[5]), vec!["c"]);
    }

    #[test]
    fn test_membership_is_weighted_by_duration() {
        let mut set = BucketSet::new();
        set.add("before", 0, 40);
        set.add("inside", 20, 30);
        set.add("after", 35, 100);
        set.add("around", 5, 70);
        set.add("touching", 50, 60);
        set.add("outside", 200, 300);

        let query = TimeSlot::new(10, 50);
        let bucketed: i64 = set.buckets_overlapping(query.start, query.end).map(|b| b.size() as i64 * b.slot.duration()).sum();
        let overlapped: i64 = set.iter().filter_map(|(_, slot)| slot.intersection(&query)).map(|overlap| overlap.duration()).sum();

        // before 30 + inside 10 + after 15 + around 40
        assert_eq!(overlapped, 95);
        assert_eq!(bucketed, overlapped);
    }

    #[test]
    fn test_zero_length_item_is_attached_to_containing_bucket() {
        let mut set = BucketSet::new();
        set.add("long", 0, 10);
        set.add("point", 5, 5);

        let buckets: Vec<_> = set.buckets_overlapping(0, 20).collect();
        assert_eq!(buckets.len(), 2, "A point item must not split the bucket.");
        assert_eq!(names(&buckets[0]), vec!["long", "point"]);
        assert!(buckets[1].is_empty());
    }

    #[test]
    fn test_iteration_can_be_restarted() {
        let mut set = BucketSet::new();
        set.add(1u64, 0, 10);
        set.add(2u64, 5, 15);

        let first: Vec<TimeSlot> = set.buckets_overlapping(0, 20).map(|b| b.slot).collect();
        let second: Vec<TimeSlot> = set.buckets_overlapping(0, 20).map(|b| b.slot).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_peak_sums_concurrent_weights() {
        let mut set = BucketSet::new();
        set.add(3u64, 0, 10);
        set.add(2u64, 5, 15);
        set.add(4u64, 10, 20);

        assert_eq!(set.peak(0, 20, |w| *w), 6, "Touching items 3 and 4 must not be summed.");
        assert_eq!(set.peak(0, 5, |w| *w), 3);
        assert_eq!(set.peak(20, 30, |w| *w), 0);
    }

    #[test]
    fn test_empty_set_yields_one_empty_bucket() {
        let set: BucketSet<u64> = BucketSet::new();
        let buckets: Vec<_> = set.buckets_overlapping(0, 10).collect();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].slot, TimeSlot::new(0, 10));
        assert!(buckets[0].is_empty());
    }

    #[test]
    fn test_remove_where() {
        let mut set = BucketSet::new();
        set.add(1u64, 0, 10);
        set.add(2u64, 0, 10);
        assert_eq!(set.remove_where(|v| *v == 1), 1);
        assert_eq!(set.peak(0, 10, |w| *w), 2);
    }
}
