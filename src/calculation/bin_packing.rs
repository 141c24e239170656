//! First-fit-decreasing truck packing.
//!
//! The packer is a pure function over weights and stacking limits. It knows
//! nothing about pieces, tiers or billing, which keeps it deterministic and
//! easy to property-test.

use rust_decimal::Decimal;

/// One unit to pack.
#[derive(Debug, Clone, PartialEq)]
pub struct PackItem<K> {
    /// Caller-defined identity of the unit.
    pub key: K,
    /// Weight in tons.
    pub weight: Decimal,
    /// The unit can only join a bin holding fewer than this many units.
    pub max_stackable: u32,
}

/// A packed bin (one truck).
#[derive(Debug, Clone, PartialEq)]
pub struct PackedBin<K> {
    /// Units in placement order.
    pub items: Vec<PackItem<K>>,
    /// Total weight.
    pub weight: Decimal,
    /// The bin holds a single unit heavier than the capacity. Such bins are
    /// closed and never receive another unit.
    pub oversized: bool,
}

impl<K> PackedBin<K> {
    fn accepts(&self, item: &PackItem<K>, capacity: Decimal) -> bool {
        !self.oversized
            && self.weight + item.weight <= capacity
            && (self.items.len() as u64) < u64::from(item.max_stackable)
    }
}

/// Packs items into bins of the given capacity using first-fit decreasing.
///
/// Items are stable-sorted by weight, heaviest first, so equal weights keep
/// their input order. Each item goes into the first open bin where it fits
/// by weight and by the item's stacking limit, or opens a new bin. An item
/// heavier than the capacity gets a dedicated oversized bin.
///
/// ```
/// use pricing_engine::calculation::{PackItem, first_fit_decreasing};
/// use rust_decimal::Decimal;
///
/// let items = vec![
///     PackItem { key: "a", weight: Decimal::from(15), max_stackable: 10 },
///     PackItem { key: "b", weight: Decimal::from(10), max_stackable: 10 },
/// ];
/// let bins = first_fit_decreasing(items, Decimal::from(25));
/// assert_eq!(bins.len(), 1);
/// assert_eq!(bins[0].weight, Decimal::from(25));
/// ```
pub fn first_fit_decreasing<K>(mut items: Vec<PackItem<K>>, capacity: Decimal) -> Vec<PackedBin<K>> {
    // sort_by is stable
    items.sort_by(|a, b| b.weight.cmp(&a.weight));

    let mut bins: Vec<PackedBin<K>> = Vec::new();

    for item in items {
        if item.weight > capacity {
            bins.push(PackedBin {
                weight: item.weight,
                items: vec![item],
                oversized: true,
            });
            continue;
        }

        match bins.iter_mut().find(|bin| bin.accepts(&item, capacity)) {
            Some(bin) => {
                bin.weight += item.weight;
                bin.items.push(item);
            }
            None => bins.push(PackedBin {
                weight: item.weight,
                items: vec![item],
                oversized: false,
            }),
        }
    }

    bins
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(key: u32, weight: &str) -> PackItem<u32> {
        PackItem {
            key,
            weight: dec(weight),
            max_stackable: 10,
        }
    }

    fn keys(bin: &PackedBin<u32>) -> Vec<u32> {
        bin.items.iter().map(|i| i.key).collect()
    }

    #[test]
    fn test_two_items_fill_one_bin_exactly() {
        let bins = first_fit_decreasing(vec![item(1, "15"), item(2, "10")], dec("25"));
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].weight, dec("25"));
        assert!(!bins[0].oversized);
    }

    #[test]
    fn test_heaviest_first_then_first_fit() {
        let bins = first_fit_decreasing(
            vec![item(1, "5"), item(2, "20"), item(3, "8"), item(4, "12")],
            dec("25"),
        );
        // Sorted: 20, 12, 8, 5 -> [20, 5], [12, 8]
        assert_eq!(bins.len(), 2);
        assert_eq!(keys(&bins[0]), vec![2, 1]);
        assert_eq!(keys(&bins[1]), vec![4, 3]);
    }

    #[test]
    fn test_oversized_item_gets_closed_bin() {
        let bins = first_fit_decreasing(vec![item(1, "30"), item(2, "2")], dec("25"));
        assert_eq!(bins.len(), 2);
        assert!(bins[0].oversized);
        assert_eq!(keys(&bins[0]), vec![1]);
        assert!(!bins[1].oversized);
        assert_eq!(keys(&bins[1]), vec![2]);
    }

    #[test]
    fn test_stacking_limit_opens_new_bin() {
        let items: Vec<PackItem<u32>> = (1..=5)
            .map(|k| PackItem {
                key: k,
                weight: dec("1"),
                max_stackable: 2,
            })
            .collect();
        let bins = first_fit_decreasing(items, dec("25"));
        assert_eq!(bins.len(), 3);
        assert!(bins.iter().all(|b| b.items.len() <= 2));
    }

    #[test]
    fn test_limit_applies_to_the_arriving_item() {
        // The heavy item allows 10 units; the light one only joins bins with fewer than 1.
        let items = vec![
            item(1, "10"),
            PackItem {
                key: 2,
                weight: dec("1"),
                max_stackable: 1,
            },
        ];
        let bins = first_fit_decreasing(items, dec("25"));
        assert_eq!(bins.len(), 2);
    }

    #[test]
    fn test_equal_weights_keep_input_order() {
        let bins = first_fit_decreasing(
            vec![item(3, "10"), item(1, "10"), item(2, "10")],
            dec("20"),
        );
        assert_eq!(keys(&bins[0]), vec![3, 1]);
        assert_eq!(keys(&bins[1]), vec![2]);
    }

    #[test]
    fn test_empty_input() {
        let bins: Vec<PackedBin<u32>> = first_fit_decreasing(vec![], dec("25"));
        assert!(bins.is_empty());
    }
}
