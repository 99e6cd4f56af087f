use std::{cmp::Ordering, collections::BTreeSet, hash::Hash};

/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
pub type Set<S> = fxhash::FxHashSet<S>;
/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which associates
/// each `L` with precisely one `R` and vice versa.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;

/// A partition groups elements of type `I` into disjoint classes, for example the
/// states of an automaton into their equivalence classes.
#[derive(Debug, Clone)]
pub struct Partition<I: Hash + Eq>(Vec<BTreeSet<I>>);

impl<I: Hash + Eq> std::ops::Deref for Partition<I> {
    type Target = Vec<BTreeSet<I>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a, I: Hash + Eq> IntoIterator for &'a Partition<I> {
    type Item = &'a BTreeSet<I>;
    type IntoIter = std::slice::Iter<'a, BTreeSet<I>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<I: Hash + Eq> PartialEq for Partition<I> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|o| other.contains(o))
    }
}
impl<I: Hash + Eq> Eq for Partition<I> {}

impl<I: Hash + Eq + Ord> Partition<I> {
    /// Returns the size of the partition, i.e. the number of classes.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Builds a new partition from an iterator that yields iterators
    /// which yield elements of type `I`.
    pub fn new<X: IntoIterator<Item = I>, Y: IntoIterator<Item = X>>(iter: Y) -> Self {
        Self(
            iter.into_iter()
                .map(|it| it.into_iter().collect::<BTreeSet<_>>())
                .collect(),
        )
    }

    /// Returns the class containing `element`, if any.
    pub fn class_of(&self, element: &I) -> Option<&BTreeSet<I>> {
        self.0.iter().find(|class| class.contains(element))
    }
}

impl<I: Hash + Eq + Ord> From<Vec<BTreeSet<I>>> for Partition<I> {
    fn from(value: Vec<BTreeSet<I>>) -> Self {
        Self(value)
    }
}

/// Splits a string into maximal runs of ASCII digits and runs of everything else.
struct Chunks<'a>(&'a str);

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let digit = self.0.chars().next()?.is_ascii_digit();
        let end = self
            .0
            .find(|c: char| c.is_ascii_digit() != digit)
            .unwrap_or(self.0.len());
        let (chunk, rest) = self.0.split_at(end);
        self.0 = rest;
        Some(chunk)
    }
}

fn is_number(chunk: &str) -> bool {
    chunk.bytes().all(|b| b.is_ascii_digit())
}

fn compare_chunks(left: &str, right: &str) -> Ordering {
    if is_number(left) && is_number(right) {
        let l = left.trim_start_matches('0');
        let r = right.trim_start_matches('0');
        l.len().cmp(&r.len()).then_with(|| l.cmp(r))
    } else {
        left.cmp(right)
    }
}

/// Compares two identifiers in natural (alphanumeric) order, where runs of digits are
/// compared by their numeric value. This means `s2 < s10`, whereas the lexicographic
/// order would put `s10` first. Identifiers which only differ in leading zeros fall back
/// to the lexicographic order, so the result is a total order.
pub fn natural_cmp(left: &str, right: &str) -> Ordering {
    let mut l = Chunks(left);
    let mut r = Chunks(right);
    loop {
        match (l.next(), r.next()) {
            (None, None) => return left.cmp(right),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match compare_chunks(x, y) {
                Ordering::Equal => continue,
                ord => return ord,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use itertools::Itertools;

    use super::{natural_cmp, Partition};

    #[test]
    fn natural_order_of_identifiers() {
        let mut ids = vec!["s10", "s2", "_INIT_", "s1", "q0", "s9", "_FINAL_"];
        ids.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(ids, vec!["_FINAL_", "_INIT_", "q0", "s1", "s2", "s9", "s10"]);

        assert_eq!(natural_cmp("a2b", "a2c"), Ordering::Less);
        assert_eq!(natural_cmp("a10b", "a9c"), Ordering::Greater);
        assert_eq!(natural_cmp("x", "x1"), Ordering::Less);
        assert_eq!(natural_cmp("q007", "q7"), Ordering::Less);
        assert_eq!(natural_cmp("q7", "q7"), Ordering::Equal);
    }

    #[test]
    fn partition_equality_ignores_class_order() {
        let left = Partition::new([vec![1, 2], vec![3]]);
        let right = Partition::new([vec![3], vec![2, 1]]);
        assert_eq!(left, right);
        assert_eq!(left.size(), 2);
        assert_eq!(
            left.class_of(&2).map(|c| c.iter().copied().collect_vec()),
            Some(vec![1, 2])
        );
        assert!(left.class_of(&4).is_none());
    }
}
