use std::collections::BTreeSet;
use std::fmt::{Display, Error, Formatter};
use std::iter::FromIterator;

use crate::automata::StateId;

/// An ordered set of state ids.
/// Being ordered, two partitions with the same members compare (and hash) equal
/// regardless of the order the states were inserted in, so it can be used directly as the
/// canonical key of an NFA subset or as a block in a DFA partition.
#[derive(Debug, PartialEq, Eq, Clone, Hash, PartialOrd, Ord, Default)]
pub struct Partition(BTreeSet<StateId>);

impl Partition {
    pub fn create_empty() -> Self {
        Partition(BTreeSet::new())
    }

    pub fn create_from(set: BTreeSet<StateId>) -> Self {
        Partition(set)
    }

    pub fn singleton(x: StateId) -> Self {
        let mut res = Partition::create_empty();
        res.insert(x);
        res
    }

    /// Inserts the state, returns true if it wasn't already present
    pub fn insert(&mut self, x: StateId) -> bool {
        self.0.insert(x)
    }

    pub fn remove(&mut self, x: StateId) {
        self.0.remove(&x);
    }

    pub fn contains(&self, x: StateId) -> bool {
        self.0.contains(&x)
    }

    pub fn union_with(&mut self, other: &Partition) {
        self.0.extend(other.iter().copied())
    }

    pub fn first(&self) -> Option<StateId> {
        self.0.iter().next().copied()
    }

    pub fn iter(&self) -> std::collections::btree_set::Iter<StateId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<StateId> {
        self.0.iter().copied().collect()
    }
}

impl FromIterator<StateId> for Partition {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        Partition(iter.into_iter().collect())
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        f.write_str("{")?;
        for (index, x) in self.0.iter().enumerate() {
            if index != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", x)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::Partition;

    #[test]
    fn insertion_order_is_irrelevant() {
        let a: Partition = vec![3, 1, 2].into_iter().collect();
        let b: Partition = vec![2, 3, 1, 1].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.first(), Some(1));
        assert_eq!(format!("{}", a), "{1, 2, 3}");
    }
}
