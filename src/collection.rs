use std::collections::HashSet;
use std::hash::Hash;

/// A target able to absorb any number of captured values.
///
/// Implemented for the containers a [`Collection`](crate::Collection) capture
/// can write into.  `Option` keeps the last value absorbed, so an option
/// repeated on the command line ends up with its final occurrence.
pub trait Collectable<T> {
    /// Absorb one value.
    fn add(&mut self, item: T);
}

impl<T> Collectable<T> for Vec<T> {
    fn add(&mut self, item: T) {
        self.push(item);
    }
}

impl<T: Eq + Hash> Collectable<T> for HashSet<T> {
    fn add(&mut self, item: T) {
        self.insert(item);
    }
}

impl<T> Collectable<T> for Option<T> {
    fn add(&mut self, item: T) {
        self.replace(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec() {
        let mut collection: Vec<u32> = Vec::default();
        collection.add(1);
        collection.add(0);
        assert_eq!(collection, vec![1, 0]);
    }

    #[test]
    fn hash_set() {
        let mut collection: HashSet<u32> = HashSet::default();
        collection.add(1);
        collection.add(0);
        collection.add(1);
        assert_eq!(collection, HashSet::from([1, 0]));
    }

    #[test]
    fn option() {
        let mut collection: Option<u32> = None;
        collection.add(1);
        assert_eq!(collection, Some(1));
        collection.add(0);
        assert_eq!(collection, Some(0));
    }
}
