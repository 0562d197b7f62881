use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// Many-to-many membership set indexed in both directions.
#[derive(Debug)]
pub(crate) struct Relation<A, B> {
    forward: HashMap<A, BTreeSet<B>>,
    reverse: HashMap<B, BTreeSet<A>>,
}

impl<A, B> Default for Relation<A, B> {
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            reverse: HashMap::new(),
        }
    }
}

impl<A, B> Relation<A, B>
where
    A: Clone + Eq + Hash + Ord,
    B: Clone + Eq + Hash + Ord,
{
    /// `true` if the pair was not present before.
    pub fn insert(&mut self, a: A, b: B) -> bool {
        let inserted = self.forward.entry(a.clone()).or_default().insert(b.clone());
        if inserted {
            self.reverse.entry(b).or_default().insert(a);
        }
        inserted
    }

    /// `true` if the pair was present.
    pub fn remove(&mut self, a: &A, b: &B) -> bool {
        let removed = match self.forward.get_mut(a) {
            Some(set) => {
                let removed = set.remove(b);
                if set.is_empty() {
                    self.forward.remove(a);
                }
                removed
            }
            None => false,
        };
        if removed {
            if let Some(set) = self.reverse.get_mut(b) {
                set.remove(a);
                if set.is_empty() {
                    self.reverse.remove(b);
                }
            }
        }
        removed
    }

    pub fn contains(&self, a: &A, b: &B) -> bool {
        self.forward.get(a).is_some_and(|set| set.contains(b))
    }

    pub fn right_of(&self, a: &A) -> impl Iterator<Item = &B> {
        self.forward.get(a).into_iter().flatten()
    }

    pub fn left_of(&self, b: &B) -> impl Iterator<Item = &A> {
        self.reverse.get(b).into_iter().flatten()
    }

    /// Drop every pair whose left side is `a`. Returns how many were removed.
    pub fn remove_left(&mut self, a: &A) -> usize {
        let Some(rights) = self.forward.remove(a) else {
            return 0;
        };
        for b in &rights {
            if let Some(set) = self.reverse.get_mut(b) {
                set.remove(a);
                if set.is_empty() {
                    self.reverse.remove(b);
                }
            }
        }
        rights.len()
    }

    /// Drop every pair whose right side is `b`. Returns how many were removed.
    pub fn remove_right(&mut self, b: &B) -> usize {
        let Some(lefts) = self.reverse.remove(b) else {
            return 0;
        };
        for a in &lefts {
            if let Some(set) = self.forward.get_mut(a) {
                set.remove(b);
                if set.is_empty() {
                    self.forward.remove(a);
                }
            }
        }
        lefts.len()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }
}
