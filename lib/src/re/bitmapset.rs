use bitvec::vec::BitVec;

/// A set of NFA state ids that remembers insertion order.
///
/// Membership is checked with a bitmap that has one bit per possible id, so
/// both `insert` and `contains` are O(1). The bitmap grows as needed, ids
/// are expected to be dense (they are indexes into the NFA's state vector).
///
/// Clearing the set only touches the bits that were actually set, which
/// makes it cheap to reuse the same instance across many epsilon-closure
/// computations.
#[derive(Debug, Default)]
pub(crate) struct BitmapSet {
    // Ids in the set, in insertion order.
    items: Vec<u32>,
    // One bit per id.
    bitmap: BitVec<usize>,
}

impl BitmapSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            bitmap: BitVec::repeat(false, capacity),
        }
    }

    /// Adds an id to the set.
    ///
    /// Returns `true` if the id didn't exist in the set and was added, and
    /// `false` if it already existed.
    #[inline]
    pub fn insert(&mut self, id: u32) -> bool {
        let index = id as usize;
        if self.bitmap.len() <= index {
            self.bitmap.resize(index + 1, false);
        } else if self.bitmap[index] {
            return false;
        }
        self.bitmap.set(index, true);
        self.items.push(id);
        true
    }

    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.bitmap.get(id as usize).map(|bit| *bit).unwrap_or(false)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes all ids in the set.
    #[inline]
    pub fn clear(&mut self) {
        for id in self.items.drain(..) {
            self.bitmap.set(id as usize, false);
        }
    }

    /// Returns an iterator for the ids in the set, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.items.iter().copied()
    }
}
