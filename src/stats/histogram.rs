use std::cmp::Ordering;

/// Distinct keys in ascending order, each with the number of times it was
/// recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram<K> {
    entries: Vec<(K, u32)>,
}

impl<K> Default for Histogram<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: Copy + PartialOrd> Histogram<K> {
    pub fn from_values(values: impl IntoIterator<Item = K>) -> Self {
        let mut histogram = Self::default();
        for value in values {
            histogram.record(value);
        }
        histogram
    }

    pub fn record(&mut self, key: K) {
        match self.search(key) {
            Ok(index) => self.entries[index].1 += 1,
            Err(index) => self.entries.insert(index, (key, 1)),
        }
    }

    pub fn index_of(&self, key: K) -> Option<usize> {
        self.search(key).ok()
    }

    pub fn count(&self, key: K) -> Option<u32> {
        self.index_of(key).map(|index| self.entries[index].1)
    }

    pub fn entries(&self) -> &[(K, u32)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn search(&self, key: K) -> Result<usize, usize> {
        self.entries.binary_search_by(|(probe, _)| {
            probe.partial_cmp(&key).unwrap_or(Ordering::Less)
        })
    }
}
