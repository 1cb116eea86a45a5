/// Entries that can be scheduled on a [`Timeline`].
pub trait Timed {
    fn time(&self) -> i64;
}

/// Queue ordered by ascending time. Entries with equal times keep their
/// insertion order.
#[derive(Debug, Clone)]
pub struct Timeline<T> {
    entries: Vec<T>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Timeline {
            entries: Vec::new(),
        }
    }
}

impl<T: Timed> Timeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, entry: T) {
        let t = entry.time();
        let idx = self.entries.partition_point(|e| e.time() <= t);
        self.entries.insert(idx, entry);
    }

    pub fn dequeue(&mut self) -> Option<T> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    pub fn peek(&self) -> Option<&T> {
        self.entries.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
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

    /// Lets `f` rewrite entries in place (it receives each entry's current
    /// position), then restores time order. Ties keep their previous order.
    pub fn retime<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, &mut T),
    {
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            f(idx, entry);
        }
        self.entries.sort_by_key(|e| e.time());
    }
}
