use std::ops::Range;

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Linear range removed, in offsets of the previous version
    pub removed: Range<usize>,
    /// Linear range of the inserted text, in offsets of the new version
    pub inserted: Range<usize>,
    /// Document version after the command
    pub version: u64,
    /// False when the command was dropped or had nothing to do
    pub applied: bool,
}

impl Patch {
    pub(crate) fn unchanged(version: u64) -> Self {
        Self {
            removed: 0..0,
            inserted: 0..0,
            version,
            applied: false,
        }
    }

    pub(crate) fn replaced(removed: Range<usize>, inserted_len: usize, version: u64) -> Self {
        let start = removed.start;
        Self {
            removed,
            inserted: start..start + inserted_len,
            version,
            applied: true,
        }
    }

    /// Map an offset from the previous version into the new one.
    ///
    /// Offsets inside the removed range collapse onto the edit point. At the
    /// edit point itself, `after` decides whether the offset stays before the
    /// inserted text or moves past it.
    pub fn transform_offset(&self, offset: usize, after: bool) -> usize {
        if !self.applied {
            return offset;
        }
        let inserted_len = self.inserted.len();
        if offset < self.removed.start {
            offset
        } else if offset >= self.removed.end && offset > self.removed.start {
            offset - self.removed.len() + inserted_len
        } else if after {
            self.removed.start + inserted_len
        } else {
            self.removed.start
        }
    }

    /// Map a range across the edit; insertions at its start push it forward
    /// and insertions at its end do not widen it
    pub fn transform_range(&self, range: Range<usize>) -> Range<usize> {
        let start = self.transform_offset(range.start, true);
        let end = self.transform_offset(range.end, false).max(start);
        start..end
    }
}
