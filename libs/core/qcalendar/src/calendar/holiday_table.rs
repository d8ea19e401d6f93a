use std::ops::Range;

use itertools::Itertools;

// -----------------------------------------------------------------------------
// HolidayTable
// -----------------------------------------------------------------------------
/// Holidays and their codes packed into three parallel arrays.
///
/// - `offsets`: strictly ascending day counts from the first date of the owning calendar
/// - `codes_index`: for each holiday, the start of its codes in `codes`.
///   The end is the next entry, or `codes.len()` for the last holiday.
/// - `codes`: flat pool of codes. Each holiday's chunk is ascending and duplicate-free.
///
/// Every mutator keeps the three arrays consistent with each other.
/// Positions returned by [`HolidayTable::insert`] and accepted by the other
/// mutators are indices into `offsets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub(crate) struct HolidayTable {
    offsets: Vec<u32>,
    codes_index: Vec<u32>,
    codes: Vec<i32>,
}

//
// ctor
//
impl HolidayTable {
    #[inline]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Build a table from raw arrays without checking them.
    #[cfg(test)]
    pub(crate) fn from_raw(offsets: Vec<u32>, codes_index: Vec<u32>, codes: Vec<i32>) -> Self {
        Self {
            offsets,
            codes_index,
            codes,
        }
    }
}

//
// accessors
//
impl HolidayTable {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    #[inline]
    pub(crate) fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    #[inline]
    pub(crate) fn codes_index(&self) -> &[u32] {
        &self.codes_index
    }

    #[inline]
    pub(crate) fn codes(&self) -> &[i32] {
        &self.codes
    }

    /// Index of the first holiday whose offset is not less than `offset`.
    #[inline]
    pub(crate) fn lower_bound(&self, offset: u32) -> usize {
        self.offsets.partition_point(|o| *o < offset)
    }

    /// Index of the holiday at exactly `offset`.
    #[inline]
    pub(crate) fn find(&self, offset: u32) -> Option<usize> {
        let idx = self.lower_bound(offset);
        (self.offsets.get(idx) == Some(&offset)).then_some(idx)
    }

    #[inline]
    fn code_range(&self, idx: usize) -> Range<usize> {
        let start = self.codes_index[idx] as usize;
        let end = self
            .codes_index
            .get(idx + 1)
            .map_or(self.codes.len(), |e| *e as usize);
        start..end
    }

    /// Codes of the holiday at `idx`.
    #[inline]
    pub(crate) fn codes_of(&self, idx: usize) -> &[i32] {
        &self.codes[self.code_range(idx)]
    }

    /// Iterate over `(offset, codes)` of the holidays in `idx_range`.
    pub(crate) fn entries(
        &self,
        idx_range: Range<usize>,
    ) -> impl DoubleEndedIterator<Item = (u32, &[i32])> + ExactSizeIterator + '_ {
        idx_range.map(|i| (self.offsets[i], self.codes_of(i)))
    }

    /// Check every structural invariant against a calendar of `length` days.
    pub(crate) fn is_consistent(&self, length: usize) -> bool {
        let offsets_ok = self.offsets.iter().tuple_windows().all(|(a, b)| a < b)
            && self.offsets.last().map_or(true, |o| (*o as usize) < length);
        let index_ok = self.offsets.len() == self.codes_index.len()
            && self.codes_index.first().map_or(true, |i| *i == 0)
            && self.codes_index.iter().tuple_windows().all(|(a, b)| a <= b)
            && self
                .codes_index
                .last()
                .map_or(self.codes.is_empty(), |i| (*i as usize) <= self.codes.len());
        let codes_ok = index_ok
            && (0..self.len()).all(|i| {
                self.codes_of(i)
                    .iter()
                    .tuple_windows()
                    .all(|(a, b)| a < b)
            });
        offsets_ok && codes_ok
    }
}

//
// mutators
//
impl HolidayTable {
    /// Insert a holiday at `offset` (no-op if present) and return its index.
    pub(crate) fn insert(&mut self, offset: u32) -> usize {
        // chronological insertion is the common case
        if self.offsets.last().map_or(true, |last| *last < offset) {
            self.offsets.push(offset);
            self.codes_index.push(self.codes.len() as u32);
            return self.offsets.len() - 1;
        }
        let idx = self.lower_bound(offset);
        if self.offsets[idx] != offset {
            let start = self.codes_index[idx];
            self.offsets.insert(idx, offset);
            self.codes_index.insert(idx, start);
        }
        idx
    }

    /// Add `code` to the holiday at `idx`. Returns `false` if it is already there.
    pub(crate) fn insert_code(&mut self, idx: usize, code: i32) -> bool {
        let range = self.code_range(idx);
        match self.codes[range.clone()].binary_search(&code) {
            Ok(_) => false,
            Err(pos) => {
                self.codes.insert(range.start + pos, code);
                self.codes_index[idx + 1..].iter_mut().for_each(|e| *e += 1);
                true
            }
        }
    }

    /// Remove the holiday at `idx` together with its codes.
    pub(crate) fn remove(&mut self, idx: usize) {
        let range = self.code_range(idx);
        let removed = range.len() as u32;
        self.codes.drain(range);
        self.codes_index[idx + 1..]
            .iter_mut()
            .for_each(|e| *e -= removed);
        self.offsets.remove(idx);
        self.codes_index.remove(idx);
    }

    /// Remove `code` from the holiday at `idx`. Returns `false` if it was not there.
    pub(crate) fn remove_code(&mut self, idx: usize, code: i32) -> bool {
        let range = self.code_range(idx);
        match self.codes[range.clone()].binary_search(&code) {
            Err(_) => false,
            Ok(pos) => {
                self.codes.remove(range.start + pos);
                self.codes_index[idx + 1..].iter_mut().for_each(|e| *e -= 1);
                true
            }
        }
    }

    /// Append a holiday after every existing one.
    ///
    /// `codes` must be ascending and duplicate-free.
    pub(crate) fn push(&mut self, offset: u32, codes: &[i32]) {
        debug_assert!(self.offsets.last().map_or(true, |last| *last < offset));
        debug_assert!(codes.iter().tuple_windows().all(|(a, b)| a < b));
        self.offsets.push(offset);
        self.codes_index.push(self.codes.len() as u32);
        self.codes.extend_from_slice(codes);
    }

    /// Add `delta` to every offset, e.g. when the first date of the calendar moves back.
    pub(crate) fn shift_offsets(&mut self, delta: u32) {
        self.offsets.iter_mut().for_each(|o| *o += delta);
    }

    /// Keep the holidays whose offset lies in `[lo, hi]` and re-express them relative to `lo`.
    ///
    /// `lo` may be negative when the new first date precedes the current one.
    pub(crate) fn retain_rebased(&mut self, lo: i64, hi: i64) {
        let start = self.offsets.partition_point(|o| i64::from(*o) < lo);
        let end = self.offsets.partition_point(|o| i64::from(*o) <= hi);
        if end <= start {
            self.clear();
            return;
        }

        let code_start = self.codes_index[start] as usize;
        let code_end = self
            .codes_index
            .get(end)
            .map_or(self.codes.len(), |e| *e as usize);

        self.codes.truncate(code_end);
        self.codes.drain(..code_start);
        self.offsets.truncate(end);
        self.offsets.drain(..start);
        self.codes_index.truncate(end);
        self.codes_index.drain(..start);

        let base = code_start as u32;
        self.codes_index.iter_mut().for_each(|e| *e -= base);
        if lo != 0 {
            self.offsets
                .iter_mut()
                .for_each(|o| *o = (i64::from(*o) - lo) as u32);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.offsets.clear();
        self.codes_index.clear();
        self.codes.clear();
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.offsets.reserve(additional);
        self.codes_index.reserve(additional);
    }

    pub(crate) fn reserve_codes(&mut self, additional: usize) {
        self.codes.reserve(additional);
    }
}
