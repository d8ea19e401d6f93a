use std::iter::FusedIterator;

use chrono::NaiveDate;

use super::{Calendar, CalendarError};

// -----------------------------------------------------------------------------
// BusinessDayCursor
// -----------------------------------------------------------------------------
/// Bidirectional cursor over the business days of a [`Calendar`].
///
/// A cursor is either positioned on a business day or at the end, one past the last day
/// of the valid range. Holidays are tracked with an index into the holiday offsets so
/// that stepping never searches the holidays from scratch.
///
/// ```
/// use chrono::NaiveDate;
/// use qcalendar::{Calendar, WeekdaySet};
///
/// let ymd = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap();
///
/// let mut cal = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
/// cal.add_weekend_days(WeekdaySet::SAT_SUN).unwrap();
/// cal.add_holiday(ymd(2024, 1, 15));
///
/// let mut cursor = cal.bizday_cursor(ymd(2024, 1, 13)).unwrap();
/// assert_eq!(cursor.date(), Some(ymd(2024, 1, 16)));
/// assert_eq!(cursor.move_prev(), Some(ymd(2024, 1, 12)));
///
/// let mut end = cal.bizday_cursor_end();
/// assert_eq!(end.move_prev(), Some(ymd(2024, 1, 31)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BusinessDayCursor<'a> {
    cal: &'a Calendar,
    /// Offset of the current day. Equal to the length of the calendar at the end.
    offset: u32,
    /// Index of the first holiday whose offset is not less than `offset`.
    hol_idx: usize,
}

impl PartialEq for BusinessDayCursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.cal, other.cal) && self.offset == other.offset
    }
}

impl Eq for BusinessDayCursor<'_> {}

//
// ctor
//
impl<'a> BusinessDayCursor<'a> {
    fn end(cal: &'a Calendar) -> Self {
        Self {
            cal,
            offset: cal.length() as u32,
            hol_idx: cal.num_holidays(),
        }
    }

    /// Position at the first business day on or after `offset`, which must be in range.
    fn at_or_after(cal: &'a Calendar, offset: u32) -> Self {
        let mut cursor = Self {
            cal,
            offset,
            hol_idx: cal.holidays.lower_bound(offset),
        };
        if !cursor.is_bizday_at(offset, cursor.hol_idx) {
            cursor.move_next();
        }
        cursor
    }
}

//
// methods
//
impl<'a> BusinessDayCursor<'a> {
    #[inline]
    pub fn calendar(&self) -> &'a Calendar {
        self.cal
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.offset as usize >= self.cal.length()
    }

    /// The current business day, or [`None`] at the end.
    #[inline]
    pub fn date(&self) -> Option<NaiveDate> {
        (!self.is_end()).then(|| self.cal.date_at(self.offset))
    }

    /// `hol_idx` must be the lower bound of `offset` in the holiday offsets.
    #[inline]
    fn is_bizday_at(&self, offset: u32, hol_idx: usize) -> bool {
        self.cal.holidays.offsets().get(hol_idx) != Some(&offset)
            && !self.cal.weekend.is_weekend_day(self.cal.date_at(offset))
    }

    /// Move to the next business day and return it.
    ///
    /// When there is none, the cursor moves to the end and [`None`] is returned.
    pub fn move_next(&mut self) -> Option<NaiveDate> {
        let len = self.cal.length() as u32;
        let offsets = self.cal.holidays.offsets();
        let mut offset = self.offset;
        let mut idx = self.hol_idx;
        while offset + 1 < len {
            offset += 1;
            while idx < offsets.len() && offsets[idx] < offset {
                idx += 1;
            }
            if self.is_bizday_at(offset, idx) {
                self.offset = offset;
                self.hol_idx = idx;
                return self.date();
            }
        }
        *self = Self::end(self.cal);
        None
    }

    /// Move to the previous business day and return it.
    ///
    /// Moving back from the end lands on the last business day.
    /// When there is no previous business day, the cursor is unchanged and [`None`] is returned.
    pub fn move_prev(&mut self) -> Option<NaiveDate> {
        let offsets = self.cal.holidays.offsets();
        let mut offset = self.offset.min(self.cal.length() as u32);
        let mut idx = self.hol_idx;
        while offset > 0 {
            offset -= 1;
            while idx > 0 && offsets[idx - 1] >= offset {
                idx -= 1;
            }
            if self.is_bizday_at(offset, idx) {
                self.offset = offset;
                self.hol_idx = idx;
                return self.date();
            }
        }
        None
    }
}

// -----------------------------------------------------------------------------
// BusinessDays
// -----------------------------------------------------------------------------
/// Double-ended iterator over business days, built from two cursors.
#[derive(Debug, Clone)]
pub struct BusinessDays<'a> {
    /// Next day to yield from the front.
    front: BusinessDayCursor<'a>,
    /// Last day yielded from the back, or the end.
    back: BusinessDayCursor<'a>,
}

impl<'a> Iterator for BusinessDays<'a> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let date = self.front.date();
        self.front.move_next();
        date
    }
}

impl<'a> DoubleEndedIterator for BusinessDays<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back.move_prev()
    }
}

impl<'a> FusedIterator for BusinessDays<'a> {}

//
// Calendar methods
//
impl Calendar {
    /// Cursor at the first business day on or after `date`.
    ///
    /// # Errors
    /// * [`CalendarError::EmptyCalendar`], [`CalendarError::OutOfValidRange`]: `date` is not in the valid range
    #[inline]
    pub fn bizday_cursor(&self, date: NaiveDate) -> Result<BusinessDayCursor<'_>, CalendarError> {
        let offset = self.checked_offset(date)?;
        Ok(BusinessDayCursor::at_or_after(self, offset))
    }

    /// Cursor at the end, one past the last day of the valid range.
    #[inline]
    pub fn bizday_cursor_end(&self) -> BusinessDayCursor<'_> {
        BusinessDayCursor::end(self)
    }

    /// Iterator over all business days in the valid range.
    ///
    /// ```
    /// use chrono::{NaiveDate, Weekday};
    /// use qcalendar::Calendar;
    ///
    /// let ymd = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    ///
    /// let mut cal = Calendar::with_valid_range(ymd(2024, 1, 4), ymd(2024, 1, 9)).unwrap();
    /// cal.add_weekend_day(Weekday::Sun).unwrap();
    /// cal.add_holiday(ymd(2024, 1, 5));
    ///
    /// let days = cal.iter_bizdays().collect::<Vec<_>>();
    /// assert_eq!(days, vec![ymd(2024, 1, 4), ymd(2024, 1, 6), ymd(2024, 1, 8), ymd(2024, 1, 9)]);
    ///
    /// let mut iter = cal.iter_bizdays();
    /// assert_eq!(iter.next_back(), Some(ymd(2024, 1, 9)));
    /// assert_eq!(iter.next(), Some(ymd(2024, 1, 4)));
    /// ```
    pub fn iter_bizdays(&self) -> BusinessDays<'_> {
        let front = if self.is_empty() {
            BusinessDayCursor::end(self)
        } else {
            BusinessDayCursor::at_or_after(self, 0)
        };
        BusinessDays {
            front,
            back: BusinessDayCursor::end(self),
        }
    }

    /// Iterator over the business days on or after `date`.
    ///
    /// # Errors
    /// * [`CalendarError::EmptyCalendar`], [`CalendarError::OutOfValidRange`]: `date` is not in the valid range
    pub fn iter_bizdays_from(&self, date: NaiveDate) -> Result<BusinessDays<'_>, CalendarError> {
        Ok(BusinessDays {
            front: self.bizday_cursor(date)?,
            back: BusinessDayCursor::end(self),
        })
    }

    /// Iterator over the business days in `[begin, end]`.
    ///
    /// The iterator is empty when `begin` is after `end`.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use qcalendar::{Calendar, WeekdaySet};
    ///
    /// let ymd = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    ///
    /// let mut cal = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
    /// cal.add_weekend_days(WeekdaySet::SAT_SUN).unwrap();
    ///
    /// let days = cal.iter_bizdays_between(ymd(2024, 1, 5), ymd(2024, 1, 8)).unwrap();
    /// assert_eq!(days.rev().collect::<Vec<_>>(), vec![ymd(2024, 1, 8), ymd(2024, 1, 5)]);
    /// ```
    ///
    /// # Errors
    /// * [`CalendarError::EmptyCalendar`], [`CalendarError::OutOfValidRange`]: `begin` or `end` is not in the valid range
    pub fn iter_bizdays_between(
        &self,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> Result<BusinessDays<'_>, CalendarError> {
        let lo = self.checked_offset(begin)?;
        let hi = self.checked_offset(end)?;
        let back = if hi as usize + 1 >= self.length() {
            BusinessDayCursor::end(self)
        } else {
            BusinessDayCursor::at_or_after(self, hi + 1)
        };
        let front = if lo > hi {
            back
        } else {
            BusinessDayCursor::at_or_after(self, lo)
        };
        Ok(BusinessDays { front, back })
    }
}
