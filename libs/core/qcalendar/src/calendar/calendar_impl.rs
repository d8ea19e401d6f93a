use std::ops::RangeInclusive;

use anyhow::ensure;
use chrono::{Days, NaiveDate, Weekday};
use itertools::Itertools;

use super::{holiday_table::HolidayTable, weekend::WeekendDays, CalendarError};
use crate::WeekdaySet;

// -----------------------------------------------------------------------------
// _CalendarData
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, schemars::JsonSchema)]
struct _CalendarData {
    /// The inclusive valid range of the calendar. Absent for an empty calendar.
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_range: Option<_ValidRange>,

    /// Weekend days over time.
    weekend_days: WeekendDays,

    /// Holidays in ascending order of date, all within the valid range.
    holidays: Vec<_HolidayData>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, schemars::JsonSchema,
)]
struct _ValidRange {
    first: NaiveDate,
    last: NaiveDate,
}

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, schemars::JsonSchema,
)]
struct _HolidayData {
    date: NaiveDate,

    /// Holiday codes in ascending order without duplicates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    codes: Vec<i32>,
}

//
// ser/de
//
impl<'de> serde::Deserialize<'de> for _CalendarData {
    fn deserialize<D>(deserializer: D) -> Result<_CalendarData, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct _Data {
            valid_range: Option<_ValidRange>,
            #[serde(default)]
            weekend_days: WeekendDays,
            #[serde(default)]
            holidays: Vec<_HolidayData>,
        }

        let data = _Data::deserialize(deserializer)?;
        _CalendarData::new(data.valid_range, data.weekend_days, data.holidays)
            .map_err(serde::de::Error::custom)
    }
}

//
// ctor
//
impl _CalendarData {
    fn new(
        valid_range: Option<_ValidRange>,
        weekend_days: WeekendDays,
        holidays: Vec<_HolidayData>,
    ) -> anyhow::Result<Self> {
        match valid_range {
            None => ensure!(
                holidays.is_empty(),
                "An empty calendar can not have holidays: {} given",
                holidays.len()
            ),
            Some(_ValidRange { first, last }) => {
                ensure!(
                    first <= last,
                    "first must be less than or equal to last: first={first}, last={last}"
                );
                ensure!(
                    holidays.iter().all(|h| first <= h.date && h.date <= last),
                    "Holidays must be in the valid range [{first}, {last}]"
                );
            }
        }
        ensure!(
            holidays.iter().tuple_windows().all(|(a, b)| a.date < b.date),
            "Holidays must be strictly ascending by date"
        );
        for h in &holidays {
            ensure!(
                h.codes.iter().tuple_windows().all(|(a, b)| a < b),
                "Holiday codes of {} must be strictly ascending: {:?}",
                h.date,
                h.codes
            );
        }

        Ok(Self {
            valid_range,
            weekend_days,
            holidays,
        })
    }
}

impl From<&Calendar> for _CalendarData {
    fn from(cal: &Calendar) -> Self {
        _CalendarData {
            valid_range: cal
                .valid_range()
                .map(|r| _ValidRange {
                    first: *r.start(),
                    last: *r.end(),
                }),
            weekend_days: cal.weekend.clone(),
            holidays: cal
                .holidays_with_codes()
                .map(|(date, codes)| _HolidayData {
                    date,
                    codes: codes.to_vec(),
                })
                .collect(),
        }
    }
}

impl From<_CalendarData> for Calendar {
    fn from(data: _CalendarData) -> Self {
        let mut cal = Calendar::new();
        if let Some(_ValidRange { first, last }) = data.valid_range {
            cal.first = first;
            cal.last = last;
        }
        cal.weekend = data.weekend_days;
        cal.holidays.reserve(data.holidays.len());
        for h in &data.holidays {
            let offset = cal.offset_of(h.date);
            cal.holidays.push(offset, &h.codes);
        }
        cal.debug_check();
        cal
    }
}

// -----------------------------------------------------------------------------
// Calendar
// -----------------------------------------------------------------------------
/// Business-day calendar over a bounded range of dates
///
/// # Overview
/// A calendar consists of
/// - valid range: an inclusive range `[first, last]` of dates, or nothing for an empty calendar
/// - weekend days: [`WeekendDays`], possibly changing over time
/// - holidays: a sparse set of dates in the valid range, each carrying a sorted set of `i32` codes
///
/// A date in the valid range is a business day unless it is a holiday or a weekend day.
///
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use qcalendar::{Calendar, WeekdaySet};
///
/// let ymd = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap();
///
/// let mut cal = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
/// cal.add_weekend_days(WeekdaySet::SAT_SUN).unwrap();
/// cal.add_holiday_code(ymd(2024, 1, 15), 7);
///
/// assert_eq!(cal.num_weekend_days_in_range(), 8);
/// assert_eq!(cal.num_holidays(), 1);
/// assert_eq!(cal.num_bizdays(), 22);
/// assert_eq!(cal.holiday_codes(ymd(2024, 1, 15)), Ok(&[7][..]));
/// assert!(cal.is_holiday(ymd(2024, 1, 15)).unwrap());
/// assert!(!cal.is_weekend_day(ymd(2024, 1, 15)));
///
/// // dates out of the valid range are rejected
/// assert!(cal.is_bizday(ymd(2024, 2, 1)).is_err());
/// ```
///
/// # Storage
/// Holidays are stored as day offsets from the first date, together with
/// a flat pool of codes indexed per holiday. The flat arrays are exposed by
/// [`Calendar::holiday_offsets`], [`Calendar::holiday_codes_index`] and
/// [`Calendar::holiday_code_pool`].
///
/// # Combination of Calendars
/// Two calendars can be combined by set operations on their business days or non-business days.
/// See [`Calendar::union_bizdays`], [`Calendar::intersect_bizdays`],
/// [`Calendar::union_non_bizdays`] and [`Calendar::intersect_non_bizdays`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Calendar {
    pub(super) first: NaiveDate,
    pub(super) last: NaiveDate,
    pub(super) weekend: WeekendDays,
    pub(super) holidays: HolidayTable,
}

impl Default for Calendar {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

//
// ser/de
//
impl serde::Serialize for Calendar {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        _CalendarData::from(self).serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Calendar {
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Calendar, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        _CalendarData::deserialize(deserializer).map(Calendar::from)
    }
}

impl schemars::JsonSchema for Calendar {
    fn schema_name() -> String {
        "Calendar".to_string()
    }
    fn schema_id() -> std::borrow::Cow<'static, str> {
        "qcalendar::calendar::Calendar".into()
    }
    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        <_CalendarData as schemars::JsonSchema>::json_schema(gen)
    }
}

//
// ctor
//
impl Calendar {
    /// Create an empty calendar, with no valid day, no weekend days and no holidays.
    #[inline]
    pub fn new() -> Self {
        Self {
            first: NaiveDate::MAX,
            last: NaiveDate::MIN,
            weekend: WeekendDays::Never,
            holidays: HolidayTable::new(),
        }
    }

    /// Create a calendar valid on `[first, last]` with no weekend days and no holidays.
    ///
    /// # Errors
    /// * [`CalendarError::InvalidRange`]: `first > last`
    #[inline]
    pub fn with_valid_range(first: NaiveDate, last: NaiveDate) -> Result<Self, CalendarError> {
        if first > last {
            return Err(CalendarError::InvalidRange { first, last });
        }
        Ok(Self {
            first,
            last,
            ..Self::new()
        })
    }
}

//
// helpers
//
impl Calendar {
    /// Offset of a date which must not precede the first date.
    #[inline]
    pub(super) fn offset_of(&self, date: NaiveDate) -> u32 {
        date.signed_duration_since(self.first).num_days() as u32
    }

    /// Date at an offset which must be in `[0, length)`.
    #[inline]
    pub(super) fn date_at(&self, offset: u32) -> NaiveDate {
        self.first + Days::new(u64::from(offset))
    }

    /// Offset of `date` if it is in the valid range.
    #[inline]
    pub(super) fn checked_offset(&self, date: NaiveDate) -> Result<u32, CalendarError> {
        if self.is_empty() {
            Err(CalendarError::EmptyCalendar { date })
        } else if date < self.first || self.last < date {
            Err(CalendarError::OutOfValidRange {
                date,
                first: self.first,
                last: self.last,
            })
        } else {
            Ok(self.offset_of(date))
        }
    }

    #[inline]
    pub(super) fn debug_check(&self) {
        debug_assert!(
            self.holidays.is_consistent(self.length()),
            "holiday table is broken: {:?}",
            self.holidays
        );
        debug_assert!(!self.is_empty() || self.holidays.is_empty());
    }

    /// Count non-business days in `[first, last]`, both in the valid range.
    pub(super) fn count_non_bizdays(&self, first: NaiveDate, last: NaiveDate) -> usize {
        let weekend = self.weekend.count_in(first, last) as usize;
        let start = self.holidays.lower_bound(self.offset_of(first));
        let end = self.holidays.lower_bound(self.offset_of(last) + 1);
        let weekday_holidays = self.holidays.offsets()[start..end]
            .iter()
            .filter(|o| !self.weekend.is_weekend_day(self.date_at(**o)))
            .count();
        weekend + weekday_holidays
    }
}

//
// range
//
impl Calendar {
    /// The first date of the valid range, or [`None`] for an empty calendar.
    #[inline]
    pub fn first_date(&self) -> Option<NaiveDate> {
        (!self.is_empty()).then_some(self.first)
    }

    /// The last date of the valid range, or [`None`] for an empty calendar.
    #[inline]
    pub fn last_date(&self) -> Option<NaiveDate> {
        (!self.is_empty()).then_some(self.last)
    }

    /// The inclusive valid range, or [`None`] for an empty calendar.
    #[inline]
    pub fn valid_range(&self) -> Option<RangeInclusive<NaiveDate>> {
        (!self.is_empty()).then(|| self.first..=self.last)
    }

    /// Number of days in the valid range.
    #[inline]
    pub fn length(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.last.signed_duration_since(self.first).num_days() as usize + 1
        }
    }

    /// Whether the calendar has no valid day.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.last < self.first
    }

    #[inline]
    pub fn is_in_range(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    /// Extend the valid range to include `date`.
    ///
    /// On an empty calendar, the valid range becomes `[date, date]`.
    pub fn add_day(&mut self, date: NaiveDate) {
        if self.is_empty() {
            self.first = date;
            self.last = date;
        } else if date < self.first {
            self.holidays.shift_offsets(
                self.first.signed_duration_since(date).num_days() as u32,
            );
            self.first = date;
        } else if self.last < date {
            self.last = date;
        } else {
            return;
        }
        log::trace!("valid range extended to [{}, {}]", self.first, self.last);
    }

    /// Replace the valid range by `[first, last]`, dropping holidays outside of it.
    ///
    /// # Errors
    /// * [`CalendarError::InvalidRange`]: `first > last`. The calendar is unchanged.
    pub fn set_valid_range(
        &mut self,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<(), CalendarError> {
        if first > last {
            return Err(CalendarError::InvalidRange { first, last });
        }
        if !self.is_empty() {
            let before = self.holidays.len();
            self.holidays.retain_rebased(
                first.signed_duration_since(self.first).num_days(),
                last.signed_duration_since(self.first).num_days(),
            );
            let dropped = before - self.holidays.len();
            if dropped > 0 {
                log::debug!("{dropped} holidays dropped by new valid range [{first}, {last}]");
            }
        }
        self.first = first;
        self.last = last;
        self.debug_check();
        Ok(())
    }

    /// Reset to the empty calendar.
    pub fn remove_all(&mut self) {
        self.first = NaiveDate::MAX;
        self.last = NaiveDate::MIN;
        self.weekend = WeekendDays::Never;
        self.holidays.clear();
    }

    /// Reserve room for at least `additional` more holidays.
    #[inline]
    pub fn reserve_holiday_capacity(&mut self, additional: usize) {
        self.holidays.reserve(additional);
    }

    /// Reserve room for at least `additional` more holiday codes.
    #[inline]
    pub fn reserve_holiday_code_capacity(&mut self, additional: usize) {
        self.holidays.reserve_codes(additional);
    }
}

//
// holidays
//
impl Calendar {
    /// Mark `date` as a holiday, extending the valid range if needed.
    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.add_day(date);
        self.holidays.insert(self.offset_of(date));
        self.debug_check();
    }

    /// Mark `date` as a holiday carrying `code`, extending the valid range if needed.
    pub fn add_holiday_code(&mut self, date: NaiveDate, code: i32) {
        self.add_day(date);
        let idx = self.holidays.insert(self.offset_of(date));
        self.holidays.insert_code(idx, code);
        self.debug_check();
    }

    /// Mark `date` as a holiday if it is in the valid range.
    ///
    /// # Errors
    /// * [`CalendarError::EmptyCalendar`], [`CalendarError::OutOfValidRange`]:
    ///   `date` is not in the valid range. The calendar is unchanged.
    pub fn add_holiday_if_in_range(&mut self, date: NaiveDate) -> Result<(), CalendarError> {
        let offset = self.checked_offset(date)?;
        self.holidays.insert(offset);
        Ok(())
    }

    /// Mark `date` as a holiday carrying `code` if it is in the valid range.
    ///
    /// # Errors
    /// * [`CalendarError::EmptyCalendar`], [`CalendarError::OutOfValidRange`]:
    ///   `date` is not in the valid range. The calendar is unchanged.
    pub fn add_holiday_code_if_in_range(
        &mut self,
        date: NaiveDate,
        code: i32,
    ) -> Result<(), CalendarError> {
        let offset = self.checked_offset(date)?;
        let idx = self.holidays.insert(offset);
        self.holidays.insert_code(idx, code);
        Ok(())
    }

    /// Remove the holiday at `date` and all of its codes. Returns `false` if there was none.
    pub fn remove_holiday(&mut self, date: NaiveDate) -> bool {
        let Some(idx) = self.holiday_index(date) else {
            return false;
        };
        self.holidays.remove(idx);
        self.debug_check();
        true
    }

    /// Remove `code` from the holiday at `date`. Returns `false` if it was not there.
    ///
    /// The holiday itself is kept even when its last code is removed.
    pub fn remove_holiday_code(&mut self, date: NaiveDate, code: i32) -> bool {
        let Some(idx) = self.holiday_index(date) else {
            return false;
        };
        let removed = self.holidays.remove_code(idx, code);
        self.debug_check();
        removed
    }

    #[inline]
    fn holiday_index(&self, date: NaiveDate) -> Option<usize> {
        let offset = self.checked_offset(date).ok()?;
        self.holidays.find(offset)
    }

    /// Check if `date` is a holiday.
    ///
    /// # Errors
    /// * [`CalendarError::EmptyCalendar`], [`CalendarError::OutOfValidRange`]: `date` is not in the valid range
    #[inline]
    pub fn is_holiday(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        let offset = self.checked_offset(date)?;
        Ok(self.holidays.find(offset).is_some())
    }

    #[inline]
    pub fn num_holidays(&self) -> usize {
        self.holidays.len()
    }

    /// Total number of codes over all holidays.
    #[inline]
    pub fn num_holiday_codes_total(&self) -> usize {
        self.holidays.codes().len()
    }

    /// Number of codes of `date`, `0` when it is not a holiday.
    ///
    /// # Errors
    /// * [`CalendarError::EmptyCalendar`], [`CalendarError::OutOfValidRange`]: `date` is not in the valid range
    #[inline]
    pub fn num_holiday_codes(&self, date: NaiveDate) -> Result<usize, CalendarError> {
        self.holiday_codes(date).map(<[i32]>::len)
    }

    /// Codes of `date` in ascending order, empty when it is not a holiday.
    ///
    /// # Errors
    /// * [`CalendarError::EmptyCalendar`], [`CalendarError::OutOfValidRange`]: `date` is not in the valid range
    pub fn holiday_codes(&self, date: NaiveDate) -> Result<&[i32], CalendarError> {
        let offset = self.checked_offset(date)?;
        Ok(self
            .holidays
            .find(offset)
            .map_or(&[][..], |idx| self.holidays.codes_of(idx)))
    }

    /// The `index`-th code of the holiday at `date`.
    ///
    /// # Errors
    /// * [`CalendarError::EmptyCalendar`], [`CalendarError::OutOfValidRange`]: `date` is not in the valid range
    /// * [`CalendarError::NotAHoliday`]: `date` is not a holiday
    /// * [`CalendarError::HolidayCodeIndexOutOfBounds`]: the holiday has no more than `index` codes
    pub fn holiday_code(&self, date: NaiveDate, index: usize) -> Result<i32, CalendarError> {
        let offset = self.checked_offset(date)?;
        let idx = self
            .holidays
            .find(offset)
            .ok_or(CalendarError::NotAHoliday { date })?;
        let codes = self.holidays.codes_of(idx);
        codes
            .get(index)
            .copied()
            .ok_or(CalendarError::HolidayCodeIndexOutOfBounds {
                date,
                index,
                len: codes.len(),
            })
    }

    /// The `index`-th holiday in chronological order.
    #[inline]
    pub fn holiday(&self, index: usize) -> Option<NaiveDate> {
        self.holidays.offsets().get(index).map(|o| self.date_at(*o))
    }

    /// Iterator over the holidays in chronological order.
    #[inline]
    pub fn holidays(&self) -> impl DoubleEndedIterator<Item = NaiveDate> + ExactSizeIterator + '_ {
        self.holidays.offsets().iter().map(|o| self.date_at(*o))
    }

    /// Iterator over the holidays on or after `date` in chronological order.
    pub fn holidays_from(
        &self,
        date: NaiveDate,
    ) -> impl DoubleEndedIterator<Item = NaiveDate> + ExactSizeIterator + '_ {
        let start = if self.is_empty() || date <= self.first {
            0
        } else if self.last < date {
            self.holidays.len()
        } else {
            self.holidays.lower_bound(self.offset_of(date))
        };
        self.holidays.offsets()[start..]
            .iter()
            .map(|o| self.date_at(*o))
    }

    /// Iterator over the holidays in `[begin, end]` in chronological order.
    ///
    /// Dates outside of the valid range are clamped to it. The iterator is empty when
    /// `begin` is after `end`.
    pub fn holidays_between(
        &self,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> impl DoubleEndedIterator<Item = NaiveDate> + ExactSizeIterator + '_ {
        let bound = |date: NaiveDate| {
            if self.is_empty() || date < self.first {
                0
            } else if self.last < date {
                self.holidays.len()
            } else {
                self.holidays.lower_bound(self.offset_of(date))
            }
        };
        let start = bound(begin);
        let stop = match end.succ_opt() {
            Some(next) => bound(next),
            None => self.holidays.len(),
        };
        self.holidays.offsets()[start..stop.max(start)]
            .iter()
            .map(|o| self.date_at(*o))
    }

    /// Iterator over the holidays with their codes in chronological order.
    #[inline]
    pub fn holidays_with_codes(
        &self,
    ) -> impl DoubleEndedIterator<Item = (NaiveDate, &[i32])> + ExactSizeIterator + '_ {
        self.holidays
            .entries(0..self.holidays.len())
            .map(|(o, codes)| (self.date_at(o), codes))
    }

    /// Holiday offsets from the first date, strictly ascending.
    #[inline]
    pub fn holiday_offsets(&self) -> &[u32] {
        self.holidays.offsets()
    }

    /// For each holiday, the start of its codes in [`Calendar::holiday_code_pool`].
    #[inline]
    pub fn holiday_codes_index(&self) -> &[u32] {
        self.holidays.codes_index()
    }

    /// Codes of all holidays, concatenated in the order of the holidays.
    #[inline]
    pub fn holiday_code_pool(&self) -> &[i32] {
        self.holidays.codes()
    }
}

//
// weekend days
//
impl Calendar {
    /// Add `day` to the weekend days applying from [`weekend_epoch`](crate::weekend_epoch) onwards.
    ///
    /// # Errors
    /// * [`CalendarError::WeekendTransitionsDefined`]: weekend days are defined by dated transitions
    #[inline]
    pub fn add_weekend_day(&mut self, day: Weekday) -> Result<(), CalendarError> {
        self.weekend.add_days(WeekdaySet::single(day))
    }

    /// Add `days` to the weekend days applying from [`weekend_epoch`](crate::weekend_epoch) onwards.
    ///
    /// # Errors
    /// * [`CalendarError::WeekendTransitionsDefined`]: weekend days are defined by dated transitions
    #[inline]
    pub fn add_weekend_days(&mut self, days: WeekdaySet) -> Result<(), CalendarError> {
        self.weekend.add_days(days)
    }

    /// Use `days` as weekend days from `date` onwards.
    ///
    /// A transition already defined at `date` is replaced. The valid range is unchanged.
    #[inline]
    pub fn add_weekend_days_transition(&mut self, date: NaiveDate, days: WeekdaySet) {
        self.weekend.add_transition(date, days);
    }

    /// Check if `date` falls on a weekend day. Defined for every date.
    #[inline]
    pub fn is_weekend_day(&self, date: NaiveDate) -> bool {
        self.weekend.is_weekend_day(date)
    }

    /// Check if `day` is a weekend day of a calendar without dated transitions.
    ///
    /// # Errors
    /// * [`CalendarError::WeekendTransitionsDefined`]: weekend days are defined by dated transitions
    pub fn is_weekend_weekday(&self, day: Weekday) -> Result<bool, CalendarError> {
        match &self.weekend {
            WeekendDays::Never => Ok(false),
            WeekendDays::Fixed(set) => Ok(set.contains(day)),
            WeekendDays::Transitions(_) => Err(CalendarError::WeekendTransitionsDefined),
        }
    }

    #[inline]
    pub fn weekend_days(&self) -> &WeekendDays {
        &self.weekend
    }

    /// Iterator over the weekend-days transitions in date order.
    #[inline]
    pub fn weekend_days_transitions(
        &self,
    ) -> impl DoubleEndedIterator<Item = (NaiveDate, WeekdaySet)> + '_ {
        self.weekend.transitions()
    }

    #[inline]
    pub fn num_weekend_days_transitions(&self) -> usize {
        self.weekend.num_transitions()
    }

    #[inline]
    pub fn weekend_days_transition(&self, index: usize) -> Option<(NaiveDate, WeekdaySet)> {
        self.weekend.transition(index)
    }
}

//
// business days
//
impl Calendar {
    /// Check if `date` is a business day, i.e. neither a holiday nor a weekend day.
    ///
    /// # Errors
    /// * [`CalendarError::EmptyCalendar`], [`CalendarError::OutOfValidRange`]: `date` is not in the valid range
    #[inline]
    pub fn is_bizday(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        self.is_non_bizday(date).map(|b| !b)
    }

    /// Check if `date` is a holiday or a weekend day.
    ///
    /// # Errors
    /// * [`CalendarError::EmptyCalendar`], [`CalendarError::OutOfValidRange`]: `date` is not in the valid range
    #[inline]
    pub fn is_non_bizday(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        let offset = self.checked_offset(date)?;
        Ok(self.weekend.is_weekend_day(date) || self.holidays.find(offset).is_some())
    }

    /// Number of weekend days in the valid range, holidays or not.
    #[inline]
    pub fn num_weekend_days_in_range(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.weekend.count_in(self.first, self.last) as usize
        }
    }

    /// Number of days in the valid range which are holidays or weekend days.
    #[inline]
    pub fn num_non_bizdays(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.count_non_bizdays(self.first, self.last)
        }
    }

    /// Number of business days in the valid range.
    #[inline]
    pub fn num_bizdays(&self) -> usize {
        self.length() - self.num_non_bizdays()
    }

    /// Count the business days in `[begin, end]`. Returns `0` when `begin > end`.
    ///
    /// # Errors
    /// * [`CalendarError::EmptyCalendar`], [`CalendarError::OutOfValidRange`]:
    ///   `begin` or `end` is not in the valid range
    ///
    /// # Example
    /// ```
    /// use chrono::NaiveDate;
    /// use qcalendar::{Calendar, WeekdaySet};
    ///
    /// let ymd = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    ///
    /// let mut cal = Calendar::with_valid_range(ymd(2021, 1, 1), ymd(2021, 12, 31)).unwrap();
    /// cal.add_weekend_days(WeekdaySet::SAT_SUN).unwrap();
    ///
    /// let from = ymd(2021, 1, 3); // Sun
    /// let to = ymd(2021, 1, 8); // Fri
    ///
    /// assert_eq!(cal.num_bizdays_between(from, to), Ok(5));
    /// assert_eq!(cal.num_bizdays_between(to, from), Ok(0));
    /// assert!(cal.num_bizdays_between(from, ymd(2022, 1, 1)).is_err());
    /// ```
    pub fn num_bizdays_between(
        &self,
        begin: NaiveDate,
        end: NaiveDate,
    ) -> Result<usize, CalendarError> {
        if begin > end {
            return Ok(0);
        }
        let lo = self.checked_offset(begin)?;
        let hi = self.checked_offset(end)?;
        let len = (hi - lo) as usize + 1;
        Ok(len - self.count_non_bizdays(begin, end))
    }

    /// The `nth` business day strictly after `date`, `nth` starting from `1`.
    ///
    /// # Errors
    /// * [`CalendarError::EmptyCalendar`], [`CalendarError::OutOfValidRange`]: `date` is not in the valid range
    /// * [`CalendarError::NoSuchBusinessDay`]: `nth` is `0` or the valid range ends before
    pub fn next_bizday(&self, date: NaiveDate, nth: usize) -> Result<NaiveDate, CalendarError> {
        self.checked_offset(date)?;
        let no_such = CalendarError::NoSuchBusinessDay { date, nth };
        if nth == 0 || date == self.last {
            return Err(no_such);
        }
        let next = date.succ_opt().ok_or_else(|| no_such.clone())?;
        self.iter_bizdays_from(next)?
            .nth(nth - 1)
            .ok_or(no_such)
    }
}
