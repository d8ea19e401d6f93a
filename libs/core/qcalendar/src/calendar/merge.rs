use std::{
    cmp::{max, min},
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign},
};

use chrono::{Days, NaiveDate};
use itertools::{EitherOrBoth, Itertools};
use smallvec::SmallVec;

use super::{holiday_table::HolidayTable, Calendar};

// -----------------------------------------------------------------------------
// CombineRule
// -----------------------------------------------------------------------------
/// Set operation used to combine two calendars.
///
/// | rule | valid range | weekend days | holidays |
/// |---|---|---|---|
/// | `UnionNonBizdays` | span | union | union |
/// | `IntersectBizdays` | overlap | union | union |
/// | `UnionBizdays` | span | intersection | intersection |
/// | `IntersectNonBizdays` | overlap | intersection | intersection |
///
/// Intersected holidays keep a day which is a holiday in one calendar and
/// a non-business day in the other. Codes of a day kept from both calendars are merged.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    schemars::JsonSchema,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CombineRule {
    /// A day is a business day if it is one in either calendar.
    UnionBizdays,
    /// A day is a business day if it is one in both calendars.
    IntersectBizdays,
    /// A day is a non-business day if it is one in either calendar.
    UnionNonBizdays,
    /// A day is a non-business day if it is one in both calendars.
    IntersectNonBizdays,
}

impl CombineRule {
    #[inline]
    fn spans(&self) -> bool {
        matches!(self, Self::UnionBizdays | Self::UnionNonBizdays)
    }

    /// Whether weekend days and holidays of either side are non-business days of the result.
    #[inline]
    fn unites_non_bizdays(&self) -> bool {
        matches!(self, Self::IntersectBizdays | Self::UnionNonBizdays)
    }
}

// -----------------------------------------------------------------------------
// Holiday merge
// -----------------------------------------------------------------------------
/// Holidays of `cal` in `[from, to]` as `(offset, codes)`, offsets counted from `from`.
fn holidays_within<'a>(
    cal: &'a Calendar,
    from: NaiveDate,
    to: NaiveDate,
) -> impl Iterator<Item = (u32, &'a [i32])> + 'a {
    let (range, shift) = if cal.is_empty() {
        (0..0, 0)
    } else {
        let shift = cal.first.signed_duration_since(from).num_days();
        let hi = to.signed_duration_since(cal.first).num_days();
        let offsets = cal.holidays.offsets();
        let start = offsets.partition_point(|o| i64::from(*o) + shift < 0);
        let end = offsets.partition_point(|o| i64::from(*o) <= hi);
        (start..max(start, end), shift)
    };
    cal.holidays
        .entries(range)
        .map(move |(o, codes)| ((i64::from(o) + shift) as u32, codes))
}

fn union_codes(lhs: &[i32], rhs: &[i32]) -> SmallVec<[i32; 8]> {
    lhs.iter().merge(rhs).dedup().copied().collect()
}

/// Holidays of either calendar in `[from, to]`, relative to `from`.
pub(super) fn union_holidays(
    lhs: &Calendar,
    rhs: &Calendar,
    from: NaiveDate,
    to: NaiveDate,
) -> HolidayTable {
    let mut out = HolidayTable::new();
    let items = holidays_within(lhs, from, to)
        .merge_join_by(holidays_within(rhs, from, to), |l, r| l.0.cmp(&r.0));
    for item in items {
        match item {
            EitherOrBoth::Both((offset, lc), (_, rc)) => out.push(offset, &union_codes(lc, rc)),
            EitherOrBoth::Left((offset, codes)) | EitherOrBoth::Right((offset, codes)) => {
                out.push(offset, codes)
            }
        }
    }
    out
}

/// Holidays in `[from, to]` of both calendars, or of one calendar on a weekend day of the other.
pub(super) fn intersect_holidays(
    lhs: &Calendar,
    rhs: &Calendar,
    from: NaiveDate,
    to: NaiveDate,
) -> HolidayTable {
    let mut out = HolidayTable::new();
    let date_at = |offset: u32| from + Days::new(u64::from(offset));
    let items = holidays_within(lhs, from, to)
        .merge_join_by(holidays_within(rhs, from, to), |l, r| l.0.cmp(&r.0));
    for item in items {
        match item {
            EitherOrBoth::Both((offset, lc), (_, rc)) => out.push(offset, &union_codes(lc, rc)),
            EitherOrBoth::Left((offset, codes)) => {
                if rhs.weekend.is_weekend_day(date_at(offset)) {
                    out.push(offset, codes);
                }
            }
            EitherOrBoth::Right((offset, codes)) => {
                if lhs.weekend.is_weekend_day(date_at(offset)) {
                    out.push(offset, codes);
                }
            }
        }
    }
    out
}

// -----------------------------------------------------------------------------
// Calendar set algebra
// -----------------------------------------------------------------------------
fn span(lhs: &Calendar, rhs: &Calendar) -> Option<(NaiveDate, NaiveDate)> {
    match (lhs.is_empty(), rhs.is_empty()) {
        (true, true) => None,
        (false, true) => Some((lhs.first, lhs.last)),
        (true, false) => Some((rhs.first, rhs.last)),
        (false, false) => Some((min(lhs.first, rhs.first), max(lhs.last, rhs.last))),
    }
}

fn overlap(lhs: &Calendar, rhs: &Calendar) -> Option<(NaiveDate, NaiveDate)> {
    let first = max(lhs.first, rhs.first);
    let last = min(lhs.last, rhs.last);
    // an empty operand has `first > last`, so the overlap is empty as well
    (first <= last).then_some((first, last))
}

impl Calendar {
    /// Combine `other` into this calendar by `rule`.
    ///
    /// For the union rules an empty calendar is ignored, weekend days included.
    /// The new state is fully built before it replaces the current one.
    pub fn combine(&mut self, other: &Calendar, rule: CombineRule) {
        if rule.spans() && other.is_empty() {
            log::debug!("calendars combined by {rule}: the other calendar is empty");
            return;
        }
        if rule.spans() && self.is_empty() {
            *self = other.clone();
            log::debug!("calendars combined by {rule}: adopted the other calendar");
            return;
        }
        let range = if rule.spans() {
            span(self, other)
        } else {
            overlap(self, other)
        };
        let weekend = if rule.unites_non_bizdays() {
            self.weekend.union(&other.weekend)
        } else {
            self.weekend.intersection(&other.weekend)
        };
        let holidays = match range {
            None => HolidayTable::new(),
            Some((from, to)) if rule.unites_non_bizdays() => union_holidays(self, other, from, to),
            Some((from, to)) => intersect_holidays(self, other, from, to),
        };
        let (first, last) = range.unwrap_or((NaiveDate::MAX, NaiveDate::MIN));

        *self = Calendar {
            first,
            last,
            weekend,
            holidays,
        };
        self.debug_check();
        log::debug!(
            "calendars combined by {rule}: range={:?}, weekend transitions={}, holidays={}",
            self.valid_range(),
            self.num_weekend_days_transitions(),
            self.num_holidays(),
        );
    }

    /// Make every day which is a business day in either calendar a business day.
    ///
    /// The valid range becomes the smallest range containing both valid ranges.
    #[inline]
    pub fn union_bizdays(&mut self, other: &Calendar) {
        self.combine(other, CombineRule::UnionBizdays)
    }

    /// Keep only the days which are business days in both calendars.
    ///
    /// The valid range becomes the overlap of both valid ranges, which may be empty.
    #[inline]
    pub fn intersect_bizdays(&mut self, other: &Calendar) {
        self.combine(other, CombineRule::IntersectBizdays)
    }

    /// Make every day which is a non-business day in either calendar a non-business day.
    ///
    /// The valid range becomes the smallest range containing both valid ranges.
    ///
    /// ```
    /// use chrono::{NaiveDate, Weekday};
    /// use qcalendar::Calendar;
    ///
    /// let ymd = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    ///
    /// let mut tokyo = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
    /// tokyo.add_weekend_day(Weekday::Sun).unwrap();
    /// tokyo.add_holiday_code(ymd(2024, 1, 8), 1);
    ///
    /// let mut london = Calendar::with_valid_range(ymd(2024, 1, 8), ymd(2024, 2, 29)).unwrap();
    /// london.add_weekend_day(Weekday::Sat).unwrap();
    /// london.add_holiday_code(ymd(2024, 1, 8), 2);
    ///
    /// tokyo.union_non_bizdays(&london);
    ///
    /// assert_eq!(tokyo.valid_range(), Some(ymd(2024, 1, 1)..=ymd(2024, 2, 29)));
    /// assert!(tokyo.is_weekend_day(ymd(2024, 1, 6)));
    /// assert!(tokyo.is_weekend_day(ymd(2024, 1, 7)));
    /// assert_eq!(tokyo.holiday_codes(ymd(2024, 1, 8)), Ok(&[1, 2][..]));
    /// ```
    #[inline]
    pub fn union_non_bizdays(&mut self, other: &Calendar) {
        self.combine(other, CombineRule::UnionNonBizdays)
    }

    /// Keep only the days which are non-business days in both calendars as non-business days.
    ///
    /// The valid range becomes the overlap of both valid ranges, which may be empty.
    #[inline]
    pub fn intersect_non_bizdays(&mut self, other: &Calendar) {
        self.combine(other, CombineRule::IntersectNonBizdays)
    }
}

//
// operators
//
impl BitOr for Calendar {
    type Output = Calendar;

    /// Union of non-business days. See [`Calendar::union_non_bizdays`].
    #[inline]
    fn bitor(mut self, rhs: Self) -> Self::Output {
        self.union_non_bizdays(&rhs);
        self
    }
}

impl BitOrAssign<&Calendar> for Calendar {
    #[inline]
    fn bitor_assign(&mut self, rhs: &Calendar) {
        self.union_non_bizdays(rhs);
    }
}

impl BitAnd for Calendar {
    type Output = Calendar;

    /// Intersection of non-business days. See [`Calendar::intersect_non_bizdays`].
    #[inline]
    fn bitand(mut self, rhs: Self) -> Self::Output {
        self.intersect_non_bizdays(&rhs);
        self
    }
}

impl BitAndAssign<&Calendar> for Calendar {
    #[inline]
    fn bitand_assign(&mut self, rhs: &Calendar) {
        self.intersect_non_bizdays(rhs);
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Weekday;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::{WeekdaySet, WeekendDays};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lhs() -> Calendar {
        let mut cal = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 2, 29)).unwrap();
        cal.add_weekend_days(WeekdaySet::SAT_SUN).unwrap();
        cal.add_holiday_code(ymd(2024, 1, 1), 1);
        cal.add_holiday_code(ymd(2024, 1, 15), 3);
        cal.add_holiday_code(ymd(2024, 1, 15), 5);
        cal.add_holiday(ymd(2024, 1, 26)); // weekday for lhs, Fri for rhs
        cal.add_holiday_code(ymd(2024, 2, 10), 2); // Sat
        cal
    }

    fn rhs() -> Calendar {
        let mut cal = Calendar::with_valid_range(ymd(2024, 1, 10), ymd(2024, 3, 31)).unwrap();
        cal.add_weekend_days_transition(
            ymd(2024, 1, 20),
            WeekdaySet::from_iter([Weekday::Fri, Weekday::Sat]),
        );
        cal.add_holiday_code(ymd(2024, 1, 15), 4);
        cal.add_holiday_code(ymd(2024, 1, 15), 5);
        cal.add_holiday_code(ymd(2024, 1, 21), 9); // Sun
        cal.add_holiday(ymd(2024, 2, 12));
        cal.add_holiday(ymd(2024, 3, 20));
        cal
    }

    /// Non-business predicate of a calendar at any date, with no holidays out of range.
    fn non_bizday(cal: &Calendar, date: NaiveDate) -> bool {
        cal.is_weekend_day(date) || cal.is_holiday(date).unwrap_or(false)
    }

    #[rstest]
    fn test_combine_matches_brute_force(
        #[values(
            CombineRule::UnionBizdays,
            CombineRule::IntersectBizdays,
            CombineRule::UnionNonBizdays,
            CombineRule::IntersectNonBizdays
        )]
        rule: CombineRule,
        #[values(false, true)] swap: bool,
    ) {
        let (a, b) = if swap { (rhs(), lhs()) } else { (lhs(), rhs()) };
        let mut cal = a.clone();

        cal.combine(&b, rule);

        let expected_range = match rule {
            CombineRule::UnionBizdays | CombineRule::UnionNonBizdays => {
                ymd(2024, 1, 1)..=ymd(2024, 3, 31)
            }
            _ => ymd(2024, 1, 10)..=ymd(2024, 2, 29),
        };
        assert_eq!(cal.valid_range(), Some(expected_range.clone()));

        for d in expected_range.start().iter_days().take_while(|d| d <= expected_range.end()) {
            let expected = match rule {
                CombineRule::UnionBizdays | CombineRule::IntersectNonBizdays => {
                    non_bizday(&a, d) && non_bizday(&b, d)
                }
                CombineRule::IntersectBizdays | CombineRule::UnionNonBizdays => {
                    non_bizday(&a, d) || non_bizday(&b, d)
                }
            };
            assert_eq!(cal.is_non_bizday(d), Ok(expected), "rule={rule}, date={d}");
        }
    }

    #[test]
    fn test_union_non_bizdays_holidays_and_codes() {
        let mut cal = lhs();

        cal.union_non_bizdays(&rhs());

        assert_eq!(
            cal.holidays_with_codes().collect::<Vec<_>>(),
            vec![
                (ymd(2024, 1, 1), &[1][..]),
                (ymd(2024, 1, 15), &[3, 4, 5][..]),
                (ymd(2024, 1, 21), &[9][..]),
                (ymd(2024, 1, 26), &[][..]),
                (ymd(2024, 2, 10), &[2][..]),
                (ymd(2024, 2, 12), &[][..]),
                (ymd(2024, 3, 20), &[][..]),
            ]
        );
    }

    #[test]
    fn test_intersect_non_bizdays_holidays_and_codes() {
        let mut cal = lhs();

        cal.intersect_non_bizdays(&rhs());

        // 1/15 in both, 1/21 on a lhs weekend, 1/26 on a rhs weekend (Fri),
        // 2/10 on a rhs weekend (Sat); 2/12 is a lhs business day
        assert_eq!(
            cal.holidays_with_codes().collect::<Vec<_>>(),
            vec![
                (ymd(2024, 1, 15), &[3, 4, 5][..]),
                (ymd(2024, 1, 21), &[9][..]),
                (ymd(2024, 1, 26), &[][..]),
                (ymd(2024, 2, 10), &[2][..]),
            ]
        );
        assert_eq!(
            cal.weekend_days(),
            &WeekendDays::from_transitions(vec![(
                ymd(2024, 1, 20),
                WeekdaySet::single(Weekday::Sat)
            )])
            .unwrap()
        );
    }

    #[test]
    fn test_disjoint_holidays_add_up() {
        let mut a = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 12, 31)).unwrap();
        a.add_holiday(ymd(2024, 1, 1));
        a.add_holiday(ymd(2024, 5, 3));
        let mut b = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 12, 31)).unwrap();
        b.add_holiday(ymd(2024, 7, 4));
        b.add_holiday(ymd(2024, 12, 25));
        b.add_holiday(ymd(2024, 12, 26));

        let expected = a.num_non_bizdays() + b.num_non_bizdays();
        a.union_non_bizdays(&b);

        assert_eq!(a.num_non_bizdays(), expected);
        assert_eq!(a.num_non_bizdays(), 5);
    }

    #[test]
    fn test_disjoint_holidays_with_shared_weekend() {
        let mut a = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
        a.add_weekend_days(WeekdaySet::SAT_SUN).unwrap();
        a.add_holiday(ymd(2024, 1, 1));
        let mut b = a.clone();
        b.remove_holiday(ymd(2024, 1, 1));
        b.add_holiday(ymd(2024, 1, 15));

        let shared_weekend = a.num_weekend_days_in_range();
        let expected = a.num_non_bizdays() + b.num_non_bizdays() - shared_weekend;
        a.union_non_bizdays(&b);

        assert_eq!(a.num_non_bizdays(), expected);
        assert_eq!(a.num_non_bizdays(), 10);
    }

    #[test]
    fn test_union_with_empty() {
        let mut cal = lhs();
        let before = cal.clone();

        cal.union_non_bizdays(&Calendar::new());
        assert_eq!(cal, before);

        let mut empty = Calendar::new();
        empty.union_non_bizdays(&before);
        assert_eq!(empty, before);
    }

    #[rstest]
    fn test_union_with_empty_either_side(
        #[values(CombineRule::UnionBizdays, CombineRule::UnionNonBizdays)] rule: CombineRule,
    ) {
        let cal = lhs();
        let mut empty_with_weekend = Calendar::new();
        empty_with_weekend.add_weekend_day(Weekday::Wed).unwrap();

        for empty in [Calendar::new(), empty_with_weekend] {
            let mut tested = cal.clone();
            tested.combine(&empty, rule);
            assert_eq!(tested, cal, "rule={rule}, calendar on the left");
            assert_eq!(tested.num_bizdays(), cal.num_bizdays());

            let mut tested = empty.clone();
            tested.combine(&cal, rule);
            assert_eq!(tested, cal, "rule={rule}, calendar on the right");
        }
    }

    #[test]
    fn test_union_bizdays_with_empty_keeps_non_bizdays() {
        let mut cal = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
        cal.add_weekend_days(WeekdaySet::SAT_SUN).unwrap();
        cal.add_holiday_code(ymd(2024, 1, 15), 7);

        cal.union_bizdays(&Calendar::new());

        assert_eq!(cal.num_bizdays(), 22);
        assert_eq!(cal.weekend_days(), &WeekendDays::Fixed(WeekdaySet::SAT_SUN));
        assert_eq!(cal.holiday_codes(ymd(2024, 1, 15)), Ok(&[7][..]));
    }

    #[test]
    fn test_intersect_disjoint_is_empty() {
        let mut cal = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
        cal.add_weekend_days(WeekdaySet::SAT_SUN).unwrap();
        cal.add_holiday(ymd(2024, 1, 15));
        let mut other = Calendar::with_valid_range(ymd(2024, 2, 1), ymd(2024, 2, 29)).unwrap();
        other.add_weekend_days(WeekdaySet::SAT_SUN).unwrap();

        cal.intersect_bizdays(&other);

        assert!(cal.is_empty());
        assert_eq!(cal.num_holidays(), 0);
        assert_eq!(cal.weekend_days(), &WeekendDays::Fixed(WeekdaySet::SAT_SUN));
    }

    #[test]
    fn test_union_bizdays_keeps_holiday_on_other_weekend() {
        let mut a = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
        a.add_weekend_day(Weekday::Sun).unwrap();
        a.add_holiday(ymd(2024, 1, 6)); // Sat
        a.add_holiday(ymd(2024, 1, 8)); // Mon
        let mut b = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
        b.add_weekend_day(Weekday::Sat).unwrap();

        a.union_bizdays(&b);

        assert_eq!(a.weekend_days(), &WeekendDays::Never);
        assert_eq!(a.holidays().collect::<Vec<_>>(), vec![ymd(2024, 1, 6)]);
    }

    #[test]
    fn test_operators() {
        let expected_or = {
            let mut cal = lhs();
            cal.union_non_bizdays(&rhs());
            cal
        };
        let expected_and = {
            let mut cal = lhs();
            cal.intersect_non_bizdays(&rhs());
            cal
        };

        assert_eq!(lhs() | rhs(), expected_or);
        assert_eq!(lhs() & rhs(), expected_and);

        let mut cal = lhs();
        cal |= &rhs();
        assert_eq!(cal, expected_or);

        let mut cal = lhs();
        cal &= &rhs();
        assert_eq!(cal, expected_and);
    }

    #[test]
    fn test_combine_rule_names() {
        let names = CombineRule::iter().map(|r| r.to_string()).collect::<Vec<_>>();

        assert_eq!(
            names,
            vec![
                "union_bizdays",
                "intersect_bizdays",
                "union_non_bizdays",
                "intersect_non_bizdays"
            ]
        );
        assert_eq!(
            CombineRule::from_str("union_non_bizdays"),
            Ok(CombineRule::UnionNonBizdays)
        );
        assert_eq!(
            serde_json::to_value(CombineRule::IntersectBizdays).unwrap(),
            serde_json::json!("intersect_bizdays")
        );
    }
}
