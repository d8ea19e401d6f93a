use std::{
    cmp::{max, min},
    ops::Deref,
};

use anyhow::ensure;
use chrono::{Datelike, NaiveDate, Weekday};
use itertools::Itertools;

use super::CalendarError;
use crate::WeekdaySet;

/// The date at which a single-era weekend definition takes effect.
///
/// A [`WeekendDays::Fixed`] set is equivalent to one transition at this date.
#[inline]
pub fn weekend_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

// -----------------------------------------------------------------------------
// Remainder table
// -----------------------------------------------------------------------------
/// `REMAINDER_MASKS[w][r]` is the bit mask of the weekdays covered by `r` consecutive
/// days starting on the weekday whose `number_from_monday()` is `w`.
/// Row 0 is unused.
const REMAINDER_MASKS: [[u8; 7]; 8] = [
    [0; 7],
    [0b000_0000, 0b000_0001, 0b000_0011, 0b000_0111, 0b000_1111, 0b001_1111, 0b011_1111],
    [0b000_0000, 0b000_0010, 0b000_0110, 0b000_1110, 0b001_1110, 0b011_1110, 0b111_1110],
    [0b000_0000, 0b000_0100, 0b000_1100, 0b001_1100, 0b011_1100, 0b111_1100, 0b111_1101],
    [0b000_0000, 0b000_1000, 0b001_1000, 0b011_1000, 0b111_1000, 0b111_1001, 0b111_1011],
    [0b000_0000, 0b001_0000, 0b011_0000, 0b111_0000, 0b111_0001, 0b111_0011, 0b111_0111],
    [0b000_0000, 0b010_0000, 0b110_0000, 0b110_0001, 0b110_0011, 0b110_0111, 0b110_1111],
    [0b000_0000, 0b100_0000, 0b100_0001, 0b100_0011, 0b100_0111, 0b100_1111, 0b101_1111],
];

/// Count the days in `len` consecutive days starting on `first` whose weekday is in `set`.
#[inline]
pub(crate) fn count_weekdays(first: Weekday, len: u64, set: WeekdaySet) -> u64 {
    let full_weeks = len / 7 * set.len() as u64;
    let rem = REMAINDER_MASKS[first.number_from_monday() as usize][(len % 7) as usize];
    full_weeks + u64::from((rem & set.bits()).count_ones())
}

#[inline]
pub(crate) fn day_number(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

// -----------------------------------------------------------------------------
// WeekendDays
// -----------------------------------------------------------------------------
/// Definition of weekend days over time.
///
/// - [`WeekendDays::Never`]: no day is a weekend day.
/// - [`WeekendDays::Fixed`]: the same set applies from [`weekend_epoch`] onwards.
/// - [`WeekendDays::Transitions`]: a step function. Each `(date, set)` applies from
///   `date` (inclusive) until the next transition (exclusive). Days before the first
///   transition are never weekend days. The list is non-empty, strictly ascending by
///   date and never equal to the single transition `[(weekend_epoch(), set)]`,
///   which is always represented as `Fixed(set)`. A [`WeekendTransitions`] list can only
///   be built by [`WeekendDays::from_transitions`] and [`WeekendDays::add_transition`].
///
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use qcalendar::{WeekdaySet, WeekendDays};
///
/// let ymd = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap();
///
/// let mut weekend = WeekendDays::Fixed(WeekdaySet::SAT_SUN);
/// weekend.add_transition(ymd(2024, 1, 1), WeekdaySet::single(Weekday::Fri));
///
/// assert!(weekend.is_weekend_day(ymd(2023, 12, 31))); // Sun
/// assert!(!weekend.is_weekend_day(ymd(2024, 1, 6)));  // Sat
/// assert!(weekend.is_weekend_day(ymd(2024, 1, 5)));   // Fri
/// assert_eq!(weekend.num_transitions(), 2);
/// ```
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, schemars::JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum WeekendDays {
    #[default]
    Never,
    Fixed(WeekdaySet),
    Transitions(WeekendTransitions),
}

//
// ser/de
//
impl<'de> serde::Deserialize<'de> for WeekendDays {
    fn deserialize<D>(deserializer: D) -> Result<WeekendDays, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        enum _Data {
            Never,
            Fixed(WeekdaySet),
            Transitions(Vec<(NaiveDate, WeekdaySet)>),
        }

        match _Data::deserialize(deserializer)? {
            _Data::Never => Ok(WeekendDays::Never),
            _Data::Fixed(set) => Ok(WeekendDays::Fixed(set)),
            _Data::Transitions(list) => {
                WeekendDays::from_transitions(list).map_err(serde::de::Error::custom)
            }
        }
    }
}

// -----------------------------------------------------------------------------
// WeekendTransitions
// -----------------------------------------------------------------------------
/// Dated weekend-day sets of a [`WeekendDays::Transitions`] timeline, strictly ascending by date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, schemars::JsonSchema)]
#[serde(transparent)]
pub struct WeekendTransitions(Vec<(NaiveDate, WeekdaySet)>);

impl WeekendTransitions {
    #[inline]
    pub fn as_slice(&self) -> &[(NaiveDate, WeekdaySet)] {
        &self.0
    }
}

impl Deref for WeekendTransitions {
    type Target = [(NaiveDate, WeekdaySet)];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

//
// ctor
//
impl WeekendDays {
    /// Build a timeline from transitions, which must be strictly ascending by date.
    pub fn from_transitions(list: Vec<(NaiveDate, WeekdaySet)>) -> anyhow::Result<Self> {
        ensure!(
            !list.is_empty(),
            "Weekend-days transitions must not be empty; use `never` instead"
        );
        ensure!(
            list.iter().tuple_windows().all(|(a, b)| a.0 < b.0),
            "Weekend-days transitions must be strictly ascending by date"
        );
        Ok(Self::normalized(list))
    }

    /// Pick the canonical form of a transition list that is known to be sorted.
    pub(crate) fn normalized(mut list: Vec<(NaiveDate, WeekdaySet)>) -> Self {
        match list.len() {
            0 => Self::Never,
            1 if list[0].0 == weekend_epoch() => Self::Fixed(list[0].1),
            _ => {
                list.shrink_to_fit();
                Self::Transitions(WeekendTransitions(list))
            }
        }
    }
}

//
// accessors
//
impl WeekendDays {
    #[inline]
    pub fn is_never(&self) -> bool {
        matches!(self, Self::Never)
    }

    /// Whether the timeline has more than one era, or one era not starting at [`weekend_epoch`].
    #[inline]
    pub fn has_transitions(&self) -> bool {
        matches!(self, Self::Transitions(_))
    }

    /// Number of transitions, where a `Fixed` set counts as one transition.
    #[inline]
    pub fn num_transitions(&self) -> usize {
        match self {
            Self::Never => 0,
            Self::Fixed(_) => 1,
            Self::Transitions(list) => list.len(),
        }
    }

    /// The `index`-th transition, where a `Fixed` set is shown at [`weekend_epoch`].
    #[inline]
    pub fn transition(&self, index: usize) -> Option<(NaiveDate, WeekdaySet)> {
        match self {
            Self::Never => None,
            Self::Fixed(set) => (index == 0).then(|| (weekend_epoch(), *set)),
            Self::Transitions(list) => list.get(index).copied(),
        }
    }

    /// Iterate over the transitions in date order.
    pub fn transitions(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, WeekdaySet)> + '_ {
        let (fixed, list) = match self {
            Self::Never => (None, &[][..]),
            Self::Fixed(set) => (Some((weekend_epoch(), *set)), &[][..]),
            Self::Transitions(list) => (None, list.as_slice()),
        };
        fixed.into_iter().chain(list.iter().copied())
    }

    /// The weekend set in effect on `date`, if any era has started.
    pub fn active_set(&self, date: NaiveDate) -> Option<WeekdaySet> {
        match self {
            Self::Never => None,
            Self::Fixed(set) => (weekend_epoch() <= date).then_some(*set),
            Self::Transitions(list) => {
                let idx = list.partition_point(|(d, _)| *d <= date);
                idx.checked_sub(1).map(|i| list[i].1)
            }
        }
    }

    #[inline]
    pub fn is_weekend_day(&self, date: NaiveDate) -> bool {
        self.active_set(date)
            .map_or(false, |set| set.contains(date.weekday()))
    }

    /// Count the weekend days in `[first, last]`. Returns `0` when `first > last`.
    pub fn count_in(&self, first: NaiveDate, last: NaiveDate) -> u64 {
        let lo = day_number(first);
        let hi_excl = day_number(last) + 1;
        if hi_excl <= lo {
            return 0;
        }

        let mut total = 0;
        let mut eras = self.transitions().peekable();
        while let Some((start, set)) = eras.next() {
            let era_end = eras.peek().map_or(i64::MAX, |(d, _)| day_number(*d));
            let seg_lo = max(day_number(start), lo);
            let seg_hi = min(era_end, hi_excl);
            if seg_lo >= seg_hi || set.is_empty() {
                continue;
            }
            let seg_first = if seg_lo == lo {
                first.weekday()
            } else {
                start.weekday()
            };
            total += count_weekdays(seg_first, (seg_hi - seg_lo) as u64, set);
        }
        total
    }
}

//
// mutators
//
impl WeekendDays {
    /// Add `days` to the single weekend era, creating it if there is none.
    ///
    /// # Errors
    /// * [`CalendarError::WeekendTransitionsDefined`]: the timeline has dated transitions
    pub fn add_days(&mut self, days: WeekdaySet) -> Result<(), CalendarError> {
        match self {
            Self::Never => *self = Self::Fixed(days),
            Self::Fixed(set) => *set |= days,
            Self::Transitions(_) => return Err(CalendarError::WeekendTransitionsDefined),
        }
        Ok(())
    }

    /// Set the weekend days from `date` onwards, replacing any transition at exactly `date`.
    pub fn add_transition(&mut self, date: NaiveDate, days: WeekdaySet) {
        let mut list = match std::mem::take(self) {
            Self::Never => Vec::with_capacity(1),
            Self::Fixed(set) => vec![(weekend_epoch(), set)],
            Self::Transitions(list) => list.0,
        };
        match list.binary_search_by_key(&date, |(d, _)| *d) {
            Ok(i) => list[i].1 = days,
            Err(i) => list.insert(i, (date, days)),
        }
        *self = Self::normalized(list);
    }

    /// A timeline whose weekend days are those of `self` or `other`.
    pub fn union(&self, other: &Self) -> Self {
        self.merge(other, WeekdaySet::union)
    }

    /// A timeline whose weekend days are those of both `self` and `other`.
    pub fn intersection(&self, other: &Self) -> Self {
        self.merge(other, WeekdaySet::intersection)
    }

    fn merge(&self, other: &Self, op: fn(WeekdaySet, WeekdaySet) -> WeekdaySet) -> Self {
        let mut lhs = self.transitions().peekable();
        let mut rhs = other.transitions().peekable();
        let mut cur_lhs = WeekdaySet::EMPTY;
        let mut cur_rhs = WeekdaySet::EMPTY;
        let mut out: Vec<(NaiveDate, WeekdaySet)> = Vec::new();

        loop {
            let date = match (lhs.peek(), rhs.peek()) {
                (None, None) => break,
                (Some((d, _)), None) | (None, Some((d, _))) => *d,
                (Some((l, _)), Some((r, _))) => min(*l, *r),
            };
            if let Some((_, set)) = lhs.next_if(|(d, _)| *d == date) {
                cur_lhs = set;
            }
            if let Some((_, set)) = rhs.next_if(|(d, _)| *d == date) {
                cur_rhs = set;
            }

            let combined = op(cur_lhs, cur_rhs);
            let last = out.last().map_or(WeekdaySet::EMPTY, |(_, s)| *s);
            if combined != last {
                out.push((date, combined));
            }
        }

        Self::normalized(out)
    }
}
