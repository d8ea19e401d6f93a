use std::{
    fmt::Display,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign},
};

use chrono::Weekday;

// -----------------------------------------------------------------------------
// WeekdaySet
// -----------------------------------------------------------------------------
/// Set of days of the week, stored as a 7-bit mask.
///
/// Bit `i` corresponds to the weekday whose `num_days_from_monday()` is `i`,
/// so iteration always yields Monday first and Sunday last.
///
/// ```
/// use chrono::Weekday;
/// use qcalendar::WeekdaySet;
///
/// let weekend = WeekdaySet::from_iter([Weekday::Sun, Weekday::Sat]);
/// assert!(weekend.contains(Weekday::Sat));
/// assert!(!weekend.contains(Weekday::Mon));
/// assert_eq!(weekend.len(), 2);
/// assert_eq!(weekend.iter().collect::<Vec<_>>(), vec![Weekday::Sat, Weekday::Sun]);
/// assert_eq!(weekend.to_string(), "[ Sat Sun ]");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekdaySet(u8);

const ALL_BITS: u8 = 0b111_1111;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[inline]
const fn bit_of(day: Weekday) -> u8 {
    match day {
        Weekday::Mon => 1,
        Weekday::Tue => 1 << 1,
        Weekday::Wed => 1 << 2,
        Weekday::Thu => 1 << 3,
        Weekday::Fri => 1 << 4,
        Weekday::Sat => 1 << 5,
        Weekday::Sun => 1 << 6,
    }
}

//
// ctor
//
impl WeekdaySet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Every day of the week.
    pub const ALL: Self = Self(ALL_BITS);

    /// Saturday and Sunday.
    pub const SAT_SUN: Self = Self(bit_of(Weekday::Sat) | bit_of(Weekday::Sun));

    /// Create a set from its raw bit mask. Bits above the seventh are ignored.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & ALL_BITS)
    }

    /// Create a set with a single day.
    #[inline]
    pub const fn single(day: Weekday) -> Self {
        Self(bit_of(day))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, |acc, d| acc | Self::single(d))
    }
}

impl Extend<Weekday> for WeekdaySet {
    fn extend<I: IntoIterator<Item = Weekday>>(&mut self, iter: I) {
        for d in iter {
            self.insert(d);
        }
    }
}

//
// methods
//
impl WeekdaySet {
    /// Raw bit mask of this set.
    #[inline]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(&self, day: Weekday) -> bool {
        self.0 & bit_of(day) != 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Add `day` to this set. Returns `true` if it was not a member before.
    #[inline]
    pub fn insert(&mut self, day: Weekday) -> bool {
        let added = !self.contains(day);
        self.0 |= bit_of(day);
        added
    }

    /// Remove `day` from this set. Returns `true` if it was a member.
    #[inline]
    pub fn remove(&mut self, day: Weekday) -> bool {
        let removed = self.contains(day);
        self.0 &= !bit_of(day);
        removed
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Iterate over the members from Monday to Sunday.
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Weekday> + '_ {
        WEEKDAYS.iter().copied().filter(|d| self.contains(*d))
    }
}

//
// operators
//
impl BitOr for WeekdaySet {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for WeekdaySet {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl BitAnd for WeekdaySet {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(rhs)
    }
}

impl BitAndAssign for WeekdaySet {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        *self = self.intersection(rhs);
    }
}

impl From<Weekday> for WeekdaySet {
    #[inline]
    fn from(day: Weekday) -> Self {
        Self::single(day)
    }
}

//
// display, ser/de
//
impl Display for WeekdaySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for d in self.iter() {
            write!(f, " {d}")?;
        }
        write!(f, " ]")
    }
}

impl serde::Serialize for WeekdaySet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> serde::Deserialize<'de> for WeekdaySet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let days = Vec::<Weekday>::deserialize(deserializer)?;
        Ok(days.into_iter().collect())
    }
}

impl schemars::JsonSchema for WeekdaySet {
    fn schema_name() -> String {
        "WeekdaySet".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        <Vec<Weekday> as schemars::JsonSchema>::json_schema(gen)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_insert_remove() {
        let mut set = WeekdaySet::EMPTY;

        assert!(set.insert(Weekday::Fri));
        assert!(!set.insert(Weekday::Fri));
        assert!(set.contains(Weekday::Fri));
        assert_eq!(set.len(), 1);

        assert!(set.remove(Weekday::Fri));
        assert!(!set.remove(Weekday::Fri));
        assert!(set.is_empty());
    }

    #[rstest]
    #[case(WeekdaySet::SAT_SUN, WeekdaySet::single(Weekday::Fri), 0b111_0000, 0)]
    #[case(WeekdaySet::SAT_SUN, WeekdaySet::single(Weekday::Sun), 0b110_0000, 0b100_0000)]
    #[case(WeekdaySet::ALL, WeekdaySet::EMPTY, 0b111_1111, 0)]
    fn test_set_algebra(
        #[case] lhs: WeekdaySet,
        #[case] rhs: WeekdaySet,
        #[case] union: u8,
        #[case] intersection: u8,
    ) {
        assert_eq!((lhs | rhs).bits(), union);
        assert_eq!((lhs & rhs).bits(), intersection);
    }

    #[test]
    fn test_from_bits_masks_high_bit() {
        assert_eq!(WeekdaySet::from_bits(0xff), WeekdaySet::ALL);
    }

    #[test]
    fn test_display() {
        assert_eq!(WeekdaySet::EMPTY.to_string(), "[ ]");
        assert_eq!(
            WeekdaySet::from_iter([Weekday::Fri, Weekday::Mon]).to_string(),
            "[ Mon Fri ]"
        );
    }

    #[test]
    fn test_serde() {
        let set = WeekdaySet::SAT_SUN;

        let json = serde_json::to_value(set).unwrap();
        assert_eq!(json, serde_json::json!(["Sat", "Sun"]));

        let de: WeekdaySet = serde_json::from_value(serde_json::json!(["Sun", "Sat", "Sun"])).unwrap();
        assert_eq!(de, set);
    }
}
