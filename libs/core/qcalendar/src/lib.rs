pub mod calendar;

mod weekday_set;

pub use calendar::{
    weekend_epoch, BusinessDayCursor, BusinessDays, Calendar, CalendarError, CombineRule,
    WeekendDays, WeekendTransitions,
};
pub use weekday_set::WeekdaySet;

#[cfg(test)]
use rstest_reuse;
