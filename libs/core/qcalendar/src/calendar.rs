mod bizday;
mod calendar_impl;
mod error;
mod holiday_table;
mod merge;
mod print;
mod weekend;

pub use bizday::{BusinessDayCursor, BusinessDays};
pub use calendar_impl::Calendar;
pub use error::CalendarError;
pub use merge::CombineRule;
pub use weekend::{weekend_epoch, WeekendDays, WeekendTransitions};
