use chrono::NaiveDate;

// -----------------------------------------------------------------------------
// CalendarError
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq, Hash)]
pub enum CalendarError {
    #[error("The calendar is empty, so the date {date} is out of its valid range")]
    EmptyCalendar { date: NaiveDate },
    #[error("The date {date} is out of the valid range [{first}, {last}]")]
    OutOfValidRange {
        date: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },
    #[error("Invalid range: first date {first} is after last date {last}")]
    InvalidRange { first: NaiveDate, last: NaiveDate },
    #[error("The date {date} is not a holiday")]
    NotAHoliday { date: NaiveDate },
    #[error("Holiday code index {index} is out of bounds for {date} which has {len} codes")]
    HolidayCodeIndexOutOfBounds {
        date: NaiveDate,
        index: usize,
        len: usize,
    },
    #[error("Weekend days are defined by dated transitions; a single weekend-day set can not be used")]
    WeekendTransitionsDefined,
    #[error("No {nth}-th business day exists after {date} in the valid range")]
    NoSuchBusinessDay { date: NaiveDate, nth: usize },
}
