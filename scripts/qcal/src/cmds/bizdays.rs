use std::{io::Write, path::PathBuf};

use chrono::NaiveDate;
use itertools::Either;

use crate::util::io::load_calendar;

use super::Cmd;

// -----------------------------------------------------------------------------
// Args
// -----------------------------------------------------------------------------
#[derive(Debug, clap::Args)]
pub struct Args {
    /// Calendar document (.json, .yaml or .yml)
    pub path: PathBuf,

    /// List business days on or after this date only
    #[clap(long = "from")]
    pub from: Option<NaiveDate>,

    /// List business days on or before this date only
    #[clap(long = "to")]
    pub to: Option<NaiveDate>,

    /// Maximum number of days to list
    #[clap(long = "limit")]
    pub limit: Option<usize>,

    /// List in descending order, starting from the last business day
    #[clap(long = "reverse")]
    pub reverse: bool,
}

impl Cmd for Args {
    fn exec(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        let cal = load_calendar(&self.path)?;
        let days = match (self.from, self.to) {
            (Some(from), Some(to)) => cal.iter_bizdays_between(from, to)?,
            (None, Some(to)) => cal.iter_bizdays_between(cal.first_date().unwrap_or(to), to)?,
            (Some(from), None) => cal.iter_bizdays_from(from)?,
            (None, None) => cal.iter_bizdays(),
        };
        let days = if self.reverse {
            Either::Left(days.rev())
        } else {
            Either::Right(days)
        };
        for d in days.take(self.limit.unwrap_or(usize::MAX)) {
            writeln!(out, "{d}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use qcalendar::{Calendar, WeekdaySet};
    use rstest::rstest;

    use super::*;
    use crate::util::io::{save_calendar, temp_path};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(Some(ymd(2024, 1, 13)), None, Some(3), false, "2024-01-16\n2024-01-17\n2024-01-18\n")]
    #[case(None, None, Some(2), true, "2024-01-31\n2024-01-30\n")]
    #[case(Some(ymd(2024, 1, 26)), None, None, true, "2024-01-31\n2024-01-30\n2024-01-29\n2024-01-26\n")]
    #[case(None, None, Some(0), false, "")]
    #[case(Some(ymd(2024, 1, 12)), Some(ymd(2024, 1, 16)), None, false, "2024-01-12\n2024-01-16\n")]
    #[case(Some(ymd(2024, 1, 12)), Some(ymd(2024, 1, 17)), Some(2), true, "2024-01-17\n2024-01-16\n")]
    #[case(None, Some(ymd(2024, 1, 3)), None, false, "2024-01-01\n2024-01-02\n2024-01-03\n")]
    #[case(Some(ymd(2024, 1, 20)), Some(ymd(2024, 1, 10)), None, false, "")]
    fn test_exec(
        #[case] from: Option<NaiveDate>,
        #[case] to: Option<NaiveDate>,
        #[case] limit: Option<usize>,
        #[case] reverse: bool,
        #[case] expected: &str,
    ) {
        let mut cal = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
        cal.add_weekend_days(WeekdaySet::SAT_SUN).unwrap();
        cal.add_holiday_code(ymd(2024, 1, 15), 7);
        let path = temp_path(&format!("bizdays-{from:?}-{to:?}-{limit:?}-{reverse}.json"));
        save_calendar(&cal, &path, true).unwrap();

        let mut out = Vec::new();
        let res = Args {
            path: path.clone(),
            from,
            to,
            limit,
            reverse,
        }
        .exec(&mut out);
        std::fs::remove_file(&path).unwrap();

        res.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_exec_out_of_range() {
        let cal = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
        let path = temp_path("bizdays-out-of-range.json");
        save_calendar(&cal, &path, true).unwrap();

        let res = Args {
            path: path.clone(),
            from: Some(ymd(2024, 2, 1)),
            to: None,
            limit: None,
            reverse: false,
        }
        .exec(&mut Vec::new());
        std::fs::remove_file(&path).unwrap();

        assert!(res.is_err());
    }
}
