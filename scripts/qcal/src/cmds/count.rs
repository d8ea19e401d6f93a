use std::{io::Write, path::PathBuf};

use anyhow::{ensure, Context};
use chrono::NaiveDate;
use qcalendar::Calendar;

use crate::util::io::load_calendar;

use super::Cmd;

// -----------------------------------------------------------------------------
// Args
// -----------------------------------------------------------------------------
#[derive(Debug, clap::Args)]
pub struct Args {
    /// Calendar document (.json, .yaml or .yml)
    pub path: PathBuf,

    /// First date to count, the first date of the calendar if omitted
    #[clap(long = "from")]
    pub from: Option<NaiveDate>,

    /// Last date to count, the last date of the calendar if omitted
    #[clap(long = "to")]
    pub to: Option<NaiveDate>,
}

// -----------------------------------------------------------------------------
// Counts
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Counts {
    days: usize,
    weekend_days: usize,
    holidays: usize,
    bizdays: usize,
}

impl Counts {
    fn of_calendar(cal: &Calendar) -> Self {
        Counts {
            days: cal.length(),
            weekend_days: cal.num_weekend_days_in_range(),
            holidays: cal.num_holidays(),
            bizdays: cal.num_bizdays(),
        }
    }

    fn of_range(cal: &Calendar, from: NaiveDate, to: NaiveDate) -> anyhow::Result<Self> {
        ensure!(from <= to, "--from {from} must not be after --to {to}");
        let bizdays = cal
            .num_bizdays_between(from, to)
            .context("Failed to count business days")?;
        Ok(Counts {
            days: to.signed_duration_since(from).num_days() as usize + 1,
            weekend_days: cal.weekend_days().count_in(from, to) as usize,
            holidays: cal.holidays_from(from).take_while(|d| *d <= to).count(),
            bizdays,
        })
    }
}

impl Cmd for Args {
    fn exec(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        let cal = load_calendar(&self.path)?;
        let counts = match (self.from, self.to, cal.valid_range()) {
            (None, None, _) => Counts::of_calendar(&cal),
            (from, to, Some(range)) => Counts::of_range(
                &cal,
                from.unwrap_or(*range.start()),
                to.unwrap_or(*range.end()),
            )?,
            (_, _, None) => anyhow::bail!("The calendar {:?} is empty", self.path),
        };

        writeln!(out, "days: {}", counts.days)?;
        writeln!(out, "weekend days: {}", counts.weekend_days)?;
        writeln!(out, "holidays: {}", counts.holidays)?;
        writeln!(out, "business days: {}", counts.bizdays)?;
        writeln!(out, "non-business days: {}", counts.days - counts.bizdays)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use qcalendar::WeekdaySet;
    use rstest::rstest;

    use super::*;
    use crate::util::io::{save_calendar, temp_path};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january() -> Calendar {
        let mut cal = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
        cal.add_weekend_days(WeekdaySet::SAT_SUN).unwrap();
        cal.add_holiday_code(ymd(2024, 1, 15), 7);
        cal
    }

    #[test]
    fn test_counts_of_calendar() {
        assert_eq!(
            Counts::of_calendar(&january()),
            Counts {
                days: 31,
                weekend_days: 8,
                holidays: 1,
                bizdays: 22
            }
        );
    }

    #[rstest]
    #[case(ymd(2024, 1, 13), ymd(2024, 1, 19), Counts { days: 7, weekend_days: 2, holidays: 1, bizdays: 4 })]
    #[case(ymd(2024, 1, 1), ymd(2024, 1, 31), Counts { days: 31, weekend_days: 8, holidays: 1, bizdays: 22 })]
    #[case(ymd(2024, 1, 16), ymd(2024, 1, 16), Counts { days: 1, weekend_days: 0, holidays: 0, bizdays: 1 })]
    fn test_counts_of_range(
        #[case] from: NaiveDate,
        #[case] to: NaiveDate,
        #[case] expected: Counts,
    ) {
        assert_eq!(Counts::of_range(&january(), from, to).unwrap(), expected);
    }

    #[test]
    fn test_counts_of_range_rejects() {
        let cal = january();

        assert!(Counts::of_range(&cal, ymd(2024, 1, 20), ymd(2024, 1, 10)).is_err());
        assert!(Counts::of_range(&cal, ymd(2024, 1, 20), ymd(2024, 2, 10)).is_err());
    }

    #[test]
    fn test_exec() {
        let path = temp_path("count.yaml");
        save_calendar(&january(), &path, true).unwrap();

        let mut out = Vec::new();
        Args {
            path: path.clone(),
            from: Some(ymd(2024, 1, 13)),
            to: None,
        }
        .exec(&mut out)
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "days: 19\nweekend days: 6\nholidays: 1\nbusiness days: 12\nnon-business days: 7\n"
        );
    }
}
