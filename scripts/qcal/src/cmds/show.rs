use std::{io::Write, path::PathBuf};

use crate::util::io::load_calendar;

use super::Cmd;

// -----------------------------------------------------------------------------
// Args
// -----------------------------------------------------------------------------
#[derive(Debug, clap::Args)]
pub struct Args {
    /// Calendar document (.json, .yaml or .yml)
    pub path: PathBuf,

    /// Print everything on a single line
    #[clap(long = "compact")]
    pub compact: bool,

    /// Spaces per indentation level
    #[clap(long = "indent", default_value_t = 4)]
    pub indent: u8,
}

impl Cmd for Args {
    fn exec(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        let cal = load_calendar(&self.path)?;
        let mut text = String::new();
        if self.compact {
            cal.print(&mut text, 0, -1)?;
            text.push('\n');
        } else {
            cal.print(&mut text, 0, i32::from(self.indent))?;
        }
        out.write_all(text.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use qcalendar::{Calendar, WeekdaySet};

    use super::*;
    use crate::util::io::{save_calendar, temp_path};

    #[test]
    fn test_exec() {
        let ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let mut cal = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
        cal.add_weekend_days(WeekdaySet::SAT_SUN).unwrap();
        cal.add_holiday_code(ymd(2024, 1, 15), 7);
        let path = temp_path("show.json");
        save_calendar(&cal, &path, true).unwrap();

        let mut compact = Vec::new();
        Args {
            path: path.clone(),
            compact: true,
            indent: 4,
        }
        .exec(&mut compact)
        .unwrap();
        let mut pretty = Vec::new();
        Args {
            path: path.clone(),
            compact: false,
            indent: 2,
        }
        .exec(&mut pretty)
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(String::from_utf8(compact).unwrap(), format!("{cal}\n"));
        let mut expected = String::new();
        cal.print(&mut expected, 0, 2).unwrap();
        assert_eq!(String::from_utf8(pretty).unwrap(), expected);
    }
}
