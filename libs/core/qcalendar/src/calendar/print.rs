use std::fmt::{self, Display, Write};

use super::Calendar;

// -----------------------------------------------------------------------------
// Printer
// -----------------------------------------------------------------------------
/// Writes nested bracketed lists, one element per line or all on a single line.
struct Printer<'w, W> {
    w: &'w mut W,
    level: u32,
    spaces_per_level: i32,
    at_start: bool,
    indent_first: bool,
}

impl<'w, W: Write> Printer<'w, W> {
    fn new(w: &'w mut W, level: i32, spaces_per_level: i32) -> Self {
        Self {
            w,
            level: level.unsigned_abs(),
            spaces_per_level,
            at_start: true,
            indent_first: level >= 0,
        }
    }

    #[inline]
    fn single_line(&self) -> bool {
        self.spaces_per_level < 0
    }

    fn begin_element(&mut self) -> fmt::Result {
        if std::mem::take(&mut self.at_start) {
            if !self.indent_first {
                return Ok(());
            }
        } else if self.single_line() {
            return self.w.write_char(' ');
        } else {
            self.w.write_char('\n')?;
        }
        let width = (self.level as usize).saturating_mul(self.spaces_per_level.max(0) as usize);
        write!(self.w, "{:width$}", "")
    }

    fn element(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        self.begin_element()?;
        self.w.write_fmt(args)
    }

    fn open(&mut self, label: &str) -> fmt::Result {
        self.begin_element()?;
        write!(self.w, "{label}[")?;
        self.level = self.level.saturating_add(1);
        Ok(())
    }

    fn close(&mut self) -> fmt::Result {
        self.level = self.level.saturating_sub(1);
        self.begin_element()?;
        self.w.write_char(']')
    }

    fn finish(self) -> fmt::Result {
        if self.single_line() {
            Ok(())
        } else {
            self.w.write_char('\n')
        }
    }
}

struct Codes<'a>(&'a [i32]);

impl Display for Codes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('{')?;
        for c in self.0 {
            write!(f, " {c}")?;
        }
        f.write_str(" }")
    }
}

//
// Calendar methods
//
impl Calendar {
    /// Write a human-readable dump of the calendar.
    ///
    /// Nested elements are indented by `spaces_per_level` spaces per level, starting at `level`.
    /// A negative `level` suppresses the indentation of the first line.
    /// A negative `spaces_per_level` writes everything on a single line without a trailing newline.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use qcalendar::{Calendar, WeekdaySet};
    ///
    /// let ymd = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    ///
    /// let mut cal = Calendar::with_valid_range(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
    /// cal.add_weekend_days(WeekdaySet::SAT_SUN).unwrap();
    /// cal.add_holiday_code(ymd(2024, 1, 15), 7);
    ///
    /// let mut out = String::new();
    /// cal.print(&mut out, 0, 2).unwrap();
    /// assert_eq!(
    ///     out,
    ///     "[
    ///   valid range: [ 2024-01-01, 2024-01-31 ]
    ///   weekend days: [
    ///     0001-01-01 [ Sat Sun ]
    ///   ]
    ///   holidays: [
    ///     2024-01-15 { 7 }
    ///   ]
    /// ]
    /// "
    /// );
    /// ```
    pub fn print<W: Write>(&self, w: &mut W, level: i32, spaces_per_level: i32) -> fmt::Result {
        let mut p = Printer::new(w, level, spaces_per_level);
        p.open("")?;

        match self.valid_range() {
            Some(r) => p.element(format_args!("valid range: [ {}, {} ]", r.start(), r.end()))?,
            None => p.element(format_args!("valid range: [ ]"))?,
        }

        p.open("weekend days: ")?;
        for (date, days) in self.weekend_days_transitions() {
            p.element(format_args!("{date} {days}"))?;
        }
        p.close()?;

        p.open("holidays: ")?;
        for (date, codes) in self.holidays_with_codes() {
            p.element(format_args!("{date} {}", Codes(codes)))?;
        }
        p.close()?;

        p.close()?;
        p.finish()
    }
}

impl Display for Calendar {
    /// One line by default, four spaces per level with `{:#}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            self.print(f, 0, 4)
        } else {
            self.print(f, 0, -1)
        }
    }
}
