use std::{io::Write, path::PathBuf};

use qcalendar::CombineRule;

use crate::util::io::{load_calendar, save_calendar};

use super::Cmd;

// -----------------------------------------------------------------------------
// Args
// -----------------------------------------------------------------------------
#[derive(Debug, clap::Args)]
pub struct Args {
    /// Left-hand calendar document
    pub lhs: PathBuf,

    /// Right-hand calendar document
    pub rhs: PathBuf,

    /// One of union_bizdays, intersect_bizdays, union_non_bizdays or intersect_non_bizdays
    #[clap(short = 'r', long = "rule")]
    pub rule: CombineRule,

    /// Output calendar document. The result is printed as JSON if omitted
    #[clap(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Overwrite the output document without asking
    #[clap(long = "force")]
    pub force: bool,
}

impl Cmd for Args {
    fn exec(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        let mut cal = load_calendar(&self.lhs)?;
        let other = load_calendar(&self.rhs)?;
        cal.combine(&other, self.rule);

        match &self.output {
            Some(path) => {
                save_calendar(&cal, path, self.force)?;
                log::info!("Wrote {} of {:?} and {:?} to {:?}", self.rule, self.lhs, self.rhs, path);
            }
            None => writeln!(out, "{}", serde_json::to_string_pretty(&cal)?)?,
        }
        Ok(())
    }
}
