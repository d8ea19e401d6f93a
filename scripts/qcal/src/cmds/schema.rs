use std::{io::Write, path::PathBuf};

use qcalendar::Calendar;

use crate::util::io::write_output;

use super::Cmd;

// -----------------------------------------------------------------------------
// Args
// -----------------------------------------------------------------------------
#[derive(Debug, clap::Args)]
pub struct Args {
    /// Output file of the schema. The schema is printed if omitted
    #[clap(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Overwrite the output file without asking
    #[clap(long = "force")]
    pub force: bool,
}

impl Cmd for Args {
    fn exec(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        let schema = schemars::schema_for!(Calendar);
        let text = serde_json::to_string_pretty(&schema)? + "\n";
        match &self.output {
            Some(path) => {
                write_output(path, &text, self.force)?;
                log::info!("Wrote calendar schema to {:?}", path);
            }
            None => out.write_all(text.as_bytes())?,
        }
        Ok(())
    }
}
