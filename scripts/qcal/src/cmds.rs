pub mod bizdays;
pub mod combine;
pub mod count;
pub mod schema;
pub mod show;

use std::io::Write;

// -----------------------------------------------------------------------------
// Cmd
// -----------------------------------------------------------------------------
pub trait Cmd {
    /// Execute the command, writing its report to `out`.
    fn exec(&self, out: &mut dyn Write) -> anyhow::Result<()>;

    fn run(&self) -> anyhow::Result<()> {
        self.exec(&mut std::io::stdout().lock())
    }
}

// -----------------------------------------------------------------------------
// Commands
// -----------------------------------------------------------------------------
#[derive(Debug, clap::Subcommand)]
#[clap(rename_all = "snake_case")]
pub enum Commands {
    /// Print a calendar
    Show(show::Args),
    /// Count business and non-business days
    Count(count::Args),
    /// List business days
    Bizdays(bizdays::Args),
    /// Combine two calendars by a set operation
    Combine(combine::Args),
    /// Print the JSON schema of calendar documents
    Schema(schema::Args),
}

impl Cmd for Commands {
    fn exec(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        match self {
            Commands::Show(args) => args.exec(out),
            Commands::Count(args) => args.exec(out),
            Commands::Bizdays(args) => args.exec(out),
            Commands::Combine(args) => args.exec(out),
            Commands::Schema(args) => args.exec(out),
        }
    }
}
