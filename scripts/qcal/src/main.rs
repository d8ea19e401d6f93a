use clap::Parser;
use cmds::Cmd;

mod cmds;
mod util;

/// Inspect and combine business-day calendars stored as JSON or YAML documents
#[derive(Debug, Parser)]
#[command(name = "qcal", version)]
struct Cli {
    #[command(subcommand)]
    command: cmds::Commands,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    log::info!("{:?}", cli);
    cli.command.run()
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["qcal", "show", "cal.json"])]
    #[case(&["qcal", "show", "cal.yaml", "--compact"])]
    #[case(&["qcal", "count", "cal.json", "--from", "2024-01-01", "--to", "2024-01-31"])]
    #[case(&["qcal", "bizdays", "cal.json", "--limit", "3", "--reverse"])]
    #[case(&["qcal", "combine", "a.json", "b.yml", "--rule", "union_non_bizdays", "-o", "c.json"])]
    #[case(&["qcal", "schema"])]
    fn test_parse_ok(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args.iter().copied()).is_ok());
    }

    #[rstest]
    #[case(&["qcal"])]
    #[case(&["qcal", "show"])]
    #[case(&["qcal", "count", "cal.json", "--from", "2024-13-01"])]
    #[case(&["qcal", "combine", "a.json", "b.json", "--rule", "xor"])]
    fn test_parse_ng(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args.iter().copied()).is_err());
    }
}
