//! Command-line interface definitions

use clap::Parser;

use crate::config::RunMode;

#[derive(Parser, Debug)]
#[command(name = "tfsetup")]
#[command(version)]
#[command(about = "Check and install terraform and terragrunt", long_about = None)]
pub struct Cli {
    /// Only report tool status, never install
    #[arg(long, conflicts_with = "auto")]
    pub check: bool,

    /// Install or upgrade without asking for confirmation
    #[arg(long)]
    pub auto: bool,

    /// Print debug logs to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn mode(&self) -> RunMode {
        if self.check {
            RunMode::CheckOnly
        } else if self.auto {
            RunMode::Auto
        } else {
            RunMode::Interactive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_is_interactive() {
        let cli = Cli::try_parse_from(["tfsetup"]).unwrap();
        assert_eq!(cli.mode(), RunMode::Interactive);
    }

    #[test]
    fn test_check_and_auto_modes() {
        let cli = Cli::try_parse_from(["tfsetup", "--check"]).unwrap();
        assert_eq!(cli.mode(), RunMode::CheckOnly);

        let cli = Cli::try_parse_from(["tfsetup", "--auto"]).unwrap();
        assert_eq!(cli.mode(), RunMode::Auto);
    }

    #[test]
    fn test_check_conflicts_with_auto() {
        assert!(Cli::try_parse_from(["tfsetup", "--check", "--auto"]).is_err());
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = Cli::try_parse_from(["tfsetup", "--force"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
