// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: One positional environment plus skip flags, paths, and output modes.

use std::path::PathBuf;

use anthony_deploy::types::Environment;
use clap::Parser;

#[derive(Parser)]
#[command(name = "anthony-deploy")]
#[command(about = "Deploy Anthony Store to various environments")]
#[command(version)]
pub struct Cli {
    /// Target environment
    #[arg(value_enum)]
    pub environment: Environment,

    /// Skip running the test suite (local only)
    #[arg(long)]
    pub skip_tests: bool,

    /// Skip the pre-deploy backup
    #[arg(long)]
    pub skip_backup: bool,

    /// Project directory to deploy (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// Deployment config file (defaults to <DIR>/deployment-config.json)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Deployment log file (defaults to <DIR>/deployment.log)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable debug output on the console
    #[arg(short, long)]
    pub verbose: bool,

    /// Print only the final result
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Print the final result as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_environment_and_flags() {
        let cli = Cli::try_parse_from([
            "anthony-deploy",
            "kubernetes",
            "--skip-backup",
            "--project-root",
            "/srv/store",
        ])
        .unwrap();
        assert_eq!(cli.environment, Environment::Kubernetes);
        assert!(cli.skip_backup);
        assert!(!cli.skip_tests);
        assert_eq!(cli.project_root, Some(PathBuf::from("/srv/store")));
    }

    #[test]
    fn rejects_unknown_environment() {
        assert!(Cli::try_parse_from(["anthony-deploy", "staging"]).is_err());
    }

    #[test]
    fn quiet_conflicts_with_json() {
        assert!(Cli::try_parse_from(["anthony-deploy", "local", "-q", "--json"]).is_err());
    }
}
