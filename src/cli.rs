use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// todolink — promote `// TODO:` comments to tracker tasks
#[derive(Parser, Debug, Clone)]
#[command(name = "todolink", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Path to the settings file (default: .todolink/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Create a tracker task from the TODO on a source line
    Create {
        /// Source file containing the TODO
        #[arg(long)]
        file: PathBuf,

        /// 1-based line number of the TODO
        #[arg(long)]
        line: usize,

        /// End line of the selection; must carry the same text as --line
        #[arg(long)]
        end_line: Option<usize>,

        /// Open the created task in the browser
        #[arg(long)]
        open: bool,
    },

    /// Show the task referenced by an identifier on a source line
    Show {
        /// Source file to inspect
        #[arg(long)]
        file: PathBuf,

        /// 1-based line number to inspect
        #[arg(long)]
        line: usize,
    },

    /// Print the quick-fix action a line would offer, without creating anything
    Check {
        /// Source file to inspect
        #[arg(long)]
        file: PathBuf,

        /// 1-based line number to inspect
        #[arg(long)]
        line: usize,

        /// End line of the selection
        #[arg(long)]
        end_line: Option<usize>,
    },

    /// Store tracker settings
    Configure {
        #[command(subcommand)]
        setting: ConfigureCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigureCommand {
    /// Store the tracker API key (must start with lin_api_)
    ApiKey { key: String },

    /// Pick the team new tasks are filed under
    Team,

    /// Pick the project new tasks are filed under
    Project,

    /// Pick the cycle new tasks are filed under
    Cycle,

    /// Pick the workflow state new tasks start in
    Status,

    /// Print current settings with the API key redacted
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create() {
        let cli = Cli::parse_from([
            "todolink", "create", "--file", "src/main.rs", "--line", "42",
        ]);
        match cli.command {
            CliCommand::Create {
                file,
                line,
                end_line,
                open,
            } => {
                assert_eq!(file, PathBuf::from("src/main.rs"));
                assert_eq!(line, 42);
                assert_eq!(end_line, None);
                assert!(!open);
            }
            other => panic!("expected Create, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_create_with_selection_and_open() {
        let cli = Cli::parse_from([
            "todolink", "create", "--file", "a.rs", "--line", "3", "--end-line", "5", "--open",
        ]);
        match cli.command {
            CliCommand::Create {
                end_line, open, ..
            } => {
                assert_eq!(end_line, Some(5));
                assert!(open);
            }
            other => panic!("expected Create, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_show() {
        let cli = Cli::parse_from(["todolink", "show", "--file", "a.rs", "--line", "7"]);
        assert!(matches!(cli.command, CliCommand::Show { line: 7, .. }));
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::parse_from(["todolink", "check", "--file", "a.rs", "--line", "1"]);
        assert!(matches!(cli.command, CliCommand::Check { .. }));
    }

    #[test]
    fn test_parse_configure_api_key() {
        let cli = Cli::parse_from(["todolink", "configure", "api-key", "lin_api_abc"]);
        match cli.command {
            CliCommand::Configure {
                setting: ConfigureCommand::ApiKey { key },
            } => assert_eq!(key, "lin_api_abc"),
            other => panic!("expected Configure ApiKey, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_configure_selectors() {
        for (name, expect_team) in [("team", true), ("status", false)] {
            let cli = Cli::parse_from(["todolink", "configure", name]);
            let CliCommand::Configure { setting } = cli.command else {
                panic!("expected Configure");
            };
            match setting {
                ConfigureCommand::Team => assert!(expect_team),
                ConfigureCommand::Status => assert!(!expect_team),
                other => panic!("unexpected subcommand {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_global_config_after_subcommand() {
        let cli = Cli::parse_from([
            "todolink", "configure", "show", "--config", "/tmp/settings.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/settings.toml")));
    }
}
