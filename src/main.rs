use clap::Parser;

use todolink::cli::{Cli, CliCommand, ConfigureCommand};
use todolink::commands::{self, CreateArgs};
use todolink::config;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let settings_path = cli.config.clone().unwrap_or_else(config::default_path);

    let result = match &cli.command {
        CliCommand::Create {
            file,
            line,
            end_line,
            open,
        } => commands::create(&CreateArgs {
            settings_path: &settings_path,
            file: file.as_path(),
            line: *line,
            end_line: *end_line,
            open: *open,
        }),
        CliCommand::Show { file, line } => commands::show(&settings_path, file, *line),
        CliCommand::Check {
            file,
            line,
            end_line,
        } => commands::check(file, *line, *end_line),
        CliCommand::Configure { setting } => match setting {
            ConfigureCommand::ApiKey { key } => {
                commands::configure_api_key(&settings_path, key)
            }
            ConfigureCommand::Team => commands::configure_team(&settings_path),
            ConfigureCommand::Project => commands::configure_project(&settings_path),
            ConfigureCommand::Cycle => commands::configure_cycle(&settings_path),
            ConfigureCommand::Status => commands::configure_status(&settings_path),
            ConfigureCommand::Show => commands::configure_show(&settings_path),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
