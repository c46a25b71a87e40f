//! Selection board CLI.

use clap::Parser;
use sbs_cli::logging::init_logging;
use sbs_cli::settings::Settings;

mod cli;
mod commands;

use crate::cli::{Cli, Command};
use crate::commands::{
    run_config, run_export, run_mapping, run_open_urls, run_review, run_set, run_show, run_stats,
    run_toggle,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: cannot set up logging: {error}");
        std::process::exit(1);
    }

    let settings = Settings::load(cli.config.as_deref());
    let result = match &cli.command {
        Command::Mapping(args) => run_mapping(args, &settings),
        Command::Show(args) => run_show(args, &settings),
        Command::Stats(args) => run_stats(args, &settings),
        Command::Set(args) => run_set(args, &settings),
        Command::Toggle(args) => run_toggle(args, &settings),
        Command::Export(args) => run_export(args, &settings),
        Command::OpenUrls(args) => run_open_urls(args, &settings),
        Command::Review(args) => run_review(args, &settings),
        Command::Config(args) => run_config(args, cli.config.as_deref(), &settings),
    };
    if let Err(error) = result {
        tracing::error!(error = %error, "command failed");
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
