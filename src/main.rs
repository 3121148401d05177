use std::io::Write;
use std::process;

use clap::Parser;
use color_print::cformat;
use wtm::config::set_config_path;
use wtm::git::{GitError, set_base_path};
use wtm::styling::{eprintln, error_message};

mod cli;
mod commands;

use cli::Cli;

/// `-v` turns on debug output for wtm; `RUST_LOG` still wins when set.
fn init_logging(verbose: u8) {
    let default_level = if verbose > 0 { "wtm=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let line = record.args().to_string();
            // Command traces are dimmed so hook output stands out
            if line.starts_with('$') || line.starts_with("[wtm-trace]") {
                writeln!(buf, "{}", cformat!("<dim>{line}</>"))
            } else {
                writeln!(buf, "{line}")
            }
        })
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(path) = cli.directory {
        set_base_path(path);
    }
    if let Some(path) = cli.config {
        set_config_path(path);
    }

    if let Err(err) = commands::run(cli.command) {
        // GitError renders its own styled message and hints
        if err.downcast_ref::<GitError>().is_some() {
            eprintln!("{err}");
        } else {
            eprintln!("{}", error_message(format!("{err:#}")));
        }
        process::exit(1);
    }
}
