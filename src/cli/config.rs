use clap::Subcommand;

/// Inspect configuration
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the config file location and effective settings
    ///
    /// Settings are resolved for the current repository, so per-repository
    /// overrides are applied.
    Show {
        /// Print effective settings as JSON
        #[arg(long)]
        json: bool,
    },
}
