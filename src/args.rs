pub use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
pub struct Args {
    /// Key-value file the timer defaults are kept in
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Where to write logs while the terminal ui is open
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Do not play the bell
    #[arg(long, global = true)]
    pub mute: bool,

    /// Do not show a desktop notification when the prayer is complete
    #[arg(long, global = true)]
    pub no_notify: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Open the timer (default)
    Pray,

    /// Print the stored defaults
    Show,

    /// Change the stored defaults; blank, zero or non-numeric durations become 5 minutes
    Set {
        /// Minutes of Lectio
        #[arg(long, allow_negative_numbers = true)]
        lectio: Option<String>,

        /// Minutes of Meditatio
        #[arg(long, allow_negative_numbers = true)]
        meditatio: Option<String>,

        /// Minutes of Oratio
        #[arg(long, allow_negative_numbers = true)]
        oratio: Option<String>,

        /// Minutes of Contemplatio
        #[arg(long, allow_negative_numbers = true)]
        contemplatio: Option<String>,

        /// Include Lectio in the sequence
        #[arg(long, value_name = "BOOL")]
        enable_lectio: Option<bool>,

        /// Include Contemplatio in the sequence
        #[arg(long, value_name = "BOOL")]
        enable_contemplatio: Option<bool>,
    },

    /// Print when each bell will ring with the stored defaults
    Schedule,
}
