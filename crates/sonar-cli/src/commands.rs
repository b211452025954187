//! Main commands enum.

use clap::Subcommand;

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the web UI
    Serve {
        /// Interface to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(short, long, env = "SONAR_PORT")]
        port: Option<u16>,
    },

    /// Classify one signal and announce the result
    Detect {
        /// 60 comma-separated reflection values
        signal: String,
        /// Do not speak
        #[arg(long)]
        mute: bool,
        /// Keep a continuous alert sounding until Enter is pressed
        #[arg(long)]
        hold: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Train the model and print the training report
    Train {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Speak text through the configured speech backend
    Speak {
        /// Text to say
        text: String,
        /// Repeat until the time runs out
        #[arg(long)]
        continuous: bool,
        /// How long a continuous alert runs
        #[arg(long, default_value_t = 5)]
        seconds: u64,
    },
}
