use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "senti",
    version,
    about = "Download a hub text classifier, convert it, and label text with it"
)]
pub struct Cli {
    /// Directory holding default.toml / local.toml
    #[arg(long, global = true, default_value = "config")]
    pub config: PathBuf,

    /// Log at debug level regardless of configuration
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Which model and where its artifact lives
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Hub model identifier
    #[arg(long = "model")]
    pub model_id: Option<String>,

    /// Path of the converted artifact (.onnx)
    #[arg(short = 'o', long = "model-path")]
    pub model_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TextArgs {
    /// Text to classify
    #[arg(long = "text", visible_alias = "input")]
    pub text: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch model configuration, tokenizer and graph from the hub
    Download {
        /// Hub model identifier
        #[arg(long = "model")]
        model_id: Option<String>,

        /// Cache directory to download into
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },

    /// Fetch and convert the model into an engine-loadable artifact
    Convert {
        #[command(flatten)]
        model: ModelArgs,

        #[command(flatten)]
        text: TextArgs,
    },

    /// Fetch, convert if needed, load, and classify one text
    Run {
        #[command(flatten)]
        model: ModelArgs,

        #[command(flatten)]
        text: TextArgs,

        /// Convert again even if the artifact exists
        #[arg(long)]
        force_convert: bool,

        /// Also print the model's declared inputs and outputs
        #[arg(long)]
        show_signature: bool,
    },

    /// Serve the classifier over HTTP
    Serve {
        #[command(flatten)]
        model: ModelArgs,

        /// Host address to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port number to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Send one text to a running server and print the label
    Client {
        #[command(flatten)]
        text: TextArgs,

        /// Base URL of the server
        #[arg(long)]
        url: Option<String>,
    },
}
