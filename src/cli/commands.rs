use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "toastnotes")]
#[command(version, about = "A self-hosted Markdown notes server")]
#[command(propagate_version = true)]
pub struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Storage root (overrides the config file and TOASTNOTES_ROOT)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to listen on, e.g. 0.0.0.0:80
        #[arg(long)]
        bind: Option<String>,

        /// Directory with the browser client to serve at /
        #[arg(long, value_name = "DIR")]
        static_dir: Option<PathBuf>,
    },

    /// Create or overwrite a note
    Save {
        /// Note name, folders separated by '/'
        name: String,

        /// Note content
        #[arg(long, conflicts_with = "stdin")]
        content: Option<String>,

        /// Read content from stdin
        #[arg(long)]
        stdin: bool,
    },

    /// Print a note
    Open {
        name: String,
    },

    /// Delete a note
    Delete {
        name: String,
    },

    /// Rename or move a note
    Rename {
        old_name: String,
        new_name: String,
    },

    /// List notes
    List {
        /// Show notes as a folder tree
        #[arg(long)]
        tree: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search note names and content (supports folder:<path>)
    Search {
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Store an image attachment and print its URL
    Upload {
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Keep a note in sync with a local file, autosaving on an interval
    Sync {
        /// Server base URL; without it the local storage root is used
        #[arg(long)]
        server: Option<String>,

        /// Note name to save into
        #[arg(long)]
        name: String,

        /// Local file to mirror
        #[arg(long)]
        file: PathBuf,

        /// Autosave interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },
}
