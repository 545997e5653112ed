// CLI argument definitions for prompt2png

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;

/// prompt2png - generate and iteratively edit images from the command line
#[derive(Parser, Debug)]
#[command(name = "prompt2png", version, about, long_about = None)]
pub struct Cli {
    /// Explicit config file (default: ~/.prompt2png/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// API key, overriding config file and environment
    #[arg(long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Provider base URL, overriding the configured one
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Model identifier, overriding the configured one
    #[arg(long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Directory generated images are written to
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(api_key) = &self.api_key {
            config.api.api_key = api_key.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(model) = &self.model {
            config.api.model = model.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output.save_dir = output_dir.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate an image from a text instruction
    Generate {
        /// What to draw
        instruction: String,

        /// Output filename (default: infographic_<timestamp>.png)
        #[arg(long, value_name = "NAME")]
        save_name: Option<String>,
    },

    /// Generate a new image guided by one or more reference images
    Reference {
        /// What to create from the references
        instruction: String,

        /// Reference image file; repeat the flag for several
        #[arg(long = "image", required = true, value_name = "FILE")]
        images: Vec<PathBuf>,

        /// What to borrow: style, composition, elements or full
        #[arg(long, default_value = "full")]
        mode: String,

        /// Output filename (default: reference_<timestamp>.png)
        #[arg(long, value_name = "NAME")]
        save_name: Option<String>,
    },

    /// Edit one image according to an instruction, outside any session
    Edit {
        /// How to change the image
        instruction: String,

        /// Image to edit
        #[arg(long, value_name = "FILE")]
        image: PathBuf,

        /// Output filename (default: edited_<timestamp>.png)
        #[arg(long, value_name = "NAME")]
        save_name: Option<String>,
    },

    /// Multi-turn edit sessions
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// List recent generations, newest first
    History {
        /// Maximum entries to show
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Delete all generation records instead of listing them
        #[arg(long, conflicts_with = "limit")]
        clear: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Start an interactive editing session on a base image
    Start {
        /// Base image the session edits
        #[arg(long, value_name = "FILE")]
        image: PathBuf,
    },

    /// Apply one instruction to the most recently saved session
    Apply {
        /// How to change the session's current image
        instruction: String,
    },

    /// Show the most recently saved session
    Show,

    /// Delete all saved sessions
    Clear,
}
