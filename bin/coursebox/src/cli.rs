//! Command-line surface and configuration.
//!
//! Directories come from flags, then `COURSEBOX_*` environment variables
//! (a `.env` file is loaded first), then the defaults below.

use std::path::PathBuf;

use cb_core::models::{MaterialKind, Role};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "coursebox", version, about = "Share course videos and documents between teachers and students")]
pub struct Cli {
    /// Where users.json, courses.json and chats.json live
    #[arg(long, env = "COURSEBOX_DATA_DIR", default_value = "./data", global = true)]
    pub data_dir: PathBuf,

    /// Where uploaded files are stored
    #[arg(long, env = "COURSEBOX_UPLOAD_DIR", default_value = "./uploads", global = true)]
    pub upload_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct Credentials {
    #[arg(long, short)]
    pub user: String,
    #[arg(long, short, env = "COURSEBOX_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account (role: teacher or student)
    Register {
        username: String,
        password: String,
        role: Role,
    },
    /// Check credentials and show where the user lands
    Login { username: String, password: String },
    /// Upload a file into a course (teachers only)
    Upload {
        #[command(flatten)]
        credentials: Credentials,
        course: String,
        title: String,
        /// video or document
        kind: MaterialKind,
        file: PathBuf,
        /// Thumbnail, videos only
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Like a material, by position or by id
    Like {
        #[command(flatten)]
        credentials: Credentials,
        course: String,
        #[arg(required_unless_present = "id")]
        index: Option<usize>,
        #[arg(long, conflicts_with = "index")]
        id: Option<Uuid>,
    },
    /// Print every course and its materials
    List,
    /// Print the location of an uploaded file
    Open { key: String },
    /// Load every snapshot document and report its size
    Check,
}
