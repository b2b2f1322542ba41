//! CLI argument definitions using clap
//!
//! Commands:
//! - chirpstore init
//! - chirpstore post {create,list,get,delete}
//! - chirpstore user {create,get,update,upgrade,webhook}
//! - chirpstore login | refresh | revoke | purge-tokens

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::collections::SortOrder;
use crate::store::RecordId;

/// chirpstore - record store for a small social-posting service
#[derive(Parser, Debug)]
#[command(name = "chirpstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Document path, overrides the configuration
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Discard every record before running the command
    #[arg(long, global = true)]
    pub reset: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the document if it does not exist
    Init,

    /// Post operations
    Post {
        #[command(subcommand)]
        action: PostAction,
    },

    /// User operations
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Check credentials and issue a refresh token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Validate a refresh token
    Refresh { token: String },

    /// Validate and delete a refresh token
    Revoke { token: String },

    /// Delete expired refresh tokens
    PurgeTokens,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PostAction {
    Create {
        #[arg(long)]
        author_id: RecordId,
        #[arg(long)]
        body: String,
    },

    List {
        /// Only posts by this author
        #[arg(long)]
        author_id: Option<RecordId>,
        /// asc or desc
        #[arg(long, default_value = "asc")]
        sort: SortOrder,
    },

    Get { id: RecordId },

    Delete {
        id: RecordId,
        /// Refuse unless this user wrote the post
        #[arg(long)]
        author_id: Option<RecordId>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    Get {
        #[arg(long)]
        email: String,
    },

    /// Replace email and password
    Update {
        #[arg(long)]
        id: RecordId,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    Upgrade { id: RecordId },

    /// Apply a billing webhook event
    Webhook {
        #[arg(long)]
        event: String,
        #[arg(long)]
        user_id: RecordId,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
