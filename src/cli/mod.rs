//! CLI module - Command-line interface for chemsolve
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// chemsolve - chemistry question solver
/// Web front end for an AI model, with accounts and an admin panel
#[derive(Parser)]
#[command(name = "chemsolve")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    Serve,

    /// Create default config file
    Init,

    /// Manage registered users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List registered users
    #[command(alias = "ls")]
    List,
    /// Block a user from logging in
    Block {
        /// Username
        username: String,
    },
    /// Allow a blocked user to log in again
    Unblock {
        /// Username
        username: String,
    },
    /// Delete a user
    #[command(alias = "rm")]
    Delete {
        /// Username
        username: String,
    },
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["chemsolve"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_users_block_parses() {
        let cli = Cli::try_parse_from(["chemsolve", "users", "block", "alice"]).unwrap();
        match cli.command {
            Some(Commands::Users {
                command: UserCommands::Block { username },
            }) => assert_eq!(username, "alice"),
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn test_users_aliases() {
        assert!(Cli::try_parse_from(["chemsolve", "users", "ls"]).is_ok());
        assert!(Cli::try_parse_from(["chemsolve", "users", "rm", "bob"]).is_ok());
        assert!(Cli::try_parse_from(["chemsolve", "users", "delete"]).is_err());
    }
}
