use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "folio",
    bin_name = "folio",
    version,
    disable_help_subcommand = true,
    about = "Per-owner folders and items from the command line",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Owner namespace to act on (anonymous fingerprint when omitted)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub owner: Option<String>,

    /// Operate on the global scope
    #[arg(short, long, global = true, help_heading = "Options")]
    pub global: bool,

    /// Print raw JSON responses
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Data directory (overrides config and FOLIO_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a raw JSON request, e.g. '{"action":"read"}'
    #[command(display_order = 1)]
    Dispatch { payload: String },

    /// Show the embedded folder tree
    #[command(display_order = 2)]
    Tree,

    /// Create a folder
    #[command(display_order = 10)]
    Mkdir {
        name: String,

        /// Parent folder id
        #[arg(short, long, default_value = "root")]
        parent: String,
    },

    /// List a folder's live children
    #[command(alias = "list", display_order = 11)]
    Ls {
        /// Folder id
        #[arg(default_value = "root")]
        parent: String,

        /// Every live record, at any depth
        #[arg(short, long)]
        recursive: bool,
    },

    /// Create or replace an item
    #[command(display_order = 12)]
    Put {
        /// Text content
        content: Option<String>,

        /// Target folder id
        #[arg(short, long, default_value = "root")]
        folder: String,

        /// Item type: text, image, video or file
        #[arg(short = 't', long = "type", default_value = "text")]
        kind: String,

        /// Existing item id to replace
        #[arg(long)]
        id: Option<String>,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        file_name: Option<String>,
    },

    /// Rename a folder (or an item with --item)
    #[command(display_order = 13)]
    Rename {
        id: String,
        name: String,
        #[arg(long)]
        item: bool,
    },

    /// Move a folder (or an item with --item) under another folder
    #[command(display_order = 14)]
    Mv {
        id: String,
        destination: String,
        #[arg(long)]
        item: bool,
    },

    /// Move to the trash
    #[command(display_order = 20)]
    Trash {
        /// One or more ids
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        item: bool,
    },

    /// Take out of the trash
    #[command(display_order = 21)]
    Restore {
        /// One or more ids
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        item: bool,
    },

    /// Delete permanently; folders take their whole subtree with them
    #[command(display_order = 22)]
    Purge {
        /// One or more ids
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        item: bool,
    },

    /// List everything in the trash
    #[command(display_order = 23)]
    TrashList,

    /// Star (or unstar with --off)
    #[command(display_order = 24)]
    Star {
        id: String,
        #[arg(long)]
        item: bool,
        #[arg(long)]
        off: bool,
    },

    /// Copy the embedded tree into folder and item records
    #[command(display_order = 30)]
    ImportTree,

    /// Rewrite legacy numeric owner ids in the current scope
    #[command(display_order = 31)]
    Doctor,

    /// Show configuration
    #[command(display_order = 40)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigCommands {
    /// Print the effective values (default)
    Show,
    /// Print a commented folio.toml with every setting
    Template,
    /// Print the config files consulted, highest priority first
    Paths,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["folio", "ls", "-r", "--owner", "u1", "--json"]).unwrap();
        assert_eq!(cli.owner.as_deref(), Some("u1"));
        assert!(cli.json);
        match cli.command {
            Commands::Ls { parent, recursive } => {
                assert_eq!(parent, "root");
                assert!(recursive);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_put_defaults_to_text_in_root() {
        let cli = Cli::try_parse_from(["folio", "put", "hello"]).unwrap();
        match cli.command {
            Commands::Put {
                content,
                folder,
                kind,
                ..
            } => {
                assert_eq!(content.as_deref(), Some("hello"));
                assert_eq!(folder, "root");
                assert_eq!(kind, "text");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_arg_fails() {
        assert!(Cli::try_parse_from(["folio", "rename", "f-1"]).is_err());
        assert!(Cli::try_parse_from(["folio", "trash"]).is_err());
    }

    #[test]
    fn test_trash_takes_several_ids() {
        let cli = Cli::try_parse_from(["folio", "trash", "f-1", "f-2", "--item"]).unwrap();
        match cli.command {
            Commands::Trash { ids, item } => {
                assert_eq!(ids, vec!["f-1", "f-2"]);
                assert!(item);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
