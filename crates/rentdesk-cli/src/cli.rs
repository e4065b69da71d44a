//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rentdesk_core::models::{QueryOptions, SortOrder};

#[derive(Parser, Debug)]
#[command(name = "rentdesk", about = "rentdesk listings admin CLI", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Request a one-time passcode by email
    Otp {
        email: String,
    },
    /// Log in with the emailed 6-digit passcode
    Login {
        email: String,
        code: String,
    },
    /// End the session and forget stored credentials
    Logout,
    /// Show the stored identity and permissions
    Whoami,
    /// States
    State {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Cities
    City {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Neighborhoods
    Neighborhood {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Apartment buildings
    Apartment {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Units inside apartment buildings
    Unit {
        #[command(subcommand)]
        action: EntityAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum EntityAction {
    /// List records
    List(ListArgs),
    /// List records as a paginated envelope
    Page(ListArgs),
    /// Fetch one record
    Get { id: String },
    /// Create a record
    Create(WriteArgs),
    /// Update a record; --data is merged over the current values
    Update {
        id: String,
        #[command(flatten)]
        args: WriteArgs,
    },
    /// Delete a record
    Delete { id: String },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
    /// Column to order by
    #[arg(long)]
    pub order_by: Option<String>,
    #[arg(long, value_enum, requires = "order_by")]
    pub sort: Option<SortArg>,
    /// Language tag (defaults to RENTDESK_LANGUAGE)
    #[arg(long)]
    pub language: Option<String>,
}

impl ListArgs {
    pub fn to_query(&self, default_language: &str) -> QueryOptions {
        let language = self
            .language
            .clone()
            .unwrap_or_else(|| default_language.to_string());
        let mut query = QueryOptions::new(language);
        query.name = self.name.clone();
        query.search = self.search.clone();
        query.page = self.page;
        query.limit = self.limit;
        if let Some(column) = &self.order_by {
            let order = self.sort.unwrap_or(SortArg::Asc);
            query = query.order_by(column.clone(), order.into());
        }
        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Asc => SortOrder::Asc,
            SortArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct WriteArgs {
    /// JSON object, or @path to read it from a file
    #[arg(long)]
    pub data: Option<String>,
    /// Files to upload and append to the media list
    #[arg(long = "media", num_args = 1..)]
    pub media: Vec<PathBuf>,
    /// Positions (0-based) of current media entries to drop
    #[arg(long = "drop-media", num_args = 1..)]
    pub drop_media: Vec<usize>,
}

impl WriteArgs {
    pub fn touches_media(&self) -> bool {
        !self.media.is_empty() || !self.drop_media.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_update_with_media() {
        let cli = Cli::try_parse_from([
            "rentdesk", "unit", "update", "u1", "--data", "{}", "--media", "a.jpg", "b.jpg",
            "--drop-media", "0",
        ])
        .unwrap();
        match cli.command {
            Commands::Unit {
                action: EntityAction::Update { id, args },
            } => {
                assert_eq!(id, "u1");
                assert_eq!(args.data.as_deref(), Some("{}"));
                assert_eq!(args.media, vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")]);
                assert_eq!(args.drop_media, vec![0]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_list_args_build_query() {
        let args = ListArgs {
            name: Some("Tex".to_string()),
            page: Some(2),
            order_by: Some("name".to_string()),
            sort: Some(SortArg::Desc),
            ..Default::default()
        };
        let query = args.to_query("en");
        assert_eq!(query.language, "en");
        assert_eq!(query.page, Some(2));
        assert_eq!(query.sorted_by, Some(SortOrder::Desc));

        let args = ListArgs {
            language: Some("fr".to_string()),
            ..Default::default()
        };
        assert_eq!(args.to_query("en").language, "fr");
    }

    #[test]
    fn test_sort_requires_order_by() {
        assert!(Cli::try_parse_from(["rentdesk", "state", "list", "--sort", "asc"]).is_err());
    }
}
