use crate::content::{ContentField, PlatformKey};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// `copydesk` - review and approve per-platform marketing copy.
#[derive(Parser, Debug)]
#[command(name = "copydesk")]
#[command(version = "0.1.0")]
#[command(about = "Review, edit and approve platform-adapted product copy.", long_about = None)]
pub struct Cli {
    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List publishing platforms and their limits
    Platforms {
        /// Use the configured / built-in platform table instead of the API
        #[arg(long)]
        offline: bool,
    },

    /// Normalize raw hashtag input
    Hashtags {
        /// Comma or whitespace separated hashtags
        raw: String,
    },

    /// Validate one draft against a platform
    Validate {
        /// Platform key (e.g. instagram)
        #[arg(short, long)]
        platform: String,

        #[arg(long, default_value = "")]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Comma or whitespace separated hashtags
        #[arg(long, default_value = "")]
        hashtags: String,

        /// Validate locally against the offline platform table
        #[arg(long)]
        offline: bool,
    },

    /// Review generated content: edit, validate, then approve or discard
    Review {
        /// Generated content JSON file
        file: PathBuf,

        /// Deselect a platform (repeatable)
        #[arg(long, value_name = "PLATFORM")]
        deselect: Vec<String>,

        /// Edit a draft field, e.g. `instagram.title=Summer linen` (repeatable)
        #[arg(long = "set", value_name = "PLATFORM.FIELD=VALUE", value_parser = parse_field_assignment)]
        assignments: Vec<FieldAssignment>,

        /// Action to dispatch once validation settles
        #[arg(long, value_enum)]
        action: Option<ReviewAction>,

        /// Print the final state as JSON
        #[arg(long)]
        json: bool,

        /// Work against the offline platform table with local validation
        #[arg(long)]
        offline: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReviewAction {
    Approve,
    Reject,
    Regenerate,
}

/// `PLATFORM.FIELD=VALUE` from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAssignment {
    pub platform: PlatformKey,
    pub field: ContentField,
    pub value: String,
}

pub fn parse_field_assignment(raw: &str) -> Result<FieldAssignment, String> {
    let (target, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PLATFORM.FIELD=VALUE, got `{raw}`"))?;
    let (platform, field) = target
        .split_once('.')
        .ok_or_else(|| format!("expected PLATFORM.FIELD before `=`, got `{target}`"))?;
    if platform.trim().is_empty() {
        return Err("platform must not be empty".into());
    }
    let field = field
        .trim()
        .parse::<ContentField>()
        .map_err(|_| format!("unknown field `{field}` (title, description, hashtags)"))?;
    Ok(FieldAssignment {
        platform: PlatformKey::from(platform.trim()),
        field,
        value: value.to_string(),
    })
}
