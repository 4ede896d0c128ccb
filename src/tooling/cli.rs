//! CLI Tooling
//!
//! Command-line interface over the [`Toolbox`] facade. Every command returns
//! its output as a string; the binary decides where it goes.

use crate::config::ToolboxConfig;
use crate::error::ToolboxError;
use crate::toolbox::{PruneCutoff, PruneOptions, SearchField, Toolbox};
use crate::tooling::format::{
    format_notes_text, format_section_heading, format_users_text, format_warnings_text,
};
use crate::usernotes::{Note, ReadMode, SortOrder, WriteMode};
use crate::wiki::{DirectoryWikiStore, RedditWikiStore, WikiPageStore};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Toolbox usernotes CLI
#[derive(Parser)]
#[command(name = "toolbox-notes")]
#[command(about = "Read and edit Moderator Toolbox usernotes on a subreddit wiki")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Subreddit whose wiki holds the usernotes
    #[arg(long, short = 's')]
    pub subreddit: String,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Read and write pages as files under this directory instead of Reddit
    #[arg(long)]
    pub pages_dir: Option<PathBuf>,

    /// Read and write pages as files under the platform data directory
    #[arg(long, conflicts_with = "pages_dir")]
    pub offline: bool,

    /// Enable verbose logging (same as --log-level debug)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List users with notes
    Users {
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the notes on one user, newest first
    Notes {
        user: String,
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show every note on the subreddit
    All {
        #[arg(long)]
        oldest_first: bool,
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List warning kinds a note may carry
    Warnings,
    /// Add a note to a user
    Add {
        user: String,
        text: String,
        /// Moderator to record (defaults to usernotes.default_moderator)
        #[arg(long)]
        moderator: Option<String>,
        /// Warning kind, e.g. spamwarn
        #[arg(long)]
        warning: Option<String>,
        /// Permalink to the post, comment or modmail the note is about
        #[arg(long)]
        link: Option<String>,
        /// Unix timestamp (defaults to now)
        #[arg(long)]
        time: Option<i64>,
    },
    /// Remove one note, by timestamp or by position in `notes` output
    Remove {
        user: String,
        #[arg(required_unless_present = "position")]
        timestamp: Option<i64>,
        #[arg(long, conflicts_with = "timestamp")]
        position: Option<usize>,
    },
    /// Remove every note on a user
    Purge {
        user: String,
        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Remove old notes in a single edit
    Prune {
        /// Age in days (default 180)
        #[arg(long, conflicts_with = "before")]
        days: Option<u32>,
        /// Remove notes at or before this unix timestamp
        #[arg(long)]
        before: Option<i64>,
        /// Warning kinds to keep regardless of age
        #[arg(long = "exclude")]
        exclude: Vec<String>,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        yes: bool,
    },
    /// Search notes
    Search {
        query: String,
        /// note, user, moderator, warning, link, before, after
        #[arg(long, default_value = "note")]
        field: String,
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration as TOML
    Config,
}

impl Cli {
    /// Fold the logging flags into the loaded configuration.
    pub fn apply_overrides(&self, mut config: ToolboxConfig) -> ToolboxConfig {
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
        config
    }
}

/// CLI context holding the toolbox for one subreddit.
pub struct CliContext {
    config: Arc<ToolboxConfig>,
    toolbox: Mutex<Toolbox>,
}

impl CliContext {
    /// Create a new CLI context. Nothing is fetched until a command runs.
    pub fn new(cli: &Cli, config: ToolboxConfig) -> Result<Self, ToolboxError> {
        let wiki: Arc<dyn WikiPageStore> = match (&cli.pages_dir, cli.offline) {
            (Some(dir), _) => Arc::new(DirectoryWikiStore::new(dir.join(&cli.subreddit))),
            (None, true) => Arc::new(DirectoryWikiStore::for_subreddit(&cli.subreddit)?),
            (None, false) => {
                Arc::new(RedditWikiStore::new(cli.subreddit.clone(), &config.reddit)?)
            }
        };
        Ok(Self::with_store(cli.subreddit.clone(), wiki, config))
    }

    /// Context over an explicit page store.
    pub fn with_store(
        subreddit: impl Into<String>,
        wiki: Arc<dyn WikiPageStore>,
        config: ToolboxConfig,
    ) -> Self {
        let config = Arc::new(config);
        let toolbox = Toolbox::new(subreddit, wiki, config.clone());
        Self {
            config,
            toolbox: Mutex::new(toolbox),
        }
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ToolboxError> {
        let mut toolbox = self.toolbox.lock();
        if !matches!(command, Commands::Config) {
            toolbox.load_settings()?;
        }

        match command {
            Commands::Config => self.config.to_toml_string(),
            Commands::Users { format } => {
                let users = toolbox.usernotes_mut().list_users(ReadMode::Local)?;
                render(format, &users, || format_users_text(&users))
            }
            Commands::Notes { user, format } => {
                let notes = toolbox.usernotes_mut().list_notes(user, ReadMode::Local)?;
                render(format, &notes, || {
                    format_notes_text(&format!("Notes on {}", user), &notes)
                })
            }
            Commands::All {
                oldest_first,
                format,
            } => {
                let order = if *oldest_first {
                    SortOrder::OldestFirst
                } else {
                    SortOrder::NewestFirst
                };
                let notes = toolbox
                    .usernotes_mut()
                    .list_all_notes(ReadMode::Local, order)?;
                render(format, &notes, || format_notes_text("All notes", &notes))
            }
            Commands::Warnings => {
                let kinds = toolbox.usernotes_mut().warnings(ReadMode::Local)?;
                Ok(format_warnings_text(&kinds))
            }
            Commands::Add {
                user,
                text,
                moderator,
                warning,
                link,
                time,
            } => {
                let mut note = Note::new(user.clone(), text.clone());
                note.moderator = moderator.clone();
                note.warning = warning.clone();
                note.link = link.clone();
                if let Some(time) = time {
                    note.time = *time;
                }
                let reason = toolbox.usernotes_mut().add(note, WriteMode::Immediate)?;
                info!(user = %user, "Added note");
                Ok(format!("Saved: {}", reason))
            }
            Commands::Remove {
                user,
                timestamp,
                position,
            } => {
                let reason = match (timestamp, position) {
                    (_, Some(position)) => {
                        toolbox.remove_note_at(user, *position, WriteMode::Immediate)?
                    }
                    (Some(timestamp), None) => {
                        toolbox
                            .usernotes_mut()
                            .remove(user, *timestamp, WriteMode::Immediate)?
                    }
                    (None, None) => {
                        return Err(ToolboxError::InvalidQuery(
                            "give a timestamp or --position".to_string(),
                        ))
                    }
                };
                Ok(format!("Saved: {}", reason))
            }
            Commands::Purge { user, yes } => {
                if !*yes && !confirm(&format!("Delete every note on user '{}'?", user))? {
                    return Ok("Purge cancelled".to_string());
                }
                let reason = toolbox.usernotes_mut().purge(user, WriteMode::Immediate)?;
                Ok(format!("Saved: {}", reason))
            }
            Commands::Prune {
                days,
                before,
                exclude,
                dry_run,
                yes,
            } => {
                let cutoff = match (before, days) {
                    (Some(ts), _) => PruneCutoff::Before(*ts),
                    (None, Some(days)) => PruneCutoff::Days(*days),
                    (None, None) => PruneOptions::default().cutoff,
                };
                if !*dry_run && !*yes && !confirm(&format!("Delete all notes {}?", cutoff))? {
                    return Ok("Prune cancelled".to_string());
                }
                let report = toolbox.prune_notes(&PruneOptions {
                    cutoff,
                    exclude_kinds: exclude.clone(),
                    dry_run: *dry_run,
                })?;
                Ok(format!(
                    "{}\n{} notes preserved by exclusions",
                    report, report.notes_preserved
                ))
            }
            Commands::Search {
                query,
                field,
                format,
            } => {
                let field: SearchField = field.parse()?;
                let notes = toolbox.search_notes(query, field, ReadMode::Local)?;
                render(format, &notes, || {
                    format_notes_text(&format!("Search results for '{}'", query), &notes)
                })
            }
        }
    }
}

fn render<T: serde::Serialize + ?Sized>(
    format: &str,
    value: &T,
    text: impl FnOnce() -> String,
) -> Result<String, ToolboxError> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(value)?),
        "text" => Ok(text()),
        other => Err(ToolboxError::InvalidQuery(format!(
            "Invalid format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

fn confirm(prompt: &str) -> Result<bool, ToolboxError> {
    use dialoguer::Confirm;
    eprintln!("{}", format_section_heading("Confirm"));
    Confirm::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| ToolboxError::ConfigError(format!("Failed to get user input: {}", e)))
}
