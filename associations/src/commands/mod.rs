//! Commands of the maintenance binary.
use crate::config::{Dependencies, Settings};
use crate::errors::AppError;
use associations_repository::run_migrations;
use associations_shared::types::{ContentKind, LinkLevel};
use std::collections::BTreeSet;
use std::future::Future;
use tracing::{info, warn};

const USAGE: &str = "usage: associations <migrate | sweep | rank <kind> <level>[,<level>...] [limit] | kinds>";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Apply the embedded migrations.
    Migrate,
    /// Apply migrations, then run one orphan sweep.
    Sweep,
    /// Print the best-linked profiles of a content kind as JSON.
    Rank {
        content_kind: ContentKind,
        levels: BTreeSet<LinkLevel>,
        limit: Option<usize>,
    },
    /// Print the configured vote kinds as JSON.
    Kinds,
}

fn parse_levels(raw: &str) -> Result<BTreeSet<LinkLevel>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .map(|level| {
            level
                .parse()
                .map(LinkLevel)
                .map_err(|_| AppError::config(format!("invalid level {level:?}")))
        })
        .collect()
}

impl Command {
    /// Parses the arguments following the program name.
    pub fn parse<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        match args.as_slice() {
            ["migrate"] => Ok(Self::Migrate),
            ["sweep"] => Ok(Self::Sweep),
            ["kinds"] => Ok(Self::Kinds),
            ["rank", kind, levels, rest @ ..] if rest.len() <= 1 => {
                let content_kind = ContentKind::new(*kind)
                    .map_err(|e| AppError::config(format!("invalid content kind: {e}")))?;
                let limit = rest
                    .first()
                    .map(|raw| {
                        raw.parse::<usize>()
                            .map_err(|_| AppError::config(format!("invalid limit {raw:?}")))
                    })
                    .transpose()?;
                Ok(Self::Rank {
                    content_kind,
                    levels: parse_levels(levels)?,
                    limit,
                })
            }
            _ => Err(AppError::config(USAGE)),
        }
    }

    /// Whether the command needs a database connection.
    pub fn needs_database(&self) -> bool {
        !matches!(self, Self::Kinds)
    }
}

/// Runs a command that only needs the settings.
pub fn run_offline(command: &Command, settings: &Settings) -> Result<(), AppError> {
    match command {
        Command::Kinds => {
            println!(
                "{}",
                serde_json::to_string_pretty(&settings.vote_kinds.list(None))?
            );
            Ok(())
        }
        _ => Err(AppError::config(format!("{command:?} needs a database"))),
    }
}

/// Runs a command against the wired dependencies.
pub async fn run(command: &Command, dependencies: &Dependencies) -> Result<(), AppError> {
    match command {
        Command::Migrate => {
            run_migrations(&dependencies.pool).await?;
            info!("Migrations applied");
        }
        Command::Sweep => {
            run_migrations(&dependencies.pool).await?;
            let summary = dependencies.sweeper.sweep().await?;
            info!(
                kept = summary.kept,
                deleted = summary.deleted,
                "Sweep completed"
            );
        }
        Command::Rank {
            content_kind,
            levels,
            limit,
        } => {
            let ranking = dependencies.ranking.rank(content_kind, levels, *limit).await?;
            println!("{}", serde_json::to_string_pretty(&ranking)?);
        }
        Command::Kinds => {
            println!(
                "{}",
                serde_json::to_string_pretty(&dependencies.store.vote_kinds(None))?
            );
        }
    }
    Ok(())
}

/// Drives `work` to completion unless `shutdown` resolves first.
///
/// # Returns
///
/// * `Ok(())` - The work finished successfully
/// * `Err(AppError::Interrupted)` - The shutdown signal arrived first
/// * `Err(AppError)` - The work itself failed
pub async fn run_until_shutdown<W, S>(work: W, shutdown: S) -> Result<(), AppError>
where
    W: Future<Output = Result<(), AppError>>,
    S: Future<Output = ()>,
{
    tokio::select! {
        result = work => result,
        () = shutdown => {
            warn!("Interrupted, stopping between batches");
            Err(AppError::Interrupted)
        }
    }
}
