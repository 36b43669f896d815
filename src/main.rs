use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use battleboard::config::AppConfig;
use battleboard::engine::{SortMode, TeamEntry, TournamentRepository};
use battleboard::models::TournamentConfig;
use battleboard::scoring::{decode_rank_points, encode_rank_points};
use battleboard::storage::StorageConfig;

#[derive(Parser)]
#[command(name = "battleboard")]
#[command(about = "Tournament scoring and leaderboard engine")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save the tournament configuration
    SetConfig {
        /// Number of tournament days
        #[arg(long)]
        days: u32,

        /// Matches scheduled per day
        #[arg(long)]
        matches_per_day: u32,

        /// Points awarded per kill
        #[arg(long, default_value = "1")]
        points_per_kill: u32,

        /// Rank points table as JSON, e.g. '{"1": 15, "2": 12}'
        #[arg(long, default_value = "{}")]
        rank_points: String,
    },

    /// Show the current tournament configuration
    ShowConfig,

    /// Delete the tournament configuration (match history is kept)
    DeleteConfig,

    /// Check whether shrinking the schedule would hide stored results
    CheckShrink {
        /// Proposed matches-per-day limit
        #[arg(long)]
        matches_per_day: Option<u32>,

        /// Proposed total-days limit
        #[arg(long)]
        days: Option<u32>,
    },

    /// Save results for one match
    SaveMatch {
        #[arg(long)]
        day: u32,

        #[arg(long, value_name = "MATCH")]
        match_number: u32,

        /// Team entries as rank:team:kills (repeatable)
        #[arg(long = "entry", value_name = "RANK:TEAM:KILLS")]
        entries: Vec<String>,
    },

    /// Show saved results for one match
    Results {
        #[arg(long)]
        day: u32,

        #[arg(long, value_name = "MATCH")]
        match_number: u32,
    },

    /// Apply or remove penalties
    Penalty {
        #[command(subcommand)]
        action: PenaltyAction,
    },

    /// Manually overwrite one team's total points for a match
    OverrideScore {
        #[arg(long)]
        day: u32,

        #[arg(long, value_name = "MATCH")]
        match_number: u32,

        #[arg(long)]
        team: u32,

        #[arg(long)]
        points: i64,
    },

    /// Manage team alias groups
    Alias {
        #[command(subcommand)]
        action: AliasAction,
    },

    /// Show the leaderboard
    Leaderboard {
        /// Restrict to one day
        #[arg(long)]
        day: Option<u32>,

        /// Sort order: "points" or "team"
        #[arg(long, default_value = "points")]
        sort: String,
    },

    /// Delete stored results and penalties
    Reset {
        #[command(subcommand)]
        action: ResetAction,
    },

    /// Show which days and matches have data
    Status,
}

#[derive(Subcommand)]
enum PenaltyAction {
    /// Apply (or replace) a penalty
    Apply {
        #[arg(long)]
        day: u32,

        #[arg(long, value_name = "MATCH")]
        match_number: u32,

        #[arg(long)]
        team: u32,

        #[arg(long)]
        points: i64,
    },

    /// Remove a penalty
    Remove {
        #[arg(long)]
        day: u32,

        #[arg(long, value_name = "MATCH")]
        match_number: u32,

        #[arg(long)]
        team: u32,
    },
}

#[derive(Subcommand)]
enum AliasAction {
    /// Create or replace an alias group
    Set {
        /// The primary team number representing the group
        #[arg(long)]
        primary: u32,

        /// Alias team numbers (comma-separated)
        #[arg(long, value_delimiter = ',')]
        aliases: Vec<u32>,

        /// Group label
        #[arg(long, default_value = "")]
        name: String,
    },

    /// List alias groups
    List,

    /// Remove one alias group
    Remove {
        #[arg(long)]
        primary: u32,
    },

    /// Remove all alias groups
    Clear,
}

#[derive(Subcommand)]
enum ResetAction {
    /// Reset one match (results and penalties)
    Match {
        #[arg(long)]
        day: u32,

        #[arg(long, value_name = "MATCH")]
        match_number: u32,
    },

    /// Reset one day
    Day {
        #[arg(long)]
        day: u32,
    },

    /// Reset an inclusive day range
    Days {
        #[arg(long)]
        from: u32,

        #[arg(long)]
        to: u32,
    },

    /// Reset everything
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = PathBuf::from(&cli.config);
    let app_config = if config_path.exists() {
        AppConfig::from_file(&config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?
    } else {
        AppConfig::default()
    };

    let data_dir = cli
        .data_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| app_config.data_dir.clone());
    let log_level = cli.log_level.unwrap_or_else(|| app_config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let storage = StorageConfig::new(data_dir);
    let repository = TournamentRepository::open(&storage)?;

    match cli.command {
        Commands::SetConfig {
            days,
            matches_per_day,
            points_per_kill,
            rank_points,
        } => {
            let table = decode_rank_points(&rank_points)?;
            repository.save_config(TournamentConfig::new(
                days,
                matches_per_day,
                points_per_kill,
                table,
            ))?;
            println!("Configuration saved.");
        }

        Commands::ShowConfig => match repository.current_config()? {
            Some(config) => {
                println!("Days:             {}", config.total_days);
                println!("Matches per day:  {}", config.matches_per_day);
                println!("Teams:            {}", config.total_teams);
                println!("Points per kill:  {}", config.points_per_kill);
                println!("Rank points:      {}", encode_rank_points(&config.rank_points));
                println!("Created at:       {}", config.created_at);
            }
            None => println!("No configuration set."),
        },

        Commands::DeleteConfig => {
            repository.delete_configuration()?;
            println!("Configuration deleted. Match history retained.");
        }

        Commands::CheckShrink {
            matches_per_day,
            days,
        } => {
            if matches_per_day.is_none() && days.is_none() {
                bail!("pass --matches-per-day and/or --days");
            }
            if let Some(limit) = matches_per_day {
                if repository.check_shrink_conflict(limit)? {
                    println!(
                        "Conflict: results exist beyond match {} (they would be hidden, not deleted).",
                        limit
                    );
                } else {
                    println!("No results beyond match {}.", limit);
                }
            }
            if let Some(limit) = days {
                if repository.check_day_shrink_conflict(limit)? {
                    println!(
                        "Conflict: results exist beyond day {} (they would be hidden, not deleted).",
                        limit
                    );
                } else {
                    println!("No results beyond day {}.", limit);
                }
            }
        }

        Commands::SaveMatch {
            day,
            match_number,
            entries,
        } => {
            let parsed: Vec<TeamEntry> = entries
                .iter()
                .map(|raw| parse_entry(raw))
                .collect::<Result<_>>()?;
            repository.save_match_results(day, match_number, &parsed)?;
            println!(
                "Saved {} result(s) for day {} match {}.",
                parsed.len(),
                day,
                match_number
            );
        }

        Commands::Results { day, match_number } => {
            let results = repository.match_results(day, match_number)?;
            if results.is_empty() {
                println!("No results for day {} match {}.", day, match_number);
            } else {
                println!("{:>5} {:>5} {:>6} {:>7}", "team", "rank", "kills", "points");
                for result in results {
                    println!(
                        "{:>5} {:>5} {:>6} {:>7}",
                        result.team_number, result.rank, result.kills, result.total_points
                    );
                }
            }
        }

        Commands::Penalty { action } => match action {
            PenaltyAction::Apply {
                day,
                match_number,
                team,
                points,
            } => {
                repository.apply_penalty(day, match_number, team, points)?;
                println!(
                    "Penalty of {} applied to team {} (day {} match {}).",
                    points, team, day, match_number
                );
            }
            PenaltyAction::Remove {
                day,
                match_number,
                team,
            } => {
                repository.remove_penalty(day, match_number, team)?;
                println!(
                    "Penalty removed for team {} (day {} match {}).",
                    team, day, match_number
                );
            }
        },

        Commands::OverrideScore {
            day,
            match_number,
            team,
            points,
        } => {
            repository.override_score(day, match_number, team, points)?;
            println!(
                "Score for team {} (day {} match {}) set to {}.",
                team, day, match_number, points
            );
        }

        Commands::Alias { action } => match action {
            AliasAction::Set {
                primary,
                aliases,
                name,
            } => {
                repository.save_alias_group(primary, &aliases, &name)?;
                println!("Alias group saved: primary {} <- {:?}.", primary, aliases);
            }
            AliasAction::List => {
                let groups = repository.alias_groups()?;
                if groups.is_empty() {
                    println!("No alias groups.");
                }
                for group in groups {
                    println!(
                        "{}: primary {} <- {:?}",
                        if group.group_name.is_empty() {
                            "(unnamed)"
                        } else {
                            &group.group_name
                        },
                        group.primary_team_number,
                        group.alias_team_numbers
                    );
                }
            }
            AliasAction::Remove { primary } => {
                repository.delete_alias_group(primary)?;
                println!("Alias group for primary {} removed.", primary);
            }
            AliasAction::Clear => {
                repository.delete_all_aliases()?;
                println!("All alias groups removed.");
            }
        },

        Commands::Leaderboard { day, sort } => {
            let mode = match sort.as_str() {
                "points" => SortMode::ByPoints,
                "team" => SortMode::ByTeamNumber,
                other => bail!("unknown sort order: {} (use \"points\" or \"team\")", other),
            };
            let scores = repository.leaderboard(day, mode)?;
            if scores.is_empty() {
                println!("No data.");
            } else {
                println!(
                    "{:>4} {:>5} {:>7} {:>6} {:>7}",
                    "#", "team", "points", "kills", "played"
                );
                for (position, score) in scores.iter().enumerate() {
                    println!(
                        "{:>4} {:>5} {:>7} {:>6} {:>7}",
                        position + 1,
                        score.team_number,
                        score.total_points,
                        score.total_kills,
                        score.matches_played
                    );
                }
            }
        }

        Commands::Reset { action } => match action {
            ResetAction::Match { day, match_number } => {
                repository.reset_match(day, match_number)?;
                println!("Reset day {} match {}.", day, match_number);
            }
            ResetAction::Day { day } => {
                repository.reset_day(day)?;
                println!("Reset day {}.", day);
            }
            ResetAction::Days { from, to } => {
                repository.reset_days(from, to)?;
                println!("Reset days {} through {}.", from, to);
            }
            ResetAction::All => {
                repository.reset_all()?;
                println!("All match data reset.");
            }
        },

        Commands::Status => {
            match repository.current_config()? {
                Some(config) => println!(
                    "Configured: {} day(s), {} match(es) per day.",
                    config.total_days, config.matches_per_day
                ),
                None => println!("No configuration set."),
            }
            let days = repository.days_with_data()?;
            if days.is_empty() {
                println!("No match data.");
            } else {
                for day in days {
                    let matches = repository.matches_with_data(day)?;
                    println!("Day {}: matches with data {:?}", day, matches);
                }
            }
        }
    }

    Ok(())
}

/// Parse one `rank:team:kills` entry.
fn parse_entry(raw: &str) -> Result<TeamEntry> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 3 {
        bail!("invalid entry {:?} (expected RANK:TEAM:KILLS)", raw);
    }
    let parse = |part: &str, what: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|_| anyhow!("invalid {} in entry {:?}", what, raw))
    };
    Ok(TeamEntry {
        rank: parse(parts[0], "rank")?,
        team_number: parse(parts[1], "team")?,
        kills: parse(parts[2], "kills")?,
    })
}
