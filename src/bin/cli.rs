//! Wardrobe CLI
//!
//! Command-line interface for the wardrobe API:
//! - Manage items and import them from CSV
//! - Log wears and outfits
//! - Show analytics, score and challenges
//! - Export data

use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::path::PathBuf;
use wardrobe::client::{ClientConfig, ClientError, WardrobeClient};
use wardrobe::config::generate_default_config;

#[derive(Parser)]
#[command(name = "wardrobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track your wardrobe, what you wear, and how well you use it")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// User id sent with every request
    #[arg(long, env = "WARDROBE_USER_ID", default_value = "local-user", global = true)]
    pub user: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage wardrobe items
    Items {
        #[command(subcommand)]
        action: ItemCommand,
    },

    /// Log a wear of one item
    Wear {
        /// Item id
        id: String,
        /// When it was worn (default: now). Supports: "now", "yesterday", ISO 8601
        #[arg(long)]
        at: Option<String>,
    },

    /// Outfit history
    Outfits {
        #[command(subcommand)]
        action: OutfitCommand,
    },

    /// Show the analytics dashboard
    Stats,

    /// Show the Global Wardrobe Score
    Score,

    /// Show profile, level and streak
    Profile,

    /// Show server status
    Status,

    /// Browse and join challenges
    Challenges {
        #[command(subcommand)]
        action: ChallengeCommand,
    },

    /// Export all data (paid plans)
    Export {
        /// Export format (json, csv)
        #[arg(long, default_value = "json")]
        export_format: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ItemCommand {
    /// List items
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// recent, most_worn, least_worn, cpw, name
        #[arg(long)]
        sort: Option<String>,
        /// Include archived items
        #[arg(long)]
        all: bool,
    },

    /// Add an item
    Add {
        name: String,
        /// top, bottom, dress, outerwear, shoes, accessory, bag, other
        category: String,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        /// Purchase date (YYYY-MM-DD)
        #[arg(long)]
        purchased: Option<NaiveDate>,
        /// Style tags
        #[arg(short = 'T', long)]
        tags: Vec<String>,
    },

    /// Archive an item (hidden from lists, kept in history)
    Archive { id: String },

    /// Delete an item
    Delete { id: String },

    /// Import items from a CSV file (paid plans)
    Import { path: PathBuf },
}

#[derive(Subcommand)]
pub enum OutfitCommand {
    /// List recent outfits
    List {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Log an outfit made of several items
    Log {
        /// Item ids
        #[arg(required = true)]
        item_ids: Vec<String>,
        #[arg(long)]
        occasion: Option<String>,
        /// AI-fit score from 0 to 100
        #[arg(long)]
        fit: Option<f64>,
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ChallengeCommand {
    /// List challenges and your progress
    List,
    /// Join a challenge
    Join { id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<ClientError>() {
            Some(client_err) => eprintln!("{}", client_err.user_message()),
            None => eprintln!("Error: {}", err),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = WardrobeClient::new(ClientConfig {
        base_url: cli.api_url.clone(),
        user_id: cli.user.clone(),
        ..Default::default()
    })?;
    let json_output = cli.format == OutputFormat::Json;

    match cli.command {
        Commands::Items { action } => match action {
            ItemCommand::List {
                category,
                color,
                tag,
                sort,
                all,
            } => {
                let mut query: Vec<(&str, String)> = Vec::new();
                if let Some(c) = category {
                    query.push(("category", c));
                }
                if let Some(c) = color {
                    query.push(("color", c));
                }
                if let Some(t) = tag {
                    query.push(("tag", t));
                }
                if let Some(s) = sort {
                    query.push(("sort", s));
                }
                if all {
                    query.push(("include_archived", "true".to_string()));
                }

                let list = client.items(&query).await?;
                if json_output {
                    println!("{}", serde_json::to_string_pretty(&list)?);
                } else if list.items.is_empty() {
                    println!("No items yet.");
                    println!();
                    println!("Add your first item with:");
                    println!("  wardrobe items add \"White tee\" top --color white");
                } else {
                    println!(
                        "{:<36}  {:<24} {:<10} {:<10} {:>5} {:>8}",
                        "ID", "Name", "Category", "Color", "Wears", "CPW"
                    );
                    println!("{}", "-".repeat(98));
                    for entry in &list.items {
                        let item = &entry.item;
                        println!(
                            "{:<36}  {:<24} {:<10} {:<10} {:>5} {:>8}",
                            item.id,
                            truncate(&item.name, 24),
                            item.category.to_string(),
                            item.color.as_deref().unwrap_or("-"),
                            item.wear_count,
                            format_money(entry.cost_per_wear),
                        );
                    }
                    println!();
                    println!("{} item(s)", list.total);
                }
            }

            ItemCommand::Add {
                name,
                category,
                color,
                brand,
                price,
                purchased,
                tags,
            } => {
                let body = json!({
                    "name": name,
                    "category": category.to_lowercase(),
                    "color": color,
                    "brand": brand,
                    "purchase_price": price,
                    "purchase_date": purchased,
                    "style_tags": tags,
                });
                let created = client.add_item(&body).await?;
                if json_output {
                    println!("{}", serde_json::to_string_pretty(&created)?);
                } else {
                    println!(
                        "Added {} ({})",
                        created["item"]["name"].as_str().unwrap_or("item"),
                        created["item"]["id"].as_str().unwrap_or("-")
                    );
                    print_gamification(&created["gamification"]);
                }
            }

            ItemCommand::Archive { id } => {
                let updated = client.update_item(&id, &json!({ "archived": true })).await?;
                if json_output {
                    println!("{}", serde_json::to_string_pretty(&updated)?);
                } else {
                    println!("Archived {}", id);
                }
            }

            ItemCommand::Delete { id } => {
                client.delete_item(&id).await?;
                println!("Deleted {}", id);
            }

            ItemCommand::Import { path } => {
                if !path.exists() {
                    anyhow::bail!("File not found: {:?}", path);
                }
                let csv = std::fs::read_to_string(&path)?;
                let result = client.import_items(csv).await?;

                if json_output {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    println!("Import results:");
                    println!("  Imported: {}", result["imported"].as_u64().unwrap_or(0));
                    println!("  Skipped (plan limit): {}", result["skipped"].as_u64().unwrap_or(0));
                    println!("  Failed rows: {}", result["failed"].as_u64().unwrap_or(0));

                    if let Some(errors) = result["errors"].as_array().filter(|e| !e.is_empty()) {
                        println!();
                        println!("Errors (first 10):");
                        for error in errors.iter().take(10) {
                            println!("  {}", error.as_str().unwrap_or("-"));
                        }
                    }
                    print_gamification(&result["gamification"]);
                }
            }
        },

        Commands::Wear { id, at } => {
            let worn_at = parse_time(at.as_deref())?;
            let result = client.log_wear(&id, Some(worn_at)).await?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "Logged wear of {} ({} wears)",
                    result["item"]["name"].as_str().unwrap_or(&id),
                    result["item"]["wear_count"].as_u64().unwrap_or(0)
                );
                if result["wear"]["revived"].as_bool().unwrap_or(false) {
                    println!("Revived a neglected item!");
                }
                print_gamification(&result["gamification"]);
            }
        }

        Commands::Outfits { action } => match action {
            OutfitCommand::List { limit } => {
                let list = client.outfits(Some(limit)).await?;
                if json_output {
                    println!("{}", serde_json::to_string_pretty(&list)?);
                    return Ok(());
                }

                let outfits = list["outfits"].as_array().cloned().unwrap_or_default();
                if outfits.is_empty() {
                    println!("No outfits logged yet.");
                    return Ok(());
                }

                println!("{:<17} {:>5} {:<16} {:>4}  {}", "Worn", "Items", "Occasion", "Fit", "Warnings");
                println!("{}", "-".repeat(70));
                for outfit in outfits {
                    let worn = outfit["worn_at"]
                        .as_str()
                        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:<17} {:>5} {:<16} {:>4}  {}",
                        worn,
                        outfit["item_ids"].as_array().map_or(0, |a| a.len()),
                        truncate(outfit["occasion"].as_str().unwrap_or("-"), 16),
                        outfit["fit_score"]
                            .as_f64()
                            .map(|f| format!("{:.1}", f))
                            .unwrap_or_else(|| "-".to_string()),
                        outfit["warning_text"].as_str().unwrap_or("")
                    );
                }
            }

            OutfitCommand::Log {
                item_ids,
                occasion,
                fit,
                at,
            } => {
                let worn_at = parse_time(at.as_deref())?;
                let body = json!({
                    "item_ids": item_ids,
                    "occasion": occasion,
                    "fit_score": fit,
                    "worn_at": worn_at,
                });
                let created = client.log_outfit(&body).await?;
                if json_output {
                    println!("{}", serde_json::to_string_pretty(&created)?);
                } else {
                    println!(
                        "Logged outfit {} with {} item(s)",
                        created["outfit"]["id"].as_str().unwrap_or("-"),
                        item_ids.len()
                    );
                    if let Some(text) = created["outfit"]["warning_text"].as_str() {
                        println!("Warnings: {}", text);
                    }
                    print_gamification(&created["gamification"]);
                }
            }
        },

        Commands::Stats => {
            let dashboard = client.dashboard().await?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
                return Ok(());
            }

            println!("Wardrobe Overview");
            println!();
            println!("  Items:        {} active, {} archived", dashboard.active_items, dashboard.archived_items);
            println!("  Total value:  {:.2}", dashboard.total_value);
            println!("  Average CPW:  {}", format_money(dashboard.average_cpw));
            println!(
                "  Utilization:  {:.1}% (last {} days)",
                dashboard.utilization_pct, dashboard.window_days
            );

            if !dashboard.categories.is_empty() {
                println!();
                println!("{:<12} {:>6} {:>6} {:>10}", "Category", "Items", "Wears", "Value");
                println!("{}", "-".repeat(37));
                for c in &dashboard.categories {
                    println!("{:<12} {:>6} {:>6} {:>10.2}", c.category.to_string(), c.count, c.wears, c.value);
                }
            }

            if !dashboard.most_worn.is_empty() {
                println!();
                println!("Most worn:");
                for item in &dashboard.most_worn {
                    println!("  {:<24} {} wears", truncate(&item.name, 24), item.wear_count);
                }
            }

            if !dashboard.neglected.is_empty() {
                println!();
                println!("Neglected:");
                for item in &dashboard.neglected {
                    println!("  {:<24} {} days unworn", truncate(&item.name, 24), item.days_since_worn);
                }
            }
        }

        Commands::Score => {
            let score = client.score().await?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&score)?);
                return Ok(());
            }

            let c = &score.components;
            println!("Global Wardrobe Score: {:.1} ({})", score.score, score.grade);
            println!();
            println!(
                "  Utilization: {:>5.1}  ({}/{} items worn)",
                c.utilization, c.worn_items, c.active_items
            );
            println!("  CPW trend:   {:>5.1}", c.cpw_trend);
            println!("  Fit:         {:>5.1}  ({} rated outfits)", c.fit, c.scored_outfits);
            println!("  Revival:     {:>5.1}  ({} revived wears)", c.revival, c.revived_wears);
            println!();
            println!("Window: last {} days", score.window_days);
        }

        Commands::Profile => {
            let profile = client.profile().await?;
            let game = client.gamification().await?;
            if json_output {
                let combined = json!({ "profile": profile, "gamification": game });
                println!("{}", serde_json::to_string_pretty(&combined)?);
                return Ok(());
            }

            println!(
                "Profile: {} ({:.0}% complete)",
                profile["display_name"].as_str().unwrap_or(&cli.user),
                profile["completeness"].as_f64().unwrap_or(0.0) * 100.0
            );
            println!();
            println!(
                "Level {} {} ({} XP)",
                game["level"]["level"].as_u64().unwrap_or(1),
                game["level"]["title"].as_str().unwrap_or(""),
                game["xp"].as_u64().unwrap_or(0)
            );
            if let Some(next) = game["level"]["next_threshold"].as_u64() {
                println!("Next level at {} XP", next);
            }
            println!("Streak: {} day(s)", game["current_streak"].as_u64().unwrap_or(0));

            if let Some(badges) = game["badges"].as_array().filter(|b| !b.is_empty()) {
                println!();
                println!("Badges:");
                for badge in badges {
                    println!("  {}", badge["id"].as_str().unwrap_or("-"));
                }
            }
        }

        Commands::Status => match client.health().await {
            Ok(health) => {
                if json_output {
                    println!("{}", serde_json::to_string_pretty(&health)?);
                    return Ok(());
                }

                println!("Wardrobe v{}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));
                println!("Storage:    {}", health["storage"].as_str().unwrap_or("unknown"));

                if let Some(docs) = health.get("documents").filter(|d| !d.is_null()) {
                    println!();
                    println!("Documents:");
                    if let Some(total) = docs["documents"].as_u64() {
                        println!("  Total: {}", total);
                    }
                }

                if let Some(ws) = health["ws_connections"].as_u64() {
                    println!();
                    println!("Live connections: {}", ws);
                }
                if let Some(uptime) = health["uptime_seconds"].as_u64() {
                    println!("Uptime: {}", format_duration(uptime));
                }
            }
            Err(ClientError::Transport(e)) => {
                eprintln!("Cannot connect to Wardrobe API at {}", cli.api_url);
                eprintln!("Error: {}", e);
                eprintln!();
                eprintln!("Make sure the Wardrobe API server is running:");
                eprintln!("  cargo run --bin wardrobe-api");
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },

        Commands::Challenges { action } => match action {
            ChallengeCommand::List => {
                let challenges = client.challenges().await?;
                if json_output {
                    println!("{}", serde_json::to_string_pretty(&challenges)?);
                    return Ok(());
                }

                println!("{:<20} {:<24} {:>6} {:>6}  {}", "ID", "Title", "Target", "XP", "Status");
                println!("{}", "-".repeat(72));
                for c in challenges.as_array().cloned().unwrap_or_default() {
                    println!(
                        "{:<20} {:<24} {:>6} {:>6}  {}",
                        c["id"].as_str().unwrap_or("-"),
                        truncate(c["title"].as_str().unwrap_or("-"), 24),
                        c["target"].as_u64().unwrap_or(0),
                        c["xp_reward"].as_u64().unwrap_or(0),
                        c["status"].as_str().unwrap_or("-")
                    );
                }
            }
            ChallengeCommand::Join { id } => {
                let joined = client.join_challenge(&id).await?;
                if json_output {
                    println!("{}", serde_json::to_string_pretty(&joined)?);
                } else {
                    println!("Joined challenge {}", id);
                }
            }
        },

        Commands::Export {
            export_format,
            output,
        } => {
            let data = client.export(&export_format).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &data)?;
                    println!("Exported to {:?}", path);
                }
                None => print!("{}", data),
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", config),
            }
        }
    }

    Ok(())
}

/// Print XP, level-ups and badges from a gamification outcome
fn print_gamification(outcome: &Value) {
    if outcome.is_null() {
        return;
    }
    if let Some(xp) = outcome["xp_gained"].as_u64().filter(|xp| *xp > 0) {
        println!("+{} XP", xp);
    }
    if let (Some(before), Some(after)) = (
        outcome["level_before"].as_u64(),
        outcome["level_after"].as_u64(),
    ) {
        if after > before {
            println!("Level up! You reached level {}", after);
        }
    }
    for badge in outcome["badges_unlocked"].as_array().into_iter().flatten() {
        println!("Badge earned: {}", badge.as_str().unwrap_or("-"));
    }
}

fn parse_time(s: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match s {
        None | Some("now") => Ok(Utc::now()),
        Some("yesterday") => Ok(Utc::now() - Duration::days(1)),
        Some(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                Ok(dt.with_timezone(&Utc))
            } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                date.and_hms_opt(12, 0, 0)
                    .map(|dt| dt.and_utc())
                    .ok_or_else(|| anyhow::anyhow!("Invalid date: {}", s))
            } else {
                anyhow::bail!("Invalid time format: {}. Use: now, yesterday, 2024-05-01, or RFC 3339", s)
            }
        }
    }
}

fn format_money(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
