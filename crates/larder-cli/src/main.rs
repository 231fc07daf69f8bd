//! Larder CLI - local-first recipe keeper

use anyhow::Context;
use clap::{Parser, Subcommand};
use larder_core::config::Config;
use larder_core::domain::heritage::HeritageGraph;
use larder_core::domain::instance::{
    IngredientModification, InstanceDraft, InstanceManager, InstanceRepository,
};
use larder_core::domain::recipe::{
    Ingredient, Instruction, Recipe, RecipeDraft, RecipeRepository, RecipeVersion, VersionStore,
};
use larder_core::scaling::{Unit, UnitSystem, convert, format_quantity, round_to_practical};
use larder_core::storage::{Database, DatabaseConfig, default_database_path};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "larder")]
#[command(author, version, about = "Local-first recipe keeper with full edit history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new recipe from a JSON draft file
    New {
        /// Path to a JSON recipe draft
        file: PathBuf,
    },

    /// Append a new version from a JSON draft file
    Edit {
        /// Recipe id (or unique id prefix)
        id: String,
        /// Path to a JSON recipe draft
        file: PathBuf,
        /// Fail instead of saving if the recipe has moved past this version
        #[arg(long)]
        expect_version: Option<i64>,
    },

    /// Show a recipe at its current or a past version
    Show {
        /// Recipe id (or unique id prefix)
        id: String,
        /// Version number (defaults to the current version)
        #[arg(short, long)]
        version: Option<i64>,
    },

    /// List every version of a recipe, oldest first
    History {
        /// Recipe id (or unique id prefix)
        id: String,
    },

    /// Append a new version carrying the content of an old one
    Restore {
        /// Recipe id (or unique id prefix)
        id: String,
        /// Version number to bring back
        version: i64,
    },

    /// Duplicate a recipe under a new title, keeping lineage
    Duplicate {
        /// Recipe id (or unique id prefix)
        id: String,
        /// Title for the copy
        new_title: String,
    },

    /// Show where a recipe came from and what was made from it
    Heritage {
        /// Recipe id (or unique id prefix)
        id: String,
    },

    /// Archive a recipe (hides it from `larder list`, removes nothing)
    Archive {
        /// Recipe id (or unique id prefix)
        id: String,
    },

    /// List recipes
    List {
        /// Include archived recipes
        #[arg(long)]
        all: bool,
    },

    /// Record and replay cooking sessions
    Cook {
        #[command(subcommand)]
        action: CookAction,
    },

    /// Convert a quantity between units
    Convert {
        /// Amount to convert
        quantity: f64,
        /// Unit to convert from (e.g. cup)
        from: String,
        /// Unit to convert to (e.g. ml)
        to: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum CookAction {
    /// Freeze the current version into a cooking instance
    Start {
        /// Recipe id (or unique id prefix)
        recipe_id: String,
        /// Scale factor (defaults to the configured default)
        #[arg(long)]
        scale: Option<f64>,
        /// Unit system, us or metric (defaults to the configured default)
        #[arg(long)]
        units: Option<String>,
        /// Servings override
        #[arg(long)]
        servings: Option<i64>,
        /// Free-form note about this cook
        #[arg(long)]
        note: Option<String>,
        /// Ingredient override as INDEX=QUANTITY, may repeat
        #[arg(long = "modify")]
        modifications: Vec<String>,
    },
    /// Replay the exact quantities of a recorded cook
    Show {
        /// Instance id
        instance_id: String,
    },
    /// List recorded cooks for a recipe, newest first
    List {
        /// Recipe id (or unique id prefix)
        recipe_id: String,
    },
    /// Link an instance to a cook session
    Link {
        /// Instance id
        instance_id: String,
        /// Cook session id
        session_id: String,
    },
    /// Attach a photo id to an instance
    Photo {
        /// Instance id
        instance_id: String,
        /// Photo id
        photo_id: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; logs go to stderr so JSON output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("larder=info".parse()?)
                .add_directive("larder_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::New { file } => {
            let db = open_database().await?;
            cmd_new(&db, &file, cli.quiet).await
        }

        Commands::Edit {
            id,
            file,
            expect_version,
        } => {
            let db = open_database().await?;
            cmd_edit(&db, &id, &file, expect_version, cli.quiet).await
        }

        Commands::Show { id, version } => {
            let db = open_database().await?;
            cmd_show(&db, &id, version, cli.format).await
        }

        Commands::History { id } => {
            let db = open_database().await?;
            cmd_history(&db, &id, cli.format).await
        }

        Commands::Restore { id, version } => {
            let db = open_database().await?;
            cmd_restore(&db, &id, version, cli.quiet).await
        }

        Commands::Duplicate { id, new_title } => {
            let db = open_database().await?;
            cmd_duplicate(&db, &id, &new_title, cli.quiet).await
        }

        Commands::Heritage { id } => {
            let db = open_database().await?;
            cmd_heritage(&db, &id, cli.format).await
        }

        Commands::Archive { id } => {
            let db = open_database().await?;
            cmd_archive(&db, &id, cli.quiet).await
        }

        Commands::List { all } => {
            let db = open_database().await?;
            cmd_list(&db, all, cli.format, cli.quiet).await
        }

        Commands::Cook { action } => {
            let db = open_database().await?;
            cmd_cook(&db, action, cli.format, cli.quiet).await
        }

        Commands::Convert { quantity, from, to } => cmd_convert(quantity, &from, &to),

        Commands::Config { action } => cmd_config(action, cli.quiet),

        Commands::Doctor => cmd_doctor(cli.quiet).await,
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_new(db: &Database, file: &Path, quiet: bool) -> anyhow::Result<()> {
    let store = VersionStore::new(db.pool().clone());
    let draft = read_draft(file)?;
    let recipe = store.create(&draft).await?;

    if !quiet {
        println!("Recipe created successfully!");
        println!("  ID: {}", recipe.id);
        println!("  Title: {}", draft.title);
        println!("  Version: {}", recipe.current_version);
        println!("\nNext steps:");
        println!("  1. Run `larder show {}` to review it", recipe.id);
        println!("  2. Run `larder cook start {}` when you make it", recipe.id);
    }
    Ok(())
}

async fn cmd_edit(
    db: &Database,
    id: &str,
    file: &Path,
    expect_version: Option<i64>,
    quiet: bool,
) -> anyhow::Result<()> {
    let store = VersionStore::new(db.pool().clone());
    let recipe_id = resolve_recipe_id(&store, id).await?;
    let draft = read_draft(file)?;

    let version = match expect_version {
        Some(expected) => store.update_expecting(recipe_id, expected, &draft).await?,
        None => store.update(recipe_id, &draft).await?,
    };

    if !quiet {
        println!("Version {} of '{}' saved.", version.version, version.title);
    }
    Ok(())
}

async fn cmd_show(
    db: &Database,
    id: &str,
    version: Option<i64>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let store = VersionStore::new(db.pool().clone());
    let recipe_id = resolve_recipe_id(&store, id).await?;

    let recipe = store.get(recipe_id).await?;
    let snapshot = match version {
        Some(number) => store.get_version(recipe_id, number).await?,
        None => store.get_current(recipe_id).await?,
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let archived = if recipe.is_archived() {
        " [archived]"
    } else {
        ""
    };
    println!(
        "{} (version {} of {}){}",
        snapshot.title, snapshot.version, recipe.current_version, archived
    );
    if let Some(description) = &snapshot.description {
        println!("  {}", description);
    }
    println!("  Servings: {}", snapshot.servings);
    println!(
        "  Prep: {} min, Cook: {} min",
        snapshot.prep_time_mins, snapshot.cook_time_mins
    );
    if let Some(url) = &snapshot.source_url {
        println!("  Source: {}", url);
    }
    println!();
    println!("Ingredients:");
    for ingredient in &snapshot.ingredients {
        println!("  - {}", describe_ingredient(ingredient));
    }
    println!();
    println!("Instructions:");
    print_instructions(&snapshot.instructions);
    Ok(())
}

async fn cmd_history(db: &Database, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let store = VersionStore::new(db.pool().clone());
    let recipe_id = resolve_recipe_id(&store, id).await?;

    let recipe = store.get(recipe_id).await?;
    let history = store.get_history(recipe_id).await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    let current_title = history
        .last()
        .map(|v| v.title.as_str())
        .unwrap_or("(unknown)");
    println!("History for '{}':", current_title);
    for version in &history {
        let marker = if version.version == recipe.current_version {
            "*"
        } else {
            " "
        };
        println!(
            "{} v{}  {}  {}",
            marker,
            version.version,
            version.created_at.format("%Y-%m-%d %H:%M"),
            version.title
        );
    }
    Ok(())
}

async fn cmd_restore(db: &Database, id: &str, version: i64, quiet: bool) -> anyhow::Result<()> {
    let store = VersionStore::new(db.pool().clone());
    let recipe_id = resolve_recipe_id(&store, id).await?;
    let restored = store.restore(recipe_id, version).await?;

    if !quiet {
        println!(
            "Version {} content brought back as version {}.",
            version, restored.version
        );
        println!("Run `larder history {}` to see the full chain.", recipe_id);
    }
    Ok(())
}

async fn cmd_duplicate(
    db: &Database,
    id: &str,
    new_title: &str,
    quiet: bool,
) -> anyhow::Result<()> {
    let store = VersionStore::new(db.pool().clone());
    let graph = HeritageGraph::new(db.pool().clone());
    let recipe_id = resolve_recipe_id(&store, id).await?;
    let copy = graph.duplicate(recipe_id, new_title).await?;

    if !quiet {
        println!("Recipe duplicated successfully!");
        println!("  ID: {}", copy.id);
        println!("  Title: {}", new_title);
        println!("  Parent: {}", recipe_id);
    }
    Ok(())
}

async fn cmd_heritage(db: &Database, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let store = VersionStore::new(db.pool().clone());
    let graph = HeritageGraph::new(db.pool().clone());
    let recipe_id = resolve_recipe_id(&store, id).await?;
    let heritage = graph.get_heritage(recipe_id).await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&heritage)?);
        return Ok(());
    }

    // Titles live on versions, so look them up in one pass
    let summaries = store.list_summaries(true).await?;
    let titles: HashMap<Uuid, String> = summaries.into_iter().map(|s| (s.id, s.title)).collect();
    let title_of = |recipe: &Recipe| -> String {
        titles
            .get(&recipe.id)
            .cloned()
            .unwrap_or_else(|| recipe.id.to_string())
    };

    println!("Heritage for '{}':", title_of(&heritage.recipe));
    match &heritage.parent {
        Some(parent) => {
            let marker = if parent.is_archived() {
                " [archived]"
            } else {
                ""
            };
            println!("  Parent: {}{} ({})", title_of(parent), marker, parent.id);
        }
        None => println!("  Parent: none"),
    }
    if heritage.ancestors.len() > 1 {
        println!("  Ancestors (nearest first):");
        for (i, ancestor) in heritage.ancestors.iter().enumerate() {
            println!("    {}. {} ({})", i + 1, title_of(ancestor), ancestor.id);
        }
    }
    if heritage.children.is_empty() {
        println!("  Children: none");
    } else {
        println!("  Children:");
        for child in &heritage.children {
            let marker = if child.is_archived() {
                " [archived]"
            } else {
                ""
            };
            println!("    - {}{} ({})", title_of(child), marker, child.id);
        }
    }
    Ok(())
}

async fn cmd_archive(db: &Database, id: &str, quiet: bool) -> anyhow::Result<()> {
    let store = VersionStore::new(db.pool().clone());
    let graph = HeritageGraph::new(db.pool().clone());
    let recipe_id = resolve_recipe_id(&store, id).await?;
    graph.archive(recipe_id).await?;

    if !quiet {
        println!("Recipe '{}' archived.", recipe_id);
        println!("History and lineage stay intact. Run `larder list --all` to see it.");
    }
    Ok(())
}

async fn cmd_list(
    db: &Database,
    all: bool,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let store = VersionStore::new(db.pool().clone());
    let summaries = store.list_summaries(all).await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        if !quiet {
            println!("No recipes found.");
            println!("\nCreate one with: larder new <draft.json>");
        }
        return Ok(());
    }

    if !quiet {
        println!("Recipes:");
    }
    for summary in summaries {
        let mut tags = String::new();
        if summary.parent_recipe_id.is_some() {
            tags.push_str(" [copy]");
        }
        if summary.archived_at.is_some() {
            tags.push_str(" [archived]");
        }
        println!(
            "  {}  {} (v{}){}",
            summary.id, summary.title, summary.current_version, tags
        );
    }
    Ok(())
}

async fn cmd_cook(
    db: &Database,
    action: CookAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let store = VersionStore::new(db.pool().clone());
    let manager = InstanceManager::new(db.pool().clone());

    match action {
        CookAction::Start {
            recipe_id,
            scale,
            units,
            servings,
            note,
            modifications,
        } => {
            let config = Config::load()?;
            let recipe_id = resolve_recipe_id(&store, &recipe_id).await?;

            let unit_system = match units.as_deref() {
                Some(s) => UnitSystem::from_str(s).ok_or_else(|| {
                    anyhow::anyhow!("Unknown unit system '{}'. Use 'us' or 'metric'.", s)
                })?,
                None => config.default_unit_system(),
            };
            let scale_factor = scale.unwrap_or(config.kitchen.default_scale);

            let mut draft = InstanceDraft::new()
                .with_scale(scale_factor)
                .with_unit_system(unit_system);
            if let Some(servings) = servings {
                draft = draft.with_servings(servings);
            }
            if let Some(note) = note {
                draft = draft.with_notes(note);
            }
            if !modifications.is_empty() {
                let frozen = store.get_current(recipe_id).await?;
                for raw in &modifications {
                    draft = draft.with_modification(parse_modification(raw, &frozen)?);
                }
            }

            let instance = manager.create(recipe_id, &draft).await?;
            if !quiet {
                println!("Cooking instance recorded!");
                println!("  ID: {}", instance.id);
                println!("  Version: {} (frozen)", instance.recipe_version);
                println!("  Scale: {}", instance.scale_factor);
                println!("  Units: {}", instance.unit_system);
                println!("  Servings: {}", instance.servings);
                println!("\nReplay it any time with: larder cook show {}", instance.id);
            }
        }

        CookAction::Show { instance_id } => {
            let instance_id = parse_instance_id(&instance_id)?;
            let exact = manager.reconstruct(instance_id).await?;

            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&exact)?);
                return Ok(());
            }

            println!(
                "{} (version {}, scale {}, {} units)",
                exact.title, exact.recipe_version, exact.scale_factor, exact.unit_system
            );
            println!("  Servings: {}", exact.servings);
            println!();
            println!("Ingredients as cooked:");
            for ingredient in &exact.ingredients {
                println!("  - {}", describe_ingredient(ingredient));
            }
            println!();
            println!("Instructions:");
            print_instructions(&exact.instructions);
        }

        CookAction::List { recipe_id } => {
            let recipe_id = resolve_recipe_id(&store, &recipe_id).await?;
            let instances = manager.list_for_recipe(recipe_id).await?;

            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&instances)?);
                return Ok(());
            }

            if instances.is_empty() {
                if !quiet {
                    println!("No recorded cooks for this recipe.");
                    println!("\nRecord one with: larder cook start {}", recipe_id);
                }
            } else {
                if !quiet {
                    println!("Recorded cooks (newest first):");
                }
                for instance in instances {
                    let mut extras = String::new();
                    if !instance.modifications.is_empty() {
                        extras.push_str(&format!(", {} modified", instance.modifications.len()));
                    }
                    if !instance.photo_ids.is_empty() {
                        extras.push_str(&format!(", {} photos", instance.photo_ids.len()));
                    }
                    println!(
                        "  {}  {}  v{}, x{}, {}{}",
                        instance.id,
                        instance.created_at.format("%Y-%m-%d %H:%M"),
                        instance.recipe_version,
                        instance.scale_factor,
                        instance.unit_system,
                        extras
                    );
                }
            }
        }

        CookAction::Link {
            instance_id,
            session_id,
        } => {
            let instance_id = parse_instance_id(&instance_id)?;
            manager.link(instance_id, &session_id).await?;
            if !quiet {
                println!("Instance linked to cook session '{}'.", session_id);
            }
        }

        CookAction::Photo {
            instance_id,
            photo_id,
        } => {
            let instance_id = parse_instance_id(&instance_id)?;
            manager.add_photo(instance_id, &photo_id).await?;
            if !quiet {
                println!("Photo '{}' attached.", photo_id);
            }
        }
    }
    Ok(())
}

fn cmd_convert(quantity: f64, from: &str, to: &str) -> anyhow::Result<()> {
    let from_unit = parse_unit(from)?;
    let to_unit = parse_unit(to)?;

    match convert(quantity, from_unit, to_unit) {
        Some(result) => {
            let practical = round_to_practical(result, to_unit);
            println!(
                "{} {} = {} {}",
                format_quantity(quantity),
                from_unit,
                format_quantity(practical),
                to_unit
            );
            Ok(())
        }
        None => Err(anyhow::anyhow!(
            "Cannot convert {} to {}. Units must share a category, and count or imprecise units never convert.",
            from_unit,
            to_unit
        )),
    }
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("Larder Health Check");
        println!("===================");
        println!();
    }

    let mut all_ok = true;

    // Check configuration
    match Config::load() {
        Ok(_) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
            }
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Configuration: Error - {}", e);
            }
        }
    }

    // Check config file location
    if !quiet {
        match Config::config_path() {
            Ok(path) => {
                if path.exists() {
                    println!("[OK] Config file: {}", path.display());
                } else {
                    println!("[--] Config file: {} (using defaults)", path.display());
                }
            }
            Err(e) => {
                println!("[!!] Config file: Error - {}", e);
            }
        }
    }

    // Check database
    match open_database().await {
        Ok(db) => match db.health_check().await {
            Ok(()) => {
                if !quiet {
                    println!("[OK] Database: Connected");
                    println!("     Path: {}", db.path().display());
                }

                match db.migration_status().await {
                    Ok(status) => {
                        if status.needs_migration {
                            all_ok = false;
                            if !quiet {
                                warn!("Database migrations pending");
                                println!(
                                    "[!!] Database: Migrations pending (v{} -> v{})",
                                    status.current_version, status.target_version
                                );
                            }
                        } else if !quiet {
                            println!("[OK] Database: Schema v{}", status.current_version);
                        }
                    }
                    Err(e) => {
                        all_ok = false;
                        if !quiet {
                            println!("[!!] Database: Migration check failed - {}", e);
                        }
                    }
                }

                if !quiet {
                    let recipes = RecipeRepository::new(db.pool().clone());
                    let instances = InstanceRepository::new(db.pool().clone());
                    println!(
                        "     Recipes: {}",
                        recipes.count_recipes().await.unwrap_or(0)
                    );
                    println!(
                        "     Versions: {}",
                        recipes.count_versions().await.unwrap_or(0)
                    );
                    println!(
                        "     Recorded cooks: {}",
                        instances.count_instances().await.unwrap_or(0)
                    );
                }
            }
            Err(e) => {
                all_ok = false;
                if !quiet {
                    println!("[!!] Database: Health check failed - {}", e);
                }
            }
        },
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Database: Failed to open - {}", e);
            }
        }
    }

    // Summary
    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed!");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Open the database at the configured path
async fn open_database() -> anyhow::Result<Database> {
    let config = Config::load()?;
    let path = config
        .database
        .path
        .clone()
        .unwrap_or_else(default_database_path);
    let db_config =
        DatabaseConfig::with_path(path).max_connections(config.database.max_connections);
    Database::new(db_config).await
}

/// Read a recipe draft from a JSON file
fn read_draft(path: &Path) -> anyhow::Result<RecipeDraft> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft file: {}", path.display()))?;
    let draft: RecipeDraft = serde_json::from_str(&text)
        .with_context(|| format!("Draft file is not valid JSON: {}", path.display()))?;
    Ok(draft)
}

/// Resolve a recipe id argument, accepting a full id or a unique prefix
async fn resolve_recipe_id(store: &VersionStore, id: &str) -> anyhow::Result<Uuid> {
    if let Ok(parsed) = Uuid::parse_str(id) {
        return Ok(parsed);
    }

    let summaries = store.list_summaries(true).await?;
    let matches: Vec<Uuid> = summaries
        .iter()
        .map(|s| s.id)
        .filter(|candidate| candidate.to_string().starts_with(id))
        .collect();

    match matches[..] {
        [single] => Ok(single),
        [] => Err(anyhow::anyhow!(
            "Recipe '{}' not found. Run `larder list --all` to see all recipes.",
            id
        )),
        _ => Err(anyhow::anyhow!(
            "Recipe id '{}' matches {} recipes. Use more characters.",
            id,
            matches.len()
        )),
    }
}

fn parse_instance_id(id: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| {
        anyhow::anyhow!(
            "'{}' is not a valid instance id. Run `larder cook list <recipe-id>` to see recorded cooks.",
            id
        )
    })
}

fn parse_unit(s: &str) -> anyhow::Result<Unit> {
    Unit::from_str(s).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown unit '{}'. Valid units: {}",
            s,
            Unit::ALL.map(|u| u.as_str()).join(", ")
        )
    })
}

/// Parse an INDEX=QUANTITY ingredient override against a frozen version
fn parse_modification(
    raw: &str,
    frozen: &RecipeVersion,
) -> anyhow::Result<IngredientModification> {
    let (index_part, quantity_part) = raw.split_once('=').ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid --modify '{}'. Use INDEX=QUANTITY, e.g. --modify 0=2.75",
            raw
        )
    })?;
    let index: usize = index_part
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid ingredient index '{}'", index_part))?;
    let quantity: f64 = quantity_part
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid quantity '{}'", quantity_part))?;
    let original = frozen.ingredients.get(index).ok_or_else(|| {
        anyhow::anyhow!(
            "Ingredient index {} is out of range ({} ingredients)",
            index,
            frozen.ingredients.len()
        )
    })?;
    Ok(IngredientModification::new(
        index,
        original.quantity,
        quantity,
    ))
}

fn describe_ingredient(ingredient: &Ingredient) -> String {
    let mut line = format!(
        "{} {} {}",
        format_quantity(ingredient.quantity),
        ingredient.unit,
        ingredient.name
    );
    if let Some(notes) = &ingredient.notes {
        line.push_str(&format!(" ({})", notes));
    }
    line
}

fn print_instructions(instructions: &[Instruction]) {
    for instruction in instructions {
        match instruction.duration_mins {
            Some(mins) => println!("  {}. {} ({} min)", instruction.step, instruction.text, mins),
            None => println!("  {}. {}", instruction.step, instruction.text),
        }
    }
}
