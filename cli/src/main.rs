use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use bookshelf_config::{ExportFormat, LibraryConfig, render_export};
use bookshelf_core::{BookDraft, CatalogExport, SearchField, Session};
use bookshelf_sqlite::{Migration, Store};
use clap::{Args, Parser, Subcommand};
use rusqlite::{Connection, OpenFlags};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod console;
mod render;

/// Config file read when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "bookshelf.yaml";

/// CLI-specific search field enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliSearchField {
    Title,
    Author,
}

impl From<CliSearchField> for SearchField {
    fn from(field: CliSearchField) -> Self {
        match field {
            CliSearchField::Title => Self::Title,
            CliSearchField::Author => Self::Author,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "bookshelf")]
#[command(version, about = "Personal book catalog manager")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Path to the YAML config file (ignored if missing).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Database file path; overrides the config file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Log in as this user and scope every command to their books.
    #[arg(long, global = true)]
    user: Option<String>,
    /// Password for --user.
    #[arg(long, global = true, env = "BOOKSHELF_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a book to the catalog.
    Add(AddArgs),
    /// Remove every book with exactly this title.
    Remove(RemoveArgs),
    /// Search books by title or author (case-insensitive substring).
    Search(SearchArgs),
    /// List all books.
    List,
    /// Show the total and the percentage read.
    Stats,
    /// Register the account given by --user and --password.
    Register,
    /// Export books as CSV, JSON or YAML.
    Export(ExportArgs),
    /// Database schema operations.
    Migrate(MigrateArgs),
    /// Interactive numbered menu.
    Menu,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Book title.
    #[arg(long)]
    title: String,
    /// Author name.
    #[arg(long)]
    author: String,
    /// Publication year.
    #[arg(long, allow_negative_numbers = true)]
    year: i32,
    /// Genre.
    #[arg(long)]
    genre: String,
    /// Mark the book as read.
    #[arg(long)]
    read: bool,
    /// Rating from 1 to 5.
    #[arg(long)]
    rating: Option<u8>,
    /// Free-text review.
    #[arg(long)]
    review: Option<String>,
    /// Image file stored as the cover.
    #[arg(long)]
    cover: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RemoveArgs {
    /// Exact, case-sensitive title.
    #[arg(long)]
    title: String,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Field to match against.
    #[arg(long, default_value = "title")]
    by: CliSearchField,
    /// Text to look for.
    term: String,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Output format: csv, json or yaml.
    #[arg(long, default_value = "json")]
    format: ExportFormat,
    /// Write to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct MigrateArgs {
    #[command(subcommand)]
    operation: MigrateOperation,
}

#[derive(Debug, Subcommand)]
enum MigrateOperation {
    /// Apply pending migrations.
    Up,
    /// Drop all catalog tables.
    Down,
    /// Show migration and table status.
    Status,
}

fn main() {
    let cli = Cli::parse();

    let result = load_config(&cli.global).and_then(|config| {
        init_logging(&config.log_filter);
        match cli.command {
            Command::Add(args) => run_add(&cli.global, &config, args),
            Command::Remove(args) => run_remove(&cli.global, &config, args),
            Command::Search(args) => run_search(&cli.global, &config, args),
            Command::List => run_list(&cli.global, &config),
            Command::Stats => run_stats(&cli.global, &config),
            Command::Register => run_register(&cli.global, &config),
            Command::Export(args) => run_export(&cli.global, &config, args),
            Command::Migrate(args) => run_migrate(&config, args),
            Command::Menu => run_menu(&cli.global, &config),
        }
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Loads the config file and applies command-line overrides.
fn load_config(global: &GlobalArgs) -> Result<LibraryConfig, String> {
    let mut config = LibraryConfig::load_or_default(&global.config).map_err(|e| {
        format!("Failed to load config '{}': {e}", global.config.display())
    })?;
    if let Some(db) = &global.db {
        config.database = db.clone();
    }
    Ok(config)
}

/// Sends `tracing` output to stderr. `RUST_LOG` wins over the config file.
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(bookshelf_config::DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn open_store(config: &LibraryConfig) -> Result<Store, String> {
    let store = Store::open(&config.database).map_err(|e| {
        format!("Failed to open database '{}': {e}", config.database.display())
    })?;
    Ok(store.with_year_policy(config.year_policy))
}

/// Logs in with --user/--password, or runs unscoped in single-user mode.
fn resolve_session(
    store: &Store,
    global: &GlobalArgs,
    config: &LibraryConfig,
) -> Result<Session, String> {
    let Some(username) = global.user.as_deref() else {
        if config.multi_user {
            return Err("this catalog is multi-user: log in with --user and --password".to_string());
        }
        return Ok(Session::anonymous());
    };

    let password = global
        .password
        .as_deref()
        .ok_or("--password (or BOOKSHELF_PASSWORD) is required with --user")?;

    let user_id = store
        .credentials()
        .authenticate(username, password)
        .map_err(|e| e.to_string())?
        .ok_or("Invalid username or password.")?;

    debug!(user_id = user_id.0, "logged in");
    Ok(Session::for_user(user_id))
}

fn run_add(global: &GlobalArgs, config: &LibraryConfig, args: AddArgs) -> Result<(), String> {
    let store = open_store(config)?;
    let session = resolve_session(&store, global, config)?;

    let mut draft = BookDraft::new(args.title, args.author, args.year, args.genre).read(args.read);
    if let Some(rating) = args.rating {
        draft = draft.with_rating(rating);
    }
    if let Some(review) = args.review {
        draft = draft.with_review(review);
    }
    if let Some(cover) = &args.cover {
        let bytes = fs::read(cover)
            .map_err(|e| format!("Failed to read cover '{}': {e}", cover.display()))?;
        draft = draft.with_cover(bytes);
    }

    let id = store
        .catalog()
        .add(&draft, session.user_id())
        .map_err(|e| e.to_string())?;
    println!("Added '{}' (id {id}).", draft.title);
    Ok(())
}

fn run_remove(global: &GlobalArgs, config: &LibraryConfig, args: RemoveArgs) -> Result<(), String> {
    let store = open_store(config)?;
    let session = resolve_session(&store, global, config)?;

    let removed = store
        .catalog()
        .remove_by_title(&args.title, session.user_id())
        .map_err(|e| e.to_string())?;
    println!("Removed {removed} book(s) titled '{}'.", args.title);
    Ok(())
}

fn run_search(global: &GlobalArgs, config: &LibraryConfig, args: SearchArgs) -> Result<(), String> {
    let store = open_store(config)?;
    let session = resolve_session(&store, global, config)?;

    let books = store
        .catalog()
        .search(args.by.into(), &args.term, session.user_id())
        .map_err(|e| e.to_string())?;
    if books.is_empty() {
        println!("{}", render::NO_MATCHES);
    } else {
        print!("{}", render::book_listing(&books));
    }
    Ok(())
}

fn run_list(global: &GlobalArgs, config: &LibraryConfig) -> Result<(), String> {
    let store = open_store(config)?;
    let session = resolve_session(&store, global, config)?;

    let books = store
        .catalog()
        .list_all(session.user_id())
        .map_err(|e| e.to_string())?;
    if books.is_empty() {
        println!("{}", render::EMPTY_LIBRARY);
    } else {
        print!("{}", render::book_listing(&books));
    }
    Ok(())
}

fn run_stats(global: &GlobalArgs, config: &LibraryConfig) -> Result<(), String> {
    let store = open_store(config)?;
    let session = resolve_session(&store, global, config)?;

    let stats = store
        .catalog()
        .statistics(session.user_id())
        .map_err(|e| e.to_string())?;
    print!("{}", render::stats_summary(&stats));
    Ok(())
}

fn run_register(global: &GlobalArgs, config: &LibraryConfig) -> Result<(), String> {
    let username = global
        .user
        .as_deref()
        .ok_or("register needs --user and --password")?;
    let password = global
        .password
        .as_deref()
        .ok_or("register needs --user and --password")?;

    let store = open_store(config)?;
    let user_id = store
        .credentials()
        .register(username, password)
        .map_err(|e| e.to_string())?;
    println!("Registered '{username}' as user {user_id}. Log in with --user {username}.");
    Ok(())
}

fn run_export(global: &GlobalArgs, config: &LibraryConfig, args: ExportArgs) -> Result<(), String> {
    let store = open_store(config)?;
    let session = resolve_session(&store, global, config)?;

    let books = store
        .catalog()
        .list_all(session.user_id())
        .map_err(|e| e.to_string())?;
    let export = CatalogExport::with_books(chrono::Utc::now().to_rfc3339(), session.user_id(), books);
    let raw = render_export(&export, args.format)
        .map_err(|e| format!("Failed to render export: {e}"))?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|err| {
                        format!(
                            "Failed to create output directory '{}': {err}",
                            parent.display()
                        )
                    })?;
                }
            }
            fs::write(path, raw)
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
            println!(
                "Exported {} book(s) to '{}'.",
                export.book_count(),
                path.display()
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(raw.as_bytes())
                .map_err(|e| format!("Failed to write export: {e}"))?;
        }
    }
    Ok(())
}

fn run_menu(global: &GlobalArgs, config: &LibraryConfig) -> Result<(), String> {
    let store = open_store(config)?;
    let session = resolve_session(&store, global, config)?;

    let stdin = io::stdin();
    console::run(&store, session, stdin.lock(), io::stdout())
        .map_err(|e| format!("Console I/O failed: {e}"))
}

fn run_migrate(config: &LibraryConfig, args: MigrateArgs) -> Result<(), String> {
    // Only `up` may create the file; inspecting or dropping a missing
    // database must leave the filesystem alone.
    let flags = match args.operation {
        MigrateOperation::Up => OpenFlags::default(),
        MigrateOperation::Down | MigrateOperation::Status => {
            if !config.database.exists() {
                println!(
                    "No database at '{}'. Run `bookshelf migrate up` to create it.",
                    config.database.display()
                );
                return Ok(());
            }
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX
        }
    };
    let conn = Connection::open_with_flags(&config.database, flags).map_err(|e| {
        format!("Failed to open database '{}': {e}", config.database.display())
    })?;
    let mut migration =
        Migration::new(conn).map_err(|e| format!("Failed to initialize migration: {e}"))?;

    match args.operation {
        MigrateOperation::Up => {
            let applied = migration
                .up()
                .map_err(|e| format!("Migration up failed: {e}"))?;
            if applied.is_empty() {
                println!("Schema already up to date in '{}'.", config.database.display());
            } else {
                println!("Applied {} migration(s):", applied.len());
                for name in applied {
                    println!("  {name}");
                }
            }
        }
        MigrateOperation::Down => {
            migration
                .down()
                .map_err(|e| format!("Migration down failed: {e}"))?;
            println!(
                "Migration down complete. Tables dropped from '{}'.",
                config.database.display()
            );
        }
        MigrateOperation::Status => {
            let status = migration
                .status()
                .map_err(|e| format!("Failed to get migration status: {e}"))?;
            println!("Migration Status:");
            println!(
                "  Tables exist: {}",
                if status.tables_exist { "yes" } else { "no" }
            );
            println!("  Applied: {}", status.applied.len());
            println!("  Pending: {}", status.pending.len());
            for name in &status.pending {
                println!("    {name}");
            }
            println!("  Book count: {}", status.book_count);
            println!("  User count: {}", status.user_count);
        }
    }
    Ok(())
}
