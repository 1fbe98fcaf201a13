use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use colored::*;
use std::env;
use tabled::{settings::Style, Table, Tabled};

use histree::config::Config;
use histree::executor;
use histree::history::{Entry, EntryFilter};
use histree::session;
use histree::shell::ShellType;
use histree::storage::Store;
use histree::tree;

#[derive(Parser)]
#[command(
    name = "histree",
    version,
    about = "Shell history, recorded per directory and browsed as a tree",
    long_about = "histree records the commands you run, tagged with the directory they ran in,\n\
                  and shows them back as a directory tree. Source the output of\n\
                  'histree hook init <shell>' from your rc file to enable recording."
)]
struct Cli {
    /// Show only the subtree rooted at this path
    path: Option<String>,

    /// Maximum number of commands to show per directory (0 = show all)
    #[arg(short = 'n', long = "number")]
    number: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List recorded command history
    List {
        /// Limit number of entries to show (0 = all)
        #[arg(short = 'n', long, default_value_t = 50)]
        limit: usize,
        /// Only entries from this session
        #[arg(long)]
        session: Option<String>,
        /// Only entries recorded in this directory
        #[arg(long)]
        dir: Option<String>,
    },
    /// Manage shell sessions
    #[command(subcommand, visible_alias = "s")]
    Session(SessionCommands),
    /// Manage directory-based history
    #[command(subcommand, visible_alias = "d")]
    Dir(DirCommands),
    /// Re-execute a command from history
    Rerun {
        /// History entry id (see 'histree list')
        id: u64,
    },
    /// Shell integration hooks
    #[command(subcommand)]
    Hook(HookCommands),
}

#[derive(Subcommand)]
enum SessionCommands {
    /// List all sessions
    List,
    /// Show history for a session (defaults to the current one)
    Show { id: Option<String> },
}

#[derive(Subcommand)]
enum DirCommands {
    /// List directories with history
    List,
    /// Show history for a directory, by path or by id from 'dir list'
    Show { dir: Option<String> },
}

#[derive(Subcommand)]
enum HookCommands {
    /// Record a command to history (called by the shell hook)
    Record {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Print the shell integration snippet (shell defaults to $SHELL)
    Init {
        #[arg(value_enum)]
        shell: Option<ShellType>,
    },
    /// Mint and print a fresh session id
    SessionInit,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{}: {:#}", "Error".red().bold(), err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default()?;
    if !config.display.color_output {
        colored::control::set_override(false);
    }
    let store = Store::open(config.data_dir()?)?;

    match cli.command {
        None => {
            let limit = cli.number.unwrap_or(config.display.max_commands);
            show_tree(&store, cli.path.as_deref().unwrap_or(""), limit)
        }
        Some(Commands::List {
            limit,
            session,
            dir,
        }) => list_entries(&store, limit, session, dir),
        Some(Commands::Session(cmd)) => match cmd {
            SessionCommands::List => list_sessions(&store),
            SessionCommands::Show { id } => show_session(&store, id),
        },
        Some(Commands::Dir(cmd)) => match cmd {
            DirCommands::List => list_directories(&store),
            DirCommands::Show { dir } => show_directory(&store, dir),
        },
        Some(Commands::Rerun { id }) => rerun(&store, id),
        Some(Commands::Hook(cmd)) => match cmd {
            HookCommands::Record { command } => record(&store, command),
            HookCommands::Init { shell } => {
                let shell = shell.unwrap_or_else(ShellType::detect);
                print!("{}", shell.hook_script());
                Ok(())
            }
            HookCommands::SessionInit => {
                let id = session::initialize_session(store.base_path())?;
                print!("{}", id);
                Ok(())
            }
        },
    }
}

fn show_tree(store: &Store, target_path: &str, limit: usize) -> Result<()> {
    let entries = store.load(&EntryFilter::default())?;
    if entries.is_empty() {
        println!("No command history found.");
        println!(
            "Run some commands to see them here, or run 'histree hook init <shell>' to enable history tracking."
        );
        return Ok(());
    }

    let root = tree::build_tree(&entries, limit);
    print!("{}", tree::render::render(&root, target_path, limit));
    Ok(())
}

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "TIME")]
    time: String,
    #[tabled(rename = "DIRECTORY")]
    directory: String,
    #[tabled(rename = "SESSION")]
    session: String,
    #[tabled(rename = "COMMAND")]
    command: String,
}

fn list_entries(
    store: &Store,
    limit: usize,
    session: Option<String>,
    dir: Option<String>,
) -> Result<()> {
    let filter = EntryFilter {
        session_id: session,
        cwd: dir.map(|d| resolve_directory_path(&d)).transpose()?,
        limit,
    };
    let entries = store.load(&filter)?;
    if entries.is_empty() {
        println!("No history found.");
        return Ok(());
    }

    let rows: Vec<ListRow> = entries
        .iter()
        .map(|entry| ListRow {
            id: entry.id,
            time: format_time(entry),
            directory: short_path(&entry.cwd),
            session: short_session_id(&entry.session_id),
            command: entry.command.clone(),
        })
        .collect();
    print_table(rows);
    Ok(())
}

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "SESSION_ID")]
    session_id: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

fn list_sessions(store: &Store) -> Result<()> {
    let sessions = store.list_sessions()?;
    if sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    let current = session::current_session_id();
    let rows: Vec<SessionRow> = sessions
        .into_iter()
        .map(|id| SessionRow {
            status: if id == current {
                "(current)".to_string()
            } else {
                String::new()
            },
            session_id: id,
        })
        .collect();
    print_table(rows);
    Ok(())
}

#[derive(Tabled)]
struct SessionEntryRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "TIME")]
    time: String,
    #[tabled(rename = "DIRECTORY")]
    directory: String,
    #[tabled(rename = "COMMAND")]
    command: String,
}

fn show_session(store: &Store, id: Option<String>) -> Result<()> {
    let session_id = match id.as_deref() {
        Some("current") | None => session::current_session_id(),
        Some(other) => other.to_string(),
    };

    let filter = EntryFilter {
        session_id: Some(session_id.clone()),
        ..Default::default()
    };
    let entries = store.load(&filter)?;
    if entries.is_empty() {
        println!("No history found for session: {}", session_id);
        return Ok(());
    }

    let rows: Vec<SessionEntryRow> = entries
        .iter()
        .map(|entry| SessionEntryRow {
            id: entry.id,
            time: format_time(entry),
            directory: short_path(&entry.cwd),
            command: entry.command.clone(),
        })
        .collect();
    print_table(rows);
    Ok(())
}

#[derive(Tabled)]
struct DirRow {
    #[tabled(rename = "ID")]
    id: usize,
    #[tabled(rename = "DIRECTORY")]
    directory: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

fn list_directories(store: &Store) -> Result<()> {
    let directories = store.list_directories()?;
    if directories.is_empty() {
        println!("No directories with history found.");
        return Ok(());
    }

    let current = env::current_dir()
        .map(|d| d.to_string_lossy().into_owned())
        .unwrap_or_default();
    let rows: Vec<DirRow> = directories
        .into_iter()
        .enumerate()
        .map(|(i, dir)| DirRow {
            id: i,
            status: if dir == current {
                "(current)".to_string()
            } else {
                String::new()
            },
            directory: short_path(&dir),
        })
        .collect();
    print_table(rows);
    Ok(())
}

#[derive(Tabled)]
struct DirEntryRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "TIME")]
    time: String,
    #[tabled(rename = "SESSION")]
    session: String,
    #[tabled(rename = "COMMAND")]
    command: String,
}

fn show_directory(store: &Store, dir: Option<String>) -> Result<()> {
    let dir = match dir {
        Some(arg) => {
            // A numeric argument is an index into 'dir list' order.
            if let Ok(index) = arg.parse::<usize>() {
                let directories = store.list_directories()?;
                directories.into_iter().nth(index).with_context(|| {
                    format!(
                        "invalid directory id: {}. Use 'histree dir list' to see available ids",
                        index
                    )
                })?
            } else {
                resolve_directory_path(&arg)?
            }
        }
        None => {
            let cwd = env::current_dir().context("failed to get current directory")?;
            tree::clean_path(&cwd.to_string_lossy())
        }
    };

    let filter = EntryFilter {
        cwd: Some(dir.clone()),
        ..Default::default()
    };
    let entries = store.load(&filter)?;
    if entries.is_empty() {
        println!("No history found for directory: {}", dir);
        return Ok(());
    }

    let rows: Vec<DirEntryRow> = entries
        .iter()
        .map(|entry| DirEntryRow {
            id: entry.id,
            time: format_time(entry),
            session: short_session_id(&entry.session_id),
            command: entry.command.clone(),
        })
        .collect();
    print_table(rows);
    Ok(())
}

fn rerun(store: &Store, id: u64) -> Result<()> {
    let entry = store.get_by_id(id)?;
    println!(
        "{} {} {}",
        "Rerunning".green().bold(),
        entry.command,
        format!("(in {})", entry.cwd).dimmed()
    );

    let status = executor::execute_in_dir(&entry.cwd, &entry.command)?;
    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}

fn record(store: &Store, command: Vec<String>) -> Result<()> {
    let command = command.join(" ");
    let command = command.trim();

    // Directory changes are what the tree already shows; recording them
    // would only add noise.
    if command.is_empty() || command.starts_with("cd") {
        return Ok(());
    }

    let cwd = env::current_dir().context("failed to get current directory")?;
    // Normalize at write time so every later read groups on the same key.
    let cwd = tree::clean_path(&cwd.to_string_lossy());

    let mut entry = Entry::new(session::current_session_id(), cwd, command.to_string());
    store.save(&mut entry)?;
    Ok(())
}

/// Resolve a user-supplied directory argument against the cwd and normalize.
fn resolve_directory_path(arg: &str) -> Result<String> {
    if arg.starts_with('/') {
        return Ok(tree::clean_path(arg));
    }
    let cwd = env::current_dir().context("failed to get current directory")?;
    Ok(tree::clean_path(&format!(
        "{}/{}",
        cwd.to_string_lossy(),
        arg
    )))
}

fn print_table<R: Tabled>(rows: Vec<R>) {
    println!("{}", Table::new(rows).with(Style::blank()));
}

fn format_time(entry: &Entry) -> String {
    entry
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M:%S")
        .to_string()
}

/// Shorten a path for table display: home becomes `~`, and anything still
/// longer than 30 chars keeps only its tail.
fn short_path(path: &str) -> String {
    let path = match dirs::home_dir() {
        Some(home) => {
            let home = home.to_string_lossy().into_owned();
            match path.strip_prefix(home.as_str()) {
                Some(rest) if !rest.is_empty() => format!("~{}", rest),
                _ => path.to_string(),
            }
        }
        None => path.to_string(),
    };

    let chars: Vec<char> = path.chars().collect();
    if chars.len() > 30 {
        format!("...{}", chars[chars.len() - 27..].iter().collect::<String>())
    } else {
        path
    }
}

/// Elide the middle of long session ids.
fn short_session_id(session_id: &str) -> String {
    let chars: Vec<char> = session_id.chars().collect();
    if chars.len() > 20 {
        format!(
            "{}...{}",
            chars[..8].iter().collect::<String>(),
            chars[chars.len() - 8..].iter().collect::<String>()
        )
    } else {
        session_id.to_string()
    }
}
