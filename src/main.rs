use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;

use lexdesk_lib::config::Config;
use lexdesk_lib::export::{self, Format, StatusFilter};
use lexdesk_lib::repo::Repository;
use lexdesk_lib::store::SqliteStore;
use lexdesk_lib::{db, import, logging, migrate, Identity, Session};

#[derive(Debug, Parser)]
#[command(name = "lexdesk", about = "Legal case back office: CSV import and export", version)]
struct Cli {
    /// SQLite database file. Defaults to LEXDESK_DB, then the user data directory.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// User the command acts on behalf of.
    #[arg(long, global = true, value_name = "ID")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import process actions from a CSV sheet in one batch.
    ImportActions {
        /// Process the actions belong to.
        #[arg(long, value_name = "ID")]
        process: String,
        file: PathBuf,
    },
    /// Write a blank import sheet.
    #[command(subcommand)]
    Template(TemplateCommand),
    /// Export tasks, hearings or terms of every process as CSV.
    Export {
        format: Format,
        /// `all` or one of pending, in_progress, completed.
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,
    },
    /// Database maintenance commands.
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum TemplateCommand {
    /// Header-only sheet for `import-actions`.
    Actions {
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply pending schema migrations.
    Migrate,
    /// List applied and pending migrations.
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }

    let guard = match logging::init(&config) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    };

    let code = match run(cli, &config).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            1
        }
    };
    drop(guard);
    process::exit(code);
}

async fn run(cli: Cli, config: &Config) -> Result<i32> {
    let session = session_for(cli.user);
    match cli.command {
        Commands::ImportActions { process, file } => {
            let store = open_store(&config.db_path).await?;
            let outcome = import::import_actions_file(&store, &session, &process, &file).await;
            store.pool().close().await;
            let outcome = outcome.map_err(lexdesk_lib::AppError::from)?;
            println!(
                "Imported {} actions into process {}",
                outcome.inserted, outcome.process_id
            );
            Ok(0)
        }
        Commands::Template(TemplateCommand::Actions { out }) => {
            let path = export::action_template().write_to(&out)?;
            println!("{}", path.display());
            Ok(0)
        }
        Commands::Export {
            format,
            status,
            out,
        } => {
            let store = open_store(&config.db_path).await?;
            let items = Repository::new(&store, &session)
                .list_formats(format.kind())
                .await;
            store.pool().close().await;
            let file = export::export_format(format, &items?, status);
            let path = file.write_to(&out)?;
            println!("{}", path.display());
            Ok(0)
        }
        Commands::Db(DbCommand::Migrate) => {
            let pool = db::open_sqlite_pool(&config.db_path).await?;
            let applied = migrate::apply_migrations(&pool).await;
            pool.close().await;
            let applied = applied.context("apply migrations")?;
            if applied.is_empty() {
                println!("Database is up to date.");
            } else {
                for file in applied {
                    println!("applied {file}");
                }
            }
            Ok(0)
        }
        Commands::Db(DbCommand::Status) => {
            let pool = db::open_sqlite_pool(&config.db_path).await?;
            let applied = migrate::applied_versions(&pool).await;
            pool.close().await;
            let applied = applied?;
            for version in migrate::known_versions() {
                let state = if applied.iter().any(|v| v == version) {
                    "applied"
                } else {
                    "pending"
                };
                println!("{version}\t{state}");
            }
            Ok(0)
        }
    }
}

fn session_for(user: Option<String>) -> Session {
    match user {
        Some(user) if !user.trim().is_empty() => {
            let user = user.trim().to_string();
            Session::authenticated(Identity::new(user.clone(), user))
        }
        _ => Session::new(),
    }
}

async fn migrated_pool(db_path: &Path) -> Result<SqlitePool> {
    let pool = db::open_sqlite_pool(db_path).await?;
    migrate::apply_migrations(&pool)
        .await
        .with_context(|| format!("migrate database {}", db_path.display()))?;
    Ok(pool)
}

async fn open_store(db_path: &Path) -> Result<SqliteStore> {
    Ok(SqliteStore::new(migrated_pool(db_path).await?))
}
