//! oxide-dialect CLI
//!
//! Command-line tool for previewing dialect output and inspecting databases.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_dialect::prelude::*;

/// Pluggable SQL dialect adapters.
#[derive(Parser)]
#[command(name = "oxide-dialect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Dialect name.
    #[arg(short = 'D', long, env = "OXIDE_DIALECT", default_value = "sqlite3")]
    dialect: String,

    /// Adapter options file (JSON).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Propagate introspection failures instead of reporting "absent".
    #[arg(long)]
    strict: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered dialects.
    Dialects,

    /// Resolve the column type for a value kind.
    Type {
        /// Value kind (bool, int, uint, int64, uint64, float, string, time, bytes).
        kind: String,

        /// Field name used in error messages.
        #[arg(short, long, default_value = "field")]
        name: String,

        /// Declared size; 0 means unbounded.
        #[arg(short, long)]
        size: Option<usize>,

        /// Mark the field as primary key.
        #[arg(long)]
        primary_key: bool,

        /// Disable auto-increment on a primary key.
        #[arg(long)]
        no_auto_increment: bool,

        /// Add NOT NULL.
        #[arg(long)]
        not_null: bool,

        /// Explicit column type.
        #[arg(long)]
        sql_type: Option<String>,
    },

    /// Render a pagination clause.
    Paginate {
        /// Row limit.
        #[arg(short, long, allow_hyphen_values = true)]
        limit: Option<String>,

        /// Row offset.
        #[arg(short, long, allow_hyphen_values = true)]
        offset: Option<String>,
    },

    /// Render a date formatting expression.
    FormatDate {
        /// SQL expression to format.
        expr: String,

        /// Portable pattern (y, m, d, h, M, s).
        pattern: String,
    },

    /// Check a table, column or index in a SQLite database.
    Inspect {
        /// Table name.
        table: String,

        /// Column to look for.
        #[arg(short, long)]
        column: Option<String>,

        /// Index to look for.
        #[arg(short, long)]
        index: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut options = match &cli.config {
        Some(path) => AdapterOptions::load(path)?,
        None => AdapterOptions::default(),
    };
    if cli.strict {
        options.introspection = IntrospectionPolicy::Strict;
    }
    let registry = DialectRegistry::with_builtins().options(options.clone());

    match cli.command {
        Commands::Dialects => {
            for name in registry.names() {
                println!("{name}");
            }
        }

        Commands::Type {
            kind,
            name,
            size,
            primary_key,
            no_auto_increment,
            not_null,
            sql_type,
        } => {
            let adapter = registry.create(&cli.dialect)?;

            let mut field = FieldDescriptor::new(name, ValueKind::from_name(&kind));
            if let Some(size) = size {
                field = field.size(size);
            }
            if primary_key {
                field = field.primary_key();
            }
            if no_auto_increment {
                field = field.auto_increment(false);
            }
            if not_null {
                field = field.not_null();
            }
            if let Some(sql_type) = sql_type {
                field = field.sql_type(sql_type);
            }

            let resolved = adapter.resolve_sql_type(&mut field)?;
            println!("{resolved}");
            if field.auto_increment == Some(true) {
                info!("Field uses an identity column.");
            }
        }

        Commands::Paginate { limit, offset } => {
            let adapter = registry.create(&cli.dialect)?;
            let clause =
                adapter.limit_and_offset_sql(limit.map(PageBound::from), offset.map(PageBound::from));
            println!("{}", clause.trim_start());
        }

        Commands::FormatDate { expr, pattern } => {
            let adapter = registry.create(&cli.dialect)?;
            let mut expr = Expr::new(expr);
            adapter.format_date(&mut expr, &pattern);
            println!("{}", expr.sql);
        }

        Commands::Inspect {
            table,
            column,
            index,
        } => {
            if cli.dialect != "sqlite3" {
                anyhow::bail!(
                    "inspect needs a sqlite3 database, got dialect '{}'",
                    cli.dialect
                );
            }

            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect(&cli.database)
                .await?;
            let adapter = registry.open_with(&cli.dialect, Arc::new(pool), &options)?;

            let database = adapter.current_database().await;
            let label = if database.is_empty() {
                "<memory>"
            } else {
                database.as_str()
            };
            info!("Inspecting {}", label);

            let table_found = adapter.has_table(&table).await?;
            println!(" [{}] table {}", mark(table_found), table);

            if let Some(column) = column {
                let found = adapter.has_column(&table, &column).await?;
                println!(" [{}] column {}.{}", mark(found), table, column);
            }

            if let Some(index) = index {
                let found = adapter.has_index(&table, &index).await?;
                println!(" [{}] index {}", mark(found), index);
            }
        }
    }

    Ok(())
}

const fn mark(found: bool) -> char {
    if found {
        'X'
    } else {
        ' '
    }
}
