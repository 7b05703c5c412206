//! DQL console command-line driver.
//!
//! Dispatches one operation against the configured database and prints the result.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dql_console::auth::LoginRequest;
use dql_console::db::{self, SettingsStore, SqliteSettingsStore};
use dql_console::dispatch::SCHEMA_QUERY;
use dql_console::{
    AlterOp, Config, ConnectionConfig, Dispatcher, DocumentKind, InMemorySessionStore, MutateOp,
    Operation, QueryOp,
};

#[derive(Parser)]
#[command(name = "dql-console", about = "Send DQL to a Dgraph endpoint")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show or change the stored connection settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Log in with ACL credentials and store the access token
    Login {
        #[arg(long, default_value = "groot")]
        user: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value_t = 0)]
        namespace: u64,
    },
    /// Run a DQL query
    Query {
        /// Query text, or `@path` to read it from a file
        text: String,
        #[arg(long)]
        debug: bool,
        /// Server timeout, e.g. `5s`; defaults to the stored query timeout
        #[arg(long)]
        timeout: Option<String>,
        #[arg(long)]
        start_ts: Option<u64>,
        #[arg(long)]
        hash: Option<String>,
        /// Best-effort read
        #[arg(long)]
        be: bool,
        /// Read-only query
        #[arg(long)]
        ro: bool,
    },
    /// Show the current schema
    Schema {
        /// Print the introspection JSON instead of schema text
        #[arg(long)]
        json: bool,
    },
    /// Apply set-N-Quads
    Mutate {
        /// N-Quads, or `@path` to read them from a file
        nquads: String,
        #[arg(long)]
        commit_now: bool,
        #[arg(long)]
        start_ts: Option<u64>,
    },
    /// Submit schema text
    Alter {
        /// Schema text, or `@path` to read it from a file
        schema: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    Set {
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        timeout: Option<u32>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        auth_token: Option<String>,
        #[arg(long)]
        acl_token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Settings path: {:?}", config.settings_path);

    let pool = db::init_database(&config.settings_path).await?;
    let settings = SqliteSettingsStore::new(pool);
    let connection = settings.get().await?;

    let operation = match cli.command {
        Command::Config { action } => return configure(&settings, connection, action).await,
        Command::Login {
            user,
            password,
            namespace,
        } => {
            let sessions = Arc::new(InMemorySessionStore::new());
            let dispatcher = dispatcher(&config, connection.clone(), sessions)?;
            let tokens = dispatcher
                .login(&LoginRequest::new(user, password, namespace))
                .await?;
            settings
                .set(&connection.with_acl_token(tokens.access_jwt).configured())
                .await?;
            println!("Logged in; access token stored.");
            return Ok(());
        }
        Command::Query {
            text,
            debug,
            timeout,
            start_ts,
            hash,
            be,
            ro,
        } => {
            let mut op = QueryOp::new(read_arg(&text)?);
            if debug {
                op = op.with_debug(true);
            }
            if let Some(timeout) = timeout.or_else(|| connection.server_timeout()) {
                op = op.with_timeout(timeout);
            }
            op.start_ts = start_ts;
            op.hash = hash;
            if be {
                op = op.with_best_effort(true);
            }
            if ro {
                op = op.with_read_only(true);
            }
            Operation::Query(op)
        }
        Command::Schema { json } => {
            let text = if json {
                format!("{}\n#JSON", SCHEMA_QUERY)
            } else {
                SCHEMA_QUERY.to_string()
            };
            Operation::Query(QueryOp::new(text))
        }
        Command::Mutate {
            nquads,
            commit_now,
            start_ts,
        } => {
            let mut op = MutateOp::new(read_arg(&nquads)?);
            if commit_now {
                op = op.with_commit_now(true);
            }
            op.start_ts = start_ts;
            Operation::Mutate(op)
        }
        Command::Alter { schema } => Operation::Alter(AlterOp::new(read_arg(&schema)?)),
    };

    let sessions = Arc::new(InMemorySessionStore::new());
    let kind = match operation {
        Operation::Mutate(_) => DocumentKind::Mutation,
        Operation::Alter(_) => DocumentKind::Schema,
        Operation::Query(_) => DocumentKind::Query,
    };
    let document_id = sessions.open(kind, "");

    let dispatcher = dispatcher(&config, connection, sessions)?;
    let dispatched = dispatcher.dispatch(&operation, document_id).await?;
    println!("{}", dispatched.display_text());

    Ok(())
}

fn dispatcher(
    config: &Config,
    connection: ConnectionConfig,
    sessions: Arc<InMemorySessionStore>,
) -> Result<Dispatcher, reqwest::Error> {
    let client = Dispatcher::http_client(config)?;
    Ok(Dispatcher::with_client(client, Arc::new(connection), sessions))
}

async fn configure(
    settings: &SqliteSettingsStore,
    mut connection: ConnectionConfig,
    action: ConfigAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&redacted(&connection))?);
        }
        ConfigAction::Set {
            url,
            timeout,
            api_key,
            auth_token,
            acl_token,
        } => {
            if let Some(url) = url {
                connection.endpoint_url = url;
            }
            if let Some(timeout) = timeout {
                connection.query_timeout_seconds = timeout;
            }
            if let Some(api_key) = api_key {
                connection.api_key = api_key;
            }
            if let Some(auth_token) = auth_token {
                connection.auth_token = auth_token;
            }
            if let Some(acl_token) = acl_token {
                connection.acl_token = acl_token;
            }
            settings.set(&connection.configured()).await?;
            println!("Settings saved.");
        }
    }
    Ok(())
}

fn redacted(connection: &ConnectionConfig) -> ConnectionConfig {
    let mask = |secret: &str| {
        if secret.is_empty() {
            String::new()
        } else {
            "********".to_string()
        }
    };
    ConnectionConfig {
        api_key: mask(&connection.api_key),
        auth_token: mask(&connection.auth_token),
        acl_token: mask(&connection.acl_token),
        ..connection.clone()
    }
}

/// `@path` reads the file at `path`; anything else is taken literally.
fn read_arg(arg: &str) -> std::io::Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(PathBuf::from(path)),
        None => Ok(arg.to_string()),
    }
}
