use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;
use tracing::debug;
use xref_auth::SessionStore;
use xref_backend_client::BackendClient;
use xref_search::QueryController;
use xref_search::QueryPhase;
use xref_search::filter_suggestions;

#[derive(Debug, Parser)]
#[command(name = "xref", about = "Cross-reference database search client")]
struct Cli {
    /// Backend base URL.
    #[arg(
        long,
        value_name = "URL",
        env = "XREF_BACKEND_URL",
        default_value = "http://localhost:8000"
    )]
    backend: String,

    /// Directory holding client state (defaults to ~/.xref).
    #[arg(long, value_name = "PATH", env = "XREF_HOME")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(value_name = "USERNAME")]
        username: String,

        #[arg(value_name = "PASSWORD", env = "XREF_PASSWORD")]
        password: String,
    },

    /// Drop the stored session token
    Logout,

    /// Run a semantic search across the connected databases
    Search {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// List stored query suggestions, optionally filtered
    Suggest {
        #[arg(value_name = "FILTER")]
        filter: Option<String>,
    },
}

fn xref_home(cli_home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(home) = cli_home {
        return Ok(home);
    }
    let home = dirs::home_dir().context("could not determine the home directory")?;
    Ok(home.join(".xref"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = SessionStore::new(xref_home(cli.home)?);
    let client = BackendClient::new(&cli.backend)?;

    match cli.command {
        Command::Login { username, password } => {
            let token = client
                .login(&username, &password)
                .await
                .context("login failed")?;
            store.save(&token)?;
            println!("Logged in as {username}.");
        }
        Command::Logout => {
            if store.clear()? {
                println!("Logged out.");
            } else {
                println!("No session was stored.");
            }
        }
        Command::Search { query } => {
            run_search(client, &store, &query).await?;
        }
        Command::Suggest { filter } => {
            let client = client.with_token(store.token());
            let all = client.suggestions().await;
            let listed = match filter.as_deref() {
                Some(filter) => filter_suggestions(&all, filter),
                None => all,
            };
            for suggestion in listed {
                println!("{suggestion}");
            }
        }
    }

    Ok(())
}

/// The search view is protected: the session guard runs before anything is
/// submitted, mirroring the per-mount check of the web client.
async fn run_search(client: BackendClient, store: &SessionStore, query: &str) -> Result<()> {
    if query.trim().is_empty() {
        bail!("query must not be empty");
    }
    if !store.is_session_valid() {
        bail!("no valid session; run `xref login` first");
    }

    let client = client.with_token(store.token());
    let mut controller = QueryController::new(client);
    controller.mount().await;
    controller.input_changed(query);

    match controller.submit().await {
        QueryPhase::Success => {
            let state = controller.state();
            if let Some(result) = &state.result {
                println!("{}", result.answer);
                if !result.sources.is_empty() {
                    println!();
                    println!("Sources: {}", result.sources.join(", "));
                }
                if result.was_cached {
                    println!("(served from cache)");
                }
            }
            debug!("skipping post-search suggestion refresh in one-shot mode");
            Ok(())
        }
        QueryPhase::Failed => {
            let state = controller.state();
            match &state.error {
                Some(err) => bail!("search failed: {err}"),
                None => bail!("search failed"),
            }
        }
        phase => bail!("search did not complete: {phase:?}"),
    }
}
