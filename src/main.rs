use brewlog::access::Viewer;
use brewlog::journal::Journal;
use brewlog::{settings, storage};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use migration::{Migrator, MigratorTrait};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "brewlog", version, about = "Homebrewing journal")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending database migrations
    Migrate,
    /// Print the lifecycle state of a brew
    State {
        brew_id: i32,
        /// Brewer id to look through; anonymous when omitted
        #[arg(long)]
        viewer: Option<i32>,
    },
    /// Print the dashboard when a viewer is given, the front page otherwise
    Home {
        #[arg(long)]
        viewer: Option<i32>,
    },
    /// Find brews, or breweries, whose name starts with a prefix
    Search {
        prefix: String,
        #[arg(long)]
        breweries: bool,
        #[arg(long)]
        viewer: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    // load settings
    let settings = settings::Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    // init storage (database)
    let db = storage::init(&settings.database).await?;

    let output = match cli.command {
        Command::Migrate => {
            Migrator::up(&db, None).await.into_diagnostic()?;
            tracing::info!("Migrations applied");
            return Ok(());
        }
        Command::State { brew_id, viewer } => {
            let journal = Journal::new(db, settings.journal);
            let state = journal.brew_state(Viewer::from_id(viewer), brew_id).await?;
            serde_json::to_string_pretty(&state).into_diagnostic()?
        }
        Command::Home { viewer } => {
            let journal = Journal::new(db, settings.journal);
            let view = journal.home(Viewer::from_id(viewer)).await?;
            serde_json::to_string_pretty(&view).into_diagnostic()?
        }
        Command::Search {
            prefix,
            breweries,
            viewer,
        } => {
            let journal = Journal::new(db, settings.journal);
            let viewer = Viewer::from_id(viewer);
            if breweries {
                let found = journal.search_breweries(viewer, &prefix).await?;
                serde_json::to_string_pretty(&found).into_diagnostic()?
            } else {
                let found = journal.search_brews(viewer, &prefix).await?;
                serde_json::to_string_pretty(&found).into_diagnostic()?
            }
        }
    };
    println!("{output}");
    Ok(())
}
