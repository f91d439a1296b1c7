mod api;
mod form;
mod render;
mod shell;
mod state;

use anyhow::{anyhow, bail};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use api::{CatalogApi, HttpCatalog};
use form::BookFields;
use state::Catalog;

#[derive(Debug, Parser)]
#[command(name = "bookclub", version, about = "Terminal client for the bookclub catalog API")]
struct Cli {
    /// Base URL of the catalog API
    #[arg(long, env = "BOOKCLUB_API_URL", default_value = "http://localhost:4000")]
    api_url: String,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List books, optionally filtered by title, author or genre
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show the details of one book
    Show { id: String },
    /// Add a book
    Add(BookFields),
    /// Change fields of a book
    Edit {
        id: String,
        #[command(flatten)]
        fields: BookFields,
    },
    /// Delete a book
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Interactive session (default)
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let mut catalog = Catalog::new(HttpCatalog::new(&cli.api_url)?);
    run(&mut catalog, cli.command.unwrap_or(Command::Shell)).await
}

async fn run<A: CatalogApi>(catalog: &mut Catalog<A>, command: Command) -> anyhow::Result<()> {
    // Reject invalid forms before touching the network.
    match &command {
        Command::Add(fields) => {
            fields.clone().into_new_book()?;
        }
        Command::Edit { fields, .. } => {
            if fields.is_empty() {
                bail!("nothing to change; pass at least one field");
            }
            fields.clone().into_patch()?;
        }
        _ => {}
    }

    match command {
        Command::Shell => return shell::run(catalog).await,
        Command::List { search } => {
            load(catalog).await?;
            catalog.state.set_search(search.unwrap_or_default());
            print!("{}", render::list(&catalog.state));
        }
        Command::Show { id } => {
            load(catalog).await?;
            let book = catalog
                .state
                .select(&id)
                .cloned()
                .ok_or_else(|| anyhow!("no book with id '{id}'"))?;
            print!("{}", render::details(Some(&book)));
        }
        Command::Add(fields) => {
            load(catalog).await?;
            catalog.state.open_new_form();
            if !catalog.submit(fields).await? {
                return Err(banner_error(catalog));
            }
            print!("{}", render::details(catalog.state.books.last()));
        }
        Command::Edit { id, fields } => {
            load(catalog).await?;
            if !catalog.state.open_edit_form(&id) {
                bail!("no book with id '{id}'");
            }
            if !catalog.submit(fields).await? {
                return Err(banner_error(catalog));
            }
            print!("{}", render::details(catalog.state.current.as_ref()));
        }
        Command::Delete { id, yes } => {
            load(catalog).await?;
            if catalog.state.find(&id).is_none() {
                bail!("no book with id '{id}'");
            }
            let confirmed = yes
                || shell::confirm(
                    &mut shell::input(),
                    "Are you sure you want to delete this book?",
                )
                .await?;
            if !confirmed {
                println!("cancelled");
                return Ok(());
            }
            if !catalog.delete(&id, true).await {
                return Err(banner_error(catalog));
            }
            println!("deleted");
        }
    }

    Ok(())
}

/// Fetch the collection once; a failure surfaces the fetch banner as the error.
async fn load<A: CatalogApi>(catalog: &mut Catalog<A>) -> anyhow::Result<()> {
    if catalog.load().await {
        Ok(())
    } else {
        Err(banner_error(catalog))
    }
}

fn banner_error<A>(catalog: &Catalog<A>) -> anyhow::Error {
    anyhow!(catalog
        .state
        .error
        .clone()
        .unwrap_or_else(|| "request failed".to_string()))
}
