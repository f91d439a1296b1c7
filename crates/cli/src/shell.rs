//! Interactive session keeping catalog state between commands.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use crate::api::CatalogApi;
use crate::form::BookFields;
use crate::render;
use crate::state::Catalog;

const HELP: &str = "\
commands:
  list                      show the (filtered) book list
  search [text]             filter by title, author or genre; empty clears
  show <id>                 select a book and show its details
  add <fields>              add a book, e.g. add title=Dune; author=Frank Herbert; year=1965
  edit <id> <fields>        update fields of a book, e.g. edit <id> available=false
  delete <id>               delete a book (asks for confirmation)
  reload                    fetch the collection again
  dismiss                   clear the error banner
  help                      this text
  quit                      leave
fields: title, author, genre, year, available, ratings (comma separated)
";

pub type Input = Lines<BufReader<Stdin>>;

pub fn input() -> Input {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Ask a yes/no question on the terminal. Anything but y/yes declines.
pub async fn confirm(input: &mut Input, question: &str) -> anyhow::Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("{question} [y/N] ").as_bytes())
        .await?;
    stdout.flush().await?;

    let answer = input.next_line().await?.unwrap_or_default();
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

pub async fn run<A: CatalogApi>(catalog: &mut Catalog<A>) -> anyhow::Result<()> {
    let mut input = input();
    let mut stdout = tokio::io::stdout();

    catalog.load().await;
    print(&render::list(&catalog.state));
    print_banner(catalog);

    loop {
        stdout.write_all(b"bookclub> ").await?;
        stdout.flush().await?;

        let Some(line) = input.next_line().await? else {
            break;
        };
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" => continue,
            "quit" | "exit" => break,
            "help" => print(HELP),
            "list" => print(&render::list(&catalog.state)),
            "reload" => {
                catalog.load().await;
                print(&render::list(&catalog.state));
            }
            "search" => {
                catalog.state.set_search(rest);
                print(&render::list(&catalog.state));
            }
            "show" => {
                let book = catalog.state.select(rest).cloned();
                if book.is_none() {
                    print(&format!("no book with id '{rest}'\n"));
                }
                print(&render::details(book.as_ref()));
            }
            "add" => {
                catalog.state.open_new_form();
                submit(catalog, rest).await;
            }
            "edit" => {
                let (id, fields) = rest.split_once(' ').unwrap_or((rest, ""));
                if catalog.state.open_edit_form(id) {
                    submit(catalog, fields).await;
                } else {
                    print(&format!("no book with id '{id}'\n"));
                }
            }
            "delete" => {
                if catalog.state.find(rest).is_none() {
                    print(&format!("no book with id '{rest}'\n"));
                    continue;
                }
                let confirmed =
                    confirm(&mut input, "Are you sure you want to delete this book?").await?;
                if catalog.delete(rest, confirmed).await {
                    print("deleted\n");
                }
            }
            "dismiss" => catalog.state.dismiss_error(),
            other => print(&format!("unknown command '{other}', try 'help'\n")),
        }

        print_banner(catalog);
    }

    Ok(())
}

async fn submit<A: CatalogApi>(catalog: &mut Catalog<A>, fields: &str) {
    let editing = catalog.state.editing.is_some();
    let outcome = match BookFields::parse(fields) {
        Ok(fields) => catalog.submit(fields).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(true) if editing => print(&render::details(catalog.state.current.as_ref())),
        Ok(true) => print(&render::details(catalog.state.books.last())),
        Ok(false) => {}
        Err(err) => {
            catalog.state.close_form();
            print(&format!("invalid form: {err}\n"));
        }
    }
}

fn print(text: &str) {
    print!("{text}");
}

fn print_banner<A>(catalog: &Catalog<A>) {
    if let Some(banner) = render::banner(&catalog.state) {
        eprintln!("{banner}");
    }
}
