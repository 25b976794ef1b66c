use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{BirthsSession, FeedClient, ViewStateStore};
use serde::Serialize;
use shared::domain::{
    FilterCriteria, MonthDay, Person, PersonId, SortCriteria, SortDirection, SortField,
};
use tracing_subscriber::EnvFilter;
use url::Url;

mod browse;
mod commands;
mod config;
mod render;

/// People born on a given day, from the Wikimedia "on this day" feed.
#[derive(Parser, Debug)]
#[command(name = "born_today", version)]
struct Cli {
    /// Config file; defaults to ./born_today.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Date as MM-DD; defaults to today in local time.
    #[arg(long)]
    date: Option<MonthDay>,
    /// Deep link whose `personid` parameter seeds the selection.
    #[arg(long, conflicts_with = "select")]
    link: Option<Url>,
    /// Person id to select once the list is loaded.
    #[arg(long)]
    select: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch once and print the filtered, sorted list.
    List {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        text: Option<String>,
        /// `year` or `name`.
        #[arg(long, default_value = "year")]
        sort: SortField,
        #[arg(long)]
        desc: bool,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Browse the list interactively with line commands.
    Browse,
}

#[derive(Serialize)]
struct ListOutput<'a> {
    date: MonthDay,
    selected: Option<&'a PersonId>,
    deep_link: Option<String>,
    people: &'a [Person],
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = config::load_settings(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let view_state = match (&cli.link, cli.select) {
        (Some(link), _) => ViewStateStore::from_url(link),
        (None, Some(id)) => ViewStateStore::with_seed(Some(PersonId(id))),
        (None, None) => ViewStateStore::new(),
    };
    let feed = FeedClient::new(settings.feed_settings())?;
    let session = BirthsSession::new(Arc::new(feed), view_state);
    let date = cli.date.unwrap_or_else(MonthDay::today);

    match cli.command {
        Command::List {
            year,
            text,
            sort,
            desc,
            json,
        } => {
            session
                .set_filter(FilterCriteria {
                    year_equals: year,
                    text_contains: text,
                })
                .await;
            let direction = if desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            session.set_sort(SortCriteria::new(sort, direction)).await;

            if let Err(error) = session.load(date).await {
                bail!("error loading data for {date}: {error}");
            }

            let snapshot = session.snapshot().await;
            if json {
                let output = ListOutput {
                    date,
                    selected: snapshot.selected.as_ref(),
                    deep_link: session.deep_link_query().await,
                    people: &snapshot.view,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", render::header(&snapshot));
                for (index, person) in snapshot.view.iter().enumerate() {
                    println!("{}", render::row(person, snapshot.selected_index == Some(index)));
                }
            }
        }
        Command::Browse => browse::run(&session, date).await?,
    }

    Ok(())
}
