//! Interactive, line-driven list browsing on stdin/stdout.

use anyhow::Context;
use client_core::{BirthsSession, ListViewEvent, NavDirection};
use shared::domain::MonthDay;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast,
};
use tracing::debug;

use crate::{
    commands::{self, BrowseCommand, HELP},
    render::{self, Viewport, DEFAULT_VIEWPORT_ROWS},
};

pub async fn run(session: &BirthsSession, date: MonthDay) -> anyhow::Result<()> {
    let mut events = session.subscribe_events();
    let mut viewport = Viewport::new(DEFAULT_VIEWPORT_ROWS);

    load(session, date).await;
    redraw(session, &mut events, &mut viewport).await;
    println!("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let command = match commands::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        if session.snapshot().await.is_blocked() && !command.allowed_when_blocked() {
            println!("the last fetch failed; type 'reset' to start over");
            continue;
        }

        match command {
            BrowseCommand::Next => {
                session.navigate(NavDirection::Next).await;
            }
            BrowseCommand::Previous => {
                session.navigate(NavDirection::Previous).await;
            }
            BrowseCommand::Year(year) => {
                let mut filter = session.snapshot().await.filter;
                filter.year_equals = year;
                session.set_filter(filter).await;
            }
            BrowseCommand::Text(text) => {
                let mut filter = session.snapshot().await.filter;
                filter.text_contains = text;
                session.set_filter(filter).await;
            }
            BrowseCommand::Sort(sort) => session.set_sort(sort).await,
            BrowseCommand::Select(id) => {
                if !session.select(&id).await {
                    println!("{id} is not in the current list");
                }
            }
            BrowseCommand::Link => {
                match session.deep_link_query().await {
                    Some(query) => println!("?{query}"),
                    None => println!("nothing selected"),
                }
                continue;
            }
            BrowseCommand::Reload => {
                let date = session.snapshot().await.date.unwrap_or(date);
                load(session, date).await;
            }
            BrowseCommand::Reset => {
                session.reset().await;
                println!("session reset; type 'reload' to fetch again");
            }
            BrowseCommand::Help => {
                println!("{HELP}");
                continue;
            }
            BrowseCommand::Quit => break,
        }

        redraw(session, &mut events, &mut viewport).await;
    }

    Ok(())
}

async fn load(session: &BirthsSession, date: MonthDay) {
    println!("loading people born on {date}...");
    if let Err(error) = session.load(date).await {
        let hint = if error.is_retryable() {
            "reset, then reload to try again"
        } else {
            "reset to continue"
        };
        println!("error loading data: {error} ({hint})");
    }
}

/// Applies pending scroll instructions to the viewport, then prints the
/// window and the selected person.
async fn redraw(
    session: &BirthsSession,
    events: &mut broadcast::Receiver<ListViewEvent>,
    viewport: &mut Viewport,
) {
    loop {
        match events.try_recv() {
            Ok(ListViewEvent::ScrollToIndex(index)) => viewport.scroll_to(index),
            Ok(event) => debug!(?event, "list view event"),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                debug!(skipped, "list view events lagged");
            }
            Err(_) => break,
        }
    }

    let snapshot = session.snapshot().await;
    viewport.clamp(snapshot.view.len());
    println!("{}", render::window(&snapshot, viewport));
    if let Some(index) = snapshot.selected_index {
        println!("\n{}", render::detail(&snapshot.view[index]));
    }
}
