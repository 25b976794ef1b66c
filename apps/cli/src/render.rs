//! Plain-text rendering of a [`ListSnapshot`].

use std::fmt::Write as _;

use client_core::{ListSnapshot, PeopleStatus};
use shared::domain::{Person, SortDirection, SortField};

pub const DEFAULT_VIEWPORT_ROWS: usize = 12;

/// Visible window over the view. Follows scroll-to-index instructions by
/// moving the least distance that brings the row into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    top: usize,
    rows: usize,
}

impl Viewport {
    pub fn new(rows: usize) -> Self {
        Self {
            top: 0,
            rows: rows.max(1),
        }
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn scroll_to(&mut self, index: usize) {
        if index < self.top {
            self.top = index;
        } else if index >= self.top + self.rows {
            self.top = index + 1 - self.rows;
        }
    }

    /// Keeps the window inside a view of `len` rows.
    pub fn clamp(&mut self, len: usize) {
        self.top = self.top.min(len.saturating_sub(self.rows));
    }

    pub fn range(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.top.min(len);
        start..(start + self.rows).min(len)
    }
}

pub fn row(person: &Person, selected: bool) -> String {
    let marker = if selected { '>' } else { ' ' };
    match person.description() {
        Some(description) => format!(
            "{marker} {:>5}  {}  ({})",
            person.year(),
            person.full_name(),
            description
        ),
        None => format!("{marker} {:>5}  {}", person.year(), person.full_name()),
    }
}

pub fn title(person: &Person) -> String {
    if person.needs_year_suffix() {
        format!("{} ({})", person.full_name(), person.year())
    } else {
        person.full_name().to_string()
    }
}

pub fn detail(person: &Person) -> String {
    let mut out = format!("{}\n  id: {}", title(person), person.id());
    if let Some(description) = person.description() {
        let _ = write!(out, "\n  {description}");
    }
    if let Some(image) = person.thumbnail().or(person.image()) {
        let _ = write!(
            out,
            "\n  image: {} ({}x{})",
            image.source_url, image.width, image.height
        );
    }
    out
}

pub fn header(snapshot: &ListSnapshot) -> String {
    let date = snapshot
        .date
        .map(|date| date.to_string())
        .unwrap_or_else(|| "--".into());
    let status = match &snapshot.status {
        PeopleStatus::Idle => "idle".to_string(),
        PeopleStatus::Loading => "loading".to_string(),
        PeopleStatus::Succeeded => format!("{} shown", snapshot.view.len()),
        PeopleStatus::Failed(error) => format!("error: {error}"),
    };
    let field = match snapshot.sort.field {
        SortField::Year => "year",
        SortField::SortKey => "name",
    };
    let direction = match snapshot.sort.direction {
        SortDirection::Asc => "asc",
        SortDirection::Desc => "desc",
    };

    let mut out = format!("born on {date} | {status} | sort {field} {direction}");
    if let Some(year) = snapshot.filter.year_equals {
        let _ = write!(out, " | year = {year}");
    }
    if let Some(text) = snapshot.filter.text_contains.as_deref().filter(|t| !t.is_empty()) {
        let _ = write!(out, " | text ~ \"{text}\"");
    }
    out
}

/// Header plus the rows inside `viewport`.
pub fn window(snapshot: &ListSnapshot, viewport: &Viewport) -> String {
    let mut out = header(snapshot);
    let range = viewport.range(snapshot.view.len());
    if range.start > 0 {
        let _ = write!(out, "\n  ... {} above", range.start);
    }
    for index in range.clone() {
        let _ = write!(
            out,
            "\n{}",
            row(&snapshot.view[index], snapshot.selected_index == Some(index))
        );
    }
    if range.end < snapshot.view.len() {
        let _ = write!(out, "\n  ... {} below", snapshot.view.len() - range.end);
    }
    out
}
