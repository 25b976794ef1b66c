//! Filter, sort, selection and keyboard navigation over the people snapshot.
//!
//! Every transition recomputes the derived view and revalidates the selection
//! before returning, so callers never observe a view and a selection from
//! different transitions.

use std::{cmp::Ordering, sync::Arc, sync::OnceLock};

use icu_collator::{options::CollatorOptions, Collator, CollatorBorrowed};
use shared::domain::{FilterCriteria, Person, PersonId, SortCriteria, SortDirection, SortField};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::view_state::ViewStateStore;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// One-way notifications for the renderer. No acknowledgement is expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListViewEvent {
    ViewChanged,
    SelectionChanged(Option<PersonId>),
    ScrollToIndex(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Previous,
    Next,
}

pub struct ListViewController {
    people: Arc<[Person]>,
    filter: FilterCriteria,
    sort: SortCriteria,
    view: Vec<Person>,
    view_state: ViewStateStore,
    events: broadcast::Sender<ListViewEvent>,
}

impl ListViewController {
    pub fn new(view_state: ViewStateStore) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            people: Arc::from(Vec::new()),
            filter: FilterCriteria::default(),
            sort: SortCriteria::default(),
            view: Vec::new(),
            view_state,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListViewEvent> {
        self.events.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<ListViewEvent> {
        self.events.clone()
    }

    pub fn view(&self) -> &[Person] {
        &self.view
    }

    pub fn filter(&self) -> &FilterCriteria {
        &self.filter
    }

    pub fn sort(&self) -> SortCriteria {
        self.sort
    }

    pub fn view_state(&self) -> &ViewStateStore {
        &self.view_state
    }

    pub fn selected(&self) -> Option<&PersonId> {
        self.view_state.selected()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected().and_then(|id| self.position(id))
    }

    pub fn selected_person(&self) -> Option<&Person> {
        self.selected_index().map(|index| &self.view[index])
    }

    /// Applies a new filter. A selection filtered out of the view is cleared
    /// rather than kept off-screen.
    pub fn set_filter(&mut self, filter: FilterCriteria) {
        let before = self.fingerprint();
        self.filter = filter;
        self.recompute();
        self.clear_hidden_selection();
        self.publish(before);
    }

    pub fn set_sort(&mut self, sort: SortCriteria) {
        let before = self.fingerprint();
        self.sort = sort;
        self.recompute();
        self.clear_hidden_selection();
        self.publish(before);
    }

    /// Swaps in a freshly fetched snapshot, keeping the current filter and
    /// sort. A pending seed is honoured if it is in the new view; otherwise a
    /// missing or stale selection defaults to the first row.
    pub fn replace_people(&mut self, people: Arc<[Person]>) {
        let before = self.fingerprint();
        self.people = people;
        self.recompute();

        if !self.people.is_empty() {
            if let Some(seed) = self.view_state.take_seed() {
                if self.position(&seed).is_some() {
                    self.view_state.set_selected(Some(seed));
                } else {
                    debug!(seed = %seed, "ignoring seeded selection absent from view");
                }
            }
        }

        if self.selected_index().is_none() {
            let first = self.view.first().map(|person| person.id().clone());
            self.view_state.set_selected(first);
        }
        self.publish(before);
    }

    /// Commits `id` only if it is in the current view. Returns whether the
    /// selection was accepted.
    pub fn select(&mut self, id: &PersonId) -> bool {
        if self.position(id).is_none() {
            debug!(id = %id, "rejecting selection absent from current view");
            return false;
        }
        let before = self.fingerprint();
        self.view_state.set_selected(Some(id.clone()));
        self.publish(before);
        true
    }

    /// Moves the selection one row. Stops at either end of the view. With no
    /// selection, `Next` selects the first row. Returns the resulting index.
    pub fn navigate(&mut self, direction: NavDirection) -> Option<usize> {
        let current = self.selected_index();
        let target = match (current, direction) {
            (None, NavDirection::Next) => (!self.view.is_empty()).then_some(0),
            (None, NavDirection::Previous) => None,
            (Some(index), NavDirection::Previous) => index.checked_sub(1),
            (Some(index), NavDirection::Next) => {
                (index + 1 < self.view.len()).then_some(index + 1)
            }
        };

        let Some(target) = target else {
            return current;
        };
        let before = self.fingerprint();
        let id = self.view[target].id().clone();
        self.view_state.set_selected(Some(id));
        self.publish(before);
        Some(target)
    }

    fn position(&self, id: &PersonId) -> Option<usize> {
        self.view.iter().position(|person| person.id() == id)
    }

    fn recompute(&mut self) {
        self.view = filter_and_sort(&self.people, &self.filter, self.sort);
    }

    fn clear_hidden_selection(&mut self) {
        if self.selected().is_some() && self.selected_index().is_none() {
            self.view_state.set_selected(None);
        }
    }

    fn fingerprint(&self) -> (Vec<PersonId>, Option<PersonId>) {
        (
            self.view.iter().map(|person| person.id().clone()).collect(),
            self.selected().cloned(),
        )
    }

    fn publish(&self, (view_before, selected_before): (Vec<PersonId>, Option<PersonId>)) {
        let view_changed = self
            .view
            .iter()
            .map(Person::id)
            .ne(view_before.iter());
        let selection_changed = self.selected() != selected_before.as_ref();

        // Sending only fails when nobody is subscribed.
        if view_changed {
            let _ = self.events.send(ListViewEvent::ViewChanged);
        }
        if selection_changed {
            let _ = self
                .events
                .send(ListViewEvent::SelectionChanged(self.selected().cloned()));
        }
        if view_changed || selection_changed {
            if let Some(index) = self.selected_index() {
                let _ = self.events.send(ListViewEvent::ScrollToIndex(index));
            }
        }
    }
}

/// Filters `people` and sorts the survivors. Year matching is exact, text
/// matching is a folded substring test on name or description, and both must
/// pass when both are set.
pub fn filter_and_sort(people: &[Person], filter: &FilterCriteria, sort: SortCriteria) -> Vec<Person> {
    let mut view: Vec<Person> = if filter.is_empty() {
        people.to_vec()
    } else {
        let needle = filter.folded_text();
        people
            .iter()
            .filter(|person| filter.year_equals.map_or(true, |year| person.year() == year))
            .filter(|person| needle.as_deref().map_or(true, |needle| person.matches_folded(needle)))
            .cloned()
            .collect()
    };
    view.sort_by(|a, b| compare(a, b, sort));
    view
}

fn compare(a: &Person, b: &Person, sort: SortCriteria) -> Ordering {
    let ordering = match sort.field {
        SortField::Year => a.year().cmp(&b.year()),
        SortField::SortKey => collate(a.sort_key(), b.sort_key()),
    };
    match sort.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn collate(a: &str, b: &str) -> Ordering {
    match collator() {
        Some(collator) => collator.compare(a, b),
        None => a.cmp(b),
    }
}

fn collator() -> Option<&'static CollatorBorrowed<'static>> {
    static COLLATOR: OnceLock<Option<CollatorBorrowed<'static>>> = OnceLock::new();
    COLLATOR
        .get_or_init(|| {
            match Collator::try_new(Default::default(), CollatorOptions::default()) {
                Ok(collator) => Some(collator),
                Err(error) => {
                    warn!(%error, "locale collator unavailable; sorting names by code point");
                    None
                }
            }
        })
        .as_ref()
}

#[cfg(test)]
#[path = "tests/list_view_tests.rs"]
mod tests;
