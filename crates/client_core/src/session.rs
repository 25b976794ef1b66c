//! One browsing session: the single serialized owner of people, view and
//! selection.

use std::sync::Arc;

use shared::{
    domain::{FilterCriteria, MonthDay, Person, PersonId, SortCriteria},
    error::FeedError,
};
use tokio::{
    runtime::Handle,
    sync::{broadcast, Mutex},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    feed::BirthsFeed,
    list_view::{ListViewController, ListViewEvent, NavDirection},
    normalizer::normalize_all,
    repository::{PeopleRepository, PeopleStatus},
    view_state::ViewStateStore,
};

/// Point-in-time copy of everything a renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot {
    pub status: PeopleStatus,
    pub date: Option<MonthDay>,
    pub filter: FilterCriteria,
    pub sort: SortCriteria,
    pub view: Vec<Person>,
    pub selected: Option<PersonId>,
    pub selected_index: Option<usize>,
}

impl ListSnapshot {
    /// A failed fetch blocks the list until the session is reset.
    pub fn is_blocked(&self) -> bool {
        matches!(self.status, PeopleStatus::Failed(_))
    }
}

struct SessionState {
    repository: PeopleRepository,
    list: ListViewController,
}

/// Puts back the status a load replaced if the load future is dropped before
/// it records an outcome.
struct LoadingGuard {
    state: Arc<Mutex<SessionState>>,
    previous: Option<PeopleStatus>,
}

impl LoadingGuard {
    fn disarm(&mut self) -> Option<PeopleStatus> {
        self.previous.take()
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let Some(previous) = self.previous.take() else {
            return;
        };
        match self.state.try_lock() {
            Ok(mut state) => restore_abandoned(&mut state, previous),
            Err(_) => {
                if let Ok(handle) = Handle::try_current() {
                    let state = Arc::clone(&self.state);
                    handle.spawn(async move {
                        restore_abandoned(&mut *state.lock().await, previous);
                    });
                } else {
                    warn!("births load dropped outside a runtime; status left as loading");
                }
            }
        }
    }
}

fn restore_abandoned(state: &mut SessionState, previous: PeopleStatus) {
    // A later load may already own the status.
    if state.repository.status() == &PeopleStatus::Loading {
        debug!(?previous, "births load abandoned; restoring status");
        state.repository.restore_status(previous);
    }
}

pub struct BirthsSession {
    feed: Arc<dyn BirthsFeed>,
    state: Arc<Mutex<SessionState>>,
    events: broadcast::Sender<ListViewEvent>,
}

impl BirthsSession {
    pub fn new(feed: Arc<dyn BirthsFeed>, view_state: ViewStateStore) -> Self {
        let list = ListViewController::new(view_state);
        let events = list.event_sender();
        Self {
            feed,
            state: Arc::new(Mutex::new(SessionState {
                repository: PeopleRepository::new(),
                list,
            })),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ListViewEvent> {
        self.events.subscribe()
    }

    /// Fetches `date` and, on success, replaces the people snapshot. Returns
    /// the number of people kept after normalization.
    ///
    /// The caller must not start another load while this one is outstanding.
    pub async fn load(&self, date: MonthDay) -> Result<usize, FeedError> {
        self.load_inner(date, None).await
    }

    /// Like [`load`](Self::load), but gives up with [`FeedError::Cancelled`]
    /// when `cancel` fires. A cancelled load leaves the session as it was.
    pub async fn load_cancellable(
        &self,
        date: MonthDay,
        cancel: &CancellationToken,
    ) -> Result<usize, FeedError> {
        self.load_inner(date, Some(cancel)).await
    }

    async fn load_inner(
        &self,
        date: MonthDay,
        cancel: Option<&CancellationToken>,
    ) -> Result<usize, FeedError> {
        let previous_status = {
            let mut state = self.state.lock().await;
            if state.repository.status() == &PeopleStatus::Loading {
                warn!(%date, "births load started while another is outstanding");
            }
            state.repository.begin_loading()
        };
        let mut guard = LoadingGuard {
            state: Arc::clone(&self.state),
            previous: Some(previous_status),
        };

        // The lock is not held across the fetch so the list stays responsive.
        let fetched = match cancel {
            Some(cancel) => self.feed.fetch_cancellable(date, cancel).await,
            None => self.feed.fetch(date).await,
        };

        let mut state = self.state.lock().await;
        let previous_status = guard.disarm().unwrap_or_default();
        match fetched {
            Ok(items) => {
                let people = normalize_all(&items);
                let count = people.len();
                let snapshot = state.repository.replace(date, people);
                state.list.replace_people(snapshot);
                info!(%date, count, "people replaced");
                Ok(count)
            }
            Err(FeedError::Cancelled) => {
                state.repository.restore_status(previous_status);
                Err(FeedError::Cancelled)
            }
            Err(error) => {
                warn!(
                    %date,
                    %error,
                    retryable = error.is_retryable(),
                    "births load failed"
                );
                state.repository.fail(error.clone());
                Err(error)
            }
        }
    }

    /// The recovery action after a failure: back to idle with no people. The
    /// filter and sort are kept.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.repository.reset();
        let people = Arc::clone(state.repository.people());
        state.list.replace_people(people);
        info!("session reset");
    }

    pub async fn set_filter(&self, filter: FilterCriteria) {
        self.state.lock().await.list.set_filter(filter);
    }

    pub async fn set_sort(&self, sort: SortCriteria) {
        self.state.lock().await.list.set_sort(sort);
    }

    pub async fn select(&self, id: &PersonId) -> bool {
        self.state.lock().await.list.select(id)
    }

    pub async fn navigate(&self, direction: NavDirection) -> Option<usize> {
        self.state.lock().await.list.navigate(direction)
    }

    pub async fn selected_person(&self) -> Option<Person> {
        self.state.lock().await.list.selected_person().cloned()
    }

    pub async fn deep_link_query(&self) -> Option<String> {
        self.state.lock().await.list.view_state().deep_link_query()
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        let state = self.state.lock().await;
        ListSnapshot {
            status: state.repository.status().clone(),
            date: state.repository.date(),
            filter: state.list.filter().clone(),
            sort: state.list.sort(),
            view: state.list.view().to_vec(),
            selected: state.list.selected().cloned(),
            selected_index: state.list.selected_index(),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
