use std::sync::Arc;

use shared::{
    domain::{MonthDay, Person},
    error::FeedError,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PeopleStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed(FeedError),
}

/// Immutable snapshot of the people from the last successful fetch.
///
/// The snapshot is replaced wholesale; it is never patched in place.
#[derive(Debug, Clone)]
pub struct PeopleRepository {
    status: PeopleStatus,
    date: Option<MonthDay>,
    people: Arc<[Person]>,
}

impl Default for PeopleRepository {
    fn default() -> Self {
        Self {
            status: PeopleStatus::Idle,
            date: None,
            people: Arc::from(Vec::new()),
        }
    }
}

impl PeopleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &PeopleStatus {
        &self.status
    }

    /// Date of the current snapshot, if one was fetched.
    pub fn date(&self) -> Option<MonthDay> {
        self.date
    }

    pub fn people(&self) -> &Arc<[Person]> {
        &self.people
    }

    /// Marks a fetch as outstanding and returns the status it replaced.
    pub fn begin_loading(&mut self) -> PeopleStatus {
        std::mem::replace(&mut self.status, PeopleStatus::Loading)
    }

    pub fn restore_status(&mut self, status: PeopleStatus) {
        self.status = status;
    }

    pub fn replace(&mut self, date: MonthDay, people: Vec<Person>) -> Arc<[Person]> {
        self.status = PeopleStatus::Succeeded;
        self.date = Some(date);
        self.people = Arc::from(people);
        Arc::clone(&self.people)
    }

    /// Records a failed fetch. The previous snapshot is left in place.
    pub fn fail(&mut self, error: FeedError) {
        self.status = PeopleStatus::Failed(error);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::PersonId;

    fn person(id: i64) -> Person {
        Person::new(PersonId::from_page_id(id), 1900, "A B", None, None, None)
    }

    #[test]
    fn replace_swaps_snapshot_and_marks_success() {
        let mut repo = PeopleRepository::new();
        let date = MonthDay::new(3, 14).expect("date");

        assert_eq!(repo.begin_loading(), PeopleStatus::Idle);
        let snapshot = repo.replace(date, vec![person(1), person(2)]);

        assert_eq!(repo.status(), &PeopleStatus::Succeeded);
        assert_eq!(repo.date(), Some(date));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].id(), &PersonId::from_page_id(2));
    }

    #[test]
    fn failure_keeps_previous_people() {
        let mut repo = PeopleRepository::new();
        repo.replace(MonthDay::new(3, 14).expect("date"), vec![person(1)]);
        repo.begin_loading();
        repo.fail(FeedError::Timeout);

        assert_eq!(repo.status(), &PeopleStatus::Failed(FeedError::Timeout));
        assert_eq!(repo.people().len(), 1);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut repo = PeopleRepository::new();
        repo.replace(MonthDay::new(3, 14).expect("date"), vec![person(1)]);
        repo.reset();

        assert_eq!(repo.status(), &PeopleStatus::Idle);
        assert_eq!(repo.date(), None);
        assert!(repo.people().is_empty());
    }
}
