//! Session-lifetime selection state, independent of fetch results.

use shared::domain::PersonId;
use url::{form_urlencoded, Url};

/// Query parameter carrying a deep-linked selection.
pub const PERSON_ID_QUERY_PARAM: &str = "personid";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewStateStore {
    selected: Option<PersonId>,
    seed: Option<PersonId>,
}

impl ViewStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an externally supplied selection, e.g. from a deep
    /// link. The seed is only a candidate: it is checked against the first
    /// fetched view and dropped if absent.
    pub fn with_seed(seed: Option<PersonId>) -> Self {
        Self {
            selected: None,
            seed: seed.filter(|id| !id.as_str().is_empty()),
        }
    }

    /// Reads the seed from a query string such as `?personid=pageid-4077`.
    pub fn from_query(query: &str) -> Self {
        let seed = form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .find(|(key, _)| key == PERSON_ID_QUERY_PARAM)
            .map(|(_, value)| PersonId(value.into_owned()));
        Self::with_seed(seed)
    }

    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }

    pub fn selected(&self) -> Option<&PersonId> {
        self.selected.as_ref()
    }

    pub fn seed(&self) -> Option<&PersonId> {
        self.seed.as_ref()
    }

    /// Query string that deep-links the current selection.
    pub fn deep_link_query(&self) -> Option<String> {
        self.selected.as_ref().map(|id| {
            form_urlencoded::Serializer::new(String::new())
                .append_pair(PERSON_ID_QUERY_PARAM, id.as_str())
                .finish()
        })
    }

    pub(crate) fn set_selected(&mut self, selected: Option<PersonId>) {
        self.selected = selected;
    }

    pub(crate) fn take_seed(&mut self) -> Option<PersonId> {
        self.seed.take()
    }
}
