//! Births feed retrieval and the list view state machine behind it.
//!
//! Data flows one way: [`FeedClient`] fetches raw items, [`normalizer`] turns
//! them into [`Person`](shared::domain::Person) records, [`PeopleRepository`]
//! holds the snapshot, and [`ListViewController`] derives the filtered, sorted
//! view and keeps the selection valid. [`BirthsSession`] owns all of it behind
//! one lock.

pub mod feed;
pub mod list_view;
pub mod normalizer;
pub mod repository;
pub mod session;
pub mod view_state;

pub use feed::{BirthsFeed, FeedClient, FeedSettings};
pub use list_view::{ListViewController, ListViewEvent, NavDirection};
pub use repository::{PeopleRepository, PeopleStatus};
pub use session::{BirthsSession, ListSnapshot};
pub use view_state::ViewStateStore;
