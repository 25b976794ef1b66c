use std::{fmt, str::FromStr};

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{error::DomainError, text};

/// Stable person identifier, derived from the feed's page id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonId(pub String);

impl PersonId {
    const PAGE_ID_PREFIX: &'static str = "pageid-";

    pub fn from_page_id(page_id: i64) -> Self {
        Self(format!("{}{page_id}", Self::PAGE_ID_PREFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub width: u32,
    pub height: u32,
    pub source_url: String,
}

/// One historical figure born on the fetched date.
///
/// Fields are private so the folded search and sort keys can only come from
/// [`Person::new`]; a person is never partially updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    id: PersonId,
    year: i32,
    full_name: String,
    description: Option<String>,
    thumbnail: Option<ImageRef>,
    image: Option<ImageRef>,
    #[serde(skip)]
    full_name_folded: String,
    #[serde(skip)]
    description_folded: String,
    #[serde(skip)]
    sort_key: String,
}

impl Person {
    pub fn new(
        id: PersonId,
        year: i32,
        full_name: impl Into<String>,
        description: Option<String>,
        thumbnail: Option<ImageRef>,
        image: Option<ImageRef>,
    ) -> Self {
        let full_name = full_name.into();
        let full_name_folded = text::fold(&full_name);
        let description_folded = description.as_deref().map(text::fold).unwrap_or_default();
        let sort_key = text::surname_guess(&full_name);
        Self {
            id,
            year,
            full_name,
            description,
            thumbnail,
            image,
            full_name_folded,
            description_folded,
            sort_key,
        }
    }

    pub fn id(&self) -> &PersonId {
        &self.id
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn thumbnail(&self) -> Option<&ImageRef> {
        self.thumbnail.as_ref()
    }

    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    pub fn full_name_folded(&self) -> &str {
        &self.full_name_folded
    }

    pub fn description_folded(&self) -> &str {
        &self.description_folded
    }

    /// Folded surname guess used by the name sort.
    pub fn sort_key(&self) -> &str {
        &self.sort_key
    }

    /// Case- and accent-insensitive match of an already folded needle against
    /// the name or the description.
    pub fn matches_folded(&self, needle: &str) -> bool {
        self.full_name_folded.contains(needle) || self.description_folded.contains(needle)
    }

    /// True when a title should append the birth year because the description
    /// does not already mention it.
    pub fn needs_year_suffix(&self) -> bool {
        match &self.description {
            Some(description) => !description.contains(&self.year.to_string()),
            None => true,
        }
    }
}

/// Two-digit month and day addressing one calendar date in the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Result<Self, DomainError> {
        // 2000 is a leap year, so February 29 is accepted.
        NaiveDate::from_ymd_opt(2000, month, day)
            .map(|_| Self { month, day })
            .ok_or(DomainError::InvalidDate { month, day })
    }

    pub fn today() -> Self {
        let today = Local::now().date_naive();
        Self {
            month: today.month(),
            day: today.day(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month_str(&self) -> String {
        format!("{:02}", self.month)
    }

    pub fn day_str(&self) -> String {
        format!("{:02}", self.day)
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparseable = || DomainError::UnparseableDate(s.to_string());
        let (month, day) = s.trim().split_once(['-', '/']).ok_or_else(unparseable)?;
        let month = month.parse::<u32>().map_err(|_| unparseable())?;
        let day = day.parse::<u32>().map_err(|_| unparseable())?;
        Self::new(month, day)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub year_equals: Option<i32>,
    pub text_contains: Option<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.year_equals.is_none() && self.folded_text().is_none()
    }

    /// The text needle folded like the person fields. An empty string counts as
    /// no text filter.
    pub fn folded_text(&self) -> Option<String> {
        self.text_contains
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(text::fold)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Year,
    SortKey,
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(Self::Year),
            "name" | "sort_key" | "sortkey" => Ok(Self::SortKey),
            other => Err(DomainError::UnknownSortField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(DomainError::UnknownSortDirection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriteria {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortCriteria {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, description: Option<&str>) -> Person {
        Person::new(
            PersonId::from_page_id(1),
            1810,
            name,
            description.map(str::to_string),
            None,
            None,
        )
    }

    #[test]
    fn derived_fields_are_computed_at_construction() {
        let p = person("Frédéric Chopin", Some("Polish composer (1810–1849)"));
        assert_eq!(p.id().as_str(), "pageid-1");
        assert_eq!(p.full_name_folded(), "frederic chopin");
        assert_eq!(p.description_folded(), "polish composer (1810–1849)");
        assert_eq!(p.sort_key(), "chopin");
    }

    #[test]
    fn matches_name_or_description() {
        let p = person("Frédéric Chopin", Some("Polish composer"));
        assert!(p.matches_folded("freder"));
        assert!(p.matches_folded("compos"));
        assert!(!p.matches_folded("pianist"));
        assert!(!person("Nobody", None).matches_folded("composer"));
    }

    #[test]
    fn year_suffix_only_when_description_lacks_year() {
        assert!(!person("A", Some("born 1810 in Poland")).needs_year_suffix());
        assert!(person("A", Some("Polish composer")).needs_year_suffix());
        assert!(person("A", None).needs_year_suffix());
    }

    #[test]
    fn month_day_validates_and_formats() {
        let date = MonthDay::new(1, 5).expect("valid");
        assert_eq!(date.month_str(), "01");
        assert_eq!(date.day_str(), "05");
        assert_eq!(date.to_string(), "01-05");
        assert!(MonthDay::new(2, 29).is_ok());
        assert_eq!(
            MonthDay::new(2, 30),
            Err(DomainError::InvalidDate { month: 2, day: 30 })
        );
        assert!(MonthDay::new(13, 1).is_err());
    }

    #[test]
    fn month_day_parses_dash_and_slash() {
        assert_eq!("12-25".parse::<MonthDay>(), MonthDay::new(12, 25));
        assert_eq!("7/4".parse::<MonthDay>(), MonthDay::new(7, 4));
        assert!(matches!(
            "Christmas".parse::<MonthDay>(),
            Err(DomainError::UnparseableDate(_))
        ));
    }

    #[test]
    fn empty_text_filter_is_no_filter() {
        let filter = FilterCriteria {
            year_equals: None,
            text_contains: Some(String::new()),
        };
        assert!(filter.is_empty());
        assert_eq!(filter.folded_text(), None);

        let filter = FilterCriteria {
            year_equals: None,
            text_contains: Some("Éc".into()),
        };
        assert_eq!(filter.folded_text().as_deref(), Some("ec"));
    }

    #[test]
    fn sort_parsing() {
        assert_eq!("name".parse::<SortField>(), Ok(SortField::SortKey));
        assert_eq!("YEAR".parse::<SortField>(), Ok(SortField::Year));
        assert_eq!("desc".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert!("sideways".parse::<SortDirection>().is_err());
        assert_eq!(
            SortCriteria::default(),
            SortCriteria::new(SortField::Year, SortDirection::Asc)
        );
    }
}
