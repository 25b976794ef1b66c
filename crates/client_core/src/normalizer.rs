//! Maps raw feed items onto [`Person`] records.
//!
//! Each raw item carries several page sub-records: one for the person and
//! others for the calendar date itself. They are told apart only by field
//! values, never by position.

use std::collections::HashSet;

use shared::{
    domain::{ImageRef, Person, PersonId},
    protocol::{RawBirth, RawImage},
};
use tracing::debug;

/// Returns the person described by `item`, or `None` when the item has no
/// usable person page. Dropping an item is routine, not an error.
pub fn normalize(item: &RawBirth) -> Option<Person> {
    let Some(page) = item
        .pages
        .as_deref()
        .and_then(|pages| pages.iter().find(|page| page.is_person_page()))
    else {
        debug!(text = ?item.text, "dropping births item without a person page");
        return None;
    };

    let Some(page_id) = page.pageid else {
        debug!(text = ?item.text, "dropping births item whose person page has no page id");
        return None;
    };

    let Some(year) = item.year else {
        debug!(page_id, "dropping births item without a year");
        return None;
    };

    let full_name = page
        .titles
        .as_ref()
        .and_then(|titles| titles.normalized.clone())
        .unwrap_or_default();

    Some(Person::new(
        PersonId::from_page_id(page_id),
        year,
        full_name,
        page.description.clone(),
        page.thumbnail.as_ref().map(image_ref),
        page.originalimage.as_ref().map(image_ref),
    ))
}

/// Normalizes a whole fetch, preserving feed order. A page id seen twice keeps
/// its first occurrence so ids stay unique within one snapshot.
pub fn normalize_all(items: &[RawBirth]) -> Vec<Person> {
    let mut seen = HashSet::new();
    let people: Vec<Person> = items
        .iter()
        .filter_map(normalize)
        .filter(|person| {
            let fresh = seen.insert(person.id().clone());
            if !fresh {
                debug!(id = %person.id(), "dropping duplicate births item");
            }
            fresh
        })
        .collect();
    debug!(
        received = items.len(),
        kept = people.len(),
        "normalized births items"
    );
    people
}

fn image_ref(image: &RawImage) -> ImageRef {
    ImageRef {
        width: image.width,
        height: image.height,
        source_url: image.source.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawBirth {
        RawBirth::from_value(value)
    }

    fn frankie_jonas() -> RawBirth {
        raw(json!({
            "year": 2000,
            "pages": [
                {
                    "type": "standard",
                    "titles": { "normalized": "January 1" },
                    "description": "Day of the year"
                },
                {
                    "pageid": 4077,
                    "type": "standard",
                    "titles": { "normalized": "Frankie Jonas" },
                    "description": "American singer, actor, member of the Jonas Family (born 2000)"
                }
            ]
        }))
    }

    #[test]
    fn picks_person_page_after_date_page() {
        let person = normalize(&frankie_jonas()).expect("person");
        assert_eq!(person.id().as_str(), "pageid-4077");
        assert_eq!(person.year(), 2000);
        assert_eq!(person.full_name(), "Frankie Jonas");
        assert_eq!(
            person.description(),
            Some("American singer, actor, member of the Jonas Family (born 2000)")
        );
        assert_eq!(person.sort_key(), "jonas");
    }

    #[test]
    fn malformed_sibling_pages_do_not_hide_the_person() {
        let item = raw(json!({
            "year": 2000,
            "pages": [
                null,
                { "type": "standard", "description": "Day of the year" },
                {
                    "pageid": 4077,
                    "type": "standard",
                    "titles": { "normalized": "Frankie Jonas" },
                    "description": "American singer"
                }
            ]
        }));
        let person = normalize(&item).expect("person");
        assert_eq!(person.id().as_str(), "pageid-4077");
        assert_eq!(person.full_name(), "Frankie Jonas");
    }

    #[test]
    fn skips_item_with_only_date_pages() {
        let item = raw(json!({
            "year": 1950,
            "pages": [
                { "pageid": 1, "type": "standard", "description": "Day of the year" },
                { "pageid": 2, "type": "disambiguation", "description": "Topics" }
            ]
        }));
        assert_eq!(normalize(&item), None);
    }

    #[test]
    fn skips_item_without_pages_or_page_id() {
        assert_eq!(normalize(&raw(json!({ "text": "Frankie Jonas, ...", "year": 2000 }))), None);
        assert_eq!(
            normalize(&raw(json!({
                "year": 2000,
                "pages": [{ "type": "standard", "description": "Singer" }]
            }))),
            None
        );
    }

    #[test]
    fn skips_item_without_year() {
        let item = raw(json!({
            "pages": [{ "pageid": 7, "type": "standard", "description": "Singer" }]
        }));
        assert_eq!(normalize(&item), None);
    }

    #[test]
    fn maps_images() {
        let item = raw(json!({
            "year": 1882,
            "pages": [{
                "pageid": 9,
                "type": "standard",
                "titles": { "normalized": "Virginia Woolf" },
                "description": "English writer",
                "thumbnail": { "source": "https://img/t.jpg", "width": 200, "height": 300 },
                "originalimage": { "source": "https://img/o.jpg", "width": 800, "height": 1200 }
            }]
        }));
        let person = normalize(&item).expect("person");
        assert_eq!(
            person.thumbnail(),
            Some(&ImageRef {
                width: 200,
                height: 300,
                source_url: "https://img/t.jpg".into()
            })
        );
        assert_eq!(person.image().map(|i| i.width), Some(800));
    }

    #[test]
    fn normalize_all_keeps_order_and_drops_skips_and_duplicates() {
        let person = |id: i64, name: &str, year: i32| {
            raw(json!({
                "year": year,
                "pages": [{ "pageid": id, "type": "standard", "titles": { "normalized": name } }]
            }))
        };
        let items = vec![
            person(3, "Zed Zulu", 1900),
            raw(json!({ "year": 1901 })),
            person(1, "Amy Alpha", 1800),
            person(3, "Zed Zulu", 1900),
            frankie_jonas(),
        ];

        let ids: Vec<String> = normalize_all(&items)
            .iter()
            .map(|p| p.id().to_string())
            .collect();
        assert_eq!(ids, vec!["pageid-3", "pageid-1", "pageid-4077"]);
    }
}
