//! Wire types for the paged character listing

use serde::{Deserialize, Serialize};

use crate::gallery::{Filterable, GalleryItem};

/// A location or origin reference; only the name is used
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// A character as returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u64,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub species: String,
    pub gender: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub location: NamedRef,
    #[serde(default)]
    pub origin: NamedRef,
    /// Episode URLs, e.g. `https://rickandmortyapi.com/api/episode/28`
    #[serde(default)]
    pub episode: Vec<String>,
}

impl Character {
    /// Minimal constructor used by the offline source and tests
    pub fn new(id: u64, name: &str, status: &str, gender: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            status: status.to_string(),
            species: "Human".to_string(),
            gender: gender.to_string(),
            image: String::new(),
            location: NamedRef::default(),
            origin: NamedRef::default(),
            episode: Vec::new(),
        }
    }
}

impl GalleryItem for Character {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Filterable for Character {
    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn gender(&self) -> &str {
        &self.gender
    }
}

/// Pagination block of a listing response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub pages: u32,
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

/// Raw listing response: `{ results: [...], info: { next: ... } }`
#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse<T> {
    pub results: Vec<T>,
    pub info: PageInfo,
}

/// Trait for paginated response types.
pub trait Paginated {
    /// The individual item type within a page.
    type Item;

    /// Returns the items from this page.
    fn into_items(self) -> Vec<Self::Item>;

    /// Returns whether more pages are available.
    fn has_more(&self) -> bool;
}

impl<T> Paginated for PageResponse<T> {
    type Item = T;

    fn into_items(self) -> Vec<T> {
        self.results
    }

    fn has_more(&self) -> bool {
        self.info.next.is_some()
    }
}

/// One upstream page, reduced to what the buffer needs
#[derive(Debug, Clone, PartialEq)]
pub struct PageBatch<T> {
    /// 1-based upstream page number
    pub page: u32,
    pub items: Vec<T>,
    /// Upstream signalled that a further page exists
    pub has_more: bool,
}

impl<T> PageBatch<T> {
    pub fn from_response<R>(page: u32, response: R) -> Self
    where
        R: Paginated<Item = T>,
    {
        let has_more = response.has_more();
        Self {
            page,
            items: response.into_items(),
            has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "info": {
            "count": 826,
            "pages": 42,
            "next": "https://rickandmortyapi.com/api/character?page=2",
            "prev": null
        },
        "results": [
            {
                "id": 1,
                "name": "Rick Sanchez",
                "status": "Alive",
                "species": "Human",
                "type": "",
                "gender": "Male",
                "origin": {
                    "name": "Earth (C-137)",
                    "url": "https://rickandmortyapi.com/api/location/1"
                },
                "location": {
                    "name": "Citadel of Ricks",
                    "url": "https://rickandmortyapi.com/api/location/3"
                },
                "image": "https://rickandmortyapi.com/api/character/avatar/1.jpeg",
                "episode": [
                    "https://rickandmortyapi.com/api/episode/1",
                    "https://rickandmortyapi.com/api/episode/2"
                ],
                "url": "https://rickandmortyapi.com/api/character/1",
                "created": "2017-11-04T18:48:46.250Z"
            }
        ]
    }"#;

    #[test]
    fn test_parse_listing_page() {
        let response: PageResponse<Character> = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(response.info.pages, 42);
        assert!(response.has_more());

        let batch = PageBatch::from_response(1, response);
        assert_eq!(batch.page, 1);
        assert!(batch.has_more);
        assert_eq!(batch.items.len(), 1);

        let rick = &batch.items[0];
        assert_eq!(rick.id, 1);
        assert_eq!(rick.origin.name, "Earth (C-137)");
        assert_eq!(rick.location.name, "Citadel of Ricks");
        assert_eq!(rick.episode.len(), 2);
    }

    #[test]
    fn test_last_page_has_no_more() {
        let body = r#"{
            "info": { "count": 1, "pages": 1, "next": null, "prev": null },
            "results": []
        }"#;
        let response: PageResponse<Character> = serde_json::from_str(body).unwrap();
        assert!(!response.has_more());
    }
}
