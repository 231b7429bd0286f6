use async_trait::async_trait;
use darshan_core::deserialize_key;
use serde::{Deserialize, Serialize};

mod dispatcher;

pub use dispatcher::*;

use crate::ContentError;

/// The kinds of things the search modal looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchCategory {
    Teachings,
    Retreats,
    Courses,
    Products,
}

/// A single search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(deserialize_with = "deserialize_key")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Set by the client, since the API answers per category.
    #[serde(skip_deserializing, default = "default_category")]
    pub category: SearchCategory,
}

/// Results of a query, per category.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub teachings: Vec<SearchHit>,
    pub retreats: Vec<SearchHit>,
    pub courses: Vec<SearchHit>,
    pub products: Vec<SearchHit>,
}

/// Represents a type that can search a category
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        category: SearchCategory,
        query: &str,
    ) -> Result<Vec<SearchHit>, ContentError>;
}

impl SearchCategory {
    pub const ALL: [SearchCategory; 4] = [
        SearchCategory::Teachings,
        SearchCategory::Retreats,
        SearchCategory::Courses,
        SearchCategory::Products,
    ];

    /// The path segment of the category's search endpoint.
    pub fn path(&self) -> &'static str {
        match self {
            SearchCategory::Teachings => "teachings",
            SearchCategory::Retreats => "retreats",
            SearchCategory::Courses => "courses",
            SearchCategory::Products => "products",
        }
    }
}

impl SearchHit {
    pub fn in_category(mut self, category: SearchCategory) -> Self {
        self.category = category;
        self
    }
}

impl SearchResults {
    pub fn get(&self, category: SearchCategory) -> &[SearchHit] {
        match category {
            SearchCategory::Teachings => &self.teachings,
            SearchCategory::Retreats => &self.retreats,
            SearchCategory::Courses => &self.courses,
            SearchCategory::Products => &self.products,
        }
    }

    pub fn set(&mut self, category: SearchCategory, hits: Vec<SearchHit>) {
        match category {
            SearchCategory::Teachings => self.teachings = hits,
            SearchCategory::Retreats => self.retreats = hits,
            SearchCategory::Courses => self.courses = hits,
            SearchCategory::Products => self.products = hits,
        }
    }

    pub fn total(&self) -> usize {
        SearchCategory::ALL.iter().map(|c| self.get(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

fn default_category() -> SearchCategory {
    SearchCategory::Teachings
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_hit_parsing() {
        let hit: SearchHit =
            serde_json::from_str(r#"{ "id": 12, "title": "Silent Retreat", "slug": "silent" }"#)
                .unwrap();

        let hit = hit.in_category(SearchCategory::Retreats);

        assert_eq!(hit.id, "12");
        assert_eq!(hit.category, SearchCategory::Retreats);
    }

    #[test]
    fn test_results() {
        let mut results = SearchResults::default();
        assert!(results.is_empty());

        let hit = SearchHit {
            id: "1".to_string(),
            title: "Mala".to_string(),
            slug: None,
            thumbnail: None,
            category: SearchCategory::Products,
        };

        results.set(SearchCategory::Products, vec![hit.clone(), hit]);

        assert_eq!(results.total(), 2);
        assert_eq!(results.get(SearchCategory::Products).len(), 2);
        assert!(results.get(SearchCategory::Courses).is_empty());
    }
}
