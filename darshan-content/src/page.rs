use darshan_core::{Teaching, TeachingSummary, ViewerSession};
use log::{info, warn};
use serde::Serialize;

use crate::{ContentError, ContentSource};

/// What the detail page renders for a slug.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TeachingPage {
    Found {
        teaching: Teaching,
        related: Vec<TeachingSummary>,
    },
    /// The page shows its not-found state. Unauthorized slugs end up here too.
    NotFound,
}

impl TeachingPage {
    pub fn teaching(&self) -> Option<&Teaching> {
        match self {
            TeachingPage::Found { teaching, .. } => Some(teaching),
            TeachingPage::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, TeachingPage::Found { .. })
    }
}

/// Loads a teaching and the teachings related to it.
///
/// A teaching that can't be loaded renders as not found. A failing related list is
/// left empty rather than failing the page.
pub async fn load_teaching_page<S>(source: &S, slug: &str, session: &ViewerSession) -> TeachingPage
where
    S: ContentSource + ?Sized,
{
    let teaching = match source.teaching(slug, session).await {
        Ok(teaching) => teaching,
        Err(ContentError::NotFound) => {
            info!("Teaching {} was not found", slug);
            return TeachingPage::NotFound;
        }
        Err(e) => {
            warn!("Failed to load teaching {}: {}", slug, e);
            return TeachingPage::NotFound;
        }
    };

    let related = match source.related(&teaching, session).await {
        Ok(related) => related
            .into_iter()
            .filter(|r| r.id != teaching.id)
            .collect(),
        Err(e) => {
            warn!("Failed to load teachings related to {}: {}", slug, e);
            vec![]
        }
    };

    TeachingPage::Found { teaching, related }
}
