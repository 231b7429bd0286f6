use async_trait::async_trait;
use darshan_core::{Teaching, TeachingSummary, ViewerSession};
use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use url::Url;

use crate::{SearchBackend, SearchCategory, SearchHit};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Resource was not found")]
    NotFound,

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to fetch resource: {0}")]
    FetchError(String),

    #[error("Failed to parse resource: {0}")]
    ParseError(String),

    #[error("Invalid url: {0}")]
    InvalidUrl(String),
}

/// Represents a type that can fetch teachings for a viewer
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches a teaching by its slug, with the access type computed for the viewer.
    async fn teaching(&self, slug: &str, session: &ViewerSession)
        -> Result<Teaching, ContentError>;

    /// Fetches teachings related to the given one.
    async fn related(
        &self,
        teaching: &Teaching,
        session: &ViewerSession,
    ) -> Result<Vec<TeachingSummary>, ContentError>;
}

/// A client for the REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    client: Client,
}

/// The API wraps single resources in `data` on some endpoints.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Plain(T),
}

/// Lists come bare, or wrapped in `results` or `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Plain(Vec<T>),
    Results { results: Vec<T> },
    Data { data: Vec<T> },
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ContentError> {
        let base = Url::parse(base_url).map_err(|e| ContentError::InvalidUrl(e.to_string()))?;

        if base.cannot_be_a_base() {
            return Err(ContentError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            base,
            client: Client::new(),
        })
    }

    /// Builds the url of an endpoint below the base url. Segments are percent encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ContentError> {
        let mut url = self.base.clone();

        url.path_segments_mut()
            .map_err(|_| ContentError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn get_json<T>(&self, url: Url, session: Option<&ViewerSession>) -> Result<T, ContentError>
    where
        T: DeserializeOwned,
    {
        debug!("GET {}", url);

        let mut request = self.client.get(url);

        if let Some(token) = session.and_then(|s| s.access_token.as_deref()) {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ContentError::FetchError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(handle_unsuccessful_request(response, status).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ContentError::FetchError(e.to_string()))?;

        parse_json(&body)
    }
}

#[async_trait]
impl ContentSource for ApiClient {
    async fn teaching(
        &self,
        slug: &str,
        session: &ViewerSession,
    ) -> Result<Teaching, ContentError> {
        let url = self.endpoint(&["teachings", slug])?;
        let envelope: Envelope<Teaching> = self.get_json(url, Some(session)).await?;

        Ok(envelope.into_inner())
    }

    async fn related(
        &self,
        teaching: &Teaching,
        session: &ViewerSession,
    ) -> Result<Vec<TeachingSummary>, ContentError> {
        let url = self.endpoint(&["teachings", &teaching.id, "related"])?;
        let list: ListResponse<TeachingSummary> = self.get_json(url, Some(session)).await?;

        Ok(list.into_vec())
    }
}

#[async_trait]
impl SearchBackend for ApiClient {
    async fn search(
        &self,
        category: SearchCategory,
        query: &str,
    ) -> Result<Vec<SearchHit>, ContentError> {
        let mut url = self.endpoint(&["search", category.path()])?;
        url.query_pairs_mut().append_pair("q", query);

        let list: ListResponse<SearchHit> = self.get_json(url, None).await?;

        Ok(list
            .into_vec()
            .into_iter()
            .map(|hit| hit.in_category(category))
            .collect())
    }
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Plain(value) => value,
        }
    }
}

impl<T> ListResponse<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Plain(items) => items,
            ListResponse::Results { results } => results,
            ListResponse::Data { data } => data,
        }
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ContentError> {
    serde_json::from_str(body).map_err(|e| ContentError::ParseError(e.to_string()))
}

async fn handle_unsuccessful_request(response: Response, status: StatusCode) -> ContentError {
    if status == StatusCode::NOT_FOUND {
        return ContentError::NotFound;
    }

    let body = match response.text().await {
        Ok(text) => text,
        Err(e) => e.to_string(),
    };

    ContentError::Status {
        status: status.as_u16(),
        body,
    }
}
