use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use futures_util::future::join_all;
use log::{debug, warn};
use serde::Serialize;
use tokio::{sync::watch, time::sleep};

use super::{SearchBackend, SearchCategory, SearchResults};

/// The configuration of the search modal
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// How long typing has to pause before a query is sent
    pub debounce: Duration,
    /// Queries shorter than this are not sent
    pub min_query_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_query_length: 1,
        }
    }
}

/// What the search modal shows.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SearchState {
    /// The sequence number of the query these results belong to.
    pub sequence: u64,
    pub query: String,
    /// True while the latest query hasn't been answered.
    pub loading: bool,
    pub results: SearchResults,
}

/// Debounced search over every category.
///
/// Each input is tagged with a monotonic sequence number. A debounce timer that was superseded
/// never sends its query, and a response whose sequence isn't the latest issued is discarded, so a
/// slow response can't overwrite a newer one.
pub struct Search<B> {
    backend: Arc<B>,
    config: SearchConfig,
    issued: Arc<AtomicU64>,
    state: Arc<watch::Sender<SearchState>>,
}

impl<B> Search<B>
where
    B: SearchBackend + 'static,
{
    pub fn new(backend: Arc<B>, config: SearchConfig) -> Self {
        let (state, _) = watch::channel(SearchState::default());

        Self {
            backend,
            config,
            issued: Default::default(),
            state: Arc::new(state),
        }
    }

    /// Receive state updates.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Returns the current state.
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Returns the sequence number of the latest input.
    pub fn latest(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Handles a keystroke, returning the sequence number of the input.
    ///
    /// Must be called within a tokio runtime.
    pub fn input(&self, query: &str) -> u64 {
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim().to_string();

        // Too short to search, so clear right away.
        if query.chars().count() < self.config.min_query_length.max(1) {
            publish(&self.state, &self.issued, sequence, |state| {
                *state = SearchState {
                    sequence,
                    ..Default::default()
                };
            });

            return sequence;
        }

        publish(&self.state, &self.issued, sequence, |state| {
            state.sequence = sequence;
            state.query = query.clone();
            state.loading = true;
        });

        let backend = self.backend.clone();
        let issued = self.issued.clone();
        let state = self.state.clone();
        let debounce = self.config.debounce;

        tokio::spawn(async move {
            sleep(debounce).await;

            // Another keystroke came in while waiting
            if issued.load(Ordering::SeqCst) != sequence {
                return;
            }

            let results = search_all(backend.as_ref(), &query).await;

            let published = publish(&state, &issued, sequence, |state| {
                state.loading = false;
                state.results = results;
            });

            if !published {
                debug!("Discarded stale results for query #{} ({})", sequence, query);
            }
        });

        sequence
    }
}

/// Queries every category at once. A failing category is shown as empty.
async fn search_all<B>(backend: &B, query: &str) -> SearchResults
where
    B: SearchBackend + ?Sized,
{
    let requests = SearchCategory::ALL.map(|category| async move {
        let hits = backend.search(category, query).await.unwrap_or_else(|e| {
            warn!("Search in {:?} failed: {}", category, e);
            vec![]
        });

        (category, hits)
    });

    let mut results = SearchResults::default();

    for (category, hits) in join_all(requests).await {
        results.set(category, hits);
    }

    results
}

/// Applies the update if the sequence is still the latest one issued.
fn publish<F>(
    state: &watch::Sender<SearchState>,
    issued: &AtomicU64,
    sequence: u64,
    update: F,
) -> bool
where
    F: FnOnce(&mut SearchState),
{
    state.send_if_modified(|current| {
        let is_latest = issued.load(Ordering::SeqCst) == sequence && current.sequence <= sequence;

        if is_latest {
            update(current);
        }

        is_latest
    })
}
