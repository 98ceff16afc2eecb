use crate::state::messages::{NetworkRequest, NetworkResponse};
use livescore_api::client::{ApiResult, DataSource};
use livescore_api::FavoritesStore;
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Serves fetch requests one at a time. Responses are not sequenced: a
/// later response simply replaces whatever the view shows.
pub struct NetworkWorker {
    source: Arc<dyn DataSource>,
    favorites: Arc<dyn FavoritesStore>,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        source: Arc<dyn DataSource>,
        favorites: Arc<dyn FavoritesStore>,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            source,
            favorites,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = self.handle(request).await;

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| {
                error!("fetch failed: {err}");
                NetworkResponse::Error { message: err.to_string() }
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle(&self, request: NetworkRequest) -> ApiResult<NetworkResponse> {
        match request {
            NetworkRequest::LoadMatches { view, filter } => {
                debug!("loading matches for {view:?}");
                let matches = self
                    .source
                    .fetch_filtered_matches(&filter, self.favorites.as_ref())
                    .await?;
                Ok(NetworkResponse::MatchesLoaded { view, matches })
            }
            NetworkRequest::LoadMatch { id } => {
                debug!("loading match {id}");
                let found = self.source.fetch_match_by_id(&id).await?;
                Ok(NetworkResponse::MatchLoaded { id, found })
            }
            NetworkRequest::LoadCatalog => {
                debug!("loading leagues and countries");
                let leagues = self.source.fetch_leagues().await?;
                let countries = self.source.fetch_countries().await?;
                Ok(NetworkResponse::CatalogLoaded { leagues, countries })
            }
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::MenuItem;
    use chrono::{TimeZone, Utc};
    use livescore_api::MatchFilter;
    use livescore_api::mock::MockSource;
    use livescore_api::store::{JsonStore, MemoryStore};

    fn worker() -> (mpsc::Sender<NetworkRequest>, mpsc::Receiver<NetworkResponse>, Arc<JsonStore<MemoryStore>>) {
        let (req_tx, req_rx) = mpsc::channel(8);
        let (resp_tx, resp_rx) = mpsc::channel(64);
        let source = MockSource::with_clock(11, || Utc.with_ymd_and_hms(2026, 10, 17, 15, 0, 0).unwrap());
        let favorites = Arc::new(JsonStore::new(MemoryStore::default()));
        let worker = NetworkWorker::new(Arc::new(source), favorites.clone(), req_rx, resp_tx);
        tokio::spawn(worker.run());
        (req_tx, resp_rx, favorites)
    }

    /// Next response that is not a spinner update.
    async fn next_payload(rx: &mut mpsc::Receiver<NetworkResponse>) -> NetworkResponse {
        loop {
            match rx.recv().await.expect("worker alive") {
                NetworkResponse::LoadingStateChanged { .. } => continue,
                other => return other,
            }
        }
    }

    #[tokio::test]
    async fn favorites_view_reads_the_shared_store() {
        let (tx, mut rx, favorites) = worker();
        favorites.add("3");
        tx.send(NetworkRequest::LoadMatches { view: MenuItem::Favorites, filter: MatchFilter::favorites() })
            .await
            .unwrap();

        match next_payload(&mut rx).await {
            NetworkResponse::MatchesLoaded { view, matches } => {
                assert_eq!(view, MenuItem::Favorites);
                let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
                assert_eq!(ids, vec!["3"]);
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_match_loads_as_not_found() {
        let (tx, mut rx, _) = worker();
        tx.send(NetworkRequest::LoadMatch { id: "404".into() }).await.unwrap();

        match next_payload(&mut rx).await {
            NetworkResponse::MatchLoaded { id, found } => {
                assert_eq!(id, "404");
                assert!(found.is_none());
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn catalog_loads_leagues_and_countries() {
        let (tx, mut rx, _) = worker();
        tx.send(NetworkRequest::LoadCatalog).await.unwrap();

        match next_payload(&mut rx).await {
            NetworkResponse::CatalogLoaded { leagues, countries } => {
                assert_eq!(leagues.len(), 6);
                assert_eq!(countries.len(), 6);
            }
            other => panic!("unexpected response {other:?}"),
        }
    }
}
