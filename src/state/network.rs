use crate::state::messages::{NetworkRequest, NetworkResponse};
use handball_api::client::{ApiResult, LeagueApi};
use handball_api::config::ApiConfig;
use handball_api::form::FormMode;
use log::{debug, error, info};
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

pub struct NetworkWorker {
    client: LeagueApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        config: ApiConfig,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        info!("using league API at {}", config.base_url);
        Self {
            client: LeagueApi::new(config),
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests are served one at a time, in the order they were sent.
    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = self.handle(request.clone()).await;

            debug!("network request complete: {request:?}");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| {
                error!("{err}");
                NetworkResponse::Failed { request, message: err.user_message() }
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle(&self, request: NetworkRequest) -> ApiResult<NetworkResponse> {
        Ok(match request {
            NetworkRequest::LoadDashboard => {
                NetworkResponse::DashboardLoaded { dashboard: self.client.dashboard().await }
            }
            NetworkRequest::LoadFixtures => {
                NetworkResponse::FixturesLoaded { fixtures: self.client.fixtures().await? }
            }
            NetworkRequest::LoadStandings => {
                NetworkResponse::StandingsLoaded { standings: self.client.standings().await? }
            }
            NetworkRequest::LoadRosters => {
                NetworkResponse::RostersLoaded { rosters: self.client.rosters().await? }
            }
            NetworkRequest::LoadNews => NetworkResponse::NewsLoaded { news: self.client.news().await? },
            NetworkRequest::LoadCollection { resource } => NetworkResponse::CollectionLoaded {
                resource,
                records: self.client.list_records(resource).await?,
            },
            NetworkRequest::LoadFormOptions => {
                NetworkResponse::FormOptionsLoaded { options: self.client.form_options().await }
            }
            NetworkRequest::LoadRecord { resource, id } => {
                let (record, options) = self.client.edit_form(resource, id).await?;
                NetworkResponse::RecordLoaded { record, options }
            }
            NetworkRequest::Save { resource, mode, body } => {
                match mode {
                    FormMode::Create => self.client.create(resource, &body).await?,
                    FormMode::Edit(id) => self.client.update(resource, id, &body).await?,
                }
                NetworkResponse::Saved { resource }
            }
            NetworkRequest::Delete { resource, id } => {
                self.client.delete(resource, id).await?;
                NetworkResponse::Deleted { resource, id }
            }
        })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state = LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
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
