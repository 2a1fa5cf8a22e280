use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use handball_api::client::{Dashboard, Fixtures, FormOptions, Rosters, Standings};
use handball_api::form::FormMode;
use handball_api::{News, Record, Resource};

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkRequest {
    LoadDashboard,
    LoadFixtures,
    LoadStandings,
    LoadRosters,
    LoadNews,
    LoadCollection { resource: Resource },
    LoadFormOptions,
    /// Latest copy of a record to edit, plus the dropdown options.
    LoadRecord { resource: Resource, id: u64 },
    /// Validated payload, already encoded, for POST (create) or PUT (edit).
    Save { resource: Resource, mode: FormMode, body: serde_json::Value },
    Delete { resource: Resource, id: u64 },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    DashboardLoaded { dashboard: Dashboard },
    FixturesLoaded { fixtures: Fixtures },
    StandingsLoaded { standings: Standings },
    RostersLoaded { rosters: Rosters },
    NewsLoaded { news: Vec<News> },
    CollectionLoaded { resource: Resource, records: Vec<Record> },
    FormOptionsLoaded { options: FormOptions },
    RecordLoaded { record: Record, options: FormOptions },
    Saved { resource: Resource },
    Deleted { resource: Resource, id: u64 },
    /// The request that failed, so the error lands on the view that asked.
    Failed { request: NetworkRequest, message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    RefreshTick,
}
