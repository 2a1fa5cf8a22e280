use crate::config::ApiConfig;
use crate::grouping::{Grouped, group_games, group_players, group_teams, sort_by_date_desc};
use crate::stats::DashboardStats;
use crate::{
    Ad, Gallery, Game, GameStatus, League, News, Player, Ranking, Record, Referee, Resource, Team,
    Tournament, User,
};
use log::{debug, warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub type ApiResult<T> = Result<T, ApiError>;

pub const GENERIC_SAVE_ERROR: &str = "Failed to save. Please try again.";
pub const GENERIC_DELETE_ERROR: &str = "Failed to delete. Please try again.";

/// Games are always listed with their referee embedded.
const GAMES_QUERY: &str = "include=referee";

/// Number of finished games shown on the dashboard.
const RECENT_RESULTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error for {1}: {0}")]
    Network(#[source] reqwest::Error, String),
    #[error("Request to {1} failed with status {0}")]
    Fetch(u16, String),
    #[error("Server rejected the request ({0}): {1}")]
    Rejected(u16, String),
    #[error("Parse error for {1}: {0}")]
    Parsing(#[source] reqwest::Error, String),
    #[error("Could not encode request body: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ApiError {
    /// Text shown inline next to the view or form that failed.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(..) => "Could not reach the server. Check your connection.".into(),
            ApiError::Fetch(status, _) => format!("Failed to load data (HTTP {status})."),
            ApiError::Rejected(_, message) => message.clone(),
            ApiError::Parsing(..) => "The server sent data that could not be read.".into(),
            ApiError::Encoding(_) => "Could not prepare the request.".into(),
        }
    }
}

/// Lists may come bare or wrapped as `{"data": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Body<T> {
    Enveloped { data: T },
    Bare(T),
}

impl<T> Body<T> {
    fn into_inner(self) -> T {
        match self {
            Body::Enveloped { data } => data,
            Body::Bare(data) => data,
        }
    }
}

#[derive(Deserialize)]
struct ServerMessage {
    #[serde(default)]
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Page snapshots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub stats: DashboardStats,
    /// Most recent completed games, newest first.
    pub recent_results: Vec<Game>,
    pub live_games: Vec<Game>,
    pub teams: Vec<Team>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fixtures {
    pub games: Vec<Game>,
    pub leagues: Vec<League>,
    pub tournaments: Vec<Tournament>,
    pub teams: Vec<Team>,
}

impl Fixtures {
    /// Group `games` (usually a filtered subset) with this snapshot's lookups.
    pub fn grouped(&self, games: &[Game]) -> Grouped<Game> {
        group_games(games, &self.leagues, &self.tournaments)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Standings {
    pub rankings: Vec<Ranking>,
    pub leagues: Vec<League>,
    pub teams: Vec<Team>,
}

impl Standings {
    /// Rankings for one league; `None` keeps every row.
    pub fn for_league(&self, league_id: Option<u64>) -> Vec<Ranking> {
        self.rankings
            .iter()
            .filter(|r| league_id.is_none() || r.league_id == league_id)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rosters {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub leagues: Vec<League>,
    pub tournaments: Vec<Tournament>,
}

impl Rosters {
    pub fn teams_grouped(&self) -> Grouped<Team> {
        group_teams(&self.teams, &self.leagues, &self.tournaments)
    }

    pub fn players_grouped(&self, players: &[Player]) -> Grouped<Player> {
        group_players(players, &self.teams, &self.leagues, &self.tournaments)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub id: u64,
    pub label: String,
}

/// Choices for the foreign-key fields of the editors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormOptions {
    pub tournaments: Vec<SelectOption>,
    pub leagues: Vec<SelectOption>,
    pub teams: Vec<SelectOption>,
    pub referees: Vec<SelectOption>,
}

impl FormOptions {
    pub fn for_resource(&self, resource: Resource) -> &[SelectOption] {
        match resource {
            Resource::Tournaments => &self.tournaments,
            Resource::Leagues => &self.leagues,
            Resource::Teams => &self.teams,
            Resource::Referees => &self.referees,
            _ => &[],
        }
    }

    pub fn label(&self, resource: Resource, id: u64) -> Option<&str> {
        self.for_resource(resource)
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.label.as_str())
    }
}

fn options<T>(items: &[T], id: impl Fn(&T) -> u64, label: impl Fn(&T) -> String) -> Vec<SelectOption> {
    let mut options: Vec<SelectOption> =
        items.iter().map(|item| SelectOption { id: id(item), label: label(item) }).collect();
    options.sort_by(|a, b| a.label.cmp(&b.label));
    options
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// REST client for the league backend.
#[derive(Debug, Clone)]
pub struct LeagueApi {
    client: Client,
    config: ApiConfig,
}

impl Default for LeagueApi {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

impl LeagueApi {
    pub fn new(config: ApiConfig) -> Self {
        let mut builder = Client::builder().user_agent("handball-tui/0.1 (league admin)");
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Self { client: builder.build().unwrap_or_default(), config }
    }

    /// GET `{base}/{path}` and decode the JSON body.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.config.url(path);
        debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Fetch(status.as_u16(), url));
        }
        response
            .json::<Body<T>>()
            .await
            .map(Body::into_inner)
            .map_err(|e| ApiError::Parsing(e, url))
    }

    pub async fn list<T: DeserializeOwned>(&self, resource: Resource) -> ApiResult<Vec<T>> {
        self.fetch(resource.path()).await
    }

    /// List with a raw query string such as `include=referee`.
    pub async fn list_with<T: DeserializeOwned>(&self, resource: Resource, query: &str) -> ApiResult<Vec<T>> {
        if query.is_empty() {
            return self.list(resource).await;
        }
        self.fetch(&format!("{}?{query}", resource.path())).await
    }

    pub async fn get<T: DeserializeOwned>(&self, resource: Resource, id: u64) -> ApiResult<T> {
        self.fetch(&format!("{}/{id}", resource.path())).await
    }

    /// Like `list`, but a failure logs a warning and yields an empty list.
    pub async fn list_or_empty<T: DeserializeOwned>(&self, resource: Resource) -> Vec<T> {
        self.list(resource).await.unwrap_or_else(|e| {
            warn!("{} unavailable: {e}", resource.label());
            Vec::new()
        })
    }

    async fn games(&self) -> ApiResult<Vec<Game>> {
        self.list_with(Resource::Games, GAMES_QUERY).await
    }

    /// POST a new record.
    pub async fn create<P: Serialize>(&self, resource: Resource, payload: &P) -> ApiResult<()> {
        self.send_json(Method::POST, resource.path(), payload).await
    }

    /// PUT over an existing record.
    pub async fn update<P: Serialize>(&self, resource: Resource, id: u64, payload: &P) -> ApiResult<()> {
        self.send_json(Method::PUT, &format!("{}/{id}", resource.path()), payload).await
    }

    pub async fn delete(&self, resource: Resource, id: u64) -> ApiResult<()> {
        let url = self.config.url(&format!("{}/{id}", resource.path()));
        debug!("DELETE {url}");
        let response = self
            .client
            .delete(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejection(response, GENERIC_DELETE_ERROR).await)
        }
    }

    async fn send_json<P: Serialize>(&self, method: Method, path: &str, payload: &P) -> ApiResult<()> {
        let body = serde_json::to_vec(payload)?;
        let url = self.config.url(path);
        debug!("{method} {url}");
        let response = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejection(response, GENERIC_SAVE_ERROR).await)
        }
    }

    /// Any collection as `Record`s for the admin list.
    pub async fn list_records(&self, resource: Resource) -> ApiResult<Vec<Record>> {
        fn wrap<T>(items: Vec<T>, f: fn(T) -> Record) -> Vec<Record> {
            items.into_iter().map(f).collect()
        }
        Ok(match resource {
            Resource::Tournaments => wrap(self.list::<Tournament>(resource).await?, Record::Tournament),
            Resource::Leagues => wrap(self.list::<League>(resource).await?, Record::League),
            Resource::Teams => wrap(self.list::<Team>(resource).await?, Record::Team),
            Resource::Players => wrap(self.list::<Player>(resource).await?, Record::Player),
            Resource::Games => wrap(self.games().await?, Record::Game),
            Resource::Rankings => wrap(self.list::<Ranking>(resource).await?, Record::Ranking),
            Resource::Referees => wrap(self.list::<Referee>(resource).await?, Record::Referee),
            Resource::News => wrap(self.list::<News>(resource).await?, Record::News),
            Resource::Galleries => wrap(self.list::<Gallery>(resource).await?, Record::Gallery),
            Resource::Ads => wrap(self.list::<Ad>(resource).await?, Record::Ad),
            Resource::Users => wrap(self.list::<User>(resource).await?, Record::User),
        })
    }

    /// One record by id, wrapped like the admin list rows.
    pub async fn get_record(&self, resource: Resource, id: u64) -> ApiResult<Record> {
        Ok(match resource {
            Resource::Tournaments => Record::Tournament(self.get(resource, id).await?),
            Resource::Leagues => Record::League(self.get(resource, id).await?),
            Resource::Teams => Record::Team(self.get(resource, id).await?),
            Resource::Players => Record::Player(self.get(resource, id).await?),
            Resource::Games => Record::Game(self.get(resource, id).await?),
            Resource::Rankings => Record::Ranking(self.get(resource, id).await?),
            Resource::Referees => Record::Referee(self.get(resource, id).await?),
            Resource::News => Record::News(self.get(resource, id).await?),
            Resource::Galleries => Record::Gallery(self.get(resource, id).await?),
            Resource::Ads => Record::Ad(self.get(resource, id).await?),
            Resource::Users => Record::User(self.get(resource, id).await?),
        })
    }

    /// The record being edited and the dropdown options, fetched together.
    /// Only the record is required.
    pub async fn edit_form(&self, resource: Resource, id: u64) -> ApiResult<(Record, FormOptions)> {
        let (record, options) = futures_util::join!(self.get_record(resource, id), self.form_options());
        Ok((record?, options))
    }

    // -----------------------------------------------------------------------
    // Snapshots: every collection a page needs, fetched concurrently
    // -----------------------------------------------------------------------

    /// Counters never fail as a whole; a missing collection counts as empty.
    pub async fn dashboard(&self) -> Dashboard {
        let (tournaments, leagues, teams, players, games, referees) = futures_util::join!(
            self.list_or_empty::<Tournament>(Resource::Tournaments),
            self.list_or_empty::<League>(Resource::Leagues),
            self.list_or_empty::<Team>(Resource::Teams),
            self.list_or_empty::<Player>(Resource::Players),
            self.list_or_empty::<Game>(Resource::Games),
            self.list_or_empty::<Referee>(Resource::Referees),
        );
        let stats =
            DashboardStats::from_collections(&tournaments, &leagues, &teams, &players, &games, &referees);

        let mut recent_results: Vec<Game> =
            games.iter().filter(|g| g.status == GameStatus::Completed).cloned().collect();
        sort_by_date_desc(&mut recent_results, |g| g.match_date.as_deref());
        recent_results.truncate(RECENT_RESULTS);
        let live_games = games.into_iter().filter(Game::is_live).collect();

        Dashboard { stats, recent_results, live_games, teams }
    }

    /// Games are required; lookups degrade to empty and land in sentinel groups.
    pub async fn fixtures(&self) -> ApiResult<Fixtures> {
        let (games, leagues, tournaments, teams) = futures_util::join!(
            self.games(),
            self.list_or_empty::<League>(Resource::Leagues),
            self.list_or_empty::<Tournament>(Resource::Tournaments),
            self.list_or_empty::<Team>(Resource::Teams),
        );
        Ok(Fixtures { games: games?, leagues, tournaments, teams })
    }

    pub async fn standings(&self) -> ApiResult<Standings> {
        let (rankings, leagues, teams) = futures_util::join!(
            self.list::<Ranking>(Resource::Rankings),
            self.list_or_empty::<League>(Resource::Leagues),
            self.list_or_empty::<Team>(Resource::Teams),
        );
        Ok(Standings { rankings: rankings?, leagues, teams })
    }

    pub async fn rosters(&self) -> ApiResult<Rosters> {
        let (players, teams, leagues, tournaments) = futures_util::join!(
            self.list_or_empty::<Player>(Resource::Players),
            self.list::<Team>(Resource::Teams),
            self.list_or_empty::<League>(Resource::Leagues),
            self.list_or_empty::<Tournament>(Resource::Tournaments),
        );
        Ok(Rosters { players, teams: teams?, leagues, tournaments })
    }

    /// Published articles first, newest first.
    pub async fn news(&self) -> ApiResult<Vec<News>> {
        let mut news: Vec<News> = self.list(Resource::News).await?;
        sort_by_date_desc(&mut news, |n| n.published_at.as_deref());
        news.sort_by_key(|n| n.status != "published");
        Ok(news)
    }

    pub async fn form_options(&self) -> FormOptions {
        let (tournaments, leagues, teams, referees) = futures_util::join!(
            self.list_or_empty::<Tournament>(Resource::Tournaments),
            self.list_or_empty::<League>(Resource::Leagues),
            self.list_or_empty::<Team>(Resource::Teams),
            self.list_or_empty::<Referee>(Resource::Referees),
        );
        FormOptions {
            tournaments: options(&tournaments, |t| t.id, |t| t.name.clone()),
            leagues: options(&leagues, |l| l.id, |l| match &l.tournament {
                Some(t) if !t.name.is_empty() => format!("{} ({})", l.name, t.name),
                _ => l.name.clone(),
            }),
            teams: options(&teams, |t| t.id, |t| t.name.clone()),
            referees: options(&referees, |r| r.id, |r| format!("{} [{}]", r.name, r.license_number)),
        }
    }
}

/// Server-provided `message` if the body has one, else the generic text.
async fn rejection(response: Response, fallback: &str) -> ApiError {
    let status = response.status().as_u16();
    let message = response
        .json::<ServerMessage>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_owned());
    warn!("request rejected with {status}: {message}");
    ApiError::Rejected(status, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_and_bare_lists_decode_the_same() {
        let bare: Body<Vec<Team>> = serde_json::from_str(r#"[{"id":1,"name":"Sharks"}]"#).unwrap();
        let wrapped: Body<Vec<Team>> =
            serde_json::from_str(r#"{"data":[{"id":1,"name":"Sharks"}]}"#).unwrap();
        assert_eq!(bare.into_inner(), wrapped.into_inner());
    }

    #[test]
    fn single_object_without_envelope_decodes() {
        let team: Body<Team> = serde_json::from_str(r#"{"id":4,"name":"Wolves"}"#).unwrap();
        assert_eq!(team.into_inner().name, "Wolves");
    }

    #[test]
    fn user_messages_are_short() {
        assert_eq!(ApiError::Fetch(500, "x".into()).user_message(), "Failed to load data (HTTP 500).");
        assert_eq!(
            ApiError::Rejected(422, GENERIC_SAVE_ERROR.into()).user_message(),
            "Failed to save. Please try again."
        );
    }

    #[test]
    fn options_are_sorted_by_label() {
        let teams = vec![
            Team { id: 1, name: "Wolves".into(), ..Default::default() },
            Team { id: 2, name: "Bears".into(), ..Default::default() },
        ];
        let opts = options(&teams, |t| t.id, |t| t.name.clone());
        assert_eq!(opts[0], SelectOption { id: 2, label: "Bears".into() });
        let form = FormOptions { teams: opts, ..Default::default() };
        assert_eq!(form.label(Resource::Teams, 1), Some("Wolves"));
        assert!(form.for_resource(Resource::News).is_empty());
    }

    #[test]
    fn standings_filter_by_league() {
        let standings = Standings {
            rankings: vec![
                Ranking { id: 1, league_id: Some(1), ..Default::default() },
                Ranking { id: 2, league_id: Some(2), ..Default::default() },
            ],
            ..Default::default()
        };
        assert_eq!(standings.for_league(Some(2)).len(), 1);
        assert_eq!(standings.for_league(None).len(), 2);
    }
}
