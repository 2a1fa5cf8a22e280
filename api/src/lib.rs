pub mod client;
pub mod config;
pub mod filter;
pub mod form;
pub mod grouping;
pub mod stats;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types: records exactly as the league API serves them
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Parent tournament as embedded by the API when a league is eager-loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentRef {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub tournament_id: Option<u64>,
    #[serde(default)]
    pub tournament: Option<TournamentRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub league_id: Option<u64>,
    #[serde(default)]
    pub coach: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub team_id: Option<u64>,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub jersey_number: Option<u32>,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub matches_played: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
    Postponed,
    Cancelled,
}

impl GameStatus {
    pub const ALL: [GameStatus; 5] = [
        GameStatus::Scheduled,
        GameStatus::Live,
        GameStatus::Completed,
        GameStatus::Postponed,
        GameStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Scheduled => "scheduled",
            GameStatus::Live => "live",
            GameStatus::Completed => "completed",
            GameStatus::Postponed => "postponed",
            GameStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameStatus::Scheduled => "Scheduled",
            GameStatus::Live => "Live",
            GameStatus::Completed => "Completed",
            GameStatus::Postponed => "Postponed",
            GameStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        GameStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    #[serde(default)]
    pub league_id: Option<u64>,
    #[serde(default)]
    pub home_team_id: Option<u64>,
    #[serde(default)]
    pub away_team_id: Option<u64>,
    #[serde(default)]
    pub match_date: Option<String>,
    #[serde(default)]
    pub status: GameStatus,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    #[serde(default)]
    pub referee_id: Option<u64>,
    #[serde(default)]
    pub venue: Option<String>,
    /// Present when fetched with `?include=referee`.
    #[serde(default)]
    pub referee: Option<Referee>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HomeWin,
    AwayWin,
    Draw,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::HomeWin => "Home Win",
            Outcome::AwayWin => "Away Win",
            Outcome::Draw => "Draw",
        }
    }
}

impl Game {
    pub fn is_live(&self) -> bool {
        self.status == GameStatus::Live
    }

    /// Result of a completed game. None until both scores are in.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.status != GameStatus::Completed {
            return None;
        }
        let (home, away) = self.home_score.zip(self.away_score)?;
        Some(match home.cmp(&away) {
            std::cmp::Ordering::Greater => Outcome::HomeWin,
            std::cmp::Ordering::Less => Outcome::AwayWin,
            std::cmp::Ordering::Equal => Outcome::Draw,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub id: u64,
    #[serde(default)]
    pub league_id: Option<u64>,
    #[serde(default)]
    pub team_id: Option<u64>,
    #[serde(default)]
    pub played: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub goals_for: u32,
    #[serde(default)]
    pub goals_against: u32,
    /// Server-stored value. `stats::points` is only a preview.
    #[serde(default)]
    pub points: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefereeLevel {
    #[default]
    Regional,
    National,
    International,
}

impl RefereeLevel {
    pub const ALL: [RefereeLevel; 3] =
        [RefereeLevel::Regional, RefereeLevel::National, RefereeLevel::International];

    pub fn as_str(&self) -> &'static str {
        match self {
            RefereeLevel::Regional => "regional",
            RefereeLevel::National => "national",
            RefereeLevel::International => "international",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        RefereeLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Referee {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub tournament_id: Option<u64>,
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub level: RefereeLevel,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct News {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Vocabularies shared by filters and forms
// ---------------------------------------------------------------------------

pub const PLAYER_POSITIONS: &[&str] =
    &["goalkeeper", "left wing", "left back", "centre back", "right back", "right wing", "pivot"];
pub const NEWS_CATEGORIES: &[&str] =
    &["match report", "announcement", "transfer", "interview", "general"];
pub const PUBLISH_STATUSES: &[&str] = &["draft", "published", "archived"];
pub const GAME_STATUSES: &[&str] = &["scheduled", "live", "completed", "postponed", "cancelled"];
pub const REFEREE_LEVELS: &[&str] = &["regional", "national", "international"];
pub const GALLERY_CATEGORIES: &[&str] = &["match", "training", "event", "other"];
pub const AD_POSITIONS: &[&str] = &["header", "sidebar", "footer", "inline"];
pub const AD_STATUSES: &[&str] = &["active", "inactive", "scheduled"];
pub const USER_ROLES: &[&str] = &["admin", "editor", "viewer"];

// ---------------------------------------------------------------------------
// Resources: one per REST collection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    #[default]
    Tournaments,
    Leagues,
    Teams,
    Players,
    Games,
    Rankings,
    Referees,
    News,
    Galleries,
    Ads,
    Users,
}

impl Resource {
    pub const ALL: [Resource; 11] = [
        Resource::Tournaments,
        Resource::Leagues,
        Resource::Teams,
        Resource::Players,
        Resource::Games,
        Resource::Rankings,
        Resource::Referees,
        Resource::News,
        Resource::Galleries,
        Resource::Ads,
        Resource::Users,
    ];

    /// Collection path segment, relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Tournaments => "tournaments",
            Resource::Leagues => "leagues",
            Resource::Teams => "teams",
            Resource::Players => "players",
            Resource::Games => "games",
            Resource::Rankings => "rankings",
            Resource::Referees => "referees",
            Resource::News => "news",
            Resource::Galleries => "galleries",
            Resource::Ads => "ads",
            Resource::Users => "users",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resource::Tournaments => "Tournaments",
            Resource::Leagues => "Leagues",
            Resource::Teams => "Teams",
            Resource::Players => "Players",
            Resource::Games => "Games",
            Resource::Rankings => "Rankings",
            Resource::Referees => "Referees",
            Resource::News => "News",
            Resource::Galleries => "Galleries",
            Resource::Ads => "Ads",
            Resource::Users => "Users",
        }
    }

    /// Singular noun used in editor titles.
    pub fn noun(&self) -> &'static str {
        match self {
            Resource::Tournaments => "tournament",
            Resource::Leagues => "league",
            Resource::Teams => "team",
            Resource::Players => "player",
            Resource::Games => "game",
            Resource::Rankings => "ranking",
            Resource::Referees => "referee",
            Resource::News => "article",
            Resource::Galleries => "gallery",
            Resource::Ads => "ad",
            Resource::Users => "user",
        }
    }

    pub fn next(self) -> Self {
        let idx = Resource::ALL.iter().position(|r| *r == self).unwrap_or(0);
        Resource::ALL[(idx + 1) % Resource::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Resource::ALL.iter().position(|r| *r == self).unwrap_or(0);
        Resource::ALL[(idx + Resource::ALL.len() - 1) % Resource::ALL.len()]
    }

    /// Galleries, ads and users are list-and-delete only in this client.
    pub fn is_editable(&self) -> bool {
        !matches!(self, Resource::Galleries | Resource::Ads | Resource::Users)
    }
}

/// Any single entity, so admin lists can hold every collection in one type.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Tournament(Tournament),
    League(League),
    Team(Team),
    Player(Player),
    Game(Game),
    Ranking(Ranking),
    Referee(Referee),
    News(News),
    Gallery(Gallery),
    Ad(Ad),
    User(User),
}

impl Record {
    pub fn id(&self) -> u64 {
        match self {
            Record::Tournament(r) => r.id,
            Record::League(r) => r.id,
            Record::Team(r) => r.id,
            Record::Player(r) => r.id,
            Record::Game(r) => r.id,
            Record::Ranking(r) => r.id,
            Record::Referee(r) => r.id,
            Record::News(r) => r.id,
            Record::Gallery(r) => r.id,
            Record::Ad(r) => r.id,
            Record::User(r) => r.id,
        }
    }

    pub fn resource(&self) -> Resource {
        match self {
            Record::Tournament(_) => Resource::Tournaments,
            Record::League(_) => Resource::Leagues,
            Record::Team(_) => Resource::Teams,
            Record::Player(_) => Resource::Players,
            Record::Game(_) => Resource::Games,
            Record::Ranking(_) => Resource::Rankings,
            Record::Referee(_) => Resource::Referees,
            Record::News(_) => Resource::News,
            Record::Gallery(_) => Resource::Galleries,
            Record::Ad(_) => Resource::Ads,
            Record::User(_) => Resource::Users,
        }
    }

    /// One-line description for list rows.
    pub fn summary(&self) -> String {
        match self {
            Record::Tournament(t) => format!(
                "{}  {} → {}",
                t.name,
                t.start_date.as_deref().unwrap_or("?"),
                t.end_date.as_deref().unwrap_or("?")
            ),
            Record::League(l) => match &l.tournament {
                Some(parent) => format!("{}  ({})", l.name, parent.name),
                None => l.name.clone(),
            },
            Record::Team(t) => match &t.city {
                Some(city) => format!("{}  {city}", t.name),
                None => t.name.clone(),
            },
            Record::Player(p) => format!(
                "{}  {}  {}G {}A",
                p.name, p.position, p.goals, p.assists
            ),
            Record::Game(g) => format!(
                "#{}  {}  {}  {}-{}",
                g.id,
                g.match_date.as_deref().unwrap_or("TBD"),
                g.status.label(),
                g.home_score.map_or("-".to_string(), |s| s.to_string()),
                g.away_score.map_or("-".to_string(), |s| s.to_string()),
            ),
            Record::Ranking(r) => format!(
                "team {}  P{} W{} D{} L{}  {} pts",
                r.team_id.map_or("?".to_string(), |id| id.to_string()),
                r.played,
                r.wins,
                r.draws,
                r.losses,
                r.points
            ),
            Record::Referee(r) => format!(
                "{}  {}  {}{}",
                r.name,
                r.license_number,
                r.level.as_str(),
                if r.is_active { "" } else { "  (inactive)" }
            ),
            Record::News(n) => format!("{}  [{} / {}]", n.title, n.category, n.status),
            Record::Gallery(g) => format!("{}  [{} / {}]", g.title, g.category, g.status),
            Record::Ad(a) => format!("{}  [{} / {}]", a.title, a.position, a.status),
            Record::User(u) => format!("{}  <{}>  {}", u.name, u.email, u.role),
        }
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse the date formats the API emits: plain dates, SQL datetimes and
/// ISO-8601 timestamps with or without an offset.
pub fn parse_api_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_game_with_higher_home_score_is_home_win() {
        let game = Game {
            id: 1,
            status: GameStatus::Completed,
            home_score: Some(3),
            away_score: Some(1),
            ..Default::default()
        };
        assert_eq!(game.outcome(), Some(Outcome::HomeWin));
        assert_eq!(game.outcome().map(|o| o.label()), Some("Home Win"));
    }

    #[test]
    fn outcome_requires_completed_status_and_both_scores() {
        let live = Game {
            status: GameStatus::Live,
            home_score: Some(10),
            away_score: Some(9),
            ..Default::default()
        };
        assert_eq!(live.outcome(), None);

        let missing = Game {
            status: GameStatus::Completed,
            home_score: Some(10),
            ..Default::default()
        };
        assert_eq!(missing.outcome(), None);

        let draw = Game {
            status: GameStatus::Completed,
            home_score: Some(25),
            away_score: Some(25),
            ..Default::default()
        };
        assert_eq!(draw.outcome(), Some(Outcome::Draw));
    }

    #[test]
    fn game_deserializes_from_api_shape() {
        let raw = r#"{"id":7,"league_id":5,"home_team_id":1,"away_team_id":2,
            "match_date":"2024-03-01","status":"completed","home_score":31,"away_score":28,
            "referee_id":null}"#;
        let game: Game = serde_json::from_str(raw).expect("game should parse");
        assert_eq!(game.league_id, Some(5));
        assert_eq!(game.status, GameStatus::Completed);
        assert_eq!(game.referee_id, None);
        assert!(game.referee.is_none());
    }

    #[test]
    fn league_accepts_embedded_tournament_without_id() {
        let raw = r#"{"id":5,"name":"Premier","tournament":{"name":"Cup"}}"#;
        let league: League = serde_json::from_str(raw).expect("league should parse");
        assert_eq!(league.tournament.map(|t| t.name), Some("Cup".to_string()));
        assert_eq!(league.tournament_id, None);
    }

    #[test]
    fn parses_every_api_date_format() {
        assert!(parse_api_date("2024-03-01").is_some());
        assert!(parse_api_date("2024-03-01 18:30:00").is_some());
        assert!(parse_api_date("2024-03-01T18:30:00.000000Z").is_some());
        assert!(parse_api_date("2024-03-01T18:30:00").is_some());
        assert!(parse_api_date("not a date").is_none());
        assert!(parse_api_date("").is_none());
    }

    #[test]
    fn resource_cycle_wraps_both_ways() {
        assert_eq!(Resource::Users.next(), Resource::Tournaments);
        assert_eq!(Resource::Tournaments.prev(), Resource::Users);
        assert_eq!(Resource::Games.path(), "games");
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(GameStatus::parse("LIVE"), Some(GameStatus::Live));
        assert_eq!(GameStatus::parse("finished"), None);
        assert_eq!(RefereeLevel::parse(" National "), Some(RefereeLevel::National));
    }
}
