//! Editable drafts for the admin screens.
//!
//! A draft holds every field as the text the user typed. `validate` coerces
//! it into the outgoing payload or collects every problem into one
//! `FieldErrors` map. Nothing here touches the network.

use crate::stats::{RankingPreview, points};
use crate::{
    GAME_STATUSES, GameStatus, NEWS_CATEGORIES, PLAYER_POSITIONS, PUBLISH_STATUSES, REFEREE_LEVELS,
    Record, RefereeLevel, Resource, parse_api_date,
};
use serde::Serialize;
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

// ---------------------------------------------------------------------------
// Field schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    /// Foreign key picked from another collection.
    Select(Resource),
    /// One of a fixed set of values.
    Choice(&'static [&'static str]),
    /// "yes" / "no".
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDef {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind, required: bool) -> FieldDef {
    FieldDef { key, label, kind, required }
}

pub const YES: &str = "yes";
pub const NO: &str = "no";

/// Field key → first validation message for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// Keeps the first message recorded for a field.
    pub fn insert(&mut self, key: &'static str, message: impl Into<String>) {
        self.0.entry(key).or_insert_with(|| message.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) {
        self.0.remove(key);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn absorb(&mut self, result: Result<(), ValidationErrors>) {
        let Err(errors) = result else {
            return;
        };
        for (key, list) in errors.field_errors() {
            if let Some(first) = list.first() {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{key} is invalid"));
                self.insert(key, message);
            }
        }
    }

    fn into_result<P>(self, payload: P) -> Result<P, FieldErrors> {
        if self.is_empty() { Ok(payload) } else { Err(self) }
    }
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

fn id_string(id: Option<u64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

fn required_text(errors: &mut FieldErrors, field: &FieldDef, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.insert(field.key, format!("{} is required", field.label));
    }
    value.to_owned()
}

fn select_id(errors: &mut FieldErrors, field: &FieldDef, value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() {
        if field.required {
            errors.insert(field.key, format!("Please select a {}", field.label.to_lowercase()));
        }
        return None;
    }
    match value.parse::<u64>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.insert(field.key, format!("Invalid {} selection", field.label.to_lowercase()));
            None
        }
    }
}

/// Non-negative whole number; an empty field counts as zero.
fn count(errors: &mut FieldErrors, field: &FieldDef, value: &str) -> u32 {
    optional_count(errors, field, value).unwrap_or(0)
}

fn optional_count(errors: &mut FieldErrors, field: &FieldDef, value: &str) -> Option<u32> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<i64>() {
        Ok(n) if n < 0 => {
            errors.insert(field.key, format!("{} must be zero or greater", field.label));
            None
        }
        Ok(n) => match u32::try_from(n) {
            Ok(n) => Some(n),
            Err(_) => {
                errors.insert(field.key, format!("{} is too large", field.label));
                None
            }
        },
        Err(_) => {
            errors.insert(field.key, format!("{} must be a whole number", field.label));
            None
        }
    }
}

fn date(errors: &mut FieldErrors, field: &FieldDef, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        if field.required {
            errors.insert(field.key, format!("{} is required", field.label));
        }
        return None;
    }
    if parse_api_date(value).is_none() {
        errors.insert(field.key, format!("{} must be a date like 2024-03-01", field.label));
        return None;
    }
    Some(value.to_owned())
}

fn choice(errors: &mut FieldErrors, field: &FieldDef, value: &str) -> String {
    let value = value.trim();
    let FieldKind::Choice(allowed) = field.kind else {
        return value.to_owned();
    };
    if value.is_empty() {
        if field.required {
            errors.insert(field.key, format!("{} is required", field.label));
        }
    } else if !allowed.iter().any(|a| a.eq_ignore_ascii_case(value)) {
        errors.insert(field.key, format!("{} must be one of: {}", field.label, allowed.join(", ")));
    }
    value.to_lowercase()
}

fn flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "yes" | "true" | "1" | "y")
}

fn flag_string(value: bool) -> String {
    if value { YES.to_owned() } else { NO.to_owned() }
}

fn field_def<D: Draft>(key: &str) -> &'static FieldDef {
    D::fields()
        .iter()
        .find(|f| f.key == key)
        .unwrap_or(&D::fields()[0])
}

// ---------------------------------------------------------------------------
// Draft trait
// ---------------------------------------------------------------------------

/// String-valued form state for one entity.
pub trait Draft: Default + Clone {
    type Payload: Serialize + Validate;

    const RESOURCE: Resource;

    fn fields() -> &'static [FieldDef];

    fn value(&self, key: &str) -> &str;

    fn set(&mut self, key: &str, value: String);

    /// Pre-fill from an existing record; foreign keys become strings.
    fn from_record(record: &Record) -> Option<Self>;

    fn validate(&self) -> Result<Self::Payload, FieldErrors>;

    /// Derived numbers shown beside the form while editing.
    fn preview(&self) -> Option<RankingPreview> {
        None
    }
}

// ---------------------------------------------------------------------------
// Tournament
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct TournamentPayload {
    #[validate(length(min = 3, message = "Tournament name must be at least 3 characters"))]
    pub name: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[validate(length(max = 120, message = "Location must be at most 120 characters"))]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TournamentDraft {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
}

const TOURNAMENT_FIELDS: &[FieldDef] = &[
    field("name", "Name", FieldKind::Text, true),
    field("start_date", "Start date", FieldKind::Date, true),
    field("end_date", "End date", FieldKind::Date, false),
    field("location", "Location", FieldKind::Text, false),
];

impl Draft for TournamentDraft {
    type Payload = TournamentPayload;
    const RESOURCE: Resource = Resource::Tournaments;

    fn fields() -> &'static [FieldDef] {
        TOURNAMENT_FIELDS
    }

    fn value(&self, key: &str) -> &str {
        match key {
            "name" => &self.name,
            "start_date" => &self.start_date,
            "end_date" => &self.end_date,
            "location" => &self.location,
            _ => "",
        }
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "name" => self.name = value,
            "start_date" => self.start_date = value,
            "end_date" => self.end_date = value,
            "location" => self.location = value,
            _ => {}
        }
    }

    fn from_record(record: &Record) -> Option<Self> {
        let Record::Tournament(t) = record else {
            return None;
        };
        Some(Self {
            name: t.name.clone(),
            start_date: t.start_date.clone().unwrap_or_default(),
            end_date: t.end_date.clone().unwrap_or_default(),
            location: t.location.clone().unwrap_or_default(),
        })
    }

    fn validate(&self) -> Result<TournamentPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        let payload = TournamentPayload {
            name: required_text(&mut errors, field_def::<Self>("name"), &self.name),
            start_date: date(&mut errors, field_def::<Self>("start_date"), &self.start_date),
            end_date: date(&mut errors, field_def::<Self>("end_date"), &self.end_date),
            location: optional_text(&self.location),
        };
        errors.absorb(payload.validate());

        let start = payload.start_date.as_deref().and_then(parse_api_date);
        let end = payload.end_date.as_deref().and_then(parse_api_date);
        if let (Some(start), Some(end)) = (start, end)
            && end < start
        {
            errors.insert("end_date", "End date cannot be before start date");
        }
        errors.into_result(payload)
    }
}

// ---------------------------------------------------------------------------
// League
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct LeaguePayload {
    #[validate(length(min = 2, message = "League name must be at least 2 characters"))]
    pub name: String,
    pub tournament_id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeagueDraft {
    pub name: String,
    pub tournament_id: String,
}

const LEAGUE_FIELDS: &[FieldDef] = &[
    field("name", "Name", FieldKind::Text, true),
    field("tournament_id", "Tournament", FieldKind::Select(Resource::Tournaments), true),
];

impl Draft for LeagueDraft {
    type Payload = LeaguePayload;
    const RESOURCE: Resource = Resource::Leagues;

    fn fields() -> &'static [FieldDef] {
        LEAGUE_FIELDS
    }

    fn value(&self, key: &str) -> &str {
        match key {
            "name" => &self.name,
            "tournament_id" => &self.tournament_id,
            _ => "",
        }
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "name" => self.name = value,
            "tournament_id" => self.tournament_id = value,
            _ => {}
        }
    }

    fn from_record(record: &Record) -> Option<Self> {
        let Record::League(l) = record else {
            return None;
        };
        let tournament_id = l.tournament_id.or_else(|| l.tournament.as_ref().and_then(|t| t.id));
        Some(Self { name: l.name.clone(), tournament_id: id_string(tournament_id) })
    }

    fn validate(&self) -> Result<LeaguePayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        let payload = LeaguePayload {
            name: required_text(&mut errors, field_def::<Self>("name"), &self.name),
            tournament_id: select_id(&mut errors, field_def::<Self>("tournament_id"), &self.tournament_id),
        };
        errors.absorb(payload.validate());
        errors.into_result(payload)
    }
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct TeamPayload {
    #[validate(length(min = 2, message = "Team name must be at least 2 characters"))]
    pub name: String,
    pub league_id: Option<u64>,
    #[validate(length(min = 2, message = "Coach name must be at least 2 characters"))]
    pub coach: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamDraft {
    pub name: String,
    pub league_id: String,
    pub coach: String,
    pub city: String,
}

const TEAM_FIELDS: &[FieldDef] = &[
    field("name", "Name", FieldKind::Text, true),
    field("league_id", "League", FieldKind::Select(Resource::Leagues), true),
    field("coach", "Coach", FieldKind::Text, false),
    field("city", "City", FieldKind::Text, false),
];

impl Draft for TeamDraft {
    type Payload = TeamPayload;
    const RESOURCE: Resource = Resource::Teams;

    fn fields() -> &'static [FieldDef] {
        TEAM_FIELDS
    }

    fn value(&self, key: &str) -> &str {
        match key {
            "name" => &self.name,
            "league_id" => &self.league_id,
            "coach" => &self.coach,
            "city" => &self.city,
            _ => "",
        }
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "name" => self.name = value,
            "league_id" => self.league_id = value,
            "coach" => self.coach = value,
            "city" => self.city = value,
            _ => {}
        }
    }

    fn from_record(record: &Record) -> Option<Self> {
        let Record::Team(t) = record else {
            return None;
        };
        Some(Self {
            name: t.name.clone(),
            league_id: id_string(t.league_id),
            coach: t.coach.clone().unwrap_or_default(),
            city: t.city.clone().unwrap_or_default(),
        })
    }

    fn validate(&self) -> Result<TeamPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        let payload = TeamPayload {
            name: required_text(&mut errors, field_def::<Self>("name"), &self.name),
            league_id: select_id(&mut errors, field_def::<Self>("league_id"), &self.league_id),
            coach: optional_text(&self.coach),
            city: optional_text(&self.city),
        };
        errors.absorb(payload.validate());
        errors.into_result(payload)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct PlayerPayload {
    #[validate(length(min = 2, message = "Player name must be at least 2 characters"))]
    pub name: String,
    pub team_id: Option<u64>,
    pub position: String,
    #[validate(range(min = 1, max = 99, message = "Jersey number must be between 1 and 99"))]
    pub jersey_number: Option<u32>,
    pub goals: u32,
    pub assists: u32,
    pub matches_played: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDraft {
    pub name: String,
    pub team_id: String,
    pub position: String,
    pub jersey_number: String,
    pub goals: String,
    pub assists: String,
    pub matches_played: String,
}

impl Default for PlayerDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            team_id: String::new(),
            position: String::new(),
            jersey_number: String::new(),
            goals: "0".into(),
            assists: "0".into(),
            matches_played: "0".into(),
        }
    }
}

const PLAYER_FIELDS: &[FieldDef] = &[
    field("name", "Name", FieldKind::Text, true),
    field("team_id", "Team", FieldKind::Select(Resource::Teams), true),
    field("position", "Position", FieldKind::Choice(PLAYER_POSITIONS), true),
    field("jersey_number", "Jersey number", FieldKind::Number, false),
    field("goals", "Goals", FieldKind::Number, false),
    field("assists", "Assists", FieldKind::Number, false),
    field("matches_played", "Matches played", FieldKind::Number, false),
];

impl Draft for PlayerDraft {
    type Payload = PlayerPayload;
    const RESOURCE: Resource = Resource::Players;

    fn fields() -> &'static [FieldDef] {
        PLAYER_FIELDS
    }

    fn value(&self, key: &str) -> &str {
        match key {
            "name" => &self.name,
            "team_id" => &self.team_id,
            "position" => &self.position,
            "jersey_number" => &self.jersey_number,
            "goals" => &self.goals,
            "assists" => &self.assists,
            "matches_played" => &self.matches_played,
            _ => "",
        }
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "name" => self.name = value,
            "team_id" => self.team_id = value,
            "position" => self.position = value,
            "jersey_number" => self.jersey_number = value,
            "goals" => self.goals = value,
            "assists" => self.assists = value,
            "matches_played" => self.matches_played = value,
            _ => {}
        }
    }

    fn from_record(record: &Record) -> Option<Self> {
        let Record::Player(p) = record else {
            return None;
        };
        Some(Self {
            name: p.name.clone(),
            team_id: id_string(p.team_id),
            position: p.position.clone(),
            jersey_number: p.jersey_number.map(|n| n.to_string()).unwrap_or_default(),
            goals: p.goals.to_string(),
            assists: p.assists.to_string(),
            matches_played: p.matches_played.to_string(),
        })
    }

    fn validate(&self) -> Result<PlayerPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        let payload = PlayerPayload {
            name: required_text(&mut errors, field_def::<Self>("name"), &self.name),
            team_id: select_id(&mut errors, field_def::<Self>("team_id"), &self.team_id),
            position: choice(&mut errors, field_def::<Self>("position"), &self.position),
            jersey_number: optional_count(&mut errors, field_def::<Self>("jersey_number"), &self.jersey_number),
            goals: count(&mut errors, field_def::<Self>("goals"), &self.goals),
            assists: count(&mut errors, field_def::<Self>("assists"), &self.assists),
            matches_played: count(&mut errors, field_def::<Self>("matches_played"), &self.matches_played),
        };
        errors.absorb(payload.validate());
        errors.into_result(payload)
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct GamePayload {
    pub league_id: Option<u64>,
    pub home_team_id: Option<u64>,
    pub away_team_id: Option<u64>,
    pub match_date: Option<String>,
    pub status: GameStatus,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub referee_id: Option<u64>,
    #[validate(length(max = 120, message = "Venue must be at most 120 characters"))]
    pub venue: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameDraft {
    pub league_id: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub match_date: String,
    pub status: String,
    pub home_score: String,
    pub away_score: String,
    pub referee_id: String,
    pub venue: String,
}

impl Default for GameDraft {
    fn default() -> Self {
        Self {
            league_id: String::new(),
            home_team_id: String::new(),
            away_team_id: String::new(),
            match_date: String::new(),
            status: GameStatus::Scheduled.as_str().to_owned(),
            home_score: String::new(),
            away_score: String::new(),
            referee_id: String::new(),
            venue: String::new(),
        }
    }
}

const GAME_FIELDS: &[FieldDef] = &[
    field("league_id", "League", FieldKind::Select(Resource::Leagues), true),
    field("home_team_id", "Home team", FieldKind::Select(Resource::Teams), true),
    field("away_team_id", "Away team", FieldKind::Select(Resource::Teams), true),
    field("match_date", "Match date", FieldKind::Date, true),
    field("status", "Status", FieldKind::Choice(GAME_STATUSES), true),
    field("home_score", "Home score", FieldKind::Number, false),
    field("away_score", "Away score", FieldKind::Number, false),
    field("referee_id", "Referee", FieldKind::Select(Resource::Referees), false),
    field("venue", "Venue", FieldKind::Text, false),
];

impl Draft for GameDraft {
    type Payload = GamePayload;
    const RESOURCE: Resource = Resource::Games;

    fn fields() -> &'static [FieldDef] {
        GAME_FIELDS
    }

    fn value(&self, key: &str) -> &str {
        match key {
            "league_id" => &self.league_id,
            "home_team_id" => &self.home_team_id,
            "away_team_id" => &self.away_team_id,
            "match_date" => &self.match_date,
            "status" => &self.status,
            "home_score" => &self.home_score,
            "away_score" => &self.away_score,
            "referee_id" => &self.referee_id,
            "venue" => &self.venue,
            _ => "",
        }
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "league_id" => self.league_id = value,
            "home_team_id" => self.home_team_id = value,
            "away_team_id" => self.away_team_id = value,
            "match_date" => self.match_date = value,
            "status" => self.status = value,
            "home_score" => self.home_score = value,
            "away_score" => self.away_score = value,
            "referee_id" => self.referee_id = value,
            "venue" => self.venue = value,
            _ => {}
        }
    }

    fn from_record(record: &Record) -> Option<Self> {
        let Record::Game(g) = record else {
            return None;
        };
        Some(Self {
            league_id: id_string(g.league_id),
            home_team_id: id_string(g.home_team_id),
            away_team_id: id_string(g.away_team_id),
            match_date: g.match_date.clone().unwrap_or_default(),
            status: g.status.as_str().to_owned(),
            home_score: g.home_score.map(|s| s.to_string()).unwrap_or_default(),
            away_score: g.away_score.map(|s| s.to_string()).unwrap_or_default(),
            referee_id: id_string(g.referee_id.or_else(|| g.referee.as_ref().map(|r| r.id))),
            venue: g.venue.clone().unwrap_or_default(),
        })
    }

    fn validate(&self) -> Result<GamePayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        let status_text = choice(&mut errors, field_def::<Self>("status"), &self.status);
        let payload = GamePayload {
            league_id: select_id(&mut errors, field_def::<Self>("league_id"), &self.league_id),
            home_team_id: select_id(&mut errors, field_def::<Self>("home_team_id"), &self.home_team_id),
            away_team_id: select_id(&mut errors, field_def::<Self>("away_team_id"), &self.away_team_id),
            match_date: date(&mut errors, field_def::<Self>("match_date"), &self.match_date),
            status: GameStatus::parse(&status_text).unwrap_or_default(),
            home_score: optional_count(&mut errors, field_def::<Self>("home_score"), &self.home_score),
            away_score: optional_count(&mut errors, field_def::<Self>("away_score"), &self.away_score),
            referee_id: select_id(&mut errors, field_def::<Self>("referee_id"), &self.referee_id),
            venue: optional_text(&self.venue),
        };
        errors.absorb(payload.validate());

        let home = self.home_team_id.trim();
        let away = self.away_team_id.trim();
        if !home.is_empty() && home == away {
            errors.insert("away_team_id", "Away team must be different from home team");
        }
        if payload.status == GameStatus::Completed {
            if self.home_score.trim().is_empty() {
                errors.insert("home_score", "Home score is required for completed games");
            }
            if self.away_score.trim().is_empty() {
                errors.insert("away_score", "Away score is required for completed games");
            }
        }
        errors.into_result(payload)
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct RankingPayload {
    pub league_id: Option<u64>,
    pub team_id: Option<u64>,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingDraft {
    pub league_id: String,
    pub team_id: String,
    pub played: String,
    pub wins: String,
    pub draws: String,
    pub losses: String,
    pub goals_for: String,
    pub goals_against: String,
}

impl Default for RankingDraft {
    fn default() -> Self {
        Self {
            league_id: String::new(),
            team_id: String::new(),
            played: "0".into(),
            wins: "0".into(),
            draws: "0".into(),
            losses: "0".into(),
            goals_for: "0".into(),
            goals_against: "0".into(),
        }
    }
}

const RANKING_FIELDS: &[FieldDef] = &[
    field("league_id", "League", FieldKind::Select(Resource::Leagues), true),
    field("team_id", "Team", FieldKind::Select(Resource::Teams), true),
    field("played", "Played", FieldKind::Number, true),
    field("wins", "Wins", FieldKind::Number, true),
    field("draws", "Draws", FieldKind::Number, true),
    field("losses", "Losses", FieldKind::Number, true),
    field("goals_for", "Goals for", FieldKind::Number, true),
    field("goals_against", "Goals against", FieldKind::Number, true),
];

impl Draft for RankingDraft {
    type Payload = RankingPayload;
    const RESOURCE: Resource = Resource::Rankings;

    fn fields() -> &'static [FieldDef] {
        RANKING_FIELDS
    }

    fn value(&self, key: &str) -> &str {
        match key {
            "league_id" => &self.league_id,
            "team_id" => &self.team_id,
            "played" => &self.played,
            "wins" => &self.wins,
            "draws" => &self.draws,
            "losses" => &self.losses,
            "goals_for" => &self.goals_for,
            "goals_against" => &self.goals_against,
            _ => "",
        }
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "league_id" => self.league_id = value,
            "team_id" => self.team_id = value,
            "played" => self.played = value,
            "wins" => self.wins = value,
            "draws" => self.draws = value,
            "losses" => self.losses = value,
            "goals_for" => self.goals_for = value,
            "goals_against" => self.goals_against = value,
            _ => {}
        }
    }

    fn from_record(record: &Record) -> Option<Self> {
        let Record::Ranking(r) = record else {
            return None;
        };
        Some(Self {
            league_id: id_string(r.league_id),
            team_id: id_string(r.team_id),
            played: r.played.to_string(),
            wins: r.wins.to_string(),
            draws: r.draws.to_string(),
            losses: r.losses.to_string(),
            goals_for: r.goals_for.to_string(),
            goals_against: r.goals_against.to_string(),
        })
    }

    /// Computed from whatever currently parses; unparseable fields count as zero.
    fn preview(&self) -> Option<RankingPreview> {
        let n = |v: &str| v.trim().parse::<u32>().unwrap_or(0);
        Some(RankingPreview::compute(
            n(&self.played),
            n(&self.wins),
            n(&self.draws),
            n(&self.goals_for),
            n(&self.goals_against),
        ))
    }

    fn validate(&self) -> Result<RankingPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        let wins = count(&mut errors, field_def::<Self>("wins"), &self.wins);
        let draws = count(&mut errors, field_def::<Self>("draws"), &self.draws);
        let payload = RankingPayload {
            league_id: select_id(&mut errors, field_def::<Self>("league_id"), &self.league_id),
            team_id: select_id(&mut errors, field_def::<Self>("team_id"), &self.team_id),
            played: count(&mut errors, field_def::<Self>("played"), &self.played),
            wins,
            draws,
            losses: count(&mut errors, field_def::<Self>("losses"), &self.losses),
            goals_for: count(&mut errors, field_def::<Self>("goals_for"), &self.goals_for),
            goals_against: count(&mut errors, field_def::<Self>("goals_against"), &self.goals_against),
            points: points(wins, draws),
        };
        errors.absorb(payload.validate());

        let sum = u64::from(payload.wins) + u64::from(payload.draws) + u64::from(payload.losses);
        if sum != u64::from(payload.played) {
            errors.insert("played", "Wins + draws + losses must equal matches played");
        }
        errors.into_result(payload)
    }
}

// ---------------------------------------------------------------------------
// Referee
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct RefereePayload {
    #[validate(length(min = 3, message = "Referee name must be at least 3 characters"))]
    pub name: String,
    pub tournament_id: Option<u64>,
    #[validate(length(min = 3, message = "License number must be at least 3 characters"))]
    pub license_number: String,
    pub level: RefereeLevel,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefereeDraft {
    pub name: String,
    pub tournament_id: String,
    pub license_number: String,
    pub level: String,
    pub is_active: String,
}

impl Default for RefereeDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            tournament_id: String::new(),
            license_number: String::new(),
            level: RefereeLevel::Regional.as_str().to_owned(),
            is_active: YES.to_owned(),
        }
    }
}

const REFEREE_FIELDS: &[FieldDef] = &[
    field("name", "Name", FieldKind::Text, true),
    field("license_number", "License number", FieldKind::Text, true),
    field("level", "Level", FieldKind::Choice(REFEREE_LEVELS), true),
    field("tournament_id", "Tournament", FieldKind::Select(Resource::Tournaments), false),
    field("is_active", "Active", FieldKind::Flag, false),
];

impl Draft for RefereeDraft {
    type Payload = RefereePayload;
    const RESOURCE: Resource = Resource::Referees;

    fn fields() -> &'static [FieldDef] {
        REFEREE_FIELDS
    }

    fn value(&self, key: &str) -> &str {
        match key {
            "name" => &self.name,
            "tournament_id" => &self.tournament_id,
            "license_number" => &self.license_number,
            "level" => &self.level,
            "is_active" => &self.is_active,
            _ => "",
        }
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "name" => self.name = value,
            "tournament_id" => self.tournament_id = value,
            "license_number" => self.license_number = value,
            "level" => self.level = value,
            "is_active" => self.is_active = value,
            _ => {}
        }
    }

    fn from_record(record: &Record) -> Option<Self> {
        let Record::Referee(r) = record else {
            return None;
        };
        Some(Self {
            name: r.name.clone(),
            tournament_id: id_string(r.tournament_id),
            license_number: r.license_number.clone(),
            level: r.level.as_str().to_owned(),
            is_active: flag_string(r.is_active),
        })
    }

    fn validate(&self) -> Result<RefereePayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        let level = choice(&mut errors, field_def::<Self>("level"), &self.level);
        let payload = RefereePayload {
            name: required_text(&mut errors, field_def::<Self>("name"), &self.name),
            tournament_id: select_id(&mut errors, field_def::<Self>("tournament_id"), &self.tournament_id),
            license_number: required_text(
                &mut errors,
                field_def::<Self>("license_number"),
                &self.license_number,
            ),
            level: RefereeLevel::parse(&level).unwrap_or_default(),
            is_active: flag(&self.is_active),
        };
        errors.absorb(payload.validate());
        errors.into_result(payload)
    }
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct NewsPayload {
    #[validate(length(min = 5, message = "Title must be at least 5 characters"))]
    pub title: String,
    #[validate(length(min = 20, message = "Content must be at least 20 characters"))]
    pub content: String,
    pub category: String,
    pub status: String,
    pub author: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    pub status: String,
    pub author: String,
    pub published_at: String,
}

impl Default for NewsDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            category: "general".into(),
            status: "draft".into(),
            author: String::new(),
            published_at: String::new(),
        }
    }
}

const NEWS_FIELDS: &[FieldDef] = &[
    field("title", "Title", FieldKind::Text, true),
    field("content", "Content", FieldKind::Text, true),
    field("category", "Category", FieldKind::Choice(NEWS_CATEGORIES), true),
    field("status", "Status", FieldKind::Choice(PUBLISH_STATUSES), true),
    field("author", "Author", FieldKind::Text, false),
    field("published_at", "Published at", FieldKind::Date, false),
];

impl Draft for NewsDraft {
    type Payload = NewsPayload;
    const RESOURCE: Resource = Resource::News;

    fn fields() -> &'static [FieldDef] {
        NEWS_FIELDS
    }

    fn value(&self, key: &str) -> &str {
        match key {
            "title" => &self.title,
            "content" => &self.content,
            "category" => &self.category,
            "status" => &self.status,
            "author" => &self.author,
            "published_at" => &self.published_at,
            _ => "",
        }
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "title" => self.title = value,
            "content" => self.content = value,
            "category" => self.category = value,
            "status" => self.status = value,
            "author" => self.author = value,
            "published_at" => self.published_at = value,
            _ => {}
        }
    }

    fn from_record(record: &Record) -> Option<Self> {
        let Record::News(n) = record else {
            return None;
        };
        Some(Self {
            title: n.title.clone(),
            content: n.content.clone(),
            category: n.category.clone(),
            status: n.status.clone(),
            author: n.author.clone().unwrap_or_default(),
            published_at: n.published_at.clone().unwrap_or_default(),
        })
    }

    fn validate(&self) -> Result<NewsPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        let payload = NewsPayload {
            title: required_text(&mut errors, field_def::<Self>("title"), &self.title),
            content: required_text(&mut errors, field_def::<Self>("content"), &self.content),
            category: choice(&mut errors, field_def::<Self>("category"), &self.category),
            status: choice(&mut errors, field_def::<Self>("status"), &self.status),
            author: optional_text(&self.author),
            published_at: date(&mut errors, field_def::<Self>("published_at"), &self.published_at),
        };
        errors.absorb(payload.validate());
        if payload.status == "published" && payload.published_at.is_none() {
            errors.insert("published_at", "Published articles need a publish date");
        }
        errors.into_result(payload)
    }
}

// ---------------------------------------------------------------------------
// Submit state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(u64),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormPhase {
    /// Editable, possibly showing field or submit errors.
    #[default]
    Idle,
    /// A request is in flight; further submits are ignored.
    Submitting,
    /// Saved; the caller navigates back to the list.
    Done,
}

/// A validated payload ready to be POSTed or PUT.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission<P> {
    pub resource: Resource,
    pub mode: FormMode,
    pub payload: P,
}

#[derive(Debug, Clone)]
pub struct FormState<D: Draft> {
    pub draft: D,
    pub mode: FormMode,
    pub errors: FieldErrors,
    pub submit_error: Option<String>,
    phase: FormPhase,
}

impl<D: Draft> FormState<D> {
    pub fn create() -> Self {
        Self::with_draft(D::default(), FormMode::Create)
    }

    pub fn edit(record: &Record) -> Option<Self> {
        D::from_record(record).map(|draft| Self::with_draft(draft, FormMode::Edit(record.id())))
    }

    pub fn with_draft(draft: D, mode: FormMode) -> Self {
        Self { draft, mode, errors: FieldErrors::default(), submit_error: None, phase: FormPhase::Idle }
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    /// Edit one field. Its stale error goes away; others stay until the next submit.
    pub fn set(&mut self, key: &str, value: String) {
        if self.phase == FormPhase::Submitting {
            return;
        }
        self.draft.set(key, value);
        self.errors.remove(key);
    }

    /// Validate and, if clean, move to `Submitting` and hand back the payload.
    /// Returns None while a previous submit is in flight or when validation fails.
    pub fn submit(&mut self) -> Option<Submission<D::Payload>> {
        if self.phase != FormPhase::Idle {
            return None;
        }
        self.submit_error = None;
        match self.draft.validate() {
            Ok(payload) => {
                self.errors = FieldErrors::default();
                self.phase = FormPhase::Submitting;
                Some(Submission { resource: D::RESOURCE, mode: self.mode, payload })
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    /// Settle an in-flight submit. Failure keeps the draft for another try.
    pub fn finish(&mut self, result: Result<(), String>) {
        if self.phase != FormPhase::Submitting {
            return;
        }
        match result {
            Ok(()) => self.phase = FormPhase::Done,
            Err(message) => {
                self.submit_error = Some(message);
                self.phase = FormPhase::Idle;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Game, Referee};

    fn ranking_draft(played: &str, wins: &str, draws: &str, losses: &str) -> RankingDraft {
        RankingDraft {
            league_id: "1".into(),
            team_id: "2".into(),
            played: played.into(),
            wins: wins.into(),
            draws: draws.into(),
            losses: losses.into(),
            ..Default::default()
        }
    }

    fn valid_game() -> GameDraft {
        GameDraft {
            league_id: "5".into(),
            home_team_id: "1".into(),
            away_team_id: "2".into(),
            match_date: "2024-03-01".into(),
            ..Default::default()
        }
    }

    #[test]
    fn ranking_sum_must_equal_played() {
        let errors = ranking_draft("10", "5", "2", "2").validate().unwrap_err();
        assert_eq!(errors.get("played"), Some("Wins + draws + losses must equal matches played"));

        let payload = ranking_draft("10", "5", "2", "3").validate().expect("sum matches");
        assert_eq!(payload.points, 12);
    }

    #[test]
    fn all_zero_ranking_is_valid() {
        let payload = ranking_draft("0", "0", "0", "0").validate().expect("0+0+0 == 0");
        assert_eq!(payload.points, 0);
        assert_eq!(payload.played, 0);
    }

    #[test]
    fn huge_ranking_counts_do_not_overflow_points() {
        let payload = ranking_draft("3000000000", "3000000000", "0", "0").validate().expect("sum matches");
        assert_eq!(payload.points, 6_000_000_000);

        let draft = RankingDraft { wins: "4294967295".into(), draws: "4294967295".into(), ..Default::default() };
        assert_eq!(draft.preview().map(|p| p.points), Some(3 * u64::from(u32::MAX)));
    }

    #[test]
    fn ranking_rejects_negative_and_non_numeric() {
        let errors = ranking_draft("3", "-1", "x", "1").validate().unwrap_err();
        assert_eq!(errors.get("wins"), Some("Wins must be zero or greater"));
        assert_eq!(errors.get("draws"), Some("Draws must be a whole number"));
    }

    #[test]
    fn ranking_points_follow_wins_and_draws_whatever_the_edit_order() {
        let mut form = FormState::<RankingDraft>::with_draft(ranking_draft("0", "0", "0", "0"), FormMode::Create);
        for (key, value) in [("draws", "3"), ("played", "9"), ("losses", "2"), ("wins", "4")] {
            form.set(key, value.into());
        }
        assert_eq!(form.draft.preview().map(|p| p.points), Some(11));
        let submission = form.submit().expect("valid ranking");
        assert_eq!(submission.payload.points, 11);
    }

    #[test]
    fn same_home_and_away_team_fails_on_away_field() {
        let mut draft = valid_game();
        draft.away_team_id = "1".into();
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.get("away_team_id"), Some("Away team must be different from home team"));
        assert!(!errors.contains("home_team_id"));
    }

    #[test]
    fn invalid_game_form_never_produces_a_submission() {
        let mut draft = valid_game();
        draft.away_team_id = draft.home_team_id.clone();
        let mut form = FormState::with_draft(draft, FormMode::Edit(1));
        assert!(form.submit().is_none());
        assert_eq!(form.phase(), FormPhase::Idle);
        assert!(form.errors.contains("away_team_id"));
    }

    #[test]
    fn completed_game_needs_both_scores() {
        let mut draft = valid_game();
        draft.status = "completed".into();
        draft.home_score = "31".into();
        let errors = draft.validate().unwrap_err();
        assert!(errors.contains("away_score"));
        assert!(!errors.contains("home_score"));
    }

    #[test]
    fn game_payload_sends_null_for_cleared_optionals() {
        let payload = valid_game().validate().expect("valid game");
        let json = serde_json::to_value(&payload).expect("serializes");
        assert_eq!(json["referee_id"], serde_json::Value::Null);
        assert_eq!(json["home_score"], serde_json::Value::Null);
        assert_eq!(json["league_id"], 5);
        assert_eq!(json["status"], "scheduled");
    }

    #[test]
    fn edit_form_coerces_foreign_keys_to_strings() {
        let record = Record::Game(Game {
            id: 12,
            league_id: Some(5),
            home_team_id: Some(1),
            away_team_id: Some(2),
            referee_id: None,
            ..Default::default()
        });
        let form = FormState::<GameDraft>::edit(&record).expect("game record");
        assert_eq!(form.mode, FormMode::Edit(12));
        assert_eq!(form.draft.league_id, "5");
        assert_eq!(form.draft.referee_id, "");
        assert!(FormState::<TeamDraft>::edit(&record).is_none());
    }

    #[test]
    fn every_problem_is_collected_at_once() {
        let draft = PlayerDraft { jersey_number: "120".into(), goals: "-3".into(), ..Default::default() };
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("team_id"), Some("Please select a team"));
        assert_eq!(errors.get("position"), Some("Position is required"));
        assert_eq!(errors.get("jersey_number"), Some("Jersey number must be between 1 and 99"));
        assert_eq!(errors.get("goals"), Some("Goals must be zero or greater"));
    }

    #[test]
    fn minimum_length_comes_from_payload_rules() {
        let draft = TeamDraft { name: "X".into(), league_id: "1".into(), ..Default::default() };
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Team name must be at least 2 characters"));
    }

    #[test]
    fn tournament_end_cannot_precede_start() {
        let draft = TournamentDraft {
            name: "Spring Cup".into(),
            start_date: "2024-05-01".into(),
            end_date: "2024-04-01".into(),
            ..Default::default()
        };
        assert!(draft.validate().unwrap_err().contains("end_date"));
    }

    #[test]
    fn submit_is_guarded_while_in_flight() {
        let mut form = FormState::with_draft(valid_game(), FormMode::Create);
        assert!(form.submit().is_some());
        assert!(form.is_submitting());
        assert!(form.submit().is_none(), "double submit must be ignored");

        form.finish(Err("League is closed".into()));
        assert_eq!(form.phase(), FormPhase::Idle);
        assert_eq!(form.submit_error.as_deref(), Some("League is closed"));
        assert_eq!(form.draft, valid_game(), "draft survives a failed submit");

        assert!(form.submit().is_some());
        assert!(form.submit_error.is_none());
        form.finish(Ok(()));
        assert_eq!(form.phase(), FormPhase::Done);
    }

    #[test]
    fn editing_a_field_clears_only_its_error() {
        let mut form = FormState::<RankingDraft>::create();
        assert!(form.submit().is_none());
        assert!(form.errors.contains("league_id"));
        assert!(form.errors.contains("team_id"));
        form.set("league_id", "3".into());
        assert!(!form.errors.contains("league_id"));
        assert!(form.errors.contains("team_id"));
    }

    #[test]
    fn referee_flag_round_trips_through_text() {
        let record = Record::Referee(Referee {
            id: 4,
            name: "Jo Park".into(),
            license_number: "HB-221".into(),
            is_active: false,
            ..Default::default()
        });
        let form = FormState::<RefereeDraft>::edit(&record).expect("referee record");
        assert_eq!(form.draft.is_active, NO);
        let payload = form.draft.validate().expect("valid referee");
        assert!(!payload.is_active);
    }

    #[test]
    fn ranking_preview_tolerates_partial_input() {
        let draft = RankingDraft { wins: "3".into(), draws: "".into(), played: "4".into(), ..Default::default() };
        let preview = draft.preview().expect("rankings always preview");
        assert_eq!(preview.points, 6);
        assert!(TeamDraft::default().preview().is_none());
        assert_eq!(crate::stats::format_win_rate(preview.win_rate), "75.0%");
    }
}
