//! Client-side search and facet filtering over already-fetched collections.

use crate::{
    AD_POSITIONS, AD_STATUSES, Ad, GALLERY_CATEGORIES, GAME_STATUSES, Gallery, Game, League,
    NEWS_CATEGORIES, News, PLAYER_POSITIONS, PUBLISH_STATUSES, Player, REFEREE_LEVELS, Ranking,
    Record, Referee, Resource, Team, Tournament, USER_ROLES, User,
};

/// Facet value that matches everything.
pub const ALL: &str = "all";

/// Something a list view can search and narrow down.
pub trait Filterable {
    /// Text fields matched by the search box.
    fn search_fields(&self) -> Vec<&str>;

    /// Value of a categorical field such as `status` or `category`.
    fn facet(&self, key: &str) -> Option<&str>;
}

/// A categorical filter the UI can cycle through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub key: &'static str,
    pub label: &'static str,
    pub values: &'static [&'static str],
}

impl Facet {
    /// Next value in cycle order, starting and ending at `ALL`.
    pub fn cycle(&self, current: &str) -> &'static str {
        if current == ALL {
            return self.values.first().copied().unwrap_or(ALL);
        }
        match self.values.iter().position(|v| *v == current) {
            Some(idx) if idx + 1 < self.values.len() => self.values[idx + 1],
            _ => ALL,
        }
    }
}

const GAME_STATUS: Facet = Facet { key: "status", label: "Status", values: GAME_STATUSES };
const PLAYER_POSITION: Facet = Facet { key: "position", label: "Position", values: PLAYER_POSITIONS };
const REFEREE_LEVEL: Facet = Facet { key: "level", label: "Level", values: REFEREE_LEVELS };
const ACTIVE: Facet = Facet { key: "active", label: "Active", values: &["active", "inactive"] };
const NEWS_CATEGORY: Facet = Facet { key: "category", label: "Category", values: NEWS_CATEGORIES };
const PUBLISH_STATUS: Facet = Facet { key: "status", label: "Status", values: PUBLISH_STATUSES };
const GALLERY_CATEGORY: Facet = Facet { key: "category", label: "Category", values: GALLERY_CATEGORIES };
const AD_POSITION: Facet = Facet { key: "position", label: "Placement", values: AD_POSITIONS };
const AD_STATUS: Facet = Facet { key: "status", label: "Status", values: AD_STATUSES };
const USER_ROLE: Facet = Facet { key: "role", label: "Role", values: USER_ROLES };

impl Resource {
    /// At most two facets per collection.
    pub fn facets(&self) -> &'static [Facet] {
        match self {
            Resource::Players => &[PLAYER_POSITION],
            Resource::Games => &[GAME_STATUS],
            Resource::Referees => &[REFEREE_LEVEL, ACTIVE],
            Resource::News => &[NEWS_CATEGORY, PUBLISH_STATUS],
            Resource::Galleries => &[GALLERY_CATEGORY, PUBLISH_STATUS],
            Resource::Ads => &[AD_POSITION, AD_STATUS],
            Resource::Users => &[USER_ROLE, ACTIVE],
            Resource::Tournaments | Resource::Leagues | Resource::Teams | Resource::Rankings => &[],
        }
    }
}

/// Search term plus facet selections. `Default` matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub search: String,
    pub facets: Vec<(&'static str, String)>,
}

impl ListQuery {
    /// Query with every facet of `resource` set to `ALL`.
    pub fn for_resource(resource: Resource) -> Self {
        Self {
            search: String::new(),
            facets: resource.facets().iter().map(|f| (f.key, ALL.to_owned())).collect(),
        }
    }

    pub fn facet_value(&self, key: &str) -> &str {
        self.facets
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or(ALL)
    }

    pub fn set_facet(&mut self, key: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.facets.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.facets.push((key, value)),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.search.trim().is_empty() && self.facets.iter().all(|(_, v)| v == ALL)
    }

    fn matches<T: Filterable + ?Sized>(&self, item: &T, needle: &str) -> bool {
        let search_ok = needle.is_empty()
            || item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle));
        search_ok
            && self.facets.iter().all(|(key, wanted)| {
                wanted == ALL
                    || item
                        .facet(key)
                        .is_some_and(|value| value == wanted)
            })
    }
}

/// Items matching `query`, in list order.
pub fn filter<'a, T: Filterable>(items: &'a [T], query: &ListQuery) -> Vec<&'a T> {
    let needle = query.search.trim().to_lowercase();
    items.iter().filter(|item| query.matches(*item, &needle)).collect()
}

/// What a list screen should show.
#[derive(Debug, PartialEq)]
pub enum ListView<'a, T> {
    /// The collection itself is empty.
    NoData,
    /// Data exists but nothing passes the current filter.
    NoMatches,
    Rows(Vec<&'a T>),
}

impl<'a, T: Filterable> ListView<'a, T> {
    pub fn build(items: &'a [T], query: &ListQuery) -> Self {
        if items.is_empty() {
            return ListView::NoData;
        }
        let rows = filter(items, query);
        if rows.is_empty() { ListView::NoMatches } else { ListView::Rows(rows) }
    }

    pub fn rows(&self) -> &[&'a T] {
        match self {
            ListView::Rows(rows) => rows,
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Filterable implementations
// ---------------------------------------------------------------------------

fn active_label(is_active: bool) -> &'static str {
    if is_active { "active" } else { "inactive" }
}

impl Filterable for Tournament {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.location.as_deref());
        fields
    }

    fn facet(&self, _key: &str) -> Option<&str> {
        None
    }
}

impl Filterable for League {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.tournament.as_ref().map(|t| t.name.as_str()));
        fields
    }

    fn facet(&self, _key: &str) -> Option<&str> {
        None
    }
}

impl Filterable for Team {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.city.as_deref());
        fields.extend(self.coach.as_deref());
        fields
    }

    fn facet(&self, _key: &str) -> Option<&str> {
        None
    }
}

impl Filterable for Player {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.position.as_str()]
    }

    fn facet(&self, key: &str) -> Option<&str> {
        match key {
            "position" => Some(self.position.as_str()),
            _ => None,
        }
    }
}

impl Filterable for Game {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        fields.extend(self.match_date.as_deref());
        fields.extend(self.venue.as_deref());
        fields.extend(self.referee.as_ref().map(|r| r.name.as_str()));
        fields
    }

    fn facet(&self, key: &str) -> Option<&str> {
        match key {
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }
}

impl Filterable for Ranking {
    fn search_fields(&self) -> Vec<&str> {
        Vec::new()
    }

    fn facet(&self, _key: &str) -> Option<&str> {
        None
    }
}

impl Filterable for Referee {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.license_number.as_str()]
    }

    fn facet(&self, key: &str) -> Option<&str> {
        match key {
            "level" => Some(self.level.as_str()),
            "active" => Some(active_label(self.is_active)),
            _ => None,
        }
    }
}

impl Filterable for News {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.content.as_str()];
        fields.extend(self.author.as_deref());
        fields
    }

    fn facet(&self, key: &str) -> Option<&str> {
        match key {
            "category" => Some(self.category.as_str()),
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }
}

impl Filterable for Gallery {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }

    fn facet(&self, key: &str) -> Option<&str> {
        match key {
            "category" => Some(self.category.as_str()),
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }
}

impl Filterable for Ad {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str()]
    }

    fn facet(&self, key: &str) -> Option<&str> {
        match key {
            "position" => Some(self.position.as_str()),
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }
}

impl Filterable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }

    fn facet(&self, key: &str) -> Option<&str> {
        match key {
            "role" => Some(self.role.as_str()),
            "active" => Some(active_label(self.is_active)),
            _ => None,
        }
    }
}

impl Filterable for Record {
    fn search_fields(&self) -> Vec<&str> {
        match self {
            Record::Tournament(r) => r.search_fields(),
            Record::League(r) => r.search_fields(),
            Record::Team(r) => r.search_fields(),
            Record::Player(r) => r.search_fields(),
            Record::Game(r) => r.search_fields(),
            Record::Ranking(r) => r.search_fields(),
            Record::Referee(r) => r.search_fields(),
            Record::News(r) => r.search_fields(),
            Record::Gallery(r) => r.search_fields(),
            Record::Ad(r) => r.search_fields(),
            Record::User(r) => r.search_fields(),
        }
    }

    fn facet(&self, key: &str) -> Option<&str> {
        match self {
            Record::Tournament(r) => r.facet(key),
            Record::League(r) => r.facet(key),
            Record::Team(r) => r.facet(key),
            Record::Player(r) => r.facet(key),
            Record::Game(r) => r.facet(key),
            Record::Ranking(r) => r.facet(key),
            Record::Referee(r) => r.facet(key),
            Record::News(r) => r.facet(key),
            Record::Gallery(r) => r.facet(key),
            Record::Ad(r) => r.facet(key),
            Record::User(r) => r.facet(key),
        }
    }
}
