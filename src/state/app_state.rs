use crate::app::MenuItem;
use crate::state::editor::EditorState;
use handball_api::client::{Dashboard, Fixtures, FormOptions, Rosters, Standings};
use handball_api::filter::{ALL, ListQuery};
use handball_api::{League, News, Record, Resource};

// ---------------------------------------------------------------------------
// Remote data holder
// ---------------------------------------------------------------------------

/// Data for one view plus the error from its last load, if any.
#[derive(Debug)]
pub struct Remote<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Default for Remote<T> {
    fn default() -> Self {
        Self { data: None, error: None }
    }
}

impl<T> Remote<T> {
    /// A successful load clears the previous error.
    pub fn loaded(&mut self, data: T) {
        self.data = Some(data);
        self.error = None;
    }

    /// Keep showing stale data, if any, alongside the error.
    pub fn failed(&mut self, message: String) {
        self.error = Some(message);
    }
}

/// Last scroll offset for `len` lines, saturating at `u16::MAX`.
pub fn max_scroll(len: usize) -> u16 {
    u16::try_from(len.saturating_sub(1)).unwrap_or(u16::MAX)
}

pub fn scroll_down(offset: &mut u16, len: usize) {
    *offset = offset.saturating_add(1).min(max_scroll(len));
}

pub fn scroll_up(offset: &mut u16) {
    *offset = offset.saturating_sub(1);
}

// ---------------------------------------------------------------------------
// Viewer tabs
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct FixturesState {
    pub remote: Remote<Fixtures>,
    pub query: ListQuery,
    pub scroll_offset: u16,
}

impl Default for FixturesState {
    fn default() -> Self {
        Self { remote: Remote::default(), query: ListQuery::for_resource(Resource::Games), scroll_offset: 0 }
    }
}

#[derive(Debug, Default)]
pub struct RankingsState {
    pub remote: Remote<Standings>,
    /// Index into `leagues()`; `None` shows every league.
    pub league_index: Option<usize>,
    pub scroll_offset: u16,
}

impl RankingsState {
    /// Leagues that have at least one ranking row, by name.
    pub fn leagues(&self) -> Vec<&League> {
        let Some(standings) = self.remote.data.as_ref() else {
            return Vec::new();
        };
        let mut leagues: Vec<&League> = standings
            .leagues
            .iter()
            .filter(|l| standings.rankings.iter().any(|r| r.league_id == Some(l.id)))
            .collect();
        leagues.sort_by(|a, b| a.name.cmp(&b.name));
        leagues
    }

    pub fn selected_league(&self) -> Option<&League> {
        self.league_index.and_then(|idx| self.leagues().get(idx).copied())
    }

    pub fn next_league(&mut self) {
        let count = self.leagues().len();
        self.league_index = match self.league_index {
            None if count > 0 => Some(0),
            Some(idx) if idx + 1 < count => Some(idx + 1),
            _ => None,
        };
        self.scroll_offset = 0;
    }

    pub fn prev_league(&mut self) {
        let count = self.leagues().len();
        self.league_index = match self.league_index {
            None if count > 0 => Some(count - 1),
            Some(idx) if idx > 0 => Some(idx - 1),
            _ => None,
        };
        self.scroll_offset = 0;
    }

    /// Default to the first league once data arrives.
    fn on_loaded(&mut self) {
        let count = self.leagues().len();
        self.league_index = match self.league_index {
            Some(idx) if idx < count => Some(idx),
            _ if count > 0 => Some(0),
            _ => None,
        };
    }
}

#[derive(Debug)]
pub struct RostersState {
    pub remote: Remote<Rosters>,
    pub teams_scroll: u16,
    pub players_scroll: u16,
    pub player_query: ListQuery,
}

impl Default for RostersState {
    fn default() -> Self {
        Self {
            remote: Remote::default(),
            teams_scroll: 0,
            players_scroll: 0,
            player_query: ListQuery::for_resource(Resource::Players),
        }
    }
}

#[derive(Debug)]
pub struct NewsState {
    pub remote: Remote<Vec<News>>,
    pub query: ListQuery,
    pub selected: usize,
    pub show_detail: bool,
}

impl Default for NewsState {
    fn default() -> Self {
        Self { remote: Remote::default(), query: ListQuery::for_resource(Resource::News), selected: 0, show_detail: false }
    }
}

// ---------------------------------------------------------------------------
// Admin tab
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AdminState {
    pub resource: Resource,
    pub remote: Remote<Vec<Record>>,
    pub query: ListQuery,
    pub selected: usize,
    /// Record id waiting for a `y` to confirm deletion.
    pub pending_delete: Option<u64>,
    /// One-line result of the last save or delete.
    pub notice: Option<String>,
}

impl Default for AdminState {
    fn default() -> Self {
        Self::for_resource(Resource::default())
    }
}

impl AdminState {
    fn for_resource(resource: Resource) -> Self {
        Self {
            resource,
            remote: Remote::default(),
            query: ListQuery::for_resource(resource),
            selected: 0,
            pending_delete: None,
            notice: None,
        }
    }

    /// Switch collection; search and facets start over.
    pub fn switch_to(&mut self, resource: Resource) {
        *self = Self::for_resource(resource);
    }

    /// Records passing the current search and facets.
    pub fn visible(&self) -> Vec<&Record> {
        self.remote
            .data
            .as_deref()
            .map(|records| handball_api::filter::filter(records, &self.query))
            .unwrap_or_default()
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.visible().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Advance facet `index` (0 or 1) of the current collection.
    pub fn cycle_facet(&mut self, index: usize) {
        let Some(facet) = self.resource.facets().get(index) else {
            return;
        };
        let next = facet.cycle(self.query.facet_value(facet.key));
        self.query.set_facet(facet.key, next);
        self.selected = 0;
    }

    pub fn clear_filters(&mut self) {
        self.query = ListQuery::for_resource(self.resource);
        self.selected = 0;
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Whole-app state
// ---------------------------------------------------------------------------

/// Where typed characters go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into the search box of the current list.
    Search,
    /// An editor form is open.
    Form,
}

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub input_mode: InputMode,
    pub show_logs: bool,
    pub dashboard: Remote<Dashboard>,
    pub fixtures: FixturesState,
    pub rankings: RankingsState,
    pub rosters: RostersState,
    pub news: NewsState,
    pub admin: AdminState,
    pub editor: Option<EditorState>,
    pub form_options: FormOptions,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_standings_loaded(&mut self, standings: Standings) {
        self.rankings.remote.loaded(standings);
        self.rankings.on_loaded();
    }

    /// Ignore lists for a collection the user has already moved away from.
    pub fn on_collection_loaded(&mut self, resource: Resource, records: Vec<Record>) {
        if self.admin.resource != resource {
            return;
        }
        self.admin.remote.loaded(records);
        self.admin.clamp_selection();
    }

    pub fn on_news_loaded(&mut self, news: Vec<News>) {
        self.news.remote.loaded(news);
        let len = self.news.remote.data.as_ref().map_or(0, Vec::len);
        if self.news.selected >= len {
            self.news.selected = len.saturating_sub(1);
        }
    }

    pub fn search_text_mut(&mut self) -> Option<&mut String> {
        match self.active_tab {
            MenuItem::Players => Some(&mut self.rosters.player_query.search),
            MenuItem::News => Some(&mut self.news.query.search),
            MenuItem::Admin => Some(&mut self.admin.query.search),
            _ => None,
        }
    }

    pub fn facet_label(query: &ListQuery, resource: Resource) -> String {
        resource
            .facets()
            .iter()
            .map(|f| {
                let value = query.facet_value(f.key);
                format!("{}: {}", f.label, if value == ALL { "all" } else { value })
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handball_api::{Ranking, Team};

    fn team_record(id: u64, name: &str) -> Record {
        Record::Team(Team { id, name: name.into(), ..Default::default() })
    }

    #[test]
    fn scrolling_saturates_on_very_long_lists() {
        assert_eq!(max_scroll(0), 0);
        assert_eq!(max_scroll(10), 9);
        assert_eq!(max_scroll(70_000), u16::MAX);

        let mut offset = u16::MAX - 1;
        scroll_down(&mut offset, 100_000);
        assert_eq!(offset, u16::MAX);
        scroll_down(&mut offset, 100_000);
        assert_eq!(offset, u16::MAX);
        scroll_down(&mut offset, 5);
        assert_eq!(offset, 4);
    }

    #[test]
    fn remote_keeps_stale_data_on_failure() {
        let mut remote = Remote::default();
        remote.loaded(vec![1, 2]);
        remote.failed("Failed to load data (HTTP 500).".into());
        assert_eq!(remote.data, Some(vec![1, 2]));
        assert!(remote.error.is_some());
        remote.loaded(vec![3]);
        assert!(remote.error.is_none());
    }

    #[test]
    fn admin_switch_resets_query_and_selection() {
        let mut admin = AdminState::default();
        admin.query.search = "cup".into();
        admin.selected = 4;
        admin.switch_to(Resource::Referees);
        assert_eq!(admin.resource, Resource::Referees);
        assert!(admin.query.is_unfiltered());
        assert_eq!(admin.query.facets.len(), 2);
        assert_eq!(admin.selected, 0);
    }

    #[test]
    fn stale_collection_response_is_ignored() {
        let mut state = AppState::new();
        state.admin.switch_to(Resource::Teams);
        state.on_collection_loaded(Resource::Players, vec![team_record(1, "Sharks")]);
        assert!(state.admin.remote.data.is_none());
        state.on_collection_loaded(Resource::Teams, vec![team_record(1, "Sharks")]);
        assert_eq!(state.admin.visible().len(), 1);
    }

    #[test]
    fn admin_search_narrows_visible_records() {
        let mut state = AppState::new();
        state.admin.switch_to(Resource::Teams);
        state.on_collection_loaded(Resource::Teams, vec![team_record(1, "Sharks"), team_record(2, "Wolves")]);
        state.admin.selected = 1;
        state.admin.query.search = "wol".into();
        state.admin.clamp_selection();
        assert_eq!(state.admin.selected_record().map(Record::id), Some(2));
    }

    #[test]
    fn facet_cycle_walks_values_then_all() {
        let mut admin = AdminState::default();
        admin.switch_to(Resource::Games);
        admin.cycle_facet(0);
        assert_eq!(admin.query.facet_value("status"), "scheduled");
        for _ in 0..5 {
            admin.cycle_facet(0);
        }
        assert_eq!(admin.query.facet_value("status"), ALL);
        admin.cycle_facet(1); // games have a single facet
        assert!(admin.query.is_unfiltered());
    }

    #[test]
    fn rankings_default_to_first_league_with_rows() {
        let mut state = AppState::new();
        state.on_standings_loaded(Standings {
            rankings: vec![Ranking { id: 1, league_id: Some(7), ..Default::default() }],
            leagues: vec![
                League { id: 3, name: "Empty".into(), ..Default::default() },
                League { id: 7, name: "Premier".into(), ..Default::default() },
            ],
            teams: vec![],
        });
        assert_eq!(state.rankings.selected_league().map(|l| l.id), Some(7));
        state.rankings.next_league();
        assert!(state.rankings.selected_league().is_none());
        state.rankings.prev_league();
        assert_eq!(state.rankings.selected_league().map(|l| l.id), Some(7));
    }
}
