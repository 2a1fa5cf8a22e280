//! Tournament → league → records trees built from flat collections.
//!
//! Foreign keys are resolved through id lookup maps built once per call.
//! A record whose key does not resolve lands in a sentinel bucket so it
//! stays visible.

use crate::{Game, League, Player, Team, Tournament, parse_api_date};
use std::collections::{BTreeMap, HashMap};

pub const UNASSIGNED_LEAGUE: &str = "Unassigned League";
pub const INDEPENDENT_MATCHES: &str = "Independent Matches";
pub const INDEPENDENT_TEAMS: &str = "Independent Teams";

/// tournament name → league name → records.
pub type Grouped<T> = BTreeMap<String, BTreeMap<String, Vec<T>>>;

/// Anything the API identifies with a numeric id.
pub trait Identified {
    fn id(&self) -> u64;
}

macro_rules! identified {
    ($($ty:ty),* $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> u64 {
                self.id
            }
        })*
    };
}

identified!(Tournament, League, Team, Player, Game, crate::Ranking, crate::Referee);

pub fn index_by_id<T: Identified>(items: &[T]) -> HashMap<u64, &T> {
    items.iter().map(|item| (item.id(), item)).collect()
}

/// Sentinel names used when a key is missing or unknown.
#[derive(Debug, Clone, Copy)]
pub struct Buckets {
    pub no_tournament: &'static str,
    pub no_league: &'static str,
}

pub const FIXTURE_BUCKETS: Buckets =
    Buckets { no_tournament: INDEPENDENT_MATCHES, no_league: UNASSIGNED_LEAGUE };
pub const ROSTER_BUCKETS: Buckets =
    Buckets { no_tournament: INDEPENDENT_TEAMS, no_league: UNASSIGNED_LEAGUE };

/// Resolves a league id to `(tournament name, league name)`.
pub struct LeagueResolver<'a> {
    leagues: HashMap<u64, &'a League>,
    tournaments: HashMap<u64, &'a Tournament>,
    buckets: Buckets,
}

impl<'a> LeagueResolver<'a> {
    pub fn new(leagues: &'a [League], tournaments: &'a [Tournament], buckets: Buckets) -> Self {
        Self { leagues: index_by_id(leagues), tournaments: index_by_id(tournaments), buckets }
    }

    pub fn resolve(&self, league_id: Option<u64>) -> (String, String) {
        let Some(league) = league_id.and_then(|id| self.leagues.get(&id)) else {
            return (self.buckets.no_tournament.to_owned(), self.buckets.no_league.to_owned());
        };
        (self.tournament_name(league), league.name.clone())
    }

    /// Embedded tournament first, then the `tournament_id` lookup.
    fn tournament_name(&self, league: &League) -> String {
        if let Some(embedded) = &league.tournament
            && !embedded.name.is_empty()
        {
            return embedded.name.clone();
        }
        league
            .tournament_id
            .and_then(|id| self.tournaments.get(&id))
            .map(|t| t.name.clone())
            .unwrap_or_else(|| self.buckets.no_tournament.to_owned())
    }
}

/// Stable sort, most recent first. Records without a parseable date go last.
pub fn sort_by_date_desc<T>(items: &mut [T], date: impl Fn(&T) -> Option<&str>) {
    items.sort_by_cached_key(|item| std::cmp::Reverse(date(item).and_then(parse_api_date)));
}

fn insert<T>(tree: &mut Grouped<T>, (tournament, league): (String, String), item: T) {
    tree.entry(tournament).or_default().entry(league).or_default().push(item);
}

/// Fixtures page: games under their league's tournament, newest first.
pub fn group_games(games: &[Game], leagues: &[League], tournaments: &[Tournament]) -> Grouped<Game> {
    let resolver = LeagueResolver::new(leagues, tournaments, FIXTURE_BUCKETS);
    let mut tree = Grouped::new();
    for game in games {
        insert(&mut tree, resolver.resolve(game.league_id), game.clone());
    }
    for leaf in tree.values_mut().flat_map(|leagues| leagues.values_mut()) {
        sort_by_date_desc(leaf, |g| g.match_date.as_deref());
    }
    tree
}

/// Teams page: teams under their league's tournament, by name.
pub fn group_teams(teams: &[Team], leagues: &[League], tournaments: &[Tournament]) -> Grouped<Team> {
    let resolver = LeagueResolver::new(leagues, tournaments, ROSTER_BUCKETS);
    let mut tree = Grouped::new();
    for team in teams {
        insert(&mut tree, resolver.resolve(team.league_id), team.clone());
    }
    for leaf in tree.values_mut().flat_map(|leagues| leagues.values_mut()) {
        leaf.sort_by(|a, b| a.name.cmp(&b.name));
    }
    tree
}

/// Players page: players through team → league → tournament, top scorers first.
pub fn group_players(
    players: &[Player],
    teams: &[Team],
    leagues: &[League],
    tournaments: &[Tournament],
) -> Grouped<Player> {
    let resolver = LeagueResolver::new(leagues, tournaments, ROSTER_BUCKETS);
    let teams_by_id = index_by_id(teams);
    let mut tree = Grouped::new();
    for player in players {
        let league_id = player
            .team_id
            .and_then(|id| teams_by_id.get(&id))
            .and_then(|team| team.league_id);
        insert(&mut tree, resolver.resolve(league_id), player.clone());
    }
    for leaf in tree.values_mut().flat_map(|leagues| leagues.values_mut()) {
        leaf.sort_by(|a, b| b.goals.cmp(&a.goals).then_with(|| a.name.cmp(&b.name)));
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameStatus, TournamentRef};

    fn game(id: u64, date: &str, league_id: Option<u64>) -> Game {
        Game { id, match_date: Some(date.into()), league_id, ..Default::default() }
    }

    fn ids(games: &[Game]) -> Vec<u64> {
        games.iter().map(|g| g.id).collect()
    }

    #[test]
    fn cup_premier_scenario() {
        let games = vec![Game {
            id: 1,
            match_date: Some("2024-03-01".into()),
            league_id: Some(5),
            status: GameStatus::Completed,
            home_score: Some(3),
            away_score: Some(1),
            ..Default::default()
        }];
        let leagues = vec![League {
            id: 5,
            name: "Premier".into(),
            tournament: Some(TournamentRef { id: None, name: "Cup".into() }),
            ..Default::default()
        }];

        let tree = group_games(&games, &leagues, &[]);
        assert_eq!(tree.len(), 1);
        let leaf = &tree["Cup"]["Premier"];
        assert_eq!(ids(leaf), vec![1]);
        assert_eq!(leaf[0].outcome().map(|o| o.label()), Some("Home Win"));
    }

    #[test]
    fn unresolved_keys_land_in_sentinel_buckets() {
        let games = vec![game(1, "2024-01-01", None), game(2, "2024-01-02", Some(99))];
        let tree = group_games(&games, &[], &[]);
        assert_eq!(ids(&tree[INDEPENDENT_MATCHES][UNASSIGNED_LEAGUE]), vec![2, 1]);
    }

    #[test]
    fn league_without_tournament_keeps_its_name() {
        let leagues = vec![League { id: 3, name: "Second Division".into(), ..Default::default() }];
        let games = vec![game(1, "2024-01-01", Some(3))];
        let tree = group_games(&games, &leagues, &[]);
        assert_eq!(ids(&tree[INDEPENDENT_MATCHES]["Second Division"]), vec![1]);
    }

    #[test]
    fn tournament_id_lookup_used_when_not_embedded() {
        let tournaments = vec![Tournament { id: 9, name: "Spring Series".into(), ..Default::default() }];
        let leagues = vec![League { id: 3, name: "U19".into(), tournament_id: Some(9), ..Default::default() }];
        let games = vec![game(1, "2024-01-01", Some(3))];
        let tree = group_games(&games, &leagues, &tournaments);
        assert!(tree["Spring Series"].contains_key("U19"));
    }

    #[test]
    fn date_sort_is_descending_across_year_boundary() {
        let mut games = vec![
            game(1, "2024-01-01", None),
            game(2, "2024-12-31", None),
            game(3, "2023-12-31", None),
        ];
        sort_by_date_desc(&mut games, |g| g.match_date.as_deref());
        assert_eq!(ids(&games), vec![2, 1, 3]);
    }

    #[test]
    fn date_sort_is_stable_for_equal_dates() {
        let mut games = vec![
            game(1, "2024-05-05", None),
            game(2, "2024-05-06", None),
            game(3, "2024-05-05", None),
            game(4, "2024-05-05", None),
        ];
        sort_by_date_desc(&mut games, |g| g.match_date.as_deref());
        assert_eq!(ids(&games), vec![2, 1, 3, 4]);
    }

    #[test]
    fn undated_games_sort_last() {
        let mut games = vec![
            Game { id: 1, ..Default::default() },
            game(2, "2020-01-01", None),
            game(3, "garbage", None),
        ];
        sort_by_date_desc(&mut games, |g| g.match_date.as_deref());
        assert_eq!(ids(&games), vec![2, 1, 3]);
    }

    #[test]
    fn grouping_twice_is_identical() {
        let leagues = vec![
            League { id: 1, name: "A".into(), tournament_id: Some(1), ..Default::default() },
            League { id: 2, name: "B".into(), tournament_id: Some(2), ..Default::default() },
        ];
        let tournaments = vec![
            Tournament { id: 1, name: "North".into(), ..Default::default() },
            Tournament { id: 2, name: "South".into(), ..Default::default() },
        ];
        let games = vec![
            game(1, "2024-02-01", Some(1)),
            game(2, "2024-02-01", Some(2)),
            game(3, "2024-03-01", Some(1)),
            game(4, "2024-02-01", Some(1)),
        ];
        let first = group_games(&games, &leagues, &tournaments);
        let second = group_games(&games, &leagues, &tournaments);
        assert_eq!(first, second);
        assert_eq!(ids(&first["North"]["A"]), vec![3, 1, 4]);
    }

    #[test]
    fn players_follow_team_league_chain() {
        let tournaments = vec![Tournament { id: 1, name: "Cup".into(), ..Default::default() }];
        let leagues = vec![League { id: 2, name: "Premier".into(), tournament_id: Some(1), ..Default::default() }];
        let teams = vec![Team { id: 3, name: "Sharks".into(), league_id: Some(2), ..Default::default() }];
        let players = vec![
            Player { id: 1, name: "Ana".into(), team_id: Some(3), goals: 4, ..Default::default() },
            Player { id: 2, name: "Bo".into(), team_id: Some(3), goals: 11, ..Default::default() },
            Player { id: 3, name: "Cy".into(), team_id: None, ..Default::default() },
        ];
        let tree = group_players(&players, &teams, &leagues, &tournaments);
        let names: Vec<&str> = tree["Cup"]["Premier"].iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bo", "Ana"]);
        assert_eq!(tree[INDEPENDENT_TEAMS][UNASSIGNED_LEAGUE].len(), 1);
    }

    #[test]
    fn teams_sorted_by_name_within_league() {
        let leagues = vec![League { id: 2, name: "Premier".into(), ..Default::default() }];
        let teams = vec![
            Team { id: 1, name: "Wolves".into(), league_id: Some(2), ..Default::default() },
            Team { id: 2, name: "Bears".into(), league_id: Some(2), ..Default::default() },
        ];
        let tree = group_teams(&teams, &leagues, &[]);
        let names: Vec<&str> = tree[INDEPENDENT_TEAMS]["Premier"].iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Bears", "Wolves"]);
    }
}
