//! Derived statistics. Previews only; the server's stored values win on read.

use crate::grouping::index_by_id;
use crate::{Game, GameStatus, League, Player, Ranking, Referee, Team, Tournament};
use std::cmp::Reverse;

/// Two points per win, one per draw. Widened so no pair of counts can overflow.
pub fn points(wins: u32, draws: u32) -> u64 {
    u64::from(wins) * 2 + u64::from(draws)
}

pub fn goal_difference(goals_for: u32, goals_against: u32) -> i64 {
    i64::from(goals_for) - i64::from(goals_against)
}

/// Percentage of games won, 0 when nothing has been played.
pub fn win_rate(wins: u32, played: u32) -> f64 {
    if played > 0 { f64::from(wins) / f64::from(played) * 100.0 } else { 0.0 }
}

pub fn format_win_rate(rate: f64) -> String {
    format!("{rate:.1}%")
}

pub fn format_goal_difference(diff: i64) -> String {
    if diff > 0 { format!("+{diff}") } else { diff.to_string() }
}

/// Live numbers shown next to the ranking editor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RankingPreview {
    pub points: u64,
    pub goal_difference: i64,
    pub win_rate: f64,
}

impl RankingPreview {
    pub fn compute(played: u32, wins: u32, draws: u32, goals_for: u32, goals_against: u32) -> Self {
        Self {
            points: points(wins, draws),
            goal_difference: goal_difference(goals_for, goals_against),
            win_rate: win_rate(wins, played),
        }
    }
}

impl Ranking {
    pub fn goal_difference(&self) -> i64 {
        goal_difference(self.goals_for, self.goals_against)
    }

    pub fn win_rate(&self) -> f64 {
        win_rate(self.wins, self.played)
    }
}

/// League table order: points, then goal difference, then goals scored.
pub fn standings(rankings: &[Ranking]) -> Vec<&Ranking> {
    let mut table: Vec<&Ranking> = rankings.iter().collect();
    table.sort_by_key(|r| (Reverse(r.points), Reverse(r.goal_difference()), Reverse(r.goals_for)));
    table
}

/// `(team label, points)` bars in table order.
pub fn points_chart(rankings: &[Ranking], teams: &[Team]) -> Vec<(String, u64)> {
    let teams_by_id = index_by_id(teams);
    standings(rankings)
        .into_iter()
        .map(|r| {
            let label = r
                .team_id
                .and_then(|id| teams_by_id.get(&id))
                .map(|t| t.name.clone())
                .unwrap_or_else(|| format!("#{}", r.team_id.unwrap_or_default()));
            (label, u64::from(r.points))
        })
        .collect()
}

/// Dashboard counters. Every input may be empty when its fetch failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub tournaments: usize,
    pub leagues: usize,
    pub teams: usize,
    pub players: usize,
    pub games: usize,
    pub live_games: usize,
    pub upcoming_games: usize,
    pub completed_games: usize,
    pub active_referees: usize,
    pub total_goals: u64,
}

impl DashboardStats {
    pub fn from_collections(
        tournaments: &[Tournament],
        leagues: &[League],
        teams: &[Team],
        players: &[Player],
        games: &[Game],
        referees: &[Referee],
    ) -> Self {
        let count = |status: GameStatus| games.iter().filter(|g| g.status == status).count();
        Self {
            tournaments: tournaments.len(),
            leagues: leagues.len(),
            teams: teams.len(),
            players: players.len(),
            games: games.len(),
            live_games: count(GameStatus::Live),
            upcoming_games: count(GameStatus::Scheduled),
            completed_games: count(GameStatus::Completed),
            active_referees: referees.iter().filter(|r| r.is_active).count(),
            total_goals: players.iter().map(|p| u64::from(p.goals)).sum(),
        }
    }
}
