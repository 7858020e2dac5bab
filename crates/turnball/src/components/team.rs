use serde::{Deserialize, Serialize};

use crate::api::types::{PlayerId, Side};
use crate::components::player::Player;
use crate::config::MatchConfig;
use crate::core::field::Field;
use crate::tactics::{Tactic, PLAYERS_PER_TEAM};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub side: Side,
    pub players: [Player; PLAYERS_PER_TEAM],
    pub score: u32,
    /// Resolved at match start; read-only afterwards.
    pub tactic: Tactic,
}

impl Team {
    /// Build a team standing on its kickoff spots. `tactic` must be validated.
    pub fn new(side: Side, tactic: Tactic, field: &Field, config: &MatchConfig) -> Self {
        let spots = tactic.kickoff_positions(side, field);
        let players = std::array::from_fn(|i| {
            Player::new(
                PlayerId::new(side, i as u8 + 1),
                config.player_radius,
                config.player_mass,
            )
            .with_pos(spots[i])
        });
        Self {
            side,
            players,
            score: 0,
            tactic,
        }
    }

    /// Player by 1-based index.
    pub fn player(&self, index: u8) -> Option<&Player> {
        index.checked_sub(1).and_then(|slot| self.players.get(slot as usize))
    }

    pub fn player_mut(&mut self, index: u8) -> Option<&mut Player> {
        index
            .checked_sub(1)
            .and_then(move |slot| self.players.get_mut(slot as usize))
    }

    pub fn selected(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.selected)
    }

    /// Select one player, clearing any previous selection.
    pub fn select_only(&mut self, index: u8) {
        for player in &mut self.players {
            if player.id.index == index {
                player.select();
            } else if player.selected {
                player.deselect();
            }
        }
    }

    pub fn clear_selection(&mut self) {
        for player in &mut self.players {
            player.deselect();
        }
    }

    /// Put every player back on its kickoff spot, at rest.
    pub fn reset_to_kickoff(&mut self, field: &Field) {
        let spots = self.tactic.kickoff_positions(self.side, field);
        for (player, spot) in self.players.iter_mut().zip(spots) {
            player.place(spot);
        }
    }

    pub fn any_moving(&self) -> bool {
        self.players.iter().any(|p| p.body.is_moving())
    }
}

/// Mutable access to two distinct players at once, across or within teams.
///
/// Returns `None` when both ids name the same player.
pub fn pair_mut(
    teams: &mut [Team; 2],
    a: PlayerId,
    b: PlayerId,
) -> Option<(&mut Player, &mut Player)> {
    if a == b {
        return None;
    }
    if a.side == b.side {
        let players = &mut teams[a.side.index()].players;
        let (lo, hi) = (a.slot().min(b.slot()), a.slot().max(b.slot()));
        let (left, right) = players.split_at_mut(hi);
        let (first, second) = (&mut left[lo], &mut right[0]);
        return Some(if a.slot() < b.slot() {
            (first, second)
        } else {
            (second, first)
        });
    }
    let [team_a, team_b] = teams;
    let pa = &mut team_a.players[if a.side == Side::A { a.slot() } else { b.slot() }];
    let pb = &mut team_b.players[if a.side == Side::A { b.slot() } else { a.slot() }];
    Some(if a.side == Side::A { (pa, pb) } else { (pb, pa) })
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn teams() -> [Team; 2] {
        let config = MatchConfig::default();
        let field = Field::from_config(&config);
        [
            Team::new(Side::A, Tactic::balanced(), &field, &config),
            Team::new(Side::B, Tactic::balanced(), &field, &config),
        ]
    }

    #[test]
    fn indices_are_one_based() {
        let [a, _] = teams();
        assert_eq!(a.player(1).unwrap().id.index, 1);
        assert!(a.player(0).is_none());
        assert!(a.player(6).is_none());
    }

    #[test]
    fn only_one_selected() {
        let [mut a, _] = teams();
        a.select_only(2);
        a.select_only(4);
        assert_eq!(a.players.iter().filter(|p| p.selected).count(), 1);
        assert_eq!(a.selected().unwrap().id.index, 4);
    }

    #[test]
    fn pair_mut_keeps_argument_order() {
        let mut t = teams();
        let a3 = PlayerId::new(Side::A, 3);
        let a1 = PlayerId::new(Side::A, 1);
        let b2 = PlayerId::new(Side::B, 2);

        let (p, q) = pair_mut(&mut t, a3, a1).unwrap();
        assert_eq!((p.id, q.id), (a3, a1));
        let (p, q) = pair_mut(&mut t, b2, a3).unwrap();
        assert_eq!((p.id, q.id), (b2, a3));
        assert!(pair_mut(&mut t, a1, a1).is_none());
    }

    #[test]
    fn reset_returns_to_spots() {
        let config = MatchConfig::default();
        let field = Field::from_config(&config);
        let mut team = Team::new(Side::B, Tactic::wide(), &field, &config);
        let start: Vec<Vec2> = team.players.iter().map(|p| p.body.pos).collect();
        team.players[2].body.pos = Vec2::new(0.0, 0.0);
        team.players[2].body.vel = Vec2::new(10.0, 0.0);
        team.reset_to_kickoff(&field);
        assert!(!team.any_moving());
        for (p, s) in team.players.iter().zip(start) {
            assert_eq!(p.body.pos, s);
        }
    }
}
