use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::board::{Board, EdgeId, NodeId, normalize_edge};
use crate::types::Color;

pub const MIN_LONGEST_ROAD: usize = 5;
pub const MIN_LARGEST_ARMY: u8 = 3;

/// Longest simple path (no edge reused) over the color's roads. A path may end
/// on a node holding another color's building but never continues through it.
pub fn longest_road_length(board: &Board, color: Color) -> usize {
    let roads: HashSet<EdgeId> = board.roads_of(color).collect();
    if roads.is_empty() {
        return 0;
    }
    let starts: BTreeSet<NodeId> = roads.iter().flat_map(|(a, b)| [*a, *b]).collect();
    let mut visited = HashSet::new();
    starts
        .into_iter()
        .map(|start| longest_from(board, color, &roads, start, &mut visited))
        .max()
        .unwrap_or(0)
}

fn longest_from(
    board: &Board,
    color: Color,
    roads: &HashSet<EdgeId>,
    node: NodeId,
    visited: &mut HashSet<EdgeId>,
) -> usize {
    let mut best = 0;
    for neighbor in board.map.neighbors(node) {
        let edge = normalize_edge((node, neighbor));
        if !roads.contains(&edge) || visited.contains(&edge) {
            continue;
        }
        visited.insert(edge);
        let blocked = board
            .building_at(neighbor)
            .is_some_and(|building| building.color != color);
        let tail = if blocked {
            0
        } else {
            longest_from(board, color, roads, neighbor, visited)
        };
        visited.remove(&edge);
        best = best.max(1 + tail);
    }
    best
}

/// Holder of a 2-point trophy. Ties keep the incumbent; a tie without the
/// incumbent among the leaders leaves the trophy unassigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trophy {
    holder: Option<Color>,
}

impl Trophy {
    pub fn holder(&self) -> Option<Color> {
        self.holder
    }

    pub fn is_held_by(&self, color: Color) -> bool {
        self.holder == Some(color)
    }

    /// Re-evaluates the holder from per-color scores. Returns true when it changed.
    pub fn update<T: Ord + Copy>(
        &mut self,
        scores: impl IntoIterator<Item = (Color, T)>,
        minimum: T,
    ) -> bool {
        let scores: Vec<(Color, T)> = scores.into_iter().collect();
        let next = match scores.iter().map(|(_, score)| *score).max() {
            Some(best) if best >= minimum => {
                let leaders: Vec<Color> = scores
                    .iter()
                    .filter(|(_, score)| *score == best)
                    .map(|(color, _)| *color)
                    .collect();
                match self.holder {
                    Some(holder) if leaders.contains(&holder) => Some(holder),
                    _ if leaders.len() == 1 => Some(leaders[0]),
                    _ => None,
                }
            }
            _ => None,
        };
        let changed = next != self.holder;
        self.holder = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::board::{CatanMap, MapType};

    fn board() -> Board {
        let map = CatanMap::build_with_rng(MapType::Base, &mut StdRng::seed_from_u64(11));
        Board::new(map, MapType::Base)
    }

    /// Walks `len` edges from `start` without revisiting a node.
    fn chain(board: &Board, start: NodeId, len: usize) -> Vec<NodeId> {
        let mut path = vec![start];
        while path.len() <= len {
            let last = *path.last().unwrap();
            let next = board
                .map
                .neighbors(last)
                .find(|n| board.map.land_nodes.contains(n) && !path.contains(n))
                .unwrap();
            path.push(next);
        }
        path
    }

    #[test]
    fn straight_chain_counts_every_edge() {
        let mut board = board();
        let path = chain(&board, 0, 5);
        for pair in path.windows(2) {
            board.place_road(Color::Red, (pair[0], pair[1]));
        }
        assert_eq!(board.longest_road_length(Color::Red), 5);
        assert_eq!(longest_road_length(&board, Color::Blue), 0);
    }

    #[test]
    fn opponent_settlement_splits_the_road() {
        let mut board = board();
        let path = chain(&board, 0, 5);
        for pair in path.windows(2) {
            board.place_road(Color::Red, (pair[0], pair[1]));
        }
        board.place_settlement(Color::Blue, path[2]);
        assert_eq!(board.longest_road_length(Color::Red), 3);
    }

    #[test]
    fn own_settlement_does_not_split_the_road() {
        let mut board = board();
        let path = chain(&board, 0, 4);
        for pair in path.windows(2) {
            board.place_road(Color::Red, (pair[0], pair[1]));
        }
        board.place_settlement(Color::Red, path[2]);
        assert_eq!(board.longest_road_length(Color::Red), 4);
    }

    #[test]
    fn trophy_requires_minimum_and_strict_lead() {
        let mut trophy = Trophy::default();
        assert!(!trophy.update([(Color::Red, 4usize), (Color::Blue, 2)], MIN_LONGEST_ROAD));
        assert_eq!(trophy.holder(), None);

        assert!(!trophy.update([(Color::Red, 5usize), (Color::Blue, 5)], MIN_LONGEST_ROAD));
        assert_eq!(trophy.holder(), None);

        assert!(trophy.update([(Color::Red, 6usize), (Color::Blue, 5)], MIN_LONGEST_ROAD));
        assert_eq!(trophy.holder(), Some(Color::Red));
    }

    #[test]
    fn trophy_ties_favour_incumbent() {
        let mut trophy = Trophy::default();
        trophy.update([(Color::Red, 3u8), (Color::Blue, 0)], MIN_LARGEST_ARMY);
        assert!(trophy.is_held_by(Color::Red));
        assert!(!trophy.update([(Color::Red, 3u8), (Color::Blue, 3)], MIN_LARGEST_ARMY));
        assert!(trophy.is_held_by(Color::Red));
        assert!(trophy.update([(Color::Red, 3u8), (Color::Blue, 4)], MIN_LARGEST_ARMY));
        assert!(trophy.is_held_by(Color::Blue));
    }

    #[test]
    fn trophy_is_dropped_when_incumbent_falls_into_a_tie_it_is_not_part_of() {
        let mut trophy = Trophy::default();
        trophy.update([(Color::Red, 7usize), (Color::Blue, 6), (Color::White, 6)], 5);
        assert!(trophy.is_held_by(Color::Red));
        assert!(trophy.update([(Color::Red, 4usize), (Color::Blue, 6), (Color::White, 6)], 5));
        assert_eq!(trophy.holder(), None);
    }
}
