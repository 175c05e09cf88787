use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::board::{CatanMap, EdgeId, MapType, NodeId, edge_contains_node, normalize_edge};
use crate::coords::CubeCoord;
use crate::game::trackers::longest_road_length;
use crate::types::{BuildingKind, Color, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Building {
    pub color: Color,
    pub kind: BuildingKind,
}

/// Mutable layer on top of the static map: pieces, robber and per-color road lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub map: CatanMap,
    pub map_type: MapType,
    buildings: BTreeMap<NodeId, Building>,
    roads: BTreeMap<EdgeId, Color>,
    robber_coordinate: CubeCoord,
    road_lengths: HashMap<Color, usize>,
}

impl Board {
    pub fn new(map: CatanMap, map_type: MapType) -> Self {
        let robber_coordinate = map.desert_coordinate().unwrap_or_default();
        Self {
            map,
            map_type,
            buildings: BTreeMap::new(),
            roads: BTreeMap::new(),
            robber_coordinate,
            road_lengths: HashMap::new(),
        }
    }

    pub fn buildings(&self) -> &BTreeMap<NodeId, Building> {
        &self.buildings
    }

    pub fn roads(&self) -> &BTreeMap<EdgeId, Color> {
        &self.roads
    }

    pub fn robber_coordinate(&self) -> CubeCoord {
        self.robber_coordinate
    }

    pub fn building_at(&self, node: NodeId) -> Option<Building> {
        self.buildings.get(&node).copied()
    }

    pub fn road_color(&self, edge: EdgeId) -> Option<Color> {
        self.roads.get(&normalize_edge(edge)).copied()
    }

    pub fn buildings_of(&self, color: Color, kind: BuildingKind) -> impl Iterator<Item = NodeId> + '_ {
        self.buildings
            .iter()
            .filter(move |(_, b)| b.color == color && b.kind == kind)
            .map(|(node, _)| *node)
    }

    pub fn roads_of(&self, color: Color) -> impl Iterator<Item = EdgeId> + '_ {
        self.roads
            .iter()
            .filter(move |(_, c)| **c == color)
            .map(|(edge, _)| *edge)
    }

    pub fn longest_road_length(&self, color: Color) -> usize {
        self.road_lengths.get(&color).copied().unwrap_or(0)
    }

    fn is_enemy_node(&self, node: NodeId, color: Color) -> bool {
        self.buildings
            .get(&node)
            .is_some_and(|building| building.color != color)
    }

    fn violates_distance_rule(&self, node: NodeId) -> bool {
        self.map
            .neighbors(node)
            .any(|neighbor| self.buildings.contains_key(&neighbor))
    }

    /// Nodes where `color` may place a settlement. Outside the initial phase the
    /// node must also sit at the end of one of the color's roads.
    pub fn buildable_node_ids(&self, color: Color, initial_build_phase: bool) -> Vec<NodeId> {
        let candidates: BTreeSet<NodeId> = if initial_build_phase {
            self.map.land_nodes.clone()
        } else {
            self.roads_of(color).flat_map(|(a, b)| [a, b]).collect()
        };
        candidates
            .into_iter()
            .filter(|node| self.map.land_nodes.contains(node))
            .filter(|node| !self.buildings.contains_key(node))
            .filter(|node| !self.violates_distance_rule(*node))
            .collect()
    }

    /// Unowned land edges touching the color's network. Another color's building
    /// cuts the network at its node.
    pub fn buildable_edges(&self, color: Color) -> Vec<EdgeId> {
        let mut frontier: HashSet<NodeId> = self
            .roads_of(color)
            .flat_map(|(a, b)| [a, b])
            .filter(|node| !self.is_enemy_node(*node, color))
            .collect();
        frontier.extend(
            self.buildings
                .iter()
                .filter(|(_, b)| b.color == color)
                .map(|(node, _)| *node),
        );

        self.map
            .land_edges
            .iter()
            .copied()
            .filter(|edge| !self.roads.contains_key(edge))
            .filter(|edge| frontier.contains(&edge.0) || frontier.contains(&edge.1))
            .collect()
    }

    /// Unowned land edges touching `node`, used for the initial road.
    pub fn buildable_edges_from(&self, color: Color, node: NodeId) -> Vec<EdgeId> {
        self.buildable_edges(color)
            .into_iter()
            .filter(|edge| edge_contains_node(*edge, node))
            .collect()
    }

    /// Port resources reachable through the color's settlements and cities.
    /// `None` stands for the generic 3:1 port.
    pub fn get_player_port_resources(&self, color: Color) -> HashSet<Option<Resource>> {
        self.map
            .port_nodes
            .iter()
            .filter(|(_, nodes)| {
                nodes
                    .iter()
                    .any(|node| self.buildings.get(node).is_some_and(|b| b.color == color))
            })
            .map(|(resource, _)| *resource)
            .collect()
    }

    /// Colors owning a building on one of the tile's corners.
    pub fn colors_around(&self, coordinate: CubeCoord) -> BTreeSet<Color> {
        let Some(tile) = self.map.land_tiles.get(&coordinate) else {
            return BTreeSet::new();
        };
        tile.nodes
            .values()
            .filter_map(|node| self.buildings.get(node))
            .map(|b| b.color)
            .collect()
    }

    pub(crate) fn place_settlement(&mut self, color: Color, node: NodeId) {
        self.buildings.insert(
            node,
            Building {
                color,
                kind: BuildingKind::Settlement,
            },
        );
        // A settlement can split an opponent's road network.
        self.refresh_road_lengths();
    }

    pub(crate) fn upgrade_to_city(&mut self, color: Color, node: NodeId) {
        self.buildings.insert(
            node,
            Building {
                color,
                kind: BuildingKind::City,
            },
        );
    }

    pub(crate) fn place_road(&mut self, color: Color, edge: EdgeId) {
        self.roads.insert(normalize_edge(edge), color);
        let length = longest_road_length(self, color);
        self.road_lengths.insert(color, length);
    }

    pub(crate) fn move_robber(&mut self, coordinate: CubeCoord) {
        self.robber_coordinate = coordinate;
    }

    fn refresh_road_lengths(&mut self) {
        let colors: BTreeSet<Color> = self.roads.values().copied().collect();
        for color in colors {
            let length = longest_road_length(self, color);
            self.road_lengths.insert(color, length);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn board() -> Board {
        let map = CatanMap::build_with_rng(MapType::Base, &mut StdRng::seed_from_u64(3));
        Board::new(map, MapType::Base)
    }

    #[test]
    fn robber_starts_on_desert() {
        let board = board();
        let tile = &board.map.land_tiles[&board.robber_coordinate()];
        assert!(tile.resource.is_none());
    }

    #[test]
    fn initial_phase_allows_every_free_land_node() {
        let board = board();
        assert_eq!(board.buildable_node_ids(Color::Red, true).len(), 54);
        assert!(board.buildable_node_ids(Color::Red, false).is_empty());
    }

    #[test]
    fn distance_rule_removes_settlement_neighbours() {
        let mut board = board();
        board.place_settlement(Color::Red, 0);
        let buildable = board.buildable_node_ids(Color::Blue, true);
        assert!(!buildable.contains(&0));
        for neighbor in board.map.neighbors(0) {
            assert!(!buildable.contains(&neighbor));
        }
        assert_eq!(buildable.len(), 54 - 1 - board.map.neighbors(0).count());
    }

    #[test]
    fn settlement_needs_own_road_outside_initial_phase() {
        let mut board = board();
        board.place_settlement(Color::Red, 0);
        let first = board.map.neighbors(0).next().unwrap();
        let second = board
            .map
            .neighbors(first)
            .find(|n| *n != 0 && board.map.land_nodes.contains(n))
            .unwrap();
        board.place_road(Color::Red, (0, first));
        assert!(board.buildable_node_ids(Color::Red, false).is_empty());
        board.place_road(Color::Red, (first, second));
        assert_eq!(board.buildable_node_ids(Color::Red, false), vec![second]);
        assert!(board.buildable_node_ids(Color::Blue, false).is_empty());
    }

    #[test]
    fn buildable_edges_grow_from_settlement_and_roads() {
        let mut board = board();
        board.place_settlement(Color::Red, 0);
        let edges = board.buildable_edges(Color::Red);
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|edge| edge_contains_node(*edge, 0)));

        let first = edges[0];
        board.place_road(Color::Red, first);
        let after = board.buildable_edges(Color::Red);
        assert!(!after.contains(&first));
        assert_eq!(after.len(), 4);
    }

    #[test]
    fn enemy_building_cuts_road_frontier() {
        let mut board = board();
        board.place_settlement(Color::Red, 0);
        let mid = board.map.neighbors(0).next().unwrap();
        board.place_road(Color::Red, (0, mid));
        let far = board
            .map
            .neighbors(mid)
            .find(|n| *n != 0 && board.map.land_nodes.contains(n))
            .unwrap();
        board.place_road(Color::Red, (mid, far));
        let before = board.buildable_edges(Color::Red);
        assert!(before.iter().any(|edge| edge_contains_node(*edge, far) && *edge != normalize_edge((mid, far))));

        board.place_settlement(Color::Blue, far);
        let after = board.buildable_edges(Color::Red);
        assert!(
            after
                .iter()
                .all(|edge| !edge_contains_node(*edge, far))
        );
    }

    #[test]
    fn port_resources_follow_buildings() {
        let mut board = board();
        let (resource, node) = board
            .map
            .port_nodes
            .iter()
            .map(|(resource, nodes)| (*resource, *nodes.iter().next().unwrap()))
            .next()
            .unwrap();
        assert!(board.get_player_port_resources(Color::Red).is_empty());
        board.place_settlement(Color::Red, node);
        assert_eq!(
            board.get_player_port_resources(Color::Red),
            HashSet::from([resource])
        );
    }
}
