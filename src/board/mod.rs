use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::coords::{CubeCoord, Direction};
use crate::types::{EdgeRef, NodeRef, Resource};

mod occupancy;

pub use occupancy::{Board, Building};

pub type NodeId = u16;
/// Unordered node pair, always stored as `(min, max)`.
pub type EdgeId = (NodeId, NodeId);

type NodeMap = BTreeMap<NodeRef, NodeId>;
type EdgeMap = BTreeMap<EdgeRef, EdgeId>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandTile {
    pub id: u16,
    pub resource: Option<Resource>,
    pub number: Option<u8>,
    pub nodes: NodeMap,
    pub edges: EdgeMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: u16,
    pub resource: Option<Resource>,
    pub direction: Direction,
    pub nodes: NodeMap,
    pub edges: EdgeMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Water {
    pub nodes: NodeMap,
    pub edges: EdgeMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Land(LandTile),
    Port(Port),
    Water(Water),
}

impl Tile {
    pub fn nodes(&self) -> &NodeMap {
        match self {
            Tile::Land(tile) => &tile.nodes,
            Tile::Port(port) => &port.nodes,
            Tile::Water(water) => &water.nodes,
        }
    }

    pub fn edges(&self) -> &EdgeMap {
        match self {
            Tile::Land(tile) => &tile.edges,
            Tile::Port(port) => &port.edges,
            Tile::Water(water) => &water.edges,
        }
    }
}

#[derive(Debug, Clone)]
pub enum TileTemplate {
    Land,
    Water,
    Port(Direction),
}

#[derive(Debug, Clone)]
pub struct MapTemplate {
    pub numbers: Vec<u8>,
    pub port_resources: Vec<Option<Resource>>,
    pub tile_resources: Vec<Option<Resource>>,
    pub topology: Vec<(CubeCoord, TileTemplate)>,
}

impl MapTemplate {
    pub fn base() -> &'static MapTemplate {
        &BASE_TEMPLATE
    }

    pub fn mini() -> &'static MapTemplate {
        &MINI_TEMPLATE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MapType {
    #[default]
    Base,
    Tournament,
    Mini,
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MapType::Base => "BASE",
            MapType::Tournament => "TOURNAMENT",
            MapType::Mini => "MINI",
        };
        write!(f, "{label}")
    }
}

impl FromStr for MapType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(MapType::Base),
            "tournament" => Ok(MapType::Tournament),
            "mini" => Ok(MapType::Mini),
            _ => Err(format!("unknown map type: {s}")),
        }
    }
}

/// Fixed sequences that replace the shuffled template pools. Values are consumed from the back.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapShuffleOverrides<'a> {
    pub numbers: Option<&'a [u8]>,
    pub port_resources: Option<&'a [Option<Resource>]>,
    pub tile_resources: Option<&'a [Option<Resource>]>,
}

/// Static topology of a generated map. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatanMap {
    pub tiles: BTreeMap<CubeCoord, Tile>,
    pub land_tiles: BTreeMap<CubeCoord, LandTile>,
    pub port_nodes: HashMap<Option<Resource>, BTreeSet<NodeId>>,
    pub land_nodes: BTreeSet<NodeId>,
    pub land_edges: BTreeSet<EdgeId>,
    pub adjacent_tiles: HashMap<NodeId, Vec<CubeCoord>>,
    pub node_neighbors: HashMap<NodeId, BTreeSet<NodeId>>,
}

impl CatanMap {
    pub fn from_template_with_rng(
        template: &MapTemplate,
        overrides: MapShuffleOverrides<'_>,
        rng: &mut impl rand::Rng,
    ) -> Self {
        let tiles = initialize_tiles(template, overrides, rng);
        Self::from_tiles(tiles)
    }

    pub fn from_tiles(tiles: BTreeMap<CubeCoord, Tile>) -> Self {
        let land_tiles: BTreeMap<CubeCoord, LandTile> = tiles
            .iter()
            .filter_map(|(coord, tile)| match tile {
                Tile::Land(land) => Some((*coord, land.clone())),
                _ => None,
            })
            .collect();

        let mut port_nodes: HashMap<Option<Resource>, BTreeSet<NodeId>> = HashMap::new();
        for tile in tiles.values() {
            if let Tile::Port(port) = tile {
                let (first_ref, second_ref) = port_node_refs(port.direction);
                let entry = port_nodes.entry(port.resource).or_default();
                entry.extend(port.nodes.get(&first_ref).copied());
                entry.extend(port.nodes.get(&second_ref).copied());
            }
        }

        let land_nodes: BTreeSet<NodeId> = land_tiles
            .values()
            .flat_map(|tile| tile.nodes.values().copied())
            .collect();

        let mut adjacent_tiles: HashMap<NodeId, Vec<CubeCoord>> = HashMap::new();
        for (coord, tile) in &land_tiles {
            for node_id in tile.nodes.values() {
                adjacent_tiles.entry(*node_id).or_default().push(*coord);
            }
        }

        let mut node_neighbors: HashMap<NodeId, BTreeSet<NodeId>> = HashMap::new();
        let mut land_edges = BTreeSet::new();
        for tile in tiles.values() {
            for edge in tile.edges().values() {
                let (a, b) = *edge;
                node_neighbors.entry(a).or_default().insert(b);
                node_neighbors.entry(b).or_default().insert(a);
                if land_nodes.contains(&a) && land_nodes.contains(&b) {
                    land_edges.insert(normalize_edge(*edge));
                }
            }
        }

        Self {
            tiles,
            land_tiles,
            port_nodes,
            land_nodes,
            land_edges,
            adjacent_tiles,
            node_neighbors,
        }
    }

    pub fn build_with_rng(map_type: MapType, rng: &mut impl rand::Rng) -> Self {
        match map_type {
            MapType::Base => CatanMap::from_template_with_rng(
                MapTemplate::base(),
                MapShuffleOverrides::default(),
                rng,
            ),
            MapType::Mini => CatanMap::from_template_with_rng(
                MapTemplate::mini(),
                MapShuffleOverrides::default(),
                rng,
            ),
            MapType::Tournament => build_tournament_map(rng),
        }
    }

    pub fn desert_coordinate(&self) -> Option<CubeCoord> {
        self.land_tiles
            .iter()
            .find(|(_, tile)| tile.resource.is_none())
            .map(|(coord, _)| *coord)
    }

    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node_neighbors
            .get(&node)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}

pub fn normalize_edge(edge: EdgeId) -> EdgeId {
    if edge.0 <= edge.1 {
        edge
    } else {
        (edge.1, edge.0)
    }
}

pub fn edge_contains_node(edge: EdgeId, node: NodeId) -> bool {
    edge.0 == node || edge.1 == node
}

fn build_tournament_map(rng: &mut impl rand::Rng) -> CatanMap {
    static TOURNAMENT_NUMBERS: Lazy<Vec<u8>> =
        Lazy::new(|| vec![10, 8, 3, 6, 2, 5, 10, 8, 4, 11, 12, 9, 5, 4, 9, 11, 3, 6]);
    static TOURNAMENT_PORTS: Lazy<Vec<Option<Resource>>> = Lazy::new(|| {
        vec![
            None,
            Some(Resource::Sheep),
            None,
            Some(Resource::Ore),
            Some(Resource::Wheat),
            None,
            Some(Resource::Wood),
            Some(Resource::Brick),
            None,
        ]
    });
    static TOURNAMENT_TILES: Lazy<Vec<Option<Resource>>> = Lazy::new(|| {
        vec![
            Some(Resource::Wood),
            Some(Resource::Sheep),
            Some(Resource::Sheep),
            Some(Resource::Wood),
            Some(Resource::Wheat),
            Some(Resource::Wood),
            Some(Resource::Wheat),
            Some(Resource::Brick),
            Some(Resource::Sheep),
            Some(Resource::Brick),
            Some(Resource::Sheep),
            Some(Resource::Wheat),
            Some(Resource::Wheat),
            Some(Resource::Ore),
            Some(Resource::Brick),
            Some(Resource::Ore),
            Some(Resource::Wood),
            Some(Resource::Ore),
            None,
        ]
    });

    CatanMap::from_template_with_rng(
        MapTemplate::base(),
        MapShuffleOverrides {
            numbers: Some(TOURNAMENT_NUMBERS.as_slice()),
            port_resources: Some(TOURNAMENT_PORTS.as_slice()),
            tile_resources: Some(TOURNAMENT_TILES.as_slice()),
        },
        rng,
    )
}

fn shuffled_pool<T: Clone>(
    fixed: Option<&[T]>,
    template: &[T],
    rng: &mut impl rand::Rng,
) -> Vec<T> {
    match fixed {
        Some(values) => values.to_vec(),
        None => {
            let mut pool = template.to_vec();
            pool.shuffle(rng);
            pool
        }
    }
}

fn initialize_tiles(
    template: &MapTemplate,
    overrides: MapShuffleOverrides<'_>,
    rng: &mut impl rand::Rng,
) -> BTreeMap<CubeCoord, Tile> {
    let mut numbers = shuffled_pool(overrides.numbers, &template.numbers, rng);
    let mut port_resources =
        shuffled_pool(overrides.port_resources, &template.port_resources, rng);
    let mut tile_resources =
        shuffled_pool(overrides.tile_resources, &template.tile_resources, rng);

    let mut tiles: BTreeMap<CubeCoord, Tile> = BTreeMap::new();
    let mut node_autoinc: NodeId = 0;
    let mut land_autoinc: u16 = 0;
    let mut port_autoinc: u16 = 0;

    for (coord, template_kind) in &template.topology {
        let (nodes, edges, next_autoinc) = get_nodes_and_edges(&tiles, *coord, node_autoinc);
        node_autoinc = next_autoinc;

        match template_kind {
            TileTemplate::Land => {
                // Template pools are sized to the topology; an exhausted pool means a desert slot.
                let resource = tile_resources.pop().flatten();
                let number = match resource {
                    Some(_) => numbers.pop(),
                    None => None,
                };
                let tile = LandTile {
                    id: land_autoinc,
                    resource,
                    number,
                    nodes,
                    edges,
                };
                tiles.insert(*coord, Tile::Land(tile));
                land_autoinc += 1;
            }
            TileTemplate::Water => {
                tiles.insert(*coord, Tile::Water(Water { nodes, edges }));
            }
            TileTemplate::Port(direction) => {
                let resource = port_resources.pop().flatten();
                let port = Port {
                    id: port_autoinc,
                    resource,
                    direction: *direction,
                    nodes,
                    edges,
                };
                tiles.insert(*coord, Tile::Port(port));
                port_autoinc += 1;
            }
        }
    }

    tiles
}

/// Node refs shared with the neighbour lying in `direction`, as `(ours, theirs)`.
fn shared_refs(direction: Direction) -> [(NodeRef, NodeRef); 2] {
    match direction {
        Direction::East => [
            (NodeRef::NorthEast, NodeRef::NorthWest),
            (NodeRef::SouthEast, NodeRef::SouthWest),
        ],
        Direction::SouthEast => [
            (NodeRef::South, NodeRef::NorthWest),
            (NodeRef::SouthEast, NodeRef::North),
        ],
        Direction::SouthWest => [
            (NodeRef::South, NodeRef::NorthEast),
            (NodeRef::SouthWest, NodeRef::North),
        ],
        Direction::West => [
            (NodeRef::NorthWest, NodeRef::NorthEast),
            (NodeRef::SouthWest, NodeRef::SouthEast),
        ],
        Direction::NorthWest => [
            (NodeRef::North, NodeRef::SouthEast),
            (NodeRef::NorthWest, NodeRef::South),
        ],
        Direction::NorthEast => [
            (NodeRef::North, NodeRef::SouthWest),
            (NodeRef::NorthEast, NodeRef::South),
        ],
    }
}

fn shared_edge(direction: Direction) -> (EdgeRef, EdgeRef) {
    match direction {
        Direction::East => (EdgeRef::East, EdgeRef::West),
        Direction::SouthEast => (EdgeRef::SouthEast, EdgeRef::NorthWest),
        Direction::SouthWest => (EdgeRef::SouthWest, EdgeRef::NorthEast),
        Direction::West => (EdgeRef::West, EdgeRef::East),
        Direction::NorthWest => (EdgeRef::NorthWest, EdgeRef::SouthEast),
        Direction::NorthEast => (EdgeRef::NorthEast, EdgeRef::SouthWest),
    }
}

fn get_nodes_and_edges(
    tiles: &BTreeMap<CubeCoord, Tile>,
    coordinate: CubeCoord,
    mut node_autoinc: NodeId,
) -> (NodeMap, EdgeMap, NodeId) {
    let mut nodes: BTreeMap<NodeRef, Option<NodeId>> =
        NodeRef::iter().map(|n| (n, None)).collect();
    let mut edges: BTreeMap<EdgeRef, Option<EdgeId>> =
        EdgeRef::iter().map(|e| (e, None)).collect();

    for direction in Direction::iter() {
        let Some(neighbor) = tiles.get(&coordinate.neighbor(direction)) else {
            continue;
        };
        for (ours, theirs) in shared_refs(direction) {
            nodes.insert(ours, neighbor.nodes().get(&theirs).copied());
        }
        let (ours, theirs) = shared_edge(direction);
        edges.insert(ours, neighbor.edges().get(&theirs).copied());
    }

    // BTreeMap iteration follows NodeRef declaration order, so ids are deterministic.
    let mut finalized_nodes = NodeMap::new();
    for (node_ref, node_entry) in nodes {
        let id = match node_entry {
            Some(id) => id,
            None => {
                let id = node_autoinc;
                node_autoinc += 1;
                id
            }
        };
        finalized_nodes.insert(node_ref, id);
    }

    let mut finalized_edges = EdgeMap::new();
    for (edge_ref, value) in edges {
        let edge = match value {
            Some(edge) => edge,
            None => {
                let (a_ref, b_ref) = get_edge_nodes(edge_ref);
                normalize_edge((finalized_nodes[&a_ref], finalized_nodes[&b_ref]))
            }
        };
        finalized_edges.insert(edge_ref, edge);
    }

    (finalized_nodes, finalized_edges, node_autoinc)
}

fn get_edge_nodes(edge_ref: EdgeRef) -> (NodeRef, NodeRef) {
    match edge_ref {
        EdgeRef::East => (NodeRef::NorthEast, NodeRef::SouthEast),
        EdgeRef::SouthEast => (NodeRef::SouthEast, NodeRef::South),
        EdgeRef::SouthWest => (NodeRef::South, NodeRef::SouthWest),
        EdgeRef::West => (NodeRef::SouthWest, NodeRef::NorthWest),
        EdgeRef::NorthWest => (NodeRef::NorthWest, NodeRef::North),
        EdgeRef::NorthEast => (NodeRef::North, NodeRef::NorthEast),
    }
}

fn port_node_refs(direction: Direction) -> (NodeRef, NodeRef) {
    match direction {
        Direction::West => (NodeRef::NorthWest, NodeRef::SouthWest),
        Direction::NorthWest => (NodeRef::North, NodeRef::NorthWest),
        Direction::NorthEast => (NodeRef::NorthEast, NodeRef::North),
        Direction::East => (NodeRef::SouthEast, NodeRef::NorthEast),
        Direction::SouthEast => (NodeRef::South, NodeRef::SouthEast),
        Direction::SouthWest => (NodeRef::SouthWest, NodeRef::South),
    }
}

static BASE_TEMPLATE: Lazy<MapTemplate> = Lazy::new(|| MapTemplate {
    numbers: vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12],
    port_resources: vec![
        Some(Resource::Wood),
        Some(Resource::Brick),
        Some(Resource::Sheep),
        Some(Resource::Wheat),
        Some(Resource::Ore),
        None,
        None,
        None,
        None,
    ],
    tile_resources: vec![
        Some(Resource::Wood),
        Some(Resource::Wood),
        Some(Resource::Wood),
        Some(Resource::Wood),
        Some(Resource::Brick),
        Some(Resource::Brick),
        Some(Resource::Brick),
        Some(Resource::Sheep),
        Some(Resource::Sheep),
        Some(Resource::Sheep),
        Some(Resource::Sheep),
        Some(Resource::Wheat),
        Some(Resource::Wheat),
        Some(Resource::Wheat),
        Some(Resource::Wheat),
        Some(Resource::Ore),
        Some(Resource::Ore),
        Some(Resource::Ore),
        None,
    ],
    topology: base_topology(),
});

static MINI_TEMPLATE: Lazy<MapTemplate> = Lazy::new(|| MapTemplate {
    numbers: vec![3, 4, 5, 6, 8, 9, 10],
    port_resources: vec![],
    tile_resources: vec![
        Some(Resource::Wood),
        None,
        Some(Resource::Brick),
        Some(Resource::Sheep),
        Some(Resource::Wheat),
        Some(Resource::Wheat),
        Some(Resource::Ore),
    ],
    topology: mini_topology(),
});

fn base_topology() -> Vec<(CubeCoord, TileTemplate)> {
    use TileTemplate::*;
    vec![
        (CubeCoord::new(0, 0, 0), Land),
        (CubeCoord::new(1, -1, 0), Land),
        (CubeCoord::new(0, -1, 1), Land),
        (CubeCoord::new(-1, 0, 1), Land),
        (CubeCoord::new(-1, 1, 0), Land),
        (CubeCoord::new(0, 1, -1), Land),
        (CubeCoord::new(1, 0, -1), Land),
        (CubeCoord::new(2, -2, 0), Land),
        (CubeCoord::new(1, -2, 1), Land),
        (CubeCoord::new(0, -2, 2), Land),
        (CubeCoord::new(-1, -1, 2), Land),
        (CubeCoord::new(-2, 0, 2), Land),
        (CubeCoord::new(-2, 1, 1), Land),
        (CubeCoord::new(-2, 2, 0), Land),
        (CubeCoord::new(-1, 2, -1), Land),
        (CubeCoord::new(0, 2, -2), Land),
        (CubeCoord::new(1, 1, -2), Land),
        (CubeCoord::new(2, 0, -2), Land),
        (CubeCoord::new(2, -1, -1), Land),
        (CubeCoord::new(3, -3, 0), Port(Direction::West)),
        (CubeCoord::new(2, -3, 1), Water),
        (CubeCoord::new(1, -3, 2), Port(Direction::NorthWest)),
        (CubeCoord::new(0, -3, 3), Water),
        (CubeCoord::new(-1, -2, 3), Port(Direction::NorthWest)),
        (CubeCoord::new(-2, -1, 3), Water),
        (CubeCoord::new(-3, 0, 3), Port(Direction::NorthEast)),
        (CubeCoord::new(-3, 1, 2), Water),
        (CubeCoord::new(-3, 2, 1), Port(Direction::East)),
        (CubeCoord::new(-3, 3, 0), Water),
        (CubeCoord::new(-2, 3, -1), Port(Direction::East)),
        (CubeCoord::new(-1, 3, -2), Water),
        (CubeCoord::new(0, 3, -3), Port(Direction::SouthEast)),
        (CubeCoord::new(1, 2, -3), Water),
        (CubeCoord::new(2, 1, -3), Port(Direction::SouthWest)),
        (CubeCoord::new(3, 0, -3), Water),
        (CubeCoord::new(3, -1, -2), Port(Direction::SouthWest)),
        (CubeCoord::new(3, -2, -1), Water),
    ]
}

fn mini_topology() -> Vec<(CubeCoord, TileTemplate)> {
    use TileTemplate::*;
    vec![
        (CubeCoord::new(0, 0, 0), Land),
        (CubeCoord::new(1, -1, 0), Land),
        (CubeCoord::new(0, -1, 1), Land),
        (CubeCoord::new(-1, 0, 1), Land),
        (CubeCoord::new(-1, 1, 0), Land),
        (CubeCoord::new(0, 1, -1), Land),
        (CubeCoord::new(1, 0, -1), Land),
        (CubeCoord::new(2, -2, 0), Water),
        (CubeCoord::new(1, -2, 1), Water),
        (CubeCoord::new(0, -2, 2), Water),
        (CubeCoord::new(-1, -1, 2), Water),
        (CubeCoord::new(-2, 0, 2), Water),
        (CubeCoord::new(-2, 1, 1), Water),
        (CubeCoord::new(-2, 2, 0), Water),
        (CubeCoord::new(-1, 2, -1), Water),
        (CubeCoord::new(0, 2, -2), Water),
        (CubeCoord::new(1, 1, -2), Water),
        (CubeCoord::new(2, 0, -2), Water),
        (CubeCoord::new(2, -1, -1), Water),
    ]
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn base_map() -> CatanMap {
        CatanMap::build_with_rng(MapType::Base, &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn base_map_has_standard_dimensions() {
        let map = base_map();
        assert_eq!(map.land_tiles.len(), 19);
        assert_eq!(map.land_nodes.len(), 54);
        assert_eq!(map.land_edges.len(), 72);
        let deserts = map
            .land_tiles
            .values()
            .filter(|tile| tile.resource.is_none())
            .count();
        assert_eq!(deserts, 1);
    }

    #[test]
    fn desert_has_no_number_and_others_do() {
        let map = base_map();
        for tile in map.land_tiles.values() {
            assert_eq!(tile.resource.is_none(), tile.number.is_none());
        }
    }

    #[test]
    fn every_land_node_touches_one_to_three_tiles() {
        let map = base_map();
        for node in &map.land_nodes {
            let count = map.adjacent_tiles[node].len();
            assert!((1..=3).contains(&count), "node {node} touches {count} tiles");
            let degree = map.neighbors(*node).count();
            assert!((2..=3).contains(&degree), "node {node} has degree {degree}");
        }
    }

    #[test]
    fn base_ports_cover_two_nodes_each() {
        let map = base_map();
        let generic = map.port_nodes.get(&None).map(|s| s.len()).unwrap_or(0);
        assert_eq!(generic, 8);
        for resource in Resource::ALL {
            assert_eq!(map.port_nodes[&Some(resource)].len(), 2);
        }
    }

    #[test]
    fn same_seed_builds_same_map() {
        assert_eq!(base_map(), base_map());
    }

    #[test]
    fn mini_map_has_seven_land_tiles_and_no_ports() {
        let map = CatanMap::build_with_rng(MapType::Mini, &mut StdRng::seed_from_u64(1));
        assert_eq!(map.land_tiles.len(), 7);
        assert_eq!(map.land_nodes.len(), 24);
        assert!(map.port_nodes.is_empty());
    }

    #[test]
    fn map_type_parses_case_insensitively() {
        assert_eq!("tournament".parse::<MapType>(), Ok(MapType::Tournament));
        assert_eq!("MINI".parse::<MapType>(), Ok(MapType::Mini));
        assert!("huge".parse::<MapType>().is_err());
    }
}
