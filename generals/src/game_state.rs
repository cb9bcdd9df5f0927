use tracing::trace;

use crate::{decode_map, patch, DecodedMap, GameUpdate, ProtocolError, Terrain};

/// Moves the army on `from` to the adjacent tile `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

/// The four directions an army can move in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Down,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Down,
        Direction::Up,
    ];
}

/// The reconstructed view of the game after the latest update.
///
/// All grids are row-major: tile `i` is in row `i / width`, column `i % width`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    width: usize,
    height: usize,
    armies: Vec<u32>,
    terrain: Vec<Terrain>,
    /// One entry per player, `None` if that general is not visible.
    generals: Vec<Option<usize>>,
    /// The visible cities, in the order the server sent them.
    cities: Vec<usize>,
    player_index: Option<usize>,
}

impl GameState {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The number of tiles.
    pub fn size(&self) -> usize {
        self.width * self.height
    }

    pub fn armies(&self) -> &[u32] {
        &self.armies
    }

    pub fn terrain(&self) -> &[Terrain] {
        &self.terrain
    }

    pub fn generals(&self) -> &[Option<usize>] {
        &self.generals
    }

    pub fn cities(&self) -> &[usize] {
        &self.cities
    }

    /// The index of the local player, once the game has started.
    pub fn player_index(&self) -> Option<usize> {
        self.player_index
    }

    pub fn terrain_at(&self, index: usize) -> Option<Terrain> {
        self.terrain.get(index).copied()
    }

    pub fn is_city(&self, index: usize) -> bool {
        self.cities.contains(&index)
    }

    /// Returns `(row, column)` of a tile, if it is on the map.
    pub fn row_col(&self, index: usize) -> Option<(usize, usize)> {
        (index < self.size()).then(|| (index / self.width, index % self.width))
    }

    /// The tile reached by going one step from `index`, if it is on the map.
    pub fn step(&self, index: usize, direction: Direction) -> Option<usize> {
        let (row, col) = self.row_col(index)?;
        match direction {
            Direction::Left => (col > 0).then(|| index - 1),
            Direction::Right => (col + 1 < self.width).then(|| index + 1),
            Direction::Down => (row + 1 < self.height).then(|| index + self.width),
            Direction::Up => (row > 0).then(|| index - self.width),
        }
    }

    /// The in-bounds cardinal neighbors of a tile.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.step(index, direction))
    }

    /// All tiles owned by the given player.
    pub fn owned_tiles(&self, player: usize) -> impl Iterator<Item = usize> + '_ {
        self.terrain
            .iter()
            .enumerate()
            .filter_map(move |(index, terrain)| (terrain.owner() == Some(player)).then_some(index))
    }
}

/// Owns the game state and keeps it in sync with the server's updates.
///
/// The store is uninitialized until the first update has been applied
/// successfully, and live afterwards.
#[derive(Clone, Debug, Default)]
pub struct GameStateStore {
    /// The raw, patched map buffer.
    map: Vec<i32>,
    /// The raw, patched list of visible cities.
    cities: Vec<i32>,
    player_index: Option<usize>,
    state: Option<GameState>,
    num_updates: usize,
}

impl GameStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the local player's index, which is sent once at game start.
    pub fn set_player_index(&mut self, player_index: usize) {
        self.player_index = Some(player_index);
        if let Some(state) = &mut self.state {
            state.player_index = Some(player_index);
        }
    }

    pub fn is_live(&self) -> bool {
        self.state.is_some()
    }

    /// The number of updates that were applied successfully.
    pub fn num_updates(&self) -> usize {
        self.num_updates
    }

    /// The current state, or `None` if no update has been applied yet.
    pub fn snapshot(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Patches the diffs of an update into the stored buffers and decodes them.
    ///
    /// If this returns an error, the store is left exactly as it was.
    pub fn apply_update(&mut self, update: &GameUpdate) -> Result<&GameState, ProtocolError> {
        let cities_raw = patch(&self.cities, &update.cities_diff).map_err(ProtocolError::CitiesDiff)?;
        let map_raw = patch(&self.map, &update.map_diff).map_err(ProtocolError::MapDiff)?;
        let DecodedMap {
            width,
            height,
            armies,
            terrain,
        } = decode_map(&map_raw)?;
        let size = width * height;

        let cities = cities_raw
            .iter()
            .map(|&city| {
                usize::try_from(city)
                    .ok()
                    .filter(|&tile| tile < size)
                    .ok_or(ProtocolError::CityOutOfBounds { city, size })
            })
            .collect::<Result<Vec<usize>, ProtocolError>>()?;
        let generals = update
            .generals
            .iter()
            .enumerate()
            .map(|(player, general)| match *general {
                // Not visible
                None | Some(-1) => Ok(None),
                Some(tile) => match usize::try_from(tile) {
                    Ok(tile_idx) if tile_idx < size => Ok(Some(tile_idx)),
                    Ok(_) => Err(ProtocolError::GeneralOutOfBounds { player, tile, size }),
                    Err(_) => Err(ProtocolError::InvalidGeneral { player, tile }),
                },
            })
            .collect::<Result<Vec<Option<usize>>, ProtocolError>>()?;

        self.map = map_raw;
        self.cities = cities_raw;
        self.num_updates += 1;
        trace!(
            update = self.num_updates,
            width,
            height,
            cities = cities.len(),
            "Applied update"
        );
        Ok(&*self.state.insert(GameState {
            width,
            height,
            armies,
            terrain,
            generals,
            cities,
            player_index: self.player_index,
        }))
    }
}
