use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::{GameState, Move};

/// Decides what to do after each update.
///
/// Implementors get a read-only view of the reconstructed state and may
/// return at most one move per update.
pub trait MovePolicy {
    fn select_move(&mut self, state: &GameState) -> Option<Move>;
}

/// Tiles the army on `from` may move to: the in-bounds neighbors, minus any
/// visible city.
pub fn legal_destinations(state: &GameState, from: usize) -> Vec<usize> {
    state
        .neighbors(from)
        .filter(|&to| !state.is_city(to))
        .collect()
}

/// Makes a random move from a random tile owned by the local player.
///
/// Picks uniformly among the owned tiles that have somewhere to go, then
/// uniformly among that tile's destinations. Never attacks cities.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl MovePolicy for RandomPolicy {
    fn select_move(&mut self, state: &GameState) -> Option<Move> {
        let player = state.player_index()?;
        let candidates: Vec<(usize, Vec<usize>)> = state
            .owned_tiles(player)
            .map(|from| (from, legal_destinations(state, from)))
            .filter(|(_, destinations)| !destinations.is_empty())
            .collect();
        let (from, destinations) = candidates.choose(&mut self.rng)?;
        let to = *destinations.choose(&mut self.rng)?;
        Some(Move { from: *from, to })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::{full_update, MapInput};
    use crate::GameStateStore;

    fn live_store(map: &[i32], cities: &[i32], player_index: Option<usize>) -> GameStateStore {
        let mut store = GameStateStore::new();
        if let Some(player_index) = player_index {
            store.set_player_index(player_index);
        }
        store.apply_update(&full_update(map, cities)).unwrap();
        store
    }

    fn destinations_over_many_seeds(store: &GameStateStore) -> HashSet<Option<Move>> {
        let state = store.snapshot().unwrap();
        (0..200)
            .map(|seed| RandomPolicy::from_seed(seed).select_move(state))
            .collect()
    }

    quickcheck! {
        fn moves_are_legal(input: MapInput, seed: u64) -> bool {
            let store = live_store(&input.to_buffer(), &input.cities, Some(0));
            let state = store.snapshot().unwrap();
            match RandomPolicy::from_seed(seed).select_move(state) {
                Some(Move { from, to }) => {
                    state.terrain_at(from) == Some(crate::Terrain::Owned(0))
                        && state.neighbors(from).any(|n| n == to)
                        && !state.is_city(to)
                }
                // Only acceptable if there really was no legal move
                None => state
                    .owned_tiles(0)
                    .all(|from| legal_destinations(state, from).is_empty()),
            }
        }
    }

    #[test]
    fn corner_tile_has_two_destinations() {
        // 3x3 map, only the top-left corner is owned
        let store = live_store(
            &[3, 3, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, -1, -1, -1, -1, -1, -1, -1, -1],
            &[],
            Some(0),
        );
        let moves = destinations_over_many_seeds(&store);
        assert_eq!(
            moves,
            HashSet::from([
                Some(Move { from: 0, to: 1 }),
                Some(Move { from: 0, to: 3 })
            ])
        );
    }

    #[test]
    fn never_attacks_cities() {
        // 2x2 map, tile 0 owned, a city on tile 1
        let store = live_store(&[2, 2, 1, 40, 0, 0, 0, -1, -1, -1], &[1], Some(0));
        let moves = destinations_over_many_seeds(&store);
        assert_eq!(moves, HashSet::from([Some(Move { from: 0, to: 2 })]));
    }

    #[test]
    fn boxed_in_tile_is_skipped() {
        // 3x1 map with a city in the middle, both owned tiles can only move onto it
        let store = live_store(&[3, 1, 1, 40, 1, 0, -1, 0], &[1], Some(0));
        assert_eq!(
            destinations_over_many_seeds(&store),
            HashSet::from([None])
        );
    }

    #[test]
    fn no_owned_tiles_means_no_move() {
        let store = live_store(&[2, 2, 0, 0, 0, 0, -1, -3, -3, 1], &[], Some(0));
        assert_eq!(
            RandomPolicy::from_seed(7).select_move(store.snapshot().unwrap()),
            None
        );
    }

    #[test]
    fn no_player_index_means_no_move() {
        let store = live_store(&[1, 2, 1, 0, 0, -1], &[], None);
        assert_eq!(
            RandomPolicy::from_seed(7).select_move(store.snapshot().unwrap()),
            None
        );
    }
}
