use std::collections::BTreeSet;

use anyhow::Context;
use generals::{GameState, GameStateStore, ServerEvent};

/// Something that was visible after one update and no longer after the next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VisibilityRegression {
    CityVanished {
        update: usize,
        tile: usize,
    },
    GeneralVanished {
        update: usize,
        player: usize,
        tile: usize,
    },
}

/// Tracks which cities and generals have been seen, to check whether
/// visibility only ever grows.
#[derive(Clone, Debug, Default)]
pub struct VisibilityAudit {
    cities: BTreeSet<usize>,
    generals: Vec<Option<usize>>,
}

impl VisibilityAudit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares the state after update number `update` with the previous one.
    pub fn observe(&mut self, update: usize, state: &GameState) -> Vec<VisibilityRegression> {
        let cities: BTreeSet<usize> = state.cities().iter().copied().collect();
        let mut regressions: Vec<VisibilityRegression> = self
            .cities
            .difference(&cities)
            .map(|&tile| VisibilityRegression::CityVanished { update, tile })
            .collect();
        for (player, previous) in self.generals.iter().enumerate() {
            let current = state.generals().get(player).copied().flatten();
            if let (Some(tile), None) = (*previous, current) {
                regressions.push(VisibilityRegression::GeneralVanished {
                    update,
                    player,
                    tile,
                });
            }
        }
        self.cities = cities;
        self.generals = state.generals().to_vec();
        regressions
    }
}

pub struct ReplaySummary {
    pub num_updates: usize,
    pub regressions: Vec<VisibilityRegression>,
    /// The state after the last update, if there was any.
    pub final_state: Option<GameState>,
    /// The last event of the trace, if it ended the game.
    pub ending: Option<ServerEvent>,
}

/// Feeds a recorded trace through a fresh store.
///
/// Returns an error for the first update that cannot be applied.
pub fn replay(events: &[ServerEvent]) -> anyhow::Result<ReplaySummary> {
    let mut store = GameStateStore::new();
    let mut audit = VisibilityAudit::new();
    let mut regressions = Vec::new();
    let mut ending = None;

    for event in events {
        match event {
            ServerEvent::GameStart { player_index, .. } => store.set_player_index(*player_index),
            ServerEvent::GameUpdate(update) => {
                let update_num = store.num_updates() + 1;
                let state = store
                    .apply_update(update)
                    .with_context(|| format!("Could not apply update #{}", update_num))?;
                regressions.extend(audit.observe(update_num, state));
            }
            ServerEvent::GameWon | ServerEvent::GameLost | ServerEvent::Disconnect => {
                ending = Some(event.clone());
            }
            ServerEvent::Connect
            | ServerEvent::ErrorSetUsername { .. }
            | ServerEvent::Other => {}
        }
    }

    Ok(ReplaySummary {
        num_updates: store.num_updates(),
        regressions,
        final_state: store.snapshot().cloned(),
        ending,
    })
}
