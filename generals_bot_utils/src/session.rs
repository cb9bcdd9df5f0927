use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use generals::{format_grid, ClientCommand, GameStateStore, GameUpdate, MovePolicy, ServerEvent};
use tracing::{debug, error, info, warn};

use crate::{Recorder, Transport, UserConfig};

/// How often readiness is re-announced while waiting for the game to start.
pub const FORCE_START_INTERVAL: Duration = Duration::from_millis(5000);

const GAMES_URL: &str = "http://bot.generals.io/games/";
const REPLAYS_URL: &str = "http://bot.generals.io/replays/";

/// How a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    Disconnected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for the connection to the server.
    Connecting,
    /// Joined the custom game, waiting for it to start.
    WaitingToStart,
    Playing,
    Finished(Outcome),
}

pub struct SessionConfig {
    /// The custom game to join.
    pub game_id: String,
    pub user: UserConfig,
    /// Where `user` was loaded from. It is updated once the username has been set.
    pub user_config_path: Option<PathBuf>,
    pub force_start_interval: Duration,
}

impl SessionConfig {
    pub fn new(game_id: String, user: UserConfig) -> Self {
        Self {
            game_id,
            user,
            user_config_path: None,
            force_start_interval: FORCE_START_INTERVAL,
        }
    }
}

/// Plays one game: turns server events into state updates, and moves into commands.
pub struct Session<P> {
    config: SessionConfig,
    policy: P,
    store: GameStateStore,
    phase: SessionPhase,
    next_force_start: Option<Instant>,
    recorder: Option<Recorder>,
}

impl<P: MovePolicy> Session<P> {
    pub fn new(config: SessionConfig, policy: P) -> Self {
        Self {
            config,
            policy,
            store: GameStateStore::new(),
            phase: SessionPhase::Connecting,
            next_force_start: None,
            recorder: None,
        }
    }

    /// Records every event received from now on.
    pub fn with_recorder(mut self, recorder: Recorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn store(&self) -> &GameStateStore {
        &self.store
    }

    pub fn user(&self) -> &UserConfig {
        &self.config.user
    }

    /// Handles events until the session is finished.
    ///
    /// Returns an error on communication failure, or if the server sends an
    /// update that cannot be applied.
    pub fn run<T: Transport>(&mut self, transport: &mut T) -> anyhow::Result<Outcome> {
        loop {
            if let SessionPhase::Finished(outcome) = self.phase {
                break Ok(outcome);
            }
            if let Some(event) = transport.recv(self.next_force_start)? {
                for command in self.handle_event(event)? {
                    transport.send(&command)?;
                }
            }
            if let Some(command) = self.poll_force_start(Instant::now()) {
                transport.send(&command)?;
            }
        }
    }

    /// Handles a single event completely, returning the commands to send in response.
    pub fn handle_event(&mut self, event: ServerEvent) -> anyhow::Result<Vec<ClientCommand>> {
        if let Some(recorder) = &mut self.recorder {
            recorder.record(&event)?;
        }
        if let SessionPhase::Finished(outcome) = self.phase {
            warn!(?outcome, ?event, "Ignoring event after the session has ended");
            return Ok(vec![]);
        }

        let commands = match event {
            ServerEvent::Connect => self.on_connect(),
            ServerEvent::Disconnect => {
                error!("Disconnected from server.");
                self.finish(Outcome::Disconnected);
                vec![]
            }
            ServerEvent::ErrorSetUsername { message } => {
                self.on_set_username(message);
                vec![]
            }
            ServerEvent::GameStart {
                player_index,
                replay_id,
            } => {
                // No longer need to keep sending force_start.
                self.next_force_start = None;
                self.store.set_player_index(player_index);
                self.phase = SessionPhase::Playing;
                info!(
                    player_index,
                    "Game starting! The replay will be available after the game at {}{}",
                    REPLAYS_URL,
                    encode_uri_component(&replay_id)
                );
                vec![]
            }
            ServerEvent::GameUpdate(update) => self.on_game_update(&update)?,
            ServerEvent::GameLost => {
                info!("Game lost.");
                self.finish(Outcome::Lost);
                vec![ClientCommand::LeaveGame]
            }
            ServerEvent::GameWon => {
                info!("Game won!");
                self.finish(Outcome::Won);
                vec![ClientCommand::LeaveGame]
            }
            ServerEvent::Other => {
                debug!("Ignoring unhandled event");
                vec![]
            }
        };
        Ok(commands)
    }

    /// Returns the force-start command if it is due at `now`.
    pub fn poll_force_start(&mut self, now: Instant) -> Option<ClientCommand> {
        self.next_force_start.filter(|&deadline| deadline <= now)?;
        self.next_force_start = Some(now + self.config.force_start_interval);
        Some(ClientCommand::SetForceStart {
            game_id: self.config.game_id.clone(),
            force: true,
        })
    }

    fn on_connect(&mut self) -> Vec<ClientCommand> {
        info!("Connected to server.");
        let user = &self.config.user;
        let mut commands = Vec::new();
        if let (true, Some(username)) = (user.needs_username_registration(), &user.username) {
            commands.push(ClientCommand::SetUsername {
                user_id: user.user_id.clone(),
                username: username.clone(),
            });
        }
        commands.push(ClientCommand::JoinPrivate {
            game_id: self.config.game_id.clone(),
            user_id: user.user_id.clone(),
        });
        info!(
            "Joined custom game at {}{}",
            GAMES_URL,
            encode_uri_component(&self.config.game_id)
        );
        self.phase = SessionPhase::WaitingToStart;
        self.next_force_start = Some(Instant::now() + self.config.force_start_interval);
        commands
    }

    fn on_set_username(&mut self, message: Option<String>) {
        if let Some(message) = message.filter(|message| !message.is_empty()) {
            warn!("Error setting username: {}", message);
            return;
        }
        info!("Username successfully set!");
        self.config.user.has_username_been_set = true;
        if let Some(path) = &self.config.user_config_path {
            match self.config.user.save(path) {
                Ok(()) => info!("{} updated.", path.display()),
                Err(err) => warn!("Could not record the username: {:#}", err),
            }
        }
    }

    fn on_game_update(&mut self, update: &GameUpdate) -> anyhow::Result<Vec<ClientCommand>> {
        let update_num = self.store.num_updates() + 1;
        let state = self
            .store
            .apply_update(update)
            .with_context(|| format!("Could not apply update #{}", update_num))?;

        if let Some(grid) = format_grid(state.terrain(), state.width(), true) {
            debug!("Terrain after update #{}:\n{}", update_num, grid);
        }

        match self.policy.select_move(state) {
            Some(mv) => {
                debug!(from = mv.from, to = mv.to, "Attacking");
                Ok(vec![ClientCommand::from(mv)])
            }
            None => {
                debug!(update_num, "No move");
                Ok(vec![])
            }
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.phase = SessionPhase::Finished(outcome);
        self.next_force_start = None;
    }
}

/// Percent-encodes everything except the characters JavaScript's
/// `encodeURIComponent` leaves alone.
fn encode_uri_component(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
