pub use errors::*;
pub use game_state::*;
pub use map::*;
pub use patch::*;
pub use policy::*;
pub use protocol::*;
pub use visualization::*;

#[cfg(test)]
mod arbitrary;
mod errors;
mod game_state;
mod map;
mod patch;
mod policy;
mod protocol;
mod visualization;
