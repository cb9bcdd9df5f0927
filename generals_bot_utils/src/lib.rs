mod recording;
mod session;
mod transport;
mod user_config;
pub use recording::*;
pub use session::*;
pub use transport::*;
pub use user_config::*;
