pub mod config;
pub mod controls;
pub mod errors;
pub mod state;
pub mod types;

pub use config::RoverTuning;
pub use controls::{ControlKey, EdgeEvent, HeldControls, InputFrame};
pub use errors::{ChannelError, RoverError};
pub use state::{KeySnapshot, RoverState};
pub use types::*;
