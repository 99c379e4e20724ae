pub mod auth;
pub mod lifecycle;
pub mod provision;
pub mod roster;

pub use auth::{AccessPermissions, ProduceSources, TokenClaims, TokenIssuer};
pub use lifecycle::{
    LocalSessionHub, ProviderEvent, SessionManager, SessionProvider, SessionState,
};
pub use provision::RoomClient;
pub use roster::PeerRoster;
