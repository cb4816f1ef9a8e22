//! Async battle controller for Tallgrass.
//!
//! Loads a battle from the server, lets one player action through at a
//! time, and plays each reply out as timed presentation events delivered
//! to a [`BattleHandler`]. PvP battles are kept in step by polling with a
//! [`PvpSynchronizer`].
//!
//! ```ignore
//! let config = ClientConfig::from_env();
//! let controller = BattleController::http(BattleKind::Wild, Arc::new(NoopHandler), &config)?;
//! controller.initialize().await?;
//! controller.submit(PlayerAction::Attack { move_id: 33 }).await?;
//! ```

mod authority;
mod config;
mod controller;
mod error;
mod executor;
mod handler;
mod http;
mod pvp;
mod scope;

pub use authority::{Collaborators, RemoteAuthority};
pub use config::{ClientConfig, DEFAULT_API_URL, PollPolicy};
pub use controller::{BattleController, Submission};
pub use error::{ClientError, Result};
pub use handler::{BattleHandler, NoopHandler};
pub use http::HttpAuthority;
pub use pvp::{PollOutcome, PvpSynchronizer};

pub use tallgrass_battle::{
    BattleKind, BattleSession, BattleStatus, CaptureNotice, Combatant, CombatantPhase,
    Destination, ItemKind, Outcome, PlayerAction, Rejection, Side, Timings,
};
pub use tallgrass_protocol::BattleFormat;
