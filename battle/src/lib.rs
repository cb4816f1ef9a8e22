//! Battle session state, action gating and animation planning for Tallgrass.
//!
//! This crate holds everything about a battle that can be decided without a
//! clock or a network: the displayed state, which actions may be attempted,
//! and the ordered steps that play out a server reply.
//!
//! # Overview
//!
//! `tallgrass-battle` sits between `tallgrass-protocol` (wire format) and the
//! async client:
//!
//! ```text
//! tallgrass-protocol (requests + responses)
//!        │
//!        ▼
//! tallgrass-battle (session + gate + planner) ← THIS CRATE
//!        │
//!        ▼
//! tallgrass-client (controller, executor, PvP polling)
//! ```
//!
//! # Main Types
//!
//! - [`BattleSession`] - what the player sees: combatants, log, status
//! - [`ActionGate`] and [`check`] - single-flight gating and local rules
//! - [`HpTween`] - stepwise HP values between two readings
//! - [`Planner`] - turns a server reply into a [`Sequence`] of [`Step`]s
//! - [`Timings`] - every delay used while playing out a sequence
//!
//! # Example Usage
//!
//! ```ignore
//! use tallgrass_battle::{ActionReply, BattleKind, BattleSession, Planner, PlayerAction};
//!
//! let mut session = BattleSession::new(BattleKind::Wild);
//! session.initialize_from_start(&start, &roster)?;
//!
//! let action = PlayerAction::Attack { move_id: 33 };
//! let planner = Planner::new(&session, &roster, &timings);
//! let opening = planner.opening(&action);
//! let rest = planner.resolve(&action, &ActionReply::Battle(response));
//! ```

pub mod action;
pub mod gate;
pub mod hp;
pub mod sequence;
pub mod timings;
pub mod tracking;
pub mod types;

pub use action::{ActionReply, PlayerAction};
pub use gate::{ActionGate, GatePermit, Rejection, check};
pub use hp::HpTween;
pub use sequence::{Advance, Destination, HpChange, Planner, Sequence, Step};
pub use timings::Timings;
pub use tracking::{
    BattleKind, BattleLog, BattleSession, BattleStatus, CaptureNotice, Outcome, PvpContext,
    PvpUpdate, SessionError,
};
pub use types::{
    Combatant, CombatantPhase, MoveSlot, OpponentRoster, PlayerRoster, RosterMatch, Side,
    TrainerProfile,
};

// Re-export commonly used protocol types
pub use tallgrass_protocol::{BattleFormat, ItemKind};
