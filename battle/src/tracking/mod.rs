//! Battle session state and snapshot application

mod session;
mod updater;

pub use session::{
    BattleKind, BattleLog, BattleSession, BattleStatus, CaptureNotice, Outcome, PvpContext,
};
pub use updater::{PvpUpdate, SessionError};
