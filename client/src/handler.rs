use async_trait::async_trait;
use tallgrass_battle::{
    BattleStatus, CaptureNotice, Combatant, CombatantPhase, Destination, Outcome, Side,
};

/// Receives presentation events while a battle plays out.
///
/// Every method has a default no-op implementation, so a view only
/// implements the events it draws. Events arrive in sequence order; HP
/// events from concurrent tweens interleave.
///
/// # Example
///
/// ```ignore
/// struct Printer;
///
/// #[async_trait]
/// impl BattleHandler for Printer {
///     async fn on_log(&self, line: &str) {
///         println!("{}", line);
///     }
/// }
/// ```
#[async_trait]
pub trait BattleHandler: Send + Sync {
    /// A line was appended to the battle log
    async fn on_log(&self, line: &str) {
        let _ = line;
    }

    /// A combatant changed presentation phase
    async fn on_phase(&self, side: Side, phase: CombatantPhase) {
        let _ = (side, phase);
    }

    /// Displayed HP moved one step
    async fn on_hp(&self, side: Side, hp: u32, max_hp: u32) {
        let _ = (side, hp, max_hp);
    }

    /// Effectiveness banner shown, or cleared with `None`
    async fn on_banner(&self, text: Option<&str>) {
        let _ = text;
    }

    /// A new opponent entered
    async fn on_reveal(&self, combatant: &Combatant) {
        let _ = combatant;
    }

    /// The player's active Pokemon changed
    async fn on_player_swap(&self, combatant: &Combatant) {
        let _ = combatant;
    }

    async fn on_status(&self, status: BattleStatus) {
        let _ = status;
    }

    /// PvP turn ownership changed
    async fn on_turn(&self, your_turn: bool) {
        let _ = your_turn;
    }

    async fn on_capture(&self, notice: &CaptureNotice) {
        let _ = notice;
    }

    async fn on_battle_end(&self, outcome: &Outcome) {
        let _ = outcome;
    }

    /// The battle screen should be left
    async fn on_navigate(&self, to: Destination) {
        let _ = to;
    }

    /// A request failed; the message is fit for display
    async fn on_error(&self, message: &str) {
        let _ = message;
    }
}

/// Handler that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl BattleHandler for NoopHandler {}
