//! PvP Watch Example
//!
//! Joins a PvP room by code (first argument) or creates a 1vs1 room, then
//! polls the battle and attacks with a random move whenever it is our turn.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use tallgrass_client::{
    BattleController, BattleFormat, BattleHandler, BattleKind, ClientConfig, Outcome,
    PlayerAction,
};
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

/// Prints events and wakes the main loop when the turn comes back
struct Watcher {
    turn: Notify,
}

#[async_trait]
impl BattleHandler for Watcher {
    async fn on_log(&self, line: &str) {
        println!("> {}", line);
    }

    async fn on_turn(&self, your_turn: bool) {
        if your_turn {
            self.turn.notify_one();
        }
    }

    async fn on_battle_end(&self, outcome: &Outcome) {
        println!("Battle over: {:?}", outcome);
        self.turn.notify_one();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ClientConfig::from_env();
    let watcher = Arc::new(Watcher {
        turn: Notify::new(),
    });
    let controller = BattleController::http(BattleKind::Pvp, watcher.clone(), &config)?;

    let room = match std::env::args().nth(1) {
        Some(code) => controller.join_room(&code).await?,
        None => controller.create_room(BattleFormat::Single).await?,
    };
    println!("Room {} (battle {})", room.room_code, room.battle_id);

    let pvp = controller.pvp();
    pvp.start();

    loop {
        tokio::select! {
            _ = watcher.turn.notified() => {}
            _ = tokio::time::sleep(Duration::from_secs(30)) => {}
        }

        let session = controller.snapshot();
        if session.is_ended() {
            break;
        }
        if !session.is_active() || !session.your_turn {
            continue;
        }

        let choice = {
            let mut rng = rand::thread_rng();
            let moves: Vec<u64> = session
                .player
                .iter()
                .flat_map(|p| p.usable_moves())
                .map(|m| m.id)
                .collect();
            moves.choose(&mut rng).copied()
        };
        let action = match choice {
            Some(move_id) => PlayerAction::Attack { move_id },
            None => PlayerAction::Surrender,
        };
        if let Err(e) = controller.submit(action).await {
            eprintln!("! {}", e);
        }
    }

    pvp.stop();
    controller.teardown();
    Ok(())
}
