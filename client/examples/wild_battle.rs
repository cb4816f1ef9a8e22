//! Wild Battle Example
//!
//! Starts a wild battle against the server configured by `TALLGRASS_API_URL`
//! and `TALLGRASS_TOKEN`, then attacks with a random usable move until the
//! battle ends.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use tallgrass_client::{
    BattleController, BattleHandler, BattleKind, ClientConfig, Destination, Outcome,
    PlayerAction, Side, Submission,
};
use tracing_subscriber::EnvFilter;

struct Printer;

#[async_trait]
impl BattleHandler for Printer {
    async fn on_log(&self, line: &str) {
        println!("> {}", line);
    }

    async fn on_hp(&self, side: Side, hp: u32, max_hp: u32) {
        if hp == 0 || hp == max_hp {
            println!("  [{:?}] {}/{}", side, hp, max_hp);
        }
    }

    async fn on_banner(&self, text: Option<&str>) {
        if let Some(text) = text {
            println!("  ** {} **", text);
        }
    }

    async fn on_battle_end(&self, outcome: &Outcome) {
        println!("Battle over: {:?}", outcome);
    }

    async fn on_navigate(&self, to: Destination) {
        println!("Leaving for {:?}", to);
    }

    async fn on_error(&self, message: &str) {
        eprintln!("! {}", message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ClientConfig::from_env();
    let controller = BattleController::http(BattleKind::Wild, Arc::new(Printer), &config)?;
    controller.initialize().await?;

    loop {
        let session = controller.snapshot();
        if !session.is_active() {
            break;
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
            None => PlayerAction::Flee,
        };

        match controller.submit(action).await? {
            Submission::Terminal => break,
            Submission::Refused(reason) => {
                println!("Refused: {:?}", reason);
                break;
            }
            _ => {}
        }
    }

    // Let the navigation timer fire
    tokio::time::sleep(config.timings.battle_grace).await;
    controller.teardown();
    Ok(())
}
