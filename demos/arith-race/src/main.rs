use std::collections::BTreeSet;
use std::time::Duration;

use mathrace::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ---------------------------------------------------------------------------
// Bots
// ---------------------------------------------------------------------------

/// A simulated player: reads its open problem, thinks, and answers.
struct Bot {
    name: String,
    /// Chance of answering off by one.
    miss_rate: f64,
    /// Upper bound on think time per problem.
    max_think: Duration,
    rng: StdRng,
}

impl Bot {
    fn new(index: u64, miss_rate: f64, max_think: Duration) -> Self {
        Self {
            name: format!("bot-{index}"),
            miss_rate,
            max_think,
            rng: StdRng::seed_from_u64(index),
        }
    }

    /// Answers until the match closes. Returns how many answers were sent.
    async fn play(
        mut self,
        service: MathraceService,
        room_id: RoomId,
    ) -> Result<u32, MathraceError> {
        let mut sent = 0;
        loop {
            let Response::Match { view } = service.execute(Request::GetMatch { room_id }).await?
            else {
                break;
            };
            if !view.active {
                break;
            }
            let Some(problem) = view
                .players
                .get(&self.name)
                .and_then(|p| p.current_problem.clone())
            else {
                break;
            };

            let think = self.rng.random_range(Duration::ZERO..=self.max_think);
            tokio::time::sleep(think).await;

            let answer = if self.rng.random_bool(self.miss_rate) {
                problem.result + 1
            } else {
                problem.result
            };
            let request = Request::HandleAnswer {
                room_id,
                player: self.name.clone(),
                answer,
            };
            match service.execute(request).await {
                Ok(_) => sent += 1,
                // The timer got there first.
                Err(e) if e.kind() == ErrorKind::InvalidState => break,
                Err(e) => return Err(e),
            }
            tracing::debug!(bot = %self.name, %problem, answer, "answered");
        }
        Ok(sent)
    }
}

// ---------------------------------------------------------------------------
// Race
// ---------------------------------------------------------------------------

fn race_settings(duration: u32) -> MatchSettings {
    MatchSettings {
        operations: BTreeSet::from([Operation::Add, Operation::Sub, Operation::Mul]),
        add_bounds: OpBounds::new((2, 50), (2, 50)),
        mul_bounds: OpBounds::new((2, 12), (2, 12)),
        duration,
    }
}

/// Runs one timed race between `bots` simulated players and returns the
/// final result.
async fn run_race(
    service: &MathraceService,
    bots: u64,
    duration: u32,
) -> Result<MatchResult, MathraceError> {
    let room_id = service.registry().create(None).await;

    let mut roster = Vec::new();
    for i in 0..bots {
        let bot = Bot::new(i, 0.2, Duration::from_millis(400 + 200 * i));
        service
            .execute(Request::AddPlayer {
                room_id,
                player: bot.name.clone(),
            })
            .await?;
        roster.push(bot);
    }

    service
        .execute(Request::StartMatch {
            room_id,
            settings: Some(race_settings(duration)),
        })
        .await?;
    tracing::info!(%room_id, bots, duration, "race started");

    let tasks: Vec<_> = roster
        .into_iter()
        .map(|bot| tokio::spawn(bot.play(service.clone(), room_id)))
        .collect();
    for task in tasks {
        match task.await {
            Ok(Ok(sent)) => tracing::debug!(sent, "bot finished"),
            Ok(Err(e)) => return Err(e),
            Err(e) => tracing::warn!(error = %e, "bot task failed"),
        }
    }

    // Bots only stop once the match is closed, so this returns the stored
    // result rather than ending the race early.
    let result = service.registry().end_match(room_id).await?;
    service.execute(Request::DeleteRoom { room_id }).await?;
    Ok(result)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    mathrace::telemetry::init("arith_race=info,mathrace_room=info");

    let service = MathraceService::builder().build();
    let result = run_race(&service, 4, 5).await?;

    tracing::info!(winner = %result.winner.name, score = result.winner.score, "race over");
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_race_runs_to_the_timer() {
        let service = MathraceService::builder().rng_seed(3).build();
        let result = run_race(&service, 3, 10).await.unwrap();

        assert_eq!(result.final_scores.len(), 3);
        assert!(result.final_scores.contains_key(&result.winner.name));
        let best = result.final_scores.values().max().copied().unwrap();
        assert_eq!(result.winner.score, best);
        assert!(best > 0);
        assert_eq!(service.registry().room_count().await, 0);
    }

    #[tokio::test]
    async fn test_bot_stops_without_a_match() {
        let service = MathraceService::builder().build();
        let Response::RoomCreated { room_id } = service
            .handle(Request::CreateRoom {
                host: Some("bot-0".into()),
            })
            .await
        else {
            panic!("expected RoomCreated");
        };

        let bot = Bot::new(0, 0.0, Duration::ZERO);
        let err = bot.play(service, room_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
