//! A single timed round of the arithmetic race.
//!
//! A `Match` owns a frozen copy of the roster and settings taken when the
//! room started it. Every participant always has one open problem while
//! the match is active; a correct answer scores a point and replaces it,
//! a wrong answer changes nothing so the player can try again.
//!
//! `Match` has no timer of its own. The room actor that owns it checks
//! [`Match::is_expired`] and calls [`Match::terminate`] from inside its
//! command loop, so expiry is ordered with every other mutation.

use std::collections::BTreeMap;

use mathrace_protocol::{MatchResult, MatchSettings, MatchView, Player};
use rand::rngs::StdRng;
use tokio::time::Instant;

use crate::{RoomError, generator, scoring};

/// One timed round: roster snapshot, live problems, scores, and result.
#[derive(Debug)]
pub struct Match {
    players: BTreeMap<String, Player>,
    settings: MatchSettings,
    active: bool,
    result: Option<MatchResult>,
    deadline: Instant,
    rng: StdRng,
}

impl Match {
    /// Starts a match for `roster` at `now` and issues the first problems.
    ///
    /// # Errors
    /// `EmptyRoster` for no participants, `InvalidSettings` for malformed
    /// settings, `Problem` if a first problem cannot be drawn.
    pub fn start(
        roster: impl IntoIterator<Item = String>,
        settings: MatchSettings,
        rng: StdRng,
        now: Instant,
    ) -> Result<Self, RoomError> {
        settings.validate()?;

        let players: BTreeMap<String, Player> = roster
            .into_iter()
            .map(|name| (name.clone(), Player::new(name)))
            .collect();
        if players.is_empty() {
            return Err(RoomError::EmptyRoster);
        }

        let deadline = now + settings.duration();
        let mut game = Self {
            players,
            settings,
            active: true,
            result: None,
            deadline,
            rng,
        };
        game.issue_initial_problems()?;
        Ok(game)
    }

    /// Gives every participant a fresh problem and a zero score.
    fn issue_initial_problems(&mut self) -> Result<(), RoomError> {
        for player in self.players.values_mut() {
            let problem = generator::generate_for(&self.settings, &mut self.rng)?;
            player.score = 0;
            player.assign_problem(problem);
        }
        Ok(())
    }

    /// Applies one answer from `player`.
    ///
    /// Correct: one point and a new problem, returns `true`.
    /// Wrong: nothing changes, returns `false`.
    pub fn answer(&mut self, player: &str, value: i64) -> Result<bool, RoomError> {
        if !self.active {
            return Err(RoomError::MatchNotActive);
        }
        let participant = self
            .players
            .get_mut(player)
            .ok_or_else(|| RoomError::PlayerNotFound(player.to_string()))?;
        let expected = participant
            .current_problem
            .as_ref()
            .map(|p| p.result)
            .ok_or_else(|| RoomError::AnswerAlreadyResolved(player.to_string()))?;

        if value != expected {
            return Ok(false);
        }

        // Draw before touching the score so a failed draw changes nothing.
        let next = generator::generate_for(&self.settings, &mut self.rng)?;
        participant.check(value);
        participant.assign_problem(next);
        Ok(true)
    }

    /// `true` once `now` has reached the end of the match window.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Ends the match and returns its result.
    ///
    /// Idempotent: once ended, every call returns the stored result.
    /// `None` only for a match without participants, which
    /// [`Match::start`] never builds.
    pub fn terminate(&mut self) -> Option<MatchResult> {
        if !self.active {
            return self.result.clone();
        }
        for player in self.players.values_mut() {
            player.clear_problem();
        }
        self.active = false;
        self.result = scoring::compute_result(&self.players);
        self.result.clone()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    pub fn players(&self) -> &BTreeMap<String, Player> {
        &self.players
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn view(&self, now: Instant) -> MatchView {
        let remaining_ms = if self.active {
            u64::try_from(self.deadline.saturating_duration_since(now).as_millis())
                .unwrap_or(u64::MAX)
        } else {
            0
        };
        MatchView {
            players: self.players.clone(),
            settings: self.settings.clone(),
            active: self.active,
            result: self.result.clone(),
            remaining_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use mathrace_protocol::{OpBounds, Operation, SettingsError};
    use rand::SeedableRng;

    use super::*;

    fn settings() -> MatchSettings {
        MatchSettings {
            operations: BTreeSet::from([Operation::Add]),
            add_bounds: OpBounds::new((1, 5), (1, 5)),
            mul_bounds: OpBounds::new((2, 12), (2, 100)),
            duration: 30,
        }
    }

    fn start(names: &[&str]) -> Match {
        Match::start(
            names.iter().map(|n| n.to_string()),
            settings(),
            StdRng::seed_from_u64(1),
            Instant::now(),
        )
        .unwrap()
    }

    fn open_result(game: &Match, name: &str) -> i64 {
        game.players()[name].current_problem.as_ref().unwrap().result
    }

    #[test]
    fn test_start_issues_problems_within_bounds() {
        let game = start(&["alice", "bob"]);
        assert!(game.is_active());
        for player in game.players().values() {
            let p = player.current_problem.as_ref().unwrap();
            assert!((1..=5).contains(&p.num1));
            assert!((1..=5).contains(&p.num2));
            assert_eq!(player.score, 0);
        }
    }

    #[test]
    fn test_start_rejects_empty_roster() {
        let result = Match::start(
            Vec::<String>::new(),
            settings(),
            StdRng::seed_from_u64(1),
            Instant::now(),
        );
        assert!(matches!(result, Err(RoomError::EmptyRoster)));
    }

    #[test]
    fn test_correct_answer_scores_and_replaces_problem() {
        let mut game = start(&["alice"]);
        let answer = open_result(&game, "alice");
        assert!(game.answer("alice", answer).unwrap());
        assert_eq!(game.players()["alice"].score, 1);
        assert!(game.players()["alice"].current_problem.is_some());
    }

    #[test]
    fn test_start_rejects_bounds_that_overflow() {
        let near_max = MatchSettings {
            add_bounds: OpBounds::new((i64::MAX - 1, i64::MAX), (0, 1)),
            ..settings()
        };
        let result = Match::start(
            ["alice".to_string()],
            near_max,
            StdRng::seed_from_u64(1),
            Instant::now(),
        );
        assert!(matches!(
            result,
            Err(RoomError::InvalidSettings(SettingsError::Overflow { .. }))
        ));
    }

    #[test]
    fn test_correct_answers_near_the_limit_always_score() {
        let edge = MatchSettings {
            add_bounds: OpBounds::new((i64::MAX - 2, i64::MAX - 1), (0, 1)),
            ..settings()
        };
        let mut game = Match::start(
            ["alice".to_string()],
            edge,
            StdRng::seed_from_u64(9),
            Instant::now(),
        )
        .unwrap();
        for round in 1..=40 {
            let answer = open_result(&game, "alice");
            assert!(game.answer("alice", answer).unwrap());
            assert_eq!(game.players()["alice"].score, round);
        }
    }

    #[test]
    fn test_wrong_answer_keeps_problem_and_score() {
        let mut game = start(&["bob"]);
        let before = game.players()["bob"].current_problem.clone();
        let wrong = open_result(&game, "bob") + 100;
        assert!(!game.answer("bob", wrong).unwrap());
        assert_eq!(game.players()["bob"].score, 0);
        assert_eq!(game.players()["bob"].current_problem, before);
    }

    #[test]
    fn test_answer_from_non_participant() {
        let mut game = start(&["alice"]);
        assert!(matches!(
            game.answer("mallory", 1),
            Err(RoomError::PlayerNotFound(_))
        ));
    }

    #[test]
    fn test_score_never_decreases() {
        let mut game = start(&["alice"]);
        let mut last = 0;
        for i in 0..50 {
            let value = if i % 3 == 0 { -1 } else { open_result(&game, "alice") };
            let _ = game.answer("alice", value);
            let score = game.players()["alice"].score;
            assert!(score >= last);
            last = score;
        }
    }

    #[test]
    fn test_terminate_is_idempotent_and_clears_problems() {
        let mut game = start(&["alice", "bob"]);
        let answer = open_result(&game, "bob");
        game.answer("bob", answer).unwrap();

        let first = game.terminate().unwrap();
        let second = game.terminate().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.winner.name, "bob");
        assert!(!game.is_active());
        assert!(game.players().values().all(|p| p.current_problem.is_none()));
        assert!(matches!(game.answer("bob", 0), Err(RoomError::MatchNotActive)));
    }

    #[test]
    fn test_is_expired_at_deadline() {
        let now = Instant::now();
        let game = Match::start(
            vec!["alice".to_string()],
            settings(),
            StdRng::seed_from_u64(1),
            now,
        )
        .unwrap();
        assert!(!game.is_expired(now + Duration::from_secs(29)));
        assert!(game.is_expired(now + Duration::from_secs(30)));
        assert_eq!(game.view(now).remaining_ms, 30_000);
    }
}
