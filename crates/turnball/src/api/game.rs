use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ai::AiPlayer;
use crate::api::action::{ActionProvider, Controller, HumanInput};
use crate::api::types::{Difficulty, MatchEvent, MatchStatus, Mode, Side};
use crate::components::ball::Ball;
use crate::components::team::Team;
use crate::config::MatchConfig;
use crate::core::field::Field;
use crate::core::physics::{PhysicsSolver, StepOutcome};
use crate::core::state::{MatchClock, MatchSnapshot, MatchState};
use crate::core::time::FixedTimestep;
use crate::core::turn::{Turn, TurnController, TurnPhase};
use crate::error::CoreError;
use crate::input::queue::{InputEvent, InputQueue};
use crate::tactics::TacticSource;

/// Everything needed to start (and later restart) a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSetup {
    pub config: MatchConfig,
    pub mode: Mode,
    pub difficulty: Difficulty,
    /// Tactic sources for Team A and Team B.
    pub tactics: [TacticSource; 2],
    /// Side that kicks off. `None` flips a seeded coin.
    pub first_turn: Option<Side>,
    /// Seeds the coin flip and the AI.
    pub seed: u64,
}

impl Default for MatchSetup {
    fn default() -> Self {
        Self {
            config: MatchConfig::default(),
            mode: Mode::default(),
            difficulty: Difficulty::default(),
            tactics: [TacticSource::default(), TacticSource::default()],
            first_turn: None,
            seed: 0,
        }
    }
}

/// One running match: state plus the machinery that advances it.
#[derive(Debug, Clone)]
struct Session {
    config: MatchConfig,
    state: MatchState,
    solver: PhysicsSolver,
    timestep: FixedTimestep,
    controllers: [Controller; 2],
    turns: TurnController,
}

impl Session {
    fn build(setup: &MatchSetup) -> Result<Self, CoreError> {
        let config = setup.config.clone();
        config.validate()?;
        let field = Field::from_config(&config);

        let teams = [Side::A, Side::B].map(|side| {
            let (tactic, err) = setup.tactics[side.index()].resolve(&field, &config);
            if let Some(err) = err {
                log::warn!("{err}; {side:?} plays the default formation");
            }
            Team::new(side, tactic, &field, &config)
        });

        let mut ball = Ball::new(config.ball_radius, config.ball_mass);
        ball.place(field.kickoff_spot(None, config.kickoff_offset));

        let first = setup.first_turn.unwrap_or_else(|| {
            let mut coin = ChaCha8Rng::seed_from_u64(setup.seed);
            if coin.gen_bool(0.5) {
                Side::A
            } else {
                Side::B
            }
        });

        let controllers = [Side::A, Side::B].map(|side| {
            if setup.mode.is_ai(side) {
                let seed = setup.seed.wrapping_add(1 + side.index() as u64);
                Controller::Ai(AiPlayer::new(side, setup.difficulty, &config, seed))
            } else {
                Controller::Human(HumanInput::new())
            }
        });

        let state = MatchState {
            field,
            ball,
            teams,
            turn: Turn::new(first, &config),
            clock: MatchClock::new(config.max_rounds),
            difficulty: setup.difficulty,
            mode: setup.mode,
            paused: false,
            status: MatchStatus::Playing,
        };

        Ok(Self {
            solver: PhysicsSolver::new(&config),
            timestep: FixedTimestep::new(config.fixed_dt, config.max_steps_per_tick),
            controllers,
            turns: TurnController,
            state,
            config,
        })
    }

    /// Queue a human event for the side on turn. Returns why it was dropped.
    fn route_input(&mut self, event: InputEvent) -> Result<(), CoreError> {
        let owner = self.state.turn.owner;
        if self.state.paused {
            return Err(CoreError::invalid_input("match is paused"));
        }
        if let Some(side) = event.side() {
            if side != owner {
                return Err(CoreError::invalid_input(format!("{side:?} is not on turn")));
            }
        }
        if !self.state.turn.phase.accepts_input() {
            return Err(CoreError::invalid_input(format!(
                "input ignored during {:?}",
                self.state.turn.phase
            )));
        }
        let Some(action) = event.to_action()? else {
            return Ok(());
        };
        let human = self.controllers[owner.index()]
            .as_human_mut()
            .ok_or_else(|| CoreError::invalid_input(format!("{owner:?} is not human-controlled")))?;
        human.push(action);
        Ok(())
    }

    /// Run one fixed step of the turn machine.
    fn step(&mut self, events: &mut Vec<MatchEvent>) {
        match self.state.turn.phase {
            TurnPhase::Select | TurnPhase::Aim | TurnPhase::Power => self.step_input(),
            TurnPhase::Simulate => {
                let outcome = self
                    .solver
                    .step_into(&mut self.state.ball, &mut self.state.teams, events);
                if outcome.ends_turn() {
                    self.finish_turn(outcome, events);
                }
            }
            TurnPhase::Settled => {
                let next = self.state.turn.next_owner.unwrap_or(self.state.turn.owner.other());
                let state = &mut self.state;
                self.turns.begin(&mut state.turn, &mut state.teams, next, &self.config);
            }
        }
    }

    fn step_input(&mut self) {
        let owner = self.state.turn.owner;
        self.turns.tick(&mut self.state.turn);

        while self.state.turn.phase.accepts_input() {
            let Some(action) = self.controllers[owner.index()].next_action(&self.state) else {
                break;
            };
            let state = &mut self.state;
            let ball = state.ball.body.pos;
            match self
                .turns
                .apply(&mut state.turn, &mut state.teams[owner.index()], ball, action)
            {
                Ok(Some(launch)) => {
                    let kind = self.solver.launch(
                        &mut state.ball,
                        &mut state.teams,
                        launch.kicker,
                        launch.dir,
                        launch.power,
                    );
                    log::debug!(
                        "{:?} launched {:?} at power {:.2}",
                        launch.kicker,
                        kind,
                        launch.power
                    );
                }
                Ok(None) => {}
                Err(err) => log::debug!("dropped action: {err}"),
            }
        }
    }

    fn finish_turn(&mut self, outcome: StepOutcome, events: &mut Vec<MatchEvent>) {
        let state = &mut self.state;
        let next = self.turns.settle(&mut state.turn, outcome);

        if let StepOutcome::Goal { scorer } = outcome {
            state.team_mut(scorer).score += 1;
            events.push(MatchEvent::GoalScored { scorer });
            log::info!(
                "goal for {:?}: {} - {}",
                scorer,
                state.teams[0].score,
                state.teams[1].score
            );
            self.kickoff(Some(scorer.other()));
        }

        let timed_out = matches!(outcome, StepOutcome::TimedOut { .. });
        let state = &mut self.state;
        if matches!(outcome, StepOutcome::Goal { .. }) {
            state.clock.restart_round();
        } else {
            state.clock.complete_turn();
        }
        events.push(MatchEvent::TurnSettled { next, timed_out });
        for controller in &mut self.controllers {
            controller.reset();
        }

        if let Some(winner) = self.result() {
            self.state.status = MatchStatus::Over { winner };
            events.push(MatchEvent::MatchEnded { winner });
            log::info!("match over, winner: {winner:?}");
        }
    }

    /// Reset everyone to kickoff spots. The ball goes toward `conceding`'s half.
    fn kickoff(&mut self, conceding: Option<Side>) {
        let state = &mut self.state;
        for team in &mut state.teams {
            team.reset_to_kickoff(&state.field);
        }
        state
            .ball
            .place(state.field.kickoff_spot(conceding, self.config.kickoff_offset));
        self.solver.reset();
    }

    /// `Some(winner)` once the match is decided; `Some(None)` is a draw.
    fn result(&self) -> Option<Option<Side>> {
        let [a, b] = [&self.state.teams[0], &self.state.teams[1]];
        for team in [a, b] {
            if team.score >= self.config.score_to_win {
                return Some(Some(team.side));
            }
        }
        if self.state.clock.expired() {
            return Some(match a.score.cmp(&b.score) {
                std::cmp::Ordering::Greater => Some(Side::A),
                std::cmp::Ordering::Less => Some(Side::B),
                std::cmp::Ordering::Equal => None,
            });
        }
        None
    }
}

/// Owns the lifecycle of a match: setup, input routing, fixed-step
/// advancement, events and snapshots.
#[derive(Debug, Clone, Default)]
pub struct MatchManager {
    setup: Option<MatchSetup>,
    session: Option<Session>,
    input: InputQueue,
    events: Vec<MatchEvent>,
}

impl MatchManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh match. On error nothing changes and no match is running.
    pub fn start_match(&mut self, setup: MatchSetup) -> Result<(), CoreError> {
        let session = match Session::build(&setup) {
            Ok(session) => session,
            Err(err) => {
                log::warn!("{err}");
                return Err(err);
            }
        };
        log::info!(
            "match started: {:?}, {:?}, {:?} kicks off",
            setup.mode,
            setup.difficulty,
            session.state.turn.owner
        );
        self.session = Some(session);
        self.setup = Some(setup);
        self.input.clear();
        self.events.clear();
        Ok(())
    }

    /// Start again with the last setup.
    pub fn restart(&mut self) -> Result<(), CoreError> {
        let setup = self
            .setup
            .clone()
            .ok_or_else(|| CoreError::MatchSetup("no match to restart".into()))?;
        self.start_match(setup)
    }

    /// Queue an event; it is applied at the next tick boundary.
    pub fn submit_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    pub fn pause(&mut self) {
        self.set_paused(true);
    }

    pub fn resume(&mut self) {
        self.set_paused(false);
    }

    pub fn is_paused(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.state.paused)
    }

    fn set_paused(&mut self, paused: bool) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.state.paused != paused {
            session.state.paused = paused;
            self.events.push(MatchEvent::PauseChanged { paused });
            log::info!("{}", if paused { "paused" } else { "resumed" });
        }
    }

    /// Advance by `dt` seconds of host time.
    pub fn tick(&mut self, dt: f32) {
        for event in self.input.drain() {
            if event == InputEvent::PauseToggle {
                let paused = self.is_paused();
                self.set_paused(!paused);
                continue;
            }
            if let Some(session) = self.session.as_mut() {
                if let Err(err) = session.route_input(event) {
                    log::debug!("dropped {event:?}: {err}");
                }
            }
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.state.paused || session.state.is_over() {
            return;
        }
        let steps = session.timestep.accumulate(dt);
        for _ in 0..steps {
            session.step(&mut self.events);
            if session.state.is_over() {
                break;
            }
        }
    }

    pub fn current_snapshot(&self) -> Option<MatchSnapshot> {
        self.session.as_ref().map(|s| s.state.snapshot())
    }

    /// Notifications emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> Option<&MatchState> {
        self.session.as_ref().map(|s| &s.state)
    }

    /// Direct access for scripted scenarios and editors.
    pub fn state_mut(&mut self) -> Option<&mut MatchState> {
        self.session.as_mut().map(|s| &mut s.state)
    }

    pub fn status(&self) -> Option<MatchStatus> {
        self.state().map(|s| s.status)
    }

    pub fn config(&self) -> Option<&MatchConfig> {
        self.session.as_ref().map(|s| &s.config)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn human_setup(first: Side) -> MatchSetup {
        MatchSetup {
            mode: Mode::Multiplayer,
            first_turn: Some(first),
            ..MatchSetup::default()
        }
    }

    fn step(mgr: &mut MatchManager) {
        mgr.tick(1.0 / 60.0);
    }

    #[test]
    fn rejects_broken_config() {
        let mut mgr = MatchManager::new();
        let mut setup = MatchSetup::default();
        setup.config.field_width = -5.0;
        assert!(matches!(mgr.start_match(setup), Err(CoreError::MatchSetup(_))));
        assert!(mgr.current_snapshot().is_none());
    }

    #[test]
    fn human_turn_runs_to_settle() {
        let mut mgr = MatchManager::new();
        mgr.start_match(human_setup(Side::A)).unwrap();

        mgr.submit_input(InputEvent::SelectPlayer { side: Side::A, index: 4 });
        mgr.submit_input(InputEvent::SetAimDirection(Vec2::new(0.0, 1.0)));
        mgr.submit_input(InputEvent::ConfirmAction);
        mgr.submit_input(InputEvent::SetPower(0.3));
        mgr.submit_input(InputEvent::ConfirmAction);
        step(&mut mgr);
        assert_eq!(mgr.current_snapshot().unwrap().phase, TurnPhase::Simulate);

        for _ in 0..600 {
            step(&mut mgr);
        }
        let snap = mgr.current_snapshot().unwrap();
        assert_eq!(snap.turn_owner, Side::B);
        assert_eq!(snap.phase, TurnPhase::Select);
        let events = mgr.drain_events();
        assert!(events.contains(&MatchEvent::TurnSettled {
            next: Side::B,
            timed_out: false
        }));
    }

    #[test]
    fn timed_out_turn_hands_over() {
        let mut mgr = MatchManager::new();
        let mut setup = human_setup(Side::A);
        setup.config.max_sim_steps = 5;
        mgr.start_match(setup).unwrap();

        mgr.submit_input(InputEvent::SelectPlayer { side: Side::A, index: 2 });
        mgr.submit_input(InputEvent::SetAimDirection(Vec2::new(0.0, 1.0)));
        mgr.submit_input(InputEvent::ConfirmAction);
        mgr.submit_input(InputEvent::SetPower(1.0));
        mgr.submit_input(InputEvent::ConfirmAction);
        for _ in 0..10 {
            step(&mut mgr);
        }

        let events = mgr.drain_events();
        assert!(events.contains(&MatchEvent::TurnSettled {
            next: Side::B,
            timed_out: true
        }));
        let snap = mgr.current_snapshot().unwrap();
        assert_eq!(snap.turn_owner, Side::B);
        assert_eq!(snap.phase, TurnPhase::Select);
        assert!(snap.players.iter().all(|p| p.body.vel == Vec2::ZERO));
    }

    #[test]
    fn wrong_side_input_is_dropped() {
        let mut mgr = MatchManager::new();
        mgr.start_match(human_setup(Side::A)).unwrap();
        let before = mgr.current_snapshot().unwrap();
        mgr.submit_input(InputEvent::SelectPlayer { side: Side::B, index: 2 });
        mgr.submit_input(InputEvent::SelectPlayer { side: Side::A, index: 9 });
        step(&mut mgr);
        let after = mgr.current_snapshot().unwrap();
        assert_eq!(after.phase, TurnPhase::Select);
        assert_eq!(before.players, after.players);
    }

    #[test]
    fn pause_freezes_time() {
        let mut mgr = MatchManager::new();
        mgr.start_match(human_setup(Side::A)).unwrap();
        mgr.pause();
        mgr.pause();
        let frozen = mgr.current_snapshot().unwrap();
        for _ in 0..10 {
            step(&mut mgr);
        }
        assert_eq!(mgr.current_snapshot().unwrap(), frozen);
        assert_eq!(
            mgr.drain_events(),
            vec![MatchEvent::PauseChanged { paused: true }]
        );
        mgr.submit_input(InputEvent::PauseToggle);
        step(&mut mgr);
        assert!(!mgr.is_paused());
    }

    #[test]
    fn coin_flip_is_seeded() {
        let first = |seed| {
            let mut mgr = MatchManager::new();
            mgr.start_match(MatchSetup {
                seed,
                ..MatchSetup::default()
            })
            .unwrap();
            mgr.current_snapshot().unwrap().turn_owner
        };
        for seed in 0..8 {
            assert_eq!(first(seed), first(seed));
        }
    }

    #[test]
    fn restart_resets_scores() {
        let mut mgr = MatchManager::new();
        assert!(mgr.restart().is_err());
        mgr.start_match(human_setup(Side::B)).unwrap();
        mgr.state_mut().unwrap().teams[1].score = 3;
        mgr.restart().unwrap();
        assert_eq!(mgr.current_snapshot().unwrap().scores, [0, 0]);
    }
}
