//! Fixed-step circle physics for the ball and the ten players.
//!
//! No rigid-body library: every body is a circle on a flat pitch, so the solver
//! is a short sequence of passes (integrate, friction, walls, contacts, caps)
//! that runs identically on every host.

use std::collections::HashSet;

use glam::Vec2;

use crate::api::types::{EntityRef, MatchEvent, PlayerId, Side};
use crate::components::ball::Ball;
use crate::components::body::Body;
use crate::components::player::PlayerStatus;
use crate::components::team::{pair_mut, Team};
use crate::config::MatchConfig;
use crate::core::field::Field;
use crate::core::geometry::{clamp_length, direction, reflect};
use crate::error::CoreError;
use crate::tactics::PLAYERS_PER_TEAM;

/// A pair stays in contact until it separates by this share of the radius sum.
const CONTACT_RELEASE: f32 = 1.1;

/// What a launch did with the impulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchKind {
    /// The ball was in reach and took the impulse directly.
    Kick,
    /// The player ran with the impulse.
    Dash,
    /// Zero power or a degenerate direction. Nothing moved.
    Fizzle,
}

/// Result of one fixed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moving,
    /// Every velocity is zero.
    Settled,
    /// The ball fully crossed a goal line. Motion is left as is.
    Goal { scorer: Side },
    /// The safety cap was hit; all velocities were zeroed.
    TimedOut { steps: u32 },
}

impl StepOutcome {
    pub fn ends_turn(self) -> bool {
        !matches!(self, StepOutcome::Moving)
    }
}

/// Geometry of one resolved contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from the first body toward the second.
    pub normal: Vec2,
    /// Penetration depth before correction.
    pub overlap: f32,
}

/// The dash of the current turn, kept for the follow-through check.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Dash {
    player: PlayerId,
    power: f32,
}

/// Pushes two overlapping bodies apart along their centre line.
///
/// The correction is split by inverse mass. Returns `None` when the bodies do
/// not touch.
pub fn separate(a: &mut Body, b: &mut Body, percent: f32, slop: f32) -> Option<Contact> {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let overlap = a.radius + b.radius - dist;
    if overlap <= 0.0 {
        return None;
    }
    // Coincident centres: pick a fixed axis so the result stays deterministic
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::X };

    let inv_sum = a.inv_mass() + b.inv_mass();
    if inv_sum > 0.0 {
        let correction = (overlap - slop).max(0.0) * percent / inv_sum;
        a.pos -= normal * correction * a.inv_mass();
        b.pos += normal * correction * b.inv_mass();
    }
    Some(Contact { normal, overlap })
}

/// Exchanges momentum along `normal` (pointing from `a` to `b`).
///
/// Returns the closing speed before the impulse, or 0.0 when the bodies are
/// already separating and nothing changed.
pub fn exchange_impulse(a: &mut Body, b: &mut Body, normal: Vec2, restitution: f32) -> f32 {
    let inv_sum = a.inv_mass() + b.inv_mass();
    if inv_sum <= 0.0 {
        return 0.0;
    }
    let closing = (a.vel - b.vel).dot(normal);
    if closing <= 0.0 {
        return 0.0;
    }
    let j = (1.0 + restitution) * closing / inv_sum;
    a.vel -= normal * j * a.inv_mass();
    b.vel += normal * j * b.inv_mass();
    closing
}

/// Owns the per-turn solver state: active contacts, the step counter and the
/// pending follow-through.
#[derive(Debug, Clone)]
pub struct PhysicsSolver {
    config: MatchConfig,
    field: Field,
    pairs: Vec<(EntityRef, EntityRef)>,
    active: HashSet<(EntityRef, EntityRef)>,
    dash: Option<Dash>,
    steps: u32,
}

impl PhysicsSolver {
    pub fn new(config: &MatchConfig) -> Self {
        let players: Vec<EntityRef> = Side::BOTH
            .iter()
            .flat_map(|&side| {
                (1..=PLAYERS_PER_TEAM as u8).map(move |i| EntityRef::Player(PlayerId::new(side, i)))
            })
            .collect();

        let mut pairs: Vec<(EntityRef, EntityRef)> =
            players.iter().map(|&p| (EntityRef::Ball, p)).collect();
        for (i, &a) in players.iter().enumerate() {
            for &b in &players[i + 1..] {
                pairs.push((a, b));
            }
        }

        Self {
            config: config.clone(),
            field: Field::from_config(config),
            pairs,
            active: HashSet::new(),
            dash: None,
            steps: 0,
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Steps run since the last launch.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Forget contacts and turn state (kickoff, restart).
    pub fn reset(&mut self) {
        self.active.clear();
        self.dash = None;
        self.steps = 0;
    }

    /// Apply the single impulse of a turn.
    ///
    /// Power is clamped to `[0, 1]` (NaN counts as zero). A degenerate
    /// direction or zero power fizzles without touching any velocity.
    pub fn launch(
        &mut self,
        ball: &mut Ball,
        teams: &mut [Team; 2],
        kicker: PlayerId,
        dir: Vec2,
        power: f32,
    ) -> LaunchKind {
        self.dash = None;
        self.steps = 0;

        let power = if power.is_nan() { 0.0 } else { power.clamp(0.0, 1.0) };
        let Some(dir) = direction(dir) else {
            log::debug!("launch by {kicker:?} fizzled: degenerate direction");
            return LaunchKind::Fizzle;
        };
        if power == 0.0 {
            return LaunchKind::Fizzle;
        }
        let Some(player) = teams[kicker.side.index()].player_mut(kicker.index) else {
            return LaunchKind::Fizzle;
        };
        player.status = PlayerStatus::Kicking;

        if player.distance_to(ball.body.pos) <= self.config.kick_reach() {
            let vel = clamp_length(
                dir * power * self.config.max_kick_speed,
                self.config.max_ball_speed,
            );
            ball.kick(vel, kicker, self.config.kick_immunity_steps);
            LaunchKind::Kick
        } else {
            player.body.vel = dir * power * self.config.max_player_speed;
            self.dash = Some(Dash { player: kicker, power });
            LaunchKind::Dash
        }
    }

    /// Advance one fixed step. Contact-start collisions are pushed to `events`.
    pub fn step_into(
        &mut self,
        ball: &mut Ball,
        teams: &mut [Team; 2],
        events: &mut Vec<MatchEvent>,
    ) -> StepOutcome {
        let dt = self.config.fixed_dt;
        self.steps += 1;

        // 1-2. Integrate, then friction with the rest floor
        let rest = self.config.rest_speed;
        let ball_prev = ball.body.pos;
        integrate(&mut ball.body, dt, self.config.ball_friction, rest);
        for team in teams.iter_mut() {
            for player in &mut team.players {
                integrate(&mut player.body, dt, self.config.player_friction, rest);
            }
        }

        // 3. Boundaries
        self.bound_all(ball, teams, ball_prev);

        // 4. Contacts, then bound again so a push cannot leave anyone off the pitch
        let ball_bounded = ball.body.pos;
        self.resolve_contacts(ball, teams, events);
        self.bound_all(ball, teams, ball_bounded);

        // 5. Speed caps
        ball.body.vel = clamp_length(ball.body.vel, self.config.max_ball_speed);
        for team in teams.iter_mut() {
            for player in &mut team.players {
                player.body.vel = clamp_length(player.body.vel, self.config.max_player_speed);
            }
        }

        // 6. Possession
        self.update_possession(ball, teams);

        // 7. Goal
        if let Some(conceding) = self.field.goal_crossed(ball.body.pos, ball.body.radius) {
            return StepOutcome::Goal {
                scorer: conceding.other(),
            };
        }

        self.follow_through(ball, teams);
        ball.tick_immunity();

        let moving = ball.body.is_moving() || teams.iter().any(Team::any_moving);
        if !moving {
            return StepOutcome::Settled;
        }
        if self.steps >= self.config.max_sim_steps {
            log::warn!(
                "{}; stopping all bodies",
                CoreError::SimulationTimeout { steps: self.steps }
            );
            ball.body.stop();
            for team in teams.iter_mut() {
                for player in &mut team.players {
                    player.body.stop();
                }
            }
            return StepOutcome::TimedOut { steps: self.steps };
        }
        StepOutcome::Moving
    }

    fn bound_all(&self, ball: &mut Ball, teams: &mut [Team; 2], ball_prev: Vec2) {
        self.bound_ball(&mut ball.body, ball_prev);
        for team in teams.iter_mut() {
            for player in &mut team.players {
                self.bound_player(&mut player.body);
            }
        }
    }

    /// `prev` is where the ball was before the move being bounded.
    fn bound_ball(&self, body: &mut Body, prev: Vec2) {
        let f = &self.field;
        let r = body.radius;
        let e = self.config.wall_restitution;
        let sign_x = body.pos.x.signum();

        // Touch lines
        if body.pos.y.abs() + r > f.half_height {
            let sign_y = body.pos.y.signum();
            body.pos.y = sign_y * (f.half_height - r);
            body.vel.y = -sign_y * body.vel.y.abs() * e;
        }

        if body.pos.x.abs() <= f.half_width {
            // In play: the goal lines are walls except across the mouth
            if body.pos.x.abs() + r > f.half_width && !f.in_mouth(body.pos.y) {
                body.pos.x = sign_x * (f.half_width - r);
                body.vel.x = -sign_x * body.vel.x.abs() * e;
            }
            return;
        }

        // Only a ball that entered through the mouth may be behind the line
        let was_in_net = prev.x.abs() > f.half_width && f.in_mouth(prev.y);
        if !was_in_net && !f.in_mouth(body.pos.y) {
            // Went round a post: put it back on the pitch
            body.pos.x = sign_x * (f.half_width - r);
            body.vel.x = -sign_x * body.vel.x.abs() * e;
            return;
        }

        // Inside the net: side netting, then the back
        let side_limit = (f.goal_half - r).max(0.0);
        if body.pos.y.abs() > side_limit {
            let sign_y = body.pos.y.signum();
            body.pos.y = sign_y * side_limit;
            body.vel.y = -sign_y * body.vel.y.abs() * e;
        }
        let back = f.half_width + f.goal_depth;
        if body.pos.x.abs() + r > back {
            body.pos.x = sign_x * (back - r);
            body.vel.x = -sign_x * body.vel.x.abs() * e;
        }
    }

    fn bound_player(&self, body: &mut Body) {
        let e = self.config.wall_restitution;
        let limits = Vec2::new(
            self.field.half_width - body.radius,
            self.field.half_height - body.radius,
        );
        for axis in 0..2 {
            if body.pos[axis].abs() > limits[axis] {
                let sign = body.pos[axis].signum();
                body.pos[axis] = sign * limits[axis];
                let mut inward = Vec2::ZERO;
                inward[axis] = -sign;
                body.vel = reflect(body.vel, inward, e);
            }
        }
    }

    fn resolve_contacts(
        &mut self,
        ball: &mut Ball,
        teams: &mut [Team; 2],
        events: &mut Vec<MatchEvent>,
    ) {
        let percent = self.config.correction_percent;
        let slop = self.config.correction_slop;
        let restitution = self.config.restitution;
        let damping = self.config.collision_damping;

        for _ in 0..self.config.solver_iterations.max(1) {
            let mut touched = false;
            for &(a, b) in &self.pairs {
                let immune = match (a, b) {
                    (EntityRef::Ball, EntityRef::Player(p)) => ball.is_immune_to(p),
                    _ => false,
                };
                let Some((body_a, body_b)) = bodies_mut(ball, teams, a, b) else {
                    continue;
                };
                let Some(contact) = separate(body_a, body_b, percent, slop) else {
                    continue;
                };
                touched = true;

                let closing = if immune {
                    0.0
                } else {
                    exchange_impulse(body_a, body_b, contact.normal, restitution)
                };
                if closing > 0.0 {
                    body_a.vel *= damping;
                    body_b.vel *= damping;
                }
                if self.active.insert((a, b)) {
                    events.push(MatchEvent::Collision {
                        a,
                        b,
                        intensity: closing,
                    });
                }
            }
            if !touched {
                break;
            }
        }

        // Release pairs that drifted apart
        self.active.retain(|&(a, b)| match bodies(ball, teams, a, b) {
            Some((body_a, body_b)) => {
                body_a.pos.distance(body_b.pos) <= (body_a.radius + body_b.radius) * CONTACT_RELEASE
            }
            None => false,
        });
    }

    fn update_possession(&self, ball: &mut Ball, teams: &[Team; 2]) {
        if ball.body.speed() >= self.config.possession_speed {
            ball.possessed_by = None;
            return;
        }
        let pos = ball.body.pos;
        ball.possessed_by = teams
            .iter()
            .flat_map(|t| t.players.iter())
            .map(|p| (p.id, p.distance_to(pos)))
            .filter(|&(_, d)| d < self.config.possession_range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);
    }

    /// A dashing player that stops at the ball pokes it along the player-ball line.
    fn follow_through(&mut self, ball: &mut Ball, teams: &mut [Team; 2]) {
        let Some(dash) = self.dash else {
            return;
        };
        let Some(player) = teams[dash.player.side.index()].player(dash.player.index) else {
            self.dash = None;
            return;
        };
        if player.body.is_moving() {
            return;
        }
        self.dash = None;
        if player.distance_to(ball.body.pos) > self.config.kick_reach() {
            return;
        }
        if let Some(dir) = direction(ball.body.pos - player.body.pos) {
            let speed = dash.power * self.config.max_kick_speed * self.config.follow_through_ratio;
            let vel = clamp_length(dir * speed, self.config.max_ball_speed);
            ball.kick(vel, dash.player, self.config.kick_immunity_steps);
            log::debug!("follow-through by {:?}", dash.player);
        }
    }
}

fn integrate(body: &mut Body, dt: f32, decay: f32, rest_speed: f32) {
    body.pos += body.vel * dt;
    body.vel *= decay;
    if body.vel.length_squared() < rest_speed * rest_speed {
        body.vel = Vec2::ZERO;
    }
}

fn bodies_mut<'a>(
    ball: &'a mut Ball,
    teams: &'a mut [Team; 2],
    a: EntityRef,
    b: EntityRef,
) -> Option<(&'a mut Body, &'a mut Body)> {
    match (a, b) {
        (EntityRef::Ball, EntityRef::Player(p)) => {
            let player = teams[p.side.index()].player_mut(p.index)?;
            Some((&mut ball.body, &mut player.body))
        }
        (EntityRef::Player(p), EntityRef::Player(q)) => {
            let (x, y) = pair_mut(teams, p, q)?;
            Some((&mut x.body, &mut y.body))
        }
        _ => None,
    }
}

fn bodies<'a>(
    ball: &'a Ball,
    teams: &'a [Team; 2],
    a: EntityRef,
    b: EntityRef,
) -> Option<(&'a Body, &'a Body)> {
    let get = |e: EntityRef| match e {
        EntityRef::Ball => Some(&ball.body),
        EntityRef::Player(p) => teams[p.side.index()].player(p.index).map(|pl| &pl.body),
    };
    Some((get(a)?, get(b)?))
}
