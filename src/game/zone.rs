//! Shrinking safe-zone state machine
//!
//! The zone is either stable (radius decays by the phase's shrink rate every
//! tick) or transitioning towards a randomly drifted next circle. Only one of
//! those governs the radius on any given tick.

use std::f32::consts::TAU;
use tracing::info;

use crate::util::geometry::{lerp, Point};
use crate::util::time::{secs_to_ticks, TICK_RATE};
use crate::ws::protocol::{PhaseChange, PhaseUpdate, ServerMsg};

use super::random::RandomSource;
use super::world::MapSize;

/// One stage of the zone lifecycle
#[derive(Debug, Clone, Copy)]
pub struct ShrinkPhase {
    /// `None` for the terminal phase
    pub duration_secs: Option<u32>,
    /// Radius multiplier applied per stable tick
    pub shrink_rate: f32,
}

pub const SHRINK_PHASES: [ShrinkPhase; 6] = [
    ShrinkPhase { duration_secs: Some(60), shrink_rate: 1.0 },
    ShrinkPhase { duration_secs: Some(45), shrink_rate: 0.998 },
    ShrinkPhase { duration_secs: Some(45), shrink_rate: 0.996 },
    ShrinkPhase { duration_secs: Some(30), shrink_rate: 0.994 },
    ShrinkPhase { duration_secs: Some(30), shrink_rate: 0.992 },
    ShrinkPhase { duration_secs: None, shrink_rate: 0.990 },
];

/// Ticks spent drifting to the next circle
pub const CIRCLE_TRANSITION_TICKS: u32 = secs_to_ticks(45);

/// Blend factor scaled by transition progress (gives an ease-in)
pub const TRANSITION_BLEND: f32 = 0.03;

/// Minimum spacing between countdown announcements
pub const PHASE_UPDATE_INTERVAL_MS: u64 = 10_000;

/// The radius never decays below this
pub const MIN_ZONE_RADIUS: f32 = 1.0;

/// Next-circle offset, as a fraction of the current radius
const MAX_DRIFT_FRACTION: f32 = 0.6;
/// Next-circle radius range, as fractions of the current radius
const NEXT_RADIUS_FACTOR: (f32, f32) = (0.4, 0.7);
/// Next-circle centers stay within this band of the map on each axis
const MAP_MARGIN: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ZoneMotion {
    Stable,
    Transitioning { target: Circle, progress_ticks: u32 },
}

/// Human description of a per-tick shrink multiplier
pub fn describe_shrink_rate(rate: f32) -> &'static str {
    if rate >= 0.999 {
        "stable"
    } else if rate >= 0.997 {
        "shrinking slowly"
    } else if rate >= 0.995 {
        "shrinking"
    } else if rate >= 0.993 {
        "shrinking quickly"
    } else {
        "shrinking rapidly"
    }
}

/// Owns the safe zone geometry and phase progression
#[derive(Debug, Clone)]
pub struct ZoneController {
    map_size: MapSize,
    center: Point,
    radius: f32,
    phase: usize,
    phase_timer: u32,
    shrink_rate: f32,
    motion: ZoneMotion,
    last_announcement_ms: Option<u64>,
}

impl ZoneController {
    pub fn new(map_size: MapSize) -> Self {
        Self {
            map_size,
            center: map_size.center(),
            radius: map_size.initial_radius(),
            phase: 0,
            phase_timer: 0,
            shrink_rate: SHRINK_PHASES[0].shrink_rate,
            motion: ZoneMotion::Stable,
            last_announcement_ms: None,
        }
    }

    /// Back to phase 0 with the full-map circle
    pub fn reset(&mut self) {
        *self = Self::new(self.map_size);
    }

    /// Advance the zone by one tick, returning any announcements
    pub fn tick(&mut self, now_ms: u64, rng: &mut dyn RandomSource) -> Vec<ServerMsg> {
        let mut events = Vec::new();

        self.phase_timer += 1;

        if let Some(duration) = self.phase_duration_ticks() {
            if self.phase_timer >= duration {
                events.push(ServerMsg::PhaseChange(self.advance_phase(rng)));
                self.last_announcement_ms = Some(now_ms);
            }
        }

        if let Some(update) = self.phase_countdown(now_ms) {
            events.push(ServerMsg::PhaseUpdate(update));
        }

        self.update_geometry();

        events
    }

    fn advance_phase(&mut self, rng: &mut dyn RandomSource) -> PhaseChange {
        self.phase += 1;
        self.phase_timer = 0;
        self.shrink_rate = SHRINK_PHASES[self.phase].shrink_rate;

        let next_circle = (self.phase > 0).then(|| self.generate_next_circle(rng));
        if let Some(target) = next_circle {
            self.motion = ZoneMotion::Transitioning {
                target,
                progress_ticks: 0,
            };
            info!(
                phase = self.phase,
                center_x = target.center.x,
                center_y = target.center.y,
                radius = target.radius,
                "Zone phase advanced, next circle generated"
            );
        }

        PhaseChange {
            phase: self.phase,
            message: self.phase_message(),
            next_circle_center: next_circle.map(|c| c.center),
            next_circle_radius: next_circle.map(|c| c.radius),
        }
    }

    fn phase_countdown(&mut self, now_ms: u64) -> Option<PhaseUpdate> {
        self.phase_duration_ticks()?;

        let due = self
            .last_announcement_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= PHASE_UPDATE_INTERVAL_MS);
        if !due {
            return None;
        }

        let remaining_seconds = self.next_phase_in();
        if remaining_seconds == 0 || remaining_seconds % 10 != 0 {
            return None;
        }

        self.last_announcement_ms = Some(now_ms);
        Some(PhaseUpdate {
            phase: self.phase,
            remaining_seconds,
            message: format!(
                "Phase {}: {} seconds until next shrink!",
                self.phase, remaining_seconds
            ),
        })
    }

    fn update_geometry(&mut self) {
        match self.motion {
            ZoneMotion::Transitioning {
                target,
                progress_ticks,
            } => {
                let progress_ticks = progress_ticks + 1;
                let progress = (progress_ticks as f32 / CIRCLE_TRANSITION_TICKS as f32).min(1.0);

                if progress >= 1.0 {
                    self.center = target.center;
                    self.radius = target.radius;
                    self.motion = ZoneMotion::Stable;
                } else {
                    let blend = progress * TRANSITION_BLEND;
                    self.center = self.center.lerp(target.center, blend);
                    self.radius = lerp(self.radius, target.radius, blend);
                    self.motion = ZoneMotion::Transitioning {
                        target,
                        progress_ticks,
                    };
                }
            }
            ZoneMotion::Stable => {
                self.radius = (self.radius * self.shrink_rate).max(MIN_ZONE_RADIUS);
            }
        }
    }

    /// Pick the next safe circle: drifted from the current center, kept on the
    /// map interior, and 40-70% of the current radius.
    pub fn generate_next_circle(&self, rng: &mut dyn RandomSource) -> Circle {
        let angle = rng.range(0.0, TAU);
        let offset = rng.range(0.0, self.radius * MAX_DRIFT_FRACTION);
        let candidate = Point::from_polar(self.center, angle, offset);

        let (w, h) = (self.map_size.width, self.map_size.height);
        let center = Point::new(
            candidate.x.clamp(w * MAP_MARGIN, w * (1.0 - MAP_MARGIN)),
            candidate.y.clamp(h * MAP_MARGIN, h * (1.0 - MAP_MARGIN)),
        );

        let factor = rng.range(NEXT_RADIUS_FACTOR.0, NEXT_RADIUS_FACTOR.1);
        Circle {
            center,
            radius: (self.radius * factor).max(MIN_ZONE_RADIUS),
        }
    }

    fn phase_duration_ticks(&self) -> Option<u32> {
        SHRINK_PHASES[self.phase].duration_secs.map(secs_to_ticks)
    }

    fn phase_message(&self) -> String {
        format!(
            "Phase {}: The safe zone is {}!",
            self.phase,
            describe_shrink_rate(self.shrink_rate)
        )
    }

    /// Announcement describing the current phase (sent to new joiners)
    pub fn current_phase_change(&self) -> PhaseChange {
        let next = self.next_circle();
        PhaseChange {
            phase: self.phase,
            message: self.phase_message(),
            next_circle_center: next.map(|c| c.center),
            next_circle_radius: next.map(|c| c.radius),
        }
    }

    /// Whole seconds until the next phase, 0 in the terminal phase
    pub fn next_phase_in(&self) -> u32 {
        match self.phase_duration_ticks() {
            Some(duration) => duration.saturating_sub(self.phase_timer).div_ceil(TICK_RATE),
            None => 0,
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    #[cfg(test)]
    pub fn phase_timer(&self) -> u32 {
        self.phase_timer
    }

    #[cfg(test)]
    pub fn shrink_rate(&self) -> f32 {
        self.shrink_rate
    }

    pub fn map_size(&self) -> MapSize {
        self.map_size
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.motion, ZoneMotion::Transitioning { .. })
    }

    /// Target of the in-progress transition
    pub fn next_circle(&self) -> Option<Circle> {
        match self.motion {
            ZoneMotion::Transitioning { target, .. } => Some(target),
            ZoneMotion::Stable => None,
        }
    }

    /// Ticks elapsed in the current transition
    #[cfg(test)]
    pub fn transition_progress(&self) -> Option<u32> {
        match self.motion {
            ZoneMotion::Transitioning { progress_ticks, .. } => Some(progress_ticks),
            ZoneMotion::Stable => None,
        }
    }

    /// Distance from the zone center
    pub fn distance_from_center(&self, point: Point) -> f32 {
        self.center.distance_to(point)
    }

    /// How far beyond the edge `point` lies, `None` when inside
    pub fn distance_outside(&self, point: Point) -> Option<f32> {
        let distance = self.distance_from_center(point);
        (distance > self.radius).then(|| distance - self.radius)
    }

    #[cfg(test)]
    pub(crate) fn set_phase(&mut self, phase: usize) {
        self.phase = phase;
        self.phase_timer = 0;
        self.shrink_rate = SHRINK_PHASES[phase].shrink_rate;
        self.motion = ZoneMotion::Stable;
    }

    #[cfg(test)]
    pub(crate) fn set_circle(&mut self, center: Point, radius: f32) {
        self.center = center;
        self.radius = radius;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::random::ScriptedRandom;

    fn phase_changes(events: &[ServerMsg]) -> Vec<&PhaseChange> {
        events
            .iter()
            .filter_map(|e| match e {
                ServerMsg::PhaseChange(change) => Some(change),
                _ => None,
            })
            .collect()
    }

    fn tick_n(zone: &mut ZoneController, rng: &mut ScriptedRandom, n: u32) -> Vec<ServerMsg> {
        (0..n).flat_map(|_| zone.tick(0, rng)).collect()
    }

    #[test]
    fn test_initial_state() {
        let zone = ZoneController::new(MapSize::DEFAULT);
        assert_eq!(zone.center(), Point::new(1000.0, 1000.0));
        assert_eq!(zone.radius(), 1000.0);
        assert_eq!(zone.phase(), 0);
        assert!(!zone.is_moving());
        assert_eq!(zone.next_phase_in(), 60);
    }

    #[test]
    fn test_phase_advances_exactly_once() {
        let mut zone = ZoneController::new(MapSize::DEFAULT);
        let mut rng = ScriptedRandom::constant(0.5);

        let events = tick_n(&mut zone, &mut rng, secs_to_ticks(60) - 1);
        assert!(phase_changes(&events).is_empty());
        assert_eq!(zone.phase(), 0);
        // Phase 0 does not shrink
        assert_eq!(zone.radius(), 1000.0);

        let events = zone.tick(0, &mut rng);
        let changes = phase_changes(&events);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].phase, 1);
        assert_eq!(changes[0].message, "Phase 1: The safe zone is shrinking slowly!");
        assert!(changes[0].next_circle_center.is_some());
        assert_eq!(zone.phase(), 1);
        assert_eq!(zone.phase_timer(), 0);
        assert_eq!(zone.shrink_rate(), 0.998);
        assert!(zone.is_moving());
    }

    #[test]
    fn test_each_phase_duration_is_honoured() {
        let mut zone = ZoneController::new(MapSize::DEFAULT);
        let mut rng = ScriptedRandom::constant(0.5);

        for (i, phase) in SHRINK_PHASES.iter().enumerate().take(5) {
            let ticks = secs_to_ticks(phase.duration_secs.unwrap());
            tick_n(&mut zone, &mut rng, ticks - 1);
            assert_eq!(zone.phase(), i);
            zone.tick(0, &mut rng);
            assert_eq!(zone.phase(), i + 1);
            assert_eq!(zone.phase_timer(), 0);
        }

        // Terminal phase never advances
        let events = tick_n(&mut zone, &mut rng, secs_to_ticks(120));
        assert!(phase_changes(&events).is_empty());
        assert_eq!(zone.phase(), 5);
        assert_eq!(zone.next_phase_in(), 0);
    }

    #[test]
    fn test_transition_converges_exactly() {
        let mut zone = ZoneController::new(MapSize::DEFAULT);
        let mut rng = ScriptedRandom::constant(0.25);

        tick_n(&mut zone, &mut rng, secs_to_ticks(60));
        let target = zone.next_circle().expect("transition should be active");
        assert_eq!(zone.transition_progress(), Some(1));

        tick_n(&mut zone, &mut rng, CIRCLE_TRANSITION_TICKS - 2);
        assert!(zone.is_moving());

        zone.tick(0, &mut rng);
        assert!(!zone.is_moving());
        assert_eq!(zone.center(), target.center);
        assert_eq!(zone.radius(), target.radius);
        assert!(zone.next_circle().is_none());
    }

    #[test]
    fn test_transition_moves_towards_target() {
        let mut zone = ZoneController::new(MapSize::DEFAULT);
        let mut rng = ScriptedRandom::constant(0.25);
        tick_n(&mut zone, &mut rng, secs_to_ticks(60));

        let target = zone.next_circle().unwrap();
        let mut last_gap = zone.center().distance_to(target.center);
        let mut last_radius = zone.radius();
        for _ in 0..100 {
            zone.tick(0, &mut rng);
            let gap = zone.center().distance_to(target.center);
            assert!(gap <= last_gap);
            assert!(zone.radius() <= last_radius);
            last_gap = gap;
            last_radius = zone.radius();
        }
    }

    #[test]
    fn test_stable_phase_radius_never_grows() {
        let mut zone = ZoneController::new(MapSize::DEFAULT);
        let mut rng = ScriptedRandom::constant(0.5);
        zone.set_phase(3);

        let mut previous = zone.radius();
        for _ in 0..600 {
            zone.tick(0, &mut rng);
            assert!(zone.radius() <= previous);
            assert!(zone.radius() > 0.0);
            previous = zone.radius();
        }
        assert!(zone.radius() < 1000.0);
    }

    #[test]
    fn test_radius_stays_positive_in_final_phase() {
        let mut zone = ZoneController::new(MapSize::DEFAULT);
        let mut rng = ScriptedRandom::constant(0.5);
        zone.set_phase(5);
        tick_n(&mut zone, &mut rng, 20_000);
        assert_eq!(zone.radius(), MIN_ZONE_RADIUS);
    }

    #[test]
    fn test_generate_next_circle() {
        let zone = ZoneController::new(MapSize::DEFAULT);
        // angle 0, offset half of 600, factor 0.4
        let mut rng = ScriptedRandom::new([0.0, 0.5, 0.0]);
        let circle = zone.generate_next_circle(&mut rng);
        assert_eq!(circle.center, Point::new(1300.0, 1000.0));
        assert_eq!(circle.radius, 400.0);
    }

    #[test]
    fn test_next_circle_is_clamped_to_map_interior() {
        let mut zone = ZoneController::new(MapSize::DEFAULT);
        zone.set_circle(Point::new(1750.0, 150.0), 1000.0);

        let mut rng = ScriptedRandom::new([0.0, 0.5, 0.5]);
        let circle = zone.generate_next_circle(&mut rng);
        assert_eq!(circle.center.x, 1800.0);
        assert_eq!(circle.center.y, 200.0);
        assert!((circle.radius - 550.0).abs() < 1e-3);
    }

    #[test]
    fn test_phase_update_is_throttled() {
        let mut zone = ZoneController::new(MapSize::DEFAULT);
        let mut rng = ScriptedRandom::constant(0.5);

        // First tick announces immediately: 60 seconds remain
        let events = zone.tick(0, &mut rng);
        assert!(matches!(
            events.as_slice(),
            [ServerMsg::PhaseUpdate(PhaseUpdate { remaining_seconds: 60, .. })]
        ));

        // Not yet ten seconds of wall clock
        for _ in 0..599 {
            assert!(zone.tick(5_000, &mut rng).is_empty());
        }

        let events = zone.tick(10_000, &mut rng);
        match events.as_slice() {
            [ServerMsg::PhaseUpdate(update)] => {
                assert_eq!(update.phase, 0);
                assert_eq!(update.remaining_seconds, 50);
                assert_eq!(update.message, "Phase 0: 50 seconds until next shrink!");
            }
            other => panic!("expected a phase update, got {other:?}"),
        }
    }

    #[test]
    fn test_no_countdown_off_multiples_of_ten() {
        let mut zone = ZoneController::new(MapSize::DEFAULT);
        let mut rng = ScriptedRandom::constant(0.5);
        zone.tick(0, &mut rng);
        // 59 seconds remaining after this many ticks
        tick_n(&mut zone, &mut rng, 60);
        assert_eq!(zone.next_phase_in(), 59);
        assert!(zone.tick(60_000, &mut rng).is_empty());
    }

    #[test]
    fn test_no_countdown_on_phase_boundary() {
        let mut zone = ZoneController::new(MapSize::DEFAULT);
        let mut rng = ScriptedRandom::constant(0.5);
        zone.set_phase(2);

        // Roughly real time: 17 ms per tick
        let mut now_ms = 0;
        let mut updates_before_boundary = 0;
        loop {
            now_ms += 17;
            let events = zone.tick(now_ms, &mut rng);

            if zone.phase() == 3 {
                // Entering a 30 s phase: 30 is a multiple of ten and the last
                // countdown was more than ten seconds ago
                assert_eq!(zone.next_phase_in(), 30);
                assert_eq!(phase_changes(&events).len(), 1);
                assert_eq!(events.len(), 1, "boundary tick emitted {events:?}");
                break;
            }

            updates_before_boundary += events
                .iter()
                .filter(|e| matches!(e, ServerMsg::PhaseUpdate(_)))
                .count();
        }
        assert!(updates_before_boundary > 0);

        // The countdown resumes ten seconds after the boundary announcement
        let boundary_ms = now_ms;
        let mut resumed = None;
        while resumed.is_none() {
            now_ms += 17;
            resumed = zone.tick(now_ms, &mut rng).into_iter().find_map(|e| match e {
                ServerMsg::PhaseUpdate(update) => Some(update),
                _ => None,
            });
        }
        assert!(now_ms - boundary_ms >= PHASE_UPDATE_INTERVAL_MS);
        assert_eq!(resumed.map(|u| u.phase), Some(3));
    }

    #[test]
    fn test_reset_restores_initial_zone() {
        let mut zone = ZoneController::new(MapSize::DEFAULT);
        let mut rng = ScriptedRandom::constant(0.9);
        tick_n(&mut zone, &mut rng, secs_to_ticks(70));
        assert_eq!(zone.phase(), 1);

        zone.reset();
        assert_eq!(zone.phase(), 0);
        assert_eq!(zone.phase_timer(), 0);
        assert_eq!(zone.radius(), 1000.0);
        assert_eq!(zone.center(), Point::new(1000.0, 1000.0));
        assert!(!zone.is_moving());
    }

    #[test]
    fn test_describe_shrink_rate() {
        assert_eq!(describe_shrink_rate(1.0), "stable");
        assert_eq!(describe_shrink_rate(0.998), "shrinking slowly");
        assert_eq!(describe_shrink_rate(0.996), "shrinking");
        assert_eq!(describe_shrink_rate(0.994), "shrinking quickly");
        assert_eq!(describe_shrink_rate(0.990), "shrinking rapidly");
    }

    #[test]
    fn test_distance_outside() {
        let zone = ZoneController::new(MapSize::DEFAULT);
        assert_eq!(zone.distance_outside(Point::new(1500.0, 1000.0)), None);
        assert_eq!(zone.distance_outside(Point::new(2150.0, 1000.0)), Some(150.0));
    }
}
