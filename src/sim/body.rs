//! Ship flight model
//!
//! Orientation is a unit quaternion. Each tick the pitch and roll requested
//! by the player are applied about last tick's right and forward axes, so
//! controls stay relative to the ship however it is rolled. Travel direction
//! lags behind the nose (drift) and speed is always kept within bounds.

use glam::{Mat4, Quat, Vec3};

use super::collision::hit_scan;
use crate::input::ControlIntent;
use crate::math::{BoundingBox, FORWARD, RIGHT, UP, axis_angle};
use crate::scene::{NodeId, SceneGraph};
use crate::settings::FlightSettings;

/// Flight constants for one ship
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightTuning {
    pub min_speed: f32,
    pub max_speed: f32,
    pub friction: f32,
    pub acceleration: f32,
    pub pitch_rate: f32,
    pub roll_rate: f32,
    pub drift_factor: f32,
    pub ammo_cap: u32,
    pub ammo_cost: u32,
    pub ammo_regen: u32,
    pub hit_radius: f32,
}

impl From<&FlightSettings> for FlightTuning {
    fn from(s: &FlightSettings) -> Self {
        Self {
            min_speed: s.min_speed,
            max_speed: s.max_speed,
            friction: s.friction,
            acceleration: s.acceleration,
            pitch_rate: s.pitch_rate,
            roll_rate: s.roll_rate,
            drift_factor: s.drift_factor,
            ammo_cap: s.ammo_cap,
            ammo_cost: s.ammo_cost,
            ammo_regen: s.ammo_regen,
            hit_radius: s.hit_radius,
        }
    }
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self::from(&FlightSettings::default())
    }
}

/// What the laser did this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    /// Not firing
    Idle,
    Missed,
    Hit,
}

#[derive(Debug, Clone)]
pub struct KinematicBody {
    pub node: NodeId,
    pub translation: Vec3,
    pub rotation: Quat,
    /// Smoothed travel direction
    pub heading: Vec3,
    pub speed: f32,
    pub scale: Vec3,
    pub dead: bool,
    /// Seconds until a dead ship is controllable again
    pub death_timer: f32,
    pub ammo: u32,
    pub tuning: FlightTuning,
    laser: NodeId,
    laser_attached: bool,
    old_right: Vec3,
    old_up: Vec3,
    old_forward: Vec3,
}

impl KinematicBody {
    /// New ship at `translation`, level and facing +Z at minimum speed
    pub fn new(node: NodeId, laser: NodeId, translation: Vec3, tuning: FlightTuning) -> Self {
        Self {
            node,
            translation,
            rotation: Quat::IDENTITY,
            heading: FORWARD,
            speed: tuning.min_speed,
            scale: Vec3::ONE,
            dead: false,
            death_timer: 0.0,
            ammo: tuning.ammo_cap,
            tuning,
            laser,
            laser_attached: false,
            old_right: RIGHT,
            old_up: UP,
            old_forward: FORWARD,
        }
    }

    pub fn laser(&self) -> NodeId {
        self.laser
    }

    pub fn laser_attached(&self) -> bool {
        self.laser_attached
    }

    /// Direction the nose points (not the drifting travel direction)
    pub fn nose(&self) -> Vec3 {
        self.rotation * FORWARD
    }

    /// Basis vectors cached at the end of the previous update
    pub fn previous_basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.old_right, self.old_up, self.old_forward)
    }

    /// Advance one tick.
    ///
    /// `controls` is `None` while the ship is not controllable (match not
    /// started, or dead); the ship then coasts with friction. Non-positive
    /// or non-finite `dt` leaves the body untouched.
    pub fn update(
        &mut self,
        dt: f32,
        controls: Option<&ControlIntent>,
        opponent: Vec3,
        graph: &mut SceneGraph,
    ) -> ShotOutcome {
        if !(dt.is_finite() && dt > 0.0) {
            return ShotOutcome::Idle;
        }
        let t = self.tuning;
        let idle = ControlIntent::default();
        let intent = controls.unwrap_or(&idle);

        if intent.accelerate {
            self.speed += t.acceleration * dt;
        } else {
            self.speed -= t.friction * dt;
        }
        self.speed = self.speed.clamp(t.min_speed, t.max_speed);

        let pitch = intent.pitch_axis() * t.pitch_rate * dt;
        let roll = intent.roll_axis() * t.roll_rate * dt;
        let delta = axis_angle(self.old_right, pitch) * axis_angle(self.old_forward, roll);
        self.rotation = (delta * self.rotation).normalize();

        let raw_heading = self.rotation * FORWARD;
        self.heading = raw_heading.lerp(self.heading, t.drift_factor);
        self.translation += self.heading * self.speed * dt;

        self.sync_transform(graph);

        self.old_right = self.rotation * RIGHT;
        self.old_up = self.rotation * UP;
        self.old_forward = self.rotation * FORWARD;

        if intent.shoot && self.ammo > 0 {
            self.set_laser(true, graph);
            self.ammo = self.ammo.saturating_sub(t.ammo_cost);
            if hit_scan(self.translation, self.nose(), opponent, t.hit_radius) {
                ShotOutcome::Hit
            } else {
                ShotOutcome::Missed
            }
        } else {
            self.set_laser(false, graph);
            self.ammo = self.ammo.saturating_add(t.ammo_regen).min(t.ammo_cap);
            ShotOutcome::Idle
        }
    }

    /// Local transform: translate, then rotate
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Write the current pose to the scene node
    pub fn sync_transform(&self, graph: &mut SceneGraph) {
        graph.set_transform(self.node, self.transform());
    }

    /// Put a crashed ship back in the air, level, at minimum speed, and
    /// start its death timer
    pub fn respawn(&mut self, position: Vec3, death_timeout: f32, graph: &mut SceneGraph) {
        self.translation = position;
        self.rotation = Quat::IDENTITY;
        self.heading = FORWARD;
        self.old_right = RIGHT;
        self.old_up = UP;
        self.old_forward = FORWARD;
        self.speed = self.tuning.min_speed;
        self.dead = true;
        self.death_timer = death_timeout;
        self.set_laser(false, graph);
        self.sync_transform(graph);
    }

    /// Count down the death timer; returns true on the tick the ship revives
    pub fn tick_death_timer(&mut self, dt: f32) -> bool {
        if !self.dead {
            return false;
        }
        self.death_timer -= dt.max(0.0);
        if self.death_timer <= 0.0 {
            self.death_timer = 0.0;
            self.dead = false;
            return true;
        }
        false
    }

    /// World-space box for a model-space box, or `None` while the model is loading
    pub fn bounding_box(&self, model_bounds: Option<&BoundingBox>) -> Option<BoundingBox> {
        model_bounds.map(|b| b.scaled_translated(self.scale, self.translation))
    }

    fn set_laser(&mut self, on: bool, graph: &mut SceneGraph) {
        if on == self.laser_attached {
            return;
        }
        if on {
            match graph.add_child(self.node, self.laser) {
                Ok(()) => self.laser_attached = true,
                Err(e) => log::warn!("Could not attach laser: {e}"),
            }
        } else {
            graph.remove_child(self.node, self.laser);
            self.laser_attached = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn body(graph: &mut SceneGraph) -> KinematicBody {
        let node = graph.create_node("ship");
        let laser = graph.create_node("laser");
        graph.add_child(graph.root(), node).unwrap();
        KinematicBody::new(node, laser, Vec3::new(0.0, 100.0, 0.0), FlightTuning::default())
    }

    fn controls(f: impl FnOnce(&mut ControlIntent)) -> ControlIntent {
        let mut c = ControlIntent::default();
        f(&mut c);
        c
    }

    #[test]
    fn test_level_flight_moves_forward() {
        let mut graph = SceneGraph::new();
        let mut ship = body(&mut graph);
        ship.update(DT, Some(&ControlIntent::default()), Vec3::splat(1000.0), &mut graph);
        let moved = ship.translation - Vec3::new(0.0, 100.0, 0.0);
        assert!((moved - Vec3::Z * 50.0 * DT).length() < 1e-4);

        let world = graph.global_transform(ship.node).transform_point3(Vec3::ZERO);
        assert!((world - ship.translation).length() < 1e-4);
    }

    #[test]
    fn test_non_positive_dt_is_noop() {
        let mut graph = SceneGraph::new();
        let mut ship = body(&mut graph);
        let before = (ship.translation, ship.rotation, ship.speed, ship.ammo);
        let full = controls(|c| {
            c.forward = true;
            c.accelerate = true;
            c.shoot = true;
        });
        for dt in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            assert_eq!(ship.update(dt, Some(&full), Vec3::ZERO, &mut graph), ShotOutcome::Idle);
        }
        assert_eq!((ship.translation, ship.rotation, ship.speed, ship.ammo), before);
    }

    #[test]
    fn test_acceleration_and_friction() {
        let mut graph = SceneGraph::new();
        let mut ship = body(&mut graph);
        let boost = controls(|c| c.accelerate = true);
        for _ in 0..60 {
            ship.update(DT, Some(&boost), Vec3::ZERO, &mut graph);
        }
        assert!((ship.speed - 150.0).abs() < 0.01);

        // Coasting without controls still loses speed
        for _ in 0..60 {
            ship.update(DT, None, Vec3::ZERO, &mut graph);
        }
        assert!((ship.speed - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_ballistic_ignores_steering() {
        let mut graph = SceneGraph::new();
        let mut ship = body(&mut graph);
        for _ in 0..30 {
            ship.update(DT, None, Vec3::ZERO, &mut graph);
        }
        assert_eq!(ship.rotation, Quat::IDENTITY);
        assert!(!ship.laser_attached());
    }

    #[test]
    fn test_pitch_is_relative_to_nose() {
        let mut graph = SceneGraph::new();
        let mut ship = body(&mut graph);
        let roll_right = controls(|c| c.right = true);
        // Roll 90 degrees: pi/2 at 2 rad/s
        let steps = (std::f32::consts::FRAC_PI_2 / (2.0 * DT)).round() as usize;
        for _ in 0..steps {
            ship.update(DT, Some(&roll_right), Vec3::ZERO, &mut graph);
        }
        let (right, _, forward) = ship.previous_basis();
        // Nose unchanged by a pure roll, wing now vertical
        assert!((forward - Vec3::Z).length() < 1e-3);
        assert!(right.y.abs() > 0.99);

        // Pitching now swings the nose sideways in world space
        let pitch = controls(|c| c.forward = true);
        for _ in 0..10 {
            ship.update(DT, Some(&pitch), Vec3::ZERO, &mut graph);
        }
        let nose = ship.nose();
        assert!(nose.x.abs() > 0.1);
        assert!(nose.y.abs() < 1e-2);
    }

    #[test]
    fn test_heading_drifts_behind_nose() {
        let mut graph = SceneGraph::new();
        let mut ship = body(&mut graph);
        let pitch = controls(|c| c.backward = true);
        for _ in 0..5 {
            ship.update(DT, Some(&pitch), Vec3::ZERO, &mut graph);
        }
        let nose = ship.nose();
        let heading = ship.heading.normalize();
        assert!(heading.angle_between(Vec3::Z) < nose.angle_between(Vec3::Z));
    }

    #[test]
    fn test_laser_attach_and_ammo() {
        let mut graph = SceneGraph::new();
        let mut ship = body(&mut graph);
        let fire = controls(|c| c.shoot = true);

        ship.update(DT, Some(&fire), Vec3::new(500.0, 0.0, 0.0), &mut graph);
        assert!(ship.laser_attached());
        assert_eq!(graph.get(ship.laser()).unwrap().parent(), Some(ship.node));
        assert_eq!(ship.ammo, 116);

        // Hold until empty
        for _ in 0..29 {
            ship.update(DT, Some(&fire), Vec3::new(500.0, 0.0, 0.0), &mut graph);
        }
        assert_eq!(ship.ammo, 0);
        assert!(ship.laser_attached());

        // Out of ammo: the beam drops even though the trigger is held
        ship.update(DT, Some(&fire), Vec3::new(500.0, 0.0, 0.0), &mut graph);
        assert!(!ship.laser_attached());
        assert_eq!(ship.ammo, 1);

        ship.update(DT, Some(&ControlIntent::default()), Vec3::ZERO, &mut graph);
        assert_eq!(ship.ammo, 2);
        assert!(graph.get(ship.laser()).unwrap().parent().is_none());
    }

    #[test]
    fn test_ammo_regen_caps() {
        let mut graph = SceneGraph::new();
        let mut ship = body(&mut graph);
        ship.ammo = 119;
        ship.update(DT, None, Vec3::ZERO, &mut graph);
        ship.update(DT, None, Vec3::ZERO, &mut graph);
        assert_eq!(ship.ammo, 120);
    }

    #[test]
    fn test_huge_ammo_regen_saturates() {
        let mut graph = SceneGraph::new();
        let node = graph.create_node("ship");
        let laser = graph.create_node("laser");
        let tuning = FlightTuning {
            ammo_regen: u32::MAX,
            ..FlightTuning::default()
        };
        let mut ship = KinematicBody::new(node, laser, Vec3::ZERO, tuning);
        ship.ammo = 5;
        ship.update(DT, None, Vec3::ZERO, &mut graph);
        assert_eq!(ship.ammo, tuning.ammo_cap);
    }

    #[test]
    fn test_shot_hits_target_ahead() {
        let mut graph = SceneGraph::new();
        let mut ship = body(&mut graph);
        let fire = controls(|c| c.shoot = true);
        let ahead = ship.translation + Vec3::Z * 100.0;
        assert_eq!(ship.update(DT, Some(&fire), ahead, &mut graph), ShotOutcome::Hit);
        let beside = ship.translation + Vec3::X * 100.0;
        assert_eq!(ship.update(DT, Some(&fire), beside, &mut graph), ShotOutcome::Missed);
    }

    #[test]
    fn test_respawn_resets_pose() {
        let mut graph = SceneGraph::new();
        let mut ship = body(&mut graph);
        let wild = controls(|c| {
            c.forward = true;
            c.left = true;
            c.accelerate = true;
            c.shoot = true;
        });
        for _ in 0..30 {
            ship.update(DT, Some(&wild), Vec3::splat(900.0), &mut graph);
        }
        ship.respawn(Vec3::new(1.0, 2.0, 3.0), 3.0, &mut graph);
        assert_eq!(ship.rotation, Quat::IDENTITY);
        assert_eq!(ship.speed, 50.0);
        assert!(ship.dead);
        assert!(!ship.laser_attached());
        assert_eq!(ship.previous_basis(), (RIGHT, UP, FORWARD));

        // Death timer counts down then revives exactly once
        assert!(!ship.tick_death_timer(2.0));
        assert!(ship.tick_death_timer(1.5));
        assert!(!ship.dead);
        assert!(!ship.tick_death_timer(1.0));
    }

    #[test]
    fn test_bounding_box_follows_translation() {
        let mut graph = SceneGraph::new();
        let ship = body(&mut graph);
        assert!(ship.bounding_box(None).is_none());
        let model = BoundingBox::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let bb = ship.bounding_box(Some(&model)).unwrap();
        assert_eq!(bb.center(), ship.translation);
    }

    fn arb_intent() -> impl Strategy<Value = Option<ControlIntent>> {
        proptest::option::of(any::<[bool; 6]>().prop_map(|b| ControlIntent {
            forward: b[0],
            backward: b[1],
            left: b[2],
            right: b[3],
            accelerate: b[4],
            shoot: b[5],
        }))
    }

    proptest! {
        #[test]
        fn prop_speed_stays_in_bounds(
            steps in proptest::collection::vec((arb_intent(), -0.1f32..0.5), 1..200)
        ) {
            let mut graph = SceneGraph::new();
            let mut ship = body(&mut graph);
            for (intent, dt) in steps {
                ship.update(dt, intent.as_ref(), Vec3::ZERO, &mut graph);
                prop_assert!(ship.speed >= 50.0 && ship.speed <= 700.0);
                prop_assert!((ship.rotation.length() - 1.0).abs() < 1e-3);
                prop_assert!(ship.ammo <= 120);
            }
        }
    }
}
