//! Collision checks: ship vs terrain, ship vs checkpoint, laser vs ship

use glam::Vec3;

use super::checkpoint::Checkpoint;
use super::state::Player;
use crate::math::BoundingBox;

/// Below this distance the hit cone is undefined
const MIN_HIT_DISTANCE: f32 = 1e-4;

/// A body at height `y` has crashed when the ground under it is higher.
///
/// Off-terrain ground is `f32::INFINITY`, so leaving the map counts as a crash.
#[inline]
pub fn collides_with_terrain(ground: f32, y: f32) -> bool {
    ground > y
}

/// Whether a shot fired along `direction` from `from` hits a target at `target`.
///
/// The cone half-angle is `atan(radius / distance)`, so it narrows with range.
/// Coincident positions and zero directions never hit.
pub fn hit_scan(from: Vec3, direction: Vec3, target: Vec3, radius: f32) -> bool {
    let to_target = target - from;
    let distance = to_target.length();
    if !distance.is_finite() || distance < MIN_HIT_DISTANCE {
        return false;
    }
    let Some(direction) = direction.try_normalize() else {
        return false;
    };
    let threshold = (radius / distance).atan();
    direction.dot(to_target / distance) > threshold.cos()
}

/// Assign checkpoints to overlapping ships.
///
/// Ships are checked in player order, so when both overlap the same
/// checkpoint in one tick the second player ends up owning it. Returns the
/// checkpoints whose owner changed.
pub fn resolve_claims(
    checkpoints: &mut [Checkpoint],
    checkpoint_bounds: &BoundingBox,
    ships: [Option<BoundingBox>; 2],
) -> Vec<(usize, Player)> {
    let mut changed = Vec::new();
    for (index, checkpoint) in checkpoints.iter_mut().enumerate() {
        let Some(cp_box) = checkpoint.bounding_box(Some(checkpoint_bounds)) else {
            continue;
        };
        let previous = checkpoint.claimed_by;
        for player in Player::ALL {
            if let Some(ship_box) = &ships[player.index()] {
                if ship_box.intersects(&cp_box) {
                    checkpoint.claimed_by = Some(player);
                }
            }
        }
        if let Some(owner) = checkpoint.claimed_by {
            if previous != Some(owner) {
                changed.push((index, owner));
            }
        }
    }
    changed
}

/// Number of checkpoints currently owned by `player`
pub fn count_claims(checkpoints: &[Checkpoint], player: Player) -> usize {
    checkpoints
        .iter()
        .filter(|cp| cp.claimed_by == Some(player))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;
    use crate::settings::CheckpointSettings;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ring(graph: &mut SceneGraph, count: usize) -> Vec<Checkpoint> {
        let mut rng = Pcg32::seed_from_u64(5);
        (0..count)
            .map(|i| {
                let node = graph.create_node(format!("checkpoint {i}"));
                Checkpoint::new(
                    node,
                    Vec3::new(i as f32 * 100.0, 0.0, 0.0),
                    &CheckpointSettings::default(),
                    &mut rng,
                )
            })
            .collect()
    }

    fn unit_box() -> BoundingBox {
        BoundingBox::new(Vec3::splat(-0.5), Vec3::splat(0.5))
    }

    fn ship_box_at(p: Vec3) -> Option<BoundingBox> {
        Some(unit_box().scaled_translated(Vec3::ONE, p))
    }

    #[test]
    fn test_terrain_crash_scenarios() {
        assert!(!collides_with_terrain(50.0, 100.0));
        assert!(collides_with_terrain(50.0, 40.0));
        // Touching is not a crash
        assert!(!collides_with_terrain(50.0, 50.0));
        assert!(collides_with_terrain(f32::INFINITY, 1.0e9));
    }

    #[test]
    fn test_hit_scan_direct_at_distance_ten() {
        let from = Vec3::new(0.0, 100.0, 0.0);
        let target = from + Vec3::Z * 10.0;
        assert!(hit_scan(from, Vec3::Z, target, 5.0));
    }

    #[test]
    fn test_hit_scan_cone_narrows_with_range() {
        let from = Vec3::ZERO;
        // 10 units off-axis: inside the cone at 100, outside at 1000
        assert!(hit_scan(from, Vec3::Z, Vec3::new(3.0, 0.0, 100.0), 5.0));
        assert!(!hit_scan(from, Vec3::Z, Vec3::new(10.0, 0.0, 1000.0), 5.0));
        // Behind the shooter
        assert!(!hit_scan(from, Vec3::Z, Vec3::new(0.0, 0.0, -10.0), 5.0));
    }

    #[test]
    fn test_hit_scan_degenerate_inputs() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(!hit_scan(p, Vec3::Z, p, 5.0));
        assert!(!hit_scan(p, Vec3::ZERO, p + Vec3::Z, 5.0));
        assert!(!hit_scan(p, Vec3::Z, Vec3::splat(f32::NAN), 5.0));
    }

    #[test]
    fn test_second_player_wins_tie() {
        let mut graph = SceneGraph::new();
        let mut checkpoints = ring(&mut graph, 5);
        // Checkpoint #3 sits at x = 300 with scale 20
        let at = checkpoints[3].translation;
        let changed = resolve_claims(
            &mut checkpoints,
            &unit_box(),
            [ship_box_at(at + Vec3::X * 2.0), ship_box_at(at - Vec3::X * 2.0)],
        );
        assert_eq!(checkpoints[3].claimed_by, Some(Player::Second));
        assert_eq!(changed, vec![(3, Player::Second)]);
        assert!(checkpoints.iter().enumerate().all(|(i, cp)| i == 3 || cp.claimed_by.is_none()));
    }

    #[test]
    fn test_claim_flips_and_scores_follow() {
        let mut graph = SceneGraph::new();
        let mut checkpoints = ring(&mut graph, 4);
        let bounds = unit_box();

        let first = checkpoints[1].translation;
        resolve_claims(&mut checkpoints, &bounds, [ship_box_at(first), None]);
        assert_eq!(count_claims(&checkpoints, Player::First), 1);

        // Re-touching your own checkpoint is not a change
        assert!(resolve_claims(&mut checkpoints, &bounds, [ship_box_at(first), None]).is_empty());

        let changed = resolve_claims(&mut checkpoints, &bounds, [None, ship_box_at(first)]);
        assert_eq!(changed, vec![(1, Player::Second)]);
        assert_eq!(count_claims(&checkpoints, Player::First), 0);
        assert_eq!(count_claims(&checkpoints, Player::Second), 1);
    }

    #[test]
    fn test_claims_stay_when_ships_leave() {
        let mut graph = SceneGraph::new();
        let mut checkpoints = ring(&mut graph, 3);
        let bounds = unit_box();
        let at = checkpoints[0].translation;
        resolve_claims(&mut checkpoints, &bounds, [ship_box_at(at), None]);
        resolve_claims(&mut checkpoints, &bounds, [ship_box_at(Vec3::splat(-5000.0)), None]);
        assert_eq!(checkpoints[0].claimed_by, Some(Player::First));

        let total = count_claims(&checkpoints, Player::First) + count_claims(&checkpoints, Player::Second);
        assert!(total <= checkpoints.len());
    }
}
