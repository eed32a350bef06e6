//! Group (flocking) behaviors
//!
//! Peers are supplied by the caller; these functions never discover
//! neighbours on their own. Peers that no longer resolve and the steered
//! agent itself are skipped.

use glam::Vec2;

use super::basic::{SMALL_THRESHOLD, seek};
use super::context::{AgentState, Steered, SteeringContext};
use super::output::SteeringOutput;
use crate::ecs::AgentId;

/// Resolve peers, skipping self and stale handles
fn resolved_peers<'a>(
    peers: &'a [AgentId],
    ctx: &'a SteeringContext<'_>,
) -> impl Iterator<Item = (AgentId, AgentState)> + 'a {
    peers
        .iter()
        .copied()
        .filter(move |&id| Some(id) != ctx.self_id)
        .filter_map(move |id| ctx.agents.get(id).map(|state| (id, state)))
}

/// Steer towards the average heading of nearby peers
pub fn alignment(
    me: &Steered<'_>,
    peers: &[AgentId],
    ctx: &SteeringContext<'_>,
    threshold: f32,
) -> SteeringOutput {
    let mut heading = Vec2::ZERO;
    let mut count = 0usize;

    for (_, peer) in resolved_peers(peers, ctx) {
        if (peer.position - me.position()).length() > threshold {
            continue;
        }
        heading += peer.velocity;
        count += 1;
    }

    if count == 0 {
        return SteeringOutput::ZERO;
    }

    SteeringOutput::linear(heading / count as f32 - me.velocity())
}

/// Seek the centre of mass of nearby peers
pub fn cohesion(
    me: &Steered<'_>,
    peers: &[AgentId],
    ctx: &SteeringContext<'_>,
    threshold: f32,
) -> SteeringOutput {
    let mut center_of_mass = Vec2::ZERO;
    let mut count = 0usize;

    for (_, peer) in resolved_peers(peers, ctx) {
        if (peer.position - me.position()).length() > threshold {
            continue;
        }
        center_of_mass += peer.position;
        count += 1;
    }

    if count == 0 {
        return SteeringOutput::ZERO;
    }

    seek(me, center_of_mass / count as f32)
}

/// Push away from peers that are too close, harder the closer they are
pub fn separation(
    me: &Steered<'_>,
    peers: &[AgentId],
    ctx: &SteeringContext<'_>,
    threshold: f32,
) -> SteeringOutput {
    let mut linear = Vec2::ZERO;

    for (peer_id, peer) in resolved_peers(peers, ctx) {
        let away = me.position() - peer.position;
        let distance = away.length();
        if distance >= threshold {
            continue;
        }

        let strength = me.body.max_acceleration * (threshold - distance) / threshold;
        let direction = if distance < SMALL_THRESHOLD {
            coincident_escape(ctx.self_id, peer_id)
        } else {
            away / distance
        };
        linear += direction * strength;
    }

    SteeringOutput::linear(linear)
}

/// Escape direction for two agents sharing a position.
///
/// Ordered by handle so the pair picks opposite directions.
fn coincident_escape(me: Option<AgentId>, peer: AgentId) -> Vec2 {
    match me {
        Some(me) if me.to_bits() > peer.to_bits() => Vec2::NEG_X,
        _ => Vec2::X,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Transform;
    use crate::steering::{Body, Snapshot};

    fn state(position: Vec2, velocity: Vec2) -> AgentState {
        AgentState {
            position,
            rotation: 0.0,
            velocity,
            rotation_velocity: 0.0,
        }
    }

    fn ids(count: usize) -> Vec<AgentId> {
        let mut world = hecs::World::new();
        (0..count).map(|_| world.spawn(())).collect()
    }

    #[test]
    fn test_alignment_averages_peer_velocity() {
        let ids = ids(3);
        let mut snapshot = Snapshot::new();
        snapshot.insert(ids[1], state(Vec2::new(10.0, 0.0), Vec2::new(4.0, 0.0)));
        snapshot.insert(ids[2], state(Vec2::new(0.0, 10.0), Vec2::new(0.0, 4.0)));
        let ctx = SteeringContext::new(&snapshot).for_agent(ids[0]);

        let transform = Transform::default();
        let body = Body {
            velocity: Vec2::new(1.0, 1.0),
            ..Default::default()
        };
        let me = Steered {
            transform: &transform,
            body: &body,
        };

        let output = alignment(&me, &ids, &ctx, 300.0);
        assert!((output.linear - Vec2::new(1.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_alignment_ignores_distant_peers() {
        let ids = ids(2);
        let mut snapshot = Snapshot::new();
        snapshot.insert(ids[1], state(Vec2::new(1000.0, 0.0), Vec2::new(4.0, 0.0)));
        let ctx = SteeringContext::new(&snapshot).for_agent(ids[0]);

        let transform = Transform::default();
        let body = Body::default();
        let me = Steered {
            transform: &transform,
            body: &body,
        };

        assert_eq!(alignment(&me, &ids, &ctx, 300.0), SteeringOutput::ZERO);
    }

    #[test]
    fn test_cohesion_seeks_centroid() {
        let ids = ids(3);
        let mut snapshot = Snapshot::new();
        snapshot.insert(ids[1], state(Vec2::new(10.0, 10.0), Vec2::ZERO));
        snapshot.insert(ids[2], state(Vec2::new(10.0, -10.0), Vec2::ZERO));
        let ctx = SteeringContext::new(&snapshot).for_agent(ids[0]);

        let transform = Transform::default();
        let body = Body::default();
        let me = Steered {
            transform: &transform,
            body: &body,
        };

        let output = cohesion(&me, &ids, &ctx, 1000.0);
        assert!(output.linear.x > 0.0);
        assert!(output.linear.y.abs() < 1e-3);
    }

    #[test]
    fn test_separation_scales_with_distance() {
        let ids = ids(2);
        let transform = Transform::default();
        let body = Body::default();
        let me = Steered {
            transform: &transform,
            body: &body,
        };

        let mut near = Snapshot::new();
        near.insert(ids[1], state(Vec2::new(30.0, 0.0), Vec2::ZERO));
        let near_ctx = SteeringContext::new(&near).for_agent(ids[0]);
        let push_near = separation(&me, &ids, &near_ctx, 120.0);

        let mut far = Snapshot::new();
        far.insert(ids[1], state(Vec2::new(90.0, 0.0), Vec2::ZERO));
        let far_ctx = SteeringContext::new(&far).for_agent(ids[0]);
        let push_far = separation(&me, &ids, &far_ctx, 120.0);

        assert!(push_near.linear.x < 0.0);
        assert!(push_far.linear.x < 0.0);
        assert!(push_near.linear.length() > push_far.linear.length());
        // 500 * (120 - 30) / 120
        assert!((push_near.linear.length() - 375.0).abs() < 1e-3);
    }

    #[test]
    fn test_separation_coincident_peer_is_finite() {
        let ids = ids(2);
        let mut snapshot = Snapshot::new();
        snapshot.insert(ids[0], state(Vec2::new(5.0, 5.0), Vec2::ZERO));
        snapshot.insert(ids[1], state(Vec2::new(5.0, 5.0), Vec2::ZERO));

        let transform = Transform::from_position(Vec2::new(5.0, 5.0));
        let body = Body::default();
        let me = Steered {
            transform: &transform,
            body: &body,
        };

        let first = separation(&me, &ids, &SteeringContext::new(&snapshot).for_agent(ids[0]), 120.0);
        let second = separation(&me, &ids, &SteeringContext::new(&snapshot).for_agent(ids[1]), 120.0);

        assert!(first.linear.is_finite());
        assert!(second.linear.is_finite());
        assert!(first.linear.length() > 0.0);
        // The pair escapes in opposite directions
        assert!((first.linear + second.linear).length() < 1e-3);
    }

    #[test]
    fn test_stale_peers_are_skipped() {
        let ids = ids(2);
        let snapshot = Snapshot::new();
        let ctx = SteeringContext::new(&snapshot).for_agent(ids[0]);

        let transform = Transform::default();
        let body = Body::default();
        let me = Steered {
            transform: &transform,
            body: &body,
        };

        assert_eq!(separation(&me, &ids, &ctx, 120.0), SteeringOutput::ZERO);
        assert_eq!(cohesion(&me, &ids, &ctx, 120.0), SteeringOutput::ZERO);
    }
}
