//! Behavior kinds and the per-kind state an agent keeps for each
//!
//! Every kind maps to one variant of [`Behavior`]; state a kind needs
//! between calls (path cursor, wander orientation, peer list, goal point)
//! lives inside its variant.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::basic;
use super::context::{Steered, SteeringContext};
use super::delegate::{self, PathFollower, Wander, WanderParams};
use super::group;
use super::output::SteeringOutput;
use crate::core::SteeringTuning;
use crate::ecs::AgentId;

/// Every steering behavior an agent can enable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SteeringKind {
    // Basic
    Align,
    AntiAlign,
    Arrive,
    Flee,
    Seek,
    VelocityMatching,

    // Delegating
    Evade,
    Face,
    LookWhereYouGoing,
    ObstacleAvoidance,
    PathFollowing,
    Pursue,
    Wander,
    MoveToPosition,

    // Group
    Alignment,
    Cohesion,
    Separation,
}

impl SteeringKind {
    /// All kinds, in declaration order
    pub const ALL: [SteeringKind; 17] = [
        Self::Align,
        Self::AntiAlign,
        Self::Arrive,
        Self::Flee,
        Self::Seek,
        Self::VelocityMatching,
        Self::Evade,
        Self::Face,
        Self::LookWhereYouGoing,
        Self::ObstacleAvoidance,
        Self::PathFollowing,
        Self::Pursue,
        Self::Wander,
        Self::MoveToPosition,
        Self::Alignment,
        Self::Cohesion,
        Self::Separation,
    ];

    /// Whether this kind reads a peer list rather than a single target
    #[must_use]
    pub const fn is_group(self) -> bool {
        matches!(self, Self::Alignment | Self::Cohesion | Self::Separation)
    }
}

impl fmt::Display for SteeringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Kind-specific tunables and state
#[derive(Debug, Clone)]
pub enum Behavior {
    Align { time_to_target: f32 },
    AntiAlign { time_to_target: f32 },
    Arrive { time_to_target: f32 },
    Flee,
    Seek,
    VelocityMatching { time_to_target: f32 },
    Evade { horizon: f32 },
    Face { time_to_target: f32, point: Option<Vec2> },
    LookWhereYouGoing { time_to_target: f32 },
    ObstacleAvoidance { look_ahead: f32, avoid_distance: f32 },
    PathFollowing(PathFollower),
    Pursue { horizon: f32 },
    Wander { state: Box<Wander>, time_to_target: f32 },
    MoveToPosition { goal: Vec2, tolerance: f32 },
    Alignment { peers: Vec<AgentId>, threshold: f32 },
    Cohesion { peers: Vec<AgentId>, threshold: f32 },
    Separation { peers: Vec<AgentId>, threshold: f32 },
}

/// One active behavior on an agent
#[derive(Debug, Clone)]
pub struct SteeringBehavior {
    /// Multiplier on the linear output only
    pub weight: i32,
    /// Target agent, if the kind uses one
    pub target: Option<AgentId>,
    pub behavior: Behavior,
}

impl SteeringBehavior {
    /// Build a fresh behavior of the given kind.
    ///
    /// `seed` feeds the wander random stream.
    #[must_use]
    pub fn new(kind: SteeringKind, tuning: &SteeringTuning, seed: u64) -> Self {
        let behavior = match kind {
            SteeringKind::Align => Behavior::Align {
                time_to_target: tuning.align_time_to_target,
            },
            SteeringKind::AntiAlign => Behavior::AntiAlign {
                time_to_target: tuning.align_time_to_target,
            },
            SteeringKind::Arrive => Behavior::Arrive {
                time_to_target: tuning.arrive_time_to_target,
            },
            SteeringKind::Flee => Behavior::Flee,
            SteeringKind::Seek => Behavior::Seek,
            SteeringKind::VelocityMatching => Behavior::VelocityMatching {
                time_to_target: tuning.velocity_matching_time_to_target,
            },
            SteeringKind::Evade => Behavior::Evade {
                horizon: tuning.evade_prediction,
            },
            SteeringKind::Face => Behavior::Face {
                time_to_target: tuning.align_time_to_target,
                point: None,
            },
            SteeringKind::LookWhereYouGoing => Behavior::LookWhereYouGoing {
                time_to_target: tuning.align_time_to_target,
            },
            SteeringKind::ObstacleAvoidance => Behavior::ObstacleAvoidance {
                look_ahead: tuning.look_ahead,
                avoid_distance: tuning.avoid_distance,
            },
            SteeringKind::PathFollowing => {
                Behavior::PathFollowing(PathFollower::new(tuning.path_arrival_radius))
            }
            SteeringKind::Pursue => Behavior::Pursue {
                horizon: tuning.pursue_prediction,
            },
            SteeringKind::Wander => Behavior::Wander {
                state: Box::new(Wander::new(
                    WanderParams {
                        radius: tuning.wander_radius,
                        offset: tuning.wander_offset,
                        rate: tuning.wander_rate,
                    },
                    tuning.wander_orientation,
                    seed,
                )),
                time_to_target: tuning.align_time_to_target,
            },
            SteeringKind::MoveToPosition => Behavior::MoveToPosition {
                goal: Vec2::ZERO,
                tolerance: tuning.move_to_tolerance,
            },
            SteeringKind::Alignment => Behavior::Alignment {
                peers: Vec::new(),
                threshold: tuning.alignment_threshold,
            },
            SteeringKind::Cohesion => Behavior::Cohesion {
                peers: Vec::new(),
                threshold: tuning.cohesion_threshold,
            },
            SteeringKind::Separation => Behavior::Separation {
                peers: Vec::new(),
                threshold: tuning.separation_threshold,
            },
        };

        // MoveToPosition stays idle until it is given a goal
        let weight = if kind == SteeringKind::MoveToPosition { 0 } else { 1 };

        Self {
            weight,
            target: None,
            behavior,
        }
    }

    /// The kind this behavior implements
    #[must_use]
    pub const fn kind(&self) -> SteeringKind {
        match &self.behavior {
            Behavior::Align { .. } => SteeringKind::Align,
            Behavior::AntiAlign { .. } => SteeringKind::AntiAlign,
            Behavior::Arrive { .. } => SteeringKind::Arrive,
            Behavior::Flee => SteeringKind::Flee,
            Behavior::Seek => SteeringKind::Seek,
            Behavior::VelocityMatching { .. } => SteeringKind::VelocityMatching,
            Behavior::Evade { .. } => SteeringKind::Evade,
            Behavior::Face { .. } => SteeringKind::Face,
            Behavior::LookWhereYouGoing { .. } => SteeringKind::LookWhereYouGoing,
            Behavior::ObstacleAvoidance { .. } => SteeringKind::ObstacleAvoidance,
            Behavior::PathFollowing(_) => SteeringKind::PathFollowing,
            Behavior::Pursue { .. } => SteeringKind::Pursue,
            Behavior::Wander { .. } => SteeringKind::Wander,
            Behavior::MoveToPosition { .. } => SteeringKind::MoveToPosition,
            Behavior::Alignment { .. } => SteeringKind::Alignment,
            Behavior::Cohesion { .. } => SteeringKind::Cohesion,
            Behavior::Separation { .. } => SteeringKind::Separation,
        }
    }

    /// Peers of a group behavior; empty for other kinds
    #[must_use]
    pub fn peers(&self) -> &[AgentId] {
        match &self.behavior {
            Behavior::Alignment { peers, .. }
            | Behavior::Cohesion { peers, .. }
            | Behavior::Separation { peers, .. } => peers,
            _ => &[],
        }
    }

    /// Replace the peer list of a group behavior; ignored by other kinds
    pub fn set_peers(&mut self, ids: &[AgentId]) {
        match &mut self.behavior {
            Behavior::Alignment { peers, .. }
            | Behavior::Cohesion { peers, .. }
            | Behavior::Separation { peers, .. } => {
                peers.clear();
                peers.extend_from_slice(ids);
            }
            _ => {}
        }
    }

    /// Compute this behavior's contribution for one tick.
    ///
    /// A target that no longer resolves yields zero output.
    pub fn steer(&mut self, me: &Steered<'_>, ctx: &SteeringContext<'_>) -> SteeringOutput {
        let target = ctx.target(self.target);

        match &mut self.behavior {
            Behavior::Align { time_to_target } => target.map_or(SteeringOutput::ZERO, |t| {
                basic::align(me, t.rotation, *time_to_target)
            }),
            Behavior::AntiAlign { time_to_target } => target.map_or(SteeringOutput::ZERO, |t| {
                basic::anti_align(me, t.rotation, *time_to_target)
            }),
            Behavior::Arrive { time_to_target } => target.map_or(SteeringOutput::ZERO, |t| {
                basic::arrive(me, t.position, *time_to_target)
            }),
            Behavior::Flee => target.map_or(SteeringOutput::ZERO, |t| basic::flee(me, t.position)),
            Behavior::Seek => target.map_or(SteeringOutput::ZERO, |t| basic::seek(me, t.position)),
            Behavior::VelocityMatching { time_to_target } => target
                .map_or(SteeringOutput::ZERO, |t| {
                    basic::velocity_matching(me, t.velocity, *time_to_target)
                }),
            Behavior::Evade { horizon } => {
                target.map_or(SteeringOutput::ZERO, |t| delegate::evade(me, &t, *horizon))
            }
            Behavior::Face {
                time_to_target,
                point,
            } => match (*point, target) {
                (Some(point), _) => delegate::face(me, point, *time_to_target),
                (None, Some(t)) => delegate::face(me, t.position, *time_to_target),
                (None, None) => SteeringOutput::ZERO,
            },
            Behavior::LookWhereYouGoing { time_to_target } => {
                delegate::look_where_you_going(me, *time_to_target)
            }
            Behavior::ObstacleAvoidance {
                look_ahead,
                avoid_distance,
            } => ctx.obstacles.map_or(SteeringOutput::ZERO, |obstacles| {
                delegate::obstacle_avoidance(me, obstacles, *look_ahead, *avoid_distance)
            }),
            Behavior::PathFollowing(follower) => follower.steer(me),
            Behavior::Pursue { horizon } => {
                target.map_or(SteeringOutput::ZERO, |t| delegate::pursue(me, &t, *horizon))
            }
            Behavior::Wander {
                state,
                time_to_target,
            } => state.steer(me, *time_to_target),
            Behavior::MoveToPosition { goal, tolerance } => {
                if self.weight == 0 {
                    return SteeringOutput::ZERO;
                }
                if (*goal - me.position()).length() < *tolerance {
                    // Reached: disable without leaving the active set
                    self.weight = 0;
                    return SteeringOutput::ZERO;
                }
                basic::seek(me, *goal)
            }
            Behavior::Alignment { peers, threshold } => {
                group::alignment(me, peers, ctx, *threshold)
            }
            Behavior::Cohesion { peers, threshold } => group::cohesion(me, peers, ctx, *threshold),
            Behavior::Separation { peers, threshold } => {
                group::separation(me, peers, ctx, *threshold)
            }
        }
    }
}
