//! Flocking director: separation, alignment and cohesion.

use glam::Vec3;

use eco_core::DEFAULT_HEADING;

use crate::config::FlockConfig;

/// Position and heading of one flock mate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbor {
    pub position: Vec3,
    pub heading:  Vec3,
}

/// The three averaged steering terms, before weighting.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct BoidTerms {
    pub separation: Vec3,
    pub alignment:  Vec3,
    /// Offset from the agent to the flock centre.
    pub cohesion:   Vec3,
    pub count:      usize,
}

/// Average the steering terms over `neighbors`.
///
/// When the flock is larger than `max_size`, separation is reversed and
/// cohesion points away from the centre, so an overcrowded flock spreads
/// out instead of tightening.
pub fn boid_terms(position: Vec3, neighbors: &[Neighbor], cfg: &FlockConfig) -> BoidTerms {
    let count = neighbors.len();
    if count == 0 {
        return BoidTerms::default();
    }
    let mut separation = Vec3::ZERO;
    let mut alignment = Vec3::ZERO;
    let mut centre = Vec3::ZERO;
    for n in neighbors {
        let away = position - n.position;
        if away.length_squared() < cfg.min_spacing * cfg.min_spacing {
            separation += away;
        }
        alignment += n.heading;
        centre += n.position;
    }
    let inv = 1.0 / count as f32;
    let mut terms = BoidTerms {
        separation: separation * inv,
        alignment:  alignment * inv,
        cohesion:   centre * inv - position,
        count,
    };
    if count > cfg.max_size {
        terms.separation = -terms.separation;
        terms.cohesion = -terms.cohesion;
    }
    terms
}

/// New unit heading for an agent at `position` currently heading `heading`.
///
/// The weighted steering is blended into the previous heading rather than
/// replacing it.  With no neighbours the previous heading is returned
/// normalized.  A zero-length result falls back to [`DEFAULT_HEADING`].
pub fn calculate_boid_direction(
    position:  Vec3,
    heading:   Vec3,
    neighbors: &[Neighbor],
    cfg:       &FlockConfig,
) -> Vec3 {
    if neighbors.is_empty() {
        return heading.try_normalize().unwrap_or(DEFAULT_HEADING);
    }
    let t = boid_terms(position, neighbors, cfg);
    let steer = t.separation * cfg.separation + t.alignment * cfg.alignment + t.cohesion * cfg.cohesion;
    let blended = heading * (1.0 - cfg.blend) + steer * cfg.blend;
    blended.try_normalize().unwrap_or(DEFAULT_HEADING)
}
