//! Voxel lattice math and creature pose.
//!
//! Continuous positions are `glam::Vec3` in world units where one unit is one
//! voxel.  A position belongs to the voxel `floor(position)`; the centre of
//! voxel `c` is `c + 0.5` on every axis.
//!
//! Paths are sequences of [`Step`] codes.  A step is one of the 26
//! neighbour offsets in `{-1, 0, 1}³ \ {0}` or the zero offset ("stay"),
//! packed into a single byte as `(dx+1)*9 + (dy+1)*3 + (dz+1)`.

use glam::{IVec3, Quat, Vec3};

/// Heading used whenever a direction would otherwise be zero-length.
pub const DEFAULT_HEADING: Vec3 = Vec3::Z;

/// The voxel containing `p`.
#[inline]
pub fn voxel_of(p: Vec3) -> IVec3 {
    p.floor().as_ivec3()
}

/// World-space centre of voxel `c`.
#[inline]
pub fn voxel_center(c: IVec3) -> Vec3 {
    c.as_vec3() + Vec3::splat(0.5)
}

/// Chebyshev (L∞) distance between two voxels, i.e. the number of lattice steps
/// needed when diagonal moves are allowed.
#[inline]
pub fn chebyshev(a: IVec3, b: IVec3) -> i32 {
    let d = (a - b).abs();
    d.x.max(d.y).max(d.z)
}

// ── Step ──────────────────────────────────────────────────────────────────────

/// One discrete move on the voxel lattice.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Step(u8);

impl Step {
    /// Number of distinct step codes (26 neighbours + stay).
    pub const COUNT: u8 = 27;

    /// The zero offset.
    pub const STAY: Step = Step(13);

    /// Encode a neighbour offset.  Returns `None` unless every component is
    /// in `-1..=1`.
    pub fn from_offset(o: IVec3) -> Option<Step> {
        let in_range = |v: i32| (-1..=1).contains(&v);
        if !(in_range(o.x) && in_range(o.y) && in_range(o.z)) {
            return None;
        }
        Some(Step(((o.x + 1) * 9 + (o.y + 1) * 3 + (o.z + 1)) as u8))
    }

    /// Decode a raw step code.
    pub fn from_code(code: u8) -> Option<Step> {
        (code < Self::COUNT).then_some(Step(code))
    }

    #[inline]
    pub fn code(self) -> u8 {
        self.0
    }

    /// The lattice offset this step moves by.
    #[inline]
    pub fn offset(self) -> IVec3 {
        let c = self.0 as i32;
        IVec3::new(c / 9 - 1, (c / 3) % 3 - 1, c % 3 - 1)
    }

    #[inline]
    pub fn is_stay(self) -> bool {
        self == Self::STAY
    }

    /// The 26 non-zero neighbour steps, in code order.
    pub fn neighbours() -> impl Iterator<Item = Step> {
        (0..Self::COUNT).map(Step).filter(|s| !s.is_stay())
    }
}

impl TryFrom<u8> for Step {
    type Error = String;
    fn try_from(code: u8) -> Result<Step, String> {
        Step::from_code(code).ok_or_else(|| format!("invalid step code {code}"))
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> u8 {
        step.0
    }
}

// ── Pose ──────────────────────────────────────────────────────────────────────

/// Position and orientation of a creature.
///
/// The body's forward axis is local `+Z`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn at(position: Vec3) -> Self {
        Self { position, rotation: Quat::IDENTITY }
    }

    /// The voxel the creature currently occupies.
    #[inline]
    pub fn voxel(&self) -> IVec3 {
        voxel_of(self.position)
    }

    /// Unit vector the creature is facing.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * DEFAULT_HEADING
    }

    /// Rotate to face along `dir`.  Zero-length directions leave the
    /// rotation untouched.
    pub fn face(&mut self, dir: Vec3) {
        let dir = dir.normalize_or_zero();
        if dir != Vec3::ZERO {
            self.rotation = Quat::from_rotation_arc(DEFAULT_HEADING, dir);
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}
