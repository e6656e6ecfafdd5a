//! Unit tests for eco-path.

#[cfg(test)]
mod helpers {
    use glam::IVec3;

    use eco_spatial::{Material, VoxelGrid};

    /// Flat ground at `y = -1`, air above.
    pub fn flat() -> VoxelGrid {
        let mut g = VoxelGrid::new(
            IVec3::new(-16, -2, -16),
            IVec3::new(32, 8, 32),
            Material::Gas,
            Material::Solid,
        )
        .unwrap();
        g.fill_box(IVec3::new(-16, -2, -16), IVec3::new(15, -1, 15), Material::Solid);
        g
    }
}

// ── Requests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod request {
    use glam::{IVec3, Vec3};

    use eco_spatial::{GridPathfinder, MoveProfile};

    use super::helpers::flat;
    use crate::{PathError, PathKind, PathRequest, request_path, try_request_path};

    #[test]
    fn straight_request_is_active() {
        let g = flat();
        let path = request_path(
            &GridPathfinder::default(),
            &g,
            &MoveProfile::walker(),
            IVec3::ZERO,
            PathRequest::To(IVec3::new(3, 0, 0)),
            16,
            PathKind::Static,
        );
        assert!(path.is_active());
        assert!(path.reached());
        assert_eq!(path.remaining(), 3);
        assert_eq!(path.origin(), Some(IVec3::ZERO));
        assert_eq!(path.destination(), Some(IVec3::new(3, 0, 0)));
        assert_eq!(path.next_cell(), Some(IVec3::new(1, 0, 0)));
    }

    #[test]
    fn failed_request_is_inactive() {
        let g = flat();
        let pf = GridPathfinder::default();
        let walker = MoveProfile::walker();
        let req = PathRequest::Ray(Vec3::ZERO);
        assert!(matches!(
            try_request_path(&pf, &g, &walker, IVec3::ZERO, req, 8, PathKind::Static),
            Err(PathError::Search(_))
        ));
        let path = request_path(&pf, &g, &walker, IVec3::ZERO, req, 8, PathKind::Static);
        assert!(!path.is_active());
        assert_eq!(path.destination(), None);
        assert_eq!(path.next_cell(), None);
        assert_eq!(path.remaining(), 0);
    }

    #[test]
    fn flee_ray_heads_away() {
        let g = flat();
        let path = request_path(
            &GridPathfinder::default(),
            &g,
            &MoveProfile::walker(),
            IVec3::ZERO,
            PathRequest::Ray(Vec3::new(-5.0, 0.0, 0.0)),
            8,
            PathKind::Static,
        );
        assert!(path.destination().unwrap().x < 0);
    }
}

// ── Stepping ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod stepping {
    use glam::{IVec3, Vec3};

    use eco_core::{Step, voxel_center};
    use eco_spatial::{Material, MoveProfile, PathPlan, VoxelGrid};

    use super::helpers::flat;
    use crate::{PathKind, PathState, StepOutcome, step, step_dynamic};

    fn east(n: usize) -> PathState {
        let east = Step::from_offset(IVec3::X).unwrap();
        PathState::from_plan(
            PathPlan { origin: IVec3::ZERO, steps: vec![east; n], reached: true },
            PathKind::Static,
        )
    }

    #[test]
    fn inactive_path_is_blocked() {
        let g = flat();
        let mut path = PathState::none();
        assert_eq!(step(&mut path, &g, &MoveProfile::walker(), Vec3::ZERO), StepOutcome::Blocked);
    }

    #[test]
    fn n_steps_arrive_on_the_nth_call() {
        let g = flat();
        let walker = MoveProfile::walker();
        let mut path = east(4);
        for i in 1..=4 {
            let pos = voxel_center(IVec3::new(i, 0, 0));
            let out = step(&mut path, &g, &walker, pos);
            if i < 4 {
                assert_eq!(out, StepOutcome::Continue { waypoint: voxel_center(IVec3::new(i + 1, 0, 0)) });
            } else {
                assert_eq!(out, StepOutcome::Arrived);
            }
        }
        assert!(!path.is_active());
        assert_eq!(step(&mut path, &g, &walker, Vec3::ZERO), StepOutcome::Blocked);
    }

    #[test]
    fn holds_until_the_next_voxel_is_entered() {
        let g = flat();
        let mut path = east(2);
        let out = step(&mut path, &g, &MoveProfile::walker(), voxel_center(IVec3::ZERO));
        assert_eq!(out, StepOutcome::Continue { waypoint: voxel_center(IVec3::X) });
        assert_eq!(path.remaining(), 2);
    }

    #[test]
    fn empty_plan_arrives_immediately() {
        let g = flat();
        let mut path = PathState::from_plan(PathPlan::trivial(IVec3::ZERO), PathKind::Static);
        assert_eq!(step(&mut path, &g, &MoveProfile::walker(), Vec3::splat(0.5)), StepOutcome::Arrived);
    }

    #[test]
    fn drift_invalidates() {
        let g = flat();
        let mut path = east(3);
        let knocked = voxel_center(IVec3::new(0, 0, 5));
        assert_eq!(step(&mut path, &g, &MoveProfile::walker(), knocked), StepOutcome::Blocked);
        assert!(!path.is_active());
    }

    #[test]
    fn world_change_invalidates() {
        let mut g: VoxelGrid = flat();
        let mut path = east(3);
        g.set(IVec3::new(1, 0, 0), Material::Solid);
        let out = step(&mut path, &g, &MoveProfile::walker(), voxel_center(IVec3::ZERO));
        assert_eq!(out, StepOutcome::Blocked);
    }

    #[test]
    fn dynamic_path_drops_when_target_moves() {
        let g = flat();
        let east = Step::from_offset(IVec3::X).unwrap();
        let mut path = PathState::from_plan(
            PathPlan { origin: IVec3::ZERO, steps: vec![east; 4], reached: true },
            PathKind::Dynamic { target: IVec3::new(4, 0, 0) },
        );
        let walker = MoveProfile::walker();
        let me = voxel_center(IVec3::ZERO);

        let nearby = voxel_center(IVec3::new(5, 0, 0));
        assert!(matches!(step_dynamic(&mut path, &g, &walker, me, nearby, 2), StepOutcome::Continue { .. }));

        let gone = voxel_center(IVec3::new(4, 0, 9));
        assert_eq!(step_dynamic(&mut path, &g, &walker, me, gone, 2), StepOutcome::Blocked);
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod validation {
    use glam::IVec3;

    use eco_spatial::PathPlan;

    use crate::{PathKind, PathState};

    #[test]
    fn fresh_state_is_valid() {
        let path = PathState::from_plan(PathPlan::trivial(IVec3::ZERO), PathKind::Static);
        assert!(path.validate().is_ok());
        assert!(PathState::none().validate().is_ok());
    }

    #[test]
    fn invalidate_releases_steps() {
        let mut path = PathState::from_plan(PathPlan::trivial(IVec3::ONE), PathKind::Static);
        path.invalidate();
        assert_eq!(path.current_cell(), None);
        assert_eq!(path.waypoint(), None);
    }
}
