use eyre::eyre;
use fekern::integrator::{Integrator, Physics};
use fekern::scheduler::{JacobianKind, JacobianTriggers};
use fekern::Real;
use std::cell::Cell;

struct StubPhysics {
    fail_auxiliary: bool,
    marker: Real,
    constants_builds: Cell<usize>,
}

impl StubPhysics {
    fn new(marker: Real) -> Self {
        Self {
            fail_auxiliary: false,
            marker,
            constants_builds: Cell::new(0),
        }
    }
}

impl Physics for StubPhysics {
    type Solution = ();
    type Field = Vec<Real>;

    fn create_auxiliary_field(&self, _solution: &()) -> eyre::Result<Vec<Real>> {
        if self.fail_auxiliary {
            Err(eyre!("auxiliary field construction failed"))
        } else {
            Ok(vec![self.marker])
        }
    }

    fn kernel_constants(&self, dt: Real) -> Vec<Real> {
        self.constants_builds.set(self.constants_builds.get() + 1);
        vec![dt, 2.0 * dt]
    }

    fn update_state_vars(&self, t: Real, dt: Real, _solution: &(), auxiliary: &mut Vec<Real>) {
        auxiliary.push(t + dt);
    }
}

#[test]
fn initialize_failure_keeps_previous_auxiliary_field() {
    let mut integrator = Integrator::new(StubPhysics::new(1.0));
    integrator.initialize(&()).unwrap();
    assert_eq!(integrator.auxiliary_field(), Some(&vec![1.0]));

    integrator.physics_mut().fail_auxiliary = true;
    integrator.physics_mut().marker = 2.0;
    assert!(integrator.initialize(&()).is_err());

    // The old field must remain valid; no window with a missing field.
    assert_eq!(integrator.auxiliary_field(), Some(&vec![1.0]));
}

#[test]
fn rebuild_runs_once_until_retriggered() {
    let mut integrator = Integrator::new(StubPhysics::new(0.0));
    integrator.set_jacobian_triggers(JacobianKind::Lhs, JacobianTriggers::TIME_STEP_CHANGE);

    // First evaluation is always required.
    let ran = integrator
        .rebuild_jacobian_with(JacobianKind::Lhs, false, |_, _| Ok(()))
        .unwrap();
    assert!(ran);

    let ran = integrator
        .rebuild_jacobian_with(JacobianKind::Lhs, false, |_, _| Ok(()))
        .unwrap();
    assert!(!ran);

    let ran = integrator
        .rebuild_jacobian_with(JacobianKind::Lhs, true, |_, _| Ok(()))
        .unwrap();
    assert!(ran);
}

#[test]
fn failed_rebuild_keeps_jacobian_dirty() {
    let mut integrator = Integrator::new(StubPhysics::new(0.0));

    let result = integrator.rebuild_jacobian_with(JacobianKind::Rhs, false, |_, _| {
        Err(eyre!("assembly failed"))
    });
    assert!(result.is_err());

    // The dirty flag was not cleared, so the rebuild is still pending.
    assert!(integrator.needs_new_jacobian(JacobianKind::Rhs, false));
}

#[test]
fn kernel_constants_are_rebuilt_only_when_dt_changes() {
    let mut integrator = Integrator::new(StubPhysics::new(0.0));

    integrator.set_kernel_constants(0.1);
    integrator.set_kernel_constants(0.1);
    assert_eq!(integrator.physics().constants_builds.get(), 1);
    assert_eq!(integrator.kernel_constants(), &[0.1, 0.2]);

    integrator.set_kernel_constants(0.2);
    assert_eq!(integrator.physics().constants_builds.get(), 2);

    integrator.invalidate_kernel_constants();
    integrator.set_kernel_constants(0.2);
    assert_eq!(integrator.physics().constants_builds.get(), 3);
}

#[test]
fn rebuild_callback_receives_current_kernel_constants() {
    let mut integrator = Integrator::new(StubPhysics::new(0.0));
    integrator.set_kernel_constants(0.5);

    let mut seen = Vec::new();
    integrator
        .rebuild_jacobian_with(JacobianKind::Lhs, false, |_, constants| {
            seen.extend_from_slice(constants);
            Ok(())
        })
        .unwrap();

    assert_eq!(seen, vec![0.5, 1.0]);
}

#[test]
fn poststep_updates_state_variables() {
    let mut integrator = Integrator::new(StubPhysics::new(1.0));
    integrator.initialize(&()).unwrap();

    integrator.poststep(1.0, 0, 0.5, &());

    assert_eq!(integrator.auxiliary_field(), Some(&vec![1.0, 1.5]));
}
