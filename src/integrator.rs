//! The integrator that owns the recompute scheduler and field lifecycle.
//!
//! An [`Integrator`] pairs a physics model with the runtime state needed to
//! integrate it: the per-category Jacobian dirty flags, the auxiliary and
//! derived fields created by the physics, and the constants array passed
//! into every kernel call. The enclosing time-stepping driver queries it
//! once per time step per Jacobian category and runs its assembly through
//! [`rebuild_jacobian_with`](Integrator::rebuild_jacobian_with).

use crate::scheduler::{JacobianKind, JacobianScheduler, JacobianTriggers};
use crate::Real;
use log::debug;

/// A physics model, as seen by its integrator.
///
/// The model creates the auxiliary field (material parameters at quadrature
/// points) and optionally a derived field (output quantities computed from
/// the solution), and supplies the kernel constants for a given time step.
/// The state-update hooks default to doing nothing; models with state
/// variables or derived output override them.
pub trait Physics {
    /// The solution field abstraction this model integrates over.
    type Solution;
    /// The auxiliary/derived field representation.
    type Field;

    fn create_auxiliary_field(&self, solution: &Self::Solution) -> eyre::Result<Self::Field>;

    fn create_derived_field(&self, _solution: &Self::Solution) -> eyre::Result<Option<Self::Field>> {
        Ok(None)
    }

    /// The constants array passed unmodified into every kernel call of an
    /// evaluation pass. Rebuilt whenever `dt` or material parameters change.
    fn kernel_constants(&self, dt: Real) -> Vec<Real>;

    /// Updates state variables in the auxiliary field at the end of a time
    /// step.
    fn update_state_vars(
        &self,
        _t: Real,
        _dt: Real,
        _solution: &Self::Solution,
        _auxiliary: &mut Self::Field,
    ) {
    }

    /// Computes the derived field from the solution at the end of a time
    /// step.
    fn compute_derived_field(
        &self,
        _t: Real,
        _dt: Real,
        _solution: &Self::Solution,
        _derived: &mut Self::Field,
    ) {
    }
}

/// Owns a physics model together with its scheduler, fields and kernel
/// constants.
pub struct Integrator<P: Physics> {
    physics: P,
    scheduler: JacobianScheduler,
    auxiliary_field: Option<P::Field>,
    derived_field: Option<P::Field>,
    kernel_constants: Vec<Real>,
    constants_dt: Option<Real>,
}

impl<P: Physics> Integrator<P> {
    pub fn new(physics: P) -> Self {
        Self {
            physics,
            scheduler: JacobianScheduler::new(),
            auxiliary_field: None,
            derived_field: None,
            kernel_constants: Vec::new(),
            constants_dt: None,
        }
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    /// Creates the auxiliary and derived fields for the given solution.
    ///
    /// Both fields are fully constructed before either replaces its
    /// predecessor, so a construction failure leaves any previously
    /// initialized fields in place.
    pub fn initialize(&mut self, solution: &P::Solution) -> eyre::Result<()> {
        debug!("initialize integrator");
        let auxiliary = self.physics.create_auxiliary_field(solution)?;
        let derived = self.physics.create_derived_field(solution)?;
        self.auxiliary_field = Some(auxiliary);
        self.derived_field = derived;
        Ok(())
    }

    pub fn auxiliary_field(&self) -> Option<&P::Field> {
        self.auxiliary_field.as_ref()
    }

    pub fn derived_field(&self) -> Option<&P::Field> {
        self.derived_field.as_ref()
    }

    /// Declares which events force recomputation of the given Jacobian
    /// category. Configured once per physics model at setup time.
    pub fn set_jacobian_triggers(&mut self, kind: JacobianKind, triggers: JacobianTriggers) {
        self.scheduler.set_triggers(kind, triggers);
    }

    /// Checks whether the given Jacobian category must be recomputed for
    /// this time step.
    pub fn needs_new_jacobian(&mut self, kind: JacobianKind, dt_changed: bool) -> bool {
        self.scheduler.needs_rebuild(kind, dt_changed)
    }

    /// Runs `rebuild` if the given Jacobian category is due for
    /// recomputation, and clears the dirty flag only if it succeeds.
    ///
    /// Returns whether a rebuild ran. On error the dirty flag stays raised,
    /// so the next query reports the rebuild as still pending.
    pub fn rebuild_jacobian_with<F>(
        &mut self,
        kind: JacobianKind,
        dt_changed: bool,
        rebuild: F,
    ) -> eyre::Result<bool>
    where
        F: FnOnce(&P, &[Real]) -> eyre::Result<()>,
    {
        if !self.scheduler.needs_rebuild(kind, dt_changed) {
            return Ok(false);
        }
        debug!("rebuilding {kind:?} Jacobian");
        rebuild(&self.physics, &self.kernel_constants)?;
        self.scheduler.clear_rebuilt(kind);
        Ok(true)
    }

    /// Rebuilds the kernel constants if `dt` differs from the value they
    /// were last built for.
    pub fn set_kernel_constants(&mut self, dt: Real) {
        if self.constants_dt == Some(dt) {
            return;
        }
        debug!("rebuilding kernel constants for dt = {dt}");
        self.kernel_constants = self.physics.kernel_constants(dt);
        self.constants_dt = Some(dt);
    }

    /// Forces the next [`set_kernel_constants`](Self::set_kernel_constants)
    /// to rebuild, e.g. after material parameters changed at fixed `dt`.
    pub fn invalidate_kernel_constants(&mut self) {
        self.constants_dt = None;
    }

    /// The constants array for the current evaluation pass.
    pub fn kernel_constants(&self) -> &[Real] {
        &self.kernel_constants
    }

    /// Updates state variables and the derived field at the end of a time
    /// step.
    pub fn poststep(&mut self, t: Real, tindex: usize, dt: Real, solution: &P::Solution) {
        debug!("poststep(t = {t}, tindex = {tindex}, dt = {dt})");
        if let Some(auxiliary) = self.auxiliary_field.as_mut() {
            self.physics.update_state_vars(t, dt, solution, auxiliary);
        }
        if let Some(derived) = self.derived_field.as_mut() {
            self.physics.compute_derived_field(t, dt, solution, derived);
        }
    }
}
