//! Pointwise finite-element kernels and Jacobian recompute scheduling.
//!
//! `fekern` is the integration layer that sits between a time-stepping driver
//! and a global assembly/solver backend. It answers two questions:
//!
//! - *Does the Jacobian need to be rebuilt for this time step?* The
//!   [`scheduler`] module tracks a dirty flag and a set of trigger conditions
//!   per Jacobian category (LHS, lumped LHS, RHS).
//! - *What does each weak-form term contribute at a quadrature point?* The
//!   [`kernels`] module defines small, stateless pointwise functions that
//!   accumulate residual (`f0`/`f1`) and Jacobian (`Jf0`..`Jf3`) terms from a
//!   [`context::PointwiseContext`], and composes them by passing kernels to
//!   other kernels as plain function values.
//!
//! The [`integrator`] module ties the two together: an [`integrator::Integrator`]
//! owns the scheduler, the auxiliary field and the kernel-constants array, and
//! clears dirty flags only after a successful rebuild. The [`assembly`] module
//! evaluates registered kernels across quadrature points and hands dense local
//! contributions back to the caller, which owns the global sparse operator.
//!
//! Mesh representation, field layout, solver internals and the time-stepping
//! loop itself are external collaborators; see [`context::SolutionView`] and
//! [`integrator::Physics`] for the seams.

pub mod assembly;
pub mod context;
pub mod integrator;
pub mod kernels;
pub mod scheduler;

pub extern crate nalgebra;

/// The scalar type used by all kernels and assembly routines.
///
/// Resolved once at build time: `f64` by default, `f32` with the `scalar-f32`
/// feature. No other part of the crate names a concrete floating-point type.
#[cfg(not(feature = "scalar-f32"))]
pub type Real = f64;

/// The scalar type used by all kernels and assembly routines.
#[cfg(feature = "scalar-f32")]
pub type Real = f32;
