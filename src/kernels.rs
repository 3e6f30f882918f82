//! Pointwise kernel functions and their composition model.
//!
//! A *kernel* is a pure, stateless function evaluating one term of the weak
//! form at a single quadrature point. Every kernel family shares the same
//! shape: read from a [`PointwiseContext`], accumulate into a caller-owned
//! output slice. Kernels never clear their output buffer; contributions are
//! additive across kernels and across quadrature points, and the caller
//! zero-initializes per point.
//!
//! Kernels compose by value: a composite kernel such as
//! [`incompressible::f0p_plane_strain`] takes a [`StrainKernel`] and an
//! [`IncompressibleKernel`] as plain `fn` parameters and invokes them in a
//! fixed order (strain first, then the constraint over the completed strain
//! tensor). This keeps strain models and constraint models freely
//! mix-and-matchable without a type hierarchy.
//!
//! Tensors are flattened row-major: entry `(i, j)` of a `dim × dim` tensor
//! sits at index `i * dim + j`.

use crate::context::PointwiseContext;
use crate::Real;

pub mod elasticity;
pub mod incompressible;

/// Index of the displacement subfield in the solution field.
pub const DISPLACEMENT: usize = 0;
/// Index of the pressure subfield in the solution field.
pub const PRESSURE: usize = 1;

/// A residual kernel (`f0`/`f1` family).
///
/// The output slice is sized by the output subfield: the number of components
/// for an `f0` kernel, components times spatial dimension for an `f1` kernel.
pub type ResidualKernel = fn(&PointwiseContext, &mut [Real]);

/// A Jacobian kernel (`Jf0`..`Jf3` family).
///
/// The second argument is the time-shift weight `s_tshift` relating the
/// solution to its time derivative in the current time-integration scheme.
/// The output slice is sized by the row/column subfield pair.
pub type JacobianKernel = fn(&PointwiseContext, Real, &mut [Real]);

/// A strain kernel: accumulates a `dim × dim` strain tensor from the
/// solution field.
pub type StrainKernel = fn(&PointwiseContext, &mut [Real]);

/// A stress kernel: accumulates a `dim × dim` stress tensor from the
/// completed strain tensor and the context.
pub type StressKernel = fn(&PointwiseContext, &[Real], &mut [Real]);

/// An incompressibility kernel: accumulates the scalar constraint value from
/// the completed strain tensor and the context.
pub type IncompressibleKernel = fn(&PointwiseContext, &[Real], &mut Real);
