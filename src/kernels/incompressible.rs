//! Kernels for incompressible elasticity, independent of rheology.
//!
//! Solution fields: `[displacement(dim), pressure(1)]`.
//! Auxiliary fields: `[..., shear_modulus(1), bulk_modulus(1)]` — the shear
//! and bulk moduli are the last two registered auxiliary subfields; anything
//! before them (density, reference state, ...) is model-specific.

use crate::context::PointwiseContext;
use crate::kernels::{elasticity, IncompressibleKernel, StrainKernel, PRESSURE};
use crate::Real;

fn shear_modulus(ctx: &PointwiseContext) -> Real {
    ctx.auxiliary_scalar(ctx.num_auxiliary_subfields() - 2)
}

fn bulk_modulus(ctx: &PointwiseContext) -> Real {
    ctx.auxiliary_scalar(ctx.num_auxiliary_subfields() - 1)
}

/// `Jf1pu` kernel for the pressure equation.
///
/// The derivative of the incompressibility constraint with respect to the
/// volumetric strain rate is the trace operator, so this adds the identity
/// onto the `dim × dim` output block.
pub fn jf1pu(ctx: &PointwiseContext, _s_tshift: Real, jf1: &mut [Real]) {
    let dim = ctx.dim;
    debug_assert_eq!(jf1.len(), dim * dim);

    for i in 0..dim {
        jf1[i * dim + i] += 1.0;
    }
}

/// `Jf2up` kernel for the elasticity equation; the symmetric counterpart of
/// [`jf1pu`], also adding the identity onto the `dim × dim` output block.
pub fn jf2up(ctx: &PointwiseContext, _s_tshift: Real, jf2: &mut [Real]) {
    let dim = ctx.dim;
    debug_assert_eq!(jf2.len(), dim * dim);

    for i in 0..dim {
        jf2[i * dim + i] += 1.0;
    }
}

/// Mean stress for isotropic linear incompressible elasticity WITHOUT
/// reference stress and strain: subtracts the pressure from each diagonal
/// entry of the stress tensor.
pub fn mean_stress(dim: usize, pressure: Real, stress: &mut [Real]) {
    debug_assert_eq!(stress.len(), dim * dim);

    for i in 0..dim {
        stress[i * dim + i] -= pressure;
    }
}

/// Mean stress for isotropic linear incompressible elasticity WITH reference
/// stress and strain.
///
/// The mean reference stress averages the reference-stress components at
/// indices 0, 1 and 3: the reference stress is stored in a flattened
/// symmetric-tensor order in which index 2 is a shear component, not the
/// third diagonal entry. `(mean reference stress - pressure)` is then added
/// to each diagonal entry of the stress tensor.
pub fn mean_stress_refstate(dim: usize, pressure: Real, ref_stress: &[Real], stress: &mut [Real]) {
    debug_assert!(ref_stress.len() >= 4);
    debug_assert_eq!(stress.len(), dim * dim);

    let mean_ref_stress = (ref_stress[0] + ref_stress[1] + ref_stress[3]) / 3.0;
    let mean = mean_ref_stress - pressure;

    for i in 0..dim {
        stress[i * dim + i] += mean;
    }
}

/// Incompressibility constraint kernel:
/// value = $\operatorname{tr} \epsilon + p / \kappa$
/// with $\kappa$ the bulk modulus.
pub fn incompressibility(ctx: &PointwiseContext, strain: &[Real], value: &mut Real) {
    let dim = ctx.dim;
    debug_assert_eq!(strain.len(), dim * dim);

    let mut strain_trace = 0.0;
    for i in 0..dim {
        strain_trace += strain[i * dim + i];
    }
    *value += strain_trace + ctx.solution_scalar(PRESSURE) / bulk_modulus(ctx);
}

/// Cauchy stress for isotropic linear incompressible elasticity: deviatoric
/// stress from the shear modulus, then [`mean_stress`] with the pressure
/// solution subfield.
pub fn cauchy_stress(ctx: &PointwiseContext, strain: &[Real], stress: &mut [Real]) {
    elasticity::deviatoric_stress(ctx.dim, shear_modulus(ctx), strain, stress);
    mean_stress(ctx.dim, ctx.solution_scalar(PRESSURE), stress);
}

// The composition itself is dimension-agnostic; only the strain scratch
// buffer is sized per specialization.
fn f0p(
    ctx: &PointwiseContext,
    strain_fn: StrainKernel,
    incompressible_fn: IncompressibleKernel,
    strain: &mut [Real],
    f0: &mut [Real],
) {
    debug_assert_eq!(strain.len(), ctx.dim * ctx.dim);

    strain_fn(ctx, strain);

    let mut value = 0.0;
    incompressible_fn(ctx, strain, &mut value);

    f0[0] += value;
}

/// Composite `f0` kernel for the pressure equation, plane-strain
/// specialization.
///
/// Invokes the strain kernel into a local 2-D strain tensor, then the
/// incompressibility kernel over the completed tensor, and adds the scalar
/// result into `f0[0]`.
pub fn f0p_plane_strain(
    ctx: &PointwiseContext,
    strain_fn: StrainKernel,
    incompressible_fn: IncompressibleKernel,
    f0: &mut [Real],
) {
    debug_assert_eq!(ctx.dim, 2, "plane-strain specialization requires a 2-D context");

    let mut strain = [0.0; 4];
    f0p(ctx, strain_fn, incompressible_fn, &mut strain, f0);
}

/// Composite `f0` kernel for the pressure equation, 3-D specialization.
pub fn f0p_3d(
    ctx: &PointwiseContext,
    strain_fn: StrainKernel,
    incompressible_fn: IncompressibleKernel,
    f0: &mut [Real],
) {
    debug_assert_eq!(ctx.dim, 3, "3-D specialization requires a 3-D context");

    let mut strain = [0.0; 9];
    f0p(ctx, strain_fn, incompressible_fn, &mut strain, f0);
}

/// `f0p` for isotropic linear incompressible elasticity in plane strain,
/// matching the [`crate::kernels::ResidualKernel`] calling convention.
pub fn f0p_infinitesimal_strain_plane_strain(ctx: &PointwiseContext, f0: &mut [Real]) {
    f0p_plane_strain(ctx, elasticity::infinitesimal_strain, incompressibility, f0);
}

/// `f0p` for isotropic linear incompressible elasticity in 3-D, matching the
/// [`crate::kernels::ResidualKernel`] calling convention.
pub fn f0p_infinitesimal_strain_3d(ctx: &PointwiseContext, f0: &mut [Real]) {
    f0p_3d(ctx, elasticity::infinitesimal_strain, incompressibility, f0);
}

/// `f1u` for isotropic linear incompressible elasticity, matching the
/// [`crate::kernels::ResidualKernel`] calling convention.
pub fn f1u_infinitesimal_strain(ctx: &PointwiseContext, f1: &mut [Real]) {
    elasticity::f1u(ctx, elasticity::infinitesimal_strain, cauchy_stress, f1);
}
