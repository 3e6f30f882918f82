//! Strain and displacement-equation kernels shared by elasticity models.
//!
//! Solution fields: `[displacement(dim), ...]`.

use crate::context::PointwiseContext;
use crate::kernels::{StrainKernel, StressKernel, DISPLACEMENT};
use crate::Real;

/// Accumulates the infinitesimal strain tensor
/// $\epsilon = \frac{1}{2}(\nabla u + \nabla u^T)$
/// from the displacement gradient.
///
/// Dimension-agnostic; `strain` must hold `dim * dim` entries, row-major.
pub fn infinitesimal_strain(ctx: &PointwiseContext, strain: &mut [Real]) {
    let dim = ctx.dim;
    debug_assert_eq!(strain.len(), dim * dim);

    let disp_x = ctx.solution_gradient(DISPLACEMENT);
    for i in 0..dim {
        for j in 0..dim {
            strain[i * dim + j] += 0.5 * (disp_x[i * dim + j] + disp_x[j * dim + i]);
        }
    }
}

/// Accumulates the deviatoric stress
/// $\sigma_{dev} = 2 \mu (\epsilon - \frac{\operatorname{tr} \epsilon}{3} I)$
/// for the given shear modulus $\mu$.
///
/// The trace is divided by 3 regardless of `dim`; in plane strain the
/// out-of-plane strain component is zero and the volumetric split is still
/// three-dimensional.
pub fn deviatoric_stress(dim: usize, shear_modulus: Real, strain: &[Real], stress: &mut [Real]) {
    debug_assert_eq!(strain.len(), dim * dim);
    debug_assert_eq!(stress.len(), dim * dim);

    let mut strain_trace = 0.0;
    for i in 0..dim {
        strain_trace += strain[i * dim + i];
    }
    let mean_strain = strain_trace / 3.0;

    for i in 0..dim {
        for j in 0..dim {
            let mut value = strain[i * dim + j];
            if i == j {
                value -= mean_strain;
            }
            stress[i * dim + j] += 2.0 * shear_modulus * value;
        }
    }
}

/// Composite `f1` kernel for the displacement equation.
///
/// Invokes the strain kernel, then the stress kernel over the completed
/// strain tensor, and subtracts the stress from the `dim * dim` output slice
/// (the weak form moves the stress divergence to the left-hand side, hence
/// the sign). The strain is fully computed before the stress kernel runs.
pub fn f1u(
    ctx: &PointwiseContext,
    strain_fn: StrainKernel,
    stress_fn: StressKernel,
    f1: &mut [Real],
) {
    let dim = ctx.dim;
    debug_assert!(dim == 2 || dim == 3);
    debug_assert_eq!(f1.len(), dim * dim);

    let mut strain = [0.0; 9];
    let strain = &mut strain[..dim * dim];
    strain_fn(ctx, strain);

    let mut stress = [0.0; 9];
    let stress = &mut stress[..dim * dim];
    stress_fn(ctx, strain, stress);

    for i in 0..dim * dim {
        f1[i] -= stress[i];
    }
}
