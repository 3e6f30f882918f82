//! Evaluation of registered kernels across quadrature points.
//!
//! The routines here drive the pointwise kernels over a [`SolutionView`] and
//! hand dense local contributions back to the caller. Scattering into the
//! global sparse operator, including quadrature weighting, is owned by the
//! assembly/solver collaborator and out of scope here.
//!
//! Evaluation is embarrassingly parallel across points: each kernel call
//! reads only its own context and writes only a task-local accumulator. The
//! partial accumulators are folded sequentially in point order, so results
//! are reproducible run-to-run independent of scheduling.

use crate::context::{PointwiseContext, SolutionView};
use crate::kernels::{JacobianKernel, ResidualKernel};
use crate::Real;
use itertools::izip;
use nalgebra::{DMatrix, DVector};
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

/// Number of quadrature points each parallel task accumulates locally.
const POINT_CHUNK_SIZE: usize = 256;

/// The residual kernels registered for one solution subfield.
#[derive(Copy, Clone, Debug, Default)]
pub struct ResidualKernels {
    pub f0: Option<ResidualKernel>,
    pub f1: Option<ResidualKernel>,
}

/// The Jacobian kernels registered for one (row, column) subfield pair.
#[derive(Copy, Clone, Debug, Default)]
pub struct JacobianKernels {
    pub jf0: Option<JacobianKernel>,
    pub jf1: Option<JacobianKernel>,
    pub jf2: Option<JacobianKernel>,
    pub jf3: Option<JacobianKernel>,
}

/// Evaluates the registered residual kernels at one quadrature point,
/// accumulating into `f0` and `f1`. The output slices are not cleared.
pub fn evaluate_residual(
    ctx: &PointwiseContext,
    kernels: &ResidualKernels,
    f0: &mut [Real],
    f1: &mut [Real],
) {
    if let Some(kernel) = kernels.f0 {
        kernel(ctx, f0);
    }
    if let Some(kernel) = kernels.f1 {
        kernel(ctx, f1);
    }
}

/// Evaluates the registered Jacobian kernels at one quadrature point,
/// accumulating into the four output slices. The output slices are not
/// cleared.
pub fn evaluate_jacobian(
    ctx: &PointwiseContext,
    kernels: &JacobianKernels,
    s_tshift: Real,
    jf0: &mut [Real],
    jf1: &mut [Real],
    jf2: &mut [Real],
    jf3: &mut [Real],
) {
    if let Some(kernel) = kernels.jf0 {
        kernel(ctx, s_tshift, jf0);
    }
    if let Some(kernel) = kernels.jf1 {
        kernel(ctx, s_tshift, jf1);
    }
    if let Some(kernel) = kernels.jf2 {
        kernel(ctx, s_tshift, jf2);
    }
    if let Some(kernel) = kernels.jf3 {
        kernel(ctx, s_tshift, jf3);
    }
}

fn add_into(accumulator: &mut [Real], contribution: &[Real]) {
    for (out, value) in izip!(accumulator, contribution) {
        *out += value;
    }
}

/// Sums the residual contributions of all quadrature points in the view.
///
/// Returns the accumulated `f0` (length `f0_len`) and `f1` (length `f1_len`)
/// contributions. Points are evaluated in parallel with task-local
/// accumulators; the partial sums are then combined sequentially in point
/// order.
pub fn accumulate_residuals<V>(
    view: &V,
    kernels: &ResidualKernels,
    f0_len: usize,
    f1_len: usize,
) -> (DVector<Real>, DVector<Real>)
where
    V: SolutionView + Sync,
{
    let partials: Vec<(Vec<Real>, Vec<Real>)> = (0..view.num_points())
        .into_par_iter()
        .chunks(POINT_CHUNK_SIZE)
        .map(|points| {
            let mut f0_local = vec![0.0; f0_len];
            let mut f1_local = vec![0.0; f1_len];
            let mut f0_point = vec![0.0; f0_len];
            let mut f1_point = vec![0.0; f1_len];
            for point in points {
                let ctx = view.context_at(point);
                f0_point.fill(0.0);
                f1_point.fill(0.0);
                evaluate_residual(&ctx, kernels, &mut f0_point, &mut f1_point);
                add_into(&mut f0_local, &f0_point);
                add_into(&mut f1_local, &f1_point);
            }
            (f0_local, f1_local)
        })
        .collect();

    let mut f0 = DVector::zeros(f0_len);
    let mut f1 = DVector::zeros(f1_len);
    for (f0_partial, f1_partial) in &partials {
        add_into(f0.as_mut_slice(), f0_partial);
        add_into(f1.as_mut_slice(), f1_partial);
    }
    (f0, f1)
}

/// Sums one Jacobian kernel's `rows × cols` block over all quadrature points
/// in the view.
///
/// The kernel's row-major scratch is accumulated into a dense matrix that the
/// caller scatters into its global operator. Parallelization and determinism
/// follow [`accumulate_residuals`].
pub fn accumulate_jacobian_block<V>(
    view: &V,
    kernel: JacobianKernel,
    s_tshift: Real,
    rows: usize,
    cols: usize,
) -> DMatrix<Real>
where
    V: SolutionView + Sync,
{
    let partials: Vec<DMatrix<Real>> = (0..view.num_points())
        .into_par_iter()
        .chunks(POINT_CHUNK_SIZE)
        .map(|points| {
            let mut block = DMatrix::zeros(rows, cols);
            let mut scratch = vec![0.0; rows * cols];
            for point in points {
                let ctx = view.context_at(point);
                scratch.fill(0.0);
                kernel(&ctx, s_tshift, &mut scratch);
                for i in 0..rows {
                    for j in 0..cols {
                        block[(i, j)] += scratch[i * cols + j];
                    }
                }
            }
            block
        })
        .collect();

    let mut block = DMatrix::zeros(rows, cols);
    for partial in &partials {
        block += partial;
    }
    block
}
