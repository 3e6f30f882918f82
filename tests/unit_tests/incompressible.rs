use super::incompressible_batch;
use fekern::context::{PointwiseContext, SolutionView};
use fekern::kernels::incompressible::{
    f0p_3d, f0p_infinitesimal_strain_plane_strain, f0p_plane_strain, f1u_infinitesimal_strain,
    incompressibility, jf1pu, jf2up, mean_stress, mean_stress_refstate,
};
use fekern::nalgebra::DMatrix;
use fekern::Real;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};

#[test]
fn jf1pu_adds_identity_onto_populated_buffer_2d() {
    let batch = incompressible_batch(2, &[0.0; 4], 0.0, 1.0, 1.0);
    let mut jf1 = [10.0, 20.0, 30.0, 40.0];

    jf1pu(&batch.context_at(0), 1.5, &mut jf1);

    let result = DMatrix::from_row_slice(2, 2, &jf1);
    let expected = DMatrix::from_row_slice(2, 2, &[11.0, 20.0, 30.0, 41.0]);
    assert_matrix_eq!(result, expected);
}

#[test]
fn jf1pu_adds_identity_onto_populated_buffer_3d() {
    let batch = incompressible_batch(3, &[0.0; 9], 0.0, 1.0, 1.0);
    let mut jf1: Vec<Real> = (1..=9).map(|i| i as Real).collect();

    jf1pu(&batch.context_at(0), 0.0, &mut jf1);

    let result = DMatrix::from_row_slice(3, 3, &jf1);
    let expected = DMatrix::from_row_slice(3, 3, &[2.0, 2.0, 3.0, 4.0, 6.0, 6.0, 7.0, 8.0, 10.0]);
    assert_matrix_eq!(result, expected);
}

#[test]
fn jf2up_adds_identity_onto_populated_buffer() {
    let batch = incompressible_batch(2, &[0.0; 4], 0.0, 1.0, 1.0);
    let mut jf2 = [-1.0, 2.0, -3.0, 4.0];

    jf2up(&batch.context_at(0), 1.0, &mut jf2);

    let result = DMatrix::from_row_slice(2, 2, &jf2);
    let expected = DMatrix::from_row_slice(2, 2, &[0.0, 2.0, -3.0, 5.0]);
    assert_matrix_eq!(result, expected);
}

#[test]
fn mean_stress_subtracts_pressure_from_diagonal() {
    let mut stress = [0.0; 9];
    mean_stress(3, 5.0, &mut stress);

    let result = DMatrix::from_row_slice(3, 3, &stress);
    let expected = DMatrix::from_diagonal_element(3, 3, -5.0);
    assert_matrix_eq!(result, expected);
}

#[test]
fn mean_stress_refstate_averages_reference_components_0_1_3() {
    // Index 2 is a shear component in the flattened symmetric-tensor order
    // and must not enter the mean.
    let ref_stress = [10.0, 20.0, 7.0, 30.0];
    let mut stress = [0.0; 9];

    mean_stress_refstate(3, 5.0, &ref_stress, &mut stress);

    // mean ref stress = (10 + 20 + 30) / 3 = 20, minus pressure 5 = 15.
    let result = DMatrix::from_row_slice(3, 3, &stress);
    let expected = DMatrix::from_diagonal_element(3, 3, 15.0);
    assert_matrix_eq!(result, expected);
}

fn constant_strain(_ctx: &PointwiseContext, strain: &mut [Real]) {
    for (i, entry) in strain.iter_mut().enumerate() {
        *entry += (i + 1) as Real;
    }
}

fn constant_constraint(_ctx: &PointwiseContext, strain: &[Real], value: &mut Real) {
    // The composite must hand over the completed strain tensor.
    for (i, entry) in strain.iter().enumerate() {
        assert_eq!(*entry, (i + 1) as Real);
    }
    *value += 42.5;
}

#[test]
fn composite_f0p_plane_strain_adds_exactly_the_constraint_value() {
    let batch = incompressible_batch(2, &[0.0; 4], 0.0, 1.0, 1.0);
    let mut f0 = [1.5];

    f0p_plane_strain(&batch.context_at(0), constant_strain, constant_constraint, &mut f0);

    assert_scalar_eq!(f0[0], 44.0, comp = float);
}

#[test]
fn composite_f0p_3d_adds_exactly_the_constraint_value() {
    let batch = incompressible_batch(3, &[0.0; 9], 0.0, 1.0, 1.0);
    let mut f0 = [0.0];

    f0p_3d(&batch.context_at(0), constant_strain, constant_constraint, &mut f0);

    assert_scalar_eq!(f0[0], 42.5, comp = float);
}

#[test]
#[should_panic(expected = "3-D specialization")]
fn composite_f0p_3d_rejects_plane_strain_context() {
    let batch = incompressible_batch(2, &[0.0; 4], 0.0, 1.0, 1.0);
    let mut f0 = [0.0];

    f0p_3d(&batch.context_at(0), constant_strain, constant_constraint, &mut f0);
}

#[test]
fn incompressibility_is_strain_trace_plus_scaled_pressure() {
    let batch = incompressible_batch(2, &[0.0; 4], 3.0, 1.0, 2.0);
    let strain = [1.0, 0.5, 0.5, 4.0];
    let mut value = 0.25;

    incompressibility(&batch.context_at(0), &strain, &mut value);

    // trace = 5, pressure / bulk modulus = 1.5, plus the prior 0.25.
    assert_scalar_eq!(value, 6.75, comp = float);
}

#[test]
fn f0p_infinitesimal_strain_plane_strain_end_to_end() {
    let displacement_gradient = [1.0, 2.0, 3.0, 4.0];
    let batch = incompressible_batch(2, &displacement_gradient, 3.0, 1.0, 2.0);
    let mut f0 = [0.0];

    f0p_infinitesimal_strain_plane_strain(&batch.context_at(0), &mut f0);

    // tr(eps) = 1 + 4 = 5; p / kappa = 1.5.
    assert_scalar_eq!(f0[0], 6.5, comp = float);
}

#[test]
fn f1u_infinitesimal_strain_end_to_end() {
    // eps = diag(2, 0); tr(eps) / 3 = 2/3.
    // sigma_dev = 2 * 3 * (eps - 2/3 I) = diag(8, -4); sigma = sigma_dev - p I.
    let displacement_gradient = [2.0, 0.0, 0.0, 0.0];
    let batch = incompressible_batch(2, &displacement_gradient, 1.0, 3.0, 10.0);
    let mut f1 = [0.0; 4];

    f1u_infinitesimal_strain(&batch.context_at(0), &mut f1);

    let result = DMatrix::from_row_slice(2, 2, &f1);
    let expected = DMatrix::from_row_slice(2, 2, &[-7.0, 0.0, 0.0, 5.0]);
    assert_matrix_eq!(result, expected, comp = float);
}
