//! Quadrature-point-local views of the solution and auxiliary fields.
//!
//! Kernels never see meshes, elements or global vectors. They receive a
//! [`PointwiseContext`]: flattened value/derivative/gradient buffers for a
//! single quadrature point together with offset tables mapping registered
//! subfields to positions in those buffers. The offsets are fixed per field
//! configuration and computed once, outside the kernel evaluation loop.

use crate::Real;

/// Offset table for a field with one or more registered subfields.
///
/// For a field whose subfields have `c_0, c_1, ...` components, subfield `i`
/// occupies `offsets()[i] .. offsets()[i] + c_i` in the flattened value
/// buffer and `gradient_offsets()[i] .. gradient_offsets()[i] + c_i * dim`
/// in the flattened gradient buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldLayout {
    offsets: Vec<usize>,
    gradient_offsets: Vec<usize>,
    num_values: usize,
    num_gradient_values: usize,
}

impl FieldLayout {
    /// Builds the offset tables for subfields with the given component counts
    /// in a `dim`-dimensional domain.
    pub fn from_component_counts(dim: usize, components: &[usize]) -> Self {
        let mut offsets = Vec::with_capacity(components.len());
        let mut gradient_offsets = Vec::with_capacity(components.len());
        let mut num_values = 0;
        let mut num_gradient_values = 0;
        for &c in components {
            offsets.push(num_values);
            gradient_offsets.push(num_gradient_values);
            num_values += c;
            num_gradient_values += c * dim;
        }
        Self {
            offsets,
            gradient_offsets,
            num_values,
            num_gradient_values,
        }
    }

    pub fn num_subfields(&self) -> usize {
        self.offsets.len()
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn gradient_offsets(&self) -> &[usize] {
        &self.gradient_offsets
    }

    /// Total number of values per quadrature point.
    pub fn num_values(&self) -> usize {
        self.num_values
    }

    /// Total number of gradient values per quadrature point.
    pub fn num_gradient_values(&self) -> usize {
        self.num_gradient_values
    }
}

/// The ephemeral view of one quadrature point passed into every kernel.
///
/// All buffers are borrowed from the caller, which owns them for the duration
/// of the evaluation pass; kernels only read from the context and accumulate
/// into their designated output slice. Gradients are stored row-major: the
/// derivative of component `i` with respect to coordinate `j` of a subfield
/// starting at gradient offset `off` sits at `s_x[off + i * dim + j]`.
#[derive(Copy, Clone, Debug)]
pub struct PointwiseContext<'a> {
    /// Spatial dimension of the domain.
    pub dim: usize,
    /// Offsets of registered subfields in the solution field.
    pub s_off: &'a [usize],
    /// Offsets of registered subfields in the solution gradient.
    pub s_off_x: &'a [usize],
    /// Solution field with all subfields.
    pub s: &'a [Real],
    /// Time derivative of the solution field.
    pub s_t: &'a [Real],
    /// Gradient of the solution field.
    pub s_x: &'a [Real],
    /// Offsets of registered subfields in the auxiliary field.
    pub a_off: &'a [usize],
    /// Offsets of registered subfields in the auxiliary gradient.
    pub a_off_x: &'a [usize],
    /// Auxiliary field with all subfields.
    pub a: &'a [Real],
    /// Time derivative of the auxiliary field.
    pub a_t: &'a [Real],
    /// Gradient of the auxiliary field.
    pub a_x: &'a [Real],
    /// Time of the evaluation.
    pub t: Real,
    /// Spatial coordinates of the quadrature point.
    pub x: &'a [Real],
    /// Constants registered for the evaluation pass.
    pub constants: &'a [Real],
}

impl<'a> PointwiseContext<'a> {
    pub fn num_solution_subfields(&self) -> usize {
        self.s_off.len()
    }

    pub fn num_auxiliary_subfields(&self) -> usize {
        self.a_off.len()
    }

    /// Solution values from subfield `i` onwards; the kernel knows the width
    /// of the subfield it reads.
    pub fn solution(&self, i: usize) -> &'a [Real] {
        &self.s[self.s_off[i]..]
    }

    /// Value of scalar solution subfield `i`.
    pub fn solution_scalar(&self, i: usize) -> Real {
        self.s[self.s_off[i]]
    }

    /// Solution gradient values from subfield `i` onwards.
    pub fn solution_gradient(&self, i: usize) -> &'a [Real] {
        &self.s_x[self.s_off_x[i]..]
    }

    /// Solution time derivatives from subfield `i` onwards.
    pub fn solution_dot(&self, i: usize) -> &'a [Real] {
        &self.s_t[self.s_off[i]..]
    }

    /// Auxiliary values from subfield `i` onwards.
    pub fn auxiliary(&self, i: usize) -> &'a [Real] {
        &self.a[self.a_off[i]..]
    }

    /// Value of scalar auxiliary subfield `i`.
    pub fn auxiliary_scalar(&self, i: usize) -> Real {
        self.a[self.a_off[i]]
    }

    /// Auxiliary gradient values from subfield `i` onwards.
    pub fn auxiliary_gradient(&self, i: usize) -> &'a [Real] {
        &self.a_x[self.a_off_x[i]..]
    }
}

/// A collection of quadrature points that can hand out per-point contexts.
///
/// This is the seam toward the solution/auxiliary field collaborator: any
/// type that can produce a [`PointwiseContext`] per point can drive the
/// kernel evaluation routines in [`crate::assembly`].
pub trait SolutionView {
    fn num_points(&self) -> usize;

    /// The pointwise view of quadrature point `point`.
    ///
    /// # Panics
    ///
    /// May panic if `point >= self.num_points()`.
    fn context_at(&self, point: usize) -> PointwiseContext<'_>;
}

/// Owned, uniformly-sized buffers for a batch of quadrature points.
///
/// A convenience implementation of [`SolutionView`] for callers (and tests)
/// that do not bring their own field storage. All per-point buffers are
/// zero-initialized and populated through the `*_mut` accessors.
#[derive(Clone, Debug)]
pub struct PointwiseBatch {
    dim: usize,
    num_points: usize,
    solution_layout: FieldLayout,
    auxiliary_layout: FieldLayout,
    s: Vec<Real>,
    s_t: Vec<Real>,
    s_x: Vec<Real>,
    a: Vec<Real>,
    a_t: Vec<Real>,
    a_x: Vec<Real>,
    x: Vec<Real>,
    time: Real,
    constants: Vec<Real>,
}

impl PointwiseBatch {
    pub fn new(
        dim: usize,
        num_points: usize,
        solution_layout: FieldLayout,
        auxiliary_layout: FieldLayout,
    ) -> Self {
        let s_len = solution_layout.num_values();
        let s_x_len = solution_layout.num_gradient_values();
        let a_len = auxiliary_layout.num_values();
        let a_x_len = auxiliary_layout.num_gradient_values();
        Self {
            dim,
            num_points,
            solution_layout,
            auxiliary_layout,
            s: vec![0.0; s_len * num_points],
            s_t: vec![0.0; s_len * num_points],
            s_x: vec![0.0; s_x_len * num_points],
            a: vec![0.0; a_len * num_points],
            a_t: vec![0.0; a_len * num_points],
            a_x: vec![0.0; a_x_len * num_points],
            x: vec![0.0; dim * num_points],
            time: 0.0,
            constants: Vec::new(),
        }
    }

    pub fn set_time(&mut self, time: Real) {
        self.time = time;
    }

    pub fn set_constants(&mut self, constants: Vec<Real>) {
        self.constants = constants;
    }

    pub fn solution_mut(&mut self, point: usize) -> &mut [Real] {
        let len = self.solution_layout.num_values();
        &mut self.s[point * len..(point + 1) * len]
    }

    pub fn solution_dot_mut(&mut self, point: usize) -> &mut [Real] {
        let len = self.solution_layout.num_values();
        &mut self.s_t[point * len..(point + 1) * len]
    }

    pub fn solution_gradients_mut(&mut self, point: usize) -> &mut [Real] {
        let len = self.solution_layout.num_gradient_values();
        &mut self.s_x[point * len..(point + 1) * len]
    }

    pub fn auxiliary_mut(&mut self, point: usize) -> &mut [Real] {
        let len = self.auxiliary_layout.num_values();
        &mut self.a[point * len..(point + 1) * len]
    }

    pub fn auxiliary_gradients_mut(&mut self, point: usize) -> &mut [Real] {
        let len = self.auxiliary_layout.num_gradient_values();
        &mut self.a_x[point * len..(point + 1) * len]
    }

    pub fn coords_mut(&mut self, point: usize) -> &mut [Real] {
        &mut self.x[point * self.dim..(point + 1) * self.dim]
    }
}

impl SolutionView for PointwiseBatch {
    fn num_points(&self) -> usize {
        self.num_points
    }

    fn context_at(&self, point: usize) -> PointwiseContext<'_> {
        assert!(point < self.num_points, "point index out of bounds");
        let s_len = self.solution_layout.num_values();
        let s_x_len = self.solution_layout.num_gradient_values();
        let a_len = self.auxiliary_layout.num_values();
        let a_x_len = self.auxiliary_layout.num_gradient_values();
        PointwiseContext {
            dim: self.dim,
            s_off: self.solution_layout.offsets(),
            s_off_x: self.solution_layout.gradient_offsets(),
            s: &self.s[point * s_len..(point + 1) * s_len],
            s_t: &self.s_t[point * s_len..(point + 1) * s_len],
            s_x: &self.s_x[point * s_x_len..(point + 1) * s_x_len],
            a_off: self.auxiliary_layout.offsets(),
            a_off_x: self.auxiliary_layout.gradient_offsets(),
            a: &self.a[point * a_len..(point + 1) * a_len],
            a_t: &self.a_t[point * a_len..(point + 1) * a_len],
            a_x: &self.a_x[point * a_x_len..(point + 1) * a_x_len],
            t: self.time,
            x: &self.x[point * self.dim..(point + 1) * self.dim],
            constants: &self.constants,
        }
    }
}
