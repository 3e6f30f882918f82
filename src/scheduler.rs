//! Scheduling of Jacobian recomputation.
//!
//! An integrator caches up to three Jacobian operators: the left-hand-side
//! Jacobian, its lumped (diagonal) approximation, and the right-hand-side
//! Jacobian. Rebuilding any of them is expensive, so each category carries a
//! dirty flag together with a set of *trigger* conditions that force a rebuild
//! when they occur. The scheduler only ever raises dirty flags; the owning
//! integrator clears them after it has consumed a successful rebuild.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A set of conditions that force recomputation of a cached Jacobian.
///
/// Triggers combine with `|`; assigning [`JacobianTriggers::NEVER`] through
/// [`JacobianScheduler::set_triggers`] resets the set instead of combining.
#[derive(Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JacobianTriggers(u32);

impl JacobianTriggers {
    /// The empty trigger set: the Jacobian is computed on first use and then
    /// never again from the trigger path.
    pub const NEVER: Self = JacobianTriggers(0);
    /// Rebuild whenever the time step `dt` changes.
    pub const TIME_STEP_CHANGE: Self = JacobianTriggers(1 << 0);

    /// Returns `true` if every trigger in `other` is also set in `self`.
    pub fn contains(&self, other: JacobianTriggers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for JacobianTriggers {
    fn default() -> Self {
        Self::NEVER
    }
}

impl BitOr for JacobianTriggers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        JacobianTriggers(self.0 | rhs.0)
    }
}

impl BitOrAssign for JacobianTriggers {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for JacobianTriggers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "JacobianTriggers(NEVER)");
        }
        let mut set = f.debug_set();
        if self.contains(Self::TIME_STEP_CHANGE) {
            set.entry(&"TIME_STEP_CHANGE");
        }
        set.finish()
    }
}

/// The category of a cached Jacobian operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JacobianKind {
    /// The left-hand-side Jacobian (implicit formulations).
    Lhs,
    /// The lumped, diagonal approximation of the LHS Jacobian
    /// (explicit formulations).
    LhsLumped,
    /// The right-hand-side Jacobian.
    Rhs,
}

impl JacobianKind {
    pub const ALL: [JacobianKind; 3] = [JacobianKind::Lhs, JacobianKind::LhsLumped, JacobianKind::Rhs];

    fn index(self) -> usize {
        match self {
            JacobianKind::Lhs => 0,
            JacobianKind::LhsLumped => 1,
            JacobianKind::Rhs => 2,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct CategoryState {
    dirty: bool,
    triggers: JacobianTriggers,
}

impl Default for CategoryState {
    fn default() -> Self {
        // The first evaluation is always required.
        Self {
            dirty: true,
            triggers: JacobianTriggers::NEVER,
        }
    }
}

/// Per-integrator bookkeeping of which Jacobian categories must be rebuilt.
///
/// Each category starts out dirty with an empty trigger set. A query never
/// lowers a dirty flag; once raised it stays raised until the owner calls
/// [`clear_rebuilt`](Self::clear_rebuilt) after a successful rebuild.
#[derive(Clone, Debug, Default)]
pub struct JacobianScheduler {
    categories: [CategoryState; 3],
}

impl JacobianScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether the given Jacobian category must be recomputed.
    ///
    /// If the time step changed and the category is triggered by
    /// [`JacobianTriggers::TIME_STEP_CHANGE`], the dirty flag is raised.
    /// Returns the (possibly just-raised) dirty flag; there are no other
    /// side effects, so querying with `dt_changed = false` is a pure read.
    pub fn needs_rebuild(&mut self, kind: JacobianKind, dt_changed: bool) -> bool {
        let category = &mut self.categories[kind.index()];
        if dt_changed && category.triggers.contains(JacobianTriggers::TIME_STEP_CHANGE) {
            category.dirty = true;
        }
        category.dirty
    }

    /// Updates the trigger set for the given category.
    ///
    /// Passing [`JacobianTriggers::NEVER`] resets the set; any other value is
    /// OR-ed into the existing triggers, so independently configured trigger
    /// conditions accumulate.
    pub fn set_triggers(&mut self, kind: JacobianKind, triggers: JacobianTriggers) {
        let category = &mut self.categories[kind.index()];
        if triggers == JacobianTriggers::NEVER {
            category.triggers = triggers;
        } else {
            category.triggers |= triggers;
        }
    }

    /// The current trigger set for the given category.
    pub fn triggers(&self, kind: JacobianKind) -> JacobianTriggers {
        self.categories[kind.index()].triggers
    }

    /// Lowers the dirty flag for the given category.
    ///
    /// This is the owner's rebuild path, to be called only after the rebuilt
    /// operator has actually been stored; the scheduler never lowers a flag
    /// on its own.
    pub fn clear_rebuilt(&mut self, kind: JacobianKind) {
        self.categories[kind.index()].dirty = false;
    }
}
