//! Electromagnetic field values and the [`FieldModel`] trait.

use glam::DVec3;

/// Local electromagnetic field at a space-time point.
///
/// `b` is in tesla, `e` in MV/m.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldValue {
    /// Magnetic field (Bx, By, Bz).
    pub b: DVec3,
    /// Electric field (Ex, Ey, Ez).
    pub e: DVec3,
}

impl FieldValue {
    /// All six components zero.
    pub const ZERO: Self = Self {
        b: DVec3::ZERO,
        e: DVec3::ZERO,
    };

    /// A purely magnetic field.
    pub fn magnetic(b: DVec3) -> Self {
        Self { b, e: DVec3::ZERO }
    }

    /// A purely electric field.
    pub fn electric(e: DVec3) -> Self {
        Self { b: DVec3::ZERO, e }
    }

    /// Whether all six components are exactly zero.
    pub fn is_zero(&self) -> bool {
        self.b == DVec3::ZERO && self.e == DVec3::ZERO
    }

    /// Components in transport-kernel order: `[Bx, By, Bz, Ex, Ey, Ez]`.
    pub fn to_array(self) -> [f64; 6] {
        [self.b.x, self.b.y, self.b.z, self.e.x, self.e.y, self.e.z]
    }
}

/// An analytic field map queried by the transport kernel.
///
/// # Contract
///
/// - `evaluate()` is total: defined for every finite `(position, t)` and
///   returns [`FieldValue::ZERO`] wherever the model has no field.
/// - Implementations hold only immutable configuration, so one instance is
///   shared by every worker thread.
pub trait FieldModel: Send + Sync {
    /// Field at `position` (cm) and global time `t` (ns).
    fn evaluate(&self, position: DVec3, t: f64) -> FieldValue;

    /// Whether the field changes with time.
    ///
    /// Default: `false`.
    fn is_time_dependent(&self) -> bool {
        false
    }

    /// Write the field into a kernel-style six-slot buffer
    /// `[Bx, By, Bz, Ex, Ey, Ez]`.
    ///
    /// Every slot is overwritten, so a reused buffer never carries values
    /// from a previous query.
    fn evaluate_into(&self, point: [f64; 4], out: &mut [f64; 6]) {
        let value = self.evaluate(DVec3::new(point[0], point[1], point[2]), point[3]);
        *out = value.to_array();
    }
}

impl<T: FieldModel + ?Sized> FieldModel for std::sync::Arc<T> {
    fn evaluate(&self, position: DVec3, t: f64) -> FieldValue {
        (**self).evaluate(position, t)
    }

    fn is_time_dependent(&self) -> bool {
        (**self).is_time_dependent()
    }
}
