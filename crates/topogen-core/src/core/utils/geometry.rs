use nalgebra::{Point3, Vector3};

/// Computes the signed dihedral angle defined by four points, in degrees.
///
/// Uses the displacement vectors `b1 = p1 - p0`, `b2 = p2 - p1` and
/// `b3 = p3 - p2`, and evaluates
/// `atan2(((b1 x b2) x (b2 x b3)) . b2/|b2|, (b1 x b2) . (b2 x b3))`.
/// The result lies in `(-180, 180]`; four coplanar points give `0` when `p0`
/// and `p3` are on the same side of the `p1-p2` axis.
///
/// # Return
///
/// Returns `None` when `p1` and `p2` coincide, where the angle is undefined.
pub fn dihedral_angle(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
) -> Option<f64> {
    let b1 = p1 - p0;
    let b2 = p2 - p1;
    let b3 = p3 - p2;

    let b2_norm = b2.norm();
    if b2_norm == 0.0 {
        return None;
    }

    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let m = n1.cross(&n2);

    let y = m.dot(&(b2 / b2_norm));
    let x = n1.dot(&n2);
    Some(y.atan2(x).to_degrees())
}

/// Wraps a displacement vector to its minimum image in an orthorhombic box.
///
/// Each periodic component is shifted by the nearest integer multiple of the
/// box length along that axis; non-periodic components are left untouched.
pub fn minimum_image(
    delta: &Vector3<f64>,
    box_lengths: &Vector3<f64>,
    periodic: [bool; 3],
) -> Vector3<f64> {
    let mut wrapped = *delta;
    for axis in 0..3 {
        let length = box_lengths[axis];
        if periodic[axis] && length > 0.0 {
            wrapped[axis] -= length * (wrapped[axis] / length).round();
        }
    }
    wrapped
}
