//! Angle helpers

use std::f64::consts::PI;

/// Wrap an angle into (-pi, pi].
///
/// Uses `atan2(sin, cos)` so that differences of unbounded headings wrap
/// correctly on either side of the +-pi seam. `atan2` can return exactly
/// `-pi`, which is folded onto `pi` to keep the interval half-open.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.sin().atan2(angle.cos());
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Shortest signed rotation from `current` to `desired`, in (-pi, pi]
pub fn heading_error(desired: f64, current: f64) -> f64 {
    wrap_angle(desired - current)
}
