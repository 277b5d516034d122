use crate::settings::BisectionSettings;

pub(crate) type Point = (f64, f64);

fn lerp(a: Point, b: Point, t: f64) -> Point {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// Locates a zero of `f` on the straight segment from `a` to `b`.
///
/// `fa` and `fb` are the already-known endpoint values. An endpoint within
/// `zero_band` of zero is returned as is; otherwise the endpoint values must
/// bracket a sign change. Bisection stops once `|f| < settings.tolerance` or
/// after `settings.max_iterations` halvings, returning the bracket midpoint.
/// An undefined sample inside the bracket abandons the segment.
pub(crate) fn bisect_segment<F>(
    a: Point,
    b: Point,
    fa: f64,
    fb: f64,
    zero_band: f64,
    settings: &BisectionSettings,
    mut f: F,
) -> Option<Point>
where
    F: FnMut(f64, f64) -> f64,
{
    if !fa.is_finite() || !fb.is_finite() {
        return None;
    }
    if fa.abs() <= zero_band {
        return Some(a);
    }
    if fb.abs() <= zero_band {
        return Some(b);
    }
    if (fa < 0.0) == (fb < 0.0) {
        return None;
    }

    let mut lo = 0.0;
    let mut hi = 1.0;
    let mut f_lo = fa;
    for _ in 0..settings.max_iterations {
        let mid = 0.5 * (lo + hi);
        let p = lerp(a, b, mid);
        let fm = f(p.0, p.1);
        if !fm.is_finite() {
            return None;
        }
        if fm.abs() < settings.tolerance {
            return Some(p);
        }
        if (f_lo < 0.0) == (fm < 0.0) {
            lo = mid;
            f_lo = fm;
        } else {
            hi = mid;
        }
    }
    Some(lerp(a, b, 0.5 * (lo + hi)))
}

#[cfg(test)]
mod tests {
    use super::bisect_segment;
    use crate::settings::BisectionSettings;
    use approx::assert_abs_diff_eq;

    #[test]
    fn finds_crossing_on_diagonal_segment() {
        let f = |x: f64, y: f64| x + y - 1.0;
        let settings = BisectionSettings::new(60, 1e-12);
        let (x, y) = bisect_segment((0.0, 0.0), (1.0, 1.0), -1.0, 1.0, 0.0, &settings, f)
            .expect("sign change should produce a root");
        assert_abs_diff_eq!(x, 0.5, epsilon = 1e-10);
        assert_abs_diff_eq!(y, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn returns_endpoint_inside_zero_band() {
        let settings = BisectionSettings::default();
        let root = bisect_segment((2.0, 0.0), (3.0, 0.0), 1e-9, 4.0, 1e-6, &settings, |_, _| {
            panic!("no evaluation expected")
        });
        assert_eq!(root, Some((2.0, 0.0)));
    }

    #[test]
    fn rejects_segments_without_sign_change_or_defined_values() {
        let settings = BisectionSettings::default();
        let f = |x: f64, _y: f64| x * x + 1.0;
        assert_eq!(
            bisect_segment((0.0, 0.0), (1.0, 0.0), 1.0, 2.0, 1e-6, &settings, f),
            None
        );
        assert_eq!(
            bisect_segment((0.0, 0.0), (1.0, 0.0), f64::NAN, 2.0, 1e-6, &settings, f),
            None
        );
    }

    #[test]
    fn stops_at_iteration_cap() {
        let settings = BisectionSettings::new(3, 1e-14);
        let mut calls = 0;
        let root = bisect_segment((0.0, 0.0), (1.0, 0.0), -0.3, 0.7, 0.0, &settings, |x, _| {
            calls += 1;
            x - 0.3
        })
        .expect("bracketed root");
        assert_eq!(calls, 3);
        assert!((root.0 - 0.3).abs() <= 1.0 / 8.0);
    }
}
