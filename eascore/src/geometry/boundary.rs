/// Implicit equation of a family of parallel lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineEquation {
    /// `y - slope * x`, constant along any line with this slope
    Sloped { slope: f64 },
    /// `x`, used when the lines are exactly vertical
    Vertical,
}

impl LineEquation {
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        match *self {
            LineEquation::Sloped { slope } => y - slope * x,
            LineEquation::Vertical => x,
        }
    }
}

/// The open strip between two parallel lines.
///
/// A point lies inside iff `lower < equation(point) < upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallelStrip {
    pub lower: f64,
    pub equation: LineEquation,
    pub upper: f64,
}

impl ParallelStrip {
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.equation.evaluate(x, y)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        let value = self.equation.evaluate(x, y);
        self.lower < value && value < self.upper
    }
}

/// Boundary equations of two parallel lines given three points
///
/// Arguments:
///
/// * `p0`, `p1` - two distinct points on the first line
/// * `p2` - a point on the second, parallel line
///
/// Returns:
///
/// * `ParallelStrip` - equation plus the two intercepts, ordered so that `lower <= upper`
///
/// # Examples
///
/// ```
/// use eascore::geometry::boundary::{line_boundary, LineEquation};
///
/// let strip = line_boundary((0.0, 0.0), (1.0, 1.0), (0.0, 2.0));
/// assert_eq!(strip.lower, 0.0);
/// assert_eq!(strip.upper, 2.0);
/// assert_eq!(strip.equation, LineEquation::Sloped { slope: 1.0 });
/// ```
pub fn line_boundary(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64)) -> ParallelStrip {
    let (x0, y0) = p0;
    let (x1, y1) = p1;
    let (x2, y2) = p2;

    let (equation, b1, b2) = if x1 == x0 {
        (LineEquation::Vertical, x0, x2)
    } else {
        let slope = (y1 - y0) / (x1 - x0);
        (LineEquation::Sloped { slope }, y0 - slope * x0, y2 - slope * x2)
    };

    let (lower, upper) = if b1 > b2 { (b2, b1) } else { (b1, b2) };

    ParallelStrip { lower, equation, upper }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_line() {
        let strip = line_boundary((3.0, -1.0), (3.0, 5.0), (1.0, 0.0));
        assert_eq!(strip.equation, LineEquation::Vertical);
        assert_eq!((strip.lower, strip.upper), (1.0, 3.0));
        assert!(strip.contains(2.0, 100.0));
        assert!(!strip.contains(3.0, 0.0));
        assert!(!strip.contains(0.5, 0.0));
    }

    #[test]
    fn test_horizontal_line() {
        let strip = line_boundary((0.0, 2.0), (4.0, 2.0), (0.0, -1.0));
        assert_eq!(strip.equation, LineEquation::Sloped { slope: 0.0 });
        assert_eq!((strip.lower, strip.upper), (-1.0, 2.0));
        assert!(strip.contains(-50.0, 0.0));
        assert!(!strip.contains(0.0, 2.5));
    }

    #[test]
    fn test_bounds_ordered_and_p1_on_boundary() {
        let cases = [
            ((0.0, 0.0), (1.0, 1.0), (0.0, 2.0)),
            ((0.0, 0.0), (1.0, 1.0), (0.0, -2.0)),
            ((1.0, 2.0), (-3.0, 0.5), (4.0, 4.0)),
            ((-2.0, 7.0), (5.0, -1.0), (0.0, 0.0)),
            ((0.5, 0.5), (0.5, -9.0), (-4.0, 1.0)),
            ((2.0, 1.0), (2.5, 100.0), (2.0, 3.0)),
        ];

        for (p0, p1, p2) in cases {
            let strip = line_boundary(p0, p1, p2);
            assert!(strip.lower <= strip.upper);

            let value = strip.evaluate(p1.0, p1.1);
            let tol = 1e-9 * (1.0 + value.abs());
            assert!(strip.lower - tol <= value && value <= strip.upper + tol);
            let on_lower = (value - strip.lower).abs() <= tol;
            let on_upper = (value - strip.upper).abs() <= tol;
            assert!(on_lower || on_upper, "p1 should lie on a boundary: {:?}", (p0, p1, p2));
        }
    }

    #[test]
    fn test_strict_inequality_excludes_boundary() {
        let strip = line_boundary((0.0, 0.0), (1.0, 0.0), (0.0, 1.0));
        assert!(!strip.contains(0.3, 0.0));
        assert!(!strip.contains(0.3, 1.0));
        assert!(strip.contains(0.3, 0.5));
    }
}
