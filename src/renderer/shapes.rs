//! Shape generation for 2D primitives
//!
//! Outlines are plain point lists; the [`Surface`](super::Surface) decides how
//! to fill them.

use glam::Vec2;

/// Horizontal spacing of the jagged edge samples
const JAG_STEP: f32 = 8.0;
const JAG_AMPLITUDE: f32 = 8.0;
const JAG_FREQUENCY: f32 = 0.3;

/// Outline of a rock segment with a jagged free edge.
///
/// `hanging` rocks (stalactites) hang from `y` and have the jagged edge at
/// the bottom; standing ones (stalagmites) rise from `y + height` with the
/// jagged edge on top. Returns nothing for empty segments.
pub fn rock_outline(x: f32, y: f32, width: f32, height: f32, hanging: bool) -> Vec<Vec2> {
    if height <= 0.0 || width <= 0.0 {
        return Vec::new();
    }

    let samples = (width / JAG_STEP).ceil() as usize;
    let mut points = Vec::with_capacity(samples + 4);

    let (base, shoulder, edge, end) = if hanging {
        (y, y + height - 15.0, y + height - 5.0, y + height - 10.0)
    } else {
        (y + height, y + 15.0, y + 5.0, y + 10.0)
    };

    points.push(Vec2::new(x, base));
    points.push(Vec2::new(x + width, base));
    points.push(Vec2::new(x + width, shoulder));
    for i in 0..samples {
        let offset = i as f32 * JAG_STEP;
        let jag = (offset * JAG_FREQUENCY).sin() * JAG_AMPLITUDE;
        points.push(Vec2::new(x + width - offset, edge + jag));
    }
    points.push(Vec2::new(x, end));
    points
}

/// Sample a quadratic Bezier curve (inclusive of both end points)
pub fn quadratic(from: Vec2, control: Vec2, to: Vec2, segments: usize) -> Vec<Vec2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let u = 1.0 - t;
            from * (u * u) + control * (2.0 * u * t) + to * (t * t)
        })
        .collect()
}

/// Wing membrane relative to the bat centre. `side` is -1 (left) or +1 (right).
///
/// `spread` pushes the tip outward; `lift` in 0..=1 raises it.
pub fn wing(size: Vec2, side: f32, spread: f32, lift: f32) -> Vec<Vec2> {
    let (w, h) = (size.x, size.y);
    let root = Vec2::new(side * w / 4.0, 0.0);
    let tip = Vec2::new(side * (w / 3.0 + spread), h / 4.0 + lift * 3.0);
    let upper = Vec2::new(side * (w / 2.0 + spread), -h / 3.0 - lift * 5.0);
    let lower = Vec2::new(side * w / 4.0, h / 3.0);
    let inner = Vec2::new(side * w / 6.0, 0.0);

    let mut points = quadratic(root, upper, tip, 6);
    points.extend(quadratic(tip, lower, inner, 4).into_iter().skip(1));
    points
}

/// Pointed ear relative to the bat centre
pub fn ear(size: Vec2, side: f32) -> [Vec2; 3] {
    [
        Vec2::new(side * size.x / 6.0, -size.y / 3.0),
        Vec2::new(side * size.x / 4.0, -size.y / 2.0),
        Vec2::new(side * size.x / 8.0, -size.y / 2.5),
    ]
}

/// Small bat silhouette for the background, centred on the origin
pub fn bat_silhouette(span: f32) -> Vec<Vec2> {
    let s = span;
    let mut points = quadratic(
        Vec2::new(-s / 4.0, 0.0),
        Vec2::new(-s / 2.0, -s / 3.0),
        Vec2::new(-s / 3.0, s / 4.0),
        4,
    );
    let left_tip = Vec2::new(-s / 3.0, s / 4.0);
    let right_tip = Vec2::new(s / 3.0, s / 4.0);
    let segments = [
        (left_tip, Vec2::new(-s / 6.0, s / 3.0), Vec2::ZERO, 3),
        (Vec2::ZERO, Vec2::new(s / 6.0, s / 3.0), right_tip, 3),
        (right_tip, Vec2::new(s / 2.0, -s / 3.0), Vec2::new(s / 4.0, 0.0), 4),
    ];
    for (from, ctrl, to, n) in segments {
        points.extend(quadratic(from, ctrl, to, n).into_iter().skip(1));
    }
    points
}

/// Triangle pointing down (`down`) or up, centred on `center`
pub fn arrow(center: Vec2, size: f32, down: bool) -> [Vec2; 3] {
    let tip = if down { -size } else { size };
    [
        center + Vec2::new(0.0, tip),
        center + Vec2::new(size, 0.0),
        center + Vec2::new(-size, 0.0),
    ]
}

/// Ceiling or floor spike: `base_y` is where it attaches, `length` is signed
pub fn spike(x: f32, base_y: f32, half_width: f32, length: f32) -> [Vec2; 3] {
    [
        Vec2::new(x, base_y + length),
        Vec2::new(x - half_width, base_y),
        Vec2::new(x + half_width, base_y),
    ]
}

/// Shield badge icon, centred on the origin
pub fn shield_icon() -> [Vec2; 6] {
    [
        Vec2::new(0.0, -8.0),
        Vec2::new(-6.0, -4.0),
        Vec2::new(-6.0, 4.0),
        Vec2::new(0.0, 8.0),
        Vec2::new(6.0, 4.0),
        Vec2::new(6.0, -4.0),
    ]
}

/// Heart icon, centred on the origin
pub fn heart_icon() -> [Vec2; 6] {
    [
        Vec2::new(0.0, 2.0),
        Vec2::new(-3.0, -2.0),
        Vec2::new(-1.0, -4.0),
        Vec2::new(0.0, -3.0),
        Vec2::new(1.0, -4.0),
        Vec2::new(3.0, -2.0),
    ]
}

/// Evenly spaced points on a circle (used for ring bursts)
pub fn ring_points(center: Vec2, radius: f32, count: usize) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            center + Vec2::from_angle(angle) * radius
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hanging_rock_stays_in_its_box() {
        let points = rock_outline(100.0, 0.0, 60.0, 200.0, true);
        // 3 corners + 8 jag samples + closing point
        assert_eq!(points.len(), 12);
        for p in &points {
            assert!(p.x >= 100.0 && p.x <= 160.0);
            assert!(p.y >= 0.0 && p.y <= 200.0 + JAG_AMPLITUDE);
        }
        assert_eq!(points[0], Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_standing_rock_grows_up_from_its_base() {
        let points = rock_outline(0.0, 500.0, 60.0, 100.0, false);
        assert_eq!(points[0], Vec2::new(0.0, 600.0));
        assert!(points.iter().all(|p| p.y >= 500.0 - JAG_AMPLITUDE));
    }

    #[test]
    fn test_empty_rock() {
        assert!(rock_outline(0.0, 0.0, 60.0, 0.0, true).is_empty());
        assert!(rock_outline(0.0, 0.0, 60.0, -5.0, false).is_empty());
    }

    #[test]
    fn test_quadratic_end_points() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(10.0, 0.0);
        let points = quadratic(from, Vec2::new(5.0, 10.0), to, 4);
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], from);
        assert_eq!(points[4], to);
        assert!((points[2].y - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_wings_mirror() {
        let size = Vec2::new(30.0, 25.0);
        let left = wing(size, -1.0, 4.0, 0.5);
        let right = wing(size, 1.0, 4.0, 0.5);
        assert_eq!(left.len(), right.len());
        for (l, r) in left.iter().zip(&right) {
            assert!((l.x + r.x).abs() < 1e-5);
            assert!((l.y - r.y).abs() < 1e-5);
        }
    }

    #[test]
    fn test_arrow_direction() {
        let down = arrow(Vec2::new(0.0, 100.0), 5.0, true);
        assert_eq!(down[0].y, 95.0);
        let up = arrow(Vec2::new(0.0, 100.0), 5.0, false);
        assert_eq!(up[0].y, 105.0);
    }

    #[test]
    fn test_ring_points() {
        let points = ring_points(Vec2::ZERO, 30.0, 8);
        assert_eq!(points.len(), 8);
        assert!(points.iter().all(|p| (p.length() - 30.0).abs() < 1e-3));
    }
}
