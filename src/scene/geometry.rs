use egui::{Pos2, Rect, Vec2};

/// Area enclosed by an implicitly closed polygon (shoelace formula).
pub fn polygon_area(points: &[Pos2]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    signed_area(points).abs()
}

fn signed_area(points: &[Pos2]) -> f32 {
    let mut sum = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Perimeter of an implicitly closed polygon.
pub fn polygon_perimeter(points: &[Pos2]) -> f32 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .enumerate()
        .map(|(i, a)| a.distance(points[(i + 1) % points.len()]))
        .sum()
}

/// Area centroid of a polygon. Falls back to the vertex average for
/// polygons with no area (collinear points).
pub fn polygon_centroid(points: &[Pos2]) -> Option<Pos2> {
    if points.is_empty() {
        return None;
    }

    let area = signed_area(points);
    if area.abs() < f32::EPSILON {
        let sum = points.iter().fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
        return Some((sum / points.len() as f32).to_pos2());
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        let cross = a.x * b.y - b.x * a.y;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    Some(Pos2::new(cx / (6.0 * area), cy / (6.0 * area)))
}

/// Even-odd point in polygon test.
pub fn point_in_polygon(point: Pos2, polygon: &[Pos2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Distance from a point to a line segment
pub fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    point.distance(closest_point_on_segment(point, start, end).0)
}

/// Closest point on a segment and its normalized parameter along it (0 at `start`).
pub fn closest_point_on_segment(point: Pos2, start: Pos2, end: Pos2) -> (Pos2, f32) {
    let line = end - start;
    let len_sq = line.length_sq();
    if len_sq == 0.0 {
        return (start, 0.0);
    }
    let t = ((point - start).dot(line) / len_sq).clamp(0.0, 1.0);
    (start + line * t, t)
}

/// Rotate `point` about `center` by `angle` radians.
pub fn rotate_about(point: Pos2, center: Pos2, angle: f32) -> Pos2 {
    let (sin, cos) = angle.sin_cos();
    let d = point - center;
    center + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Corners of a `size` rectangle centered on `center` and rotated by
/// `angle`, in top-left, top-right, bottom-right, bottom-left order.
pub fn rotated_rect_corners(center: Pos2, size: Vec2, angle: f32) -> [Pos2; 4] {
    let half = size / 2.0;
    [
        Pos2::new(center.x - half.x, center.y - half.y),
        Pos2::new(center.x + half.x, center.y - half.y),
        Pos2::new(center.x + half.x, center.y + half.y),
        Pos2::new(center.x - half.x, center.y + half.y),
    ]
    .map(|corner| rotate_about(corner, center, angle))
}

/// Hit test against a rotated rectangle by moving the point into the
/// rectangle's local frame.
pub fn rotated_rect_contains(center: Pos2, size: Vec2, angle: f32, point: Pos2) -> bool {
    let local = rotate_about(point, center, -angle) - center;
    local.x.abs() <= size.x / 2.0 && local.y.abs() <= size.y / 2.0
}

/// Calculate the bounding box for a set of points
pub fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}
