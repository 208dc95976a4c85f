use egui::{Color32, Pos2, Rect, Vec2};
use image::RgbaImage;

/// Edge softness in pixels used when a caller does not need a specific
/// feather (roughly one hardware pixel of anti-aliasing).
pub const DEFAULT_FEATHER: f32 = 0.75;

/// Cap/join treatment for thick polylines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapStyle {
    /// Round caps and joins (the brush footprint is a disc).
    Round,
    /// Square caps extending half a width past the endpoints, flat joins.
    Square,
}

/// Paint a thick polyline. Coverage is computed per pixel as the minimum
/// distance to any segment, so overlapping segments of one stroke never
/// double-blend — required for translucent textures.
pub fn paint_polyline(
    img: &mut RgbaImage,
    points: &[Pos2],
    width: f32,
    color: Color32,
    alpha: f32,
    feather: f32,
    cap: CapStyle,
) {
    stamp_polyline(img, points, width, feather, |img, x, y, coverage| {
        blend_pixel(img, x, y, color, alpha * coverage);
    }, cap);
}

/// Destination-out pass: wherever the brush footprint covers the frame, the
/// content accumulated so far becomes transparent.
pub fn erase_polyline(img: &mut RgbaImage, points: &[Pos2], width: f32, feather: f32) {
    stamp_polyline(img, points, width, feather, |img, x, y, coverage| {
        erase_pixel(img, x, y, coverage);
    }, CapStyle::Round);
}

fn stamp_polyline(
    img: &mut RgbaImage,
    points: &[Pos2],
    width: f32,
    feather: f32,
    mut stamp: impl FnMut(&mut RgbaImage, u32, u32, f32),
    cap: CapStyle,
) {
    if points.is_empty() {
        return;
    }

    let half = width / 2.0;
    let feather = feather.max(0.25);
    let bounds = bounds_of(points).expand(half + feather + 1.0);

    for_each_pixel(img, bounds, |img, x, y| {
        let p = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
        let d = polyline_distance(points, p, cap);
        let coverage = ((half + feather - d) / feather).clamp(0.0, 1.0);
        if coverage > 0.0 {
            stamp(img, x, y, coverage);
        }
    });
}

/// Fill a disc (used for spray dots and round single-point strokes).
pub fn fill_circle(img: &mut RgbaImage, center: Pos2, radius: f32, color: Color32, alpha: f32) {
    let feather = DEFAULT_FEATHER;
    let bounds = Rect::from_center_size(center, Vec2::splat((radius + feather + 1.0) * 2.0));
    for_each_pixel(img, bounds, |img, x, y| {
        let p = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
        let coverage = ((radius + feather - center.distance(p)) / feather).clamp(0.0, 1.0);
        if coverage > 0.0 {
            blend_pixel(img, x, y, color, alpha * coverage);
        }
    });
}

/// Outline a circle with the given stroke width.
pub fn stroke_circle(
    img: &mut RgbaImage,
    center: Pos2,
    radius: f32,
    width: f32,
    color: Color32,
    alpha: f32,
) {
    let half = width / 2.0;
    let feather = DEFAULT_FEATHER;
    let extent = radius + half + feather + 1.0;
    let bounds = Rect::from_center_size(center, Vec2::splat(extent * 2.0));
    for_each_pixel(img, bounds, |img, x, y| {
        let p = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
        let d = (center.distance(p) - radius).abs();
        let coverage = ((half + feather - d) / feather).clamp(0.0, 1.0);
        if coverage > 0.0 {
            blend_pixel(img, x, y, color, alpha * coverage);
        }
    });
}

/// Outline a (possibly rotated) quadrilateral with flat joins.
pub fn stroke_quad(
    img: &mut RgbaImage,
    corners: &[Pos2; 4],
    width: f32,
    color: Color32,
    alpha: f32,
) {
    let loop_points = [corners[0], corners[1], corners[2], corners[3], corners[0]];
    paint_polyline(
        img,
        &loop_points,
        width,
        color,
        alpha,
        DEFAULT_FEATHER,
        CapStyle::Square,
    );
}

/// Fill a convex quadrilateral given in winding order.
pub fn fill_quad(img: &mut RgbaImage, corners: &[Pos2; 4], color: Color32, alpha: f32) {
    let bounds = bounds_of(corners).expand(1.0);
    for_each_pixel(img, bounds, |img, x, y| {
        let p = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
        if point_in_convex_quad(p, corners) {
            blend_pixel(img, x, y, color, alpha);
        }
    });
}

/// Paint a single square dot of the given side length (pencil grain).
pub fn fill_square(img: &mut RgbaImage, min: Pos2, side: f32, color: Color32, alpha: f32) {
    let bounds = Rect::from_min_size(min, Vec2::splat(side));
    for_each_pixel(img, bounds, |img, x, y| {
        blend_pixel(img, x, y, color, alpha);
    });
}

/// Blit a source raster onto the frame, scaled to `size` and rotated about
/// the destination center. Samples bilinearly through the inverse map.
pub fn blit_rotated(
    img: &mut RgbaImage,
    src: &RgbaImage,
    center: Pos2,
    size: Vec2,
    rotation: f32,
) {
    if size.x <= 0.0 || size.y <= 0.0 || src.width() == 0 || src.height() == 0 {
        return;
    }

    let half = size / 2.0;
    let (sin, cos) = rotation.sin_cos();
    let corners = [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(-half.x, half.y),
    ]
    .map(|v| center + Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos));
    let bounds = bounds_of(&corners).expand(1.0);

    for_each_pixel(img, bounds, |img, x, y| {
        let p = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
        // Inverse-rotate into the unrotated destination frame.
        let v = p - center;
        let local = Vec2::new(v.x * cos + v.y * sin, -v.x * sin + v.y * cos);
        let u = (local.x + half.x) / size.x * src.width() as f32;
        let w = (local.y + half.y) / size.y * src.height() as f32;
        if u < 0.0 || w < 0.0 || u >= src.width() as f32 || w >= src.height() as f32 {
            return;
        }
        let (color, sample_alpha) = sample_bilinear(src, u, w);
        blend_pixel(img, x, y, color, sample_alpha);
    });
}

/// Source-over blend of an unmultiplied color at the given extra alpha.
pub fn blend_pixel(img: &mut RgbaImage, x: u32, y: u32, color: Color32, alpha: f32) {
    let src_a = alpha.clamp(0.0, 1.0) * color.a() as f32 / 255.0;
    if src_a <= 0.0 {
        return;
    }
    let px = img.get_pixel_mut(x, y);
    let dst_a = px[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        *px = image::Rgba([0, 0, 0, 0]);
        return;
    }
    let src = [color.r() as f32, color.g() as f32, color.b() as f32];
    for c in 0..3 {
        let blended = (src[c] * src_a + px[c] as f32 * dst_a * (1.0 - src_a)) / out_a;
        px[c] = blended.round().clamp(0.0, 255.0) as u8;
    }
    px[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Destination-out blend: reduce the pixel's alpha by the coverage.
pub fn erase_pixel(img: &mut RgbaImage, x: u32, y: u32, coverage: f32) {
    let coverage = coverage.clamp(0.0, 1.0);
    if coverage <= 0.0 {
        return;
    }
    let px = img.get_pixel_mut(x, y);
    px[3] = (px[3] as f32 * (1.0 - coverage)).round() as u8;
}

fn polyline_distance(points: &[Pos2], p: Pos2, cap: CapStyle) -> f32 {
    if points.len() == 1 {
        return match cap {
            CapStyle::Round => points[0].distance(p),
            CapStyle::Square => {
                let v = p - points[0];
                v.x.abs().max(v.y.abs())
            }
        };
    }

    let mut best = f32::INFINITY;
    for window in points.windows(2) {
        let d = match cap {
            CapStyle::Round => distance_to_segment(p, window[0], window[1]),
            CapStyle::Square => box_distance_to_segment(p, window[0], window[1]),
        };
        best = best.min(d);
    }
    best
}

/// Distance from a point to a line segment.
fn distance_to_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let line_len = line_vec.length();
    if line_len == 0.0 {
        return point_vec.length();
    }

    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / line_len).clamp(0.0, line_len);
    let projection = line_start + (line_vec * t / line_len);
    (point - projection).length()
}

/// Distance in the segment's oriented-box metric. `d <= half_width` covers a
/// rectangle with square caps extending `half_width` past the endpoints.
fn box_distance_to_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let line_len = line_vec.length();
    if line_len == 0.0 {
        let v = point - line_start;
        return v.x.abs().max(v.y.abs());
    }

    let dir = line_vec / line_len;
    let point_vec = point - line_start;
    let along = point_vec.x * dir.x + point_vec.y * dir.y;
    let perp = (point_vec.x * dir.y - point_vec.y * dir.x).abs();
    let overshoot = (-along).max(along - line_len).max(0.0);
    perp.max(overshoot)
}

fn point_in_convex_quad(p: Pos2, corners: &[Pos2; 4]) -> bool {
    let mut sign = 0.0f32;
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
        if cross.abs() < f32::EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

fn sample_bilinear(src: &RgbaImage, u: f32, v: f32) -> (Color32, f32) {
    let x0 = (u - 0.5).floor().max(0.0) as u32;
    let y0 = (v - 0.5).floor().max(0.0) as u32;
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let fx = (u - 0.5 - x0 as f32).clamp(0.0, 1.0);
    let fy = (v - 0.5 - y0 as f32).clamp(0.0, 1.0);

    let mut acc = [0.0f32; 4];
    for (px, weight) in [
        (src.get_pixel(x0, y0), (1.0 - fx) * (1.0 - fy)),
        (src.get_pixel(x1, y0), fx * (1.0 - fy)),
        (src.get_pixel(x0, y1), (1.0 - fx) * fy),
        (src.get_pixel(x1, y1), fx * fy),
    ] {
        for c in 0..4 {
            acc[c] += px[c] as f32 * weight;
        }
    }

    let color = Color32::from_rgb(acc[0] as u8, acc[1] as u8, acc[2] as u8);
    (color, acc[3] / 255.0)
}

fn bounds_of(points: &[Pos2]) -> Rect {
    let mut min = Pos2::new(f32::INFINITY, f32::INFINITY);
    let mut max = Pos2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
    for point in points {
        min.x = min.x.min(point.x);
        min.y = min.y.min(point.y);
        max.x = max.x.max(point.x);
        max.y = max.y.max(point.y);
    }
    Rect::from_min_max(min, max)
}

fn for_each_pixel(img: &mut RgbaImage, bounds: Rect, mut f: impl FnMut(&mut RgbaImage, u32, u32)) {
    let x0 = bounds.min.x.floor().max(0.0) as u32;
    let y0 = bounds.min.y.floor().max(0.0) as u32;
    let x1 = (bounds.max.x.ceil().max(0.0) as u32).min(img.width());
    let y1 = (bounds.max.y.ceil().max(0.0) as u32).min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            f(img, x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(img: &RgbaImage, x: u32, y: u32) -> u8 {
        img.get_pixel(x, y)[3]
    }

    #[test]
    fn round_segment_covers_its_center() {
        let mut img = RgbaImage::new(20, 20);
        paint_polyline(
            &mut img,
            &[Pos2::new(4.0, 10.0), Pos2::new(16.0, 10.0)],
            4.0,
            Color32::BLACK,
            1.0,
            DEFAULT_FEATHER,
            CapStyle::Round,
        );
        assert_eq!(alpha_at(&img, 10, 10), 255);
        assert_eq!(alpha_at(&img, 10, 2), 0);
    }

    #[test]
    fn square_cap_extends_past_endpoint() {
        let mut img = RgbaImage::new(30, 20);
        paint_polyline(
            &mut img,
            &[Pos2::new(10.0, 10.0), Pos2::new(20.0, 10.0)],
            6.0,
            Color32::BLACK,
            1.0,
            DEFAULT_FEATHER,
            CapStyle::Square,
        );
        // Square caps reach width/2 beyond the endpoint at full thickness.
        assert!(alpha_at(&img, 23, 13) > 0);
        // Round caps would not reach this diagonal corner.
        let mut round = RgbaImage::new(30, 20);
        paint_polyline(
            &mut round,
            &[Pos2::new(10.0, 10.0), Pos2::new(20.0, 10.0)],
            6.0,
            Color32::BLACK,
            1.0,
            DEFAULT_FEATHER,
            CapStyle::Round,
        );
        assert_eq!(alpha_at(&round, 23, 13), 0);
    }

    #[test]
    fn erase_clears_painted_content() {
        let mut img = RgbaImage::from_pixel(16, 16, image::Rgba([200, 50, 50, 255]));
        erase_polyline(
            &mut img,
            &[Pos2::new(2.0, 8.0), Pos2::new(14.0, 8.0)],
            6.0,
            DEFAULT_FEATHER,
        );
        assert_eq!(alpha_at(&img, 8, 8), 0);
        assert_eq!(alpha_at(&img, 8, 1), 255);
    }

    #[test]
    fn translucent_stroke_does_not_double_blend_at_joints() {
        let mut img = RgbaImage::new(30, 30);
        // A sharp corner: the joint pixel is covered by both segments.
        paint_polyline(
            &mut img,
            &[
                Pos2::new(5.0, 15.0),
                Pos2::new(15.0, 15.0),
                Pos2::new(15.0, 5.0),
            ],
            6.0,
            Color32::BLACK,
            0.5,
            DEFAULT_FEATHER,
            CapStyle::Round,
        );
        let joint = alpha_at(&img, 15, 15);
        let mid = alpha_at(&img, 10, 15);
        assert_eq!(joint, mid);
    }

    #[test]
    fn blit_preserves_source_placement() {
        let mut img = RgbaImage::new(20, 20);
        let src = RgbaImage::from_pixel(4, 4, image::Rgba([0, 255, 0, 255]));
        blit_rotated(&mut img, &src, Pos2::new(10.0, 10.0), Vec2::new(8.0, 8.0), 0.0);
        assert!(alpha_at(&img, 10, 10) > 0);
        assert_eq!(alpha_at(&img, 2, 2), 0);
    }
}
