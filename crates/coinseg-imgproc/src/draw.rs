use coinseg_image::Image;

use crate::contours::Contour;

#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Draws a line on an image inplace using Bresenham's line algorithm.
///
/// Thick lines stamp a `thickness x thickness` square at every point of the
/// line, so a thickness of 2 widens the line towards the right and bottom.
/// Pixels outside of the image are clipped.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
/// * `thickness` - The thickness of the line.
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    let thickness = thickness.max(1) as i64;
    let lo = -(thickness - 1) / 2;
    let hi = thickness / 2;

    loop {
        for j in lo..=hi {
            for i in lo..=hi {
                set_pixel(img, x0 + i, y0 + j, color);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draws a sequence of connected segments on an image inplace.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `points` - The vertices of the polyline as `[x, y]`.
/// * `closed` - Whether to connect the last point back to the first one.
/// * `color` - The color of the lines.
/// * `thickness` - The thickness of the lines.
pub fn draw_polyline<const C: usize>(
    img: &mut Image<u8, C>,
    points: &[[i32; 2]],
    closed: bool,
    color: [u8; C],
    thickness: usize,
) {
    let to_point = |p: &[i32; 2]| (p[0] as i64, p[1] as i64);

    match points {
        [] => {}
        [p] => draw_line(img, to_point(p), to_point(p), color, thickness),
        _ => {
            for pair in points.windows(2) {
                draw_line(img, to_point(&pair[0]), to_point(&pair[1]), color, thickness);
            }
            if closed {
                if let (Some(last), Some(first)) = (points.last(), points.first()) {
                    draw_line(img, to_point(last), to_point(first), color, thickness);
                }
            }
        }
    }
}

/// Draws the outlines of contours on an image inplace.
///
/// Every contour is drawn as a closed polyline.
pub fn draw_contours<const C: usize>(
    img: &mut Image<u8, C>,
    contours: &[Contour],
    color: [u8; C],
    thickness: usize,
) {
    for contour in contours {
        draw_polyline(img, &contour.points, true, color, thickness);
    }
}

/// Draws a filled circle on an image inplace.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `center` - The center of the circle as a tuple of (x, y).
/// * `radius` - The radius of the circle in pixels.
/// * `color` - The fill color.
pub fn draw_filled_circle<const C: usize>(
    img: &mut Image<u8, C>,
    center: (i64, i64),
    radius: i64,
    color: [u8; C],
) {
    let (cx, cy) = center;
    let r2 = radius * radius;
    for y in (cy - radius)..=(cy + radius) {
        for x in (cx - radius)..=(cx + radius) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= r2 {
                set_pixel(img, x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contours::BorderType;
    use coinseg_image::{ImageError, ImageSize};

    #[rustfmt::skip]
    #[test]
    fn test_draw_line() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 5, height: 5 }, vec![0u8; 25],
        )?;
        draw_line(&mut img, (0, 0), (4, 4), [255], 1);
        assert_eq!(
            img.as_slice(),
            &[
                255,   0,   0,   0,   0,
                  0, 255,   0,   0,   0,
                  0,   0, 255,   0,   0,
                  0,   0,   0, 255,   0,
                  0,   0,   0,   0, 255,
            ]
        );
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn test_draw_line_thick() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 5, height: 4 }, vec![0u8; 20],
        )?;
        draw_line(&mut img, (0, 1), (3, 1), [9], 2);
        assert_eq!(
            img.as_slice(),
            &[
                0, 0, 0, 0, 0,
                9, 9, 9, 9, 9,
                9, 9, 9, 9, 9,
                0, 0, 0, 0, 0,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_draw_line_clipped() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val([3, 3].into(), 0)?;
        draw_line(&mut img, (-5, 1), (10, 1), [1], 1);
        assert_eq!(img.as_slice(), &[0, 0, 0, 1, 1, 1, 0, 0, 0]);
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn test_draw_polyline_closed() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 5, height: 5 }, vec![0u8; 25],
        )?;
        draw_polyline(&mut img, &[[1, 1], [3, 1], [3, 3], [1, 3]], true, [128], 1);
        assert_eq!(
            img.as_slice(),
            &[
                  0,   0,   0,   0,   0,
                  0, 128, 128, 128,   0,
                  0, 128,   0, 128,   0,
                  0, 128, 128, 128,   0,
                  0,   0,   0,   0,   0,
            ]
        );

        let mut open = Image::<u8, 1>::from_size_val(img.size(), 0)?;
        draw_polyline(&mut open, &[[1, 1], [3, 1], [3, 3], [1, 3]], false, [128], 1);
        assert_eq!(open.get_pixel(1, 2, 0)?, 0);

        Ok(())
    }

    #[test]
    fn test_draw_contours_rgb() -> Result<(), ImageError> {
        let mut img = Image::<u8, 3>::from_size_val([6, 6].into(), 0)?;
        let contour = Contour {
            points: vec![[1, 1], [4, 1], [4, 4], [1, 4]],
            border_type: BorderType::Outer,
            parent: None,
        };

        draw_contours(&mut img, &[contour], [0, 255, 0], 1);

        assert_eq!(img.get_pixel(1, 1, 1)?, 255);
        assert_eq!(img.get_pixel(1, 1, 0)?, 0);
        assert_eq!(img.get_pixel(4, 2, 1)?, 255);
        assert_eq!(img.get_pixel(2, 2, 1)?, 0);
        let green = img.as_slice().chunks_exact(3).filter(|p| *p == [0u8, 255, 0]).count();
        assert_eq!(green, 12);

        Ok(())
    }

    #[test]
    fn test_draw_filled_circle() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val([7, 7].into(), 0)?;
        draw_filled_circle(&mut img, (3, 3), 1, [255]);
        assert_eq!(img.as_slice().iter().filter(|&&v| v == 255).count(), 5);

        // clipped at the corner
        let mut img = Image::<u8, 1>::from_size_val([7, 7].into(), 0)?;
        draw_filled_circle(&mut img, (0, 0), 2, [255]);
        assert_eq!(img.get_pixel(0, 0, 0)?, 255);
        assert_eq!(img.get_pixel(2, 0, 0)?, 255);
        assert_eq!(img.get_pixel(2, 2, 0)?, 0);
        Ok(())
    }
}
