use coinseg_image::Image;

/// Which borders [`find_contours`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    /// Only the outer borders of top-level regions.
    External,
    /// Every border, outer and hole, with its parent link.
    List,
}

/// How the traced border pixels are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourApproximation {
    /// Keep every border pixel.
    None,
    /// Compress horizontal, vertical and diagonal runs to their end points.
    Simple,
}

/// Specification for Border Type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BorderType {
    /// Perimeter of foreground regions
    Outer,
    /// Perimeter of background regions enclosed by foreground.
    Hole,
}

/// The border of a region.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// The points on the border as `[x, y]`.
    pub points: Vec<[i32; 2]>,
    /// The type of the border. Outer or Hole.
    pub border_type: BorderType,
    /// Index of the enclosing border in the returned list, if any.
    pub parent: Option<usize>,
}

impl Contour {
    /// Area enclosed by the contour polygon.
    pub fn area(&self) -> f64 {
        contour_area(&self.points)
    }
}

// Neighbor offsets ordered counterclockwise on screen (y grows downwards),
// starting from east.
const DIRECTIONS: [(isize, isize); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

fn direction_index(dx: isize, dy: isize) -> usize {
    DIRECTIONS
        .iter()
        .position(|&d| d == (dx, dy))
        .unwrap_or(0)
}

// Zero padded label buffer used by the border following.
struct LabelMap {
    labels: Vec<i32>,
    stride: usize,
}

impl LabelMap {
    fn new(src: &Image<u8, 1>) -> Self {
        let (width, height) = (src.width(), src.height());
        let stride = width + 2;
        let mut labels = vec![0i32; stride * (height + 2)];
        for (y, row) in src.as_slice().chunks_exact(width.max(1)).enumerate() {
            for (x, &v) in row.iter().enumerate() {
                if v != 0 {
                    labels[(y + 1) * stride + x + 1] = 1;
                }
            }
        }
        Self { labels, stride }
    }

    fn neighbor(&self, idx: usize, dir: usize) -> usize {
        let (dx, dy) = DIRECTIONS[dir];
        (idx as isize + dy * self.stride as isize + dx) as usize
    }

    fn point(&self, idx: usize) -> [i32; 2] {
        [
            (idx % self.stride) as i32 - 1,
            (idx / self.stride) as i32 - 1,
        ]
    }

    // Follow the border starting at `start`, coming from the zero pixel `from`.
    fn trace(&mut self, start: usize, from: usize, nbd: i32) -> Vec<[i32; 2]> {
        let start_dir = self.relative_direction(start, from);

        // clockwise search for the first non-zero neighbor
        let first = (0..8)
            .map(|k| self.neighbor(start, (start_dir + 8 - k) % 8))
            .find(|&n| self.labels[n] != 0);

        let Some(first) = first else {
            // isolated pixel
            self.labels[start] = -nbd;
            return vec![self.point(start)];
        };

        let mut points = Vec::new();
        let mut prev = first;
        let mut curr = start;

        loop {
            let prev_dir = self.relative_direction(curr, prev);

            // counterclockwise search starting right after the previous pixel
            let mut east_is_zero = false;
            let mut next = prev;
            for k in 1..=8 {
                let dir = (prev_dir + k) % 8;
                let n = self.neighbor(curr, dir);
                if self.labels[n] != 0 {
                    next = n;
                    break;
                }
                if dir == 0 {
                    east_is_zero = true;
                }
            }

            if east_is_zero {
                self.labels[curr] = -nbd;
            } else if self.labels[curr] == 1 {
                self.labels[curr] = nbd;
            }
            points.push(self.point(curr));

            if next == start && curr == first {
                break;
            }
            prev = curr;
            curr = next;
        }

        points
    }

    fn relative_direction(&self, center: usize, other: usize) -> usize {
        let stride = self.stride as isize;
        let (cx, cy) = (center as isize % stride, center as isize / stride);
        let (ox, oy) = (other as isize % stride, other as isize / stride);
        direction_index(ox - cx, oy - cy)
    }
}

/// Find the contours of the foreground regions of a binary image.
///
/// Every non-zero pixel belongs to the foreground. Borders are found with the
/// border following algorithm of Suzuki and Abe on a zero padded copy of the
/// image, so regions touching the image edge are closed as well. Contours are
/// returned in discovery order, top-to-bottom then left-to-right.
///
/// # Arguments
///
/// * `src` - The binary input image.
/// * `mode` - Which borders to return.
/// * `approx` - How the border points are stored.
///
/// # Example
///
/// ```
/// use coinseg_image::{Image, ImageSize};
/// use coinseg_imgproc::contours::{find_contours, ContourApproximation, RetrievalMode};
///
/// #[rustfmt::skip]
/// let src = Image::<u8, 1>::new(
///     ImageSize { width: 5, height: 5 },
///     vec![
///         0, 0, 0, 0, 0,
///         0, 255, 255, 255, 0,
///         0, 255, 255, 255, 0,
///         0, 255, 255, 255, 0,
///         0, 0, 0, 0, 0,
///     ],
/// ).unwrap();
///
/// let contours = find_contours(&src, RetrievalMode::External, ContourApproximation::Simple);
/// assert_eq!(contours.len(), 1);
/// assert_eq!(contours[0].points.len(), 4);
/// assert_eq!(contours[0].area(), 4.0);
/// ```
pub fn find_contours(
    src: &Image<u8, 1>,
    mode: RetrievalMode,
    approx: ContourApproximation,
) -> Vec<Contour> {
    let (width, height) = (src.width(), src.height());
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut map = LabelMap::new(src);
    let stride = map.stride;
    let mut borders: Vec<Contour> = Vec::new();
    let mut nbd = 1i32; // new-border label

    for y in 1..=height {
        // the frame is the border with label 1
        let mut lnbd = 1i32;

        for x in 1..=width {
            let idx = y * stride + x;
            let value = map.labels[idx];
            if value == 0 {
                continue;
            }

            let start = if value == 1 && map.labels[idx - 1] == 0 {
                Some((BorderType::Outer, idx - 1))
            } else if value >= 1 && map.labels[idx + 1] == 0 {
                if value > 1 {
                    lnbd = value;
                }
                Some((BorderType::Hole, idx + 1))
            } else {
                None
            };

            if let Some((border_type, from)) = start {
                nbd += 1;

                let parent = if lnbd >= 2 {
                    let parent_index = (lnbd - 2) as usize;
                    let previous = &borders[parent_index];
                    if previous.border_type == border_type {
                        previous.parent
                    } else {
                        Some(parent_index)
                    }
                } else {
                    None
                };

                let mut points = map.trace(idx, from, nbd);
                if approx == ContourApproximation::Simple {
                    points = approx_chain_simple(&points);
                }

                borders.push(Contour {
                    points,
                    border_type,
                    parent,
                });
            }

            let value = map.labels[idx];
            if value != 1 {
                lnbd = value.abs();
            }
        }
    }

    match mode {
        RetrievalMode::List => borders,
        RetrievalMode::External => borders
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .collect(),
    }
}

/// Drop the points that continue a straight horizontal, vertical or diagonal run.
pub fn approx_chain_simple(points: &[[i32; 2]]) -> Vec<[i32; 2]> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let step = |a: [i32; 2], b: [i32; 2]| [b[0] - a[0], b[1] - a[1]];

    let simplified = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect::<Vec<_>>();

    if simplified.is_empty() {
        vec![points[0]]
    } else {
        simplified
    }
}

/// Compute the area enclosed by a closed polygon with the shoelace formula.
///
/// The result is always non-negative; polygons with fewer than three points
/// have zero area.
///
/// # Example
///
/// ```
/// use coinseg_imgproc::contours::contour_area;
///
/// let square = [[0, 0], [4, 0], [4, 4], [0, 4]];
/// assert_eq!(contour_area(&square), 16.0);
/// ```
pub fn contour_area(points: &[[i32; 2]]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let twice_area = (0..n)
        .map(|i| {
            let p = points[i];
            let q = points[(i + 1) % n];
            p[0] as f64 * q[1] as f64 - q[0] as f64 * p[1] as f64
        })
        .sum::<f64>();

    (twice_area * 0.5).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinseg_image::{ImageError, ImageSize};

    fn filled(
        width: usize,
        height: usize,
        rects: &[(usize, usize, usize, usize, u8)],
    ) -> Result<Image<u8, 1>, ImageError> {
        let mut img = Image::<u8, 1>::from_size_val(ImageSize { width, height }, 0)?;
        for &(x0, y0, x1, y1, v) in rects {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    img.set_pixel(x, y, 0, v)?;
                }
            }
        }
        Ok(img)
    }

    #[test]
    fn test_square_contour() -> Result<(), ImageError> {
        let img = filled(5, 5, &[(1, 1, 3, 3, 255)])?;

        let contours = find_contours(&img, RetrievalMode::External, ContourApproximation::None);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points.len(), 8);
        assert_eq!(contours[0].points[0], [1, 1]);
        assert_eq!(contours[0].border_type, BorderType::Outer);

        let simple = find_contours(&img, RetrievalMode::External, ContourApproximation::Simple);
        let mut corners = simple[0].points.clone();
        corners.sort();
        assert_eq!(corners, vec![[1, 1], [1, 3], [3, 1], [3, 3]]);
        assert_eq!(simple[0].area(), 4.0);
        assert_eq!(contours[0].area(), 4.0);

        Ok(())
    }

    #[test]
    fn test_single_pixel() -> Result<(), ImageError> {
        let img = filled(5, 5, &[(2, 2, 2, 2, 255)])?;

        let contours = find_contours(&img, RetrievalMode::External, ContourApproximation::Simple);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points, vec![[2, 2]]);
        assert_eq!(contours[0].area(), 0.0);

        Ok(())
    }

    #[test]
    fn test_region_touching_border() -> Result<(), ImageError> {
        let img = filled(4, 4, &[(0, 0, 3, 3, 1)])?;

        let contours = find_contours(&img, RetrievalMode::External, ContourApproximation::Simple);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].area(), 9.0);

        Ok(())
    }

    #[test]
    fn test_empty_image() -> Result<(), ImageError> {
        let img = Image::<u8, 1>::from_size_val([6, 4].into(), 0)?;
        assert!(find_contours(&img, RetrievalMode::List, ContourApproximation::None).is_empty());

        let img = Image::<u8, 1>::new([0, 0].into(), vec![])?;
        assert!(find_contours(&img, RetrievalMode::List, ContourApproximation::None).is_empty());

        Ok(())
    }

    #[test]
    fn test_ring_hierarchy() -> Result<(), ImageError> {
        let img = filled(10, 10, &[(2, 2, 7, 7, 255), (4, 4, 5, 5, 0)])?;

        let all = find_contours(&img, RetrievalMode::List, ContourApproximation::None);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].border_type, BorderType::Outer);
        assert_eq!(all[0].parent, None);
        assert_eq!(all[1].border_type, BorderType::Hole);
        assert_eq!(all[1].parent, Some(0));
        assert!(all[1].points.contains(&[3, 4]));
        assert!(all[1].points.contains(&[6, 4]));

        let external = find_contours(&img, RetrievalMode::External, ContourApproximation::None);
        assert_eq!(external.len(), 1);
        assert_eq!(external[0].area(), 25.0);

        Ok(())
    }

    #[test]
    fn test_nested_regions() -> Result<(), ImageError> {
        let img = filled(
            20,
            20,
            &[(2, 2, 17, 17, 255), (5, 5, 14, 14, 0), (8, 8, 11, 11, 255)],
        )?;

        let all = find_contours(&img, RetrievalMode::List, ContourApproximation::Simple);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].border_type, BorderType::Outer);
        assert_eq!(all[1].border_type, BorderType::Hole);
        assert_eq!(all[1].parent, Some(0));
        assert_eq!(all[2].border_type, BorderType::Outer);
        assert_eq!(all[2].parent, Some(1));

        // the island inside the hole is not an external contour
        let external = find_contours(&img, RetrievalMode::External, ContourApproximation::Simple);
        assert_eq!(external.len(), 1);
        assert_eq!(external[0].area(), 225.0);

        Ok(())
    }

    #[test]
    fn test_discovery_order() -> Result<(), ImageError> {
        let img = filled(
            12,
            12,
            &[(7, 1, 9, 3, 255), (1, 2, 2, 3, 255), (4, 8, 8, 10, 255)],
        )?;

        let contours = find_contours(&img, RetrievalMode::External, ContourApproximation::Simple);
        let areas = contours.iter().map(Contour::area).collect::<Vec<_>>();
        assert_eq!(areas, vec![4.0, 1.0, 8.0]);

        Ok(())
    }

    #[test]
    fn test_approx_chain_simple() {
        let points = [[0, 0], [1, 0], [2, 0], [2, 1], [2, 2], [1, 1]];
        assert_eq!(
            approx_chain_simple(&points),
            vec![[0, 0], [2, 0], [2, 2]]
        );
        assert_eq!(approx_chain_simple(&[[3, 3]]), vec![[3, 3]]);
    }

    #[test]
    fn test_contour_area() {
        assert_eq!(contour_area(&[]), 0.0);
        assert_eq!(contour_area(&[[0, 0], [5, 5]]), 0.0);
        // clockwise and counterclockwise give the same area
        assert_eq!(contour_area(&[[0, 0], [3, 0], [0, 2]]), 3.0);
        assert_eq!(contour_area(&[[0, 0], [0, 2], [3, 0]]), 3.0);
    }
}
