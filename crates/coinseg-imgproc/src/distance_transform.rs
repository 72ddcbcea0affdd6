use coinseg_image::{Image, ImageError};

// Chamfer weights are accumulated in fixed point with 16 fractional bits.
const DIST_SHIFT: u32 = 16;
const DIST_SCALE: f32 = 1.0 / (1u32 << DIST_SHIFT) as f32;
const DIST_INF: u32 = u32::MAX >> 2;

// Squared distance used for foreground samples in the exact transform.
const EDT_INF: f64 = 1e20;

/// The metric approximation used by [`distance_transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceMask {
    /// 3x3 chamfer approximation of the Euclidean distance (weights 0.955, 1.3693).
    Chamfer3,
    /// 5x5 chamfer approximation of the Euclidean distance (weights 1, 1.4, 2.1969).
    #[default]
    Chamfer5,
    /// Exact Euclidean distance.
    Precise,
}

struct ChamferWeights {
    // (dx, dy, weight) for the forward raster pass, the backward pass mirrors them
    forward: Vec<(isize, isize, u32)>,
}

impl ChamferWeights {
    fn new(mask: DistanceMask) -> Self {
        let fixed = |w: f64| (w * (1u32 << DIST_SHIFT) as f64).round() as u32;
        let forward = match mask {
            DistanceMask::Chamfer3 => {
                let (a, b) = (fixed(0.955), fixed(1.3693));
                vec![(-1, -1, b), (0, -1, a), (1, -1, b), (-1, 0, a)]
            }
            _ => {
                let (a, b, c) = (fixed(1.0), fixed(1.4), fixed(2.1969));
                vec![
                    (-1, -2, c),
                    (1, -2, c),
                    (-2, -1, c),
                    (-1, -1, b),
                    (0, -1, a),
                    (1, -1, b),
                    (2, -1, c),
                    (-1, 0, a),
                ]
            }
        };
        Self { forward }
    }
}

/// Compute the distance of every non-zero pixel to the nearest zero pixel.
///
/// Zero pixels map to 0. Pixels outside of the image are not treated as
/// background; an image without any zero pixel yields very large distances.
///
/// # Arguments
///
/// * `src` - The input mask, non-zero pixels are foreground.
/// * `dst` - The output distance map.
/// * `mask` - The metric approximation to use.
///
/// # Example
///
/// ```
/// use coinseg_image::{Image, ImageSize};
/// use coinseg_imgproc::distance_transform::{distance_transform, DistanceMask};
///
/// let src = Image::<u8, 1>::new(ImageSize { width: 5, height: 1 }, vec![0, 255, 255, 255, 0]).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
///
/// distance_transform(&src, &mut dst, DistanceMask::Chamfer5).unwrap();
/// assert_eq!(dst.as_slice(), &[0.0, 1.0, 2.0, 1.0, 0.0]);
/// ```
pub fn distance_transform(
    src: &Image<u8, 1>,
    dst: &mut Image<f32, 1>,
    mask: DistanceMask,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if !src.as_slice().is_empty() && !src.as_slice().contains(&0) {
        log::warn!("distance transform input of {} has no background pixel", src.size());
    }

    match mask {
        DistanceMask::Precise => DistanceTransformExecutor::new().execute(src, dst),
        _ => {
            chamfer_distance(src, dst, &ChamferWeights::new(mask));
            Ok(())
        }
    }
}

fn chamfer_distance(src: &Image<u8, 1>, dst: &mut Image<f32, 1>, weights: &ChamferWeights) {
    const PAD: usize = 2;
    let (width, height) = (src.width(), src.height());
    let stride = width + 2 * PAD;
    let mut dist = vec![DIST_INF; stride * (height + 2 * PAD)];
    let at = |x: usize, y: usize| (y + PAD) * stride + x + PAD;
    let offset = |dx: isize, dy: isize| dy * stride as isize + dx;

    let forward = weights
        .forward
        .iter()
        .map(|&(dx, dy, w)| (offset(dx, dy), w))
        .collect::<Vec<_>>();
    let backward = weights
        .forward
        .iter()
        .map(|&(dx, dy, w)| (offset(-dx, -dy), w))
        .collect::<Vec<_>>();

    let src_slice = src.as_slice();

    // forward pass
    for y in 0..height {
        for x in 0..width {
            let idx = at(x, y);
            if src_slice[y * width + x] == 0 {
                dist[idx] = 0;
                continue;
            }
            let mut d = DIST_INF;
            for &(off, w) in &forward {
                let n = dist[(idx as isize + off) as usize];
                d = d.min(n.saturating_add(w));
            }
            dist[idx] = d;
        }
    }

    // backward pass
    for y in (0..height).rev() {
        for x in (0..width).rev() {
            let idx = at(x, y);
            let mut d = dist[idx];
            if d == 0 {
                continue;
            }
            for &(off, w) in &backward {
                let n = dist[(idx as isize + off) as usize];
                d = d.min(n.saturating_add(w));
            }
            dist[idx] = d;
        }
    }

    let dst_slice = dst.as_slice_mut();
    for y in 0..height {
        for x in 0..width {
            dst_slice[y * width + x] = dist[at(x, y)] as f32 * DIST_SCALE;
        }
    }
}

/// Exact Euclidean distance transform with reusable scratch buffers.
///
/// Implements the separable lower envelope algorithm of Felzenszwalb and
/// Huttenlocher. Keeping the executor around avoids reallocating the
/// buffers when transforming many images of the same size.
#[derive(Debug, Default)]
pub struct DistanceTransformExecutor {
    squared: Vec<f64>,
    line: Vec<f64>,
    envelope: Vec<f64>,
    parabolas: Vec<usize>,
    boundaries: Vec<f64>,
}

impl DistanceTransformExecutor {
    /// Create an executor with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the exact distance of every non-zero pixel to the nearest zero pixel.
    pub fn execute(
        &mut self,
        src: &Image<u8, 1>,
        dst: &mut Image<f32, 1>,
    ) -> Result<(), ImageError> {
        if src.size() != dst.size() {
            return Err(ImageError::InvalidImageSize(
                src.cols(),
                src.rows(),
                dst.cols(),
                dst.rows(),
            ));
        }

        let (width, height) = (src.width(), src.height());
        let longest = width.max(height);
        self.squared.clear();
        self.squared.extend(
            src.as_slice()
                .iter()
                .map(|&v| if v == 0 { 0.0 } else { EDT_INF }),
        );
        self.line.resize(longest, 0.0);
        self.envelope.resize(longest, 0.0);
        self.parabolas.resize(longest, 0);
        self.boundaries.resize(longest + 1, 0.0);

        // columns
        for x in 0..width {
            for y in 0..height {
                self.line[y] = self.squared[y * width + x];
            }
            self.transform_line(height);
            for y in 0..height {
                self.squared[y * width + x] = self.envelope[y];
            }
        }

        // rows
        for y in 0..height {
            self.line[..width].copy_from_slice(&self.squared[y * width..(y + 1) * width]);
            self.transform_line(width);
            self.squared[y * width..(y + 1) * width].copy_from_slice(&self.envelope[..width]);
        }

        dst.as_slice_mut()
            .iter_mut()
            .zip(self.squared.iter())
            .for_each(|(d, &s)| *d = s.sqrt() as f32);

        Ok(())
    }

    // 1D squared distance transform of `self.line[..n]` into `self.envelope[..n]`
    fn transform_line(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let f = &self.line;
        let v = &mut self.parabolas;
        let z = &mut self.boundaries;

        let mut k = 0usize;
        v[0] = 0;
        z[0] = f64::NEG_INFINITY;
        z[1] = f64::INFINITY;

        for q in 1..n {
            let fq = f[q] + (q * q) as f64;
            let mut s;
            loop {
                let p = v[k];
                s = (fq - (f[p] + (p * p) as f64)) / (2.0 * (q - p) as f64);
                if k > 0 && s <= z[k] {
                    k -= 1;
                } else {
                    break;
                }
            }
            k += 1;
            v[k] = q;
            z[k] = s;
            z[k + 1] = f64::INFINITY;
        }

        k = 0;
        for q in 0..n {
            while z[k + 1] < q as f64 {
                k += 1;
            }
            let p = v[k];
            let dq = q as f64 - p as f64;
            self.envelope[q] = dq * dq + f[p];
        }
    }
}

/// Find the minimum and maximum value of a single channel image.
///
/// Returns `(0.0, 0.0)` for an empty image.
pub fn min_max(src: &Image<f32, 1>) -> (f32, f32) {
    let mut iter = src.as_slice().iter().copied();
    let Some(first) = iter.next() else {
        return (0.0, 0.0);
    };
    iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)))
}
