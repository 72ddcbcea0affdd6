use coinseg_image::ImageError;

/// Shapes of morphological `Kernels`.
///
/// Defines the geometry of the kernel used in morphological operations.
/// All kernels are centered at their geometric center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelShape {
    /// A rectangular box structuring element.
    ///
    /// All pixels within the box are included in the morphological operation.
    Box {
        /// `size` - The side length of the square kernel (size x size).
        size: usize,
    },

    /// A cross (plus) shaped structuring element.
    ///
    /// Only pixels along the horizontal and vertical center lines are included.
    Cross {
        /// `size` - The side length of the square cross kernel (size x size).
        size: usize,
    },

    /// An ellipse (or circle) inscribed in a `width` x `height` box.
    Ellipse {
        /// * `width` - The width of the ellipse.
        width: usize,
        /// * `height` - The height of the ellipse.
        height: usize,
    },
}

/// A morphological structuring element.
///
/// The kernel stores a binary mask where 1 marks pixels included in the
/// neighborhood and 0 marks excluded pixels.
///
/// # Example
///
/// ```rust
/// use coinseg_imgproc::morphology::{Kernel, KernelShape};
///
/// // Create a 3x3 box kernel
/// let kernel = Kernel::new(KernelShape::Box { size: 3 }).unwrap();
/// assert_eq!(kernel.width(), 3);
/// assert_eq!(kernel.height(), 3);
/// assert_eq!(kernel.pad(), (1, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl Kernel {
    /// Create a morphological kernel from a shape.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidKernelSize`] when a side is zero or even.
    pub fn new(shape: KernelShape) -> Result<Self, ImageError> {
        let (width, height) = match shape {
            KernelShape::Box { size } | KernelShape::Cross { size } => (size, size),
            KernelShape::Ellipse { width, height } => (width, height),
        };

        if width == 0 || height == 0 || width % 2 == 0 || height % 2 == 0 {
            return Err(ImageError::InvalidKernelSize(width, height));
        }

        Ok(match shape {
            KernelShape::Box { size } => box_kernel(size),
            KernelShape::Cross { size } => cross_kernel(size),
            KernelShape::Ellipse { width, height } => ellipse_kernel(width, height),
        })
    }

    /// Get a reference to the kernel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the width of the kernel.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the height of the kernel.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the padding for the kernel (offset from center) as `(rows, cols)`.
    pub fn pad(&self) -> (usize, usize) {
        (self.height / 2, self.width / 2)
    }

    /// Offsets `(dx, dy)` of the active elements relative to the center.
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let (pad_h, pad_w) = self.pad();
        (0..self.height)
            .flat_map(|kh| (0..self.width).map(move |kw| (kh, kw)))
            .filter(|&(kh, kw)| self.data[kh * self.width + kw] == 1)
            .map(|(kh, kw)| (kw as isize - pad_w as isize, kh as isize - pad_h as isize))
            .collect()
    }
}

fn box_kernel(size: usize) -> Kernel {
    Kernel {
        data: vec![1u8; size * size],
        width: size,
        height: size,
    }
}

fn cross_kernel(size: usize) -> Kernel {
    let mut data = vec![0u8; size * size];
    let mid = size / 2;

    // fill horizontal line
    for j in 0..size {
        data[mid * size + j] = 1;
    }

    // fill vertical line
    for i in 0..size {
        data[i * size + mid] = 1;
    }

    Kernel {
        data,
        width: size,
        height: size,
    }
}

fn ellipse_kernel(width: usize, height: usize) -> Kernel {
    let mut data = vec![0u8; width * height];
    let r = (height / 2) as f64;
    let c = (width / 2) as f64;
    let inv_r2 = if r > 0.0 { 1.0 / (r * r) } else { 0.0 };

    for i in 0..height {
        let dy = i as f64 - r;
        // half width of the row inside the ellipse
        let dx = (c * ((r * r - dy * dy) * inv_r2).max(0.0).sqrt()).round();
        let j1 = (c - dx).max(0.0) as usize;
        let j2 = ((c + dx + 1.0) as usize).min(width);
        for j in j1..j2 {
            data[i * width + j] = 1;
        }
    }

    Kernel {
        data,
        width,
        height,
    }
}
