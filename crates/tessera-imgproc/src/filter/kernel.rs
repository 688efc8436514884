use tessera_image::{ElementType, ImageSize, Pixel};

use crate::error::FilterError;

/// Per-axis output downsampling factor.
///
/// Output pixel `(i, j)` is computed from the window anchored at input pixel
/// `(i * y, j * x)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Stride {
    /// Vertical step in input rows.
    pub y: usize,
    /// Horizontal step in input columns.
    pub x: usize,
}

impl Stride {
    /// Create a stride from its vertical and horizontal steps.
    pub fn new(y: usize, x: usize) -> Self {
        Self { y, x }
    }

    /// Check both components are at least 1.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.y < 1 || self.x < 1 {
            return Err(FilterError::InvalidStride(self.y, self.x));
        }
        Ok(())
    }

    /// The output size for an input of `size`: ⌈H / y⌉ × ⌈W / x⌉.
    ///
    /// PRECONDITION: the stride is valid.
    pub fn output_size(&self, size: ImageSize) -> ImageSize {
        ImageSize {
            width: size.width.div_ceil(self.x),
            height: size.height.div_ceil(self.y),
        }
    }
}

impl Default for Stride {
    fn default() -> Self {
        Self { y: 1, x: 1 }
    }
}

impl From<(usize, usize)> for Stride {
    fn from((y, x): (usize, usize)) -> Self {
        Self { y, x }
    }
}

/// One kernel cell that takes part in the filter.
///
/// `dy` and `dx` index the kernel window from its top-left cell. Since the
/// input is padded by half a kernel on each side, the cell reads the padded
/// input at `(row * stride.y + dy, col * stride.x + dx)`, which is the
/// centered offset `(dy - kh, dx - kw)` in the unpadded image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tap {
    /// Kernel row of the cell.
    pub dy: usize,
    /// Kernel column of the cell.
    pub dx: usize,
    /// Weight the input value is multiplied with.
    pub weight: f32,
}

fn check_shape(rows: usize, cols: usize, len: usize) -> Result<(), FilterError> {
    if rows % 2 == 0 || cols % 2 == 0 {
        return Err(FilterError::EvenKernelDimensions { rows, cols });
    }
    if len != rows * cols {
        return Err(FilterError::InvalidKernelLength {
            expected: rows * cols,
            got: len,
        });
    }
    Ok(())
}

fn flatten_rows<R, V>(rows: &[R]) -> Result<(usize, usize, Vec<V>), FilterError>
where
    R: AsRef<[V]>,
    V: Copy,
{
    let cols = rows.first().map_or(0, |r| r.as_ref().len());
    let mut cells = Vec::with_capacity(rows.len() * cols);
    for (row, values) in rows.iter().enumerate() {
        let values = values.as_ref();
        if values.len() != cols {
            return Err(FilterError::RaggedKernel {
                row,
                expected: cols,
                got: values.len(),
            });
        }
        cells.extend_from_slice(values);
    }
    Ok((rows.len(), cols, cells))
}

/// A 2-D kernel of real weights for linear filtering.
///
/// Both dimensions are odd so the kernel has a unique center cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel2d {
    rows: usize,
    cols: usize,
    weights: Vec<f32>,
}

impl Kernel2d {
    /// Create a kernel from row-major weights.
    ///
    /// # Errors
    ///
    /// Fails on even dimensions, a data length different from `rows * cols`,
    /// or a weight that is NaN or infinite.
    pub fn new(rows: usize, cols: usize, weights: Vec<f32>) -> Result<Self, FilterError> {
        check_shape(rows, cols, weights.len())?;

        if let Some(idx) = weights.iter().position(|w| !w.is_finite()) {
            return Err(FilterError::NonFiniteWeight {
                row: idx / cols,
                col: idx % cols,
            });
        }

        Ok(Self {
            rows,
            cols,
            weights,
        })
    }

    /// Create a kernel from a grid of rows.
    ///
    /// # Example
    ///
    /// ```
    /// use tessera_imgproc::filter::Kernel2d;
    ///
    /// let kernel = Kernel2d::from_rows(&[
    ///     [0.0, -1.0, 0.0],
    ///     [-1.0, 4.0, -1.0],
    ///     [0.0, -1.0, 0.0],
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(kernel.half_size(), (1, 1));
    /// assert_eq!(kernel.taps().len(), 5);
    /// ```
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, FilterError> {
        let (num_rows, cols, weights) = flatten_rows(rows)?;
        Self::new(num_rows, cols, weights)
    }

    /// Number of kernel rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of kernel columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Half kernel margins `(kh, kw)`.
    pub fn half_size(&self) -> (usize, usize) {
        (self.rows / 2, self.cols / 2)
    }

    /// The row-major weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// The weight at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.weights[row * self.cols + col])
    }

    /// The nonzero cells as taps.
    pub fn taps(&self) -> Vec<Tap> {
        self.weights
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w != 0.0)
            .map(|(idx, &weight)| Tap {
                dy: idx / self.cols,
                dx: idx % self.cols,
                weight,
            })
            .collect()
    }
}

/// A rank-filter window: every cell is either included with a weight or excluded.
///
/// An included cell contributes `weight * pixel` to the set of values the
/// order statistic is taken over; `1.0` is the plain placeholder.
#[derive(Clone, Debug, PartialEq)]
pub struct InclusionKernel {
    rows: usize,
    cols: usize,
    cells: Vec<Option<f32>>,
}

impl InclusionKernel {
    /// Create a window from row-major cells, `None` meaning excluded.
    ///
    /// # Errors
    ///
    /// Fails on even dimensions, a data length different from `rows * cols`,
    /// or an included cell whose weight is NaN or infinite.
    pub fn new(rows: usize, cols: usize, cells: Vec<Option<f32>>) -> Result<Self, FilterError> {
        check_shape(rows, cols, cells.len())?;

        if let Some(idx) = cells
            .iter()
            .position(|c| c.is_some_and(|w| !w.is_finite()))
        {
            return Err(FilterError::MalformedRankEntry {
                row: idx / cols,
                col: idx % cols,
            });
        }

        Ok(Self { rows, cols, cells })
    }

    /// Create a window from a grid of rows.
    pub fn from_rows<R: AsRef<[Option<f32>]>>(rows: &[R]) -> Result<Self, FilterError> {
        let (num_rows, cols, cells) = flatten_rows(rows)?;
        Self::new(num_rows, cols, cells)
    }

    /// A fully included window of unit weights.
    pub fn full(rows: usize, cols: usize) -> Result<Self, FilterError> {
        Self::new(rows, cols, vec![Some(1.0); rows * cols])
    }

    /// Number of window rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of window columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Half kernel margins `(kh, kw)`.
    pub fn half_size(&self) -> (usize, usize) {
        (self.rows / 2, self.cols / 2)
    }

    /// Number of included cells.
    pub fn num_included(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// The included cells as taps, in row-major order.
    pub fn taps(&self) -> Vec<Tap> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| {
                cell.map(|weight| Tap {
                    dy: idx / self.cols,
                    dx: idx % self.cols,
                    weight,
                })
            })
            .collect()
    }
}

/// Check the engine can filter images of element type `T`.
pub(crate) fn check_element_type<T: Pixel>() -> Result<(), FilterError> {
    match T::ELEMENT_TYPE {
        ElementType::U8 | ElementType::F32 => Ok(()),
        other => Err(FilterError::UnsupportedElementType(other)),
    }
}
