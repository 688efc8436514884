use super::kernel::Kernel2d;

/// Relative residual below which a kernel is treated as separable.
pub const SEPARABILITY_TOLERANCE: f64 = 1e-6;

/// A pair of 1-D kernels whose outer product approximates a 2-D kernel.
#[derive(Clone, Debug, PartialEq)]
pub struct SeparableKernel {
    /// The vertical kernel, one weight per kernel row.
    pub kernel_y: Vec<f32>,
    /// The horizontal kernel, one weight per kernel column.
    pub kernel_x: Vec<f32>,
}

/// Try to factor a 2-D kernel into a vertical and a horizontal 1-D kernel.
///
/// The first nonzero row `r` is taken as the horizontal kernel and each row
/// is fitted as `alpha_i * r` by least squares. If the relative residual
/// `||K - alpha ⊗ r||_F / ||K||_F` exceeds `tolerance`, the best rank-1
/// approximation from the SVD is checked against the same tolerance.
///
/// An all-zero kernel factors into two zero kernels. `None` means the kernel
/// is not separable; callers then fall back to the dense path.
///
/// # Example
///
/// ```
/// use tessera_imgproc::filter::{factorize, Kernel2d, SEPARABILITY_TOLERANCE};
///
/// let kernel = Kernel2d::from_rows(&[[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]]).unwrap();
/// let sep = factorize(&kernel, SEPARABILITY_TOLERANCE).unwrap();
/// assert_eq!(sep.kernel_x, vec![1.0, 2.0, 1.0]);
/// assert_eq!(sep.kernel_y, vec![1.0, 2.0, 1.0]);
/// ```
pub fn factorize(kernel: &Kernel2d, tolerance: f64) -> Option<SeparableKernel> {
    let (rows, cols) = (kernel.rows(), kernel.cols());
    let k: Vec<f64> = kernel.weights().iter().map(|&w| w as f64).collect();
    let row = |i: usize| &k[i * cols..(i + 1) * cols];

    let Some(ref_idx) = (0..rows).find(|&i| row(i).iter().any(|&w| w != 0.0)) else {
        return Some(SeparableKernel {
            kernel_y: vec![0.0; rows],
            kernel_x: vec![0.0; cols],
        });
    };

    let reference = row(ref_idx);
    let denom = dot(reference, reference);
    let norm = frobenius(&k) + 1e-12;

    let alpha: Vec<f64> = (0..rows).map(|i| dot(row(i), reference) / denom).collect();
    if relative_residual(&k, &alpha, reference, norm) <= tolerance {
        return Some(SeparableKernel {
            kernel_y: alpha.iter().map(|&a| a as f32).collect(),
            kernel_x: reference.iter().map(|&r| r as f32).collect(),
        });
    }

    // best rank-1 approximation
    let mat = faer::Mat::<f64>::from_fn(rows, cols, |i, j| k[i * cols + j]);
    let svd = mat.svd();
    let sigma = svd.s_diagonal().read(0);
    let u: Vec<f64> = (0..rows).map(|i| svd.u().read(i, 0)).collect();
    let v: Vec<f64> = (0..cols).map(|j| svd.v().read(j, 0)).collect();

    let su: Vec<f64> = u.iter().map(|&x| x * sigma).collect();
    if relative_residual(&k, &su, &v, norm) > tolerance {
        return None;
    }

    let scale = sigma.sqrt();
    Some(SeparableKernel {
        kernel_y: u.iter().map(|&x| (x * scale) as f32).collect(),
        kernel_x: v.iter().map(|&x| (x * scale) as f32).collect(),
    })
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn frobenius(k: &[f64]) -> f64 {
    k.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// `||K - col ⊗ row||_F / norm`
fn relative_residual(k: &[f64], col: &[f64], row: &[f64], norm: f64) -> f64 {
    let cols = row.len();
    let err: f64 = k
        .iter()
        .enumerate()
        .map(|(idx, &w)| {
            let d = w - col[idx / cols] * row[idx % cols];
            d * d
        })
        .sum();
    err.sqrt() / norm
}
