use super::kernel::Kernel2d;
use crate::error::FilterError;

/// Create a box blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn box_blur_kernel_1d(kernel_size: usize) -> Vec<f32> {
    vec![1.0 / kernel_size as f32; kernel_size]
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel, normalized to sum to one.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = kernel_size.saturating_sub(1) as f32 / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Create the two 1-D factors of a sobel kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel, 3 or 5.
///
/// # Returns
///
/// The derivative and the smoothing factor, in that order.
pub fn sobel_kernel_1d(kernel_size: usize) -> Result<(Vec<f32>, Vec<f32>), FilterError> {
    match kernel_size {
        3 => Ok((vec![-1.0, 0.0, 1.0], vec![1.0, 2.0, 1.0])),
        5 => Ok((
            vec![-1.0, -2.0, 0.0, 2.0, 1.0],
            vec![1.0, 4.0, 6.0, 4.0, 1.0],
        )),
        _ => Err(FilterError::UnsupportedKernelSize(kernel_size)),
    }
}

/// Build the 2-D kernel `kernel_y ⊗ kernel_x`.
///
/// # Arguments
///
/// * `kernel_y` - One weight per kernel row.
/// * `kernel_x` - One weight per kernel column.
///
/// # Example
///
/// ```
/// use tessera_imgproc::filter::kernels::{outer_kernel, sobel_kernel_1d};
///
/// let (derivative, smoothing) = sobel_kernel_1d(3).unwrap();
/// let sobel_x = outer_kernel(&smoothing, &derivative).unwrap();
/// assert_eq!(sobel_x.get(1, 0), Some(-2.0));
/// ```
pub fn outer_kernel(kernel_y: &[f32], kernel_x: &[f32]) -> Result<Kernel2d, FilterError> {
    let weights = kernel_y
        .iter()
        .flat_map(|&y| kernel_x.iter().map(move |&x| y * x))
        .collect();
    Kernel2d::new(kernel_y.len(), kernel_x.len(), weights)
}

/// A normalized `rows x cols` averaging kernel.
pub fn box_kernel_2d(rows: usize, cols: usize) -> Result<Kernel2d, FilterError> {
    outer_kernel(&box_blur_kernel_1d(rows), &box_blur_kernel_1d(cols))
}

/// A normalized square gaussian kernel.
pub fn gaussian_kernel_2d(kernel_size: usize, sigma: f32) -> Result<Kernel2d, FilterError> {
    let kernel = gaussian_kernel_1d(kernel_size, sigma);
    outer_kernel(&kernel, &kernel)
}
