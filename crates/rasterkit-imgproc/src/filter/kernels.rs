/// Kernel size covering `±3 sigma` of a Gaussian with the given blur radius.
///
/// The radius is used as the standard deviation. A radius of zero yields a
/// single tap.
pub fn kernel_size_for_radius(radius: f32) -> usize {
    if radius <= 0.0 {
        return 1;
    }
    2 * (3.0 * radius).ceil() as usize + 1
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
    if kernel_size <= 1 || sigma <= 0.0 {
        return vec![1.0];
    }

    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size - 1) as f32 / 2.0;
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
