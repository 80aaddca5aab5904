use crate::parallel::{self, ExecutionStrategy};

/// A separable 2D filter that applies horizontal and vertical 1D convolutions sequentially.
///
/// Samples outside the image are clamped to the nearest edge pixel, so a
/// normalized kernel keeps flat regions (and opaque alpha) unchanged.
struct SeparableFilter<'a> {
    kernel_x: &'a [f32],
    kernel_y: &'a [f32],
    half_x: isize,
    half_y: isize,
}

impl<'a> SeparableFilter<'a> {
    fn new(kernel_x: &'a [f32], kernel_y: &'a [f32]) -> Self {
        Self {
            kernel_x,
            kernel_y,
            half_x: (kernel_x.len() / 2) as isize,
            half_y: (kernel_y.len() / 2) as isize,
        }
    }

    fn apply<const C: usize>(
        &self,
        src: &[f32],
        dst: &mut [f32],
        cols: usize,
        rows: usize,
        strategy: ExecutionStrategy,
    ) {
        let num_pixels = cols * rows;
        let row_len = cols * C;
        let mut temp = vec![0.0f32; src.len()];

        // Horizontal
        parallel::par_rows_mut(&mut temp, row_len, num_pixels, strategy, |r, row_temp| {
            let src_row = &src[r * row_len..(r + 1) * row_len];
            for c in 0..cols {
                let mut acc = [0.0f32; C];
                for (i, &k) in self.kernel_x.iter().enumerate() {
                    let x = (c as isize + i as isize - self.half_x).clamp(0, cols as isize - 1);
                    let idx = x as usize * C;
                    for (ch, acc_val) in acc.iter_mut().enumerate() {
                        *acc_val += src_row[idx + ch] * k;
                    }
                }
                row_temp[c * C..(c + 1) * C].copy_from_slice(&acc);
            }
        });

        // Vertical
        let temp = &temp;
        parallel::par_rows_mut(dst, row_len, num_pixels, strategy, |r, dst_row| {
            for c in 0..cols {
                let mut acc = [0.0f32; C];
                for (i, &k) in self.kernel_y.iter().enumerate() {
                    let y = (r as isize + i as isize - self.half_y).clamp(0, rows as isize - 1);
                    let idx = y as usize * row_len + c * C;
                    for (ch, acc_val) in acc.iter_mut().enumerate() {
                        *acc_val += temp[idx + ch] * k;
                    }
                }
                dst_row[c * C..(c + 1) * C].copy_from_slice(&acc);
            }
        });
    }
}

/// Apply a separable filter to an interleaved `f32` image with `C` channels.
///
/// # Arguments
///
/// * `src` - The source samples, `cols * rows * C` long.
/// * `dst` - The destination samples, same length as `src`.
/// * `cols` - Image width in pixels.
/// * `rows` - Image height in pixels.
/// * `kernel_x` - The horizontal kernel, odd length.
/// * `kernel_y` - The vertical kernel, odd length.
/// * `strategy` - How rows are scheduled.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn separable_filter<const C: usize>(
    src: &[f32],
    dst: &mut [f32],
    cols: usize,
    rows: usize,
    kernel_x: &[f32],
    kernel_y: &[f32],
    strategy: ExecutionStrategy,
) {
    debug_assert_eq!(src.len(), cols * rows * C);
    debug_assert_eq!(src.len(), dst.len());
    SeparableFilter::new(kernel_x, kernel_y).apply::<C>(src, dst, cols, rows, strategy);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_separable_identity_kernel() {
        let src: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let mut dst = vec![0.0; 12];
        separable_filter::<2>(&src, &mut dst, 3, 2, &[1.0], &[1.0], ExecutionStrategy::Serial);
        assert_eq!(src, dst);
    }

    #[test]
    fn test_separable_box_with_clamped_edges() {
        #[rustfmt::skip]
        let src = vec![
            0.0, 0.0, 0.0,
            0.0, 9.0, 0.0,
            0.0, 0.0, 0.0f32,
        ];
        let kernel = [1.0 / 3.0; 3];
        let mut dst = vec![0.0; 9];
        separable_filter::<1>(&src, &mut dst, 3, 3, &kernel, &kernel, ExecutionStrategy::Serial);
        dst.iter().for_each(|&v| assert_relative_eq!(v, 1.0, epsilon = 1e-5));
    }

    #[test]
    fn test_separable_flat_region_is_preserved() {
        let src = vec![200.0f32; 5 * 4 * 4];
        let kernel = [0.25, 0.5, 0.25];
        let mut dst = vec![0.0; src.len()];
        separable_filter::<4>(
            &src,
            &mut dst,
            5,
            4,
            &kernel,
            &kernel,
            ExecutionStrategy::ParallelRows,
        );
        dst.iter().for_each(|&v| assert_relative_eq!(v, 200.0, epsilon = 1e-4));
    }
}
