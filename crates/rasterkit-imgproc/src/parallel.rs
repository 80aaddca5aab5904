use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Pixel count above which [`ExecutionStrategy::Auto`] switches to the rayon pool.
pub const DEFAULT_PARALLEL_MIN_PIXELS: usize = 256 * 256;

/// Controls how per-row work is executed.
///
/// Every strategy produces identical output; only scheduling differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Use the global Rayon thread pool to process rows in parallel.
    ParallelRows,

    /// Process rows in parallel only when the image has at least `min_pixels` pixels.
    Auto {
        /// Smallest pixel count handed to the thread pool.
        min_pixels: usize,
    },
}

impl Default for ExecutionStrategy {
    fn default() -> Self {
        ExecutionStrategy::Auto {
            min_pixels: DEFAULT_PARALLEL_MIN_PIXELS,
        }
    }
}

impl ExecutionStrategy {
    /// Whether an image with `num_pixels` pixels runs on the thread pool.
    pub fn is_parallel(&self, num_pixels: usize) -> bool {
        match *self {
            ExecutionStrategy::Serial => false,
            ExecutionStrategy::ParallelRows => true,
            ExecutionStrategy::Auto { min_pixels } => num_pixels >= min_pixels,
        }
    }
}

/// Apply a function to each pixel, walking the image row by row.
///
/// # Arguments
///
/// * `src` - Source samples, `C1` per pixel.
/// * `dst` - Destination samples, `C2` per pixel, same pixel count as `src`.
/// * `cols` - Number of pixels in one row.
/// * `strategy` - How rows are scheduled.
/// * `f` - Called with one source pixel and the matching destination pixel.
pub fn par_iter_rows<S, D, const C1: usize, const C2: usize>(
    src: &[S],
    dst: &mut [D],
    cols: usize,
    strategy: ExecutionStrategy,
    f: impl Fn(&[S], &mut [D]) + Send + Sync,
) where
    S: Sync,
    D: Send,
{
    let num_pixels = src.len() / C1;
    debug_assert_eq!(num_pixels, dst.len() / C2);

    let row = |(src_row, dst_row): (&[S], &mut [D])| {
        src_row
            .chunks_exact(C1)
            .zip(dst_row.chunks_exact_mut(C2))
            .for_each(|(src_pixel, dst_pixel)| f(src_pixel, dst_pixel));
    };

    if strategy.is_parallel(num_pixels) {
        src.par_chunks_exact(C1 * cols)
            .zip(dst.par_chunks_exact_mut(C2 * cols))
            .for_each(row);
    } else {
        src.chunks_exact(C1 * cols)
            .zip(dst.chunks_exact_mut(C2 * cols))
            .for_each(row);
    }
}

/// Fill each destination row by index.
///
/// # Arguments
///
/// * `dst` - Destination samples.
/// * `row_len` - Number of samples in one row.
/// * `num_pixels` - Pixel count of the image, used to pick serial or parallel.
/// * `strategy` - How rows are scheduled.
/// * `f` - Called with the row index and the mutable row.
pub fn par_rows_mut<D>(
    dst: &mut [D],
    row_len: usize,
    num_pixels: usize,
    strategy: ExecutionStrategy,
    f: impl Fn(usize, &mut [D]) + Send + Sync,
) where
    D: Send,
{
    if strategy.is_parallel(num_pixels) {
        dst.par_chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(r, row)| f(r, row));
    } else {
        dst.chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(r, row)| f(r, row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_threshold() {
        let auto = ExecutionStrategy::Auto { min_pixels: 100 };
        assert!(!auto.is_parallel(99));
        assert!(auto.is_parallel(100));
        assert!(!ExecutionStrategy::Serial.is_parallel(usize::MAX));
        assert!(ExecutionStrategy::ParallelRows.is_parallel(1));
    }

    #[test]
    fn test_iter_rows_same_output_for_all_strategies() {
        let src: Vec<u8> = (0..24).collect();
        let mut outputs = Vec::new();

        for strategy in [
            ExecutionStrategy::Serial,
            ExecutionStrategy::ParallelRows,
            ExecutionStrategy::default(),
        ] {
            let mut dst = vec![0u16; 6];
            // 3x2 image, 4 channels in, 1 channel out
            par_iter_rows::<_, _, 4, 1>(&src, &mut dst, 3, strategy, |s, d| {
                d[0] = s.iter().map(|&v| v as u16).sum();
            });
            outputs.push(dst);
        }

        assert_eq!(outputs[0], vec![6, 22, 38, 54, 70, 86]);
        assert!(outputs.iter().all(|o| o == &outputs[0]));
    }

    #[test]
    fn test_rows_mut_indexes_rows() {
        let mut dst = vec![0usize; 6];
        par_rows_mut(&mut dst, 2, 6, ExecutionStrategy::ParallelRows, |r, row| {
            row.iter_mut().for_each(|v| *v = r);
        });
        assert_eq!(dst, vec![0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&ExecutionStrategy::Auto { min_pixels: 5 }).unwrap();
        assert_eq!(json, r#"{"kind":"auto","min_pixels":5}"#);
        let back: ExecutionStrategy = serde_json::from_str(r#"{"kind":"serial"}"#).unwrap();
        assert_eq!(back, ExecutionStrategy::Serial);
    }
}
