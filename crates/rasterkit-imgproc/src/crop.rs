use rasterkit_image::{ImageBuffer, ImageError, ImageSize, CHANNELS};
use serde::{Deserialize, Serialize};

use crate::parallel::{self, ExecutionStrategy};

/// A rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRegion {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width of the region.
    pub width: u32,
    /// Height of the region.
    pub height: u32,
}

impl CropRegion {
    /// Size of the region.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Check that the region is non-empty and lies inside `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidRegion`] otherwise.
    pub fn validate(&self, bounds: ImageSize) -> Result<(), ImageError> {
        let fits = |start: u32, extent: u32, limit: u32| {
            extent > 0 && start.checked_add(extent).is_some_and(|end| end <= limit)
        };

        if fits(self.x, self.width, bounds.width) && fits(self.y, self.height, bounds.height) {
            Ok(())
        } else {
            Err(ImageError::InvalidRegion {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                bounds_width: bounds.width,
                bounds_height: bounds.height,
            })
        }
    }
}

/// Crop an image to a specified region.
///
/// # Arguments
///
/// * `src` - The source image to crop.
/// * `region` - The rectangle to copy out of the source.
///
/// # Errors
///
/// Returns [`ImageError::InvalidRegion`] if the region is empty or exceeds the source.
///
/// # Examples
///
/// ```rust
/// use rasterkit_image::{ImageBuffer, ImageSize};
/// use rasterkit_imgproc::crop::{crop, CropRegion};
///
/// let data = (0u8..16).flat_map(|v| [v, v, v, 255]).collect();
/// let image = ImageBuffer::new(ImageSize { width: 4, height: 4 }, data).unwrap();
///
/// let region = CropRegion { x: 1, y: 1, width: 2, height: 2 };
/// let cropped = crop(&image, &region).unwrap();
///
/// let reds = cropped.pixels().map(|p| p[0]).collect::<Vec<_>>();
/// assert_eq!(reds, vec![5u8, 6, 9, 10]);
/// ```
pub fn crop(src: &ImageBuffer, region: &CropRegion) -> Result<ImageBuffer, ImageError> {
    crop_with(src, region, ExecutionStrategy::default())
}

/// Same as [`crop`], with rows scheduled by `strategy`.
pub fn crop_with(
    src: &ImageBuffer,
    region: &CropRegion,
    strategy: ExecutionStrategy,
) -> Result<ImageBuffer, ImageError> {
    region.validate(src.size())?;

    let (x, y) = (region.x as usize, region.y as usize);
    let dst_stride = region.width as usize * CHANNELS;
    let src_stride = src.row_stride();
    let num_pixels = region.size().num_pixels();

    let mut data = vec![0u8; num_pixels * CHANNELS];

    parallel::par_rows_mut(&mut data, dst_stride, num_pixels, strategy, |i, dst_row| {
        // get the slice at the top left corner
        let offset = (y + i) * src_stride + x * CHANNELS;
        dst_row.copy_from_slice(&src.as_slice()[offset..offset + dst_stride]);
    });

    ImageBuffer::new(region.size(), data)
}

/// State of an interactive crop selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing is being selected.
    Idle,
    /// A drag is in progress from `anchor`.
    Selecting {
        /// Where the drag started, clamped to the bounds.
        anchor: (u32, u32),
        /// The region spanned so far.
        current: CropRegion,
    },
    /// A drag finished with a non-empty region.
    Selected(CropRegion),
}

/// Drag-to-select state machine producing a [`CropRegion`].
///
/// Pointer coordinates are clamped to `[0, width] x [0, height]`, so the
/// selection can reach the far edges of the image but never leave it.
#[derive(Debug, Clone)]
pub struct CropSelection {
    bounds: ImageSize,
    state: SelectionState,
}

impl CropSelection {
    /// New idle selection over an image of the given size.
    pub fn new(bounds: ImageSize) -> Self {
        Self {
            bounds,
            state: SelectionState::Idle,
        }
    }

    /// The current state.
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// The finished region, if any.
    pub fn selected(&self) -> Option<CropRegion> {
        match self.state {
            SelectionState::Selected(region) => Some(region),
            _ => None,
        }
    }

    fn clamp(&self, x: i64, y: i64) -> (u32, u32) {
        (
            x.clamp(0, self.bounds.width as i64) as u32,
            y.clamp(0, self.bounds.height as i64) as u32,
        )
    }

    fn span(anchor: (u32, u32), end: (u32, u32)) -> CropRegion {
        CropRegion {
            x: anchor.0.min(end.0),
            y: anchor.1.min(end.1),
            width: anchor.0.abs_diff(end.0),
            height: anchor.1.abs_diff(end.1),
        }
    }

    /// Start a new drag at `(x, y)`, discarding any previous selection.
    pub fn begin_selection(&mut self, x: i64, y: i64) {
        let anchor = self.clamp(x, y);
        self.state = SelectionState::Selecting {
            anchor,
            current: Self::span(anchor, anchor),
        };
    }

    /// Move the drag to `(x, y)` and return the spanned region.
    ///
    /// # Errors
    ///
    /// [`ImageError::InvalidSelectionState`] unless a drag is in progress.
    pub fn update_selection(&mut self, x: i64, y: i64) -> Result<CropRegion, ImageError> {
        let SelectionState::Selecting { anchor, .. } = self.state else {
            return Err(ImageError::InvalidSelectionState("update_selection"));
        };
        let current = Self::span(anchor, self.clamp(x, y));
        self.state = SelectionState::Selecting { anchor, current };
        Ok(current)
    }

    /// Finish the drag.
    ///
    /// # Errors
    ///
    /// [`ImageError::InvalidSelectionState`] unless a drag is in progress, and
    /// [`ImageError::InvalidRegion`] if the spanned region is empty. In the
    /// latter case the selection goes back to idle.
    pub fn end_selection(&mut self) -> Result<CropRegion, ImageError> {
        let SelectionState::Selecting { current, .. } = self.state else {
            return Err(ImageError::InvalidSelectionState("end_selection"));
        };
        if let Err(e) = current.validate(self.bounds) {
            self.state = SelectionState::Idle;
            return Err(e);
        }
        self.state = SelectionState::Selected(current);
        Ok(current)
    }

    /// Drop any selection.
    pub fn reset(&mut self) {
        self.state = SelectionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: u32, height: u32) -> Result<ImageBuffer, ImageError> {
        let data = (0..width * height)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 7, 255])
            .collect();
        ImageBuffer::new([width, height].into(), data)
    }

    #[test]
    fn test_crop() -> Result<(), ImageError> {
        let image = numbered(2, 3)?;
        let region = CropRegion {
            x: 1,
            y: 1,
            width: 1,
            height: 2,
        };
        let cropped = crop(&image, &region)?;
        assert_eq!(cropped.size(), [1, 2].into());
        assert_eq!(cropped.as_slice(), &[3, 0, 7, 255, 5, 0, 7, 255]);
        Ok(())
    }

    #[test]
    fn test_crop_matches_source_pixels() -> Result<(), ImageError> {
        let image = numbered(37, 23)?;
        let region = CropRegion {
            x: 5,
            y: 9,
            width: 20,
            height: 11,
        };
        let cropped = crop(&image, &region)?;
        for y in 0..region.height {
            for x in 0..region.width {
                assert_eq!(
                    cropped.get_pixel(x, y),
                    image.get_pixel(region.x + x, region.y + y)
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_crop_strategies_agree() -> Result<(), ImageError> {
        let image = numbered(31, 19)?;
        let region = CropRegion {
            x: 3,
            y: 2,
            width: 25,
            height: 15,
        };
        let serial = crop_with(&image, &region, ExecutionStrategy::Serial)?;
        let parallel = crop_with(&image, &region, ExecutionStrategy::ParallelRows)?;
        assert_eq!(serial, parallel);
        assert_eq!(serial, crop(&image, &region)?);
        Ok(())
    }

    #[test]
    fn test_crop_full_image() -> Result<(), ImageError> {
        let image = numbered(4, 4)?;
        let region = CropRegion {
            x: 0,
            y: 0,
            width: 4,
            height: 4,
        };
        assert_eq!(crop(&image, &region)?, image);
        Ok(())
    }

    #[test]
    fn test_crop_rejects_out_of_bounds() -> Result<(), ImageError> {
        let image = ImageBuffer::from_size_val([100, 100].into(), [0, 0, 0, 255])?;
        let region = CropRegion {
            x: 90,
            y: 90,
            width: 50,
            height: 50,
        };
        assert!(matches!(
            crop(&image, &region),
            Err(ImageError::InvalidRegion { x: 90, y: 90, .. })
        ));

        let empty = CropRegion {
            width: 0,
            ..region
        };
        assert!(matches!(
            crop(&image, &empty),
            Err(ImageError::InvalidRegion { .. })
        ));

        let overflow = CropRegion {
            x: u32::MAX,
            y: 0,
            width: 2,
            height: 1,
        };
        assert!(matches!(
            crop(&image, &overflow),
            Err(ImageError::InvalidRegion { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_selection_drag() -> Result<(), ImageError> {
        let mut selection = CropSelection::new([100, 80].into());
        selection.begin_selection(60, 10);

        // dragging up-left of the anchor flips the corner
        let region = selection.update_selection(20, 40)?;
        assert_eq!(
            region,
            CropRegion {
                x: 20,
                y: 10,
                width: 40,
                height: 30
            }
        );

        // points outside the image are clamped to its edges
        let region = selection.update_selection(500, -30)?;
        assert_eq!(
            region,
            CropRegion {
                x: 60,
                y: 0,
                width: 40,
                height: 10
            }
        );

        let done = selection.end_selection()?;
        assert_eq!(done, region);
        assert_eq!(selection.selected(), Some(region));
        assert!(done.validate([100, 80].into()).is_ok());
        Ok(())
    }

    #[test]
    fn test_selection_rejects_idle_operations() {
        let mut selection = CropSelection::new([10, 10].into());
        assert_eq!(
            selection.update_selection(1, 1),
            Err(ImageError::InvalidSelectionState("update_selection"))
        );
        assert_eq!(
            selection.end_selection(),
            Err(ImageError::InvalidSelectionState("end_selection"))
        );
    }

    #[test]
    fn test_selection_zero_area_returns_to_idle() {
        let mut selection = CropSelection::new([10, 10].into());
        selection.begin_selection(3, 3);
        assert!(matches!(
            selection.end_selection(),
            Err(ImageError::InvalidRegion { .. })
        ));
        assert_eq!(selection.state(), SelectionState::Idle);
    }

    #[test]
    fn test_selection_reset() -> Result<(), ImageError> {
        let mut selection = CropSelection::new([10, 10].into());
        selection.begin_selection(0, 0);
        selection.update_selection(5, 5)?;
        selection.end_selection()?;
        selection.reset();
        assert_eq!(selection.selected(), None);
        Ok(())
    }
}
