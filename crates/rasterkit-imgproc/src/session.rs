use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rasterkit_image::{ImageBuffer, ImageError};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::crop::{crop_with, CropRegion};
use crate::enhance::{apply_filters_with, FilterParams};
use crate::font::BitmapFont;
use crate::palette::{extract_palette_with, ColorSwatch};
use crate::resize::{resize_with, ResizeSpec};
use crate::sketch::sketch_with;
use crate::watermark::{apply_watermark, GlyphRasterizer, TextMeasure, WatermarkSpec};

/// One step of an edit pipeline.
///
/// ```
/// use rasterkit_imgproc::session::Operation;
///
/// let ops: Vec<Operation> = serde_json::from_str(
///     r#"[
///         {"op": "crop", "x": 0, "y": 0, "width": 10, "height": 10},
///         {"op": "filter", "sepia": 40},
///         {"op": "sketch", "blur_radius": 3}
///     ]"#,
/// )
/// .unwrap();
/// assert_eq!(ops.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Cut out a region.
    Crop(CropRegion),
    /// Resample to a new size.
    Resize(ResizeSpec),
    /// Run the tone and blur stages.
    Filter(FilterParams),
    /// Turn the image into a pencil sketch.
    Sketch {
        /// Gaussian sigma of the blend layer.
        blur_radius: f32,
    },
    /// Draw a text watermark.
    Watermark(WatermarkSpec),
}

impl Operation {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Crop(_) => "crop",
            Operation::Resize(_) => "resize",
            Operation::Filter(_) => "filter",
            Operation::Sketch { .. } => "sketch",
            Operation::Watermark(_) => "watermark",
        }
    }

    fn apply(&self, src: &ImageBuffer, session: &EditSession) -> Result<ImageBuffer, ImageError> {
        let strategy = session.config.strategy;
        match self {
            Operation::Crop(region) => crop_with(src, region, strategy),
            Operation::Resize(spec) => resize_with(src, spec, strategy),
            Operation::Filter(params) => apply_filters_with(src, params, strategy),
            Operation::Sketch { blur_radius } => sketch_with(src, *blur_radius, strategy),
            Operation::Watermark(spec) => {
                apply_watermark(src, spec, &*session.measure, &*session.rasterizer)
            }
        }
    }
}

/// Stamp of a render request, see [`EditSession::begin_render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderTicket(u64);

impl RenderTicket {
    /// The generation this ticket was issued for.
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Result of a ticketed render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The render finished and its ticket was still the latest.
    Completed(ImageBuffer),
    /// A newer ticket was issued; the work was discarded.
    Superseded,
}

impl RenderOutcome {
    /// The rendered image, if the render completed.
    pub fn into_image(self) -> Option<ImageBuffer> {
        match self {
            RenderOutcome::Completed(image) => Some(image),
            RenderOutcome::Superseded => None,
        }
    }
}

/// An edit session over one immutable source image.
///
/// Every render starts again from the source, so no state leaks between
/// renders. Ticketed renders are last-writer-wins: issuing a new ticket makes
/// every older in-flight render come back as [`RenderOutcome::Superseded`].
///
/// Clones share the source and the ticket counter.
#[derive(Clone)]
pub struct EditSession {
    source: Arc<ImageBuffer>,
    config: EngineConfig,
    measure: Arc<dyn TextMeasure + Send + Sync>,
    rasterizer: Arc<dyn GlyphRasterizer + Send + Sync>,
    generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("source", &self.source.size())
            .field("config", &self.config)
            .field("generation", &self.generation.load(Ordering::Acquire))
            .finish()
    }
}

impl EditSession {
    /// Create a session that draws text with the built-in [`BitmapFont`].
    pub fn new(source: ImageBuffer, config: EngineConfig) -> Self {
        Self {
            source: Arc::new(source),
            config,
            measure: Arc::new(BitmapFont),
            rasterizer: Arc::new(BitmapFont),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Replace the text measurement and glyph rasterization.
    pub fn with_text_renderer(
        mut self,
        measure: Arc<dyn TextMeasure + Send + Sync>,
        rasterizer: Arc<dyn GlyphRasterizer + Send + Sync>,
    ) -> Self {
        self.measure = measure;
        self.rasterizer = rasterizer;
        self
    }

    /// The source image.
    pub fn source(&self) -> &Arc<ImageBuffer> {
        &self.source
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extract the palette of the source with the session's palette settings.
    pub fn palette(&self) -> Result<Vec<ColorSwatch>, ImageError> {
        extract_palette_with(&self.source, &self.config.palette)
    }

    /// Apply `ops` in order to a fresh copy of the source.
    ///
    /// This does not take part in ticketing.
    pub fn render(&self, ops: &[Operation]) -> Result<ImageBuffer, ImageError> {
        let mut current = self.source.as_ref().clone();
        for op in ops {
            log::trace!("{} on {}", op.name(), current.size());
            current = op.apply(&current, self)?;
        }
        Ok(current)
    }

    /// Issue a new ticket, superseding every ticket issued before.
    pub fn begin_render(&self) -> RenderTicket {
        RenderTicket(self.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether `ticket` is still the latest one.
    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.0
    }

    /// Render `ops` for `ticket`.
    ///
    /// The ticket is checked before each operation and once more at the end;
    /// a superseded render stops early and its partial result is dropped.
    ///
    /// # Errors
    ///
    /// The first error of the pipeline, if the ticket is still current once the
    /// failing operation returns. Otherwise the error is dropped and the
    /// outcome is [`RenderOutcome::Superseded`].
    pub fn render_with(
        &self,
        ticket: RenderTicket,
        ops: &[Operation],
    ) -> Result<RenderOutcome, ImageError> {
        log::debug!(
            "render #{} of {} operations on {}",
            ticket.0,
            ops.len(),
            self.source.size()
        );

        let mut current = self.source.as_ref().clone();
        for op in ops {
            if !self.is_current(ticket) {
                log::debug!("render #{} superseded before {}", ticket.0, op.name());
                return Ok(RenderOutcome::Superseded);
            }
            current = match op.apply(&current, self) {
                Ok(image) => image,
                Err(_) if !self.is_current(ticket) => {
                    log::debug!("render #{} superseded during {}", ticket.0, op.name());
                    return Ok(RenderOutcome::Superseded);
                }
                Err(e) => return Err(e),
            };
        }

        if !self.is_current(ticket) {
            log::debug!("render #{} superseded", ticket.0);
            return Ok(RenderOutcome::Superseded);
        }

        Ok(RenderOutcome::Completed(current))
    }

    /// Issue a ticket and render `ops` on the rayon pool.
    ///
    /// `on_done` is called on a pool thread with the outcome.
    pub fn spawn_render<F>(&self, ops: Vec<Operation>, on_done: F) -> RenderTicket
    where
        F: FnOnce(Result<RenderOutcome, ImageError>) + Send + 'static,
    {
        let ticket = self.begin_render();
        let session = self.clone();
        rayon::spawn(move || on_done(session.render_with(ticket, &ops)));
        ticket
    }
}
