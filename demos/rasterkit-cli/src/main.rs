use argh::FromArgs;
use std::path::PathBuf;

use rasterkit::imgproc::config::EngineConfig;
use rasterkit::imgproc::session::{EditSession, Operation};
use rasterkit::io::{functional as F, EncodeFormat};

#[derive(FromArgs)]
/// Apply an edit pipeline to an image and write the result
struct Args {
    /// path to an input image
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// path to the output image (.png, .jpg or .jpeg)
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// path to a JSON list of operations
    #[argh(option)]
    pipeline: Option<PathBuf>,

    /// print up to this many dominant colors of the input
    #[argh(option)]
    palette: Option<usize>,

    /// JPEG quality in [10, 100]
    #[argh(option, default = "90")]
    quality: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    // fail on a bad output extension before doing any work
    let format = EncodeFormat::from_path(&args.output)?;

    let ops: Vec<Operation> = match &args.pipeline {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => Vec::new(),
    };

    let source = F::read_image_any_rgba8(&args.input)?;
    log::info!("loaded {} from {}", source.size(), args.input.display());

    let mut config = EngineConfig::default();
    if let Some(max_colors) = args.palette {
        config.palette.max_colors = max_colors;
    }
    let session = EditSession::new(source, config);

    if args.palette.is_some() {
        for swatch in session.palette()? {
            println!("{} {}", swatch.hex, swatch.frequency);
        }
    }

    let image = session.render(&ops)?;
    log::info!("applied {} operations, output is {}", ops.len(), image.size());

    F::write_image(&args.output, &image, format, args.quality)?;

    Ok(())
}
