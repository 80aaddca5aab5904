use rasterkit_image::ImageBuffer;
use rasterkit_io::functional::{read_image_any_rgba8, write_image};
use rasterkit_io::{DefaultCodec, EncodeFormat, ImageCodec, IoError};

#[test]
fn truncated_png_is_a_decode_error() -> Result<(), IoError> {
    let image = ImageBuffer::from_size_val([8, 8].into(), [1, 2, 3, 4])?;
    let bytes = DefaultCodec.encode(&image, EncodeFormat::Png, 50)?;

    let res = DefaultCodec.decode(&bytes[..bytes.len() / 2]);
    assert!(matches!(res, Err(IoError::Decode(_))));
    Ok(())
}

#[test]
fn garbage_file_is_a_decode_error() -> Result<(), IoError> {
    let tmp_dir = tempfile::tempdir()?;
    let file_path = tmp_dir.path().join("broken.png");
    std::fs::write(&file_path, b"\x89PNG but not really")?;

    assert!(matches!(
        read_image_any_rgba8(&file_path),
        Err(IoError::Decode(_))
    ));
    Ok(())
}

#[test]
fn unsupported_extension() -> Result<(), IoError> {
    let tmp_dir = tempfile::tempdir()?;
    let file_path = tmp_dir.path().join("out.bmp");
    let image = ImageBuffer::from_size_val([2, 2].into(), [0, 0, 0, 255])?;

    let res = EncodeFormat::from_path(&file_path)
        .and_then(|format| write_image(&file_path, &image, format, 90));
    assert!(matches!(res, Err(IoError::InvalidFileExtension(_))));
    assert!(!file_path.exists());
    Ok(())
}
