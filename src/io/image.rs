use crate::io::AssetError;
use image::RgbImage;
use log::info;
use std::path::{Path, PathBuf};

/// Writes an 8-bit RGB image; the format follows the file extension.
pub fn save_image(img: &RgbImage, path: &Path) -> Result<(), AssetError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    img.save(path)?;
    info!("Saved {}x{} image to {}", img.width(), img.height(), path.display());
    Ok(())
}

/// Output path of frame `index` (1-based). A single-frame render keeps `base`
/// as is; otherwise the number goes before the extension: `out_0003.png`.
pub fn frame_path(base: &Path, index: usize, total: usize) -> PathBuf {
    if total <= 1 {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    let name = match base.extension() {
        Some(ext) => format!("{stem}_{index:04}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{index:04}.png"),
    };
    base.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_numbers_go_before_the_extension() {
        let base = Path::new("out/chess.png");
        assert_eq!(frame_path(base, 1, 1), PathBuf::from("out/chess.png"));
        assert_eq!(frame_path(base, 3, 10), PathBuf::from("out/chess_0003.png"));
        assert_eq!(frame_path(Path::new("shot"), 12, 20), PathBuf::from("shot_0012.png"));
    }

    #[test]
    fn png_round_trips_through_disk() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(1, 1, image::Rgb([10, 20, 30]));
        let path = std::env::temp_dir().join(format!("chess3d-{}-save.png", std::process::id()));
        save_image(&img, &path).unwrap();

        let back = image::open(&path).unwrap().into_rgb8();
        std::fs::remove_file(&path).ok();
        assert_eq!(back.get_pixel(1, 1), &image::Rgb([10, 20, 30]));
        assert_eq!(back.dimensions(), (3, 2));
    }
}
