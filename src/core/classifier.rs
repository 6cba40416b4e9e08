/*
 * Maps a dropped file and the current option flags to the one conversion it should
 * go through. Every path is classifiable; existence is the orchestrator's concern.
 */
use super::models::{Action, OptionFlags, TextureFormats};
use std::path::Path;

pub fn classify(path: &Path, flags: OptionFlags, formats: &TextureFormats) -> Action {
    let action = if formats.is_texture(path) {
        if flags.convert_texture_to_raster {
            Action::ConvertTextureToRaster
        } else {
            Action::InspectTexture
        }
    } else {
        Action::ConvertToTexture {
            add_stats: flags.include_runtime_stats,
        }
    };
    log::trace!("Classifier: {path:?} -> {action:?}");
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(stats: bool, to_raster: bool) -> OptionFlags {
        OptionFlags {
            include_runtime_stats: stats,
            convert_texture_to_raster: to_raster,
        }
    }

    #[test]
    fn test_raster_sources_convert_to_texture_with_stats_flag() {
        let formats = TextureFormats::default();
        for name in ["photo.png", "scan.tif", "plate.exr", "README", "tile.TX"] {
            for stats in [true, false] {
                assert_eq!(
                    classify(Path::new(name), flags(stats, false), &formats),
                    Action::ConvertToTexture { add_stats: stats },
                    "unexpected action for {name}"
                );
            }
        }
    }

    #[test]
    fn test_texture_sources_ignore_stats_flag() {
        let formats = TextureFormats::default();
        for stats in [true, false] {
            assert_eq!(
                classify(Path::new("tile.tx"), flags(stats, false), &formats),
                Action::InspectTexture
            );
            assert_eq!(
                classify(Path::new("tile.tx"), flags(stats, true), &formats),
                Action::ConvertTextureToRaster
            );
        }
    }

    #[test]
    fn test_to_raster_flag_does_not_affect_raster_sources() {
        let formats = TextureFormats::default();
        assert_eq!(
            classify(Path::new("photo.jpg"), flags(false, true), &formats),
            Action::ConvertToTexture { add_stats: false }
        );
    }

    #[test]
    fn test_custom_texture_extension() {
        let formats = TextureFormats::new("tex", "png");
        assert_eq!(
            classify(Path::new("a.tex"), flags(true, false), &formats),
            Action::InspectTexture
        );
        assert_eq!(
            classify(Path::new("a.tx"), flags(true, false), &formats),
            Action::ConvertToTexture { add_stats: true }
        );
    }
}
