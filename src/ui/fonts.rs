use std::path::{Path, PathBuf};
use std::sync::Arc;

use eframe::egui::{self, FontData, FontDefinitions, FontFamily};

const CJK_FONT_NAME: &str = "cjk";

/// Fonts with Traditional Chinese glyphs on common systems.
const SYSTEM_CJK_FONTS: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\msjh.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
];

/// Pick the configured font, or the first system font that exists.
fn find_cjk_font(configured: Option<&Path>) -> Option<PathBuf> {
    configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_CJK_FONTS.iter().map(PathBuf::from))
        .find(|p| p.is_file())
}

/// Register a CJK fallback font so sheet names and labels render.
///
/// Without one, egui's built-in fonts show boxes for Chinese text; this is
/// logged and otherwise ignored.
pub fn install_cjk_font(ctx: &egui::Context, configured: Option<&Path>) {
    let Some(path) = find_cjk_font(configured) else {
        log::warn!("No CJK font found; Chinese labels will not render");
        return;
    };
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Failed to read font {}: {e}", path.display());
            return;
        }
    };

    let mut fonts = FontDefinitions::default();
    fonts.font_data.insert(
        CJK_FONT_NAME.to_owned(),
        Arc::new(FontData::from_owned(bytes)),
    );
    for family in [FontFamily::Proportional, FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push(CJK_FONT_NAME.to_owned());
    }
    ctx.set_fonts(fonts);
    log::info!("Using CJK font {}", path.display());
}
