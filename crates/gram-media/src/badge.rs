//! Level-role icon rendering
//!
//! Each streak level gets one icon: the level numeral drawn centered over
//! a template image. Icons are cached on disk keyed by level and rendered
//! at most once per value.

use std::collections::HashSet;
use std::path::PathBuf;

use ab_glyph::{FontVec, PxScale};
use image::Rgba;
use imageproc::drawing::{draw_text_mut, text_size};
use parking_lot::Mutex;

use crate::error::MediaError;

/// Tint of the numeral, matching the play glyph
const NUMERAL_COLOR: Rgba<u8> = Rgba([0xe1, 0xe0, 0xe2, 0xff]);

/// Renders and caches numeric level icons
///
/// Template and font are read per render; a level renders once and then
/// hits the disk cache, so missing assets surface at the first grant of
/// a new level, not at startup.
pub struct BadgeRenderer {
    template: PathBuf,
    font_file: PathBuf,
    output_dir: PathBuf,
    rendered: Mutex<HashSet<i32>>,
}

impl BadgeRenderer {
    /// Prepare the output directory
    pub fn new(
        template: impl Into<PathBuf>,
        font_file: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, MediaError> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;

        Ok(Self {
            template: template.into(),
            font_file: font_file.into(),
            output_dir,
            rendered: Mutex::new(HashSet::new()),
        })
    }

    /// File name of the icon for a level
    #[must_use]
    pub fn icon_filename(level: i32) -> String {
        format!("level_{level}.png")
    }

    /// Path of the icon for a level, rendering it first if needed
    pub fn icon_for_level(&self, level: i32) -> Result<PathBuf, MediaError> {
        let path = self.output_dir.join(Self::icon_filename(level));

        if self.rendered.lock().contains(&level) || path.exists() {
            self.rendered.lock().insert(level);
            return Ok(path);
        }

        let font = self.load_font()?;
        let mut image = image::open(&self.template)?.to_rgba8();
        let (width, height) = image.dimensions();

        let scale = PxScale::from(width.min(height) as f32);
        let text = level.to_string();
        let (text_width, text_height) = text_size(scale, &font, &text);

        let x = (width as i32 - text_width as i32) / 2;
        let y = (height as i32 - text_height as i32) / 2;
        draw_text_mut(&mut image, NUMERAL_COLOR, x, y, scale, &font, &text);

        image.save(&path)?;
        self.rendered.lock().insert(level);

        Ok(path)
    }

    fn load_font(&self) -> Result<FontVec, MediaError> {
        let data = std::fs::read(&self.font_file)?;
        FontVec::try_from_vec(data)
            .map_err(|_| MediaError::Font(self.font_file.display().to_string()))
    }
}
