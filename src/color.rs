use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lighten, Srgb};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("invalid color '{value}' for {stage}: expected #rrggbb")]
pub struct ColorError {
    pub stage: &'static str,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Stage palette: one fixed colour per diagram stage
// ---------------------------------------------------------------------------

/// Node colours for the root and the three level stages, as `#rrggbb` strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagePalette {
    pub root: String,
    pub level1: String,
    pub level2: String,
    pub level3: String,
}

impl Default for StagePalette {
    fn default() -> Self {
        StagePalette {
            root: "#F76B73".to_string(),
            level1: "#4C78A8".to_string(),
            level2: "#54A24B".to_string(),
            level3: "#EECA3B".to_string(),
        }
    }
}

impl StagePalette {
    /// Colours in stage order: root, level1, level2, level3.
    pub fn stages(&self) -> [&str; 4] {
        [&self.root, &self.level1, &self.level2, &self.level3]
    }

    /// Check every entry parses as a hex colour.
    pub fn validate(&self) -> Result<(), ColorError> {
        const NAMES: [&str; 4] = ["root", "level1", "level2", "level3"];
        for (stage, value) in NAMES.into_iter().zip(self.stages()) {
            parse_hex(value).ok_or_else(|| ColorError {
                stage,
                value: value.to_string(),
            })?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` (or `rrggbb`) into an egui colour.
pub fn parse_hex(value: &str) -> Option<Color32> {
    let rgb = Srgb::<u8>::from_str(value.trim()).ok()?;
    Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

/// Node colour for a hex string, grey when it does not parse.
pub fn node_color(value: &str) -> Color32 {
    parse_hex(value).unwrap_or_else(|| {
        log::warn!("Unparsable node colour '{value}', using grey");
        Color32::GRAY
    })
}

/// Link colour: the source node's colour lightened in HSL space and made
/// translucent so overlapping bands stay readable.
pub fn link_color(node: Color32, alpha: u8) -> Color32 {
    let rgb = Srgb::new(node.r(), node.g(), node.b()).into_format::<f32>();
    let hsl: Hsl = rgb.into_color();
    let light: Srgb = hsl.lighten(0.35).into_color();
    let light = light.into_format::<u8>();
    Color32::from_rgba_unmultiplied(light.red, light.green, light.blue, alpha)
}
