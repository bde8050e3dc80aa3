//! Named color palettes and hex color handling.

#[cfg(test)]
#[path = "palette_test.rs"]
mod palette_test;

use serde::{Deserialize, Serialize};

/// A named, ordered list of `#RRGGBB` colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub name: String,
    pub colors: Vec<String>,
}

/// All palettes offered to the user, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaletteBook {
    palettes: Vec<Palette>,
}

impl Default for PaletteBook {
    fn default() -> Self {
        let palette = |name: &str, colors: [&str; 5]| Palette {
            name: name.to_string(),
            colors: colors.iter().map(ToString::to_string).collect(),
        };
        Self {
            palettes: vec![
                palette("Basic", ["#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF"]),
                palette("Pastel", ["#FFB3BA", "#BAFFC9", "#BAE1FF", "#FFFFBA", "#FFB3FF"]),
                palette("Earth", ["#4B371C", "#7A542E", "#8B7355", "#A67B5B", "#C4A484"]),
                palette("Ocean", ["#00204A", "#005792", "#00BBF0", "#00B2CA", "#89CFF0"]),
            ],
        }
    }
}

impl PaletteBook {
    /// Build a book from palettes, dropping colors that are not valid hex and
    /// palettes left with no colors.
    #[must_use]
    pub fn new(palettes: Vec<Palette>) -> Self {
        let palettes = palettes
            .into_iter()
            .map(|p| Palette { colors: p.colors.iter().filter_map(|c| normalize_hex(c)).collect(), name: p.name })
            .filter(|p| !p.colors.is_empty())
            .collect();
        Self { palettes }
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.palettes.iter().map(|p| p.name.as_str()).collect()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Palette> {
        self.palettes.iter().find(|p| p.name == name)
    }

    /// Color at `index` in the named palette.
    #[must_use]
    pub fn color(&self, name: &str, index: usize) -> Option<&str> {
        self.get(name)?.colors.get(index).map(String::as_str)
    }

    /// True when no palette survived color validation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }
}

/// Normalize `#rgb`/`#rrggbb` (case-insensitive) to uppercase `#RRGGBB`.
#[must_use]
pub fn normalize_hex(raw: &str) -> Option<String> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some(format!("#{}", hex.to_ascii_uppercase())),
        3 => {
            let doubled: String = hex.chars().flat_map(|c| [c, c]).collect();
            Some(format!("#{}", doubled.to_ascii_uppercase()))
        }
        _ => None,
    }
}
