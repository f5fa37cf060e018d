//! Terminal stand-in for piece images.
//!
//! There are no bitmaps in a terminal, so each variant gets a palette and a
//! fill character, and every piece a shade from that palette picked by its
//! position in the picture. Neighbouring pieces always differ, which is what
//! makes a placed piece readable as "in the right spot".

use crate::core::AssetResolver;
use crate::fb::{CellStyle, Rgb};
use crate::types::{PieceId, PuzzleVariant};

/// How to draw one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceGlyph {
    pub fill: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl PieceGlyph {
    pub fn style(&self) -> CellStyle {
        CellStyle::new(self.fg, self.bg)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphResolver;

impl GlyphResolver {
    fn palette(variant: PuzzleVariant) -> [Rgb; 4] {
        match variant {
            PuzzleVariant::Face => [
                Rgb::new(241, 194, 125),
                Rgb::new(224, 172, 105),
                Rgb::new(198, 134, 66),
                Rgb::new(141, 85, 36),
            ],
            PuzzleVariant::Animal => [
                Rgb::new(250, 160, 60),
                Rgb::new(230, 130, 40),
                Rgb::new(120, 80, 50),
                Rgb::new(250, 230, 200),
            ],
            PuzzleVariant::Furniture => [
                Rgb::new(160, 110, 70),
                Rgb::new(130, 85, 50),
                Rgb::new(190, 150, 100),
                Rgb::new(100, 140, 170),
            ],
        }
    }

    fn fill(variant: PuzzleVariant) -> char {
        match variant {
            PuzzleVariant::Face => '▓',
            PuzzleVariant::Animal => '▒',
            PuzzleVariant::Furniture => '█',
        }
    }
}

impl AssetResolver for GlyphResolver {
    type Visual = PieceGlyph;

    fn picture(&self, variant: PuzzleVariant) -> PieceGlyph {
        let palette = Self::palette(variant);
        PieceGlyph {
            fill: Self::fill(variant),
            fg: palette[0],
            bg: palette[0].darken(70),
        }
    }

    fn piece(&self, variant: PuzzleVariant, piece: PieceId) -> PieceGlyph {
        let palette = Self::palette(variant);
        // 2x2 tiling of the palette: horizontal and vertical neighbours never match.
        let shade = ((piece.row % 2) * 2 + (piece.col % 2)) as usize;
        let fg = palette[shade];
        PieceGlyph {
            fill: Self::fill(variant),
            fg,
            bg: fg.darken(60),
        }
    }
}
