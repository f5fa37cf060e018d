//! Seams for the presentation layer.
//!
//! The core never plays sounds, loads images or opens dialogs. It hands
//! [`SessionEvent`]s to an [`EventSink`] and asks an [`AssetResolver`] for
//! whatever a variant's pieces should look like.

use crate::types::{PieceId, PuzzleVariant, SessionEvent};

/// Receives session notifications.
pub trait EventSink {
    fn notify(&mut self, event: SessionEvent);
}

impl EventSink for Vec<SessionEvent> {
    fn notify(&mut self, event: SessionEvent) {
        self.push(event);
    }
}

/// Provides piece visuals for a puzzle variant.
pub trait AssetResolver {
    type Visual;

    /// Visual for the whole picture.
    fn picture(&self, variant: PuzzleVariant) -> Self::Visual;

    /// Visual for a single piece.
    fn piece(&self, variant: PuzzleVariant, piece: PieceId) -> Self::Visual;
}

/// Resolves variants to the image and frame-mask paths the web build ships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    pub root: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            root: "static/images".to_string(),
        }
    }
}

impl AssetPaths {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    /// Outline mask drawn behind the frame.
    pub fn frame_mask(&self, variant: PuzzleVariant) -> String {
        format!("{}/{}.svg", self.root, variant.as_str())
    }
}

impl AssetResolver for AssetPaths {
    type Visual = String;

    fn picture(&self, variant: PuzzleVariant) -> String {
        format!("{}/{}_puzzle.png", self.root, variant.as_str())
    }

    /// Pieces are crops of the full picture, so every piece shares its path.
    fn piece(&self, variant: PuzzleVariant, _piece: PieceId) -> String {
        self.picture(variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_collects_in_order() {
        let mut sink: Vec<SessionEvent> = Vec::new();
        sink.notify(SessionEvent::BatchArrived {
            batch: 0,
            released: 4,
        });
        sink.notify(SessionEvent::PieceSnapped {
            piece: PieceId::new(0, 0),
        });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].name(), "pieceSnapped");
    }

    #[test]
    fn asset_paths_per_variant() {
        let assets = AssetPaths::default();
        assert_eq!(
            assets.picture(PuzzleVariant::Animal),
            "static/images/animal_puzzle.png"
        );
        assert_eq!(
            assets.frame_mask(PuzzleVariant::Furniture),
            "static/images/furniture.svg"
        );
        assert_eq!(
            assets.piece(PuzzleVariant::Face, PieceId::new(1, 2)),
            "static/images/face_puzzle.png"
        );
    }
}
