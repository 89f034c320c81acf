//! Face detection results

use serde::{Deserialize, Serialize};

/// Bounding box of one detected face, in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl FaceRegion {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            score: None,
        }
    }
}

/// All faces found by one poll. Empty means "no face".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectionResult {
    regions: Vec<FaceRegion>,
}

impl DetectionResult {
    pub fn new(regions: Vec<FaceRegion>) -> Self {
        Self { regions }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn regions(&self) -> &[FaceRegion] {
        &self.regions
    }
}

impl FromIterator<FaceRegion> for DetectionResult {
    fn from_iter<I: IntoIterator<Item = FaceRegion>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for DetectionResult {
    type Item = FaceRegion;
    type IntoIter = std::vec::IntoIter<FaceRegion>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.into_iter()
    }
}
