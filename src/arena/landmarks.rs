//! Hand landmark frames as delivered by an external detector.
//!
//! A frame is exactly [`LANDMARK_COUNT`] normalized points in image space,
//! indexed positionally the way MediaPipe Hands reports them. Anything that
//! does not meet that shape is rejected when the frame is built, so the
//! classifier never sees a short or corrupt frame.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

/// Fingertips of the four non-thumb fingers, index first.
pub const FINGER_TIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Normalized 2D point, both coordinates in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One detected hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl HandFrame {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }

    pub fn wrist(&self) -> Landmark {
        self.landmarks[WRIST]
    }

    /// Builds a hand whose four fingertips sit the given vertical distances
    /// above the wrist (index, middle, ring, pinky). Every other joint rests
    /// on the wrist. Used by the keyboard pose simulator and by tests.
    pub fn from_finger_extents(extents: [f32; 4]) -> Self {
        let wrist = Landmark::new(0.5, 0.9);
        let mut landmarks = [wrist; LANDMARK_COUNT];
        for (tip, extent) in FINGER_TIPS.iter().zip(extents) {
            landmarks[*tip] = Landmark::new(wrist.x, wrist.y - extent);
        }
        landmarks[THUMB_TIP] = Landmark::new(wrist.x - 0.1, wrist.y - 0.05);
        Self { landmarks }
    }
}

impl TryFrom<Vec<Landmark>> for HandFrame {
    type Error = anyhow::Error;

    fn try_from(points: Vec<Landmark>) -> Result<Self> {
        ensure!(
            points.len() == LANDMARK_COUNT,
            "hand frame needs exactly {} landmarks, got {}",
            LANDMARK_COUNT,
            points.len()
        );
        if let Some(index) = points.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
            anyhow::bail!("landmark {} has a non-finite coordinate", index);
        }

        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        landmarks.copy_from_slice(&points);
        Ok(Self { landmarks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_frames() {
        let err = HandFrame::try_from(vec![Landmark::default(); 20]).unwrap_err();
        assert!(err.to_string().contains("exactly 21"), "{err}");
    }

    #[test]
    fn rejects_non_finite_points() {
        let mut points = vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        points[7].y = f32::NAN;
        assert!(HandFrame::try_from(points).is_err());
    }

    #[test]
    fn keeps_positional_order() {
        let points: Vec<_> = (0..LANDMARK_COUNT)
            .map(|i| Landmark::new(i as f32 / 100.0, 0.5))
            .collect();
        let frame = HandFrame::try_from(points).unwrap();
        assert_eq!(frame.landmarks()[INDEX_TIP].x, 0.08);
        assert_eq!(frame.wrist().x, 0.0);
    }

    #[test]
    fn finger_extents_are_measured_from_the_wrist() {
        let frame = HandFrame::from_finger_extents([0.3, 0.05, 0.25, 0.0]);
        let wrist = frame.wrist();
        let extent = |tip: usize| (frame.landmarks()[tip].y - wrist.y).abs();
        assert!((extent(INDEX_TIP) - 0.3).abs() < 1e-6);
        assert!((extent(MIDDLE_TIP) - 0.05).abs() < 1e-6);
        assert!((extent(RING_TIP) - 0.25).abs() < 1e-6);
        assert_eq!(extent(PINKY_TIP), 0.0);
    }
}
