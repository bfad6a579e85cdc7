//! Gesture classification from a single hand frame.
//!
//! Each non-thumb finger is reduced to its vertical distance from the wrist
//! and bucketed into curled, extended or in-between. The bucket pattern is
//! matched against an ordered rule table; the first matching row wins and
//! anything unmatched is [`GestureLabel::None`].
//!
//! An open palm and five spread fingers share the same pattern. The palm row
//! comes first, so the classifier never yields [`GestureLabel::FiveFingers`];
//! that label only reaches the game through direct input.

use serde::{Deserialize, Serialize};

use super::landmarks::{HandFrame, FINGER_TIPS};

/// A finger closer to the wrist than this counts as curled.
pub const CURLED_MAX: f32 = 0.1;
/// A finger further from the wrist than this counts as extended.
pub const EXTENDED_MIN: f32 = 0.2;

/// Discrete gesture vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    #[default]
    None,
    Fist,
    Palm,
    OneFinger,
    TwoFingers,
    ThreeFingers,
    FiveFingers,
}

impl GestureLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fist => "fist",
            Self::Palm => "palm",
            Self::OneFinger => "one-finger",
            Self::TwoFingers => "two-fingers",
            Self::ThreeFingers => "three-fingers",
            Self::FiveFingers => "five-fingers",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::None => "-",
            Self::Fist => "✊",
            Self::Palm => "✋",
            Self::OneFinger => "☝",
            Self::TwoFingers => "✌",
            Self::ThreeFingers => "🤟",
            Self::FiveFingers => "🖐",
        }
    }

    /// What the gesture does in the arena.
    pub fn action(&self) -> &'static str {
        match self {
            Self::None => "nothing",
            Self::Fist => "attack",
            Self::Palm => "defend",
            Self::OneFinger => "move up",
            Self::TwoFingers => "move right",
            Self::ThreeFingers => "move left",
            Self::FiveFingers => "move down",
        }
    }
}

impl std::fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.glyph(), self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finger {
    Curled,
    Extended,
    Between,
}

impl Finger {
    fn from_extent(extent: f32) -> Self {
        if extent < CURLED_MAX {
            Self::Curled
        } else if extent > EXTENDED_MIN {
            Self::Extended
        } else {
            Self::Between
        }
    }
}

use Finger::{Curled as C, Extended as E};

/// Ordered by priority: index, middle, ring, pinky.
const RULES: [([Finger; 4], GestureLabel); 6] = [
    ([C, C, C, C], GestureLabel::Fist),
    ([E, E, E, E], GestureLabel::Palm),
    ([E, C, C, C], GestureLabel::OneFinger),
    ([E, E, C, C], GestureLabel::TwoFingers),
    ([E, E, E, C], GestureLabel::ThreeFingers),
    ([E, E, E, E], GestureLabel::FiveFingers),
];

/// Vertical fingertip-to-wrist distances, index first.
pub fn finger_extents(frame: &HandFrame) -> [f32; 4] {
    let wrist = frame.wrist();
    FINGER_TIPS.map(|tip| (frame.landmarks()[tip].y - wrist.y).abs())
}

pub fn classify(frame: &HandFrame) -> GestureLabel {
    let fingers = finger_extents(frame).map(Finger::from_extent);
    RULES
        .iter()
        .find(|(pattern, _)| *pattern == fingers)
        .map(|(_, label)| *label)
        .unwrap_or(GestureLabel::None)
}

/// A representative pose for each gesture the classifier can produce.
pub fn canonical_extents(label: GestureLabel) -> Option<[f32; 4]> {
    match label {
        GestureLabel::Fist => Some([0.05, 0.04, 0.04, 0.03]),
        GestureLabel::Palm => Some([0.35, 0.4, 0.35, 0.28]),
        GestureLabel::OneFinger => Some([0.35, 0.05, 0.04, 0.03]),
        GestureLabel::TwoFingers => Some([0.35, 0.4, 0.04, 0.03]),
        GestureLabel::ThreeFingers => Some([0.35, 0.4, 0.35, 0.03]),
        GestureLabel::None | GestureLabel::FiveFingers => None,
    }
}
