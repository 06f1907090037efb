//! Shared data types
//!
//! Types used by both the tracing engine and the assessment engine: canvas
//! points, the four support tiers, and per-tier tolerance settings.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A position in either path space or canvas space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation towards `other` at parameter `t` in [0, 1]
    pub fn lerp(&self, other: Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn scaled(&self, factor: f64) -> Point {
        Point {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Point::new(p.x, p.y)
    }
}

/// Support tier assigned from the assessment.
///
/// Variants are declared from highest support to least support, so the
/// derived ordering follows the learning journey.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    Profound,
    Severe,
    Moderate,
    Mild,
}

impl DifficultyTier {
    /// All tiers, highest support first
    pub const ALL: [DifficultyTier; 4] = [
        DifficultyTier::Profound,
        DifficultyTier::Severe,
        DifficultyTier::Moderate,
        DifficultyTier::Mild,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyTier::Profound => "Profound",
            DifficultyTier::Severe => "Severe",
            DifficultyTier::Moderate => "Moderate",
            DifficultyTier::Mild => "Mild",
        }
    }

    /// Guide width and tolerance used by the tracing activity
    pub fn tolerance(&self) -> ToleranceSettings {
        match self {
            DifficultyTier::Mild => ToleranceSettings::new(25.0, 30.0),
            DifficultyTier::Moderate => ToleranceSettings::new(35.0, 40.0),
            DifficultyTier::Severe => ToleranceSettings::new(50.0, 60.0),
            DifficultyTier::Profound => ToleranceSettings::new(70.0, 80.0),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DifficultyTier::Mild => "Standard guides. Gentle correction.",
            DifficultyTier::Moderate => "Thicker guides to help stay on track.",
            DifficultyTier::Severe => "Very thick guides. High error tolerance.",
            DifficultyTier::Profound => "Maximum visual guidance. Focus on movement.",
        }
    }

    /// How long the memory activity keeps a sequence on screen
    pub fn memory_display_time(&self) -> Duration {
        let ms = match self {
            DifficultyTier::Mild => 2000,
            DifficultyTier::Moderate => 3000,
            DifficultyTier::Severe => 4000,
            DifficultyTier::Profound => 5000,
        };
        Duration::from_millis(ms)
    }

    /// Position on the learning journey (0 = highest support)
    pub fn journey_index(&self) -> usize {
        match self {
            DifficultyTier::Profound => 0,
            DifficultyTier::Severe => 1,
            DifficultyTier::Moderate => 2,
            DifficultyTier::Mild => 3,
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DifficultyTier {
    type Err = EngineError;

    /// Case-insensitive tier name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DifficultyTier::ALL
            .into_iter()
            .find(|tier| tier.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EngineError::ConfigError(format!("unknown tier: {s}")))
    }
}

/// Guide stroke width and extra tolerance, both in path units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceSettings {
    pub stroke_width: f64,
    pub tolerance_radius: f64,
}

impl ToleranceSettings {
    pub const fn new(stroke_width: f64, tolerance_radius: f64) -> Self {
        Self {
            stroke_width,
            tolerance_radius,
        }
    }

    /// Radius of the valid corridor around each checkpoint.
    ///
    /// `corridor_factor` tightens the nominal guide so drift is penalized
    /// before the drawn guide visually clips.
    pub fn corridor_radius(&self, corridor_factor: f64) -> f64 {
        (self.stroke_width / 2.0 + self.tolerance_radius) * corridor_factor
    }
}
