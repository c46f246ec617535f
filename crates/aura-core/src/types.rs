use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Visual attribute inferred from an image. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Body,
    Face,
    Skin,
}

const BODY_LABELS: &[&str] = &[
    "hourglass",
    "rectangle",
    "pear",
    "apple",
    "inverted-triangle",
    "trapezoid",
    "triangle",
    "oval",
];

const FACE_LABELS: &[&str] = &[
    "oval", "round", "square", "heart", "diamond", "rectangle", "triangle",
];

const SKIN_LABELS: &[&str] = &["very-fair", "fair", "medium", "olive", "brown", "deep"];

impl AttributeKind {
    pub const ALL: [AttributeKind; 3] = [AttributeKind::Body, AttributeKind::Face, AttributeKind::Skin];

    /// Stable slot index, used for per-kind arrays.
    pub const fn index(self) -> usize {
        match self {
            AttributeKind::Body => 0,
            AttributeKind::Face => 1,
            AttributeKind::Skin => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            AttributeKind::Body => "body",
            AttributeKind::Face => "face",
            AttributeKind::Skin => "skin",
        }
    }

    /// Closed label vocabulary for this kind.
    ///
    /// The order is also the output order expected from a trained model:
    /// score `i` of a model's output belongs to `vocabulary()[i]`.
    pub const fn vocabulary(self) -> &'static [&'static str] {
        match self {
            AttributeKind::Body => BODY_LABELS,
            AttributeKind::Face => FACE_LABELS,
            AttributeKind::Skin => SKIN_LABELS,
        }
    }

    /// Label returned when the input image cannot be used at all.
    pub const fn default_label(self) -> &'static str {
        match self {
            AttributeKind::Body => "rectangle",
            AttributeKind::Face => "oval",
            AttributeKind::Skin => "medium",
        }
    }

    /// File name of this kind's model artifact inside the model directory.
    pub const fn artifact_name(self) -> &'static str {
        match self {
            AttributeKind::Body => "body_shape.onnx",
            AttributeKind::Face => "face_shape.onnx",
            AttributeKind::Skin => "skin_tone.onnx",
        }
    }

    pub fn is_label(self, label: &str) -> bool {
        self.vocabulary().contains(&label)
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "body" => Ok(AttributeKind::Body),
            "face" => Ok(AttributeKind::Face),
            "skin" => Ok(AttributeKind::Skin),
            other => Err(format!("unknown attribute kind: {other} (expected body, face or skin)")),
        }
    }
}

/// Inclusive confidence interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceBand {
    pub min: f32,
    pub max: f32,
}

impl ConfidenceBand {
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Map `t` in [0, 1] linearly into the band. Out-of-range and NaN inputs are clamped.
    pub fn lerp(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        (self.min + (self.max - self.min) * t).clamp(self.min, self.max)
    }

    pub fn overlaps(&self, other: &ConfidenceBand) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

/// Confidence range for heuristic results: plausible but uncertain.
pub const FALLBACK_BAND: ConfidenceBand = ConfidenceBand { min: 0.55, max: 0.85 };

/// Confidence range for model-backed results. Disjoint from [`FALLBACK_BAND`].
pub const MODEL_BAND: ConfidenceBand = ConfidenceBand { min: 0.86, max: 1.0 };

impl AttributeKind {
    pub const fn fallback_band(self) -> ConfidenceBand {
        FALLBACK_BAND
    }

    pub const fn model_band(self) -> ConfidenceBand {
        MODEL_BAND
    }
}

/// Subject gender hint. Shifts body-shape priors and filters products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Female,
    Male,
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "female" | "f" => Ok(Gender::Female),
            "male" | "m" => Ok(Gender::Male),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// Skin undertone reported alongside a skin-tone label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Undertone {
    Cool,
    Neutral,
    Warm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Optional per-kind extras. Additive to the required result fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undertone: Option<Undertone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rgb: Option<Rgb>,
}

/// Normalized outcome of analyzing one attribute, whichever path produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeResult {
    pub kind: AttributeKind,
    pub label: String,
    pub confidence: f32,
    /// True when no trained model was consulted for this result.
    pub using_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<AttributeDetails>,
}

impl AttributeResult {
    /// Heuristic result. Confidence is clamped into the fallback band.
    pub fn fallback(kind: AttributeKind, label: &str, confidence: f32) -> Self {
        let band = kind.fallback_band();
        Self {
            kind,
            label: label.to_string(),
            confidence: confidence.clamp(band.min, band.max),
            using_fallback: true,
            details: None,
        }
    }

    /// Model-backed result from the top label's probability `p`.
    pub fn model_backed(kind: AttributeKind, label: &str, p: f32) -> Self {
        Self {
            kind,
            label: label.to_string(),
            confidence: kind.model_band().lerp(p),
            using_fallback: false,
            details: None,
        }
    }

    /// Kind-appropriate default for unusable input: lowest fallback confidence.
    pub fn degraded(kind: AttributeKind) -> Self {
        Self::fallback(kind, kind.default_label(), kind.fallback_band().min)
    }

    pub fn with_details(mut self, details: AttributeDetails) -> Self {
        self.details = Some(details);
        self
    }
}
