//! Segment-Vector Bridge: converts a segment into its prototype vector and
//! blends it with the preference-derived vector based on confidence.
//!
//! The confidence -> preference-weight mapping is a deliberate step function
//! (dead zones, not continuous):
//!
//! confidence >= 0.9 -> 0.9 preference weight
//! confidence >= 0.7 -> 0.8
//! confidence >= 0.5 -> 0.6
//! confidence >= 0.3 -> 0.4
//! else             -> 0.2

use super::catalog::profile_for;
use super::{Result, SegmentError};
use crate::models::{FeatureVector, SegmentId};

pub struct SegmentBridge;

impl Default for SegmentBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentBridge {
    pub fn new() -> Self {
        Self
    }

    /// Prototype vector of a segment, verbatim from the catalog. Total over
    /// the enum.
    pub fn prototype_vector(&self, segment: SegmentId) -> FeatureVector {
        profile_for(segment).prototype
    }

    /// Resolve a stored segment identifier. A miss indicates catalog/version
    /// skew and is fatal to the calling operation.
    pub fn resolve_segment(&self, raw: &str) -> Result<SegmentId> {
        SegmentId::parse_str(raw).ok_or_else(|| SegmentError::UnknownSegment(raw.to_string()))
    }

    /// Preference-side blending weight for a given confidence.
    pub fn preference_weight(&self, confidence: f32) -> f32 {
        if confidence >= 0.9 {
            0.9
        } else if confidence >= 0.7 {
            0.8
        } else if confidence >= 0.5 {
            0.6
        } else if confidence >= 0.3 {
            0.4
        } else {
            0.2
        }
    }

    /// Blend a preference vector with a segment prototype. Returns the
    /// blended vector and the preference weight that was applied.
    pub fn blend(
        &self,
        preference: &FeatureVector,
        segment: SegmentId,
        confidence: f32,
    ) -> (FeatureVector, f32) {
        let weight = self.preference_weight(confidence);
        let prototype = self.prototype_vector(segment);
        (preference.blend(&prototype, weight), weight)
    }

    /// Drift correction: nudge an existing vector toward a segment prototype
    /// by `strength` in [0, 1]. Not used on the primary blend path.
    pub fn adjust_toward(
        &self,
        vector: &FeatureVector,
        segment: SegmentId,
        strength: f32,
    ) -> FeatureVector {
        vector.lerp_toward(&self.prototype_vector(segment), strength)
    }

    /// Confidence from profile completeness (fraction in [0, 1]) and the
    /// critical-fields flag (budget range, travel types, group types and
    /// activity level all present). Missing critical fields cap confidence
    /// at 0.4 regardless of completeness.
    pub fn confidence(&self, completeness: f32, critical_fields_present: bool) -> f32 {
        let base = (completeness * 0.95).clamp(0.2, 0.95);
        if critical_fields_present {
            base
        } else {
            base.min(0.4)
        }
    }
}
