//! Animation clips

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use super::track::KeyframeTrack;
use crate::error::{AnimationError, Result};
use crate::skeleton::BoneHierarchy;

/// Tick rate applied when the source data has no rate or a rate of zero
pub const DEFAULT_TICKS_PER_SECOND: f64 = 25.0;

/// An immutable animation clip bound to a bone hierarchy
///
/// Clips are shared between evaluators through `Arc` and never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct Animation {
    name: String,
    /// Length in ticks
    duration: f64,
    ticks_per_second: f64,
    tick_rate_defaulted: bool,
    hierarchy: Arc<BoneHierarchy>,
    tracks: HashMap<String, KeyframeTrack>,
}

impl Animation {
    pub fn builder(name: impl Into<String>, hierarchy: Arc<BoneHierarchy>) -> AnimationBuilder {
        AnimationBuilder::new(name, hierarchy)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length in ticks
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn ticks_per_second(&self) -> f64 {
        self.ticks_per_second
    }

    /// Whether the fallback tick rate replaced a missing source rate
    pub fn tick_rate_was_defaulted(&self) -> bool {
        self.tick_rate_defaulted
    }

    /// Length in seconds
    pub fn duration_secs(&self) -> f64 {
        self.duration / self.ticks_per_second
    }

    pub fn hierarchy(&self) -> &BoneHierarchy {
        &self.hierarchy
    }

    pub fn shared_hierarchy(&self) -> Arc<BoneHierarchy> {
        Arc::clone(&self.hierarchy)
    }

    /// Track of the named bone, None for bones that keep their bind transform
    pub fn track(&self, bone_name: &str) -> Option<&KeyframeTrack> {
        self.tracks.get(bone_name)
    }

    pub fn tracks(&self) -> impl Iterator<Item = (&str, &KeyframeTrack)> {
        self.tracks.iter().map(|(name, track)| (name.as_str(), track))
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

/// Builder validating clip data before an [`Animation`] is created
#[derive(Debug)]
pub struct AnimationBuilder {
    name: String,
    hierarchy: Arc<BoneHierarchy>,
    duration: Option<f64>,
    ticks_per_second: Option<f64>,
    fallback_ticks_per_second: f64,
    tracks: HashMap<String, KeyframeTrack>,
    duplicate_tracks: Vec<String>,
}

impl AnimationBuilder {
    pub fn new(name: impl Into<String>, hierarchy: Arc<BoneHierarchy>) -> Self {
        Self {
            name: name.into(),
            hierarchy,
            duration: None,
            ticks_per_second: None,
            fallback_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            tracks: HashMap::new(),
            duplicate_tracks: Vec::new(),
        }
    }

    /// Length in ticks
    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Source tick rate; None or zero selects the fallback
    pub fn ticks_per_second(mut self, ticks_per_second: Option<f64>) -> Self {
        self.ticks_per_second = ticks_per_second;
        self
    }

    pub fn fallback_ticks_per_second(mut self, fallback: f64) -> Self {
        self.fallback_ticks_per_second = fallback;
        self
    }

    pub fn track(mut self, bone_name: impl Into<String>, track: KeyframeTrack) -> Self {
        let bone_name = bone_name.into();
        if self.tracks.contains_key(&bone_name) {
            self.duplicate_tracks.push(bone_name.clone());
        }
        self.tracks.insert(bone_name, track);
        self
    }

    pub fn build(self) -> Result<Animation> {
        let malformed =
            |reason: String| AnimationError::malformed(format!("clip '{}': {reason}", self.name));

        let duration = self
            .duration
            .ok_or_else(|| malformed("duration is missing".to_string()))?;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(malformed(format!(
                "duration must be finite and positive, got {duration}"
            )));
        }

        if !self.fallback_ticks_per_second.is_finite() || self.fallback_ticks_per_second <= 0.0 {
            return Err(malformed(format!(
                "fallback tick rate must be finite and positive, got {}",
                self.fallback_ticks_per_second
            )));
        }

        let (ticks_per_second, tick_rate_defaulted) = match self.ticks_per_second {
            None => (self.fallback_ticks_per_second, true),
            Some(rate) if rate == 0.0 => (self.fallback_ticks_per_second, true),
            Some(rate) if rate.is_finite() && rate > 0.0 => (rate, false),
            Some(rate) => {
                return Err(malformed(format!(
                    "ticks per second must be finite and positive, got {rate}"
                )));
            }
        };
        if tick_rate_defaulted {
            debug!(
                "Clip '{}' has no tick rate, using {} ticks per second",
                self.name, ticks_per_second
            );
        }

        if self.tracks.is_empty() {
            return Err(malformed("no channels".to_string()));
        }
        if let Some(name) = self.duplicate_tracks.first() {
            return Err(malformed(format!("bone '{name}' has more than one channel")));
        }

        let mut unresolved: Vec<&str> = self
            .tracks
            .keys()
            .filter(|name| !self.hierarchy.contains(name))
            .map(String::as_str)
            .collect();
        if !unresolved.is_empty() {
            unresolved.sort_unstable();
            return Err(malformed(format!(
                "channels reference unknown nodes: {}",
                unresolved.join(", ")
            )));
        }

        for (bone, track) in &self.tracks {
            if track.last_key_time() > duration {
                warn!(
                    "Clip '{}': keys of '{}' extend past the clip duration {}",
                    self.name, bone, duration
                );
            }
        }

        Ok(Animation {
            name: self.name,
            duration,
            ticks_per_second,
            tick_rate_defaulted,
            hierarchy: self.hierarchy,
            tracks: self.tracks,
        })
    }
}
