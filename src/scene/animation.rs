//! Animation clips, cue tracks and actions.

use glam::{Quat, Vec3};

use crate::util::{Error, Result};

/// One authored keyframe. Times are seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// Sparse, time-ordered keyframe track for one bone. Keys are written
/// exactly as authored, never resampled.
#[derive(Clone, Debug)]
pub struct BoneTrack {
    pub bone: String,
    pub keys: Vec<Keyframe>,
}

impl BoneTrack {
    /// Keys must be in non-decreasing time order.
    pub fn validate(&self) -> Result<()> {
        for pair in self.keys.windows(2) {
            if pair[1].time < pair[0].time {
                return Err(Error::encoding(format!(
                    "track '{}' has non-monotonic key times ({} after {})",
                    self.bone, pair[1].time, pair[0].time
                )));
            }
        }
        Ok(())
    }
}

/// One named animation clip.
#[derive(Clone, Debug)]
pub struct AnimationData {
    pub name: String,
    /// Clip length in seconds.
    pub duration: f32,
    pub tracks: Vec<BoneTrack>,
}

impl AnimationData {
    pub fn validate(&self) -> Result<()> {
        for track in &self.tracks {
            track.validate()?;
        }
        Ok(())
    }
}

/// Event marker on the cue track.
#[derive(Clone, Debug, PartialEq)]
pub struct CueEvent {
    pub time: f32,
    pub label: String,
    pub parameter: String,
}

/// Sort cue events by time ascending; ties keep authoring order.
pub fn sort_cues(events: &mut Vec<CueEvent>) {
    events.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));
}

/// Named reference to an animation, with playback metadata. Only valid if
/// the referenced animation is among those actually encoded.
#[derive(Clone, Debug)]
pub struct Action {
    pub name: String,
    pub animation: String,
    pub blended: bool,
    pub track: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_rejects_time_regression() {
        let track = BoneTrack {
            bone: "Root".into(),
            keys: vec![
                Keyframe { time: 0.5, position: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE },
                Keyframe { time: 0.2, position: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE },
            ],
        };
        assert!(track.validate().is_err());
    }

    #[test]
    fn test_sort_cues_stable_on_ties() {
        let mut events = vec![
            CueEvent { time: 1.0, label: "b".into(), parameter: String::new() },
            CueEvent { time: 0.0, label: "a".into(), parameter: String::new() },
            CueEvent { time: 1.0, label: "c".into(), parameter: String::new() },
        ];
        sort_cues(&mut events);
        let labels: Vec<&str> = events.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["a", "b", "c"]);
    }
}
