//! Animation and cue track section encoders.

use crate::container::SectionBuffer;
use crate::scene::{sort_cues, Action, AnimationData, CueEvent};
use crate::util::Result;

use super::NAME_LEN;

/// Encode all animation clips plus the action table.
///
/// Layout: `animation_count:u32`, per animation `{name128, duration:f32,
/// bone_count:u32}` followed by per-bone tracks `{bone_name128,
/// key_count:u32, keys{time, position:3f32, rotation:4f32 (w,x,y,z),
/// scale:3f32}}`; then `action_count:u32` and per action `{name128,
/// animation_name128, blended:u8, reserved:u8, track:u32}`.
///
/// Keys are written exactly as authored: the key count and times are what
/// the host supplied, never resampled. The action list must already be
/// filtered to animations actually present; the assembler owns that rule.
pub fn encode_animations(
    animations: &[AnimationData],
    actions: &[Action],
    buf: &mut SectionBuffer,
) -> Result<()> {
    buf.write_u32(animations.len() as u32);
    for animation in animations {
        animation.validate()?;
        buf.write_fixed_str(&animation.name, NAME_LEN);
        buf.write_f32(animation.duration);
        buf.write_u32(animation.tracks.len() as u32);
        for track in &animation.tracks {
            buf.write_fixed_str(&track.bone, NAME_LEN);
            buf.write_u32(track.keys.len() as u32);
            for key in &track.keys {
                buf.write_f32(key.time);
                buf.write_vec3(key.position);
                buf.write_quat(key.rotation);
                buf.write_vec3(key.scale);
            }
        }
    }

    buf.write_u32(actions.len() as u32);
    for action in actions {
        buf.write_fixed_str(&action.name, NAME_LEN);
        buf.write_fixed_str(&action.animation, NAME_LEN);
        buf.write_u8(action.blended as u8);
        buf.write_u8(0);
        buf.write_u32(action.track);
    }
    Ok(())
}

/// Encode the cue track, events sorted by time, ties stable in authoring
/// order.
///
/// Layout: `event_count:u32`, then `{time:f32, label:cstr, parameter:cstr}`.
pub fn encode_cue_track(events: &[CueEvent], buf: &mut SectionBuffer) -> Result<()> {
    let mut ordered = events.to_vec();
    sort_cues(&mut ordered);

    buf.write_u32(ordered.len() as u32);
    for event in &ordered {
        buf.write_f32(event.time);
        buf.write_cstr(&event.label);
        buf.write_cstr(&event.parameter);
    }
    Ok(())
}
