//! Camera movements as keyframed player teleports
//!
//! The recording player is the camera. A movement over `[tick_start,
//! tick_end]` becomes `n + 1` teleports, where `n` is the span divided by
//! the keyframe spacing, clamped to `1..=max_keyframes`.

use crate::core::config::RenderConfig;
use crate::core::types::{Position, Tick};
use crate::render::actor::{facing_suffix, ActorRegistry};
use crate::render::script::RenderedCommand;
use crate::storyboard::CameraMovement;

/// The player entity that carries the camera
const CAMERA: &str = "@p";

/// Keyframe ticks with their progress through the movement, `0.0..=1.0`
fn keyframes(start: Tick, end: Tick, config: &RenderConfig) -> Vec<(Tick, f64)> {
    let span = end.saturating_sub(start);
    let spacing = config.keyframe_spacing.max(1);
    let n = (span / spacing).clamp(1, config.max_keyframes.max(1));
    // split the span so `span * i` cannot overflow
    let (step, rem) = (span / n, span % n);
    (0..=n)
        .map(|i| {
            let offset = step * i + rem * i / n;
            (start.saturating_add(offset), i as f64 / n as f64)
        })
        .collect()
}

/// Commands for one camera movement, ordered by tick
pub fn movement_commands(
    movement: &CameraMovement,
    registry: &ActorRegistry<'_>,
    config: &RenderConfig,
) -> Vec<RenderedCommand> {
    match movement {
        CameraMovement::Static {
            tick_start,
            position,
            facing,
            look_at,
            ..
        } => vec![RenderedCommand::new(
            *tick_start,
            format!(
                "tp {} {}{}",
                CAMERA,
                position.keyframe(),
                facing_suffix(look_at.as_deref(), facing.as_ref(), registry)
            ),
            format!("Camera: static at {}", position),
        )],

        CameraMovement::Pan {
            tick_start,
            tick_end,
            start_position,
            end_position,
            look_at,
        } => {
            let facing = facing_suffix(look_at.as_deref(), None, registry);
            let frames = keyframes(*tick_start, *tick_end, config);
            let total = frames.len();
            frames
                .into_iter()
                .enumerate()
                .map(|(i, (tick, t))| {
                    let pos = start_position.lerp(end_position, t);
                    RenderedCommand::new(
                        tick,
                        format!("tp {} {}{}", CAMERA, pos.keyframe(), facing),
                        format!("Camera: pan keyframe {}/{}", i + 1, total),
                    )
                })
                .collect()
        }

        CameraMovement::Orbit {
            tick_start,
            tick_end,
            center,
            radius,
            start_angle,
            end_angle,
            height,
        } => {
            let frames = keyframes(*tick_start, *tick_end, config);
            let total = frames.len();
            frames
                .into_iter()
                .enumerate()
                .map(|(i, (tick, t))| {
                    let angle = (start_angle + (end_angle - start_angle) * t).to_radians();
                    let pos = Position::new(
                        center.x() + radius * angle.cos(),
                        center.y() + height,
                        center.z() + radius * angle.sin(),
                    );
                    RenderedCommand::new(
                        tick,
                        format!(
                            "tp {} {} facing {}",
                            CAMERA,
                            pos.keyframe(),
                            center.keyframe()
                        ),
                        format!("Camera: orbit keyframe {}/{}", i + 1, total),
                    )
                })
                .collect()
        }

        CameraMovement::Follow {
            tick_start,
            tick_end,
            target,
            distance,
            height,
        } => {
            let sel = registry.selector(target);
            keyframes(*tick_start, *tick_end, config)
                .into_iter()
                .map(|(tick, _)| {
                    RenderedCommand::new(
                        tick,
                        format!(
                            "execute at {sel} run tp {} ~ ~{} ~{} facing entity {sel} eyes",
                            CAMERA,
                            height,
                            -distance,
                        ),
                        format!("Camera: follow {}", target),
                    )
                })
                .collect()
        }
    }
}
