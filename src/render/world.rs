//! World state commands: time, weather, structures and effects

use crate::render::script::RenderedCommand;
use crate::storyboard::{Effect, Setting, TimeOfDay, Weather};

fn time_command(time: TimeOfDay) -> &'static str {
    match time {
        TimeOfDay::Day => "time set day",
        TimeOfDay::Noon => "time set noon",
        TimeOfDay::Sunset => "time set 12000",
        TimeOfDay::Night => "time set night",
        TimeOfDay::Midnight => "time set midnight",
        TimeOfDay::Sunrise => "time set 23000",
    }
}

fn weather_command(weather: Weather) -> &'static str {
    match weather {
        Weather::Clear => "weather clear",
        Weather::Rain => "weather rain",
        Weather::Thunder => "weather thunder",
    }
}

/// `place` arguments for a world modification, if one matches
///
/// Single buildings are templates; whole villages and outposts are structures.
fn placement_for(modification: &str) -> Option<&'static str> {
    let lower = modification.to_lowercase();
    if lower.contains("castle") || lower.contains("tower") {
        Some("structure minecraft:pillager_outpost")
    } else if lower.contains("village") {
        Some("structure minecraft:village_plains")
    } else if lower.contains("house") {
        Some("template minecraft:village/plains/houses/plains_shepherds_house_1")
    } else {
        None
    }
}

/// Setting commands, all at the start of the scene
pub fn setting_commands(setting: &Setting) -> Vec<RenderedCommand> {
    let mut cmds = Vec::new();
    if let Some(time) = setting.time_of_day {
        cmds.push(RenderedCommand::new(
            0,
            time_command(time),
            format!("Set time to {:?}", time).to_lowercase(),
        ));
    }
    if let Some(weather) = setting.weather {
        cmds.push(RenderedCommand::new(
            0,
            weather_command(weather),
            format!("Set weather to {:?}", weather).to_lowercase(),
        ));
    }
    for modification in &setting.world_modifications {
        let cmd = match placement_for(modification) {
            Some(place) => RenderedCommand::new(
                0,
                format!("execute at @p run place {} ~ ~ ~", place),
                format!("Build {}", modification),
            ),
            // No structure to place; announce it so the builder can do it by hand
            None => RenderedCommand::new(
                0,
                format!("say [Agent] World Mod: {}", modification),
                format!("Announce {}", modification),
            ),
        };
        cmds.push(cmd);
    }
    cmds
}

fn particle_name(kind: &str) -> String {
    match kind.to_lowercase().as_str() {
        "explosion" => "explosion".into(),
        "smoke" => "smoke".into(),
        "fire" | "flame" => "flame".into(),
        "magic" | "enchant" => "enchant".into(),
        "portal" => "portal".into(),
        "heart" | "hearts" => "heart".into(),
        "cloud" => "cloud".into(),
        "dust" => "dust 1 0 0 1".into(),
        "growth" => "happy_villager".into(),
        other => other.to_string(),
    }
}

pub fn effect_commands(effect: &Effect) -> Vec<RenderedCommand> {
    match effect {
        Effect::Particles {
            tick,
            particle_type,
            position,
            count,
        } => vec![RenderedCommand::new(
            *tick,
            format!(
                "particle {} {} 1 1 1 0 {}",
                particle_name(particle_type),
                position,
                count
            ),
            format!("Particles: {}", particle_type),
        )],
        Effect::Sound {
            tick,
            sound,
            volume,
        } => vec![RenderedCommand::new(
            *tick,
            format!(
                "execute at @p run playsound {} master @a ~ ~ ~ {} 1",
                sound, volume
            ),
            format!("Sound: {}", sound),
        )],
    }
}
