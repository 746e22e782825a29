//! Actor commands: entity resolution, selectors, placement and animation hints

use ahash::AHashMap;

use crate::core::types::Position;
use crate::render::script::RenderedCommand;
use crate::storyboard::{ActorAction, ActorRef, LookTarget, Scene};

/// Titan mod entities by the names stories use for them
const TITANS: &[(&str, &str)] = &[
    ("titan", "titans:zombie_titan"),
    ("zombie_titan", "titans:zombie_titan"),
    ("creeper_titan", "titans:creeper_titan"),
    ("skeleton_titan", "titans:skeleton_titan"),
    ("spider_titan", "titans:spider_titan"),
    ("blaze_titan", "titans:blaze_titan"),
    ("ghast_titan", "titans:ghast_titan"),
    ("slime_titan", "titans:slime_titan"),
    ("ender_colossus", "titans:ender_colossus"),
    ("witherzilla", "titans:witherzilla"),
    ("ultima_iron_golem", "titans:ultima_iron_golem_titan"),
];

const TITAN_PREFIXES: &[&str] = &[
    "zombie", "creeper", "skeleton", "spider", "blaze", "ghast", "slime",
];

/// Names that refer to a kind of mob rather than a character
const GENERIC_NAMES: &[&str] = &[
    "zombie", "skeleton", "creeper", "cow", "sheep", "pig", "chicken", "villager", "horse",
];

const ENDER_DRAGON: &str = "minecraft:ender_dragon";

/// Every actor of a storyboard by id; the first declaration wins
pub struct ActorRegistry<'a> {
    by_id: AHashMap<&'a str, &'a ActorRef>,
}

impl<'a> ActorRegistry<'a> {
    pub fn from_scenes<I>(scenes: I) -> Self
    where
        I: IntoIterator<Item = &'a Scene>,
    {
        let mut by_id = AHashMap::new();
        for scene in scenes {
            for actor in &scene.actors {
                by_id.entry(actor.id.as_str()).or_insert(actor);
            }
        }
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a ActorRef> {
        self.by_id.get(id).copied()
    }

    /// Selector for an actor id, or for an entity named in free text
    pub fn selector(&self, reference: &str) -> String {
        match self.get(reference) {
            Some(actor) => selector(actor),
            None => selector_for_name(reference),
        }
    }
}

fn clean(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

fn resolve_titan(name: &str) -> Option<String> {
    if let Some((_, id)) = TITANS.iter().find(|(alias, _)| *alias == name) {
        return Some((*id).to_string());
    }
    if name.contains("titan") {
        let prefix = TITAN_PREFIXES
            .iter()
            .find(|p| name.contains(*p))
            .unwrap_or(&"zombie");
        return Some(format!("titans:{}_titan", prefix));
    }
    None
}

fn resolve_kind(kind: &str) -> String {
    if kind.contains(':') {
        kind.to_string()
    } else if let Some(titan) = resolve_titan(kind) {
        titan
    } else if kind.contains("dragon") {
        ENDER_DRAGON.to_string()
    } else {
        format!("minecraft:{}", kind)
    }
}

/// Namespaced entity id to summon for an actor
///
/// An explicit type wins; otherwise the name is read as a type.
pub fn entity_id(actor: &ActorRef) -> String {
    let kind = actor
        .entity
        .as_deref()
        .map(clean)
        .filter(|k| !k.is_empty() && k != "unknown" && k != "actor");
    match kind {
        Some(kind) => resolve_kind(&kind),
        None => resolve_kind(&clean(&actor.name)),
    }
}

/// Name shown above the entity, if the actor is a named character
pub fn custom_name(actor: &ActorRef) -> Option<&str> {
    let name = clean(&actor.name);
    if name.is_empty() || entity_id(actor).contains(&name) {
        None
    } else {
        Some(actor.name.trim())
    }
}

/// Target selector matching how the actor was summoned
pub fn selector(actor: &ActorRef) -> String {
    match custom_name(actor) {
        Some(name) => name_selector(name),
        None => format!("@e[type={},sort=nearest,limit=1]", entity_id(actor)),
    }
}

fn selector_for_name(name: &str) -> String {
    let cleaned = clean(name);
    let generic = GENERIC_NAMES.contains(&cleaned.as_str())
        || cleaned.contains("dragon")
        || cleaned.contains("titan");
    if generic {
        format!("@e[type={},sort=nearest,limit=1]", resolve_kind(&cleaned))
    } else {
        name_selector(name.trim())
    }
}

fn name_selector(name: &str) -> String {
    format!("@e[name=\"{}\",sort=nearest,limit=1]", escape_double(name))
}

fn escape_double(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// SNBT compound for a freshly summoned actor, empty if nothing is needed
fn summon_nbt(actor: &ActorRef, entity: &str) -> String {
    let mut tags = Vec::new();
    if entity == ENDER_DRAGON {
        tags.push("DragonPhase:0".to_string());
    }
    if let Some(name) = custom_name(actor) {
        let component = format!("{{\"text\":\"{}\"}}", escape_double(name));
        tags.push(format!("CustomName:'{}'", component.replace('\'', "\\'")));
    }
    if tags.is_empty() {
        String::new()
    } else {
        format!(" {{{}}}", tags.join(","))
    }
}

/// Spawn or position command, rendered before anything else the actor does
///
/// Existing actors without a position hint need no placement.
pub fn placement(actor: &ActorRef) -> Option<RenderedCommand> {
    let entity = entity_id(actor);
    match (actor.spawn, actor.position) {
        (true, Some(pos)) => Some(RenderedCommand::new(
            0,
            format!("summon {} {}{}", entity, pos, summon_nbt(actor, &entity)),
            format!("Spawn {}", actor.name),
        )),
        (true, None) => Some(RenderedCommand::new(
            0,
            format!(
                "execute at @p run summon {} ~ ~ ~{}",
                entity,
                summon_nbt(actor, &entity)
            ),
            format!("Spawn {} at the camera", actor.name),
        )),
        (false, Some(pos)) => Some(RenderedCommand::new(
            0,
            format!("tp {} {}", selector(actor), pos),
            format!("Place {}", actor.name),
        )),
        (false, None) => None,
    }
}

/// Commands for one animation hint, all at the action's tick
pub fn action_commands(
    actor: &ActorRef,
    action: &ActorAction,
    registry: &ActorRegistry<'_>,
) -> Vec<RenderedCommand> {
    let sel = selector(actor);
    let name = &actor.name;
    let tick = action.tick();
    let one = |command: String, description: String| {
        vec![RenderedCommand::new(tick, command, description)]
    };

    match action {
        ActorAction::WalkTo {
            target_position, ..
        } => one(
            format!("tp {} {}", sel, target_position),
            format!("{} walks to {}", name, target_position),
        ),
        ActorAction::RunTo {
            target_position, ..
        } => one(
            format!("tp {} {}", sel, target_position),
            format!("{} runs to {}", name, target_position),
        ),
        ActorAction::Teleport { position, .. } => one(
            format!("tp {} {}", sel, position),
            format!("Teleport {}", name),
        ),
        ActorAction::Sit { .. } => {
            let nbt = if entity_id(actor).contains("camel") {
                "{Pose:sitting}"
            } else {
                "{Sitting:1b}"
            };
            one(
                format!("data merge entity {} {}", sel, nbt),
                format!("{} sits", name),
            )
        }
        ActorAction::Jump { .. } => one(
            format!(
                "execute as {} run data merge entity @s {{Motion:[0.0d,0.6d,0.0d]}}",
                sel
            ),
            format!("{} jumps", name),
        ),
        ActorAction::Attack { .. } => vec![
            RenderedCommand::new(
                tick,
                format!(
                    "execute at {} run playsound entity.player.attack.strong master @a ~ ~ ~ 1 1",
                    sel
                ),
                format!("{} attacks (sound)", name),
            ),
            RenderedCommand::new(
                tick,
                format!(
                    "execute as {} run data merge entity @s {{Motion:[0.0d,0.2d,0.4d]}}",
                    sel
                ),
                format!("{} attacks (lunge)", name),
            ),
        ],
        ActorAction::Interact { .. } => one(
            format!(
                "execute at {} run playsound entity.villager.trade master @a ~ ~ ~ 1 1",
                sel
            ),
            format!("{} interacts", name),
        ),
        ActorAction::LookAt { target, .. } => match target {
            LookTarget::Position(pos) => one(
                format!("execute as {} at @s run tp @s ~ ~ ~ facing {}", sel, pos),
                format!("{} looks at {}", name, pos),
            ),
            LookTarget::Actor(other) => one(
                format!(
                    "execute as {} at @s run tp @s ~ ~ ~ facing entity {} eyes",
                    sel,
                    registry.selector(other)
                ),
                format!("{} looks at {}", name, other),
            ),
        },
    }
}

/// ` facing ...` suffix for camera teleports, empty if the camera keeps its rotation
pub(crate) fn facing_suffix(
    look_at: Option<&str>,
    facing: Option<&Position>,
    registry: &ActorRegistry<'_>,
) -> String {
    match (look_at, facing) {
        (Some(actor), _) => format!(" facing entity {} eyes", registry.selector(actor)),
        (None, Some(pos)) => format!(" facing {}", pos.keyframe()),
        (None, None) => String::new(),
    }
}
