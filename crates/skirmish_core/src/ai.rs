//! Per-kind turn decisions.
//!
//! [`take_turn`] dispatches on the unit's [`Behavior`]. Fighting behaviors
//! share one skeleton: kite if a ranged unit is cornered, roll the decision
//! zones, then engage. Engaging picks a target, closes in, checks sight and
//! only then resolves the chosen [`Action`], whatever it is.

use tracing::trace;

use crate::battlefield::{Battlefield, Taunt};
use crate::combat::attack;
use crate::events::{SimEvent, StatusKind};
use crate::movement::{move_away, move_to, move_towards};
use crate::objective::ObjectiveParams;
use crate::pathfinding::line_of_sight;
use crate::unit::{Unit, UnitId};
use crate::unit_kind::{Behavior, Choice};

/// Targets struck by a fireball.
pub const FIREBALL_TARGETS: usize = 2;
/// Turns of frenzy granted by a controller.
pub const FRENZY_TURNS: u32 = 2;
/// Turns of hex inflicted by a controller.
pub const HEX_TURNS: u32 = 1;
/// Support heal range.
pub const SUPPORT_HEAL: (u32, u32) = (4, 6);
/// Shield granted alongside a support heal.
pub const SUPPORT_SHIELD: u32 = 4;

/// What to do once a target is in range and in sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Strike,
    Hex,
    Taunt,
    Fireball,
    Aim,
    Frenzy,
    HealSelf,
}

/// Run the decision logic for `id` and return the events it produced.
pub fn take_turn(field: &mut Battlefield, id: UnitId) -> Vec<SimEvent> {
    let behavior = field.unit(id).profile.behavior;
    match behavior {
        Behavior::Structure => return Vec::new(),
        Behavior::Escortee => return escort_step(field, id),
        _ => {}
    }
    if field.enemies_of(id).is_empty() {
        return Vec::new();
    }

    if let Some(events) = kite(field, id) {
        return events;
    }

    if behavior == Behavior::Support {
        return support(field, id);
    }

    let roll = field.rng.d100();
    let choice = field.unit(id).profile.odds.classify(roll);
    let aiming = field.unit(id).status.aim;
    let action = match (behavior, choice) {
        (Behavior::Vanguard, Choice::Special) => Action::Taunt,
        (Behavior::Caster, Choice::Special) if field.enemies_of(id).len() >= FIREBALL_TARGETS => {
            Action::Fireball
        }
        (Behavior::Marksman, Choice::Special) if !aiming => Action::Aim,
        (Behavior::Marksman, _) => Action::Strike,
        (Behavior::Controller, Choice::Special) => Action::Frenzy,
        (Behavior::Controller, Choice::Fallback) => Action::Hex,
        (_, Choice::Fallback) => Action::HealSelf,
        _ => Action::Strike,
    };
    trace!(unit = %id, ?behavior, ?choice, ?action, "decision");

    let ignore_taunt = behavior == Behavior::Marksman && aiming;
    engage(field, id, action, ignore_taunt)
}

/// Ranged units step away from adjacent enemies. `Some` means the turn is spent.
fn kite(field: &mut Battlefield, id: UnitId) -> Option<Vec<SimEvent>> {
    if !field.unit(id).profile.is_ranged() {
        return None;
    }
    let cornered = field
        .enemies_of(id)
        .into_iter()
        .any(|e| field.distance(id, e) <= 1);
    if !cornered {
        return None;
    }
    let events = move_away(field, id);
    (!events.is_empty()).then_some(events)
}

/// Select a target, close in, check sight, then act.
///
/// A unit still out of range after moving ends its turn with only the
/// movement events.
fn engage(field: &mut Battlefield, id: UnitId, action: Action, ignore_taunt: bool) -> Vec<SimEvent> {
    let Some(target) = field.select_target(id, ignore_taunt) else {
        return Vec::new();
    };
    let mut events = Vec::new();
    if !field.in_range(id, target) {
        events.extend(move_towards(field, id, target));
        if !field.unit(id).is_alive() || !field.in_range(id, target) {
            return events;
        }
    }
    if field.unit(id).profile.is_ranged() && !sees(field, id, target) {
        events.push(SimEvent::LosBlocked {
            attacker: id,
            target,
        });
        return events;
    }
    events.extend(act(field, id, target, action));
    events
}

/// Resolve `action` once `target` is reachable.
fn act(field: &mut Battlefield, id: UnitId, target: UnitId, action: Action) -> Vec<SimEvent> {
    match action {
        Action::Strike => attack(field, id, target),
        Action::Hex => hex(field, id, target),
        Action::Taunt => taunt(field, id),
        Action::Fireball => fireball(field, id),
        Action::Aim => aim(field, id),
        Action::Frenzy => frenzy(field, id).unwrap_or_else(|| hex(field, id, target)),
        Action::HealSelf => {
            let rng = &mut field.rng;
            field.units[id.index()].heal_self(rng)
        }
    }
}

fn sees(field: &Battlefield, id: UnitId, target: UnitId) -> bool {
    line_of_sight(&field.map, field.unit(id).pos, field.unit(target).pos)
}

fn hex(field: &mut Battlefield, id: UnitId, target: UnitId) -> Vec<SimEvent> {
    field.unit_mut(target).status.hexed = HEX_TURNS;
    vec![SimEvent::status(StatusKind::Hex)
        .target(target)
        .actor(id)
        .turns(HEX_TURNS)
        .build()]
}

fn taunt(field: &mut Battlefield, id: UnitId) -> Vec<SimEvent> {
    field.taunt = Some(Taunt::new(id));
    vec![SimEvent::status(StatusKind::Taunt).actor(id).build()]
}

/// Strike two distinct random enemies, each needing its own line of sight.
fn fireball(field: &mut Battlefield, id: UnitId) -> Vec<SimEvent> {
    let enemies = field.enemies_of(id);
    let picks = field.rng.sample_indices(enemies.len(), FIREBALL_TARGETS);
    let mut events = vec![SimEvent::status(StatusKind::Fireball).actor(id).build()];
    for target in picks.into_iter().map(|i| enemies[i]) {
        if sees(field, id, target) {
            events.extend(attack(field, id, target));
        } else {
            events.push(SimEvent::LosBlocked {
                attacker: id,
                target,
            });
        }
    }
    events
}

fn aim(field: &mut Battlefield, id: UnitId) -> Vec<SimEvent> {
    field.unit_mut(id).status.aim = true;
    vec![SimEvent::status(StatusKind::Aim).actor(id).turns(1).build()]
}

/// Frenzy a random living ally other than `id`. `None` if there is none.
fn frenzy(field: &mut Battlefield, id: UnitId) -> Option<Vec<SimEvent>> {
    let side = field.unit(id).side;
    let allies: Vec<UnitId> = field
        .living_ids(side)
        .into_iter()
        .filter(|&a| a != id)
        .collect();
    let target = *field.rng.choose(&allies)?;
    field.unit_mut(target).status.frenzy = FRENZY_TURNS;
    Some(vec![SimEvent::status(StatusKind::Frenzy)
        .target(target)
        .actor(id)
        .turns(FRENZY_TURNS)
        .build()])
}

/// Heal and shield the weakest other ally, or attack if alone.
fn support(field: &mut Battlefield, id: UnitId) -> Vec<SimEvent> {
    let side = field.unit(id).side;
    let weakest = field
        .living(side)
        .filter(|a| a.id != id)
        .fold(None, |best: Option<&Unit>, a| match best {
            Some(b) if !a.weaker_than(b) => Some(b),
            _ => Some(a),
        })
        .map(|a| a.id);
    let Some(target) = weakest else {
        return engage(field, id, Action::Strike, false);
    };

    let amount = field.rng.range(SUPPORT_HEAL.0, SUPPORT_HEAL.1);
    let ally = field.unit_mut(target);
    ally.heal(amount);
    let hp = ally.hp;
    let remaining = ally.add_shield(SUPPORT_SHIELD);
    vec![
        SimEvent::Heal {
            actor: id,
            amount,
            hp,
            target: Some(target),
        },
        SimEvent::status(StatusKind::Shield)
            .target(target)
            .actor(id)
            .amount(SUPPORT_SHIELD)
            .remaining(remaining)
            .build(),
    ]
}

/// The escorted unit walks toward the exit and never fights.
fn escort_step(field: &mut Battlefield, id: UnitId) -> Vec<SimEvent> {
    let exit = match field.objective.as_ref().map(|o| o.params) {
        Some(ObjectiveParams::Escort { exit, .. }) => exit,
        _ => return Vec::new(),
    };
    move_to(field, id, exit)
}
