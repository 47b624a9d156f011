//! Attack resolution.
//!
//! Damage is rolled from the attacker's range, scaled by its modifier
//! product, then doubled on a crit. Modifier and crit are resolved before
//! the defender applies rage and shield in [`Unit::take_damage`].
//!
//! [`Unit::take_damage`]: crate::unit::Unit::take_damage

use tracing::trace;

use crate::battlefield::Battlefield;
use crate::events::{SimEvent, StatusKind};
use crate::math::{percent, scale};
use crate::unit::UnitId;

/// Chance in percent that a hit poisons a surviving target.
pub const POISON_ON_HIT_CHANCE: u32 = 10;

/// Turns of on-hit poison.
pub const POISON_ON_HIT_TURNS: u32 = 3;

/// Crit chance bonus while aiming.
pub const AIM_CRIT_BONUS: u32 = 50;

/// Resolve a full attack from `attacker` on `target`.
pub fn attack(field: &mut Battlefield, attacker: UnitId, target: UnitId) -> Vec<SimEvent> {
    let (low, high) = field.unit(attacker).profile.damage;
    let modifier = field.unit(attacker).damage_modifier();
    let crit_chance = field.unit(attacker).crit_chance();

    let rolled = field.rng.range(low, high);
    let mut damage = scale(rolled, modifier);
    let crit = field.rng.percent(crit_chance);
    if crit {
        damage *= 2;
    }
    trace!(%attacker, %target, rolled, damage, crit, "attack");

    let mut events = vec![SimEvent::Attack {
        attacker,
        target,
        damage,
        crit,
    }];
    events.extend(field.unit_mut(target).take_damage(damage));

    let poisons = field.rng.percent(POISON_ON_HIT_CHANCE);
    if poisons && field.unit(target).is_alive() {
        let amount = field.rng.range(1, 3);
        field.unit_mut(target).poison(amount, POISON_ON_HIT_TURNS);
        events.push(
            SimEvent::status(StatusKind::Poison)
                .target(target)
                .actor(attacker)
                .amount(amount)
                .turns(POISON_ON_HIT_TURNS)
                .build(),
        );
    }
    events
}

/// Zone-of-control reprisal: half the attacker's modifier, never crits.
pub fn opportunity_attack(
    field: &mut Battlefield,
    attacker: UnitId,
    defender: UnitId,
) -> Vec<SimEvent> {
    let (low, high) = field.unit(attacker).profile.damage;
    let modifier = field.unit(attacker).damage_modifier() * percent(50);
    let damage = scale(field.rng.range(low, high), modifier);

    let mut events = vec![SimEvent::OpportunityHit {
        attacker,
        defender,
        damage,
    }];
    events.extend(field.unit_mut(defender).take_damage(damage));
    events
}
