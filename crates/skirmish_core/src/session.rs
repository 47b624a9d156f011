//! Turn scheduler and pull-based event stream.
//!
//! A [`Session`] is an explicit resumable state machine. Each call to
//! [`Session::pull_event`] drains one event from an internal queue; when the
//! queue is empty the scheduler advances exactly one step (opening, one
//! patrol tick, one round header, one unit turn or one round end) and
//! buffers whatever that step produced.
//!
//! # Determinism
//!
//! All randomness flows from the seed through one [`SimRng`], turn order is
//! a stable sort over roster order, and every neighbor scan walks
//! [`CARDINALS`](crate::math::CARDINALS). Equal seeds yield equal streams.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::SessionConfig;
//! use skirmish_core::events::SimEvent;
//! use skirmish_core::session::Session;
//!
//! let config = SessionConfig::new(1).with_seed(7).with_mission("survival");
//! let session = Session::new(&config).unwrap();
//! let events: Vec<SimEvent> = session.collect();
//! assert!(matches!(events.last(), Some(SimEvent::End { .. })));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::ai;
use crate::battlefield::Battlefield;
use crate::config::SessionConfig;
use crate::encounter::{self, BattleSetup};
use crate::error::Result;
use crate::events::{Phase, SimEvent, StatusKind, Winner};
use crate::hashing::FnvHasher;
use crate::movement::patrol_step;
use crate::pathfinding::line_of_sight;
use crate::rng::SimRng;
use crate::unit::{Side, UnitId, UnitSnapshot};

/// Scheduler program counter.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    Opening,
    Prebattle { tick: u32 },
    RoundStart,
    Turn { order: Vec<UnitId>, index: usize },
    RoundEnd,
    Finished,
}

/// Summary of a fully drained stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outcome {
    /// Seed the session ran with.
    pub seed: u64,
    /// Final result.
    pub winner: Winner,
    /// Rounds started.
    pub rounds: u32,
    /// Events emitted, including `end`.
    pub event_count: u64,
    /// FNV-1a over the bincode encoding of every emitted event, in order.
    pub stream_hash: u64,
}

/// One battle, from opening to `end`.
#[derive(Debug, Clone)]
pub struct Session {
    field: Battlefield,
    arena: String,
    seed: u64,
    aggro_radius: u32,
    max_patrol_ticks: u32,
    max_rounds: u32,
    phase: Phase,
    stage: Stage,
    pending: VecDeque<SimEvent>,
    winner: Option<Winner>,
    rounds_played: u32,
    emitted: u64,
}

/// Build a session for a tier and optional mission name.
///
/// Seeds from OS entropy and picks the map preset at random.
pub fn create_session(tier: u32, mission: Option<&str>) -> Result<Session> {
    let mut config = SessionConfig::new(tier);
    config.mission = mission.map(str::to_string);
    Session::new(&config)
}

impl Session {
    /// Validate `config` and generate a fresh battle.
    ///
    /// Fails before anything is built on an unknown mission or preset.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.resolve_seed();
        let mut rng = SimRng::seeded(seed);
        let mission = config.resolve_mission(&mut rng)?;
        let setup = encounter::generate(config, mission, rng)?;
        info!(
            seed,
            %mission,
            preset = setup.field.map.preset(),
            tier = config.tier,
            "session created"
        );
        Ok(Self::from_setup(setup, config, seed))
    }

    /// Wrap a prepared battlefield. Scheduler limits come from `config`.
    #[must_use]
    pub fn from_setup(setup: BattleSetup, config: &SessionConfig, seed: u64) -> Self {
        Self {
            field: setup.field,
            arena: setup.arena,
            seed,
            aggro_radius: config.aggro_radius,
            max_patrol_ticks: config.max_patrol_ticks,
            max_rounds: config.max_rounds,
            phase: Phase::Prebattle,
            stage: Stage::Opening,
            pending: VecDeque::new(),
            winner: None,
            rounds_played: 0,
            emitted: 0,
        }
    }

    /// Next event in emission order, or `None` once the stream is exhausted.
    pub fn pull_event(&mut self) -> Option<SimEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                self.emitted += 1;
                trace!(kind = event.kind(), n = self.emitted, "event");
                return Some(event);
            }
            if self.stage == Stage::Finished {
                return None;
            }
            self.advance();
        }
    }

    /// Drain the stream, handing each event to `sink`.
    pub fn play_out_with<F: FnMut(&SimEvent)>(mut self, mut sink: F) -> Outcome {
        let mut hasher = FnvHasher::new();
        while let Some(event) = self.pull_event() {
            hasher.absorb(&event);
            sink(&event);
        }
        Outcome {
            seed: self.seed,
            winner: self.winner.unwrap_or(Winner::Draw),
            rounds: self.rounds_played,
            event_count: self.emitted,
            stream_hash: hasher.finish(),
        }
    }

    /// Drain the stream and summarize it.
    pub fn play_out(self) -> Outcome {
        self.play_out_with(|_| {})
    }

    /// Seed this session runs with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Arena flavor text.
    #[must_use]
    pub fn arena(&self) -> &str {
        &self.arena
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current round counter.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.field.round
    }

    /// Final winner once decided.
    #[must_use]
    pub const fn winner(&self) -> Option<Winner> {
        self.winner
    }

    /// True once `end` has been pulled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Finished && self.pending.is_empty()
    }

    /// Read-only view of the battle state.
    #[must_use]
    pub const fn battlefield(&self) -> &Battlefield {
        &self.field
    }

    /// Hash of the observable battle state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.field.map.hash(&mut hasher);
        self.field.units.hash(&mut hasher);
        self.field.objective.hash(&mut hasher);
        self.field.taunt.hash(&mut hasher);
        self.field.round.hash(&mut hasher);
        self.phase.hash(&mut hasher);
        hasher.finish()
    }

    fn advance(&mut self) {
        match std::mem::replace(&mut self.stage, Stage::Finished) {
            Stage::Opening => self.open(),
            Stage::Prebattle { tick } => self.patrol(tick),
            Stage::RoundStart => self.start_round(),
            Stage::Turn { order, index } => self.play_turn(order, index),
            Stage::RoundEnd => self.close_round(),
            Stage::Finished => {}
        }
    }

    fn open(&mut self) {
        let map = &self.field.map;
        self.pending.push_back(SimEvent::MapInit {
            width: map.width(),
            height: map.height(),
            preset: map.preset().to_string(),
            tiles: map.tiles().to_vec(),
        });
        let heroes = self.snapshots(Side::Heroes);
        let monsters = self.snapshots(Side::Monsters);
        self.pending.push_back(SimEvent::Start {
            arena: self.arena.clone(),
            heroes,
            monsters,
        });
        if let Some(objective) = &self.field.objective {
            self.pending.push_back(objective.init_event());
        }
        for unit in self.field.units.iter().filter(|u| u.profile.regen > 0) {
            self.pending.push_back(
                SimEvent::status(StatusKind::Regen)
                    .target(unit.id)
                    .amount(unit.profile.regen)
                    .build(),
            );
        }
        self.pending.push_back(SimEvent::PhaseChange {
            phase: Phase::Prebattle,
        });
        info!(phase = ?Phase::Prebattle, "phase change");
        self.stage = Stage::Prebattle { tick: 0 };
    }

    fn snapshots(&self, side: Side) -> Vec<UnitSnapshot> {
        self.field
            .units
            .iter()
            .filter(|u| u.side == side)
            .map(|u| u.snapshot())
            .collect()
    }

    fn patrol(&mut self, tick: u32) {
        if let Some(winner) = self.field.winner() {
            self.finish(winner);
            return;
        }
        let patrollers: Vec<UnitId> = self
            .field
            .units
            .iter()
            .filter(|u| u.is_alive() && u.patrol.is_some())
            .map(|u| u.id)
            .collect();
        if patrollers.is_empty() || tick >= self.max_patrol_ticks {
            self.enter_combat();
            return;
        }
        // Units can start inside aggro range.
        if tick == 0 && self.aggro() {
            return;
        }

        for id in patrollers {
            if let Some((from, to)) = patrol_step(&mut self.field, id) {
                self.pending
                    .push_back(SimEvent::PatrolTick { unit: id, from, to });
            }
        }

        if !self.aggro() {
            self.stage = Stage::Prebattle { tick: tick + 1 };
        }
    }

    /// Enter combat if a monster spots a hero. Returns true if it did.
    fn aggro(&mut self) -> bool {
        let Some((source, target)) = self.spot() else {
            return false;
        };
        self.pending.push_back(SimEvent::AggroTrigger {
            source,
            target,
            radius: self.aggro_radius,
        });
        self.enter_combat();
        true
    }

    /// First monster, in roster order, that can see a hero within the aggro radius.
    fn spot(&self) -> Option<(UnitId, UnitId)> {
        let field = &self.field;
        field.living(Side::Monsters).find_map(|monster| {
            field
                .living(Side::Heroes)
                .find(|hero| {
                    monster.pos.manhattan(hero.pos) <= self.aggro_radius
                        && line_of_sight(&field.map, monster.pos, hero.pos)
                })
                .map(|hero| (monster.id, hero.id))
        })
    }

    fn enter_combat(&mut self) {
        self.phase = Phase::Combat;
        self.pending.push_back(SimEvent::PhaseChange {
            phase: Phase::Combat,
        });
        info!(phase = ?Phase::Combat, "phase change");
        self.stage = Stage::RoundStart;
    }

    fn start_round(&mut self) {
        if let Some(winner) = self.field.winner() {
            self.finish(winner);
            return;
        }
        if self.field.round > self.max_rounds {
            self.finish(Winner::Draw);
            return;
        }

        let mut living: Vec<_> = self.field.units.iter().filter(|u| u.is_alive()).collect();
        living.sort_by(|a, b| b.speed().cmp(&a.speed()));
        let order: Vec<UnitId> = living.into_iter().map(|u| u.id).collect();

        debug!(round = self.field.round, units = order.len(), "round start");
        self.rounds_played += 1;
        self.pending.push_back(SimEvent::Round {
            round: self.field.round,
            order: order.clone(),
        });
        self.stage = Stage::Turn { order, index: 0 };
    }

    fn play_turn(&mut self, order: Vec<UnitId>, index: usize) {
        let Some(&actor) = order.get(index) else {
            self.stage = Stage::RoundEnd;
            return;
        };
        self.stage = Stage::Turn {
            order,
            index: index + 1,
        };
        self.run_turn(actor);
    }

    fn run_turn(&mut self, actor: UnitId) {
        if !self.field.unit(actor).is_alive() {
            return;
        }
        let events = self.field.unit_mut(actor).begin_turn();
        if self.publish(events) {
            return;
        }
        if !self.field.unit(actor).is_alive() || self.field.enemies_of(actor).is_empty() {
            return;
        }
        let events = ai::take_turn(&mut self.field, actor);
        if self.publish(events) {
            return;
        }
        let events = self.field.unit_mut(actor).end_turn();
        if self.publish(events) {
            return;
        }
        self.field.expire_taunt(actor);
    }

    fn close_round(&mut self) {
        self.field.round += 1;
        let events = self.field.end_round();
        if !self.publish(events) {
            self.stage = Stage::RoundStart;
        }
    }

    /// Queue a batch, running the objective event hook after each event.
    /// Returns true if the batch decided the battle.
    fn publish(&mut self, events: Vec<SimEvent>) -> bool {
        for event in events {
            let follow_up = self.field.observe(&event);
            if let SimEvent::Death { target } = event {
                self.field.clear_taunt_of(target);
            }
            self.pending.push_back(event);
            self.pending.extend(follow_up);
        }
        match self.field.winner() {
            Some(winner) => {
                self.finish(winner);
                true
            }
            None => false,
        }
    }

    fn finish(&mut self, winner: Winner) {
        info!(?winner, round = self.field.round, "battle decided");
        self.winner = Some(winner);
        self.pending.push_back(SimEvent::End { winner });
        self.stage = Stage::Finished;
    }
}

impl Iterator for Session {
    type Item = SimEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.pull_event()
    }
}

impl FusedIterator for Session {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::BattleMap;
    use crate::math::GridPos;
    use crate::unit::Patrol;
    use crate::unit_kind::{ActionOdds, UnitKind};

    fn duel() -> Session {
        let mut field = Battlefield::new(BattleMap::open(6, 3), SimRng::seeded(21), 1);
        let mut warrior = UnitKind::Warrior.profile();
        warrior.crit_percent = 0;
        warrior.odds = ActionOdds::new(0, 100);
        field.spawn(Side::Heroes, warrior, GridPos::new(1, 1));
        let mut goblin = UnitKind::Goblin.profile();
        goblin.damage = (0, 0);
        goblin.odds = ActionOdds::new(0, 100);
        field.spawn(Side::Monsters, goblin, GridPos::new(2, 1));
        let setup = BattleSetup {
            field,
            arena: "test pit".into(),
        };
        Session::from_setup(setup, &SessionConfig::default(), 21)
    }

    #[test]
    fn test_opening_sequence() {
        let kinds: Vec<_> = duel().take(5).map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec!["map_init", "start", "phase_change", "phase_change", "round"]
        );
    }

    #[test]
    fn test_warrior_beats_goblin() {
        let events: Vec<SimEvent> = duel().collect();
        let attacks = events
            .iter()
            .filter(|e| matches!(e, SimEvent::Attack { attacker: UnitId(0), .. }))
            .count();
        let goblin_deaths = events
            .iter()
            .filter(|e| matches!(e, SimEvent::Death { target: UnitId(1) }))
            .count();
        let ends: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SimEvent::End { .. }))
            .collect();

        assert!((2..=4).contains(&attacks), "{attacks} attacks");
        assert_eq!(goblin_deaths, 1);
        assert_eq!(ends, vec![&SimEvent::End { winner: Winner::Heroes }]);
        assert_eq!(events.last(), Some(&SimEvent::End { winner: Winner::Heroes }));
    }

    #[test]
    fn test_exhausted_stream_stays_empty() {
        let mut session = duel();
        while session.pull_event().is_some() {}
        assert!(session.is_finished());
        assert_eq!(session.winner(), Some(Winner::Heroes));
        for _ in 0..3 {
            assert_eq!(session.pull_event(), None);
        }
    }

    #[test]
    fn test_round_order_by_speed_then_roster() {
        let mut field = Battlefield::new(BattleMap::open(12, 8), SimRng::seeded(2), 1);
        field.spawn(Side::Heroes, UnitKind::Warrior.profile(), GridPos::new(1, 1));
        field.spawn(Side::Monsters, UnitKind::Orc.profile(), GridPos::new(10, 1));
        field.spawn(Side::Monsters, UnitKind::Archer.profile(), GridPos::new(10, 3));
        field.spawn(Side::Heroes, UnitKind::Mage.profile(), GridPos::new(1, 3));
        let setup = BattleSetup {
            field,
            arena: String::new(),
        };
        let mut session = Session::from_setup(setup, &SessionConfig::default(), 2);
        let round = session
            .find(|e| matches!(e, SimEvent::Round { .. }))
            .unwrap();
        assert_eq!(
            round,
            SimEvent::Round {
                round: 1,
                order: vec![UnitId(2), UnitId(0), UnitId(3), UnitId(1)],
            }
        );
    }

    #[test]
    fn test_draw_after_max_rounds() {
        let mut field = Battlefield::new(BattleMap::open(12, 4), SimRng::seeded(4), 1);
        let mut warrior = UnitKind::Warrior.profile();
        warrior.odds = ActionOdds::new(0, 0);
        field.spawn(Side::Heroes, warrior, GridPos::new(1, 1));
        field.spawn(Side::Monsters, UnitKind::Totem.profile(), GridPos::new(11, 1));
        let setup = BattleSetup {
            field,
            arena: String::new(),
        };
        let config = SessionConfig {
            max_rounds: 3,
            ..SessionConfig::default()
        };
        let outcome = Session::from_setup(setup, &config, 4).play_out();
        assert_eq!(outcome.winner, Winner::Draw);
        assert_eq!(outcome.rounds, 3);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let config = SessionConfig::new(2).with_seed(99);
        let a = Session::new(&config).unwrap().play_out();
        let b = Session::new(&config).unwrap().play_out();
        assert_eq!(a, b);
    }

    #[test]
    fn test_aggro_before_first_patrol_step() {
        let mut field = Battlefield::new(BattleMap::open(12, 4), SimRng::seeded(6), 1);
        let hero = field.spawn(Side::Heroes, UnitKind::Warrior.profile(), GridPos::new(1, 1));
        let orc = field.spawn(Side::Monsters, UnitKind::Orc.profile(), GridPos::new(4, 1));
        field.unit_mut(orc).patrol = Some(Patrol::Waypoints {
            points: vec![GridPos::new(8, 1), GridPos::new(4, 1)],
            index: 0,
        });
        let setup = BattleSetup {
            field,
            arena: String::new(),
        };
        let events: Vec<SimEvent> = Session::from_setup(setup, &SessionConfig::default(), 6)
            .take(5)
            .collect();

        assert_eq!(
            events[3],
            SimEvent::AggroTrigger {
                source: orc,
                target: hero,
                radius: 5,
            }
        );
        assert_eq!(
            events[4],
            SimEvent::PhaseChange {
                phase: Phase::Combat
            }
        );
        assert!(!events.iter().any(|e| e.kind() == "patrol_tick"));
    }

    #[test]
    fn test_stream_hash_is_fnv_of_events() {
        let config = SessionConfig::new(1).with_seed(3).with_mission("escort");
        let events: Vec<SimEvent> = Session::new(&config).unwrap().collect();
        let mut hasher = FnvHasher::new();
        for event in &events {
            hasher.absorb(event);
        }
        let outcome = Session::new(&config).unwrap().play_out();
        assert_eq!(outcome.stream_hash, hasher.finish());
        assert_eq!(outcome.event_count, events.len() as u64);
    }

    #[test]
    fn test_huge_tier_session_builds() {
        let session = create_session(30_000_000, Some("survival")).unwrap();
        assert!(session
            .battlefield()
            .living(Side::Monsters)
            .all(|m| m.max_hp() > 1_000_000));
        assert!(matches!(session.last(), Some(SimEvent::End { .. })));
    }

    #[test]
    fn test_unknown_mission_fails() {
        assert!(create_session(1, Some("heist")).is_err());
        assert!(create_session(1, Some("escort")).is_ok());
    }
}
