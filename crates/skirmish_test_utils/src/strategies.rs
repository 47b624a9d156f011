//! Proptest strategies for battle inputs.

use proptest::prelude::*;
use skirmish_core::config::SessionConfig;
use skirmish_core::map::PRESETS;
use skirmish_core::math::GridPos;
use skirmish_core::objective::MissionKind;

/// Any mission.
pub fn arb_mission() -> impl Strategy<Value = MissionKind> {
    prop::sample::select(MissionKind::ALL.to_vec())
}

/// Any preset name.
pub fn arb_preset() -> impl Strategy<Value = &'static str> {
    prop::sample::select(PRESETS.iter().map(|p| p.name).collect::<Vec<_>>())
}

/// Position inside a `width` x `height` grid.
pub fn arb_grid_pos(width: i32, height: i32) -> impl Strategy<Value = GridPos> {
    (0..width, 0..height).prop_map(|(x, y)| GridPos::new(x, y))
}

/// Seeded config over every mission, preset and a range of tiers and sizes.
pub fn arb_config() -> impl Strategy<Value = SessionConfig> {
    (
        any::<u64>(),
        1u32..8,
        arb_mission(),
        arb_preset(),
        8i32..16,
        6i32..10,
    )
        .prop_map(|(seed, tier, mission, preset, width, height)| {
            SessionConfig::new(tier)
                .with_seed(seed)
                .with_mission(mission.as_str())
                .with_preset(preset)
                .with_size(width, height)
        })
}
