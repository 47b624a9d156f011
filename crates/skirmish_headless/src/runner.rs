//! Single battle runner writing JSON lines.

use std::io::Write;
use std::path::Path;

use skirmish_core::config::SessionConfig;
use skirmish_core::events::SimEvent;
use skirmish_core::replay::Replay;
use skirmish_core::session::{Outcome, Session};
use tracing::info;

use crate::error::{HeadlessError, Result};

/// Write one event as a single JSON line.
pub fn write_event<W: Write>(out: &mut W, event: &SimEvent) -> Result<()> {
    serde_json::to_writer(&mut *out, event)?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Play one battle, streaming every event to `out`.
///
/// Writes a replay record to `replay_out` when given.
pub fn run_to_writer<W: Write>(
    config: &SessionConfig,
    out: &mut W,
    replay_out: Option<&Path>,
) -> Result<Outcome> {
    let session = Session::new(config)?;
    let mut failure: Option<HeadlessError> = None;
    let outcome = session.play_out_with(|event| {
        if failure.is_none() {
            failure = write_event(out, event).err();
        }
    });
    if let Some(err) = failure {
        return Err(err);
    }
    out.flush()?;

    info!(
        seed = outcome.seed,
        winner = ?outcome.winner,
        rounds = outcome.rounds,
        events = outcome.event_count,
        "battle finished"
    );

    if let Some(path) = replay_out {
        Replay::from_outcome(config, outcome).save(path)?;
        info!(path = %path.display(), "replay saved");
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_stream_is_json_lines() {
        let config = SessionConfig::new(1).with_seed(3).with_mission("survival");
        let mut out = Vec::new();
        let outcome = run_to_writer(&config, &mut out, None).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len() as u64, outcome.event_count);
        assert_eq!(lines[0]["type"], "map_init");
        assert_eq!(lines[1]["type"], "start");
        assert_eq!(lines.last().unwrap()["type"], "end");
    }

    #[test]
    fn test_unknown_mission_writes_nothing() {
        let config = SessionConfig::new(1).with_mission("heist");
        let mut out = Vec::new();
        assert!(matches!(
            run_to_writer(&config, &mut out, None),
            Err(HeadlessError::Sim(_))
        ));
        assert!(out.is_empty());
    }
}
