//! Resolve the step that corresponds to a playback position.

use crate::manual::Step;
use crate::time_codec::parse_playback_time;

/// Indices of timed steps ordered by their parsed offset.
///
/// The sort is stable, so steps sharing a timestamp keep their original
/// relative order.
pub fn timed_order(steps: &[Step]) -> Vec<(usize, i64)> {
    let mut timed: Vec<(usize, i64)> = steps
        .iter()
        .enumerate()
        .filter_map(|(i, step)| step.time_str().map(|t| (i, parse_playback_time(t))))
        .collect();
    timed.sort_by_key(|&(_, secs)| secs);
    timed
}

/// Return the index (into `steps`) of the most recently entered step at
/// `current_time` seconds.
///
/// That is the timed step with the greatest offset `<= current_time`; when
/// several steps share that offset the last one in stable order wins.
/// Returns `None` before the first timestamp or when no step is timed.
pub fn locate_current_step(steps: &[Step], current_time: f64) -> Option<usize> {
    let mut current = None;
    for (index, secs) in timed_order(steps) {
        if secs as f64 <= current_time {
            current = Some(index);
        } else {
            break;
        }
    }
    current
}
