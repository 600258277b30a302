//! Scoring and difficulty curves.
//!
//! Pure functions so the curves can be checked without running a game.
//!
//! | Game | Points | Difficulty |
//! |------|--------|------------|
//! | ReactionChase | `base + max(0, floor((1 - e/t) * base * mult))` | `t *= decay`, floored |
//! | SequenceRecall | sequence length completed | display time scaled only when `len % N == 0` |
//! | SpawnDespawn | `+hit`, `-penalty` (never below 0) | `floor(elapsed / step)` lowers visibility and spawn interval |
//! | ColorCycleMatch | fixed per match | cycle interval `*= factor`, floored |
//! | SetRecall | `size * per_slot` | size +1, capped |
//! | TogglePuzzle | `max(10, base - 2*moves + 20*level)` | scramble moves +1, capped |
//! | ReactionTimer | `max(0, ceiling - average ms)`, assigned once | none |
//! | PatternCopy | `size * per_slot` | size +1 capped, show time stepped down |
//! | HotPotato | `+survive` per round, `survived * bonus` on victory | move interval stepped down |

/// Points for hitting a ReactionChase target `elapsed` seconds into a
/// `time_limit` window.
///
/// # Examples
///
/// ```
/// use keypad_arcade_core::scoring::reaction_points;
///
/// // Half a second into a two-second window.
/// assert_eq!(reaction_points(10, 2, 0.5, 2.0), 25);
/// // Too late for any bonus.
/// assert_eq!(reaction_points(10, 2, 2.5, 2.0), 10);
/// ```
pub fn reaction_points(base: u32, multiplier: u32, elapsed: f64, time_limit: f64) -> u32 {
    let speed = 1.0 - elapsed / time_limit;
    let bonus = (speed * base as f64 * multiplier as f64).floor();
    base + bonus.max(0.0) as u32
}

/// Multiplicative decay clamped at `floor`.
pub fn decayed(current: f64, factor: f64, floor: f64) -> f64 {
    (current * factor).max(floor)
}

/// SequenceRecall display time after completing a sequence of
/// `completed_len` elements. Only every `every`-th level speeds up.
pub fn sequence_display_time(
    current: f64,
    completed_len: usize,
    every: u32,
    factor: f64,
    floor: f64,
) -> f64 {
    if every > 0 && completed_len % every as usize == 0 {
        decayed(current, factor, floor)
    } else {
        current
    }
}

/// Difficulty step reached after `elapsed` seconds.
pub fn difficulty_level(elapsed: f64, step_secs: f64) -> u32 {
    (elapsed.max(0.0) / step_secs).floor() as u32
}

/// Linear decrease per difficulty level, clamped at `floor`.
pub fn stepped_down(initial: f64, per_level: f64, level: u32, floor: f64) -> f64 {
    (initial - level as f64 * per_level).max(floor)
}

/// Viewing time for a SetRecall pattern.
pub fn pattern_display_time(base: f64, per_slot: f64, pattern_size: usize) -> f64 {
    base + pattern_size as f64 * per_slot
}

pub fn pattern_points(pattern_size: usize, per_slot: u32) -> u32 {
    pattern_size as u32 * per_slot
}

/// Points for solving a TogglePuzzle level.
///
/// # Examples
///
/// ```
/// use keypad_arcade_core::scoring::toggle_points;
///
/// assert_eq!(toggle_points(100, 5, 1), 110);
/// assert_eq!(toggle_points(100, 80, 1), 10);
/// ```
pub fn toggle_points(base: u32, moves: u32, level: u32) -> u32 {
    let raw = base as i64 - 2 * moves as i64 + 20 * level as i64;
    raw.max(10) as u32
}

/// Reaction times at or above this are false-start penalties.
pub const MISSED_REACTION_MS: u32 = 999;

/// Mean of the genuine reaction times, or [`MISSED_REACTION_MS`] when every
/// round was a false start.
pub fn average_reaction_ms(times_ms: &[u32]) -> u32 {
    let (sum, count) = times_ms
        .iter()
        .filter(|&&t| t < MISSED_REACTION_MS)
        .fold((0u32, 0u32), |(sum, count), &t| (sum + t, count + 1));
    if count == 0 {
        MISSED_REACTION_MS
    } else {
        sum / count
    }
}

/// ReactionTimer session score.
///
/// # Examples
///
/// ```
/// use keypad_arcade_core::scoring::reaction_timer_score;
///
/// assert_eq!(reaction_timer_score(500, &[200, 300, 1000]), 250);
/// assert_eq!(reaction_timer_score(500, &[1000, 1000]), 0);
/// ```
pub fn reaction_timer_score(ceiling_ms: u32, times_ms: &[u32]) -> u32 {
    ceiling_ms.saturating_sub(average_reaction_ms(times_ms))
}
