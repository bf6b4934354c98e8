//! Pure live-score logic: diffing upstream readings against stored state,
//! deriving lock/final flags from the scoreboard status string, digit
//! shuffles, and winner coordinates.
//!
//! Everything in this module is synchronous and side-effect free so the
//! sync flow can be tested without timers or a real store.

use rand::seq::SliceRandom;

use crate::dao::models::{GRID_SIZE, GameStateEntity, GameStatePatch};

/// Normalized reading for one event from the upstream scoreboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveScore {
    /// Home team score.
    pub home_score: u32,
    /// Away team score.
    pub away_score: u32,
    /// Period number (0 before kickoff, 5+ for overtime).
    pub period: u32,
    /// Human-readable status, e.g. "Final", "End of 3rd Quarter", "Halftime".
    pub status_detail: String,
}

/// Lock/final flags derived from the scoreboard status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockDerivation {
    /// The grid should be locked (game started or over).
    pub lock: bool,
    /// The game has ended.
    pub finalize: bool,
}

/// Derive lock/final flags from the status detail via substring matching.
///
/// The upstream reports free-form detail strings; "Final" and "End of 4th
/// Quarter" mark the game over, "Halftime" and "In Progress" mark it merely
/// started. Anything else (pregame, delays) derives nothing.
pub fn derive_lock(status_detail: &str) -> LockDerivation {
    if status_detail.contains("Final") || status_detail.contains("End of") {
        LockDerivation {
            lock: true,
            finalize: true,
        }
    } else if status_detail.contains("Halftime") || status_detail.contains("In Progress") {
        LockDerivation {
            lock: true,
            finalize: false,
        }
    } else {
        LockDerivation::default()
    }
}

/// Compute the partial patch a sync pass should write for `live`, given the
/// stored row. Only changed fields are present, so a reading identical to
/// the stored state produces an empty patch and no write.
///
/// When the reading locks a game whose shuffles are still empty, freshly
/// generated digit permutations ride along in the same patch, keeping the
/// "empty or full permutation" invariant intact no matter which writer gets
/// there first.
pub fn build_sync_patch(state: &GameStateEntity, live: &LiveScore) -> GameStatePatch {
    let mut patch = GameStatePatch::default();

    if live.home_score != state.home_score {
        patch.home_score = Some(live.home_score);
    }
    if live.away_score != state.away_score {
        patch.away_score = Some(live.away_score);
    }
    if live.period != state.current_quarter {
        patch.current_quarter = Some(live.period);
    }

    let derived = derive_lock(&live.status_detail);
    if derived.lock && !state.is_locked {
        patch.is_locked = Some(true);
    }
    if derived.finalize && !state.is_final {
        patch.is_final = Some(true);
    }

    let locking = patch.is_locked == Some(true);
    if locking && state.home_shuffled_scores.is_empty() {
        patch.home_shuffled_scores = Some(shuffled_digits());
    }
    if locking && state.away_shuffled_scores.is_empty() {
        patch.away_shuffled_scores = Some(shuffled_digits());
    }

    patch.normalized()
}

/// Random permutation of the digits 0-9, assigned to grid rows or columns
/// at lock time.
pub fn shuffled_digits() -> Vec<u8> {
    let mut digits: Vec<u8> = (0..GRID_SIZE).collect();
    digits.shuffle(&mut rand::rng());
    digits
}

/// Whether `values` is a permutation of exactly the digits 0-9.
pub fn is_digit_permutation(values: &[u8]) -> bool {
    if values.len() != GRID_SIZE as usize {
        return false;
    }
    let mut seen = [false; GRID_SIZE as usize];
    for &value in values {
        let Some(slot) = seen.get_mut(value as usize) else {
            return false;
        };
        if *slot {
            return false;
        }
        *slot = true;
    }
    true
}

/// Grid coordinate of the square winning for the given score pair.
///
/// `x` is the column whose assigned digit matches the last digit of the home
/// score, `y` the row matching the away score. Returns `None` while either
/// shuffle is missing or malformed (the grid is not locked yet).
pub fn winner_coordinate(
    home_score: u32,
    away_score: u32,
    home_shuffle: &[u8],
    away_shuffle: &[u8],
) -> Option<(u8, u8)> {
    if !is_digit_permutation(home_shuffle) || !is_digit_permutation(away_shuffle) {
        return None;
    }

    let home_digit = (home_score % 10) as u8;
    let away_digit = (away_score % 10) as u8;
    let x = home_shuffle.iter().position(|&d| d == home_digit)?;
    let y = away_shuffle.iter().position(|&d| d == away_digit)?;
    Some((x as u8, y as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn state(home: u32, away: u32, quarter: u32) -> GameStateEntity {
        GameStateEntity {
            home_score: home,
            away_score: away,
            current_quarter: quarter,
            ..GameStateEntity::initial(Uuid::new_v4())
        }
    }

    fn live(home: u32, away: u32, period: u32, detail: &str) -> LiveScore {
        LiveScore {
            home_score: home,
            away_score: away,
            period,
            status_detail: detail.to_string(),
        }
    }

    #[test]
    fn identical_reading_produces_empty_patch() {
        let state = state(14, 14, 2);
        let patch = build_sync_patch(&state, &live(14, 14, 2, "2nd Quarter"));
        assert!(patch.is_empty());
    }

    #[test]
    fn only_changed_fields_are_patched() {
        let state = state(14, 14, 2);
        let patch = build_sync_patch(&state, &live(21, 14, 3, "3rd Quarter"));

        assert_eq!(patch.home_score, Some(21));
        assert_eq!(patch.away_score, None);
        assert_eq!(patch.current_quarter, Some(3));
        assert_eq!(patch.is_locked, None);
        assert_eq!(patch.is_final, None);
    }

    #[test]
    fn final_status_locks_regardless_of_prior_lock_state() {
        let unlocked = state(28, 24, 4);
        let patch = build_sync_patch(&unlocked, &live(28, 24, 4, "Final"));
        assert_eq!(patch.is_final, Some(true));
        assert_eq!(patch.is_locked, Some(true));

        let mut locked = state(28, 24, 4);
        locked.is_locked = true;
        locked.home_shuffled_scores = (0..10).collect();
        locked.away_shuffled_scores = (0..10).collect();
        let patch = build_sync_patch(&locked, &live(28, 24, 4, "Final"));
        assert_eq!(patch.is_final, Some(true));
        // Already locked, nothing to change there.
        assert_eq!(patch.is_locked, Some(true));
        assert_eq!(patch.home_shuffled_scores, None);
    }

    #[test]
    fn end_of_quarter_counts_as_final() {
        let derived = derive_lock("End of 4th Quarter");
        assert!(derived.lock);
        assert!(derived.finalize);
    }

    #[test]
    fn in_progress_and_halftime_only_lock() {
        for detail in ["In Progress", "Halftime"] {
            let derived = derive_lock(detail);
            assert!(derived.lock, "{detail} should lock");
            assert!(!derived.finalize, "{detail} should not finalize");
        }
    }

    #[test]
    fn pregame_status_derives_nothing() {
        assert_eq!(derive_lock("Sun, February 8th"), LockDerivation::default());
        assert_eq!(derive_lock(""), LockDerivation::default());
    }

    #[test]
    fn locking_patch_carries_fresh_shuffles() {
        let state = state(0, 0, 0);
        let patch = build_sync_patch(&state, &live(0, 0, 1, "In Progress"));

        assert_eq!(patch.is_locked, Some(true));
        let home = patch.home_shuffled_scores.expect("home shuffle");
        let away = patch.away_shuffled_scores.expect("away shuffle");
        assert!(is_digit_permutation(&home));
        assert!(is_digit_permutation(&away));
    }

    #[test]
    fn locking_patch_preserves_existing_shuffles() {
        let mut state = state(0, 0, 0);
        state.home_shuffled_scores = (0..10).rev().collect();
        state.away_shuffled_scores = (0..10).collect();

        let patch = build_sync_patch(&state, &live(0, 0, 1, "In Progress"));
        assert_eq!(patch.is_locked, Some(true));
        assert_eq!(patch.home_shuffled_scores, None);
        assert_eq!(patch.away_shuffled_scores, None);
    }

    #[test]
    fn shuffled_digits_are_a_permutation() {
        for _ in 0..50 {
            assert!(is_digit_permutation(&shuffled_digits()));
        }
    }

    #[test]
    fn permutation_check_rejects_malformed_inputs() {
        assert!(is_digit_permutation(&[3, 1, 4, 0, 5, 9, 2, 6, 8, 7]));
        assert!(!is_digit_permutation(&[]));
        assert!(!is_digit_permutation(&[0; 10]));
        assert!(!is_digit_permutation(&[0, 1, 2, 3, 4, 5, 6, 7, 8]));
        assert!(!is_digit_permutation(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 10]));
    }

    #[test]
    fn winner_coordinate_is_deterministic() {
        let home_shuffle: Vec<u8> = vec![3, 1, 4, 0, 5, 9, 2, 6, 8, 7];
        let away_shuffle: Vec<u8> = vec![7, 8, 6, 2, 9, 5, 0, 4, 1, 3];

        // 21 % 10 = 1 -> index 1; 14 % 10 = 4 -> index 7.
        let first = winner_coordinate(21, 14, &home_shuffle, &away_shuffle);
        assert_eq!(first, Some((1, 7)));
        let second = winner_coordinate(21, 14, &home_shuffle, &away_shuffle);
        assert_eq!(first, second);
    }

    #[test]
    fn winner_coordinate_requires_locked_shuffles() {
        assert_eq!(winner_coordinate(21, 14, &[], &[]), None);
        assert_eq!(
            winner_coordinate(21, 14, &[0; 10], &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]),
            None
        );
    }
}
