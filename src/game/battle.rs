//! Battle odds.

/// Probability that an attacking group of `e1` units takes a cell defended
/// by `e2` units.
///
/// Against neutrals, matching their number is enough for a certain
/// conversion; against the opposing faction the attacker needs a 1.5x
/// advantage for a sure win. The sure-win shortcut is checked before the
/// equality case on purpose: equal armies against neutrals convert them
/// with certainty, they do not coin-flip.
pub fn win_probability(e1: u8, e2: u8, e2_is_neutral: bool) -> f64 {
    if (e2_is_neutral && e1 >= e2) || (!e2_is_neutral && f64::from(e1) >= 1.5 * f64::from(e2)) {
        return 1.0;
    }

    if e1 == e2 {
        return 0.5;
    }

    if e1 < e2 {
        f64::from(e1) / (2.0 * f64::from(e2))
    } else {
        f64::from(e1) / f64::from(e2) - 0.5
    }
}
