//! Derived stats: pure functions over stored values

use crate::result::StatResult;
use chrono::{Datelike, NaiveDate};

/// Name of the derived shot total on player match lines
pub const TOTAL_SHOTS: &str = "total_shots";

const SHOTS_ON_TARGET: &str = "on_target_scoring_attempt";
const SHOTS_OFF_TARGET: &str = "shot_off_target";

/// Whole years between `birthday` and `as_of`.
///
/// Compares day-of-year, so around 29 February in leap years the result can
/// be one day early or late.
pub fn age(birthday: NaiveDate, as_of: NaiveDate) -> i32 {
    let mut years = as_of.year() - birthday.year();
    if as_of.ordinal() < birthday.ordinal() {
        years -= 1;
    }
    years
}

/// On-target plus off-target shots, absent operands counting as 0.
/// `None` when neither operand is present.
pub fn total_shots(stats: &StatResult) -> Option<f64> {
    let on_target = stats.get(SHOTS_ON_TARGET);
    let off_target = stats.get(SHOTS_OFF_TARGET);

    if on_target.is_none() && off_target.is_none() {
        return None;
    }

    Some(on_target.unwrap_or(0.0) + off_target.unwrap_or(0.0))
}

/// Add `total_shots` to `stats` when it can be derived
pub fn append_total_shots(stats: &mut StatResult) {
    if let Some(total) = total_shots(stats) {
        stats.insert(TOTAL_SHOTS, Some(total));
    }
}

/// Share of the non-null population strictly below `subject`.
///
/// The subject's own value is expected to be part of `population`. Returns
/// `None` for a null subject or an empty population.
pub fn percentile(subject: Option<f64>, population: &[Option<f64>]) -> Option<f64> {
    let subject = subject?;

    let (below, counted) = population
        .iter()
        .flatten()
        .fold((0usize, 0usize), |(below, counted), value| {
            (below + usize::from(*value < subject), counted + 1)
        });

    if counted == 0 {
        return None;
    }

    Some(below as f64 / counted as f64)
}
