use crate::user::User;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// §4.E threshold adaptation: recomputes a detector's threshold from the
/// candidate batch that just decided this tick's blocks. Lagged by one
/// window by construction — callers apply the result to the *next*
/// iteration, never the one that produced `candidates`.
pub fn update_threshold(default_threshold: Decimal, candidates: &[User]) -> Decimal {
    if candidates.is_empty() {
        return default_threshold;
    }

    let values: Vec<f64> = candidates
        .iter()
        .filter_map(|u| u.value.and_then(|v| v.to_f64()))
        .collect();

    if values.is_empty() {
        return default_threshold;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    let stddev = variance.sqrt();

    Decimal::from_f64(mean + stddev)
        .unwrap_or(default_threshold)
        .round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn value_user(v: i64) -> User {
        User::new()
            .with_ip(format!("10.0.0.{v}").parse().unwrap())
            .with_value(Decimal::from(v))
    }

    #[test]
    fn reset_to_default_on_empty_batch() {
        let result = update_threshold(dec!(10.00), &[]);
        assert_eq!(result, dec!(10.00));
    }

    #[test]
    fn steady_state_scenario_threshold_is_mean_plus_zero_stddev() {
        let candidates = vec![value_user(10), value_user(10), value_user(10)];
        let result = update_threshold(dec!(1.00), &candidates);
        assert_eq!(result, dec!(10.00));
    }

    #[test]
    fn burst_scenario_threshold_matches_mean_plus_population_stddev() {
        let candidates = vec![value_user(50), value_user(40), value_user(30)];
        let result = update_threshold(dec!(1.00), &candidates);
        let expected = dec!(48.16);
        assert!((result - expected).abs() <= dec!(0.01));
    }
}
