use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::LeaseProjectionError;
use crate::types::{Money, Rate, Years};
use crate::LeaseProjectionResult;

const IRR_LOWER_BOUND: Decimal = dec!(-0.99);
const IRR_UPPER_BOUND: Decimal = dec!(10);
const MAX_IRR_ITERATIONS: u32 = 200;
const BRACKET_TOLERANCE: Decimal = dec!(0.0000000001);

/// Net Present Value of a series of yearly cash flows. The first flow is
/// undiscounted; flow `t` is discounted by `(1 + rate)^t`.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> LeaseProjectionResult<Money> {
    if rate <= dec!(-1) {
        return Err(LeaseProjectionError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            match discount.checked_mul(one_plus_r) {
                Some(d) => discount = d,
                // Remaining flows are below decimal precision once discounted
                None => break,
            }
        }
        if discount.is_zero() {
            return Err(LeaseProjectionError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}

/// NPV scaled by `(1 + rate)^n`. Same sign as [`npv`] for any rate above
/// -100%, but finite across the whole IRR bracket.
fn npv_sign_proxy(rate: Rate, cash_flows: &[Money]) -> Money {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r < Decimal::ONE {
        // Horner form: sum of cf_t * (1+r)^(n-t), every power below one
        cash_flows
            .iter()
            .fold(Decimal::ZERO, |acc, cf| acc * one_plus_r + cf)
    } else {
        let mut result = Decimal::ZERO;
        let mut discount = Decimal::ONE;
        for (t, cf) in cash_flows.iter().enumerate() {
            if t > 0 {
                match discount.checked_mul(one_plus_r) {
                    Some(d) => discount = d,
                    None => break,
                }
            }
            result += cf / discount;
        }
        result
    }
}

/// Internal Rate of Return by bisection over [-99%, 1000%].
///
/// Returns `None` when NPV does not change sign across the bracket, which
/// covers all-negative and all-positive flow series.
pub fn irr(cash_flows: &[Money]) -> Option<Rate> {
    if cash_flows.len() < 2 {
        return None;
    }
    let has_positive = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    let has_negative = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    if !has_positive || !has_negative {
        return None;
    }

    let mut lo = IRR_LOWER_BOUND;
    let mut hi = IRR_UPPER_BOUND;
    let f_lo = npv_sign_proxy(lo, cash_flows);
    let f_hi = npv_sign_proxy(hi, cash_flows);

    if f_lo.is_zero() {
        return Some(lo);
    }
    if f_hi.is_zero() {
        return Some(hi);
    }
    if f_lo.is_sign_negative() == f_hi.is_sign_negative() {
        return None;
    }

    let lo_negative = f_lo.is_sign_negative();
    for _ in 0..MAX_IRR_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let f_mid = npv_sign_proxy(mid, cash_flows);
        if f_mid.is_zero() || hi - lo < BRACKET_TOLERANCE {
            return Some(mid);
        }
        if f_mid.is_sign_negative() == lo_negative {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Some((lo + hi) / dec!(2))
}

/// Years until cumulative cash flow turns non-negative, interpolated
/// linearly inside the crossing year. `None` if it never does.
pub fn payback_period(cash_flows: &[Money]) -> Option<Years> {
    let mut cumulative = Decimal::ZERO;
    for (t, cf) in cash_flows.iter().enumerate() {
        let before = cumulative;
        cumulative += cf;
        if cumulative >= Decimal::ZERO {
            if t == 0 {
                return Some(Decimal::ZERO);
            }
            // cf > 0 here since before < 0 <= before + cf
            let fraction = -before / cf;
            return Some(Decimal::from(t as i64 - 1) + fraction);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        // NPV at 10%: -1000 + 300/1.1 + 400/1.21 + 500/1.331 ≈ -21.04
        assert!((result - dec!(-21.04)).abs() < dec!(1.0));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        let result = npv(dec!(0.0), &cfs).unwrap();
        assert_eq!(result, dec!(50));
    }

    #[test]
    fn test_npv_rejects_rate_at_minus_one() {
        assert!(npv(dec!(-1), &[dec!(1)]).is_err());
    }

    #[test]
    fn test_npv_survives_large_rates() {
        let cfs = vec![dec!(100); 40];
        let result = npv(dec!(10), &cfs).unwrap();
        assert!(result > dec!(100) && result < dec!(111));
    }

    #[test]
    fn test_irr_basic() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let result = irr(&cfs).unwrap();
        // IRR should be ~9.7%
        assert!((result - dec!(0.097)).abs() < dec!(0.01));
        assert!(npv(result, &cfs).unwrap().abs() < dec!(0.001));
    }

    #[test]
    fn test_irr_long_series() {
        let mut cfs = vec![dec!(-10_000_000)];
        cfs.extend(std::iter::repeat(dec!(1_500_000)).take(29));
        let result = irr(&cfs).unwrap();
        assert!(result > dec!(0.14) && result < dec!(0.15));
    }

    #[test]
    fn test_irr_undefined_for_all_negative_flows() {
        assert_eq!(irr(&[dec!(-100), dec!(-50), dec!(-10)]), None);
    }

    #[test]
    fn test_irr_undefined_without_sign_change_in_bracket() {
        // Positive NPV everywhere in the bracket despite mixed signs
        assert_eq!(irr(&[dec!(100), dec!(-1), dec!(100)]), None);
    }

    #[test]
    fn test_payback_interpolates_inside_crossing_year() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        // cumulative: -1000, -600, -200, 200 -> crosses in offset 3
        assert_eq!(payback_period(&cfs), Some(dec!(2.5)));
    }

    #[test]
    fn test_payback_immediate() {
        assert_eq!(payback_period(&[dec!(10), dec!(-5)]), Some(dec!(0)));
    }

    #[test]
    fn test_payback_undefined_when_never_recovered() {
        assert_eq!(payback_period(&[dec!(-10), dec!(-5), dec!(-1)]), None);
    }
}
