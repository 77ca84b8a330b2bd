use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::assumptions::proposal::{ProjectionInput, HISTORICAL_YEARS, TRANSITION_YEARS};
use crate::error::LeaseProjectionError;
use crate::types::{Money, Rate};
use crate::LeaseProjectionResult;

/// Parse a proposal from JSON. Missing or malformed parameters are reported
/// as configuration errors, never defaulted.
pub fn parse_input(json: &str) -> LeaseProjectionResult<ProjectionInput> {
    let input: ProjectionInput = serde_json::from_str(json)
        .map_err(|e| LeaseProjectionError::invalid("input", e.to_string()))?;
    validate_input(&input)?;
    Ok(input)
}

/// Internal-consistency checks that must pass before any period is simulated.
/// Business ranges are the caller's concern; this rejects inputs the engine
/// cannot simulate coherently.
pub fn validate_input(input: &ProjectionInput) -> LeaseProjectionResult<()> {
    validate_timeline(input)?;

    let timeline = &input.timeline;
    let series_end = timeline.series_end();

    validate_non_negative("opening_position.cash", input.opening_position.cash)?;
    validate_non_negative("opening_position.debt", input.opening_position.debt)?;

    for h in &input.historical {
        validate_non_negative("historical.enrollment", h.enrollment)?;
        validate_non_negative("historical.revenue", h.revenue)?;
        validate_non_negative("historical.staff_costs", h.staff_costs)?;
        validate_non_negative("historical.other_opex", h.other_opex)?;
        validate_non_negative("historical.rent", h.rent)?;
    }

    validate_non_negative("transition.base_rent", input.transition.base_rent)?;
    validate_growth("transition.rent_growth_rate", input.transition.rent_growth_rate)?;
    for t in &input.transition.years {
        validate_non_negative("transition.years.enrollment", t.enrollment)?;
        validate_non_negative("transition.years.average_tuition", t.average_tuition)?;
    }

    if input.curricula.is_empty() {
        return Err(LeaseProjectionError::invalid(
            "curricula",
            "Must contain at least one curriculum stream",
        ));
    }
    for stream in &input.curricula {
        let field = format!("curricula[{}]", stream.name);
        validate_non_negative(&format!("{field}.capacity"), stream.capacity)?;
        stream.ramp_up.validate(&format!("{field}.ramp_up"))?;
        stream.tuition.validate(&format!("{field}.tuition"), series_end)?;
    }

    for role in &input.staffing.roles {
        let field = format!("staffing.roles[{}]", role.name);
        if role.students_per_staff <= Decimal::ZERO {
            return Err(LeaseProjectionError::invalid(
                format!("{field}.students_per_staff"),
                format!("Ratio must be positive, got {}", role.students_per_staff),
            ));
        }
        input
            .staffing
            .salary_schedule(role)
            .validate(&format!("{field}.salary"), series_end)?;
    }

    input.rent.validate(timeline.contract_start_year, series_end)?;

    validate_rate("other_opex_pct", input.other_opex_pct)?;
    validate_rate("rates.zakat_rate", input.rates.zakat_rate)?;
    validate_rate("rates.debt_interest_rate", input.rates.debt_interest_rate)?;
    validate_rate("rates.deposit_interest_rate", input.rates.deposit_interest_rate)?;
    validate_growth("rates.discount_rate", input.rates.discount_rate)?;
    validate_non_negative("rates.minimum_cash_balance", input.rates.minimum_cash_balance)?;

    validate_capex(input)?;

    Ok(())
}

fn validate_timeline(input: &ProjectionInput) -> LeaseProjectionResult<()> {
    let t = &input.timeline;
    if t.contract_length_years == 0 {
        return Err(LeaseProjectionError::invalid(
            "timeline.contract_length_years",
            "Contract must run for at least one year",
        ));
    }
    if input.historical.len() != HISTORICAL_YEARS {
        return Err(LeaseProjectionError::InconsistentTimeline(format!(
            "Expected {HISTORICAL_YEARS} historical years, got {}",
            input.historical.len()
        )));
    }
    if input.transition.years.len() != TRANSITION_YEARS {
        return Err(LeaseProjectionError::InconsistentTimeline(format!(
            "Expected {TRANSITION_YEARS} transition years, got {}",
            input.transition.years.len()
        )));
    }

    let recorded = input
        .historical
        .iter()
        .map(|h| h.year)
        .chain(input.transition.years.iter().map(|t| t.year));
    for (expected, actual) in (t.first_year..).zip(recorded) {
        if expected != actual {
            return Err(LeaseProjectionError::InconsistentTimeline(format!(
                "Expected year {expected}, found {actual}; historical and transition years must be contiguous from {}",
                t.first_year
            )));
        }
    }

    let expected_start = t.first_year + (HISTORICAL_YEARS + TRANSITION_YEARS) as i32;
    if t.contract_start_year != expected_start {
        return Err(LeaseProjectionError::InconsistentTimeline(format!(
            "Contract must start in {expected_start} (after the last transition year), got {}",
            t.contract_start_year
        )));
    }
    Ok(())
}

fn validate_capex(input: &ProjectionInput) -> LeaseProjectionResult<()> {
    let capex = &input.capex;
    let mut seen = HashSet::new();
    for category in &capex.categories {
        if !seen.insert(category.name.as_str()) {
            return Err(LeaseProjectionError::invalid(
                "capex.categories",
                format!("Duplicate category '{}'", category.name),
            ));
        }
        if category.useful_life_years == 0 {
            return Err(LeaseProjectionError::invalid(
                format!("capex.categories[{}].useful_life_years", category.name),
                "Useful life must be at least one year",
            ));
        }
        if let Some(policy) = &category.policy {
            policy.validate(&format!("capex.categories[{}].policy", category.name))?;
        }
    }
    if let Some(policy) = &capex.default_policy {
        policy.validate("capex.default_policy")?;
    }
    if capex.auto_reinvestment
        && !capex
            .categories
            .iter()
            .any(|c| capex.policy_for(c).is_some())
    {
        return Err(LeaseProjectionError::invalid(
            "capex.auto_reinvestment",
            "Auto-reinvestment is enabled but no category has a reinvestment policy",
        ));
    }
    for asset in &capex.manual_assets {
        validate_non_negative("capex.manual_assets.amount", asset.amount)?;
    }
    Ok(())
}

fn validate_rate(field: &str, value: Rate) -> LeaseProjectionResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(LeaseProjectionError::invalid(
            field,
            format!("Rate must be between 0 and 1, got {value}"),
        ));
    }
    Ok(())
}

fn validate_growth(field: &str, value: Rate) -> LeaseProjectionResult<()> {
    if value <= -Decimal::ONE {
        return Err(LeaseProjectionError::invalid(
            field,
            format!("Rate must be greater than -100%, got {value}"),
        ));
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: Money) -> LeaseProjectionResult<()> {
    if value < Decimal::ZERO {
        return Err(LeaseProjectionError::invalid(
            field,
            format!("Value must be non-negative, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::sample_input;
    use crate::rent::RentModel;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sample_input_is_valid() {
        validate_input(&sample_input()).unwrap();
    }

    #[test]
    fn test_wrong_contract_start_rejected() {
        let mut input = sample_input();
        input.timeline.contract_start_year = 2030;
        assert!(matches!(
            validate_input(&input),
            Err(LeaseProjectionError::InconsistentTimeline(_))
        ));
    }

    #[test]
    fn test_gap_in_transition_years_rejected() {
        let mut input = sample_input();
        input.transition.years[1].year = 2030;
        assert!(matches!(
            validate_input(&input),
            Err(LeaseProjectionError::InconsistentTimeline(_))
        ));
    }

    #[test]
    fn test_missing_historical_year_rejected() {
        let mut input = sample_input();
        input.historical.pop();
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn test_tuition_reference_after_series_end_rejected() {
        let mut input = sample_input();
        input.curricula[0].tuition.reference_year = 2100;
        assert!(matches!(
            validate_input(&input),
            Err(LeaseProjectionError::ScheduleOutOfRange { .. })
        ));
    }

    #[test]
    fn test_inconsistent_rent_parameters_rejected() {
        let mut input = sample_input();
        input.rent = RentModel::RevenueShare {
            share_pct: dec!(0),
            minimum_guarantee: None,
        };
        let err = validate_input(&input).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_auto_reinvestment_without_policy_rejected() {
        let mut input = sample_input();
        input.capex.auto_reinvestment = true;
        input.capex.default_policy = None;
        for c in &mut input.capex.categories {
            c.policy = None;
        }
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn test_zero_staff_ratio_rejected() {
        let mut input = sample_input();
        input.staffing.roles[0].students_per_staff = dec!(0);
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn test_parse_input_reports_missing_rent_fields() {
        let mut value = serde_json::to_value(sample_input()).unwrap();
        value["rent"] = serde_json::json!({"model": "hybrid", "base_rent": "100"});
        let err = parse_input(&value.to_string()).unwrap_err();
        match err {
            LeaseProjectionError::InvalidInput { field, .. } => assert_eq!(field, "input"),
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
    }

    #[test]
    fn test_parse_input_accepts_serialized_sample() {
        let json = serde_json::to_string(&sample_input()).unwrap();
        assert_eq!(parse_input(&json).unwrap(), sample_input());
    }
}
