use thiserror::Error;

use super::tariff::minimum_rate_for;
use super::types::{Projection, ProjectionPeriod, SimulationInput, SimulationResult};

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum EconomyError {
    #[error("base tariff must be a finite non-zero rate, got {0}")]
    InvalidBaseTariff(f64),
}

pub fn calculate_economy(input: &SimulationInput) -> Result<SimulationResult, EconomyError> {
    if input.base_tariff == 0.0 || !input.base_tariff.is_finite() {
        return Err(EconomyError::InvalidBaseTariff(input.base_tariff));
    }

    let average_consumption = average_positive(&input.consumptions);
    let minimum_rate_kw = minimum_rate_for(&input.tariff_group) / input.base_tariff;

    let energy_cost = average_consumption * input.base_tariff;
    let celesc_value = energy_cost + input.cosip;
    let discount_value = discount_above_minimum(input, average_consumption, minimum_rate_kw);
    let pagluz_value = energy_cost - discount_value + input.cosip;

    let monthly_savings = (celesc_value - pagluz_value).max(0.0);
    let savings_percentage = if celesc_value > 0.0 {
        monthly_savings / celesc_value * 100.0
    } else {
        0.0
    };

    Ok(SimulationResult {
        average_consumption,
        minimum_rate_kw,
        celesc_value,
        discount_value,
        pagluz_value,
        monthly_savings,
        savings_percentage,
        projections: project(celesc_value, pagluz_value, monthly_savings),
    })
}

/// Mean of the months with a reading. Months at zero are left out of both
/// the sum and the count.
fn average_positive(consumptions: &[f64]) -> f64 {
    let (sum, count) = consumptions
        .iter()
        .filter(|kwh| **kwh > 0.0)
        .fold((0.0, 0usize), |(sum, count), kwh| (sum + kwh, count + 1));
    sum / count.max(1) as f64
}

// Only consumption above the availability minimum is eligible for discount.
fn discount_above_minimum(input: &SimulationInput, average: f64, minimum_rate_kw: f64) -> f64 {
    if average <= minimum_rate_kw {
        return 0.0;
    }
    (average - minimum_rate_kw)
        * (input.base_tariff - input.additional_rate)
        * (input.pagluz_discount / 100.0)
}

fn project(celesc_value: f64, pagluz_value: f64, monthly_savings: f64) -> Vec<Projection> {
    ProjectionPeriod::ALL
        .into_iter()
        .map(|period| {
            let months = period.months();
            let factor = months as f64;
            Projection {
                period,
                months,
                celesc_value: celesc_value * factor,
                pagluz_value: pagluz_value * factor,
                savings: monthly_savings * factor,
            }
        })
        .collect()
}
