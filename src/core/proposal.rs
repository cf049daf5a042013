use serde::Serialize;
use thiserror::Error;

use super::engine::{EconomyError, calculate_economy};
use super::format::{format_currency, format_kwh, format_percentage};
use super::types::{SimulationInput, SimulationResult};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProposalError {
    #[error("client name is required for a proposal")]
    MissingClientName,
    #[error(transparent)]
    Economy(#[from] EconomyError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRow {
    pub label: &'static str,
    pub months: u32,
    pub celesc_value: String,
    pub pagluz_value: String,
    pub savings: String,
}

/// Figures a proposal document shows, already formatted for print.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalSummary {
    pub client_name: String,
    pub tariff_group: String,
    pub average_consumption: String,
    pub current_bill: String,
    pub discounted_bill: String,
    pub monthly_savings: String,
    pub annual_savings: String,
    pub savings_percentage: String,
    pub projections: Vec<ProposalRow>,
}

pub fn build_proposal(
    client_name: &str,
    input: &SimulationInput,
    result: &SimulationResult,
) -> Result<ProposalSummary, ProposalError> {
    let client_name = client_name.trim();
    if client_name.is_empty() {
        return Err(ProposalError::MissingClientName);
    }

    let projections = result
        .projections
        .iter()
        .map(|projection| ProposalRow {
            label: projection.period.label(),
            months: projection.months,
            celesc_value: format_currency(projection.celesc_value),
            pagluz_value: format_currency(projection.pagluz_value),
            savings: format_currency(projection.savings),
        })
        .collect();

    Ok(ProposalSummary {
        client_name: client_name.to_string(),
        tariff_group: input.tariff_group.trim().to_string(),
        average_consumption: format_kwh(result.average_consumption),
        current_bill: format_currency(result.celesc_value),
        discounted_bill: format_currency(result.pagluz_value),
        monthly_savings: format_currency(result.monthly_savings),
        annual_savings: format_currency(result.annual_savings()),
        savings_percentage: format_percentage(result.savings_percentage),
        projections,
    })
}

/// Runs the calculation and formats the proposal in one step.
pub fn simulate_proposal(
    client_name: &str,
    input: &SimulationInput,
) -> Result<ProposalSummary, ProposalError> {
    let result = calculate_economy(input)?;
    build_proposal(client_name, input, &result)
}
