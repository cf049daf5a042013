mod document;
mod engine;
mod format;
mod proposal;
mod tariff;
mod types;

pub use document::{
    ContractDocument, DocumentError, DocumentKind, IndividualPowerOfAttorney,
    LegalEntityPowerOfAttorney, Party, RentalContract, ServiceContract, TaxId,
};
pub use engine::{EconomyError, calculate_economy};
pub use format::{format_currency, format_decimal, format_kwh, format_percentage};
pub use proposal::{ProposalError, ProposalRow, ProposalSummary, build_proposal, simulate_proposal};
pub use tariff::{
    Connection, ConsumerClass, DEFAULT_MINIMUM_RATE_RS, MinimumRateEntry, TariffGroup,
    minimum_rate_for, minimum_rate_table,
};
pub use types::{
    MONTHS_PER_YEAR, Projection, ProjectionPeriod, SimulationInput, SimulationResult,
};
