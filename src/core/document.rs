use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DocumentError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field}: expected a CPF (11 digits) or CNPJ (14 digits), got {value:?}")]
    MalformedTaxId { field: &'static str, value: String },
    #[error("{field}: invalid CPF {value:?}")]
    InvalidCpf { field: &'static str, value: String },
    #[error("{field}: invalid CNPJ {value:?}")]
    InvalidCnpj { field: &'static str, value: String },
    #[error("{0} must be > 0")]
    NonPositive(&'static str),
    #[error("termMonths {0} puts the contract end past the supported calendar")]
    TermOutOfRange(u32),
    #[error("discountPercentage must be between 0 and 100, got {0}")]
    DiscountOutOfRange(f64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxId {
    Cpf(String),
    Cnpj(String),
}

impl TaxId {
    /// Parses a CPF or CNPJ, ignoring punctuation, and verifies its check digits.
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, DocumentError> {
        let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();
        let has_other = raw
            .chars()
            .any(|c| !c.is_ascii_digit() && !matches!(c, '.' | '-' | '/' | ' '));
        if has_other {
            return Err(DocumentError::MalformedTaxId {
                field,
                value: raw.to_string(),
            });
        }

        let normalized: String = digits.iter().map(|d| char::from(b'0' + *d as u8)).collect();
        match digits.len() {
            11 if cpf_is_valid(&digits) => Ok(TaxId::Cpf(normalized)),
            11 => Err(DocumentError::InvalidCpf {
                field,
                value: raw.to_string(),
            }),
            14 if cnpj_is_valid(&digits) => Ok(TaxId::Cnpj(normalized)),
            14 => Err(DocumentError::InvalidCnpj {
                field,
                value: raw.to_string(),
            }),
            _ => Err(DocumentError::MalformedTaxId {
                field,
                value: raw.to_string(),
            }),
        }
    }

    pub fn digits(&self) -> &str {
        match self {
            TaxId::Cpf(digits) | TaxId::Cnpj(digits) => digits,
        }
    }
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|pair| pair[0] == pair[1])
}

fn cpf_check_digit(digits: &[u32]) -> u32 {
    let weight_start = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(idx, d)| d * (weight_start - idx as u32))
        .sum();
    let rest = sum * 10 % 11;
    if rest == 10 { 0 } else { rest }
}

fn cpf_is_valid(digits: &[u32]) -> bool {
    !all_same(digits)
        && cpf_check_digit(&digits[..9]) == digits[9]
        && cpf_check_digit(&digits[..10]) == digits[10]
}

fn cnpj_check_digit(digits: &[u32]) -> u32 {
    // Weights run 2..=9 from the rightmost digit, then wrap.
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(idx, d)| d * (2 + idx as u32 % 8))
        .sum();
    let rest = sum % 11;
    if rest < 2 { 0 } else { 11 - rest }
}

fn cnpj_is_valid(digits: &[u32]) -> bool {
    !all_same(digits)
        && cnpj_check_digit(&digits[..12]) == digits[12]
        && cnpj_check_digit(&digits[..13]) == digits[13]
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Party {
    pub name: String,
    pub tax_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RentalContract {
    pub lessor: Party,
    pub lessee: Party,
    pub consumer_unit: String,
    pub installation_address: String,
    pub monthly_rent: f64,
    pub term_months: u32,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ServiceContract {
    pub contractor: Party,
    pub consumer_unit: String,
    pub installation_address: String,
    pub discount_percentage: f64,
    pub term_months: u32,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct LegalEntityPowerOfAttorney {
    pub company_name: String,
    pub cnpj: String,
    pub representative: Party,
    pub consumer_unit: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct IndividualPowerOfAttorney {
    pub grantor_name: String,
    pub cpf: String,
    #[serde(default)]
    pub rg: Option<String>,
    pub address: String,
    pub consumer_unit: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    RentalContract,
    ServiceContract,
    PowerOfAttorneyLegalEntity,
    PowerOfAttorneyIndividual,
}

/// Legal documents produced alongside a proposal, selected by `documentType`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "documentType", rename_all = "kebab-case")]
pub enum ContractDocument {
    RentalContract(RentalContract),
    ServiceContract(ServiceContract),
    PowerOfAttorneyLegalEntity(LegalEntityPowerOfAttorney),
    PowerOfAttorneyIndividual(IndividualPowerOfAttorney),
}

impl ContractDocument {
    pub fn kind(&self) -> DocumentKind {
        match self {
            ContractDocument::RentalContract(_) => DocumentKind::RentalContract,
            ContractDocument::ServiceContract(_) => DocumentKind::ServiceContract,
            ContractDocument::PowerOfAttorneyLegalEntity(_) => {
                DocumentKind::PowerOfAttorneyLegalEntity
            }
            ContractDocument::PowerOfAttorneyIndividual(_) => {
                DocumentKind::PowerOfAttorneyIndividual
            }
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind() {
            DocumentKind::RentalContract => "Contrato de Locação de Equipamentos",
            DocumentKind::ServiceContract => "Contrato de Prestação de Serviços",
            DocumentKind::PowerOfAttorneyLegalEntity => "Procuração - Pessoa Jurídica",
            DocumentKind::PowerOfAttorneyIndividual => "Procuração - Pessoa Física",
        }
    }

    pub fn consumer_unit(&self) -> &str {
        match self {
            ContractDocument::RentalContract(doc) => &doc.consumer_unit,
            ContractDocument::ServiceContract(doc) => &doc.consumer_unit,
            ContractDocument::PowerOfAttorneyLegalEntity(doc) => &doc.consumer_unit,
            ContractDocument::PowerOfAttorneyIndividual(doc) => &doc.consumer_unit,
        }
    }

    /// Last day covered by a contract; powers of attorney have no term.
    pub fn end_date(&self) -> Option<NaiveDate> {
        let (start, term) = match self {
            ContractDocument::RentalContract(doc) => (doc.start_date, doc.term_months),
            ContractDocument::ServiceContract(doc) => (doc.start_date, doc.term_months),
            _ => return None,
        };
        start.checked_add_months(Months::new(term))?.pred_opt()
    }

    pub fn validate(&self) -> Result<(), DocumentError> {
        match self {
            ContractDocument::RentalContract(doc) => {
                validate_party("lessor", &doc.lessor)?;
                validate_party("lessee", &doc.lessee)?;
                require("consumerUnit", &doc.consumer_unit)?;
                require("installationAddress", &doc.installation_address)?;
                require_positive("monthlyRent", doc.monthly_rent)?;
                require_positive("termMonths", doc.term_months as f64)?;
                self.require_end_date(doc.term_months)?;
            }
            ContractDocument::ServiceContract(doc) => {
                validate_party("contractor", &doc.contractor)?;
                require("consumerUnit", &doc.consumer_unit)?;
                require("installationAddress", &doc.installation_address)?;
                if !(0.0..=100.0).contains(&doc.discount_percentage) {
                    return Err(DocumentError::DiscountOutOfRange(doc.discount_percentage));
                }
                require_positive("termMonths", doc.term_months as f64)?;
                self.require_end_date(doc.term_months)?;
            }
            ContractDocument::PowerOfAttorneyLegalEntity(doc) => {
                require("companyName", &doc.company_name)?;
                require("cnpj", &doc.cnpj)?;
                match TaxId::parse("cnpj", &doc.cnpj)? {
                    TaxId::Cnpj(_) => {}
                    TaxId::Cpf(_) => {
                        return Err(DocumentError::InvalidCnpj {
                            field: "cnpj",
                            value: doc.cnpj.clone(),
                        });
                    }
                }
                require("representative.name", &doc.representative.name)?;
                require_cpf("representative.taxId", &doc.representative.tax_id)?;
                require("consumerUnit", &doc.consumer_unit)?;
            }
            ContractDocument::PowerOfAttorneyIndividual(doc) => {
                require("grantorName", &doc.grantor_name)?;
                require_cpf("cpf", &doc.cpf)?;
                require("address", &doc.address)?;
                require("consumerUnit", &doc.consumer_unit)?;
            }
        }
        Ok(())
    }

    fn require_end_date(&self, term_months: u32) -> Result<(), DocumentError> {
        match self.end_date() {
            Some(_) => Ok(()),
            None => Err(DocumentError::TermOutOfRange(term_months)),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), DocumentError> {
    if value.trim().is_empty() {
        return Err(DocumentError::MissingField(field));
    }
    Ok(())
}

fn require_positive(field: &'static str, value: f64) -> Result<(), DocumentError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DocumentError::NonPositive(field));
    }
    Ok(())
}

fn require_cpf(field: &'static str, value: &str) -> Result<(), DocumentError> {
    require(field, value)?;
    match TaxId::parse(field, value)? {
        TaxId::Cpf(_) => Ok(()),
        TaxId::Cnpj(_) => Err(DocumentError::InvalidCpf {
            field,
            value: value.to_string(),
        }),
    }
}

fn validate_party(role: &'static str, party: &Party) -> Result<(), DocumentError> {
    require(role, &party.name)?;
    require(role, &party.tax_id)?;
    TaxId::parse(role, &party.tax_id).map(|_| ())
}
