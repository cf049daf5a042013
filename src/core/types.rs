use serde::{Serialize, Serializer};

pub const MONTHS_PER_YEAR: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationInput {
    pub consumptions: [f64; MONTHS_PER_YEAR],
    pub tariff_group: String,
    pub base_tariff: f64,
    pub pagluz_discount: f64,
    pub additional_rate: f64,
    pub cosip: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ProjectionPeriod {
    OneMonth,
    OneYear,
    ThreeYears,
    FiveYears,
    TenYears,
}

impl ProjectionPeriod {
    pub const ALL: [ProjectionPeriod; 5] = [
        ProjectionPeriod::OneMonth,
        ProjectionPeriod::OneYear,
        ProjectionPeriod::ThreeYears,
        ProjectionPeriod::FiveYears,
        ProjectionPeriod::TenYears,
    ];

    pub fn months(self) -> u32 {
        match self {
            ProjectionPeriod::OneMonth => 1,
            ProjectionPeriod::OneYear => 12,
            ProjectionPeriod::ThreeYears => 36,
            ProjectionPeriod::FiveYears => 60,
            ProjectionPeriod::TenYears => 120,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProjectionPeriod::OneMonth => "1 mês",
            ProjectionPeriod::OneYear => "1 ano",
            ProjectionPeriod::ThreeYears => "3 anos",
            ProjectionPeriod::FiveYears => "5 anos",
            ProjectionPeriod::TenYears => "10 anos",
        }
    }
}

/// Serialized as its display label so JSON and printed documents agree.
impl Serialize for ProjectionPeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub period: ProjectionPeriod,
    pub months: u32,
    pub celesc_value: f64,
    pub pagluz_value: f64,
    pub savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub average_consumption: f64,
    pub minimum_rate_kw: f64,
    pub celesc_value: f64,
    pub discount_value: f64,
    pub pagluz_value: f64,
    pub monthly_savings: f64,
    pub savings_percentage: f64,
    pub projections: Vec<Projection>,
}

impl SimulationResult {
    pub fn projection(&self, period: ProjectionPeriod) -> Option<&Projection> {
        self.projections.iter().find(|p| p.period == period)
    }

    pub fn annual_savings(&self) -> f64 {
        self.monthly_savings * ProjectionPeriod::OneYear.months() as f64
    }
}
