use serde::Serialize;

/// Minimum charge used when a tariff group label is not in the table.
pub const DEFAULT_MINIMUM_RATE_RS: f64 = 22.5;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsumerClass {
    Residential,
    Rural,
    Commercial,
    Industrial,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Connection {
    SinglePhase,
    TwoPhase,
    ThreePhase,
}

impl Connection {
    /// Regulated availability cost, in kWh billed even with no consumption.
    pub fn minimum_kwh(self) -> f64 {
        match self {
            Connection::SinglePhase => 30.0,
            Connection::TwoPhase => 50.0,
            Connection::ThreePhase => 100.0,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Connection::SinglePhase => "Mono",
            Connection::TwoPhase => "Bi",
            Connection::ThreePhase => "Tri",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TariffGroup {
    pub class: ConsumerClass,
    pub connection: Connection,
}

// Reference energy price the minimum charges were fixed at.
const REFERENCE_PRICE_RS: f64 = 0.75;

impl TariffGroup {
    pub const ALL: [TariffGroup; 12] = [
        TariffGroup::new(ConsumerClass::Residential, Connection::SinglePhase),
        TariffGroup::new(ConsumerClass::Residential, Connection::TwoPhase),
        TariffGroup::new(ConsumerClass::Residential, Connection::ThreePhase),
        TariffGroup::new(ConsumerClass::Rural, Connection::SinglePhase),
        TariffGroup::new(ConsumerClass::Rural, Connection::TwoPhase),
        TariffGroup::new(ConsumerClass::Rural, Connection::ThreePhase),
        TariffGroup::new(ConsumerClass::Commercial, Connection::SinglePhase),
        TariffGroup::new(ConsumerClass::Commercial, Connection::TwoPhase),
        TariffGroup::new(ConsumerClass::Commercial, Connection::ThreePhase),
        TariffGroup::new(ConsumerClass::Industrial, Connection::SinglePhase),
        TariffGroup::new(ConsumerClass::Industrial, Connection::TwoPhase),
        TariffGroup::new(ConsumerClass::Industrial, Connection::ThreePhase),
    ];

    pub const fn new(class: ConsumerClass, connection: Connection) -> Self {
        Self { class, connection }
    }

    /// Label as shown on the utility bill, e.g. `B1 / Mono - Residencial Convencional`.
    pub fn label(self) -> String {
        let (subgroup, name) = match self.class {
            ConsumerClass::Residential => ("B1", "Residencial Convencional"),
            ConsumerClass::Rural => ("B2", "Rural"),
            ConsumerClass::Commercial => ("B3", "Comercial"),
            ConsumerClass::Industrial => ("B3", "Industrial"),
        };
        format!("{subgroup} / {} - {name}", self.connection.label())
    }

    /// Matches labels ignoring surrounding whitespace and ASCII case.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|group| group.label().eq_ignore_ascii_case(wanted))
    }

    pub fn minimum_rate_rs(self) -> f64 {
        self.connection.minimum_kwh() * REFERENCE_PRICE_RS
    }
}

/// Minimum monthly charge for a tariff group label, falling back to
/// [`DEFAULT_MINIMUM_RATE_RS`] for labels outside the table.
pub fn minimum_rate_for(label: &str) -> f64 {
    TariffGroup::from_label(label)
        .map(TariffGroup::minimum_rate_rs)
        .unwrap_or(DEFAULT_MINIMUM_RATE_RS)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimumRateEntry {
    pub label: String,
    pub class: ConsumerClass,
    pub connection: Connection,
    pub minimum_kwh: f64,
    pub minimum_rate_rs: f64,
}

pub fn minimum_rate_table() -> Vec<MinimumRateEntry> {
    TariffGroup::ALL
        .into_iter()
        .map(|group| MinimumRateEntry {
            label: group.label(),
            class: group.class,
            connection: group.connection,
            minimum_kwh: group.connection.minimum_kwh(),
            minimum_rate_rs: group.minimum_rate_rs(),
        })
        .collect()
}
