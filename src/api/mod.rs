use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    ContractDocument, DocumentError, DocumentKind, EconomyError, MONTHS_PER_YEAR,
    MinimumRateEntry, ProposalError, ProposalSummary, SimulationInput, SimulationResult,
    TariffGroup, build_proposal, calculate_economy, format_currency, format_kwh,
    format_percentage, minimum_rate_for, minimum_rate_table,
};

pub const DEFAULT_TARIFF_GROUP: &str = "B1 / Mono - Residencial Convencional";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("consumptions accepts at most 12 monthly readings, got {0}")]
    TooManyMonths(usize),
    #[error("consumption for month {month} must be a finite value >= 0, got {value}")]
    InvalidConsumption { month: usize, value: f64 },
    #[error("consumption for month {month} is not a number: {raw:?}")]
    UnparseableConsumption { month: usize, raw: String },
    #[error("baseTariff must be > 0, got {0}")]
    InvalidBaseTariff(f64),
    #[error("pagluzDiscount must be between 0 and 100, got {0}")]
    DiscountOutOfRange(f64),
    #[error("additionalRate must be >= 0, got {0}")]
    NegativeAdditionalRate(f64),
    #[error("cosip must be >= 0, got {0}")]
    NegativeCosip(f64),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Economy(#[from] EconomyError),
    #[error(transparent)]
    Proposal(#[from] ProposalError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Invalid API JSON payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("failed to format report")]
    Report,
}

#[derive(Parser, Debug)]
#[command(
    name = "pagluz",
    about = "PagLuz economy simulator (savings estimate, proposals and contract checks)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API
    Serve(ServeArgs),
    /// Print a savings report for one customer
    Simulate(SimulateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "PAGLUZ_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,
    #[arg(long, env = "PAGLUZ_PORT", default_value_t = 8080)]
    pub port: u16,
}

impl ServeArgs {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[arg(
        long = "consumption",
        value_delimiter = ',',
        required = true,
        help = "Monthly consumption in kWh, oldest first; 0 marks a month without reading"
    )]
    pub consumptions: Vec<f64>,
    #[arg(long, default_value = DEFAULT_TARIFF_GROUP, help = "Tariff group label as printed on the bill")]
    pub tariff_group: String,
    #[arg(long, default_value_t = 0.87, help = "Utility energy rate in R$/kWh")]
    pub base_tariff: f64,
    #[arg(
        long,
        default_value_t = 15.0,
        help = "Discount on energy above the minimum charge, in percent"
    )]
    pub pagluz_discount: f64,
    #[arg(
        long,
        default_value_t = 0.045,
        help = "Tariff component in R$/kWh excluded from the discount"
    )]
    pub additional_rate: f64,
    #[arg(long, default_value_t = 60.0, help = "Municipal public-lighting fee in R$")]
    pub cosip: f64,
    #[arg(long, help = "Client name; when given, the proposal summary is printed")]
    pub client_name: Option<String>,
}

pub fn build_input(args: SimulateArgs) -> Result<SimulationInput, InputError> {
    if args.consumptions.len() > MONTHS_PER_YEAR {
        return Err(InputError::TooManyMonths(args.consumptions.len()));
    }

    let mut consumptions = [0.0; MONTHS_PER_YEAR];
    for (idx, value) in args.consumptions.iter().copied().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(InputError::InvalidConsumption {
                month: idx + 1,
                value,
            });
        }
        consumptions[idx] = value;
    }

    if !args.base_tariff.is_finite() || args.base_tariff <= 0.0 {
        return Err(InputError::InvalidBaseTariff(args.base_tariff));
    }
    if !(0.0..=100.0).contains(&args.pagluz_discount) {
        return Err(InputError::DiscountOutOfRange(args.pagluz_discount));
    }
    if !args.additional_rate.is_finite() || args.additional_rate < 0.0 {
        return Err(InputError::NegativeAdditionalRate(args.additional_rate));
    }
    if !args.cosip.is_finite() || args.cosip < 0.0 {
        return Err(InputError::NegativeCosip(args.cosip));
    }

    Ok(SimulationInput {
        consumptions,
        tariff_group: args.tariff_group.trim().to_string(),
        base_tariff: args.base_tariff,
        pagluz_discount: args.pagluz_discount,
        additional_rate: args.additional_rate,
        cosip: args.cosip,
    })
}

fn default_args_for_api() -> SimulateArgs {
    SimulateArgs {
        consumptions: vec![200.0; MONTHS_PER_YEAR],
        tariff_group: DEFAULT_TARIFF_GROUP.to_string(),
        base_tariff: 0.87,
        pagluz_discount: 15.0,
        additional_rate: 0.045,
        cosip: 60.0,
        client_name: None,
    }
}

/// Query strings carry the readings as `200,180,0,...`; JSON bodies may use
/// either that form or an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ConsumptionsField {
    List(Vec<f64>),
    Csv(String),
}

impl ConsumptionsField {
    fn into_values(self) -> Result<Vec<f64>, InputError> {
        match self {
            ConsumptionsField::List(values) => Ok(values),
            ConsumptionsField::Csv(raw) => raw
                .split(',')
                .map(str::trim)
                .enumerate()
                .map(|(idx, part)| {
                    if part.is_empty() {
                        return Ok(0.0);
                    }
                    part.parse::<f64>()
                        .map_err(|_| InputError::UnparseableConsumption {
                            month: idx + 1,
                            raw: part.to_string(),
                        })
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    consumptions: Option<ConsumptionsField>,
    tariff_group: Option<String>,
    base_tariff: Option<f64>,
    pagluz_discount: Option<f64>,
    additional_rate: Option<f64>,
    cosip: Option<f64>,
    client_name: Option<String>,
}

#[derive(Debug)]
struct ApiRequest {
    input: SimulationInput,
    client_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    tariff_group: String,
    tariff_group_recognized: bool,
    minimum_rate_rs: f64,
    #[serde(flatten)]
    result: SimulationResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TariffGroupsResponse {
    default_minimum_rate_rs: f64,
    groups: Vec<MinimumRateEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContractCheckResponse {
    document_type: DocumentKind,
    title: &'static str,
    consumer_unit: String,
    end_date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/proposal", post(proposal_handler))
        .route("/api/tariff-groups", get(tariff_groups_handler))
        .route("/api/contracts/validate", post(contract_validate_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "PagLuz HTTP API listening");
    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(err) => return bad_request(&err),
    };
    match simulate(&request.input) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => bad_request(&err),
    }
}

async fn proposal_handler(Json(payload): Json<SimulatePayload>) -> Response {
    match proposal_from_payload(payload) {
        Ok(summary) => json_response(StatusCode::OK, summary),
        Err(err) => bad_request(&err),
    }
}

async fn tariff_groups_handler() -> Response {
    json_response(
        StatusCode::OK,
        TariffGroupsResponse {
            default_minimum_rate_rs: crate::core::DEFAULT_MINIMUM_RATE_RS,
            groups: minimum_rate_table(),
        },
    )
}

async fn contract_validate_handler(Json(body): Json<serde_json::Value>) -> Response {
    match check_contract(body) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => bad_request(&err),
    }
}

fn simulate(input: &SimulationInput) -> Result<SimulateResponse, ApiError> {
    let recognized = TariffGroup::from_label(&input.tariff_group).is_some();
    if !recognized {
        tracing::warn!(
            tariff_group = %input.tariff_group,
            "unknown tariff group, using default minimum rate"
        );
    }
    let result = calculate_economy(input)?;
    tracing::debug!(
        average_consumption = result.average_consumption,
        monthly_savings = result.monthly_savings,
        "simulation computed"
    );
    Ok(SimulateResponse {
        tariff_group: input.tariff_group.clone(),
        tariff_group_recognized: recognized,
        minimum_rate_rs: minimum_rate_for(&input.tariff_group),
        result,
    })
}

fn proposal_from_payload(payload: SimulatePayload) -> Result<ProposalSummary, ApiError> {
    let request = api_request_from_payload(payload)?;
    let simulated = simulate(&request.input)?;
    let client_name = request.client_name.unwrap_or_default();
    Ok(build_proposal(
        &client_name,
        &request.input,
        &simulated.result,
    )?)
}

fn check_contract(body: serde_json::Value) -> Result<ContractCheckResponse, ApiError> {
    let document: ContractDocument = serde_json::from_value(body)?;
    document.validate()?;
    tracing::info!(
        document_type = ?document.kind(),
        consumer_unit = document.consumer_unit(),
        "contract document validated"
    );
    Ok(ContractCheckResponse {
        document_type: document.kind(),
        title: document.title(),
        consumer_unit: document.consumer_unit().to_string(),
        end_date: document.end_date(),
    })
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn bad_request(err: &ApiError) -> Response {
    tracing::info!(error = %err, "rejected request");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, ApiError> {
    let payload = serde_json::from_str::<SimulatePayload>(json)?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, ApiError> {
    let mut args = default_args_for_api();

    if let Some(v) = payload.consumptions {
        args.consumptions = v.into_values()?;
    }
    if let Some(v) = payload.tariff_group {
        args.tariff_group = v;
    }
    if let Some(v) = payload.base_tariff {
        args.base_tariff = v;
    }
    if let Some(v) = payload.pagluz_discount {
        args.pagluz_discount = v;
    }
    if let Some(v) = payload.additional_rate {
        args.additional_rate = v;
    }
    if let Some(v) = payload.cosip {
        args.cosip = v;
    }

    let input = build_input(args)?;
    Ok(ApiRequest {
        input,
        client_name: payload.client_name,
    })
}

/// Plain-text report printed by `pagluz simulate`.
pub fn render_report(args: SimulateArgs) -> Result<String, ApiError> {
    let client_name = args.client_name.clone();
    let input = build_input(args)?;
    let simulated = simulate(&input)?;
    let proposal = match client_name {
        Some(name) => Some(build_proposal(&name, &input, &simulated.result)?),
        None => None,
    };

    let mut out = String::new();
    write_report(&mut out, &input, &simulated, proposal.as_ref())
        .map_err(|_| ApiError::Report)?;
    Ok(out)
}

fn write_report(
    out: &mut String,
    input: &SimulationInput,
    simulated: &SimulateResponse,
    proposal: Option<&ProposalSummary>,
) -> fmt::Result {
    let result = &simulated.result;

    writeln!(out, "PagLuz economy simulation")?;
    writeln!(out, "  Tariff group:        {}", input.tariff_group)?;
    if !simulated.tariff_group_recognized {
        writeln!(
            out,
            "  (unknown group, minimum charge {} assumed)",
            format_currency(simulated.minimum_rate_rs)
        )?;
    }
    writeln!(
        out,
        "  Average consumption: {}",
        format_kwh(result.average_consumption)
    )?;
    writeln!(
        out,
        "  Minimum billed:      {}",
        format_kwh(result.minimum_rate_kw)
    )?;
    writeln!(
        out,
        "  Current bill:        {}",
        format_currency(result.celesc_value)
    )?;
    writeln!(
        out,
        "  With PagLuz:         {}",
        format_currency(result.pagluz_value)
    )?;
    writeln!(
        out,
        "  Monthly savings:     {} ({})",
        format_currency(result.monthly_savings),
        format_percentage(result.savings_percentage)
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "  {:<8} {:>16} {:>16} {:>16}",
        "Period", "Current", "PagLuz", "Savings"
    )?;
    for projection in &result.projections {
        writeln!(
            out,
            "  {:<8} {:>16} {:>16} {:>16}",
            projection.period.label(),
            format_currency(projection.celesc_value),
            format_currency(projection.pagluz_value),
            format_currency(projection.savings)
        )?;
    }

    if let Some(proposal) = proposal {
        writeln!(out)?;
        writeln!(out, "Proposal for {}", proposal.client_name)?;
        writeln!(out, "  Annual savings:      {}", proposal.annual_savings)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{self, Body};
    use axum::http::{HeaderMap, Request};
    use tower::ServiceExt;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_args() -> SimulateArgs {
        default_args_for_api()
    }

    #[test]
    fn build_input_pads_missing_months_with_zero() {
        let mut args = sample_args();
        args.consumptions = vec![100.0, 0.0, 300.0];
        let input = build_input(args).expect("valid input");
        assert_eq!(input.consumptions[0], 100.0);
        assert_eq!(input.consumptions[2], 300.0);
        assert!(input.consumptions[3..].iter().all(|kwh| *kwh == 0.0));
    }

    #[test]
    fn build_input_rejects_more_than_twelve_months() {
        let mut args = sample_args();
        args.consumptions = vec![100.0; 13];
        assert_eq!(build_input(args), Err(InputError::TooManyMonths(13)));
    }

    #[test]
    fn build_input_rejects_negative_consumption() {
        let mut args = sample_args();
        args.consumptions[4] = -1.0;
        assert_eq!(
            build_input(args),
            Err(InputError::InvalidConsumption {
                month: 5,
                value: -1.0
            })
        );
    }

    #[test]
    fn build_input_rejects_zero_base_tariff() {
        let mut args = sample_args();
        args.base_tariff = 0.0;
        assert_eq!(build_input(args), Err(InputError::InvalidBaseTariff(0.0)));
    }

    #[test]
    fn build_input_rejects_out_of_range_rates() {
        let mut args = sample_args();
        args.pagluz_discount = 101.0;
        assert_eq!(
            build_input(args),
            Err(InputError::DiscountOutOfRange(101.0))
        );

        let mut args = sample_args();
        args.additional_rate = -0.01;
        assert_eq!(
            build_input(args),
            Err(InputError::NegativeAdditionalRate(-0.01))
        );

        let mut args = sample_args();
        args.cosip = -5.0;
        assert_eq!(build_input(args), Err(InputError::NegativeCosip(-5.0)));
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let json = r#"{
            "consumptions": [150, 0, 250],
            "tariffGroup": "B3 / Tri - Comercial",
            "baseTariff": 0.92,
            "pagluzDiscount": 20,
            "additionalRate": 0.05,
            "cosip": 35.5,
            "clientName": "Padaria Estrela"
        }"#;
        let request = api_request_from_json(json).expect("valid payload");
        let input = request.input;
        assert_eq!(input.consumptions[..3], [150.0, 0.0, 250.0]);
        assert_eq!(input.tariff_group, "B3 / Tri - Comercial");
        assert_approx(input.base_tariff, 0.92);
        assert_approx(input.pagluz_discount, 20.0);
        assert_approx(input.additional_rate, 0.05);
        assert_approx(input.cosip, 35.5);
        assert_eq!(request.client_name.as_deref(), Some("Padaria Estrela"));
    }

    #[test]
    fn api_request_defaults_to_residential_scenario() {
        let request = api_request_from_json("{}").expect("defaults are valid");
        assert_eq!(request.input.consumptions, [200.0; MONTHS_PER_YEAR]);
        assert_eq!(request.input.tariff_group, DEFAULT_TARIFF_GROUP);
        assert_approx(request.input.base_tariff, 0.87);
    }

    #[test]
    fn api_request_accepts_comma_separated_consumptions() {
        let request = api_request_from_json(r#"{"consumptions": "120, 0,,180"}"#)
            .expect("valid payload");
        assert_eq!(request.input.consumptions[..4], [120.0, 0.0, 0.0, 180.0]);
    }

    #[test]
    fn api_request_rejects_unparseable_reading() {
        let err = api_request_from_json(r#"{"consumptions": "120,abc"}"#)
            .expect_err("reading must be numeric");
        assert!(matches!(
            err,
            ApiError::Input(InputError::UnparseableConsumption { month: 2, .. })
        ));
    }

    #[test]
    fn simulate_response_serialization_contains_expected_fields() {
        let input = build_input(sample_args()).expect("valid input");
        let response = simulate(&input).expect("valid simulation");
        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"tariffGroupRecognized\":true"));
        assert!(json.contains("\"minimumRateRs\":22.5"));
        assert!(json.contains("\"averageConsumption\""));
        assert!(json.contains("\"monthlySavings\""));
        assert!(json.contains("\"savingsPercentage\""));
        assert!(json.contains("\"projections\""));
        assert!(json.contains("\"10 anos\""));
    }

    #[test]
    fn unknown_tariff_group_is_flagged_not_rejected() {
        let mut args = sample_args();
        args.tariff_group = "Grupo A4".to_string();
        let input = build_input(args).expect("valid input");
        let response = simulate(&input).expect("fallback applies");
        assert!(!response.tariff_group_recognized);
        assert_approx(response.minimum_rate_rs, 22.5);
    }

    #[test]
    fn proposal_requires_client_name() {
        let payload = SimulatePayload::default();
        assert!(matches!(
            proposal_from_payload(payload),
            Err(ApiError::Proposal(ProposalError::MissingClientName))
        ));
    }

    #[test]
    fn proposal_formats_residential_scenario() {
        let payload = SimulatePayload {
            client_name: Some("Maria Souza".to_string()),
            ..SimulatePayload::default()
        };
        let summary = proposal_from_payload(payload).expect("valid proposal");
        assert_eq!(summary.current_bill, "R$ 234,00");
        assert_eq!(summary.monthly_savings, "R$ 21,55");
    }

    #[test]
    fn contract_check_reports_title_and_kind() {
        let body = serde_json::json!({
            "documentType": "power-of-attorney-individual",
            "grantorName": "Maria Souza",
            "cpf": "529.982.247-25",
            "address": "Rua B, 2",
            "consumerUnit": "555"
        });
        let response = check_contract(body).expect("valid document");
        assert_eq!(response.document_type, DocumentKind::PowerOfAttorneyIndividual);
        assert_eq!(response.title, "Procuração - Pessoa Física");
        assert_eq!(response.consumer_unit, "555");
        assert_eq!(response.end_date, None);
    }

    #[test]
    fn contract_check_rejects_missing_discriminant() {
        let body = serde_json::json!({ "grantorName": "Maria" });
        assert!(matches!(check_contract(body), Err(ApiError::Payload(_))));
    }

    #[test]
    fn report_lists_every_projection_period() {
        let mut args = sample_args();
        args.client_name = Some("Maria Souza".to_string());
        let report = render_report(args).expect("valid report");
        assert!(report.contains("Current bill:        R$ 234,00"));
        for label in ["1 mês", "1 ano", "3 anos", "5 anos", "10 anos"] {
            assert!(report.contains(label), "missing {label} in report");
        }
        assert!(report.contains("Proposal for Maria Souza"));
    }

    #[test]
    fn report_notes_unknown_group_and_omits_proposal_without_client() {
        let mut args = sample_args();
        args.tariff_group = "Grupo A4".to_string();
        let report = render_report(args).expect("valid report");
        assert!(report.contains("(unknown group, minimum charge R$ 22,50 assumed)"));
        assert!(!report.contains("Proposal for"));
    }

    #[test]
    fn cli_parses_simulate_subcommand() {
        let cli = Cli::try_parse_from([
            "pagluz",
            "simulate",
            "--consumption",
            "200,180,0",
            "--base-tariff",
            "0.9",
        ])
        .expect("valid command line");
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate subcommand");
        };
        assert_eq!(args.consumptions, vec![200.0, 180.0, 0.0]);
        assert_approx(args.base_tariff, 0.9);
        assert_eq!(args.tariff_group, DEFAULT_TARIFF_GROUP);
    }

    #[tokio::test]
    async fn simulate_handler_rejects_invalid_payload_with_bad_request() {
        let payload = SimulatePayload {
            base_tariff: Some(0.0),
            ..SimulatePayload::default()
        };
        let response = simulate_handler_impl(payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&header::HeaderValue::from_static("no-store"))
        );
    }

    #[tokio::test]
    async fn simulate_handler_accepts_defaults() {
        let response = simulate_handler_impl(SimulatePayload::default()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    async fn send(request: Request<Body>) -> (StatusCode, HeaderMap, serde_json::Value) {
        let response = router().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let json = serde_json::from_slice(&bytes).expect("body should be JSON");
        (status, headers, json)
    }

    async fn get_json(uri: &str) -> (StatusCode, HeaderMap, serde_json::Value) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request");
        send(request).await
    }

    async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        let (status, _, json) = send(request).await;
        (status, json)
    }

    #[tokio::test]
    async fn router_simulates_from_query_string() {
        let (status, headers, json) = get_json("/api/simulate?consumptions=0,0,150").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers.get(header::CACHE_CONTROL),
            Some(&header::HeaderValue::from_static("no-store"))
        );
        assert_eq!(json["averageConsumption"], 150.0);
        assert_eq!(json["tariffGroupRecognized"], true);
        assert_eq!(json["projections"][4]["period"], "10 anos");
    }

    #[tokio::test]
    async fn router_rejects_bad_query_with_error_body() {
        let (status, headers, json) = get_json("/api/simulate?baseTariff=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            headers.get(header::CACHE_CONTROL),
            Some(&header::HeaderValue::from_static("no-store"))
        );
        assert!(
            json["error"]
                .as_str()
                .is_some_and(|msg| msg.contains("baseTariff"))
        );
    }

    #[tokio::test]
    async fn router_lists_tariff_groups() {
        let (status, _, json) = get_json("/api/tariff-groups").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["defaultMinimumRateRs"], 22.5);
        assert_eq!(json["groups"].as_array().map(Vec::len), Some(12));
    }

    #[tokio::test]
    async fn router_reports_health() {
        let (status, _, json) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn router_falls_back_to_not_found() {
        let (status, headers, json) = get_json("/api/unknown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, serde_json::json!({ "error": "Not found" }));
        assert_eq!(
            headers.get(header::CACHE_CONTROL),
            Some(&header::HeaderValue::from_static("no-store"))
        );
    }

    #[tokio::test]
    async fn router_builds_proposal_from_json_body() {
        let (status, json) = post_json(
            "/api/proposal",
            serde_json::json!({ "clientName": "Maria Souza" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["currentBill"], "R$ 234,00");
    }

    #[tokio::test]
    async fn router_validates_contract_documents() {
        let (status, json) = post_json(
            "/api/contracts/validate",
            serde_json::json!({
                "documentType": "power-of-attorney-individual",
                "grantorName": "Maria Souza",
                "cpf": "529.982.247-25",
                "address": "Rua B, 2",
                "consumerUnit": "555"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["documentType"], "power-of-attorney-individual");
        assert_eq!(json["consumerUnit"], "555");
        assert!(json["endDate"].is_null());
    }
}
