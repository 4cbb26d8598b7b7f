mod error;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    Account, ContributionFrequency, DashboardSummary, FilingStatus, FinancialGoal,
    InvestmentProjection, Ledger, ProjectionInputs, TaxEstimate, TaxInputs, Transaction,
    TransactionFilter, TransactionType, add_transaction, delete_transaction, estimate_tax,
    filter_transactions, project_investment_growth, sample_ledger, summarize_dashboard,
    update_transaction,
};

pub use error::ApiError;

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_YEARS: u32 = 10;
const MAX_YEARS: u32 = 100;
const MAX_RATE_PERCENT: f64 = 100.0;
const DEFAULT_USER_ID: &str = "demo-user";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliContributionFrequency {
    Monthly,
    Yearly,
}

impl From<CliContributionFrequency> for ContributionFrequency {
    fn from(value: CliContributionFrequency) -> Self {
        match value {
            CliContributionFrequency::Monthly => ContributionFrequency::Monthly,
            CliContributionFrequency::Yearly => ContributionFrequency::Yearly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFilingStatus {
    Single,
    Married,
    #[value(name = "head", alias = "head-of-household")]
    HeadOfHousehold,
}

impl From<CliFilingStatus> for FilingStatus {
    fn from(value: CliFilingStatus) -> Self {
        match value {
            CliFilingStatus::Single => FilingStatus::Single,
            CliFilingStatus::Married => FilingStatus::Married,
            CliFilingStatus::HeadOfHousehold => FilingStatus::HeadOfHousehold,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiContributionFrequency {
    #[serde(alias = "month")]
    Monthly,
    #[serde(alias = "annual", alias = "annually")]
    Yearly,
}

impl From<ApiContributionFrequency> for CliContributionFrequency {
    fn from(value: ApiContributionFrequency) -> Self {
        match value {
            ApiContributionFrequency::Monthly => CliContributionFrequency::Monthly,
            ApiContributionFrequency::Yearly => CliContributionFrequency::Yearly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiFilingStatus {
    Single,
    Married,
    #[serde(
        rename = "head",
        alias = "head-of-household",
        alias = "headOfHousehold",
        alias = "head_of_household"
    )]
    HeadOfHousehold,
}

impl From<ApiFilingStatus> for CliFilingStatus {
    fn from(value: ApiFilingStatus) -> Self {
        match value {
            ApiFilingStatus::Single => CliFilingStatus::Single,
            ApiFilingStatus::Married => CliFilingStatus::Married,
            ApiFilingStatus::HeadOfHousehold => CliFilingStatus::HeadOfHousehold,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiTransactionTypeFilter {
    All,
    Income,
    Expense,
    Investment,
}

impl ApiTransactionTypeFilter {
    fn kind(self) -> Option<TransactionType> {
        match self {
            ApiTransactionTypeFilter::All => None,
            ApiTransactionTypeFilter::Income => Some(TransactionType::Income),
            ApiTransactionTypeFilter::Expense => Some(TransactionType::Expense),
            ApiTransactionTypeFilter::Investment => Some(TransactionType::Investment),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InvestmentPayload {
    #[serde(alias = "initialAmount")]
    principal: Option<f64>,
    #[serde(alias = "annualRate", alias = "expectedRate")]
    rate: Option<f64>,
    #[serde(alias = "timeHorizon")]
    years: Option<u32>,
    #[serde(alias = "contributionAmount", alias = "additionalContributions")]
    contribution: Option<f64>,
    #[serde(alias = "contributionFrequency")]
    frequency: Option<ApiContributionFrequency>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxPayload {
    salary: Option<f64>,
    other_income: Option<f64>,
    deductions: Option<f64>,
    filing_status: Option<ApiFilingStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DashboardPayload {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    goals: Vec<FinancialGoal>,
    month: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SampleDashboardQuery {
    user_id: Option<String>,
    month: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FilterPayload {
    transactions: Vec<Transaction>,
    #[serde(rename = "type")]
    kind: Option<ApiTransactionTypeFilter>,
    query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TransactionEditPayload {
    transactions: Vec<Transaction>,
    transaction: Option<Transaction>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TransactionDeletePayload {
    transactions: Vec<Transaction>,
    id: String,
}

#[derive(Parser, Debug)]
#[command(
    name = "finsight",
    about = "Personal finance calculators: investment growth, tax estimates and ledger summaries"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web calculators and JSON API
    Serve {
        #[arg(long, env = "FINSIGHT_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Project investment growth and print the breakdown as JSON
    Invest(InvestArgs),
    /// Estimate tax liability and print the breakdown as JSON
    Tax(TaxArgs),
    /// Summarize the demo ledger for a month and print it as JSON
    Dashboard(DashboardArgs),
}

#[derive(Args, Debug, Clone)]
struct InvestArgs {
    #[arg(long, help = "Starting balance")]
    principal: f64,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Expected annual return in percent, e.g. 7; negative values model depreciation"
    )]
    rate: f64,
    #[arg(long, default_value_t = DEFAULT_YEARS, help = "Projection horizon in years")]
    years: u32,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Amount added after interest in every contribution period"
    )]
    contribution: f64,
    #[arg(long, value_enum, default_value_t = CliContributionFrequency::Monthly)]
    frequency: CliContributionFrequency,
}

#[derive(Args, Debug, Clone)]
struct TaxArgs {
    #[arg(long, default_value_t = 0.0)]
    salary: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Interest, dividends, rental income and other non-wage income"
    )]
    other_income: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Standard deduction or total itemized deductions"
    )]
    deductions: f64,
    #[arg(long, value_enum, default_value_t = CliFilingStatus::Single)]
    filing_status: CliFilingStatus,
}

#[derive(Args, Debug, Clone)]
struct DashboardArgs {
    #[arg(long, default_value = DEFAULT_USER_ID)]
    user_id: String,
    #[arg(long, help = "Month to summarize as YYYY-MM; defaults to the current month")]
    month: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Parses `args` and runs the selected subcommand to completion.
pub async fn run_cli<I, T>(args: I) -> Result<(), ApiError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    match cli.command {
        Command::Serve { port } => run_http_server(port).await,
        Command::Invest(args) => {
            let projection = project_investment_growth(&build_projection_inputs(args)?);
            print_json(&projection)
        }
        Command::Tax(args) => {
            let estimate = estimate_tax(&build_tax_inputs(args)?);
            print_json(&estimate)
        }
        Command::Dashboard(args) => {
            let (year, month) = resolve_month(args.month.as_deref())?;
            let ledger = sample_ledger(&args.user_id);
            print_json(&summarize_dashboard(&ledger, year, month))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ApiError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_projection_inputs(args: InvestArgs) -> Result<ProjectionInputs, ApiError> {
    require_amount("principal", args.principal)?;
    require_amount("contribution", args.contribution)?;

    if !args.rate.is_finite() || args.rate.abs() > MAX_RATE_PERCENT {
        return Err(ApiError::invalid(
            "rate",
            format!("must be a percentage between -{MAX_RATE_PERCENT} and {MAX_RATE_PERCENT}"),
        ));
    }

    if !(1..=MAX_YEARS).contains(&args.years) {
        return Err(ApiError::invalid(
            "years",
            format!("must be between 1 and {MAX_YEARS}"),
        ));
    }

    Ok(ProjectionInputs {
        principal: args.principal,
        annual_rate_percent: args.rate,
        years: args.years,
        contribution_amount: args.contribution,
        contribution_frequency: args.frequency.into(),
    })
}

fn build_tax_inputs(args: TaxArgs) -> Result<TaxInputs, ApiError> {
    require_amount("salary", args.salary)?;
    require_amount("otherIncome", args.other_income)?;
    require_amount("deductions", args.deductions)?;

    Ok(TaxInputs {
        salary: args.salary,
        other_income: args.other_income,
        deductions: args.deductions,
        filing_status: args.filing_status.into(),
    })
}

fn require_amount(field: &'static str, value: f64) -> Result<(), ApiError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ApiError::invalid(
            field,
            "must be a finite, non-negative amount",
        ))
    }
}

/// Accepts `YYYY-MM`; `None` means the current local month.
fn resolve_month(month: Option<&str>) -> Result<(i32, u32), ApiError> {
    let Some(raw) = month.map(str::trim).filter(|m| !m.is_empty()) else {
        let today = Local::now().date_naive();
        return Ok((today.year(), today.month()));
    };

    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .map(|date| (date.year(), date.month()))
        .map_err(|_| ApiError::invalid("month", format!("must be YYYY-MM, got '{raw}'")))
}

pub async fn run_http_server(port: u16) -> Result<(), ApiError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    log::info!("finsight HTTP API listening on http://{addr}");
    log::info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, router()).await?;
    Ok(())
}

fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/investment",
            get(investment_get_handler).post(investment_post_handler),
        )
        .route("/api/tax", get(tax_get_handler).post(tax_post_handler))
        .route("/api/dashboard", post(dashboard_handler))
        .route("/api/dashboard/sample", get(sample_dashboard_handler))
        .route("/api/transactions/filter", post(filter_handler))
        .route("/api/transactions/add", post(add_transaction_handler))
        .route("/api/transactions/update", post(update_transaction_handler))
        .route("/api/transactions/delete", post(delete_transaction_handler))
        .fallback(not_found_handler)
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    ApiError::NotFound.into_response()
}

async fn investment_get_handler(
    payload: Result<Query<InvestmentPayload>, QueryRejection>,
) -> Response {
    respond(query_payload(payload).and_then(investment_response))
}

async fn investment_post_handler(
    payload: Result<Json<InvestmentPayload>, JsonRejection>,
) -> Response {
    respond(json_payload(payload).and_then(investment_response))
}

async fn tax_get_handler(payload: Result<Query<TaxPayload>, QueryRejection>) -> Response {
    respond(query_payload(payload).and_then(tax_response))
}

async fn tax_post_handler(payload: Result<Json<TaxPayload>, JsonRejection>) -> Response {
    respond(json_payload(payload).and_then(tax_response))
}

async fn dashboard_handler(payload: Result<Json<DashboardPayload>, JsonRejection>) -> Response {
    respond(json_payload(payload).and_then(dashboard_response))
}

async fn sample_dashboard_handler(
    query: Result<Query<SampleDashboardQuery>, QueryRejection>,
) -> Response {
    respond(query_payload(query).and_then(sample_dashboard_response))
}

async fn filter_handler(payload: Result<Json<FilterPayload>, JsonRejection>) -> Response {
    respond(json_payload(payload).map(filter_response))
}

async fn add_transaction_handler(
    payload: Result<Json<TransactionEditPayload>, JsonRejection>,
) -> Response {
    respond(json_payload(payload).and_then(add_transaction_response))
}

async fn update_transaction_handler(
    payload: Result<Json<TransactionEditPayload>, JsonRejection>,
) -> Response {
    respond(json_payload(payload).and_then(update_transaction_response))
}

async fn delete_transaction_handler(
    payload: Result<Json<TransactionDeletePayload>, JsonRejection>,
) -> Response {
    respond(json_payload(payload).map(delete_transaction_response))
}

fn json_payload<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| ApiError::InvalidPayload(rejection.body_text()))
}

fn query_payload<T>(payload: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    payload
        .map(|Query(inner)| inner)
        .map_err(|rejection| ApiError::InvalidPayload(rejection.body_text()))
}

fn respond<T: Serialize>(result: Result<T, ApiError>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => err.into_response(),
    }
}

fn investment_response(payload: InvestmentPayload) -> Result<InvestmentProjection, ApiError> {
    log::debug!("investment request: {payload:?}");
    let inputs = build_projection_inputs(invest_args_from_payload(payload)?)?;
    Ok(project_investment_growth(&inputs))
}

fn tax_response(payload: TaxPayload) -> Result<TaxEstimate, ApiError> {
    log::debug!("tax request: {payload:?}");
    let inputs = build_tax_inputs(tax_args_from_payload(payload))?;
    Ok(estimate_tax(&inputs))
}

fn dashboard_response(payload: DashboardPayload) -> Result<DashboardSummary, ApiError> {
    log::debug!(
        "dashboard request: {} accounts, {} transactions, {} goals",
        payload.accounts.len(),
        payload.transactions.len(),
        payload.goals.len()
    );
    let (year, month) = resolve_month(payload.month.as_deref())?;
    let ledger = Ledger {
        accounts: payload.accounts,
        transactions: payload.transactions,
        goals: payload.goals,
    };
    Ok(summarize_dashboard(&ledger, year, month))
}

fn sample_dashboard_response(query: SampleDashboardQuery) -> Result<DashboardSummary, ApiError> {
    let (year, month) = resolve_month(query.month.as_deref())?;
    let user_id = query.user_id.unwrap_or_else(|| DEFAULT_USER_ID.to_string());
    log::debug!("sample dashboard for {user_id} in {year}-{month:02}");
    Ok(summarize_dashboard(&sample_ledger(&user_id), year, month))
}

fn filter_response(payload: FilterPayload) -> Vec<Transaction> {
    let filter = TransactionFilter {
        kind: payload.kind.and_then(ApiTransactionTypeFilter::kind),
        query: payload.query,
    };
    filter_transactions(&payload.transactions, &filter)
}

fn add_transaction_response(
    payload: TransactionEditPayload,
) -> Result<Vec<Transaction>, ApiError> {
    let transaction = payload
        .transaction
        .ok_or_else(|| ApiError::invalid("transaction", "is required"))?;
    require_amount("transaction.amount", transaction.amount)?;
    Ok(add_transaction(payload.transactions, transaction))
}

fn update_transaction_response(
    payload: TransactionEditPayload,
) -> Result<Vec<Transaction>, ApiError> {
    let transaction = payload
        .transaction
        .ok_or_else(|| ApiError::invalid("transaction", "is required"))?;
    require_amount("transaction.amount", transaction.amount)?;
    Ok(update_transaction(payload.transactions, transaction))
}

fn delete_transaction_response(payload: TransactionDeletePayload) -> Vec<Transaction> {
    delete_transaction(payload.transactions, &payload.id)
}

fn invest_args_from_payload(payload: InvestmentPayload) -> Result<InvestArgs, ApiError> {
    let principal = payload
        .principal
        .ok_or_else(|| ApiError::invalid("principal", "is required"))?;
    let rate = payload
        .rate
        .ok_or_else(|| ApiError::invalid("rate", "is required"))?;

    Ok(InvestArgs {
        principal,
        rate,
        years: payload.years.unwrap_or(DEFAULT_YEARS),
        contribution: payload.contribution.unwrap_or(0.0),
        frequency: payload
            .frequency
            .map(Into::into)
            .unwrap_or(CliContributionFrequency::Monthly),
    })
}

fn tax_args_from_payload(payload: TaxPayload) -> TaxArgs {
    TaxArgs {
        salary: payload.salary.unwrap_or(0.0),
        other_income: payload.other_income.unwrap_or(0.0),
        deductions: payload.deductions.unwrap_or(0.0),
        filing_status: payload
            .filing_status
            .map(Into::into)
            .unwrap_or(CliFilingStatus::Single),
    }
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
