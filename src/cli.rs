//! CLI definition and dispatch.
//!
//! Every subcommand prints one JSON document on stdout. Progress and errors go
//! to stderr, and the exit code follows the error kind.

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{data_settings, request_defaults, validate_forecast_config};
use crate::domain::error::StockcastError;
use crate::domain::request::{
    PredictRequest, RawModel, RawPredictRequest, RawSeriesRequest, RequestDefaults, SeriesQuery,
};
use crate::domain::service::{self, PredictResponse, Providers};
use crate::ports::history_port::OutputSize;

#[derive(Parser, Debug)]
#[command(name = "stockcast", about = "Technical-indicator features and short-horizon price forecasts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct SeriesArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    #[arg(short, long)]
    pub ticker: String,
    /// daily, weekly or monthly
    #[arg(short, long)]
    pub frequency: Option<String>,
    #[arg(long)]
    pub market_ticker: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Forecast (or simulate) the next few closes
    Predict {
        #[command(flatten)]
        series: SeriesArgs,
        #[arg(short, long)]
        days: Option<i64>,
        /// auto or manual
        #[arg(short, long)]
        mode: Option<String>,
        /// ridge or random_forest
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        window: Option<i64>,
        #[arg(long)]
        alpha: Option<f64>,
        #[arg(long)]
        base_price: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        drift_pct: Option<f64>,
        #[arg(long)]
        vol_pct: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        slope: Option<f64>,
        /// Seed for the manual simulator's noise
        #[arg(long)]
        seed: Option<u64>,
        /// Anchor date for predictions (YYYY-MM-DD, default today UTC)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// List the feature columns a forecast would train on
    Features {
        #[command(flatten)]
        series: SeriesArgs,
        #[arg(long)]
        window: Option<i64>,
    },
    /// Show the trailing rows of the enriched series
    Indicators {
        #[command(flatten)]
        series: SeriesArgs,
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// Show the trailing raw bars
    History {
        #[command(flatten)]
        series: SeriesArgs,
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// Answer a JSON request payload read from a file or stdin
    Request {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(value_enum)]
        endpoint: Endpoint,
        /// Payload file; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Predict,
    Features,
    Indicators,
    History,
}

/// Loaded configuration plus the data adapter it points at.
pub struct Context {
    pub adapter: CsvAdapter,
    pub output_size: OutputSize,
    pub defaults: RequestDefaults,
}

impl Context {
    pub fn providers(&self) -> Providers<'_> {
        Providers {
            history: &self.adapter,
            fundamentals: &self.adapter,
            output_size: self.output_size,
        }
    }
}

pub fn load_context(path: &Path) -> Result<Context, StockcastError> {
    eprintln!("Loading config from {}", path.display());
    let config = FileConfigAdapter::from_file(path)?;
    validate_forecast_config(&config)?;
    let data = data_settings(&config)?;
    Ok(Context {
        adapter: CsvAdapter::new(data.dir),
        output_size: data.output_size,
        defaults: request_defaults(&config)?,
    })
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Predict {
            series,
            days,
            mode,
            model,
            window,
            alpha,
            base_price,
            drift_pct,
            vol_pct,
            slope,
            seed,
            today,
        } => {
            let raw = RawPredictRequest {
                ticker: Some(series.ticker.clone()),
                days: days.map(|d| d as f64),
                mode,
                frequency: series.frequency.clone(),
                model: model.map(RawModel::Name),
                window,
                alpha,
                market_ticker: series.market_ticker.clone(),
                base_price,
                drift_pct,
                vol_pct,
                slope,
            };
            with_context(&series.config, |ctx| {
                Ok(respond_predict(ctx, &raw, anchor(today), &mut rng(seed)))
            })
        }
        Command::Features { series, window } => with_context(&series.config, |ctx| {
            let query = series_query(ctx, &series, None, window)?;
            eprintln!("Listing feature columns for {}", query.symbol);
            Ok(json(&service::feature_columns(&ctx.providers(), &query)?))
        }),
        Command::Indicators { series, limit } => with_context(&series.config, |ctx| {
            let query = series_query(ctx, &series, limit, None)?;
            eprintln!("Computing indicators for {} ({})", query.symbol, query.frequency);
            Ok(json(&service::indicators(&ctx.providers(), &query)?))
        }),
        Command::History { series, limit } => with_context(&series.config, |ctx| {
            let query = series_query(ctx, &series, limit, None)?;
            Ok(json(&service::history(&ctx.providers(), &query)))
        }),
        Command::Request {
            config,
            endpoint,
            input,
            seed,
            today,
        } => with_context(&config, |ctx| {
            let payload = read_payload(input.as_deref())?;
            handle_request(ctx, endpoint, &payload, anchor(today), &mut rng(seed))
        }),
    }
}

/// Load the config, run `f` and print its JSON result. A predict error still
/// prints a response body (with `error` set) before the non-zero exit.
fn with_context<F>(config: &Path, f: F) -> ExitCode
where
    F: FnOnce(&Context) -> Result<(Value, Option<StockcastError>), StockcastError>,
{
    let outcome = load_context(config).and_then(|ctx| f(&ctx));
    match outcome {
        Ok((body, failure)) => {
            println!("{}", pretty(&body));
            match failure {
                Some(err) => fail(&err),
                None => ExitCode::SUCCESS,
            }
        }
        Err(err) => {
            println!(
                "{}",
                pretty(&serde_json::json!({ "error": err.to_string(), "status": err.status_code() }))
            );
            fail(&err)
        }
    }
}

fn fail(err: &StockcastError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

fn json<T: Serialize>(value: &T) -> (Value, Option<StockcastError>) {
    match serde_json::to_value(value) {
        Ok(v) => (v, None),
        Err(e) => (Value::Null, Some(StockcastError::Io(e.into()))),
    }
}

fn anchor(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Utc::now().date_naive())
}

fn rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn series_query(
    ctx: &Context,
    args: &SeriesArgs,
    limit: Option<i64>,
    window: Option<i64>,
) -> Result<SeriesQuery, StockcastError> {
    let raw = RawSeriesRequest {
        ticker: Some(args.ticker.clone()),
        frequency: args.frequency.clone(),
        function: None,
        limit,
        window,
        market_ticker: args.market_ticker.clone(),
    };
    SeriesQuery::from_raw(&raw, &ctx.defaults)
}

/// Normalise and answer a predict payload. Failures become a response body
/// with `error` set; the error is handed back for the exit code.
pub fn respond_predict(
    ctx: &Context,
    raw: &RawPredictRequest,
    today: NaiveDate,
    rng: &mut ChaCha8Rng,
) -> (Value, Option<StockcastError>) {
    let ticker = raw.ticker.as_deref().unwrap_or_default().trim().to_uppercase();
    let result = PredictRequest::from_raw(raw, &ctx.defaults).and_then(|request| {
        eprintln!(
            "Predicting {} {} step(s) ({:?}, {})",
            request.symbol, request.days, request.mode, request.frequency
        );
        service::predict(&ctx.providers(), &request, today, rng)
    });
    match result {
        Ok(response) => json(&response),
        Err(err) => {
            let (body, _) = json(&PredictResponse::from_error(ticker, &err));
            (body, Some(err))
        }
    }
}

/// Dispatch a JSON payload to one of the boundary operations.
pub fn handle_request(
    ctx: &Context,
    endpoint: Endpoint,
    payload: &str,
    today: NaiveDate,
    rng: &mut ChaCha8Rng,
) -> Result<(Value, Option<StockcastError>), StockcastError> {
    let providers = ctx.providers();
    match endpoint {
        Endpoint::Predict => {
            let raw: RawPredictRequest = parse_payload(payload)?;
            Ok(respond_predict(ctx, &raw, today, rng))
        }
        Endpoint::Features => {
            let query = series_payload(ctx, payload)?;
            Ok(json(&service::feature_columns(&providers, &query)?))
        }
        Endpoint::Indicators => {
            let query = series_payload(ctx, payload)?;
            Ok(json(&service::indicators(&providers, &query)?))
        }
        Endpoint::History => {
            let query = series_payload(ctx, payload)?;
            Ok(json(&service::history(&providers, &query)))
        }
    }
}

fn series_payload(ctx: &Context, payload: &str) -> Result<SeriesQuery, StockcastError> {
    let raw: RawSeriesRequest = parse_payload(payload)?;
    SeriesQuery::from_raw(&raw, &ctx.defaults)
}

fn parse_payload<T: serde::de::DeserializeOwned>(payload: &str) -> Result<T, StockcastError> {
    let payload = if payload.trim().is_empty() { "{}" } else { payload };
    serde_json::from_str(payload).map_err(|e| StockcastError::invalid(format!("malformed request: {e}")))
}

fn read_payload(input: Option<&Path>) -> Result<String, StockcastError> {
    match input {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
