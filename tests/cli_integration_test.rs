//! CLI integration tests: config loading, argument parsing and JSON request
//! dispatch against CSV fixtures on disk.

use chrono::{Duration, NaiveDate};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::io::Write;
use std::path::Path;
use stockcast::cli::{self, Cli, Command, Endpoint};
use stockcast::domain::error::StockcastError;
use stockcast::domain::frequency::Frequency;
use stockcast::domain::model::ModelType;
use stockcast::domain::request::RawPredictRequest;
use stockcast::ports::history_port::OutputSize;
use tempfile::TempDir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 3).unwrap()
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(5)
}

fn write_series(dir: &Path, file: &str, n: usize) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut content = String::from("date,open,high,low,close,volume\n");
    for i in 0..n {
        let x = i as f64;
        let close = 50.0 + 0.1 * x + 2.0 * (x * 0.4).sin();
        let open = close - 0.3 * (x * 0.7).cos();
        let date = start + Duration::days(i as i64);
        content.push_str(&format!(
            "{date},{open:.4},{:.4},{:.4},{close:.4},{}\n",
            close.max(open) + 0.8,
            close.min(open) - 0.8,
            20_000 + (i % 13) * 150
        ));
    }
    fs::write(dir.join(file), content).unwrap();
}

/// Data directory with a long daily ACME series, a short SHORT series and a
/// config file pointing at it.
fn fixture(extra_config: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    write_series(dir.path(), "ACME_daily.csv", 180);
    write_series(dir.path(), "SHORT_daily.csv", 30);
    write_series(dir.path(), "IDX_daily.csv", 180);
    fs::write(
        dir.path().join("fundamentals.csv"),
        "symbol,eps,pe,peg,pb\nACME,4.1,12.5,,2.0\n",
    )
    .unwrap();

    let config_path = dir.path().join("stockcast.ini");
    let mut file = fs::File::create(&config_path).unwrap();
    write!(file, "[data]\ndir = {}\n{}", dir.path().display(), extra_config).unwrap();
    (dir, config_path)
}

mod config_loading {
    use super::*;

    #[test]
    fn load_context_reads_sections() {
        let (_dir, path) = fixture("output_size = compact\n\n[forecast]\nmodel_type = rf\ndays = 2\n");
        let ctx = cli::load_context(&path).unwrap();
        assert_eq!(ctx.output_size, OutputSize::Compact);
        assert_eq!(ctx.defaults.model.model_type, ModelType::RandomForest);
        assert_eq!(ctx.defaults.days, 2);
    }

    #[test]
    fn missing_data_dir_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.ini");
        fs::write(&path, "[forecast]\ndays = 3\n").unwrap();
        let err = cli::load_context(&path).err().unwrap();
        assert!(matches!(err, StockcastError::ConfigMissing { ref key, .. } if key == "dir"));
    }

    #[test]
    fn invalid_value_is_rejected_at_load() {
        let (_dir, path) = fixture("\n[forecast]\nridge_alpha = -1\n");
        let err = cli::load_context(&path).err().unwrap();
        assert!(matches!(err, StockcastError::ConfigInvalid { ref key, .. } if key == "ridge_alpha"));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn missing_config_file() {
        let err = cli::load_context(Path::new("/nonexistent/stockcast.ini")).err().unwrap();
        assert!(matches!(err, StockcastError::ConfigParse { .. }));
    }
}

mod arguments {
    use super::*;

    #[test]
    fn predict_flags_parse() {
        let cli = Cli::try_parse_from([
            "stockcast", "predict", "-c", "x.ini", "-t", "acme", "--days", "3", "--mode", "manual",
            "--drift-pct", "-0.5", "--seed", "7", "--today", "2025-01-02",
        ])
        .unwrap();
        match cli.command {
            Command::Predict {
                series,
                days,
                drift_pct,
                seed,
                today,
                ..
            } => {
                assert_eq!(series.ticker, "acme");
                assert_eq!(days, Some(3));
                assert_eq!(drift_pct, Some(-0.5));
                assert_eq!(seed, Some(7));
                assert_eq!(today, NaiveDate::from_ymd_opt(2025, 1, 2));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn request_endpoint_parses() {
        let cli = Cli::try_parse_from(["stockcast", "request", "-c", "x.ini", "features"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Request {
                endpoint: Endpoint::Features,
                ..
            }
        ));
    }

    #[test]
    fn ticker_is_required() {
        assert!(Cli::try_parse_from(["stockcast", "indicators", "-c", "x.ini"]).is_err());
    }
}

mod requests {
    use super::*;

    #[test]
    fn predict_payload_end_to_end() {
        let (_dir, path) = fixture("");
        let ctx = cli::load_context(&path).unwrap();
        let (body, failure) = cli::handle_request(
            &ctx,
            Endpoint::Predict,
            r#"{"ticker": "acme", "days": 4, "model": {"type": "ridge", "alpha": 2.0}}"#,
            today(),
            &mut rng(),
        )
        .unwrap();

        assert!(failure.is_none());
        assert_eq!(body["ticker"], "ACME");
        assert_eq!(body["source"], "model");
        assert!(body["error"].is_null());
        let predictions = body["predictions"].as_array().unwrap();
        assert_eq!(predictions.len(), 4);
        assert_eq!(predictions[0]["date"], "2025-02-04");
        assert!(body["indicators_latest"]["sma_20"].is_number());
    }

    #[test]
    fn predict_failure_still_has_response_body() {
        let (_dir, path) = fixture("");
        let ctx = cli::load_context(&path).unwrap();
        let raw = RawPredictRequest {
            ticker: Some("   ".into()),
            ..RawPredictRequest::default()
        };
        let (body, failure) = cli::respond_predict(&ctx, &raw, today(), &mut rng());

        let err = failure.unwrap();
        assert_eq!(err.status_code(), 400);
        assert_eq!(body["predictions"], serde_json::json!([]));
        assert_eq!(body["error"], "invalid input: ticker is required");
    }

    #[test]
    fn unknown_symbol_reports_insufficient_data() {
        let (_dir, path) = fixture("");
        let ctx = cli::load_context(&path).unwrap();
        let raw = RawPredictRequest {
            ticker: Some("ghost".into()),
            ..RawPredictRequest::default()
        };
        let (body, failure) = cli::respond_predict(&ctx, &raw, today(), &mut rng());
        assert!(failure.unwrap().is_insufficient_data());
        assert_eq!(body["ticker"], "GHOST");
        assert!(body["error"].as_str().unwrap().contains("GHOST"));
    }

    #[test]
    fn short_series_uses_drift_fallback() {
        let (_dir, path) = fixture("");
        let ctx = cli::load_context(&path).unwrap();
        let (body, _) = cli::handle_request(&ctx, Endpoint::Predict, r#"{"ticker": "SHORT"}"#, today(), &mut rng()).unwrap();
        assert_eq!(body["source"], "drift_fallback");
        assert_eq!(body["predictions"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn manual_payload_uses_config_defaults() {
        let (_dir, path) = fixture("\n[manual]\nvol_pct = 0\ndrift_pct = 1\n");
        let ctx = cli::load_context(&path).unwrap();
        let (body, _) = cli::handle_request(
            &ctx,
            Endpoint::Predict,
            r#"{"ticker": "ACME", "mode": "manual", "base_price": 100, "days": 2}"#,
            today(),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(body["source"], "manual");
        assert_eq!(body["predictions"][0]["price"], 101.0);
        assert_eq!(body["predictions"][1]["price"], 102.01);
    }

    #[test]
    fn features_payload_lists_known_inputs() {
        let (_dir, path) = fixture("");
        let ctx = cli::load_context(&path).unwrap();
        let (body, _) = cli::handle_request(
            &ctx,
            Endpoint::Features,
            r#"{"ticker": "ACME", "market_ticker": "IDX"}"#,
            today(),
            &mut rng(),
        )
        .unwrap();
        let columns: Vec<&str> = body["columns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c.as_str().unwrap())
            .collect();
        assert_eq!(body["count"], columns.len());
        assert!(columns.contains(&"market_index"));
        assert!(columns.contains(&"f_eps"));
        assert!(!columns.contains(&"f_peg"));
    }

    #[test]
    fn indicators_and_history_payloads() {
        let (_dir, path) = fixture("");
        let ctx = cli::load_context(&path).unwrap();

        let (body, _) = cli::handle_request(&ctx, Endpoint::Indicators, r#"{"ticker": "ACME", "limit": 3}"#, today(), &mut rng()).unwrap();
        assert_eq!(body["rows"].as_array().unwrap().len(), 3);
        assert_eq!(body["frequency"], "daily");

        let (body, _) = cli::handle_request(&ctx, Endpoint::History, r#"{"ticker": "ACME"}"#, today(), &mut rng()).unwrap();
        assert_eq!(body["rows"].as_array().unwrap().len(), 100);
        assert_eq!(body["rows"][99]["date"], "2024-06-28");
    }

    #[test]
    fn malformed_payload_is_invalid_input() {
        let (_dir, path) = fixture("");
        let ctx = cli::load_context(&path).unwrap();
        let err = cli::handle_request(&ctx, Endpoint::History, "{not json", today(), &mut rng()).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn frequency_from_function_name() {
        let (dir, path) = fixture("");
        write_series(dir.path(), "ACME_weekly.csv", 20);
        let ctx = cli::load_context(&path).unwrap();
        let (body, _) = cli::handle_request(
            &ctx,
            Endpoint::History,
            r#"{"ticker": "ACME", "function": "TIME_SERIES_WEEKLY"}"#,
            today(),
            &mut rng(),
        )
        .unwrap();
        assert_eq!(body["rows"].as_array().unwrap().len(), 20);
        assert_eq!(body["frequency"], Frequency::Weekly.as_str());
    }
}
