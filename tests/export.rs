//! Export files written from a real run, read back with the same crates.

use std::io::Write;

use peer_regression::app::pipeline::{ViewOptions, run_fit, run_with_dataset};
use peer_regression::data::{SampleConfig, generate_peers};
use peer_regression::domain::RunConfig;
use peer_regression::io::export::{write_results_csv, write_snapshot_json};
use tempfile::NamedTempFile;

const DATASET: &str = r#"{
    "x_label": "ROTE (%)",
    "y_label": "P/TBV (x)",
    "peers": [
        {"id": "HOPE", "x": 8.65, "y": 0.930},
        {"id": "CVBF", "x": 14.10, "y": 1.730},
        {"id": "EWBC", "x": 16.38, "y": 1.830},
        {"id": "HAFC", "x": 11.20, "y": 1.050},
        {"id": "BAD", "x": null, "y": 1.0}
    ],
    "target": {"id": "CATY", "x": 11.95, "y": 1.269},
    "fixed_coefficients": {"slope": 0.1244, "intercept": -0.1483}
}"#;

fn dataset_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(DATASET.as_bytes()).unwrap();
    file
}

fn config(path: &std::path::Path) -> RunConfig {
    RunConfig {
        data_path: path.to_path_buf(),
        refit: true,
        peers: Some(vec!["HOPE".into(), "CVBF".into(), "EWBC".into()]),
        top_n: 3,
        sensitivity: false,
        export_csv: None,
        export_json: None,
    }
}

#[test]
fn csv_has_one_row_per_peer_plus_overlay() {
    let data = dataset_file();
    let (ingest, run) = run_fit(&config(data.path())).unwrap();
    assert_eq!(ingest.row_errors.len(), 1);

    let out = NamedTempFile::new().unwrap();
    write_results_csv(out.path(), run.view(), &run.influence).unwrap();

    let mut reader = csv::Reader::from_path(out.path()).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["id", "x", "y", "predicted", "residual", "residual_pct", "included", "cooks_d"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 5);
    let included: Vec<&str> = rows.iter().map(|r| &r[6]).collect();
    assert_eq!(included, vec!["Yes", "Yes", "Yes", "No", "Overlay"]);
    assert_eq!(&rows[4][0], "CATY");
    // Excluded peers and the overlay carry no influence value.
    assert_eq!(&rows[3][7], "");
    assert_eq!(&rows[4][7], "");
    assert!(rows[0][7].parse::<f64>().unwrap() >= 0.0);
}

#[test]
fn snapshot_json_describes_the_view() {
    let data = dataset_file();
    let (ingest, run) = run_fit(&config(data.path())).unwrap();

    let out = NamedTempFile::new().unwrap();
    write_snapshot_json(
        out.path(),
        run.view(),
        run.controller.fixed(),
        &ingest.dataset.labels,
        run.residual_std_error,
        &run.band,
        &run.influence,
    )
    .unwrap();

    let text = std::fs::read_to_string(out.path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["tool"], "peerfit");
    assert_eq!(json["mode"], "refit");
    assert_eq!(json["source"], "refit");
    assert_eq!(json["using_fallback"], false);
    assert_eq!(json["selected"].as_array().unwrap().len(), 3);
    assert_eq!(json["peers"].as_array().unwrap().len(), 4);
    assert_eq!(json["target"]["peer"]["id"], "CATY");
    assert_eq!(json["fixed_coefficients"]["slope"], 0.1244);
    assert_eq!(json["fixed_coefficients"]["n"], 4);
    let slope = json["coefficients"]["slope"].as_f64().unwrap();
    assert!((slope - 0.12197).abs() < 1e-4);
    assert!(json["generated_at"].as_str().is_some());

    let band = json["band"].as_array().unwrap();
    assert_eq!(band.len(), 41);
    let sigma = json["residual_std_error"].as_f64().unwrap();
    assert!(sigma > 0.0);
    assert_eq!(band[0]["x"], 8.65);
    assert!((band[40]["x"].as_f64().unwrap() - 16.38).abs() < 1e-12);
    for point in band {
        let fitted = point["fitted"].as_f64().unwrap();
        assert!((point["upper"].as_f64().unwrap() - fitted - sigma).abs() < 1e-12);
        assert!((fitted - point["lower"].as_f64().unwrap() - sigma).abs() < 1e-12);
    }
}

#[test]
fn synthetic_demo_runs_end_to_end() {
    let dataset = generate_peers(&SampleConfig::default()).unwrap();
    let options = ViewOptions {
        refit: true,
        top_n: 3,
        sensitivity: true,
        ..Default::default()
    };
    let run = run_with_dataset(dataset, &options).unwrap();
    assert_eq!(run.view().selected.len(), 12);
    assert_eq!(run.sensitivity.len(), 12);
    assert!(run.residual_std_error > 0.0);
    assert!(run.rankings.rich.len() <= 3);
}
