use assert_cmd::cargo::cargo_bin_cmd;
use holter_lib::analysis::{AnalysisResult, Rhythm};
use holter_lib::report::ReportSnapshot;
use holter_lib::signal::Peaks;
use std::{error::Error, fs};

/// Spike train at 200 Hz: unit spikes on a flat baseline, first at index 50,
/// then one per spacing entry. 150-sample spacing is 750 ms, 80 BPM.
fn spike_csv(spacings: &[usize]) -> String {
    let len: usize = spacings.iter().sum::<usize>() + 100;
    let mut data = vec![0.0f64; len];
    let mut idx = 50;
    data[idx] = 1.0;
    for &gap in spacings {
        idx += gap;
        data[idx] = 1.0;
    }
    data.iter()
        .map(|v| format!("{v}\n"))
        .collect::<String>()
}

#[test]
fn analyze_reports_normal_sinus_for_regular_train() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("mit_synthetic.csv");
    fs::write(&path, spike_csv(&[150; 8]))?;

    let mut cmd = cargo_bin_cmd!("holter");
    cmd.args(["analyze", path.to_str().expect("utf8 path")]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let result: AnalysisResult = serde_json::from_slice(&output)?;

    assert_eq!(result.rhythm, Rhythm::NormalSinus);
    assert_eq!(result.risk, 15);
    assert!((result.heart_rate - 80.0).abs() < 1.0);
    Ok(())
}

#[test]
fn analyze_rejects_untagged_file_names() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("random_export.csv");
    fs::write(&path, spike_csv(&[150; 8]))?;

    let mut cmd = cargo_bin_cmd!("holter");
    cmd.args(["analyze", path.to_str().expect("utf8 path")]);
    cmd.assert().failure();
    Ok(())
}

#[test]
fn play_runs_to_completion_and_prints_final_snapshot() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("physionet_a001.csv");
    fs::write(&path, spike_csv(&[150; 8]))?;

    let mut cmd = cargo_bin_cmd!("holter");
    cmd.args([
        "play",
        path.to_str().expect("utf8 path"),
        "--model",
        "physionet",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let snapshot: ReportSnapshot = serde_json::from_slice(&output)?;

    assert_eq!(snapshot.rhythm, "Analysis Complete");
    assert_eq!(snapshot.confidence, 100.0);
    assert!(snapshot
        .explanation
        .contains("Final Classification: Normal Sinus"));
    Ok(())
}

#[test]
fn find_rpeaks_reads_stdin() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("holter");
    cmd.arg("find-rpeaks");
    cmd.write_stdin(spike_csv(&[150; 4]));
    let output = cmd.assert().success().get_output().stdout.clone();
    let peaks: Peaks = serde_json::from_slice(&output)?;

    assert_eq!(peaks.indices, vec![50, 200, 350, 500, 650]);
    Ok(())
}
