use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use holter_lib::{
    analysis::{analyze, AnalyzerConfig},
    detectors::rpeak::{detect_r_peaks, PeakConfig},
    events::{DemoEventSource, EventSource, NullSource},
    io::text as text_io,
    playback::{PlaybackConfig, PlaybackScheduler, TickOutcome},
    report::ModelId,
    signal::SampleSeries,
};
use plotters::prelude::*;
use std::{
    io::{self, Read},
    path::{Path, PathBuf},
    time::Instant,
};

#[derive(Parser)]
#[command(
    name = "holter",
    version,
    about = "Single-lead ECG monitor: analysis, playback and plotting"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ModelArg {
    #[value(name = "mit-bih")]
    MitBih,
    Ptb,
    Physionet,
}

impl From<ModelArg> for ModelId {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::MitBih => ModelId::MitBih,
            ModelArg::Ptb => ModelId::Ptb,
            ModelArg::Physionet => ModelId::Physionet,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a tagged CSV recording and print the analysis as JSON
    Analyze {
        input: PathBuf,
        #[arg(long, default_value_t = 200.0)]
        fs: f64,
    },
    /// Detect R-peaks from newline-delimited samples read from stdin or --input file
    FindRpeaks {
        #[arg(long, default_value_t = 200.0)]
        fs: f64,
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Play a recording to completion headless and print the final snapshot
    Play {
        input: PathBuf,
        #[arg(long, default_value_t = 200.0)]
        fs: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Inject randomized transient events during playback
        #[arg(long)]
        demo_events: bool,
        /// Upper bound on scheduler ticks before giving up
        #[arg(long, default_value_t = 1_000_000)]
        max_ticks: u64,
        #[arg(long, default_value = "mit-bih")]
        model: ModelArg,
    },
    /// Render the waveform with detected R-peaks to a PNG via plotters
    Plot {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value_t = 200.0)]
        fs: f64,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze { input, fs } => cmd_analyze(&input, fs)?,
        Commands::FindRpeaks { fs, input } => cmd_find_rpeaks(fs, input.as_deref())?,
        Commands::Play {
            input,
            fs,
            seed,
            demo_events,
            max_ticks,
            model,
        } => cmd_play(&input, fs, seed, demo_events, max_ticks, model.into())?,
        Commands::Plot { input, fs, out } => cmd_plot(input.as_deref(), fs, &out)?,
    }
    Ok(())
}

fn read_samples(input: Option<&Path>) -> Result<Vec<f64>> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(text_io::parse_sample_series(&text)?)
}

fn cmd_analyze(input: &Path, fs: f64) -> Result<()> {
    let series = text_io::load_recording(input, fs)?;
    let result = analyze(&series, &AnalyzerConfig::default());
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

fn cmd_find_rpeaks(fs: f64, input: Option<&Path>) -> Result<()> {
    let data = read_samples(input)?;
    let series = SampleSeries { fs, data };
    let peaks = detect_r_peaks(&series, &PeakConfig::default());
    println!("{}", serde_json::to_string(&peaks)?);
    Ok(())
}

fn cmd_play(
    input: &Path,
    fs: f64,
    seed: u64,
    demo_events: bool,
    max_ticks: u64,
    model: ModelId,
) -> Result<()> {
    let series = text_io::load_recording(input, fs)?;
    let analysis = analyze(&series, &AnalyzerConfig::default());
    let source: Box<dyn EventSource> = if demo_events {
        Box::new(DemoEventSource::seeded(seed))
    } else {
        Box::new(NullSource)
    };
    let mut scheduler = PlaybackScheduler::new(PlaybackConfig::default(), source, seed);
    scheduler.set_model(model);
    scheduler.load(series, analysis, Instant::now());
    for _ in 0..max_ticks {
        match scheduler.tick(Instant::now()) {
            TickOutcome::Advanced { .. } => {}
            TickOutcome::Completed | TickOutcome::NotPlaying => break,
        }
    }
    println!("{}", serde_json::to_string(&scheduler.snapshot())?);
    Ok(())
}

fn cmd_plot(input: Option<&Path>, fs: f64, out: &Path) -> Result<()> {
    let data = read_samples(input)?;
    let series = SampleSeries { fs, data };
    let peaks = detect_r_peaks(&series, &PeakConfig::default());

    let root = BitMapBackend::new(out, (800, 480)).into_drawing_area();
    root.fill(&WHITE)?;
    let y_min = series.data.iter().cloned().fold(f64::INFINITY, f64::min);
    let y_max = series
        .data
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    let (y_min, y_max) = if y_min < y_max {
        (y_min, y_max)
    } else {
        (0.0, 1.0)
    };
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption("Single-lead ECG", ("sans-serif", 24))
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..series.duration(), y_min..y_max)?;
    chart.configure_mesh().draw()?;
    chart.draw_series(LineSeries::new(
        series
            .data
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64 / fs, v)),
        &BLUE,
    ))?;
    chart.draw_series(
        peaks
            .indices
            .iter()
            .map(|&i| Circle::new((i as f64 / fs, series.data[i]), 3, RED.filled())),
    )?;
    root.present()?;
    Ok(())
}
