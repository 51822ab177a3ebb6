use std::{
    io::{self, Stdout},
    path::PathBuf,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use holter_lib::{
    alerts::{Alert, Severity},
    analysis::{analyze, AnalyzerConfig},
    events::DemoEventSource,
    io::text as text_io,
    playback::{PlaybackConfig, PlaybackPhase, PlaybackScheduler},
    report::ModelId,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::CrosstermBackend,
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};

fn main() -> Result<()> {
    env_logger::init();
    let path = std::env::args().nth(1).map(PathBuf::from);
    let mut terminal = setup_terminal()?;
    let mut app = App::new(path);
    let tick_rate = Duration::from_millis(16);
    let mut last_tick = Instant::now();

    while !app.should_quit {
        terminal.draw(|f| draw(f, &mut app))?;
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key.code);
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            app.on_tick(Instant::now());
            last_tick = Instant::now();
        }
    }

    restore_terminal()?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("initializing terminal")
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

struct App {
    scheduler: PlaybackScheduler,
    status: String,
    should_quit: bool,
}

fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

impl App {
    fn new(path: Option<PathBuf>) -> Self {
        let seed = wall_clock_seed();
        let source = Box::new(DemoEventSource::seeded(seed));
        let mut app = Self {
            scheduler: PlaybackScheduler::new(PlaybackConfig::default(), source, seed),
            status: "space play/pause | r replay | 1-3 model | q quit".into(),
            should_quit: false,
        };
        if let Some(path) = path {
            app.load_file(&path, Instant::now());
        }
        app
    }

    fn load_file(&mut self, path: &std::path::Path, now: Instant) {
        let cfg = PlaybackConfig::default();
        match text_io::load_recording(path, cfg.fs) {
            Ok(series) => {
                let analysis = analyze(&series, &AnalyzerConfig::default());
                self.status = format!(
                    "{}: {} samples, {}",
                    path.display(),
                    series.len(),
                    analysis.rhythm.label()
                );
                self.scheduler.load(series, analysis, now);
            }
            Err(err) => {
                // rejected uploads leave playback untouched
                self.scheduler
                    .trigger_alert(err.alert_message(), Severity::Critical, now);
                self.status = format!("Error: {}", err);
            }
        }
    }

    fn on_key(&mut self, code: KeyCode) {
        let now = Instant::now();
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(' ') => match self.scheduler.phase() {
                PlaybackPhase::Playing => self.scheduler.pause(),
                _ => {
                    if let Err(err) = self.scheduler.play(now) {
                        self.scheduler
                            .trigger_alert(err.alert_message(), Severity::Warning, now);
                        self.status = format!("Error: {}", err);
                    }
                }
            },
            KeyCode::Char('r') => {
                if let Err(err) = self.scheduler.replay(now) {
                    self.scheduler
                        .trigger_alert(err.alert_message(), Severity::Warning, now);
                    self.status = format!("Error: {}", err);
                }
            }
            KeyCode::Char('1') => self.scheduler.set_model(ModelId::MitBih),
            KeyCode::Char('2') => self.scheduler.set_model(ModelId::Ptb),
            KeyCode::Char('3') => self.scheduler.set_model(ModelId::Physionet),
            _ => {}
        }
    }

    fn on_tick(&mut self, now: Instant) {
        self.scheduler.tick(now);
    }
}

fn draw(f: &mut Frame, app: &mut App) {
    let size = f.size();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(size);

    draw_header(f, rows[0], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[1]);
    draw_waveform(f, middle[0], app);
    draw_vitals(f, middle[1], app);

    draw_progress(f, rows[2], app);
    draw_alerts(f, rows[3], app);
    draw_status(f, rows[4], app);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let model = app.scheduler.model();
    let phase = match app.scheduler.phase() {
        PlaybackPhase::Idle => "IDLE",
        PlaybackPhase::Playing => "LIVE",
        PlaybackPhase::Paused => "PAUSED",
        PlaybackPhase::Completed => "DONE",
    };
    let line = Line::from(vec![
        Span::styled(
            "HOLTER MONITOR ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("[{}] ", phase)),
        Span::raw(format!("model: {}", model.name())),
    ]);
    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_waveform(f: &mut Frame, area: Rect, app: &App) {
    let window = app.scheduler.window();
    let samples = window.snapshot();
    let points: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();
    let (y_min, y_max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let (y_min, y_max) = if y_min < y_max {
        (y_min - 0.1, y_max + 0.1)
    } else {
        (-1.0, 1.0)
    };
    let datasets = vec![Dataset::default()
        .name("lead II")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&points)];
    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title("Waveform"))
        .x_axis(
            Axis::default()
                .bounds([0.0, window.capacity() as f64])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(chart, area);
}

fn draw_vitals(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let vitals = app.scheduler.vitals();
    let hr = if vitals.heart_rate > 0.0 {
        format!("{:.0} BPM", vitals.heart_rate)
    } else {
        "-- BPM".into()
    };
    let lines = vec![
        Line::from(Span::styled(
            hr,
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vitals.rhythm_label.clone()),
        Line::from(format!("confidence {:.1}%", vitals.confidence)),
        Line::from(vitals.explanation.clone()),
    ];
    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Vitals"));
    f.render_widget(body, rows[0]);

    let risk = vitals.risk.min(100);
    let color = if risk > 70 {
        Color::Red
    } else if risk > 40 {
        Color::Yellow
    } else {
        Color::Green
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Risk"))
        .gauge_style(Style::default().fg(color))
        .percent(risk as u16);
    f.render_widget(gauge, rows[1]);
}

fn draw_progress(f: &mut Frame, area: Rect, app: &App) {
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Playback"))
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(app.scheduler.progress().round() as u16);
    f.render_widget(gauge, area);
}

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Severity::Warning => Style::default().fg(Color::Yellow),
        Severity::Info => Style::default().fg(Color::Blue),
    }
}

fn draw_alerts(f: &mut Frame, area: Rect, app: &mut App) {
    let alerts: Vec<Alert> = app.scheduler.alerts(Instant::now()).to_vec();
    let items: Vec<ListItem> = alerts
        .iter()
        .map(|a| ListItem::new(Span::styled(a.message.clone(), severity_style(a.severity))))
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Alerts"));
    f.render_widget(list, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let status = Paragraph::new(app.status.as_str())
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .wrap(Wrap { trim: true });
    f.render_widget(status, area);
}
