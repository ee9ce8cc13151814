use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use pose_coach::{
    config::Config,
    decode::Layout,
    engine::{FrameResult, Session},
    exercise::ExerciseType,
    recording::Recording,
    session::SessionStats,
};
use serde::Serialize;
use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, Sender},
        Arc,
    },
};
use structopt::StructOpt;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;

#[derive(StructOpt)]
struct Opt {
    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    /// TOML file overriding the built-in thresholds and target angles.
    #[structopt(short, long)]
    config: Option<PathBuf>,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Replay landmark recordings, one session per recording.
    Analyze {
        /// pushup, squat, lunge or plank. Unknown names fall back to pushup.
        #[structopt(short, long, default_value = "pushup")]
        exercise: ExerciseType,

        /// Column layout of numeric landmark rows: xy-score or xyz-visibility.
        #[structopt(short = "-L", long, default_value = "xyz-visibility")]
        layout: Layout,

        #[structopt(short, long)]
        show_progress: bool,

        /// JSON-lines files with one landmark frame per line.
        #[structopt(required = true)]
        recordings: Vec<PathBuf>,
    },
    /// Write the default configuration as TOML.
    DumpConfig {
        /// Output file; stdout when omitted.
        path: Option<PathBuf>,
    },
}

#[derive(Serialize)]
#[serde(untagged)]
enum Line {
    Frame {
        recording: String,
        frame: usize,
        #[serde(flatten)]
        result: FrameResult,
        #[serde(skip)]
        recent_accuracy: u8,
    },
    Summary {
        recording: String,
        summary: SessionStats,
    },
}

fn replay(
    path: &Path,
    exercise: ExerciseType,
    layout: Layout,
    config: Arc<Config>,
    running: &AtomicBool,
    lines_tx: Sender<Line>,
) -> Result<()> {
    let recording_name = path.display().to_string();
    let recording = Recording::open(path, layout)?;
    let mut session = Session::start(exercise, config);

    let mut outcome = Ok(());
    for (frame_num, frame) in recording.enumerate() {
        if !running.load(Ordering::SeqCst) {
            debug!(recording = %recording_name, "stopping early");
            break;
        }
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                outcome = Err(e).with_context(|| format!("failed reading {}", recording_name));
                break;
            }
        };
        let result = session.analyze(&frame);
        lines_tx.send(Line::Frame {
            recording: recording_name.clone(),
            frame: frame_num,
            result,
            recent_accuracy: session.aggregator().recent_accuracy(),
        })?;
    }

    let timing = session.timing();
    info!(
        recording = %recording_name,
        analysis_ms = timing.analysis.as_secs_f64() * 1000.0,
        "finished recording"
    );
    lines_tx.send(Line::Summary {
        recording: recording_name,
        summary: session.finish(),
    })?;
    outcome
}

fn analyze(
    config: Config,
    exercise: ExerciseType,
    layout: Layout,
    show_progress: bool,
    recordings: &[PathBuf],
) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let running_ctrl_c = running.clone();

    ctrlc::set_handler(move || {
        running_ctrl_c.store(false, Ordering::SeqCst);
    })
    .context("failed setting Ctrl-C handler")?;

    let pb_progress = if show_progress {
        Some(
            ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
            ),
        )
    } else {
        None
    };

    let config = Arc::new(config);
    let (lines_tx, lines_rx) = channel();

    crossbeam::thread::scope(|scope| {
        let workers = recordings
            .iter()
            .map(|path| {
                let lines_tx = lines_tx.clone();
                let config = config.clone();
                let running = running.clone();
                scope.spawn(move |_| replay(path, exercise, layout, config, &running, lines_tx))
            })
            .collect::<Vec<_>>();
        drop(lines_tx);

        let writer = scope.spawn(move |_| {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            while let Ok(line) = lines_rx.recv() {
                if let (Some(pb), Line::Frame { recording, frame, result, recent_accuracy }) =
                    (pb_progress.as_ref(), &line)
                {
                    pb.set_message(format!(
                        "{}: frame {}, reps {}, recent accuracy {}%",
                        recording, frame, result.rep_count, recent_accuracy
                    ));
                    pb.inc(1);
                }
                serde_json::to_writer(&mut out, &line).context("failed serializing result")?;
                writeln!(out).context("failed writing result")?;
            }
            if let Some(pb) = pb_progress {
                pb.finish_and_clear();
            }
            Ok::<_, anyhow::Error>(())
        });

        workers
            .into_iter()
            .map(|worker| {
                worker
                    .join()
                    .map_err(|_| anyhow!("recording worker panicked"))?
            })
            .chain(std::iter::once(
                writer
                    .join()
                    .map_err(|_| anyhow!("output writer panicked"))
                    .and_then(|result| result),
            ))
            .collect::<Result<Vec<_>>>()
            .map(|_| ())
    })
    .map_err(|_| anyhow!("failed joining worker threads"))?
}

fn dump_config(path: Option<&Path>) -> Result<()> {
    let config = Config::default();
    match path {
        Some(path) => config.save(path)?,
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(opt.log_level),
    )?;

    let config = match opt.config.as_deref() {
        Some(path) => Config::load(path).context("failed loading config")?,
        None => Config::default(),
    };

    match opt.command {
        Command::Analyze {
            exercise,
            layout,
            show_progress,
            recordings,
        } => analyze(config, exercise, layout, show_progress, &recordings),
        Command::DumpConfig { path } => {
            dump_config(path.as_deref()).context("failed dumping config")
        }
    }
}
