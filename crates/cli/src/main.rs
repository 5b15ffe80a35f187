mod console_surface;

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};

use attendance_core::camera::infrastructure::image_sequence_camera::ImageSequenceCamera;
use attendance_core::flows::enrollment_flow::EnrollmentFlow;
use attendance_core::flows::enrollment_session::EnrollmentState;
use attendance_core::flows::flow_logger::StatsFlowLogger;
use attendance_core::flows::recognition_monitor::RecognitionMonitor;
use attendance_core::flows::training_trigger::TrainingTrigger;
use attendance_core::sampling::frame_sampler::FrameSampler;
use attendance_core::sampling::snapshot_encoder::SnapshotEncoder;
use attendance_core::server::domain::attendance_service::AttendanceService;
use attendance_core::server::infrastructure::http_attendance_service::HttpAttendanceService;
use attendance_core::shared::settings::ClientSettings;

use console_surface::ConsoleSurface;

/// Attendance kiosk client: live recognition, face enrollment and model training.
#[derive(Parser)]
#[command(name = "attendance")]
struct Cli {
    /// Base URL of the attendance server (overrides the saved setting).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Timeout for recognition and capture requests, in seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recognize faces from the camera and overlay the results.
    Monitor {
        /// Directory of frames to replay as the camera.
        #[arg(long)]
        camera: PathBuf,

        /// Sampling interval in milliseconds.
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Write the annotated frame here on every update.
        #[arg(long)]
        overlay_out: Option<PathBuf>,

        /// Stop after this many seconds (runs until killed otherwise).
        #[arg(long)]
        duration_secs: Option<u64>,
    },
    /// Capture face samples for a new person.
    Enroll {
        /// Student ID.
        #[arg(long)]
        id: String,

        /// Display name.
        #[arg(long)]
        name: String,

        /// Directory of frames to replay as the camera.
        #[arg(long)]
        camera: PathBuf,

        /// Sampling interval in milliseconds.
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Write the annotated frame here on every update.
        #[arg(long)]
        overlay_out: Option<PathBuf>,

        /// Train the model once capture completes.
        #[arg(long)]
        train: bool,

        /// Give up if capture has not completed after this many seconds.
        #[arg(long)]
        duration_secs: Option<u64>,
    },
    /// Ask the server to retrain its recognition model.
    Train,
    /// Print the effective settings as JSON.
    Config {
        /// Persist the effective settings.
        #[arg(long)]
        save: bool,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut settings = ClientSettings::load();
    if let Some(server) = cli.server {
        settings.server_url = server;
    }
    if let Some(secs) = cli.timeout_secs {
        settings.request_timeout_secs = secs;
    }

    match cli.command {
        Command::Monitor {
            camera,
            interval_ms,
            overlay_out,
            duration_secs,
        } => {
            if let Some(ms) = interval_ms {
                settings.recognition_interval_ms = ms;
            }
            run_monitor(&settings, camera, overlay_out, duration_secs)
        }
        Command::Enroll {
            id,
            name,
            camera,
            interval_ms,
            overlay_out,
            train,
            duration_secs,
        } => {
            if let Some(ms) = interval_ms {
                settings.capture_interval_ms = ms;
            }
            let options = EnrollOptions {
                overlay_out,
                train,
                duration_secs,
            };
            run_enroll(&settings, &id, &name, camera, options)
        }
        Command::Train => run_train(&settings),
        Command::Config { save } => run_config(&settings, save),
    }
}

fn run_monitor(
    settings: &ClientSettings,
    camera: PathBuf,
    overlay_out: Option<PathBuf>,
    duration_secs: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    validate_camera_dir(&camera)?;
    let service = build_service(settings)?;

    let mut monitor = RecognitionMonitor::new(
        build_sampler(settings, camera),
        service,
        Box::new(ConsoleSurface::new(overlay_out)),
        Box::new(StatsFlowLogger::default()),
        settings.recognition_interval(),
    );
    monitor.start()?;

    let cancelled = cancel_flag(duration_secs.map(Duration::from_secs));
    monitor.run(&cancelled);
    Ok(())
}

struct EnrollOptions {
    overlay_out: Option<PathBuf>,
    train: bool,
    duration_secs: Option<u64>,
}

fn run_enroll(
    settings: &ClientSettings,
    id: &str,
    name: &str,
    camera: PathBuf,
    options: EnrollOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    validate_camera_dir(&camera)?;
    let service = build_service(settings)?;

    let mut flow = EnrollmentFlow::new(
        build_sampler(settings, camera),
        service,
        Box::new(ConsoleSurface::new(options.overlay_out)),
        Box::new(StatsFlowLogger::default()),
        settings.capture_interval(),
        settings.capture_target,
    );
    flow.start(id, name)?;

    let cancelled = cancel_flag(options.duration_secs.map(Duration::from_secs));
    let state = flow.run(&cancelled);
    if state != EnrollmentState::Complete {
        return Err(format!("Enrollment stopped after {} captures", flow.captured()).into());
    }

    if options.train {
        flow.train()?;
    }
    Ok(())
}

fn run_train(settings: &ClientSettings) -> Result<(), Box<dyn std::error::Error>> {
    let trigger = TrainingTrigger::armed(build_service(settings)?);
    let mut surface = ConsoleSurface::new(None);
    trigger.train(&mut surface)?;
    Ok(())
}

fn run_config(settings: &ClientSettings, save: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    if save {
        let path = settings.save()?;
        log::info!("Settings saved to {}", path.display());
    }
    Ok(())
}

fn build_service(
    settings: &ClientSettings,
) -> Result<Arc<dyn AttendanceService>, Box<dyn std::error::Error>> {
    log::info!("Using server {}", settings.server_url);
    let service = HttpAttendanceService::new(&settings.server_url, settings.request_timeout())?;
    Ok(Arc::new(service))
}

fn build_sampler(settings: &ClientSettings, camera: PathBuf) -> FrameSampler {
    FrameSampler::new(
        Box::new(ImageSequenceCamera::new(camera)),
        SnapshotEncoder::new(settings.jpeg_quality),
    )
}

fn validate_camera_dir(camera: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    if camera.exists() && !camera.is_dir() {
        return Err(format!("Camera source must be a directory: {}", camera.display()).into());
    }
    Ok(())
}

/// Flag that a timer thread sets after `after`; never set when `None`.
fn cancel_flag(after: Option<Duration>) -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    if let Some(after) = after {
        let timer = flag.clone();
        thread::spawn(move || {
            thread::sleep(after);
            timer.store(true, Ordering::Relaxed);
        });
    }
    flag
}
