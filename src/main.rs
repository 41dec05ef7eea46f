//! Headless globe session: loads textures, runs the render and scroll loops
//! against a scripted input timeline, and logs what the page would apply.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

use globe_hero::config::Configuration;
use globe_hero::events::{FocusSignal, PointerEvent, ScrollEvent, TexturesReady};
use globe_hero::orientation::{FocusMode, OrientationFrame};
use globe_hero::scroll::{
    Block, PageLayout, ScrollFrame, ScrollInput, StaggerUpdate, TrackedElement, Viewport,
};
use globe_hero::tasks::textures::NetworkSource;
use globe_hero::tasks::{render, scroll_effects, textures};

#[derive(Debug, Parser)]
#[command(name = "globe-hero", version, about = "Headless hero globe session")]
struct Args {
    /// Path to YAML config (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,
    /// Write diffuse/bump/specular/clouds PNGs here once textures are ready
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,
    /// Number of display frames to simulate
    #[arg(long, default_value_t = 240)]
    frames: u32,
    /// Viewport size as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_viewport, default_value = "1280x800")]
    viewport: (f64, f64),
    /// Report a coarse, hover-less pointer
    #[arg(long)]
    coarse_pointer: bool,
    /// Honour a reduced-motion preference
    #[arg(long)]
    reduced_motion: bool,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn parse_viewport(raw: &str) -> Result<(f64, f64), String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {raw}"))?;
    let w: f64 = w.trim().parse().map_err(|_| format!("bad width in {raw}"))?;
    let h: f64 = h.trim().parse().map_err(|_| format!("bad height in {raw}"))?;
    if w <= 0.0 || h <= 0.0 {
        return Err(format!("viewport must be positive, got {raw}"));
    }
    Ok((w, h))
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(format!("globe_hero={level}").parse()?)
        .add_directive("reqwest=warn".parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .init();
    Ok(())
}

/// Stand-in page: a full-height hero followed by revealing sections.
fn demo_layout(viewport: &Viewport) -> PageLayout {
    let vh = viewport.height;
    let elements = (0..6)
        .map(|i| TrackedElement {
            block: Block::new(vh * (1.2 + i as f64 * 0.9), vh * 0.5),
            depth: (i % 2 == 1).then_some(0.2),
            reveal: true,
        })
        .collect();
    PageLayout {
        document_height: vh * 7.0,
        hero: Some(Block::new(0.0, vh)),
        hero_layers: vec![Some(0.4), None, Some(1.0)],
        elements,
        orbs: vec![None, Some(0.35), Some(0.1)],
        hero_words: 4,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let cfg = match &args.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::default(),
    }
    .validated()
    .context("invalid configuration values")?;
    let orientation_cfg = cfg.orientation();
    let mut scroll_cfg = cfg.scroll();
    scroll_cfg.reduced_motion |= args.reduced_motion;
    debug!(?cfg, "configuration");

    let viewport = Viewport {
        width: args.viewport.0,
        height: args.viewport.1,
        coarse_pointer: args.coarse_pointer,
    };
    let layout = demo_layout(&viewport);
    let document_height = layout.document_height;

    let (pointer_tx, pointer_rx) = mpsc::channel::<PointerEvent>(16); // Driver -> Render
    let (scroll_tx, scroll_rx) = mpsc::channel::<ScrollEvent>(128); // Driver -> Scroll
    let (focus_tx, focus_rx) = watch::channel(FocusSignal::default()); // Scroll -> Render
    let (frame_tx, frame_rx) = watch::channel(OrientationFrame {
        pitch: 0.0,
        yaw: 0.0,
        cloud_yaw: 0.0,
        label_visible: false,
        mode: FocusMode::Idle,
    }); // Render -> Presenter
    let (effects_tx, effects_rx) = mpsc::channel::<ScrollFrame>(8); // Scroll -> Presenter
    let (textures_tx, textures_rx) = oneshot::channel::<TexturesReady>(); // Textures -> Presenter

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let mut tasks = JoinSet::new();

    let source = NetworkSource::with_default_client().context("failed to create HTTP client")?;
    tasks.spawn({
        let cancel = cancel.clone();
        let texture_cfg = cfg.textures.clone();
        async move {
            textures::run(source, texture_cfg, textures_tx, cancel)
                .await
                .context("texture task failed")
        }
    });

    tasks.spawn({
        let cancel = cancel.clone();
        let frame_interval = cfg.frame_interval;
        let orientation_cfg = orientation_cfg.clone();
        async move {
            render::run(
                orientation_cfg,
                frame_interval,
                pointer_rx,
                focus_rx,
                frame_tx,
                cancel,
            )
            .await
            .context("render task failed")
        }
    });

    tasks.spawn({
        let cancel = cancel.clone();
        let frame_interval = cfg.frame_interval;
        let initial = ScrollInput {
            scroll_top: 0.0,
            viewport,
        };
        let mobile_focus = orientation_cfg.mobile_focus;
        async move {
            scroll_effects::run(
                scroll_cfg,
                mobile_focus,
                frame_interval,
                initial,
                layout,
                scroll_rx,
                focus_tx,
                effects_tx,
                cancel,
            )
            .await
            .context("scroll task failed")
        }
    });

    let (textures_done_tx, textures_done_rx) = oneshot::channel::<()>();
    tasks.spawn({
        let cancel = cancel.clone();
        let export_dir = args.export_dir.clone();
        present(effects_rx, textures_rx, export_dir, textures_done_tx, cancel)
    });

    drive(
        args.frames,
        cfg.frame_interval,
        document_height - viewport.height,
        &pointer_tx,
        &scroll_tx,
        &cancel,
    )
    .await;

    let last = *frame_rx.borrow();
    info!(
        pitch = last.pitch,
        yaw = last.yaw,
        cloud_yaw = last.cloud_yaw,
        label = last.label_visible,
        "final orientation"
    );

    if args.export_dir.is_some() && !cancel.is_cancelled() {
        info!("waiting for textures before exit");
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = textures_done_rx => {}
        }
    }

    cancel.cancel();
    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!("task error: {err:#}"),
            Err(join_err) => warn!("task join error: {join_err}"),
        }
    }
    Ok(())
}

/// Scripted input: scroll down and back up with bursts of events per frame,
/// hovering the globe through the middle quarter.
async fn drive(
    frames: u32,
    frame_interval: Duration,
    scroll_range: f64,
    pointer_tx: &mpsc::Sender<PointerEvent>,
    scroll_tx: &mpsc::Sender<ScrollEvent>,
    cancel: &CancellationToken,
) {
    const EVENTS_PER_FRAME: u32 = 4;
    let total = frames.max(1) as f64;
    for frame in 0..frames {
        if cancel.is_cancelled() {
            return;
        }
        let pointer = if frame == frames / 4 {
            Some(PointerEvent::Enter)
        } else if frame == frames / 2 {
            Some(PointerEvent::Leave)
        } else {
            None
        };
        if let Some(event) = pointer
            && pointer_tx.send(event).await.is_err()
        {
            return;
        }
        for sub in 0..EVENTS_PER_FRAME {
            let t = (frame as f64 + sub as f64 / EVENTS_PER_FRAME as f64) / total;
            let top = (t * std::f64::consts::PI).sin() * scroll_range.max(0.0);
            if scroll_tx.send(ScrollEvent::Scrolled(top)).await.is_err() {
                return;
            }
        }
        tokio::time::sleep(frame_interval).await;
    }
}

async fn present(
    mut effects_rx: mpsc::Receiver<ScrollFrame>,
    mut textures_rx: oneshot::Receiver<TexturesReady>,
    export_dir: Option<PathBuf>,
    textures_done: oneshot::Sender<()>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut textures_pending = true;
    let mut textures_done = Some(textures_done);
    let mut recomputed = 0u64;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            ready = &mut textures_rx, if textures_pending => {
                textures_pending = false;
                match ready {
                    Ok(TexturesReady(set)) => {
                        let (width, height) = set.dimensions();
                        info!(width, height, fallback = set.is_fallback(), "textures applied");
                        if let Some(dir) = &export_dir {
                            let dir = dir.clone();
                            tokio::task::spawn_blocking(move || set.write_png_dir(&dir))
                                .await
                                .context("texture export worker failed")??;
                            info!("textures exported");
                        }
                    }
                    Err(_) => debug!("texture task ended without delivering"),
                }
                if let Some(done) = textures_done.take() {
                    let _ = done.send(());
                }
            }

            maybe_frame = effects_rx.recv() => {
                let Some(frame) = maybe_frame else { break };
                recomputed += 1;
                for index in &frame.revealed {
                    info!(index, "section revealed");
                }
                match &frame.stagger {
                    StaggerUpdate::Assign(delays) => info!(words = delays.len(), "word stagger assigned"),
                    StaggerUpdate::Clear => info!("word stagger cleared"),
                    StaggerUpdate::Unchanged => {}
                }
                debug!(params = ?frame.params.named(), "apply scroll parameters");
            }
        }
    }
    info!(recomputed, "presenter finished");
    Ok(())
}
