use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ScrollConfig;
use crate::events::{FocusSignal, ScrollEvent};
use crate::scroll::{FrameCoalescer, PageLayout, ScrollEffects, ScrollFrame, ScrollInput};

/// Turns the raw scroll/resize stream into at most one recomputation per
/// display frame.
///
/// Each recomputed frame goes to `to_presenter`; its focus scalar also
/// replaces the value in `focus_tx` for the render loop.
#[allow(clippy::too_many_arguments)]
pub async fn run(
    cfg: ScrollConfig,
    mobile_focus: bool,
    frame_interval: Duration,
    initial: ScrollInput,
    layout: PageLayout,
    mut events_rx: Receiver<ScrollEvent>,
    focus_tx: watch::Sender<FocusSignal>,
    to_presenter: Sender<ScrollFrame>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut effects = ScrollEffects::new(cfg, mobile_focus);
    let mut input = initial;
    let mut layout = layout;
    let mut coalescer = FrameCoalescer::default();
    let mut frames = interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut recomputed: u64 = 0;

    // first paint uses the initial snapshot without waiting for input
    if !publish(&mut effects, &input, &layout, &focus_tx, &to_presenter).await {
        return Ok(());
    }
    recomputed += 1;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(recomputed, "cancel received; exiting scroll loop");
                break;
            }

            _ = frames.tick() => {
                if coalescer.take() {
                    if !publish(&mut effects, &input, &layout, &focus_tx, &to_presenter).await {
                        break;
                    }
                    recomputed += 1;
                }
            }

            maybe_event = events_rx.recv() => {
                let Some(event) = maybe_event else {
                    debug!("scroll input closed; exiting scroll loop");
                    break;
                };
                match event {
                    ScrollEvent::Scrolled(top) => input.scroll_top = top,
                    ScrollEvent::Resized(viewport) => input.viewport = viewport,
                    ScrollEvent::Relayout(next) => layout = next,
                }
                coalescer.request();
            }
        }
    }
    Ok(())
}

async fn publish(
    effects: &mut ScrollEffects,
    input: &ScrollInput,
    layout: &PageLayout,
    focus_tx: &watch::Sender<FocusSignal>,
    to_presenter: &Sender<ScrollFrame>,
) -> bool {
    let frame = effects.recompute(input, layout);
    focus_tx.send_replace(frame.params.focus_signal());
    debug!(
        scroll_top = input.scroll_top,
        progress = frame.params.progress,
        focus = frame.params.focus,
        "scroll effects recomputed"
    );
    if to_presenter.send(frame).await.is_err() {
        debug!("presenter dropped; exiting scroll loop");
        return false;
    }
    true
}
