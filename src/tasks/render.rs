use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc::Receiver, watch};
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::OrientationConfig;
use crate::events::{FocusSignal, PointerEvent};
use crate::orientation::{OrientationController, OrientationFrame};

/// Advances the globe orientation once per display frame.
///
/// Pointer transitions are applied between frames; the focus scalar is read
/// fresh from the scroll loop's last published value on every tick.
pub async fn run(
    cfg: OrientationConfig,
    frame_interval: Duration,
    mut pointer_rx: Receiver<PointerEvent>,
    focus_rx: watch::Receiver<FocusSignal>,
    to_presenter: watch::Sender<OrientationFrame>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut controller = OrientationController::new(cfg);
    let started = Instant::now();
    let mut frames = interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut pointer_open = true;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("cancel received; exiting render loop");
                break;
            }

            maybe_pointer = pointer_rx.recv(), if pointer_open => {
                match maybe_pointer {
                    Some(event) => {
                        debug!(?event, "pointer transition");
                        controller.on_pointer(event);
                    }
                    None => pointer_open = false,
                }
            }

            now = frames.tick() => {
                let focus = *focus_rx.borrow();
                let frame = controller.tick(now.duration_since(started), focus);
                trace!(
                    pitch = frame.pitch,
                    yaw = frame.yaw,
                    label = frame.label_visible,
                    "frame"
                );
                if to_presenter.send(frame).is_err() {
                    debug!("presenter dropped; exiting render loop");
                    break;
                }
            }
        }
    }
    Ok(())
}
