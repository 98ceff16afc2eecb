use crate::app::MenuItem;
use crate::state::messages::UiEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// Periodic refresh for the active view.
///
/// One task per view activation. It only announces that a refresh is due;
/// the UI loop builds the request from the view's current filter. Stopping
/// or dropping the refresher aborts the timer.
pub struct PeriodicRefresher {
    view: MenuItem,
    period: Duration,
    handle: JoinHandle<()>,
}

impl PeriodicRefresher {
    pub fn start(view: MenuItem, period: Duration, ui_events: mpsc::Sender<UiEvent>) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticks = interval(period);
            // Skip the immediate first tick: activating a view already loads it.
            ticks.tick().await;

            loop {
                ticks.tick().await;
                if ui_events.send(UiEvent::RefreshDue(view)).await.is_err() {
                    break;
                }
            }
        });
        Self { view, period, handle }
    }

    pub fn is_for(&self, view: MenuItem, period: Duration) -> bool {
        self.view == view && self.period == period && !self.handle.is_finished()
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for PeriodicRefresher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Keep exactly one refresher matching the active view, or none.
pub fn sync_refresher(
    current: &mut Option<PeriodicRefresher>,
    view: MenuItem,
    period: Option<Duration>,
    ui_events: &mpsc::Sender<UiEvent>,
) {
    match period {
        Some(period) if current.as_ref().is_some_and(|r| r.is_for(view, period)) => {}
        Some(period) => {
            if let Some(old) = current.take() {
                old.stop();
            }
            *current = Some(PeriodicRefresher::start(view, period, ui_events.clone()));
        }
        None => {
            if let Some(old) = current.take() {
                old.stop();
            }
        }
    }
}
