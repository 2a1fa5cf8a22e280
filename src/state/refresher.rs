use crate::state::messages::UiEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Asks the UI loop to reload whatever tab is showing.
pub struct PeriodicRefresher {
    period: Duration,
    ui_events: mpsc::Sender<UiEvent>,
}

impl PeriodicRefresher {
    pub fn new(period: Duration, ui_events: mpsc::Sender<UiEvent>) -> Self {
        Self { period, ui_events }
    }

    pub async fn run(self) {
        let mut ticks = interval(self.period);
        // The first tick fires immediately; startup already loads the first tab.
        ticks.tick().await;

        loop {
            ticks.tick().await;
            if self.ui_events.send(UiEvent::RefreshTick).await.is_err() {
                break;
            }
        }
    }
}
