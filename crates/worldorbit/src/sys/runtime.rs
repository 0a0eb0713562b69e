use crate::events::AppEvent;
use async_channel::Sender;
use std::thread;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::watch;
use tokio::time::{self, Interval, MissedTickBehavior};

const MIN_REFRESH: Duration = Duration::from_secs(1);

/// Spawns the ticker and the config watcher on a dedicated tokio thread.
///
/// The returned sender changes the tick period; the next tick then comes one new
/// period after the change.
pub fn start_background_services(
    tx: Sender<AppEvent>,
    refresh: Duration,
) -> std::io::Result<watch::Sender<Duration>> {
    let rt = Runtime::new()?;
    let (refresh_tx, refresh_rx) = watch::channel(refresh);

    thread::Builder::new()
        .name("worldorbit-services".into())
        .spawn(move || {
            rt.block_on(async {
                {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        run_ticker(tx, refresh_rx).await;
                    });
                }

                {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        crate::config::run_async_watcher(tx).await;
                    });
                }

                std::future::pending::<()>().await;
            });
        })?;

    Ok(refresh_tx)
}

fn ticker(period: Duration) -> Interval {
    let mut interval = time::interval(period.max(MIN_REFRESH));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Emits [`AppEvent::Tick`] every period read from `refresh` until the receiver
/// goes away. Without a refresh sender the last period is kept.
pub async fn run_ticker(tx: Sender<AppEvent>, mut refresh: watch::Receiver<Duration>) {
    let mut interval = ticker(*refresh.borrow_and_update());
    // the first tick fires immediately and the caller has already rendered
    interval.tick().await;
    let mut follow = true;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if tx.send(AppEvent::Tick).await.is_err() {
                    break;
                }
            }
            changed = refresh.changed(), if follow => {
                if changed.is_err() {
                    follow = false;
                    continue;
                }
                let period = *refresh.borrow_and_update();
                log::debug!("Refresh period is now {:?}", period);
                interval = ticker(period);
                interval.tick().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticker_emits_after_each_period() {
        let (tx, rx) = async_channel::bounded(4);
        let (_refresh_tx, refresh_rx) = watch::channel(Duration::from_secs(60));
        tokio::spawn(run_ticker(tx, refresh_rx));

        time::advance(Duration::from_secs(61)).await;
        assert!(matches!(rx.recv().await, Ok(AppEvent::Tick)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_follows_new_period() {
        let (tx, rx) = async_channel::bounded(4);
        let (refresh_tx, refresh_rx) = watch::channel(Duration::from_secs(3600));
        tokio::spawn(run_ticker(tx, refresh_rx));
        tokio::task::yield_now().await;

        refresh_tx.send_replace(Duration::from_secs(5));
        let tick = time::timeout(Duration::from_secs(10), rx.recv()).await;
        assert!(matches!(tick, Ok(Ok(AppEvent::Tick))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_keeps_period_without_refresh_sender() {
        let (tx, rx) = async_channel::bounded(4);
        let (refresh_tx, refresh_rx) = watch::channel(Duration::from_secs(60));
        drop(refresh_tx);
        tokio::spawn(run_ticker(tx, refresh_rx));

        let tick = time::timeout(Duration::from_secs(61), rx.recv()).await;
        assert!(matches!(tick, Ok(Ok(AppEvent::Tick))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_when_receiver_is_dropped() {
        let (tx, rx) = async_channel::bounded(1);
        drop(rx);
        let (_refresh_tx, refresh_rx) = watch::channel(Duration::ZERO);

        let handle = tokio::spawn(run_ticker(tx, refresh_rx));
        time::advance(Duration::from_secs(2)).await;
        assert!(handle.await.is_ok());
    }
}
