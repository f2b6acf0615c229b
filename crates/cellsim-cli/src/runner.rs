//! Drives a shared controller from a tokio interval.

use anyhow::{Context, Result};
use cellsim_world::GenerationController;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

pub type SharedController = Arc<Mutex<GenerationController>>;

/// Outcome of one `run`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Last committed generation
    pub generation: u64,
    /// Ticks that found the controller busy
    pub dropped_ticks: u64,
}

fn ticker(delay: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + delay, delay);
    // A late tick is dropped, never replayed in a burst
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Tick the controller until it stops running, `limit` generations have been
/// committed, or `shutdown` resolves.
pub async fn run<F>(controller: SharedController, limit: Option<u64>, shutdown: F) -> Result<RunStats>
where
    F: Future<Output = ()>,
{
    let mut delay = controller.lock().delay();
    let mut interval = ticker(delay);
    let mut dropped_ticks = 0u64;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                controller.lock().stop();
                break;
            }
            _ = interval.tick() => {
                // Busy controller: this tick is lost
                let Some(mut guard) = controller.try_lock() else {
                    dropped_ticks += 1;
                    debug!(dropped_ticks, "Controller busy, tick dropped");
                    continue;
                };

                match guard.tick().context("generation failed")? {
                    Some(generation) if limit.is_some_and(|l| generation >= l) => {
                        info!(generation, "Generation limit reached");
                        guard.stop();
                        break;
                    }
                    Some(_) => {}
                    None if !guard.is_running() => break,
                    None => {}
                }

                let current = guard.delay();
                drop(guard);
                if current != delay {
                    debug!(delay_ms = current.as_millis() as u64, "Tick interval changed");
                    delay = current;
                    interval = ticker(delay);
                }
            }
        }
    }

    let generation = controller.lock().generation();
    Ok(RunStats {
        generation,
        dropped_ticks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellsim_core::{RuleFamily, Scenario};
    use cellsim_world::ControllerState;
    use tokio::sync::oneshot;

    fn shared(family: RuleFamily, rate: f64) -> SharedController {
        let mut controller = GenerationController::new();
        controller.load(Scenario::demo(family)).unwrap();
        controller.set_rate(rate).unwrap();
        Arc::new(Mutex::new(controller))
    }

    /// Let the clock reach the next tick and give the runner a chance to see it
    async fn next_tick(period: Duration) {
        tokio::time::advance(period).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test]
    async fn test_runs_until_limit() {
        let controller = shared(RuleFamily::Life, 500.0);
        controller.lock().start().unwrap();

        let stats = run(controller.clone(), Some(5), std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.generation, 5);
        assert_eq!(stats.dropped_ticks, 0);
        assert_eq!(controller.lock().state(), ControllerState::Ready);
    }

    #[tokio::test]
    async fn test_returns_when_not_running() {
        let controller = shared(RuleFamily::Fire, 500.0);
        let stats = run(controller.clone(), None, std::future::pending())
            .await
            .unwrap();
        assert_eq!(stats.generation, 0);
    }

    #[tokio::test]
    async fn test_shutdown_stops_controller() {
        let controller = shared(RuleFamily::Slime, 1.0);
        controller.lock().start().unwrap();

        // One second per tick, so shutdown always wins the race
        let stats = run(controller.clone(), None, async {}).await.unwrap();

        assert_eq!(stats.generation, 0);
        assert_eq!(controller.lock().state(), ControllerState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_controller_drops_ticks() {
        let period = Duration::from_millis(10);
        let controller = shared(RuleFamily::Segregation, 100.0);
        controller.lock().start().unwrap();

        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(run(controller.clone(), None, async move {
            let _ = stopped.await;
        }));
        // Let the runner build its interval before the lock is taken
        tokio::task::yield_now().await;

        {
            let _busy = controller.lock();
            for _ in 0..3 {
                next_tick(period).await;
            }
        }
        for _ in 0..3 {
            next_tick(period).await;
        }

        stop.send(()).unwrap();
        let stats = task.await.unwrap().unwrap();

        // Six ticks elapsed in total; the ones lost to the hold are not
        // replayed once the lock is free
        assert!(stats.dropped_ticks >= 1, "{:?}", stats);
        assert!(stats.generation >= 1, "{:?}", stats);
        assert!(stats.generation + stats.dropped_ticks <= 6, "{:?}", stats);
        assert_eq!(stats.generation, controller.lock().generation());
        assert_eq!(controller.lock().state(), ControllerState::Ready);
    }
}
