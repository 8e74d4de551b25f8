//! Daily refresh at each local midnight.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Local, TimeZone};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::refresh::RefreshReason;
use crate::schedule::resolve_local;

/// Fallback delay when the next midnight cannot be computed.
const RETRY_DELAY: Duration = Duration::from_secs(60);

/// Start of the local calendar day after the one `now` falls on.
#[must_use]
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tomorrow = now.date_naive().checked_add_days(Days::new(1))?;
    resolve_local(&now.timezone(), tomorrow.and_hms_opt(0, 0, 0)?)
}

/// Time from `now` until the start of the next local calendar day.
#[must_use]
pub fn until_next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<Duration> {
    (next_midnight(now)? - now.clone()).to_std().ok()
}

/// Spawns the self-rescheduling midnight trigger.
///
/// Each time local midnight passes, `RefreshReason::Midnight` is sent and the
/// following midnight is targeted, so a wake-up slightly before the wall
/// clock reaches midnight does not fire twice. The task ends when `token` is
/// cancelled or the receiver is dropped.
pub fn spawn_midnight_refresh<C>(
    clock: Arc<C>,
    refresh_tx: mpsc::UnboundedSender<RefreshReason>,
    token: CancellationToken,
) -> JoinHandle<()>
where
    C: Clock + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut fired: Option<DateTime<Local>> = None;
        loop {
            let now = clock.now();
            let target = match fired.as_ref().and_then(next_midnight) {
                Some(following) if following > now => Some(following),
                _ => next_midnight(&now),
            };
            let delay = target
                .as_ref()
                .and_then(|t| (t.clone() - now).to_std().ok())
                .unwrap_or(RETRY_DELAY);
            log::debug!("Next midnight refresh in {}s", delay.as_secs());
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                () = tokio::time::sleep(delay) => {
                    if refresh_tx.send(RefreshReason::Midnight).is_err() {
                        break;
                    }
                    fired = target;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::PausedClock;
    use chrono::{FixedOffset, Utc};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn delay_until_midnight_utc() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 30).unwrap();
        assert_eq!(until_next_midnight(&now), Some(Duration::from_secs(30)));
    }

    #[test]
    fn delay_from_exact_midnight_is_full_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(until_next_midnight(&now), Some(Duration::from_secs(86_400)));
    }

    #[test]
    fn delay_uses_local_calendar() {
        let cairo = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = cairo.with_ymd_and_hms(2024, 12, 31, 22, 0, 0).unwrap();
        assert_eq!(until_next_midnight(&now), Some(Duration::from_secs(7_200)));
    }

    #[test]
    fn next_midnight_is_start_of_following_day() {
        let now = Utc.with_ymd_and_hms(2024, 2, 28, 13, 0, 0).unwrap();
        assert_eq!(
            next_midnight(&now),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap())
        );
    }

    /// Wall clock that reads a few milliseconds behind tokio's after its
    /// first reading.
    struct LaggingClock {
        inner: PausedClock,
        read: AtomicBool,
    }

    impl Clock for LaggingClock {
        fn now(&self) -> DateTime<Local> {
            let now = self.inner.now();
            if self.read.swap(true, Ordering::SeqCst) {
                now - chrono::TimeDelta::milliseconds(5)
            } else {
                now
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn early_wake_does_not_fire_twice() {
        let base = Local.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap();
        let clock = Arc::new(LaggingClock {
            inner: PausedClock::at(base),
            read: AtomicBool::new(false),
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();

        let handle = spawn_midnight_refresh(clock, tx, token.clone());

        assert_eq!(rx.recv().await, Some(RefreshReason::Midnight));
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn fires_each_midnight_until_cancelled() {
        let base = Local.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap();
        let clock = Arc::new(PausedClock::at(base));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();

        let handle = spawn_midnight_refresh(clock, tx, token.clone());

        assert_eq!(rx.recv().await, Some(RefreshReason::Midnight));
        assert_eq!(rx.recv().await, Some(RefreshReason::Midnight));

        token.cancel();
        handle.await.unwrap();
        assert!(rx.try_recv().is_err());
    }
}
