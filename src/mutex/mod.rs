use tokio::sync::Mutex;
use tracing::debug;

/// Caps outstanding requests to one external source at one.
///
/// Waiters are admitted in the order they called [`RequestGate::acquire`]
/// (the tokio mutex is fair). The gate guards no data; it only orders work.
pub struct RequestGate {
    name: &'static str,
    lock: Mutex<()>,
}

impl RequestGate {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            lock: Mutex::new(()),
        }
    }

    pub async fn acquire<T, F, Fut>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let _guard = self.lock.lock().await;
        debug!(gate = self.name, "acquired request gate");

        let result = f().await;

        debug!(gate = self.name, "released request gate");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    struct InFlight {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl InFlight {
        fn new() -> Self {
            Self {
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }

        async fn hold(&self, millis: u64) {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(millis)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn same_gate_never_overlaps() {
        let gate = RequestGate::new("test");
        let in_flight = InFlight::new();

        let (gate, in_flight) = (&gate, &in_flight);

        let calls = (0..5).map(move |_| gate.acquire(move || in_flight.hold(10)));
        futures_util::future::join_all(calls).await;

        assert_eq!(in_flight.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_gates_may_overlap() {
        let first = RequestGate::new("first");
        let second = RequestGate::new("second");
        let in_flight = InFlight::new();

        tokio::join!(
            first.acquire(|| in_flight.hold(30)),
            second.acquire(|| in_flight.hold(30)),
        );

        assert_eq!(in_flight.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn waiters_run_in_arrival_order() {
        let gate = RequestGate::new("ordered");
        let order = StdMutex::new(Vec::new());

        let (gate, order_ref) = (&gate, &order);

        let calls = (0..4).map(move |i| {
            gate.acquire(move || async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                order_ref.lock().unwrap().push(i);
            })
        });
        futures_util::future::join_all(calls).await;

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }
}
