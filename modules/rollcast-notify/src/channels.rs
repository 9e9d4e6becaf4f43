use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OnceCell};
use tokio::time::timeout;

use rollcast_common::Address;

use crate::error::NotifyError;
use crate::transport::{ChannelHandle, ChannelTransport};

/// An established, reusable communication path to one address.
///
/// Sends acquire the channel's lock first, so two messages destined for the
/// same recipient are delivered in dispatch order. Sends to distinct
/// recipients never contend.
pub struct Channel {
    address: Address,
    handle: ChannelHandle,
    transport: Arc<dyn ChannelTransport>,
    send_timeout: Duration,
    send_lock: Mutex<()>,
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("address", &self.address)
            .field("handle", &self.handle)
            .field("send_timeout", &self.send_timeout)
            .finish_non_exhaustive()
    }
}

impl Channel {
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn topic(&self) -> &str {
        &self.handle.topic
    }

    pub async fn send(&self, body: &str) -> Result<(), NotifyError> {
        let _ordered = self.send_lock.lock().await;
        match timeout(self.send_timeout, self.transport.send(&self.handle, body)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(NotifyError::Send {
                address: self.address.clone(),
                reason: e.to_string(),
            }),
            Err(_) => Err(NotifyError::Send {
                address: self.address.clone(),
                reason: format!("timed out after {:?}", self.send_timeout),
            }),
        }
    }
}

/// Lazily establishes and caches one channel per address for the process
/// lifetime.
pub struct ChannelCache {
    transport: Arc<dyn ChannelTransport>,
    channels: Mutex<HashMap<Address, Arc<OnceCell<Arc<Channel>>>>>,
    establish_timeout: Duration,
    send_timeout: Duration,
}

impl ChannelCache {
    pub fn new(
        transport: Arc<dyn ChannelTransport>,
        establish_timeout: Duration,
        send_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            channels: Mutex::new(HashMap::new()),
            establish_timeout,
            send_timeout,
        }
    }

    /// Return the cached channel for an address, establishing it on first use.
    ///
    /// Concurrent callers for one address coalesce onto a single in-flight
    /// establishment; callers for other addresses proceed independently. A
    /// failed establishment leaves the cell empty, so a later call retries.
    pub async fn get_or_create(&self, address: &Address) -> Result<Arc<Channel>, NotifyError> {
        let cell = {
            let mut channels = self.channels.lock().await;
            channels
                .entry(address.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let channel = cell
            .get_or_try_init(|| async {
                let handle = match timeout(
                    self.establish_timeout,
                    self.transport.establish(address),
                )
                .await
                {
                    Ok(Ok(handle)) => handle,
                    Ok(Err(e)) => {
                        return Err(NotifyError::Establish {
                            address: address.clone(),
                            reason: e.to_string(),
                        })
                    }
                    Err(_) => {
                        return Err(NotifyError::Establish {
                            address: address.clone(),
                            reason: format!("timed out after {:?}", self.establish_timeout),
                        })
                    }
                };

                Ok(Arc::new(Channel {
                    address: address.clone(),
                    handle,
                    transport: Arc::clone(&self.transport),
                    send_timeout: self.send_timeout,
                    send_lock: Mutex::new(()),
                }))
            })
            .await?;

        Ok(Arc::clone(channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Barrier;

    struct CountingTransport {
        established: AtomicUsize,
        failing: AtomicBool,
    }

    impl CountingTransport {
        fn new() -> Self {
            Self {
                established: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl ChannelTransport for CountingTransport {
        async fn establish(&self, address: &Address) -> anyhow::Result<ChannelHandle> {
            // Hold the establishment open long enough for callers to overlap.
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.failing.load(Ordering::SeqCst) {
                anyhow::bail!("gateway unreachable");
            }
            self.established.fetch_add(1, Ordering::SeqCst);
            Ok(ChannelHandle {
                topic: format!("topic-{address}"),
            })
        }

        async fn send(&self, _channel: &ChannelHandle, _body: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn cache_with(transport: Arc<CountingTransport>) -> ChannelCache {
        ChannelCache::new(transport, Duration::from_secs(5), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_establishment() {
        let transport = Arc::new(CountingTransport::new());
        let cache = Arc::new(cache_with(transport.clone()));
        let barrier = Arc::new(Barrier::new(8));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let barrier = barrier.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                cache.get_or_create(&Address::new("0xaaa")).await.unwrap()
            }));
        }

        let mut topics = Vec::new();
        for handle in handles {
            topics.push(handle.await.unwrap().topic().to_string());
        }

        assert_eq!(transport.established.load(Ordering::SeqCst), 1);
        assert!(topics.iter().all(|t| t == "topic-0xaaa"));
    }

    #[tokio::test]
    async fn repeat_calls_reuse_the_cached_channel() {
        let transport = Arc::new(CountingTransport::new());
        let cache = cache_with(transport.clone());

        let first = cache.get_or_create(&Address::new("0xaaa")).await.unwrap();
        let second = cache.get_or_create(&Address::new("0xaaa")).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(transport.established.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn mixed_case_addresses_share_one_channel() {
        let transport = Arc::new(CountingTransport::new());
        let cache = cache_with(transport.clone());

        cache.get_or_create(&Address::new("0xAAA")).await.unwrap();
        cache.get_or_create(&Address::new("0xaaa")).await.unwrap();

        assert_eq!(transport.established.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_addresses_get_distinct_channels() {
        let transport = Arc::new(CountingTransport::new());
        let cache = cache_with(transport.clone());

        let a = cache.get_or_create(&Address::new("0xaaa")).await.unwrap();
        let b = cache.get_or_create(&Address::new("0xbbb")).await.unwrap();

        assert_ne!(a.topic(), b.topic());
        assert_eq!(transport.established.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_establishment_is_not_cached() {
        let transport = Arc::new(CountingTransport::new());
        transport.failing.store(true, Ordering::SeqCst);
        let cache = cache_with(transport.clone());

        let err = cache.get_or_create(&Address::new("0xaaa")).await.unwrap_err();
        assert!(matches!(err, NotifyError::Establish { .. }));

        // Transport recovers; the next call retries and succeeds.
        transport.failing.store(false, Ordering::SeqCst);
        let channel = cache.get_or_create(&Address::new("0xaaa")).await.unwrap();
        assert_eq!(channel.topic(), "topic-0xaaa");
    }

    struct HangingTransport;

    #[async_trait]
    impl ChannelTransport for HangingTransport {
        async fn establish(&self, _address: &Address) -> anyhow::Result<ChannelHandle> {
            std::future::pending().await
        }

        async fn send(&self, _channel: &ChannelHandle, _body: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn hung_establishment_becomes_a_timeout_error() {
        let cache = ChannelCache::new(
            Arc::new(HangingTransport),
            Duration::from_millis(50),
            Duration::from_secs(5),
        );

        let err = cache.get_or_create(&Address::new("0xaaa")).await.unwrap_err();
        match err {
            NotifyError::Establish { reason, .. } => assert!(reason.contains("timed out")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
