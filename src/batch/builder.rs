use super::dispatcher::Dispatcher;
use crate::telemetry::DispatchObserver;
use crate::transport::{HttpTransport, HttpTransportConfig, Transport};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Worker capacity used when neither the builder nor the environment sets one.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Builder for creating dispatchers with custom configuration.
///
/// Resolution order for every knob: explicit builder value, then environment
/// variable, then documented default.
pub struct DispatcherBuilder {
    max_workers: Option<usize>,
    transport: Option<Arc<dyn Transport>>,
    transport_config: Option<HttpTransportConfig>,
    observer: Arc<dyn DispatchObserver>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            max_workers: None,
            transport: None,
            transport_config: None,
            observer: crate::telemetry::noop_observer(),
        }
    }

    /// Maximum number of requests in flight at once.
    ///
    /// Defaults to `FAST_REQUESTS_MAX_WORKERS`, then [`DEFAULT_MAX_WORKERS`].
    /// Chunks larger than this run in waves but still commit atomically.
    pub fn max_workers(mut self, n: usize) -> Self {
        self.max_workers = Some(n);
        self
    }

    /// Use a custom transport instead of the built-in HTTP client.
    pub fn transport<T: Transport + 'static>(self, transport: T) -> Self {
        self.shared_transport(Arc::new(transport))
    }

    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Settings for the built-in HTTP transport. Ignored when a custom
    /// transport is supplied.
    pub fn transport_config(mut self, config: HttpTransportConfig) -> Self {
        self.transport_config = Some(config);
        self
    }

    /// Inject a dispatch observer. Default is a no-op observer.
    pub fn observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn build(self) -> Result<Dispatcher> {
        let max_workers = self
            .max_workers
            .or_else(|| {
                std::env::var("FAST_REQUESTS_MAX_WORKERS")
                    .ok()?
                    .trim()
                    .parse::<usize>()
                    .ok()
            })
            .unwrap_or(DEFAULT_MAX_WORKERS);
        if max_workers == 0 {
            return Err(Error::configuration_with_context(
                "worker pool needs at least one worker",
                ErrorContext::new()
                    .with_field_path("max_workers")
                    .with_source("dispatcher_builder"),
            ));
        }

        let transport = match self.transport {
            Some(t) => t,
            None => {
                let config = self.transport_config.unwrap_or_else(HttpTransportConfig::from_env);
                Arc::new(HttpTransport::with_config(config)?) as Arc<dyn Transport>
            }
        };

        Ok(Dispatcher {
            transport,
            workers: Arc::new(Semaphore::new(max_workers)),
            max_workers,
            observer: self.observer,
        })
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
