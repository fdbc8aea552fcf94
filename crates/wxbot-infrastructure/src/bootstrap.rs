//! Composition root
//!
//! Builds every component from a validated [`AppConfig`] and owns their
//! lifecycle. Providers are resolved through the linkme registry (cache)
//! or selected by backend (broker).
//!
//! ```text
//! AppConfig → registry / backends → KeyedCache, MessageProducer, MessageConsumer
//!                                 → RefreshScheduler, WeatherLookupService
//! ```
//!
//! Shutdown order: cancel → wait for background tasks → close consumer →
//! close producer → close cache.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use wxbot_application::ports::registry::resolve_cache_provider;
use wxbot_application::use_cases::{RefreshScheduler, WeatherLookupService};
use wxbot_domain::error::{Error, Result};
use wxbot_domain::ports::providers::WeatherProvider;
use wxbot_domain::ports::providers::broker::{BrokerConsumerProvider, BrokerProducerProvider};
use wxbot_domain::repositories::WeatherCacheRepository;
use wxbot_providers::broker::{TokioBroker, TokioBrokerConfig};
use wxbot_providers::weather::OpenWeatherProvider;

use crate::cache::KeyedCache;
use crate::config::{AppConfig, BrokerBackend, BrokerConfig, validate_app_config};
use crate::messaging::{MessageConsumer, MessageProducer, SweepNotifier, SweepReportListener};
use crate::shutdown::{Drain, ShutdownCoordinator};

type BrokerPair = (
    Arc<dyn BrokerProducerProvider>,
    Arc<dyn BrokerConsumerProvider>,
);

/// Application context: every wired component plus the shutdown coordinator
pub struct AppContext {
    /// Application configuration
    pub config: Arc<AppConfig>,

    cache: Arc<KeyedCache>,
    lookup: Arc<WeatherLookupService>,
    scheduler: Option<Arc<RefreshScheduler>>,
    producer: Option<Arc<MessageProducer>>,
    consumer: Option<Arc<MessageConsumer>>,
    listener: Arc<SweepReportListener>,
    shutdown: ShutdownCoordinator,
}

/// Wire all components; nothing runs until [`AppContext::start`]
pub async fn init_app(config: AppConfig) -> Result<AppContext> {
    validate_app_config(&config)?;
    let config = Arc::new(config);
    let shutdown = ShutdownCoordinator::new();

    let cache_provider = resolve_cache_provider(&config.cache.to_provider_config())
        .map_err(Error::configuration)?;
    let cache = Arc::new(KeyedCache::new(
        cache_provider,
        &config.cache.namespace,
        Duration::from_secs(config.cache.ttl_secs),
    ));
    info!(provider = cache.provider_name(), ttl = ?cache.ttl(), "Cache ready");

    let weather: Arc<dyn WeatherProvider> = Arc::new(OpenWeatherProvider::from_config(
        config.weather.to_provider_config(),
    )?);
    let lookup = Arc::new(WeatherLookupService::new(
        Arc::clone(&weather),
        Arc::clone(&cache) as Arc<dyn WeatherCacheRepository>,
    ));

    let (producer, consumer) = match connect_broker(&config.broker).await? {
        Some((producer_provider, consumer_provider)) => (
            Some(Arc::new(MessageProducer::new(
                producer_provider,
                config.broker.delivery_timeout(),
            )?)),
            Some(Arc::new(MessageConsumer::new(consumer_provider))),
        ),
        None => (None, None),
    };

    let scheduler = if config.scheduler.enabled {
        let mut scheduler = RefreshScheduler::new(
            config.scheduler.roster.clone(),
            config.refresh_period(),
            weather,
            Arc::clone(&cache) as Arc<dyn WeatherCacheRepository>,
        )?;
        if let (Some(producer), Some(topic)) = (&producer, &config.broker.notify_topic) {
            scheduler = scheduler.with_observer(Arc::new(SweepNotifier::new(
                Arc::clone(producer),
                topic,
                shutdown.child_token(),
            )));
        }
        Some(Arc::new(scheduler))
    } else {
        None
    };

    Ok(AppContext {
        config,
        cache,
        lookup,
        scheduler,
        producer,
        consumer,
        listener: Arc::new(SweepReportListener::new()),
        shutdown,
    })
}

async fn connect_broker(config: &BrokerConfig) -> Result<Option<BrokerPair>> {
    match config.provider {
        BrokerBackend::Disabled => Ok(None),
        BrokerBackend::Tokio => {
            let broker = TokioBroker::start(TokioBrokerConfig {
                topics: config.topics.clone(),
                queue_capacity: config.queue_capacity,
                ..TokioBrokerConfig::default()
            })?;
            Ok(Some((
                Arc::new(broker.clone()) as Arc<dyn BrokerProducerProvider>,
                Arc::new(broker) as Arc<dyn BrokerConsumerProvider>,
            )))
        }
        BrokerBackend::Nats => connect_nats(config).await,
    }
}

#[cfg(feature = "broker-nats")]
async fn connect_nats(config: &BrokerConfig) -> Result<Option<BrokerPair>> {
    use wxbot_providers::broker::NatsBroker;

    let url = config
        .nats_url
        .as_deref()
        .ok_or_else(|| Error::configuration("NATS URL is not configured"))?;
    let broker = Arc::new(NatsBroker::connect(url, config.topics.clone(), config.max_retries).await?);
    Ok(Some((
        Arc::clone(&broker) as Arc<dyn BrokerProducerProvider>,
        broker as Arc<dyn BrokerConsumerProvider>,
    )))
}

#[cfg(not(feature = "broker-nats"))]
async fn connect_nats(_config: &BrokerConfig) -> Result<Option<BrokerPair>> {
    Err(Error::configuration(
        "The nats broker requires the 'broker-nats' feature",
    ))
}

impl AppContext {
    /// Start the refresh loop and the consumer
    pub async fn start(&self) -> Result<()> {
        if let Some(scheduler) = &self.scheduler {
            let scheduler = Arc::clone(scheduler);
            info!(
                entities = scheduler.roster().len(),
                period = %humantime::format_duration(scheduler.period()),
                "Starting refresh scheduler"
            );
            self.shutdown
                .spawn_cancellable("refresh-scheduler", move |token| async move {
                    scheduler.run(token).await;
                });
        }

        if let Some(consumer) = &self.consumer
            && !self.config.broker.consume_topics.is_empty()
        {
            consumer
                .consume(
                    &self.shutdown.child_token(),
                    &self.config.broker.consume_topics,
                    self.listener.clone(),
                )
                .await?;
        }
        Ok(())
    }

    /// Stop everything in order, reporting every release failure
    ///
    /// When a background task outlives the shutdown timeout the producer
    /// and the cache stay open, since that task may still be using them.
    /// Returns the first failure after attempting every step.
    pub async fn shutdown(&self) -> Result<()> {
        let mut failures: Vec<Error> = Vec::new();

        let timeout = self.config.shutdown_timeout();
        let drain = self.shutdown.shutdown(timeout).await;
        if let Drain::TimedOut { stuck } = &drain {
            warn!(?stuck, "Leaving producer and cache open for running tasks");
            failures.push(Error::timeout("background task shutdown", timeout));
        }
        if let Some(consumer) = &self.consumer
            && let Err(e) = consumer.close().await
        {
            failures.push(e);
        }
        if drain.is_complete() {
            if let Some(producer) = &self.producer
                && let Err(e) = producer.close().await
            {
                failures.push(e);
            }
            if let Err(e) = self.cache.close().await {
                failures.push(e);
            }
        }

        for failure in &failures {
            error!(error = %failure, "Shutdown step failed");
        }
        match failures.into_iter().next() {
            Some(first) => Err(first),
            None => {
                info!("Shutdown complete");
                Ok(())
            }
        }
    }

    pub fn cache(&self) -> Arc<KeyedCache> {
        Arc::clone(&self.cache)
    }

    pub fn lookup(&self) -> Arc<WeatherLookupService> {
        Arc::clone(&self.lookup)
    }

    pub fn scheduler(&self) -> Option<Arc<RefreshScheduler>> {
        self.scheduler.clone()
    }

    pub fn producer(&self) -> Option<Arc<MessageProducer>> {
        self.producer.clone()
    }

    pub fn consumer(&self) -> Option<Arc<MessageConsumer>> {
        self.consumer.clone()
    }

    /// Sweep reports received by the consumer
    pub fn reports_received(&self) -> u64 {
        self.listener.received()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("cache", &self.cache)
            .field("scheduler", &self.scheduler.is_some())
            .field("producer", &self.producer)
            .field("consumer", &self.consumer)
            .finish_non_exhaustive()
    }
}
