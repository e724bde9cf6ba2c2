//! Explicit construction of the analysis pipeline.
//!
//! Every collaborator is passed in; queues are bound with one `subscribe`
//! call each. The event listener runs until the last sender is dropped.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::adapters::fallback::{FileFallbackSink, HttpFallbackSink};
use crate::adapters::messaging::{
    AckDecision, Delivery, IntakeRouter, StaticEvaluationHandler, SubmitTaskHandler, SubmitTaskMapper,
};
use crate::domain::errors::DomainResult;
use crate::domain::models::{Config, PublishingConfig};
use crate::domain::ports::{EngineDriver, FallbackSink, MessagePublisher, NotationService, StaticEvaluator};
use crate::services::{
    spawn_event_listeners, AnalysisEvents, AnalysisQueries, AnalysisService, Caches, EngineLock,
    FallbackDispatcher, ResultPublisher, StaticEvaluationPublisher,
};

/// External collaborators the pipeline is built around.
pub struct Collaborators {
    pub engine: Arc<dyn EngineDriver>,
    pub evaluator: Arc<dyn StaticEvaluator>,
    pub broker: Arc<dyn MessagePublisher>,
    pub notation: Arc<dyn NotationService>,
    pub fallback_sinks: Vec<Arc<dyn FallbackSink>>,
}

/// HTTP sink when a URL is configured, and always the file sink.
pub fn fallback_sinks_from_config(config: &PublishingConfig) -> DomainResult<Vec<Arc<dyn FallbackSink>>> {
    let mut sinks: Vec<Arc<dyn FallbackSink>> = Vec::new();
    if let Some(url) = &config.fallback_url {
        sinks.push(Arc::new(HttpFallbackSink::new(
            url.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )?));
    }
    sinks.push(Arc::new(FileFallbackSink::new(config.fallback_dir.clone())));
    Ok(sinks)
}

pub struct Pipeline {
    router: IntakeRouter,
    service: Arc<AnalysisService>,
    queries: AnalysisQueries,
    listener: JoinHandle<()>,
}

impl Pipeline {
    /// Wire caches, lock, services and handlers. Must run inside a Tokio runtime.
    pub fn build(config: &Config, collaborators: Collaborators) -> Self {
        let caches = Caches::from_config(&config.cache);
        let lock = EngineLock::new();
        let (events, receiver) = AnalysisEvents::channel();

        let service = Arc::new(
            AnalysisService::new(caches.clone(), collaborators.engine, lock.clone(), events)
                .with_wait_when_busy(config.engine.wait_when_busy),
        );
        let publisher = Arc::new(ResultPublisher::new(
            collaborators.broker.clone(),
            FallbackDispatcher::new(collaborators.fallback_sinks),
            config.publishing.evaluation_exchange.clone(),
        ));
        let listener = spawn_event_listeners(receiver, publisher);

        let mapper = SubmitTaskMapper::new(collaborators.notation, &config.engine);
        let submit = Arc::new(SubmitTaskHandler::new(
            service.clone(),
            mapper,
            Duration::from_millis(config.intake.submit_delay_ms),
        ));
        let static_evaluation = Arc::new(StaticEvaluationHandler::new(
            collaborators.evaluator,
            Arc::new(StaticEvaluationPublisher::new(
                collaborators.broker,
                config.publishing.static_evaluation_exchange.clone(),
            )),
        ));

        let mut router = IntakeRouter::new();
        for queue in &config.intake.submit_queues {
            router.subscribe(queue.clone(), submit.clone());
        }
        router.subscribe(config.intake.static_evaluation_queue.clone(), static_evaluation);

        Self {
            router,
            service,
            queries: AnalysisQueries::new(caches, lock),
            listener,
        }
    }

    pub fn router(&self) -> &IntakeRouter {
        &self.router
    }

    pub fn service(&self) -> &AnalysisService {
        &self.service
    }

    pub fn queries(&self) -> &AnalysisQueries {
        &self.queries
    }

    pub async fn dispatch(&self, delivery: Delivery) -> AckDecision {
        self.router.dispatch(delivery).await
    }

    /// Drop the intake side and wait for pending publications to settle.
    pub async fn shutdown(self) {
        let Self {
            router,
            service,
            queries,
            listener,
        } = self;
        drop(router);
        drop(service);
        drop(queries);
        if let Err(err) = listener.await {
            tracing::error!(error = %err, "event listener ended abnormally");
        }
    }
}
