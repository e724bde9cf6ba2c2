//! Handlers for the two inbound message kinds.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::StaticEvaluator;
use crate::services::analysis_service::AnalysisService;
use crate::services::result_publisher::StaticEvaluationPublisher;

use super::dto::{StaticEvaluationMessage, StaticEvaluationRequest, SubmitTaskCommand};
use super::envelope::Envelope;
use super::errors::IntakeError;
use super::intake::MessageHandler;
use super::mapper::SubmitTaskMapper;

/// Handles `submittaskcommand` deliveries by running the analysis.
pub struct SubmitTaskHandler {
    service: Arc<AnalysisService>,
    mapper: SubmitTaskMapper,
    delay: Duration,
}

impl SubmitTaskHandler {
    pub fn new(service: Arc<AnalysisService>, mapper: SubmitTaskMapper, delay: Duration) -> Self {
        Self { service, mapper, delay }
    }
}

#[async_trait]
impl MessageHandler for SubmitTaskHandler {
    fn kind(&self) -> &'static str {
        "submit_task"
    }

    async fn handle(&self, _envelope: &Envelope, body: &[u8]) -> Result<(), IntakeError> {
        let command: SubmitTaskCommand = serde_json::from_slice(body)?;
        command.validate()?;

        // A companion consumer may be pulling the same task from the second queue.
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let run = self.mapper.to_run(&command)?;
        tracing::info!(
            task_id = %run.task_id,
            engine = %run.engine_program_name,
            initial_pv = run.initial_pv,
            "task submission accepted"
        );

        match self.service.submit(run).await? {
            Some(task_id) => {
                tracing::info!(task_id = %task_id, "analysis completed");
                Ok(())
            }
            None => Err(IntakeError::EngineUnavailable(command.engine_id)),
        }
    }
}

/// Handles `staticevaluationrequest` deliveries.
pub struct StaticEvaluationHandler {
    evaluator: Arc<dyn StaticEvaluator>,
    publisher: Arc<StaticEvaluationPublisher>,
}

impl StaticEvaluationHandler {
    pub fn new(evaluator: Arc<dyn StaticEvaluator>, publisher: Arc<StaticEvaluationPublisher>) -> Self {
        Self { evaluator, publisher }
    }
}

#[async_trait]
impl MessageHandler for StaticEvaluationHandler {
    fn kind(&self) -> &'static str {
        "static_evaluation"
    }

    async fn handle(&self, _envelope: &Envelope, body: &[u8]) -> Result<(), IntakeError> {
        let request: StaticEvaluationRequest = serde_json::from_slice(body)?;
        if request.fen.trim().is_empty() {
            return Err(IntakeError::Validation("fen is required".to_string()));
        }

        let evaluation = self.evaluator.evaluate(&request.fen).await?;
        tracing::debug!(fen = %request.fen, "static evaluation computed");

        // Settlement is logged by the publisher; loss is acceptable here.
        let _ticket = self
            .publisher
            .publish(&StaticEvaluationMessage { request, evaluation })
            .await;
        Ok(())
    }
}
