//! Mock stage-movement provider for testing.
//!
//! This module provides an in-memory [`MockProvider`] that implements
//! [`StageMovementProvider`] over a configurable set of applications and
//! pipelines, recording every mutation it receives. It is useful for unit
//! testing the service layer, the cache mutations, and the auto-advance
//! engine without a backend.
//!
//! # Feature Flag
//!
//! Outside of this crate's own tests the module is only available when the
//! `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! hireflow-core = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use super::{
    BulkMoveOutcome, BulkMoveRequest, MoveStageRequest, StageMovementProvider, StatsTimeframe,
};
use crate::error::{Error, Result};
use crate::types::{JobApplication, Pipeline, StageMovementHistoryEntry, StageMovementStats};

/// Configuration for the mock provider.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Applications known to the mock backend.
    pub applications: Vec<JobApplication>,
    /// Pipelines known to the mock backend.
    pub pipelines: Vec<Pipeline>,
    /// Canned audit history, filtered per application on fetch.
    pub history: Vec<StageMovementHistoryEntry>,
    /// When set, every move and bulk move is rejected with an external
    /// error, for exercising failure paths.
    pub fail_moves: bool,
}

#[derive(Debug, Default)]
struct MockState {
    applications: HashMap<Uuid, JobApplication>,
    moves: Vec<(Uuid, MoveStageRequest)>,
    bulk_moves: Vec<BulkMoveRequest>,
}

/// In-memory mock provider for testing.
///
/// Moves mutate the mock's application set, so consecutive derived
/// operations observe each other's effects the way they would against a
/// real backend.
#[derive(Clone, Debug)]
pub struct MockProvider {
    config: Arc<MockConfig>,
    state: Arc<Mutex<MockState>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

impl MockProvider {
    /// Creates a new mock provider with the given configuration.
    pub fn new(config: MockConfig) -> Self {
        let state = MockState {
            applications: config
                .applications
                .iter()
                .map(|application| (application.id, application.clone()))
                .collect(),
            moves: Vec::new(),
            bulk_moves: Vec::new(),
        };
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Returns every single-move call received so far, in order.
    pub fn recorded_moves(&self) -> Vec<(Uuid, MoveStageRequest)> {
        self.state.lock().expect("mock state poisoned").moves.clone()
    }

    /// Returns every bulk-move call received so far, in order.
    pub fn recorded_bulk_moves(&self) -> Vec<BulkMoveRequest> {
        self.state
            .lock()
            .expect("mock state poisoned")
            .bulk_moves
            .clone()
    }

    fn stage_name(&self, stage_id: Uuid) -> Option<String> {
        self.config
            .pipelines
            .iter()
            .flat_map(|pipeline| pipeline.stages.iter())
            .find(|stage| stage.id == stage_id)
            .map(|stage| stage.name.clone())
    }
}

#[async_trait::async_trait]
impl StageMovementProvider for MockProvider {
    async fn move_to_stage(
        &self,
        application_id: Uuid,
        request: &MoveStageRequest,
    ) -> Result<JobApplication> {
        if self.config.fail_moves {
            return Err(Error::external_error().with_message("move rejected by mock"));
        }

        let stage_name = self.stage_name(request.to_stage_id);
        let mut state = self.state.lock().expect("mock state poisoned");
        state.moves.push((application_id, request.clone()));

        let application = state
            .applications
            .get_mut(&application_id)
            .ok_or_else(|| Error::not_found().with_message("application not found"))?;
        application.current_pipeline_stage_id = Some(request.to_stage_id);
        application.current_pipeline_stage_name = stage_name.clone();
        application.stage = stage_name;

        Ok(application.clone())
    }

    async fn bulk_move(&self, request: &BulkMoveRequest) -> Result<BulkMoveOutcome> {
        if self.config.fail_moves {
            return Err(Error::external_error().with_message("bulk move rejected by mock"));
        }

        let stage_name = self.stage_name(request.to_stage_id);
        let mut state = self.state.lock().expect("mock state poisoned");
        state.bulk_moves.push(request.clone());

        for application_id in &request.application_ids {
            if let Some(application) = state.applications.get_mut(application_id) {
                application.current_pipeline_stage_id = Some(request.to_stage_id);
                application.current_pipeline_stage_name = stage_name.clone();
            }
        }

        Ok(BulkMoveOutcome {
            moved_count: request.application_ids.len() as u64,
        })
    }

    async fn stage_history(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<StageMovementHistoryEntry>> {
        Ok(self
            .config
            .history
            .iter()
            .filter(|entry| entry.application_id == application_id)
            .cloned()
            .collect())
    }

    async fn applications_by_stage(
        &self,
        pipeline_id: Uuid,
    ) -> Result<HashMap<Uuid, Vec<JobApplication>>> {
        let state = self.state.lock().expect("mock state poisoned");
        let mut grouped: HashMap<Uuid, Vec<JobApplication>> = HashMap::new();
        for application in state.applications.values() {
            if application.pipeline_id != Some(pipeline_id) {
                continue;
            }
            if let Some(stage_id) = application.current_pipeline_stage_id {
                grouped.entry(stage_id).or_default().push(application.clone());
            }
        }
        Ok(grouped)
    }

    async fn movement_stats(
        &self,
        pipeline_id: Uuid,
        _timeframe: Option<&StatsTimeframe>,
    ) -> Result<StageMovementStats> {
        Ok(StageMovementStats {
            pipeline_id,
            stage_times: Vec::new(),
            conversions: Vec::new(),
            dropoffs: HashMap::new(),
            total_movements: self.state.lock().expect("mock state poisoned").moves.len()
                as u64,
        })
    }

    async fn get_application(&self, application_id: Uuid) -> Result<JobApplication> {
        self.state
            .lock()
            .expect("mock state poisoned")
            .applications
            .get(&application_id)
            .cloned()
            .ok_or_else(|| Error::not_found().with_message("application not found"))
    }

    async fn get_pipeline(&self, pipeline_id: Uuid) -> Result<Pipeline> {
        self.config
            .pipelines
            .iter()
            .find(|pipeline| pipeline.id == pipeline_id)
            .cloned()
            .ok_or_else(|| Error::not_found().with_message("pipeline not found"))
    }
}
