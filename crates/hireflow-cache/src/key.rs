//! Cache key scheme and the invalidation table.

use uuid::Uuid;

/// A key in the query cache.
///
/// The string renderings below are the documented naming scheme; hooks and
/// mutations never invent ad-hoc key strings.
///
/// | Key                         | Name                                  |
/// |-----------------------------|---------------------------------------|
/// | `JobApplications`           | `job-applications`                    |
/// | `JobApplication(id)`        | `job-applications:{id}`               |
/// | `StageHistory(id)`          | `stage-history:{application_id}`      |
/// | `ApplicationsByStage(id)`   | `applications-by-stage:{pipeline_id}` |
/// | `PipelineStats(id)`         | `pipeline-stats:{pipeline_id}`        |
/// | `Pipeline(id)`              | `pipelines:{id}`                      |
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The flat list of job applications.
    JobApplications,
    /// One job application.
    JobApplication(Uuid),
    /// Stage-movement audit history of one application.
    StageHistory(Uuid),
    /// A pipeline's applications grouped by current stage.
    ApplicationsByStage(Uuid),
    /// Aggregate movement metrics of one pipeline.
    PipelineStats(Uuid),
    /// One pipeline with its stage list.
    Pipeline(Uuid),
}

impl QueryKey {
    /// Renders the documented string name of this key.
    pub fn name(&self) -> String {
        match self {
            Self::JobApplications => "job-applications".to_string(),
            Self::JobApplication(id) => format!("job-applications:{id}"),
            Self::StageHistory(id) => format!("stage-history:{id}"),
            Self::ApplicationsByStage(id) => format!("applications-by-stage:{id}"),
            Self::PipelineStats(id) => format!("pipeline-stats:{id}"),
            Self::Pipeline(id) => format!("pipelines:{id}"),
        }
    }
}

/// The authoritative set of keys one stage move touches.
///
/// Every mutation path consults this table instead of hand-listing keys:
/// the application list, the moved application itself, its audit history,
/// and — when the pipeline is known — the pipeline's stage grouping and
/// stats.
pub fn keys_touched_by_move(application_id: Uuid, pipeline_id: Option<Uuid>) -> Vec<QueryKey> {
    let mut keys = vec![
        QueryKey::JobApplications,
        QueryKey::JobApplication(application_id),
        QueryKey::StageHistory(application_id),
    ];
    if let Some(pipeline_id) = pipeline_id {
        keys.push(QueryKey::ApplicationsByStage(pipeline_id));
        keys.push(QueryKey::PipelineStats(pipeline_id));
    }
    keys
}

/// The authoritative set of keys a bulk move touches: the shared keys plus
/// the per-application history and entity keys of every member of the batch.
pub fn keys_touched_by_bulk_move(
    application_ids: &[Uuid],
    pipeline_id: Option<Uuid>,
) -> Vec<QueryKey> {
    let mut keys = vec![QueryKey::JobApplications];
    if let Some(pipeline_id) = pipeline_id {
        keys.push(QueryKey::ApplicationsByStage(pipeline_id));
        keys.push(QueryKey::PipelineStats(pipeline_id));
    }
    for &application_id in application_ids {
        keys.push(QueryKey::JobApplication(application_id));
        keys.push(QueryKey::StageHistory(application_id));
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_follow_scheme() {
        let id = Uuid::nil();
        assert_eq!(QueryKey::JobApplications.name(), "job-applications");
        assert_eq!(
            QueryKey::StageHistory(id).name(),
            format!("stage-history:{id}")
        );
        assert_eq!(QueryKey::Pipeline(id).name(), format!("pipelines:{id}"));
    }

    #[test]
    fn test_move_table_without_pipeline_omits_pipeline_keys() {
        let application_id = Uuid::new_v4();
        let keys = keys_touched_by_move(application_id, None);
        assert_eq!(
            keys,
            vec![
                QueryKey::JobApplications,
                QueryKey::JobApplication(application_id),
                QueryKey::StageHistory(application_id),
            ]
        );
    }

    #[test]
    fn test_bulk_table_lists_every_member() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let pipeline_id = Uuid::new_v4();
        let keys = keys_touched_by_bulk_move(&ids, Some(pipeline_id));

        for id in &ids {
            assert!(keys.contains(&QueryKey::StageHistory(*id)));
            assert!(keys.contains(&QueryKey::JobApplication(*id)));
        }
        assert!(keys.contains(&QueryKey::ApplicationsByStage(pipeline_id)));
        assert!(keys.contains(&QueryKey::PipelineStats(pipeline_id)));
        assert!(keys.contains(&QueryKey::JobApplications));
    }
}
