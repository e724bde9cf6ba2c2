pub mod analysis_run;
pub mod config;
pub mod evaluation;
pub mod iso_duration;
pub mod journal;
pub mod observation;
pub mod position;
pub mod score;
pub mod task_id;

pub use analysis_run::{AnalysisLimit, AnalysisRun, DynamicPv, EngineOption};
pub use config::{
    CacheConfig, Config, EngineConfig, IntakeConfig, LogFormat, LoggingConfig, PublishingConfig,
    RotationPolicy,
};
pub use evaluation::{Evaluation, UciState, Variation};
pub use journal::{RunJournal, RunStatus};
pub use observation::EngineObservation;
pub use position::Position;
pub use score::Score;
pub use task_id::TaskId;
