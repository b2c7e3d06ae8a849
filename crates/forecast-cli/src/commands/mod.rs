//! CLI 명령어 모듈.

pub mod models;
pub mod run;

pub use models::{show_performance, show_predictions, train_models, TrainArgs};
pub use run::{run_workflow, select_configs, RunArgs, RunOutcome};
