//! Tungsten Core - durable model development and promotion pipeline.
//!
//! This crate provides the pipeline's control plane:
//! - A checkpointed phase state machine (`PhaseController`)
//! - Durable workflow state with crash recovery (`CheckpointStore`)
//! - The intake mailbox hand-off between listener and controller
//! - Decision sources (human file or seeded simulator) for the three gates
//! - The promotion boundary toward the serving system

pub mod checkpoint;
pub mod config;
pub mod controller;
pub mod decision;
pub mod error;
pub mod intake;
pub mod layout;
pub mod phase;
pub mod promotion;

pub use checkpoint::{CheckpointStore, StateUpdate, WorkflowState};
pub use config::{
    DecisionConfig, DecisionMode, PipelineConfig, PromotionConfig, TestingConfig, ValidationConfig,
};
pub use controller::{PhaseController, RunOutcome};
pub use decision::{
    ApprovalDecision, DecisionSource, FileDecisionSource, LearningCurveDecision, SelectionDecision,
    SimulatedDecisionSource, MAX_MAX_ITER, MIN_MAX_ITER,
};
pub use error::{PipelineError, PipelineResult};
pub use intake::Mailbox;
pub use layout::PipelineLayout;
pub use phase::Phase;
pub use promotion::{HttpModelPublisher, ModelPublisher, NullModelPublisher};
