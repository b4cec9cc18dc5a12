//! Core decision logic: classification, quota accounting, access policy and
//! task tracking, plus the report payloads rendered by the CLI.

pub mod access;
pub mod classifier;
pub mod credits;
pub mod logging;
pub mod models;
pub mod reset_clock;
pub mod tasks;

pub use access::{AccessContext, Feature, OnboardingStatus, Redirect, Role};
pub use classifier::{
    Classification, PatternKind, PatternMatch, PatternSets, QueryClass, QueryClassifier,
};
pub use credits::{
    ConsumeOutcome, CreditBalance, CreditPolicy, CreditState, CreditStore, MessageOutcome,
};
pub use models::{
    AccessReport, ClassifyReport, ClockReport, ConfigEntry, ConfigReport, CreditsReport,
    RedirectReport, RobotOutput, SendReport, TaskPlan, TaskRunReport,
};
pub use reset_clock::{DateComparison, ResetClock, ResetCountdown};
pub use tasks::{
    Subscription, Task, TaskChange, TaskContext, TaskError, TaskExecutor, TaskManager,
    TaskStatus, TaskUpdate, decompose_request,
};
