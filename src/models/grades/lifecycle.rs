//! 成绩状态机的纯逻辑部分
//!
//! 录入、审批、过期清理三条路径都经由这里的推导函数产生统一的
//! `GradeOutcome`，避免 ≤及格线 这类阈值判断散落在多个入口。

use serde::Serialize;
use ts_rs::TS;

use crate::config::GradingConfig;
use crate::errors::{GradeflowError, Result};
use crate::models::grades::entities::GradeStatus;

/// 一次成绩写入的推导结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradeOutcome {
    Passed(f64),
    Failed(f64),
    Dropped,
    Inc,
}

impl GradeOutcome {
    pub fn status(&self) -> GradeStatus {
        match self {
            GradeOutcome::Passed(_) => GradeStatus::Passed,
            GradeOutcome::Failed(_) => GradeStatus::Failed,
            GradeOutcome::Dropped => GradeStatus::Dropped,
            GradeOutcome::Inc => GradeStatus::Inc,
        }
    }

    pub fn grade(&self) -> Option<f64> {
        match self {
            GradeOutcome::Passed(g) | GradeOutcome::Failed(g) => Some(*g),
            GradeOutcome::Dropped | GradeOutcome::Inc => None,
        }
    }
}

/// 从教师提交的内容推导成绩结果
///
/// 规则：
/// - 显式选择 Dropped / Inc 时优先生效，数值成绩被清空
/// - 否则必须提供量表内的数值成绩，<= 及格线判为通过
/// - 显式选择 Passed / Failed 时必须与数值推导一致
pub fn derive_outcome(
    policy: &GradingConfig,
    proposed_grade: Option<f64>,
    proposed_status: Option<GradeStatus>,
) -> Result<GradeOutcome> {
    match proposed_status {
        Some(GradeStatus::Dropped) => return Ok(GradeOutcome::Dropped),
        Some(GradeStatus::Inc) => return Ok(GradeOutcome::Inc),
        Some(transient @ (GradeStatus::Enrolled | GradeStatus::ForResolution)) => {
            return Err(GradeflowError::validation(format!(
                "不能将记录提交为 '{transient}' 状态"
            )));
        }
        _ => {}
    }

    let grade = proposed_grade.ok_or_else(|| {
        GradeflowError::validation("需要提供数值成绩，或显式选择 dropped / inc")
    })?;

    if grade < policy.scale_min || grade > policy.scale_max {
        return Err(GradeflowError::validation(format!(
            "成绩 {grade:.2} 超出量表范围 [{:.2}, {:.2}]",
            policy.scale_min, policy.scale_max
        )));
    }

    let derived = if grade <= policy.pass_threshold {
        GradeOutcome::Passed(grade)
    } else {
        GradeOutcome::Failed(grade)
    };

    // 显式 Passed / Failed 选择必须与数值推导一致
    if let Some(selected) = proposed_status {
        if selected != derived.status() {
            return Err(GradeflowError::validation(format!(
                "选择的状态 '{selected}' 与成绩 {grade:.2} 推导出的 '{}' 不一致",
                derived.status()
            )));
        }
    }

    Ok(derived)
}

/// 提交路径：直接写入 or 走审批链
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum SubmitPath {
    Direct,     // 窗口内直接写入
    Resolution, // 创建处理申请，走审批链
}

/// 根据记录当前状态与成绩录入窗口判定提交路径
///
/// - Enrolled：仅窗口内可首次录入
/// - Passed / Failed / Inc：窗口内为更正（直接写入），窗口外走审批链
/// - Dropped：窗口外不可再变更（补修由选课侧处理）
pub fn classify_submission(status: GradeStatus, window_open: bool) -> Result<SubmitPath> {
    match (status, window_open) {
        (GradeStatus::Enrolled, true) => Ok(SubmitPath::Direct),
        (GradeStatus::Enrolled, false) => Err(GradeflowError::invalid_state(
            "成绩录入窗口已关闭，未录入成绩的记录不能再直接提交",
        )),
        (GradeStatus::Passed | GradeStatus::Failed | GradeStatus::Inc, true) => {
            Ok(SubmitPath::Direct)
        }
        (GradeStatus::Passed | GradeStatus::Failed | GradeStatus::Inc, false) => {
            Ok(SubmitPath::Resolution)
        }
        // ForResolution 是展示别名，存储状态仍为 Inc；能走到这里说明
        // 调用方传入了展示状态，按 Inc 同样处理
        (GradeStatus::ForResolution, open) => classify_submission(GradeStatus::Inc, open),
        (GradeStatus::Dropped, true) => Ok(SubmitPath::Direct),
        (GradeStatus::Dropped, false) => Err(GradeflowError::invalid_state(
            "已退选的记录不能在窗口外提交成绩",
        )),
    }
}

/// 审批链允许的处理结果：Passed / Failed / Dropped
///
/// 审批通过后记录必须落到已结算状态，不能仍是 Inc。
pub fn ensure_resolvable_outcome(outcome: &GradeOutcome) -> Result<()> {
    match outcome {
        GradeOutcome::Inc => Err(GradeflowError::validation(
            "处理申请的目标状态必须为 passed / failed / dropped",
        )),
        _ => Ok(()),
    }
}
