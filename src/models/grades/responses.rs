use serde::Serialize;
use ts_rs::TS;

use crate::models::grades::entities::{GradeRecord, GradeStatus};
use crate::models::grades::lifecycle::SubmitPath;
use crate::models::resolutions::entities::ResolutionRequest;

// 成绩提交结果
//
// 直接写入时 record 为更新后的记录；走审批链时 record 保持
// 原已结算状态，resolution_request 携带新建的申请。
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct SubmitGradeResponse {
    pub path: SubmitPath,
    pub record: GradeRecord,
    pub display_status: GradeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_request: Option<ResolutionRequest>,
}

// 过期清理候选（dry-run 预览与 commit 报告共用）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/sweep.ts")]
pub struct SweepCandidate {
    pub grade_record_id: i64,
    pub student_id: i64,
    pub subject_offering_id: i64,
    pub inc_deadline: chrono::DateTime<chrono::Utc>,
    pub days_overdue: i64,
}

// 单条记录转换失败的报告项（不会中断整批清理）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/sweep.ts")]
pub struct SweepFailure {
    pub grade_record_id: i64,
    pub error: String,
}

// 过期清理报告
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/sweep.ts")]
pub struct SweepReport {
    pub dry_run: bool,
    pub examined: usize,
    pub converted: usize,
    pub candidates: Vec<SweepCandidate>,
    pub failures: Vec<SweepFailure>,
}
