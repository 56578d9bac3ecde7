use serde::Deserialize;
use ts_rs::TS;

use crate::models::grades::entities::GradeStatus;

// 教师成绩提交请求
//
// proposed_status 仅在显式选择 dropped / inc，或希望校验
// passed / failed 推导结果时携带；普通录入只传数值成绩。
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct SubmitGradeRequest {
    pub proposed_grade: Option<f64>,
    pub proposed_status: Option<GradeStatus>,
    pub remarks: Option<String>,
}

// 存储层成绩写入命令（由服务层根据推导结果组装）
#[derive(Debug, Clone)]
pub struct GradeWrite {
    pub status: GradeStatus,
    pub grade: Option<f64>,
    pub remarks: Option<String>,
    pub inc_deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub finalized_at: Option<chrono::DateTime<chrono::Utc>>,
}
