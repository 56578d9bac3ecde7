use serde::Serialize;
use ts_rs::TS;

use crate::models::PaginationInfo;
use crate::models::grades::entities::GradeRecord;
use crate::models::resolutions::entities::ResolutionRequest;

// 待审列表项：申请连同其目标成绩记录，供审批界面展示
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resolution.ts")]
pub struct PendingResolution {
    pub request: ResolutionRequest,
    pub record: GradeRecord,
}

// 待审列表响应
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resolution.ts")]
pub struct ResolutionListResponse {
    pub items: Vec<PendingResolution>,
    pub pagination: PaginationInfo,
}

// 审批结果
//
// 最终批准时 record 为已更新的成绩记录，其余环节为 None。
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resolution.ts")]
pub struct DecisionResponse {
    pub request: ResolutionRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<GradeRecord>,
}
