use serde::Deserialize;
use ts_rs::TS;

use crate::models::grades::entities::GradeStatus;
use crate::models::resolutions::entities::ApprovalStatus;
use crate::models::staff::entities::ActorRole;

// 审批决定
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/resolution.ts")]
pub enum Decision {
    Approve,
    Reject,
}

// 审批请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resolution.ts")]
pub struct DecideRequest {
    pub decision: Decision,
    pub notes: Option<String>,
}

// 存储层新建申请命令（由服务层组装）
#[derive(Debug, Clone)]
pub struct NewResolutionRequest {
    pub grade_record_id: i64,
    pub requested_by: i64,
    pub proposed_grade: Option<f64>,
    pub proposed_status: GradeStatus,
    pub reason: Option<String>,
    pub approval_status: ApprovalStatus,
}

// 待审列表查询参数（用于存储层）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resolution.ts")]
pub struct ResolutionListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    #[serde(skip)]
    #[ts(skip)]
    pub statuses: Vec<ApprovalStatus>,
}

impl ResolutionListQuery {
    /// 按审批角色确定可见的待审环节
    pub fn for_role(role: ActorRole, page: Option<i64>, size: Option<i64>) -> Option<Self> {
        let statuses = match role {
            ActorRole::DepartmentHead => vec![ApprovalStatus::PendingHead],
            ActorRole::Registrar => vec![ApprovalStatus::PendingRegistrar],
            ActorRole::Admin => vec![
                ApprovalStatus::PendingHead,
                ApprovalStatus::PendingRegistrar,
            ],
            ActorRole::Professor => return None,
        };
        Some(Self {
            page,
            size,
            statuses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_for_role() {
        let q = ResolutionListQuery::for_role(ActorRole::DepartmentHead, None, None).unwrap();
        assert_eq!(q.statuses, vec![ApprovalStatus::PendingHead]);

        let q = ResolutionListQuery::for_role(ActorRole::Registrar, None, None).unwrap();
        assert_eq!(q.statuses, vec![ApprovalStatus::PendingRegistrar]);

        let q = ResolutionListQuery::for_role(ActorRole::Admin, None, None).unwrap();
        assert_eq!(q.statuses.len(), 2);

        assert!(ResolutionListQuery::for_role(ActorRole::Professor, None, None).is_none());
    }
}
