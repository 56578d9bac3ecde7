use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::grades::entities::GradeStatus;
use crate::models::staff::entities::ActorRole;

// 处理申请审批状态
//
// 两级审批链：系主任 → 教务处。开课班配置为免系主任签核时，
// 申请直接从 PendingRegistrar 开始。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/resolution.ts")]
pub enum ApprovalStatus {
    PendingHead,      // 待系主任审批
    PendingRegistrar, // 待教务处审批
    Approved,         // 已通过（终态）
    Rejected,         // 已驳回（终态）
    Revoked,          // 申请人撤回（终态）
}

impl ApprovalStatus {
    pub const PENDING_HEAD: &'static str = "pending_head";
    pub const PENDING_REGISTRAR: &'static str = "pending_registrar";
    pub const APPROVED: &'static str = "approved";
    pub const REJECTED: &'static str = "rejected";
    pub const REVOKED: &'static str = "revoked";

    /// 终态申请不可再变更
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApprovalStatus::Approved | ApprovalStatus::Rejected | ApprovalStatus::Revoked
        )
    }

    pub fn is_pending(&self) -> bool {
        !self.is_terminal()
    }

    /// 审批链的下一步：通过系主任环节进入教务处环节，
    /// 通过教务处环节即为最终批准
    pub fn next_on_approve(&self) -> Option<ApprovalStatus> {
        match self {
            ApprovalStatus::PendingHead => Some(ApprovalStatus::PendingRegistrar),
            ApprovalStatus::PendingRegistrar => Some(ApprovalStatus::Approved),
            _ => None,
        }
    }

    /// 当前环节允许的审批角色
    pub fn reviewer_allowed(&self, role: ActorRole) -> bool {
        match self {
            ApprovalStatus::PendingHead => role.can_review_head_step(),
            ApprovalStatus::PendingRegistrar => role.can_review_registrar_step(),
            _ => false,
        }
    }

    /// 根据开课班配置决定申请的起始环节
    pub fn initial(requires_head_signoff: bool) -> ApprovalStatus {
        if requires_head_signoff {
            ApprovalStatus::PendingHead
        } else {
            ApprovalStatus::PendingRegistrar
        }
    }
}

impl<'de> Deserialize<'de> for ApprovalStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            ApprovalStatus::PENDING_HEAD => Ok(ApprovalStatus::PendingHead),
            ApprovalStatus::PENDING_REGISTRAR => Ok(ApprovalStatus::PendingRegistrar),
            ApprovalStatus::APPROVED => Ok(ApprovalStatus::Approved),
            ApprovalStatus::REJECTED => Ok(ApprovalStatus::Rejected),
            ApprovalStatus::REVOKED => Ok(ApprovalStatus::Revoked),
            _ => Err(serde::de::Error::custom(format!(
                "无效的审批状态: '{s}'. 支持的状态: pending_head, pending_registrar, approved, rejected, revoked"
            ))),
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::PendingHead => write!(f, "{}", ApprovalStatus::PENDING_HEAD),
            ApprovalStatus::PendingRegistrar => write!(f, "{}", ApprovalStatus::PENDING_REGISTRAR),
            ApprovalStatus::Approved => write!(f, "{}", ApprovalStatus::APPROVED),
            ApprovalStatus::Rejected => write!(f, "{}", ApprovalStatus::REJECTED),
            ApprovalStatus::Revoked => write!(f, "{}", ApprovalStatus::REVOKED),
        }
    }
}

impl std::str::FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_head" => Ok(ApprovalStatus::PendingHead),
            "pending_registrar" => Ok(ApprovalStatus::PendingRegistrar),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            "revoked" => Ok(ApprovalStatus::Revoked),
            _ => Err(format!("Invalid approval status: {s}")),
        }
    }
}

// 成绩处理申请实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/resolution.ts")]
pub struct ResolutionRequest {
    pub id: i64,
    pub grade_record_id: i64,
    pub requested_by: i64,
    pub proposed_grade: Option<f64>,
    pub proposed_status: GradeStatus,
    pub reason: Option<String>,
    pub approval_status: ApprovalStatus,
    pub head_notes: Option<String>,
    pub registrar_notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub resolved_at: Option<chrono::DateTime<chrono::Utc>>,
}
