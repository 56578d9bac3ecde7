//! 成绩处理申请实体
//!
//! `open` 列在申请处于待审状态时为 1，终态后置为 NULL。
//! (grade_record_id, open) 上的唯一索引保证同一条成绩记录
//! 同时最多只有一个未结案的申请。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "resolution_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub grade_record_id: i64,
    pub requested_by: i64,
    pub proposed_grade: Option<f64>,
    pub proposed_status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    pub approval_status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub head_notes: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub registrar_notes: Option<String>,
    pub open: Option<i32>,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::grade_records::Entity",
        from = "Column::GradeRecordId",
        to = "super::grade_records::Column::Id"
    )]
    GradeRecord,
}

impl Related<super::grade_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradeRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_resolution_request(self) -> crate::models::resolutions::entities::ResolutionRequest {
        use crate::models::grades::entities::GradeStatus;
        use crate::models::resolutions::entities::{ApprovalStatus, ResolutionRequest};
        use chrono::{DateTime, Utc};

        ResolutionRequest {
            id: self.id,
            grade_record_id: self.grade_record_id,
            requested_by: self.requested_by,
            proposed_grade: self.proposed_grade,
            proposed_status: self
                .proposed_status
                .parse::<GradeStatus>()
                .unwrap_or(GradeStatus::Failed),
            reason: self.reason,
            approval_status: self
                .approval_status
                .parse::<ApprovalStatus>()
                .unwrap_or(ApprovalStatus::Rejected),
            head_notes: self.head_notes,
            registrar_notes: self.registrar_notes,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            resolved_at: self
                .resolved_at
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
        }
    }
}
