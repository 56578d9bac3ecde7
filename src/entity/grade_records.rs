//! 成绩记录实体
//!
//! 每个学生在每个开课班（subject offering）上有且仅有一条成绩记录。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grade_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub subject_offering_id: i64,
    pub grade: Option<f64>,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub remarks: Option<String>,
    pub finalized_at: Option<i64>,
    pub inc_deadline: Option<i64>,
    pub retake_eligible_after: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::resolution_requests::Entity")]
    ResolutionRequests,
}

impl Related<super::resolution_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ResolutionRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_grade_record(self) -> crate::models::grades::entities::GradeRecord {
        use crate::models::grades::entities::{GradeRecord, GradeStatus};
        use chrono::{DateTime, Utc};

        GradeRecord {
            id: self.id,
            student_id: self.student_id,
            subject_offering_id: self.subject_offering_id,
            grade: self.grade,
            status: self
                .status
                .parse::<GradeStatus>()
                .unwrap_or(GradeStatus::Enrolled),
            remarks: self.remarks,
            finalized_at: self
                .finalized_at
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            inc_deadline: self
                .inc_deadline
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            retake_eligible_after: self
                .retake_eligible_after
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
