use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::{
    grades::{
        entities::{GradeRecord, GradeStatus},
        requests::GradeWrite,
    },
    resolutions::{
        entities::{ApprovalStatus, ResolutionRequest},
        requests::{NewResolutionRequest, ResolutionListQuery},
        responses::ResolutionListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[cfg(test)]
pub mod memory;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 成绩记录方法
    // 通过ID获取成绩记录
    async fn get_grade_record_by_id(&self, id: i64) -> Result<Option<GradeRecord>>;
    // 直接写入成绩（带条件检查：记录状态仍为读取时的状态，否则视为并发冲突）
    async fn apply_direct_grade(
        &self,
        record_id: i64,
        expected_status: GradeStatus,
        write: GradeWrite,
    ) -> Result<GradeRecord>;
    // 列出已过期且无未结案申请的 INC 记录（期限等于当前时刻的也包含在内）
    async fn list_expired_inc_records(&self, now: DateTime<Utc>) -> Result<Vec<GradeRecord>>;
    // 将一条过期 INC 记录强制转为不及格（单条事务，失败不影响其它记录）
    async fn expire_inc_record(
        &self,
        record_id: i64,
        fail_grade: f64,
        now: DateTime<Utc>,
    ) -> Result<GradeRecord>;

    /// 处理申请方法
    // 创建处理申请（原子的查重+插入，同一记录已有未结案申请时返回冲突）
    async fn create_resolution_request(
        &self,
        req: NewResolutionRequest,
    ) -> Result<ResolutionRequest>;
    // 通过ID获取申请
    async fn get_resolution_request_by_id(&self, id: i64) -> Result<Option<ResolutionRequest>>;
    // 获取记录当前未结案的申请
    async fn get_open_request_for_record(&self, record_id: i64)
    -> Result<Option<ResolutionRequest>>;
    // 系主任通过，推进到教务处环节
    async fn advance_request_to_registrar(
        &self,
        request_id: i64,
        head_notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ResolutionRequest>;
    // 驳回（系主任或教务处环节），记录驳回意见
    async fn reject_request(
        &self,
        request_id: i64,
        expected_step: ApprovalStatus,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<ResolutionRequest>;
    // 申请人撤回（仅待审状态下）
    async fn revoke_request(
        &self,
        request_id: i64,
        now: DateTime<Utc>,
    ) -> Result<ResolutionRequest>;
    // 教务处最终批准：在同一事务内更新申请与成绩记录
    async fn apply_resolution_approval(
        &self,
        request_id: i64,
        registrar_notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(ResolutionRequest, GradeRecord)>;
    // 列出待审申请（分页，附带目标成绩记录）
    async fn list_pending_resolutions_with_pagination(
        &self,
        query: ResolutionListQuery,
    ) -> Result<ResolutionListResponse>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
