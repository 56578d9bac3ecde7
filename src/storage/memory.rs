//! 测试用内存存储
//!
//! 与 SeaORM 实现保持同样的条件更新语义（前置状态不满足时返回
//! 冲突或 InvalidState），供服务层单元测试使用。

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::errors::{GradeflowError, Result};
use crate::models::{
    PaginationInfo,
    grades::{
        entities::{GradeRecord, GradeStatus},
        requests::GradeWrite,
    },
    resolutions::{
        entities::{ApprovalStatus, ResolutionRequest},
        requests::{NewResolutionRequest, ResolutionListQuery},
        responses::{PendingResolution, ResolutionListResponse},
    },
};
use crate::storage::Storage;

#[derive(Default)]
struct Inner {
    records: HashMap<i64, GradeRecord>,
    requests: HashMap<i64, ResolutionRequest>,
    next_record_id: i64,
    next_request_id: i64,
    // 注入单条记录的过期失败，用于测试批量清理的部分失败路径
    fail_expire_for: HashSet<i64>,
}

#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 放入一条 Enrolled 记录并返回
    pub fn seed_enrolled(&self, student_id: i64, subject_offering_id: i64) -> GradeRecord {
        let mut inner = self.inner.lock().unwrap();
        inner.next_record_id += 1;
        let now = Utc::now();
        let record = GradeRecord {
            id: inner.next_record_id,
            student_id,
            subject_offering_id,
            grade: None,
            status: GradeStatus::Enrolled,
            remarks: None,
            finalized_at: None,
            inc_deadline: None,
            retake_eligible_after: None,
            created_at: now,
            updated_at: now,
        };
        inner.records.insert(record.id, record.clone());
        record
    }

    /// 直接放入任意状态的记录（测试铺设场景用）
    pub fn seed_record(&self, record: GradeRecord) -> GradeRecord {
        let mut inner = self.inner.lock().unwrap();
        inner.next_record_id = inner.next_record_id.max(record.id);
        inner.records.insert(record.id, record.clone());
        record
    }

    /// 让指定记录的强制过期失败一次性报错
    pub fn inject_expire_failure(&self, record_id: i64) {
        self.inner.lock().unwrap().fail_expire_for.insert(record_id);
    }

    fn has_open_request(inner: &Inner, record_id: i64) -> bool {
        inner
            .requests
            .values()
            .any(|r| r.grade_record_id == record_id && r.approval_status.is_pending())
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn get_grade_record_by_id(&self, id: i64) -> Result<Option<GradeRecord>> {
        Ok(self.inner.lock().unwrap().records.get(&id).cloned())
    }

    async fn apply_direct_grade(
        &self,
        record_id: i64,
        expected_status: GradeStatus,
        write: GradeWrite,
    ) -> Result<GradeRecord> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .records
            .get_mut(&record_id)
            .ok_or_else(|| GradeflowError::not_found(format!("成绩记录 {record_id} 不存在")))?;

        if record.status != expected_status {
            return Err(GradeflowError::conflict(
                "成绩记录已被并发修改，请刷新后重试",
            ));
        }

        record.grade = write.grade;
        record.status = write.status;
        record.remarks = write.remarks;
        record.inc_deadline = write.inc_deadline;
        record.finalized_at = write.finalized_at;
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    async fn list_expired_inc_records(&self, now: DateTime<Utc>) -> Result<Vec<GradeRecord>> {
        let inner = self.inner.lock().unwrap();
        let mut expired: Vec<GradeRecord> = inner
            .records
            .values()
            .filter(|r| {
                r.status == GradeStatus::Inc
                    && matches!(r.inc_deadline, Some(d) if d <= now)
                    && !Self::has_open_request(&inner, r.id)
            })
            .cloned()
            .collect();
        expired.sort_by_key(|r| r.inc_deadline);
        Ok(expired)
    }

    async fn expire_inc_record(
        &self,
        record_id: i64,
        fail_grade: f64,
        now: DateTime<Utc>,
    ) -> Result<GradeRecord> {
        let mut inner = self.inner.lock().unwrap();

        if inner.fail_expire_for.remove(&record_id) {
            return Err(GradeflowError::database_operation(format!(
                "强制过期写入失败: 注入的测试错误 (record {record_id})"
            )));
        }

        if Self::has_open_request(&inner, record_id) {
            return Err(GradeflowError::conflict(format!(
                "成绩记录 {record_id} 存在未结案的处理申请，跳过强制过期"
            )));
        }

        let record = inner
            .records
            .get_mut(&record_id)
            .ok_or_else(|| GradeflowError::not_found(format!("成绩记录 {record_id} 不存在")))?;

        let still_expired =
            record.status == GradeStatus::Inc && matches!(record.inc_deadline, Some(d) if d <= now);
        if !still_expired {
            return Err(GradeflowError::invalid_state(format!(
                "成绩记录 {record_id} 状态已变化，不再满足过期条件"
            )));
        }

        record.grade = Some(fail_grade);
        record.status = GradeStatus::Failed;
        record.inc_deadline = None;
        record.finalized_at = Some(now);
        record.updated_at = now;

        Ok(record.clone())
    }

    async fn create_resolution_request(
        &self,
        req: NewResolutionRequest,
    ) -> Result<ResolutionRequest> {
        let mut inner = self.inner.lock().unwrap();

        if Self::has_open_request(&inner, req.grade_record_id) {
            return Err(GradeflowError::conflict(format!(
                "成绩记录 {} 已存在未结案的处理申请",
                req.grade_record_id
            )));
        }

        inner.next_request_id += 1;
        let request = ResolutionRequest {
            id: inner.next_request_id,
            grade_record_id: req.grade_record_id,
            requested_by: req.requested_by,
            proposed_grade: req.proposed_grade,
            proposed_status: req.proposed_status,
            reason: req.reason,
            approval_status: req.approval_status,
            head_notes: None,
            registrar_notes: None,
            created_at: Utc::now(),
            resolved_at: None,
        };
        inner.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn get_resolution_request_by_id(&self, id: i64) -> Result<Option<ResolutionRequest>> {
        Ok(self.inner.lock().unwrap().requests.get(&id).cloned())
    }

    async fn get_open_request_for_record(
        &self,
        record_id: i64,
    ) -> Result<Option<ResolutionRequest>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .requests
            .values()
            .find(|r| r.grade_record_id == record_id && r.approval_status.is_pending())
            .cloned())
    }

    async fn advance_request_to_registrar(
        &self,
        request_id: i64,
        head_notes: Option<String>,
        _now: DateTime<Utc>,
    ) -> Result<ResolutionRequest> {
        let mut inner = self.inner.lock().unwrap();
        let request = inner
            .requests
            .get_mut(&request_id)
            .ok_or_else(|| GradeflowError::not_found(format!("处理申请 {request_id} 不存在")))?;

        if request.approval_status != ApprovalStatus::PendingHead {
            return Err(GradeflowError::invalid_state(format!(
                "申请 {request_id} 不在待系主任审批状态"
            )));
        }

        request.approval_status = ApprovalStatus::PendingRegistrar;
        request.head_notes = head_notes;
        Ok(request.clone())
    }

    async fn reject_request(
        &self,
        request_id: i64,
        expected_step: ApprovalStatus,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<ResolutionRequest> {
        let mut inner = self.inner.lock().unwrap();
        let request = inner
            .requests
            .get_mut(&request_id)
            .ok_or_else(|| GradeflowError::not_found(format!("处理申请 {request_id} 不存在")))?;

        if request.approval_status != expected_step {
            return Err(GradeflowError::invalid_state(format!(
                "申请 {request_id} 不在 '{expected_step}' 环节"
            )));
        }

        match expected_step {
            ApprovalStatus::PendingHead => request.head_notes = Some(notes),
            ApprovalStatus::PendingRegistrar => request.registrar_notes = Some(notes),
            _ => {
                return Err(GradeflowError::invalid_state(format!(
                    "'{expected_step}' 不是可驳回的审批环节"
                )));
            }
        }

        request.approval_status = ApprovalStatus::Rejected;
        request.resolved_at = Some(now);
        Ok(request.clone())
    }

    async fn revoke_request(
        &self,
        request_id: i64,
        now: DateTime<Utc>,
    ) -> Result<ResolutionRequest> {
        let mut inner = self.inner.lock().unwrap();
        let request = inner
            .requests
            .get_mut(&request_id)
            .ok_or_else(|| GradeflowError::not_found(format!("处理申请 {request_id} 不存在")))?;

        if request.approval_status.is_terminal() {
            return Err(GradeflowError::invalid_state(format!(
                "申请 {request_id} 已结案，不能撤回"
            )));
        }

        request.approval_status = ApprovalStatus::Revoked;
        request.resolved_at = Some(now);
        Ok(request.clone())
    }

    async fn apply_resolution_approval(
        &self,
        request_id: i64,
        registrar_notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(ResolutionRequest, GradeRecord)> {
        let mut inner = self.inner.lock().unwrap();

        let request = inner
            .requests
            .get(&request_id)
            .cloned()
            .ok_or_else(|| GradeflowError::not_found(format!("处理申请 {request_id} 不存在")))?;

        if request.approval_status != ApprovalStatus::PendingRegistrar {
            return Err(GradeflowError::invalid_state(format!(
                "申请 {request_id} 不在待教务处审批状态"
            )));
        }

        let record = inner.records.get_mut(&request.grade_record_id).ok_or_else(|| {
            GradeflowError::not_found(format!("成绩记录 {} 不存在", request.grade_record_id))
        })?;

        record.grade = request.proposed_grade;
        record.status = request.proposed_status;
        record.inc_deadline = None;
        record.finalized_at = Some(now);
        record.updated_at = now;
        let record = record.clone();

        let request = inner.requests.get_mut(&request_id).unwrap();
        request.approval_status = ApprovalStatus::Approved;
        request.registrar_notes = registrar_notes;
        request.resolved_at = Some(now);
        let request = request.clone();

        Ok((request, record))
    }

    async fn list_pending_resolutions_with_pagination(
        &self,
        query: ResolutionListQuery,
    ) -> Result<ResolutionListResponse> {
        let inner = self.inner.lock().unwrap();

        let page = query.page.unwrap_or(1).max(1);
        let size = query.size.unwrap_or(20).clamp(1, 100);

        let mut matched: Vec<&ResolutionRequest> = inner
            .requests
            .values()
            .filter(|r| query.statuses.contains(&r.approval_status))
            .collect();
        matched.sort_by_key(|r| (r.created_at, r.id));

        let total = matched.len() as i64;
        let total_pages = if total == 0 {
            0
        } else {
            (total + size - 1) / size
        };

        let items = matched
            .into_iter()
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .filter_map(|request| {
                inner
                    .records
                    .get(&request.grade_record_id)
                    .map(|record| PendingResolution {
                        request: request.clone(),
                        record: record.clone(),
                    })
            })
            .collect();

        Ok(ResolutionListResponse {
            items,
            pagination: PaginationInfo {
                page,
                page_size: size,
                total,
                total_pages,
            },
        })
    }
}
