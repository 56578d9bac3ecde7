pub mod decide;
pub mod list;

use std::sync::Arc;

use crate::directory::Notifier;
use crate::errors::Result;
use crate::models::resolutions::{requests::DecideRequest, responses::{DecisionResponse, ResolutionListResponse}};
use crate::models::staff::entities::ActorRole;
use crate::storage::Storage;

/// 审批服务（系主任 / 教务处）
///
/// 两级审批链：系主任通过后进入教务处环节，教务处通过时
/// 申请结案并同步更新成绩记录。
pub struct ApprovalService {
    pub(crate) storage: Arc<dyn Storage>,
    pub(crate) notifier: Arc<dyn Notifier>,
}

impl ApprovalService {
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>) -> Self {
        Self { storage, notifier }
    }

    /// 审批一个待审申请
    pub async fn decide(
        &self,
        reviewer_id: i64,
        reviewer_role: ActorRole,
        request_id: i64,
        req: DecideRequest,
    ) -> Result<DecisionResponse> {
        decide::decide(self, reviewer_id, reviewer_role, request_id, req).await
    }

    /// 按审批角色列出待审申请
    pub async fn list_pending_resolutions(
        &self,
        role: ActorRole,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Result<ResolutionListResponse> {
        list::list_pending_resolutions(self, role, page, size).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::ApprovalService;
    use crate::directory::LogNotifier;
    use crate::models::grades::entities::GradeStatus;
    use crate::models::resolutions::entities::ApprovalStatus;
    use crate::models::resolutions::requests::{DecideRequest, Decision, NewResolutionRequest};
    use crate::models::staff::entities::ActorRole;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;

    fn decide_req(decision: Decision, notes: Option<&str>) -> DecideRequest {
        DecideRequest {
            decision,
            notes: notes.map(str::to_string),
        }
    }

    /// 铺设一条 INC 记录和挂在它上面的待审申请
    async fn seed_pending(
        storage: &Arc<MemoryStorage>,
        start: ApprovalStatus,
    ) -> (i64, i64) {
        let mut record = storage.seed_enrolled(10, 20);
        record.status = GradeStatus::Inc;
        record.inc_deadline = Some(chrono::Utc::now() + chrono::Duration::days(30));
        storage.seed_record(record.clone());

        let request = storage
            .create_resolution_request(NewResolutionRequest {
                grade_record_id: record.id,
                requested_by: 1,
                proposed_grade: Some(2.00),
                proposed_status: GradeStatus::Passed,
                reason: Some("补交期末试卷".to_string()),
                approval_status: start,
            })
            .await
            .unwrap();

        (record.id, request.id)
    }

    #[tokio::test]
    async fn test_head_reject_requires_notes() {
        let storage = Arc::new(MemoryStorage::new());
        let (_, request_id) = seed_pending(&storage, ApprovalStatus::PendingHead).await;
        let svc = ApprovalService::new(storage, Arc::new(LogNotifier));

        let err = svc
            .decide(
                5,
                ActorRole::DepartmentHead,
                request_id,
                decide_req(Decision::Reject, None),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E001");
    }

    #[tokio::test]
    async fn test_head_reject_leaves_record_unchanged() {
        let storage = Arc::new(MemoryStorage::new());
        let (record_id, request_id) = seed_pending(&storage, ApprovalStatus::PendingHead).await;
        let svc = ApprovalService::new(storage.clone(), Arc::new(LogNotifier));

        let resp = svc
            .decide(
                5,
                ActorRole::DepartmentHead,
                request_id,
                decide_req(Decision::Reject, Some("missing requirements")),
            )
            .await
            .unwrap();

        assert_eq!(resp.request.approval_status, ApprovalStatus::Rejected);
        assert_eq!(
            resp.request.head_notes.as_deref(),
            Some("missing requirements")
        );
        assert!(resp.record.is_none());

        let record = storage
            .get_grade_record_by_id(record_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, GradeStatus::Inc);
        assert!(record.grade.is_none());
    }

    #[tokio::test]
    async fn test_full_chain_applies_grade() {
        let storage = Arc::new(MemoryStorage::new());
        let (record_id, request_id) = seed_pending(&storage, ApprovalStatus::PendingHead).await;
        let svc = ApprovalService::new(storage.clone(), Arc::new(LogNotifier));

        // 系主任通过：进入教务处环节，记录不变
        let resp = svc
            .decide(
                5,
                ActorRole::DepartmentHead,
                request_id,
                decide_req(Decision::Approve, Some("情况属实")),
            )
            .await
            .unwrap();
        assert_eq!(
            resp.request.approval_status,
            ApprovalStatus::PendingRegistrar
        );
        assert!(resp.record.is_none());

        // 教务处通过：申请结案且成绩记录同步更新
        let resp = svc
            .decide(
                9,
                ActorRole::Registrar,
                request_id,
                decide_req(Decision::Approve, None),
            )
            .await
            .unwrap();
        assert_eq!(resp.request.approval_status, ApprovalStatus::Approved);
        assert!(resp.request.resolved_at.is_some());

        let record = resp.record.unwrap();
        assert_eq!(record.id, record_id);
        assert_eq!(record.status, GradeStatus::Passed);
        assert_eq!(record.grade, Some(2.00));
        assert!(record.inc_deadline.is_none());
        assert!(record.finalized_at.is_some());
        assert!(record.fields_consistent());
    }

    #[tokio::test]
    async fn test_role_gate_per_step() {
        let storage = Arc::new(MemoryStorage::new());
        let (_, request_id) = seed_pending(&storage, ApprovalStatus::PendingHead).await;
        let svc = ApprovalService::new(storage, Arc::new(LogNotifier));

        // 教务处不能代审系主任环节
        let err = svc
            .decide(
                9,
                ActorRole::Registrar,
                request_id,
                decide_req(Decision::Approve, None),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");
    }

    #[tokio::test]
    async fn test_decide_on_terminal_request_fails() {
        let storage = Arc::new(MemoryStorage::new());
        let (_, request_id) = seed_pending(&storage, ApprovalStatus::PendingRegistrar).await;
        let svc = ApprovalService::new(storage.clone(), Arc::new(LogNotifier));

        // 申请人先撤回
        storage.revoke_request(request_id, chrono::Utc::now()).await.unwrap();

        let err = svc
            .decide(
                9,
                ActorRole::Registrar,
                request_id,
                decide_req(Decision::Approve, None),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E004");
    }

    #[tokio::test]
    async fn test_admin_sees_both_queues() {
        let storage = Arc::new(MemoryStorage::new());
        seed_pending(&storage, ApprovalStatus::PendingHead).await;

        // 第二条记录挂一个教务处环节的申请
        let mut record = storage.seed_enrolled(11, 20);
        record.id = 100;
        record.status = GradeStatus::Inc;
        record.inc_deadline = Some(chrono::Utc::now() + chrono::Duration::days(30));
        storage.seed_record(record.clone());
        storage
            .create_resolution_request(NewResolutionRequest {
                grade_record_id: record.id,
                requested_by: 1,
                proposed_grade: None,
                proposed_status: GradeStatus::Dropped,
                reason: None,
                approval_status: ApprovalStatus::PendingRegistrar,
            })
            .await
            .unwrap();

        let svc = ApprovalService::new(storage, Arc::new(LogNotifier));

        let head_view = svc
            .list_pending_resolutions(ActorRole::DepartmentHead, None, None)
            .await
            .unwrap();
        assert_eq!(head_view.items.len(), 1);

        let registrar_view = svc
            .list_pending_resolutions(ActorRole::Registrar, None, None)
            .await
            .unwrap();
        assert_eq!(registrar_view.items.len(), 1);

        let admin_view = svc
            .list_pending_resolutions(ActorRole::Admin, None, None)
            .await
            .unwrap();
        assert_eq!(admin_view.items.len(), 2);
        assert_eq!(admin_view.pagination.total, 2);

        // 任课教师没有审批队列
        let err = svc
            .list_pending_resolutions(ActorRole::Professor, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E006");
    }
}
