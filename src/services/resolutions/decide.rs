use chrono::Utc;
use tracing::info;

use super::ApprovalService;
use crate::directory::GradeChangeEvent;
use crate::errors::{GradeflowError, Result};
use crate::models::resolutions::{
    entities::ApprovalStatus,
    requests::{DecideRequest, Decision},
    responses::DecisionResponse,
};
use crate::models::staff::entities::ActorRole;
use crate::utils::validate;

/// 审批一个处理申请
///
/// 驳回在任意环节立即结案且必须附理由；系主任通过推进到教务处
/// 环节；教务处通过时申请结案并在同一事务内更新成绩记录。
pub async fn decide(
    service: &ApprovalService,
    reviewer_id: i64,
    reviewer_role: ActorRole,
    request_id: i64,
    req: DecideRequest,
) -> Result<DecisionResponse> {
    let request = service
        .storage
        .get_resolution_request_by_id(request_id)
        .await?
        .ok_or_else(|| GradeflowError::not_found(format!("处理申请 {request_id} 不存在")))?;

    if request.approval_status.is_terminal() {
        return Err(GradeflowError::invalid_state(format!(
            "申请 {request_id} 已结案（{}），不能再次审批",
            request.approval_status
        )));
    }

    if !request.approval_status.reviewer_allowed(reviewer_role) {
        return Err(GradeflowError::authorization(format!(
            "角色 '{reviewer_role}' 不能审批 '{}' 环节",
            request.approval_status
        )));
    }

    let now = Utc::now();

    match req.decision {
        Decision::Reject => {
            // 驳回必须说明理由
            let notes = req.notes.unwrap_or_default();
            validate::validate_rejection_notes(&notes).map_err(GradeflowError::validation)?;

            let rejected = service
                .storage
                .reject_request(request_id, request.approval_status, notes, now)
                .await?;

            info!(
                request_id,
                reviewer_id,
                step = %request.approval_status,
                "resolution request rejected"
            );

            Ok(DecisionResponse {
                request: rejected,
                record: None,
            })
        }
        Decision::Approve => {
            validate::validate_review_notes(req.notes.as_deref())
                .map_err(GradeflowError::validation)?;

            match request.approval_status {
                ApprovalStatus::PendingHead => {
                    let advanced = service
                        .storage
                        .advance_request_to_registrar(request_id, req.notes, now)
                        .await?;

                    info!(
                        request_id,
                        reviewer_id, "resolution request advanced to registrar"
                    );

                    Ok(DecisionResponse {
                        request: advanced,
                        record: None,
                    })
                }
                ApprovalStatus::PendingRegistrar => {
                    let (approved, record) = service
                        .storage
                        .apply_resolution_approval(request_id, req.notes, now)
                        .await?;

                    info!(
                        request_id,
                        reviewer_id,
                        grade_record_id = record.id,
                        status = %record.status,
                        "resolution request approved, grade applied"
                    );

                    service
                        .notifier
                        .grade_changed(GradeChangeEvent::from_record(&record))
                        .await;

                    Ok(DecisionResponse {
                        request: approved,
                        record: Some(record),
                    })
                }
                // 终态在入口处已拦截
                _ => Err(GradeflowError::invalid_state(format!(
                    "申请 {request_id} 不在可审批环节"
                ))),
            }
        }
    }
}
