use chrono::{Duration, Utc};
use tracing::info;

use super::GradeEntryService;
use crate::directory::GradeChangeEvent;
use crate::errors::{GradeflowError, Result};
use crate::models::grades::{
    lifecycle::{self, GradeOutcome, SubmitPath},
    requests::{GradeWrite, SubmitGradeRequest},
    responses::SubmitGradeResponse,
};
use crate::models::resolutions::{entities::ApprovalStatus, requests::NewResolutionRequest};
use crate::utils::validate;

/// 提交或更正一名学生在某开课班上的成绩
///
/// 窗口内走直接写入；窗口外的 INC 补交与定稿后更正创建处理申请。
pub async fn submit_grade(
    service: &GradeEntryService,
    professor_id: i64,
    grade_record_id: i64,
    req: SubmitGradeRequest,
) -> Result<SubmitGradeResponse> {
    validate::validate_remarks(req.remarks.as_deref()).map_err(GradeflowError::validation)?;

    let record = service
        .storage
        .get_grade_record_by_id(grade_record_id)
        .await?
        .ok_or_else(|| {
            GradeflowError::not_found(format!("成绩记录 {grade_record_id} 不存在"))
        })?;

    // 任课资格校验
    if !service
        .roster
        .is_assigned_professor(professor_id, record.subject_offering_id)
        .await?
    {
        return Err(GradeflowError::authorization(format!(
            "教师 {professor_id} 未被分配到开课班 {}",
            record.subject_offering_id
        )));
    }

    let ctx = service
        .offerings
        .grading_context(record.subject_offering_id)
        .await?;
    let now = Utc::now();

    // 同一记录同时只允许一个未结案申请
    if let Some(open) = service.storage.get_open_request_for_record(record.id).await? {
        return Err(GradeflowError::conflict(format!(
            "成绩记录 {} 已有未结案的处理申请 {}",
            record.id, open.id
        )));
    }

    // 补修锁定期内不接受普通重新录入
    if record.is_retake_locked(now) {
        return Err(GradeflowError::locked(format!(
            "成绩记录 {} 处于补修锁定期，待学生重修后再处理",
            record.id
        )));
    }

    let outcome = lifecycle::derive_outcome(&service.policy, req.proposed_grade, req.proposed_status)?;

    match lifecycle::classify_submission(record.status, ctx.window_open)? {
        SubmitPath::Direct => {
            let write = GradeWrite {
                status: outcome.status(),
                grade: outcome.grade(),
                remarks: req.remarks,
                // INC 的处理期限为提交时刻加一个固定偏移；其余状态无期限
                inc_deadline: matches!(outcome, GradeOutcome::Inc)
                    .then(|| now + Duration::days(service.policy.inc_deadline_days)),
                // INC 不定稿，其余直接写入即定稿
                finalized_at: (!matches!(outcome, GradeOutcome::Inc)).then_some(now),
            };

            let updated = service
                .storage
                .apply_direct_grade(record.id, record.status, write)
                .await?;

            info!(
                grade_record_id = updated.id,
                professor_id,
                status = %updated.status,
                "grade recorded directly"
            );

            service
                .notifier
                .grade_changed(GradeChangeEvent::from_record(&updated))
                .await;

            Ok(SubmitGradeResponse {
                path: SubmitPath::Direct,
                display_status: updated.display_status(false),
                record: updated,
                resolution_request: None,
            })
        }
        SubmitPath::Resolution => {
            // 审批通过后记录必须落到已结算状态
            lifecycle::ensure_resolvable_outcome(&outcome)?;

            let request = service
                .storage
                .create_resolution_request(NewResolutionRequest {
                    grade_record_id: record.id,
                    requested_by: professor_id,
                    proposed_grade: outcome.grade(),
                    proposed_status: outcome.status(),
                    reason: req.remarks,
                    approval_status: ApprovalStatus::initial(ctx.requires_head_signoff),
                })
                .await?;

            info!(
                grade_record_id = record.id,
                request_id = request.id,
                professor_id,
                initial_step = %request.approval_status,
                "resolution request opened"
            );

            Ok(SubmitGradeResponse {
                path: SubmitPath::Resolution,
                display_status: record.display_status(true),
                record,
                resolution_request: Some(request),
            })
        }
    }
}
