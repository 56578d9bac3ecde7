use chrono::Utc;
use tracing::info;

use super::GradeEntryService;
use crate::errors::{GradeflowError, Result};
use crate::models::resolutions::entities::ResolutionRequest;

/// 撤回处理申请
///
/// 仅原申请人可撤回，且申请必须仍在待审状态。撤回只结案申请，
/// 成绩记录保持不变。
pub async fn revoke_resolution_request(
    service: &GradeEntryService,
    professor_id: i64,
    request_id: i64,
) -> Result<ResolutionRequest> {
    let request = service
        .storage
        .get_resolution_request_by_id(request_id)
        .await?
        .ok_or_else(|| GradeflowError::not_found(format!("处理申请 {request_id} 不存在")))?;

    if request.requested_by != professor_id {
        return Err(GradeflowError::authorization(
            "只有原申请人可以撤回处理申请",
        ));
    }

    if request.approval_status.is_terminal() {
        return Err(GradeflowError::invalid_state(format!(
            "申请 {request_id} 已结案（{}），不能撤回",
            request.approval_status
        )));
    }

    let revoked = service.storage.revoke_request(request_id, Utc::now()).await?;

    info!(
        request_id = revoked.id,
        professor_id,
        "resolution request revoked by requester"
    );

    Ok(revoked)
}
