use super::ApprovalService;
use crate::errors::{GradeflowError, Result};
use crate::models::resolutions::{
    requests::ResolutionListQuery, responses::ResolutionListResponse,
};
use crate::models::staff::entities::ActorRole;

/// 按审批角色列出待审申请
///
/// 系主任只看系主任环节，教务处只看教务处环节，管理员两者都看。
pub async fn list_pending_resolutions(
    service: &ApprovalService,
    role: ActorRole,
    page: Option<i64>,
    size: Option<i64>,
) -> Result<ResolutionListResponse> {
    let query = ResolutionListQuery::for_role(role, page, size).ok_or_else(|| {
        GradeflowError::authorization(format!("角色 '{role}' 没有审批队列"))
    })?;

    service
        .storage
        .list_pending_resolutions_with_pagination(query)
        .await
}
