pub mod revoke;
pub mod submit;

use std::sync::Arc;

use crate::config::GradingConfig;
use crate::directory::{Notifier, OfferingDirectory, RosterDirectory};
use crate::errors::Result;
use crate::models::grades::{requests::SubmitGradeRequest, responses::SubmitGradeResponse};
use crate::models::resolutions::entities::ResolutionRequest;
use crate::storage::Storage;

/// 教师成绩录入服务
///
/// 窗口内直接写入成绩；窗口外或定稿后的变更创建处理申请，
/// 交由审批链处理。
pub struct GradeEntryService {
    pub(crate) storage: Arc<dyn Storage>,
    pub(crate) roster: Arc<dyn RosterDirectory>,
    pub(crate) offerings: Arc<dyn OfferingDirectory>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) policy: GradingConfig,
}

impl GradeEntryService {
    pub fn new(
        storage: Arc<dyn Storage>,
        roster: Arc<dyn RosterDirectory>,
        offerings: Arc<dyn OfferingDirectory>,
        notifier: Arc<dyn Notifier>,
        policy: GradingConfig,
    ) -> Self {
        Self {
            storage,
            roster,
            offerings,
            notifier,
            policy,
        }
    }

    /// 提交或更正成绩
    pub async fn submit_grade(
        &self,
        professor_id: i64,
        grade_record_id: i64,
        req: SubmitGradeRequest,
    ) -> Result<SubmitGradeResponse> {
        submit::submit_grade(self, professor_id, grade_record_id, req).await
    }

    /// 撤回本人提交的处理申请
    pub async fn revoke_resolution_request(
        &self,
        professor_id: i64,
        request_id: i64,
    ) -> Result<ResolutionRequest> {
        revoke::revoke_resolution_request(self, professor_id, request_id).await
    }
}
