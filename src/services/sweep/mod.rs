pub mod run;

use std::sync::Arc;

use crate::config::GradingConfig;
use crate::directory::Notifier;
use crate::errors::Result;
use crate::models::grades::responses::SweepReport;
use crate::storage::Storage;

/// 过期清理服务
///
/// 扫描处理期限已过且无未结案申请的 INC 记录，逐条强制转为
/// 不及格。绕过审批链：这是系统发起的转换，不是人工更正。
pub struct SweepService {
    pub(crate) storage: Arc<dyn Storage>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) policy: GradingConfig,
}

impl SweepService {
    pub fn new(
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
        policy: GradingConfig,
    ) -> Self {
        Self {
            storage,
            notifier,
            policy,
        }
    }

    /// 执行一轮过期清理
    pub async fn sweep_expired_incompletes(&self, dry_run: bool) -> Result<SweepReport> {
        run::sweep_expired_incompletes(self, dry_run).await
    }
}
