use std::sync::Arc;

use tracing::warn;

use crate::config::AppConfig;
use crate::directory::{LogNotifier, Notifier};
use crate::services::{ApprovalService, GradeEntryService, SweepService};
use crate::storage::Storage;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub sweep: Arc<SweepService>,
}

/// 准备运行时启动的上下文
/// 包括存储连接、迁移与清理服务的装配
pub async fn prepare_startup() -> StartupContext {
    let config = AppConfig::get();

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    let sweep = Arc::new(SweepService::new(
        storage.clone(),
        notifier,
        config.grading.clone(),
    ));

    StartupContext { storage, sweep }
}

/// 装配审批服务（供嵌入方使用）
pub fn build_approval_service(storage: Arc<dyn Storage>) -> ApprovalService {
    ApprovalService::new(storage, Arc::new(LogNotifier))
}

/// 装配成绩录入服务（供嵌入方注入外部协作方实现）
pub fn build_grade_entry_service(
    storage: Arc<dyn Storage>,
    roster: Arc<dyn crate::directory::RosterDirectory>,
    offerings: Arc<dyn crate::directory::OfferingDirectory>,
) -> GradeEntryService {
    let config = AppConfig::get();
    GradeEntryService::new(
        storage,
        roster,
        offerings,
        Arc::new(LogNotifier),
        config.grading.clone(),
    )
}
