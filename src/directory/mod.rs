//! 外部协作方接口
//!
//! 选课、排课、师资分配与通知都由外围系统负责，本核心只通过
//! 这里的 trait 消费它们。成绩记录的创建（选课时落一条 Enrolled
//! 记录）同样发生在外围系统。

use async_trait::async_trait;
use serde::Serialize;
use ts_rs::TS;

use crate::errors::Result;
use crate::models::grades::entities::{GradeRecord, GradeStatus};

/// 开课班成绩政策上下文
///
/// 由排课系统提供：录入窗口是否开放，以及该科目是否要求
/// 系主任签核（免签核的申请直接从教务处环节开始）。
#[derive(Debug, Clone, Copy)]
pub struct GradingContext {
    pub window_open: bool,
    pub requires_head_signoff: bool,
}

/// 师资分配查询：确认教师是否被分配到某开课班
#[async_trait]
pub trait RosterDirectory: Send + Sync {
    async fn is_assigned_professor(&self, professor_id: i64, subject_offering_id: i64)
    -> Result<bool>;
}

/// 开课班信息查询
#[async_trait]
pub trait OfferingDirectory: Send + Sync {
    async fn grading_context(&self, subject_offering_id: i64) -> Result<GradingContext>;
}

// 成绩变动通知事件
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct GradeChangeEvent {
    pub grade_record_id: i64,
    pub student_id: i64,
    pub subject_offering_id: i64,
    pub status: GradeStatus,
    pub grade: Option<f64>,
}

impl GradeChangeEvent {
    pub fn from_record(record: &GradeRecord) -> Self {
        Self {
            grade_record_id: record.id,
            student_id: record.student_id,
            subject_offering_id: record.subject_offering_id,
            status: record.status,
            grade: record.grade,
        }
    }
}

/// 通知发送（fire-and-forget，失败不影响主流程）
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn grade_changed(&self, event: GradeChangeEvent);
}

/// 基于 tracing 的通知实现
///
/// 外围系统未接入消息通道时的默认实现，只输出结构化日志。
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn grade_changed(&self, event: GradeChangeEvent) {
        tracing::info!(
            grade_record_id = event.grade_record_id,
            student_id = event.student_id,
            subject_offering_id = event.subject_offering_id,
            status = %event.status,
            grade = ?event.grade,
            "grade changed"
        );
    }
}
