use chrono::Utc;
use tracing::{info, warn};

use super::SweepService;
use crate::directory::GradeChangeEvent;
use crate::errors::Result;
use crate::models::grades::responses::{SweepCandidate, SweepFailure, SweepReport};

/// 执行一轮过期清理
///
/// dry-run 只读出候选集；commit 模式逐条独立转换，单条失败
/// 记入报告，不影响其余记录。
pub async fn sweep_expired_incompletes(
    service: &SweepService,
    dry_run: bool,
) -> Result<SweepReport> {
    let now = Utc::now();

    let records = service.storage.list_expired_inc_records(now).await?;

    let candidates: Vec<SweepCandidate> = records
        .iter()
        .map(|record| {
            let deadline = record.inc_deadline.unwrap_or(now);
            SweepCandidate {
                grade_record_id: record.id,
                student_id: record.student_id,
                subject_offering_id: record.subject_offering_id,
                inc_deadline: deadline,
                days_overdue: (now - deadline).num_days(),
            }
        })
        .collect();

    let examined = candidates.len();

    if dry_run {
        info!(examined, "expiration sweep dry run");
        return Ok(SweepReport {
            dry_run: true,
            examined,
            converted: 0,
            candidates,
            failures: Vec::new(),
        });
    }

    let mut converted = 0usize;
    let mut failures = Vec::new();

    for record in &records {
        match service
            .storage
            .expire_inc_record(record.id, service.policy.fail_grade, now)
            .await
        {
            Ok(updated) => {
                converted += 1;
                service
                    .notifier
                    .grade_changed(GradeChangeEvent::from_record(&updated))
                    .await;
            }
            Err(e) => {
                // 单条失败不中断整批，逐条记入报告
                warn!(
                    grade_record_id = record.id,
                    error = %e,
                    "failed to expire overdue incomplete"
                );
                failures.push(SweepFailure {
                    grade_record_id: record.id,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        examined,
        converted,
        failed = failures.len(),
        "expiration sweep completed"
    );

    Ok(SweepReport {
        dry_run: false,
        examined,
        converted,
        candidates,
        failures,
    })
}
