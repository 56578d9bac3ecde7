//! 成绩处理申请存储操作
//!
//! 审批链的每一步都是带前置状态条件的更新：并发的重复决定
//! 只有一个能生效，落败方收到 InvalidState。

use super::SeaOrmStorage;
use crate::entity::grade_records::{
    Column as GradeRecordColumn, Entity as GradeRecords,
};
use crate::entity::resolution_requests::{ActiveModel, Column, Entity as ResolutionRequests};
use crate::errors::{GradeflowError, Result};
use crate::models::{
    PaginationInfo,
    grades::entities::{GradeRecord, GradeStatus},
    resolutions::{
        entities::{ApprovalStatus, ResolutionRequest},
        requests::{NewResolutionRequest, ResolutionListQuery},
        responses::{PendingResolution, ResolutionListResponse},
    },
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::warn;

impl SeaOrmStorage {
    /// 创建处理申请
    ///
    /// 事务内查重 + 插入；(grade_record_id, open) 唯一索引兜底，
    /// 并发创建只有一个能成功。
    pub async fn create_resolution_request_impl(
        &self,
        req: NewResolutionRequest,
    ) -> Result<ResolutionRequest> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradeflowError::database_operation(format!("开启事务失败: {e}")))?;

        let existing = ResolutionRequests::find()
            .filter(Column::GradeRecordId.eq(req.grade_record_id))
            .filter(Column::Open.is_not_null())
            .one(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询未结案申请失败: {e}")))?;

        if existing.is_some() {
            return Err(GradeflowError::conflict(format!(
                "成绩记录 {} 已存在未结案的处理申请",
                req.grade_record_id
            )));
        }

        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            grade_record_id: Set(req.grade_record_id),
            requested_by: Set(req.requested_by),
            proposed_grade: Set(req.proposed_grade),
            proposed_status: Set(req.proposed_status.to_string()),
            reason: Set(req.reason),
            approval_status: Set(req.approval_status.to_string()),
            open: Set(Some(1)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = match model.insert(&txn).await {
            Ok(m) => m,
            Err(e) => {
                return Err(match e.sql_err() {
                    Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                        GradeflowError::conflict(format!(
                            "成绩记录 {} 已存在未结案的处理申请",
                            req.grade_record_id
                        ))
                    }
                    _ => GradeflowError::database_operation(format!("创建处理申请失败: {e}")),
                });
            }
        };

        txn.commit()
            .await
            .map_err(|e| GradeflowError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(inserted.into_resolution_request())
    }

    /// 通过 ID 获取申请
    pub async fn get_resolution_request_by_id_impl(
        &self,
        id: i64,
    ) -> Result<Option<ResolutionRequest>> {
        let result = ResolutionRequests::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询处理申请失败: {e}")))?;

        Ok(result.map(|m| m.into_resolution_request()))
    }

    /// 获取记录当前未结案的申请
    pub async fn get_open_request_for_record_impl(
        &self,
        record_id: i64,
    ) -> Result<Option<ResolutionRequest>> {
        let result = ResolutionRequests::find()
            .filter(Column::GradeRecordId.eq(record_id))
            .filter(Column::Open.is_not_null())
            .one(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询未结案申请失败: {e}")))?;

        Ok(result.map(|m| m.into_resolution_request()))
    }

    /// 系主任通过，推进到教务处环节
    pub async fn advance_request_to_registrar_impl(
        &self,
        request_id: i64,
        head_notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ResolutionRequest> {
        let result = ResolutionRequests::update_many()
            .col_expr(
                Column::ApprovalStatus,
                Expr::value(ApprovalStatus::PendingRegistrar.to_string()),
            )
            .col_expr(Column::HeadNotes, Expr::value(head_notes))
            .col_expr(Column::UpdatedAt, Expr::value(now.timestamp()))
            .filter(Column::Id.eq(request_id))
            .filter(Column::ApprovalStatus.eq(ApprovalStatus::PENDING_HEAD))
            .exec(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("推进审批环节失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(GradeflowError::invalid_state(format!(
                "申请 {request_id} 不在待系主任审批状态"
            )));
        }

        self.require_request(request_id).await
    }

    /// 驳回申请（系主任或教务处环节）
    pub async fn reject_request_impl(
        &self,
        request_id: i64,
        expected_step: ApprovalStatus,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<ResolutionRequest> {
        let notes_column = match expected_step {
            ApprovalStatus::PendingHead => Column::HeadNotes,
            ApprovalStatus::PendingRegistrar => Column::RegistrarNotes,
            _ => {
                return Err(GradeflowError::invalid_state(format!(
                    "'{expected_step}' 不是可驳回的审批环节"
                )));
            }
        };

        let result = ResolutionRequests::update_many()
            .col_expr(
                Column::ApprovalStatus,
                Expr::value(ApprovalStatus::Rejected.to_string()),
            )
            .col_expr(notes_column, Expr::value(Some(notes)))
            .col_expr(Column::Open, Expr::value(None::<i32>))
            .col_expr(Column::ResolvedAt, Expr::value(Some(now.timestamp())))
            .col_expr(Column::UpdatedAt, Expr::value(now.timestamp()))
            .filter(Column::Id.eq(request_id))
            .filter(Column::ApprovalStatus.eq(expected_step.to_string()))
            .exec(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("驳回申请失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(GradeflowError::invalid_state(format!(
                "申请 {request_id} 不在 '{expected_step}' 环节"
            )));
        }

        self.require_request(request_id).await
    }

    /// 申请人撤回
    pub async fn revoke_request_impl(
        &self,
        request_id: i64,
        now: DateTime<Utc>,
    ) -> Result<ResolutionRequest> {
        let result = ResolutionRequests::update_many()
            .col_expr(
                Column::ApprovalStatus,
                Expr::value(ApprovalStatus::Revoked.to_string()),
            )
            .col_expr(Column::Open, Expr::value(None::<i32>))
            .col_expr(Column::ResolvedAt, Expr::value(Some(now.timestamp())))
            .col_expr(Column::UpdatedAt, Expr::value(now.timestamp()))
            .filter(Column::Id.eq(request_id))
            .filter(Column::ApprovalStatus.is_in([
                ApprovalStatus::PENDING_HEAD,
                ApprovalStatus::PENDING_REGISTRAR,
            ]))
            .exec(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("撤回申请失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(GradeflowError::invalid_state(format!(
                "申请 {request_id} 已结案，不能撤回"
            )));
        }

        self.require_request(request_id).await
    }

    /// 教务处最终批准
    ///
    /// 申请转为 Approved 与成绩记录更新在同一事务内完成，
    /// 不存在申请已批准而记录未更新的可见窗口。
    pub async fn apply_resolution_approval_impl(
        &self,
        request_id: i64,
        registrar_notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(ResolutionRequest, GradeRecord)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradeflowError::database_operation(format!("开启事务失败: {e}")))?;

        let request = ResolutionRequests::find_by_id(request_id)
            .one(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询处理申请失败: {e}")))?
            .ok_or_else(|| GradeflowError::not_found(format!("处理申请 {request_id} 不存在")))?;

        let result = ResolutionRequests::update_many()
            .col_expr(
                Column::ApprovalStatus,
                Expr::value(ApprovalStatus::Approved.to_string()),
            )
            .col_expr(Column::RegistrarNotes, Expr::value(registrar_notes))
            .col_expr(Column::Open, Expr::value(None::<i32>))
            .col_expr(Column::ResolvedAt, Expr::value(Some(now.timestamp())))
            .col_expr(Column::UpdatedAt, Expr::value(now.timestamp()))
            .filter(Column::Id.eq(request_id))
            .filter(Column::ApprovalStatus.eq(ApprovalStatus::PENDING_REGISTRAR))
            .exec(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("批准申请失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(GradeflowError::invalid_state(format!(
                "申请 {request_id} 不在待教务处审批状态"
            )));
        }

        // 申请携带的目标成绩同步落到成绩记录：清除 INC 期限并定稿
        let proposed_status = request
            .proposed_status
            .parse::<GradeStatus>()
            .unwrap_or(GradeStatus::Failed);

        let record_update = GradeRecords::update_many()
            .col_expr(
                GradeRecordColumn::Grade,
                Expr::value(request.proposed_grade),
            )
            .col_expr(
                GradeRecordColumn::Status,
                Expr::value(proposed_status.to_string()),
            )
            .col_expr(GradeRecordColumn::IncDeadline, Expr::value(None::<i64>))
            .col_expr(
                GradeRecordColumn::FinalizedAt,
                Expr::value(Some(now.timestamp())),
            )
            .col_expr(GradeRecordColumn::UpdatedAt, Expr::value(now.timestamp()))
            .filter(GradeRecordColumn::Id.eq(request.grade_record_id))
            .exec(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("更新成绩记录失败: {e}")))?;

        if record_update.rows_affected == 0 {
            return Err(GradeflowError::not_found(format!(
                "成绩记录 {} 不存在",
                request.grade_record_id
            )));
        }

        let updated_request = ResolutionRequests::find_by_id(request_id)
            .one(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询处理申请失败: {e}")))?
            .ok_or_else(|| GradeflowError::not_found(format!("处理申请 {request_id} 不存在")))?;

        let updated_record = GradeRecords::find_by_id(request.grade_record_id)
            .one(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询成绩记录失败: {e}")))?
            .ok_or_else(|| {
                GradeflowError::not_found(format!("成绩记录 {} 不存在", request.grade_record_id))
            })?;

        txn.commit()
            .await
            .map_err(|e| GradeflowError::database_operation(format!("提交事务失败: {e}")))?;

        Ok((
            updated_request.into_resolution_request(),
            updated_record.into_grade_record(),
        ))
    }

    /// 列出待审申请（分页）
    pub async fn list_pending_resolutions_with_pagination_impl(
        &self,
        query: ResolutionListQuery,
    ) -> Result<ResolutionListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(20).clamp(1, 100) as u64;

        let statuses: Vec<String> = query.statuses.iter().map(ToString::to_string).collect();

        // 审批队列按提交先后排列，最早的申请先处理
        let select = ResolutionRequests::find()
            .filter(Column::ApprovalStatus.is_in(statuses))
            .order_by_asc(Column::CreatedAt)
            .find_also_related(GradeRecords);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询申请总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询申请页数失败: {e}")))?;

        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询申请列表失败: {e}")))?;

        let items = rows
            .into_iter()
            .filter_map(|(request, record)| match record {
                Some(record) => Some(PendingResolution {
                    request: request.into_resolution_request(),
                    record: record.into_grade_record(),
                }),
                None => {
                    // 外键保证记录存在，缺失说明数据异常
                    warn!("处理申请 {} 缺少对应的成绩记录", request.id);
                    None
                }
            })
            .collect();

        Ok(ResolutionListResponse {
            items,
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 重新读取申请（更新后取回最新状态）
    async fn require_request(&self, request_id: i64) -> Result<ResolutionRequest> {
        self.get_resolution_request_by_id_impl(request_id)
            .await?
            .ok_or_else(|| GradeflowError::not_found(format!("处理申请 {request_id} 不存在")))
    }
}
