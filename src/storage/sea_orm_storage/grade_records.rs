//! 成绩记录存储操作

use super::SeaOrmStorage;
use crate::entity::grade_records::{Column, Entity as GradeRecords};
use crate::entity::resolution_requests::{
    Column as ResolutionColumn, Entity as ResolutionRequests,
};
use crate::errors::{GradeflowError, Result};
use crate::models::grades::{
    entities::{GradeRecord, GradeStatus},
    requests::GradeWrite,
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, ExprTrait, Query};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};

impl SeaOrmStorage {
    /// 通过 ID 获取成绩记录
    pub async fn get_grade_record_by_id_impl(&self, id: i64) -> Result<Option<GradeRecord>> {
        let result = GradeRecords::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询成绩记录失败: {e}")))?;

        Ok(result.map(|m| m.into_grade_record()))
    }

    /// 直接写入成绩
    ///
    /// 更新以读取时的状态为前置条件，并发写入者落败时返回冲突，
    /// 由调用方刷新后重试。
    pub async fn apply_direct_grade_impl(
        &self,
        record_id: i64,
        expected_status: GradeStatus,
        write: GradeWrite,
    ) -> Result<GradeRecord> {
        let now = chrono::Utc::now().timestamp();

        let result = GradeRecords::update_many()
            .col_expr(Column::Grade, Expr::value(write.grade))
            .col_expr(Column::Status, Expr::value(write.status.to_string()))
            .col_expr(Column::Remarks, Expr::value(write.remarks.clone()))
            .col_expr(
                Column::IncDeadline,
                Expr::value(write.inc_deadline.map(|t| t.timestamp())),
            )
            .col_expr(
                Column::FinalizedAt,
                Expr::value(write.finalized_at.map(|t| t.timestamp())),
            )
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(record_id))
            .filter(Column::Status.eq(expected_status.to_string()))
            .exec(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("写入成绩失败: {e}")))?;

        if result.rows_affected == 0 {
            return match self.get_grade_record_by_id_impl(record_id).await? {
                Some(_) => Err(GradeflowError::conflict(
                    "成绩记录已被并发修改，请刷新后重试",
                )),
                None => Err(GradeflowError::not_found(format!(
                    "成绩记录 {record_id} 不存在"
                ))),
            };
        }

        self.get_grade_record_by_id_impl(record_id)
            .await?
            .ok_or_else(|| {
                GradeflowError::database_operation(format!("成绩记录 {record_id} 更新后读取失败"))
            })
    }

    /// 列出已过期且无未结案申请的 INC 记录
    ///
    /// 期限恰好等于当前时刻的记录也在候选集内。
    pub async fn list_expired_inc_records_impl(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<GradeRecord>> {
        let open_requests = Query::select()
            .column(ResolutionColumn::GradeRecordId)
            .from(ResolutionRequests)
            .and_where(Expr::col(ResolutionColumn::Open).is_not_null())
            .to_owned();

        let records = GradeRecords::find()
            .filter(Column::Status.eq(GradeStatus::INC))
            .filter(Column::IncDeadline.lte(now.timestamp()))
            .filter(Column::Id.not_in_subquery(open_requests))
            .order_by_asc(Column::IncDeadline)
            .all(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询过期 INC 记录失败: {e}")))?;

        Ok(records.into_iter().map(|m| m.into_grade_record()).collect())
    }

    /// 将一条过期 INC 记录强制转为不及格
    ///
    /// 单条记录独立事务：检查无未结案申请后做条件更新，
    /// 与教师的处理申请并发时以先提交者为准。
    pub async fn expire_inc_record_impl(
        &self,
        record_id: i64,
        fail_grade: f64,
        now: DateTime<Utc>,
    ) -> Result<GradeRecord> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradeflowError::database_operation(format!("开启事务失败: {e}")))?;

        let open = ResolutionRequests::find()
            .filter(ResolutionColumn::GradeRecordId.eq(record_id))
            .filter(ResolutionColumn::Open.is_not_null())
            .one(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询未结案申请失败: {e}")))?;

        if open.is_some() {
            return Err(GradeflowError::conflict(format!(
                "成绩记录 {record_id} 存在未结案的处理申请，跳过强制过期"
            )));
        }

        let result = GradeRecords::update_many()
            .col_expr(Column::Grade, Expr::value(Some(fail_grade)))
            .col_expr(
                Column::Status,
                Expr::value(GradeStatus::Failed.to_string()),
            )
            .col_expr(Column::IncDeadline, Expr::value(None::<i64>))
            .col_expr(Column::FinalizedAt, Expr::value(Some(now.timestamp())))
            .col_expr(Column::UpdatedAt, Expr::value(now.timestamp()))
            .filter(Column::Id.eq(record_id))
            .filter(Column::Status.eq(GradeStatus::INC))
            .filter(Column::IncDeadline.lte(now.timestamp()))
            .exec(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("强制过期写入失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(GradeflowError::invalid_state(format!(
                "成绩记录 {record_id} 状态已变化，不再满足过期条件"
            )));
        }

        let record = GradeRecords::find_by_id(record_id)
            .one(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询成绩记录失败: {e}")))?
            .ok_or_else(|| {
                GradeflowError::not_found(format!("成绩记录 {record_id} 不存在"))
            })?;

        txn.commit()
            .await
            .map_err(|e| GradeflowError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(record.into_grade_record())
    }
}
