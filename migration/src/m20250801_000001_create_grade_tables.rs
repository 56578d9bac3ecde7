use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建成绩记录表
        manager
            .create_table(
                Table::create()
                    .table(GradeRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradeRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradeRecords::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeRecords::SubjectOfferingId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradeRecords::Grade).double().null())
                    .col(ColumnDef::new(GradeRecords::Status).string().not_null())
                    .col(ColumnDef::new(GradeRecords::Remarks).text().null())
                    .col(
                        ColumnDef::new(GradeRecords::FinalizedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradeRecords::IncDeadline)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradeRecords::RetakeEligibleAfter)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradeRecords::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeRecords::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建成绩处理申请表
        manager
            .create_table(
                Table::create()
                    .table(ResolutionRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResolutionRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ResolutionRequests::GradeRecordId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResolutionRequests::RequestedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResolutionRequests::ProposedGrade)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ResolutionRequests::ProposedStatus)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResolutionRequests::Reason).text().null())
                    .col(
                        ColumnDef::new(ResolutionRequests::ApprovalStatus)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResolutionRequests::HeadNotes).text().null())
                    .col(
                        ColumnDef::new(ResolutionRequests::RegistrarNotes)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(ResolutionRequests::Open).integer().null())
                    .col(
                        ColumnDef::new(ResolutionRequests::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResolutionRequests::ResolvedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ResolutionRequests::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ResolutionRequests::Table, ResolutionRequests::GradeRecordId)
                            .to(GradeRecords::Table, GradeRecords::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        // 成绩记录表索引：每个学生在每个开课班只有一条记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grade_records_student_offering")
                    .table(GradeRecords::Table)
                    .col(GradeRecords::StudentId)
                    .col(GradeRecords::SubjectOfferingId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 过期清理按 status + inc_deadline 扫描
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grade_records_status_deadline")
                    .table(GradeRecords::Table)
                    .col(GradeRecords::Status)
                    .col(GradeRecords::IncDeadline)
                    .to_owned(),
            )
            .await?;

        // 申请表索引：open 列在待审时为 1、终态后为 NULL，
        // 唯一索引保证每条成绩记录同时只有一个未结案申请
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_resolution_requests_record_open")
                    .table(ResolutionRequests::Table)
                    .col(ResolutionRequests::GradeRecordId)
                    .col(ResolutionRequests::Open)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_resolution_requests_approval_status")
                    .table(ResolutionRequests::Table)
                    .col(ResolutionRequests::ApprovalStatus)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResolutionRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GradeRecords::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum GradeRecords {
    #[sea_orm(iden = "grade_records")]
    Table,
    Id,
    StudentId,
    SubjectOfferingId,
    Grade,
    Status,
    Remarks,
    FinalizedAt,
    IncDeadline,
    RetakeEligibleAfter,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ResolutionRequests {
    #[sea_orm(iden = "resolution_requests")]
    Table,
    Id,
    GradeRecordId,
    RequestedBy,
    ProposedGrade,
    ProposedStatus,
    Reason,
    ApprovalStatus,
    HeadNotes,
    RegistrarNotes,
    Open,
    CreatedAt,
    ResolvedAt,
    UpdatedAt,
}
