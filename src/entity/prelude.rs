//! 预导入模块，方便使用

pub use super::grade_records::{
    ActiveModel as GradeRecordActiveModel, Entity as GradeRecords, Model as GradeRecordModel,
};
pub use super::resolution_requests::{
    ActiveModel as ResolutionRequestActiveModel, Entity as ResolutionRequests,
    Model as ResolutionRequestModel,
};
