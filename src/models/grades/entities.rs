use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 成绩记录状态
//
// `ForResolution` 仅用于展示：数据库中存储的仍是 `Inc`，
// 当该记录存在未结案的处理申请时对外显示为 `ForResolution`。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum GradeStatus {
    Enrolled,      // 已选课，尚未录入成绩
    Passed,        // 通过
    Failed,        // 不及格
    Inc,           // 缓考（Incomplete），带处理期限
    Dropped,       // 退选
    ForResolution, // 展示态：INC 且有待审申请
}

impl GradeStatus {
    pub const ENROLLED: &'static str = "enrolled";
    pub const PASSED: &'static str = "passed";
    pub const FAILED: &'static str = "failed";
    pub const INC: &'static str = "inc";
    pub const DROPPED: &'static str = "dropped";
    pub const FOR_RESOLUTION: &'static str = "for_resolution";

    /// 该状态下成绩值必须存在且在量表内
    pub fn requires_grade(&self) -> bool {
        matches!(self, GradeStatus::Passed | GradeStatus::Failed)
    }

    /// 该状态下成绩值必须为空
    pub fn forbids_grade(&self) -> bool {
        matches!(self, GradeStatus::Dropped)
    }

    /// 是否为可长期停留的已结算状态（区别于 Enrolled / ForResolution 过渡态）
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            GradeStatus::Passed | GradeStatus::Failed | GradeStatus::Inc | GradeStatus::Dropped
        )
    }
}

impl<'de> Deserialize<'de> for GradeStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            GradeStatus::ENROLLED => Ok(GradeStatus::Enrolled),
            GradeStatus::PASSED => Ok(GradeStatus::Passed),
            GradeStatus::FAILED => Ok(GradeStatus::Failed),
            GradeStatus::INC => Ok(GradeStatus::Inc),
            GradeStatus::DROPPED => Ok(GradeStatus::Dropped),
            GradeStatus::FOR_RESOLUTION => Ok(GradeStatus::ForResolution),
            _ => Err(serde::de::Error::custom(format!(
                "无效的成绩状态: '{s}'. 支持的状态: enrolled, passed, failed, inc, dropped, for_resolution"
            ))),
        }
    }
}

impl std::fmt::Display for GradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradeStatus::Enrolled => write!(f, "{}", GradeStatus::ENROLLED),
            GradeStatus::Passed => write!(f, "{}", GradeStatus::PASSED),
            GradeStatus::Failed => write!(f, "{}", GradeStatus::FAILED),
            GradeStatus::Inc => write!(f, "{}", GradeStatus::INC),
            GradeStatus::Dropped => write!(f, "{}", GradeStatus::DROPPED),
            GradeStatus::ForResolution => write!(f, "{}", GradeStatus::FOR_RESOLUTION),
        }
    }
}

impl std::str::FromStr for GradeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enrolled" => Ok(GradeStatus::Enrolled),
            "passed" => Ok(GradeStatus::Passed),
            "failed" => Ok(GradeStatus::Failed),
            "inc" => Ok(GradeStatus::Inc),
            "dropped" => Ok(GradeStatus::Dropped),
            "for_resolution" => Ok(GradeStatus::ForResolution),
            _ => Err(format!("Invalid grade status: {s}")),
        }
    }
}

// 成绩记录实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeRecord {
    pub id: i64,
    pub student_id: i64,
    pub subject_offering_id: i64,
    pub grade: Option<f64>,
    pub status: GradeStatus,
    pub remarks: Option<String>,
    pub finalized_at: Option<chrono::DateTime<chrono::Utc>>,
    pub inc_deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub retake_eligible_after: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl GradeRecord {
    /// 对外展示状态：INC 且有未结案申请时显示为 ForResolution
    pub fn display_status(&self, has_open_request: bool) -> GradeStatus {
        if self.status == GradeStatus::Inc && has_open_request {
            GradeStatus::ForResolution
        } else {
            self.status
        }
    }

    /// 记录是否处于补修锁定期（锁定期内不接受普通重新录入）
    pub fn is_retake_locked(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        matches!(self.retake_eligible_after, Some(t) if t > now)
    }

    /// 状态与字段的一致性约束
    ///
    /// - Passed/Failed：成绩必须存在
    /// - Dropped：成绩必须为空
    /// - Inc：必须带处理期限
    pub fn fields_consistent(&self) -> bool {
        match self.status {
            GradeStatus::Passed | GradeStatus::Failed => self.grade.is_some(),
            GradeStatus::Dropped => self.grade.is_none(),
            GradeStatus::Inc => self.inc_deadline.is_some(),
            GradeStatus::Enrolled | GradeStatus::ForResolution => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(status: GradeStatus) -> GradeRecord {
        GradeRecord {
            id: 1,
            student_id: 10,
            subject_offering_id: 20,
            grade: None,
            status,
            remarks: None,
            finalized_at: None,
            inc_deadline: None,
            retake_eligible_after: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_status_alias() {
        let rec = record(GradeStatus::Inc);
        assert_eq!(rec.display_status(true), GradeStatus::ForResolution);
        assert_eq!(rec.display_status(false), GradeStatus::Inc);

        // 仅 INC 记录会显示 ForResolution
        let rec = record(GradeStatus::Passed);
        assert_eq!(rec.display_status(true), GradeStatus::Passed);
    }

    #[test]
    fn test_retake_lock_window() {
        let mut rec = record(GradeStatus::Failed);
        let now = Utc::now();
        assert!(!rec.is_retake_locked(now));

        rec.retake_eligible_after = Some(now + Duration::days(30));
        assert!(rec.is_retake_locked(now));

        rec.retake_eligible_after = Some(now - Duration::days(1));
        assert!(!rec.is_retake_locked(now));
    }

    #[test]
    fn test_fields_consistent() {
        let mut rec = record(GradeStatus::Passed);
        assert!(!rec.fields_consistent());
        rec.grade = Some(1.50);
        assert!(rec.fields_consistent());

        let mut rec = record(GradeStatus::Dropped);
        assert!(rec.fields_consistent());
        rec.grade = Some(3.00);
        assert!(!rec.fields_consistent());

        let mut rec = record(GradeStatus::Inc);
        assert!(!rec.fields_consistent());
        rec.inc_deadline = Some(Utc::now());
        assert!(rec.fields_consistent());
    }

    #[test]
    fn test_status_round_trip() {
        for s in [
            GradeStatus::Enrolled,
            GradeStatus::Passed,
            GradeStatus::Failed,
            GradeStatus::Inc,
            GradeStatus::Dropped,
            GradeStatus::ForResolution,
        ] {
            let parsed: GradeStatus = s.to_string().parse().unwrap();
            assert_eq!(parsed, s);
        }
    }
}
