use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 教务人员角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/staff.ts")]
pub enum ActorRole {
    Professor,      // 任课教师
    DepartmentHead, // 系主任
    Registrar,      // 教务处
    Admin,          // 管理员
}

impl ActorRole {
    pub const PROFESSOR: &'static str = "professor";
    pub const DEPARTMENT_HEAD: &'static str = "department_head";
    pub const REGISTRAR: &'static str = "registrar";
    pub const ADMIN: &'static str = "admin";

    /// 可审批系主任环节的角色
    pub fn head_review_roles() -> &'static [&'static ActorRole] {
        &[&Self::DepartmentHead, &Self::Admin]
    }
    /// 可审批教务处环节的角色
    pub fn registrar_review_roles() -> &'static [&'static ActorRole] {
        &[&Self::Registrar, &Self::Admin]
    }
    pub fn all_roles() -> &'static [&'static ActorRole] {
        &[
            &Self::Professor,
            &Self::DepartmentHead,
            &Self::Registrar,
            &Self::Admin,
        ]
    }

    pub fn can_review_head_step(&self) -> bool {
        Self::head_review_roles().contains(&self)
    }

    pub fn can_review_registrar_step(&self) -> bool {
        Self::registrar_review_roles().contains(&self)
    }
}

impl<'de> Deserialize<'de> for ActorRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            ActorRole::PROFESSOR => Ok(ActorRole::Professor),
            ActorRole::DEPARTMENT_HEAD => Ok(ActorRole::DepartmentHead),
            ActorRole::REGISTRAR => Ok(ActorRole::Registrar),
            ActorRole::ADMIN => Ok(ActorRole::Admin),
            _ => Err(serde::de::Error::custom(format!(
                "无效的教务角色: '{s}'. 支持的角色: professor, department_head, registrar, admin"
            ))),
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorRole::Professor => write!(f, "{}", ActorRole::PROFESSOR),
            ActorRole::DepartmentHead => write!(f, "{}", ActorRole::DEPARTMENT_HEAD),
            ActorRole::Registrar => write!(f, "{}", ActorRole::REGISTRAR),
            ActorRole::Admin => write!(f, "{}", ActorRole::ADMIN),
        }
    }
}

impl std::str::FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "professor" => Ok(ActorRole::Professor),
            "department_head" => Ok(ActorRole::DepartmentHead),
            "registrar" => Ok(ActorRole::Registrar),
            "admin" => Ok(ActorRole::Admin),
            _ => Err(format!("Invalid actor role: {s}")),
        }
    }
}
