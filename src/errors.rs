//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_gradeflow_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum GradeflowError {
            $($variant(String),)*
        }

        impl GradeflowError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(GradeflowError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(GradeflowError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(GradeflowError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl GradeflowError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        GradeflowError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_gradeflow_errors! {
    Validation("E001", "Validation Error"),
    Conflict("E002", "Conflict Error"),
    Locked("E003", "Locked Error"),
    InvalidState("E004", "Invalid State Error"),
    NotFound("E005", "Resource Not Found"),
    Authorization("E006", "Authorization Error"),
    DatabaseConfig("E007", "Database Configuration Error"),
    DatabaseConnection("E008", "Database Connection Error"),
    DatabaseOperation("E009", "Database Operation Error"),
    Serialization("E010", "Serialization Error"),
    DateParse("E011", "Date Parse Error"),
}

impl GradeflowError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for GradeflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GradeflowError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for GradeflowError {
    fn from(err: sea_orm::DbErr) -> Self {
        GradeflowError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for GradeflowError {
    fn from(err: serde_json::Error) -> Self {
        GradeflowError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for GradeflowError {
    fn from(err: chrono::ParseError) -> Self {
        GradeflowError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GradeflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GradeflowError::validation("test").code(), "E001");
        assert_eq!(GradeflowError::conflict("test").code(), "E002");
        assert_eq!(GradeflowError::locked("test").code(), "E003");
        assert_eq!(GradeflowError::invalid_state("test").code(), "E004");
        assert_eq!(GradeflowError::not_found("test").code(), "E005");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            GradeflowError::conflict("test").error_type(),
            "Conflict Error"
        );
        assert_eq!(
            GradeflowError::validation("test").error_type(),
            "Validation Error"
        );
        assert_eq!(
            GradeflowError::invalid_state("test").error_type(),
            "Invalid State Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = GradeflowError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_format_simple() {
        let err = GradeflowError::locked("Record locked for retake");
        let formatted = err.format_simple();
        assert!(formatted.contains("Locked Error"));
        assert!(formatted.contains("Record locked for retake"));
    }
}
