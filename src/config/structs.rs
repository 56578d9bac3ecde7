use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub grading: GradingConfig,
    pub sweep: SweepConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型）
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

/// 成绩政策配置
///
/// 及格线与 INC 期限取自校方政策，默认值对应 1.00（最好）~ 5.00（不及格）的
/// 五分制和一个学期的缓考期限。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingConfig {
    pub scale_min: f64,         // 成绩量表下界（最好成绩）
    pub scale_max: f64,         // 成绩量表上界（最差成绩）
    pub pass_threshold: f64,    // 及格线（<= 该值为通过）
    pub fail_grade: f64,        // 强制转不及格时写入的成绩
    pub inc_deadline_days: i64, // INC 提交后的处理期限（天）
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            scale_min: 1.00,
            scale_max: 5.00,
            pass_threshold: 3.00,
            fail_grade: 5.00,
            inc_deadline_days: 180,
        }
    }
}

/// 过期清理配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    pub interval_secs: u64, // 守护模式下两次清理之间的间隔（秒）
}
