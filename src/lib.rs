//! Gradeflow - 教务成绩生命周期核心
//!
//! 学籍/教务系统中成绩从录入、更正、审批到过期清理的状态机核心。
//! 对外以可调用操作的形式暴露，HTTP 传输与界面由外围系统负责。
//!
//! # 架构
//! - `config`: 配置管理
//! - `directory`: 外部协作方接口（排课 / 师资 / 通知）
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `models`: 数据模型与状态机纯逻辑
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层（录入 / 审批 / 过期清理）
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod config;
pub mod directory;
pub mod entity;
pub mod errors;
pub mod models;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
