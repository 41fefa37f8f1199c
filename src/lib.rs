//! LMS Grading - 课程评分网关
//!
//! 从 headless CMS 聚合测验与考试的作答，供讲师筛选、评分并回写。
//!
//! # 架构
//! - `backend`: 数据后端（CMS REST / 内存数据集）
//! - `cache`: 缓存层（Moka）
//! - `config`: 配置管理
//! - `errors`: 统一错误处理
//! - `grading`: 关联、筛选、分组与保存
//! - `middlewares`: 会话、角色与限流中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `session`: 会话与未保存评分
//! - `utils`: 工具函数

pub mod backend;
pub mod cache;
pub mod config;
pub mod errors;
pub mod grading;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod session;
pub mod utils;
