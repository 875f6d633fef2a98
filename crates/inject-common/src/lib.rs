//! # Inject Common
//!
//! 这个 crate 提供注入容器各层共享的基础类型。
//!
//! ## 核心组件
//!
//! - [`DependencyError`] - 依赖注入错误分类
//! - [`TypeInfo`] - 服务类型标识（支持 `dyn Trait` 能力类型）
//! - [`InstanceHandle`] - 容器内部统一的装箱实例句柄
//! - [`ClassMetadata`] - 注入标记元数据（反射信息的 Rust 对应物）
//! - [`DeferredDelegate`] - 循环依赖代理使用的一次性延迟引用槽
//!
//! ## 设计原则
//!
//! - 元数据只描述被标记的成员：标记即容器消费的全部输入语言
//! - 容器对外传递 `Arc<S>`，`S` 为注入点声明的服务类型
//! - 基于 Rust 类型系统的编译时安全，解析期仅做受控的向下转型

pub mod deferred;
pub mod errors;
pub mod instance;
pub mod metadata;

pub use deferred::*;
pub use errors::*;
pub use instance::*;
pub use metadata::*;

/// 默认绑定名。
///
/// 未显式命名的注入点和注册项都使用这个名字。
pub const DEFAULT_NAME: &str = "default";
