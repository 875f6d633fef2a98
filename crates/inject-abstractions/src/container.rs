//! 容器公共操作接口

use crate::scope::ScopeStrategy;
use inject_common::{DependencyResult, Injectable, TypeInfo};
use std::collections::HashSet;
use std::sync::Arc;

/// 注入容器
///
/// 对被标记的构造函数、字段和方法实施依赖注入。容器构建完成后不可变。
///
/// 注入方法或构造函数时，可以为单个参数指定绑定名；参数未指定时回落到
/// 方法或构造函数标记上的绑定名，再回落到默认绑定名。
///
/// 典型用法：
///
/// ```ignore
/// let container = builder.build();
/// let engine: Arc<Engine> = container.inject::<Engine>()?;
/// ```
pub trait Container: Send + Sync {
    /// 对已存在的实例运行其类型的成员注入器（字段和方法）
    fn inject_members<T: Injectable>(&self, target: &Arc<T>) -> DependencyResult<()>;

    /// 构造类型 `T` 的新实例并完成全部注入
    fn inject<T: Injectable>(&self) -> DependencyResult<Arc<T>>;

    /// 按服务类型和绑定名获取实例
    ///
    /// Key 未注册时返回 `Ok(None)`——是否视为错误由调用方决定；
    /// 工厂执行失败时返回错误。
    fn get_instance_named<S>(&self, name: &str) -> DependencyResult<Option<Arc<S>>>
    where
        S: ?Sized + Send + Sync + 'static;

    /// 按服务类型和默认绑定名获取实例
    fn get_instance<S>(&self) -> DependencyResult<Option<Arc<S>>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.get_instance_named::<S>(inject_common::DEFAULT_NAME)
    }

    /// 获取某服务类型的全部注册绑定名
    ///
    /// 未注册的类型返回空集合，从不报错。仅做精确类型匹配。
    fn get_instance_names(&self, type_info: &TypeInfo) -> HashSet<String>;

    /// 为当前线程安装作用域策略
    fn set_scope_strategy(&self, strategy: Arc<dyn ScopeStrategy>);

    /// 移除当前线程的作用域策略
    fn remove_scope_strategy(&self);
}
