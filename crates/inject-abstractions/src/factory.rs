//! 外部自定义工厂接口

use crate::key::Key;
use crate::scope::ScopeStrategy;
use inject_common::{DependencyResult, InstanceHandle};
use std::sync::Arc;

/// 自定义工厂可见的解析上下文
///
/// 暴露当前解析位置和嵌套解析入口，使自定义工厂可以在同一个
/// 解析上下文内继续解析其他依赖（循环检测、重入复用都照常生效）。
pub trait ResolutionContext {
    /// 在当前上下文内解析一个 Key；未注册时返回 `Ok(None)`
    fn resolve(&mut self, key: &Key) -> DependencyResult<Option<InstanceHandle>>;

    /// 当前正在解析的 Key（用于诊断）
    fn current_key(&self) -> Option<Key>;

    /// 当前线程安装的作用域策略
    fn scope_strategy(&self) -> Option<Arc<dyn ScopeStrategy>>;
}

/// 外部自定义工厂
///
/// 注册进容器后与内建工厂同等参与解析管线。实现方自行决定如何
/// 产出实例，并可通过 [`ResolutionContext`] 解析自身依赖。
pub trait ObjectFactory: Send + Sync {
    /// 在给定解析上下文中创建实例
    fn create(&self, ctx: &mut dyn ResolutionContext) -> DependencyResult<InstanceHandle>;
}
