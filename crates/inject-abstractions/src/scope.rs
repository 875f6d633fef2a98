//! 作用域与作用域策略

use crate::key::Key;
use inject_common::{DependencyResult, InstanceHandle};

/// 实例作用域
///
/// 注册工厂时指定，决定工厂产出的实例在多次解析之间如何复用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// 瞬时：每次解析都构造新实例
    Transient,
    /// 单例：进程内同一工厂只构造一次
    Singleton,
    /// 线程：每个线程各持有一个实例
    Thread,
    /// 策略：解析时查询当前线程安装的 [`ScopeStrategy`]；
    /// 未安装策略时退化为瞬时行为
    Strategy,
}

impl Default for Scope {
    fn default() -> Self {
        Self::Transient
    }
}

/// 作用域策略
///
/// 按线程安装的可插拔缓存策略。只有以 [`Scope::Strategy`] 注册的
/// 工厂才会查询它；在一个线程上安装策略对其他线程没有任何影响。
pub trait ScopeStrategy: Send + Sync {
    /// 在策略管理的作用域内查找实例，不存在时调用 `create` 构造并记录
    fn find_or_create(
        &self,
        key: &Key,
        create: &mut dyn FnMut() -> DependencyResult<InstanceHandle>,
    ) -> DependencyResult<InstanceHandle>;
}
