//! 延迟引用槽
//!
//! 循环依赖的代理机制：当 A 的构造依赖 B、B 的构造又依赖 A 时，
//! 后进入的一方会拿到一个转发代理，代理内部持有 [`DeferredDelegate`]。
//! 真实实例构造完成后容器一次性填充该槽，代理此后把所有调用转发给
//! 真实实例。

use crate::errors::{DependencyError, DependencyResult};
use crate::instance::InstanceHandle;
use std::sync::Arc;
use std::sync::OnceLock;

/// 一次性延迟引用槽
///
/// 代理构造时为空；目标实例分配完成后由容器填充，且只能填充一次。
#[derive(Debug, Default)]
pub struct DeferredDelegate {
    /// 填充后的能力类型句柄
    target: OnceLock<InstanceHandle>,
}

impl DeferredDelegate {
    /// 创建未填充的延迟引用槽
    pub fn new() -> Self {
        Self {
            target: OnceLock::new(),
        }
    }

    /// 填充真实实例（仅容器在构造完成时调用，且只允许一次）
    pub fn fulfill(&self, handle: InstanceHandle) -> DependencyResult<()> {
        let type_name = handle.type_info().name().to_string();
        self.target
            .set(handle)
            .map_err(|_| DependencyError::DelegateAlreadyFulfilled { type_name })
    }

    /// 槽是否已填充
    pub fn is_ready(&self) -> bool {
        self.target.get().is_some()
    }

    /// 尝试按能力类型取出真实实例
    pub fn try_get<S>(&self) -> Option<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.target.get().and_then(|h| h.downcast::<S>().ok())
    }

    /// 按能力类型取出真实实例
    ///
    /// # Panics
    ///
    /// 在构造完成之前通过代理发起调用属于使用错误，此时会 panic 并
    /// 给出明确信息。
    pub fn get<S>(&self) -> Arc<S>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        match self.target.get() {
            Some(handle) => match handle.downcast::<S>() {
                Ok(value) => value,
                Err(e) => panic!("延迟引用能力类型不匹配: {e}"),
            },
            None => panic!("目标实例尚未构造完成, 不能通过延迟引用发起调用"),
        }
    }
}
