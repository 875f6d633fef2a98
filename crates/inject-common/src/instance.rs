//! 实例句柄
//!
//! 容器内部统一的装箱货币：工厂产出、参数解析、成员注入之间
//! 传递的都是 [`InstanceHandle`]。

use crate::errors::{DependencyError, DependencyResult};
use crate::metadata::TypeInfo;
use std::any::Any;
use std::sync::Arc;

/// 装箱后的注入值
///
/// 句柄的载荷恒为 `Arc<S>`，`S` 是注入点声明的服务类型——既可以是
/// 具体类型，也可以是 `dyn Trait` 能力类型。克隆句柄只增加引用计数，
/// 不复制实例。
#[derive(Clone)]
pub struct InstanceHandle {
    /// 装箱值，实际类型为 `Arc<S>`
    value: Arc<dyn Any + Send + Sync>,
    /// 载荷的服务类型，用于诊断与转型校验
    type_info: TypeInfo,
}

impl InstanceHandle {
    /// 以服务类型 `S` 装箱一个实例
    pub fn new<S>(value: Arc<S>) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        Self {
            value: Arc::new(value),
            type_info: TypeInfo::of::<S>(),
        }
    }

    /// 按服务类型 `S` 取出实例
    ///
    /// 载荷类型与 `S` 不一致时返回 [`DependencyError::TypeMismatch`]。
    pub fn downcast<S>(&self) -> DependencyResult<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.value
            .downcast_ref::<Arc<S>>()
            .cloned()
            .ok_or_else(|| DependencyError::TypeMismatch {
                expected: TypeInfo::of::<S>().name().to_string(),
                actual: self.type_info.name().to_string(),
            })
    }

    /// 判断句柄载荷是否为服务类型 `S`
    pub fn is<S>(&self) -> bool
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.value.downcast_ref::<Arc<S>>().is_some()
    }

    /// 载荷的服务类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }
}

impl std::fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceHandle")
            .field("type_info", &self.type_info)
            .finish_non_exhaustive()
    }
}
