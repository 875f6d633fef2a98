//! 容器构建器
//!
//! 注册阶段唯一可变的入口。所有绑定在这里登记，`build` 之后
//! 注册表冻结，容器本身不再提供任何修改手段。

use crate::container::ContainerImpl;
use crate::factory::{
    scoped, CoerceFn, ConstantFactory, ConstructingFactory, CustomFactory, FactoryMap,
    InternalFactory,
};
use inject_abstractions::{Key, ObjectFactory, Scope};
use inject_common::{
    DependencyError, DependencyResult, Injectable, InstanceHandle, DEFAULT_NAME,
};
use std::sync::Arc;
use tracing::debug;

/// 容器构建器
///
/// 典型用法：
///
/// ```ignore
/// let mut builder = ContainerBuilder::new();
/// builder.factory::<Engine>(Scope::Singleton)?;
/// builder.constant("max-speed", Arc::new(120_u32))?;
/// let container = builder.build();
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
    factories: FactoryMap,
}

impl std::fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("bindings", &self.factories.len())
            .finish_non_exhaustive()
    }
}

impl ContainerBuilder {
    /// 新建空构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册常量绑定：每次解析返回同一实例
    pub fn constant<S>(&mut self, name: &str, value: Arc<S>) -> DependencyResult<&mut Self>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.register(
            Key::new::<S>(name),
            Arc::new(ConstantFactory::new(InstanceHandle::new(value))),
        )
    }

    /// 以默认绑定名注册构造式绑定
    pub fn factory<T: Injectable>(&mut self, scope: Scope) -> DependencyResult<&mut Self> {
        self.named_factory::<T>(DEFAULT_NAME, scope)
    }

    /// 以指定绑定名注册构造式绑定：服务类型即实现类型
    pub fn named_factory<T: Injectable>(
        &mut self,
        name: &str,
        scope: Scope,
    ) -> DependencyResult<&mut Self> {
        let key = Key::new::<T>(name);
        let inner: Arc<dyn InternalFactory> =
            Arc::new(ConstructingFactory::new(T::class_metadata(), None));
        let factory = scoped(scope, &key, inner);
        self.register(key, factory)
    }

    /// 注册能力绑定：以实现类型 `T` 构造，按能力类型 `S` 对外提供
    ///
    /// `coerce` 负责 `Arc<T>` 到 `Arc<S>` 的形态转换（通常就是一个
    /// 隐式转换的包装）。循环代理和重入引用本身已是能力形态，直接透传。
    pub fn factory_as<S, T>(
        &mut self,
        name: &str,
        scope: Scope,
        coerce: fn(Arc<T>) -> Arc<S>,
    ) -> DependencyResult<&mut Self>
    where
        S: ?Sized + Send + Sync + 'static,
        T: Injectable,
    {
        let key = Key::new::<S>(name);
        let coerce_fn: CoerceFn = Box::new(move |handle: &InstanceHandle| {
            if let Ok(concrete) = handle.downcast::<T>() {
                return Ok(InstanceHandle::new(coerce(concrete)));
            }
            handle.downcast::<S>()?;
            Ok(handle.clone())
        });
        let inner: Arc<dyn InternalFactory> = Arc::new(ConstructingFactory::new(
            T::class_metadata(),
            Some(coerce_fn),
        ));
        let factory = scoped(scope, &key, inner);
        self.register(key, factory)
    }

    /// 注册外部自定义工厂
    ///
    /// 工厂产出的句柄必须承载 `Arc<S>`，否则调用方取实例时报类型不匹配。
    pub fn custom<S>(
        &mut self,
        name: &str,
        scope: Scope,
        factory: Arc<dyn ObjectFactory>,
    ) -> DependencyResult<&mut Self>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let key = Key::new::<S>(name);
        let inner: Arc<dyn InternalFactory> = Arc::new(CustomFactory::new(factory));
        let wrapped = scoped(scope, &key, inner);
        self.register(key, wrapped)
    }

    /// 冻结注册表，产出容器
    pub fn build(self) -> ContainerImpl {
        ContainerImpl::from_builder(self)
    }

    pub(crate) fn into_factories(self) -> FactoryMap {
        self.factories
    }

    fn register(
        &mut self,
        key: Key,
        factory: Arc<dyn InternalFactory>,
    ) -> DependencyResult<&mut Self> {
        if self.factories.contains_key(&key) {
            return Err(DependencyError::DuplicateBinding {
                key: key.to_string(),
            });
        }
        debug!(key = %key, "登记绑定");
        self.factories.insert(key, factory);
        Ok(self)
    }
}
