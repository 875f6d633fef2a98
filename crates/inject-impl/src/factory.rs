//! 内部工厂
//!
//! 注册表里每个 Key 对应一个 `InternalFactory`。内建工厂有三种：
//! 常量、构造式（走构造计划与成员注入）、外部自定义工厂的适配器。
//! 作用域在注册时以包装工厂的方式叠加在内建工厂之外。

use crate::container::ContainerImpl;
use crate::context::{self, InternalContext};
use inject_abstractions::{Key, ObjectFactory, ResolutionContext, Scope, ScopeStrategy};
use inject_common::{ClassMetadata, DependencyResult, InstanceHandle};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::ThreadId;
use tracing::debug;

/// 把句柄适配成注册的服务形态
///
/// `factory_as` 注册时提供：具体类型句柄转成能力句柄；循环代理和
/// 重入引用本身已是能力形态，原样透传。
pub(crate) type CoerceFn =
    Box<dyn Fn(&InstanceHandle) -> DependencyResult<InstanceHandle> + Send + Sync>;

/// 容器内部的实例工厂
pub(crate) trait InternalFactory: Send + Sync {
    /// 在给定上下文内产出一个实例句柄
    fn create(
        &self,
        container: &ContainerImpl,
        ctx: &InternalContext,
    ) -> DependencyResult<InstanceHandle>;
}

/// 常量绑定：每次解析返回同一句柄
pub(crate) struct ConstantFactory {
    value: InstanceHandle,
}

impl ConstantFactory {
    pub(crate) fn new(value: InstanceHandle) -> Self {
        Self { value }
    }
}

impl InternalFactory for ConstantFactory {
    fn create(
        &self,
        _container: &ContainerImpl,
        _ctx: &InternalContext,
    ) -> DependencyResult<InstanceHandle> {
        Ok(self.value.clone())
    }
}

/// 构造式绑定：按类型元数据走完整构造算法
pub(crate) struct ConstructingFactory {
    metadata: &'static ClassMetadata,
    coerce: Option<CoerceFn>,
}

impl ConstructingFactory {
    pub(crate) fn new(metadata: &'static ClassMetadata, coerce: Option<CoerceFn>) -> Self {
        Self { metadata, coerce }
    }
}

impl InternalFactory for ConstructingFactory {
    fn create(
        &self,
        container: &ContainerImpl,
        ctx: &InternalContext,
    ) -> DependencyResult<InstanceHandle> {
        let plan = container.constructor_plan(self.metadata)?;
        let handle = container.construct(&plan, ctx)?;
        match &self.coerce {
            Some(coerce) => coerce(&handle),
            None => Ok(handle),
        }
    }
}

/// 外部自定义工厂的适配器
pub(crate) struct CustomFactory {
    inner: Arc<dyn ObjectFactory>,
}

impl CustomFactory {
    pub(crate) fn new(inner: Arc<dyn ObjectFactory>) -> Self {
        Self { inner }
    }
}

impl InternalFactory for CustomFactory {
    fn create(
        &self,
        container: &ContainerImpl,
        ctx: &InternalContext,
    ) -> DependencyResult<InstanceHandle> {
        let mut resolution = FactoryResolution { container, ctx };
        self.inner.create(&mut resolution)
    }
}

/// 暴露给自定义工厂的解析视图
struct FactoryResolution<'a> {
    container: &'a ContainerImpl,
    ctx: &'a InternalContext,
}

impl ResolutionContext for FactoryResolution<'_> {
    fn resolve(&mut self, key: &Key) -> DependencyResult<Option<InstanceHandle>> {
        self.container.get_instance_in(key, self.ctx)
    }

    fn current_key(&self) -> Option<Key> {
        self.ctx.current_external().map(|ext| ext.key)
    }

    fn scope_strategy(&self) -> Option<Arc<dyn ScopeStrategy>> {
        context::current_strategy(self.container.id())
    }
}

/// 单例包装：进程内同一工厂只构造一次
///
/// 所有单例工厂的构造都在同一把容器级可重入锁上串行：互相依赖的
/// 单例在两个线程上首次解析时只会排队，不会交叉持锁；同线程循环
/// 回到本工厂时锁可重入，循环交由构造记录处理。
struct SingletonFactory {
    inner: Arc<dyn InternalFactory>,
    cached: RwLock<Option<InstanceHandle>>,
}

impl InternalFactory for SingletonFactory {
    fn create(
        &self,
        container: &ContainerImpl,
        ctx: &InternalContext,
    ) -> DependencyResult<InstanceHandle> {
        if let Some(existing) = self.cached.read().as_ref() {
            return Ok(existing.clone());
        }
        let _serial = container.singleton_guard();
        // 排队期间别的线程可能已经构造完毕
        if let Some(existing) = self.cached.read().as_ref() {
            return Ok(existing.clone());
        }
        let handle = self.inner.create(container, ctx)?;
        // 同线程循环重入可能已把代理填进缓存，最外层以构造完成的
        // 真实实例覆盖，后续解析不再经过转发层
        *self.cached.write() = Some(handle.clone());
        Ok(handle)
    }
}

/// 线程包装：每个线程各缓存一个实例
///
/// 缓存按 `ThreadId` 索引，线程结束后条目仍保留在表里；
/// 适用于线程池等长生命周期线程，不适合高频创建销毁线程的场景。
struct ThreadScopedFactory {
    inner: Arc<dyn InternalFactory>,
    cached: dashmap::DashMap<ThreadId, InstanceHandle>,
}

impl InternalFactory for ThreadScopedFactory {
    fn create(
        &self,
        container: &ContainerImpl,
        ctx: &InternalContext,
    ) -> DependencyResult<InstanceHandle> {
        let thread_id = std::thread::current().id();
        if let Some(existing) = self.cached.get(&thread_id) {
            return Ok(existing.clone());
        }
        // 构造不在分片锁内进行，重入解析才不会撞锁
        let handle = self.inner.create(container, ctx)?;
        let stored = self
            .cached
            .entry(thread_id)
            .or_insert_with(|| handle.clone());
        Ok(stored.clone())
    }
}

/// 策略包装：解析时查询当前线程安装的作用域策略
///
/// 未安装策略时直接退化为瞬时行为。
struct StrategyScopedFactory {
    key: Key,
    inner: Arc<dyn InternalFactory>,
}

impl InternalFactory for StrategyScopedFactory {
    fn create(
        &self,
        container: &ContainerImpl,
        ctx: &InternalContext,
    ) -> DependencyResult<InstanceHandle> {
        match context::current_strategy(container.id()) {
            Some(strategy) => {
                debug!(key = %self.key, "按作用域策略解析");
                let mut create = || self.inner.create(container, ctx);
                strategy.find_or_create(&self.key, &mut create)
            }
            None => self.inner.create(container, ctx),
        }
    }
}

/// 按注册作用域包装内建工厂
pub(crate) fn scoped(
    scope: Scope,
    key: &Key,
    inner: Arc<dyn InternalFactory>,
) -> Arc<dyn InternalFactory> {
    match scope {
        Scope::Transient => inner,
        Scope::Singleton => Arc::new(SingletonFactory {
            inner,
            cached: RwLock::new(None),
        }),
        Scope::Thread => Arc::new(ThreadScopedFactory {
            inner,
            cached: dashmap::DashMap::new(),
        }),
        Scope::Strategy => Arc::new(StrategyScopedFactory {
            key: key.clone(),
            inner,
        }),
    }
}

/// Key → 工厂的注册表形态
pub(crate) type FactoryMap = HashMap<Key, Arc<dyn InternalFactory>>;
