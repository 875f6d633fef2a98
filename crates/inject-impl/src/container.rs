//! 容器实现
//!
//! 不可变注册表加解析引擎。构建完成后工厂表不再变化，实例按需、
//! 懒式构造；同一次外部调用内的构造记录保证「每类型至多一个
//! 正在构造的实例」，循环依赖用转发代理打破。

use crate::builder::ContainerBuilder;
use crate::context::{self, ExternalContext, InternalContext};
use crate::factory::{FactoryMap, InternalFactory};
use crate::injector::MemberInjector;
use crate::plan::{self, ConstructorPlan};
use dashmap::DashMap;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use inject_abstractions::{Container, Key, ScopeStrategy};
use inject_common::{
    ClassMetadata, DeferredDelegate, DependencyError, DependencyResult, Injectable,
    InstanceHandle, TypeInfo,
};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// 容器实例的进程内唯一编号，用于隔离线程本地状态
static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// 注入容器实现
///
/// 克隆廉价（内部共享），可跨线程共享。通过 [`ContainerBuilder`]
/// 构建，构建后注册表不可变。
#[derive(Clone)]
pub struct ContainerImpl {
    inner: Arc<ContainerShared>,
}

struct ContainerShared {
    id: u64,
    factories: FactoryMap,
    names_by_type: HashMap<TypeId, HashSet<String>>,
    plans: DashMap<TypeId, Arc<ConstructorPlan>>,
    members: DashMap<TypeId, Arc<Vec<MemberInjector>>>,
    /// 全部单例工厂共用的构造串行锁；互相依赖的单例绑定不会在
    /// 两个线程上交叉持锁
    singleton_lock: ReentrantMutex<()>,
}

impl ContainerImpl {
    pub(crate) fn from_builder(builder: ContainerBuilder) -> Self {
        let factories = builder.into_factories();
        let mut names_by_type: HashMap<TypeId, HashSet<String>> = HashMap::new();
        for key in factories.keys() {
            names_by_type
                .entry(key.type_info().id())
                .or_default()
                .insert(key.name().to_string());
        }
        let id = NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed);
        debug!(container_id = id, bindings = factories.len(), "容器构建完成");
        Self {
            inner: Arc::new(ContainerShared {
                id,
                factories,
                names_by_type,
                plans: DashMap::new(),
                members: DashMap::new(),
                singleton_lock: ReentrantMutex::new(()),
            }),
        }
    }

    /// 容器编号（线程本地状态的隔离键）
    pub(crate) fn id(&self) -> u64 {
        self.inner.id
    }

    /// 查注册表；未注册返回 `None`
    pub(crate) fn lookup(&self, key: &Key) -> Option<Arc<dyn InternalFactory>> {
        self.inner.factories.get(key).cloned()
    }

    /// 单例构造的容器级串行锁；可重入，同线程循环照常走构造记录
    pub(crate) fn singleton_guard(&self) -> ReentrantMutexGuard<'_, ()> {
        self.inner.singleton_lock.lock()
    }

    /// 某实现类型的构造计划，首次使用时建立并缓存
    pub(crate) fn constructor_plan(
        &self,
        metadata: &'static ClassMetadata,
    ) -> DependencyResult<Arc<ConstructorPlan>> {
        let type_id = metadata.type_info.id();
        if let Some(cached) = self.inner.plans.get(&type_id) {
            return Ok(Arc::clone(&cached));
        }
        // 计划建立不持分片锁，先建后插，重复建立无害
        let built = Arc::new(plan::build_plan(self, metadata)?);
        let stored = self
            .inner
            .plans
            .entry(type_id)
            .or_insert_with(|| Arc::clone(&built));
        Ok(Arc::clone(&stored))
    }

    /// 某实现类型的成员注入器列表，首次使用时收集并缓存
    pub(crate) fn member_injectors(
        &self,
        metadata: &'static ClassMetadata,
    ) -> DependencyResult<Arc<Vec<MemberInjector>>> {
        let type_id = metadata.type_info.id();
        if let Some(cached) = self.inner.members.get(&type_id) {
            return Ok(Arc::clone(&cached));
        }
        let built = Arc::new(plan::build_members(self, metadata)?);
        let stored = self
            .inner
            .members
            .entry(type_id)
            .or_insert_with(|| Arc::clone(&built));
        Ok(Arc::clone(&stored))
    }

    /// 在已有上下文内按 Key 解析；未注册返回 `Ok(None)`
    pub(crate) fn get_instance_in(
        &self,
        key: &Key,
        ctx: &InternalContext,
    ) -> DependencyResult<Option<InstanceHandle>> {
        let Some(factory) = self.lookup(key) else {
            return Ok(None);
        };
        ctx.with_external(ExternalContext::top_level(key.clone()), |ctx| {
            factory.create(self, ctx)
        })
        .map(Some)
    }

    /// 核心构造算法
    ///
    /// 构造记录的状态决定走向：构造中 → 发（或复用）代理；已分配、
    /// 成员注入中 → 返回同一引用；否则开构造窗口，解析参数、分配、
    /// 填充代理目标、注入成员。构造窗口和当前引用在成功与失败两条
    /// 路径上都会复位。
    pub(crate) fn construct(
        &self,
        plan: &ConstructorPlan,
        ctx: &InternalContext,
    ) -> DependencyResult<InstanceHandle> {
        let type_id = plan.type_info.id();

        enum Entry {
            Reuse(InstanceHandle),
            Start,
        }

        let entry = ctx.with_record(type_id, |record| {
            if record.constructing {
                if let Some(proxy) = &record.proxy {
                    return Ok(Entry::Reuse(proxy.clone()));
                }
                let proxy_meta =
                    plan.proxy
                        .ok_or_else(|| DependencyError::UnproxyableCycle {
                            type_name: plan.type_info.name().to_string(),
                        })?;
                let delegate = Arc::new(DeferredDelegate::new());
                let proxy = (proxy_meta.make_proxy)(Arc::clone(&delegate));
                debug!(
                    type_name = plan.type_info.name(),
                    capability = proxy_meta.capability.name(),
                    "检测到循环依赖，发出转发代理"
                );
                record.proxy = Some(proxy.clone());
                record.delegate = Some(delegate);
                return Ok(Entry::Reuse(proxy));
            }
            if let Some(current) = &record.current {
                return Ok(Entry::Reuse(current.clone()));
            }
            record.constructing = true;
            Ok(Entry::Start)
        })?;

        if let Entry::Reuse(handle) = entry {
            return Ok(handle);
        }

        // 解析构造参数并分配实例
        let allocated = match self.allocate(plan, ctx) {
            Ok(handle) => handle,
            Err(error) => {
                ctx.with_record(type_id, |record| {
                    record.constructing = false;
                    record.proxy = None;
                    record.delegate = None;
                });
                return Err(error);
            }
        };

        // 构造窗口结束；成员注入前先把实例记为当前引用并填充代理目标，
        // 后续重入和已发出的代理都指向同一实例
        let delegate = ctx.with_record(type_id, |record| {
            record.constructing = false;
            record.current = Some(allocated.clone());
            record.delegate.take()
        });
        if let Some(delegate) = delegate {
            let proxy_meta = plan
                .proxy
                .ok_or_else(|| DependencyError::UnproxyableCycle {
                    type_name: plan.type_info.name().to_string(),
                })?;
            let capability = (proxy_meta.as_capability)(&allocated)?;
            delegate.fulfill(capability)?;
        }

        let injected = self.apply_members(&plan.members, &allocated, ctx);

        // 无论成败都清当前引用，让记录回到未开始状态
        ctx.with_record(type_id, |record| {
            record.current = None;
            record.proxy = None;
        });

        injected?;
        Ok(allocated)
    }

    fn allocate(
        &self,
        plan: &ConstructorPlan,
        ctx: &InternalContext,
    ) -> DependencyResult<InstanceHandle> {
        let mut arguments = Vec::with_capacity(plan.parameters.len());
        for parameter in &plan.parameters {
            arguments.push(parameter.resolve(self, ctx)?);
        }
        (plan.construct)(&arguments)
    }

    fn apply_members(
        &self,
        members: &[MemberInjector],
        target: &InstanceHandle,
        ctx: &InternalContext,
    ) -> DependencyResult<()> {
        for member in members {
            member.apply(self, ctx, target)?;
        }
        Ok(())
    }
}

impl Container for ContainerImpl {
    fn inject_members<T: Injectable>(&self, target: &Arc<T>) -> DependencyResult<()> {
        let members = self.member_injectors(T::class_metadata())?;
        let handle = InstanceHandle::new(Arc::clone(target));
        context::call_in_context(self.id(), |ctx| {
            self.apply_members(&members, &handle, ctx)
        })
    }

    fn inject<T: Injectable>(&self) -> DependencyResult<Arc<T>> {
        let plan = self.constructor_plan(T::class_metadata())?;
        let handle = context::call_in_context(self.id(), |ctx| self.construct(&plan, ctx))?;
        handle.downcast::<T>()
    }

    fn get_instance_named<S>(&self, name: &str) -> DependencyResult<Option<Arc<S>>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let key = Key::new::<S>(name);
        let handle =
            context::call_in_context(self.id(), |ctx| self.get_instance_in(&key, ctx))?;
        handle.map(|handle| handle.downcast::<S>()).transpose()
    }

    fn get_instance_names(&self, type_info: &TypeInfo) -> HashSet<String> {
        self.inner
            .names_by_type
            .get(&type_info.id())
            .cloned()
            .unwrap_or_default()
    }

    fn set_scope_strategy(&self, strategy: Arc<dyn ScopeStrategy>) {
        context::install_strategy(self.id(), strategy);
    }

    fn remove_scope_strategy(&self) {
        context::remove_strategy(self.id());
    }
}

impl std::fmt::Debug for ContainerImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerImpl")
            .field("id", &self.inner.id)
            .field("bindings", &self.inner.factories.len())
            .finish()
    }
}
