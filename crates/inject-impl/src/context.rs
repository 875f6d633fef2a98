//! 线程本地解析上下文
//!
//! 每个线程、每个容器至多存在一个 [`InternalContext`]。外部 API 入口通过
//! [`call_in_context`] 进入上下文：已有上下文则复用（嵌套调用共享同一份
//! 构造记录），没有则新建并在本次调用结束时拆除。拆除只由创建它的那一层
//! 负责，嵌套层退出不会动上下文。

use inject_common::{DeferredDelegate, InstanceHandle};
use inject_abstractions::{Key, ScopeStrategy};
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

thread_local! {
    /// 按容器 id 索引的活动上下文
    static LOCAL_CONTEXTS: RefCell<HashMap<u64, Rc<InternalContext>>> =
        RefCell::new(HashMap::new());

    /// 按容器 id 索引的当前线程作用域策略
    static LOCAL_STRATEGIES: RefCell<HashMap<u64, Arc<dyn ScopeStrategy>>> =
        RefCell::new(HashMap::new());
}

/// 在容器的线程本地上下文内执行 `f`
///
/// 本层新建的上下文由守卫在退出时拆除，panic 时同样生效。
pub(crate) fn call_in_context<R>(
    container_id: u64,
    f: impl FnOnce(&InternalContext) -> R,
) -> R {
    let (ctx, created) = LOCAL_CONTEXTS.with(|slot| {
        let mut map = slot.borrow_mut();
        match map.get(&container_id) {
            Some(existing) => (Rc::clone(existing), false),
            None => {
                let fresh = Rc::new(InternalContext::new());
                map.insert(container_id, Rc::clone(&fresh));
                (fresh, true)
            }
        }
    });
    let _teardown = created.then(|| ContextTeardown { container_id });
    f(&ctx)
}

/// 为当前线程安装作用域策略
pub(crate) fn install_strategy(container_id: u64, strategy: Arc<dyn ScopeStrategy>) {
    LOCAL_STRATEGIES.with(|slot| {
        slot.borrow_mut().insert(container_id, strategy);
    });
}

/// 移除当前线程的作用域策略
pub(crate) fn remove_strategy(container_id: u64) {
    LOCAL_STRATEGIES.with(|slot| {
        slot.borrow_mut().remove(&container_id);
    });
}

/// 当前线程安装的作用域策略
pub(crate) fn current_strategy(container_id: u64) -> Option<Arc<dyn ScopeStrategy>> {
    LOCAL_STRATEGIES.with(|slot| slot.borrow().get(&container_id).cloned())
}

struct ContextTeardown {
    container_id: u64,
}

impl Drop for ContextTeardown {
    fn drop(&mut self) {
        LOCAL_CONTEXTS.with(|slot| {
            slot.borrow_mut().remove(&self.container_id);
        });
    }
}

/// 当前解析位置
///
/// 进入每个注入点（构造参数、字段、方法参数或外部获取入口）前压入，
/// 离开后恢复，用于错误信息和自定义工厂的诊断。
#[derive(Debug, Clone)]
pub(crate) struct ExternalContext {
    pub(crate) key: Key,
    pub(crate) member: Option<String>,
}

impl ExternalContext {
    /// 外部入口位置（`get_instance` 等）
    pub(crate) fn top_level(key: Key) -> Self {
        Self { key, member: None }
    }

    /// 成员注入位置
    pub(crate) fn member(key: Key, site: String) -> Self {
        Self {
            key,
            member: Some(site),
        }
    }
}

impl std::fmt::Display for ExternalContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.member {
            Some(site) => write!(f, "{} 位于 {site}", self.key),
            None => write!(f, "{}", self.key),
        }
    }
}

/// 单个类型的构造记录
///
/// 状态流转：未开始 → 构造中（`constructing`）→ 成员注入中（`current`）
/// → 完成（记录复位）。
#[derive(Default)]
pub(crate) struct ConstructionRecord {
    /// 构造窗口标志：置位期间再次请求同一类型属于循环
    pub(crate) constructing: bool,
    /// 已分配、成员注入尚未完成的实例
    pub(crate) current: Option<InstanceHandle>,
    /// 为打破循环发出的代理，同一记录内复用
    pub(crate) proxy: Option<InstanceHandle>,
    /// 代理背后待填充的延迟目标
    pub(crate) delegate: Option<Arc<DeferredDelegate>>,
}

/// 一次外部调用期间的解析状态
///
/// 只存在于线程本地，内部用 `RefCell` 做短借用，任何借用都不跨越
/// 递归解析，因此工厂代码重入公共 API 不会冲突。
pub(crate) struct InternalContext {
    external: RefCell<Option<ExternalContext>>,
    records: RefCell<HashMap<TypeId, ConstructionRecord>>,
}

impl InternalContext {
    fn new() -> Self {
        Self {
            external: RefCell::new(None),
            records: RefCell::new(HashMap::new()),
        }
    }

    /// 在给定解析位置下执行 `f`，退出时恢复原位置（panic 时同样恢复）
    pub(crate) fn with_external<R>(
        &self,
        external: ExternalContext,
        f: impl FnOnce(&Self) -> R,
    ) -> R {
        let previous = self.external.borrow_mut().replace(external);
        let _restore = ExternalRestore {
            ctx: self,
            previous: Some(previous),
        };
        f(self)
    }

    /// 当前解析位置的快照
    pub(crate) fn current_external(&self) -> Option<ExternalContext> {
        self.external.borrow().clone()
    }

    fn restore_external(&self, previous: Option<ExternalContext>) {
        *self.external.borrow_mut() = previous;
    }

    /// 对某类型的构造记录执行 `f`，记录不存在时先建默认记录
    ///
    /// `f` 内部不得再进入本上下文的其他方法。
    pub(crate) fn with_record<R>(
        &self,
        type_id: TypeId,
        f: impl FnOnce(&mut ConstructionRecord) -> R,
    ) -> R {
        let mut records = self.records.borrow_mut();
        f(records.entry(type_id).or_default())
    }
}

/// 解析位置的复位守卫
struct ExternalRestore<'a> {
    ctx: &'a InternalContext,
    previous: Option<Option<ExternalContext>>,
}

impl Drop for ExternalRestore<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.ctx.restore_external(previous);
        }
    }
}
