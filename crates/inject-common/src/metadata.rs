//! 注入元数据定义
//!
//! 提供服务类型标识和注入标记元数据。[`ClassMetadata`] 家族是宿主语言
//! 反射信息在 Rust 中的对应物：由组件作者（或派生宏）提供，容器只消费，
//! 不推导。

use crate::errors::DependencyResult;
use crate::instance::InstanceHandle;
use crate::DEFAULT_NAME;
use std::any::TypeId;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 服务类型标识
///
/// 以 `TypeId` 为唯一标识，类型名仅用于诊断。允许 `?Sized`，
/// 因此 `dyn Trait` 能力类型可以直接作为绑定类型使用。
#[derive(Debug, Clone, Copy, Eq)]
pub struct TypeInfo {
    /// 类型 ID
    id: TypeId,
    /// 完整类型名（诊断用）
    name: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// 类型 ID
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// 完整类型名
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 简短类型名（不含模块路径）
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// 注入标记元数据
///
/// 声明式标注的运载格式：一个可选绑定名加一个必需/可选标志。
/// 这是规划器消费的唯一输入语言。
#[derive(Debug, Clone, Copy)]
pub struct InjectMarker {
    /// 绑定名，缺省为 [`DEFAULT_NAME`]
    pub name: &'static str,
    /// 依赖缺失时是否致命，缺省为 `true`
    pub required: bool,
}

impl InjectMarker {
    /// 默认标记（默认绑定名，必需）
    pub const fn new() -> Self {
        Self {
            name: DEFAULT_NAME,
            required: true,
        }
    }

    /// 指定绑定名的标记
    pub const fn named(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }

    /// 将标记改为可选（依赖缺失时静默跳过该成员）
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

impl Default for InjectMarker {
    fn default() -> Self {
        Self::new()
    }
}

/// 构造函数分配函数：以解析好的参数句柄分配实例
pub type ConstructFn = fn(&[InstanceHandle]) -> DependencyResult<InstanceHandle>;

/// 字段写入函数：把依赖句柄写入目标实例的字段槽
pub type FieldSetFn = fn(&InstanceHandle, InstanceHandle) -> DependencyResult<()>;

/// 方法调用函数：以解析好的参数句柄调用目标实例的注入方法
pub type MethodInvokeFn = fn(&InstanceHandle, &[InstanceHandle]) -> DependencyResult<()>;

/// 代理构建函数：以延迟引用槽构建转发代理，产出能力类型句柄
pub type MakeProxyFn = fn(Arc<crate::deferred::DeferredDelegate>) -> InstanceHandle;

/// 能力转换函数：把具体实例句柄转换为能力类型句柄
pub type AsCapabilityFn = fn(&InstanceHandle) -> DependencyResult<InstanceHandle>;

/// 构造参数元数据
#[derive(Debug, Clone, Copy)]
pub struct ParameterMetadata {
    /// 参数声明的服务类型
    pub type_info: TypeInfo,
    /// 参数级绑定名覆盖；`None` 时回落到构造函数/方法标记的绑定名
    pub name: Option<&'static str>,
}

impl ParameterMetadata {
    /// 声明一个服务类型为 `S` 的参数
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<S>(),
            name: None,
        }
    }

    /// 为参数指定显式绑定名
    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }
}

/// 构造函数元数据
pub struct ConstructorMetadata {
    /// 注入标记；无参构造函数可以不带标记
    pub marker: Option<InjectMarker>,
    /// 参数列表（声明顺序）
    pub parameters: Vec<ParameterMetadata>,
    /// 分配函数
    pub construct: ConstructFn,
}

impl std::fmt::Debug for ConstructorMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructorMetadata")
            .field("marker", &self.marker)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// 字段元数据
///
/// 只有被标记的字段才出现在元数据中。
pub struct FieldMetadata {
    /// 字段名（诊断用）
    pub field_name: &'static str,
    /// 字段声明的服务类型
    pub type_info: TypeInfo,
    /// 注入标记
    pub marker: InjectMarker,
    /// 写入函数
    pub set: FieldSetFn,
}

impl std::fmt::Debug for FieldMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMetadata")
            .field("field_name", &self.field_name)
            .field("type_info", &self.type_info)
            .field("marker", &self.marker)
            .finish_non_exhaustive()
    }
}

/// 方法元数据
///
/// 只有被标记的方法才出现在元数据中。
pub struct MethodMetadata {
    /// 方法名（诊断用）
    pub method_name: &'static str,
    /// 注入标记
    pub marker: InjectMarker,
    /// 参数列表（声明顺序）
    pub parameters: Vec<ParameterMetadata>,
    /// 调用函数
    pub invoke: MethodInvokeFn,
}

impl std::fmt::Debug for MethodMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodMetadata")
            .field("method_name", &self.method_name)
            .field("marker", &self.marker)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// 代理元数据
///
/// 仅接口形态的实现类型提供：声明该类型可以作为哪个能力类型被延迟，
/// 以及如何构建转发代理、如何把具体实例转换为能力句柄。
pub struct ProxyMetadata {
    /// 可代理的能力类型（`dyn Trait`）
    pub capability: TypeInfo,
    /// 构建转发代理
    pub make_proxy: MakeProxyFn,
    /// 具体实例句柄 → 能力类型句柄
    pub as_capability: AsCapabilityFn,
}

impl std::fmt::Debug for ProxyMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyMetadata")
            .field("capability", &self.capability)
            .finish_non_exhaustive()
    }
}

/// 类元数据
///
/// 一个实现类型的完整注入描述：声明的构造函数、被标记的字段和方法、
/// 基础组件链接以及可选的代理能力。
#[derive(Debug)]
pub struct ClassMetadata {
    /// 实现类型
    pub type_info: TypeInfo,
    /// 基础组件元数据（分层组件的"父类"链接）；
    /// 成员发现沿该链从根到叶收集，保证基础成员先于派生成员注入
    pub parent: Option<fn() -> &'static ClassMetadata>,
    /// 声明的构造函数列表
    pub constructors: Vec<ConstructorMetadata>,
    /// 被标记的字段（声明顺序）
    pub fields: Vec<FieldMetadata>,
    /// 被标记的方法（声明顺序）
    pub methods: Vec<MethodMetadata>,
    /// 代理能力；`None` 表示该类型参与循环依赖时无法被代理
    pub proxy: Option<ProxyMetadata>,
}

/// 可注入组件 trait
///
/// 实现类型通过该 trait 把自己的注入元数据交给容器。
pub trait Injectable: Send + Sync + 'static {
    /// 该类型的注入元数据（进程生命周期内恒定）
    fn class_metadata() -> &'static ClassMetadata;
}
