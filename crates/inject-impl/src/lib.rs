//! 注入容器实现
//!
//! [`ContainerBuilder`] 负责注册阶段，[`ContainerImpl`] 负责解析阶段。
//! 解析引擎的关键机制：
//!
//! - 按实现类型缓存的构造计划（构造函数选择、注入点到工厂的映射）
//! - 每线程、每容器至多一个解析上下文，嵌套调用共享构造记录
//! - 构造记录保证同一次调用内每类型至多一个正在构造的实例
//! - 循环依赖通过延迟引用代理打破，不可代理的循环报错
//! - 作用域以工厂包装实现：瞬时、单例、线程、线程本地策略

mod builder;
mod container;
mod context;
mod factory;
mod injector;
mod plan;

pub use builder::ContainerBuilder;
pub use container::ContainerImpl;

pub use inject_abstractions::{
    Container, Key, ObjectFactory, ResolutionContext, Scope, ScopeStrategy,
};
pub use inject_common::{
    ClassMetadata, ConstructorMetadata, DeferredDelegate, DependencyError, DependencyResult,
    FieldMetadata, Injectable, InjectMarker, InstanceHandle, MethodMetadata, ParameterMetadata,
    ProxyMetadata, TypeInfo, DEFAULT_NAME,
};
