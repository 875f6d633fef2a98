//! 错误类型定义

use thiserror::Error;

/// 依赖注入错误类型
///
/// 覆盖注册期（配置错误）和解析期（构造/注入失败）两类场景。
/// 除可选成员的 [`DependencyError::MissingDependency`] 会被调用方吞掉外，
/// 所有错误都会原样传播到最初调用 `inject` / `get_instance` 的位置，
/// 不做任何自动重试。
#[derive(Error, Debug)]
pub enum DependencyError {
    /// 注入点需要的 Key 没有注册对应的工厂
    #[error("未找到依赖映射: {key}, 注入位置: {site}")]
    MissingDependency {
        /// 缺失的绑定 Key（类型 + 名称）
        key: String,
        /// 需要该依赖的成员或参数
        site: String,
    },

    /// 同一类型上标记了多个注入构造函数
    #[error("类型 {type_name} 上标记了多个注入构造函数")]
    AmbiguousConstructor {
        /// 实现类型名称
        type_name: String,
    },

    /// 既没有标记构造函数，也没有无参构造函数
    #[error("类型 {type_name} 没有可用的构造函数")]
    NoSuitableConstructor {
        /// 实现类型名称
        type_name: String,
    },

    /// 检测到循环依赖，且目标类型不具备可代理的能力接口
    #[error("检测到不可代理的循环依赖: {type_name}")]
    UnproxyableCycle {
        /// 无法代理的实现类型名称
        type_name: String,
    },

    /// 实例句柄无法按注入点声明的服务类型取出
    #[error("类型转换失败: 期望 {expected}, 实际 {actual}")]
    TypeMismatch {
        /// 注入点声明的服务类型
        expected: String,
        /// 句柄实际承载的服务类型
        actual: String,
    },

    /// 构造函数分配或方法调用在执行期失败
    #[error("构造或注入调用失败: {site}, 原因: {source}")]
    InvocationFailed {
        /// 失败的成员或类型
        site: String,
        /// 原始错误
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 标记为注入的方法没有任何参数
    #[error("方法 {site} 没有可注入的参数")]
    NoParametersToInject {
        /// 方法标识
        site: String,
    },

    /// 同一个 Key 被注册了两次
    #[error("重复注册绑定: {key}")]
    DuplicateBinding {
        /// 冲突的绑定 Key
        key: String,
    },

    /// 延迟引用槽被填充了两次（容器内部使用错误）
    #[error("延迟引用已填充: {type_name}")]
    DelegateAlreadyFulfilled {
        /// 延迟引用承载的能力类型
        type_name: String,
    },
}

impl DependencyError {
    /// 创建调用失败错误，并包装原始原因
    pub fn invocation(site: impl Into<String>, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::InvocationFailed {
            site: site.into(),
            source: source.into(),
        }
    }
}

/// 结果类型别名
pub type DependencyResult<T> = Result<T, DependencyError>;
