//! # Inject Abstractions
//!
//! 注入容器的公共抽象层，定义绑定标识和对外操作接口。
//!
//! ## 核心接口
//!
//! - [`Key`] - 绑定标识（服务类型 + 绑定名）
//! - [`Container`] - 容器公共操作接口
//! - [`Scope`] / [`ScopeStrategy`] - 实例复用策略
//! - [`ObjectFactory`] - 外部自定义工厂接口

pub mod container;
pub mod factory;
pub mod key;
pub mod scope;

pub use container::*;
pub use factory::*;
pub use key::*;
pub use scope::*;
