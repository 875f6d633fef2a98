//! 绑定标识

use inject_common::{TypeInfo, DEFAULT_NAME};

/// 绑定 Key
///
/// 以（服务类型, 绑定名）二元组唯一标识一个依赖。两个 Key 相等
/// 当且仅当类型和名称都相等；可哈希，直接作为注册表的键使用。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    /// 服务类型
    type_info: TypeInfo,
    /// 绑定名
    name: String,
}

impl Key {
    /// 以服务类型 `S` 和绑定名创建 Key
    pub fn new<S: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            type_info: TypeInfo::of::<S>(),
            name: name.into(),
        }
    }

    /// 以服务类型 `S` 和默认绑定名创建 Key
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self::new::<S>(DEFAULT_NAME)
    }

    /// 以已有类型信息和绑定名创建 Key
    pub fn from_type_info(type_info: TypeInfo, name: impl Into<String>) -> Self {
        Self {
            type_info,
            name: name.into(),
        }
    }

    /// 服务类型
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 绑定名
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.type_info.name(), self.name)
    }
}
