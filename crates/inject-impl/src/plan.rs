//! 构造计划
//!
//! 把类元数据针对某个具体注册表规划成可直接执行的形态：选定构造函数、
//! 把每个注入点解析到工厂。计划按实现类型缓存在容器内，同一容器内
//! 每个类型只规划一次。

use crate::container::ContainerImpl;
use crate::context::ExternalContext;
use crate::injector::{MemberInjector, ParameterInjector};
use inject_abstractions::Key;
use inject_common::{
    ClassMetadata, ConstructFn, ConstructorMetadata, DependencyError, DependencyResult,
    ParameterMetadata, ProxyMetadata, TypeInfo, DEFAULT_NAME,
};
use std::sync::Arc;
use tracing::debug;

/// 某实现类型在某容器内的构造计划
pub(crate) struct ConstructorPlan {
    /// 实现类型
    pub(crate) type_info: TypeInfo,
    /// 选定构造函数的分配函数
    pub(crate) construct: ConstructFn,
    /// 构造参数注入器（声明顺序）
    pub(crate) parameters: Vec<ParameterInjector>,
    /// 成员注入器（基础组件在前，字段先于方法）
    pub(crate) members: Arc<Vec<MemberInjector>>,
    /// 代理能力（循环时用）
    pub(crate) proxy: Option<&'static ProxyMetadata>,
}

/// 为类元数据建立构造计划
pub(crate) fn build_plan(
    container: &ContainerImpl,
    metadata: &'static ClassMetadata,
) -> DependencyResult<ConstructorPlan> {
    let constructor = select_constructor(metadata)?;
    let default_name = constructor
        .marker
        .map_or(DEFAULT_NAME, |marker| marker.name);

    let mut parameters = Vec::with_capacity(constructor.parameters.len());
    for (index, parameter) in constructor.parameters.iter().enumerate() {
        let key = parameter_key(parameter, default_name);
        let site = format!(
            "{} 的构造参数 #{index}",
            metadata.type_info.short_name()
        );
        // 构造参数缺失一律致命，不看必需/可选标志
        let factory = container.lookup(&key).ok_or_else(|| {
            DependencyError::MissingDependency {
                key: key.to_string(),
                site: site.clone(),
            }
        })?;
        parameters.push(ParameterInjector {
            external: ExternalContext::member(key, site),
            factory,
        });
    }

    debug!(
        type_name = metadata.type_info.name(),
        parameters = parameters.len(),
        "已建立构造计划"
    );

    Ok(ConstructorPlan {
        type_info: metadata.type_info,
        construct: constructor.construct,
        parameters,
        members: container.member_injectors(metadata)?,
        proxy: metadata.proxy.as_ref(),
    })
}

/// 选定注入用的构造函数
///
/// 带标记的构造函数至多一个；一个都没有时回落到无参构造函数。
fn select_constructor(
    metadata: &'static ClassMetadata,
) -> DependencyResult<&'static ConstructorMetadata> {
    let mut marked = metadata
        .constructors
        .iter()
        .filter(|constructor| constructor.marker.is_some());
    match (marked.next(), marked.next()) {
        (Some(_), Some(_)) => Err(DependencyError::AmbiguousConstructor {
            type_name: metadata.type_info.name().to_string(),
        }),
        (Some(constructor), None) => Ok(constructor),
        (None, _) => metadata
            .constructors
            .iter()
            .find(|constructor| constructor.parameters.is_empty())
            .ok_or_else(|| DependencyError::NoSuitableConstructor {
                type_name: metadata.type_info.name().to_string(),
            }),
    }
}

/// 收集整条基础组件链的成员注入器
///
/// 顺序约定：基础组件的成员先于派生组件，同一组件内字段先于方法，
/// 各自按声明顺序。
pub(crate) fn build_members(
    container: &ContainerImpl,
    metadata: &'static ClassMetadata,
) -> DependencyResult<Vec<MemberInjector>> {
    let mut members = Vec::new();
    collect_members(container, metadata, &mut members)?;
    Ok(members)
}

fn collect_members(
    container: &ContainerImpl,
    metadata: &'static ClassMetadata,
    members: &mut Vec<MemberInjector>,
) -> DependencyResult<()> {
    if let Some(parent) = metadata.parent {
        collect_members(container, parent(), members)?;
    }

    for field in &metadata.fields {
        let key = Key::from_type_info(field.type_info, field.marker.name);
        let site = format!(
            "{}::{}",
            metadata.type_info.short_name(),
            field.field_name
        );
        match container.lookup(&key) {
            Some(factory) => members.push(MemberInjector::Field {
                external: ExternalContext::member(key, site),
                factory,
                set: field.set,
            }),
            None if field.marker.required => {
                return Err(DependencyError::MissingDependency {
                    key: key.to_string(),
                    site,
                });
            }
            None => {
                debug!(site = %site, key = %key, "可选字段依赖未注册，跳过");
            }
        }
    }

    for method in &metadata.methods {
        let site = format!(
            "{}::{}",
            metadata.type_info.short_name(),
            method.method_name
        );
        if method.parameters.is_empty() {
            return Err(DependencyError::NoParametersToInject { site });
        }

        let mut parameters = Vec::with_capacity(method.parameters.len());
        let mut missing = None;
        for parameter in &method.parameters {
            let key = parameter_key(parameter, method.marker.name);
            match container.lookup(&key) {
                Some(factory) => parameters.push(ParameterInjector {
                    external: ExternalContext::member(key, site.clone()),
                    factory,
                }),
                None => {
                    missing = Some(key);
                    break;
                }
            }
        }

        match missing {
            Some(key) if method.marker.required => {
                return Err(DependencyError::MissingDependency {
                    key: key.to_string(),
                    site,
                });
            }
            Some(key) => {
                debug!(site = %site, key = %key, "可选方法依赖未注册，整个方法跳过");
            }
            None => members.push(MemberInjector::Method {
                parameters,
                invoke: method.invoke,
            }),
        }
    }

    Ok(())
}

/// 参数绑定名：参数级覆盖优先，其次构造函数/方法标记的绑定名
fn parameter_key(parameter: &ParameterMetadata, default_name: &str) -> Key {
    let name = parameter.name.unwrap_or(default_name);
    Key::from_type_info(parameter.type_info, name)
}
