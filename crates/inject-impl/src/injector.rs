//! 参数与成员注入器
//!
//! 构造计划在建立时就把每个注入点解析到具体工厂，解析阶段只剩
//! 「压入位置 → 调工厂 → 写回目标」三步。

use crate::container::ContainerImpl;
use crate::context::{ExternalContext, InternalContext};
use crate::factory::InternalFactory;
use inject_common::{DependencyResult, FieldSetFn, InstanceHandle, MethodInvokeFn};
use std::sync::Arc;

/// 单个参数的注入器
///
/// 构造参数和方法参数共用。解析时以参数自身的位置替换当前解析位置，
/// 完成后恢复，保证错误信息指向真实的注入点。
pub(crate) struct ParameterInjector {
    pub(crate) external: ExternalContext,
    pub(crate) factory: Arc<dyn InternalFactory>,
}

impl ParameterInjector {
    pub(crate) fn resolve(
        &self,
        container: &ContainerImpl,
        ctx: &InternalContext,
    ) -> DependencyResult<InstanceHandle> {
        ctx.with_external(self.external.clone(), |ctx| {
            self.factory.create(container, ctx)
        })
    }
}

/// 单个成员（字段或方法）的注入器
pub(crate) enum MemberInjector {
    /// 字段注入：解析一个依赖后写入字段
    Field {
        external: ExternalContext,
        factory: Arc<dyn InternalFactory>,
        set: FieldSetFn,
    },
    /// 方法注入：解析全部参数后调用方法
    Method {
        parameters: Vec<ParameterInjector>,
        invoke: MethodInvokeFn,
    },
}

impl MemberInjector {
    /// 对目标实例实施本注入点
    pub(crate) fn apply(
        &self,
        container: &ContainerImpl,
        ctx: &InternalContext,
        target: &InstanceHandle,
    ) -> DependencyResult<()> {
        match self {
            Self::Field {
                external,
                factory,
                set,
            } => {
                let value = ctx.with_external(external.clone(), |ctx| {
                    factory.create(container, ctx)
                })?;
                set(target, value)
            }
            Self::Method { parameters, invoke } => {
                let mut arguments = Vec::with_capacity(parameters.len());
                for parameter in parameters {
                    arguments.push(parameter.resolve(container, ctx)?);
                }
                invoke(target, &arguments)
            }
        }
    }
}
