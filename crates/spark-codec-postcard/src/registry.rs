//! 命名类型注册表。
//!
//! # 教案定位（Why）
//! - 递归类型（例如链表节点引用自身）无法用纯值语义的 `Schema` 树直接表达，
//!   需要一个名称到 Schema 的间接层：`Schema::Named("Node")` 在遍历时才解析；
//! - 注册表还承担"类型声明集合"的角色，TCK 与上层工具可以按名称枚举全部已注册类型。
//!
//! # 契约说明（What）
//! - 名称全局唯一，重复注册返回 [`CodecError::DuplicateType`]；
//! - 解析未注册名称返回 [`CodecError::UnknownType`]；
//! - 注册顺序被保留，[`SchemaRegistry::names`] 按注册顺序返回。
//!
//! # 实现策略（How）
//! - 以 `BTreeMap` 做名称索引、`Vec` 记录顺序，保证在 `no_std + alloc` 下可用且迭代确定。

use alloc::{
    collections::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};

use crate::{
    error::CodecError,
    schema::{EnumSchema, Schema, StructSchema},
};

/// 名称到 Schema 的注册表。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    types: BTreeMap<String, Schema>,
    order: Vec<String>,
}

impl SchemaRegistry {
    /// 创建空注册表。
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 以 `name` 注册任意 Schema。
    pub fn register(&mut self, name: impl Into<String>, schema: Schema) -> Result<(), CodecError> {
        let name = name.into();
        if self.types.contains_key(&name) {
            return Err(CodecError::DuplicateType { name });
        }
        self.order.push(name.clone());
        self.types.insert(name, schema);
        Ok(())
    }

    /// 以结构体自身的类型名注册。
    pub fn register_struct(&mut self, schema: StructSchema) -> Result<(), CodecError> {
        let name = schema.name.clone();
        self.register(name, Schema::Struct(schema))
    }

    /// 以枚举自身的类型名注册。
    pub fn register_enum(&mut self, schema: EnumSchema) -> Result<(), CodecError> {
        let name = schema.name.clone();
        self.register(name, Schema::Enum(schema))
    }

    /// 按名称解析。
    pub fn resolve(&self, name: &str) -> Result<&Schema, CodecError> {
        self.types.get(name).ok_or_else(|| CodecError::UnknownType {
            name: name.to_string(),
        })
    }

    /// 是否已注册。
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// 已注册类型数量。
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// 注册表是否为空。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 按注册顺序返回全部名称。
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::IntKind;

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = SchemaRegistry::new();
        registry
            .register_struct(StructSchema::new("S").field("a", IntKind::U8))
            .expect("首次注册");
        assert_eq!(
            registry.register("S", Schema::Bool),
            Err(CodecError::DuplicateType { name: "S".into() })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn resolve_unknown_reports_name() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.resolve("Missing"),
            Err(CodecError::UnknownType {
                name: "Missing".into()
            })
        );
    }

    #[test]
    fn names_keep_registration_order() {
        let mut registry = SchemaRegistry::new();
        registry
            .register_enum(EnumSchema::new("Zeta").unit_variant("A"))
            .expect("注册枚举");
        registry.register("Alpha", Schema::Unit).expect("注册单元");
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, ["Zeta", "Alpha"]);
        assert!(registry.contains("Alpha"));
        assert!(matches!(
            registry.resolve("Zeta"),
            Ok(Schema::Enum(_))
        ));
    }
}
