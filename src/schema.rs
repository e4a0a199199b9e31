//! Data-driven menu descriptions.
//!
//! A flattened serde form of the runtime item model: a `type` tag selects
//! the item kind (defaulting to a normal entry) and inline actions are
//! referenced by id, resolved against an [`ActionRegistry`] at load time.
//! Submenus are static nested lists here; they are wrapped in a callback so
//! the build path stays uniform with hand-written providers.
use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::item::{MenuAction, MenuEntry, MenuItem, MenuProvider};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuSchema {
    #[serde(default)]
    pub items: Vec<MenuItemSchema>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuItemSchema {
    #[serde(default, rename = "type")]
    pub kind: MenuItemKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub rel: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub submenu: Option<Vec<MenuItemSchema>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuItemKind {
    #[default]
    Normal,
    Separator,
    Header,
}

#[derive(Debug, Error)]
pub enum MenuSchemaError {
    #[error("menu schema parse error: {0}")]
    Parse(String),
    #[error("duplicate action id `{0}` in action registry")]
    DuplicateAction(String),
    #[error("unknown action `{action_id}` referenced by item `{label}`")]
    UnknownAction { label: String, action_id: String },
}

/// Maps schema action ids to runtime callbacks.
#[derive(Clone, Debug, Default)]
pub struct ActionRegistry {
    by_id: HashMap<String, MenuAction>,
}

impl ActionRegistry {
    pub fn from_entries<I, S>(entries: I) -> Result<Self, MenuSchemaError>
    where
        I: IntoIterator<Item = (S, MenuAction)>,
        S: Into<String>,
    {
        let mut by_id = HashMap::new();
        for (id, action) in entries {
            let id = id.into();
            if by_id.insert(id.clone(), action).is_some() {
                return Err(MenuSchemaError::DuplicateAction(id));
            }
        }
        Ok(Self { by_id })
    }

    pub fn resolve(&self, action_id: &str) -> Option<MenuAction> {
        self.by_id.get(action_id).cloned()
    }
}

impl MenuSchema {
    pub fn from_json(text: &str) -> Result<Self, MenuSchemaError> {
        serde_json::from_str(text).map_err(|err| MenuSchemaError::Parse(err.to_string()))
    }

    /// Resolves every action reference and returns runtime items in input
    /// order.
    pub fn resolve(&self, registry: &ActionRegistry) -> Result<Vec<MenuItem>, MenuSchemaError> {
        resolve_items(&self.items, registry)
    }

    /// Resolves once and serves the constant result on every trigger.
    pub fn into_provider(self, registry: &ActionRegistry) -> Result<MenuProvider, MenuSchemaError> {
        let items = self.resolve(registry)?;
        Ok(MenuProvider::constant(items))
    }
}

fn resolve_items(
    items: &[MenuItemSchema],
    registry: &ActionRegistry,
) -> Result<Vec<MenuItem>, MenuSchemaError> {
    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        resolved.push(match item.kind {
            MenuItemKind::Separator => MenuItem::Separator,
            MenuItemKind::Header => MenuItem::Header(item.text.clone()),
            MenuItemKind::Normal => MenuItem::Entry(resolve_entry(item, registry)?),
        });
    }
    Ok(resolved)
}

fn resolve_entry(
    item: &MenuItemSchema,
    registry: &ActionRegistry,
) -> Result<MenuEntry, MenuSchemaError> {
    let mut entry = MenuEntry::new(&item.text);
    if let Some(href) = &item.href {
        entry = entry.href(href);
    }
    if let Some(target) = &item.target {
        entry = entry.target(target);
    }
    if let Some(title) = &item.title {
        entry = entry.title(title);
    }
    if let Some(rel) = &item.rel {
        entry = entry.rel(rel);
    }
    if let Some(action_id) = &item.action {
        entry.action = Some(registry.resolve(action_id).ok_or_else(|| {
            MenuSchemaError::UnknownAction {
                label: item.text.clone(),
                action_id: action_id.clone(),
            }
        })?);
    }
    if let Some(submenu) = &item.submenu {
        let nested = resolve_items(submenu, registry)?;
        entry = entry.submenu(move |_| nested.clone());
    }
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::prelude::{Entity, Vec2};

    use crate::item::MenuContext;

    const SAMPLE: &str = r##"{
        "items": [
            {"type": "header", "text": "Sample header"},
            {"type": "separator"},
            {"text": "Item #1", "href": "#"},
            {"text": "Notify", "href": "#", "action": "notify"},
            {"text": "With submenu", "submenu": [
                {"text": "Sub #1", "href": "#"},
                {"type": "separator"},
                {"text": "Elsewhere", "href": "https://example.com", "target": "_blank"}
            ]}
        ]
    }"##;

    fn registry() -> ActionRegistry {
        ActionRegistry::from_entries([("notify", MenuAction::new(|_| {}))]).expect("registry")
    }

    #[test]
    fn sample_schema_resolves_in_input_order() {
        let schema = MenuSchema::from_json(SAMPLE).expect("parse");
        let items = schema.resolve(&registry()).expect("resolve");
        assert_eq!(items.len(), 5);
        assert!(matches!(&items[0], MenuItem::Header(text) if text == "Sample header"));
        assert!(matches!(items[1], MenuItem::Separator));
        let MenuItem::Entry(first) = &items[2] else {
            panic!("expected entry");
        };
        assert_eq!(first.label, "Item #1");
        assert_eq!(first.href, "#");
        let MenuItem::Entry(parent) = &items[4] else {
            panic!("expected entry");
        };
        let ctx = MenuContext {
            source: Entity::PLACEHOLDER,
            position: Vec2::ZERO,
        };
        let nested = parent.submenu.as_ref().expect("submenu").items(&ctx);
        assert_eq!(nested.len(), 3);
        let MenuItem::Entry(last) = &nested[2] else {
            panic!("expected entry");
        };
        assert_eq!(last.target, "_blank");
    }

    #[test]
    fn unknown_action_id_is_an_error() {
        let schema =
            MenuSchema::from_json(r#"{"items": [{"text": "Broken", "action": "missing"}]}"#)
                .expect("parse");
        let err = schema.resolve(&registry()).expect_err("unknown action");
        assert!(matches!(
            err,
            MenuSchemaError::UnknownAction { ref action_id, .. } if action_id == "missing"
        ));
    }

    #[test]
    fn duplicate_action_ids_are_rejected() {
        let err = ActionRegistry::from_entries([
            ("dup", MenuAction::new(|_| {})),
            ("dup", MenuAction::new(|_| {})),
        ])
        .expect_err("duplicate");
        assert!(matches!(err, MenuSchemaError::DuplicateAction(ref id) if id == "dup"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = MenuSchema::from_json(r#"{"items": [{"text": "x", "icon": "none"}]}"#)
            .expect_err("unknown field");
        assert!(matches!(err, MenuSchemaError::Parse(_)));
    }
}
