//! Declarative menu data model.
//!
//! Everything here is permissive by design: missing fields fall back to
//! empty strings or the `"_self"` target, and nothing fails except a
//! provider that declares itself fallible. The only behavioral truth a
//! provider owns is the item list it returns; layout, timing and teardown
//! live in the builder and interaction modules.
use std::{fmt, sync::Arc};

use bevy::prelude::*;
use thiserror::Error;

/// Navigation target used when an entry does not override it.
pub const DEFAULT_TARGET: &str = "_self";

/// Opaque description of what was right-clicked.
///
/// Passed to the menu provider and to every submenu callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MenuContext {
    /// Entity the trigger gesture landed on.
    pub source: Entity,
    /// Pointer position at trigger time, in window coordinates.
    pub position: Vec2,
}

/// One position of a menu, possibly nesting a submenu.
#[derive(Clone)]
pub enum MenuItem {
    /// An actionable row with a label and navigation metadata.
    Entry(MenuEntry),
    /// A thin non-interactive rule.
    Separator,
    /// A non-interactive caption row.
    Header(String),
}

impl MenuItem {
    /// Starts building an actionable entry. Finish with [`MenuEntry::into`].
    pub fn entry(label: impl Into<String>) -> MenuEntry {
        MenuEntry::new(label)
    }

    pub fn separator() -> Self {
        Self::Separator
    }

    pub fn header(text: impl Into<String>) -> Self {
        Self::Header(text.into())
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry(entry) => f.debug_tuple("Entry").field(entry).finish(),
            Self::Separator => write!(f, "Separator"),
            Self::Header(text) => f.debug_tuple("Header").field(text).finish(),
        }
    }
}

impl From<MenuEntry> for MenuItem {
    fn from(entry: MenuEntry) -> Self {
        Self::Entry(entry)
    }
}

/// An actionable menu entry.
///
/// `href` is carried verbatim into the activation message; an empty string
/// is a no-op link, never an error.
#[derive(Clone)]
pub struct MenuEntry {
    pub label: String,
    pub href: String,
    pub target: String,
    pub title: String,
    pub rel: String,
    pub action: Option<MenuAction>,
    pub submenu: Option<SubmenuProvider>,
}

impl MenuEntry {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: String::new(),
            target: DEFAULT_TARGET.to_string(),
            title: String::new(),
            rel: String::new(),
            action: None,
            submenu: None,
        }
    }

    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.href = href.into();
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = rel.into();
        self
    }

    /// Inline action executed when the entry is activated, before the
    /// activation message is written.
    pub fn on_activate(mut self, action: impl Fn(&MenuContext) + Send + Sync + 'static) -> Self {
        self.action = Some(MenuAction::new(action));
        self
    }

    /// Nested item list, invoked once per build of the owning menu.
    pub fn submenu(
        mut self,
        submenu: impl Fn(&MenuContext) -> Vec<MenuItem> + Send + Sync + 'static,
    ) -> Self {
        self.submenu = Some(SubmenuProvider::new(submenu));
        self
    }

    pub fn has_submenu(&self) -> bool {
        self.submenu.is_some()
    }
}

impl fmt::Debug for MenuEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuEntry")
            .field("label", &self.label)
            .field("href", &self.href)
            .field("target", &self.target)
            .field("title", &self.title)
            .field("rel", &self.rel)
            .field("action", &self.action.is_some())
            .field("submenu", &self.submenu.is_some())
            .finish()
    }
}

/// Shared inline activation callback; also attached as a component to the
/// spawned row so the release handler can run it.
#[derive(Component, Clone)]
pub struct MenuAction(Arc<dyn Fn(&MenuContext) + Send + Sync>);

impl MenuAction {
    pub fn new(action: impl Fn(&MenuContext) + Send + Sync + 'static) -> Self {
        Self(Arc::new(action))
    }

    pub fn run(&self, ctx: &MenuContext) {
        (self.0)(ctx)
    }
}

impl fmt::Debug for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MenuAction")
    }
}

/// Callback producing the nested item list of one entry.
#[derive(Clone)]
pub struct SubmenuProvider(Arc<dyn Fn(&MenuContext) -> Vec<MenuItem> + Send + Sync>);

impl SubmenuProvider {
    pub fn new(provider: impl Fn(&MenuContext) -> Vec<MenuItem> + Send + Sync + 'static) -> Self {
        Self(Arc::new(provider))
    }

    pub fn items(&self, ctx: &MenuContext) -> Vec<MenuItem> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for SubmenuProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubmenuProvider")
    }
}

#[derive(Debug, Error)]
pub enum MenuDataError {
    #[error("menu data provider failed: {0}")]
    Provider(String),
}

/// Caller-supplied menu data source.
///
/// The default provider serves an empty list, so a source component with no
/// provider opens nothing rather than failing.
#[derive(Clone)]
pub struct MenuProvider(Arc<dyn Fn(&MenuContext) -> Result<Vec<MenuItem>, MenuDataError> + Send + Sync>);

impl Default for MenuProvider {
    fn default() -> Self {
        Self::items(|_| Vec::new())
    }
}

impl MenuProvider {
    /// Infallible provider.
    pub fn items(provider: impl Fn(&MenuContext) -> Vec<MenuItem> + Send + Sync + 'static) -> Self {
        Self(Arc::new(move |ctx| Ok(provider(ctx))))
    }

    /// Provider that may refuse to produce a menu. A refusal at trigger time
    /// leaves no menu instance attached.
    pub fn fallible(
        provider: impl Fn(&MenuContext) -> Result<Vec<MenuItem>, MenuDataError> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(provider))
    }

    /// Serves the same list on every trigger.
    pub fn constant(items: Vec<MenuItem>) -> Self {
        Self(Arc::new(move |_| Ok(items.clone())))
    }

    pub fn build(&self, ctx: &MenuContext) -> Result<Vec<MenuItem>, MenuDataError> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for MenuProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MenuProvider")
    }
}
