//! Nestable right-click popup menus for `bevy_ui`.
//!
//! Attach a [`ContextMenuSource`] to any UI node; right-clicking it opens a
//! menu at the pointer, built from the items its [`MenuProvider`] returns.
//! At most one menu instance exists at a time. Entries can nest submenus,
//! revealed after a hover delay and hidden again when a sibling row takes
//! the hover. Pressing outside the menu, or releasing inside it, dismisses
//! the instance through a short fade.
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_context_menu::{ContextMenuPlugin, ContextMenuSource, MenuItem, MenuProvider};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins((DefaultPlugins, ContextMenuPlugin))
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     commands.spawn(Camera2d);
//!     commands.spawn((
//!         Node {
//!             width: Val::Percent(100.0),
//!             height: Val::Percent(100.0),
//!             ..default()
//!         },
//!         ContextMenuSource::new(MenuProvider::items(|_| {
//!             vec![
//!                 MenuItem::entry("Open").href("#open").into(),
//!                 MenuItem::separator(),
//!                 MenuItem::entry("Share")
//!                     .submenu(|_| vec![MenuItem::entry("Copy link").href("#copy").into()])
//!                     .into(),
//!             ]
//!         })),
//!     ));
//! }
//! ```

mod builder;
mod fade;
mod interaction;
mod item;
mod schema;


pub use builder::{
    HasSubmenu, MenuConfig, MenuHeader, MenuLink, MenuList, MenuNode, MenuRoot, MenuRow,
    MenuSeparator, MenuStyle, DEFAULT_CONTAINER_NAME,
};
pub use fade::FadeOut;
pub use interaction::{
    ActiveContextMenu, ContextMenuSource, MenuActivated, PendingReveal, PointerState,
    SubmenuPanel, TRIGGER_BUTTON,
};
pub use item::{
    MenuAction, MenuContext, MenuDataError, MenuEntry, MenuItem, MenuProvider, SubmenuProvider,
    DEFAULT_TARGET,
};
pub use schema::{ActionRegistry, MenuItemKind, MenuItemSchema, MenuSchema, MenuSchemaError};

use bevy::prelude::*;

/// Ordering labels for the menu systems, chained within `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextMenuSystem {
    /// Pointer position bookkeeping.
    Pointer,
    /// Outside-press and release handling of the open instance.
    Dismiss,
    /// Trigger detection and menu construction.
    Trigger,
    /// Submenu reveal scheduling and application.
    Reveal,
    /// Hover highlighting.
    Visuals,
    /// Fade-out teardown.
    Fade,
}

pub struct ContextMenuPlugin;

impl Plugin for ContextMenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<interaction::PointerState>()
            .init_resource::<interaction::ActiveContextMenu>()
            .init_resource::<ButtonInput<MouseButton>>()
            .add_message::<interaction::MenuActivated>()
            .configure_sets(
                Update,
                (
                    ContextMenuSystem::Pointer,
                    ContextMenuSystem::Dismiss,
                    ContextMenuSystem::Trigger,
                    ContextMenuSystem::Reveal,
                    ContextMenuSystem::Visuals,
                    ContextMenuSystem::Fade,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    interaction::track_pointer.in_set(ContextMenuSystem::Pointer),
                    (
                        interaction::dismiss_on_outside_press,
                        interaction::activate_on_release,
                    )
                        .chain()
                        .in_set(ContextMenuSystem::Dismiss),
                    interaction::open_on_trigger.in_set(ContextMenuSystem::Trigger),
                    (
                        interaction::schedule_submenu_reveal,
                        interaction::apply_submenu_reveal,
                    )
                        .chain()
                        .in_set(ContextMenuSystem::Reveal),
                    interaction::highlight_hovered_rows.in_set(ContextMenuSystem::Visuals),
                    fade::tick_fade_out.in_set(ContextMenuSystem::Fade),
                ),
            );
    }
}
