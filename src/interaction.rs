//! Trigger, dismiss and hover-reveal control flow.
//!
//! The live menu instance is explicit owned state in [`ActiveContextMenu`],
//! never a lookup by name: triggering removes every prior root before the
//! provider runs, which is the only serialization the single-instance
//! invariant needs. Submenu reveal is a per-panel pending intent that a
//! newer hover simply overwrites, so for any panel only the most recently
//! scheduled show/hide ever fires.
use bevy::{prelude::*, window::PrimaryWindow};

use crate::{
    builder::{collect_subtree, spawn_menu, MenuConfig, MenuLink, MenuNode, MenuRoot, MenuRow, MenuStyle},
    fade::FadeOut,
    item::{MenuAction, MenuContext, MenuProvider},
};

/// Button that opens the menu on a bound source.
pub const TRIGGER_BUTTON: MouseButton = MouseButton::Right;

/// Binding component: right-clicking this entity while it is hovered opens
/// the menu described by its provider.
///
/// Binding is live: sources spawned after plugin setup are picked up by
/// query at trigger time, nothing registers per-entity listeners.
#[derive(Component, Clone, Default)]
#[require(Interaction)]
pub struct ContextMenuSource {
    pub provider: MenuProvider,
    pub config: MenuConfig,
    pub style: MenuStyle,
}

impl ContextMenuSource {
    pub fn new(provider: MenuProvider) -> Self {
        Self {
            provider,
            ..default()
        }
    }

    pub fn with_show_delay(mut self, seconds: f32) -> Self {
        self.config.show_delay = seconds;
        self
    }

    pub fn with_hide_delay(mut self, seconds: f32) -> Self {
        self.config.hide_delay = seconds;
        self
    }

    pub fn with_min_width(mut self, pixels: f32) -> Self {
        self.config.min_width = pixels;
        self
    }

    pub fn with_fade_out(mut self, seconds: f32) -> Self {
        self.config.fade_out = seconds;
        self
    }

    pub fn with_container(mut self, name: impl Into<String>) -> Self {
        self.config.container = name.into();
        self
    }

    pub fn with_style(mut self, style: MenuStyle) -> Self {
        self.style = style;
        self
    }
}

/// Last known cursor position in window coordinates.
///
/// A resource so the menu systems and headless tests share one source of
/// pointer truth; when no window exists the stored value is left alone.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct PointerState {
    pub position: Option<Vec2>,
}

pub(crate) fn track_pointer(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut pointer: ResMut<PointerState>,
) {
    if let Some(window) = windows.iter().next() {
        pointer.position = window.cursor_position();
    }
}

/// Explicit owner of the single live menu instance.
#[derive(Resource, Debug, Default)]
pub struct ActiveContextMenu {
    open: Option<OpenMenu>,
}

#[derive(Debug)]
struct OpenMenu {
    root: Entity,
    hovered_row: Option<Entity>,
    suppress_release: Option<MouseButton>,
}

impl ActiveContextMenu {
    /// Root entity of the open instance, if any.
    pub fn root(&self) -> Option<Entity> {
        self.open.as_ref().map(|open| open.root)
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn begin(&mut self, root: Entity, trigger_button: MouseButton) {
        self.open = Some(OpenMenu {
            root,
            hovered_row: None,
            suppress_release: Some(trigger_button),
        });
    }

    fn clear(&mut self) {
        self.open = None;
    }

    /// Records `row` as hovered; true when it differs from the last one.
    fn note_hovered_row(&mut self, row: Entity) -> bool {
        let Some(open) = self.open.as_mut() else {
            return false;
        };
        if open.hovered_row == Some(row) {
            return false;
        }
        open.hovered_row = Some(row);
        true
    }

    /// Consumes the one-shot release suppression for `button`.
    ///
    /// The release ending the opening press lands on the fresh menu and must
    /// not dismiss it; any later release of the same button behaves normally.
    fn take_suppressed_release(&mut self, button: MouseButton) -> bool {
        match self.open.as_mut() {
            Some(open) if open.suppress_release == Some(button) => {
                open.suppress_release = None;
                true
            }
            _ => false,
        }
    }
}

/// Nested list panel revealed on hover, with its pending reveal intent.
#[derive(Component, Clone, Debug, Default)]
pub struct SubmenuPanel {
    pending: Option<PendingReveal>,
}

impl SubmenuPanel {
    pub fn pending(&self) -> Option<PendingReveal> {
        self.pending
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingReveal {
    pub show: bool,
    pub remaining: f32,
}

/// A new hover intent supersedes whatever was pending on this panel.
pub(crate) fn reduce_reveal_intent(panel: &mut SubmenuPanel, show: bool, delay: f32) {
    panel.pending = Some(PendingReveal {
        show,
        remaining: delay.max(0.0),
    });
}

/// Advances the pending intent; returns the reveal decision once due.
pub(crate) fn tick_reveal_intent(panel: &mut SubmenuPanel, delta_seconds: f32) -> Option<bool> {
    let pending = panel.pending.as_mut()?;
    pending.remaining -= delta_seconds.max(0.0);
    if pending.remaining > 0.0 {
        return None;
    }
    let show = pending.show;
    panel.pending = None;
    Some(show)
}

/// Written when a pointer-up lands on an actionable row of the open menu.
#[derive(Message, Debug, Clone)]
pub struct MenuActivated {
    pub source: Entity,
    pub item: Entity,
    pub link: MenuLink,
}

fn subtree_hovered(nodes: &Query<(&Interaction, &MenuNode)>, root: Entity) -> bool {
    nodes.iter().any(|(interaction, node)| {
        node.root == root && matches!(interaction, Interaction::Hovered | Interaction::Pressed)
    })
}

fn fade_duration(configs: &Query<&MenuConfig, With<MenuRoot>>, root: Entity) -> f32 {
    configs
        .get(root)
        .map(|config| config.fade_out)
        .unwrap_or_else(|_| MenuConfig::default().fade_out)
}

/// Idle → Open: opens (or replaces) the menu on a right-click over a bound
/// source.
pub(crate) fn open_on_trigger(
    mut commands: Commands,
    buttons: Res<ButtonInput<MouseButton>>,
    pointer: Res<PointerState>,
    mut active: ResMut<ActiveContextMenu>,
    sources: Query<(Entity, &ContextMenuSource, &Interaction)>,
    roots: Query<Entity, With<MenuRoot>>,
) {
    if !buttons.just_pressed(TRIGGER_BUTTON) {
        return;
    }
    let Some((source_entity, source, _)) = sources.iter().find(|(_, _, interaction)| {
        matches!(interaction, Interaction::Hovered | Interaction::Pressed)
    }) else {
        return;
    };
    let Some(position) = pointer.position else {
        return;
    };

    // Remove-before-create: every prior root goes away, fading ones
    // included, before the provider gets a chance to run.
    for root in roots.iter() {
        commands.entity(root).despawn();
    }
    active.clear();

    let ctx = MenuContext {
        source: source_entity,
        position,
    };
    let items = match source.provider.build(&ctx) {
        Ok(items) => items,
        Err(err) => {
            warn!("context menu provider failed for {source_entity:?}: {err}");
            return;
        }
    };

    let root = spawn_menu(&mut commands, &items, ctx, &source.config, &source.style);
    active.begin(root, TRIGGER_BUTTON);
}

/// Open → Idle: a pointer-down outside the instance subtree starts the
/// fade-out. Presses inside are swallowed by the menu's focus policy and
/// never dismiss.
pub(crate) fn dismiss_on_outside_press(
    mut commands: Commands,
    buttons: Res<ButtonInput<MouseButton>>,
    mut active: ResMut<ActiveContextMenu>,
    nodes: Query<(&Interaction, &MenuNode)>,
    configs: Query<&MenuConfig, With<MenuRoot>>,
) {
    if buttons.get_just_pressed().next().is_none() {
        return;
    }
    let Some(root) = active.root() else {
        return;
    };
    if subtree_hovered(&nodes, root) {
        return;
    }
    commands
        .entity(root)
        .insert(FadeOut::new(fade_duration(&configs, root)));
    active.clear();
}

/// Open → Idle: a pointer-up inside the instance dismisses it; when it
/// lands on an actionable row the action fires first.
pub(crate) fn activate_on_release(
    mut commands: Commands,
    buttons: Res<ButtonInput<MouseButton>>,
    mut active: ResMut<ActiveContextMenu>,
    nodes: Query<(&Interaction, &MenuNode)>,
    rows: Query<(Entity, &Interaction, &MenuNode, &MenuLink, Option<&MenuAction>), With<MenuRow>>,
    roots: Query<&MenuRoot>,
    configs: Query<&MenuConfig, With<MenuRoot>>,
    mut activations: MessageWriter<MenuActivated>,
) {
    let released: Vec<MouseButton> = buttons.get_just_released().copied().collect();
    if released.is_empty() {
        return;
    }
    let Some(root) = active.root() else {
        return;
    };
    // Disarm one-shot suppressions no matter where the release lands.
    let mut suppressed = 0;
    for button in &released {
        if active.take_suppressed_release(*button) {
            suppressed += 1;
        }
    }
    if !subtree_hovered(&nodes, root) {
        return;
    }
    if suppressed == released.len() {
        return;
    }

    if let Ok(menu_root) = roots.get(root) {
        let ctx = menu_root.context;
        if let Some((item, _, _, link, action)) =
            rows.iter().find(|(_, interaction, node, _, _)| {
                node.root == root
                    && matches!(interaction, Interaction::Hovered | Interaction::Pressed)
            })
        {
            if let Some(action) = action {
                action.run(&ctx);
            }
            activations.write(MenuActivated {
                source: ctx.source,
                item,
                link: link.clone(),
            });
        }
    }

    commands
        .entity(root)
        .insert(FadeOut::new(fade_duration(&configs, root)));
    active.clear();
}

/// Open → Open: when the hovered row changes, schedule sibling-level
/// panels. The hovered row's own panel goes toward visible, the rest
/// toward hidden.
pub(crate) fn schedule_submenu_reveal(
    mut active: ResMut<ActiveContextMenu>,
    configs: Query<&MenuConfig, With<MenuRoot>>,
    rows: Query<(Entity, &Interaction, &MenuNode, &ChildOf), With<MenuRow>>,
    mut panels: Query<(&mut SubmenuPanel, &ChildOf)>,
    parents: Query<&ChildOf>,
) {
    let Some(root) = active.root() else {
        return;
    };
    let Some((hovered_row, row_parent)) = rows
        .iter()
        .find(|(_, interaction, node, _)| {
            node.root == root
                && matches!(interaction, Interaction::Hovered | Interaction::Pressed)
        })
        .map(|(entity, _, _, child_of)| (entity, child_of))
    else {
        return;
    };
    if !active.note_hovered_row(hovered_row) {
        return;
    }
    let Ok(config) = configs.get(root) else {
        return;
    };
    let hovered_list = row_parent.parent();

    for (mut panel, panel_parent) in panels.iter_mut() {
        let owner_row = panel_parent.parent();
        let Ok(owner_list) = parents.get(owner_row) else {
            continue;
        };
        if owner_list.parent() != hovered_list {
            continue;
        }
        let show = owner_row == hovered_row;
        let delay = if show {
            config.show_delay
        } else {
            config.hide_delay
        };
        reduce_reveal_intent(&mut panel, show, delay);
    }
}

/// Drains due reveal intents against real time.
///
/// Toggling a panel also resets every descendant panel to hidden, so a
/// re-shown branch starts collapsed instead of exposing whatever was open
/// further down the last time.
pub(crate) fn apply_submenu_reveal(
    time: Res<Time<Real>>,
    children: Query<&Children>,
    mut panels: Query<(Entity, &mut SubmenuPanel, &mut Visibility)>,
) {
    let delta_seconds = time.delta_secs();
    let mut toggled: Vec<(Entity, bool)> = Vec::new();
    for (entity, mut panel, _) in panels.iter_mut() {
        if let Some(show) = tick_reveal_intent(&mut panel, delta_seconds) {
            toggled.push((entity, show));
        }
    }
    for (entity, show) in toggled {
        if let Ok((_, _, mut visibility)) = panels.get_mut(entity) {
            *visibility = if show {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
        }
        for descendant in collect_subtree(entity, &children) {
            if descendant == entity {
                continue;
            }
            if let Ok((_, mut panel, mut visibility)) = panels.get_mut(descendant) {
                panel.pending = None;
                *visibility = Visibility::Hidden;
            }
        }
    }
}

/// Presentation only: highlights the hovered actionable row.
pub(crate) fn highlight_hovered_rows(
    active: Res<ActiveContextMenu>,
    styles: Query<&MenuStyle, With<MenuRoot>>,
    mut rows: Query<
        (&Interaction, &MenuNode, &mut BackgroundColor),
        (With<MenuRow>, With<MenuLink>),
    >,
) {
    let Some(root) = active.root() else {
        return;
    };
    let Ok(style) = styles.get(root) else {
        return;
    };
    for (interaction, node, mut background) in rows.iter_mut() {
        if node.root != root {
            continue;
        }
        let target = match interaction {
            Interaction::None => Color::NONE,
            _ => style.hovered_background,
        };
        if background.0 != target {
            background.0 = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_hover_intent_supersedes_pending_show() {
        let mut panel = SubmenuPanel::default();
        reduce_reveal_intent(&mut panel, true, 0.3);
        assert_eq!(tick_reveal_intent(&mut panel, 0.1), None);

        // A sibling is hovered before the show fires: only the newest intent
        // survives.
        reduce_reveal_intent(&mut panel, false, 0.2);
        assert_eq!(tick_reveal_intent(&mut panel, 0.1), None);
        assert_eq!(tick_reveal_intent(&mut panel, 0.1), Some(false));
        assert_eq!(tick_reveal_intent(&mut panel, 1.0), None);
    }

    #[test]
    fn zero_delay_intent_fires_on_the_next_tick() {
        let mut panel = SubmenuPanel::default();
        reduce_reveal_intent(&mut panel, true, 0.0);
        assert_eq!(tick_reveal_intent(&mut panel, 0.0), Some(true));
    }

    #[test]
    fn negative_delays_are_clamped() {
        let mut panel = SubmenuPanel::default();
        reduce_reveal_intent(&mut panel, true, -1.0);
        assert_eq!(
            panel.pending(),
            Some(PendingReveal {
                show: true,
                remaining: 0.0
            })
        );
        assert_eq!(tick_reveal_intent(&mut panel, -0.5), Some(true));
    }

    #[test]
    fn active_menu_tracks_hovered_row_changes() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        let row_a = world.spawn_empty().id();
        let row_b = world.spawn_empty().id();

        let mut active = ActiveContextMenu::default();
        assert!(!active.note_hovered_row(row_a));

        active.begin(root, TRIGGER_BUTTON);
        assert_eq!(active.root(), Some(root));
        assert!(active.note_hovered_row(row_a));
        assert!(!active.note_hovered_row(row_a));
        assert!(active.note_hovered_row(row_b));
        assert!(active.note_hovered_row(row_a));
    }

    #[test]
    fn release_suppression_is_one_shot_and_button_specific() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        let mut active = ActiveContextMenu::default();
        active.begin(root, TRIGGER_BUTTON);

        assert!(!active.take_suppressed_release(MouseButton::Left));
        assert!(active.take_suppressed_release(TRIGGER_BUTTON));
        assert!(!active.take_suppressed_release(TRIGGER_BUTTON));

        active.clear();
        assert!(!active.is_open());
        assert!(!active.take_suppressed_release(TRIGGER_BUTTON));
    }
}
