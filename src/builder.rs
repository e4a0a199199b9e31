//! Menu tree construction.
//!
//! Turns a declarative item list into a nested `bevy_ui` subtree. Every
//! node carries [`MenuNode`] pointing back at its root, so later systems
//! can answer "is this inside the live instance" without walking the
//! hierarchy. Structural markers (`MenuSeparator`, `MenuHeader`,
//! `HasSubmenu`) exist for host queries and styling hooks; pixel styling
//! comes from [`MenuStyle`].
use bevy::{
    prelude::*,
    ui::{FocusPolicy, GlobalZIndex},
};
use smallvec::SmallVec;

use crate::{
    interaction::SubmenuPanel,
    item::{MenuContext, MenuItem},
};

/// Default `Name` of the root container entity.
pub const DEFAULT_CONTAINER_NAME: &str = "context-menu";

/// Timing and layout knobs of one menu binding.
///
/// `min_width` doubles as the horizontal offset of nested panels, keeping a
/// submenu flush with the right edge of its parent row.
#[derive(Component, Clone, Debug)]
pub struct MenuConfig {
    /// Seconds before a hovered row's submenu is revealed.
    pub show_delay: f32,
    /// Seconds before a no-longer-hovered sibling submenu is hidden.
    pub hide_delay: f32,
    /// Minimum width of every list level, in pixels.
    pub min_width: f32,
    /// Seconds of fade-out before the dismissed menu is despawned.
    pub fade_out: f32,
    /// `Name` given to the root container entity.
    pub container: String,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            show_delay: 0.3,
            hide_delay: 0.2,
            min_width: 150.0,
            fade_out: 0.05,
            container: DEFAULT_CONTAINER_NAME.to_string(),
        }
    }
}

#[derive(Component, Clone, Debug)]
pub struct MenuStyle {
    pub background: Color,
    pub text_color: Color,
    pub header_color: Color,
    pub separator_color: Color,
    pub hovered_background: Color,
    pub font_size: f32,
    pub row_padding: UiRect,
    pub separator_margin: UiRect,
    pub z_index: i32,
}

impl Default for MenuStyle {
    fn default() -> Self {
        Self {
            background: Color::srgb(0.13, 0.13, 0.14),
            text_color: Color::srgb(0.92, 0.92, 0.92),
            header_color: Color::srgb(0.62, 0.62, 0.66),
            separator_color: Color::srgb(0.34, 0.34, 0.38),
            hovered_background: Color::srgb(0.24, 0.24, 0.28),
            font_size: 14.0,
            row_padding: UiRect::axes(Val::Px(12.0), Val::Px(5.0)),
            separator_margin: UiRect::axes(Val::Px(4.0), Val::Px(4.0)),
            z_index: 1000,
        }
    }
}

/// Root node of the single live menu instance.
#[derive(Component, Clone, Copy, Debug)]
pub struct MenuRoot {
    pub context: MenuContext,
}

/// Present on every node of a menu subtree; points back at the root.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuNode {
    pub root: Entity,
}

/// One list level.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct MenuList;

/// A hoverable row. Entries, separators and headers all participate in
/// hover arbitration; only rows with a [`MenuLink`] are actionable.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct MenuRow;

#[derive(Component, Clone, Copy, Debug, Default)]
pub struct MenuSeparator;

#[derive(Component, Clone, Copy, Debug, Default)]
pub struct MenuHeader;

/// "more" marker: this row nests a submenu panel.
#[derive(Component, Clone, Copy, Debug)]
pub struct HasSubmenu {
    pub panel: Entity,
}

/// Navigation metadata of an actionable row, echoed in the activation
/// message. An empty `href` is a no-op link.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct MenuLink {
    pub href: String,
    pub target: String,
    pub title: String,
    pub rel: String,
}

/// Spawns the whole menu tree for `items`, rooted at the trigger position.
///
/// Submenu callbacks are invoked here, once, eagerly; hover only toggles
/// visibility of panels that already exist.
pub(crate) fn spawn_menu(
    commands: &mut Commands,
    items: &[MenuItem],
    ctx: MenuContext,
    config: &MenuConfig,
    style: &MenuStyle,
) -> Entity {
    let root = commands
        .spawn((
            Name::new(config.container.clone()),
            MenuRoot { context: ctx },
            config.clone(),
            style.clone(),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(ctx.position.x),
                top: Val::Px(ctx.position.y),
                ..default()
            },
            GlobalZIndex(style.z_index),
            FocusPolicy::Block,
            Interaction::default(),
            BackgroundColor(Color::NONE),
        ))
        .id();
    commands.entity(root).insert(MenuNode { root });
    let list = spawn_list(commands, items, &ctx, config, style, root);
    commands.entity(root).add_child(list);
    root
}

fn spawn_list(
    commands: &mut Commands,
    items: &[MenuItem],
    ctx: &MenuContext,
    config: &MenuConfig,
    style: &MenuStyle,
    root: Entity,
) -> Entity {
    let list = commands
        .spawn((
            Name::new("menu-list"),
            MenuList,
            MenuNode { root },
            Node {
                flex_direction: FlexDirection::Column,
                min_width: Val::Px(config.min_width),
                ..default()
            },
            FocusPolicy::Block,
            Interaction::default(),
            BackgroundColor(style.background),
        ))
        .id();
    for item in items {
        let row = match item {
            MenuItem::Separator => spawn_separator(commands, style, root),
            MenuItem::Header(text) => spawn_header(commands, text, style, root),
            MenuItem::Entry(entry) => spawn_entry(commands, entry, ctx, config, style, root),
        };
        commands.entity(list).add_child(row);
    }
    list
}

fn spawn_separator(commands: &mut Commands, style: &MenuStyle, root: Entity) -> Entity {
    commands
        .spawn((
            Name::new("menu-separator"),
            MenuRow,
            MenuSeparator,
            MenuNode { root },
            Node {
                height: Val::Px(1.0),
                margin: style.separator_margin,
                ..default()
            },
            FocusPolicy::Block,
            Interaction::default(),
            BackgroundColor(style.separator_color),
        ))
        .id()
}

fn spawn_header(commands: &mut Commands, text: &str, style: &MenuStyle, root: Entity) -> Entity {
    let row = commands
        .spawn((
            Name::new("menu-header"),
            MenuRow,
            MenuHeader,
            MenuNode { root },
            Node {
                padding: style.row_padding,
                ..default()
            },
            FocusPolicy::Block,
            Interaction::default(),
            BackgroundColor(Color::NONE),
        ))
        .id();
    let label = commands
        .spawn((
            Text::new(text),
            TextFont {
                font_size: style.font_size,
                ..default()
            },
            TextColor(style.header_color),
            MenuNode { root },
        ))
        .id();
    commands.entity(row).add_child(label);
    row
}

fn spawn_entry(
    commands: &mut Commands,
    entry: &crate::item::MenuEntry,
    ctx: &MenuContext,
    config: &MenuConfig,
    style: &MenuStyle,
    root: Entity,
) -> Entity {
    let row = commands
        .spawn((
            Name::new("menu-item"),
            MenuRow,
            MenuNode { root },
            MenuLink {
                href: entry.href.clone(),
                target: entry.target.clone(),
                title: entry.title.clone(),
                rel: entry.rel.clone(),
            },
            Node {
                padding: style.row_padding,
                justify_content: JustifyContent::SpaceBetween,
                align_items: AlignItems::Center,
                column_gap: Val::Px(8.0),
                ..default()
            },
            FocusPolicy::Block,
            Interaction::default(),
            BackgroundColor(Color::NONE),
        ))
        .id();
    if let Some(action) = &entry.action {
        commands.entity(row).insert(action.clone());
    }
    let label = commands
        .spawn((
            Text::new(entry.label.clone()),
            TextFont {
                font_size: style.font_size,
                ..default()
            },
            TextColor(style.text_color),
            MenuNode { root },
        ))
        .id();
    commands.entity(row).add_child(label);

    if let Some(submenu) = &entry.submenu {
        let glyph = commands
            .spawn((
                Text::new("\u{203a}"),
                TextFont {
                    font_size: style.font_size,
                    ..default()
                },
                TextColor(style.text_color),
                MenuNode { root },
            ))
            .id();
        commands.entity(row).add_child(glyph);

        let nested = submenu.items(ctx);
        let panel = commands
            .spawn((
                Name::new("menu-submenu"),
                SubmenuPanel::default(),
                MenuNode { root },
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(config.min_width),
                    top: Val::Px(0.0),
                    ..default()
                },
                Visibility::Hidden,
                FocusPolicy::Block,
            ))
            .id();
        let nested_list = spawn_list(commands, &nested, ctx, config, style, root);
        commands.entity(panel).add_child(nested_list);
        commands.entity(row).add_child(panel);
        commands.entity(row).insert(HasSubmenu { panel });
    }
    row
}

/// Depth-first collection of a menu subtree, root included.
pub(crate) fn collect_subtree(
    root: Entity,
    children_query: &Query<&Children>,
) -> SmallVec<[Entity; 16]> {
    let mut out: SmallVec<[Entity; 16]> = SmallVec::new();
    let mut stack: SmallVec<[Entity; 16]> = SmallVec::new();
    stack.push(root);
    while let Some(entity) = stack.pop() {
        out.push(entity);
        if let Ok(children) = children_query.get(entity) {
            stack.extend(children.iter());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{MenuAction, MenuEntry};
    use bevy::ecs::world::CommandQueue;

    fn build(world: &mut World, items: &[MenuItem], position: Vec2) -> Entity {
        let source = world.spawn_empty().id();
        let ctx = MenuContext { source, position };
        let config = MenuConfig::default();
        let style = MenuStyle::default();
        let mut queue = CommandQueue::default();
        let mut commands = Commands::new(&mut queue, world);
        let root = spawn_menu(&mut commands, items, ctx, &config, &style);
        queue.apply(world);
        root
    }

    fn sample_items() -> Vec<MenuItem> {
        vec![
            MenuItem::entry("A").href("#").into(),
            MenuItem::separator(),
            MenuItem::entry("B")
                .href("#")
                .submenu(|_| vec![MenuItem::entry("B1").href("#").into()])
                .into(),
        ]
    }

    fn rows_of(world: &World, list: Entity) -> Vec<Entity> {
        world
            .get::<Children>(list)
            .expect("list children")
            .iter()
            .collect()
    }

    fn row_label(world: &World, row: Entity) -> String {
        world
            .get::<Children>(row)
            .expect("row children")
            .iter()
            .find_map(|child| world.get::<Text>(child).map(|text| text.0.clone()))
            .expect("row label")
    }

    #[test]
    fn built_tree_preserves_input_order() {
        let mut world = World::new();
        let root = build(&mut world, &sample_items(), Vec2::new(10.0, 20.0));

        let node = world.get::<Node>(root).expect("root node");
        assert_eq!(node.left, Val::Px(10.0));
        assert_eq!(node.top, Val::Px(20.0));

        let list = world.get::<Children>(root).expect("root children")[0];
        assert!(world.entity(list).contains::<MenuList>());
        let rows = rows_of(&world, list);
        assert_eq!(rows.len(), 3);

        assert_eq!(row_label(&world, rows[0]), "A");
        assert!(world.entity(rows[0]).contains::<MenuLink>());
        assert!(world.entity(rows[1]).contains::<MenuSeparator>());
        assert_eq!(row_label(&world, rows[2]), "B");
        let has_submenu = world
            .get::<HasSubmenu>(rows[2])
            .expect("has-children marker");

        // Nested level: one entry, hidden until hovered, offset by min_width.
        assert_eq!(
            world.get::<Visibility>(has_submenu.panel),
            Some(&Visibility::Hidden)
        );
        let panel_node = world.get::<Node>(has_submenu.panel).expect("panel node");
        assert_eq!(panel_node.left, Val::Px(MenuConfig::default().min_width));
        assert_eq!(panel_node.top, Val::Px(0.0));
        let nested_list = world.get::<Children>(has_submenu.panel).expect("panel children")[0];
        let nested_rows = rows_of(&world, nested_list);
        assert_eq!(nested_rows.len(), 1);
        assert_eq!(row_label(&world, nested_rows[0]), "B1");
    }

    #[test]
    fn separator_and_header_rows_are_not_actionable() {
        let mut world = World::new();
        let root = build(
            &mut world,
            &[MenuItem::header("Sample header"), MenuItem::separator()],
            Vec2::ZERO,
        );
        let list = world.get::<Children>(root).expect("root children")[0];
        let rows = rows_of(&world, list);
        assert_eq!(rows.len(), 2);

        assert!(world.entity(rows[0]).contains::<MenuHeader>());
        assert_eq!(row_label(&world, rows[0]), "Sample header");
        assert!(world.entity(rows[1]).contains::<MenuSeparator>());
        for row in rows {
            assert!(!world.entity(row).contains::<MenuLink>());
            assert!(!world.entity(row).contains::<MenuAction>());
            assert!(!world.entity(row).contains::<HasSubmenu>());
        }
    }

    #[test]
    fn entry_without_href_is_a_noop_link() {
        let mut world = World::new();
        let root = build(
            &mut world,
            &[MenuItem::Entry(MenuEntry::new("plain"))],
            Vec2::ZERO,
        );
        let list = world.get::<Children>(root).expect("root children")[0];
        let row = rows_of(&world, list)[0];
        let link = world.get::<MenuLink>(row).expect("link");
        assert_eq!(
            link,
            &MenuLink {
                href: String::new(),
                target: "_self".to_string(),
                title: String::new(),
                rel: String::new(),
            }
        );
    }

    #[test]
    fn every_list_level_gets_the_min_width_floor() {
        let mut world = World::new();
        let root = build(&mut world, &sample_items(), Vec2::ZERO);
        let min_width = Val::Px(MenuConfig::default().min_width);

        let list = world.get::<Children>(root).expect("root children")[0];
        assert_eq!(world.get::<Node>(list).expect("list node").min_width, min_width);

        let rows = rows_of(&world, list);
        let panel = world.get::<HasSubmenu>(rows[2]).expect("submenu").panel;
        let nested_list = world.get::<Children>(panel).expect("panel children")[0];
        assert_eq!(
            world.get::<Node>(nested_list).expect("nested node").min_width,
            min_width
        );
    }

    #[test]
    fn subtree_collection_visits_every_menu_node() {
        let mut world = World::new();
        let root = build(&mut world, &sample_items(), Vec2::ZERO);
        let mut system_state: bevy::ecs::system::SystemState<Query<&Children>> =
            bevy::ecs::system::SystemState::new(&mut world);
        let children_query = system_state.get(&world);
        let subtree = collect_subtree(root, &children_query);

        let mut tagged_query = world.query_filtered::<Entity, With<MenuNode>>();
        let tagged: Vec<Entity> = tagged_query.iter(&world).collect();
        assert_eq!(subtree.len(), tagged.len());
        for entity in tagged {
            assert!(subtree.contains(&entity));
        }
    }
}
