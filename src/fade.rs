//! Fade-out teardown of a dismissed menu.
//!
//! The dismissed instance keeps swallowing pointer events while fading; it
//! only leaves the world when the timer finishes. Base colors are captured
//! on the first tick so the alpha ramp scales the authored colors rather
//! than compounding frame over frame.
use bevy::prelude::*;

use crate::builder::collect_subtree;

/// Attached to a menu root when the instance is dismissed.
#[derive(Component, Debug)]
pub struct FadeOut {
    timer: Timer,
    captured: Vec<FadedNode>,
}

#[derive(Debug)]
struct FadedNode {
    entity: Entity,
    background: Option<Color>,
    text: Option<Color>,
}

impl FadeOut {
    pub fn new(seconds: f32) -> Self {
        Self {
            timer: Timer::from_seconds(seconds.max(0.0), TimerMode::Once),
            captured: Vec::new(),
        }
    }

    pub fn remaining_secs(&self) -> f32 {
        self.timer.remaining_secs()
    }
}

pub(crate) fn tick_fade_out(
    mut commands: Commands,
    time: Res<Time<Real>>,
    mut fading: Query<(Entity, &mut FadeOut)>,
    children: Query<&Children>,
    mut backgrounds: Query<&mut BackgroundColor>,
    mut texts: Query<&mut TextColor>,
) {
    for (root, mut fade) in fading.iter_mut() {
        if fade.captured.is_empty() {
            fade.captured = collect_subtree(root, &children)
                .into_iter()
                .map(|entity| FadedNode {
                    entity,
                    background: backgrounds.get(entity).ok().map(|color| color.0),
                    text: texts.get(entity).ok().map(|color| color.0),
                })
                .collect();
        }

        fade.timer.tick(time.delta());
        if fade.timer.is_finished() {
            commands.entity(root).despawn();
            continue;
        }

        let opacity = 1.0 - fade.timer.fraction();
        for node in &fade.captured {
            if let (Some(base), Ok(mut background)) =
                (node.background, backgrounds.get_mut(node.entity))
            {
                background.0 = base.with_alpha(base.alpha() * opacity);
            }
            if let (Some(base), Ok(mut text)) = (node.text, texts.get_mut(node.entity)) {
                text.0 = base.with_alpha(base.alpha() * opacity);
            }
        }
    }
}
