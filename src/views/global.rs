//! Base view: top-level navigation buttons

use crate::kontrol::options::{default_options, OptionMap};
use crate::kontrol::{Color, ControlId};
use crate::render::Scene;
use crate::router::ViewContext;

use super::{Lighting, LightingMap, ScannerView, ScreenPair, SetupView, StripView, View};

#[derive(Debug, Default)]
pub struct GlobalView;

impl GlobalView {
    pub fn new() -> Self {
        Self
    }
}

impl View for GlobalView {
    fn name(&self) -> &'static str {
        "global"
    }

    fn draw(&mut self, _ctx: &ViewContext) -> Option<ScreenPair> {
        Some([Scene::Cross, Scene::Cross])
    }

    fn button_pressed(&mut self, ctx: &mut ViewContext, control: ControlId) {
        match control {
            ControlId::Setup => ctx.set_view(Box::new(SetupView::new())),
            ControlId::Midi => {
                ctx.ensure_mixer();
                ctx.set_view(Box::new(StripView::new()));
            }
            ControlId::Scene if !ctx.has_view(ScannerView::NAME) => {
                ctx.set_view(Box::new(ScannerView::new()));
            }
            _ => {}
        }
    }

    fn lighting(&self, _ctx: &ViewContext) -> LightingMap {
        LightingMap::from([
            (ControlId::Setup, Lighting::new(Color::White, 2)),
            (ControlId::Midi, Lighting::new(Color::White, 2)),
        ])
    }

    fn general_options(&self) -> OptionMap {
        default_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::ViewId;

    #[tokio::test]
    async fn test_navigation_buttons() {
        let mut ctx = ViewContext::detached();
        let mut view = GlobalView::new();

        view.button_pressed(&mut ctx, ControlId::Setup);
        view.button_pressed(&mut ctx, ControlId::Midi);
        assert_eq!(
            ctx.take_pending_names(),
            vec!["replace setup".to_string(), "replace strips".to_string()]
        );
        assert!(ctx.mixer_requested);
    }

    #[tokio::test]
    async fn test_scene_does_not_stack_scanners() {
        let mut ctx = ViewContext::detached();
        let mut view = GlobalView::new();

        view.button_pressed(&mut ctx, ControlId::Scene);
        assert_eq!(ctx.take_pending_names(), vec!["replace scanner".to_string()]);

        ctx.stack = vec![(ViewId(0), "global"), (ViewId(1), ScannerView::NAME)];
        view.button_pressed(&mut ctx, ControlId::Scene);
        assert!(ctx.take_pending_names().is_empty());
    }
}
