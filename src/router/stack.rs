//! View stack management and drawing

use tracing::{debug, warn};

use super::context::StackOp;
use super::{Router, ViewId};
use crate::error::Result;
use crate::kontrol::codec::encode_screen;
use crate::views::View;

impl Router {
    /// Push views on top of the stack, calling `enter` on each
    pub fn register_views(&mut self, views: Vec<Box<dyn View>>) -> Vec<ViewId> {
        let mut ids = Vec::with_capacity(views.len());
        for mut view in views {
            let id = self.allocate_view_id();
            debug!("Push view {} ({:?})", view.name(), id);
            self.ctx.current = Some(id);
            view.enter(&mut self.ctx);
            self.ctx.current = None;
            self.views.push((id, view));
            ids.push(id);
        }
        self.sync_stack_names();
        self.ctx.request_update();
        ids
    }

    /// Remove views by identity, calling `leave` on each; unknown ids are skipped
    pub fn unregister_views(&mut self, ids: &[ViewId]) {
        for id in ids {
            let Some(pos) = self.views.iter().position(|(v, _)| v == id) else {
                continue;
            };
            if pos == 0 {
                warn!("Refusing to remove the base view");
                continue;
            }
            let (_, mut view) = self.views.remove(pos);
            debug!("Pop view {} ({:?})", view.name(), id);
            self.ctx.current = Some(*id);
            view.leave(&mut self.ctx);
            self.ctx.current = None;
        }
        self.sync_stack_names();
        self.ctx.request_update();
    }

    /// Keep only the base view, then push `view`
    pub fn set_view(&mut self, view: Box<dyn View>) -> ViewId {
        let overlays: Vec<ViewId> = self.views.iter().skip(1).map(|(id, _)| *id).collect();
        self.unregister_views(&overlays);
        self.register_views(vec![view])[0]
    }

    fn sync_stack_names(&mut self) {
        self.ctx.stack = self.views.iter().map(|(id, v)| (*id, v.name())).collect();
    }

    /// Apply stack changes queued by views during dispatch
    pub(crate) fn apply_pending(&mut self) {
        // enter/leave may queue further changes
        while !self.ctx.pending.is_empty() {
            for op in std::mem::take(&mut self.ctx.pending) {
                match op {
                    StackOp::Push(view) => {
                        self.register_views(vec![view]);
                    }
                    StackOp::Pop(id) => self.unregister_views(&[id]),
                    StackOp::Replace(view) => {
                        self.set_view(view);
                    }
                }
            }
        }
    }

    /// Let the topmost view that has something to show draw both screens
    pub fn draw(&mut self) -> Result<()> {
        for (id, view) in self.views.iter_mut().rev() {
            let Some(scenes) = view.draw(&self.ctx) else {
                continue;
            };
            debug!("Drawing {} ({:?})", view.name(), id);
            for (screen, scene) in scenes.iter().enumerate() {
                let frame = self.surface.renderer.render(scene);
                for sink in &mut self.surface.frame_sinks {
                    if let Err(e) = sink.upload_frame(screen as u8, &frame) {
                        warn!("Frame sink failed: {}", e);
                    }
                }
                self.surface
                    .sink
                    .send_display(&encode_screen(screen as u8, &frame.pixels))?;
            }
            return Ok(());
        }
        Ok(())
    }
}
