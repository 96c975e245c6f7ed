//! Router module - view stack and device update orchestration
//!
//! The Router owns:
//! - The ordered view stack (index 0 is the base view)
//! - The latest input snapshot and the live device configuration
//! - The mixer session, once one has been opened
//! - The device link, the renderer and any debug frame sinks
//!
//! Two coalescing triggers (redraw, device configuration) ask the owner of the router
//! to call [`Router::draw`] and [`Router::push_device_config`] through a channel.

mod context;
mod input;
mod lighting;
mod stack;
mod upload;

pub use context::{DeviceSettings, DirtyFlags, ViewContext, ViewId};

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::config::TimingConfig;
use crate::kontrol::options::{default_options, OptionMap};
use crate::kontrol::CommandSink;
use crate::osc::MixerSync;
use crate::render::{FrameSink, Renderer};
use crate::trigger::Trigger;
use crate::views::View;

/// Deferred work requested by a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Redraw,
    DeviceConfig,
}

/// Device output shared by every upload path
pub(crate) struct Surface {
    pub sink: Box<dyn CommandSink>,
    pub renderer: Box<dyn Renderer>,
    pub frame_sinks: Vec<Box<dyn FrameSink>>,
    /// Last button lighting command sent
    pub last_lighting: Option<Vec<u8>>,
    /// Merged option state; views only override the keys they care about
    pub options: OptionMap,
    pub last_options: Option<Vec<u8>>,
}

/// Central orchestrator between hardware, views and the mixer
pub struct Router {
    pub(crate) views: Vec<(ViewId, Box<dyn View>)>,
    pub(crate) ctx: ViewContext,
    pub(crate) surface: Surface,
    /// Whether `ctx.input` holds a decoded report yet
    has_input: bool,
    next_view_id: u64,
}

impl Router {
    /// Create a router with `base` as its permanent bottom view
    pub fn new(
        base: Box<dyn View>,
        timing: &TimingConfig,
        refresh_tx: mpsc::UnboundedSender<Refresh>,
        sink: Box<dyn CommandSink>,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        let redraw_tx = refresh_tx.clone();
        let redraw = Trigger::new(
            "redraw",
            TimingConfig::ms(timing.redraw_min_ms),
            TimingConfig::ms(timing.redraw_max_ms),
            Arc::new(move || {
                let _ = redraw_tx.send(Refresh::Redraw);
            }),
        );
        let config = Trigger::new(
            "device-config",
            TimingConfig::ms(timing.config_min_ms),
            TimingConfig::ms(timing.config_max_ms),
            Arc::new(move || {
                let _ = refresh_tx.send(Refresh::DeviceConfig);
            }),
        );

        let mut router = Self {
            views: Vec::new(),
            ctx: ViewContext::new(redraw, config),
            surface: Surface {
                sink,
                renderer,
                frame_sinks: Vec::new(),
                last_lighting: None,
                options: default_options(),
                last_options: None,
            },
            has_input: false,
            next_view_id: 0,
        };
        router.register_views(vec![base]);
        router
    }

    /// Also hand every uploaded screen to `sink`
    pub fn add_frame_sink(&mut self, sink: Box<dyn FrameSink>) {
        self.surface.frame_sinks.push(sink);
    }

    /// Schedule the first redraw and configuration upload
    pub fn start(&self) {
        info!("Router started with {} view(s)", self.views.len());
        self.ctx.request_update();
    }

    pub fn context(&self) -> &ViewContext {
        &self.ctx
    }

    /// Names of the stacked views, base first
    pub fn view_names(&self) -> Vec<&'static str> {
        self.views.iter().map(|(_, v)| v.name()).collect()
    }

    pub fn has_mixer(&self) -> bool {
        self.ctx.mixer.is_some()
    }

    /// Open a mixer session without waiting for a view to ask for one
    pub fn request_mixer(&mut self) {
        self.ctx.ensure_mixer();
    }

    /// Check if a view asked for a mixer session and reset the request
    pub fn take_mixer_request(&mut self) -> bool {
        std::mem::take(&mut self.ctx.mixer_requested)
    }

    /// Install a freshly opened mixer session and let the views know
    pub fn attach_mixer(&mut self, mixer: MixerSync) {
        info!("Mixer session attached");
        self.ctx.mixer = Some(mixer);
        self.ctx.mixer_requested = false;
        self.broadcast_mixer_event(&crate::osc::MixerEvent::StripList);
    }

    fn allocate_view_id(&mut self) -> ViewId {
        self.next_view_id += 1;
        ViewId(self.next_view_id)
    }
}
