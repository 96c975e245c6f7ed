//! Hardware input, mixer messages and animation ticks

use rosc::OscMessage;
use tokio::time::Instant;
use tracing::{trace, warn};

use super::Router;
use crate::error::{GatewayError, Result};
use crate::kontrol::codec::decode_input_report;
use crate::kontrol::{InputEvent, InputSnapshot};
use crate::osc::MixerEvent;

impl Router {
    /// Decode a raw report and dispatch the resulting events
    ///
    /// Bad reports are logged and dropped.
    pub fn handle_report(&mut self, report: &[u8]) {
        let raw = match decode_input_report(report) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Dropping input report: {}", e);
                return;
            }
        };

        let snapshot = InputSnapshot::from(raw);
        // First report after startup: positions only, no turn events
        let previous = self.has_input.then_some(self.ctx.input);
        self.ctx.input = snapshot;
        self.has_input = true;

        for event in snapshot.events_since(previous.as_ref()) {
            self.dispatch(event);
        }
        self.apply_pending();
    }

    /// Deliver one event to every view, topmost first
    pub fn dispatch(&mut self, event: InputEvent) {
        trace!("Input {:?}", event);
        if matches!(event, InputEvent::Pressed(_) | InputEvent::Released(_)) {
            // Button backlights follow presses
            self.ctx.request_config();
        }

        for (id, view) in self.views.iter_mut().rev() {
            self.ctx.current = Some(*id);
            match event {
                InputEvent::Pressed(control) => view.button_pressed(&mut self.ctx, control),
                InputEvent::Released(control) => view.button_released(&mut self.ctx, control),
                InputEvent::KnobTurned(knob, delta) => view.knob_turned(&mut self.ctx, knob, delta),
                InputEvent::BigKnobTurned(delta) => view.big_knob_turned(&mut self.ctx, delta),
            }
        }
        self.ctx.current = None;
    }

    /// Feed a message from the mixer into the mirror and notify the views
    pub fn handle_osc(&mut self, msg: &OscMessage) -> Result<()> {
        let mixer = self.ctx.mixer.as_mut().ok_or(GatewayError::NotConnected)?;
        let update = mixer.handle_message(msg)?;

        for event in &update.events {
            self.broadcast_mixer_event(event);
        }
        if update.changed || !update.events.is_empty() {
            self.ctx.request_update();
        }
        self.apply_pending();
        Ok(())
    }

    pub(crate) fn broadcast_mixer_event(&mut self, event: &MixerEvent) {
        for (id, view) in self.views.iter_mut().rev() {
            self.ctx.current = Some(*id);
            view.mixer_event(&mut self.ctx, event);
        }
        self.ctx.current = None;
    }

    /// Advance the mixer handshake, if a session is open
    pub fn poll_handshake(&mut self, now: Instant) -> Result<()> {
        match self.ctx.mixer.as_mut() {
            Some(mixer) => mixer.poll_handshake(now),
            None => Ok(()),
        }
    }

    /// Animation tick for views that move on their own
    pub fn tick(&mut self, now: Instant) {
        for (id, view) in self.views.iter_mut() {
            self.ctx.current = Some(*id);
            view.tick(&mut self.ctx, now);
        }
        self.ctx.current = None;
        self.apply_pending();
    }
}
