//! Session driver on top of the mixer mirror

use std::time::Duration;

use rosc::{OscMessage, OscType};
use tokio::time::Instant;
use tracing::{debug, info};

use super::state::{MixerUpdate, OscMixerState, StripState};
use super::OscTransport;
use crate::config::OscConfig;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// `/set_surface` sent, no session name seen yet
    AwaitingPeer,
    /// Peer answered; the first strip list is requested once the deadline passes
    Settling(Instant),
    Live,
}

/// Mixer mirror plus the session talking to the peer
pub struct MixerSync {
    pub state: OscMixerState,
    transport: Box<dyn OscTransport>,
    phase: SessionPhase,
    settle: Duration,
}

impl MixerSync {
    /// Announce the surface to the peer and start waiting for it
    pub fn connect(
        transport: Box<dyn OscTransport>,
        config: &OscConfig,
        reply_port: u16,
        settle: Duration,
    ) -> Result<Self> {
        let sync = Self {
            state: OscMixerState::new(),
            transport,
            phase: SessionPhase::AwaitingPeer,
            settle,
        };
        sync.send(
            "/set_surface",
            vec![
                OscType::Int(0),
                OscType::Int(config.strip_flags),
                OscType::Int(config.feedback_flags),
                OscType::Int(config.gain_mode),
                OscType::Int(0),
                OscType::Int(0),
                OscType::Int(reply_port as i32),
            ],
        )?;
        info!("Surface announced, waiting for mixer");
        Ok(sync)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Advance the handshake; called on a fixed poll interval
    pub fn poll_handshake(&mut self, now: Instant) -> Result<()> {
        match self.phase {
            SessionPhase::AwaitingPeer => {
                if let Some(name) = &self.state.scalars.session_name {
                    info!("Mixer session '{}' is up", name);
                    self.phase = SessionPhase::Settling(now + self.settle);
                } else {
                    debug!("Waiting for mixer");
                }
            }
            SessionPhase::Settling(deadline) if now >= deadline => {
                self.refresh_strip_list()?;
                self.phase = SessionPhase::Live;
            }
            _ => {}
        }
        Ok(())
    }

    /// Rebuild the strip list from scratch
    pub fn refresh_strip_list(&mut self) -> Result<()> {
        self.state.begin_refresh();
        self.send("/strip/list", vec![])
    }

    /// Apply a message from the peer, answering refresh requests
    pub fn handle_message(&mut self, msg: &OscMessage) -> Result<MixerUpdate> {
        let update = self.state.handle_message(msg);
        if update.refresh_requested {
            info!("Mixer announced a strip list change");
            self.refresh_strip_list()?;
        }
        Ok(update)
    }

    /// Send a strip-level command such as `/mute`; master uses its own address tree
    pub fn send_strip_command(
        &self,
        strip: &StripState,
        address: &str,
        args: Vec<OscType>,
    ) -> Result<()> {
        if strip.is_master() {
            return self.send(&format!("/master{}", address), args);
        }
        let ssid = match strip.numeric_id() {
            Some(id) => OscType::Int(id as i32),
            None => OscType::String(strip.ssid.clone()),
        };
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(ssid);
        full.extend(args);
        self.send(&format!("/strip{}", address), full)
    }

    pub fn send(&self, addr: &str, args: Vec<OscType>) -> Result<()> {
        self.transport.send(OscMessage {
            addr: addr.to_string(),
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osc::testing::RecordingTransport;

    fn connect() -> (MixerSync, RecordingTransport) {
        let transport = RecordingTransport::default();
        let sync = MixerSync::connect(
            Box::new(transport.clone()),
            &OscConfig::default(),
            9100,
            Duration::from_millis(100),
        )
        .unwrap();
        (sync, transport)
    }

    #[test]
    fn test_set_surface_arguments() {
        let (_, transport) = connect();
        let sent = transport.sent.lock();
        assert_eq!(sent[0].addr, "/set_surface");
        assert_eq!(
            sent[0].args,
            vec![
                OscType::Int(0),
                OscType::Int(1 | 2 | 4 | 8 | 16 | 32 | 128),
                OscType::Int(1 | 2 | 8 | 16 | 64 | 128 | 8192 | 16384),
                OscType::Int(2),
                OscType::Int(0),
                OscType::Int(0),
                OscType::Int(9100),
            ]
        );
    }

    #[test]
    fn test_handshake_waits_for_session_name_then_settles() {
        let (mut sync, transport) = connect();
        let t0 = Instant::now();

        sync.poll_handshake(t0).unwrap();
        assert_eq!(sync.phase(), SessionPhase::AwaitingPeer);

        sync.handle_message(&OscMessage {
            addr: "/session_name".into(),
            args: vec![OscType::String("demo".into())],
        })
        .unwrap();
        sync.poll_handshake(t0).unwrap();
        assert!(matches!(sync.phase(), SessionPhase::Settling(_)));

        sync.poll_handshake(t0 + Duration::from_millis(50)).unwrap();
        assert_eq!(transport.addresses(), vec!["/set_surface"]);

        sync.poll_handshake(t0 + Duration::from_millis(100)).unwrap();
        assert_eq!(sync.phase(), SessionPhase::Live);
        assert_eq!(transport.addresses(), vec!["/set_surface", "/strip/list"]);
        assert!(sync.state.is_refreshing());
    }

    #[test]
    fn test_unsolicited_strip_list_triggers_refresh() {
        let (mut sync, transport) = connect();
        let update = sync
            .handle_message(&OscMessage {
                addr: "/strip/list".into(),
                args: vec![],
            })
            .unwrap();
        assert!(update.refresh_requested);
        assert_eq!(transport.addresses().last().map(String::as_str), Some("/strip/list"));
    }

    #[test]
    fn test_strip_commands() {
        let (sync, transport) = connect();
        sync.send_strip_command(&StripState::new("4"), "/mute", vec![OscType::Int(1)])
            .unwrap();
        sync.send_strip_command(&StripState::new("master"), "/fader", vec![OscType::Float(0.5)])
            .unwrap();

        let sent = transport.sent.lock();
        assert_eq!(sent[1].addr, "/strip/mute");
        assert_eq!(sent[1].args, vec![OscType::Int(4), OscType::Int(1)]);
        assert_eq!(sent[2].addr, "/master/fader");
        assert_eq!(sent[2].args, vec![OscType::Float(0.5)]);
    }
}
