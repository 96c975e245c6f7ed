//! Ardour OSC control-surface session
//!
//! - `flags`: `/set_surface` argument values
//! - `state`: the mixer mirror and its message handlers
//! - `sync`: handshake, strip list refresh and outgoing strip commands
//!
//! Transport is plain UDP: one socket bound to the local listen port both sends to the
//! peer and receives its replies.

pub mod flags;
pub mod state;
pub mod sync;

use std::net::SocketAddr;
use std::sync::Arc;

use rosc::{decoder, encoder, OscMessage, OscPacket};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

use crate::error::Result;

pub use state::{MixerEvent, MixerUpdate, OscMixerState, StripState, MASTER_ID};
pub use sync::MixerSync;

const RECV_BUFFER_LEN: usize = 65536;
const MESSAGE_QUEUE_LEN: usize = 4096;

/// Outgoing half of an OSC session
pub trait OscTransport: Send {
    fn send(&self, msg: OscMessage) -> Result<()>;
}

/// UDP transport shared with the receiving task
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    remote: SocketAddr,
}

impl UdpTransport {
    /// Bind the listen port and spawn the receiver feeding the returned channel.
    /// The channel closes when the socket fails.
    pub async fn bind(
        listen_port: u16,
        remote: SocketAddr,
    ) -> Result<(Self, mpsc::Receiver<OscMessage>)> {
        let socket = Arc::new(UdpSocket::bind(("0.0.0.0", listen_port)).await?);
        debug!("OSC listening on {}, peer {}", socket.local_addr()?, remote);

        let (tx, rx) = mpsc::channel(MESSAGE_QUEUE_LEN);
        tokio::spawn(receive_loop(socket.clone(), tx));

        Ok((Self { socket, remote }, rx))
    }

    pub fn local_port(&self) -> Result<u16> {
        Ok(self.socket.local_addr()?.port())
    }
}

impl OscTransport for UdpTransport {
    fn send(&self, msg: OscMessage) -> Result<()> {
        trace!("OSC -> {} {:?}", msg.addr, msg.args);
        let buf = encoder::encode(&OscPacket::Message(msg))?;
        match self.socket.try_send_to(&buf, self.remote) {
            Ok(_) => Ok(()),
            // Unacknowledged anyway; a full send buffer loses the datagram
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                warn!("OSC send buffer full, message dropped");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

async fn receive_loop(socket: Arc<UdpSocket>, tx: mpsc::Sender<OscMessage>) {
    let mut buf = vec![0u8; RECV_BUFFER_LEN];
    loop {
        let len = match socket.recv_from(&mut buf).await {
            Ok((len, _)) => len,
            Err(e) => {
                error!("OSC socket closed: {}", e);
                return;
            }
        };

        let packet = match decoder::decode_udp(&buf[..len]) {
            Ok((_, packet)) => packet,
            Err(e) => {
                warn!("Undecodable OSC packet: {:?}", e);
                continue;
            }
        };

        let mut messages = Vec::new();
        flatten(packet, &mut messages);
        for msg in messages {
            if tx.send(msg).await.is_err() {
                return;
            }
        }
    }
}

/// Messages of a packet in order, bundles unpacked
fn flatten(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(msg) => out.push(msg),
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                flatten(inner, out);
            }
        }
    }
}
