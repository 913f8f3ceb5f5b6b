// VRChat chatbox socket
// Type : OSC over UDP
// Requires port : 9000 on 127.0.0.1 by default (OSCPort in config.json)
// Parsing Format :
    /*
        Send to OSC Address (address)
        /chatbox/input = Message (string), Notify (bool, always true)
        Chatbox accepts roughly one update every 3 seconds.
    */

use std::net::{Ipv4Addr, SocketAddr};

use async_osc::OscSocket;
use async_trait::async_trait;
use log::{debug, warn};

use crate::error::SinkError;

pub(crate) const CHATBOX_INPUT: &str = "/chatbox/input";

/// Destination for composed status messages.
#[async_trait(?Send)]
pub(crate) trait StatusSink {
    /// Best effort: failures are logged, never returned.
    async fn send(&mut self, text: &str);
}

pub(crate) struct ChatboxSink {
    socket: OscSocket,
    target: SocketAddr,
}

impl ChatboxSink {
    pub(crate) async fn connect(port: u16) -> Result<Self, SinkError> {
        let target = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let bind_err = |source: async_osc::Error| SinkError::Bind {
            addr: target.to_string(),
            source,
        };
        let socket = OscSocket::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .map_err(bind_err)?;
        socket.connect(target).await.map_err(bind_err)?;
        Ok(Self { socket, target })
    }

    pub(crate) fn target(&self) -> SocketAddr {
        self.target
    }

    async fn try_send(&self, text: &str) -> Result<(), SinkError> {
        self.socket
            .send((CHATBOX_INPUT, (text.to_string(), true)))
            .await
            .map_err(SinkError::Send)
    }
}

#[async_trait(?Send)]
impl StatusSink for ChatboxSink {
    async fn send(&mut self, text: &str) {
        match self.try_send(text).await {
            Ok(()) => debug!("Sent {:?} to {}", text, self.target),
            Err(err) => warn!("{err}"),
        }
    }
}
