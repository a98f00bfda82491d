//! Client network layer
//!
//! macroquad owns the main thread, so the UDP socket lives on a dedicated
//! thread running its own tokio runtime. The render loop talks to it through
//! unbounded channels and never blocks on the network.

use bincode::{deserialize, serialize};
use log::{error, info, warn};
use shared::{Packet, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Heartbeat period; well below the server's client timeout
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to the background network thread
pub struct Connection {
    outgoing: mpsc::UnboundedSender<Packet>,
    incoming: mpsc::UnboundedReceiver<Packet>,
    worker: JoinHandle<()>,
}

impl Connection {
    /// Starts the network thread and sends the connect request
    pub fn spawn(server_addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let server_addr: SocketAddr = server_addr.parse()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let (incoming_tx, incoming) = mpsc::unbounded_channel();

        let worker = std::thread::Builder::new()
            .name("network".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    if let Err(e) = run_socket(server_addr, outgoing_rx, incoming_tx).await {
                        error!("Network thread stopped: {}", e);
                    }
                });
            })?;

        let connection = Self {
            outgoing,
            incoming,
            worker,
        };
        connection.send(Packet::Connect {
            client_version: PROTOCOL_VERSION,
        });

        Ok(connection)
    }

    pub fn send(&self, packet: Packet) {
        if self.outgoing.send(packet).is_err() {
            warn!("Network thread is gone, dropping packet");
        }
    }

    /// Returns the next received packet without waiting
    pub fn try_recv(&mut self) -> Option<Packet> {
        self.incoming.try_recv().ok()
    }

    /// Sends `Disconnect` and waits for the network thread to finish
    pub fn shutdown(self) {
        self.send(Packet::Disconnect);

        // Closing the channel ends the socket loop once the queue is flushed
        let Self {
            outgoing, worker, ..
        } = self;
        drop(outgoing);

        if worker.join().is_err() {
            error!("Network thread panicked");
        }
    }
}

async fn run_socket(
    server_addr: SocketAddr,
    mut outgoing: mpsc::UnboundedReceiver<Packet>,
    incoming: mpsc::UnboundedSender<Packet>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    info!("Client socket bound to {}", socket.local_addr()?);

    let mut heartbeat = interval(HEARTBEAT_INTERVAL);
    let mut buffer = [0u8; 2048];

    // Skip the first tick since it fires immediately
    heartbeat.tick().await;

    loop {
        tokio::select! {
            result = socket.recv_from(&mut buffer) => {
                match result {
                    Ok((len, addr)) if addr == server_addr => {
                        match deserialize::<Packet>(&buffer[0..len]) {
                            Ok(packet) => {
                                if incoming.send(packet).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Failed to deserialize packet: {}", e),
                        }
                    },
                    Ok((_, addr)) => warn!("Ignoring packet from {}", addr),
                    Err(e) => error!("Error receiving packet: {}", e),
                }
            },

            packet = outgoing.recv() => {
                match packet {
                    Some(packet) => send_packet(&socket, &packet, server_addr).await?,
                    None => break,
                }
            },

            _ = heartbeat.tick() => {
                send_packet(&socket, &Packet::Heartbeat, server_addr).await?;
            },
        }
    }

    Ok(())
}

async fn send_packet(
    socket: &UdpSocket,
    packet: &Packet,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let data = serialize(packet)?;
    socket.send_to(&data, addr).await?;
    Ok(())
}
