//! Server network layer handling UDP communications and request dispatch

use crate::client_manager::{ClientManager, ConnectionId};
use crate::hub::{GameHub, Gateway};
use crate::session_registry::SessionRegistry;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use shared::{Packet, RoomCode, PROTOCOL_VERSION};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::interval;

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived { packet: Packet, addr: SocketAddr },
    ClientTimeout { client_id: ConnectionId },
}

/// Messages sent from request handling to the network sender task
#[derive(Debug)]
pub enum GameMessage {
    /// Reply to an address that may not have a connection yet
    SendPacket { packet: Packet, addr: SocketAddr },
    SendTo {
        packet: Packet,
        connection: ConnectionId,
    },
    Multicast {
        packet: Packet,
        targets: Vec<ConnectionId>,
    },
}

/// Runtime settings, filled from the command line by the server binary
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `host:port` to bind the UDP socket to
    pub bind_addr: String,
    /// Maximum number of concurrent connections
    pub max_clients: usize,
    /// Silence after which a connection is dropped
    pub client_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            max_clients: 64,
            client_timeout: Duration::from_secs(10),
        }
    }
}

/// Gateway that queues packets for the UDP sender task.
///
/// Room groups are tracked here; addresses are resolved by the sender task
/// so that no handler ever waits on the client table.
pub struct UdpGateway {
    groups: Mutex<HashMap<RoomCode, Vec<ConnectionId>>>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
}

impl UdpGateway {
    /// Creates a gateway with no groups, feeding the given sender queue
    pub fn new(game_tx: mpsc::UnboundedSender<GameMessage>) -> Self {
        Self {
            groups: Mutex::new(HashMap::new()),
            game_tx,
        }
    }

    /// Current members of a room's group, in join order
    pub fn group_members(&self, room: &RoomCode) -> Vec<ConnectionId> {
        self.groups.lock().get(room).cloned().unwrap_or_default()
    }

    fn queue(&self, message: GameMessage) {
        if let Err(e) = self.game_tx.send(message) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }
}

impl Gateway for UdpGateway {
    fn send(&self, connection: ConnectionId, packet: Packet) {
        self.queue(GameMessage::SendTo { packet, connection });
    }

    fn broadcast(&self, room: &RoomCode, packet: Packet) {
        let targets = self.group_members(room);
        if targets.is_empty() {
            return;
        }
        self.queue(GameMessage::Multicast { packet, targets });
    }

    fn join_group(&self, connection: ConnectionId, room: &RoomCode) {
        let mut groups = self.groups.lock();
        let members = groups.entry(room.clone()).or_default();
        if !members.contains(&connection) {
            members.push(connection);
        }
    }

    fn leave_group(&self, connection: ConnectionId, room: &RoomCode) {
        if let Some(members) = self.groups.lock().get_mut(room) {
            members.retain(|&member| member != connection);
        }
    }

    fn remove_group(&self, room: &RoomCode) {
        self.groups.lock().remove(room);
    }
}

/// Main server coordinating networking and room handling
pub struct Server {
    socket: Arc<UdpSocket>,
    clients: Arc<RwLock<ClientManager>>,
    hub: GameHub<UdpGateway>,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_rx: mpsc::UnboundedReceiver<GameMessage>,
}

impl Server {
    /// Binds the UDP socket and wires the hub to a fresh gateway
    ///
    /// Nothing is received until `run` is called. Binding to port 0 picks an
    /// ephemeral port; `local_addr` reports which.
    pub async fn new(
        config: ServerConfig,
        registry: Arc<SessionRegistry>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(&config.bind_addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            clients: Arc::new(RwLock::new(ClientManager::new(
                config.max_clients,
                config.client_timeout,
            ))),
            hub: GameHub::new(registry, UdpGateway::new(game_tx)),
            server_tx,
            server_rx,
            game_rx,
        })
    }

    /// Address the socket is actually bound to
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Spawns task that continuously listens for incoming packets
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that processes outgoing packet queue
    fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let clients = Arc::clone(&self.clients);
        let mut game_rx = std::mem::replace(&mut self.game_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    GameMessage::SendTo { packet, connection } => {
                        let addr = clients.read().await.addr_of(connection);
                        match addr {
                            Some(addr) => {
                                if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await
                                {
                                    error!("Failed to send to client {}: {}", connection, e);
                                }
                            }
                            None => debug!("Dropping packet for departed client {}", connection),
                        }
                    }
                    GameMessage::Multicast { packet, targets } => {
                        let client_addrs: Vec<(ConnectionId, SocketAddr)> = {
                            let clients_guard = clients.read().await;
                            targets
                                .iter()
                                .filter_map(|&id| clients_guard.addr_of(id).map(|addr| (id, addr)))
                                .collect()
                        };

                        for (client_id, addr) in client_addrs {
                            if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                                error!("Failed to send to client {}: {}", client_id, e);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Spawns task that monitors client timeouts
    fn spawn_timeout_checker(&self) {
        let clients = Arc::clone(&self.clients);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut clients_guard = clients.write().await;
                    clients_guard.check_timeouts()
                };

                for client_id in timed_out {
                    info!("Client {} timed out", client_id);
                    if let Err(e) = server_tx.send(ServerMessage::ClientTimeout { client_id }) {
                        error!("Failed to send timeout message: {}", e);
                        return;
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    fn reply(&self, packet: Packet, addr: SocketAddr) {
        self.hub
            .gateway()
            .queue(GameMessage::SendPacket { packet, addr });
    }

    /// Removes a connection and runs disconnect handling if it was still known
    async fn disconnect_client(&self, client_id: ConnectionId) {
        let removed = self.clients.write().await.remove_client(&client_id);
        if removed {
            self.hub.on_disconnect(client_id);
        }
    }

    /// Dispatches an incoming packet to the hub
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        if let Packet::Connect { client_version } = packet {
            self.handle_connect(client_version, addr).await;
            return;
        }

        let client_id = self.clients.write().await.touch(addr);
        let Some(client_id) = client_id else {
            warn!("Packet from unknown client at {}", addr);
            return;
        };

        match packet {
            Packet::CreateRoom => self.hub.create_room(client_id),
            Packet::JoinRoom { room_code } => self.hub.join_room(client_id, &room_code),
            Packet::MakeMove { cell } => self.hub.make_move(client_id, cell),
            Packet::ResetGame => self.hub.reset_game(client_id),
            Packet::Heartbeat => {}
            Packet::Disconnect => self.disconnect_client(client_id).await,
            _ => {
                warn!("Unexpected packet type from client {} at {}", client_id, addr);
            }
        }
    }

    async fn handle_connect(&mut self, client_version: u32, addr: SocketAddr) {
        info!(
            "Client connecting from {} (version: {})",
            addr, client_version
        );

        if client_version != PROTOCOL_VERSION {
            self.reply(
                Packet::Disconnected {
                    reason: "Protocol version mismatch".to_string(),
                },
                addr,
            );
            return;
        }

        // Replace an existing connection from the same address
        let existing_client_id = self.clients.read().await.find_client_by_addr(addr);
        if let Some(existing_id) = existing_client_id {
            info!("Removing existing client {} from {}", existing_id, addr);
            self.disconnect_client(existing_id).await;
        }

        let client_id = self.clients.write().await.add_client(addr);
        match client_id {
            Some(connection_id) => {
                self.reply(Packet::Connected { connection_id }, addr);
            }
            None => {
                self.reply(
                    Packet::Disconnected {
                        reason: "Server full".to_string(),
                    },
                    addr,
                );
            }
        }
    }

    /// Main server loop
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver();
        self.spawn_network_sender();
        self.spawn_timeout_checker();

        let mut status_interval = interval(Duration::from_secs(60));

        info!("Server started successfully");

        loop {
            tokio::select! {
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await;
                        },
                        Some(ServerMessage::ClientTimeout { client_id }) => {
                            self.hub.on_disconnect(client_id);
                        },
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                _ = status_interval.tick() => {
                    let client_count = self.clients.read().await.len();
                    if client_count > 0 {
                        debug!("{} clients, {} rooms", client_count, self.hub.registry().room_count());
                    }
                },
            }
        }

        Ok(())
    }
}
