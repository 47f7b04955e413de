//! Server network layer: TCP accept loop, per-client line tasks and the game loop

use crate::client_manager::ClientManager;
use crate::console::ConsoleCommand;
use crate::error::ServerError;
use crate::game::{FruitSpawn, GameWorld, Outgoing};
use log::{debug, error, info, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::ClientCommand;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Messages sent from connection tasks to the game loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Joined {
        client_id: i32,
    },
    Command {
        client_id: i32,
        command: ClientCommand,
    },
    Left {
        client_id: i32,
    },
    Console(ConsoleCommand),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Game loop updates per second
    pub tick_rate: u32,
    pub max_clients: usize,
    /// Time between random fruit spawns. Zero disables them.
    pub fruit_interval: Duration,
    /// Time before a player is sent `GAME_OVER`. Zero disables it.
    pub round_length: Duration,
    /// Fruit placed before the first client connects
    pub world: Vec<FruitSpawn>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30,
            max_clients: 8,
            fruit_interval: Duration::from_secs(3),
            round_length: Duration::ZERO,
            world: Vec::new(),
        }
    }
}

pub struct GameServer {
    listener: TcpListener,
    config: ServerConfig,
    event_tx: UnboundedSender<GameEvent>,
    event_rx: UnboundedReceiver<GameEvent>,
}

impl GameServer {
    pub async fn bind(addr: &str, config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        info!("Server listening on {}", addr);

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            listener,
            config,
            event_tx,
            event_rx,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Sender for [`GameEvent::Console`] commands. Events queued before
    /// [`run`](Self::run) are applied once the game loop starts.
    pub fn console_sender(&self) -> UnboundedSender<GameEvent> {
        self.event_tx.clone()
    }

    /// Accepts clients forever. The game loop runs as its own task.
    pub async fn run(self) {
        let GameServer {
            listener,
            config,
            event_tx,
            event_rx,
        } = self;

        let clients = Arc::new(RwLock::new(ClientManager::new(config.max_clients)));

        let mut world = GameWorld::new(config.round_length);
        for spawn in &config.world {
            world.spawn_fruit(&spawn.kind, spawn.x, spawn.y, spawn.points);
        }
        info!("World ready with {} fruit", world.fruit_count());

        tokio::spawn(run_game_loop(
            world,
            Arc::clone(&clients),
            event_rx,
            config,
        ));

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => accept_client(stream, addr, &clients, &event_tx).await,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }
}

async fn accept_client(
    stream: TcpStream,
    addr: SocketAddr,
    clients: &RwLock<ClientManager>,
    events: &UnboundedSender<GameEvent>,
) {
    let (outbox, inbox) = mpsc::unbounded_channel();
    let Some(client_id) = clients.write().await.add_client(addr, outbox) else {
        warn!("Server full, rejecting {}", addr);
        return;
    };

    if let Err(e) = stream.set_nodelay(true) {
        debug!("Could not set TCP_NODELAY for {}: {}", addr, e);
    }
    let (read_half, write_half) = stream.into_split();

    tokio::spawn(async move {
        if let Err(e) = write_lines(write_half, inbox).await {
            debug!("Writer for client {} stopped: {}", client_id, e);
        }
    });

    // Joined is queued before the reader exists so it precedes every command
    if events.send(GameEvent::Joined { client_id }).is_err() {
        error!("Game loop is gone, dropping client {}", client_id);
        return;
    }
    tokio::spawn(read_commands(client_id, read_half, events.clone()));
}

/// Decodes client lines into [`GameEvent::Command`]s until the stream ends,
/// then reports [`GameEvent::Left`].
pub async fn read_commands<R>(client_id: i32, reader: R, events: UnboundedSender<GameEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match ClientCommand::decode(&line) {
                Some(command) => {
                    trace!("Client {}: {}", client_id, command);
                    if events
                        .send(GameEvent::Command { client_id, command })
                        .is_err()
                    {
                        return;
                    }
                }
                None => debug!("Client {} sent unknown line {:?}", client_id, line),
            },
            Ok(None) => break,
            Err(e) => {
                warn!("Read error from client {}: {}", client_id, e);
                break;
            }
        }
    }

    let _ = events.send(GameEvent::Left { client_id });
}

/// Writes queued lines until every sender is dropped.
pub async fn write_lines<W>(mut writer: W, mut inbox: UnboundedReceiver<String>) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(mut line) = inbox.recv().await {
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
    }
    writer.shutdown().await
}

/// Applies one event to the world.
pub fn apply_event(world: &mut GameWorld, event: GameEvent) -> Vec<Outgoing> {
    match event {
        GameEvent::Joined { client_id } => world.add_player(client_id),
        GameEvent::Command { client_id, command } => world.apply_command(client_id, command),
        GameEvent::Left { client_id } => {
            world.remove_player(client_id);
            Vec::new()
        }
        GameEvent::Console(command) => apply_console(world, command),
    }
}

fn apply_console(world: &mut GameWorld, command: ConsoleCommand) -> Vec<Outgoing> {
    match command {
        ConsoleCommand::SpawnFruit { kind, x, y, points } => {
            vec![world.spawn_fruit(&kind, x, y, points)]
        }
        ConsoleCommand::GameOver { player_id } => match world.end_round(player_id) {
            Some(outgoing) => vec![outgoing],
            None => {
                warn!("No player {} to end", player_id);
                Vec::new()
            }
        },
        ConsoleCommand::Status => {
            info!(
                "{} players, {} fruit",
                world.player_count(),
                world.fruit_count()
            );
            Vec::new()
        }
    }
}

pub fn dispatch(clients: &ClientManager, outgoing: Vec<Outgoing>) {
    for message in outgoing {
        match message {
            Outgoing::Broadcast(message) => {
                clients.broadcast(&message.to_string());
            }
            Outgoing::To(client_id, message) => {
                clients.send_to(client_id, &message.to_string());
            }
        }
    }
}

async fn run_game_loop(
    mut world: GameWorld,
    clients: Arc<RwLock<ClientManager>>,
    mut events: UnboundedReceiver<GameEvent>,
    config: ServerConfig,
) {
    let tick_duration = Duration::from_secs_f64(1.0 / f64::from(config.tick_rate.max(1)));
    let mut tick_interval = interval(tick_duration);
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let spawning = !config.fruit_interval.is_zero();
    let mut fruit_interval = interval(config.fruit_interval.max(tick_duration));
    fruit_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Skip the first tick since it fires immediately
    fruit_interval.tick().await;

    let mut rng = StdRng::from_entropy();
    let mut last_tick = Instant::now();
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    info!("Event channel closed, stopping game loop");
                    break;
                };

                let left = match event {
                    GameEvent::Left { client_id } => Some(client_id),
                    _ => None,
                };
                let outgoing = apply_event(&mut world, event);

                if let Some(client_id) = left {
                    clients.write().await.remove_client(client_id);
                }
                dispatch(&*clients.read().await, outgoing);
            }

            _ = tick_interval.tick() => {
                let now = Instant::now();
                let dt = now.duration_since(last_tick);
                last_tick = now;

                let outgoing = world.step(dt);
                dispatch(&*clients.read().await, outgoing);

                tick += 1;
                if tick % 300 == 0 {
                    debug!(
                        "Tick {}: {} players, {} fruit",
                        tick,
                        world.player_count(),
                        world.fruit_count()
                    );
                }
            }

            _ = fruit_interval.tick(), if spawning => {
                let outgoing = world.spawn_random_fruit(&mut rng);
                dispatch(&*clients.read().await, vec![outgoing]);
            }
        }
    }
}
