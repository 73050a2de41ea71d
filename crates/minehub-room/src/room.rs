//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Each room runs in its own task and talks to the outside world through
//! an mpsc channel. Commands are handled strictly one at a time, so the
//! room needs no lock of its own and rooms never block each other.

use std::collections::HashMap;

use minehub_protocol::{Coord, PlayerId, Recipient, RoomId};
use tokio::sync::{mpsc, oneshot};

use crate::{
    ChatMessage, Departure, Player, RevealReport, Room, RoomError, RoomEvent, RoomOutbound,
    RoomSnapshot, RoomSummary,
};

/// Channel sender for delivering room events to one connection.
pub type PlayerSender = mpsc::UnboundedSender<RoomOutbound>;

type Reply<T> = oneshot::Sender<Result<T, RoomError>>;

/// Commands sent to a room actor through its channel.
///
/// Every variant carries a `oneshot` reply channel: the caller sends the
/// command and awaits the result on it.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
        reply: Reply<Player>,
    },
    Leave {
        player_id: PlayerId,
        reply: Reply<Departure>,
    },
    Reveal {
        player_id: PlayerId,
        at: Coord,
        reply: Reply<RevealReport>,
    },
    ToggleFlag {
        player_id: PlayerId,
        at: Coord,
        reply: Reply<bool>,
    },
    Reset {
        reply: Reply<()>,
    },
    Chat {
        player_id: PlayerId,
        text: String,
        reply: Reply<ChatMessage>,
    },
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
    Summary {
        reply: oneshot::Sender<RoomSummary>,
    },
    Shutdown,
}

/// Handle to a running room actor.
///
/// Cheap to clone: it's an `mpsc::Sender` plus the room id. The
/// [`RoomRegistry`](crate::RoomRegistry) holds one per room.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Returns `true` if both handles talk to the same actor.
    pub fn same_room(&self, other: &RoomHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    /// Adds a player. Events for the room start flowing into `sender`
    /// right away, beginning with the join itself.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<Player, RoomError> {
        let name = name.into();
        self.request(|reply| RoomCommand::Join {
            player_id,
            name,
            sender,
            reply,
        })
        .await
    }

    /// Removes a player. The actor stops once the roster is empty.
    pub async fn leave(&self, player_id: PlayerId) -> Result<Departure, RoomError> {
        self.request(|reply| RoomCommand::Leave { player_id, reply })
            .await
    }

    pub async fn reveal(&self, player_id: PlayerId, at: Coord) -> Result<RevealReport, RoomError> {
        self.request(|reply| RoomCommand::Reveal {
            player_id,
            at,
            reply,
        })
        .await
    }

    pub async fn toggle_flag(&self, player_id: PlayerId, at: Coord) -> Result<bool, RoomError> {
        self.request(|reply| RoomCommand::ToggleFlag {
            player_id,
            at,
            reply,
        })
        .await
    }

    pub async fn reset(&self) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Reset { reply }).await
    }

    pub async fn send_message(
        &self,
        player_id: PlayerId,
        text: impl Into<String>,
    ) -> Result<ChatMessage, RoomError> {
        let text = text.into();
        self.request(|reply| RoomCommand::Chat {
            player_id,
            text,
            reply,
        })
        .await
    }

    /// Full room state (board masked).
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub async fn summary(&self) -> Result<RoomSummary, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Summary { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Stops the actor. Commands already queued are dropped.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(command(reply_tx)).await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    async fn send(&self, command: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop until shutdown or until the last player
    /// leaves.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room.id(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    name,
                    sender,
                    reply,
                } => {
                    let _ = reply.send(self.handle_join(player_id, &name, sender));
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.handle_leave(player_id);
                    let empty = matches!(&result, Ok(d) if d.remaining == 0);
                    let _ = reply.send(result);
                    if empty {
                        tracing::info!(room_id = %self.room.id(), "last player left, closing room");
                        break;
                    }
                }
                RoomCommand::Reveal {
                    player_id,
                    at,
                    reply,
                } => {
                    let _ = reply.send(self.handle_reveal(player_id, at));
                }
                RoomCommand::ToggleFlag {
                    player_id,
                    at,
                    reply,
                } => {
                    let _ = reply.send(self.handle_toggle_flag(player_id, at));
                }
                RoomCommand::Reset { reply } => {
                    let _ = reply.send(self.handle_reset());
                }
                RoomCommand::Chat {
                    player_id,
                    text,
                    reply,
                } => {
                    let _ = reply.send(self.handle_chat(player_id, &text));
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.room.snapshot());
                }
                RoomCommand::Summary { reply } => {
                    let _ = reply.send(self.room.summary());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room.id(), "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room.id(), "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: &str,
        sender: PlayerSender,
    ) -> Result<Player, RoomError> {
        let player = self.room.add_player(player_id, name)?;
        self.senders.insert(player_id, sender);

        tracing::info!(
            room_id = %self.room.id(),
            %player_id,
            players = self.room.player_count(),
            "player joined"
        );

        self.dispatch(
            Recipient::All,
            RoomEvent::PlayerJoined {
                player: player.clone(),
                players: self.room.players().to_vec(),
            },
        );
        self.dispatch(
            Recipient::Player(player_id),
            RoomEvent::GameState {
                snapshot: self.room.snapshot(),
            },
        );
        Ok(player)
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<Departure, RoomError> {
        let departure = self.room.remove_player(player_id)?;
        self.senders.remove(&player_id);

        tracing::info!(
            room_id = %self.room.id(),
            %player_id,
            players = departure.remaining,
            "player left"
        );

        self.dispatch(
            Recipient::All,
            RoomEvent::PlayerLeft {
                player_id,
                players: self.room.players().to_vec(),
            },
        );
        if let Some(summary) = &departure.finished {
            self.dispatch(
                Recipient::All,
                RoomEvent::GameFinished {
                    summary: summary.clone(),
                },
            );
        }
        Ok(departure)
    }

    fn handle_reveal(&mut self, player_id: PlayerId, at: Coord) -> Result<RevealReport, RoomError> {
        let report = self.room.reveal(player_id, at).inspect_err(|err| {
            tracing::debug!(room_id = %self.room.id(), %player_id, %err, "reveal rejected");
        })?;

        self.dispatch(
            Recipient::All,
            RoomEvent::CellsRevealed {
                player_id,
                cells: report.outcome.revealed.clone(),
                hit_mine: report.outcome.hit_mine,
                score: report.score,
            },
        );
        if report.eliminated {
            self.dispatch(Recipient::All, RoomEvent::PlayerEliminated { player_id, at });
        }
        if let Some(summary) = &report.finished {
            self.dispatch(
                Recipient::All,
                RoomEvent::GameFinished {
                    summary: summary.clone(),
                },
            );
        }
        Ok(report)
    }

    fn handle_toggle_flag(&mut self, player_id: PlayerId, at: Coord) -> Result<bool, RoomError> {
        let flagged = self.room.toggle_flag(player_id, at).inspect_err(|err| {
            tracing::debug!(room_id = %self.room.id(), %player_id, %err, "flag rejected");
        })?;

        self.dispatch(
            Recipient::All,
            RoomEvent::FlagToggled {
                player_id,
                row: at.row,
                col: at.col,
                flagged,
            },
        );
        Ok(flagged)
    }

    fn handle_reset(&mut self) -> Result<(), RoomError> {
        self.room.reset()?;
        self.dispatch(
            Recipient::All,
            RoomEvent::GameReset {
                snapshot: self.room.snapshot(),
            },
        );
        Ok(())
    }

    fn handle_chat(&mut self, player_id: PlayerId, text: &str) -> Result<ChatMessage, RoomError> {
        let message = self.room.add_message(player_id, text)?;
        self.dispatch(
            Recipient::All,
            RoomEvent::MessageReceived {
                message: message.clone(),
            },
        );
        Ok(message)
    }

    /// Delivers an event to every member covered by `recipient`. Members
    /// whose connection is gone are skipped silently; their leave is on
    /// its way.
    fn dispatch(&self, recipient: Recipient, event: RoomEvent) {
        for player in self.room.players() {
            if !recipient.includes(player.id) {
                continue;
            }
            if let Some(sender) = self.senders.get(&player.id) {
                let _ = sender.send(RoomOutbound {
                    room_id: self.room.id().clone(),
                    event: event.clone(),
                });
            }
        }
    }
}

/// Spawns a room actor task and returns a handle to it.
///
/// `channel_size` bounds the command queue: when it fills up, callers
/// wait.
pub(crate) fn spawn_room(room: Room, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let room_id = room.id().clone();

    let actor = RoomActor {
        room,
        senders: HashMap::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
