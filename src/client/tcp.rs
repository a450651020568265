//! The tag-prefixed binary protocol spoken with the game server.
//!
//! Frames start with a three-letter ASCII tag. Inbound: `SET` (grid
//! dimensions), `HUM` (human cells), `HME` (our home cell), `MAP` (initial
//! placements), `UPD` (per-turn diff, answered with our coup), `END` (game
//! over, a rematch may follow) and `BYE` (connection closes). Outbound:
//! `NME` (our name) and `MOV` (the chosen coup). All counts fit in one byte.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::client::game::{Game, RawChange};
use crate::game::coordinates::Coordinates;
use crate::game::moves::Coup;
use crate::players::Player;
use crate::{NocturneError, Result};

pub struct TcpClient<P: Player> {
    stream: TcpStream,
    name: String,
    player: P,
    game: Game,
}

impl<P: Player> TcpClient<P> {
    /// Connects to the server. The name travels in a one-byte-length frame
    /// and must be plain ASCII.
    pub async fn connect(addr: &str, name: &str, player: P) -> Result<TcpClient<P>> {
        if name.is_empty() || name.len() > 255 || !name.is_ascii() {
            return Err(NocturneError::Protocol(format!(
                "player name must be 1-255 ASCII characters, got {:?}",
                name
            )));
        }

        let stream = TcpStream::connect(addr).await?;
        Ok(TcpClient { stream, name: name.to_string(), player, game: Game::new() })
    }

    /// Announces our name, then serves the game loop until the server says
    /// goodbye.
    pub async fn run(mut self) -> Result<()> {
        self.send_name().await?;

        loop {
            let mut tag = [0u8; 3];
            self.stream.read_exact(&mut tag).await?;
            match &tag {
                b"SET" => {
                    let height = self.stream.read_u8().await?;
                    let width = self.stream.read_u8().await?;
                    log::info!("board is {} rows by {} columns", height, width);
                    self.game.set(height, width);
                }
                b"HUM" => {
                    let positions = self.read_positions().await?;
                    self.game.set_human_positions(&positions)?;
                }
                b"HME" => {
                    let pos = self.read_position().await?;
                    log::info!("starting at ({}, {})", pos.x, pos.y);
                    self.game.set_home(pos);
                }
                b"MAP" => {
                    let changes = self.read_changes().await?;
                    self.game.apply_map(&changes)?;
                }
                b"UPD" => {
                    let changes = self.read_changes().await?;
                    self.game.apply_update(&changes)?;
                    let coup = self.think();
                    self.send_moves(&coup).await?;
                }
                b"END" => {
                    log::info!("game over, staying around for a rematch");
                    self.game.reset();
                }
                b"BYE" => {
                    log::info!("server said goodbye");
                    return Ok(());
                }
                other => {
                    return Err(NocturneError::Protocol(format!(
                        "unknown message tag {:?}",
                        String::from_utf8_lossy(other)
                    )));
                }
            }
        }
    }

    /// Runs the engine. The search is pure CPU and can take most of the turn
    /// budget, so it must not sit on an async worker.
    fn think(&mut self) -> Coup {
        let state = self.game.state();
        let coup = tokio::task::block_in_place(|| self.player.choose_coup(state));
        if coup.is_empty() {
            log::warn!("no coup left to play, conceding the turn");
        }
        coup
    }

    async fn send_name(&mut self) -> Result<()> {
        let mut frame = Vec::with_capacity(4 + self.name.len());
        frame.extend_from_slice(b"NME");
        frame.push(self.name.len() as u8);
        frame.extend_from_slice(self.name.as_bytes());
        self.stream.write_all(&frame).await?;
        Ok(())
    }

    async fn send_moves(&mut self, coup: &Coup) -> Result<()> {
        let mut frame = Vec::with_capacity(4 + coup.len() * 5);
        frame.extend_from_slice(b"MOV");
        frame.push(coup.len() as u8);
        for mv in coup {
            frame.extend_from_slice(&[mv.start.x, mv.start.y, mv.n, mv.end.x, mv.end.y]);
        }
        self.stream.write_all(&frame).await?;
        Ok(())
    }

    async fn read_position(&mut self) -> Result<Coordinates> {
        let x = self.stream.read_u8().await?;
        let y = self.stream.read_u8().await?;
        Ok(Coordinates::new(x, y))
    }

    async fn read_positions(&mut self) -> Result<Vec<Coordinates>> {
        let n = self.stream.read_u8().await?;
        let mut positions = Vec::with_capacity(usize::from(n));
        for _ in 0..n {
            positions.push(self.read_position().await?);
        }
        Ok(positions)
    }

    async fn read_changes(&mut self) -> Result<Vec<RawChange>> {
        let n = self.stream.read_u8().await?;
        let mut changes = Vec::with_capacity(usize::from(n));
        for _ in 0..n {
            let pos = self.read_position().await?;
            let humans = self.stream.read_u8().await?;
            let vampires = self.stream.read_u8().await?;
            let werewolves = self.stream.read_u8().await?;
            changes.push(RawChange { pos, humans, vampires, werewolves });
        }
        Ok(changes)
    }
}
