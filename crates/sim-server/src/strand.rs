//! Game Strand
//!
//! A single tokio task owns the `Game`. Every state-touching operation
//! (joins, moves, queries, ticks and saves) is sent to it as a `Request`
//! and answered over a oneshot channel, so the simulation itself needs no
//! locks. The same task runs the automatic ticker when one is configured.

use serde::Serialize;
use sim_core::{
    persistence, tick_delta_from_millis, Game, GameError, JoinOutcome, SessionView, TickReport,
};
use sim_model::{DogId, Map, MapId};
use std::future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::error::ServerError;

const REQUEST_QUEUE: usize = 256;

/// How the strand drives and saves the game.
#[derive(Debug, Clone, Default)]
pub struct StrandSettings {
    /// Automatic tick period. `None` or zero enables manual `Tick` requests.
    pub tick_period: Option<Duration>,
    /// Game time between periodic saves.
    pub save_period: Option<Duration>,
    pub state_file: Option<PathBuf>,
}

/// Operations accepted by the strand.
#[derive(Debug, Clone)]
pub enum Request {
    Join { name: String, map_id: MapId },
    Move { token: String, direction: String },
    State { token: String },
    Players { token: String },
    Maps,
    Map { id: MapId },
    /// Manual time advance; only allowed without an automatic ticker.
    Tick { time_delta_ms: i64 },
    Save,
    /// Final save, then stop.
    Shutdown,
}

/// Id and name pair, as listed by map and player queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing<Id> {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone)]
pub enum Response {
    Joined(JoinOutcome),
    Moved,
    State(SessionView),
    Players(Vec<Listing<DogId>>),
    Maps(Vec<Listing<MapId>>),
    Map(Arc<Map>),
    Ticked(TickReport),
    Saved,
    ShuttingDown,
}

type Reply = oneshot::Sender<Result<Response, ServerError>>;

/// Cloneable sender side of the strand.
#[derive(Debug, Clone)]
pub struct StrandHandle {
    tx: mpsc::Sender<(Request, Reply)>,
}

impl StrandHandle {
    /// Sends a request and waits for the strand's answer.
    pub async fn call(&self, request: Request) -> Result<Response, ServerError> {
        let (reply, answer) = oneshot::channel();
        self.tx
            .send((request, reply))
            .await
            .map_err(|_| ServerError::StrandClosed)?;
        answer.await.map_err(|_| ServerError::StrandClosed)?
    }

    pub async fn join(&self, name: &str, map_id: &str) -> Result<JoinOutcome, ServerError> {
        let request = Request::Join {
            name: name.to_string(),
            map_id: MapId::new(map_id),
        };
        match self.call(request).await? {
            Response::Joined(outcome) => Ok(outcome),
            other => Err(unexpected(other)),
        }
    }

    pub async fn move_player(&self, token: &str, direction: &str) -> Result<(), ServerError> {
        let request = Request::Move {
            token: token.to_string(),
            direction: direction.to_string(),
        };
        self.call(request).await.map(|_| ())
    }

    pub async fn state(&self, token: &str) -> Result<SessionView, ServerError> {
        match self.call(Request::State { token: token.to_string() }).await? {
            Response::State(view) => Ok(view),
            other => Err(unexpected(other)),
        }
    }

    pub async fn tick(&self, time_delta_ms: i64) -> Result<TickReport, ServerError> {
        match self.call(Request::Tick { time_delta_ms }).await? {
            Response::Ticked(report) => Ok(report),
            other => Err(unexpected(other)),
        }
    }

    pub async fn save(&self) -> Result<(), ServerError> {
        self.call(Request::Save).await.map(|_| ())
    }

    pub async fn shutdown(&self) -> Result<(), ServerError> {
        self.call(Request::Shutdown).await.map(|_| ())
    }
}

fn unexpected(response: Response) -> ServerError {
    ServerError::UnexpectedResponse(format!("{:?}", response))
}

/// Starts the strand task. The task ends after a `Shutdown` request or once
/// every handle is dropped, saving the state on the way out.
pub fn spawn(
    game: Game,
    mut settings: StrandSettings,
) -> (StrandHandle, JoinHandle<Result<(), ServerError>>) {
    settings.tick_period = settings.tick_period.filter(|period| !period.is_zero());
    let (tx, rx) = mpsc::channel(REQUEST_QUEUE);
    let strand = Strand { game, settings, rx };
    (StrandHandle { tx }, tokio::spawn(strand.run()))
}

struct Strand {
    game: Game,
    settings: StrandSettings,
    rx: mpsc::Receiver<(Request, Reply)>,
}

impl Strand {
    async fn run(mut self) -> Result<(), ServerError> {
        let mut ticker = self.settings.tick_period.map(|period| {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });
        match self.settings.tick_period {
            Some(period) => tracing::info!("ticker started with period {:?}", period),
            None => tracing::info!("manual ticks enabled"),
        }

        let mut last_tick = Instant::now();
        loop {
            tokio::select! {
                _ = next_tick(&mut ticker) => {
                    let now = Instant::now();
                    let delta = now - last_tick;
                    last_tick = now;
                    self.advance(delta);
                }
                message = self.rx.recv() => {
                    let Some((request, reply)) = message else {
                        break;
                    };
                    if let Request::Shutdown = request {
                        let result = self.final_save().map(|_| Response::ShuttingDown);
                        let _ = reply.send(result);
                        tracing::info!("strand stopped");
                        return Ok(());
                    }
                    let _ = reply.send(self.handle(request));
                }
            }
        }

        self.final_save()?;
        tracing::info!("strand stopped");
        Ok(())
    }

    fn handle(&mut self, request: Request) -> Result<Response, ServerError> {
        match request {
            Request::Join { name, map_id } => Ok(Response::Joined(self.game.join(&name, &map_id)?)),
            Request::Move { token, direction } => {
                self.game.move_player(&token, &direction)?;
                Ok(Response::Moved)
            }
            Request::State { token } => Ok(Response::State(self.game.state_for(&token)?)),
            Request::Players { token } => {
                let players = self
                    .game
                    .players_on_map(&token)?
                    .into_iter()
                    .map(|p| Listing {
                        id: p.id,
                        name: p.name.clone(),
                    })
                    .collect();
                Ok(Response::Players(players))
            }
            Request::Maps => Ok(Response::Maps(
                self.game
                    .maps()
                    .iter()
                    .map(|map| Listing {
                        id: map.id().clone(),
                        name: map.name().to_string(),
                    })
                    .collect(),
            )),
            Request::Map { id } => self
                .game
                .find_map(&id)
                .map(|map| Response::Map(Arc::clone(map)))
                .ok_or_else(|| GameError::MapNotFound(id).into()),
            Request::Tick { time_delta_ms } => {
                if self.settings.tick_period.is_some() {
                    return Err(ServerError::TickingDisabled);
                }
                let delta = tick_delta_from_millis(time_delta_ms)?;
                Ok(Response::Ticked(self.advance(delta)))
            }
            Request::Save => {
                let path = self.settings.state_file.as_ref().ok_or(ServerError::NoStateFile)?;
                persistence::save_to_file(&mut self.game, path)?;
                Ok(Response::Saved)
            }
            Request::Shutdown => Ok(Response::ShuttingDown),
        }
    }

    /// Ticks the game and saves once the save period has passed.
    fn advance(&mut self, delta: Duration) -> TickReport {
        let report = self.game.tick(delta);

        if let (Some(path), Some(period)) = (&self.settings.state_file, self.settings.save_period) {
            if self.game.time_since_save() >= period {
                if let Err(e) = persistence::save_to_file(&mut self.game, path) {
                    tracing::error!("periodic save failed: {}", e);
                }
            }
        }
        report
    }

    fn final_save(&mut self) -> Result<(), ServerError> {
        if let Some(path) = &self.settings.state_file {
            persistence::save_to_file(&mut self.game, path)?;
        }
        Ok(())
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => future::pending::<()>().await,
    }
}
