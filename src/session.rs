//! Async operations on a shared `App`
//!
//! Each operation borrows the app only between awaits: it reads what the
//! request needs, drops the borrow, awaits the network, then borrows again
//! to apply the answer. Failures become toasts; nothing is retried.

use std::cell::RefCell;
use std::rc::Rc;

use crate::app::{App, ThrowTicket};
use crate::net::{GameApi, NewGameRequest};
use crate::platform::Clock;
use crate::sim::AimSample;

pub struct Session<A: GameApi, C: Clock> {
    app: Rc<RefCell<App>>,
    api: Rc<A>,
    clock: Rc<C>,
}

impl<A: GameApi, C: Clock> Clone for Session<A, C> {
    fn clone(&self) -> Self {
        Self {
            app: Rc::clone(&self.app),
            api: Rc::clone(&self.api),
            clock: Rc::clone(&self.clock),
        }
    }
}

impl<A: GameApi, C: Clock> Session<A, C> {
    pub fn new(app: Rc<RefCell<App>>, api: Rc<A>, clock: Rc<C>) -> Self {
        Self { app, api, clock }
    }

    pub fn app(&self) -> &Rc<RefCell<App>> {
        &self.app
    }

    fn now(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Resume the server's live game, or start one
    pub async fn start(&self) -> bool {
        if self.fetch_state().await {
            return true;
        }
        let darts = self.app.borrow().settings().darts_per_game();
        self.new_game(darts).await
    }

    /// Load the live game. False when there is none or the request failed.
    pub async fn fetch_state(&self) -> bool {
        match self.api.fetch_state().await {
            Ok(Some(state)) => {
                log::info!("Resuming game {} (seed {})", state.game_id, state.resolved_seed());
                self.app.borrow_mut().replace_state(state, self.now());
                true
            }
            Ok(None) => {
                log::info!("No live game on the server");
                false
            }
            Err(err) => {
                log::warn!("Fetching game state failed: {err}");
                self.app.borrow_mut().show_error(&err, self.now());
                false
            }
        }
    }

    pub async fn new_game(&self, darts_total: u32) -> bool {
        let request = NewGameRequest {
            darts_total: darts_total.max(1),
        };
        match self.api.new_game(&request).await {
            Ok(state) => {
                log::info!(
                    "New game {} with {} darts (seed {})",
                    state.game_id,
                    state.darts_total,
                    state.resolved_seed()
                );
                self.app.borrow_mut().replace_state(state, self.now());
                true
            }
            Err(err) => {
                log::warn!("Starting a new game failed: {err}");
                self.app.borrow_mut().show_error(&err, self.now());
                false
            }
        }
    }

    /// Throw at a board-space aim. Guard violations are silent no-ops.
    pub async fn throw_at(&self, x: f32, y: f32, radius: f32) -> bool {
        let shot = AimSample { x, y, radius };
        let ticket = self.app.borrow_mut().dispatch_throw(self.now(), shot);
        match ticket {
            Some(ticket) => self.complete_throw(ticket).await,
            None => false,
        }
    }

    /// Send a ticket produced by a frame and apply the answer
    pub async fn complete_throw(&self, ticket: ThrowTicket) -> bool {
        let result = self.api.throw(&ticket.request).await;
        self.app
            .borrow_mut()
            .resolve_throw(ticket, result, self.now())
    }

    /// Toggle the leaderboard; closing never hits the network
    pub async fn show_leaderboard(&self) -> bool {
        {
            let mut app = self.app.borrow_mut();
            if app.leaderboard().is_open() {
                app.leaderboard_mut().close();
                return false;
            }
        }

        match self.api.leaderboard().await {
            Ok(entries) => {
                log::info!("Leaderboard loaded ({} entries)", entries.len());
                self.app.borrow_mut().leaderboard_mut().open_with(entries);
                true
            }
            Err(err) => {
                log::warn!("Loading the leaderboard failed: {err}");
                self.app.borrow_mut().show_error(&err, self.now());
                false
            }
        }
    }
}
