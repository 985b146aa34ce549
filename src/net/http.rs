//! HTTP transports: `fetch` in the browser, `ureq` natively

use super::protocol::{
    LEADERBOARD_PATH, LeaderboardEnvelope, NEW_GAME_PATH, STATE_PATH, StateEnvelope, THROW_PATH,
    ThrowEnvelope, decode_envelope,
};
use super::{
    ApiError, GameApi, GameState, LeaderboardEntry, NewGameRequest, ThrowRequest, ThrowResult,
    endpoint,
};

#[cfg(target_arch = "wasm32")]
pub use browser::FetchApi;
#[cfg(not(target_arch = "wasm32"))]
pub use native::UreqApi;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::*;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestCredentials, RequestInit, Response};

    fn js_error(value: JsValue) -> ApiError {
        ApiError::Transport(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }

    /// Same-origin (or `api_base`) JSON over `window.fetch`
    pub struct FetchApi {
        base: String,
    }

    impl FetchApi {
        pub fn new(base: impl Into<String>) -> Self {
            Self { base: base.into() }
        }

        async fn send(
            &self,
            method: &str,
            path: &str,
            body: Option<String>,
        ) -> Result<(u16, String), ApiError> {
            let init = RequestInit::new();
            init.set_method(method);
            init.set_credentials(RequestCredentials::SameOrigin);
            if let Some(body) = body.as_deref() {
                init.set_body(&JsValue::from_str(body));
            }

            let request =
                Request::new_with_str_and_init(&endpoint(&self.base, path), &init).map_err(js_error)?;
            let headers = request.headers();
            headers.set("Accept", "application/json").map_err(js_error)?;
            if body.is_some() {
                headers.set("Content-Type", "application/json").map_err(js_error)?;
            }

            let window =
                web_sys::window().ok_or_else(|| ApiError::Transport("no window".to_string()))?;
            let value = JsFuture::from(window.fetch_with_request(&request))
                .await
                .map_err(js_error)?;
            let response: Response = value.dyn_into().map_err(js_error)?;
            let text = JsFuture::from(response.text().map_err(js_error)?)
                .await
                .map_err(js_error)?;
            Ok((response.status(), text.as_string().unwrap_or_default()))
        }

        async fn post<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<(u16, String), ApiError> {
            let json = serde_json::to_string(body).map_err(|e| ApiError::Decode(e.to_string()))?;
            self.send("POST", path, Some(json)).await
        }
    }

    impl GameApi for FetchApi {
        async fn fetch_state(&self) -> Result<Option<GameState>, ApiError> {
            let (status, body) = self.send("GET", STATE_PATH, None).await?;
            decode_envelope::<StateEnvelope>(status, &body)?.into_live_state()
        }

        async fn new_game(&self, request: &NewGameRequest) -> Result<GameState, ApiError> {
            let (status, body) = self.post(NEW_GAME_PATH, request).await?;
            decode_envelope::<StateEnvelope>(status, &body)?.into_state()
        }

        async fn throw(&self, request: &ThrowRequest) -> Result<ThrowResult, ApiError> {
            let (status, body) = self.post(THROW_PATH, request).await?;
            decode_envelope::<ThrowEnvelope>(status, &body)?.into_result()
        }

        async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
            let (status, body) = self.send("GET", LEADERBOARD_PATH, None).await?;
            decode_envelope::<LeaderboardEnvelope>(status, &body)?.into_entries()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::*;
    use std::time::Duration;

    const REQUEST_TIMEOUT_SECS: u64 = 15;

    type HttpResult = Result<ureq::http::Response<ureq::Body>, ureq::Error>;

    /// Blocking client for the headless driver. Futures resolve on first poll.
    pub struct UreqApi {
        agent: ureq::Agent,
        base: String,
    }

    impl UreqApi {
        pub fn new(base: impl Into<String>) -> Self {
            Self {
                agent: build_agent(),
                base: base.into(),
            }
        }

        fn url(&self, path: &str) -> String {
            endpoint(&self.base, path)
        }
    }

    fn build_agent() -> ureq::Agent {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
            .http_status_as_error(false)
            .build();
        config.into()
    }

    fn read(result: HttpResult) -> Result<(u16, String), ApiError> {
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok((status, body))
    }

    impl GameApi for UreqApi {
        async fn fetch_state(&self) -> Result<Option<GameState>, ApiError> {
            let (status, body) = read(self.agent.get(&self.url(STATE_PATH)).call())?;
            decode_envelope::<StateEnvelope>(status, &body)?.into_live_state()
        }

        async fn new_game(&self, request: &NewGameRequest) -> Result<GameState, ApiError> {
            let (status, body) = read(self.agent.post(&self.url(NEW_GAME_PATH)).send_json(request))?;
            decode_envelope::<StateEnvelope>(status, &body)?.into_state()
        }

        async fn throw(&self, request: &ThrowRequest) -> Result<ThrowResult, ApiError> {
            let (status, body) = read(self.agent.post(&self.url(THROW_PATH)).send_json(request))?;
            decode_envelope::<ThrowEnvelope>(status, &body)?.into_result()
        }

        async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
            let (status, body) = read(self.agent.get(&self.url(LEADERBOARD_PATH)).call())?;
            decode_envelope::<LeaderboardEnvelope>(status, &body)?.into_entries()
        }
    }
}
