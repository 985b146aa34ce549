//! Carnival Darts entry point
//!
//! The browser build wires the canvas, DOM and input into the frame loop.
//! The native build plays one automatic round against a server headlessly.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_client {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use carnival_darts::net::http::FetchApi;
    use carnival_darts::platform::BrowserClock;
    use carnival_darts::platform::dom::HudDom;
    use carnival_darts::renderer::WgpuScene;
    use carnival_darts::{App, Session, Settings};

    type WebSession = Session<FetchApi, BrowserClock>;

    /// Everything the frame loop and event handlers share
    struct Client {
        session: WebSession,
        scene: RefCell<WgpuScene>,
        hud: RefCell<Option<HudDom>>,
        canvas: HtmlCanvasElement,
    }

    fn js_err(message: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&message.to_string())
    }

    /// Canvas backing-store size for the current layout and pixel ratio
    fn canvas_size(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        (width.max(1), height.max(1))
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(js_err)?;

        log::info!("Carnival Darts starting...");

        let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
        let document = window.document().ok_or_else(|| js_err("no document"))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| js_err("no canvas"))?
            .dyn_into()?;

        let (width, height) = canvas_size(&window, &canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(js_err)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(js_err)?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut scene = WgpuScene::new(surface, &adapter, width, height)
            .await
            .map_err(js_err)?;

        let api_base = settings.api_base.clone();
        let app = Rc::new(RefCell::new(App::new(settings)));
        app.borrow_mut().resize(width, height, &mut scene);

        let session = Session::new(
            app,
            Rc::new(FetchApi::new(api_base)),
            Rc::new(BrowserClock),
        );

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        let client = Rc::new(Client {
            session,
            scene: RefCell::new(scene),
            hud: RefCell::new(HudDom::new()),
            canvas: canvas.clone(),
        });

        setup_input_handlers(&window, &canvas, &client);
        setup_buttons(&document, &client);
        setup_resize(&window, &client);

        {
            let session = client.session.clone();
            wasm_bindgen_futures::spawn_local(async move {
                session.start().await;
            });
        }

        request_animation_frame(client);

        log::info!("Carnival Darts running!");
        Ok(())
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        client: &Rc<Client>,
    ) {
        // Pointer down on the canvas starts a hold
        {
            let client = client.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let _ = client.canvas.set_pointer_capture(event.pointer_id());
                client.session.app().borrow_mut().press();
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Up or cancel anywhere ends it
        for kind in ["pointerup", "pointercancel"] {
            let client = client.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                client.session.app().borrow_mut().release();
            });
            let _ =
                window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Space is an alternate hold trigger
        {
            let client = client.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.code() == "Space" {
                    event.prevent_default();
                    if !event.repeat() {
                        client.session.app().borrow_mut().press();
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let client = client.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.code() == "Space" {
                    event.prevent_default();
                    client.session.app().borrow_mut().release();
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &web_sys::Document, client: &Rc<Client>) {
        if let Some(btn) = document.get_element_by_id("new-game-btn") {
            let session = client.session.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let session = session.clone();
                let darts = session.app().borrow().settings().darts_per_game();
                wasm_bindgen_futures::spawn_local(async move {
                    session.new_game(darts).await;
                });
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("leaderboard-btn") {
            let session = client.session.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let session = session.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    session.show_leaderboard().await;
                });
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(window: &web_sys::Window, client: &Rc<Client>) {
        let client = client.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height) = canvas_size(&window, &client.canvas);
            client.canvas.set_width(width);
            client.canvas.set_height(height);
            let mut scene = client.scene.borrow_mut();
            client
                .session
                .app()
                .borrow_mut()
                .resize(width, height, &mut *scene);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(client: Rc<Client>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame(client, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame(client: Rc<Client>, time: f64) {
        let report = {
            let mut scene = client.scene.borrow_mut();
            client.session.app().borrow_mut().frame(time, &mut *scene)
        };

        if let Some(ticket) = report.throw {
            let session = client.session.clone();
            wasm_bindgen_futures::spawn_local(async move {
                session.complete_throw(ticket).await;
            });
        }

        let view = client.session.app().borrow().hud_view(time);
        if let Some(hud) = client.hud.borrow_mut().as_mut() {
            hud.update(&view);
        }

        request_animation_frame(client);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_client::run().await
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use carnival_darts::net::http::UreqApi;
    use carnival_darts::platform::ManualClock;
    use carnival_darts::scene::HeadlessScene;
    use carnival_darts::{App, Session, Settings};

    /// Fixed simulation step
    const STEP_MS: f64 = 16.0;
    /// Give up if the round has not finished after this many frames
    const MAX_FRAMES: u32 = 20_000;

    pub fn run() -> Result<(), String> {
        let settings = Settings::load();
        if settings.api_base.is_empty() {
            return Err("set CARNIVAL_DARTS_API to the server origin".to_string());
        }
        log::info!(
            "Playing one round against {} ({} quality)",
            settings.api_base,
            settings.quality.as_str()
        );

        let api = Rc::new(UreqApi::new(settings.api_base.clone()));
        let clock = Rc::new(ManualClock::new(0.0));
        let app = Rc::new(RefCell::new(App::new(settings)));
        let session = Session::new(app.clone(), api, clock.clone());
        let mut scene = HeadlessScene::new(1280, 720);
        app.borrow_mut().resize(1280, 720, &mut scene);

        let darts = app.borrow().settings().darts_per_game();
        if !pollster::block_on(session.new_game(darts)) {
            return Err("could not start a game".to_string());
        }

        let mut last_toast: Option<String> = None;
        for _ in 0..MAX_FRAMES {
            let now = clock.advance(STEP_MS);
            let report = {
                let mut app = app.borrow_mut();
                // Hold whenever a throw is possible; the hold auto-releases at minimum radius
                if app.hud_view(now).can_throw && !app.aim().is_holding() {
                    app.press();
                }
                app.frame(now, &mut scene)
            };

            if let Some(ticket) = report.throw {
                pollster::block_on(session.complete_throw(ticket));
            }

            let view = app.borrow().hud_view(now);
            if view.toast != last_toast {
                if let Some(toast) = view.toast.as_deref() {
                    log::warn!("Server said: {toast}");
                }
                last_toast = view.toast.clone();
            }
            if let Some(summary) = view.summary {
                log::info!(
                    "Round complete: {} points over {} throws (best {})",
                    summary.total_score,
                    summary.throws,
                    summary.best.as_deref().unwrap_or("-")
                );
                break;
            }
        }

        if pollster::block_on(session.show_leaderboard()) {
            for row in app.borrow().leaderboard().rows() {
                log::info!("{:>3}. {:<20} {}", row.rank, row.name, row.score);
            }
        }

        log::info!(
            "Rendered {} frames, {} meshes",
            scene.frames(),
            scene.mesh_count()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Carnival Darts (native) starting...");

    if let Err(err) = headless::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
