//! Server harness and shared world for HTTP behaviour tests.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The server runs the production app
//! over an in-memory store. `WorldFixture` stops it even if a test panics.

use std::cell::RefCell;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{HttpServer, web};
use awc::Client;
use registration::domain::{TRACE_ID_HEADER, fast_test_hasher};
use registration::inbound::http::health::HealthState;
use registration::outbound::deadline::DeadlineUserStore;
use registration::outbound::memory::InMemoryUserStore;
use registration::server::{AppDependencies, build_app, build_http_state};
use serde_json::Value;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

pub(crate) struct RegistrationWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    pub(crate) user_id: Option<String>,
    pub(crate) session_cookie: Option<String>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
    pub(crate) last_trace_id: Option<String>,
}

pub(crate) type SharedWorld = Rc<RefCell<RegistrationWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        let ctx = self.world.borrow();
        let server = ctx.server.clone();
        ctx.local.block_on(&ctx.runtime, async move {
            server.stop(true).await;
        });
    }
}

/// Response fields recorded by [`send`].
pub(crate) struct Recorded {
    pub(crate) status: u16,
    pub(crate) body: Value,
    pub(crate) trace_id: Option<String>,
    pub(crate) set_cookie: Option<String>,
}

/// Issue a request against the running server.
///
/// The stored session cookie is attached when `with_session` is set.
pub(crate) fn send(
    world: &SharedWorld,
    method: Method,
    path: &str,
    payload: Option<Value>,
    with_session: bool,
) -> Recorded {
    let cookie = with_session
        .then(|| world.borrow().session_cookie.clone())
        .flatten();
    let ctx = world.borrow();
    let url = format!("{}{path}", ctx.base_url);
    ctx.local.block_on(&ctx.runtime, async move {
        let mut request = Client::default().request(method, url);
        if let Some(cookie) = cookie {
            request = request.insert_header((header::COOKIE, cookie));
        }
        let mut response = match payload {
            Some(payload) => request.send_json(&payload).await,
            None => request.send().await,
        }
        .expect("request completes");
        let header_value = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };
        let trace_id = header_value(TRACE_ID_HEADER);
        let set_cookie = header_value(header::SET_COOKIE.as_str())
            .and_then(|value| value.split(';').next().map(str::to_owned));
        let status = response.status().as_u16();
        let bytes = response.body().await.expect("body reads");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Recorded {
            status,
            body,
            trace_id,
            set_cookie,
        }
    })
}

/// Store the outcome of a request as the world's latest response.
pub(crate) fn record(world: &SharedWorld, recorded: Recorded) {
    let mut ctx = world.borrow_mut();
    ctx.last_status = Some(recorded.status);
    ctx.last_body = Some(recorded.body);
    ctx.last_trace_id = recorded.trace_id;
}

async fn spawn_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;

    let store = Arc::new(DeadlineUserStore::new(
        Arc::new(InMemoryUserStore::new()),
        Duration::from_secs(5),
    ));
    let http_state = web::Data::new(build_http_state(store, fast_test_hasher()));
    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();
    let key = Key::generate();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        })
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

pub(crate) fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();
    let (base_url, server) = local
        .block_on(&runtime, spawn_server())
        .expect("server should start");

    WorldFixture {
        world: Rc::new(RefCell::new(RegistrationWorld {
            runtime,
            local,
            base_url,
            server,
            user_id: None,
            session_cookie: None,
            last_status: None,
            last_body: None,
            last_trace_id: None,
        })),
    }
}
