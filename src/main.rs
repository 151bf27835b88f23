use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

use fresco::app::loader::{DirAppDiscoverer, ManifestAppCreator};
use fresco::config::Config;
use fresco::handler::{
    DebugAssetStore, DebugIntrospector, DirDebugAssets, DiskStaticResolver, Dispatcher,
    NoDebugAssets,
};
use fresco::http::Request;
use fresco::logger::{self, DebugAppender};
use fresco::routing::AppRegistry;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    logger::init(&cfg)?;

    let appender = if cfg.debug.log_endpoint {
        let appender = Arc::new(DebugAppender::new(cfg.debug.log_buffer_size));
        logger::attach_debug_appender(Arc::clone(&appender));
        Some(appender)
    } else {
        None
    };

    // The registry must be complete before the listener accepts anything
    let discoverer = DirAppDiscoverer::new(&cfg.apps.root_dir);
    let registry = Arc::new(AppRegistry::load(&discoverer, &ManifestAppCreator)?);
    logger::log_info(&format!("{} app(s) loaded.", registry.len()));

    let debug_assets: Box<dyn DebugAssetStore> = match &cfg.debug.assets_dir {
        Some(dir) => Box::new(DirDebugAssets::new(dir)),
        None => Box::new(NoDebugAssets),
    };
    let dispatcher = Arc::new(Dispatcher::new(
        registry,
        Arc::new(DiskStaticResolver),
        DebugIntrospector::new(debug_assets, appender),
    ));

    let addr = cfg.get_socket_addr()?;
    let listener = create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let active_connections = Arc::new(AtomicUsize::new(0));
    loop {
        match listener.accept().await {
            Ok((stream, _peer_addr)) => {
                accept_connection(stream, &cfg, &dispatcher, &active_connections);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}

/// Accept one connection, enforcing the configured connection limit.
fn accept_connection(
    stream: tokio::net::TcpStream,
    cfg: &Config,
    dispatcher: &Arc<Dispatcher>,
    active_connections: &Arc<AtomicUsize>,
) {
    // Increment first, then check, so the limit cannot be raced past
    let prev_count = active_connections.fetch_add(1, Ordering::SeqCst);
    if let Some(max_conn) = cfg.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            active_connections.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    handle_connection(stream, cfg, Arc::clone(dispatcher), Arc::clone(active_connections));
}

/// Serve one HTTP/1.1 connection in its own task.
fn handle_connection(
    stream: tokio::net::TcpStream,
    cfg: &Config,
    dispatcher: Arc<Dispatcher>,
    active_connections: Arc<AtomicUsize>,
) {
    let keep_alive = cfg.performance.keep_alive_timeout > 0;
    let timeout_duration = std::time::Duration::from_secs(std::cmp::max(
        cfg.performance.read_timeout,
        cfg.performance.write_timeout,
    ));

    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(keep_alive);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let dispatcher = Arc::clone(&dispatcher);
                async move {
                    let request = Request::from_hyper(&req);
                    let response = dispatcher.serve(&request).await;
                    Ok::<_, std::convert::Infallible>(response.into_hyper())
                }
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection timeout after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }

        active_connections.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Create a `TcpListener` with `SO_REUSEPORT` and `SO_REUSEADDR` enabled,
/// so a replacement process can bind before this one exits.
fn create_reusable_listener(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_port(true)?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
