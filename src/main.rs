use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tessera::api;
use tessera::logger::*;
use tessera::server::*;
use tessera::settings::*;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use warp::Filter;
use warp::filters::BoxedFilter;

type Routes = BoxedFilter<(Box<dyn warp::Reply>,)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let server = Arc::new(Server::try_new(&project_settings).await?);
    let cancel = CancellationToken::new();
    let tls = tls_files(&project_settings.http)?;

    let api_v1 = warp::path("api")
        .and(warp::path("v1"))
        .and(api::v1::routes(server.clone()))
        .map(|reply| Box::new(reply) as Box<dyn warp::Reply>)
        .boxed();
    let address: SocketAddr = project_settings.http.address.parse()?;
    let mut listeners = vec![spawn_listener(api_v1, address, tls.clone(), cancel.clone())?];
    info!("HTTP adapter listening on {}", address);

    if let Some(refresh_service) = server.refresh_service.clone() {
        let rpc = api::rpc::routes(refresh_service)
            .map(|reply| Box::new(reply) as Box<dyn warp::Reply>)
            .boxed();
        let rpc_address: SocketAddr = project_settings.refresh.listen_address.parse()?;
        listeners.push(spawn_listener(rpc, rpc_address, tls, cancel.clone())?);
        info!("Refresh service listening on {}", rpc_address);
    }

    signal::ctrl_c().await?;
    cancel.cancel();

    let shutdown_timeout = Duration::from_secs(30);
    match tokio::time::timeout(shutdown_timeout, futures_util::future::join_all(listeners)).await
    {
        Ok(_) => info!("server shutdown successfully"),
        Err(_) => error!("server shutdown timed out"),
    }

    Ok(())
}

fn tls_files(http: &Http) -> anyhow::Result<Option<(String, String)>> {
    match (&http.cert_path, &http.key_path) {
        (Some(cert), Some(key)) => {
            if !std::fs::metadata(cert)?.is_file() {
                return Err(anyhow::anyhow!("TLS cert is not a regular file: {:?}", cert));
            }
            if !std::fs::metadata(key)?.is_file() {
                return Err(anyhow::anyhow!("TLS key is not a regular file: {:?}", key));
            }
            Ok(Some((cert.clone(), key.clone())))
        }
        (None, None) => Ok(None),
        _ => Err(anyhow::anyhow!(
            "http.cert_path and http.key_path must be set together"
        )),
    }
}

fn spawn_listener(
    routes: Routes,
    address: SocketAddr,
    tls: Option<(String, String)>,
    cancel: CancellationToken,
) -> anyhow::Result<JoinHandle<()>> {
    let routes = routes.recover(api::v1::recover_error);
    let shutdown = async move { cancel.cancelled().await };
    let handle = match tls {
        Some((cert, key)) => {
            let (_, serving) = warp::serve(routes)
                .tls()
                .cert_path(cert)
                .key_path(key)
                .bind_with_graceful_shutdown(address, shutdown);
            tokio::spawn(serving)
        }
        None => {
            let (_, serving) =
                warp::serve(routes).try_bind_with_graceful_shutdown(address, shutdown)?;
            tokio::spawn(serving)
        }
    };
    Ok(handle)
}
