//! Server commands (serve, refresh, clear-store)

use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use super::{build_service, fetcher, load_or_exit, runtime, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::metadata::ItemMetadataTable;
use crate::schedule::PeriodicTask;
use crate::server;
use crate::store::FileStore;

/// Run the serve command
pub fn run_serve(config_path: Option<&Path>) -> ExitCode {
    let config = match load_or_exit(config_path) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let port = match config.require_port() {
        Ok(port) => port,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };

    rt.block_on(async {
        let fetcher = match fetcher(&config) {
            Ok(fetcher) => fetcher,
            Err(code) => return code,
        };
        let service = match build_service(&config, Arc::clone(&fetcher)) {
            Ok(service) => Arc::new(service),
            Err(code) => return code,
        };

        let refresh_service = Arc::clone(&service);
        let refresh = PeriodicTask::new("refresh", Duration::from_secs(config.schedule.refresh_secs))
            .immediate()
            .spawn(move || {
                let service = Arc::clone(&refresh_service);
                let source = Arc::clone(&fetcher);
                async move { service.refresh(source.as_ref()).await.map(|_| ()) }
            });

        let evict_service = Arc::clone(&service);
        let evict = PeriodicTask::new("evict", Duration::from_secs(config.schedule.evict_secs)).spawn(
            move || {
                let service = Arc::clone(&evict_service);
                async move {
                    let removed = service.clear_store().await?;
                    info!(removed, "Evicted stored assets");
                    Ok::<_, crate::service::AssetError>(())
                }
            },
        );

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let result = server::serve(addr, service).await;
        refresh.abort();
        evict.abort();

        match result {
            Ok(()) => ExitCode::from(EXIT_SUCCESS),
            Err(e) => {
                error!(error = %e, port, "Server failed");
                ExitCode::from(EXIT_ERROR)
            }
        }
    })
}

/// Run the refresh command
pub fn run_refresh(config_path: Option<&Path>) -> ExitCode {
    let config = match load_or_exit(config_path) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };

    rt.block_on(async {
        let fetcher = match fetcher(&config) {
            Ok(fetcher) => fetcher,
            Err(code) => return code,
        };
        let metadata = ItemMetadataTable::new(Some(config.paths.items_snapshot.clone()));
        match metadata.refresh(fetcher.as_ref()).await {
            Ok(count) => {
                println!("Wrote {} items to {}", count, config.paths.items_snapshot.display());
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        }
    })
}

/// Run the clear-store command
pub fn run_clear_store(config_path: Option<&Path>) -> ExitCode {
    let config = match load_or_exit(config_path) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };

    let store = FileStore::new(&config.paths.store_dir);
    match rt.block_on(store.clear()) {
        Ok(removed) => {
            println!("Removed {} stored assets from {}", removed, store.dir().display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
