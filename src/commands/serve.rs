use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use futures_util::stream::Stream;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::{
    ServeArgs,
    build::{
        BuildResult, Builder, FileWatcher, PathClassifier, WatchEvent, WatchPaths,
        base_path_from_config,
    },
    config::Config,
};

/// Route browsers subscribe to for reload notifications.
const LIVE_RELOAD_PATH: &str = "/_coursebook/live-reload";

/// SSE handler for live reload notifications.
async fn live_reload_handler(
    State(tx): State<broadcast::Sender<()>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = tx.subscribe();
    let stream = async_stream::stream! {
        let mut rx = rx;
        loop {
            match rx.recv().await {
                Ok(_) => {
                    yield Ok(Event::default().event("reload").data("reload"));
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    // Only the latest reload matters
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    break;
                }
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn run(args: &ServeArgs) -> Result<(), anyhow::Error> {
    let config_path = super::config_path(args.config_file.as_deref())?;
    let config = Config::load_from_arg(Some(config_path.as_path())).await?;
    let base_path = base_path_from_config(&config_path);

    let (reload_tx, _) = broadcast::channel::<()>(16);

    println!("Building site...");
    let result = {
        let config = config.clone();
        let base_path = base_path.clone();
        tokio::task::spawn_blocking(move || do_build(&config, &base_path)).await??
    };
    print_result("Built", &result);

    let _watcher_handle = if args.watch {
        let watch_paths = WatchPaths::from_config(&config, &base_path, &config_path);
        let classifier = PathClassifier::new(watch_paths);

        match FileWatcher::new(&config.dev.watch, classifier.clone()) {
            Ok(mut watcher) => {
                println!("Watching for changes...");

                let watcher_reload_tx = reload_tx.clone();
                let mut classifier = classifier;
                let mut rebuild_config = config.clone();
                let rebuild_base = base_path.clone();
                let rebuild_config_path = config_path.clone();

                Some(tokio::task::spawn_blocking(move || {
                    while let Some(event) = watcher.recv() {
                        match event {
                            WatchEvent::FilesChanged(changes) => {
                                println!("\nDetected {} change(s), rebuilding...", changes.len());
                                tracing::debug!(?changes, "Files changed");

                                if WatchEvent::touches_config(&changes) {
                                    let config = match reload_config(&rebuild_config_path) {
                                        Ok(config) => config,
                                        Err(e) => {
                                            eprintln!("Config error: {e:#}");
                                            continue;
                                        }
                                    };

                                    if let Some(paths) = changed_watch_paths(
                                        classifier.paths(),
                                        &config,
                                        &rebuild_base,
                                        &rebuild_config_path,
                                    ) {
                                        if paths.output_dir != classifier.paths().output_dir {
                                            println!(
                                                "Output directory changed, restart the server to serve {}",
                                                paths.output_dir.display()
                                            );
                                        }
                                        let next = PathClassifier::new(paths);
                                        match FileWatcher::new(&config.dev.watch, next.clone()) {
                                            Ok(next_watcher) => {
                                                println!("Watched paths changed, watcher restarted");
                                                watcher = next_watcher;
                                                classifier = next;
                                            }
                                            Err(e) => {
                                                eprintln!("Failed to restart file watcher: {}", e);
                                            }
                                        }
                                    }

                                    rebuild_config = config;
                                }

                                match do_build(&rebuild_config, &rebuild_base) {
                                    Ok(result) => {
                                        print_result("Rebuilt", &result);
                                        // No connected browsers is not an error
                                        let _ = watcher_reload_tx.send(());
                                    }
                                    Err(e) => eprintln!("Build error: {e:#}"),
                                }
                            }
                            WatchEvent::Error(e) => {
                                eprintln!("Watch error: {}", e);
                            }
                        }
                    }
                }))
            }
            Err(e) => {
                eprintln!("Warning: Failed to start file watcher: {}", e);
                None
            }
        }
    } else {
        None
    };

    let serve_dir = ServeDir::new(&result.output_dir).append_index_html_on_directories(true);

    let app = Router::new()
        .route(LIVE_RELOAD_PATH, get(live_reload_handler))
        .with_state(reload_tx)
        .fallback_service(serve_dir);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;

    let display_host = if args.bind == "0.0.0.0" {
        "localhost"
    } else {
        &args.bind
    };
    let url = format!("http://{}:{}", display_host, args.port);

    println!("\nServing site at {}", url);
    println!("Press Ctrl+C to stop\n");

    if args.open
        && let Err(e) = open::that(&url)
    {
        eprintln!("Failed to open browser: {}", e);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run a dev build: `site.dev` set, live reload as configured.
fn do_build(config: &Config, base_path: &Path) -> Result<BuildResult, anyhow::Error> {
    let builder = Builder::new(config.clone(), base_path.to_path_buf())
        .with_dev_mode(true)
        .with_live_reload(config.dev.live_reload);
    Ok(builder.build()?)
}

/// The paths a reloaded config needs watched, if they differ from `current`.
fn changed_watch_paths(
    current: &WatchPaths,
    config: &Config,
    base_path: &Path,
    config_path: &Path,
) -> Option<WatchPaths> {
    let paths = WatchPaths::from_config(config, base_path, config_path);
    (paths != *current).then_some(paths)
}

/// Load the config again from the watcher thread.
fn reload_config(config_path: &Path) -> Result<Config, anyhow::Error> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(rt.block_on(Config::load_from_arg(Some(config_path)))?)
}

fn print_result(verb: &str, result: &BuildResult) {
    println!(
        "{verb} {} documents, {} lessons, {} assets",
        result.documents, result.lessons, result.assets
    );
    if result.skipped > 0 {
        println!(
            "Skipped {} document(s) with malformed front matter",
            result.skipped
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_changed_watch_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("coursebook.yaml");
        let before = config("site:\n  name: Course\ntemplates: [layouts/*.html]\n");
        let current = WatchPaths::from_config(&before, dir.path(), &config_path);

        let same = config("site:\n  name: Renamed\ntemplates: [layouts/*.html]\n");
        assert_eq!(
            changed_watch_paths(&current, &same, dir.path(), &config_path),
            None
        );

        let moved = config(
            "site:\n  name: Course\n  output: dist\ncontent:\n  dir: pages\ntemplates: [layouts/*.html]\n",
        );
        let paths = changed_watch_paths(&current, &moved, dir.path(), &config_path).unwrap();
        assert!(paths.content_dir.ends_with("pages"));
        assert!(paths.output_dir.ends_with("dist"));
    }
}
