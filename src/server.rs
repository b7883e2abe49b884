use crate::config::{ServerConfig, ServerMode, ROOT_ENV};
use crate::maps::is_plain_file_name;
use anyhow::Context;
use rouille::cgi::CgiRun;
use rouille::{Request, Response};
use std::path::{Path, PathBuf};
use std::process::Command;

const CGI_PREFIX: &str = "/cgi-bin/";

pub fn run_server(cfg: ServerConfig) -> anyhow::Result<()> {
    let addr = cfg.addr;
    let mode = cfg.mode;
    let root = cfg.root.clone();
    let server = rouille::Server::new(addr, move |request| handle(&cfg, request))
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!(
        "serving {} at http://{} ({:?} mode), hit Ctrl+C to exit",
        root.display(),
        server.server_addr(),
        mode
    );
    server.run();
    Ok(())
}

/// Handles one request and logs its outcome.
pub fn handle(cfg: &ServerConfig, request: &Request) -> Response {
    rouille::log_custom(
        request,
        |req, resp, elapsed| {
            log::info!(
                "{} {} {} {:?}",
                req.method(),
                req.raw_url(),
                resp.status_code,
                elapsed
            );
        },
        |req, elapsed| {
            log::error!("{} {} panicked after {:?}", req.method(), req.raw_url(), elapsed);
        },
        || route(cfg, request),
    )
}

fn route(cfg: &ServerConfig, request: &Request) -> Response {
    if cfg.mode == ServerMode::Cgi {
        let url = request.url();
        if let Some(rest) = url.strip_prefix(CGI_PREFIX) {
            let script = rest.split('/').next().unwrap_or("");
            if !is_plain_file_name(script) {
                return Response::empty_404();
            }
            return run_cgi(cfg, script, request);
        }
    }
    serve_static(&cfg.root, request)
}

fn run_cgi(cfg: &ServerConfig, script: &str, request: &Request) -> Response {
    let program = cfg.cgi_dir().join(script);
    if !program.is_file() {
        log::debug!("no cgi program at {}", program.display());
        return Response::empty_404();
    }
    let mut cmd = Command::new(&program);
    cmd.current_dir(&cfg.root).env(ROOT_ENV, &cfg.root);
    match cmd.start_cgi(request) {
        Ok(response) => response,
        Err(e) => {
            log::error!("failed to run {}: {:?}", program.display(), e);
            Response::text("CGI program failed").with_status_code(500)
        }
    }
}

fn serve_static(root: &Path, request: &Request) -> Response {
    if request.method() != "GET" && request.method() != "HEAD" {
        return Response::text("Unsupported method").with_status_code(501);
    }
    let response = rouille::match_assets(request, root);
    if response.is_success() {
        return response;
    }
    match index_file(root, &request.url()) {
        Some(index) => match std::fs::File::open(&index) {
            Ok(file) => Response::from_file(rouille::extension_to_mime("html"), file),
            Err(e) => {
                log::warn!("failed to open {}: {}", index.display(), e);
                Response::empty_404()
            }
        },
        None => response,
    }
}

/// `index.html` of the directory a url points to, if it has one.
fn index_file(root: &Path, url: &str) -> Option<PathBuf> {
    let mut dir = root.to_path_buf();
    for segment in url.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if segment == ".." || segment.contains('\\') {
            return None;
        }
        dir.push(segment);
    }
    let index = dir.join("index.html");
    index.is_file().then_some(index)
}
