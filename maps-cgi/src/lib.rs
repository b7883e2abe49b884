//! Request handlers behind the map editor's CGI programs.
//!
//! ```sh
//! curl localhost:8000/cgi-bin/savemap --data-urlencode name=level1.map \
//!     --data-urlencode 'data={"tiles":[1,2,3]}'
//! curl 'localhost:8000/cgi-bin/loadmap?name=level1.map'
//! curl 'localhost:8000/cgi-bin/listdir?dir=data/maps'
//! ```

use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use mapsave::form::FormFields;
use mapsave::maps::{MapError, MapName, MapStore, SaveRequest};
use mapsave::{config, display_chain, init_logging, packed};
use std::path::{Component, Path};

pub const HTML: &str = "text/html; charset=UTF-8";
pub const TEXT: &str = "text/plain; charset=UTF-8";
pub const JSON: &str = "application/json";

/// The `cgi` crate forwards CGI meta-variables as `X-CGI-*` headers.
const CGI_CONTENT_TYPE: &str = "x-cgi-content-type";

/// Entry point shared by the CGI programs: sets up logging, opens the map
/// store at the configured root and answers the request on stdin/stdout.
pub fn run(program: &str, handler: fn(&MapStore, &cgi::Request) -> cgi::Response) {
    init_logging();
    let root = match config::root_from_env() {
        Ok(root) => root,
        Err(e) => {
            eprintln!("{} failed -> {}", program, display_chain(&*e));
            std::process::exit(1);
        }
    };
    let store = MapStore::new(root);
    cgi::handle(|request: cgi::Request| -> cgi::Response { handler(&store, &request) })
}

pub fn respond(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> cgi::Response {
    let body = body.into();
    let len = body.len();
    http::Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, len)
        .body(body)
        .unwrap_or_else(|e| {
            log::error!("failed to build response: {}", e);
            let mut response = cgi::Response::new(Vec::new());
            *response.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
}

fn content_type(request: &cgi::Request) -> Option<&str> {
    request
        .headers()
        .get(CONTENT_TYPE)
        .or_else(|| request.headers().get(CGI_CONTENT_TYPE))
        .and_then(|v| v.to_str().ok())
}

/// Collects the submitted fields: a url-encoded body first, then the query
/// string. Multipart bodies are refused.
pub fn read_form(request: &cgi::Request) -> Result<FormFields, cgi::Response> {
    let mut form = FormFields::new();
    if !request.body().is_empty() {
        match content_type(request) {
            Some(ct) if ct.starts_with("multipart/") => {
                log::warn!("refusing {} body", ct);
                return Err(respond(415, HTML, "Unsupported form encoding"));
            }
            _ => form.extend_from(request.body()),
        }
    }
    if let Some(query) = request.uri().query() {
        form.extend_from(query.as_bytes());
    }
    Ok(form)
}

/// Stores the `data` field under the map `name`.
pub fn save_map(store: &MapStore, request: &cgi::Request) -> cgi::Response {
    let form = match read_form(request) {
        Ok(form) => form,
        Err(response) => return response,
    };
    let save = match SaveRequest::from_form(&form) {
        Ok(save) => save,
        Err(e) => return respond(200, HTML, e.to_string()),
    };
    match store.save(&save) {
        Ok(path) => {
            log::info!("saved map {}", path.display());
            respond(200, HTML, Vec::new())
        }
        Err(MapError::InvalidName(name)) => {
            log::warn!("rejected map name {:?}", name);
            respond(400, HTML, "Invalid map name")
        }
        Err(e) => {
            log::error!("failed to save map {:?} -> {}", save.name, display_chain(&e));
            respond(500, HTML, "Failed to save map")
        }
    }
}

/// Returns the map `name`, with packed maps unpacked for the client.
pub fn load_map(store: &MapStore, request: &cgi::Request) -> cgi::Response {
    let form = match read_form(request) {
        Ok(form) => form,
        Err(response) => return response,
    };
    let Some(name) = form.first("name") else {
        return respond(200, TEXT, "Specify the name parameter (file name)");
    };
    let name = match MapName::try_new(name) {
        Ok(name) => name,
        Err(_) => return respond(400, TEXT, "Invalid map name"),
    };
    let data = match store.load(&name) {
        Ok(data) => data,
        Err(MapError::NotFound(_)) => return respond(404, TEXT, "Map not found"),
        Err(e) => {
            log::error!("failed to load map {} -> {}", name, display_chain(&e));
            return respond(500, TEXT, "Failed to load map");
        }
    };
    match packed::to_client_format(data) {
        Ok(body) => respond(200, TEXT, body),
        Err(e) => {
            log::error!("failed to unpack map {}: {}", name, e);
            respond(500, TEXT, "Failed to load map")
        }
    }
}

fn json_error(status: u16, message: &str) -> cgi::Response {
    respond(status, JSON, serde_json::json!({ "error": message }).to_string())
}

/// Lists the entries of `dir`, a directory below the store root, as a JSON
/// array of names.
pub fn list_dir(store: &MapStore, request: &cgi::Request) -> cgi::Response {
    let form = match read_form(request) {
        Ok(form) => form,
        Err(response) => return response,
    };
    let Some(dir) = form.first("dir") else {
        return json_error(200, "Please specify the dir parameter");
    };
    let dir = Path::new(dir);
    if !dir
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return json_error(400, "Invalid dir parameter");
    }
    let names = match store.list(dir) {
        Ok(names) => names,
        Err(e) => {
            log::error!("failed to list {} -> {}", dir.display(), display_chain(&e));
            return json_error(500, "Failed to list directory");
        }
    };
    match serde_json::to_vec(&names) {
        Ok(body) => respond(200, JSON, body),
        Err(e) => {
            log::error!("failed to encode listing: {}", e);
            json_error(500, "Failed to list directory")
        }
    }
}
