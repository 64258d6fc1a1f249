//! REST API implementation using rouille.
//!
//! Handlers parse the request, turn it into an [`ApiCommand`] and wait for
//! the controller's [`ApiResponse`]. Downloads are the exception: the
//! external downloader runs on the HTTP worker thread so the controller
//! never blocks on the network.

use std::error::Error;

use rouille::{Request, Response};
use serde::Deserialize;
use serde_json::json;

use crate::config::ServerSettings;
use crate::library::{Downloader, is_remote_url};

use super::command::{ApiCommand, ControlError, ControlHandle};
use super::response::ApiResponse;

#[derive(Debug, Deserialize)]
struct VolumeRequest {
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct SeekRequest {
    position: f64,
}

#[derive(Debug, Deserialize)]
struct QueueAddRequest {
    track_name: String,
}

#[derive(Debug, Deserialize)]
struct ControlRequest {
    action: String,
}

#[derive(Debug, Deserialize)]
struct DownloadRequest {
    url: String,
}

/// REST API server
pub struct ApiServer {
    settings: ServerSettings,
    control: ControlHandle,
    downloader: Downloader,
}

impl ApiServer {
    pub fn new(settings: ServerSettings, control: ControlHandle, downloader: Downloader) -> Self {
        Self {
            settings,
            control,
            downloader,
        }
    }

    /// Bind and serve forever. Only returns when binding fails.
    pub fn run(self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.settings.bind_addr();
        let server = rouille::Server::new(&addr, move |request| self.handle_request(request))?;
        log::info!("API server listening on http://{}", server.server_addr());
        server.run();
        Ok(())
    }

    pub fn handle_request(&self, request: &Request) -> Response {
        let response = self.route(request);
        match self.allowed_origin(request) {
            Some(origin) => response.with_additional_header("Access-Control-Allow-Origin", origin),
            None => response,
        }
    }

    fn route(&self, request: &Request) -> Response {
        log::debug!("{} {}", request.method(), request.raw_url());

        if request.method() == "OPTIONS" {
            return Response::empty_204()
                .with_additional_header("Access-Control-Allow-Methods", "GET, POST, DELETE, OPTIONS")
                .with_additional_header("Access-Control-Allow-Headers", "Content-Type");
        }

        // Paths with parameters are matched by hand; `/queue/clear` must win over `/queue/{index}`.
        let path = request.url();
        if request.method() == "DELETE" {
            if let Some(rest) = path.strip_prefix("/queue/") {
                if rest == "clear" {
                    return self.send(ApiCommand::QueueClear);
                }
                return match rest.parse::<i64>() {
                    Ok(index) => self.send(ApiCommand::QueueRemove(index)),
                    Err(_) => bad_request(format!("Invalid index: {rest}")),
                };
            }
            if let Some(name) = path.strip_prefix("/library/") {
                if name.is_empty() {
                    return bad_request("Missing track name");
                }
                return self.send(ApiCommand::LibraryDelete(name.to_string()));
            }
        }

        rouille::router!(request,
            (GET) ["/"] => {
                Response::json(&ApiResponse::with_data(
                    "Music player API is running",
                    json!({ "version": env!("CARGO_PKG_VERSION") }),
                ))
            },
            (GET) ["/status"] => { self.send(ApiCommand::Status) },
            (GET) ["/current"] => { self.send(ApiCommand::Current) },
            (GET) ["/tracks"] => { self.send(ApiCommand::Tracks) },
            (GET) ["/queue"] => { self.send(ApiCommand::QueueList) },
            (GET) ["/search"] => {
                let query = request.get_param("q").unwrap_or_default();
                self.send(ApiCommand::Search(query))
            },

            (POST) ["/resume"] => { self.send(ApiCommand::Resume) },
            (POST) ["/pause"] => { self.send(ApiCommand::Pause) },
            (POST) ["/skip"] => { self.send(ApiCommand::Skip) },
            (POST) ["/previous"] => { self.send(ApiCommand::Previous) },
            (POST) ["/stop"] => { self.send(ApiCommand::Stop { clear_queue: true }) },
            (POST) ["/volume"] => {
                with_json(request, |req: VolumeRequest| {
                    self.send(ApiCommand::SetVolume(req.volume.round() as i64))
                })
            },
            (POST) ["/seek"] => {
                with_json(request, |req: SeekRequest| self.send(ApiCommand::Seek(req.position)))
            },
            (POST) ["/queue/add"] => {
                with_json(request, |req: QueueAddRequest| self.queue_add(req.track_name))
            },
            (POST) ["/control"] => {
                with_json(request, |req: ControlRequest| self.control(&req.action))
            },
            (POST) ["/download"] => {
                with_json(request, |req: DownloadRequest| self.download(&req.url, false))
            },

            _ => {
                Response::json(&ApiResponse::failure("Not found")).with_status_code(404)
            }
        )
    }

    fn send(&self, cmd: ApiCommand) -> Response {
        match self.control.request(cmd) {
            Ok(resp) => Response::json(&resp),
            Err(e) => {
                let status = match e {
                    ControlError::Unavailable => 503,
                    ControlError::Timeout(_) => 504,
                };
                log::warn!("{e}");
                Response::json(&ApiResponse::failure(e.to_string())).with_status_code(status)
            }
        }
    }

    fn queue_add(&self, name: String) -> Response {
        if is_remote_url(&name) {
            self.download(name.trim(), true)
        } else {
            self.send(ApiCommand::QueueAdd(name))
        }
    }

    fn download(&self, url: &str, enqueue: bool) -> Response {
        match self.downloader.fetch(url) {
            Ok(path) => self.send(ApiCommand::Downloaded { path, enqueue }),
            Err(e) => Response::json(&ApiResponse::failure(format!("Download failed: {e}"))),
        }
    }

    fn control(&self, action: &str) -> Response {
        let cmd = match action.trim().to_ascii_lowercase().as_str() {
            "play" => ApiCommand::Play,
            "pause" => ApiCommand::Pause,
            "toggle" => ApiCommand::Toggle,
            "stop" => ApiCommand::Stop { clear_queue: false },
            "next" => ApiCommand::Skip,
            "previous" => ApiCommand::Previous,
            "repeat" => ApiCommand::CycleLoop,
            _ => {
                return Response::json(&ApiResponse::failure(format!("Unknown action: {action}")));
            }
        };
        self.send(cmd)
    }

    fn allowed_origin(&self, request: &Request) -> Option<String> {
        let origins = &self.settings.cors_origins;
        if origins.iter().any(|o| o == "*") {
            return Some("*".to_string());
        }
        request
            .header("Origin")
            .filter(|origin| origins.iter().any(|o| o.as_str() == *origin))
            .map(str::to_string)
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    Response::json(&ApiResponse::failure(message)).with_status_code(400)
}

fn with_json<T, F>(request: &Request, handle: F) -> Response
where
    T: serde::de::DeserializeOwned,
    F: FnOnce(T) -> Response,
{
    match rouille::input::json_input::<T>(request) {
        Ok(body) => handle(body),
        Err(e) => bad_request(format!("Invalid JSON: {e}")),
    }
}
