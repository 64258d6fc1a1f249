//! REST API for remote control of the player.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────┐    mpsc::channel     ┌──────────────────────┐
//! │   HTTP worker threads   │ ── Envelope ───────▶ │   Controller thread  │
//! │   (rouille)             │                      │   Player + Library   │
//! │                         │ ◀── ApiResponse ──── │   + PlayQueue        │
//! └─────────────────────────┘   (reply channel)    └──────────────────────┘
//!                                                            │ AudioCmd
//!                                                            ▼
//!                                                  ┌──────────────────────┐
//!                                                  │   Audio thread       │
//!                                                  │   (rodio stream)     │
//!                                                  └──────────────────────┘
//! ```
//!
//! # Endpoints
//!
//! | Method | Path                    | Description                       |
//! |--------|-------------------------|-----------------------------------|
//! | GET    | `/`                     | Health check                      |
//! | GET    | `/status`               | Player status                     |
//! | GET    | `/current`              | Current track and progress        |
//! | GET    | `/tracks`               | Every library track               |
//! | GET    | `/search?q=`            | Search by title or artist         |
//! | GET    | `/queue`                | Queued tracks                     |
//! | POST   | `/resume`, `/pause`     | Resume / pause                    |
//! | POST   | `/skip`, `/previous`    | Move through queue and library    |
//! | POST   | `/stop`                 | Stop and clear the queue          |
//! | POST   | `/volume`               | `{"volume": 0-100}`               |
//! | POST   | `/seek`                 | `{"position": seconds}`           |
//! | POST   | `/queue/add`            | `{"track_name": name or URL}`     |
//! | POST   | `/control`              | `{"action": ...}`                 |
//! | POST   | `/download`             | `{"url": ...}`                    |
//! | DELETE | `/queue/clear`          | Empty the queue                   |
//! | DELETE | `/queue/{index}`        | Remove one queue entry            |
//! | DELETE | `/library/{track_name}` | Delete a file from the library    |

mod api;
mod command;
mod response;

pub use api::ApiServer;
pub use command::{ApiCommand, ControlError, ControlHandle, Envelope};
pub use response::ApiResponse;
