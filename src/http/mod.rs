//! # Módulo HTTP
//!
//! Este módulo implementa el protocolo HTTP/1.1 desde cero, sin librerías
//! de alto nivel. Incluye:
//!
//! - Parsing de requests HTTP
//! - Construcción y envío de responses
//! - Tabla de status codes
//!
//! ## Formato de Request
//!
//! ```text
//! GET /path HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! body opcional
//! ```
//!
//! ## Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: application/json\r\n
//! \r\n
//! {"ok": true}
//! ```
//!
//! El motor atiende un request por conexión: sin keep-alive, sin chunked
//! transfer encoding y sin `Content-Length` automático (el body se delimita
//! cerrando la conexión).

pub mod request; // Parsing de HTTP requests
pub mod response; // Construcción y envío de HTTP responses
pub mod status; // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{Method, ParseError, Request};
pub use response::{Response, ResponseError, Transport};
pub use status::StatusCode;
