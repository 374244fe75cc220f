//! # hasty
//! src/lib.rs
//!
//! Motor HTTP/1.1 minimalista construido directamente sobre los bytes crudos
//! de conexiones TCP aceptadas. Hace tres cosas:
//!
//! 1. Parsea el buffer entrante a un request estructurado (`http::request`)
//! 2. Despacha por match exacto de método + path (`router`)
//! 3. Serializa la respuesta del handler al wire format HTTP/1.1 y cierra la
//!    conexión (`http::response`)
//!
//! ## Arquitectura
//!
//! - `http`: parsing de requests, construcción de responses, status codes
//! - `router`: tabla ordenada de rutas (método, path, handler)
//! - `server`: accept loop de un solo thread y dispatcher por conexión
//! - `config`: configuración por CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use hasty::config::Config;
//! use hasty::server::Server;
//!
//! let mut server = Server::bind(Config::default()).unwrap();
//! server.get("/ping", |_req, res| res.send_status(200));
//! server.run().unwrap();
//! ```
//!
//! Modelo de servicio: un request por conexión, luego cierre. Sin
//! keep-alive, sin chunked encoding, sin streaming, sin parámetros de path.

pub mod config;
pub mod http;
pub mod router;
pub mod server;
