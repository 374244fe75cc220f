//! # Servidor TCP y Dispatcher
//! src/server/tcp.rs
//!
//! Implementación del accept loop y del ciclo de vida de cada conexión:
//!
//! ```text
//! bytes crudos → Request::parse → Router::find → handler → Response → close
//! ```
//!
//! El servidor es de un solo thread, dirigido por eventos de llegada de
//! datos: cada conexión aceptada se procesa completa (parse → dispatch →
//! respuesta) antes de atender la siguiente. La tabla de rutas se construye
//! antes de servir y es de solo lectura durante el servicio.
//!
//! Cada conexión se lee una sola vez: un request cuya cabecera o body llegue
//! repartido en más de un `read` no parsea y recibe 400. Es una limitación
//! deliberada del alcance (un request por conexión, sin buffer de
//! acumulación).
//!
//! ## Mapeo de fallos
//!
//! - Parse fallido → 400
//! - Sin ruta → 404
//! - Handler entra en pánico → 500 (y el servidor sigue atendiendo)
//! - Status code inválido o doble envío en un handler → bug de programación:
//!   escapa al accept loop, se loguea, y la conexión se cierra sin respuesta
//! - Fallo del transporte → se loguea y se abandona la conexión; nunca tumba
//!   el proceso que escucha

use crate::config::Config;
use crate::http::{Method, Request, Response, ResponseError};
use crate::router::{Handler, Router};
use std::io::Read;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

/// Tamaño del buffer de lectura por conexión
const READ_BUFFER_SIZE: usize = 8192;

/// Servidor HTTP/1.1 de un solo thread
///
/// Es un valor independiente: posee su propia tabla de rutas y su listener,
/// así que varios servidores pueden convivir en un mismo proceso (los tests
/// levantan instancias en puertos efímeros).
pub struct Server {
    config: Config,
    router: Router,
    listener: TcpListener,
}

impl Server {
    /// Crea el servidor y hace bind de la dirección configurada
    ///
    /// Las rutas se registran después del bind y antes de `run`.
    pub fn bind(config: Config) -> std::io::Result<Self> {
        let listener = TcpListener::bind(config.address())?;
        info!(address = %listener.local_addr()?, "servidor escuchando");

        Ok(Self {
            config,
            router: Router::new(),
            listener,
        })
    }

    /// Dirección real en la que quedó escuchando (útil con puerto 0)
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Configuración con la que se creó el servidor
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registro genérico de rutas: (método, path, handler)
    ///
    /// Los wrappers `get`/`post`/`put`/`delete`/`patch` delegan aquí.
    pub fn route<F>(&mut self, method: Method, path: &str, handler: F)
    where
        F: Fn(&Request, &mut Response<'_>) -> Result<(), ResponseError> + Send + Sync + 'static,
    {
        self.router.register(method, path, handler);
    }

    /// Registra una ruta GET
    ///
    /// # Ejemplo
    /// ```no_run
    /// use hasty::config::Config;
    /// use hasty::server::Server;
    ///
    /// let mut server = Server::bind(Config::default()).unwrap();
    /// server.get("/ping", |_req, res| res.send_status(200));
    /// ```
    pub fn get<F>(&mut self, path: &str, handler: F)
    where
        F: Fn(&Request, &mut Response<'_>) -> Result<(), ResponseError> + Send + Sync + 'static,
    {
        self.route(Method::Get, path, handler);
    }

    /// Registra una ruta POST
    pub fn post<F>(&mut self, path: &str, handler: F)
    where
        F: Fn(&Request, &mut Response<'_>) -> Result<(), ResponseError> + Send + Sync + 'static,
    {
        self.route(Method::Post, path, handler);
    }

    /// Registra una ruta PUT
    pub fn put<F>(&mut self, path: &str, handler: F)
    where
        F: Fn(&Request, &mut Response<'_>) -> Result<(), ResponseError> + Send + Sync + 'static,
    {
        self.route(Method::Put, path, handler);
    }

    /// Registra una ruta DELETE
    pub fn delete<F>(&mut self, path: &str, handler: F)
    where
        F: Fn(&Request, &mut Response<'_>) -> Result<(), ResponseError> + Send + Sync + 'static,
    {
        self.route(Method::Delete, path, handler);
    }

    /// Registra una ruta PATCH
    pub fn patch<F>(&mut self, path: &str, handler: F)
    where
        F: Fn(&Request, &mut Response<'_>) -> Result<(), ResponseError> + Send + Sync + 'static,
    {
        self.route(Method::Patch, path, handler);
    }

    /// Accept loop: atiende conexiones una a la vez, para siempre
    ///
    /// Ningún fallo por conexión interrumpe el loop; todos se loguean y se
    /// pasa a la siguiente conexión.
    pub fn run(self) -> std::io::Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(e) = Self::handle_connection(stream, &self.router) {
                        // Bug de programación en un handler o fallo de
                        // lectura; la conexión ya está perdida
                        error!(error = %e, "error manejando la conexión");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "error al aceptar conexión");
                }
            }
        }

        Ok(())
    }

    /// Ciclo completo de una conexión: leer → parsear → despachar → cerrar
    ///
    /// Estado terminal después de un ciclo; nunca se reutiliza la conexión.
    fn handle_connection(mut stream: TcpStream, router: &Router) -> Result<(), ResponseError> {
        let mut buffer = [0u8; READ_BUFFER_SIZE];
        let bytes_read = stream.read(&mut buffer)?;

        // El peer cerró sin enviar datos
        if bytes_read == 0 {
            debug!("conexión cerrada por el peer sin datos");
            return Ok(());
        }

        let mut response = Response::new(&mut stream);

        match Request::parse(&buffer[..bytes_read]) {
            Ok(request) => {
                debug!(method = %request.method(), path = %request.path(), "request recibido");

                match router.find(request.method(), request.path()) {
                    Some(handler) => Self::invoke_handler(handler, &request, &mut response),
                    None => {
                        debug!(method = %request.method(), path = %request.path(), "ruta no encontrada");
                        Self::respond_or_abandon(&mut response, 404);
                        Ok(())
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "request malformado");
                Self::respond_or_abandon(&mut response, 400);
                Ok(())
            }
        }
    }

    /// Invoca el handler de la ruta encontrada, conteniendo sus fallos
    ///
    /// - Pánico del handler → 500 (si todavía no envió nada) y el servidor
    ///   sigue vivo.
    /// - `InvalidStatusCode` / `AlreadySent` → bug del handler: se propaga
    ///   al accept loop sin forjar una respuesta.
    /// - Fallo de transporte durante el handler → se loguea y se abandona.
    fn invoke_handler(
        handler: &Handler,
        request: &Request,
        response: &mut Response<'_>,
    ) -> Result<(), ResponseError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(request, &mut *response)));

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e @ ResponseError::InvalidStatusCode(_)))
            | Ok(Err(e @ ResponseError::AlreadySent)) => Err(e),
            Ok(Err(ResponseError::Io(e))) => {
                warn!(error = %e, "fallo de transporte durante el handler");
                Ok(())
            }
            Ok(Err(ResponseError::Serialize(e))) => {
                error!(error = %e, "el handler no pudo serializar su respuesta");
                if !response.sent() {
                    Self::respond_or_abandon(response, 500);
                }
                Ok(())
            }
            Err(_) => {
                error!(method = %request.method(), path = %request.path(), "el handler entró en pánico");
                if !response.sent() {
                    Self::respond_or_abandon(response, 500);
                }
                Ok(())
            }
        }
    }

    /// Último recurso: intenta enviar un status de error; si el propio envío
    /// falla, loguea y abandona la conexión
    ///
    /// `code` siempre viene de la tabla conocida (400/404/500), así que un
    /// fallo aquí solo puede ser de transporte.
    fn respond_or_abandon(response: &mut Response<'_>, code: u16) {
        if let Err(e) = response.send_status(code) {
            warn!(code, error = %e, "no se pudo enviar la respuesta de error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::thread;
    use std::time::Duration;

    /// Levanta un servidor en un puerto efímero y corre su accept loop en
    /// un thread de fondo
    fn spawn_server(configure: impl FnOnce(&mut Server)) -> SocketAddr {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let mut server = Server::bind(config).expect("bind");
        configure(&mut server);
        let addr = server.local_addr().expect("local_addr");

        thread::spawn(move || {
            let _ = server.run();
        });

        addr
    }

    /// Envía bytes crudos y retorna la respuesta completa como texto
    fn send_raw(addr: SocketAddr, raw: &[u8]) -> String {
        let mut client = TcpStream::connect(addr).expect("connect");
        client
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        client.write_all(raw).unwrap();
        client.flush().unwrap();

        let mut buf = Vec::new();
        let _ = client.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_registered_route_is_dispatched() {
        let addr = spawn_server(|server| {
            server.get("/ping", |_req, res| res.send_status(200));
        });

        let text = send_raw(addr, b"GET /ping HTTP/1.1\r\nHost: x\r\n\r\n");
        assert!(text.starts_with("HTTP/1.1 200 OK"));
    }

    #[test]
    fn test_no_routes_yields_404() {
        let addr = spawn_server(|_server| {});

        let text = send_raw(addr, b"GET /whatever HTTP/1.1\r\nHost: x\r\n\r\n");
        assert!(text.starts_with("HTTP/1.1 404 Not Found"));
    }

    #[test]
    fn test_malformed_request_yields_400_with_empty_body() {
        let addr = spawn_server(|server| {
            server.get("/ping", |_req, res| res.send_status(200));
        });

        let text = send_raw(addr, b"\x01\x02garbage\r\n\r\n");
        assert!(text.starts_with("HTTP/1.1 400 Bad Request"));
        assert!(text.ends_with("\r\n\r\n")); // body vacío
    }

    #[test]
    fn test_method_mismatch_yields_404() {
        let addr = spawn_server(|server| {
            server.post("/item", |_req, res| res.send_status(201));
        });

        let text = send_raw(addr, b"GET /item HTTP/1.1\r\nHost: x\r\n\r\n");
        assert!(text.starts_with("HTTP/1.1 404 Not Found"));
    }

    #[test]
    fn test_panicking_handler_yields_500_and_server_survives() {
        let addr = spawn_server(|server| {
            server.get("/boom", |_req, _res| panic!("se rompió"));
            server.get("/ping", |_req, res| res.send_status(200));
        });

        let text = send_raw(addr, b"GET /boom HTTP/1.1\r\nHost: x\r\n\r\n");
        assert!(text.starts_with("HTTP/1.1 500 Internal Server Error"));

        // El proceso sigue sirviendo conexiones posteriores
        let text = send_raw(addr, b"GET /ping HTTP/1.1\r\nHost: x\r\n\r\n");
        assert!(text.starts_with("HTTP/1.1 200 OK"));
    }

    #[test]
    fn test_handler_receives_parsed_request() {
        let addr = spawn_server(|server| {
            server.post("/echo", |req, res| {
                let body = req.body().to_string();
                res.set_header("X-Seen-Host", req.header("Host").unwrap_or(""));
                res.send(&body)
            });
        });

        let text = send_raw(addr, b"POST /echo HTTP/1.1\r\nHost: unit\r\n\r\nhola mundo");
        assert!(text.starts_with("HTTP/1.1 200 OK"));
        assert!(text.contains("X-Seen-Host: unit\r\n"));
        assert!(text.ends_with("hola mundo"));
    }
}
