//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Este módulo implementa el builder de respuestas HTTP/1.1 ligado a la
//! conexión: acumula status y headers, y en el envío terminal serializa el
//! wire format completo, lo escribe al transporte y cierra la conexión.
//!
//! ## Formato de una respuesta
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: application/json\r\n
//! \r\n
//! {"ok": true}
//! ```
//!
//! El body se delimita por el cierre de la conexión, no por `Content-Length`:
//! este motor atiende exactamente un request por conexión y luego cierra.
//!
//! ## Invariantes
//!
//! - El status por defecto es `200 OK`; solo puede cambiarse a códigos de la
//!   tabla conocida (`StatusCode::from_u16`).
//! - Hay exactamente un envío terminal por respuesta. Un segundo `send` falla
//!   con `ResponseError::AlreadySent` en vez de escribir dos veces.
//! - Los headers conservan el orden de inserción para que el wire output sea
//!   determinista.

use super::StatusCode;
use serde::Serialize;
use std::io::Write;
use std::net::TcpStream;
use thiserror::Error;

/// Abstracción del transporte por conexión que consume el motor
///
/// El motor no escucha ni acepta conexiones; solo necesita poder escribir
/// bytes y cerrar. La capa de red provee la implementación real
/// (`TcpStream`); los tests usan una implementación en memoria.
pub trait Transport: Write {
    /// Cierra la conexión; después de esto no hay más escrituras válidas
    fn close(&mut self) -> std::io::Result<()>;
}

impl Transport for TcpStream {
    fn close(&mut self) -> std::io::Result<()> {
        self.shutdown(std::net::Shutdown::Both)
    }
}

/// Errores al construir o enviar una respuesta
#[derive(Debug, Error)]
pub enum ResponseError {
    /// El código no pertenece a la tabla conocida de status codes.
    /// Es un bug del handler, no una condición del cliente: no se mapea a
    /// ninguna respuesta de error en el wire.
    #[error("invalid status code: {0}")]
    InvalidStatusCode(u16),

    /// Segundo envío sobre la misma respuesta. También un bug del handler.
    #[error("response already sent")]
    AlreadySent,

    /// No se pudo serializar el valor pasado a `send_json`
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// La escritura o el cierre del transporte fallaron
    #[error("transport failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Builder de una respuesta HTTP, uno por request
///
/// Vive solo mientras se atiende ese request; el envío terminal consume la
/// utilidad del objeto (queda marcado como enviado).
pub struct Response<'a> {
    /// Código de estado (200 OK por defecto)
    status: StatusCode,

    /// Headers en orden de inserción; `set_header` hace upsert
    headers: Vec<(String, String)>,

    /// Si ya ocurrió el envío terminal
    sent: bool,

    /// Conexión subyacente
    transport: &'a mut dyn Transport,
}

impl<'a> Response<'a> {
    /// Crea una respuesta nueva ligada a un transporte
    pub fn new(transport: &'a mut dyn Transport) -> Self {
        Self {
            status: StatusCode::Ok,
            headers: Vec::new(),
            sent: false,
            transport,
        }
    }

    /// Establece el código de estado
    ///
    /// # Errores
    ///
    /// `ResponseError::InvalidStatusCode` si el código no está en la tabla
    /// conocida. No hay default silencioso: el error es inmediato.
    ///
    /// # Ejemplo
    /// ```
    /// # use hasty::http::{Response, Transport};
    /// # struct Sink;
    /// # impl std::io::Write for Sink {
    /// #     fn write(&mut self, b: &[u8]) -> std::io::Result<usize> { Ok(b.len()) }
    /// #     fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
    /// # }
    /// # impl Transport for Sink {
    /// #     fn close(&mut self) -> std::io::Result<()> { Ok(()) }
    /// # }
    /// # let mut sink = Sink;
    /// let mut res = Response::new(&mut sink);
    /// assert!(res.set_status(404).is_ok());
    /// assert!(res.set_status(600).is_err());
    /// ```
    pub fn set_status(&mut self, code: u16) -> Result<&mut Self, ResponseError> {
        match StatusCode::from_u16(code) {
            Some(status) => {
                self.status = status;
                Ok(self)
            }
            None => Err(ResponseError::InvalidStatusCode(code)),
        }
    }

    /// Agrega o reemplaza un header
    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        match self.headers.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
        self
    }

    /// Obtiene el código de estado actual
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Indica si el envío terminal ya ocurrió
    pub fn sent(&self) -> bool {
        self.sent
    }

    /// Envío terminal: serializa y escribe la respuesta completa, y cierra
    /// la conexión
    ///
    /// Wire format: status line, headers unidos por CRLF, línea vacía, body.
    ///
    /// # Errores
    ///
    /// - `ResponseError::AlreadySent` si ya hubo un envío terminal.
    /// - `ResponseError::Io` si la escritura o el cierre fallan; en ese caso
    ///   la conexión se da por perdida.
    pub fn send(&mut self, body: &str) -> Result<(), ResponseError> {
        if self.sent {
            return Err(ResponseError::AlreadySent);
        }

        let mut wire = Vec::new();

        // 1. Status line: HTTP/1.1 200 OK\r\n
        wire.extend_from_slice(format!("HTTP/1.1 {}\r\n", self.status).as_bytes());

        // 2. Headers: Name: Value\r\n
        for (name, value) in &self.headers {
            wire.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        // 3. Línea vacía que separa headers del body
        wire.extend_from_slice(b"\r\n");

        // 4. Body
        wire.extend_from_slice(body.as_bytes());

        self.transport.write_all(&wire)?;
        self.transport.flush()?;
        self.sent = true;
        self.transport.close()?;

        Ok(())
    }

    /// Conveniencia: establece el status y envía una respuesta sin body
    ///
    /// # Ejemplo
    /// ```no_run
    /// # use hasty::http::Response;
    /// # fn demo(res: &mut Response<'_>) -> Result<(), hasty::http::ResponseError> {
    /// res.send_status(204)
    /// # }
    /// ```
    pub fn send_status(&mut self, code: u16) -> Result<(), ResponseError> {
        self.set_status(code)?;
        self.send("")
    }

    /// Conveniencia: serializa `data` como JSON, establece
    /// `Content-Type: application/json` y envía
    pub fn send_json<T: Serialize>(&mut self, data: &T) -> Result<(), ResponseError> {
        let body = serde_json::to_string(data)?;
        self.set_header("Content-Type", "application/json");
        self.send(&body)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Transport;

    /// Transporte en memoria para los tests: captura lo escrito y registra
    /// el cierre
    #[derive(Default)]
    pub struct MockTransport {
        pub written: Vec<u8>,
        pub closed: bool,
    }

    impl std::io::Write for MockTransport {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Transport for MockTransport {
        fn close(&mut self) -> std::io::Result<()> {
            self.closed = true;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::MockTransport;
    use super::*;

    #[test]
    fn test_default_status_is_200() {
        let mut transport = MockTransport::default();
        let response = Response::new(&mut transport);

        assert_eq!(response.status(), StatusCode::Ok);
        assert!(!response.sent());
    }

    #[test]
    fn test_set_status_known_code() {
        let mut transport = MockTransport::default();
        let mut response = Response::new(&mut transport);

        response.set_status(404).unwrap();
        assert_eq!(response.status(), StatusCode::NotFound);

        // Idempotente para códigos conocidos
        response.set_status(404).unwrap();
        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_set_status_unknown_code_fails() {
        let mut transport = MockTransport::default();
        let mut response = Response::new(&mut transport);

        let result = response.set_status(600);
        assert!(matches!(result, Err(ResponseError::InvalidStatusCode(600))));

        // El status previo queda intacto, sin default silencioso
        assert_eq!(response.status(), StatusCode::Ok);
    }

    #[test]
    fn test_send_wire_format() {
        let mut transport = MockTransport::default();
        let mut response = Response::new(&mut transport);

        response.set_status(201).unwrap();
        response.set_header("Content-Type", "text/plain");
        response.set_header("X-Custom", "value");
        response.send("hola").unwrap();

        let text = String::from_utf8(transport.written).unwrap();
        assert_eq!(
            text,
            "HTTP/1.1 201 Created\r\nContent-Type: text/plain\r\nX-Custom: value\r\n\r\nhola"
        );
        assert!(transport.closed);
    }

    #[test]
    fn test_header_order_is_insertion_order() {
        let mut transport = MockTransport::default();
        let mut response = Response::new(&mut transport);

        response.set_header("B", "2");
        response.set_header("A", "1");
        response.set_header("C", "3");
        response.send("").unwrap();

        let text = String::from_utf8(transport.written).unwrap();
        let b = text.find("B: 2").unwrap();
        let a = text.find("A: 1").unwrap();
        let c = text.find("C: 3").unwrap();
        assert!(b < a && a < c);
    }

    #[test]
    fn test_set_header_upserts() {
        let mut transport = MockTransport::default();
        let mut response = Response::new(&mut transport);

        response.set_header("Content-Type", "text/plain");
        response.set_header("Content-Type", "application/json");
        response.send("").unwrap();

        let text = String::from_utf8(transport.written).unwrap();
        assert!(text.contains("Content-Type: application/json\r\n"));
        assert!(!text.contains("text/plain"));
    }

    #[test]
    fn test_double_send_fails() {
        let mut transport = MockTransport::default();
        let mut response = Response::new(&mut transport);

        response.send("primero").unwrap();
        let result = response.send("segundo");

        assert!(matches!(result, Err(ResponseError::AlreadySent)));
        // El segundo intento no escribió nada
        let text = String::from_utf8(transport.written).unwrap();
        assert!(text.ends_with("primero"));
    }

    #[test]
    fn test_send_status() {
        let mut transport = MockTransport::default();
        let mut response = Response::new(&mut transport);

        response.send_status(204).unwrap();

        let text = String::from_utf8(transport.written).unwrap();
        assert!(text.starts_with("HTTP/1.1 204 No Content\r\n"));
        // Sin body: termina en la línea vacía
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_send_status_invalid_code_writes_nothing() {
        let mut transport = MockTransport::default();
        let mut response = Response::new(&mut transport);

        assert!(response.send_status(999).is_err());
        assert!(transport.written.is_empty());
        assert!(!transport.closed);
    }

    #[test]
    fn test_send_json() {
        let mut transport = MockTransport::default();
        let mut response = Response::new(&mut transport);

        response.send_json(&serde_json::json!({"a": 1})).unwrap();

        let text = String::from_utf8(transport.written).unwrap();
        assert!(text.contains("Content-Type: application/json\r\n"));

        // Round trip: el body debe volver a parsear al mismo valor
        let body = text.split("\r\n\r\n").nth(1).unwrap();
        let value: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(value, serde_json::json!({"a": 1}));
    }
}
