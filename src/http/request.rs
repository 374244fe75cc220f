//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Este módulo implementa el parser de requests desde cero, sobre el buffer
//! crudo leído del socket.
//!
//! ## Formato de un Request HTTP/1.1
//!
//! ```text
//! GET /ping HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! User-Agent: curl/7.68.0\r\n
//! \r\n
//! cuerpo opcional
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path HTTP/1.1`
//! 2. **Headers**: Pares `Name: Value` (uno por línea, split en el primer `:`)
//! 3. **Empty Line**: `\r\n\r\n` que separa headers del body
//! 4. **Body**: todo lo que sigue a la línea vacía, byte por byte
//!
//! El parser es una transformación pura y síncrona: el mismo buffer produce
//! siempre el mismo resultado. Un buffer malformado nunca produce un
//! `Request`; produce un `ParseError` que el dispatcher mapea a 400.

use std::collections::HashMap;
use thiserror::Error;

/// Métodos HTTP soportados por el API de registro de rutas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Obtener un recurso
    Get,

    /// POST - Enviar datos a un recurso
    Post,

    /// PUT - Reemplazar un recurso
    Put,

    /// DELETE - Eliminar un recurso
    Delete,

    /// PATCH - Modificar parcialmente un recurso
    Patch,
}

impl Method {
    /// Parsea un método HTTP desde el token de la request line
    ///
    /// # Errores
    ///
    /// Retorna error si el método no es soportado
    fn from_token(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Request vacío
    #[error("empty request")]
    EmptyRequest,

    /// El buffer no es UTF-8 válido
    #[error("request is not valid UTF-8")]
    InvalidEncoding,

    /// Request truncado: falta el `\r\n\r\n` que termina los headers
    #[error("incomplete request: missing header terminator")]
    IncompleteRequest,

    /// Formato inválido de la request line
    #[error("invalid request line format")]
    InvalidRequestLine,

    /// Método HTTP no soportado
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Versión HTTP incorrecta (debe ser HTTP/1.1 o HTTP/1.0)
    #[error("invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    /// Header malformado (sin `:`)
    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

/// Representa un request HTTP parseado
///
/// Invariante: `path` nunca está vacío una vez que el parsing fue exitoso.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Método HTTP (GET, POST, PUT, DELETE, PATCH)
    method: Method,

    /// Path de la petición (ej: "/ping")
    path: String,

    /// Headers HTTP (ej: {"Host": "localhost:8080"})
    headers: HashMap<String, String>,

    /// Body del request (todo lo que sigue a la línea vacía)
    body: String,
}

impl Request {
    /// Parsea un request HTTP desde bytes
    ///
    /// # Argumentos
    ///
    /// * `buffer` - Buffer conteniendo el request HTTP completo
    ///
    /// # Retorna
    ///
    /// * `Ok(Request)` - Request parseado exitosamente
    /// * `Err(ParseError)` - Error durante el parsing
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use hasty::http::{Method, Request};
    ///
    /// let raw = b"GET /ping HTTP/1.1\r\nHost: x\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::Get);
    /// assert_eq!(request.path(), "/ping");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        // Convertir a string (validando que sea UTF-8 válido)
        let text = std::str::from_utf8(buffer).map_err(|_| ParseError::InvalidEncoding)?;

        if text.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        // La línea vacía separa la cabecera del body. Sin ella el request
        // está truncado (este motor lee el socket una sola vez, no acumula).
        let (head, body) = text
            .split_once("\r\n\r\n")
            .ok_or(ParseError::IncompleteRequest)?;

        let mut lines = head.split("\r\n");

        // 1. Parsear la request line (primera línea)
        let request_line = lines.next().ok_or(ParseError::InvalidRequestLine)?;
        let (method, path) = Self::parse_request_line(request_line)?;

        // 2. Parsear headers (resto de líneas de la cabecera)
        let headers = Self::parse_headers(lines)?;

        Ok(Request {
            method,
            path,
            headers,
            body: body.to_string(),
        })
    }

    /// Parsea la request line (primera línea del request)
    ///
    /// Formato: `GET /path HTTP/1.1`
    fn parse_request_line(line: &str) -> Result<(Method, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        // Debe tener exactamente 3 partes: METHOD PATH VERSION
        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::from_token(parts[0])?;
        let path = parts[1].to_string();

        // Validar versión HTTP
        let version = parts[2];
        if version != "HTTP/1.1" && version != "HTTP/1.0" {
            return Err(ParseError::InvalidHttpVersion(version.to_string()));
        }

        Ok((method, path))
    }

    /// Parsea los headers HTTP
    ///
    /// Cada header tiene formato `Name: Value`; el split es en el primer `:`
    /// y tanto el nombre como el valor se recortan de espacios.
    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.is_empty() {
                continue;
            }

            match line.split_once(':') {
                Some((name, value)) => {
                    headers.insert(name.trim().to_string(), value.trim().to_string());
                }
                // Header sin ':' es inválido
                None => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Obtiene el path del request
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &str {
        &self.body
    }
}
