//! # Tabla de Rutas
//! src/router/mod.rs
//!
//! Este módulo implementa la tabla de rutas que mapea (método, path) a
//! handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router::find → Handler → Response
//! ```
//!
//! La tabla es una secuencia ordenada: las rutas se recorren en orden de
//! registro y gana la primera que coincida exactamente. Se permiten
//! duplicados de (método, path); el registrado primero siempre gana.
//!
//! El matching es igualdad exacta de strings: sin normalización de slash
//! final, sin case-insensitivity, sin segmentos de parámetros. `/users` y
//! `/users/` son rutas distintas. La búsqueda es O(n) sobre el número de
//! rutas, aceptable porque la tabla es pequeña y se construye una sola vez
//! al arrancar.

use crate::http::{Method, Request, Response, ResponseError};

/// Tipo de función handler
///
/// Un handler recibe el `Request` parseado y el builder de `Response`, y es
/// responsable de terminar llamando exactamente un método de envío terminal
/// (`send`, `send_status` o `send_json`).
pub type Handler =
    Box<dyn Fn(&Request, &mut Response<'_>) -> Result<(), ResponseError> + Send + Sync>;

/// Una ruta registrada: (método, path, handler)
struct Route {
    method: Method,
    path: String,
    handler: Handler,
}

/// Tabla ordenada de rutas
///
/// Es un valor explícito, propiedad del `Server` que la usa: no hay registro
/// global, así que varios servidores independientes pueden convivir (útil en
/// tests). Se construye durante la configuración y es de solo lectura
/// durante el servicio.
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Crea una tabla de rutas vacía
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta al final de la secuencia
    ///
    /// # Ejemplo
    /// ```
    /// use hasty::router::Router;
    /// use hasty::http::Method;
    ///
    /// let mut router = Router::new();
    /// router.register(Method::Get, "/ping", |_req, res| res.send_status(200));
    /// ```
    pub fn register<F>(&mut self, method: Method, path: &str, handler: F)
    where
        F: Fn(&Request, &mut Response<'_>) -> Result<(), ResponseError> + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            handler: Box::new(handler),
        });
    }

    /// Busca el handler para (método, path)
    ///
    /// Recorre en orden de registro y retorna el primer match exacto, o
    /// `None` si ninguna ruta coincide.
    pub fn find(&self, method: Method, path: &str) -> Option<&Handler> {
        self.routes
            .iter()
            .find(|route| route.method == method && route.path == path)
            .map(|route| &route.handler)
    }

    /// Cantidad de rutas registradas
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Indica si la tabla está vacía
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
