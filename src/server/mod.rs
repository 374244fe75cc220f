//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Este módulo implementa la capa de red y el dispatcher:
//! 1. Escucha en un puerto y acepta conexiones (un solo thread)
//! 2. Lee el buffer crudo de cada conexión
//! 3. Parsea el request y lo despacha a la ruta registrada
//! 4. Mapea los fallos a respuestas de error (400/404/500)

pub mod tcp;

// Re-exportar para facilitar el uso
pub use tcp::Server;
