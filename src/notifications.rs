//! User notifications

use mockall::automock;
use tracing::info;

/// Fire-and-forget sink for user-visible messages.
#[automock]
pub trait NotificationSink: Send + Sync {
    /// Show `message` to the user.
    fn notify(&self, message: &str);
}

/// Sink that writes messages to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, message: &str) {
        info!(target: "pasionaria::notifications", "{message}");
    }
}

/// Messages shown to the user.
pub mod messages {
    /// Search attempted with a blank field.
    pub const EMPTY_SEARCH: &str = "Debe escribir algo para buscar";

    /// Search matched nothing.
    pub const NO_MATCHES: &str = "No hay coincidencias";

    /// A new line was stored.
    pub const LINE_ADDED: &str = "El producto fue agregado al pedido";

    /// An existing line was stored.
    pub const LINE_UPDATED: &str = "El producto fue actualizado";

    /// A line was removed.
    pub const LINE_REMOVED: &str = "El producto fue removido del pedido";

    /// A cart was created.
    pub const CART_CREATED: &str = "El pedido fue creado";

    /// A cart was removed.
    pub const CART_DELETED: &str = "El pedido fue eliminado";

    /// The requested cart does not exist.
    pub const CART_NOT_FOUND: &str = "El pedido no existe";

    /// Storage failed.
    pub const DATA_UNAVAILABLE: &str = "No se pudieron obtener los datos";
}
