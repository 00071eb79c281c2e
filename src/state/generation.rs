// ============================================================================
// GENERATION - Última petición gana + teardown
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

/// Contador de peticiones de una pantalla. Cada `begin` invalida las
/// anteriores; `cancel` invalida todo lo que esté en vuelo.
#[derive(Debug, Clone, Default)]
pub struct RequestGenerations {
    current: Rc<Cell<u64>>,
    cancelled: Rc<Cell<bool>>,
}

/// Ticket de una petición en vuelo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        let next = self.current.get() + 1;
        self.current.set(next);
        Ticket(next)
    }

    /// La respuesta de este ticket todavía puede aplicarse
    pub fn is_current(&self, ticket: Ticket) -> bool {
        !self.cancelled.get() && self.current.get() == ticket.0
    }

    /// Teardown de la pantalla
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}
