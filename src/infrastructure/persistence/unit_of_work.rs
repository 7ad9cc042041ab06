use sqlx::{Any, AnyConnection, Transaction};

/// A transactional scope handed to business handlers. Commit and rollback
/// consume the scope; dropping an open scope rolls the transaction back, so
/// every exit path is closed whether or not the handler returned cleanly.
pub struct UnitOfWork {
    tx: Transaction<'static, Any>,
}

impl UnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Any>) -> Self {
        Self { tx }
    }

    /// Executor for repository calls inside this scope.
    pub fn connection(&mut self) -> &mut AnyConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    pub async fn rollback(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}
