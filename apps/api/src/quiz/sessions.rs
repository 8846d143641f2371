use std::collections::HashMap;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::quiz::wizard::Wizard;

/// In-memory registry of live quiz wizards, one per client session.
#[derive(Debug, Default)]
pub struct QuizSessions {
    wizards: Mutex<HashMap<Uuid, Wizard>>,
}

impl QuizSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> Wizard {
        let wizard = Wizard::new();
        self.wizards.lock().insert(wizard.id(), wizard.clone());
        wizard
    }

    /// Runs `f` against the wizard under the lock. Never hold this across an await.
    pub fn with_wizard<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Wizard) -> R,
    ) -> Result<R, AppError> {
        let mut wizards = self.wizards.lock();
        let wizard = wizards
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Quiz session {id} not found")))?;
        Ok(f(wizard))
    }

    pub fn remove(&self, id: Uuid) -> Option<Wizard> {
        self.wizards.lock().remove(&id)
    }

    pub fn len(&self) -> usize {
        self.wizards.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_lookup() {
        let sessions = QuizSessions::new();
        let wizard = sessions.create();
        let step = sessions.with_wizard(wizard.id(), |w| w.step()).unwrap();
        assert_eq!(step, 1);
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_unknown_session_is_not_found() {
        let sessions = QuizSessions::new();
        let err = sessions.with_wizard(Uuid::new_v4(), |w| w.step()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_remove() {
        let sessions = QuizSessions::new();
        let id = sessions.create().id();
        assert!(sessions.remove(id).is_some());
        assert!(sessions.remove(id).is_none());
        assert_eq!(sessions.len(), 0);
    }
}
