//! The signed-in session, persisted between invocations as a JSON file.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;
use paraiso_core::Session;

/// `None` when no session has been saved.
pub fn load(path: &Path) -> anyhow::Result<Option<Session>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("reading session file {}", path.display()));
        }
    };
    let session = serde_json::from_str(&text)
        .with_context(|| format!("parsing session file {}", path.display()))?;
    Ok(Some(session))
}

pub fn save(path: &Path, session: &Session) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(session)?;
    std::fs::write(path, text)
        .with_context(|| format!("writing session file {}", path.display()))
}

pub fn clear(path: &Path) -> anyhow::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("removing session file {}", path.display())),
    }
}

/// Bring the file in line with the session held in memory.
pub fn sync(path: &Path, session: Option<&Session>) -> anyhow::Result<()> {
    match session {
        Some(session) => save(path, session),
        None => clear(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paraiso_core::User;

    fn session() -> Session {
        Session {
            access_token: "tok".into(),
            user: User {
                id: "u1".into(),
                email: "ana@example.org".into(),
            },
        }
    }

    #[test]
    fn missing_file_is_no_session() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("none.json")).unwrap().is_none());
    }

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        sync(&path, Some(&session())).unwrap();
        assert_eq!(load(&path).unwrap(), Some(session()));
        sync(&path, None).unwrap();
        assert!(!path.exists());
        clear(&path).unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("parsing session file"));
    }
}
