//! Launch dispatch: the integrity gate and the single hand-off to the
//! injection routine.
//!
//! The injection mechanism itself lives behind [`Injector`] so the dispatch
//! path can be exercised with a fake that records calls instead of touching
//! any process.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::paths;
use crate::registry::RealmRegistry;
use crate::verify::{self, IntegrityError};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Defensive guard; unreachable through the selection surface.
    #[error("unknown realm \"{0}\"")]
    UnknownRealm(String),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// The injection routine reported failure. The original launcher dropped
    /// this status on the floor; we surface it.
    #[error("injection routine returned status {0}")]
    Injection(i32),
}

/// External capability that performs the actual code injection and process
/// launch. Opaque to the dispatcher.
pub trait Injector {
    fn inject(
        &self,
        exe: &Path,
        payload: &Path,
        auth_server: &str,
        fov: f32,
        clr: Option<&Path>,
    ) -> i32;
}

/// Shipped collaborator: spawns the client with the launch parameters carried
/// in `WOWREEB_*` environment variables for the payload to pick up.
pub struct ProcessInjector;

impl Injector for ProcessInjector {
    fn inject(
        &self,
        exe: &Path,
        payload: &Path,
        auth_server: &str,
        fov: f32,
        clr: Option<&Path>,
    ) -> i32 {
        let mut cmd = Command::new(exe);
        cmd.env("WOWREEB_DLL", payload)
            .env("WOWREEB_AUTH_SERVER", auth_server)
            .env("WOWREEB_FOV", fov.to_string());

        if let Some(clr) = clr {
            cmd.env("WOWREEB_CLR_DLL", clr);
        }

        match cmd.spawn() {
            Ok(child) => {
                println!("[wowreeb] spawned {} (pid {})", exe.display(), child.id());
                0
            }
            Err(e) => {
                println!("[wowreeb] failed to spawn {}: {}", exe.display(), e);
                1
            }
        }
    }
}

/// Routes a selected realm name into exactly one injection call.
pub struct Dispatcher<I: Injector> {
    injector: I,
    /// Test hook; `None` resolves the payload from the working directory at
    /// dispatch time.
    payload_override: Option<PathBuf>,
}

impl<I: Injector> Dispatcher<I> {
    pub fn new(injector: I) -> Self {
        Self {
            injector,
            payload_override: None,
        }
    }

    /// Look up `name`, re-verify the executable when a digest is configured,
    /// then invoke the injection routine once. Every failure terminates this
    /// one dispatch only; nothing is retried.
    pub fn dispatch(&self, registry: &RealmRegistry, name: &str) -> Result<(), DispatchError> {
        let realm = registry
            .get(name)
            .ok_or_else(|| DispatchError::UnknownRealm(name.to_string()))?;

        if !realm.sha256.is_empty() {
            verify::ensure_integrity(&realm.exe_path, &realm.sha256)?;
        }

        let payload = match &self.payload_override {
            Some(p) => p.clone(),
            None => paths::payload_dll(),
        };

        println!(
            "[wowreeb] launching {} ({})",
            realm.name,
            realm.exe_path.display()
        );

        let status = self.injector.inject(
            &realm.exe_path,
            &payload,
            &realm.auth_server,
            realm.fov,
            realm.clr_dll.as_deref(),
        );

        if status != 0 {
            return Err(DispatchError::Injection(status));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Realm;
    use sha2::{Digest, Sha256};
    use std::cell::RefCell;
    use std::io::Write;

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        exe: PathBuf,
        payload: PathBuf,
        auth_server: String,
        fov: f32,
        clr: Option<PathBuf>,
    }

    struct RecordingInjector {
        calls: RefCell<Vec<Call>>,
        status: i32,
    }

    impl RecordingInjector {
        fn new(status: i32) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                status,
            }
        }
    }

    impl Injector for &RecordingInjector {
        fn inject(
            &self,
            exe: &Path,
            payload: &Path,
            auth_server: &str,
            fov: f32,
            clr: Option<&Path>,
        ) -> i32 {
            self.calls.borrow_mut().push(Call {
                exe: exe.to_path_buf(),
                payload: payload.to_path_buf(),
                auth_server: auth_server.to_string(),
                fov,
                clr: clr.map(Path::to_path_buf),
            });
            self.status
        }
    }

    fn dispatcher(injector: &RecordingInjector) -> Dispatcher<&RecordingInjector> {
        Dispatcher {
            injector,
            payload_override: Some(PathBuf::from("/opt/wowreeb/wowreeb.dll")),
        }
    }

    fn registry_with(realm: Realm) -> RealmRegistry {
        RealmRegistry::new(vec![realm])
    }

    #[test]
    fn unknown_realm_is_an_error() {
        let injector = RecordingInjector::new(0);
        let reg = RealmRegistry::new(vec![]);
        let err = dispatcher(&injector).dispatch(&reg, "Nope").unwrap_err();
        assert!(matches!(err, DispatchError::UnknownRealm(_)));
        assert!(injector.calls.borrow().is_empty());
    }

    #[test]
    fn empty_digest_invokes_injector_once_with_stored_params() {
        let injector = RecordingInjector::new(0);
        let reg = registry_with(Realm {
            name: "Alpha".to_string(),
            exe_path: PathBuf::from("a.exe"),
            sha256: String::new(),
            auth_server: String::new(),
            fov: 75.0,
            clr_dll: None,
        });

        dispatcher(&injector).dispatch(&reg, "Alpha").unwrap();

        let calls = injector.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            Call {
                exe: PathBuf::from("a.exe"),
                payload: PathBuf::from("/opt/wowreeb/wowreeb.dll"),
                auth_server: String::new(),
                fov: 75.0,
                clr: None,
            }
        );
    }

    #[test]
    fn clr_override_is_passed_through() {
        let injector = RecordingInjector::new(0);
        let reg = registry_with(Realm {
            name: "A".to_string(),
            exe_path: PathBuf::from("a.exe"),
            clr_dll: Some(PathBuf::from("helper.dll")),
            ..Realm::default()
        });

        dispatcher(&injector).dispatch(&reg, "A").unwrap();
        assert_eq!(
            injector.calls.borrow()[0].clr,
            Some(PathBuf::from("helper.dll"))
        );
    }

    #[test]
    fn digest_mismatch_never_invokes_injector() {
        let mut exe = tempfile::NamedTempFile::new().unwrap();
        exe.write_all(b"tampered client").unwrap();

        let injector = RecordingInjector::new(0);
        let reg = registry_with(Realm {
            name: "A".to_string(),
            exe_path: exe.path().to_path_buf(),
            sha256: hex::encode(Sha256::digest(b"pristine client")),
            ..Realm::default()
        });

        let err = dispatcher(&injector).dispatch(&reg, "A").unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Integrity(IntegrityError::Mismatch { .. })
        ));
        assert!(injector.calls.borrow().is_empty());
    }

    #[test]
    fn unreadable_executable_refuses_launch() {
        let injector = RecordingInjector::new(0);
        let reg = registry_with(Realm {
            name: "A".to_string(),
            exe_path: PathBuf::from("/nonexistent/wow.exe"),
            sha256: "ab12".to_string(),
            ..Realm::default()
        });

        let err = dispatcher(&injector).dispatch(&reg, "A").unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Integrity(IntegrityError::Io { .. })
        ));
        assert!(injector.calls.borrow().is_empty());
    }

    #[test]
    fn matching_digest_launches() {
        let mut exe = tempfile::NamedTempFile::new().unwrap();
        exe.write_all(b"pristine client").unwrap();

        let injector = RecordingInjector::new(0);
        let reg = registry_with(Realm {
            name: "A".to_string(),
            exe_path: exe.path().to_path_buf(),
            sha256: hex::encode(Sha256::digest(b"pristine client")),
            ..Realm::default()
        });

        dispatcher(&injector).dispatch(&reg, "A").unwrap();
        assert_eq!(injector.calls.borrow().len(), 1);
    }

    #[test]
    fn nonzero_injector_status_is_surfaced() {
        let injector = RecordingInjector::new(3);
        let reg = registry_with(Realm {
            name: "A".to_string(),
            exe_path: PathBuf::from("a.exe"),
            ..Realm::default()
        });

        let err = dispatcher(&injector).dispatch(&reg, "A").unwrap_err();
        assert!(matches!(err, DispatchError::Injection(3)));
        // the failed call still happened exactly once, never retried
        assert_eq!(injector.calls.borrow().len(), 1);
    }

    #[test]
    fn process_injector_reports_spawn_failure() {
        let status = ProcessInjector.inject(
            Path::new("/nonexistent/wow.exe"),
            Path::new("/nonexistent/wowreeb.dll"),
            "",
            0.0,
            None,
        );
        assert_ne!(status, 0);
    }
}
