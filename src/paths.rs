use std::env;
use std::path::PathBuf;

/// Default configuration document name.
pub const CONFIG_FILE_NAME: &str = "config.xml";

/// Payload library injected into every launched client.
pub const PAYLOAD_DLL_NAME: &str = "wowreeb.dll";

/// Resolve the config file: first as given (absolute, or relative to the
/// current directory), then relative to the launcher executable's directory.
pub fn resolve_config(filename: &str) -> Option<PathBuf> {
    let direct = PathBuf::from(filename);
    if direct.exists() {
        return Some(direct);
    }

    if let Ok(exe) = env::current_exe()
        && let Some(parent) = exe.parent()
    {
        let beside = parent.join(filename);
        if beside.exists() {
            return Some(beside);
        }
    }

    None
}

/// Payload library path, resolved against the current working directory at
/// the moment of the call.
pub fn payload_dll() -> PathBuf {
    env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(PAYLOAD_DLL_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_dll_is_cwd_relative() {
        let path = payload_dll();
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(PAYLOAD_DLL_NAME)
        );
    }

    #[test]
    fn resolve_config_finds_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("c.xml");
        std::fs::write(&file, "<wowreeb/>").unwrap();
        assert_eq!(resolve_config(file.to_str().unwrap()), Some(file.clone()));
    }

    #[test]
    fn resolve_config_missing_is_none() {
        assert_eq!(resolve_config("/nonexistent/nowhere/config.xml"), None);
    }
}
