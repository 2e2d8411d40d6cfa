use crate::error::{QrftError, Result};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Raw header name bytes as an OS file name. Unix keeps the bytes verbatim,
/// so a name cut mid-character survives as-is; elsewhere it is decoded lossily.
pub fn name_from_bytes(raw: &[u8]) -> OsString {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        std::ffi::OsStr::from_bytes(raw).to_os_string()
    }
    #[cfg(not(unix))]
    {
        OsString::from(String::from_utf8_lossy(raw).into_owned())
    }
}

/// Resolve a name recovered from a fragment header to a path directly under
/// `dir`. The header is untrusted: empty names, separators, `.`/`..` and
/// absolute paths are rejected.
pub fn output_path(dir: &Path, raw_name: &[u8]) -> Result<PathBuf> {
    if raw_name.is_empty() {
        return Err(QrftError::Validation("header carries an empty file name".into()));
    }
    if raw_name.iter().any(|&b| b == 0 || b == b'/' || (cfg!(windows) && b == b'\\')) {
        return Err(QrftError::Validation(format!(
            "header file name contains a separator or NUL: {:?}",
            String::from_utf8_lossy(raw_name)
        )));
    }
    let name = name_from_bytes(raw_name);
    let rel = Path::new(&name);
    let mut comps = rel.components();
    match (comps.next(), comps.next()) {
        (Some(Component::Normal(_)), None) => Ok(dir.join(rel)),
        _ => Err(QrftError::Validation(format!(
            "header file name is not a plain file name: {rel:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_joins_under_dir() {
        let p = output_path(Path::new("/data/in"), b"report.pdf").unwrap();
        assert_eq!(p, Path::new("/data/in/report.pdf"));
    }

    #[test]
    fn traversal_and_separators_rejected() {
        for bad in [&b".."[..], b".", b"../x", b"a/b", b"/etc/passwd", b""] {
            assert!(
                matches!(output_path(Path::new("/d"), bad), Err(QrftError::Validation(_))),
                "{:?} accepted",
                String::from_utf8_lossy(bad)
            );
        }
    }

    #[test]
    fn interior_nul_rejected() {
        assert!(output_path(Path::new("/d"), b"a\0b").is_err());
    }
}
