use uuid::Uuid;

use crate::media::MediaKind;

/// Lowercased extension if the name carries an allowed one.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    MediaKind::from_extension(ext).map(|_| ext.to_ascii_lowercase())
}

pub fn allowed_file(filename: &str) -> bool {
    allowed_extension(filename).is_some()
}

/// Reduces a client-supplied name to a safe basename: ASCII only, no path
/// separators, whitespace runs become `_`, only `[A-Za-z0-9._-]` survive and
/// leading/trailing `.`/`_` are stripped.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Name to store an upload under. Falls back to a random stem when
/// sanitising strips the name down to nothing usable.
pub fn storage_filename(original: &str) -> Option<String> {
    let ext = allowed_extension(original)?;
    let safe = secure_filename(original);
    let usable = safe
        .rsplit_once('.')
        .is_some_and(|(stem, e)| !stem.is_empty() && e.eq_ignore_ascii_case(&ext));
    if usable {
        Some(safe)
    } else {
        Some(format!("{}.{}", Uuid::new_v4(), ext))
    }
}

/// On-disk name for an upload: a random prefix keeps concurrent uploads of
/// the same file name apart.
pub fn unique_stored_name(filename: &str) -> String {
    format!("{}-{}", Uuid::new_v4().simple(), filename)
}
