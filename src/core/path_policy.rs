/*
 * This module decides where a conversion writes its result and whether it may do so.
 * It derives destination paths from the source and the chosen `Action`, consults an
 * injected `OverwriteConfirmer` when the destination already exists, and keeps
 * per-batch destination locks so that two files of the same drop never write the same
 * output at the same time.
 */
use super::models::{Action, TextureFormats};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/*
 * How existing destinations are handled for a session. `Ask` defers to an interactive
 * confirmer when one is available and declines otherwise.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteMode {
    Ask,
    Always,
    Never,
}

impl FromStr for OverwriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ask" => Ok(OverwriteMode::Ask),
            "always" => Ok(OverwriteMode::Always),
            "never" => Ok(OverwriteMode::Never),
            other => Err(format!("unknown overwrite mode '{other}'")),
        }
    }
}

/*
 * Decides whether an existing destination may be replaced. Implementations may block
 * waiting on the user; they are shared with worker threads in the concurrent model.
 */
pub trait OverwriteConfirmer: Send + Sync {
    fn confirm_overwrite(&self, destination: &Path) -> bool;
}

impl<F> OverwriteConfirmer for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn confirm_overwrite(&self, destination: &Path) -> bool {
        self(destination)
    }
}

// Headless default: never replace an existing file.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyOverwrite;

impl OverwriteConfirmer for DenyOverwrite {
    fn confirm_overwrite(&self, destination: &Path) -> bool {
        log::debug!("PathPolicy: Declining overwrite of {destination:?} (deny policy).");
        false
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AllowOverwrite;

impl OverwriteConfirmer for AllowOverwrite {
    fn confirm_overwrite(&self, _destination: &Path) -> bool {
        true
    }
}

/*
 * Derives the output path for `action` by swapping the source's extension for the
 * one the action produces. Texture inspection writes only to the console and has no
 * destination.
 */
pub fn resolve_destination(
    source: &Path,
    action: Action,
    formats: &TextureFormats,
) -> Option<PathBuf> {
    match action {
        Action::ConvertToTexture { .. } => Some(source.with_extension(&formats.texture_extension)),
        Action::ConvertTextureToRaster => Some(source.with_extension(&formats.raster_extension)),
        Action::InspectTexture => None,
    }
}

/*
 * Returns true right away when `destination` does not exist. Otherwise the confirmer
 * is asked and its answer returned.
 */
pub fn should_proceed(destination: &Path, confirmer: &dyn OverwriteConfirmer) -> bool {
    if !destination.exists() {
        return true;
    }
    log::debug!("PathPolicy: Destination {destination:?} exists, asking for confirmation.");
    let proceed = confirmer.confirm_overwrite(destination);
    log::info!("PathPolicy: Overwrite of {destination:?} confirmed: {proceed}");
    proceed
}

/*
 * Per-batch locks keyed by destination path. A file holds its destination's lock from
 * the overwrite check until its tool has exited, so a later file targeting the same
 * path waits, then sees the written file and goes through `should_proceed` like any
 * other existing destination.
 */
#[derive(Debug, Default)]
pub struct DestinationLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl DestinationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns the lock shared by every file of this batch that writes `destination`.
    pub fn lock_for(&self, destination: &Path) -> Arc<Mutex<()>> {
        let mut locks = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(locks.entry(destination.to_path_buf()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[test]
    fn test_resolve_destination_per_action() {
        let formats = TextureFormats::default();
        assert_eq!(
            resolve_destination(
                Path::new("photo.png"),
                Action::ConvertToTexture { add_stats: true },
                &formats
            ),
            Some(PathBuf::from("photo.tx"))
        );
        assert_eq!(
            resolve_destination(Path::new("tile.tx"), Action::ConvertTextureToRaster, &formats),
            Some(PathBuf::from("tile.tif"))
        );
        assert_eq!(
            resolve_destination(Path::new("tile.tx"), Action::InspectTexture, &formats),
            None
        );
    }

    #[test]
    fn test_resolve_destination_only_replaces_last_extension() {
        let formats = TextureFormats::default();
        let action = Action::ConvertToTexture { add_stats: false };
        assert_eq!(
            resolve_destination(Path::new("dir/map.v2.exr"), action, &formats),
            Some(PathBuf::from("dir/map.v2.tx"))
        );
        assert_eq!(
            resolve_destination(Path::new("noext"), action, &formats),
            Some(PathBuf::from("noext.tx"))
        );
    }

    #[test]
    fn test_resolve_destination_is_idempotent() {
        let formats = TextureFormats::default();
        let action = Action::ConvertTextureToRaster;
        let first = resolve_destination(Path::new("a/b.tx"), action, &formats);
        let second = resolve_destination(Path::new("a/b.tx"), action, &formats);
        assert_eq!(first, second);
    }

    #[test]
    fn test_should_proceed_skips_confirmer_for_missing_destination() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("absent.tx");
        let must_not_ask = |p: &Path| -> bool {
            panic!("confirmer must not be invoked for {p:?}");
        };
        assert!(should_proceed(&destination, &must_not_ask));
    }

    #[test]
    fn test_should_proceed_returns_confirmer_answer_for_existing_destination() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("present.tif");
        File::create(&destination).unwrap();

        let calls = AtomicUsize::new(0);
        let yes = |_: &Path| {
            calls.fetch_add(1, Ordering::SeqCst);
            true
        };
        assert!(should_proceed(&destination, &yes));
        assert!(!should_proceed(&destination, &DenyOverwrite));
        assert!(should_proceed(&destination, &AllowOverwrite));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_overwrite_mode_from_str() {
        assert_eq!("ASK".parse::<OverwriteMode>(), Ok(OverwriteMode::Ask));
        assert_eq!("always".parse::<OverwriteMode>(), Ok(OverwriteMode::Always));
        assert_eq!("never".parse::<OverwriteMode>(), Ok(OverwriteMode::Never));
        assert!("sometimes".parse::<OverwriteMode>().is_err());
    }

    #[test]
    fn test_destination_locks_are_shared_per_path() {
        let locks = DestinationLocks::new();
        let first = locks.lock_for(Path::new("a.tx"));
        let again = locks.lock_for(Path::new("a.tx"));
        let other = locks.lock_for(Path::new("b.tx"));
        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));

        let _held = first.lock().unwrap();
        assert!(again.try_lock().is_err());
        assert!(other.try_lock().is_ok());
    }
}
