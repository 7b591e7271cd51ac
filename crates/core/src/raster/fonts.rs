//! Font files available to the glyph renderer.
//!
//! Configured files are read up front and always win. System directories
//! are only listed at load time; a face is read and checked the first time
//! a family asks for it.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ttf_parser::name_id;

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];
const MAX_SCAN_DEPTH: usize = 6;

pub type FontData = Arc<Vec<u8>>;

struct LoadedFace {
    families: Vec<String>,
    data: FontData,
}

/// Font lookup by CSS family name.
#[derive(Default)]
pub struct FontBook {
    configured: Vec<LoadedFace>,
    system: Vec<PathBuf>,
    cache: Mutex<HashMap<String, Option<FontData>>>,
}

impl fmt::Debug for FontBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontBook")
            .field("configured", &self.configured.len())
            .field("system", &self.system.len())
            .finish()
    }
}

impl FontBook {
    /// Read every file in `paths`, and list system font files when
    /// `system_fonts` is set. Unreadable or unparsable files are skipped.
    pub fn load(paths: &[PathBuf], system_fonts: bool) -> Self {
        let mut configured = Vec::new();
        for path in paths {
            match read_face(path) {
                Some(face) => configured.push(face),
                None => log::warn!("font file {} is not usable, ignoring", path.display()),
            }
        }
        let mut system = Vec::new();
        if system_fonts {
            for dir in system_font_dirs() {
                scan_dir(&dir, 0, &mut system);
            }
        }
        // shorter stems first, so `DejaVuSans` is tried before `DejaVuSans-Bold`
        system.sort_by_key(|p| stem_key(p).len());
        log::debug!("{} configured and {} system font files", configured.len(), system.len());
        Self {
            configured,
            system,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Face data for a CSS `font-family` value. The first family of the
    /// stack is matched against configured faces, then system faces. With
    /// no match, the first configured face stands in.
    pub fn resolve(&self, family: &str) -> Option<FontData> {
        let key = family_key(first_family(family));
        if key.is_empty() {
            return self.configured.first().map(|f| f.data.clone());
        }
        if let Some(face) = self.configured.iter().find(|f| f.families.contains(&key)) {
            return Some(face.data.clone());
        }
        self.system_face(&key)
            .or_else(|| self.configured.first().map(|f| f.data.clone()))
    }

    fn system_face(&self, key: &str) -> Option<FontData> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(key) {
                return hit.clone();
            }
        }
        let found = self
            .system
            .iter()
            .filter(|path| stem_key(path).starts_with(key))
            .filter_map(|path| read_face(path))
            .find(|face| face.families.iter().any(|f| f == key))
            .map(|face| face.data);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key.to_string(), found.clone());
        }
        found
    }
}

fn read_face(path: &Path) -> Option<LoadedFace> {
    let bytes = std::fs::read(path).ok()?;
    let families = {
        let face = ttf_parser::Face::parse(&bytes, 0).ok()?;
        face.names()
            .into_iter()
            .filter(|n| n.name_id == name_id::FAMILY || n.name_id == name_id::TYPOGRAPHIC_FAMILY)
            .filter_map(|n| n.to_string())
            .map(|name| family_key(&name))
            .filter(|key| !key.is_empty())
            .collect()
    };
    Some(LoadedFace {
        families,
        data: Arc::new(bytes),
    })
}

fn first_family(stack: &str) -> &str {
    stack
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
}

/// Case and punctuation blind: `'Material Icons'` and `MaterialIcons`
/// share a key.
fn family_key(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn stem_key(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(family_key)
        .unwrap_or_default()
}

fn scan_dir(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > MAX_SCAN_DEPTH {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_dir(&path, depth + 1, out);
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| FONT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        {
            out.push(path);
        }
    }
}

fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    #[cfg(target_os = "windows")]
    {
        dirs.push(PathBuf::from(r"C:\Windows\Fonts"));
        if let Some(windir) = std::env::var_os("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
        if let Some(home) = std::env::var_os("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            dirs.push(home.join(".local/share/fonts"));
            dirs.push(home.join(".fonts"));
        }
    }

    dirs
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A font shipped by most Linux distributions, if this machine has one.
    pub(crate) fn dejavu_sans() -> Option<PathBuf> {
        [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
        ]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
    }

    #[test]
    fn test_family_keys() {
        assert_eq!(family_key("'Material Icons'"), "materialicons");
        assert_eq!(first_family("\"Font Awesome 6 Free\", sans-serif"), "Font Awesome 6 Free");
        assert_eq!(first_family(""), "");
    }

    #[test]
    fn test_configured_faces() {
        let empty = FontBook::load(&[PathBuf::from("/nonexistent/font.ttf")], false);
        assert!(empty.resolve("DejaVu Sans").is_none());

        let Some(path) = dejavu_sans() else {
            return;
        };
        let book = FontBook::load(&[path], false);
        assert!(book.resolve("'DejaVu Sans', sans-serif").is_some());
        // any icon family falls back to the configured face
        assert!(book.resolve("Material Icons").is_some());
    }

    #[test]
    fn test_system_faces_by_family() {
        if dejavu_sans().is_none() {
            return;
        }
        let book = FontBook::load(&[], true);
        assert!(book.resolve("DejaVu Sans").is_some());
        assert!(book.resolve("No Such Family 42").is_none());
    }
}
