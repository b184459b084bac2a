//! Font discovery for the PDF exports.
//!
//! `genpdf` needs TrueType files for every document.  The bundled Roboto family is searched in
//! this order:
//!
//! 1. a directory passed explicitly (usually `fonts_dir` from the configuration),
//! 2. `DASHBOARD_REPORT_FONTS_DIR`,
//! 3. `assets/fonts` next to the running executable,
//! 4. `assets/fonts` in the crate directory.
//!
//! When none of them holds the four Roboto files, the system Liberation Sans family (Linux)
//! or Arial (Windows) is used instead and a warning is logged.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::warn;

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Environment variable pointing at a directory holding the Roboto files.
pub const FONTS_DIR_ENV: &str = "DASHBOARD_REPORT_FONTS_DIR";

const FONT_FILES: &[&str] = &[
    "Roboto-Regular.ttf",
    "Roboto-Bold.ttf",
    "Roboto-Italic.ttf",
    "Roboto-BoldItalic.ttf",
];

/// A system family used when the bundled fonts are missing.
struct SystemFamily {
    name: &'static str,
    directories: &'static [&'static str],
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

const SYSTEM_FAMILIES: &[SystemFamily] = &[
    SystemFamily {
        name: "Liberation Sans",
        directories: &[
            "/usr/share/fonts/truetype/liberation",
            "/usr/share/fonts/truetype/liberation2",
            "/usr/share/fonts/liberation-sans",
            "/usr/share/fonts/liberation",
        ],
        regular: "LiberationSans-Regular.ttf",
        bold: "LiberationSans-Bold.ttf",
        italic: "LiberationSans-Italic.ttf",
        bold_italic: "LiberationSans-BoldItalic.ttf",
    },
    SystemFamily {
        name: "Arial",
        directories: &["C:\\Windows\\Fonts"],
        regular: "arial.ttf",
        bold: "arialbd.ttf",
        italic: "ariali.ttf",
        bold_italic: "arialbi.ttf",
    },
];

/// Directory holding the bundled fonts inside the crate.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn font_directory_candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    let mut push = |candidate: PathBuf| {
        if !candidates.iter().any(|existing| existing == &candidate) {
            candidates.push(candidate);
        }
    };

    if let Some(path) = configured {
        push(path.to_path_buf());
    }

    if let Some(path) = env::var_os(FONTS_DIR_ENV) {
        if !path.is_empty() {
            push(PathBuf::from(path));
        }
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            push(bin_dir.join("assets/fonts"));
        }
    }

    push(bundled_fonts_source_dir());
    candidates
}

fn missing_font_files(path: &Path) -> Vec<PathBuf> {
    FONT_FILES
        .iter()
        .map(|name| path.join(name))
        .filter(|candidate| !candidate.is_file())
        .collect()
}

fn resolve_font_directory(configured: Option<&Path>) -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates(configured) {
        let exists = candidate.is_dir();
        let missing = missing_font_files(&candidate);

        if exists && missing.is_empty() {
            return Ok(candidate);
        }

        let reason = if !exists {
            "directory missing".to_owned()
        } else {
            let missing_list = missing
                .iter()
                .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
                .collect::<Vec<_>>()
                .join(", ");
            format!("missing files [{}]", missing_list)
        };

        attempts.push(format!("{} ({})", candidate.display(), reason));
    }

    Err(Error::new(
        format!(
            "Unable to locate the {} fonts. Checked: {}. Set {} or fonts_dir in the configuration.",
            DEFAULT_FONT_FAMILY_NAME,
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "bundled fonts directory not found"),
    ))
}

fn load_bundled_font_family(configured: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    let directory = resolve_font_directory(configured)?;

    fonts::from_files(&directory, DEFAULT_FONT_FAMILY_NAME, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                DEFAULT_FONT_FAMILY_NAME,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn load_font(directory: &Path, file: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        Error::new(
            format!("Failed to load font at {}: {}", path.display(), err),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn system_fallback_font_family() -> Result<(FontFamily<FontData>, &'static str), Error> {
    for family in SYSTEM_FAMILIES {
        let Some(directory) = family
            .directories
            .iter()
            .map(Path::new)
            .find(|dir| dir.join(family.regular).is_file() && dir.join(family.bold).is_file())
        else {
            continue;
        };

        let loaded = FontFamily {
            regular: load_font(directory, family.regular)?,
            bold: load_font(directory, family.bold)?,
            italic: load_font(directory, family.italic)?,
            bold_italic: load_font(directory, family.bold_italic)?,
        };
        return Ok((loaded, family.name));
    }

    Err(Error::new(
        "No system fallback font family found",
        io::Error::new(io::ErrorKind::NotFound, "system fonts not found"),
    ))
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Loads the Roboto family, searching `configured` first, and falls back to a system family
/// when Roboto is not installed.
pub fn font_family(configured: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    match load_bundled_font_family(configured) {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => match system_fallback_font_family() {
            Ok((fallback, name)) => {
                warn!("{err}; falling back to the system '{name}' family.");
                Ok(fallback)
            }
            Err(fallback_err) => {
                warn!("{err}; system fallback failed: {fallback_err}");
                Err(Error::new(
                    format!("{err}. System fallback failed: {fallback_err}"),
                    io::Error::new(io::ErrorKind::NotFound, "default fonts are not available"),
                ))
            }
        },
        Err(err) => Err(err),
    }
}

/// Indicates whether any usable font family (bundled or system) can be found.
pub fn default_fonts_available() -> bool {
    resolve_font_directory(None).is_ok()
        || SYSTEM_FAMILIES.iter().any(|family| {
            family.directories.iter().any(|dir| {
                let dir = Path::new(dir);
                [family.regular, family.bold, family.italic, family.bold_italic]
                    .iter()
                    .all(|file| dir.join(file).is_file())
            })
        })
}
