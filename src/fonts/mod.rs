//! Font discovery for report rendering.
//!
//! The bundled family is Roboto.  Directories are searched in this order:
//!
//! 1. the directory passed by the caller (`--fonts-dir` on the command line),
//! 2. `TIPUS_REPORTS_FONTS_DIR`,
//! 3. `assets/fonts` next to the running executable,
//! 4. `assets/fonts` in the crate checkout.
//!
//! When none of them holds the four Roboto files, well-known system families are tried and a
//! warning is logged.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Environment variable naming an extra font directory.
pub const FONTS_DIR_ENV: &str = "TIPUS_REPORTS_FONTS_DIR";

const FONT_FILES: &[&str] = &[
    "Roboto-Regular.ttf",
    "Roboto-Bold.ttf",
    "Roboto-Italic.ttf",
    "Roboto-BoldItalic.ttf",
];

/// File names of one installed system family.
struct SystemFamily {
    name: &'static str,
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

const LIBERATION_SANS: SystemFamily = SystemFamily {
    name: "Liberation Sans",
    regular: "LiberationSans-Regular.ttf",
    bold: "LiberationSans-Bold.ttf",
    italic: "LiberationSans-Italic.ttf",
    bold_italic: "LiberationSans-BoldItalic.ttf",
};

const DEJAVU_SANS: SystemFamily = SystemFamily {
    name: "DejaVu Sans",
    regular: "DejaVuSans.ttf",
    bold: "DejaVuSans-Bold.ttf",
    italic: "DejaVuSans-Oblique.ttf",
    bold_italic: "DejaVuSans-BoldOblique.ttf",
};

const WINDOWS_ARIAL: SystemFamily = SystemFamily {
    name: "Arial",
    regular: "arial.ttf",
    bold: "arialbd.ttf",
    italic: "ariali.ttf",
    bold_italic: "arialbi.ttf",
};

const MACOS_ARIAL: SystemFamily = SystemFamily {
    name: "Arial",
    regular: "Arial.ttf",
    bold: "Arial Bold.ttf",
    italic: "Arial Italic.ttf",
    bold_italic: "Arial Bold Italic.ttf",
};

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn push_unique(candidates: &mut Vec<PathBuf>, candidate: PathBuf) {
    if !candidates.iter().any(|existing| existing == &candidate) {
        candidates.push(candidate);
    }
}

fn font_directory_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = explicit {
        push_unique(&mut candidates, path.to_path_buf());
    }

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        push_unique(&mut candidates, path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            push_unique(&mut candidates, bin_dir.join("assets/fonts"));
        }
    }

    push_unique(
        &mut candidates,
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"),
    );

    candidates
}

fn missing_font_files(path: &Path) -> Vec<PathBuf> {
    FONT_FILES
        .iter()
        .map(|name| path.join(name))
        .filter(|candidate| !candidate.is_file())
        .collect()
}

fn resolve_font_directory(explicit: Option<&Path>) -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates(explicit) {
        let exists = candidate.is_dir();
        let missing = missing_font_files(&candidate);

        if exists && missing.is_empty() {
            return Ok(candidate);
        }

        let reason = if !exists {
            format!("directory missing at {}", candidate.display())
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
            "Unable to locate the {} font directory. Checked: {}. See assets/fonts/README.md or set {}.",
            DEFAULT_FONT_FAMILY_NAME,
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "bundled fonts directory not found"),
    ))
}

fn load_bundled_font_family(explicit: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    let directory = resolve_font_directory(explicit)?;
    debug!("loading {} fonts from {}", DEFAULT_FONT_FAMILY_NAME, directory.display());

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

fn system_font_locations() -> Vec<(PathBuf, &'static SystemFamily)> {
    let mut locations = vec![
        (
            PathBuf::from("/usr/share/fonts/truetype/liberation"),
            &LIBERATION_SANS,
        ),
        (
            PathBuf::from("/usr/share/fonts/liberation-sans"),
            &LIBERATION_SANS,
        ),
        (PathBuf::from("/usr/share/fonts/truetype/dejavu"), &DEJAVU_SANS),
        (PathBuf::from("/usr/share/fonts/dejavu"), &DEJAVU_SANS),
        (
            PathBuf::from("/System/Library/Fonts/Supplemental"),
            &MACOS_ARIAL,
        ),
        (PathBuf::from("/Library/Fonts"), &MACOS_ARIAL),
    ];

    for var in ["WINDIR", "SystemRoot"] {
        if let Some(root) = env_path(var) {
            locations.push((root.join("Fonts"), &WINDOWS_ARIAL));
        }
    }

    locations
}

fn load_system_font(directory: &Path, file: &str, style: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!(
                "Failed to load fallback {} font at {}: {}",
                style,
                path.display(),
                err
            ),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

fn load_system_family(
    directory: &Path,
    family: &SystemFamily,
) -> Result<FontFamily<FontData>, Error> {
    Ok(FontFamily {
        regular: load_system_font(directory, family.regular, "regular")?,
        bold: load_system_font(directory, family.bold, "bold")?,
        italic: load_system_font(directory, family.italic, "italic")?,
        bold_italic: load_system_font(directory, family.bold_italic, "bold italic")?,
    })
}

fn system_family_present(directory: &Path, family: &SystemFamily) -> bool {
    [
        family.regular,
        family.bold,
        family.italic,
        family.bold_italic,
    ]
    .iter()
    .all(|file| directory.join(file).is_file())
}

fn system_fallback_font_family() -> Result<FontFamily<FontData>, Error> {
    let mut failures = Vec::new();

    for (directory, family) in system_font_locations() {
        if !system_family_present(&directory, family) {
            continue;
        }
        match load_system_family(&directory, family) {
            Ok(loaded) => {
                warn!(
                    "Falling back to system '{}' family from {}.",
                    family.name,
                    directory.display()
                );
                return Ok(loaded);
            }
            Err(err) => failures.push(err.to_string()),
        }
    }

    let detail = if failures.is_empty() {
        "no known system family is installed".to_owned()
    } else {
        failures.join("; ")
    };
    Err(Error::new(
        format!("System font fallback failed: {}", detail),
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

/// Loads the Roboto family, searching `explicit` first, and falls back to a system family when
/// Roboto is not installed anywhere.
pub fn load_font_family(explicit: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    match load_bundled_font_family(explicit) {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => match system_fallback_font_family() {
            Ok(fallback) => {
                warn!("Bundled fonts unavailable ({}).", err);
                Ok(fallback)
            }
            Err(fallback_err) => {
                warn!(
                    "Bundled fonts unavailable ({}); {}",
                    err, fallback_err
                );
                Err(Error::new(
                    format!("{}; {}", err, fallback_err),
                    io::Error::new(io::ErrorKind::NotFound, "report fonts are not available"),
                ))
            }
        },
        Err(err) => Err(err),
    }
}

/// Same as [`load_font_family`] without an explicit directory.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    load_font_family(None)
}

/// Indicates whether the Roboto files can be found on the default search path.
pub fn default_fonts_available() -> bool {
    resolve_font_directory(None).is_ok()
}

/// Indicates whether any usable family, bundled or system, can be found.
pub fn any_fonts_available() -> bool {
    default_fonts_available()
        || system_font_locations()
            .iter()
            .any(|(directory, family)| system_family_present(directory, family))
}
