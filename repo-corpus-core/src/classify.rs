//! Decides which repository files are worth extracting.
//!
//! Two independent suffix rules: a binary-extension registry (case-insensitive) and a
//! configurable list of low-value suffixes (case-sensitive). Notebooks fail the
//! low-value rule but are routed to structured extraction by [`classify`] first.

use crate::config::{CrawlSettings, DEFAULT_LOW_VALUE_SUFFIXES};
use crate::corpus::SkipReason;

pub const NOTEBOOK_SUFFIX: &str = ".ipynb";

/// Known binary file extensions, lowercase, without the leading dot.
pub const BINARY_EXTENSIONS: &[&str] = &[
    "3dm", "3ds", "3g2", "3gp", "7z", "a", "aac", "adp", "afdesign", "afphoto", "afpub", "ai",
    "aif", "aiff", "alz", "ape", "apk", "appimage", "ar", "arj", "asf", "au", "avi", "bak",
    "baml", "bh", "bin", "bk", "bmp", "btif", "bz2", "bzip2", "cab", "caf", "cgm", "class",
    "cmx", "cpio", "cr2", "cur", "dat", "dcm", "deb", "dex", "djvu", "dll", "dmg", "dng", "doc",
    "docm", "docx", "dot", "dotm", "dra", "ds_store", "dsk", "dts", "dtshd", "dvb", "dwg", "dxf",
    "ecelp4800", "ecelp7470", "ecelp9600", "egg", "eol", "eot", "epub", "exe", "f4v", "fbs",
    "fh", "fla", "flac", "flatpak", "fli", "flv", "fpx", "fst", "fvt", "g3", "gh", "gif", "glb",
    "graffle", "gz", "gzip", "h261", "h263", "h264", "icns", "ico", "ief", "img", "ipa", "iso",
    "jar", "jpeg", "jpg", "jpgv", "jpm", "jxr", "key", "ktx", "lha", "lib", "lvp", "lz", "lzh",
    "lzma", "lzo", "m3u", "m4a", "m4v", "mar", "mdi", "mht", "mid", "midi", "mj2", "mka", "mkv",
    "mmr", "mng", "mobi", "mov", "movie", "mp3", "mp4", "mp4a", "mpeg", "mpg", "mpga", "mxu",
    "nef", "npx", "numbers", "nupkg", "o", "odp", "ods", "odt", "oga", "ogg", "ogv", "otf",
    "ott", "pages", "pbm", "pcx", "pdb", "pdf", "pea", "pgm", "pic", "png", "pnm", "pot", "potm",
    "potx", "ppa", "ppam", "ppm", "pps", "ppsm", "ppsx", "ppt", "pptm", "pptx", "psd", "pya",
    "pyc", "pyo", "pyv", "qt", "rar", "ras", "raw", "resources", "rgb", "rip", "riff", "rlc",
    "rmf", "rmvb", "rpm", "rtf", "rz", "s3m", "s7z", "scpt", "sgi", "shar", "snap", "sil",
    "sketch", "slk", "smv", "snk", "so", "stl", "suo", "sub", "swf", "tar", "tbz", "tbz2", "tga",
    "tgz", "thmx", "tif", "tiff", "tlz", "ttc", "ttf", "txz", "udf", "uvh", "uvi", "uvm", "uvp",
    "uvs", "uvu", "viv", "vob", "war", "wav", "wax", "wbmp", "wdp", "weba", "webm", "webp",
    "whl", "wim", "wm", "wma", "wmv", "wmx", "woff", "woff2", "wrm", "wvx", "xbm", "xif", "xla",
    "xlam", "xls", "xlsb", "xlsm", "xlsx", "xlt", "xltm", "xltx", "xm", "xmind", "xpi", "xpm",
    "xwd", "xz", "z", "zip", "zipx",
];

/// Where a file entry should be routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Structured notebook extraction.
    Notebook,
    /// Raw text extraction.
    Text,
    Skip(SkipReason),
}

/// Substring after the last `.`; dotless names have no extension.
fn extension(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext)
}

pub fn is_binary_name(name: &str) -> bool {
    extension(name).is_some_and(|ext| {
        let ext = ext.to_ascii_lowercase();
        BINARY_EXTENSIONS.contains(&ext.as_str())
    })
}

fn is_low_value<S: AsRef<str>>(name: &str, suffixes: &[S]) -> bool {
    suffixes.iter().any(|suffix| name.ends_with(suffix.as_ref()))
}

fn skip_reason<S: AsRef<str>>(name: &str, low_value_suffixes: &[S]) -> Option<SkipReason> {
    if is_binary_name(name) {
        Some(SkipReason::Binary)
    } else if is_low_value(name, low_value_suffixes) {
        Some(SkipReason::LowValue)
    } else {
        None
    }
}

/// Should the content of a file with this name be extracted as raw text?
pub fn include_for_extraction(name: &str, settings: &CrawlSettings) -> bool {
    skip_reason(name, &settings.low_value_suffixes).is_none()
}

/// [`include_for_extraction`] with the default low-value list.
pub fn include_for_extraction_default(name: &str) -> bool {
    skip_reason(name, DEFAULT_LOW_VALUE_SUFFIXES).is_none()
}

/// Route a file name: notebooks first, then the two exclusion rules.
pub fn classify(name: &str, settings: &CrawlSettings) -> Classification {
    if name.ends_with(NOTEBOOK_SUFFIX) {
        return Classification::Notebook;
    }
    match skip_reason(name, &settings.low_value_suffixes) {
        Some(reason) => Classification::Skip(reason),
        None => Classification::Text,
    }
}
