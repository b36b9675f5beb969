//! Join subdirectories using the casing of their parent.
//!
//! A parent whose last segment starts with an uppercase ASCII letter (`AppData\Roaming`,
//! `Library/Caches`) gets title-cased children, anything else gets lowercased children. This is a
//! heuristic on the path itself and not a platform check: a Unix home named `/home/Alice` yields
//! title-cased children too.

use crate::os::platform::Platform;

/// Default child used when no segments are given.
pub const DEFAULT_SUBDIR: &str = "xdg";

/// Join `segments` onto `parent`, matching the casing of `parent`'s basename.
///
/// With no segments at all this returns `parent/xdg`. Empty segments contribute nothing, so
/// `resolve(p, parent, &[""])` is just `parent`.
///
/// ```rust
/// use basedirs::config_files::casing::resolve;
/// use basedirs::os::platform::Platform;
///
/// assert_eq!(resolve(Platform::Win32, r"C:\AppData\Roaming", &["fooBar", "config"]), r"C:\AppData\Roaming\FooBar\Config");
/// assert_eq!(resolve(Platform::Linux, "/home/u/.config", &["FooBar"]), "/home/u/.config/foobar");
/// assert_eq!(resolve(Platform::Linux, "/tmp", &[]), "/tmp/xdg");
/// ```
pub fn resolve(platform: Platform, parent: &str, segments: &[&str]) -> String {
    if segments.is_empty() {
        return platform.join(parent, [DEFAULT_SUBDIR]);
    }
    let title_case = platform
        .basename(parent)
        .starts_with(|c: char| c.is_ascii_uppercase());
    let cased = segments.iter().map(|segment| {
        if title_case {
            title(segment)
        } else {
            segment.to_lowercase()
        }
    });
    platform.join(parent, cased)
}

/// Uppercase the first character, leave the rest untouched.
pub fn title(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
