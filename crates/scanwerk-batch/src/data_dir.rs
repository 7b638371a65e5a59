// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware default output directory resolution.

use std::ffi::OsString;
use std::path::PathBuf;

/// Where artifacts go when no output directory is given:
/// `<data dir>/scanwerk/augmented`. Not created here; the sink does that.
pub fn default_output_dir() -> PathBuf {
    resolve_output_dir(
        std::env::var_os("XDG_DATA_HOME"),
        std::env::var_os("HOME"),
    )
}

fn resolve_output_dir(xdg_data_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    data_base(xdg_data_home, home)
        .join("scanwerk")
        .join("augmented")
}

fn data_base(xdg_data_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    // Try XDG data dir, then fallback to home
    if let Some(xdg) = xdg_data_home.filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = home.filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort
    std::env::temp_dir()
}
