use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Build-time settings baked into the binary with `env!`.
const EXPORTED_KEYS: [&str; 4] = [
    "LETTERBOX_WIFI_SSID",
    "LETTERBOX_WIFI_PASSWORD",
    "LETTERBOX_BOT_TOKEN",
    "LETTERBOX_CHAT_ID",
];

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());

    export_dotenv(&manifest_dir.join(".env"));
    invalidate_stale_sdkconfig(&manifest_dir);

    embuild::espidf::sysenv::output();
}

/// Re-export `.env` entries as compile-time env vars. Variables already set in
/// the environment win over the file.
fn export_dotenv(path: &Path) {
    println!("cargo:rerun-if-changed={}", path.display());
    for key in EXPORTED_KEYS {
        println!("cargo:rerun-if-env-changed={key}");
    }

    let Ok(entries) = dotenvy::from_path_iter(path) else {
        eprintln!("No .env at {}; credentials must come from the environment", path.display());
        return;
    };

    for entry in entries {
        let (key, value) = match entry {
            Ok(pair) => pair,
            Err(err) => {
                eprintln!("WARNING: skipping malformed .env line: {err}");
                continue;
            }
        };
        if !EXPORTED_KEYS.contains(&key.as_str()) || env::var_os(&key).is_some() {
            continue;
        }
        println!("cargo:rustc-env={key}={value}");
    }
}

/// esp-idf-sys caches the generated sdkconfig; drop it when the defaults file
/// is newer so edits to sdkconfig.defaults take effect.
fn invalidate_stale_sdkconfig(manifest_dir: &Path) {
    let defaults = manifest_dir.join("sdkconfig.defaults");
    println!("cargo:rerun-if-changed=sdkconfig.defaults");

    if env::var("ESP_IDF_SDKCONFIG_DEFAULTS").is_err() {
        eprintln!("WARNING: ESP_IDF_SDKCONFIG_DEFAULTS not set! Main task stack may be too small for TLS.");
    }

    let Some(defaults_modified) = modified(&defaults) else {
        return;
    };
    // Built standalone or as part of the workspace.
    let target_dirs = [manifest_dir.join("target"), manifest_dir.join("../../target")];
    let targets = target_dirs
        .iter()
        .filter_map(|dir| fs::read_dir(dir).ok())
        .flat_map(|entries| entries.flatten());

    for target in targets {
        let Ok(builds) = fs::read_dir(target.path().join("build")) else {
            continue;
        };
        for build in builds.flatten() {
            let build_path = build.path();
            if !build_path.to_string_lossy().contains("esp-idf-sys") {
                continue;
            }
            let sdkconfig = build_path.join("out/esp-idf/sdkconfig");
            if modified(&sdkconfig).is_some_and(|generated| defaults_modified > generated) {
                eprintln!("sdkconfig.defaults changed! Forcing regeneration...");
                let _ = fs::remove_file(&sdkconfig);
                let _ = fs::remove_dir_all(build_path.join("out/esp-idf/sdkconfig.d"));
            }
        }
    }
}

fn modified(path: &Path) -> Option<std::time::SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
