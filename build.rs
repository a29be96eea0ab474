use std::{env, path::PathBuf};

const WATCHED_VARIABLES: [&str; 3] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"];

/// Point Windows builds at a vcpkg FFmpeg install when `FFMPEG_DIR` is unset.
///
/// `ffmpeg-sys-next` does the actual discovery; this only surfaces what it is
/// likely to find so a failed link is easier to diagnose.
fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if env::var_os("CARGO_FEATURE_FFMPEG").is_none() {
        return;
    }
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    if env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    let Some(vcpkg_root) = env::var_os("VCPKG_ROOT") else {
        println!(
            "cargo:warning=vidinspect: FFMPEG_DIR is unset; set it (or VCPKG_ROOT) so the ffmpeg feature can link"
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| String::from("x64-windows"));
    let install = PathBuf::from(vcpkg_root).join("installed").join(triplet);
    let headers = install.join("include").join("libavformat");

    if headers.is_dir() {
        println!(
            "cargo:warning=vidinspect: found FFmpeg under {0}; export FFMPEG_DIR={0} to pin it",
            install.display()
        );
    } else {
        println!(
            "cargo:warning=vidinspect: no libavformat headers under {}",
            install.display()
        );
    }
}
