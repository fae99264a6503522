//! Scripted stand-in for the yt-dlp binary

/// Title reported by the scripted executor for every URL
pub const SCRIPT_TITLE: &str = "Script Video";

/// Video id reported by the scripted executor for every URL
pub const SCRIPT_VIDEO_ID: &str = "abc123";

/// Version printed for `--version`
pub const SCRIPT_VERSION: &str = "2024.08.06";

/// URL the script downloads successfully
pub const OK_URL: &str = "https://video.example.com/watch?v=abc123";

/// URL whose metadata lookup fails
pub const UNSUPPORTED_URL: &str = "https://video.example.com/fail/unsupported";

/// URL that resolves but whose transfer exits non-zero
pub const BROKEN_URL: &str = "https://video.example.com/watch?v=broken";

/// URL whose transfer reports progress and then hangs until killed
pub const SLOW_URL: &str = "https://video.example.com/watch?v=slow";

/// POSIX shell script mimicking the parts of yt-dlp the engine relies on
///
/// - `--version` and `-U` answer like the real binary
/// - `--dump-json` prints one metadata document (or fails for `/fail/` URLs)
/// - otherwise it prints progress lines and touches a file in the `-P` destination
pub const EXECUTOR_SCRIPT: &str = r#"#!/bin/sh
for arg in "$@"; do
    last="$arg"
done

case " $* " in
    *" --version "*)
        echo "2024.08.06"
        exit 0
        ;;
    *" -U "*)
        echo "Latest version: 2024.08.06 from yt-dlp/yt-dlp"
        echo "yt-dlp is up to date (2024.08.06 from yt-dlp/yt-dlp)"
        exit 0
        ;;
esac

case " $* " in
    *" --dump-json "*)
        case "$last" in
            *"/fail/"*)
                echo "ERROR: Unsupported URL: $last" >&2
                exit 1
                ;;
        esac
        printf '{"id":"abc123","title":"Script Video","filename":"Script_Video","webpage_url":"%s","vcodec":"avc1"}\n' "$last"
        exit 0
        ;;
esac

dest=""
ext="mp4"
prev=""
for arg in "$@"; do
    if [ "$prev" = "-P" ]; then
        case "$arg" in
            temp:*) ;;
            *) dest="$arg" ;;
        esac
    fi
    if [ "$arg" = "-x" ]; then
        ext="mp3"
    fi
    prev="$arg"
done

echo "[youtube] abc123: Downloading webpage"
echo "[download]  25.0% of 1.00MiB at 512.00KiB/s ETA 00:02"

case "$last" in
    *"v=broken"*)
        echo "ERROR: unable to download video data: HTTP Error 403: Forbidden" >&2
        exit 1
        ;;
    *"v=slow"*)
        exec sleep 30
        ;;
esac

echo "[download]  75.0% of 1.00MiB at 1.00MiB/s ETA 00:01"
echo "[download] 100% of 1.00MiB in 00:00:01"
mkdir -p "$dest"
touch "$dest/Script_Video [0-0].$ext"
exit 0
"#;
