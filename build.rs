use std::process::Command;

/// Arguments passed to `git` to produce `"<short-hash> <author-date>"` for `HEAD`.
const GIT_SHOW: [&str; 3] = ["show", "--no-patch", "--format=%h %as"];

const UNKNOWN_HASH: &str = "0000000";
const UNKNOWN_DATE: &str = "0000-00-00";

fn main() {
    let (hash, date) = head_commit().unwrap_or_else(|| {
        (UNKNOWN_HASH.to_string(), UNKNOWN_DATE.to_string())
    });
    println!("cargo:rustc-env=BUILD_HASH={hash}");
    println!("cargo:rustc-env=BUILD_DATE={date}");
    println!("cargo:rerun-if-changed=.git/HEAD");
}

/// Returns the abbreviated hash and date of the `HEAD` commit, or `None` when the
/// source tree is not a git checkout or `git` is unavailable.
fn head_commit() -> Option<(String, String)> {
    let out = match Command::new("git").args(GIT_SHOW).output() {
        Ok(out) if out.status.success() => out,
        Ok(out) => {
            eprintln!("[git {}]: {}", GIT_SHOW.join(" "), out.status);
            return None;
        }
        Err(e) => {
            eprintln!("[git {}]: {e}", GIT_SHOW.join(" "));
            return None;
        }
    };
    let stdout = String::from_utf8(out.stdout).ok()?;
    stdout
        .trim()
        .split_once(' ')
        .map(|(hash, date)| (hash.to_string(), date.to_string()))
}
