//! Saving generated designs to disk.

use std::path::{Path, PathBuf};

use super::error::DownloadError;

/// Derive a filesystem-safe file name from a design name.
///
/// Lower-cases the name and collapses each whitespace run into one hyphen.
#[must_use]
pub fn design_filename(name: &str) -> String {
    let mut slug = String::with_capacity(name.len() + 4);
    let mut in_whitespace = false;

    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.push(c);
            in_whitespace = false;
        }
    }

    slug.push_str(".png");
    slug
}

/// Fetch `url` and write it to `dir` under the name derived from `name`.
///
/// Creates `dir` if needed and returns the written path.
pub async fn download_design(
    http: &reqwest::Client,
    url: &str,
    name: &str,
    dir: &Path,
) -> Result<PathBuf, DownloadError> {
    let response = http.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status(status.as_u16()));
    }
    let bytes = response.bytes().await?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(design_filename(name));
    tokio::fs::write(&path, &bytes).await?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "saved design");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::get};

    use super::*;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn filename_from_design_name() {
        assert_eq!(design_filename("Custom Design 1"), "custom-design-1.png");
    }

    #[test]
    fn filename_collapses_whitespace_runs() {
        assert_eq!(design_filename("Big \t Owl"), "big-owl.png");
        assert_eq!(design_filename(" Edge "), "-edge-.png");
    }

    #[tokio::test]
    async fn download_writes_bytes() {
        let base = spawn(Router::new().route("/img.png", get(|| async { "PNGDATA" }))).await;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");

        let path = download_design(
            &reqwest::Client::new(),
            &format!("{base}/img.png"),
            "Custom Design 2",
            &target,
        )
        .await
        .unwrap();

        assert_eq!(path, target.join("custom-design-2.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"PNGDATA");
    }

    #[tokio::test]
    async fn download_rejects_error_status() {
        let base = spawn(Router::new().route(
            "/gone.png",
            get(|| async { (StatusCode::FORBIDDEN, "blocked") }),
        ))
        .await;
        let dir = tempfile::tempdir().unwrap();

        let err = download_design(
            &reqwest::Client::new(),
            &format!("{base}/gone.png"),
            "Custom Design 1",
            dir.path(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DownloadError::Status(403)));
        assert!(!dir.path().join("custom-design-1.png").exists());
    }
}
