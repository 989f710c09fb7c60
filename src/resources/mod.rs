use anyhow::Context as _;

/**
 * This module contains all logic for loading fonts and turning text into meshes.
 */
pub mod font;
pub mod text;
pub mod triangulate;

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no window available")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("no page origin: {e:?}"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

/// Fetch a text resource.
///
/// `http(s)://` sources are downloaded. Anything else is a path relative to
/// `./assets/` natively, or to `<origin>/assets/` in the browser.
pub async fn load_string(source: &str) -> anyhow::Result<String> {
    if is_remote(source) {
        let txt = reqwest::get(source)
            .await?
            .error_for_status()?
            .text()
            .await?;
        return Ok(txt);
    }

    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(source)?;
        reqwest::get(url).await?.error_for_status()?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = {
        let path = std::path::Path::new("./").join("assets").join(source);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?
    };

    Ok(txt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_http_sources_are_remote() {
        assert!(is_remote("https://threejs.org/fonts/helvetiker_regular.typeface.json"));
        assert!(is_remote("http://localhost/font.json"));
        assert!(!is_remote("helvetiker_regular.typeface.json"));
        assert!(!is_remote("fonts/https.json"));
    }

    #[tokio::test]
    async fn missing_asset_is_an_error() {
        let err = load_string("does/not/exist.typeface.json").await.unwrap_err();
        assert!(err.to_string().contains("exist.typeface.json"));
    }
}
