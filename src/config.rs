use crate::client::ClientConfig;

/// Default public Argovis API root.
pub(crate) const DEFAULT_API_ROOT: &str = "https://argovis-api.colorado.edu/";

/// Resolves configuration using (in order of precedence):
/// - explicit `url`/`key` arguments
/// - environment variables `ARGOVIS_API_URL` / `ARGOVIS_API_KEY`
/// - crate defaults (public API root, empty key for anonymous access)
///
/// Resolution happens once, at client construction; the request path reads
/// nothing from the environment.
pub(crate) fn load_config(url: Option<String>, key: Option<String>) -> ClientConfig {
    let url = url
        .or_else(|| std::env::var("ARGOVIS_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_ROOT.to_string());
    let key = key
        .or_else(|| std::env::var("ARGOVIS_API_KEY").ok())
        .unwrap_or_default();

    ClientConfig { url, key }
}
