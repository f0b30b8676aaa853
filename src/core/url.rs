//! URL 拆分工具
//! 将绝对 URL 拆为 protocol / host / path，以及把 path 拆为路径与查询参数

use serde::{Deserialize, Serialize};

use super::query::{DecodeError, QueryParameters};

const PROTOCOL_SEPARATOR: &str = "://";

/// URL 组成部分
///
/// `protocol` 保留结尾的 `://`（可能为空），`path` 以 `/` 开头并包含查询串，
/// 片段 (`#...`) 已被移除。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UrlComponents {
    pub protocol: String,
    pub host: String,
    pub path: String,
}

impl UrlComponents {
    /// Reassembles `protocol + host + path`.
    pub fn to_url(&self) -> String {
        format!("{}{}{}", self.protocol, self.host, self.path)
    }
}

/// 拆分 URL
pub fn decompose_url(url: &str) -> UrlComponents {
    let mut rest = url;
    let mut protocol = "";

    // "://" only counts as a separator when it comes before the first "/"
    if let Some(index) = url.find(PROTOCOL_SEPARATOR) {
        let first_slash = url.find('/');
        if first_slash.map_or(false, |slash| index < slash) {
            let end = index + PROTOCOL_SEPARATOR.len();
            protocol = &url[..end];
            rest = &url[end..];
        }
    }

    let (host, mut path) = match rest.find('/') {
        Some(slash) => (&rest[..slash], &rest[slash..]),
        None => (rest, ""),
    };

    if let Some(hash) = path.find('#') {
        path = &path[..hash];
    }

    UrlComponents {
        protocol: protocol.to_string(),
        host: host.to_string(),
        path: path.to_string(),
    }
}

/// 拆分路径与查询参数
pub fn split_path_and_query(path: &str) -> Result<(String, QueryParameters), DecodeError> {
    match path.split_once('?') {
        Some((url_path, raw_query)) => {
            Ok((url_path.to_string(), QueryParameters::decode(raw_query)?))
        }
        None => Ok((path.to_string(), QueryParameters::default())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::QueryValue;

    #[test]
    fn test_decompose_strips_fragment() {
        let parts = decompose_url("https://a.com/x?y=1#frag");
        assert_eq!(parts.protocol, "https://");
        assert_eq!(parts.host, "a.com");
        assert_eq!(parts.path, "/x?y=1");
    }

    #[test]
    fn test_decompose_reassembles_without_fragment() {
        let urls = [
            "http://example.com/",
            "https://example.com:8443/a/b?c=d&e",
            "http://example.com/page#section",
            "https://host.internal/deep/path/?q=%20x#top",
        ];
        for url in urls {
            let expected = url.split('#').next().unwrap();
            assert_eq!(decompose_url(url).to_url(), expected, "url: {}", url);
        }
    }

    #[test]
    fn test_decompose_host_only() {
        let parts = decompose_url("http://example.com");
        assert_eq!(parts.protocol, "http://");
        assert_eq!(parts.host, "example.com");
        assert_eq!(parts.path, "");

        let parts = decompose_url("example.com");
        assert_eq!(parts.protocol, "");
        assert_eq!(parts.host, "example.com");
        assert_eq!(parts.path, "");
    }

    #[test]
    fn test_separator_after_first_slash_is_not_protocol() {
        let parts = decompose_url("/redirect?to=http://other.com/x");
        assert_eq!(parts.protocol, "");
        assert_eq!(parts.host, "");
        assert_eq!(parts.path, "/redirect?to=http://other.com/x");
    }

    #[test]
    fn test_relative_request_path() {
        let parts = decompose_url("/new?a=1#x");
        assert_eq!(parts.protocol, "");
        assert_eq!(parts.host, "");
        assert_eq!(parts.path, "/new?a=1");
    }

    #[test]
    fn test_split_path_and_query() {
        let (path, params) = split_path_and_query("/auth?code=abc%2Fdef&debug").unwrap();
        assert_eq!(path, "/auth");
        assert_eq!(params.value("code"), Some("abc/def"));
        assert_eq!(params.get("debug"), Some(&QueryValue::Flag));

        let (path, params) = split_path_and_query("/binary.html").unwrap();
        assert_eq!(path, "/binary.html");
        assert!(params.is_empty());
    }

    #[test]
    fn test_split_propagates_decode_error() {
        assert!(split_path_and_query("/x?a=%zz").is_err());
    }
}
