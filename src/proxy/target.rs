//! 目标地址解析
//!
//! 目标来自当前请求的 `urlJSON` 参数，或在缺失时来自 Referer 页面上记录的
//! `urlJSON`：后者只提供 scheme 与 host，路径取自当前请求，从而支持被代理页面
//! 内的相对跳转。

use serde::Deserialize;

use super::error::{RelayError, Result};
use crate::core::{decompose_url, split_path_and_query, QueryParameters, UrlComponents};

pub const URL_JSON_PARAM: &str = "urlJSON";

/// `urlJSON` 的 JSON 形态：URL 字符串或 `{protocol, host, path}` 对象
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TargetSpec {
    Url(String),
    Components(UrlComponents),
}

impl TargetSpec {
    fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    fn into_components(self) -> UrlComponents {
        match self {
            TargetSpec::Url(url) => decompose_url(&url),
            TargetSpec::Components(components) => components,
        }
    }

    fn into_url(self) -> String {
        match self {
            TargetSpec::Url(url) => url,
            TargetSpec::Components(components) => components.to_url(),
        }
    }
}

fn url_json(params: &QueryParameters) -> Option<&str> {
    params.value(URL_JSON_PARAM).filter(|v| !v.is_empty())
}

/// 解析最终目标 URL
///
/// `request_path` 是当前请求的路径（含查询串），`request_query` 是它解码后的参数。
pub fn resolve_target(
    request_path: &str,
    referer: Option<&str>,
    request_query: &QueryParameters,
) -> Result<String> {
    if let Some(raw) = url_json(request_query) {
        return Ok(TargetSpec::parse(raw)?.into_url());
    }

    let referer = referer.ok_or_else(|| {
        RelayError::MissingTarget(format!("No urlJSON and no referer ({})", request_path))
    })?;

    let (_, referer_query) = split_path_and_query(&decompose_url(referer).path)?;
    let raw = url_json(&referer_query).ok_or_else(|| {
        RelayError::MissingTarget(format!(
            "No urlJSON in url or referer. ({} and {})",
            request_path, referer
        ))
    })?;

    let base = TargetSpec::parse(raw)?.into_components();
    Ok(format!("{}{}{}", base.protocol, base.host, request_path))
}
